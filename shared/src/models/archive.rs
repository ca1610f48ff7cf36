//! Monthly Archive Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum ArchiveStatus {
    #[default]
    #[serde(rename = "En cours")]
    #[cfg_attr(feature = "db", sqlx(rename = "En cours"))]
    EnCours,
    #[serde(rename = "Clôturé")]
    #[cfg_attr(feature = "db", sqlx(rename = "Clôturé"))]
    Cloture,
    #[serde(rename = "Archivé")]
    #[cfg_attr(feature = "db", sqlx(rename = "Archivé"))]
    Archive,
}

/// Frozen snapshot of one month of HR data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MonthlyArchive {
    pub id: i64,
    pub mois: i64,
    pub annee: i64,
    pub statut: ArchiveStatus,
    pub nb_employes_actifs: i64,
    pub nb_jours_travailles: i64,
    /// JSON: { matricule: [ {date, statut}, ... ] }
    pub donnees_presences: json_column::Json,
    /// JSON: { matricule: payroll }
    pub donnees_paies: json_column::Json,
    /// JSON: { matricule: [ overtime, ... ] }
    pub donnees_heures_supp: json_column::Json,
    pub total_salaire_brut: f64,
    pub total_deductions: f64,
    pub total_net_paye: f64,
    pub date_creation: i64,
    pub date_cloture: Option<i64>,
    pub commentaires: String,
}

/// JSON column type: `sqlx::types::Json` when the db feature is on
#[cfg(feature = "db")]
pub mod json_column {
    pub type Json = sqlx::types::Json<serde_json::Value>;
}

#[cfg(not(feature = "db"))]
pub mod json_column {
    pub type Json = serde_json::Value;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveCreate {
    pub mois: u32,
    pub annee: i32,
    #[serde(default)]
    pub commentaires: String,
}

/// Rows removed from the live tables by an archive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveDeletedCounts {
    pub presences: u64,
    pub paies: u64,
    pub heures_supp: u64,
}

/// Month boundaries and navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthInfo {
    pub mois: u32,
    pub annee: i32,
    pub jours: u32,
    pub premier_jour: chrono::NaiveDate,
    pub dernier_jour: chrono::NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    pub archive: MonthlyArchive,
    pub supprimes: ArchiveDeletedCounts,
    pub mois_suivant: MonthInfo,
}

/// Reference-data inconsistencies found before archiving
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceCheck {
    pub employes_verifies: usize,
    pub coherent: bool,
    pub incoherences: Vec<String>,
}
