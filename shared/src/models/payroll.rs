//! Payroll Model (bulletin de paie)

use serde::{Deserialize, Serialize};

/// Monthly payroll statement, one per (employee, mois, annee)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payroll {
    pub id: i64,
    pub employee_id: i64,
    pub mois: i64,
    pub annee: i64,

    pub salaire_base: f64,
    pub salaire_brut: f64,
    pub salaire_net: f64,
    pub salaire_net_a_payer: f64,

    // Attendance counters
    pub jours_mois: i64,
    pub jours_presence: i64,
    pub jours_repos: i64,
    pub absences: i64,
    pub dimanches: i64,
    pub conge: i64,

    // Earned amounts
    pub montant_jours_travailles: f64,
    pub heures_supplementaires: f64,
    pub montant_heures_supplementaires: f64,
    pub montant_heures_supplement_dimanches: f64,
    pub montant_frais_km: f64,

    // Allowances and bonuses (manual)
    pub indemnite_transport: f64,
    pub indemnite_logement: f64,
    pub cherete_vie: f64,
    pub prime_discipline: f64,
    pub prime_ferie: f64,

    // Deductions
    pub cnss: f64,
    pub cnss_employeur: f64,
    pub rts: f64,
    pub vf: f64,
    pub avance_sur_salaire: f64,
    pub sanction_vol_carburant: f64,

    pub created_at: i64,
    pub updated_at: i64,
}

/// Manual payroll fields editable by HR
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollUpdate {
    pub salaire_base: Option<f64>,
    pub conge: Option<i64>,
    pub indemnite_transport: Option<f64>,
    pub indemnite_logement: Option<f64>,
    pub cherete_vie: Option<f64>,
    pub prime_discipline: Option<f64>,
    pub prime_ferie: Option<f64>,
    pub avance_sur_salaire: Option<f64>,
    pub sanction_vol_carburant: Option<f64>,
}

/// Input of the charges simulation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargesRequest {
    pub salaire_brut: f64,
    #[serde(default)]
    pub taux_cnss_salarie: f64,
    #[serde(default)]
    pub taux_cnss_employeur: f64,
    #[serde(default)]
    pub taux_vf: f64,
    #[serde(default = "default_true")]
    pub appliquer_cnss: bool,
    #[serde(default = "default_true")]
    pub appliquer_rts: bool,
    #[serde(default)]
    pub appliquer_vf: bool,
}

fn default_true() -> bool {
    true
}

/// Statutory charges computed on a gross salary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Charges {
    pub salaire_brut: f64,
    pub cnss_salarie: f64,
    pub cnss_employeur: f64,
    pub rts: f64,
    pub vf: f64,
    pub total_deductions: f64,
    pub salaire_net: f64,
    pub cout_employeur: f64,
    pub taux_cnss_salarie: f64,
    pub taux_cnss_employeur: f64,
    pub taux_vf: f64,
}

/// Request body for a bulk payroll sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub mois: u32,
    pub annee: i32,
    pub matricule: Option<String>,
}

/// Outcome of a bulk payroll sync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub mois: u32,
    pub annee: i32,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<SyncError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncError {
    pub matricule: String,
    pub message: String,
}

/// Payroll vs attendance consistency report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoherenceReport {
    pub mois: u32,
    pub annee: i32,
    pub employes_verifies: usize,
    pub employes_coherents: usize,
    pub employes_incoherents: usize,
    pub problemes: Vec<CoherenceIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceIssue {
    pub employee_id: i64,
    pub matricule: String,
    pub nom: String,
    pub problemes: Vec<String>,
}

/// Flat payroll line for CSV export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PayrollExportRow {
    pub matricule: String,
    pub prenom: String,
    pub nom: String,
    pub salaire_brut: f64,
    pub cnss: f64,
    pub rts: f64,
    pub vf: f64,
    pub avance_sur_salaire: f64,
    pub sanction_vol_carburant: f64,
    pub salaire_net_a_payer: f64,
}
