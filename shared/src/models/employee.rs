//! Employee Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AttendanceStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum EmployeeStatus {
    #[default]
    Actif,
    Inactif,
    Suspendu,
    #[serde(rename = "Congé")]
    #[cfg_attr(feature = "db", sqlx(rename = "Congé"))]
    Conge,
    Formation,
}

/// Employee with pay parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub matricule: String,
    pub prenom: String,
    pub nom: String,
    pub fonction: String,
    pub telephone: Option<String>,
    pub date_embauche: Option<NaiveDate>,
    pub statut: EmployeeStatus,
    pub salaire_journalier: f64,
    pub avances: f64,
    pub montant_heure_supp_jour_ouvrable: f64,
    pub montant_heure_supp_dimanche_ferie: f64,
    pub valeur_km: f64,
    pub taux_cnss_salarie_custom: f64,
    pub taux_cnss_employeur_custom: f64,
    pub taux_vf_custom: f64,
    pub appliquer_cnss: bool,
    pub appliquer_rts: bool,
    pub appliquer_vf: bool,
    pub calcul_salaire_auto: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub matricule: String,
    pub prenom: String,
    pub nom: String,
    #[serde(default)]
    pub fonction: String,
    pub telephone: Option<String>,
    pub date_embauche: Option<NaiveDate>,
    #[serde(default)]
    pub statut: EmployeeStatus,
    #[serde(default)]
    pub salaire_journalier: f64,
    #[serde(default)]
    pub avances: f64,
    #[serde(default)]
    pub montant_heure_supp_jour_ouvrable: f64,
    #[serde(default)]
    pub montant_heure_supp_dimanche_ferie: f64,
    #[serde(default)]
    pub valeur_km: f64,
    #[serde(default)]
    pub taux_cnss_salarie_custom: f64,
    #[serde(default)]
    pub taux_cnss_employeur_custom: f64,
    #[serde(default)]
    pub taux_vf_custom: f64,
    #[serde(default = "default_true")]
    pub appliquer_cnss: bool,
    #[serde(default = "default_true")]
    pub appliquer_rts: bool,
    #[serde(default)]
    pub appliquer_vf: bool,
    #[serde(default = "default_true")]
    pub calcul_salaire_auto: bool,
}

fn default_true() -> bool {
    true
}

/// Update employee payload (absent fields are left untouched)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub matricule: Option<String>,
    pub prenom: Option<String>,
    pub nom: Option<String>,
    pub fonction: Option<String>,
    pub telephone: Option<String>,
    pub date_embauche: Option<NaiveDate>,
    pub statut: Option<EmployeeStatus>,
    pub salaire_journalier: Option<f64>,
    pub avances: Option<f64>,
    pub montant_heure_supp_jour_ouvrable: Option<f64>,
    pub montant_heure_supp_dimanche_ferie: Option<f64>,
    pub valeur_km: Option<f64>,
    pub taux_cnss_salarie_custom: Option<f64>,
    pub taux_cnss_employeur_custom: Option<f64>,
    pub taux_vf_custom: Option<f64>,
    pub appliquer_cnss: Option<bool>,
    pub appliquer_rts: Option<bool>,
    pub appliquer_vf: Option<bool>,
    pub calcul_salaire_auto: Option<bool>,
}

/// Per-status daily amount used by automatic salary computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SalaryConfig {
    pub id: i64,
    pub employee_id: i64,
    pub statut_presence: AttendanceStatus,
    pub montant_journalier: f64,
    pub actif: bool,
}

/// Upsert payload for one salary config line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryConfigInput {
    pub statut_presence: AttendanceStatus,
    pub montant_journalier: f64,
    #[serde(default = "default_true")]
    pub actif: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_match_payroll_flags() {
        let payload: EmployeeCreate =
            serde_json::from_str(r#"{"matricule":"EMP001","prenom":"Aissatou","nom":"Bah"}"#)
                .unwrap();
        assert!(payload.appliquer_cnss);
        assert!(payload.appliquer_rts);
        assert!(!payload.appliquer_vf);
        assert!(payload.calcul_salaire_auto);
        assert_eq!(payload.statut, EmployeeStatus::Actif);
    }

    #[test]
    fn conge_status_is_accented() {
        let status: EmployeeStatus = serde_json::from_str("\"Congé\"").unwrap();
        assert_eq!(status, EmployeeStatus::Conge);
    }
}
