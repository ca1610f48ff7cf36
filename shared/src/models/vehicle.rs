//! Vehicle & Driver Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Engine / fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum EngineType {
    Essence,
    Diesel,
    Hybride,
    #[serde(rename = "Électrique")]
    #[cfg_attr(feature = "db", sqlx(rename = "Électrique"))]
    Electrique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum VehicleCategory {
    Voiture,
    Moto,
    #[serde(rename = "4x4")]
    #[cfg_attr(feature = "db", sqlx(rename = "4x4"))]
    QuatreQuatre,
    Camion,
    Bus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum VehicleStatus {
    #[default]
    Actif,
    Maintenance,
    #[serde(rename = "Hors Service")]
    #[cfg_attr(feature = "db", sqlx(rename = "Hors Service"))]
    HorsService,
}

/// Vehicle, keyed by the user-assigned `id_vehicule`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Vehicle {
    pub id_vehicule: String,
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub type_moteur: EngineType,
    pub categorie: VehicleCategory,
    pub statut_actuel: VehicleStatus,
    pub date_mise_service: Option<NaiveDate>,
    pub date_acquisition: Option<NaiveDate>,
    pub kilometrage_initial: f64,
    pub affectation: String,
    pub numero_chassis: String,
    pub numero_moteur: String,
    pub observations: String,
    pub chauffeur_principal_id: Option<i64>,
    pub fournisseur_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create vehicle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCreate {
    pub id_vehicule: String,
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub type_moteur: EngineType,
    pub categorie: VehicleCategory,
    #[serde(default)]
    pub statut_actuel: VehicleStatus,
    pub date_mise_service: Option<NaiveDate>,
    pub date_acquisition: Option<NaiveDate>,
    #[serde(default)]
    pub kilometrage_initial: f64,
    #[serde(default)]
    pub affectation: String,
    #[serde(default)]
    pub numero_chassis: String,
    #[serde(default)]
    pub numero_moteur: String,
    #[serde(default)]
    pub observations: String,
    pub chauffeur_principal_id: Option<i64>,
    pub fournisseur_id: Option<i64>,
}

/// Update vehicle payload (absent fields are left untouched)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleUpdate {
    pub immatriculation: Option<String>,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub type_moteur: Option<EngineType>,
    pub categorie: Option<VehicleCategory>,
    pub statut_actuel: Option<VehicleStatus>,
    pub date_mise_service: Option<NaiveDate>,
    pub date_acquisition: Option<NaiveDate>,
    pub kilometrage_initial: Option<f64>,
    pub affectation: Option<String>,
    pub numero_chassis: Option<String>,
    pub numero_moteur: Option<String>,
    pub observations: Option<String>,
    pub chauffeur_principal_id: Option<i64>,
    pub fournisseur_id: Option<i64>,
}

/// Driver (chauffeur)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Driver {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub numero_permis: String,
    pub date_embauche: NaiveDate,
    pub date_expiration_permis: Option<NaiveDate>,
    pub telephone: String,
    pub email: Option<String>,
    pub statut: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create / replace driver payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverInput {
    pub nom: String,
    pub prenom: String,
    pub numero_permis: String,
    pub date_embauche: NaiveDate,
    pub date_expiration_permis: Option<NaiveDate>,
    #[serde(default)]
    pub telephone: String,
    pub email: Option<String>,
    #[serde(default = "default_driver_status")]
    pub statut: String,
}

fn default_driver_status() -> String {
    "Actif".to_string()
}

/// Fleet dashboard summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetDashboard {
    pub vehicules_total: i64,
    pub vehicules_actifs: i64,
    pub vehicules_maintenance: i64,
    pub vehicules_hors_service: i64,
    pub chauffeurs: i64,
    pub alertes_actives: i64,
    pub documents_expirant_30j: i64,
    pub couts_exploitation_mois: f64,
    pub litres_carburant_mois: f64,
}

/// Activity, costs and rental revenue of one vehicle over `[du, au]`
///
/// Active days are completed trip sheets (returned and signed by the driver)
/// plus rental days logged as `Travail`. `distance_parcourue` sums trip sheet
/// and usage distances; `consommation_moyenne` is L/100km over the fuel
/// records whose second fill falls in the range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleStats {
    pub vehicle_id: String,
    pub immatriculation: String,
    pub du: NaiveDate,
    pub au: NaiveDate,
    pub jours_periode: i64,
    pub jours_actifs: i64,
    pub jours_entretien: i64,
    pub jours_hors_service: i64,
    pub pourcentage_actif: f64,
    pub distance_parcourue: f64,
    pub carburant_litres: f64,
    pub consommation_moyenne: f64,
    pub cout_entretien: f64,
    pub couts_exploitation: f64,
    pub couts_financiers: f64,
    pub cout_total: f64,
    pub cout_par_km: f64,
    /// Σ available hours / Σ tracked hours, in percent
    pub disponibilite: f64,
    pub incidents: i64,
    pub jours_factures: i64,
    pub frais_location: f64,
    /// `frais_location − cout_total`
    pub rentabilite: f64,
}

/// Side-by-side stats of several vehicles over the same range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleComparison {
    pub du: NaiveDate,
    pub au: NaiveDate,
    pub vehicules: Vec<VehicleStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_variants_use_display_labels() {
        assert_eq!(
            serde_json::to_string(&EngineType::Electrique).unwrap(),
            "\"Électrique\""
        );
        assert_eq!(
            serde_json::to_string(&VehicleStatus::HorsService).unwrap(),
            "\"Hors Service\""
        );
        let cat: VehicleCategory = serde_json::from_str("\"4x4\"").unwrap();
        assert_eq!(cat, VehicleCategory::QuatreQuatre);
    }

    #[test]
    fn driver_status_defaults_to_actif() {
        let input: DriverInput = serde_json::from_str(
            r#"{"nom":"Diallo","prenom":"Mamadou","numero_permis":"P-1","date_embauche":"2024-01-15"}"#,
        )
        .unwrap();
        assert_eq!(input.statut, "Actif");
    }
}
