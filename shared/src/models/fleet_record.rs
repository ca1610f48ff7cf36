//! Per-vehicle Fleet Records
//!
//! Documents, mileage readings, fuel fills, availability, costs, incidents
//! and usage logs. Each record belongs to one vehicle; derived columns are
//! computed by the server on every create/update.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Administrative documents ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdminDocument {
    pub id: i64,
    pub vehicle_id: String,
    pub type_document: String,
    pub numero: String,
    pub date_emission: NaiveDate,
    pub date_expiration: NaiveDate,
    pub commentaires: String,
    pub created_at: i64,
    /// Filled at read time (depends on today's date)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub est_expire: bool,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub jours_avant_expiration: i64,
}

impl AdminDocument {
    /// Compute the expiry fields relative to `today`
    pub fn with_expiry(mut self, today: NaiveDate) -> Self {
        self.est_expire = self.date_expiration < today;
        self.jours_avant_expiration = (self.date_expiration - today).num_days();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDocumentInput {
    pub type_document: String,
    #[serde(default)]
    pub numero: String,
    pub date_emission: NaiveDate,
    pub date_expiration: NaiveDate,
    #[serde(default)]
    pub commentaires: String,
}

// ── Distance readings ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DistanceRecord {
    pub id: i64,
    pub vehicle_id: String,
    pub date_debut: NaiveDate,
    pub km_debut: f64,
    pub date_fin: NaiveDate,
    pub km_fin: f64,
    pub distance_parcourue: f64,
    pub type_moteur: String,
    pub limite_annuelle: Option<f64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceRecordInput {
    pub date_debut: NaiveDate,
    pub km_debut: f64,
    pub date_fin: NaiveDate,
    pub km_fin: f64,
    pub type_moteur: String,
    pub limite_annuelle: Option<f64>,
}

// ── Fuel consumption ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FuelRecord {
    pub id: i64,
    pub vehicle_id: String,
    pub date_plein1: NaiveDate,
    pub km_plein1: f64,
    pub date_plein2: NaiveDate,
    pub km_plein2: f64,
    pub litres_ajoutes: f64,
    pub distance: f64,
    pub consommation_100km: f64,
    pub consommation_constructeur: Option<f64>,
    pub ecart_constructeur: Option<f64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelRecordInput {
    pub date_plein1: NaiveDate,
    pub km_plein1: f64,
    pub date_plein2: NaiveDate,
    pub km_plein2: f64,
    pub litres_ajoutes: f64,
    pub consommation_constructeur: Option<f64>,
}

// ── Availability ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AvailabilityRecord {
    pub id: i64,
    pub vehicle_id: String,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub heures_disponibles: f64,
    pub heures_totales: f64,
    pub pourcentage: f64,
    pub raison: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityInput {
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub heures_disponibles: f64,
    pub heures_totales: f64,
    #[serde(default)]
    pub raison: String,
}

// ── Costs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OperatingCost {
    pub id: i64,
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub type_cout: String,
    pub montant: f64,
    pub km_actuel: f64,
    pub cout_par_km: f64,
    pub description: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingCostInput {
    pub date: NaiveDate,
    pub type_cout: String,
    pub montant: f64,
    #[serde(default)]
    pub km_actuel: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FinancialCost {
    pub id: i64,
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub type_cout: String,
    pub montant: f64,
    pub kilometrage: f64,
    pub periode_amortissement: Option<i64>,
    pub cout_par_km: f64,
    pub description: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialCostInput {
    pub date: NaiveDate,
    pub type_cout: String,
    pub montant: f64,
    #[serde(default)]
    pub kilometrage: f64,
    pub periode_amortissement: Option<i64>,
    #[serde(default)]
    pub description: String,
}

// ── Incidents ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum IncidentType {
    Accident,
    Incident,
    #[serde(rename = "Défaut critique")]
    #[cfg_attr(feature = "db", sqlx(rename = "Défaut critique"))]
    DefautCritique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum Severity {
    Faible,
    Moyenne,
    #[serde(rename = "Élevée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Élevée"))]
    Elevee,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Incident {
    pub id: i64,
    pub vehicle_id: String,
    pub date_incident: NaiveDate,
    pub type_incident: IncidentType,
    pub gravite: Severity,
    pub conducteur_id: Option<i64>,
    pub lieu: String,
    pub description: String,
    pub mesures_prises: String,
    pub commentaires: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentInput {
    pub date_incident: NaiveDate,
    pub type_incident: IncidentType,
    pub gravite: Severity,
    pub conducteur_id: Option<i64>,
    #[serde(default)]
    pub lieu: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mesures_prises: String,
    #[serde(default)]
    pub commentaires: String,
}

// ── Usage log ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum Department {
    Commercial,
    Technique,
    Administratif,
    Direction,
    Logistique,
    Maintenance,
    Autre,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VehicleUsage {
    pub id: i64,
    pub vehicle_id: String,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub conducteur_id: Option<i64>,
    pub departement: Department,
    pub motif: String,
    pub km_depart: f64,
    pub km_retour: f64,
    pub distance: f64,
    pub observations: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleUsageInput {
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub conducteur_id: Option<i64>,
    pub departement: Department,
    #[serde(default)]
    pub motif: String,
    pub km_depart: f64,
    pub km_retour: f64,
    #[serde(default)]
    pub observations: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(expiration: NaiveDate) -> AdminDocument {
        AdminDocument {
            id: 1,
            vehicle_id: "V-001".into(),
            type_document: "Assurance".into(),
            numero: "A-42".into(),
            date_emission: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_expiration: expiration,
            commentaires: String::new(),
            created_at: 0,
            est_expire: false,
            jours_avant_expiration: 0,
        }
    }

    #[test]
    fn expiry_is_relative_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let future = doc(NaiveDate::from_ymd_opt(2025, 3, 25).unwrap()).with_expiry(today);
        assert!(!future.est_expire);
        assert_eq!(future.jours_avant_expiration, 15);

        let past = doc(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).with_expiry(today);
        assert!(past.est_expire);
        assert_eq!(past.jours_avant_expiration, -9);

        let same_day = doc(today).with_expiry(today);
        assert!(!same_day.est_expire);
        assert_eq!(same_day.jours_avant_expiration, 0);
    }
}
