//! Overtime & Mileage Allowance Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of day an overtime slot falls on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum DayType {
    #[default]
    Ouvrable,
    Dimanche,
    Ferie,
}

impl DayType {
    /// Sundays and public holidays share the premium rate
    pub fn is_premium(&self) -> bool {
        matches!(self, DayType::Dimanche | DayType::Ferie)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Overtime {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub heure_debut: String,
    pub heure_fin: String,
    pub type_jour: DayType,
    /// Manual hourly rate, 0 means "use the employee rate"
    pub taux_horaire: f64,
    /// Hours, 2 decimals
    pub duree: f64,
    pub total_a_payer: f64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeInput {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub heure_debut: String,
    pub heure_fin: String,
    #[serde(default)]
    pub type_jour: DayType,
    #[serde(default)]
    pub taux_horaire: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Mileage {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub km_parcourus: f64,
    /// Manual value per km, 0 means "use the employee value"
    pub valeur_km: f64,
    pub total_a_payer: f64,
    pub description: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MileageInput {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub km_parcourus: f64,
    #[serde(default)]
    pub valeur_km: f64,
    #[serde(default)]
    pub description: String,
}
