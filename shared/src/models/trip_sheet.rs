//! Trip Sheet Model (feuille de route)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum TripPurpose {
    Livraison,
    Mission,
    Personnel,
}

/// Trip sheet with fuel / distance bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TripSheet {
    pub id: i64,
    pub vehicle_id: String,
    pub driver_id: i64,
    pub date_depart: NaiveDate,
    pub heure_depart: String,
    pub destination: String,
    pub objet: TripPurpose,
    pub km_depart: Option<f64>,
    pub carburant_depart: Option<f64>,
    pub km_retour: Option<f64>,
    pub carburant_retour: Option<f64>,
    pub date_retour: Option<NaiveDate>,
    pub heure_retour: Option<String>,
    pub distance: Option<f64>,
    pub carburant_utilise: Option<f64>,
    pub consommation: Option<f64>,
    pub alerte_surconsommation: bool,
    pub signature_chauffeur: bool,
    pub signature_responsable: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create / replace trip sheet payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSheetInput {
    pub vehicle_id: String,
    pub driver_id: i64,
    pub date_depart: NaiveDate,
    pub heure_depart: String,
    pub destination: String,
    pub objet: TripPurpose,
    pub km_depart: Option<f64>,
    pub carburant_depart: Option<f64>,
    pub km_retour: Option<f64>,
    pub carburant_retour: Option<f64>,
    pub date_retour: Option<NaiveDate>,
    pub heure_retour: Option<String>,
    #[serde(default)]
    pub signature_chauffeur: bool,
    #[serde(default)]
    pub signature_responsable: bool,
}

/// Derived trip figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TripFigures {
    pub distance: Option<f64>,
    pub carburant_utilise: Option<f64>,
    pub consommation: Option<f64>,
    pub alerte_surconsommation: bool,
}
