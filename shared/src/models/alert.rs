//! Alert Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum AlertLevel {
    Faible,
    Moyen,
    #[serde(rename = "Élevé")]
    #[cfg_attr(feature = "db", sqlx(rename = "Élevé"))]
    Eleve,
    Critique,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum AlertStatus {
    #[default]
    Active,
    #[serde(rename = "Résolue")]
    #[cfg_attr(feature = "db", sqlx(rename = "Résolue"))]
    Resolue,
    #[serde(rename = "Ignorée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Ignorée"))]
    Ignoree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Alert {
    pub id: i64,
    pub vehicle_id: Option<String>,
    pub titre: String,
    pub description: String,
    pub type_alerte: String,
    pub niveau: AlertLevel,
    pub statut: AlertStatus,
    pub date_creation: i64,
    pub date_resolution: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCreate {
    pub vehicle_id: Option<String>,
    pub titre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub type_alerte: String,
    pub niveau: AlertLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertUpdate {
    pub titre: Option<String>,
    pub description: Option<String>,
    pub type_alerte: Option<String>,
    pub niveau: Option<AlertLevel>,
    pub statut: Option<AlertStatus>,
}
