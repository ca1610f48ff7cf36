//! Vehicle Rental Models (location, feuille de pontage, facture)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RentalSupplier {
    pub id: i64,
    pub nom: String,
    pub contact: String,
    pub telephone: String,
    pub email: String,
    pub adresse: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalSupplierInput {
    pub nom: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub adresse: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum RentalType {
    Interne,
    #[default]
    Externe,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum RentalStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "Clôturée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Clôturée"))]
    Cloturee,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Rental {
    pub id: i64,
    pub vehicle_id: String,
    pub supplier_id: Option<i64>,
    pub type_location: RentalType,
    pub date_debut: NaiveDate,
    pub date_fin: Option<NaiveDate>,
    pub tarif_journalier: f64,
    pub statut: RentalStatus,
    pub observations: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalInput {
    pub vehicle_id: String,
    pub supplier_id: Option<i64>,
    #[serde(default)]
    pub type_location: RentalType,
    pub date_debut: NaiveDate,
    pub date_fin: Option<NaiveDate>,
    pub tarif_journalier: f64,
    #[serde(default)]
    pub statut: RentalStatus,
    #[serde(default)]
    pub observations: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum DailyLogStatus {
    #[default]
    Travail,
    Entretien,
    #[serde(rename = "Hors service")]
    #[cfg_attr(feature = "db", sqlx(rename = "Hors service"))]
    HorsService,
    Inactif,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DailyLog {
    pub id: i64,
    pub rental_id: i64,
    pub date: NaiveDate,
    pub statut: DailyLogStatus,
    pub commentaire: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLogInput {
    pub date: NaiveDate,
    #[serde(default)]
    pub statut: DailyLogStatus,
    #[serde(default)]
    pub commentaire: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum RentalInvoiceStatus {
    #[default]
    Brouillon,
    #[serde(rename = "Payée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Payée"))]
    Payee,
    #[serde(rename = "Annulée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Annulée"))]
    Annulee,
}

impl RentalInvoiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RentalInvoiceStatus::Brouillon => "Brouillon",
            RentalInvoiceStatus::Payee => "Payée",
            RentalInvoiceStatus::Annulee => "Annulée",
        }
    }

    /// A draft is either paid or cancelled, nothing leaves those states
    pub fn can_transition_to(&self, next: RentalInvoiceStatus) -> bool {
        matches!(
            (self, next),
            (
                RentalInvoiceStatus::Brouillon,
                RentalInvoiceStatus::Payee | RentalInvoiceStatus::Annulee
            )
        )
    }

    /// Amounts of a paid or cancelled invoice are never regenerated
    pub fn is_final(&self) -> bool {
        !matches!(self, RentalInvoiceStatus::Brouillon)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RentalInvoice {
    pub id: i64,
    pub rental_id: i64,
    pub numero: String,
    pub date_facture: NaiveDate,
    pub montant_ht: f64,
    pub tva: f64,
    pub montant_ttc: f64,
    pub statut: RentalInvoiceStatus,
    pub jours_travail: i64,
    pub jours_non_travail: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateInvoicesRequest {
    pub annee: i32,
    pub mois: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateInvoicesReport {
    pub annee: i32,
    pub mois: u32,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Existing invoices left untouched because they are paid or cancelled
    pub frozen: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentalDashboard {
    pub locations_actives: i64,
    pub locations_inactives: i64,
    pub jours_travail_mois: i64,
    pub jours_entretien_mois: i64,
    pub jours_hors_service_mois: i64,
    pub revenu_jour: f64,
    pub revenu_mois: f64,
    pub revenu_annee: f64,
    pub perte_entretien_mois: f64,
}
