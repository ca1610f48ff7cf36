//! Invoice Model (facture)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum InvoiceStatus {
    #[default]
    Brouillon,
    Validee,
    Envoyee,
    Payee,
    Annulee,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Brouillon => "brouillon",
            InvoiceStatus::Validee => "validee",
            InvoiceStatus::Envoyee => "envoyee",
            InvoiceStatus::Payee => "payee",
            InvoiceStatus::Annulee => "annulee",
        }
    }

    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Brouillon, Validee | Annulee)
                | (Validee, Envoyee | Payee | Annulee)
                | (Envoyee, Payee | Annulee)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub numero: String,
    pub client_nom: String,
    pub client_adresse: String,
    pub date_facture: NaiveDate,
    pub date_echeance: Option<NaiveDate>,
    pub statut: InvoiceStatus,
    /// Absolute discount amount
    pub remise: f64,
    pub montant_total: f64,
    pub tva: f64,
    pub montant_final: f64,
    pub observations: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InvoiceLine {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: Option<String>,
    pub designation: String,
    pub quantite: i64,
    pub prix_unitaire: f64,
    pub montant: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineInput {
    pub product_id: Option<String>,
    pub designation: String,
    pub quantite: i64,
    pub prix_unitaire: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreate {
    pub client_nom: String,
    #[serde(default)]
    pub client_adresse: String,
    pub date_facture: Option<NaiveDate>,
    pub date_echeance: Option<NaiveDate>,
    #[serde(default)]
    pub remise: f64,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub lignes: Vec<InvoiceLineInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    pub client_nom: Option<String>,
    pub client_adresse: Option<String>,
    pub date_echeance: Option<NaiveDate>,
    pub remise: Option<f64>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub lignes: Vec<InvoiceLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvoiceStatus::*;

    #[test]
    fn invoice_status_flow() {
        assert!(Brouillon.can_transition_to(Validee));
        assert!(Validee.can_transition_to(Payee));
        assert!(Envoyee.can_transition_to(Payee));
        assert!(!Brouillon.can_transition_to(Payee));
        assert!(!Payee.can_transition_to(Annulee));
        assert!(!Annulee.can_transition_to(Brouillon));
    }
}
