//! Purchase Order Model (commande)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum PurchaseOrderStatus {
    #[default]
    Brouillon,
    #[serde(rename = "En attente")]
    #[cfg_attr(feature = "db", sqlx(rename = "En attente"))]
    EnAttente,
    #[serde(rename = "Validée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Validée"))]
    Validee,
    #[serde(rename = "En cours")]
    #[cfg_attr(feature = "db", sqlx(rename = "En cours"))]
    EnCours,
    #[serde(rename = "Livrée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Livrée"))]
    Livree,
    #[serde(rename = "Annulée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Annulée"))]
    Annulee,
}

impl PurchaseOrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Brouillon => "Brouillon",
            PurchaseOrderStatus::EnAttente => "En attente",
            PurchaseOrderStatus::Validee => "Validée",
            PurchaseOrderStatus::EnCours => "En cours",
            PurchaseOrderStatus::Livree => "Livrée",
            PurchaseOrderStatus::Annulee => "Annulée",
        }
    }

    /// Allowed forward transitions
    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Brouillon, EnAttente | Validee | Annulee)
                | (EnAttente, Validee | Annulee)
                | (Validee, EnCours | Annulee)
                | (EnCours, Livree | Annulee)
        )
    }

    /// Lines may only change before validation
    pub fn lines_editable(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Brouillon | PurchaseOrderStatus::EnAttente
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PurchaseOrder {
    pub id: i64,
    pub numero: String,
    pub fournisseur: String,
    pub date_commande: NaiveDate,
    pub date_livraison_prevue: Option<NaiveDate>,
    pub statut: PurchaseOrderStatus,
    pub remise_pourcent: f64,
    pub montant_total: f64,
    pub montant_final: f64,
    pub observations: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PurchaseOrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: String,
    /// Product name at order time
    pub designation: String,
    /// Product category at order time
    pub categorie: String,
    pub quantite: i64,
    pub prix_unitaire: f64,
    pub montant_ligne: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderLineInput {
    pub product_id: String,
    pub quantite: i64,
    /// Defaults to the product's unit price
    pub prix_unitaire: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderCreate {
    pub fournisseur: String,
    pub date_commande: Option<NaiveDate>,
    pub date_livraison_prevue: Option<NaiveDate>,
    #[serde(default)]
    pub remise_pourcent: f64,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub lignes: Vec<PurchaseOrderLineInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseOrderUpdate {
    pub fournisseur: Option<String>,
    pub date_livraison_prevue: Option<NaiveDate>,
    pub remise_pourcent: Option<f64>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange<S> {
    pub statut: S,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub lignes: Vec<PurchaseOrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use PurchaseOrderStatus::*;

    #[test]
    fn forward_transitions() {
        assert!(Brouillon.can_transition_to(EnAttente));
        assert!(Brouillon.can_transition_to(Validee));
        assert!(EnAttente.can_transition_to(Validee));
        assert!(Validee.can_transition_to(EnCours));
        assert!(EnCours.can_transition_to(Livree));
        assert!(EnCours.can_transition_to(Annulee));
    }

    #[test]
    fn terminal_and_backward_transitions_rejected() {
        assert!(!Livree.can_transition_to(Annulee));
        assert!(!Annulee.can_transition_to(Brouillon));
        assert!(!Validee.can_transition_to(Brouillon));
        assert!(!Brouillon.can_transition_to(Livree));
        assert!(!EnAttente.can_transition_to(EnCours));
    }

    #[test]
    fn lines_editable_before_validation() {
        assert!(Brouillon.lines_editable());
        assert!(EnAttente.lines_editable());
        assert!(!Validee.lines_editable());
    }
}
