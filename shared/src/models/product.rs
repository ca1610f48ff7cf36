//! Product & Stock Ledger Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum ProductCategory {
    Alimentaire,
    #[serde(rename = "Hygiène")]
    #[cfg_attr(feature = "db", sqlx(rename = "Hygiène"))]
    Hygiene,
    Fourniture,
    #[serde(rename = "Équipement")]
    #[cfg_attr(feature = "db", sqlx(rename = "Équipement"))]
    Equipement,
    #[serde(rename = "Pièce")]
    #[cfg_attr(feature = "db", sqlx(rename = "Pièce"))]
    Piece,
    #[default]
    Autre,
}

impl ProductCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Alimentaire => "Alimentaire",
            ProductCategory::Hygiene => "Hygiène",
            ProductCategory::Fourniture => "Fourniture",
            ProductCategory::Equipement => "Équipement",
            ProductCategory::Piece => "Pièce",
            ProductCategory::Autre => "Autre",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum Unit {
    #[default]
    #[serde(rename = "Pièce")]
    #[cfg_attr(feature = "db", sqlx(rename = "Pièce"))]
    Piece,
    Carton,
    Sac,
    Kg,
    Litre,
    #[serde(rename = "Mètre")]
    #[cfg_attr(feature = "db", sqlx(rename = "Mètre"))]
    Metre,
    Autre,
}

/// Stock level status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockStatus {
    #[default]
    Ok,
    Alerte,
}

impl StockStatus {
    /// `ALERTE` once stock falls to the threshold or below
    pub fn for_level(stock: i64, seuil_minimum: i64) -> Self {
        if stock <= seuil_minimum {
            StockStatus::Alerte
        } else {
            StockStatus::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Ok => "OK",
            StockStatus::Alerte => "ALERTE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub nom: String,
    pub categorie: ProductCategory,
    pub unite: Unit,
    pub seuil_minimum: i64,
    pub prix_unitaire: f64,
    pub fournisseur: String,
    pub date_ajout: NaiveDate,
    /// Σ entries − Σ exits, filled by the read query
    pub stock_actuel: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub statut_stock: StockStatus,
}

impl Product {
    pub fn with_status(mut self) -> Self {
        self.statut_stock = StockStatus::for_level(self.stock_actuel, self.seuil_minimum);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    /// Generated (`PRD…`) when absent
    pub id: Option<String>,
    pub nom: String,
    #[serde(default)]
    pub categorie: ProductCategory,
    #[serde(default)]
    pub unite: Unit,
    #[serde(default)]
    pub seuil_minimum: i64,
    #[serde(default)]
    pub prix_unitaire: f64,
    #[serde(default)]
    pub fournisseur: String,
    pub date_ajout: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub nom: Option<String>,
    pub categorie: Option<ProductCategory>,
    pub unite: Option<Unit>,
    pub seuil_minimum: Option<i64>,
    pub prix_unitaire: Option<f64>,
    pub fournisseur: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockEntry {
    pub id: i64,
    pub product_id: String,
    pub date: NaiveDate,
    pub quantite: i64,
    pub prix_unitaire: f64,
    pub fournisseur: String,
    pub reference_facture: String,
    pub stock_avant: i64,
    pub stock_apres: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntryInput {
    pub product_id: String,
    pub date: NaiveDate,
    pub quantite: i64,
    #[serde(default)]
    pub prix_unitaire: f64,
    #[serde(default)]
    pub fournisseur: String,
    #[serde(default)]
    pub reference_facture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockExit {
    pub id: i64,
    pub product_id: String,
    pub date: NaiveDate,
    pub quantite: i64,
    pub destination: String,
    pub motif: String,
    pub stock_avant: i64,
    pub stock_apres: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockExitInput {
    pub product_id: String,
    pub date: NaiveDate,
    pub quantite: i64,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub motif: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum MovementType {
    #[serde(rename = "Entrée")]
    #[cfg_attr(feature = "db", sqlx(rename = "Entrée"))]
    Entree,
    Sortie,
    Ajustement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: i64,
    pub product_id: String,
    pub date: NaiveDate,
    pub type_mouvement: MovementType,
    /// Signed for adjustments, positive otherwise
    pub quantite: i64,
    pub stock_avant: i64,
    pub stock_apres: i64,
    pub reference_id: Option<i64>,
    pub observations: String,
    pub created_at: i64,
}

/// One line of the inventory state report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLine {
    pub id: String,
    pub nom: String,
    pub categorie: ProductCategory,
    pub unite: Unit,
    pub stock_actuel: i64,
    pub seuil_minimum: i64,
    pub prix_unitaire: f64,
    pub valeur_stock: f64,
    pub statut_stock: StockStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryState {
    pub produits: Vec<InventoryLine>,
    pub valeur_totale: f64,
    pub produits_en_alerte: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_at_or_below_threshold() {
        assert_eq!(StockStatus::for_level(5, 5), StockStatus::Alerte);
        assert_eq!(StockStatus::for_level(0, 2), StockStatus::Alerte);
        assert_eq!(StockStatus::for_level(6, 5), StockStatus::Ok);
        assert_eq!(
            serde_json::to_string(&StockStatus::Alerte).unwrap(),
            "\"ALERTE\""
        );
    }
}
