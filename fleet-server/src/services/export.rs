//! CSV exports (payroll register, inventory state)

use csv::{Writer, WriterBuilder};
use shared::error::AppError;
use shared::models::{InventoryState, PayrollExportRow};
use sqlx::SqlitePool;

use super::stock;
use crate::db::repository::payroll;
use crate::error::ServiceResult;
use crate::utils::time::month_bounds;

const CSV_DELIMITER: u8 = b';';

pub const PAYROLL_HEADER: [&str; 9] = [
    "matricule",
    "nom",
    "salaire_brut",
    "cnss",
    "rts",
    "vf",
    "avances",
    "sanctions",
    "net_a_payer",
];

pub const INVENTORY_HEADER: [&str; 9] = [
    "id",
    "nom",
    "categorie",
    "unite",
    "stock_actuel",
    "seuil_minimum",
    "prix_unitaire",
    "valeur_stock",
    "statut",
];

fn csv_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_writer(Vec::new())
}

fn csv_error(e: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("CSV export failed: {e}"))
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, AppError> {
    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

/// Serde label of an enum value (`"Pièce"` rather than `Piece`)
fn label<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

pub fn payroll_csv(rows: &[PayrollExportRow]) -> Result<String, AppError> {
    let mut writer = csv_writer();
    writer.write_record(PAYROLL_HEADER).map_err(csv_error)?;
    for r in rows {
        writer
            .write_record([
                r.matricule.clone(),
                format!("{} {}", r.prenom, r.nom),
                r.salaire_brut.to_string(),
                r.cnss.to_string(),
                r.rts.to_string(),
                r.vf.to_string(),
                r.avance_sur_salaire.to_string(),
                r.sanction_vol_carburant.to_string(),
                r.salaire_net_a_payer.to_string(),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

pub fn inventory_csv(state: &InventoryState) -> Result<String, AppError> {
    let mut writer = csv_writer();
    writer.write_record(INVENTORY_HEADER).map_err(csv_error)?;
    for l in &state.produits {
        writer
            .write_record([
                l.id.clone(),
                l.nom.clone(),
                label(&l.categorie),
                label(&l.unite),
                l.stock_actuel.to_string(),
                l.seuil_minimum.to_string(),
                l.prix_unitaire.to_string(),
                l.valeur_stock.to_string(),
                label(&l.statut_stock),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

pub async fn export_payroll(
    pool: &SqlitePool,
    tenant_id: &str,
    mois: u32,
    annee: i32,
) -> ServiceResult<String> {
    month_bounds(mois, annee)?;
    let rows = payroll::export_rows(pool, tenant_id, mois, annee).await?;
    tracing::debug!(tenant_id, mois, annee, rows = rows.len(), "Payroll CSV export");
    Ok(payroll_csv(&rows)?)
}

pub async fn export_inventory(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<String> {
    let state = stock::inventory_state(pool, tenant_id).await?;
    Ok(inventory_csv(&state)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{TENANT, test_pool};

    #[test]
    fn payroll_rows_follow_header() {
        let rows = vec![PayrollExportRow {
            matricule: "EMP001".into(),
            prenom: "Fatoumata".into(),
            nom: "Camara".into(),
            salaire_brut: 1_250_000.0,
            cnss: 62_500.0,
            rts: 26_000.0,
            vf: 0.0,
            avance_sur_salaire: 100_000.0,
            sanction_vol_carburant: 0.0,
            salaire_net_a_payer: 1_061_500.0,
        }];
        let csv = payroll_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(PAYROLL_HEADER.join(";").as_str()));
        assert_eq!(
            lines.next(),
            Some("EMP001;Fatoumata Camara;1250000;62500;26000;0;100000;0;1061500")
        );
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn empty_inventory_exports_header_only() {
        let pool = test_pool().await;
        let csv = export_inventory(&pool, TENANT).await.unwrap();
        assert_eq!(csv.trim_end(), INVENTORY_HEADER.join(";"));
    }

    #[tokio::test]
    async fn payroll_export_rejects_bad_month() {
        let pool = test_pool().await;
        assert!(export_payroll(&pool, TENANT, 0, 2025).await.is_err());
    }
}
