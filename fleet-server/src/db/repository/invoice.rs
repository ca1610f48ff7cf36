//! Invoice Repository (factures + lines)

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{Invoice, InvoiceLine, InvoiceLineInput, InvoiceStatus, InvoiceUpdate};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, numero, client_nom, client_adresse, date_facture, date_echeance, statut, remise, montant_total, tva, montant_final, observations, created_at, updated_at";
const LINE_COLUMNS: &str = "id, invoice_id, product_id, designation, quantite, prix_unitaire, montant";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: Option<InvoiceStatus>,
) -> RepoResult<Vec<Invoice>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM invoice WHERE tenant_id = ?1 AND (?2 IS NULL OR statut = ?2) ORDER BY date_facture DESC, numero DESC"
    );
    let rows = sqlx::query_as::<_, Invoice>(&sql)
        .bind(tenant_id)
        .bind(statut)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Invoice>> {
    let sql = format!("SELECT {COLUMNS} FROM invoice WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Invoice>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Highest of the tenant's numbers starting with `prefix`
pub async fn last_number_with_prefix(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    prefix: &str,
) -> RepoResult<Option<String>> {
    let numero: Option<String> = sqlx::query_scalar(
        "SELECT numero FROM invoice WHERE tenant_id = ?1 AND substr(numero, 1, length(?2)) = ?2 \
         ORDER BY length(numero) DESC, numero DESC LIMIT 1",
    )
    .bind(tenant_id)
    .bind(prefix)
    .fetch_optional(db)
    .await?;
    Ok(numero)
}

/// Invoice header to insert
#[derive(Debug, Clone)]
pub struct NewInvoice<'a> {
    pub numero: &'a str,
    pub client_nom: &'a str,
    pub client_adresse: &'a str,
    pub date_facture: NaiveDate,
    pub date_echeance: Option<NaiveDate>,
    pub remise: f64,
    pub observations: &'a str,
}

pub async fn insert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    invoice: &NewInvoice<'_>,
) -> RepoResult<Invoice> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO invoice (id, tenant_id, numero, client_nom, client_adresse, date_facture, date_echeance, statut, remise, montant_total, tva, montant_final, observations, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'brouillon', ?8, 0, 0, 0, ?9, ?10, ?10) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Invoice>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(invoice.numero)
        .bind(invoice.client_nom)
        .bind(invoice.client_adresse)
        .bind(invoice.date_facture)
        .bind(invoice.date_echeance)
        .bind(invoice.remise)
        .bind(invoice.observations)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Invoice number '{}' already exists", invoice.numero))
            }
            other => other,
        })
}

pub async fn update_header(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &InvoiceUpdate,
) -> RepoResult<Invoice> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE invoice SET client_nom = COALESCE(?1, client_nom), client_adresse = COALESCE(?2, client_adresse), date_echeance = COALESCE(?3, date_echeance), remise = COALESCE(?4, remise), observations = COALESCE(?5, observations), updated_at = ?6 \
         WHERE id = ?7 AND tenant_id = ?8 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Invoice>(&sql)
        .bind(&data.client_nom)
        .bind(&data.client_adresse)
        .bind(data.date_echeance)
        .bind(data.remise)
        .bind(&data.observations)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice {id} not found")))
}

/// Stored invoice totals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceTotals {
    pub montant_total: f64,
    pub tva: f64,
    pub montant_final: f64,
}

pub async fn set_totals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    totals: InvoiceTotals,
) -> RepoResult<Invoice> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE invoice SET montant_total = ?, tva = ?, montant_final = ?, updated_at = ? WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Invoice>(&sql)
        .bind(totals.montant_total)
        .bind(totals.tva)
        .bind(totals.montant_final)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice {id} not found")))
}

pub async fn set_status(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    from: InvoiceStatus,
    to: InvoiceStatus,
) -> RepoResult<Option<Invoice>> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE invoice SET statut = ?, updated_at = ? WHERE id = ? AND tenant_id = ? AND statut = ? RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, Invoice>(&sql)
        .bind(to)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .bind(from)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    super::delete_scoped(db, "invoice", tenant_id, id).await
}

// ── Lines ───────────────────────────────────────────────────────────

pub async fn lines(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    invoice_id: i64,
) -> RepoResult<Vec<InvoiceLine>> {
    let sql = format!(
        "SELECT {LINE_COLUMNS} FROM invoice_line WHERE tenant_id = ? AND invoice_id = ? ORDER BY id"
    );
    let rows = sqlx::query_as::<_, InvoiceLine>(&sql)
        .bind(tenant_id)
        .bind(invoice_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert_line(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    invoice_id: i64,
    line: &InvoiceLineInput,
    montant: f64,
) -> RepoResult<InvoiceLine> {
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO invoice_line (id, tenant_id, invoice_id, product_id, designation, quantite, prix_unitaire, montant) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {LINE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, InvoiceLine>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(invoice_id)
        .bind(&line.product_id)
        .bind(&line.designation)
        .bind(line.quantite)
        .bind(line.prix_unitaire)
        .bind(montant)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn delete_lines(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    invoice_id: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM invoice_line WHERE tenant_id = ? AND invoice_id = ?")
        .bind(tenant_id)
        .bind(invoice_id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected())
}
