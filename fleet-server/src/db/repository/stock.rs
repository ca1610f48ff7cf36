//! Stock Ledger Repository (entries, exits, movements)
//!
//! Balance rules live in `services::stock`; these functions only persist
//! the figures they are given.

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{
    MovementType, StockEntry, StockEntryInput, StockExit, StockExitInput, StockMovement,
};
use sqlx::{Executor, Sqlite};

const ENTRY_COLUMNS: &str = "id, product_id, date, quantite, prix_unitaire, fournisseur, reference_facture, stock_avant, stock_apres, created_at";
const EXIT_COLUMNS: &str =
    "id, product_id, date, quantite, destination, motif, stock_avant, stock_apres, created_at";
const MOVEMENT_COLUMNS: &str = "id, product_id, date, type_mouvement, quantite, stock_avant, stock_apres, reference_id, observations, created_at";

/// Before/after balance of one ledger write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub avant: i64,
    pub apres: i64,
}

/// Σ entries − Σ exits for one product
pub async fn current_stock(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    product_id: &str,
) -> RepoResult<i64> {
    let stock: i64 = sqlx::query_scalar(
        "SELECT (SELECT COALESCE(SUM(quantite), 0) FROM stock_entry WHERE tenant_id = ?1 AND product_id = ?2) \
         - (SELECT COALESCE(SUM(quantite), 0) FROM stock_exit WHERE tenant_id = ?1 AND product_id = ?2)",
    )
    .bind(tenant_id)
    .bind(product_id)
    .fetch_one(db)
    .await?;
    Ok(stock)
}

// ── Entries ─────────────────────────────────────────────────────────

pub async fn list_entries(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    product_id: Option<&str>,
) -> RepoResult<Vec<StockEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM stock_entry WHERE tenant_id = ?1 AND (?2 IS NULL OR product_id = ?2) ORDER BY date DESC, created_at DESC"
    );
    let rows = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_entry(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<StockEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM stock_entry WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert_entry(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &StockEntryInput,
    balance: Balance,
) -> RepoResult<StockEntry> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO stock_entry (id, tenant_id, product_id, date, quantite, prix_unitaire, fournisseur, reference_facture, stock_avant, stock_apres, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {ENTRY_COLUMNS}"
    );
    let row = sqlx::query_as::<_, StockEntry>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.product_id)
        .bind(data.date)
        .bind(data.quantite)
        .bind(data.prix_unitaire)
        .bind(&data.fournisseur)
        .bind(&data.reference_facture)
        .bind(balance.avant)
        .bind(balance.apres)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_entry(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &StockEntryInput,
    balance: Balance,
) -> RepoResult<StockEntry> {
    let sql = format!(
        "UPDATE stock_entry SET product_id = ?, date = ?, quantite = ?, prix_unitaire = ?, fournisseur = ?, reference_facture = ?, stock_avant = ?, stock_apres = ? WHERE id = ? AND tenant_id = ? RETURNING {ENTRY_COLUMNS}"
    );
    sqlx::query_as::<_, StockEntry>(&sql)
        .bind(&data.product_id)
        .bind(data.date)
        .bind(data.quantite)
        .bind(data.prix_unitaire)
        .bind(&data.fournisseur)
        .bind(&data.reference_facture)
        .bind(balance.avant)
        .bind(balance.apres)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Stock entry {id} not found")))
}

pub async fn delete_entry(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<StockEntry> {
    let sql =
        format!("DELETE FROM stock_entry WHERE id = ? AND tenant_id = ? RETURNING {ENTRY_COLUMNS}");
    sqlx::query_as::<_, StockEntry>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Stock entry {id} not found")))
}

// ── Exits ───────────────────────────────────────────────────────────

pub async fn list_exits(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    product_id: Option<&str>,
) -> RepoResult<Vec<StockExit>> {
    let sql = format!(
        "SELECT {EXIT_COLUMNS} FROM stock_exit WHERE tenant_id = ?1 AND (?2 IS NULL OR product_id = ?2) ORDER BY date DESC, created_at DESC"
    );
    let rows = sqlx::query_as::<_, StockExit>(&sql)
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_exit(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<StockExit>> {
    let sql = format!("SELECT {EXIT_COLUMNS} FROM stock_exit WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, StockExit>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert_exit(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &StockExitInput,
    balance: Balance,
) -> RepoResult<StockExit> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO stock_exit (id, tenant_id, product_id, date, quantite, destination, motif, stock_avant, stock_apres, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {EXIT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, StockExit>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.product_id)
        .bind(data.date)
        .bind(data.quantite)
        .bind(&data.destination)
        .bind(&data.motif)
        .bind(balance.avant)
        .bind(balance.apres)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_exit(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &StockExitInput,
    balance: Balance,
) -> RepoResult<StockExit> {
    let sql = format!(
        "UPDATE stock_exit SET product_id = ?, date = ?, quantite = ?, destination = ?, motif = ?, stock_avant = ?, stock_apres = ? WHERE id = ? AND tenant_id = ? RETURNING {EXIT_COLUMNS}"
    );
    sqlx::query_as::<_, StockExit>(&sql)
        .bind(&data.product_id)
        .bind(data.date)
        .bind(data.quantite)
        .bind(&data.destination)
        .bind(&data.motif)
        .bind(balance.avant)
        .bind(balance.apres)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Stock exit {id} not found")))
}

pub async fn delete_exit(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<StockExit> {
    let sql =
        format!("DELETE FROM stock_exit WHERE id = ? AND tenant_id = ? RETURNING {EXIT_COLUMNS}");
    sqlx::query_as::<_, StockExit>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Stock exit {id} not found")))
}

// ── Movements ───────────────────────────────────────────────────────

/// One ledger movement to record
#[derive(Debug, Clone)]
pub struct NewMovement<'a> {
    pub product_id: &'a str,
    pub date: NaiveDate,
    pub type_mouvement: MovementType,
    pub quantite: i64,
    pub balance: Balance,
    pub reference_id: Option<i64>,
    pub observations: String,
}

pub async fn insert_movement(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    movement: &NewMovement<'_>,
) -> RepoResult<StockMovement> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO stock_movement (id, tenant_id, product_id, date, type_mouvement, quantite, stock_avant, stock_apres, reference_id, observations, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {MOVEMENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, StockMovement>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(movement.product_id)
        .bind(movement.date)
        .bind(movement.type_mouvement)
        .bind(movement.quantite)
        .bind(movement.balance.avant)
        .bind(movement.balance.apres)
        .bind(movement.reference_id)
        .bind(&movement.observations)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn list_movements(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    product_id: Option<&str>,
) -> RepoResult<Vec<StockMovement>> {
    let sql = format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movement WHERE tenant_id = ?1 AND (?2 IS NULL OR product_id = ?2) ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, StockMovement>(&sql)
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
