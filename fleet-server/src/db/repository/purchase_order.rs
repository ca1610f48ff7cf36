//! Purchase Order Repository (commandes + lines)

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{
    PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, PurchaseOrderUpdate,
};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, numero, fournisseur, date_commande, date_livraison_prevue, statut, remise_pourcent, montant_total, montant_final, observations, created_at, updated_at";
const LINE_COLUMNS: &str =
    "id, order_id, product_id, designation, categorie, quantite, prix_unitaire, montant_ligne";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: Option<PurchaseOrderStatus>,
) -> RepoResult<Vec<PurchaseOrder>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM purchase_order WHERE tenant_id = ?1 AND (?2 IS NULL OR statut = ?2) ORDER BY date_commande DESC, numero DESC"
    );
    let rows = sqlx::query_as::<_, PurchaseOrder>(&sql)
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
) -> RepoResult<Option<PurchaseOrder>> {
    let sql = format!("SELECT {COLUMNS} FROM purchase_order WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, PurchaseOrder>(&sql)
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
        "SELECT numero FROM purchase_order WHERE tenant_id = ?1 AND substr(numero, 1, length(?2)) = ?2 \
         ORDER BY length(numero) DESC, numero DESC LIMIT 1",
    )
    .bind(tenant_id)
    .bind(prefix)
    .fetch_optional(db)
    .await?;
    Ok(numero)
}

/// Order header to insert
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub numero: &'a str,
    pub fournisseur: &'a str,
    pub date_commande: NaiveDate,
    pub date_livraison_prevue: Option<NaiveDate>,
    pub remise_pourcent: f64,
    pub observations: &'a str,
}

pub async fn insert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    order: &NewOrder<'_>,
) -> RepoResult<PurchaseOrder> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO purchase_order (id, tenant_id, numero, fournisseur, date_commande, date_livraison_prevue, statut, remise_pourcent, montant_total, montant_final, observations, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'Brouillon', ?7, 0, 0, ?8, ?9, ?9) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, PurchaseOrder>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(order.numero)
        .bind(order.fournisseur)
        .bind(order.date_commande)
        .bind(order.date_livraison_prevue)
        .bind(order.remise_pourcent)
        .bind(order.observations)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Order number '{}' already exists", order.numero))
            }
            other => other,
        })
}

pub async fn update_header(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &PurchaseOrderUpdate,
) -> RepoResult<PurchaseOrder> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE purchase_order SET fournisseur = COALESCE(?1, fournisseur), date_livraison_prevue = COALESCE(?2, date_livraison_prevue), remise_pourcent = COALESCE(?3, remise_pourcent), observations = COALESCE(?4, observations), updated_at = ?5 \
         WHERE id = ?6 AND tenant_id = ?7 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, PurchaseOrder>(&sql)
        .bind(&data.fournisseur)
        .bind(data.date_livraison_prevue)
        .bind(data.remise_pourcent)
        .bind(&data.observations)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Purchase order {id} not found")))
}

pub async fn set_totals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    montant_total: f64,
    montant_final: f64,
) -> RepoResult<PurchaseOrder> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE purchase_order SET montant_total = ?, montant_final = ?, updated_at = ? WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, PurchaseOrder>(&sql)
        .bind(montant_total)
        .bind(montant_final)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Purchase order {id} not found")))
}

/// Compare-and-set on the status column
pub async fn set_status(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    from: PurchaseOrderStatus,
    to: PurchaseOrderStatus,
) -> RepoResult<Option<PurchaseOrder>> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE purchase_order SET statut = ?, updated_at = ? WHERE id = ? AND tenant_id = ? AND statut = ? RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, PurchaseOrder>(&sql)
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
    super::delete_scoped(db, "purchase_order", tenant_id, id).await
}

// ── Lines ───────────────────────────────────────────────────────────

pub async fn lines(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    order_id: i64,
) -> RepoResult<Vec<PurchaseOrderLine>> {
    let sql = format!(
        "SELECT {LINE_COLUMNS} FROM purchase_order_line WHERE tenant_id = ? AND order_id = ? ORDER BY id"
    );
    let rows = sqlx::query_as::<_, PurchaseOrderLine>(&sql)
        .bind(tenant_id)
        .bind(order_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Line with its snapshot fields resolved
#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_id: String,
    pub designation: String,
    pub categorie: String,
    pub quantite: i64,
    pub prix_unitaire: f64,
    pub montant_ligne: f64,
}

pub async fn insert_line(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    order_id: i64,
    line: &NewLine,
) -> RepoResult<PurchaseOrderLine> {
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO purchase_order_line (id, tenant_id, order_id, product_id, designation, categorie, quantite, prix_unitaire, montant_ligne) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {LINE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PurchaseOrderLine>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(order_id)
        .bind(&line.product_id)
        .bind(&line.designation)
        .bind(&line.categorie)
        .bind(line.quantite)
        .bind(line.prix_unitaire)
        .bind(line.montant_ligne)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn delete_lines(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    order_id: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM purchase_order_line WHERE tenant_id = ? AND order_id = ?")
        .bind(tenant_id)
        .bind(order_id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected())
}
