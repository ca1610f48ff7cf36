//! Vehicle Rental Repository
//!
//! Suppliers, rentals, daily work logs (feuilles de pontage) and rental
//! invoices.

use super::{RepoError, RepoResult, delete_scoped};
use chrono::NaiveDate;
use shared::models::{
    DailyLog, DailyLogInput, DailyLogStatus, Rental, RentalInput, RentalInvoice, RentalInvoiceStatus,
    RentalStatus,
    RentalSupplier, RentalSupplierInput,
};
use sqlx::{Executor, Sqlite};

const SUPPLIER_COLUMNS: &str = "id, nom, contact, telephone, email, adresse, created_at";
const RENTAL_COLUMNS: &str = "id, vehicle_id, supplier_id, type_location, date_debut, date_fin, tarif_journalier, statut, observations, created_at, updated_at";
const LOG_COLUMNS: &str = "id, rental_id, date, statut, commentaire";
const INVOICE_COLUMNS: &str = "id, rental_id, numero, date_facture, montant_ht, tva, montant_ttc, statut, jours_travail, jours_non_travail, created_at";

// ── Suppliers ───────────────────────────────────────────────────────

pub async fn list_suppliers(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<Vec<RentalSupplier>> {
    let sql =
        format!("SELECT {SUPPLIER_COLUMNS} FROM rental_supplier WHERE tenant_id = ? ORDER BY nom");
    let rows = sqlx::query_as::<_, RentalSupplier>(&sql)
        .bind(tenant_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_supplier(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<RentalSupplier>> {
    let sql =
        format!("SELECT {SUPPLIER_COLUMNS} FROM rental_supplier WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, RentalSupplier>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_supplier_by_name(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    nom: &str,
) -> RepoResult<Option<RentalSupplier>> {
    let sql =
        format!("SELECT {SUPPLIER_COLUMNS} FROM rental_supplier WHERE tenant_id = ? AND nom = ?");
    let row = sqlx::query_as::<_, RentalSupplier>(&sql)
        .bind(tenant_id)
        .bind(nom)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create_supplier(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &RentalSupplierInput,
) -> RepoResult<RentalSupplier> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO rental_supplier (id, tenant_id, nom, contact, telephone, email, adresse, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {SUPPLIER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, RentalSupplier>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.nom)
        .bind(&data.contact)
        .bind(&data.telephone)
        .bind(&data.email)
        .bind(&data.adresse)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_supplier(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &RentalSupplierInput,
) -> RepoResult<RentalSupplier> {
    let sql = format!(
        "UPDATE rental_supplier SET nom = ?, contact = ?, telephone = ?, email = ?, adresse = ? WHERE id = ? AND tenant_id = ? RETURNING {SUPPLIER_COLUMNS}"
    );
    sqlx::query_as::<_, RentalSupplier>(&sql)
        .bind(&data.nom)
        .bind(&data.contact)
        .bind(&data.telephone)
        .bind(&data.email)
        .bind(&data.adresse)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Supplier {id} not found")))
}

pub async fn delete_supplier(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    delete_scoped(db, "rental_supplier", tenant_id, id).await
}

// ── Rentals ─────────────────────────────────────────────────────────

pub async fn list_rentals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: Option<RentalStatus>,
) -> RepoResult<Vec<Rental>> {
    let sql = format!(
        "SELECT {RENTAL_COLUMNS} FROM rental WHERE tenant_id = ?1 AND (?2 IS NULL OR statut = ?2) ORDER BY date_debut DESC"
    );
    let rows = sqlx::query_as::<_, Rental>(&sql)
        .bind(tenant_id)
        .bind(statut)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Rentals whose period intersects `[from, to]`
pub async fn rentals_overlapping(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<Rental>> {
    let sql = format!(
        "SELECT {RENTAL_COLUMNS} FROM rental WHERE tenant_id = ? AND date_debut <= ? AND (date_fin IS NULL OR date_fin >= ?) ORDER BY id"
    );
    let rows = sqlx::query_as::<_, Rental>(&sql)
        .bind(tenant_id)
        .bind(to)
        .bind(from)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_rental(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Rental>> {
    let sql = format!("SELECT {RENTAL_COLUMNS} FROM rental WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Rental>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create_rental(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &RentalInput,
) -> RepoResult<Rental> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO rental (id, tenant_id, vehicle_id, supplier_id, type_location, date_debut, date_fin, tarif_journalier, statut, observations, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11) RETURNING {RENTAL_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Rental>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.vehicle_id)
        .bind(data.supplier_id)
        .bind(data.type_location)
        .bind(data.date_debut)
        .bind(data.date_fin)
        .bind(data.tarif_journalier)
        .bind(data.statut)
        .bind(&data.observations)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_rental(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &RentalInput,
) -> RepoResult<Rental> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE rental SET vehicle_id = ?, supplier_id = ?, type_location = ?, date_debut = ?, date_fin = ?, tarif_journalier = ?, statut = ?, observations = ?, updated_at = ? \
         WHERE id = ? AND tenant_id = ? RETURNING {RENTAL_COLUMNS}"
    );
    sqlx::query_as::<_, Rental>(&sql)
        .bind(&data.vehicle_id)
        .bind(data.supplier_id)
        .bind(data.type_location)
        .bind(data.date_debut)
        .bind(data.date_fin)
        .bind(data.tarif_journalier)
        .bind(data.statut)
        .bind(&data.observations)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Rental {id} not found")))
}

pub async fn delete_rental(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    delete_scoped(db, "rental", tenant_id, id).await
}

pub async fn count_rentals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: RentalStatus,
) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rental WHERE tenant_id = ? AND statut = ?")
        .bind(tenant_id)
        .bind(statut)
        .fetch_one(db)
        .await?;
    Ok(n)
}

// ── Daily logs ──────────────────────────────────────────────────────

pub async fn list_logs(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    rental_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<DailyLog>> {
    let sql = format!(
        "SELECT {LOG_COLUMNS} FROM rental_daily_log WHERE tenant_id = ? AND rental_id = ? AND date BETWEEN ? AND ? ORDER BY date"
    );
    let rows = sqlx::query_as::<_, DailyLog>(&sql)
        .bind(tenant_id)
        .bind(rental_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Insert or replace the log of `(rental, date)`
pub async fn upsert_log(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    rental_id: i64,
    data: &DailyLogInput,
) -> RepoResult<DailyLog> {
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO rental_daily_log (id, tenant_id, rental_id, date, statut, commentaire) VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT (rental_id, date) DO UPDATE SET statut = excluded.statut, commentaire = excluded.commentaire RETURNING {LOG_COLUMNS}"
    );
    let row = sqlx::query_as::<_, DailyLog>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(rental_id)
        .bind(data.date)
        .bind(data.statut)
        .bind(&data.commentaire)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn delete_log(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    delete_scoped(db, "rental_daily_log", tenant_id, id).await
}

/// Logs of one rental with `statut` within `[from, to]`
pub async fn count_rental_logs(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    rental_id: i64,
    statut: DailyLogStatus,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM rental_daily_log WHERE tenant_id = ? AND rental_id = ? AND statut = ? AND date BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(rental_id)
    .bind(statut)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(n)
}

/// Tenant-wide logs with `statut` within `[from, to]`
pub async fn count_logs(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: DailyLogStatus,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM rental_daily_log WHERE tenant_id = ? AND statut = ? AND date BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(statut)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(n)
}

/// Σ daily rate over logs with `statut` within `[from, to]`
pub async fn sum_tarif_for_logs(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: DailyLogStatus,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(r.tarif_journalier), 0.0) FROM rental_daily_log l JOIN rental r ON r.id = l.rental_id \
         WHERE l.tenant_id = ? AND l.statut = ? AND l.date BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(statut)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(total)
}

// ── Rental invoices ─────────────────────────────────────────────────

pub async fn list_invoices(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    rental_id: Option<i64>,
) -> RepoResult<Vec<RentalInvoice>> {
    let sql = format!(
        "SELECT {INVOICE_COLUMNS} FROM rental_invoice WHERE tenant_id = ?1 AND (?2 IS NULL OR rental_id = ?2) ORDER BY date_facture DESC, numero DESC"
    );
    let rows = sqlx::query_as::<_, RentalInvoice>(&sql)
        .bind(tenant_id)
        .bind(rental_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_invoice_by_numero(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    numero: &str,
) -> RepoResult<Option<RentalInvoice>> {
    let sql = format!(
        "SELECT {INVOICE_COLUMNS} FROM rental_invoice WHERE tenant_id = ? AND numero = ?"
    );
    let row = sqlx::query_as::<_, RentalInvoice>(&sql)
        .bind(tenant_id)
        .bind(numero)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_invoice(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<RentalInvoice>> {
    let sql = format!("SELECT {INVOICE_COLUMNS} FROM rental_invoice WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, RentalInvoice>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Move from `from` to `to`; `None` when the stored status is no longer `from`
pub async fn set_invoice_status(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    from: RentalInvoiceStatus,
    to: RentalInvoiceStatus,
) -> RepoResult<Option<RentalInvoice>> {
    let sql = format!(
        "UPDATE rental_invoice SET statut = ? WHERE id = ? AND tenant_id = ? AND statut = ? RETURNING {INVOICE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, RentalInvoice>(&sql)
        .bind(to)
        .bind(id)
        .bind(tenant_id)
        .bind(from)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Figures of one rental invoice
#[derive(Debug, Clone, PartialEq)]
pub struct RentalInvoiceFigures {
    pub numero: String,
    pub date_facture: NaiveDate,
    pub montant_ht: f64,
    pub tva: f64,
    pub montant_ttc: f64,
    pub jours_travail: i64,
    pub jours_non_travail: i64,
}

pub async fn insert_invoice(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    rental_id: i64,
    figures: &RentalInvoiceFigures,
) -> RepoResult<RentalInvoice> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO rental_invoice (id, tenant_id, rental_id, numero, date_facture, montant_ht, tva, montant_ttc, statut, jours_travail, jours_non_travail, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'Brouillon', ?, ?, ?) RETURNING {INVOICE_COLUMNS}"
    );
    sqlx::query_as::<_, RentalInvoice>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(rental_id)
        .bind(&figures.numero)
        .bind(figures.date_facture)
        .bind(figures.montant_ht)
        .bind(figures.tva)
        .bind(figures.montant_ttc)
        .bind(figures.jours_travail)
        .bind(figures.jours_non_travail)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Invoice '{}' already exists", figures.numero))
            }
            other => other,
        })
}

/// Refresh the amounts of an existing invoice, keyed by number
pub async fn update_invoice_figures(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    figures: &RentalInvoiceFigures,
) -> RepoResult<RentalInvoice> {
    let sql = format!(
        "UPDATE rental_invoice SET date_facture = ?, montant_ht = ?, tva = ?, montant_ttc = ?, jours_travail = ?, jours_non_travail = ? \
         WHERE tenant_id = ? AND numero = ? RETURNING {INVOICE_COLUMNS}"
    );
    sqlx::query_as::<_, RentalInvoice>(&sql)
        .bind(figures.date_facture)
        .bind(figures.montant_ht)
        .bind(figures.tva)
        .bind(figures.montant_ttc)
        .bind(figures.jours_travail)
        .bind(figures.jours_non_travail)
        .bind(tenant_id)
        .bind(&figures.numero)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Invoice '{}' not found", figures.numero)))
}
