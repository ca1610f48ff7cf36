//! Bulk tenant purges used by the management commands

use super::RepoResult;
use sqlx::{Executor, Sqlite};

/// Inventory tables, children first
pub const INVENTORY_TABLES: &[&str] = &[
    "purchase_order_line",
    "purchase_order",
    "invoice_line",
    "invoice",
    "stock_movement",
    "stock_exit",
    "stock_entry",
    "product",
];

/// Employee tables, children first
pub const EMPLOYEE_TABLES: &[&str] = &[
    "attendance",
    "overtime",
    "mileage",
    "payroll",
    "salary_config",
    "monthly_archive",
    "employee",
];

/// Delete every row of `table` owned by the tenant.
///
/// `table` must come from one of the constant lists above.
pub async fn delete_tenant_rows(
    db: impl Executor<'_, Database = Sqlite>,
    table: &str,
    tenant_id: &str,
) -> RepoResult<u64> {
    let sql = format!("DELETE FROM {table} WHERE tenant_id = ?");
    let rows = sqlx::query(&sql).bind(tenant_id).execute(db).await?;
    Ok(rows.rows_affected())
}

pub async fn count_tenant_rows(
    db: impl Executor<'_, Database = Sqlite>,
    table: &str,
    tenant_id: &str,
) -> RepoResult<u64> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE tenant_id = ?");
    let count: i64 = sqlx::query_scalar(&sql).bind(tenant_id).fetch_one(db).await?;
    Ok(count.max(0) as u64)
}
