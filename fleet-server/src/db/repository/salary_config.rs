//! Salary Config Repository (per-status daily amounts)

use super::{RepoError, RepoResult};
use shared::models::{SalaryConfig, SalaryConfigInput};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, employee_id, statut_presence, montant_journalier, actif";

pub async fn find_for_employee(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
) -> RepoResult<Vec<SalaryConfig>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM salary_config WHERE tenant_id = ? AND employee_id = ? ORDER BY statut_presence"
    );
    let rows = sqlx::query_as::<_, SalaryConfig>(&sql)
        .bind(tenant_id)
        .bind(employee_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_active_for_employee(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
) -> RepoResult<Vec<SalaryConfig>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM salary_config WHERE tenant_id = ? AND employee_id = ? AND actif = 1"
    );
    let rows = sqlx::query_as::<_, SalaryConfig>(&sql)
        .bind(tenant_id)
        .bind(employee_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Employee ids that own at least one salary config line
pub async fn configured_employee_ids(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT employee_id FROM salary_config WHERE tenant_id = ?",
    )
    .bind(tenant_id)
    .fetch_all(db)
    .await?;
    Ok(ids)
}

/// Insert or replace the line for `(employee, statut_presence)`
pub async fn upsert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
    data: &SalaryConfigInput,
) -> RepoResult<SalaryConfig> {
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO salary_config (id, tenant_id, employee_id, statut_presence, montant_journalier, actif) VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON CONFLICT (employee_id, statut_presence) DO UPDATE SET montant_journalier = excluded.montant_journalier, actif = excluded.actif RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, SalaryConfig>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(employee_id)
        .bind(data.statut_presence)
        .bind(data.montant_journalier)
        .bind(data.actif)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
    id: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "DELETE FROM salary_config WHERE id = ? AND employee_id = ? AND tenant_id = ?",
    )
    .bind(id)
    .bind(employee_id)
    .bind(tenant_id)
    .execute(db)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Salary config {id} not found")));
    }
    Ok(())
}
