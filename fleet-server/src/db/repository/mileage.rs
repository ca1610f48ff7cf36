//! Mileage Allowance Repository (frais kilométriques)

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{Mileage, MileageInput};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str =
    "id, employee_id, date, km_parcourus, valeur_km, total_a_payer, description, created_at";

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Mileage>> {
    let sql = format!("SELECT {COLUMNS} FROM mileage WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Mileage>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_between(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: Option<i64>,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<Mileage>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM mileage WHERE tenant_id = ?1 AND (?2 IS NULL OR employee_id = ?2) AND date BETWEEN ?3 AND ?4 ORDER BY employee_id, date"
    );
    let rows = sqlx::query_as::<_, Mileage>(&sql)
        .bind(tenant_id)
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &MileageInput,
    total_a_payer: f64,
) -> RepoResult<Mileage> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO mileage (id, tenant_id, employee_id, date, km_parcourus, valeur_km, total_a_payer, description, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, Mileage>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(data.employee_id)
        .bind(data.date)
        .bind(data.km_parcourus)
        .bind(data.valeur_km)
        .bind(total_a_payer)
        .bind(&data.description)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &MileageInput,
    total_a_payer: f64,
) -> RepoResult<Mileage> {
    let sql = format!(
        "UPDATE mileage SET employee_id = ?, date = ?, km_parcourus = ?, valeur_km = ?, total_a_payer = ?, description = ? WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Mileage>(&sql)
        .bind(data.employee_id)
        .bind(data.date)
        .bind(data.km_parcourus)
        .bind(data.valeur_km)
        .bind(total_a_payer)
        .bind(&data.description)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Mileage {id} not found")))
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Mileage> {
    let sql = format!("DELETE FROM mileage WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}");
    sqlx::query_as::<_, Mileage>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Mileage {id} not found")))
}
