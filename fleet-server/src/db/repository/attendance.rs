//! Attendance Repository (pointage)

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{Attendance, AttendanceStatus};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, employee_id, date, statut, created_at";

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Attendance>> {
    let sql = format!("SELECT {COLUMNS} FROM attendance WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Attendance>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Rows within `[from, to]`, optionally for one employee
pub async fn find_between(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: Option<i64>,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<Attendance>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM attendance WHERE tenant_id = ?1 AND (?2 IS NULL OR employee_id = ?2) AND date BETWEEN ?3 AND ?4 ORDER BY employee_id, date"
    );
    let rows = sqlx::query_as::<_, Attendance>(&sql)
        .bind(tenant_id)
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Status codes of one employee within `[from, to]`
pub async fn statuses_between(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<AttendanceStatus>> {
    let rows = sqlx::query_scalar::<_, AttendanceStatus>(
        "SELECT statut FROM attendance WHERE tenant_id = ? AND employee_id = ? AND date BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Insert or replace the status of `(employee, date)`
pub async fn upsert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
    date: NaiveDate,
    statut: AttendanceStatus,
) -> RepoResult<Attendance> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO attendance (id, tenant_id, employee_id, date, statut, created_at) VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT (employee_id, date) DO UPDATE SET statut = excluded.statut RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, Attendance>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(employee_id)
        .bind(date)
        .bind(statut)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Delete one row, returning it so callers can re-sync its month
pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Attendance> {
    let sql = format!("DELETE FROM attendance WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}");
    sqlx::query_as::<_, Attendance>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Attendance {id} not found")))
}

pub async fn delete_between(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM attendance WHERE tenant_id = ? AND date BETWEEN ? AND ?")
        .bind(tenant_id)
        .bind(from)
        .bind(to)
        .execute(db)
        .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_employee, test_pool};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_day() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;

        let first = upsert(&pool, TENANT, e.id, day(3), AttendanceStatus::PresentFull)
            .await
            .unwrap();
        let second = upsert(&pool, TENANT, e.id, day(3), AttendanceStatus::Absent)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.statut, AttendanceStatus::Absent);

        let rows = find_between(&pool, TENANT, Some(e.id), day(1), day(31)).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn statuses_are_typed() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        upsert(&pool, TENANT, e.id, day(1), AttendanceStatus::PresentAm).await.unwrap();
        upsert(&pool, TENANT, e.id, day(2), AttendanceStatus::SundayFull).await.unwrap();
        upsert(&pool, TENANT, e.id, day(3), AttendanceStatus::SickPaid).await.unwrap();

        let mut statuses = statuses_between(&pool, TENANT, e.id, day(1), day(31)).await.unwrap();
        statuses.sort();
        assert_eq!(
            statuses,
            vec![
                AttendanceStatus::PresentAm,
                AttendanceStatus::SundayFull,
                AttendanceStatus::SickPaid
            ]
        );
    }

    #[tokio::test]
    async fn delete_is_tenant_scoped() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        let row = upsert(&pool, TENANT, e.id, day(4), AttendanceStatus::Off).await.unwrap();

        assert!(matches!(
            delete(&pool, OTHER_TENANT, row.id).await.unwrap_err(),
            RepoError::NotFound(_)
        ));
        let deleted = delete(&pool, TENANT, row.id).await.unwrap();
        assert_eq!(deleted.date, day(4));
        assert!(find_by_id(&pool, TENANT, row.id).await.unwrap().is_none());
    }
}
