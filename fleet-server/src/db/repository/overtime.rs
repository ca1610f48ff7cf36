//! Overtime Repository (heures supplémentaires)

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{DayType, Overtime};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, employee_id, date, heure_debut, heure_fin, type_jour, taux_horaire, duree, total_a_payer, created_at";

/// Overtime row with derived fields already computed
#[derive(Debug, Clone)]
pub struct OvertimeRow {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub heure_debut: String,
    pub heure_fin: String,
    pub type_jour: DayType,
    pub taux_horaire: f64,
    pub duree: f64,
    pub total_a_payer: f64,
}

fn map_duplicate(err: sqlx::Error, row: &OvertimeRow) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!(
            "Overtime already recorded for {} at {}",
            row.date, row.heure_debut
        )),
        other => other,
    }
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Overtime>> {
    let sql = format!("SELECT {COLUMNS} FROM overtime WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Overtime>(&sql)
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
) -> RepoResult<Vec<Overtime>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM overtime WHERE tenant_id = ?1 AND (?2 IS NULL OR employee_id = ?2) AND date BETWEEN ?3 AND ?4 ORDER BY employee_id, date, heure_debut"
    );
    let rows = sqlx::query_as::<_, Overtime>(&sql)
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
    row: &OvertimeRow,
) -> RepoResult<Overtime> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO overtime (id, tenant_id, employee_id, date, heure_debut, heure_fin, type_jour, taux_horaire, duree, total_a_payer, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Overtime>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(row.employee_id)
        .bind(row.date)
        .bind(&row.heure_debut)
        .bind(&row.heure_fin)
        .bind(row.type_jour)
        .bind(row.taux_horaire)
        .bind(row.duree)
        .bind(row.total_a_payer)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| map_duplicate(e, row))
}

pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    row: &OvertimeRow,
) -> RepoResult<Overtime> {
    let sql = format!(
        "UPDATE overtime SET employee_id = ?, date = ?, heure_debut = ?, heure_fin = ?, type_jour = ?, taux_horaire = ?, duree = ?, total_a_payer = ? WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Overtime>(&sql)
        .bind(row.employee_id)
        .bind(row.date)
        .bind(&row.heure_debut)
        .bind(&row.heure_fin)
        .bind(row.type_jour)
        .bind(row.taux_horaire)
        .bind(row.duree)
        .bind(row.total_a_payer)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await
        .map_err(|e| map_duplicate(e, row))?
        .ok_or_else(|| RepoError::NotFound(format!("Overtime {id} not found")))
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Overtime> {
    let sql = format!("DELETE FROM overtime WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}");
    sqlx::query_as::<_, Overtime>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Overtime {id} not found")))
}

pub async fn delete_between(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM overtime WHERE tenant_id = ? AND date BETWEEN ? AND ?")
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
    use crate::db::repository::testing::{TENANT, seed_employee, test_pool};

    fn row(employee_id: i64, start: &str) -> OvertimeRow {
        OvertimeRow {
            employee_id,
            date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            heure_debut: start.into(),
            heure_fin: "20:00".into(),
            type_jour: DayType::Ouvrable,
            taux_horaire: 0.0,
            duree: 2.0,
            total_a_payer: 20_000.0,
        }
    }

    #[tokio::test]
    async fn same_start_same_day_is_duplicate() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        insert(&pool, TENANT, &row(e.id, "18:00")).await.unwrap();
        let err = insert(&pool, TENANT, &row(e.id, "18:00")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        insert(&pool, TENANT, &row(e.id, "21:00")).await.unwrap();

        let from = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(find_between(&pool, TENANT, Some(e.id), from, to).await.unwrap().len(), 2);
        assert_eq!(delete_between(&pool, TENANT, from, to).await.unwrap(), 2);
    }
}
