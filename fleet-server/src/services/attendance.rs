//! Attendance (pointage) workflows
//!
//! Every write re-synchronizes the employee's payroll for the affected
//! month in the same transaction.

use std::collections::BTreeSet;

use shared::error::{AppError, ErrorCode};
use shared::models::{Attendance, AttendanceInput, AttendanceStats, BulkAttendanceInput};
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{found, payroll};
use crate::db::repository::{RepoError, attendance, employee};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::time::{month_bounds, period_of};

/// Monthly counters of one employee
pub async fn monthly_stats(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
    mois: u32,
    annee: i32,
) -> ServiceResult<AttendanceStats> {
    let (first, last) = month_bounds(mois, annee)?;
    let statuses = attendance::statuses_between(db, tenant_id, employee_id, first, last).await?;
    Ok(AttendanceStats::tally(
        i64::from(shared::util::days_in_month(annee, mois)),
        statuses,
    ))
}

/// Record (or overwrite) one day
pub async fn record(
    pool: &SqlitePool,
    tenant_id: &str,
    input: &AttendanceInput,
) -> ServiceResult<Attendance> {
    let mut tx = pool.begin().await?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, input.employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {}", input.employee_id),
    )?;
    let row = attendance::upsert(&mut *tx, tenant_id, emp.id, input.date, input.statut).await?;
    let (mois, annee) = period_of(row.date);
    payroll::sync_payroll(&mut tx, tenant_id, &emp, mois, annee).await?;
    tx.commit().await?;
    Ok(row)
}

/// Record a grid of days for one employee in a single transaction
pub async fn bulk_record(
    pool: &SqlitePool,
    tenant_id: &str,
    input: &BulkAttendanceInput,
) -> ServiceResult<Vec<Attendance>> {
    if input.days.is_empty() {
        return Err(AppError::validation("days must not be empty").into());
    }
    let mut tx = pool.begin().await?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, input.employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {}", input.employee_id),
    )?;

    let mut rows = Vec::with_capacity(input.days.len());
    let mut periods = BTreeSet::new();
    for day in &input.days {
        rows.push(attendance::upsert(&mut *tx, tenant_id, emp.id, day.date, day.statut).await?);
        periods.insert(period_of(day.date));
    }
    for (mois, annee) in periods {
        payroll::sync_payroll(&mut tx, tenant_id, &emp, mois, annee).await?;
    }
    tx.commit().await?;

    tracing::info!(employee_id = emp.id, days = rows.len(), "Attendance grid recorded");
    Ok(rows)
}

pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<Attendance> {
    let mut tx = pool.begin().await?;
    let removed = attendance::delete(&mut *tx, tenant_id, id).await.map_err(|e| match e {
        RepoError::NotFound(_) => ServiceError::App(AppError::with_message(
            ErrorCode::AttendanceNotFound,
            format!("Attendance {id} not found"),
        )),
        other => other.into(),
    })?;
    let (mois, annee) = period_of(removed.date);
    payroll::sync_employee_id(&mut tx, tenant_id, removed.employee_id, mois, annee).await?;
    tx.commit().await?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::payroll as payroll_repo;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_employee, test_pool};
    use chrono::NaiveDate;
    use shared::models::{AttendanceDay, AttendanceStatus};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[tokio::test]
    async fn insert_and_delete_update_payroll_counters() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;

        let row = record(
            &pool,
            TENANT,
            &AttendanceInput {
                employee_id: e.id,
                date: day(3),
                statut: AttendanceStatus::PresentAm,
            },
        )
        .await
        .unwrap();
        let p = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025).await.unwrap().unwrap();
        assert_eq!(p.jours_presence, 1);
        assert_eq!(p.montant_jours_travailles, 50_000.0);

        delete(&pool, TENANT, row.id).await.unwrap();
        let p = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025).await.unwrap().unwrap();
        assert_eq!(p.jours_presence, 0);
        assert_eq!(p.salaire_brut, 0.0);
    }

    #[tokio::test]
    async fn bulk_grid_spanning_two_months() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        let input = BulkAttendanceInput {
            employee_id: e.id,
            days: vec![
                AttendanceDay { date: day(30), statut: AttendanceStatus::SundayFull },
                AttendanceDay { date: day(31), statut: AttendanceStatus::PresentFull },
                AttendanceDay {
                    date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                    statut: AttendanceStatus::Off,
                },
            ],
        };
        assert_eq!(bulk_record(&pool, TENANT, &input).await.unwrap().len(), 3);

        let march = monthly_stats(&pool, TENANT, e.id, 3, 2025).await.unwrap();
        assert_eq!((march.jours_presence, march.dimanches), (1, 1));
        let april = payroll_repo::find_for_period(&pool, TENANT, e.id, 4, 2025).await.unwrap().unwrap();
        assert_eq!(april.jours_repos, 1);
        assert_eq!(april.jours_mois, 30);
    }

    #[tokio::test]
    async fn other_tenant_employee_is_not_found() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, OTHER_TENANT, "EMP001").await;
        let err = record(
            &pool,
            TENANT,
            &AttendanceInput {
                employee_id: e.id,
                date: day(3),
                statut: AttendanceStatus::PresentFull,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::EmployeeNotFound));
        assert!(matches!(
            delete(&pool, TENANT, 42).await.unwrap_err(),
            ServiceError::App(ref a) if a.code == ErrorCode::AttendanceNotFound
        ));
    }
}
