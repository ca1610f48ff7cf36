//! Employee and salary-config writes
//!
//! Rates and salary configs feed every statement of the employee, so each
//! write rebuilds the statements that already exist before committing.

use shared::error::{AppError, ErrorCode};
use shared::models::{Employee, EmployeeUpdate, SalaryConfig, SalaryConfigInput};
use sqlx::SqlitePool;

use super::{found, payroll};
use crate::db::repository::{RepoError, employee, salary_config};
use crate::error::{ServiceError, ServiceResult};

fn employee_not_found(id: i64) -> ServiceError {
    ServiceError::App(AppError::with_message(
        ErrorCode::EmployeeNotFound,
        format!("Employee {id} not found"),
    ))
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: EmployeeUpdate,
) -> ServiceResult<Employee> {
    let mut tx = pool.begin().await?;
    let emp = employee::update(&mut *tx, tenant_id, id, data)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => employee_not_found(id),
            RepoError::Duplicate(msg) => {
                ServiceError::App(AppError::with_message(ErrorCode::MatriculeExists, msg))
            }
            other => other.into(),
        })?;
    let resynced = payroll::resync_existing(&mut tx, tenant_id, &emp).await?;
    tx.commit().await?;

    tracing::info!(tenant_id, employee_id = id, resynced, "Employee updated");
    Ok(emp)
}

/// Insert or replace the config line for a status
pub async fn upsert_salary_config(
    pool: &SqlitePool,
    tenant_id: &str,
    employee_id: i64,
    input: &SalaryConfigInput,
) -> ServiceResult<SalaryConfig> {
    let mut tx = pool.begin().await?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {employee_id}"),
    )?;
    let config = salary_config::upsert(&mut *tx, tenant_id, emp.id, input).await?;
    payroll::resync_existing(&mut tx, tenant_id, &emp).await?;
    tx.commit().await?;
    Ok(config)
}

pub async fn delete_salary_config(
    pool: &SqlitePool,
    tenant_id: &str,
    employee_id: i64,
    config_id: i64,
) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    let emp = employee::find_by_id(&mut *tx, tenant_id, employee_id)
        .await?
        .ok_or_else(|| employee_not_found(employee_id))?;
    salary_config::delete(&mut *tx, tenant_id, emp.id, config_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => ServiceError::App(AppError::with_message(
                ErrorCode::NotFound,
                format!("Salary config {config_id} not found"),
            )),
            other => other.into(),
        })?;
    payroll::resync_existing(&mut tx, tenant_id, &emp).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::payroll as payroll_repo;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_employee, test_pool};
    use crate::services::attendance;
    use chrono::NaiveDate;
    use shared::models::{AttendanceInput, AttendanceStatus};

    async fn present(pool: &SqlitePool, employee_id: i64, d: u32) {
        attendance::record(
            pool,
            TENANT,
            &AttendanceInput {
                employee_id,
                date: NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
                statut: AttendanceStatus::PresentFull,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn raising_the_daily_rate_updates_existing_payroll() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        present(&pool, e.id, 3).await;
        present(&pool, e.id, 4).await;

        let before = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.montant_jours_travailles, 100_000.0);

        update(
            &pool,
            TENANT,
            e.id,
            EmployeeUpdate {
                salaire_journalier: Some(60_000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.montant_jours_travailles, 120_000.0);
        assert_eq!(after.salaire_brut, 120_000.0);
    }

    #[tokio::test]
    async fn salary_config_changes_resync_payroll() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        present(&pool, e.id, 3).await;

        let config = upsert_salary_config(
            &pool,
            TENANT,
            e.id,
            &SalaryConfigInput {
                statut_presence: AttendanceStatus::PresentFull,
                montant_journalier: 70_000.0,
                actif: true,
            },
        )
        .await
        .unwrap();
        let p = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.montant_jours_travailles, 70_000.0);

        delete_salary_config(&pool, TENANT, e.id, config.id).await.unwrap();
        let p = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025)
            .await
            .unwrap()
            .unwrap();
        // back to the flat daily rate
        assert_eq!(p.montant_jours_travailles, 50_000.0);
    }

    #[tokio::test]
    async fn update_without_payroll_creates_none() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        update(
            &pool,
            TENANT,
            e.id,
            EmployeeUpdate {
                salaire_journalier: Some(60_000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let periods = payroll_repo::periods_for_employee(&pool, TENANT, e.id).await.unwrap();
        assert!(periods.is_empty());
    }

    #[tokio::test]
    async fn other_tenant_cannot_update() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        let err = update(&pool, OTHER_TENANT, e.id, EmployeeUpdate::default())
            .await
            .unwrap_err();
        match err {
            ServiceError::App(app) => assert_eq!(app.code, ErrorCode::EmployeeNotFound),
            other => panic!("unexpected error: {other}"),
        }
    }
}
