//! Mileage allowances (frais kilométriques)

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Employee, Mileage, MileageInput};
use sqlx::SqlitePool;

use super::{found, payroll};
use crate::db::repository::{RepoError, employee, mileage};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{to_decimal, to_f64};
use crate::utils::time::period_of;
use crate::utils::validation::validate_amount;

/// `km × rate`, the manual rate winning when positive
pub fn mileage_total(employee: &Employee, km: f64, manual_rate: f64) -> Decimal {
    let manual = to_decimal(manual_rate);
    let rate = if manual > Decimal::ZERO { manual } else { to_decimal(employee.valeur_km) };
    to_decimal(km) * rate
}

fn validate(input: &MileageInput) -> Result<(), AppError> {
    validate_amount(input.km_parcourus, "km_parcourus")?;
    validate_amount(input.valeur_km, "valeur_km")
}

fn not_found(id: i64) -> impl FnOnce(RepoError) -> ServiceError {
    move |e| match e {
        RepoError::NotFound(_) => ServiceError::App(AppError::with_message(
            ErrorCode::MileageNotFound,
            format!("Mileage {id} not found"),
        )),
        other => other.into(),
    }
}

pub async fn create(pool: &SqlitePool, tenant_id: &str, input: &MileageInput) -> ServiceResult<Mileage> {
    validate(input)?;
    let mut tx = pool.begin().await?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, input.employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {}", input.employee_id),
    )?;
    let total = to_f64(mileage_total(&emp, input.km_parcourus, input.valeur_km));
    let row = mileage::insert(&mut *tx, tenant_id, input, total).await?;
    let (mois, annee) = period_of(row.date);
    payroll::sync_payroll(&mut tx, tenant_id, &emp, mois, annee).await?;
    tx.commit().await?;
    Ok(row)
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &MileageInput,
) -> ServiceResult<Mileage> {
    validate(input)?;
    let mut tx = pool.begin().await?;
    let previous = found(
        mileage::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::MileageNotFound,
        format!("Mileage {id}"),
    )?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, input.employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {}", input.employee_id),
    )?;
    let total = to_f64(mileage_total(&emp, input.km_parcourus, input.valeur_km));
    let row = mileage::update(&mut *tx, tenant_id, id, input, total)
        .await
        .map_err(not_found(id))?;

    let (mois, annee) = period_of(row.date);
    payroll::sync_payroll(&mut tx, tenant_id, &emp, mois, annee).await?;
    let old_period = period_of(previous.date);
    if previous.employee_id != emp.id || old_period != (mois, annee) {
        payroll::sync_employee_id(&mut tx, tenant_id, previous.employee_id, old_period.0, old_period.1)
            .await?;
    }
    tx.commit().await?;
    Ok(row)
}

pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<Mileage> {
    let mut tx = pool.begin().await?;
    let removed = mileage::delete(&mut *tx, tenant_id, id).await.map_err(not_found(id))?;
    let (mois, annee) = period_of(removed.date);
    payroll::sync_employee_id(&mut tx, tenant_id, removed.employee_id, mois, annee).await?;
    tx.commit().await?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::payroll as payroll_repo;
    use crate::db::repository::testing::{TENANT, seed_employee, test_pool};
    use chrono::NaiveDate;

    fn input(employee_id: i64, km: f64, rate: f64) -> MileageInput {
        MileageInput {
            employee_id,
            date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            km_parcourus: km,
            valeur_km: rate,
            description: "Conakry - Kindia".into(),
        }
    }

    #[tokio::test]
    async fn total_uses_employee_rate_unless_overridden() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;

        let first = create(&pool, TENANT, &input(e.id, 120.0, 0.0)).await.unwrap();
        assert_eq!(first.total_a_payer, 60_000.0);
        let second = create(&pool, TENANT, &input(e.id, 10.0, 800.0)).await.unwrap();
        assert_eq!(second.total_a_payer, 8_000.0);

        let p = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025).await.unwrap().unwrap();
        assert_eq!(p.montant_frais_km, 68_000.0);
        assert_eq!(p.salaire_brut, 68_000.0);

        update(&pool, TENANT, second.id, &input(e.id, 20.0, 800.0)).await.unwrap();
        delete(&pool, TENANT, first.id).await.unwrap();
        let p = payroll_repo::find_for_period(&pool, TENANT, e.id, 3, 2025).await.unwrap().unwrap();
        assert_eq!(p.montant_frais_km, 16_000.0);
    }

    #[tokio::test]
    async fn negative_distance_is_rejected() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        let err = create(&pool, TENANT, &input(e.id, -5.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::ValidationFailed));
    }
}
