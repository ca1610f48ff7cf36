//! Overtime (heures supplémentaires): duration, rate and payroll re-sync

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DayType, Employee, Overtime, OvertimeInput};
use sqlx::SqlitePool;

use super::{found, payroll};
use crate::db::repository::overtime::{self as repo, OvertimeRow};
use crate::db::repository::{RepoError, employee};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{round2, to_decimal, to_f64};
use crate::utils::time::{minutes_of_day, parse_clock, period_of};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Hours between two clock times, rolling over midnight when `end < start`
pub fn overtime_duration(start: &str, end: &str) -> AppResult<Decimal> {
    let from = minutes_of_day(parse_clock(start)?);
    let to = minutes_of_day(parse_clock(end)?);
    if from == to {
        return Err(AppError::with_message(
            ErrorCode::InvalidOvertimePeriod,
            format!("Start and end times are identical ({start})"),
        ));
    }
    let mut minutes = to - from;
    if minutes < 0 {
        minutes += MINUTES_PER_DAY;
    }
    Ok(round2(Decimal::from(minutes) / Decimal::from(60)))
}

/// Hourly rate: manual rate when positive, otherwise the employee's rate for the day type
pub fn overtime_rate(employee: &Employee, type_jour: DayType, manual: f64) -> Decimal {
    let manual = to_decimal(manual);
    if manual > Decimal::ZERO {
        manual
    } else if type_jour.is_premium() {
        to_decimal(employee.montant_heure_supp_dimanche_ferie)
    } else {
        to_decimal(employee.montant_heure_supp_jour_ouvrable)
    }
}

/// Derived row for an input, against its employee
pub fn build_row(employee: &Employee, input: &OvertimeInput) -> AppResult<OvertimeRow> {
    let duree = overtime_duration(&input.heure_debut, &input.heure_fin)?;
    let rate = overtime_rate(employee, input.type_jour, input.taux_horaire);
    Ok(OvertimeRow {
        employee_id: employee.id,
        date: input.date,
        heure_debut: input.heure_debut.trim().to_string(),
        heure_fin: input.heure_fin.trim().to_string(),
        type_jour: input.type_jour,
        taux_horaire: input.taux_horaire,
        duree: to_f64(duree),
        total_a_payer: to_f64(duree * rate),
    })
}

fn duplicate(err: RepoError) -> ServiceError {
    match err {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::OvertimeDuplicate, msg).into(),
        other => other.into(),
    }
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    input: &OvertimeInput,
) -> ServiceResult<Overtime> {
    let mut tx = pool.begin().await?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, input.employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {}", input.employee_id),
    )?;
    let row = build_row(&emp, input)?;
    let record = repo::insert(&mut *tx, tenant_id, &row).await.map_err(duplicate)?;

    let (mois, annee) = period_of(record.date);
    payroll::sync_payroll(&mut tx, tenant_id, &emp, mois, annee).await?;
    tx.commit().await?;

    tracing::info!(employee_id = emp.id, date = %record.date, duree = record.duree, "Overtime recorded");
    Ok(record)
}

/// Update a record; both the previous and the new month are re-synced
pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &OvertimeInput,
) -> ServiceResult<Overtime> {
    let mut tx = pool.begin().await?;
    let previous = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::OvertimeNotFound,
        format!("Overtime {id}"),
    )?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, input.employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {}", input.employee_id),
    )?;
    let row = build_row(&emp, input)?;
    let record = repo::update(&mut *tx, tenant_id, id, &row).await.map_err(duplicate)?;

    let (mois, annee) = period_of(record.date);
    payroll::sync_payroll(&mut tx, tenant_id, &emp, mois, annee).await?;
    let old_period = period_of(previous.date);
    if previous.employee_id != emp.id || old_period != (mois, annee) {
        payroll::sync_employee_id(&mut tx, tenant_id, previous.employee_id, old_period.0, old_period.1)
            .await?;
    }
    tx.commit().await?;
    Ok(record)
}

pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<Overtime> {
    let mut tx = pool.begin().await?;
    let removed = repo::delete(&mut *tx, tenant_id, id).await.map_err(|e| match e {
        RepoError::NotFound(_) => {
            ServiceError::App(AppError::with_message(ErrorCode::OvertimeNotFound, format!("Overtime {id} not found")))
        }
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
    use crate::db::repository::testing::{TENANT, seed_employee, test_pool};
    use chrono::NaiveDate;

    fn hours(start: &str, end: &str) -> Decimal {
        overtime_duration(start, end).unwrap()
    }

    #[test]
    fn duration_rolls_over_midnight() {
        assert_eq!(hours("22:00", "02:00"), Decimal::from(4));
        assert_eq!(hours("08:00", "10:30"), Decimal::new(250, 2));
        assert_eq!(hours("23:45:00", "00:05:00"), Decimal::new(33, 2));
    }

    #[test]
    fn identical_times_are_rejected() {
        let err = overtime_duration("18:00", "18:00").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOvertimePeriod);
        assert!(overtime_duration("18h", "20:00").is_err());
    }

    fn employee() -> Employee {
        Employee {
            id: 1,
            matricule: "EMP001".into(),
            prenom: "Mamadou".into(),
            nom: "Diallo".into(),
            fonction: "Mécanicien".into(),
            telephone: None,
            date_embauche: None,
            statut: Default::default(),
            salaire_journalier: 50_000.0,
            avances: 0.0,
            montant_heure_supp_jour_ouvrable: 10_000.0,
            montant_heure_supp_dimanche_ferie: 15_000.0,
            valeur_km: 500.0,
            taux_cnss_salarie_custom: 0.0,
            taux_cnss_employeur_custom: 0.0,
            taux_vf_custom: 0.0,
            appliquer_cnss: true,
            appliquer_rts: true,
            appliquer_vf: false,
            calcul_salaire_auto: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn rate_by_day_type_and_manual_override() {
        let e = employee();
        assert_eq!(overtime_rate(&e, DayType::Ouvrable, 0.0), Decimal::from(10_000));
        assert_eq!(overtime_rate(&e, DayType::Dimanche, 0.0), Decimal::from(15_000));
        assert_eq!(overtime_rate(&e, DayType::Ferie, 0.0), Decimal::from(15_000));
        assert_eq!(overtime_rate(&e, DayType::Ferie, 12_000.0), Decimal::from(12_000));
    }

    #[test]
    fn row_total_is_duration_times_rate() {
        let input = OvertimeInput {
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            heure_debut: "08:00".into(),
            heure_fin: "10:30".into(),
            type_jour: DayType::Dimanche,
            taux_horaire: 0.0,
        };
        let row = build_row(&employee(), &input).unwrap();
        assert_eq!(row.duree, 2.5);
        assert_eq!(row.total_a_payer, 37_500.0);
    }

    #[tokio::test]
    async fn create_and_delete_resync_payroll() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        let input = OvertimeInput {
            employee_id: e.id,
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            heure_debut: "18:00".into(),
            heure_fin: "20:00".into(),
            type_jour: DayType::Ouvrable,
            taux_horaire: 0.0,
        };
        let record = create(&pool, TENANT, &input).await.unwrap();
        let p = crate::db::repository::payroll::find_for_period(&pool, TENANT, e.id, 3, 2025)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.heures_supplementaires, 2.0);
        assert_eq!(p.montant_heures_supplementaires, 20_000.0);

        let err = create(&pool, TENANT, &input).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::OvertimeDuplicate));

        delete(&pool, TENANT, record.id).await.unwrap();
        let p = crate::db::repository::payroll::find_for_period(&pool, TENANT, e.id, 3, 2025)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.heures_supplementaires, 0.0);
        assert_eq!(p.montant_heures_supplementaires, 0.0);
    }

    #[tokio::test]
    async fn update_moves_amount_between_months() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        let mut input = OvertimeInput {
            employee_id: e.id,
            date: NaiveDate::from_ymd_opt(2025, 3, 28).unwrap(),
            heure_debut: "18:00".into(),
            heure_fin: "19:00".into(),
            type_jour: DayType::Ouvrable,
            taux_horaire: 0.0,
        };
        let record = create(&pool, TENANT, &input).await.unwrap();
        input.date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        update(&pool, TENANT, record.id, &input).await.unwrap();

        let march = crate::db::repository::payroll::find_for_period(&pool, TENANT, e.id, 3, 2025)
            .await
            .unwrap()
            .unwrap();
        let april = crate::db::repository::payroll::find_for_period(&pool, TENANT, e.id, 4, 2025)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(march.montant_heures_supplementaires, 0.0);
        assert_eq!(april.montant_heures_supplementaires, 10_000.0);
    }
}
