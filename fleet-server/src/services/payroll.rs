//! Payroll synchronization and computation
//!
//! `sync_payroll` rebuilds one statement from the month's attendance,
//! overtime and mileage rows. It runs inside the caller's transaction so
//! the triggering write and the statement commit together; running it
//! twice on the same data yields the same row.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AttendanceStats, DayType, Employee, Payroll, PayrollUpdate, SalaryConfig,
    SyncError, SyncReport, SyncRequest,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::charges::{compute_charges, request_for};
use super::found;
use crate::db::repository::{attendance, employee, mileage, overtime, payroll, salary_config};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{sum, to_decimal, to_f64};
use crate::utils::time::month_bounds;

/// Daily pay from salary configs or the flat daily rate
///
/// With at least one active config: Σ count(status) × amount(status).
/// Otherwise: `salaire_journalier × (jours_presence + dimanches)`.
pub fn auto_salary(employee: &Employee, stats: &AttendanceStats, configs: &[SalaryConfig]) -> Decimal {
    let active: Vec<&SalaryConfig> = configs.iter().filter(|c| c.actif).collect();
    if active.is_empty() {
        let days = Decimal::from(stats.jours_presence + stats.dimanches);
        return to_decimal(employee.salaire_journalier) * days;
    }
    active
        .into_iter()
        .map(|c| Decimal::from(stats.count_of(c.statut_presence)) * to_decimal(c.montant_journalier))
        .sum()
}

/// Recompute gross, charges and net amounts from the stored figures
pub fn recompute_totals(p: &mut Payroll, employee: &Employee) {
    if !employee.calcul_salaire_auto {
        p.montant_jours_travailles = p.salaire_base;
    }
    let brut = sum([
        p.montant_jours_travailles,
        p.montant_heures_supplementaires,
        p.montant_heures_supplement_dimanches,
        p.montant_frais_km,
        p.indemnite_transport,
        p.indemnite_logement,
        p.cherete_vie,
        p.prime_discipline,
        p.prime_ferie,
    ]);
    let charges = compute_charges(&request_for(employee, to_f64(brut)));
    p.salaire_brut = charges.salaire_brut;
    p.cnss = charges.cnss_salarie;
    p.cnss_employeur = charges.cnss_employeur;
    p.rts = charges.rts;
    p.vf = charges.vf;
    p.salaire_net = charges.salaire_net;
    p.salaire_net_a_payer = to_f64(
        to_decimal(p.salaire_net) - to_decimal(p.avance_sur_salaire) - to_decimal(p.sanction_vol_carburant),
    );
}

/// Rebuild the statement of `(employee, mois, annee)`; returns it and whether it was created
pub async fn sync_payroll(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    employee: &Employee,
    mois: u32,
    annee: i32,
) -> ServiceResult<(Payroll, bool)> {
    let (first, last) = month_bounds(mois, annee)?;

    let existing = payroll::find_for_period(&mut *conn, tenant_id, employee.id, mois, annee).await?;
    let created = existing.is_none();
    let mut p = match existing {
        Some(p) => p,
        None => {
            payroll::insert_empty(&mut *conn, tenant_id, employee.id, mois, annee, employee.salaire_journalier)
                .await?
        }
    };

    // Attendance
    let statuses = attendance::statuses_between(&mut *conn, tenant_id, employee.id, first, last).await?;
    let stats = AttendanceStats::tally(i64::from(shared::util::days_in_month(annee, mois)), statuses);
    p.jours_mois = stats.jours_mois;
    p.jours_presence = stats.jours_presence;
    p.dimanches = stats.dimanches;
    p.absences = stats.absences;
    p.jours_repos = stats.jours_repos;

    // Overtime
    let extra = overtime::find_between(&mut *conn, tenant_id, Some(employee.id), first, last).await?;
    p.heures_supplementaires = to_f64(sum(extra.iter().map(|o| o.duree)));
    p.montant_heures_supplementaires = to_f64(sum(
        extra.iter().filter(|o| o.type_jour == DayType::Ouvrable).map(|o| o.total_a_payer),
    ));
    p.montant_heures_supplement_dimanches = to_f64(sum(
        extra.iter().filter(|o| o.type_jour.is_premium()).map(|o| o.total_a_payer),
    ));

    // Mileage
    let trips = mileage::find_between(&mut *conn, tenant_id, Some(employee.id), first, last).await?;
    p.montant_frais_km = to_f64(sum(trips.iter().map(|m| m.total_a_payer)));

    if employee.calcul_salaire_auto {
        let configs = salary_config::find_active_for_employee(&mut *conn, tenant_id, employee.id).await?;
        let amount = to_f64(auto_salary(employee, &stats, &configs));
        p.montant_jours_travailles = amount;
        p.salaire_base = amount;
    }
    recompute_totals(&mut p, employee);

    let saved = payroll::save(&mut *conn, tenant_id, &p).await?;
    tracing::debug!(employee_id = employee.id, mois, annee, created, net = saved.salaire_net_a_payer, "Payroll synchronized");
    Ok((saved, created))
}

/// `sync_payroll` for an employee id
pub async fn sync_employee_id(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    employee_id: i64,
    mois: u32,
    annee: i32,
) -> ServiceResult<Payroll> {
    let emp = found(
        employee::find_by_id(&mut *conn, tenant_id, employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {employee_id}"),
    )?;
    let (p, _) = sync_payroll(conn, tenant_id, &emp, mois, annee).await?;
    Ok(p)
}

/// Rebuild every statement the employee already has; returns how many
pub async fn resync_existing(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    employee: &Employee,
) -> ServiceResult<usize> {
    let periods = payroll::periods_for_employee(&mut *conn, tenant_id, employee.id).await?;
    for &(mois, annee) in &periods {
        sync_payroll(&mut *conn, tenant_id, employee, mois, annee).await?;
    }
    Ok(periods.len())
}

/// Sync every active employee of the tenant, or the one matricule requested
pub async fn sync_all(
    pool: &SqlitePool,
    tenant_id: &str,
    req: &SyncRequest,
) -> ServiceResult<SyncReport> {
    month_bounds(req.mois, req.annee)?;
    let mut tx = pool.begin().await?;

    let employees = match &req.matricule {
        Some(matricule) => vec![found(
            employee::find_by_matricule(&mut *tx, tenant_id, matricule).await?,
            ErrorCode::EmployeeNotFound,
            format!("Employee '{matricule}'"),
        )?],
        None => employee::find_active(&mut *tx, tenant_id).await?,
    };

    let mut report = SyncReport {
        mois: req.mois,
        annee: req.annee,
        ..Default::default()
    };
    for emp in &employees {
        match sync_payroll(&mut tx, tenant_id, emp, req.mois, req.annee).await {
            Ok((_, true)) => report.created += 1,
            Ok((_, false)) => report.updated += 1,
            Err(ServiceError::App(e)) => report.errors.push(SyncError {
                matricule: emp.matricule.clone(),
                message: e.message,
            }),
            Err(e) => return Err(e),
        }
    }
    tx.commit().await?;

    tracing::info!(
        tenant_id,
        mois = req.mois,
        annee = req.annee,
        created = report.created,
        updated = report.updated,
        errors = report.errors.len(),
        "Payroll sync finished"
    );
    Ok(report)
}

/// Apply manual fields to a statement and recompute it
pub async fn update_payroll(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: PayrollUpdate,
) -> ServiceResult<Payroll> {
    for (value, field) in [
        (data.salaire_base, "salaire_base"),
        (data.indemnite_transport, "indemnite_transport"),
        (data.indemnite_logement, "indemnite_logement"),
        (data.cherete_vie, "cherete_vie"),
        (data.prime_discipline, "prime_discipline"),
        (data.prime_ferie, "prime_ferie"),
        (data.avance_sur_salaire, "avance_sur_salaire"),
        (data.sanction_vol_carburant, "sanction_vol_carburant"),
    ] {
        if let Some(v) = value {
            crate::utils::validation::validate_amount(v, field)?;
        }
    }
    if let Some(conge) = data.conge
        && conge < 0
    {
        return Err(AppError::validation(format!("conge must be non-negative, got {conge}")).into());
    }

    let mut tx = pool.begin().await?;
    let mut p = found(
        payroll::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::PayrollNotFound,
        format!("Payroll {id}"),
    )?;
    let emp = found(
        employee::find_by_id(&mut *tx, tenant_id, p.employee_id).await?,
        ErrorCode::EmployeeNotFound,
        format!("Employee {}", p.employee_id),
    )?;

    if let Some(v) = data.salaire_base {
        p.salaire_base = v;
    }
    if let Some(v) = data.conge {
        p.conge = v;
    }
    if let Some(v) = data.indemnite_transport {
        p.indemnite_transport = v;
    }
    if let Some(v) = data.indemnite_logement {
        p.indemnite_logement = v;
    }
    if let Some(v) = data.cherete_vie {
        p.cherete_vie = v;
    }
    if let Some(v) = data.prime_discipline {
        p.prime_discipline = v;
    }
    if let Some(v) = data.prime_ferie {
        p.prime_ferie = v;
    }
    if let Some(v) = data.avance_sur_salaire {
        p.avance_sur_salaire = v;
    }
    if let Some(v) = data.sanction_vol_carburant {
        p.sanction_vol_carburant = v;
    }
    recompute_totals(&mut p, &emp);

    let saved = payroll::save(&mut *tx, tenant_id, &p).await?;
    tx.commit().await?;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_employee, test_pool};
    use chrono::NaiveDate;
    use shared::models::{AttendanceStatus, SalaryConfigInput};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    async fn mark(pool: &SqlitePool, employee_id: i64, d: u32, s: AttendanceStatus) {
        attendance::upsert(pool, TENANT, employee_id, day(d), s).await.unwrap();
    }

    #[tokio::test]
    async fn sync_is_idempotent() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        mark(&pool, e.id, 3, AttendanceStatus::PresentFull).await;
        mark(&pool, e.id, 4, AttendanceStatus::PresentAm).await;
        mark(&pool, e.id, 9, AttendanceStatus::SundayFull).await;
        mark(&pool, e.id, 5, AttendanceStatus::Absent).await;

        let mut conn = pool.acquire().await.unwrap();
        let (first, created) = sync_payroll(&mut conn, TENANT, &e, 3, 2025).await.unwrap();
        let (second, created_again) = sync_payroll(&mut conn, TENANT, &e, 3, 2025).await.unwrap();
        assert!(created);
        assert!(!created_again);
        assert_eq!(first.id, second.id);
        assert_eq!(first.salaire_net_a_payer, second.salaire_net_a_payer);
        assert_eq!(first.salaire_brut, second.salaire_brut);

        assert_eq!(second.jours_mois, 31);
        assert_eq!(second.jours_presence, 2);
        assert_eq!(second.dimanches, 1);
        assert_eq!(second.absences, 1);
        // 50 000 × (2 + 1)
        assert_eq!(second.montant_jours_travailles, 150_000.0);
        assert_eq!(second.salaire_base, 150_000.0);
        assert_eq!(second.salaire_brut, 150_000.0);
        assert_eq!(second.cnss, 7_500.0);
        assert_eq!(second.rts, 0.0);
        assert_eq!(second.salaire_net, 142_500.0);
    }

    #[tokio::test]
    async fn salary_configs_override_daily_rate() {
        let pool = test_pool().await;
        let e = seed_employee(&pool, TENANT, "EMP001").await;
        for (status, amount) in [
            (AttendanceStatus::PresentFull, 60_000.0),
            (AttendanceStatus::PresentAm, 30_000.0),
        ] {
            salary_config::upsert(
                &pool,
                TENANT,
                e.id,
                &SalaryConfigInput {
                    statut_presence: status,
                    montant_journalier: amount,
                    actif: true,
                },
            )
            .await
            .unwrap();
        }
        mark(&pool, e.id, 3, AttendanceStatus::PresentFull).await;
        mark(&pool, e.id, 4, AttendanceStatus::PresentFull).await;
        mark(&pool, e.id, 5, AttendanceStatus::PresentAm).await;
        // no config for Sunday presence: contributes nothing
        mark(&pool, e.id, 9, AttendanceStatus::SundayFull).await;

        let mut conn = pool.acquire().await.unwrap();
        let (p, _) = sync_payroll(&mut conn, TENANT, &e, 3, 2025).await.unwrap();
        assert_eq!(p.montant_jours_travailles, 150_000.0);
    }

    #[tokio::test]
    async fn manual_salary_uses_stored_base() {
        let pool = test_pool().await;
        let mut e = seed_employee(&pool, TENANT, "EMP001").await;
        e = employee::update(
            &pool,
            TENANT,
            e.id,
            shared::models::EmployeeUpdate {
                calcul_salaire_auto: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        mark(&pool, e.id, 3, AttendanceStatus::PresentFull).await;

        let mut conn = pool.acquire().await.unwrap();
        let (p, _) = sync_payroll(&mut conn, TENANT, &e, 3, 2025).await.unwrap();
        drop(conn);
        // base starts at the daily salary
        assert_eq!(p.montant_jours_travailles, 50_000.0);

        let p = update_payroll(
            &pool,
            TENANT,
            p.id,
            PayrollUpdate {
                salaire_base: Some(1_200_000.0),
                indemnite_transport: Some(100_000.0),
                avance_sur_salaire: Some(50_000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(p.salaire_brut, 1_300_000.0);
        assert_eq!(p.cnss, 65_000.0);
        // base 1 235 000 → (1 235 000 − 1 000 001 + 1) × 10%
        assert_eq!(p.rts, 23_500.0);
        assert_eq!(p.salaire_net, 1_211_500.0);
        assert_eq!(p.salaire_net_a_payer, 1_161_500.0);
    }

    #[tokio::test]
    async fn sync_all_reports_created_and_updated() {
        let pool = test_pool().await;
        seed_employee(&pool, TENANT, "EMP001").await;
        seed_employee(&pool, TENANT, "EMP002").await;
        seed_employee(&pool, OTHER_TENANT, "EMP001").await;

        let req = SyncRequest {
            mois: 3,
            annee: 2025,
            matricule: None,
        };
        let report = sync_all(&pool, TENANT, &req).await.unwrap();
        assert_eq!((report.created, report.updated), (2, 0));
        let report = sync_all(&pool, TENANT, &req).await.unwrap();
        assert_eq!((report.created, report.updated), (0, 2));
        assert!(report.errors.is_empty());

        let single = SyncRequest {
            matricule: Some("EMP002".into()),
            ..req.clone()
        };
        assert_eq!(sync_all(&pool, TENANT, &single).await.unwrap().updated, 1);

        let unknown = SyncRequest {
            matricule: Some("NOPE".into()),
            ..req
        };
        assert!(sync_all(&pool, TENANT, &unknown).await.is_err());
    }

    #[tokio::test]
    async fn invalid_period_is_rejected() {
        let pool = test_pool().await;
        let req = SyncRequest {
            mois: 13,
            annee: 2025,
            matricule: None,
        };
        let err = sync_all(&pool, TENANT, &req).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InvalidPeriod));
    }
}
