//! Monthly archive: snapshot a month of HR data, then clear the live tables

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    ArchiveCreate, ArchiveDeletedCounts, ArchiveOutcome, ArchiveStatus, EmployeeStatus,
    MonthInfo, MonthlyArchive, ReferenceCheck,
};
use sqlx::SqlitePool;

use super::found;
use crate::db::repository::archive::{self as repo, ArchiveSnapshot};
use crate::db::repository::{attendance, employee, overtime, payroll, salary_config};
use crate::error::ServiceResult;
use crate::utils::money::{sum, to_decimal, to_f64};
use crate::utils::time::month_bounds;
use crate::utils::validation::{MAX_NOTE_LEN, validate_text_len};

/// Days and boundaries of a month
pub fn month_info(mois: u32, annee: i32) -> AppResult<MonthInfo> {
    let (premier_jour, dernier_jour) = month_bounds(mois, annee)?;
    Ok(MonthInfo {
        mois,
        annee,
        jours: shared::util::days_in_month(annee, mois),
        premier_jour,
        dernier_jour,
    })
}

pub fn next_month_info(mois: u32, annee: i32) -> AppResult<MonthInfo> {
    month_bounds(mois, annee)?;
    let (annee, mois) = shared::util::next_month(annee, mois);
    month_info(mois, annee)
}

pub fn previous_month_info(mois: u32, annee: i32) -> AppResult<MonthInfo> {
    month_bounds(mois, annee)?;
    let (annee, mois) = shared::util::previous_month(annee, mois);
    month_info(mois, annee)
}

pub async fn list(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<Vec<MonthlyArchive>> {
    Ok(repo::find_all(pool, tenant_id).await?)
}

pub async fn get(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<MonthlyArchive> {
    found(
        repo::find_by_id(pool, tenant_id, id).await?,
        ErrorCode::ArchiveNotFound,
        format!("Archive {id}"),
    )
}

/// Snapshot the month into a new archive and delete the live rows, atomically
pub async fn create_archive(
    pool: &SqlitePool,
    tenant_id: &str,
    req: &ArchiveCreate,
) -> ServiceResult<ArchiveOutcome> {
    let (first, last) = month_bounds(req.mois, req.annee)?;
    validate_text_len(&req.commentaires, "commentaires", MAX_NOTE_LEN)?;

    let mut tx = pool.begin().await?;
    if repo::exists_for_period(&mut *tx, tenant_id, req.mois, req.annee).await? {
        return Err(AppError::with_message(
            ErrorCode::ArchiveExists,
            format!("An archive already exists for {:02}/{}", req.mois, req.annee),
        )
        .into());
    }

    let matricules: HashMap<i64, String> = employee::find_all(&mut *tx, tenant_id, None)
        .await?
        .into_iter()
        .map(|e| (e.id, e.matricule))
        .collect();
    let key = |employee_id: i64| {
        matricules
            .get(&employee_id)
            .cloned()
            .unwrap_or_else(|| employee_id.to_string())
    };

    let mut presences: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for a in attendance::find_between(&mut *tx, tenant_id, None, first, last).await? {
        presences
            .entry(key(a.employee_id))
            .or_default()
            .push(json!({ "date": a.date, "statut": a.statut }));
    }

    let mut heures_supp: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for o in overtime::find_between(&mut *tx, tenant_id, None, first, last).await? {
        heures_supp
            .entry(key(o.employee_id))
            .or_default()
            .push(serde_json::to_value(&o)?);
    }

    let paies = payroll::list_for_period(&mut *tx, tenant_id, req.mois, req.annee).await?;
    let mut donnees_paies = BTreeMap::new();
    for p in &paies {
        donnees_paies.insert(key(p.employee_id), serde_json::to_value(p)?);
    }

    let brut = sum(paies.iter().map(|p| p.salaire_brut));
    let net = sum(paies.iter().map(|p| p.salaire_net_a_payer));
    let deductions: Decimal = paies
        .iter()
        .map(|p| {
            sum([
                p.cnss,
                p.rts,
                p.vf,
                p.avance_sur_salaire,
                p.sanction_vol_carburant,
            ])
        })
        .sum();
    let jours: i64 = paies.iter().map(|p| p.jours_presence).sum();

    let snapshot = ArchiveSnapshot {
        mois: req.mois,
        annee: req.annee,
        nb_employes_actifs: paies.len() as i64,
        nb_jours_travailles: jours,
        donnees_presences: serde_json::to_value(&presences)?,
        donnees_paies: serde_json::to_value(&donnees_paies)?,
        donnees_heures_supp: serde_json::to_value(&heures_supp)?,
        total_salaire_brut: to_f64(brut),
        total_deductions: to_f64(deductions),
        total_net_paye: to_f64(net),
        commentaires: req.commentaires.trim().to_string(),
    };
    let archive = repo::insert(&mut *tx, tenant_id, snapshot).await?;

    let supprimes = ArchiveDeletedCounts {
        presences: attendance::delete_between(&mut *tx, tenant_id, first, last).await?,
        paies: payroll::delete_period(&mut *tx, tenant_id, req.mois, req.annee).await?,
        heures_supp: overtime::delete_between(&mut *tx, tenant_id, first, last).await?,
    };
    tx.commit().await?;

    tracing::info!(
        tenant_id,
        mois = req.mois,
        annee = req.annee,
        presences = supprimes.presences,
        paies = supprimes.paies,
        heures_supp = supprimes.heures_supp,
        "Month archived"
    );

    Ok(ArchiveOutcome {
        archive,
        supprimes,
        mois_suivant: next_month_info(req.mois, req.annee)?,
    })
}

async fn advance(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    from: ArchiveStatus,
    to: ArchiveStatus,
) -> ServiceResult<MonthlyArchive> {
    let mut tx = pool.begin().await?;
    let current = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::ArchiveNotFound,
        format!("Archive {id}"),
    )?;
    let invalid = |statut: ArchiveStatus| {
        AppError::with_message(
            ErrorCode::ArchiveStateInvalid,
            format!("Archive {id} is {statut:?}, expected {from:?}"),
        )
    };
    if current.statut != from {
        return Err(invalid(current.statut).into());
    }
    let updated = repo::transition(&mut *tx, tenant_id, id, from, to)
        .await?
        .ok_or_else(|| invalid(current.statut))?;
    tx.commit().await?;
    Ok(updated)
}

/// `En cours` → `Clôturé`
pub async fn close_archive(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
) -> ServiceResult<MonthlyArchive> {
    advance(pool, tenant_id, id, ArchiveStatus::EnCours, ArchiveStatus::Cloture).await
}

/// `Clôturé` → `Archivé`
pub async fn archive_period(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
) -> ServiceResult<MonthlyArchive> {
    advance(pool, tenant_id, id, ArchiveStatus::Cloture, ArchiveStatus::Archive).await
}

/// Reference data that must be in place before a month can be archived
pub async fn reference_check(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<ReferenceCheck> {
    let employees = employee::find_all(pool, tenant_id, None).await?;
    let configured: HashSet<i64> = salary_config::configured_employee_ids(pool, tenant_id)
        .await?
        .into_iter()
        .collect();

    let mut incoherences = Vec::new();
    for e in &employees {
        let label = if e.matricule.trim().is_empty() {
            format!("{} {}", e.prenom, e.nom)
        } else {
            e.matricule.clone()
        };
        if e.matricule.trim().is_empty() {
            incoherences.push(format!("{label}: missing matricule"));
        }
        if e.fonction.trim().is_empty() {
            incoherences.push(format!("{label}: missing fonction"));
        }
        if to_decimal(e.salaire_journalier) <= Decimal::ZERO {
            incoherences.push(format!("{label}: salaire_journalier must be positive"));
        }
        if e.statut == EmployeeStatus::Actif && !configured.contains(&e.id) {
            incoherences.push(format!("{label}: no salary configuration"));
        }
    }

    Ok(ReferenceCheck {
        employes_verifies: employees.len(),
        coherent: incoherences.is_empty(),
        incoherences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{
        OTHER_TENANT, TENANT, employee_payload, seed_employee, test_pool,
    };
    use crate::error::ServiceError;
    use crate::services::{overtime as overtime_service, payroll as payroll_service};
    use chrono::NaiveDate;
    use shared::models::{AttendanceStatus, DayType, OvertimeInput, SalaryConfigInput};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn request(mois: u32, annee: i32) -> ArchiveCreate {
        ArchiveCreate {
            mois,
            annee,
            commentaires: "clôture mars".into(),
        }
    }

    fn code(err: ServiceError) -> ErrorCode {
        match err {
            ServiceError::App(e) => e.code,
            other => panic!("unexpected error {other:?}"),
        }
    }

    async fn seed_month(pool: &SqlitePool) -> i64 {
        let e = seed_employee(pool, TENANT, "EMP001").await;
        for d in [3, 4, 5] {
            attendance::upsert(pool, TENANT, e.id, day(d), AttendanceStatus::PresentFull)
                .await
                .unwrap();
        }
        attendance::upsert(pool, TENANT, e.id, day(6), AttendanceStatus::Absent)
            .await
            .unwrap();
        overtime_service::create(
            pool,
            TENANT,
            &OvertimeInput {
                employee_id: e.id,
                date: day(4),
                heure_debut: "18:00".into(),
                heure_fin: "20:00".into(),
                type_jour: DayType::Ouvrable,
                taux_horaire: 0.0,
            },
        )
        .await
        .unwrap();
        let mut conn = pool.acquire().await.unwrap();
        payroll_service::sync_payroll(&mut conn, TENANT, &e, 3, 2025)
            .await
            .unwrap();
        e.id
    }

    #[test]
    fn month_navigation_wraps_years() {
        let next = next_month_info(12, 2024).unwrap();
        assert_eq!((next.mois, next.annee, next.jours), (1, 2025, 31));
        let prev = previous_month_info(3, 2024).unwrap();
        assert_eq!((prev.mois, prev.annee, prev.jours), (2, 2024, 29));
        assert_eq!(prev.dernier_jour, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(month_info(13, 2025).is_err());
    }

    #[tokio::test]
    async fn archive_snapshots_and_clears_month() {
        let pool = test_pool().await;
        seed_month(&pool).await;

        let outcome = create_archive(&pool, TENANT, &request(3, 2025)).await.unwrap();
        let archive = &outcome.archive;
        assert_eq!(archive.statut, ArchiveStatus::EnCours);
        assert_eq!(archive.nb_employes_actifs, 1);
        assert_eq!(archive.nb_jours_travailles, 3);
        assert_eq!(outcome.supprimes.presences, 4);
        assert_eq!(outcome.supprimes.paies, 1);
        assert_eq!(outcome.supprimes.heures_supp, 1);
        assert_eq!((outcome.mois_suivant.mois, outcome.mois_suivant.annee), (4, 2025));

        let presences = &archive.donnees_presences["EMP001"];
        assert_eq!(presences.as_array().map(Vec::len), Some(4));
        assert!(archive.donnees_paies.get("EMP001").is_some());
        assert!(archive.total_salaire_brut > 0.0);
        assert!(
            (archive.total_salaire_brut - archive.total_deductions - archive.total_net_paye).abs()
                < 0.01
        );

        let left = attendance::find_between(&pool, TENANT, None, day(1), day(31))
            .await
            .unwrap();
        assert!(left.is_empty());
        assert!(payroll::list_for_period(&pool, TENANT, 3, 2025).await.unwrap().is_empty());
        // reference data stays
        assert_eq!(employee::find_all(&pool, TENANT, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn archive_refuses_duplicate_period() {
        let pool = test_pool().await;
        create_archive(&pool, TENANT, &request(3, 2025)).await.unwrap();
        let err = create_archive(&pool, TENANT, &request(3, 2025)).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ArchiveExists);
        // another tenant can archive the same month
        create_archive(&pool, OTHER_TENANT, &request(3, 2025)).await.unwrap();
    }

    #[tokio::test]
    async fn lifecycle_is_ordered() {
        let pool = test_pool().await;
        let id = create_archive(&pool, TENANT, &request(2, 2025))
            .await
            .unwrap()
            .archive
            .id;

        let err = archive_period(&pool, TENANT, id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ArchiveStateInvalid);

        let closed = close_archive(&pool, TENANT, id).await.unwrap();
        assert_eq!(closed.statut, ArchiveStatus::Cloture);
        assert!(closed.date_cloture.is_some());

        let err = close_archive(&pool, TENANT, id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ArchiveStateInvalid);

        let archived = archive_period(&pool, TENANT, id).await.unwrap();
        assert_eq!(archived.statut, ArchiveStatus::Archive);

        let err = close_archive(&pool, OTHER_TENANT, id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ArchiveNotFound);
    }

    #[tokio::test]
    async fn reference_check_lists_gaps() {
        let pool = test_pool().await;
        let ok = seed_employee(&pool, TENANT, "EMP001").await;
        salary_config::upsert(
            &pool,
            TENANT,
            ok.id,
            &SalaryConfigInput {
                statut_presence: AttendanceStatus::PresentFull,
                montant_journalier: 50_000.0,
                actif: true,
            },
        )
        .await
        .unwrap();

        let mut bad = employee_payload("EMP002");
        bad.fonction = String::new();
        bad.salaire_journalier = 0.0;
        employee::create(&pool, TENANT, bad).await.unwrap();

        let report = reference_check(&pool, TENANT).await.unwrap();
        assert_eq!(report.employes_verifies, 2);
        assert!(!report.coherent);
        assert_eq!(report.incoherences.len(), 3);
        assert!(report.incoherences.iter().all(|m| m.starts_with("EMP002")));
    }
}
