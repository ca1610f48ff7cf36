//! Vehicle rentals: daily logs, invoice generation and dashboard

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DailyLog, DailyLogInput, DailyLogStatus, GenerateInvoicesReport, Rental, RentalDashboard,
    RentalInput, RentalInvoice, RentalInvoiceStatus, RentalStatus,
};
use sqlx::{Executor, Sqlite, SqlitePool};

use super::found;
use super::invoicing::TVA_RATE;
use crate::db::repository::rental::{self as repo, RentalInvoiceFigures};
use crate::db::repository::{RepoError, vehicle};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{to_decimal, to_f64};
use crate::utils::time::month_bounds;
use crate::utils::validation::validate_amount;

/// Intersection of a rental with `[first, last]`, `None` when empty
pub fn overlap(rental: &Rental, first: NaiveDate, last: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let start = rental.date_debut.max(first);
    let end = rental.date_fin.unwrap_or(last).min(last);
    (start <= end).then_some((start, end))
}

/// Inclusive day count of a range
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// HT from the worked days, 18% VAT on top
pub fn invoice_figures(
    numero: String,
    date_facture: NaiveDate,
    tarif_journalier: f64,
    jours_travail: i64,
    jours_couverts: i64,
) -> RentalInvoiceFigures {
    let ht = Decimal::from(jours_travail) * to_decimal(tarif_journalier);
    let tva = ht * TVA_RATE;
    RentalInvoiceFigures {
        numero,
        date_facture,
        montant_ht: to_f64(ht),
        tva: to_f64(tva),
        montant_ttc: to_f64(ht + tva),
        jours_travail,
        jours_non_travail: (jours_couverts - jours_travail).max(0),
    }
}

fn rental_not_found(id: i64) -> impl FnOnce(RepoError) -> ServiceError {
    move |e| match e {
        RepoError::NotFound(_) => {
            ServiceError::App(AppError::with_message(ErrorCode::RentalNotFound, format!("Rental {id} not found")))
        }
        other => other.into(),
    }
}

async fn find(db: impl Executor<'_, Database = Sqlite>, tenant_id: &str, id: i64) -> ServiceResult<Rental> {
    found(
        repo::find_rental(db, tenant_id, id).await?,
        ErrorCode::RentalNotFound,
        format!("Rental {id}"),
    )
}

async fn validate(pool: &SqlitePool, tenant_id: &str, data: &RentalInput) -> ServiceResult<()> {
    validate_amount(data.tarif_journalier, "tarif_journalier")?;
    if let Some(fin) = data.date_fin {
        if fin < data.date_debut {
            return Err(AppError::with_message(
                ErrorCode::InvalidRentalPeriod,
                format!("date_fin {fin} precedes date_debut {}", data.date_debut),
            )
            .into());
        }
    }
    if !vehicle::exists(pool, tenant_id, &data.vehicle_id).await? {
        return Err(AppError::with_message(
            ErrorCode::VehicleNotFound,
            format!("Vehicle {} not found", data.vehicle_id),
        )
        .into());
    }
    if let Some(supplier_id) = data.supplier_id {
        found(
            repo::find_supplier(pool, tenant_id, supplier_id).await?,
            ErrorCode::SupplierNotFound,
            format!("Supplier {supplier_id}"),
        )?;
    }
    Ok(())
}

pub async fn create_rental(pool: &SqlitePool, tenant_id: &str, data: &RentalInput) -> ServiceResult<Rental> {
    validate(pool, tenant_id, data).await?;
    Ok(repo::create_rental(pool, tenant_id, data).await?)
}

pub async fn update_rental(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: &RentalInput,
) -> ServiceResult<Rental> {
    validate(pool, tenant_id, data).await?;
    repo::update_rental(pool, tenant_id, id, data)
        .await
        .map_err(rental_not_found(id))
}

/// Record the day's status; a second write for the same date replaces it
pub async fn record_log(
    pool: &SqlitePool,
    tenant_id: &str,
    rental_id: i64,
    data: &DailyLogInput,
) -> ServiceResult<DailyLog> {
    find(pool, tenant_id, rental_id).await?;
    Ok(repo::upsert_log(pool, tenant_id, rental_id, data).await?)
}

/// One `LOC-{id}-{YYYYMM}` invoice per rental overlapping the month, created or refreshed
pub async fn generate_monthly_invoices(
    pool: &SqlitePool,
    tenant_id: &str,
    annee: i32,
    mois: u32,
) -> ServiceResult<GenerateInvoicesReport> {
    let (first, last) = month_bounds(mois, annee)?;
    let mut report = GenerateInvoicesReport {
        annee,
        mois,
        ..Default::default()
    };

    let mut tx = pool.begin().await?;
    for rental in repo::rentals_overlapping(&mut *tx, tenant_id, first, last).await? {
        let Some((start, end)) = overlap(&rental, first, last) else {
            report.skipped += 1;
            continue;
        };
        let jours_travail =
            repo::count_rental_logs(&mut *tx, tenant_id, rental.id, DailyLogStatus::Travail, start, end)
                .await?;
        let numero = format!("LOC-{}-{}", rental.id, shared::util::period_key(annee, mois));
        let figures = invoice_figures(
            numero,
            last,
            rental.tarif_journalier,
            jours_travail,
            days_inclusive(start, end),
        );

        match repo::find_invoice_by_numero(&mut *tx, tenant_id, &figures.numero).await? {
            Some(existing) if existing.statut.is_final() => report.frozen += 1,
            Some(_) => {
                repo::update_invoice_figures(&mut *tx, tenant_id, &figures).await?;
                report.updated += 1;
            }
            None => {
                repo::insert_invoice(&mut *tx, tenant_id, rental.id, &figures).await?;
                report.created += 1;
            }
        }
    }
    tx.commit().await?;

    tracing::info!(
        tenant_id,
        annee,
        mois,
        created = report.created,
        updated = report.updated,
        frozen = report.frozen,
        "Rental invoices generated"
    );
    Ok(report)
}

/// Invoice the whole rental up to today
pub async fn generate_single_invoice(
    pool: &SqlitePool,
    tenant_id: &str,
    rental_id: i64,
) -> ServiceResult<RentalInvoice> {
    let rental = find(pool, tenant_id, rental_id).await?;
    let today = shared::util::today();
    let end = rental.date_fin.unwrap_or(today).min(today);

    let jours_travail = if end < rental.date_debut {
        0
    } else {
        repo::count_rental_logs(pool, tenant_id, rental.id, DailyLogStatus::Travail, rental.date_debut, end)
            .await?
    };
    if jours_travail == 0 {
        return Err(AppError::with_message(
            ErrorCode::NoWorkDays,
            format!("Rental {rental_id} has no work days to invoice"),
        )
        .into());
    }

    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let figures = invoice_figures(
        format!("FACT-{}-{stamp}", rental.id),
        today,
        rental.tarif_journalier,
        jours_travail,
        days_inclusive(rental.date_debut, end),
    );
    let invoice = repo::insert_invoice(pool, tenant_id, rental.id, &figures).await?;
    tracing::info!(tenant_id, numero = %invoice.numero, "Rental invoice generated");
    Ok(invoice)
}

/// Pay or cancel a draft invoice
pub async fn change_invoice_status(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    next: RentalInvoiceStatus,
) -> ServiceResult<RentalInvoice> {
    let invoice = found(
        repo::find_invoice(pool, tenant_id, id).await?,
        ErrorCode::RentalInvoiceNotFound,
        format!("Rental invoice {id}"),
    )?;
    if !invoice.statut.can_transition_to(next) {
        return Err(AppError::invalid_transition(invoice.statut.label(), next.label()).into());
    }
    // a concurrent change leaves the row on another status
    let updated = repo::set_invoice_status(pool, tenant_id, id, invoice.statut, next)
        .await?
        .ok_or_else(|| AppError::invalid_transition(invoice.statut.label(), next.label()))?;
    tracing::info!(tenant_id, numero = %updated.numero, statut = next.label(), "Rental invoice status changed");
    Ok(updated)
}

pub async fn dashboard(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<RentalDashboard> {
    let today = shared::util::today();
    let (first, last) = month_bounds(today.month(), today.year())?;
    let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(first);
    let year_end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(last);

    Ok(RentalDashboard {
        locations_actives: repo::count_rentals(pool, tenant_id, RentalStatus::Active).await?,
        locations_inactives: repo::count_rentals(pool, tenant_id, RentalStatus::Inactive).await?,
        jours_travail_mois: repo::count_logs(pool, tenant_id, DailyLogStatus::Travail, first, last).await?,
        jours_entretien_mois: repo::count_logs(pool, tenant_id, DailyLogStatus::Entretien, first, last)
            .await?,
        jours_hors_service_mois: repo::count_logs(pool, tenant_id, DailyLogStatus::HorsService, first, last)
            .await?,
        revenu_jour: repo::sum_tarif_for_logs(pool, tenant_id, DailyLogStatus::Travail, today, today).await?,
        revenu_mois: repo::sum_tarif_for_logs(pool, tenant_id, DailyLogStatus::Travail, first, last).await?,
        revenu_annee: repo::sum_tarif_for_logs(pool, tenant_id, DailyLogStatus::Travail, year_start, year_end)
            .await?,
        perte_entretien_mois: repo::sum_tarif_for_logs(pool, tenant_id, DailyLogStatus::Entretien, first, last)
            .await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_vehicle, test_pool};
    use shared::models::RentalType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rental_input(vehicle_id: &str, debut: NaiveDate, fin: Option<NaiveDate>) -> RentalInput {
        RentalInput {
            vehicle_id: vehicle_id.into(),
            supplier_id: None,
            type_location: RentalType::Externe,
            date_debut: debut,
            date_fin: fin,
            tarif_journalier: 100_000.0,
            statut: RentalStatus::Active,
            observations: String::new(),
        }
    }

    fn log(d: NaiveDate, statut: DailyLogStatus) -> DailyLogInput {
        DailyLogInput {
            date: d,
            statut,
            commentaire: String::new(),
        }
    }

    #[test]
    fn overlap_clamps_to_month() {
        let r = Rental {
            id: 1,
            vehicle_id: "V001".into(),
            supplier_id: None,
            type_location: RentalType::Externe,
            date_debut: date(2025, 3, 10),
            date_fin: Some(date(2025, 4, 5)),
            tarif_journalier: 0.0,
            statut: RentalStatus::Active,
            observations: String::new(),
            created_at: 0,
            updated_at: 0,
        };
        let (s, e) = overlap(&r, date(2025, 3, 1), date(2025, 3, 31)).unwrap();
        assert_eq!((s, e), (date(2025, 3, 10), date(2025, 3, 31)));
        assert_eq!(days_inclusive(s, e), 22);
        assert_eq!(
            overlap(&r, date(2025, 4, 1), date(2025, 4, 30)),
            Some((date(2025, 4, 1), date(2025, 4, 5)))
        );
        assert_eq!(overlap(&r, date(2025, 5, 1), date(2025, 5, 31)), None);
    }

    #[test]
    fn figures_add_vat_and_count_idle_days() {
        let f = invoice_figures("LOC-1-202503".into(), date(2025, 3, 31), 100_000.0, 5, 22);
        assert_eq!(f.montant_ht, 500_000.0);
        assert_eq!(f.tva, 90_000.0);
        assert_eq!(f.montant_ttc, 590_000.0);
        assert_eq!(f.jours_non_travail, 17);
        assert_eq!(invoice_figures(String::new(), date(2025, 3, 31), 1.0, 5, 3).jours_non_travail, 0);
    }

    #[tokio::test]
    async fn monthly_generation_is_an_upsert() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        seed_vehicle(&pool, TENANT, "V002").await;
        let r = create_rental(&pool, TENANT, &rental_input("V001", date(2025, 3, 10), None))
            .await
            .unwrap();
        // ended before March: not invoiced
        create_rental(
            &pool,
            TENANT,
            &rental_input("V002", date(2025, 1, 1), Some(date(2025, 2, 28))),
        )
        .await
        .unwrap();

        for d in 10..15 {
            record_log(&pool, TENANT, r.id, &log(date(2025, 3, d), DailyLogStatus::Travail))
                .await
                .unwrap();
        }
        record_log(&pool, TENANT, r.id, &log(date(2025, 3, 15), DailyLogStatus::Entretien))
            .await
            .unwrap();

        let report = generate_monthly_invoices(&pool, TENANT, 2025, 3).await.unwrap();
        assert_eq!((report.created, report.updated), (1, 0));
        let invoices = repo::list_invoices(&pool, TENANT, Some(r.id)).await.unwrap();
        assert_eq!(invoices[0].numero, format!("LOC-{}-202503", r.id));
        assert_eq!(invoices[0].montant_ttc, 590_000.0);
        assert_eq!(invoices[0].jours_non_travail, 17);

        // a late log flips the 15th to a work day
        record_log(&pool, TENANT, r.id, &log(date(2025, 3, 15), DailyLogStatus::Travail))
            .await
            .unwrap();
        let report = generate_monthly_invoices(&pool, TENANT, 2025, 3).await.unwrap();
        assert_eq!((report.created, report.updated), (0, 1));
        let invoices = repo::list_invoices(&pool, TENANT, Some(r.id)).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].jours_travail, 6);
    }

    #[tokio::test]
    async fn paid_invoice_survives_regeneration() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        let r = create_rental(&pool, TENANT, &rental_input("V001", date(2025, 3, 1), None))
            .await
            .unwrap();
        for d in 1..4 {
            record_log(&pool, TENANT, r.id, &log(date(2025, 3, d), DailyLogStatus::Travail))
                .await
                .unwrap();
        }
        generate_monthly_invoices(&pool, TENANT, 2025, 3).await.unwrap();
        let draft = repo::list_invoices(&pool, TENANT, Some(r.id)).await.unwrap().remove(0);
        assert_eq!(draft.statut, RentalInvoiceStatus::Brouillon);

        let paid = change_invoice_status(&pool, TENANT, draft.id, RentalInvoiceStatus::Payee)
            .await
            .unwrap();
        assert_eq!(paid.statut, RentalInvoiceStatus::Payee);

        record_log(&pool, TENANT, r.id, &log(date(2025, 3, 4), DailyLogStatus::Travail))
            .await
            .unwrap();
        let report = generate_monthly_invoices(&pool, TENANT, 2025, 3).await.unwrap();
        assert_eq!((report.created, report.updated, report.frozen), (0, 0, 1));
        let invoices = repo::list_invoices(&pool, TENANT, Some(r.id)).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].jours_travail, 3);
        assert_eq!(invoices[0].montant_ttc, draft.montant_ttc);
    }

    #[tokio::test]
    async fn invoice_status_transitions_are_checked() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        let r = create_rental(&pool, TENANT, &rental_input("V001", date(2025, 3, 1), None))
            .await
            .unwrap();
        record_log(&pool, TENANT, r.id, &log(date(2025, 3, 1), DailyLogStatus::Travail))
            .await
            .unwrap();
        generate_monthly_invoices(&pool, TENANT, 2025, 3).await.unwrap();
        let id = repo::list_invoices(&pool, TENANT, Some(r.id)).await.unwrap()[0].id;

        let err = change_invoice_status(&pool, OTHER_TENANT, id, RentalInvoiceStatus::Payee)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::RentalInvoiceNotFound));

        change_invoice_status(&pool, TENANT, id, RentalInvoiceStatus::Annulee)
            .await
            .unwrap();
        let err = change_invoice_status(&pool, TENANT, id, RentalInvoiceStatus::Payee)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InvalidStatusTransition));
    }

    #[tokio::test]
    async fn single_invoice_needs_work_days() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        let r = create_rental(&pool, TENANT, &rental_input("V001", date(2025, 1, 6), None))
            .await
            .unwrap();
        let err = generate_single_invoice(&pool, TENANT, r.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::NoWorkDays));

        record_log(&pool, TENANT, r.id, &log(date(2025, 1, 7), DailyLogStatus::Travail))
            .await
            .unwrap();
        let invoice = generate_single_invoice(&pool, TENANT, r.id).await.unwrap();
        assert!(invoice.numero.starts_with(&format!("FACT-{}-", r.id)));
        assert_eq!(invoice.montant_ht, 100_000.0);
    }

    #[tokio::test]
    async fn rental_validation() {
        let pool = test_pool().await;
        seed_vehicle(&pool, OTHER_TENANT, "V001").await;
        let err = create_rental(&pool, TENANT, &rental_input("V001", date(2025, 1, 6), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::VehicleNotFound));

        seed_vehicle(&pool, TENANT, "V001").await;
        let err = create_rental(
            &pool,
            TENANT,
            &rental_input("V001", date(2025, 1, 6), Some(date(2025, 1, 5))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InvalidRentalPeriod));
    }

    #[tokio::test]
    async fn dashboard_revenue_from_work_logs() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        seed_vehicle(&pool, TENANT, "V002").await;
        let today = shared::util::today();
        let a = create_rental(&pool, TENANT, &rental_input("V001", date(2024, 1, 1), None))
            .await
            .unwrap();
        let mut idle = rental_input("V002", date(2024, 1, 1), None);
        idle.statut = RentalStatus::Inactive;
        idle.tarif_journalier = 80_000.0;
        let b = create_rental(&pool, TENANT, &idle).await.unwrap();

        record_log(&pool, TENANT, a.id, &log(today, DailyLogStatus::Travail)).await.unwrap();
        record_log(&pool, TENANT, b.id, &log(today, DailyLogStatus::Entretien)).await.unwrap();

        let board = dashboard(&pool, TENANT).await.unwrap();
        assert_eq!((board.locations_actives, board.locations_inactives), (1, 1));
        assert_eq!(board.jours_travail_mois, 1);
        assert_eq!(board.jours_entretien_mois, 1);
        assert_eq!(board.revenu_jour, 100_000.0);
        assert_eq!(board.revenu_annee, 100_000.0);
        assert_eq!(board.perte_entretien_mois, 80_000.0);
    }
}
