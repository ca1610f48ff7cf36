//! Tenant maintenance: bulk purges and rental demo data

use chrono::{Datelike, Weekday};
use serde::Serialize;
use shared::models::{
    DailyLogInput, DailyLogStatus, EngineType, RentalInput, RentalStatus, RentalSupplierInput,
    RentalType, VehicleCategory, VehicleCreate, VehicleStatus,
};
use sqlx::SqlitePool;

use crate::db::repository::maintenance::{
    EMPLOYEE_TABLES, INVENTORY_TABLES, count_tenant_rows, delete_tenant_rows,
};
use crate::db::repository::{rental, vehicle};
use crate::error::ServiceResult;
use crate::utils::time::month_bounds;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: u64,
}

/// Rows per table, either deleted or (dry run) about to be
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeReport {
    pub tables: Vec<TableCount>,
}

impl PurgeReport {
    pub fn total(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn rows(&self, table: &str) -> u64 {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map_or(0, |t| t.rows)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub fournisseurs_crees: u32,
    pub vehicules_crees: u32,
    pub locations_creees: u32,
    pub feuilles_creees: u32,
}

async fn purge(
    pool: &SqlitePool,
    tenant_id: &str,
    tables: &[&'static str],
    dry_run: bool,
) -> ServiceResult<PurgeReport> {
    let mut report = PurgeReport::default();
    let mut tx = pool.begin().await?;
    for &table in tables {
        let rows = if dry_run {
            count_tenant_rows(&mut *tx, table, tenant_id).await?
        } else {
            delete_tenant_rows(&mut *tx, table, tenant_id).await?
        };
        report.tables.push(TableCount { table, rows });
    }
    if dry_run {
        tx.rollback().await?;
    } else {
        tx.commit().await?;
        tracing::warn!(tenant_id, total = report.total(), ?tables, "Tenant tables purged");
    }
    Ok(report)
}

/// Products, stock, purchase orders and invoices of the tenant
pub async fn clear_inventory(
    pool: &SqlitePool,
    tenant_id: &str,
    dry_run: bool,
) -> ServiceResult<PurgeReport> {
    purge(pool, tenant_id, INVENTORY_TABLES, dry_run).await
}

/// Employees and every HR row hanging off them
pub async fn purge_employee_data(
    pool: &SqlitePool,
    tenant_id: &str,
    dry_run: bool,
) -> ServiceResult<PurgeReport> {
    purge(pool, tenant_id, EMPLOYEE_TABLES, dry_run).await
}

const SEED_VEHICLES: [(&str, &str, &str, &str, EngineType, VehicleCategory); 3] = [
    ("TEST001", "GN-001-AA", "Toyota", "Hilux", EngineType::Diesel, VehicleCategory::QuatreQuatre),
    ("TEST002", "GN-002-BB", "Nissan", "Patrol", EngineType::Essence, VehicleCategory::QuatreQuatre),
    ("TEST003", "GN-003-CC", "Mitsubishi", "Canter", EngineType::Diesel, VehicleCategory::Camion),
];

const SEED_TARIFS: [f64; 3] = [150_000.0, 200_000.0, 350_000.0];

/// Daily log status for a seeded day, `None` on weekends
fn seeded_status(date: chrono::NaiveDate) -> Option<DailyLogStatus> {
    if date.day() % 7 == 0 {
        return Some(DailyLogStatus::Entretien);
    }
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => None,
        _ => Some(DailyLogStatus::Travail),
    }
}

/// One supplier, three vehicles (kept when present), three rentals with logs for the current month
pub async fn seed_rentals(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<SeedReport> {
    let today = shared::util::today();
    let (first, last) = month_bounds(today.month(), today.year())?;
    let mut report = SeedReport::default();

    let mut tx = pool.begin().await?;
    let supplier = match rental::find_supplier_by_name(&mut *tx, tenant_id, "Location Express Guinée").await? {
        Some(s) => s,
        None => {
            report.fournisseurs_crees += 1;
            let input = RentalSupplierInput {
                nom: "Location Express Guinée".into(),
                contact: "Mamadou Diallo".into(),
                telephone: "224 621 123 456".into(),
                email: "contact@locationexpress.gn".into(),
                adresse: "Kaloum, Conakry".into(),
            };
            rental::create_supplier(&mut *tx, tenant_id, &input).await?
        }
    };

    for ((id, immatriculation, marque, modele, moteur, categorie), tarif) in
        SEED_VEHICLES.into_iter().zip(SEED_TARIFS)
    {
        if !vehicle::exists(&mut *tx, tenant_id, id).await? {
            let data = VehicleCreate {
                id_vehicule: id.into(),
                immatriculation: immatriculation.into(),
                marque: marque.into(),
                modele: modele.into(),
                type_moteur: moteur,
                categorie,
                statut_actuel: VehicleStatus::Actif,
                date_mise_service: None,
                date_acquisition: None,
                kilometrage_initial: 0.0,
                affectation: String::new(),
                numero_chassis: String::new(),
                numero_moteur: String::new(),
                observations: String::new(),
                chauffeur_principal_id: None,
                fournisseur_id: Some(supplier.id),
            };
            vehicle::create(&mut *tx, tenant_id, &data).await?;
            report.vehicules_crees += 1;
        }

        let location = rental::create_rental(
            &mut *tx,
            tenant_id,
            &RentalInput {
                vehicle_id: id.into(),
                supplier_id: Some(supplier.id),
                type_location: RentalType::Externe,
                date_debut: first,
                date_fin: None,
                tarif_journalier: tarif,
                statut: RentalStatus::Active,
                observations: "Données de démonstration".into(),
            },
        )
        .await?;
        report.locations_creees += 1;

        for date in first.iter_days().take_while(|d| *d <= last) {
            let Some(statut) = seeded_status(date) else {
                continue;
            };
            let log = DailyLogInput {
                date,
                statut,
                commentaire: String::new(),
            };
            rental::upsert_log(&mut *tx, tenant_id, location.id, &log).await?;
            report.feuilles_creees += 1;
        }
    }
    tx.commit().await?;

    tracing::info!(
        tenant_id,
        rentals = report.locations_creees,
        logs = report.feuilles_creees,
        "Rental demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_employee, test_pool};
    use crate::db::repository::{attendance, employee};
    use crate::services::stock;
    use chrono::NaiveDate;
    use shared::models::{AttendanceStatus, ProductCategory, ProductCreate, Unit};

    #[test]
    fn seeded_days_skip_weekends() {
        // 2025-03-01 is a Saturday, 2025-03-07 a Friday
        let d = |n| NaiveDate::from_ymd_opt(2025, 3, n).unwrap();
        assert_eq!(seeded_status(d(1)), None);
        assert_eq!(seeded_status(d(3)), Some(DailyLogStatus::Travail));
        assert_eq!(seeded_status(d(7)), Some(DailyLogStatus::Entretien));
        assert_eq!(seeded_status(d(14)), Some(DailyLogStatus::Entretien));
    }

    #[tokio::test]
    async fn purge_employee_data_is_tenant_scoped() {
        let pool = test_pool().await;
        let mine = seed_employee(&pool, TENANT, "EMP001").await;
        seed_employee(&pool, OTHER_TENANT, "EMP001").await;
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        attendance::upsert(&pool, TENANT, mine.id, date, AttendanceStatus::PresentFull)
            .await
            .unwrap();

        let preview = purge_employee_data(&pool, TENANT, true).await.unwrap();
        assert_eq!(preview.rows("employee"), 1);
        assert_eq!(preview.rows("attendance"), 1);
        assert_eq!(employee::find_all(&pool, TENANT, None).await.unwrap().len(), 1);

        let done = purge_employee_data(&pool, TENANT, false).await.unwrap();
        assert_eq!(done.total(), 2);
        assert!(employee::find_all(&pool, TENANT, None).await.unwrap().is_empty());
        assert_eq!(employee::find_all(&pool, OTHER_TENANT, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_inventory_removes_products() {
        let pool = test_pool().await;
        let input = ProductCreate {
            id: None,
            nom: "Filtre à huile".into(),
            categorie: ProductCategory::Piece,
            unite: Unit::Piece,
            seuil_minimum: 2,
            prix_unitaire: 25_000.0,
            fournisseur: String::new(),
            date_ajout: None,
        };
        stock::create_product(&pool, TENANT, &input).await.unwrap();

        let report = clear_inventory(&pool, TENANT, false).await.unwrap();
        assert_eq!(report.rows("product"), 1);
        assert_eq!(report.tables.len(), INVENTORY_TABLES.len());
    }

    #[tokio::test]
    async fn seed_rentals_reuses_supplier_and_vehicles() {
        let pool = test_pool().await;
        let first = seed_rentals(&pool, TENANT).await.unwrap();
        assert_eq!(first.fournisseurs_crees, 1);
        assert_eq!(first.vehicules_crees, 3);
        assert_eq!(first.locations_creees, 3);
        assert!(first.feuilles_creees > 0);

        let second = seed_rentals(&pool, TENANT).await.unwrap();
        assert_eq!(second.fournisseurs_crees, 0);
        assert_eq!(second.vehicules_crees, 0);
        assert_eq!(second.locations_creees, 3);
    }
}
