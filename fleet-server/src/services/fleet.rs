//! Fleet workflows: derived figures on vehicle records, trip sheets and the dashboard
//!
//! Every derived field is recomputed here on create and update, then handed
//! to the repository as a plain value.

use chrono::{Datelike, Duration};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    AdminDocument, AdminDocumentInput, AvailabilityInput, AvailabilityRecord, DistanceRecord,
    DistanceRecordInput, FinancialCost, FinancialCostInput, FleetDashboard, FuelRecord,
    FuelRecordInput, Incident, IncidentInput, OperatingCost, OperatingCostInput, TripFigures,
    TripSheet, TripSheetInput, Vehicle, VehicleCreate, VehicleStatus, VehicleUpdate,
    VehicleUsage, VehicleUsageInput,
};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::db::repository::fleet_record::{self, FuelFigures};
use crate::db::repository::{RepoError, alert, driver, trip_sheet, vehicle};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{round2, to_decimal, to_f64};
use crate::utils::time::month_bounds;

/// Fuel threshold above which a trip is flagged (L/100km)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverconsumptionRule {
    pub baseline: f64,
    pub margin: f64,
}

impl Default for OverconsumptionRule {
    fn default() -> Self {
        Self {
            baseline: 8.0,
            margin: 3.0,
        }
    }
}

impl OverconsumptionRule {
    pub fn threshold(&self) -> Decimal {
        to_decimal(self.baseline) + to_decimal(self.margin)
    }
}

fn odometer_error(from: f64, to: f64) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidOdometer,
        format!("End reading {to} is below start reading {from}"),
    )
}

/// `end − start`, rejecting a reading that goes backwards
pub fn distance_between(start: f64, end: f64) -> AppResult<f64> {
    let distance = to_decimal(end) - to_decimal(start);
    if distance < Decimal::ZERO {
        return Err(odometer_error(start, end));
    }
    Ok(to_f64(distance))
}

/// Distance, fuel used and consumption of a trip, plus the overconsumption flag
pub fn trip_figures(input: &TripSheetInput, rule: OverconsumptionRule) -> AppResult<TripFigures> {
    let distance = match (input.km_depart, input.km_retour) {
        (Some(depart), Some(retour)) => Some(distance_between(depart, retour)?),
        _ => None,
    };
    let carburant_utilise = match (input.carburant_depart, input.carburant_retour) {
        (Some(depart), Some(retour)) => Some(to_f64(to_decimal(depart) - to_decimal(retour))),
        _ => None,
    };

    let mut figures = TripFigures {
        distance,
        carburant_utilise,
        ..Default::default()
    };
    if let (Some(km), Some(litres)) = (distance, carburant_utilise) {
        if km <= 0.0 || litres == 0.0 {
            return Ok(figures);
        }
        // the flag compares the exact ratio, only the stored figure is rounded
        let conso = to_decimal(litres) * Decimal::ONE_HUNDRED / to_decimal(km);
        figures.alerte_surconsommation = conso > rule.threshold();
        figures.consommation = Some(to_f64(conso));
    }
    Ok(figures)
}

/// Distance between two fills and the resulting L/100km
pub fn fuel_figures(input: &FuelRecordInput) -> AppResult<FuelFigures> {
    let distance = to_decimal(input.km_plein2) - to_decimal(input.km_plein1);
    if distance <= Decimal::ZERO {
        return Err(odometer_error(input.km_plein1, input.km_plein2));
    }
    let conso = round2(to_decimal(input.litres_ajoutes) * Decimal::ONE_HUNDRED / distance);
    Ok(FuelFigures {
        distance: to_f64(distance),
        consommation_100km: to_f64(conso),
        ecart_constructeur: input
            .consommation_constructeur
            .map(|c| to_f64(conso - to_decimal(c))),
    })
}

/// Share of available hours, 0 when no hours are tracked
pub fn availability_percentage(disponibles: f64, totales: f64) -> f64 {
    let totales = to_decimal(totales);
    if totales.is_zero() {
        return 0.0;
    }
    to_f64(to_decimal(disponibles) * Decimal::ONE_HUNDRED / totales)
}

/// Cost per kilometre, 0 when the distance is 0
pub fn cost_per_km(montant: f64, km: f64) -> f64 {
    let km = to_decimal(km);
    if km.is_zero() {
        return 0.0;
    }
    to_f64(to_decimal(montant) / km)
}

// ── Lookups ─────────────────────────────────────────────────────────

async fn ensure_vehicle(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> ServiceResult<()> {
    if vehicle::exists(db, tenant_id, vehicle_id).await? {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::VehicleNotFound,
            format!("Vehicle {vehicle_id} not found"),
        )
        .into())
    }
}

async fn ensure_driver(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    driver_id: Option<i64>,
) -> ServiceResult<()> {
    let Some(id) = driver_id else {
        return Ok(());
    };
    super::found(
        driver::find_by_id(db, tenant_id, id).await?,
        ErrorCode::DriverNotFound,
        format!("Driver {id}"),
    )
    .map(|_| ())
}

fn record_not_found(code: ErrorCode, what: &'static str, id: i64) -> impl FnOnce(RepoError) -> ServiceError {
    move |e| match e {
        RepoError::NotFound(_) => {
            ServiceError::App(AppError::with_message(code, format!("{what} {id} not found")))
        }
        other => other.into(),
    }
}

// ── Vehicles ────────────────────────────────────────────────────────

pub async fn create_vehicle(
    pool: &SqlitePool,
    tenant_id: &str,
    data: &VehicleCreate,
) -> ServiceResult<Vehicle> {
    ensure_driver(pool, tenant_id, data.chauffeur_principal_id).await?;
    let created = vehicle::create(pool, tenant_id, data).await.map_err(|e| match e {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::VehicleIdExists, msg).into(),
        other => ServiceError::from(other),
    })?;
    tracing::info!(tenant_id, vehicle_id = %created.id_vehicule, "Vehicle registered");
    Ok(created)
}

pub async fn update_vehicle(
    pool: &SqlitePool,
    tenant_id: &str,
    id_vehicule: &str,
    data: VehicleUpdate,
) -> ServiceResult<Vehicle> {
    ensure_driver(pool, tenant_id, data.chauffeur_principal_id).await?;
    vehicle::update(pool, tenant_id, id_vehicule, data)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::with_message(
                ErrorCode::VehicleNotFound,
                format!("Vehicle {id_vehicule} not found"),
            )
            .into(),
            other => ServiceError::from(other),
        })
}

// ── Vehicle records ─────────────────────────────────────────────────

pub async fn add_document(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &AdminDocumentInput,
) -> ServiceResult<AdminDocument> {
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    let doc = fleet_record::insert_document(pool, tenant_id, vehicle_id, input).await?;
    Ok(doc.with_expiry(shared::util::today()))
}

pub async fn update_document(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &AdminDocumentInput,
) -> ServiceResult<AdminDocument> {
    let doc = fleet_record::update_document(pool, tenant_id, id, input)
        .await
        .map_err(record_not_found(ErrorCode::DocumentNotFound, "Document", id))?;
    Ok(doc.with_expiry(shared::util::today()))
}

pub async fn list_documents(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
) -> ServiceResult<Vec<AdminDocument>> {
    let today = shared::util::today();
    Ok(fleet_record::list_documents(pool, tenant_id, vehicle_id)
        .await?
        .into_iter()
        .map(|d| d.with_expiry(today))
        .collect())
}

/// Documents whose `jours_avant_expiration` is at most `days` (expired ones included)
pub async fn expiring_documents(
    pool: &SqlitePool,
    tenant_id: &str,
    days: i64,
) -> ServiceResult<Vec<AdminDocument>> {
    let today = shared::util::today();
    let limit = today + Duration::days(days);
    Ok(fleet_record::documents_expiring_before(pool, tenant_id, limit)
        .await?
        .into_iter()
        .map(|d| d.with_expiry(today))
        .collect())
}

pub async fn add_distance(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &DistanceRecordInput,
) -> ServiceResult<DistanceRecord> {
    let distance = distance_between(input.km_debut, input.km_fin)?;
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    Ok(fleet_record::insert_distance(pool, tenant_id, vehicle_id, input, distance).await?)
}

pub async fn update_distance(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &DistanceRecordInput,
) -> ServiceResult<DistanceRecord> {
    let distance = distance_between(input.km_debut, input.km_fin)?;
    fleet_record::update_distance(pool, tenant_id, id, input, distance)
        .await
        .map_err(record_not_found(ErrorCode::FleetRecordNotFound, "Distance record", id))
}

pub async fn add_fuel(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &FuelRecordInput,
) -> ServiceResult<FuelRecord> {
    let figures = fuel_figures(input)?;
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    Ok(fleet_record::insert_fuel(pool, tenant_id, vehicle_id, input, figures).await?)
}

pub async fn update_fuel(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &FuelRecordInput,
) -> ServiceResult<FuelRecord> {
    let figures = fuel_figures(input)?;
    fleet_record::update_fuel(pool, tenant_id, id, input, figures)
        .await
        .map_err(record_not_found(ErrorCode::FleetRecordNotFound, "Fuel record", id))
}

pub async fn add_availability(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &AvailabilityInput,
) -> ServiceResult<AvailabilityRecord> {
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    let pourcentage = availability_percentage(input.heures_disponibles, input.heures_totales);
    Ok(fleet_record::insert_availability(pool, tenant_id, vehicle_id, input, pourcentage).await?)
}

pub async fn update_availability(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &AvailabilityInput,
) -> ServiceResult<AvailabilityRecord> {
    let pourcentage = availability_percentage(input.heures_disponibles, input.heures_totales);
    fleet_record::update_availability(pool, tenant_id, id, input, pourcentage)
        .await
        .map_err(record_not_found(ErrorCode::FleetRecordNotFound, "Availability record", id))
}

pub async fn add_operating_cost(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &OperatingCostInput,
) -> ServiceResult<OperatingCost> {
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    let per_km = cost_per_km(input.montant, input.km_actuel);
    Ok(fleet_record::insert_operating_cost(pool, tenant_id, vehicle_id, input, per_km).await?)
}

pub async fn update_operating_cost(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &OperatingCostInput,
) -> ServiceResult<OperatingCost> {
    let per_km = cost_per_km(input.montant, input.km_actuel);
    fleet_record::update_operating_cost(pool, tenant_id, id, input, per_km)
        .await
        .map_err(record_not_found(ErrorCode::FleetRecordNotFound, "Operating cost", id))
}

pub async fn add_financial_cost(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &FinancialCostInput,
) -> ServiceResult<FinancialCost> {
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    let per_km = cost_per_km(input.montant, input.kilometrage);
    Ok(fleet_record::insert_financial_cost(pool, tenant_id, vehicle_id, input, per_km).await?)
}

pub async fn update_financial_cost(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &FinancialCostInput,
) -> ServiceResult<FinancialCost> {
    let per_km = cost_per_km(input.montant, input.kilometrage);
    fleet_record::update_financial_cost(pool, tenant_id, id, input, per_km)
        .await
        .map_err(record_not_found(ErrorCode::FleetRecordNotFound, "Financial cost", id))
}

pub async fn add_incident(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &IncidentInput,
) -> ServiceResult<Incident> {
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    ensure_driver(pool, tenant_id, input.conducteur_id).await?;
    let incident = fleet_record::insert_incident(pool, tenant_id, vehicle_id, input).await?;
    tracing::warn!(tenant_id, vehicle_id, gravite = ?incident.gravite, "Incident reported");
    Ok(incident)
}

pub async fn update_incident(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &IncidentInput,
) -> ServiceResult<Incident> {
    ensure_driver(pool, tenant_id, input.conducteur_id).await?;
    fleet_record::update_incident(pool, tenant_id, id, input)
        .await
        .map_err(record_not_found(ErrorCode::FleetRecordNotFound, "Incident", id))
}

pub async fn add_usage(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    input: &VehicleUsageInput,
) -> ServiceResult<VehicleUsage> {
    let distance = distance_between(input.km_depart, input.km_retour)?;
    ensure_vehicle(pool, tenant_id, vehicle_id).await?;
    ensure_driver(pool, tenant_id, input.conducteur_id).await?;
    Ok(fleet_record::insert_usage(pool, tenant_id, vehicle_id, input, distance).await?)
}

pub async fn update_usage(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &VehicleUsageInput,
) -> ServiceResult<VehicleUsage> {
    let distance = distance_between(input.km_depart, input.km_retour)?;
    ensure_driver(pool, tenant_id, input.conducteur_id).await?;
    fleet_record::update_usage(pool, tenant_id, id, input, distance)
        .await
        .map_err(record_not_found(ErrorCode::FleetRecordNotFound, "Usage", id))
}

// ── Trip sheets ─────────────────────────────────────────────────────

pub async fn create_trip_sheet(
    pool: &SqlitePool,
    tenant_id: &str,
    input: &TripSheetInput,
    rule: OverconsumptionRule,
) -> ServiceResult<TripSheet> {
    let figures = trip_figures(input, rule)?;
    ensure_vehicle(pool, tenant_id, &input.vehicle_id).await?;
    ensure_driver(pool, tenant_id, Some(input.driver_id)).await?;
    let sheet = trip_sheet::insert(pool, tenant_id, input, figures).await?;
    if sheet.alerte_surconsommation {
        tracing::warn!(
            tenant_id,
            vehicle_id = %sheet.vehicle_id,
            consommation = ?sheet.consommation,
            "Trip over fuel threshold"
        );
    }
    Ok(sheet)
}

pub async fn update_trip_sheet(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &TripSheetInput,
    rule: OverconsumptionRule,
) -> ServiceResult<TripSheet> {
    let figures = trip_figures(input, rule)?;
    ensure_vehicle(pool, tenant_id, &input.vehicle_id).await?;
    ensure_driver(pool, tenant_id, Some(input.driver_id)).await?;
    trip_sheet::update(pool, tenant_id, id, input, figures)
        .await
        .map_err(record_not_found(ErrorCode::TripSheetNotFound, "Trip sheet", id))
}

// ── Dashboard ───────────────────────────────────────────────────────

pub async fn dashboard(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<FleetDashboard> {
    let today = shared::util::today();
    let (first, last) = month_bounds(today.month(), today.year())?;

    let mut board = FleetDashboard::default();
    for (status, n) in vehicle::count_by_status(pool, tenant_id).await? {
        board.vehicules_total += n;
        match status {
            VehicleStatus::Actif => board.vehicules_actifs = n,
            VehicleStatus::Maintenance => board.vehicules_maintenance = n,
            VehicleStatus::HorsService => board.vehicules_hors_service = n,
        }
    }
    board.chauffeurs = driver::count(pool, tenant_id).await?;
    board.alertes_actives = alert::count_active(pool, tenant_id).await?;
    board.documents_expirant_30j =
        fleet_record::count_documents_expiring(pool, tenant_id, today, today + Duration::days(30))
            .await?;
    board.couts_exploitation_mois =
        fleet_record::sum_operating_costs(pool, tenant_id, first, last).await?;
    board.litres_carburant_mois = fleet_record::sum_fuel_litres(pool, tenant_id, first, last).await?;
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{
        OTHER_TENANT, TENANT, seed_vehicle, test_pool, vehicle_payload,
    };
    use chrono::NaiveDate;
    use shared::models::{DriverInput, TripPurpose};

    fn trip(km: (f64, f64), fuel: (f64, f64)) -> TripSheetInput {
        TripSheetInput {
            vehicle_id: "V001".into(),
            driver_id: 0,
            date_depart: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            heure_depart: "07:30".into(),
            destination: "Kankan".into(),
            objet: TripPurpose::Mission,
            km_depart: Some(km.0),
            carburant_depart: Some(fuel.0),
            km_retour: Some(km.1),
            carburant_retour: Some(fuel.1),
            date_retour: None,
            heure_retour: None,
            signature_chauffeur: false,
            signature_responsable: false,
        }
    }

    #[test]
    fn trip_consumption_and_alert() {
        let rule = OverconsumptionRule::default();
        let f = trip_figures(&trip((1000.0, 1100.0), (40.0, 28.0)), rule).unwrap();
        assert_eq!(f.distance, Some(100.0));
        assert_eq!(f.carburant_utilise, Some(12.0));
        assert_eq!(f.consommation, Some(12.0));
        assert!(f.alerte_surconsommation);

        let f = trip_figures(&trip((1000.0, 1100.0), (40.0, 29.0)), rule).unwrap();
        assert_eq!(f.consommation, Some(11.0));
        assert!(!f.alerte_surconsommation);
    }

    #[test]
    fn alert_uses_exact_consumption() {
        // 27.51 L over 250 km = 11.004 L/100km, stored as 11.00
        let f = trip_figures(
            &trip((1000.0, 1250.0), (40.0, 12.49)),
            OverconsumptionRule::default(),
        )
        .unwrap();
        assert_eq!(f.carburant_utilise, Some(27.51));
        assert_eq!(f.consommation, Some(11.0));
        assert!(f.alerte_surconsommation);
    }

    #[test]
    fn trip_without_return_has_no_figures() {
        let mut input = trip((1000.0, 0.0), (40.0, 0.0));
        input.km_retour = None;
        input.carburant_retour = None;
        let f = trip_figures(&input, OverconsumptionRule::default()).unwrap();
        assert_eq!(f, TripFigures::default());
    }

    #[test]
    fn backwards_odometer_is_rejected() {
        let err = trip_figures(&trip((1100.0, 1000.0), (40.0, 30.0)), OverconsumptionRule::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOdometer);
        assert_eq!(distance_between(10.0, 10.0).unwrap(), 0.0);
    }

    #[test]
    fn fuel_figures_against_manufacturer() {
        let input = FuelRecordInput {
            date_plein1: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            km_plein1: 20_000.0,
            date_plein2: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            km_plein2: 20_400.0,
            litres_ajoutes: 34.0,
            consommation_constructeur: Some(7.5),
        };
        let f = fuel_figures(&input).unwrap();
        assert_eq!(f.distance, 400.0);
        assert_eq!(f.consommation_100km, 8.5);
        assert_eq!(f.ecart_constructeur, Some(1.0));

        let same_km = FuelRecordInput {
            km_plein2: 20_000.0,
            ..input
        };
        assert_eq!(fuel_figures(&same_km).unwrap_err().code, ErrorCode::InvalidOdometer);
    }

    #[test]
    fn ratios_default_to_zero() {
        assert_eq!(availability_percentage(18.0, 24.0), 75.0);
        assert_eq!(availability_percentage(5.0, 0.0), 0.0);
        assert_eq!(cost_per_km(150_000.0, 300.0), 500.0);
        assert_eq!(cost_per_km(150_000.0, 0.0), 0.0);
    }

    async fn seed_driver(pool: &SqlitePool, tenant: &str) -> i64 {
        driver::create(
            pool,
            tenant,
            &DriverInput {
                nom: "Bah".into(),
                prenom: "Ibrahima".into(),
                numero_permis: "GN-12345".into(),
                date_embauche: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
                date_expiration_permis: None,
                telephone: String::new(),
                email: None,
                statut: "Actif".into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn trip_sheet_checks_vehicle_and_driver_tenancy() {
        let pool = test_pool().await;
        seed_vehicle(&pool, OTHER_TENANT, "V001").await;
        let driver_id = seed_driver(&pool, TENANT).await;
        let mut input = trip((1000.0, 1100.0), (40.0, 28.0));
        input.driver_id = driver_id;

        let err = create_trip_sheet(&pool, TENANT, &input, OverconsumptionRule::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::VehicleNotFound));

        seed_vehicle(&pool, TENANT, "V001").await;
        let sheet = create_trip_sheet(&pool, TENANT, &input, OverconsumptionRule::default())
            .await
            .unwrap();
        assert!(sheet.alerte_surconsommation);
        assert_eq!(sheet.consommation, Some(12.0));

        input.carburant_retour = Some(31.0);
        let sheet = update_trip_sheet(&pool, TENANT, sheet.id, &input, OverconsumptionRule::default())
            .await
            .unwrap();
        assert!(!sheet.alerte_surconsommation);
    }

    #[tokio::test]
    async fn duplicate_vehicle_id_has_its_own_code() {
        let pool = test_pool().await;
        create_vehicle(&pool, TENANT, &vehicle_payload("V001")).await.unwrap();
        let err = create_vehicle(&pool, TENANT, &vehicle_payload("V001")).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::VehicleIdExists));
        // identifiers are unique per tenant only
        create_vehicle(&pool, OTHER_TENANT, &vehicle_payload("V001")).await.unwrap();
    }

    #[tokio::test]
    async fn expiring_documents_include_expired_ones() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        let today = shared::util::today();
        for (numero, offset) in [("ASS-1", -3), ("VT-1", 10), ("CG-1", 90)] {
            add_document(
                &pool,
                TENANT,
                "V001",
                &AdminDocumentInput {
                    type_document: "Assurance".into(),
                    numero: numero.into(),
                    date_emission: today - Duration::days(365),
                    date_expiration: today + Duration::days(offset),
                    commentaires: String::new(),
                },
            )
            .await
            .unwrap();
        }

        let docs = expiring_documents(&pool, TENANT, 30).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].est_expire);
        assert_eq!(docs[0].jours_avant_expiration, -3);
        assert_eq!(docs[1].jours_avant_expiration, 10);

        let board = dashboard(&pool, TENANT).await.unwrap();
        assert_eq!(board.documents_expirant_30j, 1);
    }

    #[tokio::test]
    async fn dashboard_counts_current_month() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        let mut broken = vehicle_payload("V002");
        broken.statut_actuel = VehicleStatus::Maintenance;
        create_vehicle(&pool, TENANT, &broken).await.unwrap();
        seed_vehicle(&pool, OTHER_TENANT, "V003").await;
        seed_driver(&pool, TENANT).await;

        let today = shared::util::today();
        add_operating_cost(
            &pool,
            TENANT,
            "V001",
            &OperatingCostInput {
                date: today,
                type_cout: "Entretien".into(),
                montant: 250_000.0,
                km_actuel: 5_000.0,
                description: String::new(),
            },
        )
        .await
        .unwrap();
        add_fuel(
            &pool,
            TENANT,
            "V002",
            &FuelRecordInput {
                date_plein1: today,
                km_plein1: 100.0,
                date_plein2: today,
                km_plein2: 300.0,
                litres_ajoutes: 20.0,
                consommation_constructeur: None,
            },
        )
        .await
        .unwrap();

        let board = dashboard(&pool, TENANT).await.unwrap();
        assert_eq!(board.vehicules_total, 2);
        assert_eq!(board.vehicules_actifs, 1);
        assert_eq!(board.vehicules_maintenance, 1);
        assert_eq!(board.chauffeurs, 1);
        assert_eq!(board.couts_exploitation_mois, 250_000.0);
        assert_eq!(board.litres_carburant_mois, 20.0);
    }

    #[tokio::test]
    async fn record_updates_recompute_derived_fields() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        let day = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        let mut availability = AvailabilityInput {
            date_debut: day,
            date_fin: day,
            heures_disponibles: 18.0,
            heures_totales: 24.0,
            raison: String::new(),
        };
        let row = add_availability(&pool, TENANT, "V001", &availability).await.unwrap();
        assert_eq!(row.pourcentage, 75.0);
        availability.heures_disponibles = 12.0;
        let row = update_availability(&pool, TENANT, row.id, &availability).await.unwrap();
        assert_eq!(row.pourcentage, 50.0);

        let mut operating = OperatingCostInput {
            date: day,
            type_cout: "Entretien".into(),
            montant: 150_000.0,
            km_actuel: 300.0,
            description: String::new(),
        };
        let cost = add_operating_cost(&pool, TENANT, "V001", &operating).await.unwrap();
        assert_eq!(cost.cout_par_km, 500.0);
        operating.km_actuel = 600.0;
        let cost = update_operating_cost(&pool, TENANT, cost.id, &operating).await.unwrap();
        assert_eq!(cost.cout_par_km, 250.0);

        let mut financial = FinancialCostInput {
            date: day,
            type_cout: "Assurance".into(),
            montant: 1_000_000.0,
            kilometrage: 0.0,
            periode_amortissement: Some(36),
            description: String::new(),
        };
        let cost = add_financial_cost(&pool, TENANT, "V001", &financial).await.unwrap();
        assert_eq!(cost.cout_par_km, 0.0);
        financial.kilometrage = 4_000.0;
        let cost = update_financial_cost(&pool, TENANT, cost.id, &financial).await.unwrap();
        assert_eq!(cost.cout_par_km, 250.0);

        let mut usage = VehicleUsageInput {
            date_debut: day,
            date_fin: day,
            conducteur_id: None,
            departement: shared::models::Department::Logistique,
            motif: "Livraison".into(),
            km_depart: 1_000.0,
            km_retour: 1_120.0,
            observations: String::new(),
        };
        let row = add_usage(&pool, TENANT, "V001", &usage).await.unwrap();
        assert_eq!(row.distance, 120.0);
        usage.km_retour = 1_200.0;
        let row = update_usage(&pool, TENANT, row.id, &usage).await.unwrap();
        assert_eq!(row.distance, 200.0);
        usage.km_retour = 900.0;
        let err = update_usage(&pool, TENANT, row.id, &usage).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InvalidOdometer));
    }

    #[tokio::test]
    async fn incident_update_is_tenant_scoped() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V001").await;
        let mut input = IncidentInput {
            date_incident: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            type_incident: shared::models::IncidentType::Incident,
            gravite: shared::models::Severity::Faible,
            conducteur_id: None,
            lieu: "Coyah".into(),
            description: String::new(),
            mesures_prises: String::new(),
            commentaires: String::new(),
        };
        let incident = add_incident(&pool, TENANT, "V001", &input).await.unwrap();

        input.gravite = shared::models::Severity::Elevee;
        let updated = update_incident(&pool, TENANT, incident.id, &input).await.unwrap();
        assert_eq!(updated.gravite, shared::models::Severity::Elevee);
        let found = fleet_record::find_incident(&pool, TENANT, incident.id).await.unwrap();
        assert_eq!(found.map(|i| i.gravite), Some(shared::models::Severity::Elevee));

        let err = update_incident(&pool, OTHER_TENANT, incident.id, &input).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::FleetRecordNotFound));
        assert!(
            fleet_record::find_incident(&pool, OTHER_TENANT, incident.id)
                .await
                .unwrap()
                .is_none()
        );
    }

}
