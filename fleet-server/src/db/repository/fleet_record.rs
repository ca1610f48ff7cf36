//! Per-vehicle Fleet Record Repository
//!
//! Documents, distance readings, fuel fills, availability, costs,
//! incidents and usage logs. Derived columns arrive computed from
//! `services::fleet`.

use super::{RepoError, RepoResult, delete_scoped};
use chrono::NaiveDate;
use shared::models::{
    AdminDocument, AdminDocumentInput, AvailabilityInput, AvailabilityRecord, DistanceRecord,
    DistanceRecordInput, FinancialCost, FinancialCostInput, FuelRecord, FuelRecordInput, Incident,
    IncidentInput, OperatingCost, OperatingCostInput, VehicleUsage, VehicleUsageInput,
};
use sqlx::{Executor, Sqlite};

/// Record tables deletable by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Document,
    Distance,
    Fuel,
    Availability,
    OperatingCost,
    FinancialCost,
    Incident,
    Usage,
}

impl RecordKind {
    fn table(self) -> &'static str {
        match self {
            RecordKind::Document => "admin_document",
            RecordKind::Distance => "distance_record",
            RecordKind::Fuel => "fuel_record",
            RecordKind::Availability => "availability_record",
            RecordKind::OperatingCost => "operating_cost",
            RecordKind::FinancialCost => "financial_cost",
            RecordKind::Incident => "incident",
            RecordKind::Usage => "vehicle_usage",
        }
    }
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    kind: RecordKind,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    delete_scoped(db, kind.table(), tenant_id, id).await
}

// ── Administrative documents ────────────────────────────────────────

const DOCUMENT_COLUMNS: &str =
    "id, vehicle_id, type_document, numero, date_emission, date_expiration, commentaires, created_at";

pub async fn list_documents(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<AdminDocument>> {
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM admin_document WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date_expiration"
    );
    let rows = sqlx::query_as::<_, AdminDocument>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Documents expiring on or before `limit` (already expired included)
pub async fn documents_expiring_before(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    limit: NaiveDate,
) -> RepoResult<Vec<AdminDocument>> {
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM admin_document WHERE tenant_id = ? AND date_expiration <= ? ORDER BY date_expiration"
    );
    let rows = sqlx::query_as::<_, AdminDocument>(&sql)
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Documents expiring within `[from, to]`
pub async fn count_documents_expiring(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM admin_document WHERE tenant_id = ? AND date_expiration BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(n)
}

pub async fn find_document(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<AdminDocument>> {
    let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM admin_document WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, AdminDocument>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert_document(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &AdminDocumentInput,
) -> RepoResult<AdminDocument> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO admin_document (id, tenant_id, vehicle_id, type_document, numero, date_emission, date_expiration, commentaires, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {DOCUMENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, AdminDocument>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(&data.type_document)
        .bind(&data.numero)
        .bind(data.date_emission)
        .bind(data.date_expiration)
        .bind(&data.commentaires)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_document(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &AdminDocumentInput,
) -> RepoResult<AdminDocument> {
    let sql = format!(
        "UPDATE admin_document SET type_document = ?, numero = ?, date_emission = ?, date_expiration = ?, commentaires = ? WHERE id = ? AND tenant_id = ? RETURNING {DOCUMENT_COLUMNS}"
    );
    sqlx::query_as::<_, AdminDocument>(&sql)
        .bind(&data.type_document)
        .bind(&data.numero)
        .bind(data.date_emission)
        .bind(data.date_expiration)
        .bind(&data.commentaires)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Document {id} not found")))
}

// ── Distance readings ───────────────────────────────────────────────

const DISTANCE_COLUMNS: &str = "id, vehicle_id, date_debut, km_debut, date_fin, km_fin, distance_parcourue, type_moteur, limite_annuelle, created_at";

pub async fn list_distances(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<DistanceRecord>> {
    let sql = format!(
        "SELECT {DISTANCE_COLUMNS} FROM distance_record WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date_debut DESC"
    );
    let rows = sqlx::query_as::<_, DistanceRecord>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_distance(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<DistanceRecord>> {
    let sql =
        format!("SELECT {DISTANCE_COLUMNS} FROM distance_record WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, DistanceRecord>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert_distance(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &DistanceRecordInput,
    distance_parcourue: f64,
) -> RepoResult<DistanceRecord> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO distance_record (id, tenant_id, vehicle_id, date_debut, km_debut, date_fin, km_fin, distance_parcourue, type_moteur, limite_annuelle, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {DISTANCE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, DistanceRecord>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(data.date_debut)
        .bind(data.km_debut)
        .bind(data.date_fin)
        .bind(data.km_fin)
        .bind(distance_parcourue)
        .bind(&data.type_moteur)
        .bind(data.limite_annuelle)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_distance(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &DistanceRecordInput,
    distance_parcourue: f64,
) -> RepoResult<DistanceRecord> {
    let sql = format!(
        "UPDATE distance_record SET date_debut = ?, km_debut = ?, date_fin = ?, km_fin = ?, distance_parcourue = ?, type_moteur = ?, limite_annuelle = ? WHERE id = ? AND tenant_id = ? RETURNING {DISTANCE_COLUMNS}"
    );
    sqlx::query_as::<_, DistanceRecord>(&sql)
        .bind(data.date_debut)
        .bind(data.km_debut)
        .bind(data.date_fin)
        .bind(data.km_fin)
        .bind(distance_parcourue)
        .bind(&data.type_moteur)
        .bind(data.limite_annuelle)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Distance record {id} not found")))
}

// ── Fuel consumption ────────────────────────────────────────────────

const FUEL_COLUMNS: &str = "id, vehicle_id, date_plein1, km_plein1, date_plein2, km_plein2, litres_ajoutes, distance, consommation_100km, consommation_constructeur, ecart_constructeur, created_at";

/// Derived fuel figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelFigures {
    pub distance: f64,
    pub consommation_100km: f64,
    pub ecart_constructeur: Option<f64>,
}

pub async fn list_fuel(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<FuelRecord>> {
    let sql = format!(
        "SELECT {FUEL_COLUMNS} FROM fuel_record WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date_plein2 DESC"
    );
    let rows = sqlx::query_as::<_, FuelRecord>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_fuel(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<FuelRecord>> {
    let sql = format!("SELECT {FUEL_COLUMNS} FROM fuel_record WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, FuelRecord>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert_fuel(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &FuelRecordInput,
    figures: FuelFigures,
) -> RepoResult<FuelRecord> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO fuel_record (id, tenant_id, vehicle_id, date_plein1, km_plein1, date_plein2, km_plein2, litres_ajoutes, distance, consommation_100km, consommation_constructeur, ecart_constructeur, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {FUEL_COLUMNS}"
    );
    let row = sqlx::query_as::<_, FuelRecord>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(data.date_plein1)
        .bind(data.km_plein1)
        .bind(data.date_plein2)
        .bind(data.km_plein2)
        .bind(data.litres_ajoutes)
        .bind(figures.distance)
        .bind(figures.consommation_100km)
        .bind(data.consommation_constructeur)
        .bind(figures.ecart_constructeur)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_fuel(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &FuelRecordInput,
    figures: FuelFigures,
) -> RepoResult<FuelRecord> {
    let sql = format!(
        "UPDATE fuel_record SET date_plein1 = ?, km_plein1 = ?, date_plein2 = ?, km_plein2 = ?, litres_ajoutes = ?, distance = ?, consommation_100km = ?, consommation_constructeur = ?, ecart_constructeur = ? WHERE id = ? AND tenant_id = ? RETURNING {FUEL_COLUMNS}"
    );
    sqlx::query_as::<_, FuelRecord>(&sql)
        .bind(data.date_plein1)
        .bind(data.km_plein1)
        .bind(data.date_plein2)
        .bind(data.km_plein2)
        .bind(data.litres_ajoutes)
        .bind(figures.distance)
        .bind(figures.consommation_100km)
        .bind(data.consommation_constructeur)
        .bind(figures.ecart_constructeur)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Fuel record {id} not found")))
}

/// Σ litres of fills whose second fill date falls in `[from, to]`
pub async fn sum_fuel_litres(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(litres_ajoutes), 0.0) FROM fuel_record WHERE tenant_id = ? AND date_plein2 BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(total)
}

// ── Availability ────────────────────────────────────────────────────

const AVAILABILITY_COLUMNS: &str = "id, vehicle_id, date_debut, date_fin, heures_disponibles, heures_totales, pourcentage, raison, created_at";

pub async fn list_availability(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<AvailabilityRecord>> {
    let sql = format!(
        "SELECT {AVAILABILITY_COLUMNS} FROM availability_record WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date_debut DESC"
    );
    let rows = sqlx::query_as::<_, AvailabilityRecord>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert_availability(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &AvailabilityInput,
    pourcentage: f64,
) -> RepoResult<AvailabilityRecord> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO availability_record (id, tenant_id, vehicle_id, date_debut, date_fin, heures_disponibles, heures_totales, pourcentage, raison, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {AVAILABILITY_COLUMNS}"
    );
    let row = sqlx::query_as::<_, AvailabilityRecord>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(data.date_debut)
        .bind(data.date_fin)
        .bind(data.heures_disponibles)
        .bind(data.heures_totales)
        .bind(pourcentage)
        .bind(&data.raison)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn find_availability(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<AvailabilityRecord>> {
    let sql = format!(
        "SELECT {AVAILABILITY_COLUMNS} FROM availability_record WHERE id = ? AND tenant_id = ?"
    );
    let row = sqlx::query_as::<_, AvailabilityRecord>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn update_availability(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &AvailabilityInput,
    pourcentage: f64,
) -> RepoResult<AvailabilityRecord> {
    let sql = format!(
        "UPDATE availability_record SET date_debut = ?, date_fin = ?, heures_disponibles = ?, heures_totales = ?, pourcentage = ?, raison = ? WHERE id = ? AND tenant_id = ? RETURNING {AVAILABILITY_COLUMNS}"
    );
    sqlx::query_as::<_, AvailabilityRecord>(&sql)
        .bind(data.date_debut)
        .bind(data.date_fin)
        .bind(data.heures_disponibles)
        .bind(data.heures_totales)
        .bind(pourcentage)
        .bind(&data.raison)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Availability record {id} not found")))
}

// ── Costs ───────────────────────────────────────────────────────────

const OPERATING_COLUMNS: &str =
    "id, vehicle_id, date, type_cout, montant, km_actuel, cout_par_km, description, created_at";

pub async fn list_operating_costs(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<OperatingCost>> {
    let sql = format!(
        "SELECT {OPERATING_COLUMNS} FROM operating_cost WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date DESC"
    );
    let rows = sqlx::query_as::<_, OperatingCost>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert_operating_cost(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &OperatingCostInput,
    cout_par_km: f64,
) -> RepoResult<OperatingCost> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO operating_cost (id, tenant_id, vehicle_id, date, type_cout, montant, km_actuel, cout_par_km, description, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {OPERATING_COLUMNS}"
    );
    let row = sqlx::query_as::<_, OperatingCost>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(data.date)
        .bind(&data.type_cout)
        .bind(data.montant)
        .bind(data.km_actuel)
        .bind(cout_par_km)
        .bind(&data.description)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn find_operating_cost(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<OperatingCost>> {
    let sql = format!("SELECT {OPERATING_COLUMNS} FROM operating_cost WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, OperatingCost>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn update_operating_cost(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &OperatingCostInput,
    cout_par_km: f64,
) -> RepoResult<OperatingCost> {
    let sql = format!(
        "UPDATE operating_cost SET date = ?, type_cout = ?, montant = ?, km_actuel = ?, cout_par_km = ?, description = ? WHERE id = ? AND tenant_id = ? RETURNING {OPERATING_COLUMNS}"
    );
    sqlx::query_as::<_, OperatingCost>(&sql)
        .bind(data.date)
        .bind(&data.type_cout)
        .bind(data.montant)
        .bind(data.km_actuel)
        .bind(cout_par_km)
        .bind(&data.description)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Operating cost {id} not found")))
}

/// Σ operating costs dated within `[from, to]`
pub async fn sum_operating_costs(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(montant), 0.0) FROM operating_cost WHERE tenant_id = ? AND date BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(total)
}

const FINANCIAL_COLUMNS: &str = "id, vehicle_id, date, type_cout, montant, kilometrage, periode_amortissement, cout_par_km, description, created_at";

pub async fn list_financial_costs(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<FinancialCost>> {
    let sql = format!(
        "SELECT {FINANCIAL_COLUMNS} FROM financial_cost WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date DESC"
    );
    let rows = sqlx::query_as::<_, FinancialCost>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert_financial_cost(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &FinancialCostInput,
    cout_par_km: f64,
) -> RepoResult<FinancialCost> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO financial_cost (id, tenant_id, vehicle_id, date, type_cout, montant, kilometrage, periode_amortissement, cout_par_km, description, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {FINANCIAL_COLUMNS}"
    );
    let row = sqlx::query_as::<_, FinancialCost>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(data.date)
        .bind(&data.type_cout)
        .bind(data.montant)
        .bind(data.kilometrage)
        .bind(data.periode_amortissement)
        .bind(cout_par_km)
        .bind(&data.description)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn find_financial_cost(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<FinancialCost>> {
    let sql = format!("SELECT {FINANCIAL_COLUMNS} FROM financial_cost WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, FinancialCost>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn update_financial_cost(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &FinancialCostInput,
    cout_par_km: f64,
) -> RepoResult<FinancialCost> {
    let sql = format!(
        "UPDATE financial_cost SET date = ?, type_cout = ?, montant = ?, kilometrage = ?, periode_amortissement = ?, cout_par_km = ?, description = ? WHERE id = ? AND tenant_id = ? RETURNING {FINANCIAL_COLUMNS}"
    );
    sqlx::query_as::<_, FinancialCost>(&sql)
        .bind(data.date)
        .bind(&data.type_cout)
        .bind(data.montant)
        .bind(data.kilometrage)
        .bind(data.periode_amortissement)
        .bind(cout_par_km)
        .bind(&data.description)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Financial cost {id} not found")))
}

// ── Incidents ───────────────────────────────────────────────────────

const INCIDENT_COLUMNS: &str = "id, vehicle_id, date_incident, type_incident, gravite, conducteur_id, lieu, description, mesures_prises, commentaires, created_at";

pub async fn list_incidents(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<Incident>> {
    let sql = format!(
        "SELECT {INCIDENT_COLUMNS} FROM incident WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date_incident DESC"
    );
    let rows = sqlx::query_as::<_, Incident>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert_incident(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &IncidentInput,
) -> RepoResult<Incident> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO incident (id, tenant_id, vehicle_id, date_incident, type_incident, gravite, conducteur_id, lieu, description, mesures_prises, commentaires, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {INCIDENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Incident>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(data.date_incident)
        .bind(data.type_incident)
        .bind(data.gravite)
        .bind(data.conducteur_id)
        .bind(&data.lieu)
        .bind(&data.description)
        .bind(&data.mesures_prises)
        .bind(&data.commentaires)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn find_incident(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Incident>> {
    let sql = format!("SELECT {INCIDENT_COLUMNS} FROM incident WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Incident>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn update_incident(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &IncidentInput,
) -> RepoResult<Incident> {
    let sql = format!(
        "UPDATE incident SET date_incident = ?, type_incident = ?, gravite = ?, conducteur_id = ?, lieu = ?, description = ?, mesures_prises = ?, commentaires = ? WHERE id = ? AND tenant_id = ? RETURNING {INCIDENT_COLUMNS}"
    );
    sqlx::query_as::<_, Incident>(&sql)
        .bind(data.date_incident)
        .bind(data.type_incident)
        .bind(data.gravite)
        .bind(data.conducteur_id)
        .bind(&data.lieu)
        .bind(&data.description)
        .bind(&data.mesures_prises)
        .bind(&data.commentaires)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Incident {id} not found")))
}

// ── Usage log ───────────────────────────────────────────────────────

const USAGE_COLUMNS: &str = "id, vehicle_id, date_debut, date_fin, conducteur_id, departement, motif, km_depart, km_retour, distance, observations, created_at";

pub async fn list_usages(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
) -> RepoResult<Vec<VehicleUsage>> {
    let sql = format!(
        "SELECT {USAGE_COLUMNS} FROM vehicle_usage WHERE tenant_id = ? AND vehicle_id = ? ORDER BY date_debut DESC"
    );
    let rows = sqlx::query_as::<_, VehicleUsage>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert_usage(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    data: &VehicleUsageInput,
    distance: f64,
) -> RepoResult<VehicleUsage> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO vehicle_usage (id, tenant_id, vehicle_id, date_debut, date_fin, conducteur_id, departement, motif, km_depart, km_retour, distance, observations, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {USAGE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, VehicleUsage>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(vehicle_id)
        .bind(data.date_debut)
        .bind(data.date_fin)
        .bind(data.conducteur_id)
        .bind(data.departement)
        .bind(&data.motif)
        .bind(data.km_depart)
        .bind(data.km_retour)
        .bind(distance)
        .bind(&data.observations)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn find_usage(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<VehicleUsage>> {
    let sql = format!("SELECT {USAGE_COLUMNS} FROM vehicle_usage WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, VehicleUsage>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn update_usage(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &VehicleUsageInput,
    distance: f64,
) -> RepoResult<VehicleUsage> {
    let sql = format!(
        "UPDATE vehicle_usage SET date_debut = ?, date_fin = ?, conducteur_id = ?, departement = ?, motif = ?, km_depart = ?, km_retour = ?, distance = ?, observations = ? WHERE id = ? AND tenant_id = ? RETURNING {USAGE_COLUMNS}"
    );
    sqlx::query_as::<_, VehicleUsage>(&sql)
        .bind(data.date_debut)
        .bind(data.date_fin)
        .bind(data.conducteur_id)
        .bind(data.departement)
        .bind(&data.motif)
        .bind(data.km_depart)
        .bind(data.km_retour)
        .bind(distance)
        .bind(&data.observations)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Usage {id} not found")))
}
