//! Per-vehicle aggregates over a date range

use super::RepoResult;
use chrono::NaiveDate;
use shared::models::DailyLogStatus;
use sqlx::{Executor, FromRow, Sqlite};

#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct TripTotals {
    /// Trip sheets returned and signed by the driver
    pub completed: i64,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct FuelTotals {
    pub litres: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct OperatingTotals {
    pub total: f64,
    pub entretien: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct AvailabilityTotals {
    pub disponibles: f64,
    pub totales: f64,
}

/// Trip sheets departing within `[from, to]`
pub async fn trip_totals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<TripTotals> {
    let row = sqlx::query_as::<_, TripTotals>(
        "SELECT COALESCE(SUM(CASE WHEN date_retour IS NOT NULL AND signature_chauffeur = 1 THEN 1 ELSE 0 END), 0) AS completed, \
         COALESCE(SUM(distance), 0.0) AS distance \
         FROM trip_sheet WHERE tenant_id = ? AND vehicle_id = ? AND date_depart BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Fuel records whose second fill falls within `[from, to]`
pub async fn fuel_totals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<FuelTotals> {
    let row = sqlx::query_as::<_, FuelTotals>(
        "SELECT COALESCE(SUM(litres_ajoutes), 0.0) AS litres, COALESCE(SUM(distance), 0.0) AS distance \
         FROM fuel_record WHERE tenant_id = ? AND vehicle_id = ? AND date_plein2 BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Σ usage-log distance for usages starting within `[from, to]`
pub async fn usage_distance(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(distance), 0.0) FROM vehicle_usage WHERE tenant_id = ? AND vehicle_id = ? AND date_debut BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(total)
}

pub async fn operating_totals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<OperatingTotals> {
    let row = sqlx::query_as::<_, OperatingTotals>(
        "SELECT COALESCE(SUM(montant), 0.0) AS total, \
         COALESCE(SUM(CASE WHEN type_cout = 'Entretien' THEN montant ELSE 0.0 END), 0.0) AS entretien \
         FROM operating_cost WHERE tenant_id = ? AND vehicle_id = ? AND date BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn financial_total(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(montant), 0.0) FROM financial_cost WHERE tenant_id = ? AND vehicle_id = ? AND date BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(total)
}

/// Availability records overlapping `[from, to]`
pub async fn availability_totals(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<AvailabilityTotals> {
    let row = sqlx::query_as::<_, AvailabilityTotals>(
        "SELECT COALESCE(SUM(heures_disponibles), 0.0) AS disponibles, COALESCE(SUM(heures_totales), 0.0) AS totales \
         FROM availability_record WHERE tenant_id = ? AND vehicle_id = ? AND date_debut <= ? AND date_fin >= ?",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(to)
    .bind(from)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn incident_count(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM incident WHERE tenant_id = ? AND vehicle_id = ? AND date_incident BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(n)
}

/// `(statut, days, Σ daily rate)` of the vehicle's rental logs within `[from, to]`
pub async fn rental_days(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<(DailyLogStatus, i64, f64)>> {
    let rows = sqlx::query_as::<_, (DailyLogStatus, i64, f64)>(
        "SELECT l.statut, COUNT(*), COALESCE(SUM(r.tarif_journalier), 0.0) \
         FROM rental_daily_log l JOIN rental r ON r.id = l.rental_id \
         WHERE l.tenant_id = ? AND r.vehicle_id = ? AND l.date BETWEEN ? AND ? \
         GROUP BY l.statut",
    )
    .bind(tenant_id)
    .bind(vehicle_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
