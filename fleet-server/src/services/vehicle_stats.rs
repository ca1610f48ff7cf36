//! Per-vehicle statistics over a date range and side-by-side comparison

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DailyLogStatus, Vehicle, VehicleComparison, VehicleStats};
use sqlx::SqlitePool;

use super::fleet::{availability_percentage, cost_per_km};
use super::found;
use super::rental::days_inclusive;
use crate::db::repository::{vehicle, vehicle_stats as repo};
use crate::error::ServiceResult;
use crate::utils::money::{to_decimal, to_f64};

/// Range used when `du` is omitted, counted back from `au`
pub const DEFAULT_RANGE_DAYS: i64 = 90;

/// Vehicles compared when no id is given
pub const DEFAULT_COMPARED: usize = 5;

/// `au` defaults to today, `du` to `DEFAULT_RANGE_DAYS` before `au`
pub fn resolve_range(du: Option<NaiveDate>, au: Option<NaiveDate>) -> AppResult<(NaiveDate, NaiveDate)> {
    let au = au.unwrap_or_else(shared::util::today);
    let du = du.unwrap_or(au - Duration::days(DEFAULT_RANGE_DAYS));
    if au < du {
        return Err(AppError::with_message(
            ErrorCode::InvalidPeriod,
            format!("au {au} precedes du {du}"),
        ));
    }
    Ok((du, au))
}

fn ratio(part: f64, whole: f64, scale: Decimal) -> f64 {
    let whole = to_decimal(whole);
    if whole.is_zero() {
        return 0.0;
    }
    to_f64(to_decimal(part) * scale / whole)
}

async fn stats_for(
    pool: &SqlitePool,
    tenant_id: &str,
    v: &Vehicle,
    du: NaiveDate,
    au: NaiveDate,
) -> ServiceResult<VehicleStats> {
    let id = v.id_vehicule.as_str();
    let trips = repo::trip_totals(pool, tenant_id, id, du, au).await?;
    let usage_km = repo::usage_distance(pool, tenant_id, id, du, au).await?;
    let fuel = repo::fuel_totals(pool, tenant_id, id, du, au).await?;
    let operating = repo::operating_totals(pool, tenant_id, id, du, au).await?;
    let financial = repo::financial_total(pool, tenant_id, id, du, au).await?;
    let availability = repo::availability_totals(pool, tenant_id, id, du, au).await?;
    let incidents = repo::incident_count(pool, tenant_id, id, du, au).await?;

    let (mut jours_factures, mut frais_location) = (0, 0.0);
    let (mut jours_entretien, mut jours_hors_service) = (0, 0);
    for (statut, days, tarifs) in repo::rental_days(pool, tenant_id, id, du, au).await? {
        match statut {
            DailyLogStatus::Travail => {
                jours_factures = days;
                frais_location = tarifs;
            }
            DailyLogStatus::Entretien => jours_entretien = days,
            DailyLogStatus::HorsService => jours_hors_service = days,
            DailyLogStatus::Inactif => {}
        }
    }

    let jours_periode = days_inclusive(du, au);
    let jours_actifs = trips.completed + jours_factures;
    let distance = to_f64(to_decimal(trips.distance) + to_decimal(usage_km));
    let cout_total = to_f64(to_decimal(operating.total) + to_decimal(financial));

    Ok(VehicleStats {
        vehicle_id: v.id_vehicule.clone(),
        immatriculation: v.immatriculation.clone(),
        du,
        au,
        jours_periode,
        jours_actifs,
        jours_entretien,
        jours_hors_service,
        pourcentage_actif: ratio(jours_actifs as f64, jours_periode as f64, Decimal::ONE_HUNDRED),
        distance_parcourue: distance,
        carburant_litres: to_f64(to_decimal(fuel.litres)),
        consommation_moyenne: ratio(fuel.litres, fuel.distance, Decimal::ONE_HUNDRED),
        cout_entretien: to_f64(to_decimal(operating.entretien)),
        couts_exploitation: to_f64(to_decimal(operating.total)),
        couts_financiers: to_f64(to_decimal(financial)),
        cout_total,
        cout_par_km: cost_per_km(cout_total, distance),
        disponibilite: availability_percentage(availability.disponibles, availability.totales),
        incidents,
        jours_factures,
        frais_location: to_f64(to_decimal(frais_location)),
        rentabilite: to_f64(to_decimal(frais_location) - to_decimal(cout_total)),
    })
}

pub async fn vehicle_stats(
    pool: &SqlitePool,
    tenant_id: &str,
    vehicle_id: &str,
    du: NaiveDate,
    au: NaiveDate,
) -> ServiceResult<VehicleStats> {
    let v = found(
        vehicle::find_by_id(pool, tenant_id, vehicle_id).await?,
        ErrorCode::VehicleNotFound,
        format!("Vehicle {vehicle_id}"),
    )?;
    stats_for(pool, tenant_id, &v, du, au).await
}

/// Stats of the requested vehicles, or of the first `DEFAULT_COMPARED` ones
pub async fn compare(
    pool: &SqlitePool,
    tenant_id: &str,
    ids: &[String],
    du: NaiveDate,
    au: NaiveDate,
) -> ServiceResult<VehicleComparison> {
    let vehicles = if ids.is_empty() {
        let mut all = vehicle::find_all(pool, tenant_id, None).await?;
        all.truncate(DEFAULT_COMPARED);
        all
    } else {
        let mut picked = Vec::with_capacity(ids.len());
        for id in ids {
            picked.push(found(
                vehicle::find_by_id(pool, tenant_id, id).await?,
                ErrorCode::VehicleNotFound,
                format!("Vehicle {id}"),
            )?);
        }
        picked
    };

    let mut vehicules = Vec::with_capacity(vehicles.len());
    for v in &vehicles {
        vehicules.push(stats_for(pool, tenant_id, v, du, au).await?);
    }
    Ok(VehicleComparison { du, au, vehicules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::driver;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_vehicle, test_pool};
    use crate::error::ServiceError;
    use crate::services::{fleet, rental};
    use shared::models::{
        AvailabilityInput, DailyLogInput, Department, DriverInput, FinancialCostInput,
        FuelRecordInput, IncidentInput, IncidentType, OperatingCostInput, RentalInput, Severity,
        TripPurpose, TripSheetInput, VehicleUsageInput,
    };

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    async fn seed_driver(pool: &SqlitePool) -> i64 {
        driver::create(
            pool,
            TENANT,
            &DriverInput {
                nom: "Sylla".into(),
                prenom: "Aminata".into(),
                numero_permis: "GN-777".into(),
                date_embauche: date(1),
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

    async fn seed_activity(pool: &SqlitePool) {
        seed_vehicle(pool, TENANT, "V001").await;
        let driver_id = seed_driver(pool).await;

        // one completed trip, one still on the road
        for (d, returned) in [(2, true), (3, false)] {
            fleet::create_trip_sheet(
                pool,
                TENANT,
                &TripSheetInput {
                    vehicle_id: "V001".into(),
                    driver_id,
                    date_depart: date(d),
                    heure_depart: "08:00".into(),
                    destination: "Boké".into(),
                    objet: TripPurpose::Mission,
                    km_depart: Some(1_000.0),
                    carburant_depart: None,
                    km_retour: returned.then_some(1_300.0),
                    carburant_retour: None,
                    date_retour: returned.then_some(date(d)),
                    heure_retour: None,
                    signature_chauffeur: returned,
                    signature_responsable: false,
                },
                fleet::OverconsumptionRule::default(),
            )
            .await
            .unwrap();
        }
        fleet::add_usage(
            pool,
            TENANT,
            "V001",
            &VehicleUsageInput {
                date_debut: date(5),
                date_fin: date(5),
                conducteur_id: None,
                departement: Department::Logistique,
                motif: String::new(),
                km_depart: 1_300.0,
                km_retour: 1_500.0,
                observations: String::new(),
            },
        )
        .await
        .unwrap();
        fleet::add_fuel(
            pool,
            TENANT,
            "V001",
            &FuelRecordInput {
                date_plein1: date(1),
                km_plein1: 1_000.0,
                date_plein2: date(10),
                km_plein2: 1_500.0,
                litres_ajoutes: 45.0,
                consommation_constructeur: None,
            },
        )
        .await
        .unwrap();
        for (kind, montant) in [("Entretien", 200_000.0), ("Pneus", 100_000.0)] {
            fleet::add_operating_cost(
                pool,
                TENANT,
                "V001",
                &OperatingCostInput {
                    date: date(12),
                    type_cout: kind.into(),
                    montant,
                    km_actuel: 1_500.0,
                    description: String::new(),
                },
            )
            .await
            .unwrap();
        }
        fleet::add_financial_cost(
            pool,
            TENANT,
            "V001",
            &FinancialCostInput {
                date: date(15),
                type_cout: "Assurance".into(),
                montant: 200_000.0,
                kilometrage: 1_500.0,
                periode_amortissement: None,
                description: String::new(),
            },
        )
        .await
        .unwrap();
        fleet::add_availability(
            pool,
            TENANT,
            "V001",
            &AvailabilityInput {
                date_debut: date(1),
                date_fin: date(30),
                heures_disponibles: 540.0,
                heures_totales: 720.0,
                raison: String::new(),
            },
        )
        .await
        .unwrap();
        fleet::add_incident(
            pool,
            TENANT,
            "V001",
            &IncidentInput {
                date_incident: date(20),
                type_incident: IncidentType::Incident,
                gravite: Severity::Faible,
                conducteur_id: None,
                lieu: String::new(),
                description: String::new(),
                mesures_prises: String::new(),
                commentaires: String::new(),
            },
        )
        .await
        .unwrap();

        let r = rental::create_rental(
            pool,
            TENANT,
            &RentalInput {
                vehicle_id: "V001".into(),
                supplier_id: None,
                type_location: Default::default(),
                date_debut: date(1),
                date_fin: None,
                tarif_journalier: 150_000.0,
                statut: Default::default(),
                observations: String::new(),
            },
        )
        .await
        .unwrap();
        for (d, statut) in [
            (16, DailyLogStatus::Travail),
            (17, DailyLogStatus::Travail),
            (18, DailyLogStatus::Travail),
            (19, DailyLogStatus::Entretien),
        ] {
            rental::record_log(
                pool,
                TENANT,
                r.id,
                &DailyLogInput {
                    date: date(d),
                    statut,
                    commentaire: String::new(),
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn stats_aggregate_the_range() {
        let pool = test_pool().await;
        seed_activity(&pool).await;

        let s = vehicle_stats(&pool, TENANT, "V001", date(1), date(30)).await.unwrap();
        assert_eq!(s.jours_periode, 30);
        // 1 completed trip + 3 rental work days
        assert_eq!(s.jours_actifs, 4);
        assert_eq!(s.jours_entretien, 1);
        assert_eq!(s.jours_hors_service, 0);
        assert_eq!(s.pourcentage_actif, 13.33);
        // 300 km trip + 200 km usage
        assert_eq!(s.distance_parcourue, 500.0);
        assert_eq!(s.carburant_litres, 45.0);
        assert_eq!(s.consommation_moyenne, 9.0);
        assert_eq!(s.cout_entretien, 200_000.0);
        assert_eq!(s.couts_exploitation, 300_000.0);
        assert_eq!(s.couts_financiers, 200_000.0);
        assert_eq!(s.cout_total, 500_000.0);
        assert_eq!(s.cout_par_km, 1_000.0);
        assert_eq!(s.disponibilite, 75.0);
        assert_eq!(s.incidents, 1);
        assert_eq!(s.jours_factures, 3);
        assert_eq!(s.frais_location, 450_000.0);
        assert_eq!(s.rentabilite, -50_000.0);
    }

    #[tokio::test]
    async fn range_excludes_outside_records() {
        let pool = test_pool().await;
        seed_activity(&pool).await;

        let s = vehicle_stats(&pool, TENANT, "V001", date(16), date(18)).await.unwrap();
        assert_eq!(s.jours_periode, 3);
        assert_eq!(s.jours_actifs, 3);
        assert_eq!(s.distance_parcourue, 0.0);
        assert_eq!(s.cout_par_km, 0.0);
        assert_eq!(s.consommation_moyenne, 0.0);
        assert_eq!(s.cout_total, 0.0);
        assert_eq!(s.frais_location, 450_000.0);
        // the month-long availability record overlaps
        assert_eq!(s.disponibilite, 75.0);
    }

    #[tokio::test]
    async fn compare_defaults_and_tenancy() {
        let pool = test_pool().await;
        seed_activity(&pool).await;
        seed_vehicle(&pool, TENANT, "V002").await;
        seed_vehicle(&pool, OTHER_TENANT, "V003").await;

        let all = compare(&pool, TENANT, &[], date(1), date(30)).await.unwrap();
        let ids: Vec<_> = all.vehicules.iter().map(|s| s.vehicle_id.as_str()).collect();
        assert_eq!(ids, ["V001", "V002"]);
        assert_eq!(all.vehicules[1].jours_actifs, 0);

        let picked = compare(&pool, TENANT, &["V002".to_string()], date(1), date(30))
            .await
            .unwrap();
        assert_eq!(picked.vehicules.len(), 1);

        let err = compare(&pool, TENANT, &["V003".to_string()], date(1), date(30))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::VehicleNotFound));
    }

    #[test]
    fn range_defaults_and_order() {
        let (du, au) = resolve_range(None, Some(date(30))).unwrap();
        assert_eq!(au, date(30));
        assert_eq!(du, date(30) - Duration::days(DEFAULT_RANGE_DAYS));
        let err = resolve_range(Some(date(10)), Some(date(9))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPeriod);
    }
}
