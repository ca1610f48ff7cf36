//! Trip Sheet Repository

use super::{RepoError, RepoResult, delete_scoped};
use chrono::NaiveDate;
use shared::models::{TripFigures, TripSheet, TripSheetInput};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, vehicle_id, driver_id, date_depart, heure_depart, destination, objet, km_depart, carburant_depart, km_retour, carburant_retour, date_retour, heure_retour, distance, carburant_utilise, consommation, alerte_surconsommation, signature_chauffeur, signature_responsable, created_at, updated_at";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    vehicle_id: Option<&str>,
) -> RepoResult<Vec<TripSheet>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM trip_sheet WHERE tenant_id = ?1 AND (?2 IS NULL OR vehicle_id = ?2) ORDER BY date_depart DESC, heure_depart DESC"
    );
    let rows = sqlx::query_as::<_, TripSheet>(&sql)
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<TripSheet>> {
    let sql = format!("SELECT {COLUMNS} FROM trip_sheet WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, TripSheet>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &TripSheetInput,
    figures: TripFigures,
) -> RepoResult<TripSheet> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO trip_sheet (id, tenant_id, vehicle_id, driver_id, date_depart, heure_depart, destination, objet, km_depart, carburant_depart, km_retour, carburant_retour, date_retour, heure_retour, distance, carburant_utilise, consommation, alerte_surconsommation, signature_chauffeur, signature_responsable, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?21) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, TripSheet>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.vehicle_id)
        .bind(data.driver_id)
        .bind(data.date_depart)
        .bind(&data.heure_depart)
        .bind(&data.destination)
        .bind(data.objet)
        .bind(data.km_depart)
        .bind(data.carburant_depart)
        .bind(data.km_retour)
        .bind(data.carburant_retour)
        .bind(data.date_retour)
        .bind(&data.heure_retour)
        .bind(figures.distance)
        .bind(figures.carburant_utilise)
        .bind(figures.consommation)
        .bind(figures.alerte_surconsommation)
        .bind(data.signature_chauffeur)
        .bind(data.signature_responsable)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Full replace; derived figures are recomputed by the caller
pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &TripSheetInput,
    figures: TripFigures,
) -> RepoResult<TripSheet> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE trip_sheet SET vehicle_id = ?1, driver_id = ?2, date_depart = ?3, heure_depart = ?4, destination = ?5, objet = ?6, km_depart = ?7, carburant_depart = ?8, km_retour = ?9, carburant_retour = ?10, date_retour = ?11, heure_retour = ?12, \
         distance = ?13, carburant_utilise = ?14, consommation = ?15, alerte_surconsommation = ?16, signature_chauffeur = ?17, signature_responsable = ?18, updated_at = ?19 \
         WHERE id = ?20 AND tenant_id = ?21 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, TripSheet>(&sql)
        .bind(&data.vehicle_id)
        .bind(data.driver_id)
        .bind(data.date_depart)
        .bind(&data.heure_depart)
        .bind(&data.destination)
        .bind(data.objet)
        .bind(data.km_depart)
        .bind(data.carburant_depart)
        .bind(data.km_retour)
        .bind(data.carburant_retour)
        .bind(data.date_retour)
        .bind(&data.heure_retour)
        .bind(figures.distance)
        .bind(figures.carburant_utilise)
        .bind(figures.consommation)
        .bind(figures.alerte_surconsommation)
        .bind(data.signature_chauffeur)
        .bind(data.signature_responsable)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Trip sheet {id} not found")))
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    delete_scoped(db, "trip_sheet", tenant_id, id).await
}

/// Trip sheets departing within `[from, to]`
pub async fn count_between(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM trip_sheet WHERE tenant_id = ? AND date_depart BETWEEN ? AND ?",
    )
    .bind(tenant_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::driver;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, seed_vehicle, test_pool};
    use shared::models::{DriverInput, TripPurpose};

    async fn seed_driver(pool: &sqlx::SqlitePool) -> i64 {
        driver::create(
            pool,
            TENANT,
            &DriverInput {
                nom: "Bah".into(),
                prenom: "Ibrahima".into(),
                numero_permis: "P-778".into(),
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

    fn input(driver_id: i64) -> TripSheetInput {
        TripSheetInput {
            vehicle_id: "V-001".into(),
            driver_id,
            date_depart: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            heure_depart: "07:30".into(),
            destination: "Kindia".into(),
            objet: TripPurpose::Mission,
            km_depart: Some(10_000.0),
            carburant_depart: Some(60.0),
            km_retour: None,
            carburant_retour: None,
            date_retour: None,
            heure_retour: None,
            signature_chauffeur: false,
            signature_responsable: false,
        }
    }

    #[tokio::test]
    async fn insert_then_close_trip() {
        let pool = test_pool().await;
        seed_vehicle(&pool, TENANT, "V-001").await;
        let driver_id = seed_driver(&pool).await;

        let sheet = insert(&pool, TENANT, &input(driver_id), TripFigures::default()).await.unwrap();
        assert!(sheet.distance.is_none());

        let mut closed = input(driver_id);
        closed.km_retour = Some(10_250.0);
        closed.carburant_retour = Some(30.0);
        let figures = TripFigures {
            distance: Some(250.0),
            carburant_utilise: Some(30.0),
            consommation: Some(12.0),
            alerte_surconsommation: true,
        };
        let updated = update(&pool, TENANT, sheet.id, &closed, figures).await.unwrap();
        assert_eq!(updated.distance, Some(250.0));
        assert!(updated.alerte_surconsommation);

        assert!(find_by_id(&pool, OTHER_TENANT, sheet.id).await.unwrap().is_none());
        assert_eq!(find_all(&pool, TENANT, Some("V-001")).await.unwrap().len(), 1);
        let march = (
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        assert_eq!(count_between(&pool, TENANT, march.0, march.1).await.unwrap(), 1);
    }
}
