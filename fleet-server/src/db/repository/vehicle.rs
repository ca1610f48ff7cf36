//! Vehicle Repository

use super::{RepoError, RepoResult};
use shared::models::{Vehicle, VehicleCreate, VehicleStatus, VehicleUpdate};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id_vehicule, immatriculation, marque, modele, type_moteur, categorie, statut_actuel, date_mise_service, date_acquisition, kilometrage_initial, affectation, numero_chassis, numero_moteur, observations, chauffeur_principal_id, fournisseur_id, created_at, updated_at";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: Option<VehicleStatus>,
) -> RepoResult<Vec<Vehicle>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM vehicle WHERE tenant_id = ?1 AND (?2 IS NULL OR statut_actuel = ?2) ORDER BY id_vehicule"
    );
    let rows = sqlx::query_as::<_, Vehicle>(&sql)
        .bind(tenant_id)
        .bind(statut)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id_vehicule: &str,
) -> RepoResult<Option<Vehicle>> {
    let sql = format!("SELECT {COLUMNS} FROM vehicle WHERE tenant_id = ? AND id_vehicule = ?");
    let row = sqlx::query_as::<_, Vehicle>(&sql)
        .bind(tenant_id)
        .bind(id_vehicule)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn exists(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id_vehicule: &str,
) -> RepoResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM vehicle WHERE tenant_id = ? AND id_vehicule = ?")
            .bind(tenant_id)
            .bind(id_vehicule)
            .fetch_one(db)
            .await?;
    Ok(count > 0)
}

pub async fn create(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &VehicleCreate,
) -> RepoResult<Vehicle> {
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO vehicle (tenant_id, id_vehicule, immatriculation, marque, modele, type_moteur, categorie, statut_actuel, date_mise_service, date_acquisition, kilometrage_initial, affectation, numero_chassis, numero_moteur, observations, chauffeur_principal_id, fournisseur_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Vehicle>(&sql)
        .bind(tenant_id)
        .bind(&data.id_vehicule)
        .bind(&data.immatriculation)
        .bind(&data.marque)
        .bind(&data.modele)
        .bind(data.type_moteur)
        .bind(data.categorie)
        .bind(data.statut_actuel)
        .bind(data.date_mise_service)
        .bind(data.date_acquisition)
        .bind(data.kilometrage_initial)
        .bind(&data.affectation)
        .bind(&data.numero_chassis)
        .bind(&data.numero_moteur)
        .bind(&data.observations)
        .bind(data.chauffeur_principal_id)
        .bind(data.fournisseur_id)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Vehicle '{}' already exists", data.id_vehicule))
            }
            other => other,
        })
}

pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id_vehicule: &str,
    data: VehicleUpdate,
) -> RepoResult<Vehicle> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE vehicle SET immatriculation = COALESCE(?1, immatriculation), marque = COALESCE(?2, marque), modele = COALESCE(?3, modele), type_moteur = COALESCE(?4, type_moteur), categorie = COALESCE(?5, categorie), statut_actuel = COALESCE(?6, statut_actuel), date_mise_service = COALESCE(?7, date_mise_service), date_acquisition = COALESCE(?8, date_acquisition), kilometrage_initial = COALESCE(?9, kilometrage_initial), affectation = COALESCE(?10, affectation), numero_chassis = COALESCE(?11, numero_chassis), numero_moteur = COALESCE(?12, numero_moteur), observations = COALESCE(?13, observations), chauffeur_principal_id = COALESCE(?14, chauffeur_principal_id), fournisseur_id = COALESCE(?15, fournisseur_id), updated_at = ?16 WHERE tenant_id = ?17 AND id_vehicule = ?18 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Vehicle>(&sql)
        .bind(data.immatriculation)
        .bind(data.marque)
        .bind(data.modele)
        .bind(data.type_moteur)
        .bind(data.categorie)
        .bind(data.statut_actuel)
        .bind(data.date_mise_service)
        .bind(data.date_acquisition)
        .bind(data.kilometrage_initial)
        .bind(data.affectation)
        .bind(data.numero_chassis)
        .bind(data.numero_moteur)
        .bind(data.observations)
        .bind(data.chauffeur_principal_id)
        .bind(data.fournisseur_id)
        .bind(now)
        .bind(tenant_id)
        .bind(id_vehicule)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Vehicle {id_vehicule} not found")))
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id_vehicule: &str,
) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM vehicle WHERE tenant_id = ? AND id_vehicule = ?")
        .bind(tenant_id)
        .bind(id_vehicule)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Vehicle {id_vehicule} not found")));
    }
    Ok(())
}

/// Vehicle count per status
pub async fn count_by_status(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<Vec<(VehicleStatus, i64)>> {
    let rows = sqlx::query_as::<_, (VehicleStatus, i64)>(
        "SELECT statut_actuel, COUNT(*) FROM vehicle WHERE tenant_id = ? GROUP BY statut_actuel",
    )
    .bind(tenant_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, test_pool, vehicle_payload as payload};

    #[tokio::test]
    async fn id_is_unique_per_tenant() {
        let pool = test_pool().await;
        create(&pool, TENANT, &payload("V-001")).await.unwrap();
        let err = create(&pool, TENANT, &payload("V-001")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        create(&pool, OTHER_TENANT, &payload("V-001")).await.unwrap();
        assert!(find_by_id(&pool, OTHER_TENANT, "V-001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_and_count_by_status() {
        let pool = test_pool().await;
        create(&pool, TENANT, &payload("V-001")).await.unwrap();
        create(&pool, TENANT, &payload("V-002")).await.unwrap();
        let v = update(
            &pool,
            TENANT,
            "V-002",
            VehicleUpdate {
                statut_actuel: Some(VehicleStatus::Maintenance),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(v.statut_actuel, VehicleStatus::Maintenance);
        assert_eq!(v.marque, "Toyota");

        let counts = count_by_status(&pool, TENANT).await.unwrap();
        assert!(counts.contains(&(VehicleStatus::Actif, 1)));
        assert!(counts.contains(&(VehicleStatus::Maintenance, 1)));
    }
}
