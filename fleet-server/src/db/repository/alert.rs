//! Alert Repository

use super::{RepoError, RepoResult, delete_scoped};
use shared::models::{Alert, AlertCreate, AlertLevel, AlertStatus, AlertUpdate};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str =
    "id, vehicle_id, titre, description, type_alerte, niveau, statut, date_creation, date_resolution";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: Option<AlertStatus>,
    niveau: Option<AlertLevel>,
) -> RepoResult<Vec<Alert>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM alert WHERE tenant_id = ?1 AND (?2 IS NULL OR statut = ?2) AND (?3 IS NULL OR niveau = ?3) ORDER BY date_creation DESC"
    );
    let rows = sqlx::query_as::<_, Alert>(&sql)
        .bind(tenant_id)
        .bind(statut)
        .bind(niveau)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Alert>> {
    let sql = format!("SELECT {COLUMNS} FROM alert WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Alert>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &AlertCreate,
) -> RepoResult<Alert> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO alert (id, tenant_id, vehicle_id, titre, description, type_alerte, niveau, statut, date_creation) VALUES (?, ?, ?, ?, ?, ?, ?, 'Active', ?) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, Alert>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.vehicle_id)
        .bind(&data.titre)
        .bind(&data.description)
        .bind(&data.type_alerte)
        .bind(data.niveau)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Partial update. Moving to `Résolue` stamps `date_resolution`;
/// moving to any other status clears it.
pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: AlertUpdate,
) -> RepoResult<Alert> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE alert SET titre = COALESCE(?1, titre), description = COALESCE(?2, description), type_alerte = COALESCE(?3, type_alerte), niveau = COALESCE(?4, niveau), \
         date_resolution = CASE WHEN ?5 IS NULL THEN date_resolution WHEN ?5 = 'Résolue' THEN COALESCE(date_resolution, ?6) ELSE NULL END, \
         statut = COALESCE(?5, statut) WHERE id = ?7 AND tenant_id = ?8 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Alert>(&sql)
        .bind(data.titre)
        .bind(data.description)
        .bind(data.type_alerte)
        .bind(data.niveau)
        .bind(data.statut)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Alert {id} not found")))
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    delete_scoped(db, "alert", tenant_id, id).await
}

pub async fn count_active(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<i64> {
    let n: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM alert WHERE tenant_id = ? AND statut = 'Active'")
            .bind(tenant_id)
            .fetch_one(db)
            .await?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, test_pool};

    fn payload(niveau: AlertLevel) -> AlertCreate {
        AlertCreate {
            vehicle_id: None,
            titre: "Assurance expirée".into(),
            description: String::new(),
            type_alerte: "Document".into(),
            niveau,
        }
    }

    #[tokio::test]
    async fn resolution_date_follows_status() {
        let pool = test_pool().await;
        let alert = create(&pool, TENANT, &payload(AlertLevel::Critique)).await.unwrap();
        assert_eq!(alert.statut, AlertStatus::Active);
        assert!(alert.date_resolution.is_none());

        let resolved = update(
            &pool,
            TENANT,
            alert.id,
            AlertUpdate {
                statut: Some(AlertStatus::Resolue),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(resolved.date_resolution.is_some());

        // Unrelated edit keeps the stamp
        let renamed = update(
            &pool,
            TENANT,
            alert.id,
            AlertUpdate {
                titre: Some("Assurance".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.date_resolution, resolved.date_resolution);

        let reopened = update(
            &pool,
            TENANT,
            alert.id,
            AlertUpdate {
                statut: Some(AlertStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(reopened.date_resolution.is_none());
    }

    #[tokio::test]
    async fn filters_and_counts() {
        let pool = test_pool().await;
        create(&pool, TENANT, &payload(AlertLevel::Critique)).await.unwrap();
        let low = create(&pool, TENANT, &payload(AlertLevel::Faible)).await.unwrap();
        create(&pool, OTHER_TENANT, &payload(AlertLevel::Faible)).await.unwrap();
        update(
            &pool,
            TENANT,
            low.id,
            AlertUpdate {
                statut: Some(AlertStatus::Ignoree),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(count_active(&pool, TENANT).await.unwrap(), 1);
        let critical = find_all(&pool, TENANT, None, Some(AlertLevel::Critique)).await.unwrap();
        assert_eq!(critical.len(), 1);
        let ignored = find_all(&pool, TENANT, Some(AlertStatus::Ignoree), None).await.unwrap();
        assert_eq!(ignored.len(), 1);
        assert_eq!(find_all(&pool, TENANT, None, None).await.unwrap().len(), 2);
    }
}
