//! Driver Repository (chauffeurs)

use super::{RepoError, RepoResult};
use shared::models::{Driver, DriverInput};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, nom, prenom, numero_permis, date_embauche, date_expiration_permis, telephone, email, statut, created_at, updated_at";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<Vec<Driver>> {
    let sql = format!("SELECT {COLUMNS} FROM driver WHERE tenant_id = ? ORDER BY nom, prenom");
    let rows = sqlx::query_as::<_, Driver>(&sql)
        .bind(tenant_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Driver>> {
    let sql = format!("SELECT {COLUMNS} FROM driver WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Driver>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: &DriverInput,
) -> RepoResult<Driver> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO driver (id, tenant_id, nom, prenom, numero_permis, date_embauche, date_expiration_permis, telephone, email, statut, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, Driver>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.nom)
        .bind(&data.prenom)
        .bind(&data.numero_permis)
        .bind(data.date_embauche)
        .bind(data.date_expiration_permis)
        .bind(&data.telephone)
        .bind(&data.email)
        .bind(&data.statut)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: &DriverInput,
) -> RepoResult<Driver> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE driver SET nom = ?, prenom = ?, numero_permis = ?, date_embauche = ?, date_expiration_permis = ?, telephone = ?, email = ?, statut = ?, updated_at = ? WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Driver>(&sql)
        .bind(&data.nom)
        .bind(&data.prenom)
        .bind(&data.numero_permis)
        .bind(data.date_embauche)
        .bind(data.date_expiration_permis)
        .bind(&data.telephone)
        .bind(&data.email)
        .bind(&data.statut)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Driver {id} not found")))
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    super::delete_scoped(db, "driver", tenant_id, id).await
}

pub async fn count(db: impl Executor<'_, Database = Sqlite>, tenant_id: &str) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM driver WHERE tenant_id = ?")
        .bind(tenant_id)
        .fetch_one(db)
        .await?;
    Ok(n)
}
