//! Monthly Archive Repository

use super::{RepoError, RepoResult};
use shared::models::{ArchiveStatus, MonthlyArchive};
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, mois, annee, statut, nb_employes_actifs, nb_jours_travailles, donnees_presences, donnees_paies, donnees_heures_supp, total_salaire_brut, total_deductions, total_net_paye, date_creation, date_cloture, commentaires";

/// Snapshot contents of a new archive
#[derive(Debug, Clone)]
pub struct ArchiveSnapshot {
    pub mois: u32,
    pub annee: i32,
    pub nb_employes_actifs: i64,
    pub nb_jours_travailles: i64,
    pub donnees_presences: serde_json::Value,
    pub donnees_paies: serde_json::Value,
    pub donnees_heures_supp: serde_json::Value,
    pub total_salaire_brut: f64,
    pub total_deductions: f64,
    pub total_net_paye: f64,
    pub commentaires: String,
}

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<Vec<MonthlyArchive>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM monthly_archive WHERE tenant_id = ? ORDER BY annee DESC, mois DESC"
    );
    let rows = sqlx::query_as::<_, MonthlyArchive>(&sql)
        .bind(tenant_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<MonthlyArchive>> {
    let sql = format!("SELECT {COLUMNS} FROM monthly_archive WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, MonthlyArchive>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn exists_for_period(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    mois: u32,
    annee: i32,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM monthly_archive WHERE tenant_id = ? AND mois = ? AND annee = ?",
    )
    .bind(tenant_id)
    .bind(mois)
    .bind(annee)
    .fetch_one(db)
    .await?;
    Ok(count > 0)
}

pub async fn insert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    snapshot: ArchiveSnapshot,
) -> RepoResult<MonthlyArchive> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO monthly_archive (id, tenant_id, mois, annee, statut, nb_employes_actifs, nb_jours_travailles, donnees_presences, donnees_paies, donnees_heures_supp, total_salaire_brut, total_deductions, total_net_paye, date_creation, commentaires) VALUES (?, ?, ?, ?, 'En cours', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    );
    let (mois, annee) = (snapshot.mois, snapshot.annee);
    sqlx::query_as::<_, MonthlyArchive>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(snapshot.mois)
        .bind(snapshot.annee)
        .bind(snapshot.nb_employes_actifs)
        .bind(snapshot.nb_jours_travailles)
        .bind(Json(snapshot.donnees_presences))
        .bind(Json(snapshot.donnees_paies))
        .bind(Json(snapshot.donnees_heures_supp))
        .bind(snapshot.total_salaire_brut)
        .bind(snapshot.total_deductions)
        .bind(snapshot.total_net_paye)
        .bind(now)
        .bind(snapshot.commentaires)
        .fetch_one(db)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Archive {mois:02}/{annee} already exists"))
            }
            other => other,
        })
}

/// Move an archive from `from` to `to`; `date_cloture` is stamped on close
pub async fn transition(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    from: ArchiveStatus,
    to: ArchiveStatus,
) -> RepoResult<Option<MonthlyArchive>> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE monthly_archive SET statut = ?1, date_cloture = CASE WHEN ?1 = 'Clôturé' THEN ?2 ELSE date_cloture END WHERE id = ?3 AND tenant_id = ?4 AND statut = ?5 RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, MonthlyArchive>(&sql)
        .bind(to)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .bind(from)
        .fetch_optional(db)
        .await?;
    Ok(row)
}
