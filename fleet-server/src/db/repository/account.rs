//! Account Repository (users, entreprises, profiles)
//!
//! Account tables are global; they are the source of the tenant key.

use super::{RepoError, RepoResult};
use shared::models::{AccountType, Entreprise, EntrepriseCreate, Profile, Role, User};
use sqlx::{Executor, Sqlite};

const USER_COLUMNS: &str = "id, username, email, hashed_password, is_active, created_at";
const ENTREPRISE_COLUMNS: &str =
    "id, nom, secteur, adresse, telephone, email, nif, rccm, created_at";

pub async fn find_user_by_username(
    db: impl Executor<'_, Database = Sqlite>,
    username: &str,
) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE username = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_user_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn create_user(
    db: impl Executor<'_, Database = Sqlite>,
    username: &str,
    email: &str,
    hashed_password: &str,
) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO app_user (id, username, email, hashed_password, is_active, created_at) VALUES (?, ?, ?, ?, 1, ?) RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Username '{username}' already taken"))
            }
            other => other,
        })
}

pub async fn set_user_active(
    db: impl Executor<'_, Database = Sqlite>,
    id: i64,
    active: bool,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE app_user SET is_active = ? WHERE id = ?")
        .bind(active)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

pub async fn create_entreprise(
    db: impl Executor<'_, Database = Sqlite>,
    data: &EntrepriseCreate,
) -> RepoResult<Entreprise> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO entreprise (id, nom, secteur, adresse, telephone, email, nif, rccm, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {ENTREPRISE_COLUMNS}"
    );
    let entreprise = sqlx::query_as::<_, Entreprise>(&sql)
        .bind(id)
        .bind(&data.nom)
        .bind(&data.secteur)
        .bind(&data.adresse)
        .bind(&data.telephone)
        .bind(&data.email)
        .bind(&data.nif)
        .bind(&data.rccm)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(entreprise)
}

pub async fn find_entreprise(
    db: impl Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Entreprise>> {
    let sql = format!("SELECT {ENTREPRISE_COLUMNS} FROM entreprise WHERE id = ?");
    let entreprise = sqlx::query_as::<_, Entreprise>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(entreprise)
}

pub async fn create_profile(
    db: impl Executor<'_, Database = Sqlite>,
    profile: &Profile,
) -> RepoResult<Profile> {
    let created = sqlx::query_as::<_, Profile>(
        "INSERT INTO profile (user_id, entreprise_id, telephone, account_type, role) VALUES (?, ?, ?, ?, ?) RETURNING user_id, entreprise_id, telephone, account_type, role",
    )
    .bind(profile.user_id)
    .bind(profile.entreprise_id)
    .bind(&profile.telephone)
    .bind(profile.account_type)
    .bind(profile.role)
    .fetch_one(db)
    .await?;
    Ok(created)
}

pub async fn find_profile(
    db: impl Executor<'_, Database = Sqlite>,
    user_id: i64,
) -> RepoResult<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT user_id, entreprise_id, telephone, account_type, role FROM profile WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

/// Number of profiles attached to an entreprise
pub async fn count_entreprise_members(
    db: impl Executor<'_, Database = Sqlite>,
    entreprise_id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile WHERE entreprise_id = ?")
        .bind(entreprise_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn update_role(
    db: impl Executor<'_, Database = Sqlite>,
    user_id: i64,
    role: Role,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE profile SET role = ? WHERE user_id = ?")
        .bind(role)
        .bind(user_id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Profile {user_id} not found")));
    }
    Ok(())
}

/// Profile for a freshly registered user
pub fn new_profile(
    user_id: i64,
    entreprise_id: Option<i64>,
    telephone: String,
    account_type: AccountType,
    role: Role,
) -> Profile {
    Profile {
        user_id,
        entreprise_id,
        telephone,
        account_type,
        role,
    }
}
