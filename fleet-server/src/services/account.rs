//! Registration, login and the authenticated account summary

use shared::error::{AppError, ErrorCode};
use shared::models::{
    AccountInfo, AccountType, LoginRequest, LoginResponse, Profile, RegisterRequest, Role,
    tenant_key,
};
use sqlx::SqlitePool;
use validator::ValidateEmail;

use super::found;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{JwtService, TenantIdentity};
use crate::db::repository::account::{self as repo, new_profile};
use crate::db::repository::RepoError;
use crate::error::{ServiceError, ServiceResult};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN,
    MIN_PASSWORD_LEN, validate_required_text, validate_text_len,
};

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    validate_required_text(&req.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&req.email, "email", MAX_EMAIL_LEN)?;
    if !req.email.is_empty() && !req.email.validate_email() {
        return Err(AppError::validation(format!("'{}' is not a valid email", req.email)));
    }
    validate_text_len(&req.telephone, "telephone", MAX_SHORT_TEXT_LEN)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    validate_text_len(&req.password, "password", MAX_PASSWORD_LEN)?;
    if let Some(ent) = &req.entreprise {
        validate_required_text(&ent.nom, "entreprise.nom", MAX_NAME_LEN)?;
        validate_text_len(&ent.adresse, "entreprise.adresse", MAX_ADDRESS_LEN)?;
        validate_text_len(&ent.email, "entreprise.email", MAX_EMAIL_LEN)?;
        validate_text_len(&ent.nif, "entreprise.nif", MAX_SHORT_TEXT_LEN)?;
        validate_text_len(&ent.rccm, "entreprise.rccm", MAX_SHORT_TEXT_LEN)?;
    }
    if req.account_type == AccountType::Entreprise
        && req.entreprise.is_none()
        && req.entreprise_id.is_none()
    {
        return Err(AppError::new(ErrorCode::EntrepriseRequired));
    }
    Ok(())
}

/// Create the user, its profile and (for a new company) the entreprise.
///
/// The first member of an entreprise becomes its admin.
pub async fn register(pool: &SqlitePool, req: &RegisterRequest) -> ServiceResult<AccountInfo> {
    validate_registration(req)?;
    let hashed = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    let username = req.username.trim();

    let mut tx = pool.begin().await?;
    let user = repo::create_user(&mut *tx, username, req.email.trim(), &hashed)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(msg) => {
                ServiceError::App(AppError::with_message(ErrorCode::UsernameTaken, msg))
            }
            other => ServiceError::from(other),
        })?;

    let entreprise = match (req.account_type, req.entreprise_id, &req.entreprise) {
        (AccountType::Personne, _, _) => None,
        (AccountType::Entreprise, Some(id), _) => Some(found(
            repo::find_entreprise(&mut *tx, id).await?,
            ErrorCode::TenantNotFound,
            format!("Entreprise {id}"),
        )?),
        (AccountType::Entreprise, None, Some(details)) => {
            Some(repo::create_entreprise(&mut *tx, details).await?)
        }
        (AccountType::Entreprise, None, None) => {
            return Err(AppError::new(ErrorCode::EntrepriseRequired).into());
        }
    };

    let role = match &entreprise {
        Some(ent) => {
            if repo::count_entreprise_members(&mut *tx, ent.id).await? == 0 {
                Role::Admin
            } else {
                Role::Standard
            }
        }
        None => Role::Standard,
    };
    let profile = repo::create_profile(
        &mut *tx,
        &new_profile(
            user.id,
            entreprise.as_ref().map(|e| e.id),
            req.telephone.trim().to_string(),
            req.account_type,
            role,
        ),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = role.as_str(),
        entreprise_id = ?profile.entreprise_id,
        "Account registered"
    );

    Ok(AccountInfo {
        user_id: user.id,
        username: user.username,
        email: user.email,
        account_type: profile.account_type,
        role: profile.role,
        tenant_id: tenant_key(user.id, profile.entreprise_id),
        entreprise,
    })
}

fn identity_of(user_id: i64, username: &str, profile: &Profile) -> TenantIdentity {
    TenantIdentity {
        user_id,
        username: username.to_string(),
        role: profile.role,
        entreprise_id: profile.entreprise_id,
        tenant_id: tenant_key(user_id, profile.entreprise_id),
    }
}

pub async fn login(
    pool: &SqlitePool,
    jwt: &JwtService,
    req: &LoginRequest,
) -> ServiceResult<LoginResponse> {
    let user = repo::find_user_by_username(pool, req.username.trim())
        .await?
        .ok_or_else(AppError::invalid_credentials)?;
    if !verify_password(&req.password, &user.hashed_password) {
        tracing::warn!(username = %user.username, "Login refused: bad password");
        return Err(AppError::invalid_credentials().into());
    }
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    let profile = found(
        repo::find_profile(pool, user.id).await?,
        ErrorCode::TenantNotFound,
        format!("Profile of user {}", user.id),
    )?;
    let identity = identity_of(user.id, &user.username, &profile);
    let token = jwt
        .generate_token(&identity)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, tenant_id = %identity.tenant_id, "User logged in");
    let account = account_info(pool, &identity).await?;
    Ok(LoginResponse { token, account })
}

/// Summary of the authenticated account (`GET /api/me`)
pub async fn account_info(pool: &SqlitePool, identity: &TenantIdentity) -> ServiceResult<AccountInfo> {
    let user = found(
        repo::find_user_by_id(pool, identity.user_id).await?,
        ErrorCode::NotFound,
        format!("User {}", identity.user_id),
    )?;
    let profile = found(
        repo::find_profile(pool, user.id).await?,
        ErrorCode::TenantNotFound,
        format!("Profile of user {}", user.id),
    )?;
    let entreprise = match profile.entreprise_id {
        Some(id) => repo::find_entreprise(pool, id).await?,
        None => None,
    };
    Ok(AccountInfo {
        user_id: user.id,
        username: user.username,
        email: user.email,
        account_type: profile.account_type,
        role: profile.role,
        entreprise,
        tenant_id: tenant_key(user.id, profile.entreprise_id),
    })
}
