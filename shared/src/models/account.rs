//! Account Model (users, entreprises, profiles)

use serde::{Deserialize, Serialize};

/// Individual vs company account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AccountType {
    #[default]
    Personne,
    Entreprise,
}

/// Profile role, used for per-area access gates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum Role {
    Admin,
    #[default]
    Standard,
    Rh,
    Stock,
    Comptable,
    Autre,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Standard => "standard",
            Role::Rh => "rh",
            Role::Stock => "stock",
            Role::Comptable => "comptable",
            Role::Autre => "autre",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "standard" => Some(Role::Standard),
            "rh" => Some(Role::Rh),
            "stock" => Some(Role::Stock),
            "comptable" => Some(Role::Comptable),
            "autre" => Some(Role::Autre),
            _ => None,
        }
    }
}

/// User row (includes the password hash, never serialized)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Company a group of accounts belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Entreprise {
    pub id: i64,
    pub nom: String,
    pub secteur: String,
    pub adresse: String,
    pub telephone: String,
    pub email: String,
    pub nif: String,
    pub rccm: String,
    pub created_at: i64,
}

/// Profile (1:1 with user)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Profile {
    pub user_id: i64,
    pub entreprise_id: Option<i64>,
    pub telephone: String,
    pub account_type: AccountType,
    pub role: Role,
}

/// Entreprise details supplied at registration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntrepriseCreate {
    pub nom: String,
    #[serde(default)]
    pub secteur: String,
    #[serde(default)]
    pub adresse: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nif: String,
    #[serde(default)]
    pub rccm: String,
}

/// Authenticated account summary (`GET /api/me`, login response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub account_type: AccountType,
    pub role: Role,
    pub entreprise: Option<Entreprise>,
    pub tenant_id: String,
}

/// `POST /api/auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub telephone: String,
    /// New entreprise to create (entreprise accounts)
    pub entreprise: Option<EntrepriseCreate>,
    /// Existing entreprise to join (entreprise accounts)
    pub entreprise_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub account: AccountInfo,
}

/// Tenant key for an account: entreprise accounts share data, others are private
pub fn tenant_key(user_id: i64, entreprise_id: Option<i64>) -> String {
    match entreprise_id {
        Some(ent) => format!("ent:{ent}"),
        None => format!("usr:{user_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_key_prefers_entreprise() {
        assert_eq!(tenant_key(7, Some(3)), "ent:3");
        assert_eq!(tenant_key(7, None), "usr:7");
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Rh, Role::Stock, Role::Comptable, Role::Autre] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn user_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "amadou".into(),
            email: String::new(),
            hashed_password: "$argon2id$secret".into(),
            is_active: true,
            created_at: 0,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }
}
