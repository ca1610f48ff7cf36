//! Repository Module
//!
//! Free-function CRUD over SQLite. Every query on tenant-owned tables
//! filters on `tenant_id`; a row of another tenant is simply "not found".
//!
//! Single-statement functions take `impl Executor`, so callers pass either
//! `&pool` or `&mut *tx` inside a workflow transaction.

// Accounts
pub mod account;

// Fleet
pub mod alert;
pub mod driver;
pub mod fleet_record;
pub mod trip_sheet;
pub mod vehicle;
pub mod vehicle_stats;

// HR & payroll
pub mod archive;
pub mod attendance;
pub mod employee;
pub mod mileage;
pub mod overtime;
pub mod payroll;
pub mod salary_config;

// Inventory, purchasing & invoicing
pub mod invoice;
pub mod product;
pub mod purchase_order;
pub mod stock;

// Rentals
pub mod rental;

// Management commands
pub mod maintenance;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepoError::Validation(format!("Referenced record missing: {}", db_err.message()))
            }
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                RepoError::Validation(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Delete one tenant-scoped row by integer id from a fixed table.
///
/// `table` is always a compile-time constant, never user input.
pub(crate) async fn delete_scoped(
    db: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    table: &'static str,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    let sql = format!("DELETE FROM {table} WHERE id = ? AND tenant_id = ?");
    let rows = sqlx::query(&sql)
        .bind(id)
        .bind(tenant_id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("{table} {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by repository and service tests

    use crate::db::DbService;
    use shared::models::{
        Employee, EmployeeCreate, EngineType, Vehicle, VehicleCategory, VehicleCreate,
        VehicleStatus,
    };
    use sqlx::SqlitePool;

    pub const TENANT: &str = "usr:1";
    pub const OTHER_TENANT: &str = "usr:2";

    pub async fn test_pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    pub fn employee_payload(matricule: &str) -> EmployeeCreate {
        EmployeeCreate {
            matricule: matricule.into(),
            prenom: "Fatoumata".into(),
            nom: "Camara".into(),
            fonction: "Chauffeur".into(),
            telephone: None,
            date_embauche: None,
            statut: Default::default(),
            salaire_journalier: 50_000.0,
            avances: 0.0,
            montant_heure_supp_jour_ouvrable: 10_000.0,
            montant_heure_supp_dimanche_ferie: 15_000.0,
            valeur_km: 500.0,
            taux_cnss_salarie_custom: 0.0,
            taux_cnss_employeur_custom: 0.0,
            taux_vf_custom: 0.0,
            appliquer_cnss: true,
            appliquer_rts: true,
            appliquer_vf: false,
            calcul_salaire_auto: true,
        }
    }

    pub async fn seed_employee(pool: &SqlitePool, tenant: &str, matricule: &str) -> Employee {
        super::employee::create(pool, tenant, employee_payload(matricule))
            .await
            .unwrap()
    }

    pub fn vehicle_payload(id: &str) -> VehicleCreate {
        VehicleCreate {
            id_vehicule: id.into(),
            immatriculation: format!("RC-{id}"),
            marque: "Toyota".into(),
            modele: "Hilux".into(),
            type_moteur: EngineType::Diesel,
            categorie: VehicleCategory::QuatreQuatre,
            statut_actuel: VehicleStatus::Actif,
            date_mise_service: None,
            date_acquisition: None,
            kilometrage_initial: 1200.0,
            affectation: String::new(),
            numero_chassis: String::new(),
            numero_moteur: String::new(),
            observations: String::new(),
            chauffeur_principal_id: None,
            fournisseur_id: None,
        }
    }

    pub async fn seed_vehicle(pool: &SqlitePool, tenant: &str, id: &str) -> Vehicle {
        super::vehicle::create(pool, tenant, &vehicle_payload(id))
            .await
            .unwrap()
    }
}
