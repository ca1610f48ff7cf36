//! Application state shared by every handler

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtConfig, JwtService};
use crate::config::Config;
use crate::services::fleet::OverconsumptionRule;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let jwt = JwtService::with_config(JwtConfig::new(config.jwt_secret.clone()));
        Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
        }
    }

    /// Trip-sheet overconsumption threshold from configuration
    pub fn overconsumption_rule(&self) -> OverconsumptionRule {
        OverconsumptionRule {
            baseline: self.config.overconsumption_baseline,
            margin: self.config.overconsumption_margin,
        }
    }
}
