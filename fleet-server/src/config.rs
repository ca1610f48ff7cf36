//! Server configuration

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fleet server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database_path: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for tenant authentication
    pub jwt_secret: String,
    /// `json` for structured logs, anything else for the human formatter
    pub log_format: String,
    /// Allowed CORS origin; permissive when unset
    pub cors_allow_origin: Option<String>,
    /// Trip-sheet fuel baseline (L/100km)
    pub overconsumption_baseline: f64,
    /// Tolerated margin above the baseline (L/100km)
    pub overconsumption_margin: f64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, BoxError> {
        match std::env::var(name) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
            _ => Ok(default),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "fleet.db".into()),
            http_port: Self::parse_or("HTTP_PORT", 8080)?,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            log_format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN")
                .ok()
                .filter(|s| !s.is_empty()),
            overconsumption_baseline: Self::parse_or("OVERCONSUMPTION_BASELINE", 8.0)?,
            overconsumption_margin: Self::parse_or("OVERCONSUMPTION_MARGIN", 3.0)?,
            environment,
        })
    }

    /// Development defaults, used by tests and local tooling
    pub fn development() -> Self {
        Self {
            database_path: "fleet.db".into(),
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            log_format: "text".into(),
            cors_allow_origin: None,
            overconsumption_baseline: 8.0,
            overconsumption_margin: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_secret_fallback() {
        // Unique name so the test does not depend on the ambient environment
        let v = Config::require_secret("FLEET_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(v, "dev-FLEET_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn production_requires_secret() {
        let err = Config::require_secret("FLEET_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(err.to_string().contains("must be set"));
    }

    #[test]
    fn parse_or_falls_back_when_unset() {
        let v: f64 = Config::parse_or("FLEET_TEST_UNSET_NUMBER", 8.0).unwrap();
        assert_eq!(v, 8.0);
    }
}
