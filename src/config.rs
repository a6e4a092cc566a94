use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is designed
/// to be immutable once loaded, ensuring consistency across all threads and
/// services. It is pulled into the application state via FromRef, embodying
/// the "immutable AppConfig" part of the Unified State Pattern.
#[derive(Clone)]
pub struct AppConfig {
    // Database connection string (Postgres). Optional: when absent in local
    // mode, the in-memory store serves the process instead.
    pub db_url: Option<String>,
    // Which runtime we are in; gates the auth bypass and the log format.
    pub env: Env,
    // Shared secret for validating incoming JWTs.
    pub jwt_secret: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development utilities
/// (in-memory store, auth bypass, pretty logs) and production-grade
/// infrastructure (Postgres, hardened auth, JSON logs).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup. This allows us to instantiate the configuration without
    /// needing to set environment variables for lightweight unit or
    /// integration testing state scaffolding.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration
    /// at startup. It reads all parameters from environment variables and
    /// implements the **fail-fast** principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current
    /// runtime environment (especially Production) is not found. This prevents
    /// the application from starting with an incomplete or insecure
    /// configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // JWT Secret Resolution
        // Production refuses to start without an explicit secret.
        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            // Local development gets a fixed fallback so fresh checkouts run.
            _ => env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        match env {
            Env::Local => Self {
                env: Env::Local,
                // A missing DATABASE_URL is allowed here: local runs fall back
                // to the in-memory store.
                db_url: env::var("DATABASE_URL").ok(),
                jwt_secret,
            },
            Env::Production => Self {
                env: Env::Production,
                // Production always persists to Postgres.
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                jwt_secret,
            },
        }
    }
}
