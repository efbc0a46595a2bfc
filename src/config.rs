//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::{Path, PathBuf};

/// Deployment environment. Controls whether error responses carry internal
/// details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

/// Which document store backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// How to authenticate to Firestore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirebaseCredentials {
    /// Service-account JSON key file inside the working directory.
    ServiceAccountFile(PathBuf),
    /// Discrete service-account fields from the environment.
    ServiceAccountFields {
        client_email: String,
        private_key: String,
    },
    /// Whatever the runtime provides (metadata server, gcloud login).
    ApplicationDefault,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Allowed CORS origin (the SPA)
    pub cors_origin: String,
    /// Prefix for all API routes, e.g. `/api`
    pub api_prefix: String,
    pub environment: Environment,
    pub store_backend: StoreBackend,
    /// Firebase/GCP project; also the expected ID token audience
    pub firebase_project_id: String,
    pub credentials: FirebaseCredentials,
    /// Web API key for Identity Toolkit account lookups
    pub firebase_web_api_key: Option<String>,
    /// Reject tokens issued before the account's revocation time
    pub check_revoked: bool,
}

impl Config {
    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: 3000,
            cors_origin: "http://localhost:4200".to_string(),
            api_prefix: "/api".to_string(),
            environment: Environment::Test,
            store_backend: StoreBackend::Memory,
            firebase_project_id: "test-project".to_string(),
            credentials: FirebaseCredentials::ApplicationDefault,
            firebase_web_api_key: None,
            check_revoked: false,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Err(_) | Ok("firestore") => StoreBackend::Firestore,
            Ok("memory") => StoreBackend::Memory,
            Ok(_) => {
                return Err(ConfigError::Invalid(
                    "STORE_BACKEND",
                    "expected 'firestore' or 'memory'".to_string(),
                ))
            }
        };

        let environment = parse_environment(env::var("APP_ENV").ok().as_deref())?;

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", format!("not a port number: {raw}")))?,
            Err(_) => 3000,
        };

        // Token verification needs the project id even with the memory store.
        let firebase_project_id = non_empty_var("FIREBASE_PROJECT_ID")
            .ok_or(ConfigError::Missing("FIREBASE_PROJECT_ID"))?;

        let check_revoked = match env::var("FIREBASE_CHECK_REVOKED").as_deref() {
            Ok("true") | Ok("1") => true,
            Ok("false") | Ok("0") | Err(_) => false,
            Ok(_) => {
                return Err(ConfigError::Invalid(
                    "FIREBASE_CHECK_REVOKED",
                    "expected 'true' or 'false'".to_string(),
                ))
            }
        };
        let firebase_web_api_key = non_empty_var("FIREBASE_WEB_API_KEY");
        if check_revoked && firebase_web_api_key.is_none() {
            return Err(ConfigError::Missing("FIREBASE_WEB_API_KEY"));
        }

        let cwd = env::current_dir().map_err(|e| {
            ConfigError::Invalid("FIREBASE_SERVICE_ACCOUNT_PATH", e.to_string())
        })?;

        Ok(Self {
            port,
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:4200".to_string()),
            api_prefix: normalize_prefix(
                &env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            ),
            environment,
            store_backend,
            firebase_project_id,
            credentials: resolve_credentials(
                non_empty_var("FIREBASE_SERVICE_ACCOUNT_PATH"),
                non_empty_var("FIREBASE_CLIENT_EMAIL"),
                non_empty_var("FIREBASE_PRIVATE_KEY"),
                &cwd,
            )?,
            firebase_web_api_key,
            check_revoked,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `/api/` → `/api`, `api` → `/api`, `` → ``.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Pick credentials: key file first, then discrete fields, then ADC.
fn resolve_credentials(
    service_account_path: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
    cwd: &Path,
) -> Result<FirebaseCredentials, ConfigError> {
    if let Some(raw) = service_account_path {
        let path = cwd.join(&raw);
        if path.exists() {
            let resolved = path.canonicalize().map_err(|e| {
                ConfigError::Invalid("FIREBASE_SERVICE_ACCOUNT_PATH", e.to_string())
            })?;
            let root = cwd.canonicalize().map_err(|e| {
                ConfigError::Invalid("FIREBASE_SERVICE_ACCOUNT_PATH", e.to_string())
            })?;
            if !resolved.starts_with(&root) {
                return Err(ConfigError::Invalid(
                    "FIREBASE_SERVICE_ACCOUNT_PATH",
                    "service account path must be within the working directory".to_string(),
                ));
            }
            return Ok(FirebaseCredentials::ServiceAccountFile(resolved));
        }
        tracing::warn!(path = %raw, "Service account file not found, trying other credentials");
    }

    if let (Some(client_email), Some(private_key)) = (client_email, private_key) {
        return Ok(FirebaseCredentials::ServiceAccountFields {
            client_email,
            private_key: private_key.replace("\\n", "\n"),
        });
    }

    Ok(FirebaseCredentials::ApplicationDefault)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Development behaviour is opt-in; an unset `APP_ENV` means production.
fn parse_environment(value: Option<&str>) -> Result<Environment, ConfigError> {
    match value {
        None | Some("production") => Ok(Environment::Production),
        Some("development") => Ok(Environment::Development),
        Some("test") => Ok(Environment::Test),
        Some(_) => Err(ConfigError::Invalid(
            "APP_ENV",
            "expected 'development', 'production' or 'test'".to_string(),
        )),
    }
}
