// SPDX-License-Identifier: MIT

//! Firebase ID token verification.

use crate::config::Config;
use crate::models::{Identity, Role};
use crate::services::identity::{IdentityError, IdentityVerifier};
use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const ACCOUNTS_LOOKUP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:lookup";
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;
const MAX_UID_LEN: usize = 128;

#[derive(Clone)]
enum VerifierMode {
    Google,
    StaticKey {
        kid: String,
        algorithm: Algorithm,
        decoding_key: Arc<DecodingKey>,
    },
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for ID tokens issued by Firebase Authentication.
pub struct FirebaseTokenVerifier {
    http_client: reqwest::Client,
    project_id: String,
    issuer: String,
    mode: VerifierMode,
    /// Web API key, present only when revocation checks are enabled.
    revocation_api_key: Option<String>,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl FirebaseTokenVerifier {
    /// Create a production verifier that fetches and caches Google's
    /// secure-token signing keys.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let verifier = Self::build(config, VerifierMode::Google)?;

        tracing::info!(
            project = %verifier.project_id,
            issuer = %verifier.issuer,
            check_revoked = verifier.revocation_api_key.is_some(),
            "Initialized Firebase token verifier"
        );

        Ok(verifier)
    }

    /// Create a verifier with a fixed key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        algorithm: Algorithm,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static key kid must not be empty");
        }

        Self::build(
            config,
            VerifierMode::StaticKey {
                kid,
                algorithm,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    fn build(config: &Config, mode: VerifierMode) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building token verifier HTTP client")?;

        let revocation_api_key = if config.check_revoked {
            Some(
                config
                    .firebase_web_api_key
                    .clone()
                    .context("revocation checks need FIREBASE_WEB_API_KEY")?,
            )
        } else {
            None
        };

        Ok(Self {
            http_client,
            project_id: config.firebase_project_id.clone(),
            issuer: format!("{ISSUER_PREFIX}{}", config.firebase_project_id),
            mode,
            revocation_api_key,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    fn expected_algorithm(&self) -> Algorithm {
        match &self.mode {
            VerifierMode::Google => Algorithm::RS256,
            VerifierMode::StaticKey { algorithm, .. } => *algorithm,
        }
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, IdentityError> {
        match &self.mode {
            VerifierMode::StaticKey {
                kid: static_kid,
                decoding_key,
                ..
            } => {
                if kid == static_kid {
                    return Ok(decoding_key.clone());
                }

                return Err(IdentityError::Invalid(format!(
                    "unknown JWT kid for static verifier: {kid}"
                )));
            }
            VerifierMode::Google => {}
        }

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(IdentityError::Invalid(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), IdentityError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_uri = JWKS_URL, "Refreshing Firebase signing keys");

        let response = self
            .http_client
            .get(JWKS_URL)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IdentityError::Unavailable(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);
        if keys_by_kid.is_empty() {
            return Err(IdentityError::Unavailable(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Firebase signing key cache refreshed");
        Ok(())
    }

    /// Ask Identity Toolkit whether the account still accepts this token.
    async fn check_revoked(
        &self,
        api_key: &str,
        token: &str,
        auth_time: u64,
    ) -> Result<(), IdentityError> {
        let response = self
            .http_client
            .post(ACCOUNTS_LOOKUP_URL)
            .query(&[("key", api_key)])
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("account lookup failed: {e}")))?;

        if response.status().is_client_error() {
            return Err(IdentityError::Invalid(format!(
                "account lookup rejected token: {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(IdentityError::Unavailable(format!(
                "account lookup returned status {}",
                response.status()
            )));
        }

        let lookup: AccountLookup = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("invalid account lookup JSON: {e}")))?;

        let account = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::Invalid("account not found".to_string()))?;

        check_account(&account, auth_time)
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let header = decode_header(token)
            .map_err(|e| IdentityError::Invalid(format!("invalid JWT header: {e}")))?;

        let algorithm = self.expected_algorithm();
        if header.alg != algorithm {
            return Err(IdentityError::Invalid(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| IdentityError::Invalid("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<FirebaseIdTokenClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::Invalid(format!("JWT validation failed: {e}")),
            })?;

        let claims = token_data.claims;
        let auth_time = validate_claims(&claims, now_unix_secs())?;

        if let Some(api_key) = &self.revocation_api_key {
            self.check_revoked(api_key, token, auth_time).await?;
        }

        Ok(identity_from_claims(claims))
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseIdTokenClaims {
    sub: String,
    iat: Option<u64>,
    auth_time: Option<u64>,
    email: Option<String>,
    /// Custom claim set through the Admin SDK.
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountLookup {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    /// Seconds since epoch, as a string.
    valid_since: Option<String>,
    #[serde(default)]
    disabled: bool,
}

fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
            continue;
        }
        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }
        if jwk.use_.as_deref().is_some_and(|use_| use_ != "sig") {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

/// Checks jsonwebtoken does not do for us. Returns the sign-in time.
fn validate_claims(claims: &FirebaseIdTokenClaims, now: u64) -> Result<u64, IdentityError> {
    if claims.sub.is_empty() {
        return Err(IdentityError::Invalid("sub claim is empty".to_string()));
    }
    if claims.sub.len() > MAX_UID_LEN {
        return Err(IdentityError::Invalid(
            "sub claim exceeds maximum length".to_string(),
        ));
    }

    let Some(iat) = claims.iat else {
        return Err(IdentityError::Invalid("missing iat claim".to_string()));
    };
    if iat > now + CLOCK_SKEW_SECS {
        return Err(IdentityError::Invalid(
            "iat claim is in the future".to_string(),
        ));
    }

    let Some(auth_time) = claims.auth_time else {
        return Err(IdentityError::Invalid("missing auth_time claim".to_string()));
    };
    if auth_time > now + CLOCK_SKEW_SECS {
        return Err(IdentityError::Invalid(
            "auth_time claim is in the future".to_string(),
        ));
    }

    Ok(auth_time)
}

fn check_account(account: &AccountInfo, auth_time: u64) -> Result<(), IdentityError> {
    if account.disabled {
        return Err(IdentityError::Invalid("account is disabled".to_string()));
    }

    let valid_since = account
        .valid_since
        .as_deref()
        .and_then(|raw| raw.parse::<u64>().ok());

    match valid_since {
        Some(valid_since) if auth_time < valid_since => Err(IdentityError::Revoked),
        _ => Ok(()),
    }
}

fn identity_from_claims(claims: FirebaseIdTokenClaims) -> Identity {
    let role = claims.role.as_deref().and_then(|raw| match raw.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            tracing::warn!(uid = %claims.sub, role = raw, "Ignoring unrecognized role claim");
            None
        }
    });

    Identity {
        uid: claims.sub,
        email: claims.email.unwrap_or_default(),
        role,
    }
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value
        .split(',')
        .map(str::trim)
        .filter_map(|directive| directive.strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse::<u64>().ok())
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
