//! Provider authentication.
//!
//! Tokens are verified against an external identity service over HTTP.
//! `AppState` holds an `Arc<dyn TokenVerifier>`, swapped at startup via
//! config: the HTTP verifier when `IDENTITY_VERIFY_URL` is set, a
//! reject-everything fallback otherwise. Dev mode skips token checks and
//! trusts `x-dev-*` headers instead.
//!
//! Every verified identity is upserted into the providers table, so the
//! rest of the API always works against a `ProviderRow`.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::provider::ProviderRow;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct IdentityClaims {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// The token verifier trait. Implement this to swap identity backends
/// without touching the handlers.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HttpIdentityVerifier — POST the token to the identity service
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    verify_url: String,
    api_key: Option<String>,
}

impl HttpIdentityVerifier {
    pub fn new(verify_url: String, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            verify_url,
            api_key,
        }
    }
}

/// Account-lookup response shape of the identity service.
#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "photoUrl")]
    photo_url: Option<String>,
}

#[async_trait]
impl TokenVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let mut request = self
            .client
            .post(&self.verify_url)
            .json(&json!({ "idToken": token }));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            warn!("identity service unreachable: {e}");
            AppError::Unauthorized
        })?;
        if !response.status().is_success() {
            warn!("identity service rejected token: HTTP {}", response.status());
            return Err(AppError::Unauthorized);
        }

        let lookup: LookupResponse = response.json().await.map_err(|e| {
            warn!("identity service returned an unexpected body: {e}");
            AppError::Unauthorized
        })?;
        let user = lookup.users.into_iter().next().ok_or_else(|| {
            warn!("identity service returned no matching user");
            AppError::Unauthorized
        })?;

        Ok(IdentityClaims {
            subject: user.local_id,
            email: user.email,
            name: user.display_name,
            picture: user.photo_url,
        })
    }
}

/// Used when no identity service is configured and dev auth is off.
pub struct RejectAllVerifier;

#[async_trait]
impl TokenVerifier for RejectAllVerifier {
    async fn verify(&self, _token: &str) -> Result<IdentityClaims, AppError> {
        warn!("token presented but no identity service is configured");
        Err(AppError::Unauthorized)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request authentication
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the caller to a provider row, creating the account on first
/// sight. Dev mode trusts headers; otherwise the bearer token must verify.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(IdentityClaims, ProviderRow), AppError> {
    let claims = if state.config.dev_auth_enabled {
        dev_claims(headers)
    } else {
        let token = bearer_token(headers)?;
        state.verifier.verify(&token).await?
    };
    let provider = upsert_provider(&state.db, &claims).await?;
    Ok((claims, provider))
}

fn dev_claims(headers: &HeaderMap) -> IdentityClaims {
    IdentityClaims {
        subject: header_value(headers, "x-dev-subject")
            .unwrap_or_else(|| "dev-user".to_string()),
        email: Some(
            header_value(headers, "x-dev-email").unwrap_or_else(|| "dev@localhost".to_string()),
        ),
        name: header_value(headers, "x-dev-name"),
        picture: None,
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
        .ok_or(AppError::Unauthorized)
}

/// Lookup order: external id, then email (attaching the external id to a
/// pre-registered account), then a fresh row.
async fn upsert_provider(db: &PgPool, claims: &IdentityClaims) -> Result<ProviderRow, AppError> {
    if let Some(existing) =
        sqlx::query_as::<_, ProviderRow>("SELECT * FROM providers WHERE external_id = $1")
            .bind(&claims.subject)
            .fetch_optional(db)
            .await?
    {
        return Ok(existing);
    }

    if let Some(email) = &claims.email {
        if let Some(attached) = sqlx::query_as::<_, ProviderRow>(
            "UPDATE providers SET external_id = $1, verified = TRUE, updated_at = NOW() \
             WHERE email = $2 RETURNING *",
        )
        .bind(&claims.subject)
        .bind(email)
        .fetch_optional(db)
        .await?
        {
            return Ok(attached);
        }
    }

    let created = sqlx::query_as::<_, ProviderRow>(
        r#"
        INSERT INTO providers (id, external_id, email, name, picture, verified)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&claims.subject)
    .bind(&claims.email)
    .bind(&claims.name)
    .bind(&claims.picture)
    .fetch_one(db)
    .await?;
    info!("registered new provider {}", created.id);

    Ok(created)
}

// ────────────────────────────────────────────────────────────────────────────
// Handler
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyTokenRequest {
    #[serde(alias = "idToken")]
    pub id_token: Option<String>,
}

/// POST /api/auth/verify-token
///
/// Accepts the token in the JSON body or the Authorization header and
/// returns the resolved provider account.
pub async fn handle_verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<VerifyTokenRequest>>,
) -> Result<Json<Value>, AppError> {
    let claims = if state.config.dev_auth_enabled {
        dev_claims(&headers)
    } else {
        let token = body
            .and_then(|Json(req)| req.id_token)
            .or_else(|| bearer_token(&headers).ok())
            .ok_or(AppError::Unauthorized)?;
        state.verifier.verify(&token).await?
    };
    let provider = upsert_provider(&state.db, &claims).await?;

    Ok(Json(json!({
        "ok": true,
        "provider": provider,
        "claims": claims,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_dev_claims_defaults() {
        let claims = dev_claims(&HeaderMap::new());
        assert_eq!(claims.subject, "dev-user");
        assert_eq!(claims.email.as_deref(), Some("dev@localhost"));
        assert_eq!(claims.name, None);
    }

    #[test]
    fn test_dev_claims_reads_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-dev-subject", HeaderValue::from_static("acct-1"));
        headers.insert("x-dev-email", HeaderValue::from_static("me@example.com"));
        headers.insert("x-dev-name", HeaderValue::from_static("Me"));

        let claims = dev_claims(&headers);
        assert_eq!(claims.subject, "acct-1");
        assert_eq!(claims.email.as_deref(), Some("me@example.com"));
        assert_eq!(claims.name.as_deref(), Some("Me"));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok-123"));
        assert_eq!(bearer_token(&headers).unwrap(), "tok-123");

        assert!(bearer_token(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());
    }
}
