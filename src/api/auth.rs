//! Request authentication for the Dolt server
//!
//! Two independent schemes:
//! - **JSON API** (`/api/v1`): optional HMAC-SHA256 over
//!   `"{timestamp}|{nonce}|{METHOD}|{path}"` with a nonce replay cache. Without a
//!   configured secret every request passes through (localhost use).
//! - **Slack** (`/slack`): Slack's request signing, `v0=` + hex
//!   HMAC-SHA256(signing secret, `"v0:{timestamp}:{raw body}"`).
//!
//! The acting user of an API request comes from the `x-dolt-user` header and is
//! resolved per request by the [`CurrentUser`] extractor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::{FromRef, FromRequestParts, Json, OriginalUri, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{DoltError, Result};
use crate::storage::users::{self, User};
use crate::storage::Database;

type HmacSha256 = Hmac<Sha256>;

/// Allowed clock skew for API signatures (seconds).
const API_TIMESTAMP_WINDOW: i64 = 60;
/// Slack rejects requests older than five minutes.
const SLACK_TIMESTAMP_WINDOW: i64 = 60 * 5;
/// Slash-command payloads are small form posts.
const MAX_SLACK_BODY: usize = 64 * 1024;

/// Header carrying the Slack user id of the API caller.
pub const USER_HEADER: &str = "x-dolt-user";
pub const SLACK_SIGNATURE_HEADER: &str = "x-slack-signature";
pub const SLACK_TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Label exposed via `/auth/info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    None,
    Hmac,
}

fn hex_hmac(secret: &str, message: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(message.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// JSON API authentication state.
pub struct ServerAuth {
    pub mode: AuthMode,
    /// `None` ⇒ no auth required.  `Some(sk)` ⇒ HMAC mode.
    secret_key: Option<String>,
    /// Nonce replay-prevention map: nonce → timestamp (epoch secs).
    used_nonces: Mutex<HashMap<String, i64>>,
}

impl ServerAuth {
    pub fn new(secret_key: Option<String>) -> Self {
        match secret_key {
            Some(sk) => Self::hmac(sk),
            None => Self::no_auth(),
        }
    }

    /// No authentication (localhost).
    pub fn no_auth() -> Self {
        Self {
            mode: AuthMode::None,
            secret_key: None,
            used_nonces: Mutex::new(HashMap::new()),
        }
    }

    /// HMAC-SHA256 authentication.
    pub fn hmac(secret_key: String) -> Self {
        Self {
            mode: AuthMode::Hmac,
            secret_key: Some(secret_key),
            used_nonces: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_required(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Verify an HMAC-SHA256 signature against the current clock.
    pub fn verify_signature(
        &self,
        timestamp: &str,
        nonce: &str,
        method: &str,
        path: &str,
        signature: &str,
    ) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.verify_signature_at(timestamp, nonce, method, path, signature, now)
    }

    fn verify_signature_at(
        &self,
        timestamp: &str,
        nonce: &str,
        method: &str,
        path: &str,
        signature: &str,
        now: i64,
    ) -> bool {
        let sk = match &self.secret_key {
            Some(sk) => sk,
            None => return true, // no auth mode
        };

        // 1. Timestamp window check
        let ts: i64 = match timestamp.parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        if (now - ts).abs() > API_TIMESTAMP_WINDOW {
            return false;
        }

        // 2. Nonce replay check
        {
            let mut nonces = match self.used_nonces.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            if nonces.contains_key(nonce) {
                return false; // replay
            }
            nonces.insert(nonce.to_string(), ts);

            // Purge stale nonces
            nonces.retain(|_, &mut t| (now - t).abs() <= API_TIMESTAMP_WINDOW * 2);
        }

        // 3. Compute expected HMAC
        let message = format!("{}|{}|{}|{}", timestamp, nonce, method, path);
        hex_hmac(sk, &message).is_some_and(|expected| expected == signature)
    }
}

/// Generate a cryptographically random 64-character hex secret key.
pub fn generate_secret_key() -> Result<String> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| DoltError::config(format!("failed to generate random bytes: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// Slack request-signature verifier.
pub struct SlackAuth {
    /// `None` ⇒ signatures are not checked.
    signing_secret: Option<String>,
}

impl SlackAuth {
    pub fn new(signing_secret: Option<String>) -> Self {
        Self { signing_secret }
    }

    pub fn disabled() -> Self {
        Self {
            signing_secret: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.signing_secret.is_some()
    }

    /// Verify a Slack signature against the current clock.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature: &str) -> bool {
        self.verify_at(timestamp, body, signature, chrono::Utc::now().timestamp())
    }

    fn verify_at(&self, timestamp: &str, body: &[u8], signature: &str, now: i64) -> bool {
        let secret = match &self.signing_secret {
            Some(secret) => secret,
            None => return true,
        };

        let ts: i64 = match timestamp.parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        if (now - ts).abs() > SLACK_TIMESTAMP_WINDOW {
            return false;
        }

        let provided = match signature
            .strip_prefix("v0=")
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
        {
            Some(bytes) => bytes,
            None => return false,
        };

        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };
        mac.update(format!("v0:{}:", timestamp).as_bytes());
        mac.update(body);
        mac.verify_slice(&provided).is_ok()
    }
}

/// Compute the Slack signature header value for a body.
#[cfg(test)]
pub(crate) fn slack_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes()).ok()?;
    mac.update(format!("v0:{}:", timestamp).as_bytes());
    mac.update(body);
    Some(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
}

// ─── Middleware ──────────────────────────────────────────────────────────────

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

/// Axum middleware — checks the API HMAC signature headers.
///
/// Uses `OriginalUri` so that the path seen here is the full request path
/// (e.g. `/api/v1/tasks`) even when the middleware runs inside a `.nest()`.
pub async fn auth_middleware(
    State(auth): State<Arc<ServerAuth>>,
    original_uri: OriginalUri,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth.is_required() {
        return next.run(request).await;
    }

    let method = request.method().as_str().to_uppercase();
    let path = original_uri.path().to_string();

    let headers = request.headers();
    let signed = (|| {
        let ts = header_str(headers, "x-timestamp")?;
        let nonce = header_str(headers, "x-nonce")?;
        let sig = header_str(headers, "x-signature")?;
        Some((ts.to_string(), nonce.to_string(), sig.to_string()))
    })();

    match signed {
        Some((ts, nonce, sig)) => {
            if auth.verify_signature(&ts, &nonce, &method, &path, &sig) {
                next.run(request).await
            } else {
                tracing::warn!(%method, %path, "rejected API request with invalid signature");
                (StatusCode::UNAUTHORIZED, "Invalid signature").into_response()
            }
        }
        None => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    }
}

/// Axum middleware — verifies Slack's request signature over the raw body.
///
/// The body is buffered, checked, and handed on unchanged.
pub async fn slack_signature_middleware(
    State(auth): State<Arc<SlackAuth>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth.is_enabled() {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_SLACK_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large").into_response(),
    };

    let verified = match (
        header_str(&parts.headers, SLACK_TIMESTAMP_HEADER),
        header_str(&parts.headers, SLACK_SIGNATURE_HEADER),
    ) {
        (Some(ts), Some(sig)) => auth.verify(ts, &bytes, sig),
        _ => false,
    };

    if !verified {
        tracing::warn!("rejected Slack request with missing or invalid signature");
        return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// ─── Request-scoped user ─────────────────────────────────────────────────────

/// The user an API request acts for.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<Database>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let slack_user_id = header_str(&parts.headers, USER_HEADER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing user"))?;

        let db = Arc::<Database>::from_ref(state);
        match users::get_user_by_slack_id(&db, slack_user_id) {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err((StatusCode::UNAUTHORIZED, "Unknown user")),
            Err(e) => {
                tracing::error!(error = %e, "failed to resolve user");
                Err((StatusCode::INTERNAL_SERVER_ERROR, "Storage error"))
            }
        }
    }
}

// ─── Public endpoints (not behind middleware) ────────────────────────────────

#[derive(Serialize)]
pub struct AuthInfoResponse {
    pub required: bool,
    pub mode: AuthMode,
    pub slack_verification: bool,
}

/// `GET /api/v1/auth/info` — tells clients whether signing is required.
pub async fn auth_info(
    State(auth): State<Arc<ServerAuth>>,
    State(slack): State<Arc<SlackAuth>>,
) -> Json<AuthInfoResponse> {
    Json(AuthInfoResponse {
        required: auth.is_required(),
        mode: auth.mode,
        slack_verification: slack.is_enabled(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_531_420_618;

    fn sign_api(sk: &str, ts: i64, nonce: &str, method: &str, path: &str) -> String {
        hex_hmac(sk, &format!("{}|{}|{}|{}", ts, nonce, method, path)).unwrap()
    }

    #[test]
    fn test_no_auth_accepts_everything() {
        let auth = ServerAuth::no_auth();
        assert!(!auth.is_required());
        assert!(auth.verify_signature_at("junk", "n", "GET", "/", "sig", NOW));
    }

    #[test]
    fn test_api_signature() {
        let auth = ServerAuth::hmac("sk".to_string());
        let sig = sign_api("sk", NOW, "n1", "GET", "/api/v1/tasks");
        assert!(auth.verify_signature_at(
            &NOW.to_string(),
            "n1",
            "GET",
            "/api/v1/tasks",
            &sig,
            NOW
        ));

        // 重放
        assert!(!auth.verify_signature_at(
            &NOW.to_string(),
            "n1",
            "GET",
            "/api/v1/tasks",
            &sig,
            NOW
        ));

        // 篡改路径
        let sig = sign_api("sk", NOW, "n2", "GET", "/api/v1/tasks");
        assert!(!auth.verify_signature_at(
            &NOW.to_string(),
            "n2",
            "GET",
            "/api/v1/groups",
            &sig,
            NOW
        ));
    }

    #[test]
    fn test_api_signature_window() {
        let auth = ServerAuth::hmac("sk".to_string());
        let old = NOW - API_TIMESTAMP_WINDOW - 1;
        let sig = sign_api("sk", old, "n", "GET", "/");
        assert!(!auth.verify_signature_at(&old.to_string(), "n", "GET", "/", &sig, NOW));
    }

    #[test]
    fn test_slack_signature() {
        let secret = "8f742231b10e8888abcd99yyyzzz85a5";
        let body = b"team_id=T0AB43&user_id=U75&command=%2Fdolt.task&text=%24today";
        let ts = NOW.to_string();

        let sig = slack_signature(secret, &ts, body).unwrap();
        assert!(sig.starts_with("v0="));
        assert_eq!(sig.len(), 3 + 64);

        let auth = SlackAuth::new(Some(secret.to_string()));
        assert!(auth.verify_at(&ts, body, &sig, NOW));
        assert!(!auth.verify_at(&ts, b"tampered", &sig, NOW));
        assert!(!auth.verify_at(&ts, body, &sig[3..], NOW));
        assert!(!auth.verify_at(&ts, body, "v0=zz", NOW));
        assert!(!auth.verify_at(&ts, body, &sig, NOW + SLACK_TIMESTAMP_WINDOW + 1));

        let other = SlackAuth::new(Some("another secret".to_string()));
        assert!(!other.verify_at(&ts, body, &sig, NOW));
    }

    #[test]
    fn test_slack_disabled_accepts_unsigned() {
        let auth = SlackAuth::disabled();
        assert!(!auth.is_enabled());
        assert!(auth.verify_at("", b"", "", NOW));
    }

    #[test]
    fn test_generate_secret_key() {
        let a = generate_secret_key().unwrap();
        let b = generate_secret_key().unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
