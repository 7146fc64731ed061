//! API Middleware
//!
//! Session resolution, bearer token authentication and request logging.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::session::SharedBank;
use super::AppState;

/// Per-request handle to the session's banking service.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub bank: SharedBank,
}

/// Identity attached by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub national_id: String,
}

/// Resolve the session named by the X-Session-Id header, lazily creating
/// one when the header is absent or unknown. The session id is echoed back
/// on the response so clients can persist it.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let id = match headers.get("X-Session-Id").and_then(|v| v.to_str().ok()) {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Invalid X-Session-Id header format",
                        "error_code": "invalid_session_id"
                    })),
                )
                    .into_response());
            }
        },
        None => None,
    };

    let (id, bank) = match state.sessions.resolve(id) {
        Ok(resolved) => resolved,
        Err(err) => return Err(err.into_response()),
    };

    request.extensions_mut().insert(SessionHandle { id, bank });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert("x-session-id", value);
    }
    Ok(response)
}

/// Require a valid bearer token and attach the authenticated identity.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Missing bearer token",
                    "error_code": "missing_token"
                })),
            )
                .into_response());
        }
    };

    match state.credentials.verify_token(token) {
        Ok(national_id) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser { national_id });
            Ok(next.run(request).await)
        }
        Err(err) => Err(err.into_response()),
    }
}

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "x-session-id", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
