//! Shared admin passphrase for the host panel

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::types::Role;
use crate::ws::WsQuery;

pub const PASSPHRASE_ENV: &str = "OLYMPIA_ADMIN_PASSPHRASE";

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Admin passphrase (None = auth disabled)
    pub passphrase: Option<String>,
}

impl AuthConfig {
    pub fn new(passphrase: Option<String>) -> Self {
        Self {
            passphrase: passphrase
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Load auth config from `OLYMPIA_ADMIN_PASSPHRASE`
    pub fn from_env() -> Self {
        let config = Self::new(std::env::var(PASSPHRASE_ENV).ok());
        if config.is_enabled() {
            tracing::info!("Host authentication enabled");
        } else {
            tracing::warn!(
                "Host authentication DISABLED - anyone can take over the host panel! Set {} to prevent this",
                PASSPHRASE_ENV
            );
        }
        config
    }

    pub fn is_enabled(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Check a candidate passphrase; always true when auth is disabled.
    pub fn validate(&self, candidate: &str) -> bool {
        match &self.passphrase {
            // Compare digests so neither content nor length leaks through timing
            Some(expected) => constant_time_eq(
                &Sha256::digest(expected.as_bytes()),
                &Sha256::digest(candidate.as_bytes()),
            ),
            None => true,
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Middleware guarding host WebSocket connections.
///
/// `/ws?role=host` must carry the passphrase as `key`; other roles pass through.
pub async fn host_ws_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let query = Query::<WsQuery>::try_from_uri(request.uri())
        .map(|Query(q)| q)
        .ok();
    let wants_host = query
        .as_ref()
        .is_some_and(|q| Role::from_query(q.role.as_deref()) == Role::Host);

    if request.uri().path() != "/ws" || !wants_host {
        return next.run(request).await;
    }

    if !auth_config.is_enabled() {
        tracing::warn!(
            "Host WebSocket requested but host authentication is DISABLED; set {} to prevent host takeover",
            PASSPHRASE_ENV
        );
        return next.run(request).await;
    }

    let key = query.and_then(|q| q.key).unwrap_or_default();
    if auth_config.validate(&key) {
        return next.run(request).await;
    }

    tracing::warn!("Rejected host WebSocket with a wrong passphrase");
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use serial_test::serial;
    use tower::ServiceExt;

    fn app(config: AuthConfig) -> Router {
        Router::new()
            .route("/ws", get(|| async { "upgraded" }))
            .layer(middleware::from_fn_with_state(
                Arc::new(config),
                host_ws_auth_middleware,
            ))
    }

    async fn status_of(config: AuthConfig, uri: &str) -> StatusCode {
        app(config)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_auth_config_disabled_when_blank() {
        let config = AuthConfig::new(None);
        assert!(!config.is_enabled());
        assert!(config.validate("anything"));

        let config = AuthConfig::new(Some("   ".to_string()));
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_auth_config_enabled() {
        let config = AuthConfig::new(Some(" admin2425 ".to_string()));
        assert!(config.is_enabled());
        assert!(config.validate("admin2425"));
        assert!(!config.validate("admin"));
        assert!(!config.validate(""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(PASSPHRASE_ENV, "s3cret");
        assert!(AuthConfig::from_env().validate("s3cret"));

        std::env::remove_var(PASSPHRASE_ENV);
        assert!(!AuthConfig::from_env().is_enabled());
    }

    #[tokio::test]
    async fn test_middleware_guards_host_only() {
        let config = AuthConfig::new(Some("s3cret".to_string()));

        assert_eq!(
            status_of(config.clone(), "/ws?role=host").await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(config.clone(), "/ws?role=host&key=nope").await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(config.clone(), "/ws?role=host&key=s3cret").await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(config.clone(), "/ws?role=player").await,
            StatusCode::OK
        );
        assert_eq!(status_of(config, "/ws").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_open_when_disabled() {
        assert_eq!(
            status_of(AuthConfig::default(), "/ws?role=host").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_passphrase_is_url_decoded() {
        let config = AuthConfig::new(Some("two words".to_string()));
        assert_eq!(
            status_of(config, "/ws?role=host&key=two%20words").await,
            StatusCode::OK
        );
    }
}
