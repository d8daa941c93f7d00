use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::WebError;

/// Rejects requests that do not carry a configured admin key as a bearer token.
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, WebError> {
    match bearer {
        Some(TypedHeader(Authorization(bearer))) if api_keys.is_valid(bearer.token()) => {
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!(path = %request.uri().path(), "Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
    }
}

#[derive(Clone)]
pub struct ApiKeys {
    keys: Arc<HashSet<String>>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    fn app(keys: &str) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                ApiKeys::from_comma_separated(keys),
                require_auth,
            ))
    }

    async fn status_with(keys: &str, authorization: Option<&str>) -> StatusCode {
        let mut request = Request::builder().uri("/");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        app(keys)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_parses_comma_separated_keys() {
        let keys = ApiKeys::from_comma_separated(" alpha, ,beta ,");
        assert!(keys.is_valid("alpha"));
        assert!(keys.is_valid("beta"));
        assert!(!keys.is_valid(""));
        assert!(!keys.is_valid("gamma"));
    }

    #[test]
    fn test_empty_configuration_accepts_nothing() {
        let keys = ApiKeys::from_comma_separated("");
        assert!(keys.is_empty());
        assert!(!keys.is_valid("anything"));
    }

    #[tokio::test]
    async fn test_accepts_configured_bearer_key() {
        assert_eq!(status_with("alpha,beta", Some("Bearer beta")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_missing_or_wrong_credentials() {
        assert_eq!(status_with("alpha", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_with("alpha", Some("Bearer gamma")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_with("alpha", Some("Basic alpha")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_with("", Some("Bearer alpha")).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
