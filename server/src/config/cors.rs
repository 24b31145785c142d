use axum::http::{header, HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

pub fn create_cors_layer(allowed_origins: &str) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(parse_origins(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn valid_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

fn parse_origins(origins: &str) -> AllowOrigin {
    let origins = valid_origins(origins);

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, cross-origin requests will be refused");
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
    }
    AllowOrigin::list(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ALLOWED_ORIGINS;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn allowed_origin(configured: &str, origin: &str) -> Option<HeaderValue> {
        let app = Router::new()
            .route("/events", get(|| async { "ok" }))
            .layer(create_cors_layer(configured));

        let request = Request::builder()
            .uri("/events")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[test]
    fn test_create_cors_layer() {
        let _layer = create_cors_layer(DEFAULT_ALLOWED_ORIGINS);
    }

    #[test]
    fn test_default_origins_are_valid() {
        assert_eq!(valid_origins(DEFAULT_ALLOWED_ORIGINS).len(), 2);
    }

    #[test]
    fn test_blank_and_invalid_origins_are_dropped() {
        let origins = valid_origins(" http://scanner.local , ,bad\norigin");
        assert_eq!(origins, vec![HeaderValue::from_static("http://scanner.local")]);
    }

    #[tokio::test]
    async fn test_configured_origin_is_allowed() {
        let allowed = allowed_origin(DEFAULT_ALLOWED_ORIGINS, "http://localhost:5173").await;
        assert_eq!(allowed, Some(HeaderValue::from_static("http://localhost:5173")));
    }

    #[tokio::test]
    async fn test_no_valid_origins_refuses_every_origin() {
        assert!(allowed_origin("", "https://evil.example").await.is_none());
        assert!(allowed_origin("bad\norigin", "https://evil.example").await.is_none());
    }
}
