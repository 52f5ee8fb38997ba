use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::REQUEST_ID_HEADER;

/// CORS policy for the browser frontend.
///
/// A configured origin list gets credentials with mirrored methods and
/// headers (wildcards are not allowed alongside credentials).  No list, or an
/// unparseable one, falls back to any origin without credentials.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_headers(AllowHeaders::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
    };
    cors.expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use axum::routing::post;
    use tower::ServiceExt;

    fn app(origins: Option<&str>) -> Router {
        let config = Config {
            cors_allowed_origins: origins.map(str::to_owned),
            ..Config::default()
        };
        Router::new()
            .route("/api/chat", post(|| async { "ok" }))
            .layer(cors_layer(&config))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/chat")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn listed_origin_is_allowed_with_credentials() {
        let resp = app(Some("http://localhost:5173, http://localhost:8080"))
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();
        let headers = resp.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn unlisted_origin_gets_no_allow_header() {
        let resp = app(Some("http://localhost:5173"))
            .oneshot(preflight("https://evil.example"))
            .await
            .unwrap();
        assert!(
            !resp
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn no_list_allows_any_origin() {
        let resp = app(None)
            .oneshot(preflight("https://anywhere.example"))
            .await
            .unwrap();
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
