//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Put the signature guard in front of the protected routes
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GuardConfig;
use crate::guard::{require_signature, GuardState, ReplayCache, Verifier};
use crate::http::handlers;
use crate::signing::SharedSecret;
use crate::vendor::{VendorClient, VendorResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub vendor: Arc<VendorClient>,
}

/// HTTP server for the storefront API.
pub struct HttpServer {
    router: Router,
    config: GuardConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GuardConfig) -> VendorResult<Self> {
        let vendor = Arc::new(VendorClient::new(&config.vendor)?);

        let mut verifier = Verifier::new(SharedSecret::new(&config.guard.secret));
        if config.guard.replay_protection {
            tracing::info!("Replay protection enabled");
            verifier = verifier.with_replay_cache(Arc::new(ReplayCache::new()));
        }

        let guard = GuardState {
            verifier: Arc::new(verifier),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, AppState { vendor }, guard);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GuardConfig, state: AppState, guard: GuardState) -> Router {
        let guarded = Router::new()
            .route("/api/layanan/resolve", post(handlers::resolve_service))
            .route("/api/balance", get(handlers::balance).post(handlers::balance))
            .route("/api/order", post(handlers::place_order))
            .route("/api/order/detail", post(handlers::order_detail))
            .route_layer(middleware::from_fn_with_state(guard, require_signature));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/layanan", get(handlers::catalog))
            .merge(guarded)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            replay_protection = self.config.guard.replay_protection,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::client::{sign_request, HttpMethod};
    use crate::guard::REJECTION_BODY;
    use crate::signing::{now_millis, SIGNATURE_HEADER, TIMESTAMP_HEADER};

    fn test_config() -> GuardConfig {
        let mut config = GuardConfig::default();
        config.guard.secret = "test_secret".into();
        // Unroutable vendor: every vendor call fails with a transport error.
        config.vendor.base_url = "http://127.0.0.1:9/api/service".into();
        config.vendor.timeout_secs = 1;
        config
    }

    fn test_server() -> HttpServer {
        HttpServer::new(test_config()).unwrap()
    }

    fn signed_post(path: &str, raw: &str) -> Request<Body> {
        let secret = SharedSecret::new("test_secret");
        let ts = now_millis().to_string();
        let sig = secret.sign_bytes(format!("{ts}POST{path}{raw}").as_bytes());
        Request::post(path)
            .header(SIGNATURE_HEADER, sig.as_str())
            .header(TIMESTAMP_HEADER, &ts)
            .body(Body::from(raw.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = test_server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unsigned_request_rejected() {
        let response = test_server()
            .router()
            .oneshot(
                Request::post("/api/order")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"data":"u"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_text(response).await, REJECTION_BODY);
    }

    #[tokio::test]
    async fn test_signed_request_reaches_validation() {
        let secret = SharedSecret::new("test_secret");
        let body = serde_json::json!({"quantity": 5, "product_id": "1"});
        let signed = sign_request(&secret, HttpMethod::Post, "/api/order", Some(&body), now_millis());

        let response = test_server()
            .router()
            .oneshot(
                Request::post("/api/order?ignored=1")
                    .header(SIGNATURE_HEADER, &signed.signature)
                    .header(TIMESTAMP_HEADER, &signed.timestamp)
                    .header("content-type", "application/json")
                    .body(Body::from(signed.body.clone().unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"data is required"}"#);
    }

    #[tokio::test]
    async fn test_signed_invalid_json() {
        let secret = SharedSecret::new("test_secret");
        let ts = now_millis().to_string();
        let raw = "{not json";
        let sig = secret.sign_bytes(format!("{ts}POST/api/order/detail{raw}").as_bytes());

        let response = test_server()
            .router()
            .oneshot(
                Request::post("/api/order/detail")
                    .header(SIGNATURE_HEADER, sig.as_str())
                    .header(TIMESTAMP_HEADER, &ts)
                    .body(Body::from(raw))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"Invalid JSON"}"#);
    }

    #[tokio::test]
    async fn test_empty_body_missing_trx() {
        let secret = SharedSecret::new("test_secret");
        let signed = sign_request(&secret, HttpMethod::Post, "/api/order/detail", None, now_millis());

        let response = test_server()
            .router()
            .oneshot(
                Request::post("/api/order/detail")
                    .header(SIGNATURE_HEADER, &signed.signature)
                    .header(TIMESTAMP_HEADER, &signed.timestamp)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"trx is required"}"#);
    }

    #[tokio::test]
    async fn test_resolve_invalid_json_uses_envelope() {
        let response = test_server()
            .router()
            .oneshot(signed_post("/api/layanan/resolve", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, serde_json::json!({"ok": false, "error": "Invalid JSON"}));
    }

    #[tokio::test]
    async fn test_resolve_vendor_failure_uses_envelope() {
        let response = test_server()
            .router()
            .oneshot(signed_post("/api/layanan/resolve", r#"{"code":"X"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Vendor"));
    }

    #[tokio::test]
    async fn test_other_routes_keep_plain_error_shape() {
        let response = test_server()
            .router()
            .oneshot(signed_post("/api/order/detail", r#"{"trx":"T1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body.get("ok").is_none());
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_body_over_limit_without_length_is_forbidden() {
        let mut config = test_config();
        config.security.max_body_size = 16;
        let server = HttpServer::new(config).unwrap();

        // Correctly signed, but larger than the limit and sent without Content-Length.
        let raw = format!(r#"{{"trx":"{}"}}"#, "x".repeat(64));
        let response = server
            .router()
            .oneshot(signed_post("/api/order/detail", &raw))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, REJECTION_BODY);
    }

    #[tokio::test]
    async fn test_slow_request_times_out_with_408() {
        // Vendor that accepts connections and never answers.
        let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let vendor_addr = silent.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = silent.accept().await {
                held.push(socket);
            }
        });

        let mut config = test_config();
        config.vendor.base_url = format!("http://{}/api/service", vendor_addr);
        config.vendor.timeout_secs = 10;
        config.timeouts.request_secs = 1;
        let server = HttpServer::new(config).unwrap();

        let response = server
            .router()
            .oneshot(Request::get("/api/layanan").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
