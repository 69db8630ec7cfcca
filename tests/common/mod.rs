//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use storefront_guard::config::GuardConfig;
use storefront_guard::http::HttpServer;
use storefront_guard::lifecycle::Shutdown;

pub const SECRET: &str = "test_secret";

/// One call received by the mock vendor.
#[derive(Debug, Clone)]
pub struct VendorCall {
    pub operation: String,
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct VendorLog(Arc<Mutex<Vec<VendorCall>>>);

impl VendorLog {
    pub fn calls(&self) -> Vec<VendorCall> {
        self.0.lock().unwrap().clone()
    }
}

async fn vendor_handler(
    State(log): State<VendorLog>,
    Query(query): Query<std::collections::HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let operation = query.get("type").cloned().unwrap_or_default();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    log.0.lock().unwrap().push(VendorCall {
        operation: operation.clone(),
        api_key: header("apiKey"),
        secret_key: header("secretKey"),
        body: body.clone(),
    });

    let data = match operation.as_str() {
        "get-balance" => json!({ "balance": 150000 }),
        "order-product" => json!({ "trx": "TRX-1", "echo": body }),
        "get-order-detail" => json!({ "trx": body["trx"], "status": "Success" }),
        "get-layanan-detail" => json!({ "code": body["code"], "variants": [] }),
        "layanan" => json!([{ "code": "IG-F", "name": "Instagram Followers" }]),
        _ => json!(null),
    };
    Json(json!({ "status": true, "data": data }))
}

/// Start a mock vendor that answers every operation and records the calls.
pub async fn start_mock_vendor() -> (SocketAddr, VendorLog) {
    let log = VendorLog::default();
    let app = Router::new()
        .route("/api/service", post(vendor_handler))
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, log)
}

/// Start a programmable mock vendor speaking raw HTTP/1.1.
pub async fn start_programmable_vendor<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 8192];
                let _ = socket.read(&mut request).await;
                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });
    addr
}

/// Config pointing at a vendor on `vendor_addr`.
pub fn test_config(vendor_addr: SocketAddr) -> GuardConfig {
    let mut config = GuardConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.guard.secret = SECRET.into();
    config.vendor.base_url = format!("http://{}/api/service", vendor_addr);
    config.vendor.api_key = "vendor-key".into();
    config.vendor.secret_key = "vendor-secret".into();
    config.vendor.timeout_secs = 1;
    config
}

/// Run the guard server on an ephemeral port.
pub async fn start_guard(config: GuardConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}
