//! Signed HTTP client.
//!
//! # Responsibilities
//! - Canonicalize path and body exactly as the verifier will see them
//! - Attach `x-signature` / `x-timestamp`
//! - Bound every call with a timeout
//! - Keep cookies so session-bound endpoints see the caller
//!
//! # Design Decisions
//! - The secret is injected; nothing here reads the environment
//! - The bytes sent are the bytes signed (stable JSON)
//! - No automatic retry; callers re-issue with a fresh timestamp

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use url::Url;

use crate::client::error::{ClientError, ClientResult};
use crate::config::schema::ClientConfig;
use crate::signing::{
    canonical_path, now_millis, stable_stringify, SharedSecret, SigningPayload, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};

/// Methods the signer issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }

    fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post)
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(format!("unsupported method: {}", other)),
        }
    }
}

/// Everything needed to put a signed request on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: HttpMethod,
    /// Canonical path, no query.
    pub path: String,
    pub timestamp: String,
    pub signature: String,
    /// Canonical JSON body, if any.
    pub body: Option<String>,
}

/// Build the signature for a request at a given instant.
///
/// A body on `GET` is dropped, as is a JSON `null` body.
pub fn sign_request(
    secret: &SharedSecret,
    method: HttpMethod,
    path: &str,
    body: Option<&Value>,
    now_ms: u64,
) -> SignedRequest {
    let path = canonical_path(path);
    let timestamp = now_ms.to_string();
    let body = body
        .filter(|b| method.carries_body() && !b.is_null())
        .map(stable_stringify);

    let payload = SigningPayload::new(
        timestamp.as_str(),
        method.as_str(),
        path.as_str(),
        body.clone().unwrap_or_default(),
    );
    let signature = secret.sign(&payload).as_str().to_string();

    SignedRequest {
        method,
        path,
        timestamp,
        signature,
        body,
    }
}

/// HTTP client that signs every request.
#[derive(Clone)]
pub struct SecureClient {
    http: Client,
    cookies: Arc<Jar>,
    base_url: Url,
    secret: SharedSecret,
    timeout: Duration,
}

impl SecureClient {
    /// Create a client for the storefront at `base_url`.
    pub fn new(base_url: &str, secret: SharedSecret, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        let cookies = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(cookies.clone())
            .build()?;

        Ok(Self {
            http,
            cookies,
            base_url,
            secret,
            timeout,
        })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ClientConfig, secret: SharedSecret) -> ClientResult<Self> {
        Self::new(
            &config.base_url,
            secret,
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Store a cookie (e.g. a session token) sent with every request.
    pub fn add_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.base_url);
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a signed request and return the successful response.
    ///
    /// # Errors
    /// - [`ClientError::Timeout`] when no response arrives in time
    /// - [`ClientError::Rejected`] for non-2xx responses
    /// - [`ClientError::Transport`] for connection failures
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Response> {
        let body = body.map(serde_json::to_value).transpose()?;
        let signed = sign_request(&self.secret, method, path, body.as_ref(), now_millis());
        let url = self.base_url.join(&signed.path)?;

        let mut request = match method {
            HttpMethod::Get => self.http.get(url),
            HttpMethod::Post => self.http.post(url),
        }
        .header(SIGNATURE_HEADER, &signed.signature)
        .header(TIMESTAMP_HEADER, &signed.timestamp);

        if let Some(body) = signed.body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        tracing::debug!(method = method.as_str(), path = %signed.path, "Sending signed request");

        let response = match timeout(self.timeout, request.send()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(path = %signed.path, timeout_ms = self.timeout.as_millis() as u64, "Signed request timed out");
                return Err(ClientError::Timeout(self.timeout));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::rejected(status.as_u16(), &text));
        }
        Ok(response)
    }

    /// Signed `GET`, decoding the JSON response.
    pub async fn get_json(&self, path: &str) -> ClientResult<Value> {
        let response = self.send::<Value>(HttpMethod::Get, path, None).await?;
        Ok(response.json().await?)
    }

    /// Signed `POST` with a JSON body, decoding the JSON response.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let response = self.send(HttpMethod::Post, path, Some(body)).await?;
        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for SecureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_sign_request_canonicalizes() {
        let secret = SharedSecret::new("test_secret");
        let body = json!({"quantity": 100, "code": "ABC"});
        let signed = sign_request(&secret, HttpMethod::Post, "api/order?x=1", Some(&body), NOW);

        assert_eq!(signed.path, "/api/order");
        assert_eq!(signed.timestamp, NOW.to_string());
        assert_eq!(signed.body.as_deref(), Some(r#"{"code":"ABC","quantity":100}"#));

        let expected = secret.sign_bytes(
            format!("{}POST/api/order{}", NOW, r#"{"code":"ABC","quantity":100}"#).as_bytes(),
        );
        assert_eq!(signed.signature, expected.as_str());
    }

    #[test]
    fn test_get_drops_body() {
        let secret = SharedSecret::new("test_secret");
        let body = json!({"ignored": true});
        let signed = sign_request(&secret, HttpMethod::Get, "/api/balance", Some(&body), NOW);
        assert!(signed.body.is_none());
        assert_eq!(
            signed.signature,
            secret.sign_bytes(format!("{}GET/api/balance", NOW).as_bytes()).as_str()
        );
    }

    #[test]
    fn test_null_body_is_no_body() {
        let secret = SharedSecret::new("s");
        let signed = sign_request(&secret, HttpMethod::Post, "/api/balance", Some(&Value::Null), NOW);
        assert!(signed.body.is_none());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert!("DELETE".parse::<HttpMethod>().is_err());
    }

    #[tokio::test]
    async fn test_timeout_error() {
        // Accept connections but never answer.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = SecureClient::new(
            &format!("http://{}", addr),
            SharedSecret::new("s"),
            Duration::from_millis(100),
        )
        .unwrap();
        let err = client.get_json("/api/balance").await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
    }
}
