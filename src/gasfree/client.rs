// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GasFree relay HTTP client.
//!
//! Every call is signed with the current wall-clock second and returns the
//! `data` member of the relay envelope `{code, data, reason, message}`.
//! Failures are classified as:
//!
//! - non-2xx status or connection failure: [`RelayError::Transport`]
//! - 2xx with `code != 200`: [`RelayError::Api`]
//!
//! No call is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::signer::{SignedRequest, AUTHORIZATION_HEADER, TIMESTAMP_HEADER};
use super::types::{AccountInfo, ProviderInfo, SubmitRequest, TokenConfig, TransferTrace};
use crate::config::{GasFreeConfig, Secret};
use crate::tron::TronAddress;

pub const PROVIDERS_PATH: &str = "/api/v1/config/provider/all";
pub const TOKENS_PATH: &str = "/api/v1/config/token/all";
pub const SUBMIT_PATH: &str = "/api/v1/gasfree/submit";

const SUCCESS_CODE: i64 = 200;

/// Errors from the GasFree relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{}", transport_message(.status, .reason.as_deref(), .message.as_deref()))]
    Transport {
        status: Option<u16>,
        reason: Option<String>,
        message: Option<String>,
    },

    #[error("{}", api_message(.reason, .message))]
    Api { reason: String, message: String },

    #[error("GasFree response was invalid: {0}")]
    InvalidResponse(String),

    #[error("GasFree client configuration error: {0}")]
    Config(String),
}

fn transport_message(status: &Option<u16>, reason: Option<&str>, message: Option<&str>) -> String {
    match *status {
        Some(status) => {
            let reason = reason.map_or_else(|| format!("HTTP {status}"), str::to_string);
            let message = message.unwrap_or("Request failed");
            format!("GasFree API error ({reason}): {message}")
        }
        None => format!(
            "GasFree request failed: {}",
            message.unwrap_or("connection error")
        ),
    }
}

fn api_message(reason: &str, message: &str) -> String {
    format!("GasFree API error ({reason}): {message}")
        .trim_end()
        .to_string()
}

/// Classify a relay response and unwrap its `data`.
///
/// Bodies that are not JSON are treated as an empty object.
pub fn unwrap_envelope(status: u16, body: &str) -> Result<Value, RelayError> {
    let payload: Value =
        serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Default::default()));
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    if !(200..300).contains(&status) {
        return Err(RelayError::Transport {
            status: Some(status),
            reason: field("reason"),
            message: field("message"),
        });
    }

    if payload.get("code").and_then(Value::as_i64) != Some(SUCCESS_CODE) {
        return Err(RelayError::Api {
            reason: field("reason").unwrap_or_else(|| "UnknownError".to_string()),
            message: field("message").unwrap_or_default(),
        });
    }

    Ok(payload.get("data").cloned().unwrap_or(Value::Null))
}

/// Relay lookups needed to resolve transfer fees.
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn account_info(&self, owner: &TronAddress) -> Result<AccountInfo, RelayError>;

    async fn tokens(&self) -> Result<Vec<TokenConfig>, RelayError>;
}

/// Signed HTTP client for one relay deployment.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    api_key: String,
    api_secret: Secret,
    http: Client,
}

impl RelayClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        api_secret: Secret,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        Url::parse(base_url).map_err(|e| RelayError::Config(format!("{base_url}: {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret,
            http,
        })
    }

    pub fn from_config(config: &GasFreeConfig) -> Result<Self, RelayError> {
        Self::new(
            &config.relay_base_url,
            &config.api_key,
            config.api_secret.clone(),
            config.timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one signed call and return the envelope's `data`.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RelayError> {
        let url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| RelayError::Config(format!("invalid request URL for {path}: {e}")))?;

        let signed = SignedRequest::new(
            method.as_str(),
            url.path(),
            chrono::Utc::now().timestamp(),
            &self.api_key,
            self.api_secret.expose(),
        )?;

        debug!(method = %method, path = url.path(), "GasFree request");

        let mut request = self
            .http
            .request(method, url)
            .header(TIMESTAMP_HEADER, signed.timestamp_header())
            .header(AUTHORIZATION_HEADER, signed.authorization_header())
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| RelayError::Transport {
            status: None,
            reason: None,
            message: Some(e.to_string()),
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| RelayError::Transport {
            status: Some(status),
            reason: None,
            message: Some(format!("failed to read body: {e}")),
        })?;

        unwrap_envelope(status, &text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RelayError> {
        let data = self.call(Method::GET, path, None).await?;
        decode(path, data)
    }

    pub async fn providers(&self) -> Result<Vec<ProviderInfo>, RelayError> {
        let data = self.call(Method::GET, PROVIDERS_PATH, None).await?;
        match data.get("providers") {
            Some(list) if list.is_array() => decode(PROVIDERS_PATH, list.clone()),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn submit(&self, request: &SubmitRequest) -> Result<TransferTrace, RelayError> {
        let body = serde_json::to_value(request)
            .map_err(|e| RelayError::InvalidResponse(format!("unencodable permit: {e}")))?;
        let data = self.call(Method::POST, SUBMIT_PATH, Some(&body)).await?;
        decode(SUBMIT_PATH, data)
    }

    /// Status of a previously submitted transfer.
    pub async fn trace(&self, trace_id: &str) -> Result<TransferTrace, RelayError> {
        self.get(&format!("/api/v1/gasfree/{trace_id}")).await
    }
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn account_info(&self, owner: &TronAddress) -> Result<AccountInfo, RelayError> {
        self.get(&format!("/api/v1/address/{owner}")).await
    }

    async fn tokens(&self) -> Result<Vec<TokenConfig>, RelayError> {
        let data = self.call(Method::GET, TOKENS_PATH, None).await?;
        token_listing(data)
    }
}

/// The token listing arrives under `tokens` or `assets`.
fn token_listing(data: Value) -> Result<Vec<TokenConfig>, RelayError> {
    let list = ["tokens", "assets"]
        .iter()
        .filter_map(|key| data.get(*key))
        .find(|v| v.is_array())
        .cloned();

    match list {
        Some(list) => decode(TOKENS_PATH, list),
        None => Ok(Vec::new()),
    }
}

fn decode<T: DeserializeOwned>(path: &str, data: Value) -> Result<T, RelayError> {
    serde_json::from_value(data).map_err(|e| RelayError::InvalidResponse(format!("{path}: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::gasfree::signer::sign;

    /// Answer one request on a loopback port; the task yields the request head.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/nile/", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8(head).unwrap()
        });

        (base_url, server)
    }

    fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    fn loopback_client(base_url: &str) -> RelayClient {
        RelayClient::new(
            base_url,
            "k",
            Secret::new("s".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn call_signs_prefixed_path_without_query() {
        let (base_url, server) = serve_once("200 OK", r#"{"code":200,"data":{"ok":1}}"#).await;

        let data = loopback_client(&base_url)
            .call(Method::GET, "/api/v1/config/token/all?x=1", None)
            .await
            .unwrap();
        assert_eq!(data, json!({ "ok": 1 }));

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /nile/api/v1/config/token/all?x=1 HTTP/1.1\r\n"));

        let timestamp: i64 = header(&head, TIMESTAMP_HEADER).unwrap().parse().unwrap();
        let expected = sign("GET", "/nile/api/v1/config/token/all", timestamp, "s").unwrap();
        assert_eq!(
            header(&head, AUTHORIZATION_HEADER).unwrap(),
            format!("ApiKey k:{expected}")
        );
    }

    #[tokio::test]
    async fn call_reports_non_json_failure_as_transport() {
        let (base_url, server) = serve_once("502 Bad Gateway", "upstream down").await;

        let err = loopback_client(&base_url)
            .call(Method::GET, TOKENS_PATH, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::Transport {
                status: Some(502),
                reason: None,
                message: None
            }
        ));
        assert_eq!(err.to_string(), "GasFree API error (HTTP 502): Request failed");

        server.await.unwrap();
    }

    #[test]
    fn success_envelope_unwraps_data() {
        let data = unwrap_envelope(200, r#"{"code":200,"data":{"active":true}}"#).unwrap();
        assert_eq!(data, json!({ "active": true }));

        let missing = unwrap_envelope(200, r#"{"code":200}"#).unwrap();
        assert_eq!(missing, Value::Null);
    }

    #[test]
    fn failure_code_is_an_api_error() {
        let err = unwrap_envelope(
            200,
            r#"{"code":400,"reason":"ProviderAddressNotMatchException","message":"bad provider"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RelayError::Api { ref reason, .. } if reason == "ProviderAddressNotMatchException"));
        assert_eq!(
            err.to_string(),
            "GasFree API error (ProviderAddressNotMatchException): bad provider"
        );

        let err = unwrap_envelope(200, r#"{"code":500}"#).unwrap_err();
        assert_eq!(err.to_string(), "GasFree API error (UnknownError):");

        let err = unwrap_envelope(200, r#"{"code":500,"message":"missing field:"}"#).unwrap_err();
        assert_eq!(err.to_string(), "GasFree API error (UnknownError): missing field:");
    }

    #[test]
    fn non_json_success_body_is_an_api_error() {
        let err = unwrap_envelope(200, "<html>").unwrap_err();
        assert!(matches!(err, RelayError::Api { ref reason, .. } if reason == "UnknownError"));
    }

    #[test]
    fn non_2xx_is_a_transport_error() {
        let err = unwrap_envelope(
            401,
            r#"{"code":401,"reason":"Unauthorized","message":"bad signature"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RelayError::Transport { status: Some(401), .. }));
        assert_eq!(
            err.to_string(),
            "GasFree API error (Unauthorized): bad signature"
        );

        let err = unwrap_envelope(502, "Bad Gateway").unwrap_err();
        assert_eq!(err.to_string(), "GasFree API error (HTTP 502): Request failed");
    }

    #[test]
    fn connection_failures_have_no_status() {
        let err = RelayError::Transport {
            status: None,
            reason: None,
            message: Some("dns error".to_string()),
        };
        assert_eq!(err.to_string(), "GasFree request failed: dns error");
    }

    #[test]
    fn token_listing_accepts_tokens_or_assets() {
        let tokens = token_listing(json!({
            "tokens": [{ "tokenAddress": "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf", "transferFee": 5000 }]
        }))
        .unwrap();
        assert_eq!(tokens.len(), 1);

        let assets = token_listing(json!({
            "assets": [{ "address": "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf" }]
        }))
        .unwrap();
        assert_eq!(assets[0].contract(), "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf");

        assert!(token_listing(Value::Null).unwrap().is_empty());
        assert!(token_listing(json!({ "tokens": "none" })).unwrap().is_empty());
    }

    #[test]
    fn client_rejects_invalid_base_url() {
        let err = RelayClient::new(
            "not a url",
            "key",
            Secret::new("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
