// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GasFree relay request authentication.
//!
//! Every relay call carries an HMAC-SHA256 over `method + path + timestamp`,
//! keyed by the API secret and encoded as padded standard base64. The path
//! is the URL path only, including any prefix of the relay base URL
//! (`/nile/api/v1/...`); query strings and hosts are never signed.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::client::RelayError;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "Timestamp";
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Authentication material for exactly one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    timestamp: i64,
    signature: String,
    api_key: String,
}

impl SignedRequest {
    /// Sign `method path` at `timestamp` (unix seconds).
    pub fn new(
        method: &str,
        path: &str,
        timestamp: i64,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Self, RelayError> {
        Ok(Self {
            timestamp,
            signature: sign(method, path, timestamp, api_secret)?,
            api_key: api_key.to_string(),
        })
    }

    pub fn timestamp_header(&self) -> String {
        self.timestamp.to_string()
    }

    pub fn authorization_header(&self) -> String {
        format!("ApiKey {}:{}", self.api_key, self.signature)
    }
}

/// Deterministic relay signature for one request.
pub fn sign(method: &str, path: &str, timestamp: i64, secret: &str) -> Result<String, RelayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| RelayError::Config(format!("invalid API secret: {e}")))?;
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(timestamp.to_string().as_bytes());

    Ok(Base64::encode_string(&mac.finalize().into_bytes()))
}
