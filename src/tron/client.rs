// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TRON full-node client over the TronGrid HTTP API.
//!
//! All requests use `visible: true`, so addresses travel as base58
//! strings. The node builds unsigned transactions; signing happens in
//! [`super::signing`].

use std::time::Duration;

use alloy::primitives::U256;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::address::TronAddress;
use super::trc20;
use crate::config::NodeConfig;

const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// Errors that can occur during TRON node operations.
#[derive(Debug, thiserror::Error)]
pub enum TronClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("TRON node request failed: {0}")]
    Request(String),

    #[error("TRON node error: {0}")]
    Node(String),

    #[error("TRON node response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Exceeded maximum fee cost for transfer operation (fee {fee} sun, cap {cap} sun)")]
    FeeCapExceeded { fee: U256, cap: U256 },
}

/// Transaction built by the node, not yet signed.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    pub tx_id: String,
    pub raw_data_hex: String,
    body: Value,
}

impl UnsignedTransaction {
    fn from_value(body: Value) -> Result<Self, TronClientError> {
        let tx_id = body
            .get("txID")
            .and_then(Value::as_str)
            .ok_or_else(|| TronClientError::InvalidResponse("missing txID".to_string()))?
            .to_string();
        let raw_data_hex = body
            .get("raw_data_hex")
            .and_then(Value::as_str)
            .ok_or_else(|| TronClientError::InvalidResponse("missing raw_data_hex".to_string()))?
            .to_string();

        Ok(Self {
            tx_id,
            raw_data_hex,
            body,
        })
    }

    /// Size of the serialized raw data, in bytes.
    pub fn raw_len(&self) -> u64 {
        (self.raw_data_hex.len() / 2) as u64
    }

    /// Attach a signature, producing the broadcast payload.
    pub fn with_signature(mut self, signature_hex: String) -> Value {
        self.body["signature"] = json!([signature_hex]);
        self.body
    }
}

/// Result of a read-only contract call.
#[derive(Debug, Clone, Default)]
pub struct ConstantCallResult {
    pub constant_result: Vec<String>,
    pub energy_used: u64,
}

/// Bandwidth counters of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountResource {
    #[serde(rename = "freeNetLimit", default)]
    pub free_net_limit: u64,
    #[serde(rename = "freeNetUsed", default)]
    pub free_net_used: u64,
    #[serde(rename = "NetLimit", default)]
    pub net_limit: u64,
    #[serde(rename = "NetUsed", default)]
    pub net_used: u64,
}

impl AccountResource {
    /// Bandwidth points still available today (free plus staked).
    pub fn available_bandwidth(&self) -> u64 {
        self.free_net_limit.saturating_sub(self.free_net_used)
            + self.net_limit.saturating_sub(self.net_used)
    }
}

#[derive(Debug, Default, Deserialize)]
struct AccountResponse {
    #[serde(default)]
    balance: u64,
}

#[derive(Debug, Deserialize)]
struct ChainParameters {
    #[serde(rename = "chainParameter", default)]
    chain_parameter: Vec<ChainParameter>,
}

#[derive(Debug, Deserialize)]
struct ChainParameter {
    key: String,
    #[serde(default)]
    value: Option<i64>,
}

/// TronGrid HTTP client.
#[derive(Debug, Clone)]
pub struct TronClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl TronClient {
    /// Create a client for the node at `config.rpc_url`.
    pub fn new(config: &NodeConfig) -> Result<Self, TronClientError> {
        url::Url::parse(&config.rpc_url)
            .map_err(|e| TronClientError::InvalidRpcUrl(format!("{}: {e}", config.rpc_url)))?;

        let http = build_http_client(config.timeout)
            .map_err(|e| TronClientError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.rpc_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    /// Native balance in sun. Accounts unknown to the node have zero balance.
    pub async fn get_balance(&self, address: &TronAddress) -> Result<U256, TronClientError> {
        let response = self
            .post_json(
                "/wallet/getaccount",
                &json!({ "address": address.to_base58(), "visible": true }),
            )
            .await?;
        let account: AccountResponse = serde_json::from_value(response)
            .map_err(|e| TronClientError::InvalidResponse(format!("getaccount: {e}")))?;
        Ok(U256::from(account.balance))
    }

    pub async fn get_account_resource(
        &self,
        address: &TronAddress,
    ) -> Result<AccountResource, TronClientError> {
        let response = self
            .post_json(
                "/wallet/getaccountresource",
                &json!({ "address": address.to_base58(), "visible": true }),
            )
            .await?;
        serde_json::from_value(response)
            .map_err(|e| TronClientError::InvalidResponse(format!("getaccountresource: {e}")))
    }

    /// Current energy price in sun, from the `getEnergyFee` chain parameter.
    pub async fn get_energy_fee(&self) -> Result<Option<u64>, TronClientError> {
        let response = self.get_json("/wallet/getchainparameters").await?;
        let params: ChainParameters = serde_json::from_value(response)
            .map_err(|e| TronClientError::InvalidResponse(format!("getchainparameters: {e}")))?;

        Ok(params
            .chain_parameter
            .into_iter()
            .find(|p| p.key == "getEnergyFee")
            .map(|p| p.value.unwrap_or(0).max(0) as u64))
    }

    /// Build an unsigned TRX transfer.
    pub async fn create_transaction(
        &self,
        owner: &TronAddress,
        to: &TronAddress,
        amount_sun: U256,
    ) -> Result<UnsignedTransaction, TronClientError> {
        let amount = u64::try_from(amount_sun)
            .map_err(|_| TronClientError::InvalidResponse("amount exceeds u64".to_string()))?;

        let response = self
            .post_json(
                "/wallet/createtransaction",
                &json!({
                    "owner_address": owner.to_base58(),
                    "to_address": to.to_base58(),
                    "amount": amount,
                    "visible": true
                }),
            )
            .await?;

        UnsignedTransaction::from_value(response)
    }

    /// Build an unsigned smart-contract call.
    pub async fn trigger_smart_contract(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        function_selector: &str,
        parameter: &str,
        fee_limit: u64,
    ) -> Result<UnsignedTransaction, TronClientError> {
        let response = self
            .post_json(
                "/wallet/triggersmartcontract",
                &json!({
                    "owner_address": owner.to_base58(),
                    "contract_address": contract.to_base58(),
                    "function_selector": function_selector,
                    "parameter": parameter,
                    "fee_limit": fee_limit,
                    "call_value": 0,
                    "visible": true
                }),
            )
            .await?;

        check_trigger_result(&response)?;

        let transaction = response
            .get("transaction")
            .cloned()
            .ok_or_else(|| TronClientError::InvalidResponse("missing transaction".to_string()))?;
        UnsignedTransaction::from_value(transaction)
    }

    /// Execute a read-only contract call.
    pub async fn trigger_constant_contract(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        function_selector: &str,
        parameter: &str,
    ) -> Result<ConstantCallResult, TronClientError> {
        let response = self
            .post_json(
                "/wallet/triggerconstantcontract",
                &json!({
                    "owner_address": owner.to_base58(),
                    "contract_address": contract.to_base58(),
                    "function_selector": function_selector,
                    "parameter": parameter,
                    "visible": true
                }),
            )
            .await?;

        check_trigger_result(&response)?;

        let constant_result = response
            .get("constant_result")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let energy_used = response
            .get("energy_used")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        Ok(ConstantCallResult {
            constant_result,
            energy_used,
        })
    }

    /// TRC20 `balanceOf(holder)` in token base units.
    pub async fn trc20_balance(
        &self,
        token: &TronAddress,
        holder: &TronAddress,
    ) -> Result<U256, TronClientError> {
        let result = self
            .trigger_constant_contract(
                holder,
                token,
                trc20::BALANCE_OF_SELECTOR,
                &trc20::balance_of_parameter(holder),
            )
            .await?;

        let word = result.constant_result.first().ok_or_else(|| {
            TronClientError::InvalidResponse(format!("balanceOf on {token} returned no result"))
        })?;
        trc20::decode_uint256(word)
    }

    /// Broadcast a signed transaction; returns its id.
    pub async fn broadcast(&self, signed: &Value) -> Result<String, TronClientError> {
        let response = self
            .post_json("/wallet/broadcasttransaction", signed)
            .await?;

        if response.get("result").and_then(Value::as_bool) != Some(true) {
            let code = response
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .map(decode_node_message)
                .unwrap_or_default();
            return Err(TronClientError::Node(
                format!("broadcast rejected ({code}): {message}").trim().to_string(),
            ));
        }

        response
            .get("txid")
            .and_then(Value::as_str)
            .or_else(|| signed.get("txID").and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| TronClientError::InvalidResponse("missing txid".to_string()))
    }

    async fn get_json(&self, path: &str) -> Result<Value, TronClientError> {
        let mut request = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TronClientError::Request(format!("GET {path} failed: {e}")))?;

        read_node_response("GET", path, response).await
    }

    async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, TronClientError> {
        debug!(path, "TRON node request");

        let mut request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("Content-Type", "application/json")
            .json(payload);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TronClientError::Request(format!("POST {path} failed: {e}")))?;

        read_node_response("POST", path, response).await
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

async fn read_node_response(
    method: &str,
    path: &str,
    response: reqwest::Response,
) -> Result<Value, TronClientError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(TronClientError::Request(format!(
            "{method} {path} returned {status}: {body}"
        )));
    }

    let body: Value = response.json().await.map_err(|e| {
        TronClientError::InvalidResponse(format!("{method} {path} invalid JSON: {e}"))
    })?;

    if let Some(error) = body.get("Error").and_then(Value::as_str) {
        return Err(TronClientError::Node(error.to_string()));
    }

    Ok(body)
}

/// Contract calls report failures under `result`, with a hex-encoded message.
fn check_trigger_result(response: &Value) -> Result<(), TronClientError> {
    let Some(result) = response.get("result") else {
        return Ok(());
    };

    if result.get("result").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }

    let code = result
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN");
    let message = result
        .get("message")
        .and_then(Value::as_str)
        .map(decode_node_message)
        .unwrap_or_default();

    Err(TronClientError::Node(
        format!("contract call failed ({code}): {message}").trim().to_string(),
    ))
}

/// Node messages are usually hex-encoded UTF-8; fall back to the raw text.
fn decode_node_message(raw: &str) -> String {
    alloy::hex::decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_string())
}
