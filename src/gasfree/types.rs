// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GasFree relay payloads.
//!
//! The relay is lenient about numbers: fees may arrive as JSON numbers,
//! decimal strings, empty strings or not at all. Absent fees read as zero.

use alloy::primitives::U256;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::tron::TronAddress;

/// Fee schedule of one token, from the global listing or an account's assets.
///
/// Listings name the contract `tokenAddress`, `address` or both; each
/// spelling is kept so lookups can prefer `tokenAddress`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimal: Option<u8>,
    #[serde(default, deserialize_with = "fee_or_zero")]
    pub transfer_fee: U256,
    #[serde(default, deserialize_with = "fee_or_zero")]
    pub activate_fee: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Relay view of an owner account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub account_address: Option<String>,
    #[serde(default)]
    pub gas_free_address: Option<TronAddress>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub allow_submit: Option<bool>,
    #[serde(rename = "allow_submit", default)]
    pub allow_submit_legacy: Option<bool>,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub assets: Vec<TokenConfig>,
}

impl TokenConfig {
    /// Contract address, `tokenAddress` first.
    pub fn contract(&self) -> &str {
        self.token_address
            .as_deref()
            .or(self.address.as_deref())
            .unwrap_or_default()
    }
}

impl AccountInfo {
    /// `allowSubmit`, else `allow_submit`.
    pub fn submit_allowed(&self) -> Option<bool> {
        self.allow_submit.or(self.allow_submit_legacy)
    }

    /// Per-account fee override for `token`, matched on `tokenAddress`.
    pub fn asset(&self, token: &str) -> Option<&TokenConfig> {
        self.assets
            .iter()
            .find(|a| a.token_address.as_deref() == Some(token))
    }
}

/// Signed permit body posted to `/api/v1/gasfree/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub token: String,
    pub service_provider: String,
    pub user: String,
    pub receiver: String,
    pub value: String,
    pub max_fee: String,
    pub deadline: u64,
    pub version: u64,
    pub nonce: u64,
    pub sig: String,
}

/// Relay record of a submitted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTrace {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub target_address: Option<String>,
    #[serde(default, deserialize_with = "fee_or_zero")]
    pub amount: U256,
    #[serde(default, deserialize_with = "optional_fee")]
    pub max_fee: Option<U256>,
    #[serde(default, deserialize_with = "optional_fee")]
    pub estimated_transfer_fee: Option<U256>,
    #[serde(default, deserialize_with = "optional_fee")]
    pub estimated_activate_fee: Option<U256>,
    #[serde(default)]
    pub txn_hash: Option<String>,
    #[serde(default)]
    pub txn_state: Option<String>,
}

impl TransferTrace {
    /// Fee the relay expects to charge, when it reported one.
    pub fn estimated_fee(&self) -> Option<U256> {
        match (self.estimated_transfer_fee, self.estimated_activate_fee) {
            (None, None) => None,
            (transfer, activate) => {
                Some(transfer.unwrap_or_default() + activate.unwrap_or_default())
            }
        }
    }
}

fn parse_fee(value: Value) -> Result<Option<U256>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => U256::from_str_radix(s.trim(), 10)
            .map(Some)
            .map_err(|e| format!("invalid fee {s:?}: {e}")),
        Value::Number(n) => n
            .as_u64()
            .map(|v| Some(U256::from(v)))
            .ok_or_else(|| format!("fee must be a non-negative integer, got {n}")),
        other => Err(format!("unexpected fee value: {other}")),
    }
}

fn fee_or_zero<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    optional_fee(deserializer).map(Option::unwrap_or_default)
}

fn optional_fee<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_fee(value).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn token_fees_accept_numbers_strings_and_absence() {
        let token: TokenConfig = serde_json::from_value(json!({
            "tokenAddress": "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf",
            "symbol": "USDT",
            "transferFee": "5000",
            "activateFee": 20000
        }))
        .unwrap();
        assert_eq!(token.transfer_fee, U256::from(5_000u64));
        assert_eq!(token.activate_fee, U256::from(20_000u64));

        let bare: TokenConfig = serde_json::from_value(json!({
            "address": "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf",
            "transferFee": null,
            "activateFee": ""
        }))
        .unwrap();
        assert_eq!(bare.contract(), "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf");
        assert_eq!(bare.transfer_fee, U256::ZERO);
        assert_eq!(bare.activate_fee, U256::ZERO);
    }

    #[test]
    fn negative_or_fractional_fees_are_rejected() {
        for bad in [json!(-1), json!(1.5), json!("12a"), json!(true)] {
            let result: Result<TokenConfig, _> = serde_json::from_value(json!({
                "tokenAddress": "T",
                "transferFee": bad
            }));
            assert!(result.is_err());
        }
    }

    #[test]
    fn account_info_accepts_both_allow_submit_spellings() {
        let camel: AccountInfo = serde_json::from_value(json!({
            "active": true,
            "allowSubmit": false
        }))
        .unwrap();
        assert_eq!(camel.submit_allowed(), Some(false));

        let snake: AccountInfo = serde_json::from_value(json!({
            "active": false,
            "allow_submit": true,
            "gasFreeAddress": "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL",
            "nonce": 4,
            "assets": [{ "tokenAddress": "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf", "transferFee": 1 }]
        }))
        .unwrap();
        assert_eq!(snake.submit_allowed(), Some(true));
        assert_eq!(snake.nonce, 4);
        assert!(snake.asset("TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf").is_some());
        assert!(snake.asset("TG3XXyExBkPp9nzdajDZsozEu4BkaSJozs").is_none());

        let empty: AccountInfo = serde_json::from_value(json!({})).unwrap();
        assert!(!empty.active);
        assert_eq!(empty.submit_allowed(), None);
    }

    #[test]
    fn both_spellings_in_one_payload_decode() {
        let info: AccountInfo = serde_json::from_value(json!({
            "active": true,
            "allowSubmit": false,
            "allow_submit": true
        }))
        .unwrap();
        assert_eq!(info.submit_allowed(), Some(false));

        let token: TokenConfig = serde_json::from_value(json!({
            "tokenAddress": "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf",
            "address": "TG3XXyExBkPp9nzdajDZsozEu4BkaSJozs",
            "symbol": "USDT",
            "tokenSymbol": "USDT",
            "transferFee": 5000
        }))
        .unwrap();
        assert_eq!(token.contract(), "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf");
        assert_eq!(token.transfer_fee, U256::from(5_000u64));
    }

    #[test]
    fn trace_estimated_fee_sums_reported_parts() {
        let trace: TransferTrace = serde_json::from_value(json!({
            "id": "abc",
            "state": "WAITING",
            "amount": "1000000",
            "estimatedTransferFee": 5000,
            "estimatedActivateFee": "20000"
        }))
        .unwrap();
        assert_eq!(trace.estimated_fee(), Some(U256::from(25_000u64)));

        let unreported: TransferTrace = serde_json::from_value(json!({ "id": "abc" })).unwrap();
        assert_eq!(unreported.estimated_fee(), None);
    }
}
