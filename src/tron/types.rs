// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TRON network constants and shared value types.

use alloy::primitives::U256;

/// TRON network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Full node HTTP endpoint
    pub rpc_url: &'static str,
    /// USDT (TRC20) test contract
    pub usdt_contract: &'static str,
}

/// Shasta testnet. The USDT contract is the one used in the TRON developer docs.
pub const TRON_SHASTA: NetworkConfig = NetworkConfig {
    rpc_url: "https://api.shasta.trongrid.io",
    usdt_contract: "TG3XXyExBkPp9nzdajDZsozEu4BkaSJozs",
};

pub const TRON_NILE: NetworkConfig = NetworkConfig {
    rpc_url: "https://nile.trongrid.io",
    usdt_contract: "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf",
};

/// GasFree relay deployment parameters.
#[derive(Debug, Clone)]
pub struct GasFreeNetwork {
    /// Chain id used in the TIP-712 domain
    pub chain_id: u64,
    /// Relay API base URL (path prefix included)
    pub relay_url: &'static str,
    /// Default service provider
    pub service_provider: &'static str,
    /// GasFree controller contract
    pub verifying_contract: &'static str,
}

pub const GASFREE_NILE: GasFreeNetwork = GasFreeNetwork {
    chain_id: 3_448_148_188,
    relay_url: "https://open-test.gasfree.io/nile",
    service_provider: "TLyqzVGLV1srkB7dToTAEqgDSfPtXRJZYH",
    verifying_contract: "THQGuFzL87ZqhxkgqYEryRAd7gqFqL5rdc",
};

/// Sun charged per bandwidth point when free/staked bandwidth is exhausted.
pub const SUN_PER_BANDWIDTH: u64 = 1_000;

/// Energy price fallback when the node does not report `getEnergyFee`.
pub const DEFAULT_ENERGY_FEE_SUN: u64 = 420;

/// Default `fee_limit` for TRC20 calls (150 TRX) when no cap is configured.
pub const DEFAULT_FEE_LIMIT_SUN: u64 = 150_000_000;

/// Bytes added to the raw transaction size for the signature and
/// protobuf framing when estimating bandwidth.
pub const SIGNATURE_OVERHEAD_BYTES: u64 = 65 + 3;

/// Fee estimate for a transaction, in sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub fee: U256,
}

/// Result of a broadcast (or relayed) transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    /// Transaction id, or relay trace id for GasFree submissions
    pub hash: String,
    /// Fee actually charged (sun for on-chain sends, token base units for GasFree)
    pub fee: U256,
}
