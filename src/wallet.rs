// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet account abstraction used by the `tron-wallet` commands.

use alloy::primitives::U256;
use async_trait::async_trait;

use crate::tron::{FeeQuote, TransferResult, TronAddress, TronClientError};

/// A single seed-derived account on a TRON-compatible chain.
///
/// Amounts are base units: sun for TRX, token base units for TRC20.
#[async_trait]
pub trait WalletAccount: Send + Sync {
    fn address(&self) -> TronAddress;

    /// Native TRX balance in sun.
    async fn balance(&self) -> Result<U256, TronClientError>;

    async fn token_balance(&self, token: &TronAddress) -> Result<U256, TronClientError>;

    async fn quote_send_transaction(
        &self,
        to: &TronAddress,
        value: U256,
    ) -> Result<FeeQuote, TronClientError>;

    async fn send_transaction(
        &self,
        to: &TronAddress,
        value: U256,
    ) -> Result<TransferResult, TronClientError>;

    async fn quote_transfer(
        &self,
        token: &TronAddress,
        recipient: &TronAddress,
        amount: U256,
    ) -> Result<FeeQuote, TronClientError>;

    async fn transfer(
        &self,
        token: &TronAddress,
        recipient: &TronAddress,
        amount: U256,
    ) -> Result<TransferResult, TronClientError>;

    /// Sign a personal message; returns a `0x`-prefixed signature.
    fn sign(&self, message: &str) -> Result<String, TronClientError>;

    fn verify(&self, message: &str, signature: &str) -> Result<bool, TronClientError>;
}
