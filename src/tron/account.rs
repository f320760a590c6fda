// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Seed-derived TRON account backed by a full node.
//!
//! The node builds every transaction; this account checks the returned
//! transaction id, signs it locally and broadcasts it. Fee quotes are
//! derived from the transaction the node would broadcast, so a quote and
//! the matching send agree on size.

use alloy::{primitives::U256, signers::local::PrivateKeySigner};
use async_trait::async_trait;
use tracing::{debug, info};

use super::address::TronAddress;
use super::client::{TronClient, TronClientError, UnsignedTransaction};
use super::signing;
use super::trc20;
use super::types::{
    FeeQuote, TransferResult, DEFAULT_ENERGY_FEE_SUN, DEFAULT_FEE_LIMIT_SUN,
    SIGNATURE_OVERHEAD_BYTES, SUN_PER_BANDWIDTH,
};
use crate::config::{NodeConfig, Secret};
use crate::wallet::WalletAccount;

/// Account at a fixed derivation index.
///
/// The signing key lives only as long as this value.
pub struct TronAccount {
    client: TronClient,
    signer: PrivateKeySigner,
    address: TronAddress,
    transfer_max_fee: Option<U256>,
}

impl TronAccount {
    pub fn new(
        client: TronClient,
        signer: PrivateKeySigner,
        transfer_max_fee: Option<U256>,
    ) -> Self {
        let address = signing::signer_address(&signer);
        Self {
            client,
            signer,
            address,
            transfer_max_fee,
        }
    }

    /// Derive account `index` from the seed phrase and connect it to `node`.
    pub fn from_seed(
        seed_phrase: &Secret,
        index: u32,
        node: &NodeConfig,
        transfer_max_fee: Option<U256>,
    ) -> Result<Self, TronClientError> {
        let signer = signing::signer_from_mnemonic(seed_phrase.expose(), index)?;
        let client = TronClient::new(node)?;
        Ok(Self::new(client, signer, transfer_max_fee))
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// `fee_limit` attached to contract calls.
    fn fee_limit(&self) -> u64 {
        fee_limit_for(self.transfer_max_fee)
    }

    async fn bandwidth_fee(&self, tx: &UnsignedTransaction) -> Result<U256, TronClientError> {
        let resource = self.client.get_account_resource(&self.address).await?;
        Ok(bandwidth_fee(
            tx.raw_len() + SIGNATURE_OVERHEAD_BYTES,
            resource.available_bandwidth(),
        ))
    }

    async fn build_trc20_transfer(
        &self,
        token: &TronAddress,
        recipient: &TronAddress,
        amount: U256,
    ) -> Result<(UnsignedTransaction, U256), TronClientError> {
        let parameter = trc20::transfer_parameter(recipient, amount);

        let simulation = self
            .client
            .trigger_constant_contract(
                &self.address,
                token,
                trc20::TRANSFER_SELECTOR,
                &parameter,
            )
            .await?;
        let energy_fee = self
            .client
            .get_energy_fee()
            .await?
            .unwrap_or(DEFAULT_ENERGY_FEE_SUN);

        let tx = self
            .client
            .trigger_smart_contract(
                &self.address,
                token,
                trc20::TRANSFER_SELECTOR,
                &parameter,
                self.fee_limit(),
            )
            .await?;

        let energy_cost = U256::from(simulation.energy_used) * U256::from(energy_fee);
        let fee = self.bandwidth_fee(&tx).await? + energy_cost;

        debug!(
            energy_used = simulation.energy_used,
            energy_fee,
            fee = %fee,
            "TRC20 transfer quoted"
        );

        Ok((tx, fee))
    }

    async fn sign_and_broadcast(
        &self,
        tx: UnsignedTransaction,
    ) -> Result<String, TronClientError> {
        let digest = signing::verify_transaction_id(&tx.raw_data_hex, &tx.tx_id)?;
        let signature = signing::sign_digest(&self.signer, &digest)?;
        let payload = tx.with_signature(signature);
        self.client.broadcast(&payload).await
    }
}

#[async_trait]
impl WalletAccount for TronAccount {
    fn address(&self) -> TronAddress {
        self.address
    }

    async fn balance(&self) -> Result<U256, TronClientError> {
        self.client.get_balance(&self.address).await
    }

    async fn token_balance(&self, token: &TronAddress) -> Result<U256, TronClientError> {
        self.client.trc20_balance(token, &self.address).await
    }

    async fn quote_send_transaction(
        &self,
        to: &TronAddress,
        value: U256,
    ) -> Result<FeeQuote, TronClientError> {
        let tx = self
            .client
            .create_transaction(&self.address, to, value)
            .await?;
        let fee = self.bandwidth_fee(&tx).await?;
        Ok(FeeQuote { fee })
    }

    async fn send_transaction(
        &self,
        to: &TronAddress,
        value: U256,
    ) -> Result<TransferResult, TronClientError> {
        let tx = self
            .client
            .create_transaction(&self.address, to, value)
            .await?;
        let fee = self.bandwidth_fee(&tx).await?;
        check_fee_cap(fee, self.transfer_max_fee)?;

        let hash = self.sign_and_broadcast(tx).await?;
        info!(hash = %hash, to = %to, value = %value, "TRX transfer broadcast");

        Ok(TransferResult { hash, fee })
    }

    async fn quote_transfer(
        &self,
        token: &TronAddress,
        recipient: &TronAddress,
        amount: U256,
    ) -> Result<FeeQuote, TronClientError> {
        let (_, fee) = self.build_trc20_transfer(token, recipient, amount).await?;
        Ok(FeeQuote { fee })
    }

    async fn transfer(
        &self,
        token: &TronAddress,
        recipient: &TronAddress,
        amount: U256,
    ) -> Result<TransferResult, TronClientError> {
        let (tx, fee) = self.build_trc20_transfer(token, recipient, amount).await?;
        check_fee_cap(fee, self.transfer_max_fee)?;

        let hash = self.sign_and_broadcast(tx).await?;
        info!(
            hash = %hash,
            token = %token,
            to = %recipient,
            amount = %amount,
            "TRC20 transfer broadcast"
        );

        Ok(TransferResult { hash, fee })
    }

    fn sign(&self, message: &str) -> Result<String, TronClientError> {
        signing::sign_message(&self.signer, message)
    }

    fn verify(&self, message: &str, signature: &str) -> Result<bool, TronClientError> {
        signing::verify_message(&self.address, message, signature)
    }
}

/// Bandwidth is free while the account's daily allowance covers the
/// transaction; otherwise every byte is burned at the bandwidth price.
pub fn bandwidth_fee(tx_bytes: u64, available_bandwidth: u64) -> U256 {
    if available_bandwidth >= tx_bytes {
        U256::ZERO
    } else {
        U256::from(tx_bytes) * U256::from(SUN_PER_BANDWIDTH)
    }
}

/// Reject a send whose fee reaches the configured cap.
pub fn check_fee_cap(fee: U256, cap: Option<U256>) -> Result<(), TronClientError> {
    match cap {
        Some(cap) if fee >= cap => Err(TronClientError::FeeCapExceeded { fee, cap }),
        _ => Ok(()),
    }
}

fn fee_limit_for(cap: Option<U256>) -> u64 {
    match cap {
        Some(cap) => u64::try_from(cap).unwrap_or(u64::MAX),
        None => DEFAULT_FEE_LIMIT_SUN,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn account(cap: Option<U256>) -> TronAccount {
        let node = NodeConfig {
            rpc_url: "https://api.shasta.trongrid.io".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        };
        TronAccount::from_seed(&Secret::new(MNEMONIC.to_string()), 0, &node, cap).unwrap()
    }

    #[test]
    fn bandwidth_is_free_when_covered() {
        assert_eq!(bandwidth_fee(268, 600), U256::ZERO);
        assert_eq!(bandwidth_fee(268, 268), U256::ZERO);
        assert_eq!(bandwidth_fee(268, 100), U256::from(268_000u64));
    }

    #[test]
    fn fee_cap_rejects_at_or_above_cap() {
        let cap = Some(U256::from(1_000u64));
        assert!(check_fee_cap(U256::from(999u64), cap).is_ok());
        assert!(matches!(
            check_fee_cap(U256::from(1_000u64), cap),
            Err(TronClientError::FeeCapExceeded { .. })
        ));
        assert!(check_fee_cap(U256::from(u64::MAX), None).is_ok());
    }

    #[test]
    fn fee_limit_follows_cap() {
        assert_eq!(fee_limit_for(None), DEFAULT_FEE_LIMIT_SUN);
        assert_eq!(fee_limit_for(Some(U256::from(30_000_000u64))), 30_000_000);
        assert_eq!(fee_limit_for(Some(U256::MAX)), u64::MAX);
    }

    #[test]
    fn account_signs_and_verifies_its_own_messages() {
        let account = account(None);
        let signature = account.sign("hello").unwrap();
        assert!(account.verify("hello", &signature).unwrap());
        assert!(!account.verify("goodbye", &signature).unwrap());
        assert_eq!(
            account.address(),
            signing::signer_address(account.signer())
        );
    }
}
