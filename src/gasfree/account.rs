// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Seed-derived owner account that spends through the GasFree relay.
//!
//! The owner key never pays gas. Tokens sit at the owner's GasFree address
//! (reported by the relay), and transfers are authorized by a TIP-712
//! permit that the relay's service provider executes on chain.

use std::time::Duration;

use alloy::{primitives::U256, signers::local::PrivateKeySigner, sol_types::Eip712Domain};
use async_trait::async_trait;
use tracing::info;

use super::client::{RelayApi, RelayClient, RelayError};
use super::permit::{self, Permit};
use super::transfer::{GasFreeWallet, TransferIntent};
use super::types::{AccountInfo, ProviderInfo};
use crate::config::GasFreeConfig;
use crate::error::CliError;
use crate::tron::{signing, TransferResult, TronAddress, TronClient};

pub struct GasFreeAccount {
    relay: RelayClient,
    node: TronClient,
    signer: PrivateKeySigner,
    owner: TronAddress,
    pinned_service_provider: Option<TronAddress>,
    default_service_provider: TronAddress,
    domain: Eip712Domain,
    deadline: Duration,
}

impl GasFreeAccount {
    /// Derive the owner key. Makes no network call.
    pub fn new(config: &GasFreeConfig, relay: RelayClient) -> Result<Self, CliError> {
        let signer = signing::signer_from_mnemonic(config.seed_phrase.expose(), 0)?;
        let node = TronClient::new(&config.node)?;

        Ok(Self {
            owner: signing::signer_address(&signer),
            relay,
            node,
            signer,
            pinned_service_provider: config.pinned_service_provider,
            default_service_provider: config.default_service_provider,
            domain: permit::domain(config.chain_id, &config.verifying_contract),
            deadline: config.deadline,
        })
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    /// Provider that will execute permits.
    ///
    /// Unless one is pinned in the configuration, the relay's first listed
    /// provider is used, falling back to the network default.
    pub async fn service_provider(&self) -> Result<TronAddress, CliError> {
        let providers = match self.pinned_service_provider {
            Some(_) => Vec::new(),
            None => self.relay.providers().await?,
        };
        choose_service_provider(
            self.pinned_service_provider,
            &providers,
            self.default_service_provider,
        )
    }

    pub async fn account_info(&self) -> Result<AccountInfo, CliError> {
        Ok(self.relay.account_info(&self.owner).await?)
    }
}

#[async_trait]
impl GasFreeWallet for GasFreeAccount {
    fn owner(&self) -> TronAddress {
        self.owner
    }

    async fn sender(&self) -> Result<TronAddress, CliError> {
        let info = self.account_info().await?;
        gas_free_address(&info)
    }

    async fn trx_balance(&self) -> Result<U256, CliError> {
        Ok(self.node.get_balance(&self.owner).await?)
    }

    async fn token_balance(&self, token: &TronAddress) -> Result<U256, CliError> {
        let sender = self.sender().await?;
        Ok(self.node.trc20_balance(token, &sender).await?)
    }

    async fn submit(
        &self,
        intent: &TransferIntent,
        signed_max_fee: U256,
    ) -> Result<TransferResult, CliError> {
        let service_provider = self.service_provider().await?;
        let info = self.account_info().await?;
        let deadline = chrono::Utc::now().timestamp().max(0) as u64 + self.deadline.as_secs();

        let permit = Permit {
            token: intent.token,
            service_provider,
            user: self.owner,
            receiver: intent.recipient,
            value: intent.amount,
            max_fee: signed_max_fee,
            deadline,
            nonce: info.nonce,
        };
        let request = permit.sign(&self.signer, &self.domain)?;

        let trace = self.relay.submit(&request).await?;
        info!(
            trace_id = %trace.id,
            service_provider = %service_provider,
            state = trace.state.as_deref().unwrap_or("unknown"),
            "GasFree transfer submitted"
        );

        Ok(TransferResult {
            fee: fee_paid(trace.estimated_fee(), signed_max_fee),
            hash: trace.id,
        })
    }
}

/// The relay may report a lower fee than the signed ceiling, never a higher one.
fn fee_paid(estimated: Option<U256>, signed_max_fee: U256) -> U256 {
    estimated.map_or(signed_max_fee, |fee| fee.min(signed_max_fee))
}

fn gas_free_address(info: &AccountInfo) -> Result<TronAddress, CliError> {
    info.gas_free_address.ok_or_else(|| {
        RelayError::InvalidResponse("account lookup did not include gasFreeAddress".to_string())
            .into()
    })
}

fn choose_service_provider(
    pinned: Option<TronAddress>,
    providers: &[ProviderInfo],
    default: TronAddress,
) -> Result<TronAddress, CliError> {
    if let Some(pinned) = pinned {
        return Ok(pinned);
    }

    match providers.first() {
        Some(provider) => provider.address.parse().map_err(|e| {
            RelayError::InvalidResponse(format!("provider address {}: {e}", provider.address))
                .into()
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const DEFAULT: &str = "TLyqzVGLV1srkB7dToTAEqgDSfPtXRJZYH";
    const OTHER: &str = "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL";

    fn address(s: &str) -> TronAddress {
        TronAddress::from_str(s).unwrap()
    }

    fn provider(address: &str) -> ProviderInfo {
        ProviderInfo {
            address: address.to_string(),
            name: Some("provider".to_string()),
        }
    }

    #[test]
    fn pinned_provider_wins() {
        let chosen =
            choose_service_provider(Some(address(OTHER)), &[provider(DEFAULT)], address(DEFAULT))
                .unwrap();
        assert_eq!(chosen, address(OTHER));
    }

    #[test]
    fn first_listed_provider_is_used() {
        let chosen =
            choose_service_provider(None, &[provider(OTHER), provider(DEFAULT)], address(DEFAULT))
                .unwrap();
        assert_eq!(chosen, address(OTHER));
    }

    #[test]
    fn empty_listing_falls_back_to_default() {
        let chosen = choose_service_provider(None, &[], address(DEFAULT)).unwrap();
        assert_eq!(chosen, address(DEFAULT));

        assert!(choose_service_provider(None, &[provider("bogus")], address(DEFAULT)).is_err());
    }

    #[test]
    fn fee_paid_never_exceeds_ceiling() {
        let ceiling = U256::from(25_000u64);
        assert_eq!(fee_paid(None, ceiling), ceiling);
        assert_eq!(fee_paid(Some(U256::from(5_000u64)), ceiling), U256::from(5_000u64));
        assert_eq!(fee_paid(Some(U256::from(30_000u64)), ceiling), ceiling);
    }

    #[test]
    fn sender_requires_gas_free_address() {
        let info: AccountInfo = serde_json::from_value(serde_json::json!({
            "gasFreeAddress": OTHER
        }))
        .unwrap();
        assert_eq!(gas_free_address(&info).unwrap(), address(OTHER));

        let missing: AccountInfo = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(
            gas_free_address(&missing),
            Err(CliError::Relay(RelayError::InvalidResponse(_)))
        ));
    }
}
