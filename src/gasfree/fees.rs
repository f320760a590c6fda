// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Required-fee resolution for GasFree transfers.

use alloy::primitives::U256;
use tracing::debug;

use super::client::RelayApi;
use super::types::TokenConfig;
use crate::error::CliError;
use crate::tron::TronAddress;

/// Fee the relay will charge for one transfer of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub active: bool,
    pub allow_submit: Option<bool>,
    pub transfer_fee: U256,
    pub activate_fee: U256,
    /// `transfer_fee`, plus `activate_fee` while the account is inactive
    pub required_fee: U256,
}

impl FeeQuote {
    fn from_schedule(schedule: &TokenConfig, active: bool, allow_submit: Option<bool>) -> Self {
        let required_fee = if active {
            schedule.transfer_fee
        } else {
            schedule.transfer_fee + schedule.activate_fee
        };

        Self {
            active,
            allow_submit,
            transfer_fee: schedule.transfer_fee,
            activate_fee: schedule.activate_fee,
            required_fee,
        }
    }
}

/// Looks fees up per account first, then in the global token listing.
pub struct FeeResolver<'a, R: RelayApi + ?Sized> {
    relay: &'a R,
}

impl<'a, R: RelayApi + ?Sized> FeeResolver<'a, R> {
    pub fn new(relay: &'a R) -> Self {
        Self { relay }
    }

    pub async fn resolve_fee(
        &self,
        owner: &TronAddress,
        token: &TronAddress,
    ) -> Result<FeeQuote, CliError> {
        let account = self.relay.account_info(owner).await?;
        let token_key = token.to_base58();

        let quote = match account.asset(&token_key) {
            Some(asset) => FeeQuote::from_schedule(asset, account.active, account.submit_allowed()),
            None => {
                let tokens = self.relay.tokens().await?;
                let schedule = find_token(&tokens, &token_key)
                    .ok_or_else(|| CliError::UnsupportedToken(token_key.clone()))?;
                FeeQuote::from_schedule(schedule, account.active, account.submit_allowed())
            }
        };

        debug!(
            owner = %owner,
            token = %token,
            active = quote.active,
            required_fee = %quote.required_fee,
            "GasFree fee resolved"
        );

        Ok(quote)
    }
}

/// Exact address match in a token listing: any `tokenAddress` match wins
/// over an `address` match.
pub fn find_token<'t>(tokens: &'t [TokenConfig], token: &str) -> Option<&'t TokenConfig> {
    tokens
        .iter()
        .find(|t| t.token_address.as_deref() == Some(token))
        .or_else(|| tokens.iter().find(|t| t.address.as_deref() == Some(token)))
}
