// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fee-guarded GasFree transfer pipeline.
//!
//! A transfer runs these steps in order, and none is skipped:
//!
//! 1. validate recipient and token addresses
//! 2. parse the amount and the optional max fee
//! 3. read balances
//! 4. resolve the required fee
//! 5. pick the signed max fee (explicit cap, else the required fee)
//! 6. reject an explicit cap below the required fee
//! 7. reject when the balance cannot cover amount plus signed max fee
//! 8. submit, passing the signed max fee as the fee ceiling
//! 9. return the trace id and the fee paid
//!
//! Steps 1 and 2 make no network call. Only step 8 changes state.

use std::str::FromStr;

use alloy::primitives::U256;
use async_trait::async_trait;
use tracing::info;

use super::client::RelayApi;
use super::fees::FeeResolver;
use crate::error::CliError;
use crate::tron::{TransferResult, TronAddress};
use crate::units::parse_base_units;

/// Account that can authorize relay transfers.
#[async_trait]
pub trait GasFreeWallet: Send + Sync {
    /// Address owning the signing key.
    fn owner(&self) -> TronAddress;

    /// Address the tokens are sent from.
    async fn sender(&self) -> Result<TronAddress, CliError>;

    async fn trx_balance(&self) -> Result<U256, CliError>;

    async fn token_balance(&self, token: &TronAddress) -> Result<U256, CliError>;

    /// Sign and submit `intent`, authorizing at most `signed_max_fee`.
    async fn submit(
        &self,
        intent: &TransferIntent,
        signed_max_fee: U256,
    ) -> Result<TransferResult, CliError>;
}

/// Raw transfer arguments as typed by the user.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    pub recipient: &'a str,
    pub amount: &'a str,
    pub token: &'a str,
    pub max_fee: Option<&'a str>,
}

/// Validated transfer parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub recipient: TronAddress,
    pub token: TronAddress,
    pub amount: U256,
    pub max_fee: Option<U256>,
}

impl TransferIntent {
    pub fn parse(request: &TransferRequest<'_>) -> Result<Self, CliError> {
        let recipient = TronAddress::from_str(request.recipient)
            .map_err(|_| CliError::InvalidAddress("Invalid recipient TRON address".to_string()))?;
        let token = parse_token(request.token)?;

        let amount = parse_base_units("amountBase", request.amount)?;
        let max_fee = request
            .max_fee
            .map(|raw| parse_base_units("maxFee", raw))
            .transpose()?;

        Ok(Self {
            recipient,
            token,
            amount,
            max_fee,
        })
    }
}

/// Validate a token contract argument.
pub fn parse_token(raw: &str) -> Result<TronAddress, CliError> {
    TronAddress::from_str(raw)
        .map_err(|_| CliError::InvalidAddress("Invalid token contract address".to_string()))
}

/// What the pipeline saw before submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub from: TronAddress,
    pub to: TronAddress,
    pub token: TronAddress,
    pub amount: U256,
    pub trx_balance: U256,
    pub token_balance: U256,
    pub active: bool,
    pub allow_submit: Option<bool>,
    pub required_fee: U256,
    pub max_fee: Option<U256>,
    pub signed_max_fee: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub report: TransferReport,
    pub hash: String,
    pub fee_paid: U256,
}

/// Steps 1 to 5 done; nothing checked against the fee or balance yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransfer {
    pub intent: TransferIntent,
    pub report: TransferReport,
}

pub struct TransferOrchestrator<'a, W: ?Sized, R: ?Sized> {
    wallet: &'a W,
    relay: &'a R,
}

impl<'a, W, R> TransferOrchestrator<'a, W, R>
where
    W: GasFreeWallet + ?Sized,
    R: RelayApi + ?Sized,
{
    pub fn new(wallet: &'a W, relay: &'a R) -> Self {
        Self { wallet, relay }
    }

    /// Run every step in order.
    pub async fn transfer(
        &self,
        request: &TransferRequest<'_>,
    ) -> Result<TransferOutcome, CliError> {
        let prepared = self.prepare(request).await?;
        self.execute(prepared).await
    }

    /// Validate the request, read balances and resolve the fee.
    pub async fn prepare(
        &self,
        request: &TransferRequest<'_>,
    ) -> Result<PreparedTransfer, CliError> {
        let intent = TransferIntent::parse(request)?;

        let from = self.wallet.sender().await?;
        let trx_balance = self.wallet.trx_balance().await?;
        let token_balance = self.wallet.token_balance(&intent.token).await?;
        info!(
            from = %from,
            to = %intent.recipient,
            token = %intent.token,
            amount = %intent.amount,
            token_balance = %token_balance,
            "GasFree transfer requested"
        );

        let quote = FeeResolver::new(self.relay)
            .resolve_fee(&self.wallet.owner(), &intent.token)
            .await?;

        let report = TransferReport {
            from,
            to: intent.recipient,
            token: intent.token,
            amount: intent.amount,
            trx_balance,
            token_balance,
            active: quote.active,
            allow_submit: quote.allow_submit,
            required_fee: quote.required_fee,
            max_fee: intent.max_fee,
            signed_max_fee: intent.max_fee.unwrap_or(quote.required_fee),
        };

        Ok(PreparedTransfer { intent, report })
    }

    /// Apply the fee and balance guards, then submit.
    pub async fn execute(&self, prepared: PreparedTransfer) -> Result<TransferOutcome, CliError> {
        let PreparedTransfer { intent, report } = prepared;
        let signed_max_fee = report.signed_max_fee;

        if let Some(max_fee) = report.max_fee {
            if max_fee < report.required_fee {
                return Err(CliError::FeeExceedsCap {
                    required: report.required_fee,
                    max_fee,
                });
            }
        }

        let total = report
            .amount
            .checked_add(signed_max_fee)
            .ok_or_else(|| CliError::InvalidAmount("amountBase + maxFee overflows".to_string()))?;
        if report.token_balance < total {
            return Err(CliError::InsufficientBalance {
                required: total,
                balance: report.token_balance,
            });
        }

        let result = self.wallet.submit(&intent, signed_max_fee).await?;
        info!(
            hash = %result.hash,
            fee_paid = %result.fee,
            signed_max_fee = %signed_max_fee,
            "GasFree transfer accepted"
        );

        Ok(TransferOutcome {
            report,
            hash: result.hash,
            fee_paid: result.fee,
        })
    }
}
