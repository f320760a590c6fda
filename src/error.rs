// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Top-level error type reported by both binaries.

use alloy::primitives::U256;

use crate::gasfree::RelayError;
use crate::tron::TronClientError;

/// Every failure a command can end with.
///
/// Validation variants are raised before any state-changing network call.
/// Relay and chain failures are wrapped verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    InvalidAddress(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("Token not supported by GasFree provider: {0}")]
    UnsupportedToken(String),

    #[error("The transfer operation exceeds the transfer max fee (required {required}, max {max_fee})")]
    FeeExceedsCap { required: U256, max_fee: U256 },

    #[error("Insufficient token balance. Required (amount + fee): {required}, available: {balance}")]
    InsufficientBalance { required: U256, balance: U256 },

    #[error("Missing env var: {0}")]
    MissingConfiguration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Chain(#[from] TronClientError),
}

impl CliError {
    /// Single line printed on stderr before exiting with status 1.
    pub fn report_line(&self) -> String {
        match self {
            CliError::FeeExceedsCap { .. } => {
                "Cancelled: fee exceeds maxFee. Try increasing maxFee.".to_string()
            }
            other => format!("Error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_cap_is_reported_as_cancellation() {
        let err = CliError::FeeExceedsCap {
            required: U256::from(5_000u64),
            max_fee: U256::from(3_000u64),
        };
        assert_eq!(
            err.report_line(),
            "Cancelled: fee exceeds maxFee. Try increasing maxFee."
        );
        assert!(err.to_string().contains("required 5000, max 3000"));
    }

    #[test]
    fn other_errors_are_prefixed() {
        let err = CliError::MissingConfiguration("SEED_PHRASE".to_string());
        assert_eq!(err.report_line(), "Error: Missing env var: SEED_PHRASE");

        let err = CliError::InsufficientBalance {
            required: U256::from(1_025_000u64),
            balance: U256::from(10u64),
        };
        assert!(err.report_line().contains("Required (amount + fee): 1025000"));
    }

    #[test]
    fn relay_errors_are_transparent() {
        let err: CliError = RelayError::Api {
            reason: "ProviderAddressNotMatchException".to_string(),
            message: "bad provider".to_string(),
        }
        .into();
        assert_eq!(
            err.report_line(),
            "Error: GasFree API error (ProviderAddressNotMatchException): bad provider"
        );
    }
}
