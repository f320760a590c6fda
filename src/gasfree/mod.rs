// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # GasFree Relay Integration
//!
//! GasFree lets an account move TRC20 tokens without holding TRX: the
//! owner signs a permit, a service provider executes it on chain and takes
//! its fee out of the transferred token.
//!
//! ## Components
//!
//! - **signer**: HMAC request authentication
//! - **client**: [`RelayClient`], envelope decoding and [`RelayError`]
//! - **types**: relay payloads
//! - **fees**: [`FeeResolver`], required fee per account and token
//! - **permit**: TIP-712 `PermitTransfer` signing
//! - **account**: [`GasFreeAccount`], the seed-derived owner
//! - **transfer**: [`TransferOrchestrator`], the fee-guarded pipeline

pub mod account;
pub mod client;
pub mod fees;
pub mod permit;
pub mod signer;
pub mod transfer;
pub mod types;

pub use account::GasFreeAccount;
pub use client::{RelayApi, RelayClient, RelayError};
pub use fees::{FeeQuote, FeeResolver};
pub use transfer::{
    GasFreeWallet, PreparedTransfer, TransferIntent, TransferOrchestrator, TransferOutcome,
    TransferReport, TransferRequest,
};
pub use types::{AccountInfo, ProviderInfo, TokenConfig, TransferTrace};
