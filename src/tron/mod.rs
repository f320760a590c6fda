// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # TRON Chain Integration
//!
//! This module talks to a TRON full node over the TronGrid HTTP API and
//! signs locally with a key derived from the seed phrase.
//!
//! ## Components
//!
//! - **address**: base58check / hex address type
//! - **client**: TronGrid HTTP client and its error type
//! - **trc20**: TRC20 call encoding
//! - **signing**: key derivation, transaction and TIP-191 message signing
//! - **account**: [`TronAccount`], the node-backed wallet account
//! - **types**: network constants, fee quotes and transfer results

pub mod account;
pub mod address;
pub mod client;
pub mod signing;
pub mod trc20;
pub mod types;

pub use account::TronAccount;
pub use address::TronAddress;
pub use client::{TronClient, TronClientError};
pub use types::*;
