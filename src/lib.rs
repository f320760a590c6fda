// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TRON Wallet CLI - seed-phrase wallet and GasFree relay demo
//!
//! This crate backs two binaries: `tron-wallet` (TRX and TRC20 balances,
//! quotes, transfers and message signing) and `gasfree-nile` (token
//! transfers submitted through the GasFree relay, paid for in the
//! transferred token).
//!
//! ## Modules
//!
//! - `cli` - clap command definitions and command runners
//! - `config` - environment configuration, loaded once per invocation
//! - `gasfree` - GasFree relay client, fee resolution and transfers
//! - `tron` - TRON node client, addresses, signing and the wallet account
//! - `units` - base-unit / decimal amount conversion
//! - `wallet` - wallet collaborator trait

pub mod cli;
pub mod config;
pub mod error;
pub mod gasfree;
pub mod logging;
pub mod tron;
pub mod units;
pub mod wallet;
