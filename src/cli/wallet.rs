// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `tron-wallet`: TRX and TRC20 operations for the seed's first account.

use std::process::ExitCode;
use std::str::FromStr;

use alloy::primitives::U256;
use clap::{CommandFactory, Parser, Subcommand};

use super::{report_failure, usage};
use crate::config::WalletConfig;
use crate::error::CliError;
use crate::tron::{TronAccount, TronAddress};
use crate::units::{parse_base_units, sun_to_trx, trx_to_sun};
use crate::wallet::WalletAccount;

/// Running without a command only prints usage.
const NO_COMMAND_EXIT: ExitCode = ExitCode::SUCCESS;

const AFTER_HELP: &str = "\
Notes:
  - Shasta provider: https://api.shasta.trongrid.io
  - TRX smallest unit is sun: 1 TRX = 1,000,000 sun
  - TRC20 amounts are base units (6 decimals: 1.0 token = 1000000)
  - token-balance defaults to DEFAULT_TRC20_TOKEN, else Shasta USDT
  - Optional fee cap: TRANSFER_MAX_FEE_SUN";

#[derive(Debug, Parser)]
#[command(
    name = "tron-wallet",
    version,
    about = "TRON wallet: balances, fee quotes, transfers and message signing",
    after_help = AFTER_HELP
)]
pub struct WalletCli {
    #[command(subcommand)]
    pub command: Option<WalletCommand>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum WalletCommand {
    /// Print the account address
    Address,
    /// Print the TRX balance
    Balance,
    /// Estimate the fee of a TRX transfer
    QuoteTrx {
        /// Recipient TRON address
        to: String,
        /// Amount in TRX (up to 6 decimals)
        trx: String,
    },
    /// Send TRX
    SendTrx { to: String, trx: String },
    /// Print a TRC20 balance
    TokenBalance {
        /// TRC20 contract address
        token: Option<String>,
    },
    /// Estimate the fee of a TRC20 transfer
    QuoteToken {
        token: String,
        to: String,
        /// Amount in token base units
        amount: String,
    },
    /// Send TRC20 tokens
    SendToken {
        token: String,
        to: String,
        amount: String,
    },
    /// Sign a message (remaining words are joined by spaces)
    Sign {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Verify a message signature against this account
    Verify { message: String, signature: String },
}

/// Parse arguments, load configuration and run one command.
pub async fn main_entry() -> ExitCode {
    let cli = WalletCli::parse();
    let Some(command) = cli.command else {
        return usage(WalletCli::command(), NO_COMMAND_EXIT);
    };

    let result = async {
        let config = WalletConfig::from_env()?;
        run(command, &config).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

/// Run `command` against the configured account.
///
/// The account, and with it the signing key, is dropped before returning.
pub async fn run(command: WalletCommand, config: &WalletConfig) -> Result<(), CliError> {
    let account = TronAccount::from_seed(
        &config.seed_phrase,
        0,
        &config.node,
        config.transfer_max_fee,
    )?;
    execute(&account, command, config).await
}

pub async fn execute<A>(
    account: &A,
    command: WalletCommand,
    config: &WalletConfig,
) -> Result<(), CliError>
where
    A: WalletAccount + ?Sized,
{
    match command {
        WalletCommand::Address => {
            println!("{}", account.address());
        }

        WalletCommand::Balance => {
            let sun = account.balance().await?;
            println!("TRX balance: {} TRX", sun_to_trx(sun));
            println!("TRX balance (sun): {sun}");
        }

        WalletCommand::QuoteTrx { to, trx } => {
            let to = parse_recipient(&to)?;
            let value = trx_to_sun(&trx)?;

            let quote = account.quote_send_transaction(&to, value).await?;
            println!("To: {to}");
            println!("Amount: {trx} TRX (sun: {value})");
            print_fee("Estimated fee", quote.fee);
        }

        WalletCommand::SendTrx { to, trx } => {
            let to = parse_recipient(&to)?;
            let value = trx_to_sun(&trx)?;

            let quote = account.quote_send_transaction(&to, value).await?;
            println!("Estimated fee (TRX): {} TRX", sun_to_trx(quote.fee));

            let result = account.send_transaction(&to, value).await?;
            println!("Tx hash: {}", result.hash);
            println!("Amount: {trx} TRX (sun: {value})");
            print_fee("Fee paid", result.fee);
        }

        WalletCommand::TokenBalance { token } => {
            let token = match token {
                Some(raw) => parse_contract(&raw)?,
                None => config.default_token,
            };

            let balance = account.token_balance(&token).await?;
            println!("Token: {token}");
            println!("Balance (base units): {balance}");
        }

        WalletCommand::QuoteToken { token, to, amount } => {
            let token = parse_contract(&token)?;
            let to = parse_recipient(&to)?;
            let amount = parse_base_units("tokenAmountBase", &amount)?;

            let quote = account.quote_transfer(&token, &to, amount).await?;
            println!("Token: {token}");
            println!("To: {to}");
            println!("Amount (base units): {amount}");
            print_fee("Estimated fee", quote.fee);
            print_cap(config.transfer_max_fee);
        }

        WalletCommand::SendToken { token, to, amount } => {
            let token = parse_contract(&token)?;
            let to = parse_recipient(&to)?;
            let amount = parse_base_units("tokenAmountBase", &amount)?;

            let quote = account.quote_transfer(&token, &to, amount).await?;
            println!("Estimated fee (TRX): {} TRX", sun_to_trx(quote.fee));
            print_cap(config.transfer_max_fee);

            let result = account.transfer(&token, &to, amount).await?;
            println!("Transfer hash: {}", result.hash);
            println!("Token: {token}");
            println!("To: {to}");
            println!("Amount (base units): {amount}");
            print_fee("Fee paid", result.fee);
        }

        WalletCommand::Sign { message } => {
            let message = message.join(" ");
            if message.is_empty() {
                return Err(CliError::Usage("sign requires a message".to_string()));
            }
            println!("{}", account.sign(&message)?);
        }

        WalletCommand::Verify { message, signature } => {
            let valid = account.verify(&message, &signature)?;
            println!("Valid: {valid}");
        }
    }

    Ok(())
}

fn parse_recipient(raw: &str) -> Result<TronAddress, CliError> {
    TronAddress::from_str(raw)
        .map_err(|_| CliError::InvalidAddress("Invalid recipient TRON address".to_string()))
}

fn parse_contract(raw: &str) -> Result<TronAddress, CliError> {
    TronAddress::from_str(raw)
        .map_err(|_| CliError::InvalidAddress("Invalid TRC20 contract address".to_string()))
}

fn print_fee(label: &str, sun: U256) {
    println!("{label} (sun): {sun}");
    println!("{label} (TRX): {} TRX", sun_to_trx(sun));
}

fn print_cap(cap: Option<U256>) {
    if let Some(cap) = cap {
        println!("Max fee cap (sun): {cap}");
        println!("Max fee cap (TRX): {} TRX", sun_to_trx(cap));
    }
}
