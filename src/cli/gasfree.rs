// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `gasfree-nile`: token transfers through the GasFree relay on Nile.

use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};

use super::{report_failure, usage};
use crate::config::GasFreeConfig;
use crate::error::CliError;
use crate::gasfree::transfer::parse_token;
use crate::gasfree::{
    fees::find_token, FeeResolver, GasFreeAccount, GasFreeWallet, RelayApi, RelayClient,
    TokenConfig, TransferOrchestrator, TransferReport, TransferRequest,
};
use crate::tron::TronAddress;
use crate::units::parse_base_units;

/// Running without a command is a usage error.
const NO_COMMAND_EXIT: ExitCode = ExitCode::FAILURE;

const TRANSFER_USAGE: &str = "transfer <recipient> <amountBase> [tokenContract] [maxFee]";

const AFTER_HELP: &str = "\
Args:
  recipient      TRON address (T...)
  amountBase     token amount in base units (1 USDT with 6 decimals => 1000000)
  tokenContract  TRC20 contract (defaults to Nile USDT)
  maxFee         max fee in token base units; when given, it is the signed maxFee

Env required:
  SEED_PHRASE, GASFREE_NILE_API_KEY, GASFREE_NILE_API_SECRET

Optional env overrides:
  GASFREE_NILE_PROVIDER, GASFREE_NILE_RPC, GASFREE_NILE_CHAIN_ID,
  GASFREE_NILE_VERIFYING_CONTRACT, GASFREE_NILE_SERVICE_PROVIDER,
  GASFREE_DEADLINE_SECS";

#[derive(Debug, Parser)]
#[command(
    name = "gasfree-nile",
    version,
    about = "GasFree relay transfers on the TRON Nile testnet",
    after_help = AFTER_HELP
)]
pub struct GasFreeCli {
    #[command(subcommand)]
    pub command: Option<GasFreeCommand>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum GasFreeCommand {
    /// Transfer tokens, paying the fee in the transferred token
    Transfer {
        recipient: String,
        amount: String,
        token: Option<String>,
        max_fee: Option<String>,
    },
    /// Show the owner and GasFree account state
    Status,
    /// List supported tokens and their fees
    Tokens { token: Option<String> },
    /// List service providers
    Providers,
    /// Show TRX and token balances
    Balance { token: Option<String> },
    /// Compute the fee a transfer would require
    Fee {
        recipient: String,
        amount: String,
        token: Option<String>,
    },
    /// Activate the GasFree account with a 1 base-unit transfer
    Activate {
        recipient: String,
        token: Option<String>,
        max_fee: Option<String>,
    },
    /// Show the relay status of a submitted transfer
    Trace { id: String },
}

/// Error for a TRON address given where a command was expected.
pub fn bare_address_hint<S: AsRef<str>>(first_arg: Option<S>) -> Option<CliError> {
    let arg = first_arg?;
    let arg = arg.as_ref();
    if arg.starts_with('T') && arg.len() == 34 {
        Some(CliError::Usage(format!(
            "Missing command: use '{TRANSFER_USAGE}'"
        )))
    } else {
        None
    }
}

/// Parse arguments, load configuration and run one command.
pub async fn main_entry() -> ExitCode {
    if let Some(hint) = bare_address_hint(std::env::args().nth(1)) {
        return report_failure(&hint);
    }

    let cli = GasFreeCli::parse();
    let Some(command) = cli.command else {
        return usage(GasFreeCli::command(), NO_COMMAND_EXIT);
    };

    let result = async {
        let config = GasFreeConfig::from_env()?;
        run(command, &config).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

/// Run `command`; the owner account is dropped before returning.
pub async fn run(command: GasFreeCommand, config: &GasFreeConfig) -> Result<(), CliError> {
    let relay = RelayClient::from_config(config)?;
    let account = GasFreeAccount::new(config, relay)?;
    let default_token = config.default_token.to_base58();

    match command {
        GasFreeCommand::Transfer {
            recipient,
            amount,
            token,
            max_fee,
        } => {
            let request = TransferRequest {
                recipient: &recipient,
                amount: &amount,
                token: token.as_deref().unwrap_or(default_token.as_str()),
                max_fee: max_fee.as_deref(),
            };
            transfer(&account, &request).await
        }

        GasFreeCommand::Activate {
            recipient,
            token,
            max_fee,
        } => {
            let request = TransferRequest {
                recipient: &recipient,
                amount: "1",
                token: token.as_deref().unwrap_or(default_token.as_str()),
                max_fee: max_fee.as_deref(),
            };
            transfer(&account, &request).await
        }

        GasFreeCommand::Status => status(&account, config).await,

        GasFreeCommand::Tokens { token } => {
            let filter = token.as_deref().map(parse_token).transpose()?;
            let tokens = account.relay().tokens().await?;
            print_tokens(&tokens, filter.as_ref());
            Ok(())
        }

        GasFreeCommand::Providers => {
            let providers = account.relay().providers().await?;
            if providers.is_empty() {
                println!("No providers returned.");
            }
            for provider in providers {
                println!(
                    "{}  {}",
                    provider.address,
                    provider.name.unwrap_or_default()
                );
            }
            Ok(())
        }

        GasFreeCommand::Balance { token } => {
            let token = parse_token(token.as_deref().unwrap_or(default_token.as_str()))?;

            let from = account.sender().await?;
            let trx_balance = account.trx_balance().await?;
            let token_balance = account.token_balance(&token).await?;

            println!("From: {from}");
            println!("TRX balance (sun): {trx_balance}");
            println!("Token: {token}");
            println!("Token balance (base units): {token_balance}");
            Ok(())
        }

        GasFreeCommand::Fee {
            recipient,
            amount,
            token,
        } => {
            let recipient: TronAddress = recipient.parse().map_err(|_| {
                CliError::InvalidAddress("Invalid recipient TRON address".to_string())
            })?;
            let token = parse_token(token.as_deref().unwrap_or(default_token.as_str()))?;
            let amount = parse_base_units("amountBase", &amount)?;

            let quote = FeeResolver::new(account.relay())
                .resolve_fee(&account.owner(), &token)
                .await?;

            println!("To: {recipient}");
            println!("Token: {token}");
            println!("Amount (base units): {amount}");
            println!("GasFree active: {}", quote.active);
            println!("transferFee: {}", quote.transfer_fee);
            println!("activateFee: {}", quote.activate_fee);
            println!("Required fee (raw units): {}", quote.required_fee);
            println!(
                "Total required (amount + fee): {}",
                amount.saturating_add(quote.required_fee)
            );
            Ok(())
        }

        GasFreeCommand::Trace { id } => {
            let trace = account.relay().trace(id.trim()).await?;
            println!("Trace id: {}", trace.id);
            println!("State: {}", trace.state.as_deref().unwrap_or("unknown"));
            if let Some(token) = &trace.token_address {
                println!("Token: {token}");
            }
            if let Some(target) = &trace.target_address {
                println!("To: {target}");
            }
            println!("Amount (base units): {}", trace.amount);
            if let Some(fee) = trace.estimated_fee() {
                println!("Estimated fee (raw units): {fee}");
            }
            if let Some(hash) = &trace.txn_hash {
                println!("Tx hash: {hash}");
            }
            if let Some(state) = &trace.txn_state {
                println!("Tx state: {state}");
            }
            Ok(())
        }
    }
}

/// Print what the transfer will do before the fee and balance guards run,
/// so a cancelled transfer still shows the fee it would have needed.
async fn transfer(account: &GasFreeAccount, request: &TransferRequest<'_>) -> Result<(), CliError> {
    let orchestrator = TransferOrchestrator::new(account, account.relay());
    let prepared = orchestrator.prepare(request).await?;
    for line in report_lines(&prepared.report) {
        println!("{line}");
    }

    let outcome = orchestrator.execute(prepared).await?;
    println!("Transfer hash: {}", outcome.hash);
    println!("Fee paid (raw units): {}", outcome.fee_paid);
    Ok(())
}

async fn status(account: &GasFreeAccount, config: &GasFreeConfig) -> Result<(), CliError> {
    let info = account.account_info().await?;
    let service_provider = account.service_provider().await?;

    println!("Owner address: {}", account.owner());
    match info.gas_free_address {
        Some(sender) => println!("From (GasFree sender): {sender}"),
        None => println!("From (GasFree sender): unknown"),
    }
    println!("GasFree active: {}", info.active);
    if let Some(allow_submit) = info.submit_allowed() {
        println!("GasFree allow_submit: {allow_submit}");
    }
    println!("GasFree provider: {}", account.relay().base_url());
    println!("TRON RPC: {}", config.node.rpc_url);
    println!("Service provider: {service_provider}");
    println!("Verifying contract: {}", config.verifying_contract);
    Ok(())
}

fn report_lines(report: &TransferReport) -> Vec<String> {
    let mut lines = vec![
        format!("From: {}", report.from),
        format!("To: {}", report.to),
        format!("Token: {}", report.token),
        format!("Amount (base units): {}", report.amount),
        format!("TRX balance (sun): {}", report.trx_balance),
        format!("Token balance (base units): {}", report.token_balance),
        format!("GasFree active: {}", report.active),
    ];
    if let Some(allow_submit) = report.allow_submit {
        lines.push(format!("GasFree allow_submit: {allow_submit}"));
    }
    lines.push(format!("Estimated fee (raw units): {}", report.required_fee));
    if let Some(max_fee) = report.max_fee {
        lines.push(format!("Max fee (raw units): {max_fee}"));
    }
    lines
}

fn print_tokens(tokens: &[TokenConfig], filter: Option<&TronAddress>) {
    if tokens.is_empty() {
        println!("No tokens returned.");
        return;
    }

    if let Some(filter) = filter {
        match find_token(tokens, &filter.to_base58()) {
            Some(token) => println!("{}", token_row(token)),
            None => println!("Token not found in supported list: {filter}"),
        }
        return;
    }

    println!("tokenAddress  symbol  name  transferFee  activateFee");
    for token in tokens {
        println!("{}", token_row(token));
    }
}

fn token_row(token: &TokenConfig) -> String {
    format!(
        "{}  {}  {}  transferFee={}  activateFee={}",
        token.contract(),
        token.symbol.as_deref().unwrap_or(""),
        token.name.as_deref().unwrap_or(""),
        token.transfer_fee,
        token.activate_fee
    )
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;

    const RECIPIENT: &str = "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL";

    #[test]
    fn bare_address_gets_a_transfer_hint() {
        let err = bare_address_hint(Some(RECIPIENT)).unwrap();
        assert_eq!(
            err.report_line(),
            "Error: Missing command: use 'transfer <recipient> <amountBase> [tokenContract] [maxFee]'"
        );

        assert!(bare_address_hint(Some("transfer")).is_none());
        assert!(bare_address_hint(None::<&str>).is_none());
    }

    #[test]
    fn transfer_arguments_are_positional() {
        let cli = GasFreeCli::try_parse_from([
            "gasfree-nile",
            "transfer",
            RECIPIENT,
            "5000000",
            "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf",
            "30000",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(GasFreeCommand::Transfer {
                recipient: RECIPIENT.to_string(),
                amount: "5000000".to_string(),
                token: Some("TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf".to_string()),
                max_fee: Some("30000".to_string()),
            })
        );

        let cli = GasFreeCli::try_parse_from(["gasfree-nile", "activate", RECIPIENT]).unwrap();
        assert_eq!(
            cli.command,
            Some(GasFreeCommand::Activate {
                recipient: RECIPIENT.to_string(),
                token: None,
                max_fee: None,
            })
        );

        assert!(GasFreeCli::try_parse_from(["gasfree-nile", "fee", RECIPIENT]).is_err());
    }

    #[test]
    fn token_rows_show_fees() {
        let token = TokenConfig {
            token_address: Some("TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf".to_string()),
            symbol: Some("USDT".to_string()),
            decimal: Some(6),
            transfer_fee: U256::from(5_000u64),
            activate_fee: U256::from(20_000u64),
            ..TokenConfig::default()
        };
        assert_eq!(
            token_row(&token),
            "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf  USDT    transferFee=5000  activateFee=20000"
        );
    }

    #[test]
    fn report_shows_estimated_and_max_fee() {
        let address: TronAddress = RECIPIENT.parse().unwrap();
        let report = TransferReport {
            from: address,
            to: address,
            token: "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf".parse().unwrap(),
            amount: U256::from(1_000_000u64),
            trx_balance: U256::ZERO,
            token_balance: U256::from(10_000_000u64),
            active: true,
            allow_submit: None,
            required_fee: U256::from(5_000u64),
            max_fee: Some(U256::from(3_000u64)),
            signed_max_fee: U256::from(3_000u64),
        };

        let lines = report_lines(&report);
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], format!("From: {RECIPIENT}"));
        assert_eq!(lines[7], "Estimated fee (raw units): 5000");
        assert_eq!(lines[8], "Max fee (raw units): 3000");
        assert!(!lines.iter().any(|l| l.contains("allow_submit")));
    }

    #[test]
    fn no_command_is_a_usage_failure() {
        let cli = GasFreeCli::try_parse_from(["gasfree-nile"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(usage(GasFreeCli::command(), NO_COMMAND_EXIT), ExitCode::FAILURE);
    }
}
