// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment (optionally seeded from a
//! `.env` file) exactly once per invocation and handed to constructors as
//! immutable values. Nothing deeper in the call graph reads the
//! environment.
//!
//! ## Environment Variables
//!
//! | Variable | Binary | Description | Default |
//! |----------|--------|-------------|---------|
//! | `SEED_PHRASE` | both | BIP39 mnemonic of the signing account | Required |
//! | `TRON_PROVIDER` | `tron-wallet` | TRON node HTTP endpoint | Required |
//! | `TRANSFER_MAX_FEE_SUN` | `tron-wallet` | Reject sends quoting at least this fee | Unset |
//! | `DEFAULT_TRC20_TOKEN` | `tron-wallet` | Token for `token-balance` | Shasta USDT |
//! | `GASFREE_NILE_API_KEY` | `gasfree-nile` | Relay API key | Required |
//! | `GASFREE_NILE_API_SECRET` | `gasfree-nile` | Relay HMAC secret | Required |
//! | `GASFREE_NILE_PROVIDER` | `gasfree-nile` | Relay base URL | `https://open-test.gasfree.io/nile` |
//! | `GASFREE_NILE_RPC` | `gasfree-nile` | TRON node HTTP endpoint | `https://nile.trongrid.io` |
//! | `GASFREE_NILE_CHAIN_ID` | `gasfree-nile` | TIP-712 chain id | `3448148188` |
//! | `GASFREE_NILE_VERIFYING_CONTRACT` | `gasfree-nile` | GasFree controller | Nile controller |
//! | `GASFREE_NILE_SERVICE_PROVIDER` | `gasfree-nile` | Pinned service provider | First provider from the relay |
//! | `GASFREE_DEADLINE_SECS` | `gasfree-nile` | Permit validity window | `180` |
//! | `TRONGRID_API_KEY` | both | `TRON-PRO-API-KEY` header | Unset |
//! | `HTTP_TIMEOUT_SECS` | both | Per-request HTTP timeout | `30` |
//! | `LOG_FORMAT` | both | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | both | Log level filter | `warn` |

use std::time::Duration;

use alloy::primitives::U256;
use zeroize::Zeroizing;

use crate::error::CliError;
use crate::tron::{TronAddress, GASFREE_NILE, TRON_NILE, TRON_SHASTA};
use crate::units::parse_base_units;

pub const SEED_PHRASE_ENV: &str = "SEED_PHRASE";
pub const TRON_PROVIDER_ENV: &str = "TRON_PROVIDER";
pub const TRANSFER_MAX_FEE_ENV: &str = "TRANSFER_MAX_FEE_SUN";
pub const DEFAULT_TRC20_TOKEN_ENV: &str = "DEFAULT_TRC20_TOKEN";
pub const GASFREE_API_KEY_ENV: &str = "GASFREE_NILE_API_KEY";
pub const GASFREE_API_SECRET_ENV: &str = "GASFREE_NILE_API_SECRET";
pub const GASFREE_PROVIDER_ENV: &str = "GASFREE_NILE_PROVIDER";
pub const GASFREE_RPC_ENV: &str = "GASFREE_NILE_RPC";
pub const GASFREE_CHAIN_ID_ENV: &str = "GASFREE_NILE_CHAIN_ID";
pub const GASFREE_VERIFYING_CONTRACT_ENV: &str = "GASFREE_NILE_VERIFYING_CONTRACT";
pub const GASFREE_SERVICE_PROVIDER_ENV: &str = "GASFREE_NILE_SERVICE_PROVIDER";
pub const GASFREE_DEADLINE_ENV: &str = "GASFREE_DEADLINE_SECS";
pub const TRONGRID_API_KEY_ENV: &str = "TRONGRID_API_KEY";
pub const HTTP_TIMEOUT_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEADLINE_SECS: u64 = 180;

/// Secret string, zeroized on drop and redacted from `Debug` output.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Settings for the TRON node HTTP client, shared by both binaries.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub rpc_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Configuration of the `tron-wallet` binary.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub seed_phrase: Secret,
    pub node: NodeConfig,
    /// Fee cap in sun; sends quoting a fee at or above it are rejected.
    pub transfer_max_fee: Option<U256>,
    pub default_token: TronAddress,
}

/// Configuration of the `gasfree-nile` binary.
#[derive(Debug, Clone)]
pub struct GasFreeConfig {
    pub seed_phrase: Secret,
    pub node: NodeConfig,
    pub relay_base_url: String,
    pub api_key: String,
    pub api_secret: Secret,
    pub chain_id: u64,
    pub verifying_contract: TronAddress,
    /// Set only when pinned through the environment; otherwise the relay is
    /// asked for its provider list.
    pub pinned_service_provider: Option<TronAddress>,
    pub default_service_provider: TronAddress,
    pub deadline: Duration,
    pub default_token: TronAddress,
    pub timeout: Duration,
}

impl WalletConfig {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource(lookup);
        let seed_phrase = Secret::new(env.required(SEED_PHRASE_ENV)?);
        let rpc_url = env.required(TRON_PROVIDER_ENV)?;
        let timeout = env.timeout()?;

        let transfer_max_fee = env
            .optional(TRANSFER_MAX_FEE_ENV)
            .map(|raw| parse_base_units(TRANSFER_MAX_FEE_ENV, &raw))
            .transpose()?;

        let default_token = env.address_or_default(
            DEFAULT_TRC20_TOKEN_ENV,
            TRON_SHASTA.usdt_contract,
        )?;

        Ok(Self {
            seed_phrase,
            node: NodeConfig {
                rpc_url: normalize_base_url(&rpc_url),
                api_key: env.optional(TRONGRID_API_KEY_ENV),
                timeout,
            },
            transfer_max_fee,
            default_token,
        })
    }
}

impl GasFreeConfig {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource(lookup);
        let api_key = env.required(GASFREE_API_KEY_ENV)?;
        let api_secret = Secret::new(env.required(GASFREE_API_SECRET_ENV)?);
        let seed_phrase = Secret::new(env.required(SEED_PHRASE_ENV)?);
        let timeout = env.timeout()?;

        let relay_base_url =
            normalize_base_url(&env.or_default(GASFREE_PROVIDER_ENV, GASFREE_NILE.relay_url));
        let rpc_url = normalize_base_url(&env.or_default(GASFREE_RPC_ENV, TRON_NILE.rpc_url));

        let chain_id = parse_chain_id(&env.or_default(
            GASFREE_CHAIN_ID_ENV,
            &GASFREE_NILE.chain_id.to_string(),
        ))?;

        let verifying_contract = env.address_or_default(
            GASFREE_VERIFYING_CONTRACT_ENV,
            GASFREE_NILE.verifying_contract,
        )?;

        let pinned_service_provider = env
            .optional(GASFREE_SERVICE_PROVIDER_ENV)
            .map(|raw| parse_config_address(GASFREE_SERVICE_PROVIDER_ENV, &raw))
            .transpose()?;
        let default_service_provider =
            parse_config_address("service provider", GASFREE_NILE.service_provider)?;

        let deadline_secs = match env.optional(GASFREE_DEADLINE_ENV) {
            Some(raw) => parse_positive_u64(GASFREE_DEADLINE_ENV, &raw)?,
            None => DEFAULT_DEADLINE_SECS,
        };

        let default_token = parse_config_address("default token", TRON_NILE.usdt_contract)?;

        Ok(Self {
            seed_phrase,
            node: NodeConfig {
                rpc_url,
                api_key: env.optional(TRONGRID_API_KEY_ENV),
                timeout,
            },
            relay_base_url,
            api_key,
            api_secret,
            chain_id,
            verifying_contract,
            pinned_service_provider,
            default_service_provider,
            deadline: Duration::from_secs(deadline_secs),
            default_token,
            timeout,
        })
    }
}

/// Wrapper applying the trim/empty rules to any variable lookup.
struct EnvSource<F>(F);

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, CliError> {
        self.optional(name)
            .ok_or_else(|| CliError::MissingConfiguration(name.to_string()))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn address_or_default(&self, name: &str, default: &str) -> Result<TronAddress, CliError> {
        parse_config_address(name, &self.or_default(name, default))
    }

    fn timeout(&self) -> Result<Duration, CliError> {
        let secs = match self.optional(HTTP_TIMEOUT_ENV) {
            Some(raw) => parse_positive_u64(HTTP_TIMEOUT_ENV, &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        Ok(Duration::from_secs(secs))
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Read a variable from the process environment, falling back to `default`
/// when unset or blank.
pub fn env_or_default(name: &str, default: &str) -> String {
    EnvSource(process_env).or_default(name, default)
}

/// Load a `.env` file from the working directory if one exists.
pub fn load_dotenv() {
    if let Err(e) = dotenv::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_config_address(name: &str, raw: &str) -> Result<TronAddress, CliError> {
    raw.parse::<TronAddress>()
        .map_err(|e| CliError::InvalidConfiguration(format!("{name}: {e}")))
}

fn parse_chain_id(raw: &str) -> Result<u64, CliError> {
    parse_positive_u64(GASFREE_CHAIN_ID_ENV, raw)
        .map_err(|_| CliError::InvalidConfiguration("Invalid chainId".to_string()))
}

fn parse_positive_u64(name: &str, raw: &str) -> Result<u64, CliError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(CliError::InvalidConfiguration(format!(
            "{name} must be a positive integer"
        ))),
    }
}
