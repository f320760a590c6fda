// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Amount conversion between human decimals and integer base units.
//!
//! Amounts never pass through floating point. TRX has 6 decimals
//! (1 TRX = 1,000,000 sun); TRC20 amounts on the command line are already
//! in base units and only go through [`parse_base_units`].

use alloy::primitives::U256;

use crate::error::CliError;

/// Decimals of the native TRX asset.
pub const TRX_DECIMALS: u8 = 6;

/// Parse a non-negative integer amount given in base units.
///
/// Only ASCII digits are accepted (surrounding whitespace is trimmed), so
/// signs, exponents and decimal points are rejected.
pub fn parse_base_units(label: &str, raw: &str) -> Result<U256, CliError> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CliError::InvalidAmount(format!(
            "{label} must be a non-negative integer (base units)"
        )));
    }

    U256::from_str_radix(digits, 10)
        .map_err(|_| CliError::InvalidAmount(format!("{label} is too large")))
}

/// Parse a human-readable amount (e.g. `"1.5"`) into base units.
///
/// At most `decimals` fractional digits are allowed; shorter fractions are
/// right-padded with zeros.
pub fn decimal_to_base_units(amount: &str, decimals: u8) -> Result<U256, CliError> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || (amount.contains('.') && !is_digits(frac)) {
        return Err(CliError::InvalidAmount(format!("Invalid amount: {amount}")));
    }

    if frac.len() > decimals as usize {
        return Err(CliError::InvalidAmount(format!(
            "Too many decimal places (max {decimals})"
        )));
    }

    let padded = format!("{frac:0<width$}", width = decimals as usize);
    let overflow = || CliError::InvalidAmount(format!("Amount overflow: {amount}"));

    let whole = U256::from_str_radix(whole, 10).map_err(|_| overflow())?;
    let frac = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
    };

    let multiplier = U256::from(10u64).pow(U256::from(decimals));
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(overflow)
}

/// Format base units as a human-readable decimal string.
///
/// Trailing fractional zeros are dropped, and a whole amount is printed
/// without a decimal point.
pub fn base_units_to_decimal(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let decimal_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    let trimmed = decimal_str.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}

/// Parse a TRX amount into sun.
pub fn trx_to_sun(trx: &str) -> Result<U256, CliError> {
    decimal_to_base_units(trx, TRX_DECIMALS)
}

/// Format sun as TRX.
pub fn sun_to_trx(sun: U256) -> String {
    base_units_to_decimal(sun, TRX_DECIMALS)
}
