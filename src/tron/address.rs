// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TRON address handling (base58check, hex, validation, serde).
//!
//! A TRON address is the 20-byte EVM-style account id prefixed with
//! `0x41`. Users see it as a 34-character base58check string starting
//! with `T`.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address as EvmAddress;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ADDRESS_HEX_PREFIX: u8 = 0x41;
pub const ADDRESS_BASE58_PREFIX: char = 'T';
pub const ADDRESS_HEX_LEN: usize = 42;
pub const ADDRESS_BYTES_LEN: usize = 21;
pub const ADDRESS_BASE58_LEN: usize = 34;

/// TRON account or contract address (0x41 prefix + 20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TronAddress {
    inner: [u8; ADDRESS_BYTES_LEN],
}

impl TronAddress {
    /// Wrap a 20-byte account id.
    pub fn from_evm(address: EvmAddress) -> Self {
        let mut inner = [0u8; ADDRESS_BYTES_LEN];
        inner[0] = ADDRESS_HEX_PREFIX;
        inner[1..].copy_from_slice(address.as_slice());
        Self { inner }
    }

    /// The 20-byte account id, as used inside ABI-encoded calls and typed data.
    pub fn to_evm(&self) -> EvmAddress {
        EvmAddress::from_slice(&self.inner[1..])
    }

    pub fn from_base58(s: &str) -> Result<Self, String> {
        let data = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|e| format!("Invalid base58check address: {e}"))?;
        Self::from_slice(&data)
    }

    /// Parse hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let data = alloy::hex::decode(s).map_err(|e| format!("Invalid hex address: {e}"))?;
        Self::from_slice(&data)
    }

    fn from_slice(data: &[u8]) -> Result<Self, String> {
        let inner: [u8; ADDRESS_BYTES_LEN] = data
            .try_into()
            .map_err(|_| format!("Invalid address: expected {ADDRESS_BYTES_LEN} bytes"))?;

        if inner[0] != ADDRESS_HEX_PREFIX {
            return Err(format!(
                "Invalid address: expected prefix 0x{ADDRESS_HEX_PREFIX:x}"
            ));
        }

        Ok(Self { inner })
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.inner).with_check().into_string()
    }

    /// Lowercase hex including the `41` prefix.
    pub fn to_hex(&self) -> String {
        alloy::hex::encode(self.inner)
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl fmt::Debug for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TronAddress({} / 0x{})", self.to_base58(), self.to_hex())
    }
}

impl Serialize for TronAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D>(deserializer: D) -> Result<TronAddress, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TronAddress::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for TronAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.len() == ADDRESS_BASE58_LEN && s.starts_with(ADDRESS_BASE58_PREFIX) {
            return Self::from_base58(s);
        }

        let hex_prefix = format!("{ADDRESS_HEX_PREFIX:x}");
        if (s.len() == ADDRESS_HEX_LEN && s.starts_with(&hex_prefix))
            || (s.len() == ADDRESS_HEX_LEN + 2 && s.starts_with(&format!("0x{hex_prefix}")))
        {
            return Self::from_hex(s);
        }

        Err(format!(
            "Invalid TRON address '{s}': must be Base58 (34 chars starting with 'T') or hex (42 chars starting with '41')"
        ))
    }
}
