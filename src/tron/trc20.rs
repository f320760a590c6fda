// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TRC20 token call encoding.
//!
//! TRC20 shares the ERC-20 ABI. The TRON node takes the function signature
//! and the ABI-encoded arguments separately, so the 4-byte selector is
//! stripped from the encoded call.

use alloy::{
    primitives::U256,
    sol,
    sol_types::SolCall,
};

use super::address::TronAddress;
use super::client::TronClientError;

sol! {
    interface ITRC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

pub const TRANSFER_SELECTOR: &str = "transfer(address,uint256)";
pub const BALANCE_OF_SELECTOR: &str = "balanceOf(address)";

/// Hex-encoded arguments of `transfer(to, amount)`.
pub fn transfer_parameter(to: &TronAddress, amount: U256) -> String {
    let call = ITRC20::transferCall {
        to: to.to_evm(),
        amount,
    };
    encode_arguments(&call.abi_encode())
}

/// Hex-encoded arguments of `balanceOf(account)`.
pub fn balance_of_parameter(account: &TronAddress) -> String {
    let call = ITRC20::balanceOfCall {
        account: account.to_evm(),
    };
    encode_arguments(&call.abi_encode())
}

/// Decode a single `uint256` from a constant call result.
pub fn decode_uint256(result_hex: &str) -> Result<U256, TronClientError> {
    let bytes = alloy::hex::decode(result_hex.trim_start_matches("0x"))
        .map_err(|e| TronClientError::InvalidResponse(format!("constant_result is not hex: {e}")))?;

    if bytes.len() < 32 {
        return Err(TronClientError::InvalidResponse(format!(
            "constant_result too short: {} bytes",
            bytes.len()
        )));
    }

    Ok(U256::from_be_slice(&bytes[..32]))
}

fn encode_arguments(encoded_call: &[u8]) -> String {
    alloy::hex::encode(&encoded_call[4..])
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn transfer_parameter_layout() {
        let to = TronAddress::from_str("TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL").unwrap();
        let encoded = transfer_parameter(&to, U256::from(1_000_000u64));

        assert_eq!(encoded.len(), 128);
        assert_eq!(
            &encoded[..64],
            "0000000000000000000000008840e6c55b9ada326d211d818c34a994aeced808"
        );
        assert_eq!(
            &encoded[64..],
            "00000000000000000000000000000000000000000000000000000000000f4240"
        );
    }

    #[test]
    fn balance_of_parameter_is_one_word() {
        let account = TronAddress::from_str("TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL").unwrap();
        let encoded = balance_of_parameter(&account);
        assert_eq!(encoded.len(), 64);
        assert!(encoded.ends_with("8840e6c55b9ada326d211d818c34a994aeced808"));
    }

    #[test]
    fn decode_uint256_reads_first_word() {
        let word = "0000000000000000000000000000000000000000000000000000000000989680";
        assert_eq!(decode_uint256(word).unwrap(), U256::from(10_000_000u64));
        assert!(decode_uint256("1234").is_err());
        assert!(decode_uint256("zz").is_err());
    }
}
