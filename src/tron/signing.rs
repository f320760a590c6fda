// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key derivation and signing for TRON accounts.
//!
//! TRON accounts are secp256k1 keys derived along BIP44 coin type 195.
//! Transactions are signed over the node-computed transaction id, and
//! free-form messages follow TIP-191.

use alloy::{
    primitives::{keccak256, Signature, B256},
    signers::{
        local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner},
        SignerSync,
    },
};
use sha2::{Digest, Sha256};

use super::address::TronAddress;
use super::client::TronClientError;

/// Prefix hashed in front of TIP-191 personal messages.
const TRON_MESSAGE_PREFIX: &str = "\x19TRON Signed Message:\n";

/// BIP44 derivation path for the account at `index`.
pub fn derivation_path(index: u32) -> String {
    format!("m/44'/195'/0'/0/{index}")
}

/// Derive the signing key for `index` from a BIP39 seed phrase.
pub fn signer_from_mnemonic(
    phrase: &str,
    index: u32,
) -> Result<PrivateKeySigner, TronClientError> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase.trim())
        .derivation_path(derivation_path(index))
        .and_then(|builder| builder.build())
        .map_err(|e| TronClientError::InvalidPrivateKey(e.to_string()))
}

/// TRON address controlled by `signer`.
pub fn signer_address(signer: &PrivateKeySigner) -> TronAddress {
    TronAddress::from_evm(signer.address())
}

/// Check that the node-provided transaction id is `sha256(raw_data)`.
pub fn verify_transaction_id(raw_data_hex: &str, tx_id: &str) -> Result<B256, TronClientError> {
    let raw = alloy::hex::decode(raw_data_hex)
        .map_err(|e| TronClientError::InvalidResponse(format!("raw_data_hex is not hex: {e}")))?;
    let expected = B256::from_slice(&Sha256::digest(&raw));

    let claimed: B256 = tx_id
        .parse()
        .map_err(|e| TronClientError::InvalidResponse(format!("txID is not a hash: {e}")))?;

    if claimed != expected {
        return Err(TronClientError::InvalidResponse(format!(
            "txID {tx_id} does not match raw_data hash {expected}"
        )));
    }

    Ok(expected)
}

/// Sign a 32-byte digest, returning the 65-byte `r || s || v` hex string
/// (no `0x` prefix) expected in a transaction's `signature` list.
pub fn sign_digest(signer: &PrivateKeySigner, digest: &B256) -> Result<String, TronClientError> {
    let signature = signer
        .sign_hash_sync(digest)
        .map_err(|e| TronClientError::Signing(e.to_string()))?;
    Ok(alloy::hex::encode(signature.as_bytes()))
}

/// TIP-191 digest of a personal message.
pub fn message_digest(message: &str) -> B256 {
    let mut payload = Vec::with_capacity(TRON_MESSAGE_PREFIX.len() + 20 + message.len());
    payload.extend_from_slice(TRON_MESSAGE_PREFIX.as_bytes());
    payload.extend_from_slice(message.len().to_string().as_bytes());
    payload.extend_from_slice(message.as_bytes());
    keccak256(payload)
}

/// Sign a personal message; returns `0x`-prefixed hex.
pub fn sign_message(signer: &PrivateKeySigner, message: &str) -> Result<String, TronClientError> {
    let signature = sign_digest(signer, &message_digest(message))?;
    Ok(format!("0x{signature}"))
}

/// Verify that `signature` over `message` was produced by `address`.
///
/// Malformed signature encodings are errors; well-formed signatures from a
/// different key verify as `false`.
pub fn verify_message(
    address: &TronAddress,
    message: &str,
    signature: &str,
) -> Result<bool, TronClientError> {
    let raw = signature.trim();
    let bytes = alloy::hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
        .map_err(|e| TronClientError::Signing(format!("signature is not hex: {e}")))?;
    let signature = Signature::try_from(bytes.as_slice())
        .map_err(|e| TronClientError::Signing(format!("invalid signature: {e}")))?;

    match signature.recover_address_from_prehash(&message_digest(message)) {
        Ok(recovered) => Ok(TronAddress::from_evm(recovered) == *address),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn signer() -> PrivateKeySigner {
        signer_from_mnemonic(MNEMONIC, 0).expect("valid mnemonic")
    }

    #[test]
    fn derivation_is_deterministic_per_index() {
        let a = signer_address(&signer());
        let b = signer_address(&signer_from_mnemonic(MNEMONIC, 0).unwrap());
        let c = signer_address(&signer_from_mnemonic(MNEMONIC, 1).unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.to_base58().starts_with('T'));
        assert_eq!(a.to_base58().len(), 34);
    }

    #[test]
    fn tron_path_differs_from_ethereum_path() {
        let eth = MnemonicBuilder::<English>::default()
            .phrase(MNEMONIC)
            .build()
            .unwrap();
        assert_ne!(TronAddress::from_evm(eth.address()), signer_address(&signer()));
    }

    #[test]
    fn invalid_mnemonic_is_rejected() {
        let err = signer_from_mnemonic("not a valid phrase", 0).unwrap_err();
        assert!(matches!(err, TronClientError::InvalidPrivateKey(_)));
    }

    #[test]
    fn message_round_trip() {
        let signer = signer();
        let address = signer_address(&signer);

        let signature = sign_message(&signer, "hello tron").unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 130);

        assert!(verify_message(&address, "hello tron", &signature).unwrap());
        assert!(!verify_message(&address, "hello tron!", &signature).unwrap());

        let other = signer_address(&signer_from_mnemonic(MNEMONIC, 1).unwrap());
        assert!(!verify_message(&other, "hello tron", &signature).unwrap());
    }

    #[test]
    fn malformed_signature_is_an_error() {
        let address = signer_address(&signer());
        assert!(verify_message(&address, "m", "zz").is_err());
        assert!(verify_message(&address, "m", "0x1234").is_err());
    }

    #[test]
    fn message_digest_uses_byte_length() {
        // "é" is two bytes; the prefix length must count bytes, not chars.
        let expected = keccak256(b"\x19TRON Signed Message:\n2\xc3\xa9");
        assert_eq!(message_digest("é"), expected);
    }

    #[test]
    fn transaction_id_must_match_raw_data() {
        let raw_hex = "0a0203e4";
        let digest = Sha256::digest(alloy::hex::decode(raw_hex).unwrap());
        let tx_id = alloy::hex::encode(digest);

        assert_eq!(
            verify_transaction_id(raw_hex, &tx_id).unwrap(),
            B256::from_slice(&digest)
        );

        let wrong = "00".repeat(32);
        assert!(verify_transaction_id(raw_hex, &wrong).is_err());
    }

    #[test]
    fn digest_signature_is_65_bytes() {
        let digest = B256::repeat_byte(7);
        let signature = sign_digest(&signer(), &digest).unwrap();
        assert_eq!(signature.len(), 130);
    }
}
