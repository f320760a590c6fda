// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TIP-712 `PermitTransfer` authorizations.
//!
//! TIP-712 is EIP-712 with TRON addresses reduced to their 20-byte account
//! ids, so the permit is hashed with the `alloy` typed-data machinery. The
//! `maxFee` signed here is the ceiling the relay may deduct.

use alloy::{
    primitives::{B256, U256},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::{Eip712Domain, SolStruct},
};

use super::types::SubmitRequest;
use crate::tron::{signing, TronAddress, TronClientError};

pub const DOMAIN_NAME: &str = "GasFreeController";
pub const DOMAIN_VERSION: &str = "V1.0.0";
pub const PERMIT_VERSION: u64 = 1;

sol! {
    struct PermitTransfer {
        address token;
        address serviceProvider;
        address user;
        address receiver;
        uint256 value;
        uint256 maxFee;
        uint256 deadline;
        uint256 version;
        uint256 nonce;
    }
}

/// Parameters of one permit, in TRON terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permit {
    pub token: TronAddress,
    pub service_provider: TronAddress,
    pub user: TronAddress,
    pub receiver: TronAddress,
    pub value: U256,
    pub max_fee: U256,
    /// Unix seconds
    pub deadline: u64,
    pub nonce: u64,
}

impl Permit {
    fn to_typed(&self) -> PermitTransfer {
        PermitTransfer {
            token: self.token.to_evm(),
            serviceProvider: self.service_provider.to_evm(),
            user: self.user.to_evm(),
            receiver: self.receiver.to_evm(),
            value: self.value,
            maxFee: self.max_fee,
            deadline: U256::from(self.deadline),
            version: U256::from(PERMIT_VERSION),
            nonce: U256::from(self.nonce),
        }
    }

    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.to_typed().eip712_signing_hash(domain)
    }

    /// Sign the permit and shape it as a relay submission.
    pub fn sign(
        &self,
        signer: &PrivateKeySigner,
        domain: &Eip712Domain,
    ) -> Result<SubmitRequest, TronClientError> {
        let sig = signing::sign_digest(signer, &self.signing_hash(domain))?;

        Ok(SubmitRequest {
            token: self.token.to_base58(),
            service_provider: self.service_provider.to_base58(),
            user: self.user.to_base58(),
            receiver: self.receiver.to_base58(),
            value: self.value.to_string(),
            max_fee: self.max_fee.to_string(),
            deadline: self.deadline,
            version: PERMIT_VERSION,
            nonce: self.nonce,
            sig,
        })
    }
}

/// Domain of the GasFree controller on one chain.
pub fn domain(chain_id: u64, verifying_contract: &TronAddress) -> Eip712Domain {
    Eip712Domain::new(
        Some(DOMAIN_NAME.into()),
        Some(DOMAIN_VERSION.into()),
        Some(U256::from(chain_id)),
        Some(verifying_contract.to_evm()),
        None,
    )
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::Signature;

    use super::*;
    use crate::tron::GASFREE_NILE;

    const MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn address(s: &str) -> TronAddress {
        TronAddress::from_str(s).unwrap()
    }

    fn permit(user: TronAddress) -> Permit {
        Permit {
            token: address("TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf"),
            service_provider: address(GASFREE_NILE.service_provider),
            user,
            receiver: address("TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL"),
            value: U256::from(1_000_000u64),
            max_fee: U256::from(25_000u64),
            deadline: 1_700_000_180,
            nonce: 3,
        }
    }

    fn nile_domain() -> Eip712Domain {
        domain(
            GASFREE_NILE.chain_id,
            &address(GASFREE_NILE.verifying_contract),
        )
    }

    #[test]
    fn type_string_matches_controller() {
        assert_eq!(
            PermitTransfer::eip712_encode_type(),
            "PermitTransfer(address token,address serviceProvider,address user,address receiver,uint256 value,uint256 maxFee,uint256 deadline,uint256 version,uint256 nonce)"
        );
    }

    #[test]
    fn max_fee_is_part_of_the_signed_hash() {
        let signer = signing::signer_from_mnemonic(MNEMONIC, 0).unwrap();
        let user = signing::signer_address(&signer);
        let domain = nile_domain();

        let base = permit(user);
        let mut raised = base.clone();
        raised.max_fee = U256::from(25_001u64);

        assert_eq!(base.signing_hash(&domain), permit(user).signing_hash(&domain));
        assert_ne!(base.signing_hash(&domain), raised.signing_hash(&domain));
        assert_ne!(
            base.signing_hash(&domain),
            base.signing_hash(&domain_with_chain(1))
        );
    }

    fn domain_with_chain(chain_id: u64) -> Eip712Domain {
        domain(chain_id, &address(GASFREE_NILE.verifying_contract))
    }

    #[test]
    fn signed_permit_recovers_to_user() {
        let signer = signing::signer_from_mnemonic(MNEMONIC, 0).unwrap();
        let user = signing::signer_address(&signer);
        let domain = nile_domain();
        let permit = permit(user);

        let request = permit.sign(&signer, &domain).unwrap();
        assert_eq!(request.user, user.to_base58());
        assert_eq!(request.max_fee, "25000");
        assert_eq!(request.value, "1000000");
        assert_eq!(request.version, 1);
        assert_eq!(request.sig.len(), 130);

        let bytes = alloy::hex::decode(&request.sig).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        let recovered = signature
            .recover_address_from_prehash(&permit.signing_hash(&domain))
            .unwrap();
        assert_eq!(TronAddress::from_evm(recovered), user);
    }

    #[test]
    fn submission_serializes_in_camel_case() {
        let signer = signing::signer_from_mnemonic(MNEMONIC, 0).unwrap();
        let request = permit(signing::signer_address(&signer))
            .sign(&signer, &nile_domain())
            .unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["serviceProvider"], GASFREE_NILE.service_provider);
        assert_eq!(json["maxFee"], "25000");
        assert_eq!(json["deadline"], 1_700_000_180u64);
        assert!(json.get("sig").is_some());
    }
}
