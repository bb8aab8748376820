//! The signature forger.
//!
//! Builds the keyless deployment transaction and derives everything the deployer needs from it:
//! the serialized transaction, the signer, the contract address and the transaction hash.
//!
//! ## How the signer comes to be
//!
//! 1. Build a contract creation transaction (to = null, nonce = 0, value = 0)
//! 2. Attach two arbitrary constants as `(r, s)` and `v = 27` (pre-EIP-155)
//! 3. Recover the public key from `(hash(unsigned fields), r, s, v)`
//!
//! The recovered key is the signer. Nobody has, or can compute, its private key; it exists only
//! because recovery happens to succeed for these constants. Do not replace the constants with a
//! real signature: the signer, and with it the contract address, would change.

mod error;
mod recover;
mod tx;

pub use error::*;
pub use recover::*;
pub use tx::*;

use alloy_primitives::{keccak256, Address, Bytes, B256};
use tracing::{debug, warn};

use crate::{DeploymentConfig, DeploymentRecord};

/// The artifacts derived by the forger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgedDeployment {
    /// The transaction, with the recovery id that actually recovered.
    pub tx: KeylessTx,
    /// Serialized signed transaction, broadcast verbatim by the deployer.
    pub raw_transaction: Bytes,
    /// Recovered signer. Must be funded before deployment.
    pub signer: Address,
    /// Address the contract will be created at.
    pub contract_address: Address,
    /// Hash of the serialized transaction.
    pub transaction_hash: B256,
    /// Whether the configured recovery id failed and the other one was used.
    pub used_fallback: bool,
}

impl ForgedDeployment {
    /// The serialized `v` of the transaction.
    pub const fn v(&self) -> u64 {
        self.tx.v()
    }

    /// Converts into the record committed for the deployer.
    pub fn to_record(&self, config_version: u32) -> DeploymentRecord {
        DeploymentRecord {
            config_version,
            raw_transaction: self.raw_transaction.clone(),
            signer: self.signer,
            contract_address: self.contract_address,
            transaction_hash: self.transaction_hash,
            v: self.v(),
            chain_id: self.tx.chain_id.unwrap_or_default(),
        }
    }
}

/// Address of the contract created by `deployer` at `nonce`: `keccak256(rlp([deployer,
/// nonce]))[12:]`.
///
/// Keyless deployments always use nonce 0.
#[inline]
pub fn contract_address(deployer: Address, nonce: u64) -> Address {
    deployer.create(nonce)
}

/// Forges the keyless deployment of `init_code` under `config`.
///
/// This is a pure function of its inputs: the same init code and config always yield
/// byte-identical results. If the configured recovery id yields no public key, the other id is
/// tried once; [`ForgedDeployment::used_fallback`] records that it happened.
pub fn forge(init_code: Bytes, config: &DeploymentConfig) -> Result<ForgedDeployment, ForgeError> {
    config.validate()?;
    if init_code.is_empty() {
        return Err(ForgeError::MalformedArtifact("init code is empty".to_string()));
    }

    let mut tx = KeylessTx::from_config(init_code, config);
    let signature_hash = tx.signature_hash();
    debug!(%signature_hash, init_code_len = tx.init_code.len(), "Built unsigned transaction");

    let preferred = tx.y_parity;
    let (y_parity, signer) = recover_with_fallback(preferred, |y_parity| {
        recover_address(&signature_hash, tx.r, tx.s, y_parity)
    })
    .ok_or(ForgeError::Unrecoverable { r: tx.r, s: tx.s })?;

    let used_fallback = y_parity != preferred;
    if used_fallback {
        warn!(
            configured_v = config.signature.v,
            "Configured recovery id yields no public key, using the other one"
        );
    }
    tx.y_parity = y_parity;

    let raw_transaction = tx.encode();
    let transaction_hash = keccak256(&raw_transaction);
    let contract_address = contract_address(signer, tx.nonce);
    debug!(%signer, %contract_address, %transaction_hash, v = tx.v(), "Forged deployment");

    Ok(ForgedDeployment {
        tx,
        raw_transaction,
        signer,
        contract_address,
        transaction_hash,
        used_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};

    #[test]
    fn test_fallback_to_other_recovery_id() {
        let signer = address!("00000000000000000000000000000000000000aa");
        // only the odd point exists
        let recovered = recover_with_fallback(false, |y_parity| y_parity.then_some(signer));
        assert_eq!(recovered, Some((true, signer)));
    }

    #[test]
    fn test_preferred_recovery_id_wins() {
        let even = address!("00000000000000000000000000000000000000aa");
        let odd = address!("00000000000000000000000000000000000000bb");
        let recovered =
            recover_with_fallback(false, |y_parity| Some(if y_parity { odd } else { even }));
        assert_eq!(recovered, Some((false, even)));
    }

    #[test]
    fn test_fallback_tries_each_id_once() {
        let mut attempts = Vec::new();
        let recovered = recover_with_fallback(true, |y_parity| {
            attempts.push(y_parity);
            None
        });
        assert_eq!(recovered, None);
        assert_eq!(attempts, vec![true, false]);
    }

    #[test]
    fn test_forge_rejects_empty_init_code() {
        let err = forge(Bytes::new(), &DeploymentConfig::CREATE3_FACTORY_V1).unwrap_err();
        assert!(matches!(err, ForgeError::MalformedArtifact(_)));
    }

    #[test]
    fn test_forge_reports_unrecoverable_constants() {
        // x = 5 is not the x-coordinate of any secp256k1 point: 5^3 + 7 is a non-residue
        let mut config = DeploymentConfig::CREATE3_FACTORY_V1;
        config.signature.r = U256::from(5);
        let err = forge(Bytes::from_static(&[0x00]), &config).unwrap_err();
        assert!(matches!(err, ForgeError::Unrecoverable { r, .. } if r == U256::from(5)));
    }
}
