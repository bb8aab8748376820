//! Versioned configuration of a keyless deployment.

use std::path::Path;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::ForgeError;

/// Legacy `v` selecting the even y-coordinate during recovery.
pub const V_EVEN: u8 = 27;

/// Legacy `v` selecting the odd y-coordinate during recovery.
pub const V_ODD: u8 = 28;

/// Half of the secp256k1 group order. Signatures with a larger `s` are rejected by every
/// post-Homestead ledger (EIP-2).
const SECP256K1_HALF_ORDER: U256 = U256::from_be_bytes([
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
]);

/// Largest chain id whose EIP-155 `v` still fits in a `u64`.
const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

/// The fixed signature triple of a keyless deployment.
///
/// These values are NOT a signature produced by any key. They are arbitrary constants, and the
/// "signer" of the deployment is simply whichever public key recovers from them. Replacing them
/// with a real signature changes the signer and therefore the contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureConstants {
    /// Signature `r`, reused as the x-coordinate of the recovery point.
    pub r: U256,
    /// Signature `s`.
    pub s: U256,
    /// Preferred legacy recovery id, 27 or 28.
    pub v: u8,
}

impl SignatureConstants {
    /// Returns the y-parity selected by `v`.
    pub const fn y_parity(&self) -> bool {
        self.v == V_ODD
    }
}

/// Every constant that determines a keyless deployment.
///
/// Any change to these values produces a different signer and contract address, so each set of
/// values carries a `version` and new targets are added as new configs rather than edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// Version of this set of constants.
    pub version: u32,
    /// Gas limit covering the worst-case deployment cost.
    pub gas_limit: u64,
    /// Gas price in wei; the minimum price the deployment must be accepted at.
    pub gas_price: u128,
    /// Sender nonce. Always 0: the derived signer has never sent a transaction.
    #[serde(default)]
    pub nonce: u64,
    /// Value sent with the creation. Always 0.
    #[serde(default)]
    pub value: U256,
    /// Chain id. 0 leaves the transaction unbound to any chain (pre-EIP-155).
    #[serde(default)]
    pub chain_id: u64,
    /// Fixed signature triple.
    pub signature: SignatureConstants,
}

impl DeploymentConfig {
    /// Constants of the first CREATE3 factory deployment.
    pub const CREATE3_FACTORY_V1: Self = Self {
        version: 1,
        gas_limit: 90_000,
        gas_price: 100_000_000_000,
        nonce: 0,
        value: U256::ZERO,
        chain_id: 0,
        signature: SignatureConstants {
            r: U256::from_be_bytes([0x88; 32]),
            s: U256::from_be_bytes([0x33; 32]),
            v: V_EVEN,
        },
    };

    /// Parses a config from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ForgeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ForgeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|source| ForgeError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&json)
    }

    /// Returns the config bound to `chain_id`. Note that a non-zero chain id produces an
    /// EIP-155 transaction whose signer and contract address differ per chain.
    pub const fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Returns the optional chain id of the transaction, `None` when unbound.
    pub const fn bound_chain_id(&self) -> Option<u64> {
        if self.chain_id == 0 {
            None
        } else {
            Some(self.chain_id)
        }
    }

    /// Balance the signer must hold for the deployment to be accepted.
    pub fn required_balance(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.gas_price)
    }

    /// Checks that the constants describe a valid keyless deployment.
    pub fn validate(&self) -> Result<(), ForgeError> {
        let invalid = |msg: String| Err(ForgeError::InvalidConfig(msg));

        if self.nonce != 0 {
            return invalid(format!("nonce must be 0, got {}", self.nonce));
        }
        if !self.value.is_zero() {
            return invalid(format!("value must be 0, got {}", self.value));
        }
        if self.gas_limit == 0 {
            return invalid("gas limit must be non-zero".to_string());
        }
        if self.chain_id > MAX_CHAIN_ID {
            return invalid(format!("chain id {} is too large", self.chain_id));
        }

        let SignatureConstants { r, s, v } = self.signature;
        if v != V_EVEN && v != V_ODD {
            return invalid(format!("signature v must be {V_EVEN} or {V_ODD}, got {v}"));
        }
        if r.is_zero() || s.is_zero() {
            return invalid("signature r and s must be non-zero".to_string());
        }
        if s > SECP256K1_HALF_ORDER {
            return invalid(format!("signature s {s:#x} is in the upper half of the curve order"));
        }

        Ok(())
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::CREATE3_FACTORY_V1
    }
}
