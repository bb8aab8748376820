use std::path::PathBuf;

use alloy_primitives::{hex::FromHexError, U256};

/// Errors of the forging phase.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// Failed to read an input file
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// The file that could not be read
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The bytecode artifact is missing its init code or is not valid JSON
    #[error("Malformed bytecode artifact: {0}")]
    MalformedArtifact(String),

    /// The init code is not valid hex
    #[error("Invalid init code hex: {0}")]
    InvalidHex(#[from] FromHexError),

    /// The config file is not valid JSON
    #[error("Invalid config JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// The config violates the keyless deployment rules
    #[error("Invalid deployment config: {0}")]
    InvalidConfig(String),

    /// Neither recovery id yields a public key. The signature constants are unusable.
    #[error("No public key recovers from r = {r:#x}, s = {s:#x} with either recovery id")]
    Unrecoverable {
        /// Signature `r`
        r: U256,
        /// Signature `s`
        s: U256,
    },
}

/// Errors decoding a serialized keyless deployment transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxDecodeError {
    /// The transaction is not a well-formed RLP list
    #[error("Malformed RLP encoding")]
    MalformedEncoding,

    /// The transaction has a recipient
    #[error("Transaction is not a contract creation")]
    NotContractCreation,

    /// `v` is neither 27, 28, nor an EIP-155 value
    #[error("Unsupported signature v = {0}")]
    UnsupportedV(u64),

    /// The nonce is not 0
    #[error("Keyless deployment nonce must be 0, got {0}")]
    NonZeroNonce(u64),

    /// The value is not 0
    #[error("Keyless deployment value must be 0, got {0}")]
    NonZeroValue(U256),

    /// The signature does not recover to a public key
    #[error("Signature does not recover to a public key")]
    InvalidSignature,
}
