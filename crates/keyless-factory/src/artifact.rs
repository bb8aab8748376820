//! Loading of the factory init code from a compiler artifact.

use std::path::Path;

use alloy_primitives::{hex, Bytes};
use serde::Deserialize;

use crate::ForgeError;

/// Build output exposing the init code of a contract.
///
/// Only the `bytecode` field is read. The bytecode is the raw init code, without constructor
/// arguments appended.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BytecodeArtifact {
    /// Contract name, informational only.
    #[serde(default)]
    pub contract_name: Option<String>,
    /// Hex encoded init code, with or without a `0x` prefix.
    pub bytecode: String,
}

impl BytecodeArtifact {
    /// Parses an artifact from JSON.
    pub fn from_json(json: &str) -> Result<Self, ForgeError> {
        serde_json::from_str(json)
            .map_err(|e| ForgeError::MalformedArtifact(format!("invalid artifact JSON: {e}")))
    }

    /// Reads an artifact from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ForgeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|source| ForgeError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&json)
    }

    /// Decodes the init code.
    pub fn init_code(&self) -> Result<Bytes, ForgeError> {
        decode_init_code(&self.bytecode)
    }
}

/// Decodes hex encoded init code, accepting an optional `0x` prefix.
pub fn decode_init_code(s: &str) -> Result<Bytes, ForgeError> {
    let s = s.trim();
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    if hex_str.is_empty() {
        return Err(ForgeError::MalformedArtifact("bytecode is empty".to_string()));
    }
    if hex_str.len() % 2 != 0 {
        return Err(ForgeError::MalformedArtifact(format!(
            "bytecode hex has odd length {}",
            hex_str.len()
        )));
    }

    Ok(hex::decode(hex_str)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CREATE3_FACTORY_ARTIFACT;

    #[test]
    fn test_bundled_artifact_decodes() {
        let artifact = BytecodeArtifact::from_json(CREATE3_FACTORY_ARTIFACT).unwrap();
        assert_eq!(artifact.contract_name.as_deref(), Some("CREATE3FACTORY"));
        let code = artifact.init_code().unwrap();
        assert_eq!(code.len(), 102);
        // PUSH1 0x5d DUP1 PUSH1 0x09 ...
        assert_eq!(&code[..4], &[0x60, 0x5d, 0x80, 0x60]);
    }

    #[test]
    fn test_decode_init_code_prefix_is_optional() {
        assert_eq!(decode_init_code("0x6001").unwrap(), decode_init_code("6001").unwrap());
        assert_eq!(decode_init_code(" 0X6001\n").unwrap().as_ref(), &[0x60, 0x01]);
    }

    #[test]
    fn test_decode_init_code_rejects_garbage() {
        assert!(matches!(decode_init_code(""), Err(ForgeError::MalformedArtifact(_))));
        assert!(matches!(decode_init_code("0x"), Err(ForgeError::MalformedArtifact(_))));
        assert!(matches!(decode_init_code("0x600"), Err(ForgeError::MalformedArtifact(_))));
        assert!(matches!(decode_init_code("0xzz"), Err(ForgeError::InvalidHex(_))));
    }

    #[test]
    fn test_artifact_without_bytecode_field() {
        let err = BytecodeArtifact::from_json(r#"{"abi": []}"#).unwrap_err();
        assert!(matches!(err, ForgeError::MalformedArtifact(_)));
    }
}
