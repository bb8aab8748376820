//! Hex loading utilities

use std::{fs, io::Read, path::PathBuf};

use alloy_primitives::{hex, Bytes};

use super::{CliError, Result};

/// Load hex-encoded bytes from an argument or a file. If the file is a dash (-), read from stdin.
/// Priority: arg > file. Returns `None` if neither is provided.
pub fn load_hex(arg: Option<&str>, file: Option<&str>) -> Result<Option<Bytes>> {
    let hex_string = if let Some(arg) = arg {
        arg.to_string()
    } else if let Some(file) = file {
        if file == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).map_err(CliError::Stdin)?;
            buffer
        } else {
            fs::read_to_string(file)
                .map_err(|source| CliError::FileRead { path: PathBuf::from(file), source })?
        }
    } else {
        return Ok(None);
    };

    decode_hex(&hex_string).map(|bytes| Some(Bytes::from(bytes)))
}

/// Decode a non-empty hex string, handling optional 0x prefix
fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    if hex_str.is_empty() {
        return Err(CliError::InvalidInput("empty hex string".to_string()));
    }
    if hex_str.len() % 2 != 0 {
        return Err(CliError::InvalidInput(format!(
            "Invalid hex string length: {} (must be even)",
            hex_str.len()
        )));
    }

    Ok(hex::decode(hex_str)?)
}
