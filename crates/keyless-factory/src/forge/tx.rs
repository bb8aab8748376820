//! The legacy contract-creation transaction used for keyless deployment.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Decodable, Encodable, Header};

use super::{recover_address, TxDecodeError};
use crate::{DeploymentConfig, V_EVEN, V_ODD};

/// RLP encoding of the empty `to` field of a contract creation.
const EMPTY_STRING_CODE: u8 = alloy_rlp::EMPTY_STRING_CODE;

/// EIP-155 offset of `v`: `v = chain_id * 2 + 35 + y_parity`.
const EIP155_V_OFFSET: u64 = 35;

/// A legacy contract-creation transaction with a fixed signature.
///
/// The serialized form is `[nonce, gasPrice, gasLimit, "", value, data, v, r, s]`. When
/// `chain_id` is `None` the transaction is pre-EIP-155 and `v` is 27 or 28, which makes it valid
/// on every chain that still accepts unprotected transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeylessTx {
    /// Transaction nonce, 0 for keyless deployments.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Value sent with the creation, 0 for keyless deployments.
    pub value: U256,
    /// Contract init code.
    pub init_code: Bytes,
    /// Chain the transaction is bound to, `None` for pre-EIP-155.
    pub chain_id: Option<u64>,
    /// Y-parity of the recovery point.
    pub y_parity: bool,
    /// Signature `r`.
    pub r: U256,
    /// Signature `s`.
    pub s: U256,
}

impl KeylessTx {
    /// Builds the transaction described by `config` around `init_code`.
    pub fn from_config(init_code: Bytes, config: &DeploymentConfig) -> Self {
        Self {
            nonce: config.nonce,
            gas_price: config.gas_price,
            gas_limit: config.gas_limit,
            value: config.value,
            init_code,
            chain_id: config.bound_chain_id(),
            y_parity: config.signature.y_parity(),
            r: config.signature.r,
            s: config.signature.s,
        }
    }

    /// The `v` value as serialized.
    pub const fn v(&self) -> u64 {
        match self.chain_id {
            Some(chain_id) => chain_id * 2 + EIP155_V_OFFSET + self.y_parity as u64,
            None => (if self.y_parity { V_ODD } else { V_EVEN }) as u64,
        }
    }

    /// Length of the unsigned fields `[nonce, gasPrice, gasLimit, to, value, data]`.
    fn fields_len(&self) -> usize {
        self.nonce.length() +
            self.gas_price.length() +
            self.gas_limit.length() +
            1 +
            self.value.length() +
            self.init_code.length()
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        out.push(EMPTY_STRING_CODE);
        self.value.encode(out);
        self.init_code.encode(out);
    }

    /// Encodes the payload the signature commits to.
    ///
    /// Pre-EIP-155 this is the RLP list of the unsigned fields. With a chain id, the list is
    /// extended with `[chainId, 0, 0]`.
    pub fn encode_for_signing(&self) -> Vec<u8> {
        let mut payload_length = self.fields_len();
        if let Some(chain_id) = self.chain_id {
            payload_length += chain_id.length() + 2;
        }

        let mut out = Vec::with_capacity(payload_length + 4);
        Header { list: true, payload_length }.encode(&mut out);
        self.encode_fields(&mut out);
        if let Some(chain_id) = self.chain_id {
            chain_id.encode(&mut out);
            0u8.encode(&mut out);
            0u8.encode(&mut out);
        }
        out
    }

    /// Hash the signature commits to, `keccak256(encode_for_signing())`.
    pub fn signature_hash(&self) -> B256 {
        keccak256(self.encode_for_signing())
    }

    /// Encodes the signed transaction. This is the exact byte string that gets broadcast.
    pub fn encode(&self) -> Bytes {
        let v = self.v();
        let payload_length = self.fields_len() + v.length() + self.r.length() + self.s.length();

        let mut out = Vec::with_capacity(payload_length + 4);
        Header { list: true, payload_length }.encode(&mut out);
        self.encode_fields(&mut out);
        v.encode(&mut out);
        self.r.encode(&mut out);
        self.s.encode(&mut out);
        out.into()
    }

    /// Transaction hash, `keccak256(encode())`.
    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }

    /// Recovers the signer implied by the fixed signature.
    pub fn recover_signer(&self) -> Result<Address, TxDecodeError> {
        recover_address(&self.signature_hash(), self.r, self.s, self.y_parity)
            .ok_or(TxDecodeError::InvalidSignature)
    }

    /// Decodes a serialized keyless deployment transaction.
    ///
    /// # Validation
    /// - The RLP encoding must be a single list with nothing trailing
    /// - The `to` field must be empty (contract creation)
    /// - `v` must be 27, 28, or an EIP-155 value
    pub fn decode(raw: &[u8]) -> Result<Self, TxDecodeError> {
        let mut buf = raw;

        let header = Header::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        if !header.list || header.payload_length != buf.len() {
            return Err(TxDecodeError::MalformedEncoding);
        }

        let nonce = u64::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        let gas_price = u128::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        let gas_limit = u64::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;

        // For contract creation, 'to' must be an empty string (not a list, payload_length = 0)
        let to_header = Header::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        if to_header.list || to_header.payload_length != 0 {
            return Err(TxDecodeError::NotContractCreation);
        }

        let value = U256::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        let init_code = Bytes::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        let v = u64::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        let r = U256::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;
        let s = U256::decode(&mut buf).map_err(|_| TxDecodeError::MalformedEncoding)?;

        if !buf.is_empty() {
            return Err(TxDecodeError::MalformedEncoding);
        }

        let (chain_id, y_parity) = match v {
            27 | 28 => (None, v == V_ODD as u64),
            v if v >= EIP155_V_OFFSET => {
                let v = v - EIP155_V_OFFSET;
                (Some(v / 2), v % 2 == 1)
            }
            v => return Err(TxDecodeError::UnsupportedV(v)),
        };

        Ok(Self { nonce, gas_price, gas_limit, value, init_code, chain_id, y_parity, r, s })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes, hex};

    /// The canonical CREATE2 factory deployment transaction (pre-EIP-155, v=27).
    /// Signer: 0x3fab184622dc19b6109349b94811493bf2a45362
    /// Deployed to: 0x4e59b44847b379578588920ca78fbf26c0b4956c
    const CREATE2_FACTORY_TX: &[u8] = &hex!("f8a58085174876e800830186a08080b853604580600e600039806000f350fe7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe03601600081602082378035828234f58015156039578182fd5b8082525050506014600cf31ba02222222222222222222222222222222222222222222222222222222222222222a02222222222222222222222222222222222222222222222222222222222222222");

    /// Post-EIP-155 transaction with chain ID 1 (v=0x26=38), signed by a real key.
    const POST_EIP155_CHAIN_1_TX: &[u8] = &hex!("f856808504a817c800830186a0808085608060405226a0fceb37453e90ac5ec2780748b7a4907b1dcfb87708697de2e6be19831938c77ba0224ee4c1aaa6a1490b4e3a1fbed7c5151668a12b6f6e3227c2692a64cf79e81f");

    /// Non-contract creation transaction (to=0x4242...42, pre-EIP-155, v=27).
    const NON_CONTRACT_CREATION_TX: &[u8] = &hex!("f866808504a817c800825208944242424242424242424242424242424242424242808082072ba094a1d148b08c268261581dd9e90478bae0c937e26eec574809876bdd34de82daa03e2fb4dd2cb99703feeb0da3c3a1062a047f0091aa09610c3a7feecfda6f6bad");

    #[test]
    fn test_decode_create2_factory_deployment() {
        let tx = KeylessTx::decode(CREATE2_FACTORY_TX).unwrap();

        assert_eq!(tx.nonce, 0);
        assert_eq!(tx.gas_price, 100_000_000_000);
        assert_eq!(tx.gas_limit, 100_000);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.chain_id, None);
        assert_eq!(tx.v(), 27);
        assert_eq!(tx.r, U256::from_be_bytes([0x22; 32]));
        assert_eq!(tx.s, U256::from_be_bytes([0x22; 32]));
        assert_eq!(
            tx.init_code,
            bytes!("604580600e600039806000f350fe7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe03601600081602082378035828234f58015156039578182fd5b8082525050506014600cf3")
        );
    }

    #[test]
    fn test_reencoding_is_byte_identical() {
        let tx = KeylessTx::decode(CREATE2_FACTORY_TX).unwrap();
        assert_eq!(tx.encode().as_ref(), CREATE2_FACTORY_TX);

        let tx = KeylessTx::decode(POST_EIP155_CHAIN_1_TX).unwrap();
        assert_eq!(tx.encode().as_ref(), POST_EIP155_CHAIN_1_TX);
    }

    #[test]
    fn test_recover_create2_factory_signer() {
        let tx = KeylessTx::decode(CREATE2_FACTORY_TX).unwrap();
        let signer = tx.recover_signer().unwrap();
        assert_eq!(signer, address!("3fab184622dc19b6109349b94811493bf2a45362"));
        assert_eq!(signer.create(0), address!("4e59b44847b379578588920ca78fbf26c0b4956c"));
    }

    #[test]
    fn test_decode_eip155_chain_id() {
        let tx = KeylessTx::decode(POST_EIP155_CHAIN_1_TX).unwrap();
        assert_eq!(tx.chain_id, Some(1));
        assert!(tx.y_parity);
        assert_eq!(tx.v(), 38);
        assert_eq!(tx.init_code, bytes!("6080604052"));
    }

    #[test]
    fn test_signing_payload_binds_chain_id() {
        let mut tx = KeylessTx::decode(CREATE2_FACTORY_TX).unwrap();
        let unbound = tx.signature_hash();
        tx.chain_id = Some(1);
        assert_ne!(tx.signature_hash(), unbound);
        // the payload grows by [0x01, 0x80, 0x80]
        let payload = tx.encode_for_signing();
        assert_eq!(&payload[payload.len() - 3..], &[1, 0x80, 0x80]);
    }

    #[test]
    fn test_decode_rejects_non_contract_creation() {
        assert_eq!(
            KeylessTx::decode(NON_CONTRACT_CREATION_TX),
            Err(TxDecodeError::NotContractCreation)
        );
    }

    #[test]
    fn test_decode_rejects_invalid_v() {
        // v = 1 is neither legacy nor EIP-155. The v byte precedes the 33-byte r and s items.
        let mut raw = CREATE2_FACTORY_TX.to_vec();
        let v_pos = raw.len() - 66 - 1;
        assert_eq!(raw[v_pos], 0x1b);
        raw[v_pos] = 0x01;
        assert_eq!(KeylessTx::decode(&raw), Err(TxDecodeError::UnsupportedV(1)));
    }

    #[test]
    fn test_decode_rejects_malformed_rlp() {
        assert_eq!(KeylessTx::decode(&hex!("deadbeef")), Err(TxDecodeError::MalformedEncoding));
        assert_eq!(KeylessTx::decode(&[]), Err(TxDecodeError::MalformedEncoding));

        let truncated = &CREATE2_FACTORY_TX[..CREATE2_FACTORY_TX.len() - 10];
        assert_eq!(KeylessTx::decode(truncated), Err(TxDecodeError::MalformedEncoding));

        let mut trailing = CREATE2_FACTORY_TX.to_vec();
        trailing.push(0x00);
        assert_eq!(KeylessTx::decode(&trailing), Err(TxDecodeError::MalformedEncoding));
    }
}
