use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use tracing::debug;

use super::DeployError;
use crate::{forge::contract_address, ForgedDeployment, KeylessTx, TxDecodeError};

/// A decoded deployment transaction and everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// The decoded transaction.
    pub tx: KeylessTx,
    /// The exact bytes to broadcast.
    pub raw_transaction: Bytes,
    /// Signer recovered from the fixed signature.
    pub signer: Address,
    /// Address the contract is created at.
    pub contract_address: Address,
    /// Hash of `raw_transaction`.
    pub transaction_hash: B256,
}

impl DeploymentPlan {
    /// Decodes `raw_transaction` and recovers its signer and contract address.
    ///
    /// Only keyless deployments are accepted: nonce and value must both be 0.
    pub fn from_raw_transaction(raw_transaction: impl Into<Bytes>) -> Result<Self, DeployError> {
        let raw_transaction = raw_transaction.into();
        let tx = KeylessTx::decode(&raw_transaction)?;
        if tx.nonce != 0 {
            return Err(TxDecodeError::NonZeroNonce(tx.nonce).into());
        }
        if !tx.value.is_zero() {
            return Err(TxDecodeError::NonZeroValue(tx.value).into());
        }
        let signer = tx.recover_signer()?;
        let contract_address = contract_address(signer, tx.nonce);
        let transaction_hash = keccak256(&raw_transaction);
        debug!(%signer, %contract_address, %transaction_hash, "Decoded deployment transaction");

        Ok(Self { tx, raw_transaction, signer, contract_address, transaction_hash })
    }

    /// Checks the recovered addresses against the committed ones.
    pub fn ensure_matches(
        &self,
        signer: Option<Address>,
        contract_address: Option<Address>,
    ) -> Result<(), DeployError> {
        if let Some(expected) = signer.filter(|expected| *expected != self.signer) {
            return Err(DeployError::Mismatch { what: "signer", expected, actual: self.signer });
        }
        if let Some(expected) =
            contract_address.filter(|expected| *expected != self.contract_address)
        {
            return Err(DeployError::Mismatch {
                what: "contract address",
                expected,
                actual: self.contract_address,
            });
        }
        Ok(())
    }

    /// Balance the signer needs: `gas_limit * gas_price`. Cannot overflow, the product of a
    /// `u64` and a `u128` fits in 192 bits.
    pub fn required_balance(&self) -> U256 {
        U256::from(self.tx.gas_limit) * U256::from(self.tx.gas_price)
    }
}

impl From<ForgedDeployment> for DeploymentPlan {
    fn from(forged: ForgedDeployment) -> Self {
        Self {
            tx: forged.tx,
            raw_transaction: forged.raw_transaction,
            signer: forged.signer,
            contract_address: forged.contract_address,
            transaction_hash: forged.transaction_hash,
        }
    }
}
