//! The deployment record handed from the forger to the deployer.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Output of the forger, as reviewed and committed before any funds are spent.
///
/// The deployer only trusts `raw_transaction`; the other fields are cross-checked against what
/// the raw transaction actually recovers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Version of the [`DeploymentConfig`](crate::DeploymentConfig) the record was forged from.
    pub config_version: u32,
    /// Serialized signed transaction.
    pub raw_transaction: Bytes,
    /// Recovered signer.
    pub signer: Address,
    /// Expected contract address.
    pub contract_address: Address,
    /// Hash of the serialized transaction.
    pub transaction_hash: B256,
    /// Serialized `v`.
    pub v: u64,
    /// Chain id, 0 when unbound.
    pub chain_id: u64,
}
