//! Committed outputs of the forger.
//!
//! Do not modify these values unless a new version of the factory is being deployed. They are
//! regenerated with `factory-deployer forge` and must stay byte-identical to its output.

use alloy_primitives::{address, b256, hex, Address, B256};

use crate::{DeployError, DeploymentPlan};

/// Compiler artifact of the CREATE3 factory.
pub const CREATE3_FACTORY_ARTIFACT: &str = include_str!("../artifacts/Create3Factory.json");

/// A deployment whose forger output has been reviewed and committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownDeployment {
    /// Human readable name.
    pub name: &'static str,
    /// Serialized signed transaction.
    pub raw_transaction: &'static [u8],
    /// Signer recovered from the transaction.
    pub signer: Address,
    /// Address the contract is created at.
    pub contract_address: Address,
    /// Hash of the transaction.
    pub transaction_hash: B256,
}

impl KnownDeployment {
    /// Builds the deployment plan, checking that the raw transaction still recovers to the
    /// committed signer and contract address.
    pub fn plan(&self) -> Result<DeploymentPlan, DeployError> {
        let plan = DeploymentPlan::from_raw_transaction(self.raw_transaction.to_vec())?;
        plan.ensure_matches(Some(self.signer), Some(self.contract_address))?;
        Ok(plan)
    }
}

/// The CREATE3 factory forged from [`CREATE3_FACTORY_ARTIFACT`] with
/// [`DeploymentConfig::CREATE3_FACTORY_V1`](crate::DeploymentConfig::CREATE3_FACTORY_V1).
pub const CREATE3_FACTORY: KnownDeployment = KnownDeployment {
    name: "CREATE3 factory v1",
    raw_transaction: &hex!("f8b88085174876e80083015f908080b866605d8060093d393df3756d363d3d37363d34f03d5260203df33d52600e6012f33d52336020526004356040526060602c206016600a3df58061003b5760013d5260203dfd5b60203d6044358060643d373d34855af16100585760025f5260205ffd5b60205ff31ba08888888888888888888888888888888888888888888888888888888888888888a03333333333333333333333333333333333333333333333333333333333333333"),
    signer: address!("77a9D56476897C82560f097fea5B2F965D58bE15"),
    contract_address: address!("749b753DA5168F9d10a30Eb3394a3B852B4ec6c9"),
    transaction_hash: b256!("6ce5b07ae714433b2a3f4d79b31819e93da03643655f929624d5ef8a6bb82175"),
};
