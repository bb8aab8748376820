use alloy_primitives::{Address, TxHash, U256};

use super::DeployStage;

/// Result of a deployer run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
    /// Code already exists at the contract address; nothing was broadcast.
    AlreadyDeployed {
        /// The contract address.
        contract_address: Address,
    },
    /// The signer cannot pay for the deployment; nothing was broadcast.
    InsufficientFunds {
        /// The address to fund.
        signer: Address,
        /// Current balance of the signer.
        balance: U256,
        /// Balance required for the deployment.
        required: U256,
        /// `required - balance`.
        shortfall: U256,
    },
    /// The transaction was included and code exists at the contract address.
    Deployed {
        /// The contract address.
        contract_address: Address,
        /// The confirmed transaction.
        tx_hash: TxHash,
        /// Block the transaction was included in.
        block_number: Option<u64>,
        /// Size of the deployed runtime code.
        code_size: usize,
    },
}

impl DeploymentOutcome {
    /// Whether the contract exists at its address after the run.
    pub const fn is_deployed(&self) -> bool {
        matches!(self, Self::AlreadyDeployed { .. } | Self::Deployed { .. })
    }

    /// The terminal stage of the run.
    pub const fn final_stage(&self) -> DeployStage {
        if self.is_deployed() {
            DeployStage::Done
        } else {
            DeployStage::Failed
        }
    }
}
