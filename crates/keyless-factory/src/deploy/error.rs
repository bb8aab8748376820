use alloy_primitives::{Address, TxHash};

use crate::{LedgerError, TxDecodeError};

/// Errors of the deployment phase.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The raw transaction is not a valid keyless deployment
    #[error("Invalid deployment transaction: {0}")]
    InvalidTransaction(#[from] TxDecodeError),

    /// The raw transaction recovers to a different address than the committed one
    #[error("{what} mismatch: transaction yields {actual}, expected {expected}")]
    Mismatch {
        /// Which address differs
        what: &'static str,
        /// The committed address
        expected: Address,
        /// The address derived from the transaction
        actual: Address,
    },

    /// A ledger query failed
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The ledger did not accept the transaction
    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(#[source] LedgerError),

    /// The transaction was included but left no code behind
    #[error(
        "Deploy did not take effect: transaction {tx_hash} was included but there is no code at \
         {contract_address} (did the init code run out of gas?)"
    )]
    NotDeployed {
        /// The expected contract address
        contract_address: Address,
        /// The included transaction
        tx_hash: TxHash,
    },
}
