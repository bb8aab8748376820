//! The ledger the deployer reads from and broadcasts to.

use std::time::{Duration, Instant};

use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::Provider;
use alloy_transport::TransportError;
use tracing::trace;

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Errors talking to a ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// RPC transport error
    #[error("RPC transport error: {0}")]
    Transport(#[from] TransportError),

    /// The transaction was not included in time
    #[error("Transaction {tx_hash} not included after {waited:?}")]
    ConfirmationTimeout {
        /// The broadcast transaction
        tx_hash: TxHash,
        /// How long we waited
        waited: Duration,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Inclusion of a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// The included transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Receipt status. A failed status usually means the init code reverted or ran out of gas.
    pub success: bool,
}

/// Query and submission capability of a ledger.
///
/// Every method is a single round trip; the deployer awaits them strictly in sequence.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// Returns the code at `address`, empty if there is none.
    async fn code_at(&self, address: Address) -> Result<Bytes, LedgerError>;

    /// Returns the balance of `address` in wei.
    async fn balance_of(&self, address: Address) -> Result<U256, LedgerError>;

    /// Submits a serialized signed transaction and returns its hash.
    async fn broadcast(&self, raw_tx: &[u8]) -> Result<TxHash, LedgerError>;

    /// Waits until `tx_hash` is included in a block.
    async fn wait_for_inclusion(&self, tx_hash: TxHash) -> Result<Confirmation, LedgerError>;
}

/// [`Ledger`] backed by a JSON-RPC [`Provider`].
#[derive(Debug, Clone)]
pub struct RpcLedger<P> {
    provider: P,
    poll_interval: Duration,
    confirm_timeout: Option<Duration>,
}

impl<P> RpcLedger<P> {
    /// Wraps `provider`. Inclusion is polled every [`DEFAULT_POLL_INTERVAL`] without timeout.
    pub const fn new(provider: P) -> Self {
        Self { provider, poll_interval: DEFAULT_POLL_INTERVAL, confirm_timeout: None }
    }

    /// Sets the interval between receipt polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Gives up waiting for inclusion after `timeout`.
    pub fn with_confirm_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Returns the underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> Ledger for RpcLedger<P> {
    async fn code_at(&self, address: Address) -> Result<Bytes, LedgerError> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn balance_of(&self, address: Address) -> Result<U256, LedgerError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn broadcast(&self, raw_tx: &[u8]) -> Result<TxHash, LedgerError> {
        let pending = self.provider.send_raw_transaction(raw_tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_inclusion(&self, tx_hash: TxHash) -> Result<Confirmation, LedgerError> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                return Ok(Confirmation {
                    tx_hash,
                    block_number: receipt.block_number(),
                    gas_used: receipt.gas_used(),
                    success: receipt.status(),
                });
            }

            let waited = started.elapsed();
            if self.confirm_timeout.is_some_and(|timeout| waited >= timeout) {
                return Err(LedgerError::ConfirmationTimeout { tx_hash, waited });
            }

            trace!(%tx_hash, ?waited, "Transaction not yet included");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
