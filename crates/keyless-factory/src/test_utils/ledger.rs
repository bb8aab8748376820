use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use alloy_primitives::{hex, keccak256, Address, Bytes, TxHash, U256};

use crate::{Confirmation, DeploymentPlan, Ledger, LedgerError};

/// Runtime code installed by [`MockLedger`] when a deployment is included.
pub const MOCK_RUNTIME_CODE: &[u8] = &hex!("363d3d37363d34f0");

/// A call made to a [`MockLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCall {
    /// [`Ledger::code_at`]
    CodeAt(Address),
    /// [`Ledger::balance_of`]
    BalanceOf(Address),
    /// [`Ledger::broadcast`], with the hash of the submitted bytes.
    Broadcast(TxHash),
    /// [`Ledger::wait_for_inclusion`]
    WaitForInclusion(TxHash),
}

#[derive(Debug)]
struct MockLedgerState {
    codes: HashMap<Address, Bytes>,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    pending: HashMap<TxHash, DeploymentPlan>,
    runtime_code: Bytes,
    reverts: bool,
    reject_reason: Option<String>,
    unreachable: bool,
    broadcasts: Vec<Bytes>,
    calls: Vec<LedgerCall>,
}

impl Default for MockLedgerState {
    fn default() -> Self {
        Self {
            codes: HashMap::new(),
            balances: HashMap::new(),
            nonces: HashMap::new(),
            pending: HashMap::new(),
            runtime_code: Bytes::from_static(MOCK_RUNTIME_CODE),
            reverts: false,
            reject_reason: None,
            unreachable: false,
            broadcasts: Vec::new(),
            calls: Vec::new(),
        }
    }
}

/// An in-memory ledger for testing purposes.
///
/// Broadcasts are validated the way a node would: the transaction must decode as a keyless
/// deployment, its nonce must match the signer's, and the signer must afford
/// `gas_limit * gas_price + value`. Inclusion installs [`MOCK_RUNTIME_CODE`] at the contract
/// address unless the ledger is [`reverting`](Self::reverting).
#[derive(Debug, Default)]
pub struct MockLedger {
    state: Mutex<MockLedgerState>,
}

impl MockLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockLedgerState> {
        self.state.lock().unwrap()
    }

    /// Sets the code at `address`.
    pub fn set_code(&self, address: Address, code: Bytes) {
        self.state().codes.insert(address, code);
    }

    /// Sets the code at `address`.
    pub fn with_code(self, address: Address, code: Bytes) -> Self {
        self.set_code(address, code);
        self
    }

    /// Sets the balance of `address`.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state().balances.insert(address, balance);
    }

    /// Sets the balance of `address`.
    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.set_balance(address, balance);
        self
    }

    /// Installs `code` instead of [`MOCK_RUNTIME_CODE`] when a deployment is included.
    pub fn deploys_on_inclusion(self, code: Bytes) -> Self {
        self.state().runtime_code = code;
        self
    }

    /// Includes deployments with a failed status and leaves no code behind.
    pub fn reverting(self) -> Self {
        self.state().reverts = true;
        self
    }

    /// Rejects every broadcast with `reason`.
    pub fn rejecting_broadcasts(self, reason: impl Into<String>) -> Self {
        self.state().reject_reason = Some(reason.into());
        self
    }

    /// Fails every call as if the node could not be reached.
    pub fn unreachable(self) -> Self {
        self.state().unreachable = true;
        self
    }

    /// Makes the node reachable or unreachable from now on.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    /// Returns the code at `address`.
    pub fn code(&self, address: Address) -> Bytes {
        self.state().codes.get(&address).cloned().unwrap_or_default()
    }

    /// Returns the balance of `address`.
    pub fn balance(&self, address: Address) -> U256 {
        self.state().balances.get(&address).copied().unwrap_or_default()
    }

    /// Returns every accepted broadcast, in order.
    pub fn broadcasts(&self) -> Vec<Bytes> {
        self.state().broadcasts.clone()
    }

    /// Returns every call made, in order.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state().calls.clone()
    }

    fn record(&self, call: LedgerCall) -> Result<MutexGuard<'_, MockLedgerState>, LedgerError> {
        let mut state = self.state();
        state.calls.push(call);
        if state.unreachable {
            return Err(LedgerError::Other("connection refused".to_string()));
        }
        Ok(state)
    }
}

impl Ledger for MockLedger {
    async fn code_at(&self, address: Address) -> Result<Bytes, LedgerError> {
        let state = self.record(LedgerCall::CodeAt(address))?;
        Ok(state.codes.get(&address).cloned().unwrap_or_default())
    }

    async fn balance_of(&self, address: Address) -> Result<U256, LedgerError> {
        let state = self.record(LedgerCall::BalanceOf(address))?;
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn broadcast(&self, raw_tx: &[u8]) -> Result<TxHash, LedgerError> {
        let tx_hash = keccak256(raw_tx);
        let mut state = self.record(LedgerCall::Broadcast(tx_hash))?;
        if let Some(reason) = &state.reject_reason {
            return Err(LedgerError::Other(reason.clone()));
        }

        let plan = DeploymentPlan::from_raw_transaction(raw_tx.to_vec())
            .map_err(|err| LedgerError::Other(format!("invalid transaction: {err}")))?;
        let nonce = state.nonces.get(&plan.signer).copied().unwrap_or_default();
        if plan.tx.nonce != nonce {
            return Err(LedgerError::Other(format!(
                "nonce too low: next nonce {nonce}, tx nonce {}",
                plan.tx.nonce
            )));
        }
        let balance = state.balances.get(&plan.signer).copied().unwrap_or_default();
        let required = plan.required_balance();
        if balance < required {
            return Err(LedgerError::Other(format!(
                "insufficient funds for gas * price + value: have {balance} want {required}"
            )));
        }

        state.nonces.insert(plan.signer, nonce + 1);
        state.balances.insert(plan.signer, balance - required);
        state.broadcasts.push(plan.raw_transaction.clone());
        state.pending.insert(tx_hash, plan);
        Ok(tx_hash)
    }

    async fn wait_for_inclusion(&self, tx_hash: TxHash) -> Result<Confirmation, LedgerError> {
        let mut state = self.record(LedgerCall::WaitForInclusion(tx_hash))?;
        let plan = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| LedgerError::Other(format!("unknown transaction {tx_hash}")))?;

        let success = !state.reverts;
        if success {
            let code = state.runtime_code.clone();
            state.codes.insert(plan.contract_address, code);
        }
        Ok(Confirmation {
            tx_hash,
            block_number: Some(state.broadcasts.len() as u64),
            gas_used: plan.tx.gas_limit,
            success,
        })
    }
}
