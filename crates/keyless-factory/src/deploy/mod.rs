//! The deployer.
//!
//! Drives a committed keyless deployment transaction onto a ledger:
//!
//! ```text
//! INIT -> CHECK_EXISTING -> CHECK_BALANCE -> BROADCAST -> CONFIRM -> VERIFY -> DONE | FAILED
//! ```
//!
//! Runs are idempotent. Existing code at the contract address ends the run before anything is
//! broadcast, so re-running after a success (or after a run killed mid-way) is always safe. At
//! most one transaction is submitted per run, and only when the code is absent and the signer can
//! pay for it. Nothing is retried.

mod error;
mod outcome;
mod plan;

pub use error::*;
pub use outcome::*;
pub use plan::*;

use tracing::{error, info, warn};

use crate::Ledger;

/// Stages of a deployer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DeployStage {
    /// The plan is decoded and its addresses derived. Reported first on every run.
    #[display("init")]
    Init,
    /// Looking for code at the contract address.
    #[display("check-existing")]
    CheckExisting,
    /// Checking the signer can pay for the deployment.
    #[display("check-balance")]
    CheckBalance,
    /// Submitting the transaction.
    #[display("broadcast")]
    Broadcast,
    /// Waiting for inclusion.
    #[display("confirm")]
    Confirm,
    /// Looking for code at the contract address again.
    #[display("verify")]
    Verify,
    /// The contract exists.
    #[display("done")]
    Done,
    /// The contract does not exist and the run stopped.
    #[display("failed")]
    Failed,
}

/// Runs a [`DeploymentPlan`] against a [`Ledger`].
#[derive(Debug)]
pub struct Deployer<L> {
    ledger: L,
    plan: DeploymentPlan,
}

impl<L: Ledger> Deployer<L> {
    /// Creates a deployer for `plan` on `ledger`.
    pub const fn new(ledger: L, plan: DeploymentPlan) -> Self {
        Self { ledger, plan }
    }

    /// Returns the plan.
    pub const fn plan(&self) -> &DeploymentPlan {
        &self.plan
    }

    /// Returns the ledger.
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Runs the deployment.
    pub async fn run(&self) -> Result<DeploymentOutcome, DeployError> {
        self.run_with_progress(|_| {}).await
    }

    /// Runs the deployment, calling `on_stage` whenever a stage is entered, starting with
    /// [`DeployStage::Init`] and ending with [`DeployStage::Done`] or [`DeployStage::Failed`].
    pub async fn run_with_progress<F>(
        &self,
        mut on_stage: F,
    ) -> Result<DeploymentOutcome, DeployError>
    where
        F: FnMut(DeployStage),
    {
        let plan = &self.plan;
        info!(
            stage = %DeployStage::Init,
            signer = %plan.signer,
            contract_address = %plan.contract_address,
            tx_hash = %plan.transaction_hash,
            "Starting deployment run"
        );
        on_stage(DeployStage::Init);

        let result = self.execute(&mut on_stage).await;
        match &result {
            Ok(outcome) => {
                let stage = outcome.final_stage();
                info!(%stage, ?outcome, "Deployment run finished");
                on_stage(stage);
            }
            Err(err) => {
                error!(stage = %DeployStage::Failed, %err, "Deployment run failed");
                on_stage(DeployStage::Failed);
            }
        }
        result
    }

    async fn execute<F>(&self, on_stage: &mut F) -> Result<DeploymentOutcome, DeployError>
    where
        F: FnMut(DeployStage),
    {
        let plan = &self.plan;
        let contract_address = plan.contract_address;
        let mut enter = |stage: DeployStage| {
            info!(%stage, %contract_address, "Entering stage");
            on_stage(stage);
        };

        enter(DeployStage::CheckExisting);
        let code = self.ledger.code_at(contract_address).await?;
        if !code.is_empty() {
            info!(%contract_address, code_size = code.len(), "Contract already exists");
            return Ok(DeploymentOutcome::AlreadyDeployed { contract_address });
        }

        enter(DeployStage::CheckBalance);
        let balance = self.ledger.balance_of(plan.signer).await?;
        let required = plan.required_balance();
        if balance < required {
            let shortfall = required - balance;
            warn!(
                signer = %plan.signer,
                %balance,
                %required,
                %shortfall,
                "Insufficient signer balance"
            );
            return Ok(DeploymentOutcome::InsufficientFunds {
                signer: plan.signer,
                balance,
                required,
                shortfall,
            });
        }

        enter(DeployStage::Broadcast);
        let tx_hash = self
            .ledger
            .broadcast(&plan.raw_transaction)
            .await
            .map_err(DeployError::BroadcastRejected)?;
        if tx_hash != plan.transaction_hash {
            warn!(
                %tx_hash,
                expected = %plan.transaction_hash,
                "Ledger reported an unexpected transaction hash"
            );
        }

        enter(DeployStage::Confirm);
        let confirmation = self.ledger.wait_for_inclusion(tx_hash).await?;
        if !confirmation.success {
            warn!(%tx_hash, gas_used = confirmation.gas_used, "Deployment transaction failed");
        }

        enter(DeployStage::Verify);
        let code = self.ledger.code_at(contract_address).await?;
        if code.is_empty() {
            return Err(DeployError::NotDeployed { contract_address, tx_hash });
        }

        Ok(DeploymentOutcome::Deployed {
            contract_address,
            tx_hash,
            block_number: confirmation.block_number,
            code_size: code.len(),
        })
    }
}
