use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use alloy_primitives::Address;
use alloy_provider::ProviderBuilder;
use clap::Parser;
use keyless_factory::{
    constants::CREATE3_FACTORY, DeployStage, Deployer, DeploymentOutcome, DeploymentPlan,
    DeploymentRecord, Ledger, RpcLedger,
};
use reqwest::Url;
use tracing::{info, warn};

use crate::{
    common::{load_hex, print_deploying, print_outcome, print_plan, CliError},
    Error,
};

/// Broadcast the keyless deployment transaction
#[derive(Parser, Debug)]
pub struct Cmd {
    /// RPC URL of the target chain
    #[arg(long = "rpc", env = "RPC_URL", default_value = "http://localhost:8545")]
    pub rpc: Url,

    /// Deployment record written by `forge --output`. Defaults to the committed CREATE3 factory
    #[arg(long, value_name = "PATH", conflicts_with_all = ["raw_tx", "raw_tx_file"])]
    pub deployment: Option<PathBuf>,

    /// Serialized signed transaction as hex
    #[arg(long = "raw-tx", value_name = "HEX", conflicts_with = "raw_tx_file")]
    pub raw_tx: Option<String>,

    /// File containing the serialized signed transaction as hex; `-` reads stdin
    #[arg(long = "raw-tx-file", value_name = "PATH")]
    pub raw_tx_file: Option<String>,

    /// Expected signer; the run aborts if the transaction recovers to another address
    #[arg(long, value_name = "ADDRESS")]
    pub signer: Option<Address>,

    /// Expected contract address; the run aborts if the transaction creates another address
    #[arg(long, value_name = "ADDRESS")]
    pub contract: Option<Address>,

    /// Seconds between receipt polls
    #[arg(long = "poll-interval", value_name = "SECS", default_value_t = 2)]
    pub poll_interval: u64,

    /// Give up waiting for inclusion after this many seconds. Waits forever if unset
    #[arg(long = "confirm-timeout", value_name = "SECS")]
    pub confirm_timeout: Option<u64>,
}

impl Cmd {
    /// Execute the deploy command
    pub async fn run(&self) -> Result<(), Error> {
        let plan = self.plan()?;
        print_plan(&plan);

        info!(rpc = %self.rpc, "Connecting to node");
        let provider =
            ProviderBuilder::new().disable_recommended_fillers().on_http(self.rpc.clone());
        let ledger = RpcLedger::new(provider)
            .with_poll_interval(Duration::from_secs(self.poll_interval))
            .with_confirm_timeout(self.confirm_timeout.map(Duration::from_secs));

        self.deploy_on(ledger, plan).await?;
        Ok(())
    }

    /// Run the deployer for `plan` on `ledger` and print its outcome.
    pub async fn deploy_on<L: Ledger>(
        &self,
        ledger: L,
        plan: DeploymentPlan,
    ) -> Result<DeploymentOutcome, Error> {
        let deployer = Deployer::new(ledger, plan);
        let outcome = deployer
            .run_with_progress(|stage| {
                if stage == DeployStage::Broadcast {
                    print_deploying();
                }
            })
            .await?;
        print_outcome(&outcome);
        Ok(outcome)
    }

    /// Decode the transaction to broadcast and check it against the committed addresses.
    pub fn plan(&self) -> Result<DeploymentPlan, Error> {
        let plan = if let Some(path) = &self.deployment {
            Self::plan_from_record(&Self::read_record(path)?)?
        } else if let Some(raw_tx) =
            load_hex(self.raw_tx.as_deref(), self.raw_tx_file.as_deref())?
        {
            DeploymentPlan::from_raw_transaction(raw_tx)?
        } else {
            CREATE3_FACTORY.plan()?
        };

        plan.ensure_matches(self.signer, self.contract)?;
        Ok(plan)
    }

    fn read_record(path: &Path) -> Result<DeploymentRecord, CliError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| CliError::FileRead { path: path.to_path_buf(), source })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn plan_from_record(record: &DeploymentRecord) -> Result<DeploymentPlan, Error> {
        let plan = DeploymentPlan::from_raw_transaction(record.raw_transaction.clone())?;
        plan.ensure_matches(Some(record.signer), Some(record.contract_address))?;
        if plan.transaction_hash != record.transaction_hash {
            warn!(
                recorded = %record.transaction_hash,
                actual = %plan.transaction_hash,
                "Recorded transaction hash does not match the raw transaction"
            );
            return Err(CliError::InvalidInput(format!(
                "recorded transaction hash {} does not match the raw transaction hash {}",
                record.transaction_hash, plan.transaction_hash
            ))
            .into());
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex, U256};
    use keyless_factory::{test_utils::MockLedger, DeployError};
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cmd {
        Cmd::try_parse_from(std::iter::once("deploy").chain(args.iter().copied())).unwrap()
    }

    fn write_record(dir: &tempfile::TempDir, record: &DeploymentRecord) -> String {
        let path = dir.path().join("deployment.json");
        std::fs::write(&path, serde_json::to_string(record).unwrap()).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn committed_record() -> DeploymentRecord {
        DeploymentRecord {
            config_version: 1,
            raw_transaction: CREATE3_FACTORY.raw_transaction.to_vec().into(),
            signer: CREATE3_FACTORY.signer,
            contract_address: CREATE3_FACTORY.contract_address,
            transaction_hash: CREATE3_FACTORY.transaction_hash,
            v: 27,
            chain_id: 0,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cmd = parse(&["--rpc", "http://localhost:8545"]);
        assert_eq!(cmd.rpc.as_str(), "http://localhost:8545/");
        assert_eq!(cmd.poll_interval, 2);
        assert_eq!(cmd.confirm_timeout, None);
        assert_eq!(cmd.plan().unwrap(), CREATE3_FACTORY.plan().unwrap());
    }

    #[test]
    fn test_parse_rejects_invalid_url() {
        assert!(Cmd::try_parse_from(["deploy", "--rpc", "not a url"]).is_err());
    }

    #[test]
    fn test_plan_from_raw_tx() {
        let raw_tx = hex::encode_prefixed(CREATE3_FACTORY.raw_transaction);
        let cmd = parse(&["--raw-tx", &raw_tx]);
        let plan = cmd.plan().unwrap();
        assert_eq!(plan.contract_address, CREATE3_FACTORY.contract_address);
    }

    #[test]
    fn test_plan_from_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_record(&dir, &committed_record());

        let plan = parse(&["--deployment", &path]).plan().unwrap();
        assert_eq!(plan.signer, CREATE3_FACTORY.signer);
    }

    #[rstest]
    #[case::signer(|record: &mut DeploymentRecord| record.signer = Address::ZERO)]
    #[case::contract(|record: &mut DeploymentRecord| record.contract_address = Address::ZERO)]
    fn test_tampered_record_is_rejected(#[case] tamper: fn(&mut DeploymentRecord)) {
        let dir = tempfile::tempdir().unwrap();
        let mut record = committed_record();
        tamper(&mut record);
        let path = write_record(&dir, &record);

        let err = parse(&["--deployment", &path]).plan().unwrap_err();
        assert!(matches!(err, Error::Deploy(DeployError::Mismatch { .. })));
    }

    #[test]
    fn test_record_hash_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = committed_record();
        record.transaction_hash = Default::default();
        let path = write_record(&dir, &record);

        let err = parse(&["--deployment", &path]).plan().unwrap_err();
        assert!(matches!(err, Error::Cli(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_expected_contract_mismatch() {
        let other = address!("00000000000000000000000000000000000000aa");
        let cmd = parse(&["--contract", &other.to_string()]);
        assert!(matches!(cmd.plan(), Err(Error::Deploy(DeployError::Mismatch { .. }))));
    }

    #[tokio::test]
    async fn test_deploy_on_mock_ledger() {
        let cmd = parse(&[]);
        let plan = cmd.plan().unwrap();
        let ledger = MockLedger::new()
            .with_balance(CREATE3_FACTORY.signer, U256::from(9_000_000_000_000_000u64));

        let outcome = cmd.deploy_on(ledger, plan).await.unwrap();
        assert!(matches!(outcome, DeploymentOutcome::Deployed { .. }));
    }

    #[tokio::test]
    async fn test_deploy_on_unfunded_ledger() {
        let cmd = parse(&[]);
        let plan = cmd.plan().unwrap();

        let outcome = cmd.deploy_on(MockLedger::new(), plan).await.unwrap();
        assert!(matches!(outcome, DeploymentOutcome::InsufficientFunds { .. }));
    }
}
