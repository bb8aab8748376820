//! Console reporting.

use std::fmt::Write as _;

use alloy_primitives::utils::format_ether;
use keyless_factory::{DeploymentOutcome, DeploymentPlan, ForgedDeployment};

/// Print the values derived by the forger.
pub fn print_forged(forged: &ForgedDeployment) {
    print!("{}", forged_summary(forged));
}

/// Format the values derived by the forger.
pub fn forged_summary(forged: &ForgedDeployment) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Keyless Deployment ===");
    let _ = writeln!(out, "Signer:           {}", forged.signer);
    let _ = writeln!(out, "Contract Address: {}", forged.contract_address);
    let _ = writeln!(out, "Transaction Hash: {}", forged.transaction_hash);
    let _ = writeln!(out, "Recovery Id (v):  {}", forged.v());
    match forged.tx.chain_id {
        Some(chain_id) => {
            let _ = writeln!(out, "Chain Id:         {chain_id} (EIP-155)");
        }
        None => {
            let _ = writeln!(out, "Chain Id:         none (valid on every chain)");
        }
    }
    let _ = writeln!(out, "Raw Transaction:  {}", forged.raw_transaction);
    if forged.used_fallback {
        let _ = writeln!(
            out,
            "Note: the configured recovery id yields no public key, v = {} was used instead",
            forged.v()
        );
    }
    out
}

/// Print what the deployer is about to do.
pub fn print_plan(plan: &DeploymentPlan) {
    let required = plan.required_balance();
    println!();
    println!("=== Deployment Plan ===");
    println!("Signer:           {}", plan.signer);
    println!("Contract Address: {}", plan.contract_address);
    println!("Transaction Hash: {}", plan.transaction_hash);
    println!("Required Balance: {required} wei ({} ether)", format_ether(required));
}

/// Print the in-progress notice once the transaction is being submitted.
pub fn print_deploying() {
    println!("Deploying...");
}

/// Print the outcome of a deployer run.
pub fn print_outcome(outcome: &DeploymentOutcome) {
    print!("{}", outcome_summary(outcome));
}

/// Format the outcome of a deployer run.
pub fn outcome_summary(outcome: &DeploymentOutcome) -> String {
    let mut out = String::new();
    match outcome {
        DeploymentOutcome::AlreadyDeployed { contract_address } => {
            let _ = writeln!(out, "Contract already exists at address: {contract_address}");
        }
        DeploymentOutcome::InsufficientFunds { signer, shortfall, .. } => {
            let _ = writeln!(
                out,
                "Insufficient signer balance. Need {shortfall} more wei or {} ether",
                format_ether(*shortfall)
            );
            let _ = writeln!(
                out,
                "Send the required amount of the chain's native token to {signer}"
            );
        }
        DeploymentOutcome::Deployed { contract_address, tx_hash, block_number, code_size } => {
            let _ = writeln!(out, "Factory contract successfully deployed to {contract_address}");
            let _ = writeln!(out);
            let _ = writeln!(out, "=== Receipt ===");
            let _ = writeln!(out, "Transaction Hash: {tx_hash}");
            if let Some(block_number) = block_number {
                let _ = writeln!(out, "Block Number:     {block_number}");
            }
            let _ = writeln!(out, "Code Size:        {code_size} bytes");
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Search this hash in the chain's block explorer for more transaction details: \
                 {tx_hash}"
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use keyless_factory::constants::CREATE3_FACTORY;

    #[test]
    fn test_insufficient_funds_summary() {
        let outcome = DeploymentOutcome::InsufficientFunds {
            signer: CREATE3_FACTORY.signer,
            balance: U256::from(4_000_000_000_000_000u64),
            required: U256::from(9_000_000_000_000_000u64),
            shortfall: U256::from(5_000_000_000_000_000u64),
        };
        let summary = outcome_summary(&outcome);
        assert!(summary.contains("Need 5000000000000000 more wei or 0.005000000000000000 ether"));
        assert!(summary.contains(&CREATE3_FACTORY.signer.to_string()));
    }

    #[test]
    fn test_deployed_summary() {
        let outcome = DeploymentOutcome::Deployed {
            contract_address: CREATE3_FACTORY.contract_address,
            tx_hash: CREATE3_FACTORY.transaction_hash,
            block_number: Some(7),
            code_size: 93,
        };
        let summary = outcome_summary(&outcome);
        assert!(summary.starts_with(&format!(
            "Factory contract successfully deployed to {}",
            CREATE3_FACTORY.contract_address
        )));
        assert!(summary.contains("Block Number:     7"));
        assert!(summary.contains(&CREATE3_FACTORY.transaction_hash.to_string()));
    }

    #[test]
    fn test_forged_summary() {
        let forged = keyless_factory::forge(
            CREATE3_FACTORY.plan().unwrap().tx.init_code,
            &keyless_factory::DeploymentConfig::CREATE3_FACTORY_V1,
        )
        .unwrap();
        let summary = forged_summary(&forged);
        assert!(summary.contains("Recovery Id (v):  27"));
        assert!(summary.contains("none (valid on every chain)"));
        assert!(!summary.contains("Note:"));
    }
}
