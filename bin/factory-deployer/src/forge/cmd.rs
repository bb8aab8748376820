use std::path::PathBuf;

use alloy_primitives::Bytes;
use clap::Parser;
use keyless_factory::{
    constants::CREATE3_FACTORY_ARTIFACT, BytecodeArtifact, DeploymentConfig, ForgedDeployment,
};
use tracing::{info, warn};

use crate::{
    common::{load_hex, print_forged, CliError},
    Error,
};

/// Forge the keyless deployment transaction
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Compiler artifact with a `bytecode` field. Defaults to the bundled CREATE3 factory
    #[arg(long, value_name = "PATH", conflicts_with_all = ["bytecode", "bytecode_file"])]
    pub artifact: Option<PathBuf>,

    /// Init code as hex
    #[arg(long, value_name = "HEX", conflicts_with = "bytecode_file")]
    pub bytecode: Option<String>,

    /// File containing the init code as hex; `-` reads stdin
    #[arg(long = "bytecode-file", value_name = "PATH")]
    pub bytecode_file: Option<String>,

    /// Deployment constants as JSON. Defaults to the v1 CREATE3 factory constants
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Bind the transaction to a chain (EIP-155). The signer and contract address then differ
    /// per chain
    #[arg(long = "chain-id", value_name = "ID")]
    pub chain_id: Option<u64>,

    /// Write the deployment record to this file as JSON
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl Cmd {
    /// Execute the forge command
    pub fn run(&self) -> Result<(), Error> {
        let config = self.load_config()?;
        let forged = self.forge(&config)?;
        print_forged(&forged);

        if let Some(path) = &self.output {
            let record = forged.to_record(config.version);
            let json = serde_json::to_string_pretty(&record).map_err(CliError::InvalidRecord)?;
            std::fs::write(path, json + "\n")
                .map_err(|source| CliError::FileWrite { path: path.clone(), source })?;
            println!("Deployment record written to: {}", path.display());
        }
        Ok(())
    }

    /// Forge the deployment of the selected init code under `config`.
    pub fn forge(&self, config: &DeploymentConfig) -> Result<ForgedDeployment, Error> {
        Ok(keyless_factory::forge(self.load_init_code()?, config)?)
    }

    /// Load the deployment constants, applying the chain id override.
    pub fn load_config(&self) -> Result<DeploymentConfig, Error> {
        let config = match &self.config {
            Some(path) => DeploymentConfig::from_json_file(path)?,
            None => DeploymentConfig::default(),
        };
        Ok(match self.chain_id {
            Some(chain_id) => {
                warn!(chain_id, "Binding the deployment to a chain, addresses are chain-specific");
                config.with_chain_id(chain_id)
            }
            None => config,
        })
    }

    /// Load the init code from the command line, an artifact, or the bundled artifact.
    pub fn load_init_code(&self) -> Result<Bytes, Error> {
        if let Some(init_code) = load_hex(self.bytecode.as_deref(), self.bytecode_file.as_deref())?
        {
            return Ok(init_code);
        }

        let artifact = match &self.artifact {
            Some(path) => BytecodeArtifact::from_file(path)?,
            None => BytecodeArtifact::from_json(CREATE3_FACTORY_ARTIFACT)?,
        };
        info!(contract = ?artifact.contract_name, "Loaded artifact");
        Ok(artifact.init_code()?)
    }
}
