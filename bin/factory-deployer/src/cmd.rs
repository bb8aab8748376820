use clap::{Parser, Subcommand};

use crate::common::{CliError, LogArgs};

/// Keyless deployment of the CREATE3 factory.
#[derive(Parser, Debug)]
#[command(name = "factory-deployer", infer_subcommands = true, version)]
pub struct MainCmd {
    /// Logging configuration
    #[command(flatten)]
    pub log: LogArgs,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the factory deployer.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Forge the keyless deployment transaction and derive its addresses
    Forge(crate::forge::Cmd),
    /// Broadcast the keyless deployment transaction to a node
    Deploy(crate::deploy::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Forging failed
    #[error("{0}")]
    Forge(#[from] keyless_factory::ForgeError),
    /// Deployment failed
    #[error("{0}")]
    Deploy(#[from] keyless_factory::DeployError),
    /// Invalid command line input
    #[error("{0}")]
    Cli(#[from] CliError),
}

impl MainCmd {
    /// Execute the main command
    pub async fn run(&self) -> Result<(), Error> {
        self.log.init()?;
        match &self.command {
            Command::Forge(cmd) => cmd.run(),
            Command::Deploy(cmd) => cmd.run().await,
        }
    }
}
