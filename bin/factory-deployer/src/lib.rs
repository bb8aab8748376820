//! Command line interface for the keyless CREATE3 factory deployment.
//!
//! Two subcommands mirror the two phases of a deployment:
//!
//! - `forge` builds the keyless transaction offline and prints the values to commit.
//! - `deploy` broadcasts a committed transaction to a node, idempotently.

mod cmd;
pub use cmd::*;

/// Shared helpers: errors, logging, hex input, console output.
pub mod common;

/// The `deploy` subcommand.
pub mod deploy;

/// The `forge` subcommand.
pub mod forge;
