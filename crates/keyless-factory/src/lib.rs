//! Keyless deployment of the CREATE3 factory contract.
//!
//! The factory is deployed with a legacy transaction whose signature `(r, s, v)` is a set of
//! hand-picked constants, not the output of any signing key. Legacy signature recovery is a total
//! function of the transaction fields and the signature, so the "signer" recovered from these
//! constants, and the contract address derived from it, are the same on every chain that accepts
//! the transaction. Nobody holds the private key of that signer. It only needs to be funded.
//!
//! The crate is split along the two phases of a deployment:
//!
//! - [`forge`] builds the transaction offline and derives the signer, contract address and
//!   transaction hash.
//! - [`deploy`] takes the committed raw transaction and drives it onto a live [`Ledger`],
//!   idempotently.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod artifact;
pub use artifact::*;

mod config;
pub use config::*;

pub mod forge;
pub use forge::{forge, ForgeError, ForgedDeployment, KeylessTx, TxDecodeError};

pub mod deploy;
pub use deploy::{DeployError, DeployStage, Deployer, DeploymentOutcome, DeploymentPlan};

mod ledger;
pub use ledger::*;

mod record;
pub use record::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
