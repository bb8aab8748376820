//! Test utilities for keyless deployments.

mod ledger;

pub use ledger::*;
