//! Forging of the keyless deployment transaction.
//!
//! Everything here is offline: the command reads the init code and the deployment constants,
//! and prints the values to review and commit before any funds are sent.

mod cmd;

pub use cmd::*;
