//! Broadcasting of a committed keyless deployment transaction.

mod cmd;

pub use cmd::*;
