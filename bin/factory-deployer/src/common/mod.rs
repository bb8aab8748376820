mod error;
mod hex;
mod logging;
mod output;

pub use error::*;
pub use hex::*;
pub use logging::*;
pub use output::*;
