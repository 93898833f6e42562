pub mod client;
pub mod error;
pub mod types;

pub use client::{ExplorerApi, TronscanClient};
pub use error::TronscanError;
pub use types::*;
