//! Shared data contracts for the site planner: incoming shard envelopes,
//! planning requests, planning results and their wire shapes.

mod planning;
mod shard;
mod wire;

pub use planning::*;
pub use shard::*;
pub use wire::*;

/// Shared error type for contract validation routines.
#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("assertion failed: {0}")]
    AssertionFailed(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Lightweight semantic validation on top of schema-compatible
/// deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), ContractError>;
}
