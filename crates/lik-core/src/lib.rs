//! Shared types for the tempered-likelihood sweep driver.

pub mod config;
pub mod errors;
pub mod hash;

pub use config::{DirtyLik, Likelihood, RunConfig, WandbMode};
pub use errors::{ErrorInfo, LikError};
pub use hash::{stable_hash_string, to_canonical_json_bytes};
