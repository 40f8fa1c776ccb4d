//! mobility-cache - Memoization engine for derived pipeline datasets
//!
//! Builds each dataset at most once per distinct input configuration,
//! chaining fingerprints through the dependency graph so upstream changes
//! invalidate everything downstream.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;

pub use cache::{Asset, CacheLocation, Fingerprint, InputValue, Node, NodeSpec, NodeState};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, CacheResult};
