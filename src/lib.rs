//! Exploit runner for numbered smart-contract security challenges.

pub mod blockchain;
pub mod challenges;
pub mod config;
pub mod header;
pub mod observability;
pub mod runner;

pub use config::schema::SolverConfig;
pub use header::{reconstruct, HeaderFields, Reconstruction};
pub use runner::Runner;
