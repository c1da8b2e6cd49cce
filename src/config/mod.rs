//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! solver.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SolverConfig (validated, immutable)
//!     → network profile picked by --local
//! ```
//!
//! All fields have defaults so a config only needs its challenge list.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::BlockchainConfig;
pub use schema::ChallengeConfig;
pub use schema::ExploitConfig;
pub use schema::RunnerConfig;
pub use schema::SolverConfig;
