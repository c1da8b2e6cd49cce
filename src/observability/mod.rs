//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (block, tx_hash, challenge)
//!
//! Consumers:
//!     → logging.rs (fmt layer on stderr, filtered by RUST_LOG or config)
//! ```
//!
//! Private keys never reach a log line.

pub mod logging;
