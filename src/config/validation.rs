//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every address and RPC URL parses
//! - Validate value ranges (timeouts > 0, multipliers >= 1)
//! - Detect duplicate challenge ids
//!
//! Returns all validation errors, not just the first.

use alloy::primitives::Address;
use std::collections::HashSet;
use std::fmt;
use url::Url;

use crate::config::schema::{BlockchainConfig, ExploitConfig, SolverConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending setting.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SolverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_network("network", &config.network, &mut errors);
    validate_network("local", &config.local, &mut errors);

    if config.runner.poll_interval_ms == 0 {
        errors.push(ValidationError::new("runner.poll_interval_ms", "must be > 0"));
    }
    if config.runner.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "runner.confirmation_timeout_secs",
            "must be > 0",
        ));
    }

    let mut seen = HashSet::new();
    for (i, challenge) in config.challenges.iter().enumerate() {
        let path = format!("challenges[{}]", i);
        if !seen.insert(challenge.id) {
            errors.push(ValidationError::new(
                format!("{}.id", path),
                format!("duplicate challenge id {}", challenge.id),
            ));
        }
        if challenge.address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                format!("{}.address", path),
                format!("invalid address '{}'", challenge.address),
            ));
        }
        validate_exploit(&format!("{}.exploit", path), &challenge.exploit, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Only http(s) endpoints are accepted; the client speaks JSON-RPC over HTTP.
pub fn validate_rpc_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid RPC URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!("unsupported RPC URL scheme '{}'", scheme)),
    }
}

fn validate_network(path: &str, network: &BlockchainConfig, errors: &mut Vec<ValidationError>) {
    if let Err(e) = validate_rpc_url(&network.rpc_url) {
        errors.push(ValidationError::new(format!("{}.rpc_url", path), e));
    }
    for (i, url) in network.failover_urls.iter().enumerate() {
        if let Err(e) = validate_rpc_url(url) {
            errors.push(ValidationError::new(format!("{}.failover_urls[{}]", path, i), e));
        }
    }
    if network.private_key_env.is_empty() {
        errors.push(ValidationError::new(
            format!("{}.private_key_env", path),
            "must name an environment variable",
        ));
    }
    if network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(format!("{}.rpc_timeout_secs", path), "must be > 0"));
    }
    if network.gas_price_multiplier < 1.0 {
        errors.push(ValidationError::new(
            format!("{}.gas_price_multiplier", path),
            "must be >= 1.0",
        ));
    }
    if network.gas_limit_multiplier < 1.0 {
        errors.push(ValidationError::new(
            format!("{}.gas_limit_multiplier", path),
            "must be >= 1.0",
        ));
    }
}

fn validate_exploit(path: &str, exploit: &ExploitConfig, errors: &mut Vec<ValidationError>) {
    match exploit {
        ExploitConfig::Reentrancy { artifact, .. }
        | ExploitConfig::CodeSize { artifact } => {
            if artifact.as_os_str().is_empty() {
                errors.push(ValidationError::new(format!("{}.artifact", path), "must not be empty"));
            }
        }
        ExploitConfig::Create2 { artifact, prefix, max_salts } => {
            if artifact.as_os_str().is_empty() {
                errors.push(ValidationError::new(format!("{}.artifact", path), "must not be empty"));
            }
            let digits = prefix.strip_prefix("0x").unwrap_or(prefix);
            if digits.is_empty() || digits.len() > 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                errors.push(ValidationError::new(
                    format!("{}.prefix", path),
                    format!("'{}' is not a hex address prefix", prefix),
                ));
            }
            if *max_salts == 0 {
                errors.push(ValidationError::new(format!("{}.max_salts", path), "must be > 0"));
            }
        }
        ExploitConfig::BlockHeader { block_attempts } => {
            if *block_attempts == 0 {
                errors.push(ValidationError::new(
                    format!("{}.block_attempts", path),
                    "must be > 0",
                ));
            }
        }
        ExploitConfig::Storage { .. } | ExploitConfig::Signature => {}
    }
}
