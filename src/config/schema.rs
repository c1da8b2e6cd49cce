//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the solver.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the solver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SolverConfig {
    /// Remote network profile (the default).
    pub network: BlockchainConfig,

    /// Local network profile, selected with `--local`.
    pub local: BlockchainConfig,

    /// Runner behaviour.
    pub runner: RunnerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Challenge definitions.
    pub challenges: Vec<ChallengeConfig>,
}

impl SolverConfig {
    /// Network profile for this run.
    pub fn profile(&self, local: bool) -> &BlockchainConfig {
        if local {
            &self.local
        } else {
            &self.network
        }
    }
}

/// Blockchain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Environment variable holding the player's private key.
    pub private_key_env: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u32,

    /// Gas price multiplier (1.0 = estimated, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Gas limit multiplier applied to `eth_estimateGas`.
    pub gas_limit_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            private_key_env: "SOLVER_PRIVATE_KEY".to_string(),
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            gas_price_multiplier: 1.2,
            gas_limit_multiplier: 1.3,
            max_gas_price_gwei: 500,
        }
    }
}

/// Runner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Ask before retrying or skipping a failed challenge.
    pub interactive: bool,

    /// Maximum time to wait for a transaction receipt.
    pub confirmation_timeout_secs: u64,

    /// Poll interval while waiting for receipts or new blocks.
    pub poll_interval_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// A numbered challenge and how to exploit it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChallengeConfig {
    /// Challenge number; challenges run in ascending order.
    pub id: u32,

    /// Display name for logs.
    #[serde(default)]
    pub name: String,

    /// Target contract address.
    pub address: String,

    /// Exploit parameters.
    pub exploit: ExploitConfig,
}

impl ChallengeConfig {
    /// Name for logs, falling back to the exploit kind.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("#{} {}", self.id, self.exploit.kind())
        } else {
            format!("#{} {}", self.id, self.name)
        }
    }
}

/// Exploit parameters, tagged by `kind`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExploitConfig {
    /// Read a private storage slot and unlock the target with it.
    Storage { slot: u64 },

    /// Deploy an attacker that re-enters the target's withdrawal.
    Reentrancy {
        artifact: PathBuf,
        /// Deposit sent with `attack()`, in wei.
        #[serde(default = "default_deposit_wei")]
        deposit_wei: u64,
    },

    /// Call the target from a constructor, while the caller has no code.
    CodeSize { artifact: PathBuf },

    /// Replay the target's consumed signature in its malleable form.
    Signature,

    /// Grind a CREATE2 salt for an address with a given hex prefix.
    Create2 {
        artifact: PathBuf,
        prefix: String,
        #[serde(default = "default_max_salts")]
        max_salts: u64,
    },

    /// Prove knowledge of a recent block header.
    BlockHeader {
        /// Blocks to try, walking back from the head, before giving up.
        #[serde(default = "default_block_attempts")]
        block_attempts: u64,
    },
}

impl ExploitConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ExploitConfig::Storage { .. } => "storage",
            ExploitConfig::Reentrancy { .. } => "reentrancy",
            ExploitConfig::CodeSize { .. } => "code_size",
            ExploitConfig::Signature => "signature",
            ExploitConfig::Create2 { .. } => "create2",
            ExploitConfig::BlockHeader { .. } => "block_header",
        }
    }
}

fn default_deposit_wei() -> u64 {
    1_000_000_000_000_000
}

fn default_max_salts() -> u64 {
    4096
}

fn default_block_attempts() -> u64 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert!(config.challenges.is_empty());
        assert_eq!(config.network.rpc_timeout_secs, 10);
        assert!(config.runner.interactive);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_parse_challenges() {
        let config: SolverConfig = toml::from_str(
            r#"
            [local]
            rpc_url = "http://127.0.0.1:8545"
            private_key_env = "LOCAL_KEY"

            [[challenges]]
            id = 2
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            exploit = { kind = "storage", slot = 3 }

            [[challenges]]
            id = 5
            name = "vanity"
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            [challenges.exploit]
            kind = "create2"
            artifact = "out/Vanity.json"
            prefix = "0xba"
            "#,
        )
        .unwrap();

        assert_eq!(config.profile(true).private_key_env, "LOCAL_KEY");
        assert_eq!(config.profile(false).private_key_env, "SOLVER_PRIVATE_KEY");
        assert!(matches!(config.challenges[0].exploit, ExploitConfig::Storage { slot: 3 }));
        match &config.challenges[1].exploit {
            ExploitConfig::Create2 { prefix, max_salts, .. } => {
                assert_eq!(prefix, "0xba");
                assert_eq!(*max_salts, 4096);
            }
            other => panic!("unexpected exploit {:?}", other),
        }
        assert_eq!(config.challenges[0].label(), "#2 storage");
        assert_eq!(config.challenges[1].label(), "#5 vanity");
    }

    #[test]
    fn test_unit_variant_exploit() {
        let config: SolverConfig = toml::from_str(
            r#"
            [[challenges]]
            id = 4
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            exploit = { kind = "signature" }
            "#,
        )
        .unwrap();
        assert!(matches!(config.challenges[0].exploit, ExploitConfig::Signature));
    }
}
