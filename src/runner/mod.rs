//! Challenge runner.
//!
//! # Responsibilities
//! - Select challenges and run them in ascending id order
//! - Skip challenges the chain already reports as solved
//! - Submit each exploit's intent and confirm the result on-chain
//! - Ask the operator what to do after a failure
//!
//! Completion is read from `isSolved(player)`; error messages are never
//! inspected to decide whether a challenge was already done.

pub mod prompt;

use alloy::primitives::Address;
use std::fmt;

use crate::blockchain::{TxBuilder, TxOutcome};
use crate::challenges::{self, ChallengeContext, ChallengeError, ChallengeResult};
use crate::config::{ChallengeConfig, RunnerConfig};

pub use prompt::{Decision, NonInteractive, Prompt, StdinPrompt};

/// Result of running one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// `isSolved` was already true; nothing was sent.
    AlreadySolved,
    /// The exploit transaction confirmed and `isSolved` is now true.
    Solved(TxOutcome),
    /// The challenge could not be completed.
    Failed(String),
}

impl ChallengeOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ChallengeOutcome::Failed(_))
    }
}

/// Outcome of every challenge that was attempted.
#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<(String, ChallengeOutcome)>,
    /// Set when the operator aborted the run.
    pub aborted: bool,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        !self.aborted && self.entries.iter().all(|(_, outcome)| outcome.is_success())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, outcome) in &self.entries {
            match outcome {
                ChallengeOutcome::AlreadySolved => writeln!(f, "{:<24} already solved", label)?,
                ChallengeOutcome::Solved(tx) => {
                    writeln!(f, "{:<24} solved in block {} ({})", label, tx.block_number, tx.tx_hash)?
                }
                ChallengeOutcome::Failed(reason) => writeln!(f, "{:<24} FAILED: {}", label, reason)?,
            }
        }
        if self.aborted {
            writeln!(f, "run aborted by operator")?;
        }
        Ok(())
    }
}

/// Pick the challenges to run: `ids` if given, otherwise all, by ascending id.
pub fn select<'a>(
    challenges: &'a [ChallengeConfig],
    ids: &[u32],
) -> Result<Vec<&'a ChallengeConfig>, u32> {
    if let Some(missing) = ids.iter().find(|id| !challenges.iter().any(|c| c.id == **id)) {
        return Err(*missing);
    }

    let mut selected: Vec<&ChallengeConfig> = challenges
        .iter()
        .filter(|c| ids.is_empty() || ids.contains(&c.id))
        .collect();
    selected.sort_by_key(|c| c.id);
    Ok(selected)
}

/// Runs challenges with one wallet on one network.
pub struct Runner {
    tx: TxBuilder,
    config: RunnerConfig,
}

impl Runner {
    pub fn new(tx: TxBuilder, config: RunnerConfig) -> Self {
        Self { tx, config }
    }

    /// Run `selected` in order, consulting `prompt` after each failure.
    pub async fn run_all(
        &self,
        selected: &[&ChallengeConfig],
        prompt: &mut dyn Prompt,
    ) -> RunReport {
        let mut report = RunReport::default();

        for challenge in selected {
            let label = challenge.label();
            loop {
                let outcome = match self.run_one(challenge).await {
                    Ok(outcome) => outcome,
                    Err(e) => ChallengeOutcome::Failed(e.to_string()),
                };

                let decision = match &outcome {
                    ChallengeOutcome::AlreadySolved => {
                        tracing::info!(challenge = %label, "Already solved, skipping");
                        Decision::Continue
                    }
                    ChallengeOutcome::Solved(tx) => {
                        tracing::info!(challenge = %label, tx_hash = %tx.tx_hash, block = tx.block_number, "Solved");
                        Decision::Continue
                    }
                    ChallengeOutcome::Failed(reason) => {
                        tracing::error!(challenge = %label, error = %reason, "Challenge failed");
                        prompt.decide(&label, reason)
                    }
                };

                match decision {
                    Decision::Retry => continue,
                    Decision::Continue => {
                        report.entries.push((label, outcome));
                        break;
                    }
                    Decision::Abort => {
                        report.entries.push((label, outcome));
                        report.aborted = true;
                        return report;
                    }
                }
            }
        }

        report
    }

    /// Run a single challenge end to end.
    pub async fn run_one(&self, challenge: &ChallengeConfig) -> ChallengeResult<ChallengeOutcome> {
        let target: Address = challenge
            .address
            .parse()
            .map_err(|_| ChallengeError::Address(challenge.address.clone()))?;
        let ctx = ChallengeContext {
            tx: &self.tx,
            target,
            confirmation_timeout_secs: self.config.confirmation_timeout_secs,
        };
        let player = self.tx.address();

        if challenges::is_solved(&ctx, player).await? {
            return Ok(ChallengeOutcome::AlreadySolved);
        }

        tracing::info!(challenge = %challenge.label(), contract = %target, "Running exploit");
        let intent = challenges::exploit(&challenge.exploit, &ctx).await?;
        let tx = ctx.submit(&intent).await?;

        if challenges::is_solved(&ctx, player).await? {
            Ok(ChallengeOutcome::Solved(tx))
        } else {
            Ok(ChallengeOutcome::Failed(format!(
                "transaction {} confirmed but challenge is not solved",
                tx.tx_hash
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExploitConfig;
    use alloy::primitives::TxHash;

    fn challenge(id: u32) -> ChallengeConfig {
        ChallengeConfig {
            id,
            name: String::new(),
            address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            exploit: ExploitConfig::Signature,
        }
    }

    #[test]
    fn test_select_orders_by_id() {
        let all = vec![challenge(3), challenge(1), challenge(2)];
        let ids: Vec<u32> = select(&all, &[]).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let ids: Vec<u32> = select(&all, &[3, 1]).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_select_unknown_id() {
        let all = vec![challenge(1)];
        assert_eq!(select(&all, &[1, 9]).unwrap_err(), 9);
    }

    #[test]
    fn test_report() {
        let mut report = RunReport::default();
        report.entries.push(("#1 storage".into(), ChallengeOutcome::AlreadySolved));
        report.entries.push((
            "#2 reentrancy".into(),
            ChallengeOutcome::Solved(TxOutcome {
                tx_hash: TxHash::ZERO,
                block_number: 12,
                contract_address: None,
            }),
        ));
        assert!(report.all_succeeded());

        report.entries.push(("#3 signature".into(), ChallengeOutcome::Failed("reverted".into())));
        assert!(!report.all_succeeded());

        let text = report.to_string();
        assert!(text.contains("already solved"));
        assert!(text.contains("solved in block 12"));
        assert!(text.contains("FAILED: reverted"));
    }

    #[test]
    fn test_aborted_report_fails() {
        let report = RunReport {
            entries: Vec::new(),
            aborted: true,
        };
        assert!(!report.all_succeeded());
    }
}
