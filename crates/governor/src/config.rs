//! Governor configuration.

use serde::{Deserialize, Serialize};

/// Parameters of the genesis round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Consensus rate of round 1, in basis points.
    pub initial_consensus_rate: u64,

    /// Active signer count of round 1.
    pub initial_active_signers: u64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            initial_consensus_rate: 6_000,
            initial_active_signers: 0,
        }
    }
}

impl GovernorConfig {
    /// Set the genesis consensus rate.
    pub fn with_initial_consensus_rate(mut self, rate: u64) -> Self {
        self.initial_consensus_rate = rate;
        self
    }

    /// Set the genesis active signer count.
    pub fn with_initial_active_signers(mut self, count: u64) -> Self {
        self.initial_active_signers = count;
        self
    }
}
