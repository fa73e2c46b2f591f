//! Delivery attempt history.

use crate::{Address, Hash, U256};
use std::time::Duration;

/// One executor taking a message into in-flight execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionAttempt {
    /// When the attempt was recorded.
    pub time_saved: Duration,
    /// Executor that picked the message up.
    pub executor: Address,
    /// Destination-chain transaction fingerprint.
    pub execution_hash: [Hash; 2],
}

/// Append-only delivery history of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageExecutionData {
    pub total_tries: u64,
    pub resend_attempts: u64,
    /// Extra fee amounts added after the message was saved.
    pub replenishments: Vec<U256>,
    pub try_executes: Vec<ExecutionAttempt>,
}

impl MessageExecutionData {
    /// Whether an attempt with this destination fingerprint was already recorded.
    pub fn has_attempt(&self, execution_hash: &[Hash; 2]) -> bool {
        self.try_executes
            .iter()
            .any(|attempt| &attempt.execution_hash == execution_hash)
    }

    /// Append an attempt and count it.
    pub fn record_attempt(&mut self, attempt: ExecutionAttempt) {
        self.total_tries += 1;
        self.try_executes.push(attempt);
    }

    /// Sum of all replenishments, saturating at `U256::MAX`.
    pub fn total_replenished(&self) -> U256 {
        self.replenishments
            .iter()
            .fold(U256::ZERO, |acc, amount| acc.saturating_add(*amount))
    }
}
