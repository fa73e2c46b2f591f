//! Round parameters and quorum arithmetic.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Consensus rates are expressed in basis points of this denominator.
pub const RATE_DENOMINATOR: u64 = 10_000;

/// Parameters fixed for the lifetime of one governance round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    /// Time the round took effect.
    pub changed_at: Duration,
    /// Required approval share, in basis points.
    pub consensus_rate: u64,
    /// Size of the active signer set.
    pub active_signers_len: u64,
}

impl RoundData {
    /// Distinct votes needed to finalize a status in this round.
    pub fn required_confirmations(&self) -> u64 {
        required_confirmations(self.active_signers_len, self.consensus_rate)
    }
}

/// `max(1, ceil(active_signers_len * consensus_rate / RATE_DENOMINATOR))`.
///
/// Rounds up so a rate just above a fraction demands the stricter count.
/// Never returns zero, so an empty signer set still needs one vote.
pub fn required_confirmations(active_signers_len: u64, consensus_rate: u64) -> u64 {
    let product = u128::from(active_signers_len) * u128::from(consensus_rate);
    let denominator = u128::from(RATE_DENOMINATOR);
    let required = product.div_ceil(denominator);
    u64::try_from(required).unwrap_or(u64::MAX).max(1)
}
