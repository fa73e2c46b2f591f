//! Replenishment accounting.

use std::collections::HashMap;
use tracing::trace;
use xmsg_core::{BalanceTracker, CollaboratorError};
use xmsg_types::{ChainId, Hash, U256};

/// Keeps every replenishment in arrival order plus a running total per chain.
#[derive(Debug, Clone, Default)]
pub struct RecordingBalanceTracker {
    records: Vec<(ChainId, Hash, U256)>,
    totals: HashMap<ChainId, U256>,
}

impl RecordingBalanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// All replenishments in arrival order.
    pub fn records(&self) -> &[(ChainId, Hash, U256)] {
        &self.records
    }
}

impl BalanceTracker for RecordingBalanceTracker {
    fn record_replenishment(
        &mut self,
        chain: ChainId,
        hash: &Hash,
        amount: U256,
    ) -> Result<(), CollaboratorError> {
        let total = self
            .total_replenished(chain)
            .checked_add(amount)
            .ok_or(CollaboratorError::AmountOverflow(*hash))?;
        self.totals.insert(chain, total);
        self.records.push((chain, *hash, amount));
        trace!(chain = chain.0, hash = %hash, total = %total, "Replenishment recorded");
        Ok(())
    }

    fn total_replenished(&self, chain: ChainId) -> U256 {
        self.totals.get(&chain).copied().unwrap_or(U256::ZERO)
    }
}
