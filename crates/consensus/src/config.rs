//! Consensus engine configuration.

use serde::{Deserialize, Serialize};
use xmsg_types::Address;

/// Configuration for the consensus engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Identity the engine uses when calling the governor.
    ///
    /// Must hold the consensus role in the agent manager.
    pub identity: Address,

    /// Destination address of governance messages.
    pub governor_address: Vec<u8>,

    /// Execution code that marks a round change.
    pub round_change_code: u128,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            identity: Address::ZERO,
            governor_address: Vec::new(),
            round_change_code: 1,
        }
    }
}

impl ConsensusConfig {
    pub fn with_identity(mut self, identity: Address) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_governor_address(mut self, governor_address: impl Into<Vec<u8>>) -> Self {
        self.governor_address = governor_address.into();
        self
    }

    pub fn with_round_change_code(mut self, code: u128) -> Self {
        self.round_change_code = code;
        self
    }
}
