//! Agent classification as reported by the agent-management collaborator.

use serde::{Deserialize, Serialize};

/// Authority tier of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    /// Votes count toward the quorum.
    #[default]
    Default,
    /// A single vote finalizes a status.
    Super,
}

/// Lifecycle status of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    /// Unknown to the agent manager.
    #[default]
    Unregistered,
    /// Allowed to sign and vote.
    Active,
    /// Temporarily disabled by governance.
    Paused,
    /// Permanently removed from the set.
    Dropped,
}

impl AgentStatus {
    /// Whether the agent may sign and vote.
    pub fn is_active(self) -> bool {
        matches!(self, AgentStatus::Active)
    }
}
