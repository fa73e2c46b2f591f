//! Capabilities checked at the call boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission a caller must hold for a privileged operation.
///
/// Role membership is owned by the [`AgentManager`](crate::AgentManager);
/// operations receive the caller identity explicitly and ask it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Wires collaborators and grows the origin allow-list.
    Admin,
    /// Submits signatures and pending transaction records.
    Relayer,
    /// Adds fees to and re-queues existing messages.
    Endpoint,
    /// The consensus engine itself; the only caller of round changes.
    Consensus,
}

impl Role {
    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Relayer => "relayer",
            Role::Endpoint => "endpoint",
            Role::Consensus => "consensus",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
