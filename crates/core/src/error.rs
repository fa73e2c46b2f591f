//! Errors reported by collaborators.

use xmsg_types::{Address, Hash};

/// Failure inside an injected collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The agent is not registered.
    #[error("Unknown agent: {0}")]
    UnknownAgent(Address),

    /// A message with this hash is already in the ledger.
    #[error("Message already stored: {0}")]
    MessageAlreadyStored(Hash),

    /// No message with this hash is in the ledger.
    #[error("Message not found: {0}")]
    MessageNotFound(Hash),

    /// Parallel batch inputs differ in length.
    #[error("Length mismatch: {left} addresses, {right} flags")]
    LengthMismatch { left: usize, right: usize },

    /// Adding to a native amount would exceed 256 bits.
    #[error("Native amount overflow for {0}")]
    AmountOverflow(Hash),
}
