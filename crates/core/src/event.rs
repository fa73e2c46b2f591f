//! Observable events.

use std::time::Duration;
use xmsg_types::{Address, ChainId, Hash, MessageStatus, Round, SignaturePhase, U256};

/// How a status change was authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    /// A single super agent finalized it.
    Super(Address),
    /// Default agents reached the round threshold.
    Quorum { confirmations: u64 },
    /// The protocol moved it as a side effect of another operation
    /// (signature threshold, pending execution, governance).
    Protocol,
}

/// Something a state-changing operation did.
///
/// Operations return their events in the order they happened. The host
/// decides whether to log, index or forward them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Message lifecycle
    // ═══════════════════════════════════════════════════════════════════════
    /// First accepted transmission signature stored the message.
    MessageProposed {
        hash: Hash,
        global_nonce: u64,
        proposer: Address,
    },

    /// A signature was appended to one of the two phases.
    SignatureAdded {
        hash: Hash,
        phase: SignaturePhase,
        signer: Address,
        count: usize,
    },

    /// A default agent voted for a target status.
    StatusVoted {
        hash: Hash,
        status: MessageStatus,
        voter: Address,
        confirmations: u64,
        required: u64,
    },

    /// The stored status changed.
    StatusChanged {
        hash: Hash,
        from: MessageStatus,
        to: MessageStatus,
        approval: Approval,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Delivery bookkeeping
    // ═══════════════════════════════════════════════════════════════════════
    /// An executor took the message into execution.
    ExecutionAttemptRecorded {
        hash: Hash,
        executor: Address,
        execution_hash: [Hash; 2],
        time_saved: Duration,
    },

    /// Fee added to an existing message.
    Replenished {
        chain: ChainId,
        hash: Hash,
        amount: U256,
    },

    /// Another delivery try was requested.
    ResendRequested {
        chain: ChainId,
        hash: Hash,
        attempts: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Governance
    // ═══════════════════════════════════════════════════════════════════════
    /// A new round took effect.
    NewRound {
        round: Round,
        consensus_rate: u64,
        active_signers_len: u64,
    },

    /// An origin joined the governance allow-list.
    OriginAdded {
        chain: ChainId,
        contract: Vec<u8>,
        key: Hash,
    },
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::MessageProposed { .. } => "MessageProposed",
            Event::SignatureAdded { .. } => "SignatureAdded",
            Event::StatusVoted { .. } => "StatusVoted",
            Event::StatusChanged { .. } => "StatusChanged",
            Event::ExecutionAttemptRecorded { .. } => "ExecutionAttemptRecorded",
            Event::Replenished { .. } => "Replenished",
            Event::ResendRequested { .. } => "ResendRequested",
            Event::NewRound { .. } => "NewRound",
            Event::OriginAdded { .. } => "OriginAdded",
        }
    }

    /// The message this event concerns, if any.
    pub fn message_hash(&self) -> Option<Hash> {
        match self {
            Event::MessageProposed { hash, .. }
            | Event::SignatureAdded { hash, .. }
            | Event::StatusVoted { hash, .. }
            | Event::StatusChanged { hash, .. }
            | Event::ExecutionAttemptRecorded { hash, .. }
            | Event::Replenished { hash, .. }
            | Event::ResendRequested { hash, .. } => Some(*hash),
            Event::NewRound { .. } | Event::OriginAdded { .. } => None,
        }
    }

    /// Check if this is a message lifecycle event.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Event::MessageProposed { .. }
                | Event::SignatureAdded { .. }
                | Event::StatusVoted { .. }
                | Event::StatusChanged { .. }
        )
    }

    /// Check if this is a delivery bookkeeping event.
    pub fn is_delivery(&self) -> bool {
        matches!(
            self,
            Event::ExecutionAttemptRecorded { .. }
                | Event::Replenished { .. }
                | Event::ResendRequested { .. }
        )
    }

    /// Check if this is a governance event.
    pub fn is_governance(&self) -> bool {
        matches!(self, Event::NewRound { .. } | Event::OriginAdded { .. })
    }
}
