//! Consensus errors.

use xmsg_core::{CollaboratorError, Role};
use xmsg_governor::GovernorError;
use xmsg_types::{
    Address, ChainId, CodecError, CryptoError, EncodingError, Hash, MessageStatus,
};

/// Why an operation was rejected. A rejected operation changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    /// The caller lacks the required role.
    #[error("Caller {caller} lacks the {role} role")]
    Unauthorized { caller: Address, role: Role },

    /// The agent is not active.
    #[error("Agent {0} is not active")]
    InactiveAgent(Address),

    /// The recovered signer is not an active agent.
    #[error("Unauthorized signer: {0}")]
    UnauthorizedSigner(Address),

    /// The signer already signed this message in this phase.
    #[error("Duplicate signature from {signer} on {hash}")]
    DuplicateSignature { hash: Hash, signer: Address },

    /// The agent already voted for this status on this message.
    #[error("Duplicate vote from {agent} for {status:?} on {hash}")]
    DuplicateVote {
        hash: Hash,
        status: MessageStatus,
        agent: Address,
    },

    /// The status machine forbids the transition.
    #[error("Invalid transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: MessageStatus,
        to: MessageStatus,
    },

    /// No message with this hash is stored.
    #[error("Message not found: {0}")]
    MessageNotFound(Hash),

    /// The message reached a terminal status.
    #[error("Message {hash} is final ({status:?})")]
    MessageFinalized { hash: Hash, status: MessageStatus },

    /// The chain does not match the one on record.
    #[error("Chain mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: ChainId, actual: ChainId },

    /// The chain is not served.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(ChainId),

    /// Replenishing zero.
    #[error("Amount must be non-zero")]
    ZeroAmount,

    /// An attempt with this destination fingerprint is already recorded.
    #[error("Duplicate execution attempt for {0}")]
    DuplicateExecutionAttempt(Hash),

    /// The lottery did not assign this executor at the current time.
    #[error("Executor {executor} not responsible for {hash}")]
    ExecutorNotResponsible { executor: Address, hash: Hash },

    /// The message is not a round change for the configured governor.
    #[error("Not a governance message: {0}")]
    NotGovernanceMessage(Hash),

    /// The message status is outside the executor zone.
    #[error("Message {hash} not ready for execution ({status:?})")]
    NotReadyForExecution { hash: Hash, status: MessageStatus },

    /// Transmission signatures never reached the threshold.
    #[error("Transmission consensus not reached for {0}")]
    TransmissionConsensusNotReached(Hash),

    /// Signature recovery failed.
    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Malformed input: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("Governance rejected: {0}")]
    Governance(#[from] GovernorError),
}
