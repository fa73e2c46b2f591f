//! Collaborator traits.
//!
//! All traits are object-safe; the consensus engine holds them as
//! `Box<dyn _>` and the governor borrows the agent manager per call.

use crate::{CollaboratorError, Role};
use std::time::Duration;
use xmsg_types::{
    Address, AgentStatus, AgentType, ChainId, Hash, Message, MessageStatus, U256,
};

/// Registry of agents, their roles and their activation state.
pub trait AgentManager: Send + Sync {
    /// Lifecycle status of an agent.
    fn status(&self, agent: &Address) -> AgentStatus;

    /// Authority tier of an agent.
    fn agent_type(&self, agent: &Address) -> AgentType;

    /// Chain the agent is bound to, if any.
    fn agent_chain(&self, agent: &Address) -> Option<ChainId>;

    /// Whether `caller` holds `role`.
    fn has_role(&self, role: Role, caller: &Address) -> bool;

    /// Lowest consensus rate governance may set, in basis points.
    fn min_consensus_rate(&self) -> u64;

    /// Activate (`true`) or pause (`false`) signers in one batch.
    ///
    /// The whole batch is validated before any agent changes.
    fn set_signers_status(
        &mut self,
        signers: &[Address],
        active: &[bool],
    ) -> Result<(), CollaboratorError>;

    /// Activate or pause executors in one batch.
    fn set_executors_status(
        &mut self,
        executors: &[Address],
        active: &[bool],
    ) -> Result<(), CollaboratorError>;

    /// Record the size of the active signer set.
    fn set_total_active_signers(&mut self, total: u64);

    // Derived methods

    /// Check if the agent may sign and vote.
    fn is_active(&self, agent: &Address) -> bool {
        self.status(agent).is_active()
    }

    /// Check if the agent is an active super agent.
    fn is_super(&self, agent: &Address) -> bool {
        self.is_active(agent) && self.agent_type(agent) == AgentType::Super
    }
}

/// Durable message ledger keyed by the prefixed message hash.
pub trait MessageStore: Send + Sync {
    /// Insert a new message. Fails if the hash is already present.
    fn store_message(&mut self, hash: Hash, message: Message) -> Result<(), CollaboratorError>;

    /// Look up a message.
    fn message(&self, hash: &Hash) -> Option<&Message>;

    /// Overwrite the status of a stored message.
    fn change_message_status(
        &mut self,
        hash: &Hash,
        status: MessageStatus,
    ) -> Result<(), CollaboratorError>;

    /// Add to the native amount a stored message delivers.
    fn increment_native_amount(
        &mut self,
        hash: &Hash,
        amount: U256,
    ) -> Result<(), CollaboratorError>;

    /// Status of a message; `NotInitialized` when unknown.
    fn msg_status(&self, hash: &Hash) -> MessageStatus {
        self.message(hash)
            .map(|message| message.status)
            .unwrap_or_default()
    }

    /// Check if a message is stored.
    fn contains(&self, hash: &Hash) -> bool {
        self.message(hash).is_some()
    }
}

/// Time-sliced schedule of executors responsible for each message.
pub trait ExecutorLottery: Send + Sync {
    /// Executors responsible for `hash` at time `now`.
    fn responsible_executors(&self, hash: &Hash, now: Duration) -> Vec<Address>;

    /// Check if `executor` is responsible for `hash` at time `now`.
    fn is_responsible(&self, executor: &Address, hash: &Hash, now: Duration) -> bool {
        self.responsible_executors(hash, now).contains(executor)
    }
}

/// Mapping from chain-specific signing keys to agents.
pub trait KeyStorage: Send + Sync {
    /// The agent that owns `key` on `chain`.
    fn agent_for_key(&self, chain: ChainId, key: &Address) -> Option<Address>;
}

/// Chain metadata.
pub trait ChainInfo: Send + Sync {
    /// Check if the chain is served.
    fn is_supported(&self, chain: ChainId) -> bool;

    /// Native token decimals of a supported chain.
    fn decimals(&self, chain: ChainId) -> Option<u8>;
}

/// Accounting sink for fees added to existing messages.
pub trait BalanceTracker: Send + Sync {
    /// Record a replenishment for a message from `chain`.
    fn record_replenishment(
        &mut self,
        chain: ChainId,
        hash: &Hash,
        amount: U256,
    ) -> Result<(), CollaboratorError>;

    /// Total replenished on `chain` so far.
    fn total_replenished(&self, chain: ChainId) -> U256;
}
