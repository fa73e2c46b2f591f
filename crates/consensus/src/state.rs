//! Consensus engine state, collaborator wiring and read-only projections.

use crate::{ConsensusConfig, ConsensusError, MessageConsensusData, MessageStatusData};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use xmsg_core::{
    AgentManager, BalanceTracker, ChainInfo, Event, ExecutorLottery, KeyStorage, MessageStore,
    Role,
};
use xmsg_governor::RoundGovernor;
use xmsg_types::codec::signature as signature_codec;
use xmsg_types::{
    recover_address, Address, ChainId, ExecutionAttempt, Hash, Message, MessageExecutionData,
    MessageStatus, Signature, SignaturePhase,
};

/// The consensus engine.
///
/// Owns the per-message signature and vote records, the delivery history
/// and the round governor. Reaches everything else through injected
/// collaborators. Single-threaded and deterministic: time only advances
/// through [`set_time`](Self::set_time).
pub struct ConsensusCore {
    pub(crate) config: ConsensusConfig,
    pub(crate) governor: RoundGovernor,

    pub(crate) agents: Box<dyn AgentManager>,
    pub(crate) store: Box<dyn MessageStore>,
    pub(crate) lottery: Option<Box<dyn ExecutorLottery>>,
    pub(crate) key_storage: Option<Box<dyn KeyStorage>>,
    pub(crate) chain_info: Option<Box<dyn ChainInfo>>,
    pub(crate) balance_tracker: Option<Box<dyn BalanceTracker>>,

    /// Signature and vote records, keyed by prefixed message hash.
    pub(crate) consensus: HashMap<Hash, MessageConsensusData>,

    /// Delivery history, keyed by prefixed message hash.
    pub(crate) execution: HashMap<Hash, MessageExecutionData>,

    pub(crate) next_global_nonce: u64,
    pub(crate) now: Duration,
}

impl ConsensusCore {
    /// Create an engine with the two mandatory collaborators.
    pub fn new(
        config: ConsensusConfig,
        governor: RoundGovernor,
        agents: Box<dyn AgentManager>,
        store: Box<dyn MessageStore>,
    ) -> Self {
        Self {
            config,
            governor,
            agents,
            store,
            lottery: None,
            key_storage: None,
            chain_info: None,
            balance_tracker: None,
            consensus: HashMap::new(),
            execution: HashMap::new(),
            next_global_nonce: 1,
            now: Duration::ZERO,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Time
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the current time.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Get the current time.
    pub fn now(&self) -> Duration {
        self.now
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Collaborator wiring (admin only)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Replace the agent manager. Authorized by the current one.
    pub fn set_agent_manager(
        &mut self,
        caller: &Address,
        agents: Box<dyn AgentManager>,
    ) -> Result<(), ConsensusError> {
        self.require_role(Role::Admin, caller)?;
        self.agents = agents;
        info!(caller = %caller, "Agent manager replaced");
        Ok(())
    }

    /// Replace the message ledger.
    pub fn set_message_data(
        &mut self,
        caller: &Address,
        store: Box<dyn MessageStore>,
    ) -> Result<(), ConsensusError> {
        self.require_role(Role::Admin, caller)?;
        self.store = store;
        info!(caller = %caller, "Message store replaced");
        Ok(())
    }

    pub fn set_executor_lottery(
        &mut self,
        caller: &Address,
        lottery: Box<dyn ExecutorLottery>,
    ) -> Result<(), ConsensusError> {
        self.require_role(Role::Admin, caller)?;
        self.lottery = Some(lottery);
        info!(caller = %caller, "Executor lottery set");
        Ok(())
    }

    pub fn set_key_storage(
        &mut self,
        caller: &Address,
        key_storage: Box<dyn KeyStorage>,
    ) -> Result<(), ConsensusError> {
        self.require_role(Role::Admin, caller)?;
        self.key_storage = Some(key_storage);
        info!(caller = %caller, "Key storage set");
        Ok(())
    }

    pub fn set_chain_info(
        &mut self,
        caller: &Address,
        chain_info: Box<dyn ChainInfo>,
    ) -> Result<(), ConsensusError> {
        self.require_role(Role::Admin, caller)?;
        self.chain_info = Some(chain_info);
        info!(caller = %caller, "Chain info set");
        Ok(())
    }

    pub fn set_balance_tracker(
        &mut self,
        caller: &Address,
        balance_tracker: Box<dyn BalanceTracker>,
    ) -> Result<(), ConsensusError> {
        self.require_role(Role::Admin, caller)?;
        self.balance_tracker = Some(balance_tracker);
        info!(caller = %caller, "Balance tracker set");
        Ok(())
    }

    /// Grow the governance origin allow-list.
    pub fn populate_allowed_origins(
        &mut self,
        caller: &Address,
        origins: &[(ChainId, Vec<u8>)],
    ) -> Result<Vec<Event>, ConsensusError> {
        Ok(self
            .governor
            .populate_allowed_origins(caller, origins, self.agents.as_ref())?)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Read-only projections
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn governor(&self) -> &RoundGovernor {
        &self.governor
    }

    pub fn agent_manager(&self) -> &dyn AgentManager {
        self.agents.as_ref()
    }

    pub fn message_store(&self) -> &dyn MessageStore {
        self.store.as_ref()
    }

    pub fn balance_tracker(&self) -> Option<&dyn BalanceTracker> {
        self.balance_tracker.as_deref()
    }

    /// Nonce the next stored message will receive.
    pub fn next_global_nonce(&self) -> u64 {
        self.next_global_nonce
    }

    pub fn message(&self, hash: &Hash) -> Option<&Message> {
        self.store.message(hash)
    }

    pub fn message_status(&self, hash: &Hash) -> MessageStatus {
        self.store.msg_status(hash)
    }

    /// Full consensus record of a message.
    pub fn consensus_data(&self, hash: &Hash) -> Option<&MessageConsensusData> {
        self.consensus.get(hash)
    }

    pub fn transmission_signatures(&self, hash: &Hash) -> &[Signature] {
        self.signatures(hash, SignaturePhase::Transmission)
    }

    pub fn execution_signatures(&self, hash: &Hash) -> &[Signature] {
        self.signatures(hash, SignaturePhase::Execution)
    }

    /// Transmission signatures in the packed bundle layout.
    pub fn transmission_signatures_packed(&self, hash: &Hash) -> Result<Vec<u8>, ConsensusError> {
        Ok(signature_codec::pack(self.transmission_signatures(hash))?)
    }

    /// Execution signatures in the packed bundle layout.
    pub fn execution_signatures_packed(&self, hash: &Hash) -> Result<Vec<u8>, ConsensusError> {
        Ok(signature_codec::pack(self.execution_signatures(hash))?)
    }

    /// Check if `signer` gave a transmission signature for `hash`.
    pub fn is_message_signed(&self, hash: &Hash, signer: &Address) -> bool {
        self.consensus
            .get(hash)
            .is_some_and(|data| data.has_signed(SignaturePhase::Transmission, signer))
    }

    /// Check if `signer` gave an execution signature for `hash`.
    pub fn is_execution_signed(&self, hash: &Hash, signer: &Address) -> bool {
        self.consensus
            .get(hash)
            .is_some_and(|data| data.has_signed(SignaturePhase::Execution, signer))
    }

    /// Check if transmission signatures for `hash` reached a threshold.
    pub fn has_transmission_consensus(&self, hash: &Hash) -> bool {
        self.consensus
            .get(hash)
            .is_some_and(|data| data.transmission_consensus)
    }

    pub fn firstly_proposed_by(&self, hash: &Hash) -> Option<Address> {
        self.consensus
            .get(hash)
            .and_then(|data| data.firstly_proposed_by)
    }

    /// Super agents that finalized a status of `hash`, in order.
    pub fn super_approvals(&self, hash: &Hash) -> &[Address] {
        self.consensus
            .get(hash)
            .map(|data| data.approved_by_super.as_slice())
            .unwrap_or(&[])
    }

    /// Votes recorded for one candidate status.
    pub fn status_votes(&self, hash: &Hash, status: MessageStatus) -> Option<&MessageStatusData> {
        self.consensus
            .get(hash)
            .and_then(|data| data.status_data(status))
    }

    /// Distinct default-agent votes for one candidate status.
    pub fn status_confirmations(&self, hash: &Hash, status: MessageStatus) -> u64 {
        self.status_votes(hash, status)
            .map_or(0, |votes| votes.confirmations)
    }

    pub fn execution_data(&self, hash: &Hash) -> Option<&MessageExecutionData> {
        self.execution.get(hash)
    }

    /// Delivery attempts in arrival order.
    pub fn execution_attempts(&self, hash: &Hash) -> &[ExecutionAttempt] {
        self.execution
            .get(hash)
            .map(|data| data.try_executes.as_slice())
            .unwrap_or(&[])
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Internal helpers
    // ═══════════════════════════════════════════════════════════════════════════

    fn signatures(&self, hash: &Hash, phase: SignaturePhase) -> &[Signature] {
        self.consensus
            .get(hash)
            .map(|data| data.signatures(phase))
            .unwrap_or(&[])
    }

    pub(crate) fn require_role(&self, role: Role, caller: &Address) -> Result<(), ConsensusError> {
        if self.agents.has_role(role, caller) {
            return Ok(());
        }
        warn!(caller = %caller, role = %role, "Call without required role");
        Err(ConsensusError::Unauthorized {
            caller: *caller,
            role,
        })
    }

    pub(crate) fn require_active(&self, agent: &Address) -> Result<(), ConsensusError> {
        if self.agents.is_active(agent) {
            return Ok(());
        }
        warn!(agent = %agent, "Call from inactive agent");
        Err(ConsensusError::InactiveAgent(*agent))
    }

    pub(crate) fn require_message(&self, hash: &Hash) -> Result<&Message, ConsensusError> {
        self.store
            .message(hash)
            .ok_or(ConsensusError::MessageNotFound(*hash))
    }

    /// Recover the agent behind `signature` over `hash`.
    ///
    /// With key storage wired, the recovered key is mapped to its agent on
    /// `chain`; otherwise the key is the agent.
    pub(crate) fn resolve_signer(
        &self,
        chain: ChainId,
        hash: &Hash,
        signature: &Signature,
    ) -> Result<Address, ConsensusError> {
        let key = recover_address(hash, signature)?;
        let agent = match &self.key_storage {
            Some(keys) => keys.agent_for_key(chain, &key).ok_or_else(|| {
                warn!(key = %key, chain = chain.0, "Signing key not bound to an agent");
                ConsensusError::UnauthorizedSigner(key)
            })?,
            None => key,
        };
        if !self.agents.is_active(&agent) {
            warn!(signer = %agent, hash = %hash, "Signature from inactive agent");
            return Err(ConsensusError::UnauthorizedSigner(agent));
        }
        Ok(agent)
    }

    /// Persist a status change and report it.
    pub(crate) fn finalize_status(
        &mut self,
        hash: &Hash,
        from: MessageStatus,
        to: MessageStatus,
        approval: xmsg_core::Approval,
    ) -> Result<Event, ConsensusError> {
        self.store.change_message_status(hash, to)?;
        info!(hash = %hash, ?from, ?to, ?approval, "Message status changed");
        Ok(Event::StatusChanged {
            hash: *hash,
            from,
            to,
            approval,
        })
    }
}

impl std::fmt::Debug for ConsensusCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusCore")
            .field("config", &self.config)
            .field("round", &self.governor.current_round())
            .field("messages", &self.consensus.len())
            .field("next_global_nonce", &self.next_global_nonce)
            .field("now", &self.now)
            .finish()
    }
}
