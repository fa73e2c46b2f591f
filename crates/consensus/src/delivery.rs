//! Status votes, delivery bookkeeping and governance routing.

use crate::{ConsensusCore, ConsensusError};
use tracing::{debug, info, warn};
use xmsg_core::{Approval, CollaboratorError, Event, Role};
use xmsg_governor::GovernanceCall;
use xmsg_types::codec::selector::{self, SelectorType};
use xmsg_types::{
    status_change_valid, Address, ChainId, ExecutionAttempt, Hash, MessageStatus, U256,
};

impl ConsensusCore {
    // ═══════════════════════════════════════════════════════════════════════════
    // Status votes
    // ═══════════════════════════════════════════════════════════════════════════

    /// Vote for `new_status` as the calling agent.
    ///
    /// An active super agent finalizes the status at once. A default agent
    /// adds one confirmation for `new_status`; the status is finalized when
    /// the confirmations reach the current round's threshold.
    pub fn approve_message_delivery(
        &mut self,
        caller: &Address,
        hash: &Hash,
        new_status: MessageStatus,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_active(caller)?;
        let current = self.require_message(hash)?.status;
        if !status_change_valid(current, new_status) {
            debug!(hash = %hash, ?current, ?new_status, "Invalid status transition");
            return Err(ConsensusError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        if self.agents.is_super(caller) {
            let event =
                self.finalize_status(hash, current, new_status, Approval::Super(*caller))?;
            let record = self.consensus.entry(*hash).or_default();
            record.approved_by_super.push(*caller);
            record
                .msg_status_data
                .entry(new_status)
                .or_default()
                .approved_by_super = Some(*caller);
            return Ok(vec![event]);
        }

        let already_voted = self
            .status_votes(hash, new_status)
            .is_some_and(|votes| votes.has_voted(caller));
        if already_voted {
            return Err(ConsensusError::DuplicateVote {
                hash: *hash,
                status: new_status,
                agent: *caller,
            });
        }

        let confirmations = self.status_confirmations(hash, new_status) + 1;
        let required = self.governor.required_confirmations();

        let mut events = vec![Event::StatusVoted {
            hash: *hash,
            status: new_status,
            voter: *caller,
            confirmations,
            required,
        }];
        if confirmations >= required && current != new_status {
            events.push(self.finalize_status(
                hash,
                current,
                new_status,
                Approval::Quorum { confirmations },
            )?);
        }

        self.consensus
            .entry(*hash)
            .or_default()
            .msg_status_data
            .entry(new_status)
            .or_default()
            .record_vote(caller);
        debug!(
            hash = %hash,
            voter = %caller,
            ?new_status,
            confirmations,
            required,
            "Status vote recorded"
        );
        Ok(events)
    }

    /// Vote that the message's fee is too low to deliver.
    pub fn low_price_proposed(
        &mut self,
        caller: &Address,
        hash: &Hash,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.approve_message_delivery(caller, hash, MessageStatus::Underestimated)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Delivery bookkeeping
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record that `executor` took the message into execution.
    ///
    /// `execution_hash` fingerprints the destination-chain transaction; the
    /// same fingerprint cannot be recorded twice for one message.
    pub fn add_pending_tx(
        &mut self,
        caller: &Address,
        hash: &Hash,
        execution_hash: [Hash; 2],
        executor: &Address,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_role(Role::Relayer, caller)?;
        let status = self.require_message(hash)?.status;
        if status.is_terminal() {
            return Err(ConsensusError::MessageFinalized {
                hash: *hash,
                status,
            });
        }
        if matches!(status, MessageStatus::NotInitialized | MessageStatus::Saved) {
            return Err(ConsensusError::NotReadyForExecution {
                hash: *hash,
                status,
            });
        }
        self.require_active(executor)?;
        if let Some(lottery) = &self.lottery {
            if !lottery.is_responsible(executor, hash, self.now) {
                warn!(executor = %executor, hash = %hash, "Executor outside its lottery window");
                return Err(ConsensusError::ExecutorNotResponsible {
                    executor: *executor,
                    hash: *hash,
                });
            }
        }
        let duplicate = self
            .execution
            .get(hash)
            .is_some_and(|data| data.has_attempt(&execution_hash));
        if duplicate {
            return Err(ConsensusError::DuplicateExecutionAttempt(*hash));
        }

        let transition = if status != MessageStatus::Pending {
            Some(self.finalize_status(
                hash,
                status,
                MessageStatus::Pending,
                Approval::Protocol,
            )?)
        } else {
            None
        };

        let attempt = ExecutionAttempt {
            time_saved: self.now,
            executor: *executor,
            execution_hash,
        };
        let data = self.execution.entry(*hash).or_default();
        data.record_attempt(attempt);
        debug!(
            hash = %hash,
            executor = %executor,
            tries = data.total_tries,
            "Execution attempt recorded"
        );

        let mut events = vec![Event::ExecutionAttemptRecorded {
            hash: *hash,
            executor: *executor,
            execution_hash,
            time_saved: self.now,
        }];
        events.extend(transition);
        Ok(events)
    }

    /// Add fee to an existing message from its source chain.
    ///
    /// Both sums are checked before the tracker and the ledger are written.
    pub fn replenish(
        &mut self,
        caller: &Address,
        chain: ChainId,
        hash: &Hash,
        amount: U256,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_role(Role::Endpoint, caller)?;
        if amount == U256::ZERO {
            return Err(ConsensusError::ZeroAmount);
        }
        if let Some(chains) = &self.chain_info {
            if !chains.is_supported(chain) {
                return Err(ConsensusError::UnsupportedChain(chain));
            }
        }
        self.require_open_message_from(chain, hash)?;

        let overflow = ConsensusError::Collaborator(CollaboratorError::AmountOverflow(*hash));
        let native = self.require_message(hash)?.data.initial_proposal.native_amount;
        if native.checked_add(amount).is_none() {
            return Err(overflow);
        }
        if let Some(tracker) = &self.balance_tracker {
            if tracker.total_replenished(chain).checked_add(amount).is_none() {
                return Err(overflow);
            }
        }

        if let Some(tracker) = self.balance_tracker.as_mut() {
            tracker.record_replenishment(chain, hash, amount)?;
        }
        self.store.increment_native_amount(hash, amount)?;
        self.execution
            .entry(*hash)
            .or_default()
            .replenishments
            .push(amount);

        info!(hash = %hash, chain = chain.0, amount = %amount, "Message replenished");
        Ok(vec![Event::Replenished {
            chain,
            hash: *hash,
            amount,
        }])
    }

    /// Request another delivery try for an existing message.
    pub fn resend(
        &mut self,
        caller: &Address,
        chain: ChainId,
        hash: &Hash,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_role(Role::Endpoint, caller)?;
        self.require_open_message_from(chain, hash)?;

        let data = self.execution.entry(*hash).or_default();
        data.resend_attempts += 1;
        let attempts = data.resend_attempts;

        info!(hash = %hash, chain = chain.0, attempts, "Resend requested");
        Ok(vec![Event::ResendRequested {
            chain,
            hash: *hash,
            attempts,
        }])
    }

    fn require_open_message_from(&self, chain: ChainId, hash: &Hash) -> Result<(), ConsensusError> {
        let message = self.require_message(hash)?;
        let src_chain = message.src_chain_id();
        if src_chain != chain {
            return Err(ConsensusError::ChainMismatch {
                expected: src_chain,
                actual: chain,
            });
        }
        if message.status.is_terminal() {
            return Err(ConsensusError::MessageFinalized {
                hash: *hash,
                status: message.status,
            });
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Governance
    // ═══════════════════════════════════════════════════════════════════════════

    /// Execute a round change message that cleared transmission consensus.
    ///
    /// The message must carry the configured round change execution code
    /// and target the configured governor address. On success the governor
    /// opens the next round and the message becomes `SUCCESS`.
    pub fn execute_governance(
        &mut self,
        caller: &Address,
        hash: &Hash,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_active(caller)?;
        let message = self.require_message(hash)?;
        let status = message.status;
        if !matches!(
            status,
            MessageStatus::Transmitted | MessageStatus::Queued | MessageStatus::Pending
        ) {
            return Err(ConsensusError::NotReadyForExecution {
                hash: *hash,
                status,
            });
        }
        // Status alone can be reached by a super agent or a pending tx.
        if !self.has_transmission_consensus(hash) {
            warn!(hash = %hash, "Governance message without transmission consensus");
            return Err(ConsensusError::TransmissionConsensusNotReached(*hash));
        }
        // The governor commits its round; the status change after it must not fail.
        if !status_change_valid(status, MessageStatus::Success) {
            return Err(ConsensusError::InvalidTransition {
                from: status,
                to: MessageStatus::Success,
            });
        }

        let proposal = &message.data.initial_proposal;
        let slot = proposal.selector_slot;
        let is_round_change = selector::get_type(slot)? == SelectorType::ExecutionCode
            && selector::extract(slot)?.1 == self.config.round_change_code
            && proposal.dest_addr == self.config.governor_address;
        if !is_round_change {
            return Err(ConsensusError::NotGovernanceMessage(*hash));
        }

        let call = GovernanceCall {
            src_chain_id: message.src_chain_id(),
            src_tx_hash: message.data.src_chain_data.src_op_tx_id,
            sender: proposal.sender_addr.clone(),
            payload: proposal.payload.clone(),
        }
        .encode();

        let mut events =
            self.governor
                .execute(&self.config.identity, &call, self.now, self.agents.as_mut())?;
        events.push(self.finalize_status(
            hash,
            status,
            MessageStatus::Success,
            Approval::Protocol,
        )?);
        Ok(events)
    }
}
