//! Per-message vote and signature records.

use std::collections::BTreeMap;
use xmsg_types::{Address, AgentSet, MessageStatus, Signature, SignaturePhase};

/// Votes for one candidate status of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStatusData {
    /// Distinct default agents that voted for this status.
    pub confirmations: u64,
    /// Who voted, so nobody is counted twice.
    pub status_by_agent: AgentSet,
    /// Super agent that finalized this status, if any.
    pub approved_by_super: Option<Address>,
}

impl MessageStatusData {
    /// Check if `agent` already voted for this status.
    pub fn has_voted(&self, agent: &Address) -> bool {
        self.status_by_agent.contains(agent.as_bytes())
    }

    /// Count a vote. Returns false if the agent already voted.
    pub fn record_vote(&mut self, agent: &Address) -> bool {
        if !self.status_by_agent.insert(agent.as_bytes()) {
            return false;
        }
        self.confirmations += 1;
        true
    }
}

/// Append-only consensus record of one message.
///
/// Created on the first accepted signature and never deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageConsensusData {
    /// Signer of the first accepted transmission signature.
    pub firstly_proposed_by: Option<Address>,
    /// Super agents that finalized a status, in order.
    pub approved_by_super: Vec<Address>,
    /// Set once transmission signatures reached the round threshold.
    pub transmission_consensus: bool,
    pub transmission_sigs: Vec<Signature>,
    pub execution_sigs: Vec<Signature>,
    /// Keyed by phase tag plus signer address.
    pub signed: AgentSet,
    pub msg_status_data: BTreeMap<MessageStatus, MessageStatusData>,
}

impl MessageConsensusData {
    /// Check if `signer` signed in `phase`.
    pub fn has_signed(&self, phase: SignaturePhase, signer: &Address) -> bool {
        self.signed.contains(&phase.signer_key(signer))
    }

    /// Signatures of one phase in arrival order.
    pub fn signatures(&self, phase: SignaturePhase) -> &[Signature] {
        match phase {
            SignaturePhase::Transmission => &self.transmission_sigs,
            SignaturePhase::Execution => &self.execution_sigs,
        }
    }

    /// Append a signature and return the new count for its phase.
    ///
    /// The caller has already checked [`has_signed`](Self::has_signed).
    pub fn add_signature(
        &mut self,
        phase: SignaturePhase,
        signer: &Address,
        signature: Signature,
    ) -> usize {
        self.signed.insert(&phase.signer_key(signer));
        let sigs = match phase {
            SignaturePhase::Transmission => &mut self.transmission_sigs,
            SignaturePhase::Execution => &mut self.execution_sigs,
        };
        sigs.push(signature);
        sigs.len()
    }

    /// Votes for one candidate status.
    pub fn status_data(&self, status: MessageStatus) -> Option<&MessageStatusData> {
        self.msg_status_data.get(&status)
    }
}
