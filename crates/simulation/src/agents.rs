//! In-memory agent registry.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use xmsg_core::{AgentManager, CollaboratorError, Role};
use xmsg_types::{Address, AgentStatus, AgentType, ChainId};

#[derive(Debug, Clone)]
struct AgentRecord {
    status: AgentStatus,
    agent_type: AgentType,
    chain: Option<ChainId>,
    executor_active: bool,
}

/// Agent registry backed by hash maps.
///
/// Agents registered through [`with_agent`](Self::with_agent) start active
/// as signers and inactive as executors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentManager {
    agents: HashMap<Address, AgentRecord>,
    roles: HashMap<Role, BTreeSet<Address>>,
    min_consensus_rate: u64,
    total_active_signers: u64,
}

impl InMemoryAgentManager {
    /// Create an empty registry with a zero rate floor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active agent.
    pub fn with_agent(
        mut self,
        agent: Address,
        agent_type: AgentType,
        chain: Option<ChainId>,
    ) -> Self {
        self.agents.insert(
            agent,
            AgentRecord {
                status: AgentStatus::Active,
                agent_type,
                chain,
                executor_active: false,
            },
        );
        self
    }

    /// Grant a role.
    pub fn with_role(mut self, role: Role, holder: Address) -> Self {
        self.roles.entry(role).or_default().insert(holder);
        self
    }

    /// Set the governance rate floor.
    pub fn with_min_consensus_rate(mut self, rate: u64) -> Self {
        self.min_consensus_rate = rate;
        self
    }

    /// Force an agent's status. Unknown agents are ignored.
    pub fn set_status(&mut self, agent: &Address, status: AgentStatus) {
        if let Some(record) = self.agents.get_mut(agent) {
            record.status = status;
        }
    }

    /// Check if an agent is an active executor.
    pub fn is_executor_active(&self, agent: &Address) -> bool {
        self.agents
            .get(agent)
            .is_some_and(|record| record.executor_active)
    }

    /// Last value pushed through `set_total_active_signers`.
    pub fn total_active_signers(&self) -> u64 {
        self.total_active_signers
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Check if no agent is registered.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn check_batch(&self, agents: &[Address], flags: &[bool]) -> Result<(), CollaboratorError> {
        if agents.len() != flags.len() {
            return Err(CollaboratorError::LengthMismatch {
                left: agents.len(),
                right: flags.len(),
            });
        }
        match agents.iter().find(|agent| !self.agents.contains_key(*agent)) {
            Some(unknown) => Err(CollaboratorError::UnknownAgent(*unknown)),
            None => Ok(()),
        }
    }
}

impl AgentManager for InMemoryAgentManager {
    fn status(&self, agent: &Address) -> AgentStatus {
        self.agents
            .get(agent)
            .map(|record| record.status)
            .unwrap_or_default()
    }

    fn agent_type(&self, agent: &Address) -> AgentType {
        self.agents
            .get(agent)
            .map(|record| record.agent_type)
            .unwrap_or_default()
    }

    fn agent_chain(&self, agent: &Address) -> Option<ChainId> {
        self.agents.get(agent).and_then(|record| record.chain)
    }

    fn has_role(&self, role: Role, caller: &Address) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|holders| holders.contains(caller))
    }

    fn min_consensus_rate(&self) -> u64 {
        self.min_consensus_rate
    }

    fn set_signers_status(
        &mut self,
        signers: &[Address],
        active: &[bool],
    ) -> Result<(), CollaboratorError> {
        self.check_batch(signers, active)?;
        for (signer, &flag) in signers.iter().zip(active) {
            if let Some(record) = self.agents.get_mut(signer) {
                record.status = if flag {
                    AgentStatus::Active
                } else {
                    AgentStatus::Paused
                };
            }
        }
        debug!(count = signers.len(), "Signer statuses updated");
        Ok(())
    }

    fn set_executors_status(
        &mut self,
        executors: &[Address],
        active: &[bool],
    ) -> Result<(), CollaboratorError> {
        self.check_batch(executors, active)?;
        for (executor, &flag) in executors.iter().zip(active) {
            if let Some(record) = self.agents.get_mut(executor) {
                record.executor_active = flag;
            }
        }
        debug!(count = executors.len(), "Executor statuses updated");
        Ok(())
    }

    fn set_total_active_signers(&mut self, total: u64) {
        self.total_active_signers = total;
    }
}
