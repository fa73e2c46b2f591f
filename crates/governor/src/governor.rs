//! Round registry and governance execution.

use crate::{origin_key, GovernanceCall, GovernorConfig, GovernorError, RoundChange};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use xmsg_core::{AgentManager, CollaboratorError, Event, Role};
use xmsg_types::{Address, AgentSet, AgentStatus, ChainId, Round, RoundData, RATE_DENOMINATOR};

/// Owner of the round history and the governance origin allow-list.
///
/// Rounds are append-only: round `N + 1` is written once when a governance
/// call executes and never changes afterwards. Round 0 is reserved and
/// never stored.
#[derive(Debug, Clone)]
pub struct RoundGovernor {
    current_round: Round,
    /// Copy of `rounds[current_round]`, replaced together with it.
    current: RoundData,
    rounds: BTreeMap<Round, RoundData>,
    allowed_origins: AgentSet,
}

impl RoundGovernor {
    /// Create a governor holding only the genesis round.
    pub fn new(config: GovernorConfig) -> Self {
        let genesis = RoundData {
            changed_at: Duration::ZERO,
            consensus_rate: config.initial_consensus_rate,
            active_signers_len: config.initial_active_signers,
        };
        let mut rounds = BTreeMap::new();
        rounds.insert(Round::GENESIS, genesis);
        Self {
            current_round: Round::GENESIS,
            current: genesis,
            rounds,
            allowed_origins: AgentSet::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    /// The round in effect.
    pub fn current_round(&self) -> Round {
        self.current_round
    }

    /// Parameters of the round in effect.
    pub fn current_round_data(&self) -> RoundData {
        self.current
    }

    /// Parameters of a past or current round.
    pub fn round_data(&self, round: Round) -> Option<&RoundData> {
        self.rounds.get(&round)
    }

    /// Votes needed to finalize a status in the current round.
    pub fn required_confirmations(&self) -> u64 {
        self.current_round_data().required_confirmations()
    }

    /// Check if `(chain, contract)` may originate governance messages.
    pub fn is_origin_allowed(&self, chain: ChainId, contract: &[u8]) -> bool {
        self.allowed_origins
            .contains(origin_key(chain, contract).as_bytes())
    }

    /// Number of allow-listed origins.
    pub fn allowed_origins_len(&self) -> usize {
        self.allowed_origins.len()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Administration
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add origins to the allow-list. Admin only; entries are never removed.
    ///
    /// Origins already present are skipped without an event.
    pub fn populate_allowed_origins(
        &mut self,
        caller: &Address,
        origins: &[(ChainId, Vec<u8>)],
        agents: &dyn AgentManager,
    ) -> Result<Vec<Event>, GovernorError> {
        require_role(agents, Role::Admin, caller)?;
        if let Some((chain, _)) = origins.iter().find(|(_, contract)| contract.is_empty()) {
            return Err(GovernorError::InvalidOrigin(*chain));
        }

        let mut events = Vec::new();
        for (chain, contract) in origins {
            let key = origin_key(*chain, contract);
            if !self.allowed_origins.insert(key.as_bytes()) {
                continue;
            }
            info!(chain = chain.0, contract = %hex_short(contract), key = %key, "Origin allowed");
            events.push(Event::OriginAdded {
                chain: *chain,
                contract: contract.clone(),
                key,
            });
        }
        Ok(events)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Governance execution
    // ═══════════════════════════════════════════════════════════════════════════

    /// Apply an encoded [`GovernanceCall`] carrying a [`RoundChange`].
    ///
    /// Only the consensus engine may call this. On success round
    /// `current + 1` is stored with `changed_at = now` and becomes current.
    pub fn execute(
        &mut self,
        caller: &Address,
        data: &[u8],
        now: Duration,
        agents: &mut dyn AgentManager,
    ) -> Result<Vec<Event>, GovernorError> {
        require_role(agents, Role::Consensus, caller)?;

        let call = GovernanceCall::decode(data)?;
        let key = call.origin_key();
        if !self.allowed_origins.contains(key.as_bytes()) {
            warn!(
                chain = call.src_chain_id.0,
                sender = %hex_short(&call.sender),
                "Governance call from origin not in allow-list"
            );
            return Err(GovernorError::OriginNotAllowed {
                chain: call.src_chain_id,
                key,
            });
        }

        let change = RoundChange::decode(&call.payload)?;
        check_lengths(&change.signers, &change.signer_flags)?;
        check_lengths(&change.executors, &change.executor_flags)?;
        if change.consensus_rate > RATE_DENOMINATOR {
            return Err(GovernorError::InvalidRate(change.consensus_rate));
        }
        // Both batches must be applicable before either is pushed.
        if let Some(unknown) = change
            .signers
            .iter()
            .chain(&change.executors)
            .find(|agent| agents.status(agent) == AgentStatus::Unregistered)
        {
            return Err(CollaboratorError::UnknownAgent(*unknown).into());
        }

        let floor = agents.min_consensus_rate();
        let consensus_rate = change.consensus_rate.max(floor);
        if consensus_rate != change.consensus_rate {
            debug!(
                requested = change.consensus_rate,
                floor, "Consensus rate clamped to floor"
            );
        }

        agents.set_signers_status(&change.signers, &change.signer_flags)?;
        agents.set_executors_status(&change.executors, &change.executor_flags)?;
        agents.set_total_active_signers(change.participant_len);

        let new_round = self.current_round.next();
        let data = RoundData {
            changed_at: now,
            consensus_rate,
            active_signers_len: change.participant_len,
        };
        self.rounds.insert(new_round, data);
        self.current_round = new_round;
        self.current = data;

        info!(
            round = new_round.0,
            consensus_rate,
            active_signers_len = change.participant_len,
            src_chain = call.src_chain_id.0,
            "New round"
        );

        Ok(vec![Event::NewRound {
            round: new_round,
            consensus_rate,
            active_signers_len: change.participant_len,
        }])
    }
}

fn require_role(
    agents: &dyn AgentManager,
    role: Role,
    caller: &Address,
) -> Result<(), GovernorError> {
    if agents.has_role(role, caller) {
        return Ok(());
    }
    warn!(caller = %caller, role = %role, "Governor call without required role");
    Err(GovernorError::Unauthorized {
        caller: *caller,
        role,
    })
}

fn check_lengths<T, U>(addresses: &[T], flags: &[U]) -> Result<(), GovernorError> {
    if addresses.len() != flags.len() {
        return Err(GovernorError::MismatchedLengths {
            addresses: addresses.len(),
            flags: flags.len(),
        });
    }
    Ok(())
}

fn hex_short(bytes: &[u8]) -> String {
    if bytes.len() > 8 {
        format!("0x{}..", hex::encode(&bytes[..8]))
    } else {
        format!("0x{}", hex::encode(bytes))
    }
}
