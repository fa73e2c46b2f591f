//! Multi-agent scenarios driving the engine, the governor and the
//! in-memory collaborators together.

use crate::{ConsensusConfig, ConsensusCore, ConsensusError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing_test::traced_test;
use xmsg_core::{Approval, Event, Role};
use xmsg_governor::{GovernorConfig, GovernorError, RoundChange, RoundGovernor};
use xmsg_simulation::{InMemoryAgentManager, InMemoryMessageStore};
use xmsg_test_helpers::{
    agents, sample_message, sample_proposal, src_chain_data, TestAgent, SRC_CHAIN,
};
use xmsg_types::codec::selector;
use xmsg_types::{
    Address, AgentStatus, AgentType, Hash, MessageData, MessageStatus, Round, RATE_DENOMINATOR,
};

const ADMIN: Address = Address([0xAD; 20]);
const RELAYER: Address = Address([0xEE; 20]);
const ENGINE: Address = Address([0xC0; 20]);
const GOVERNOR: [u8; 20] = [0x60; 20];
const ORIGIN: [u8; 20] = [0x0A; 20];
const ROUND_CHANGE_CODE: u128 = 7;

struct Harness {
    core: ConsensusCore,
    signers: Vec<TestAgent>,
}

impl Harness {
    fn new(signers: u32, min_rate: u64) -> Self {
        Self::with_identity(signers, min_rate, ENGINE)
    }

    fn with_identity(signers: u32, min_rate: u64, identity: Address) -> Self {
        let signers = agents(signers);
        let mut manager = InMemoryAgentManager::new()
            .with_role(Role::Admin, ADMIN)
            .with_role(Role::Relayer, RELAYER)
            .with_role(Role::Consensus, ENGINE)
            .with_min_consensus_rate(min_rate);
        for signer in &signers {
            manager = manager.with_agent(signer.address, AgentType::Default, Some(SRC_CHAIN));
        }
        let config = ConsensusConfig::default()
            .with_identity(identity)
            .with_governor_address(GOVERNOR)
            .with_round_change_code(ROUND_CHANGE_CODE);
        let governor = RoundGovernor::new(
            GovernorConfig::default().with_initial_active_signers(signers.len() as u64),
        );
        let core = ConsensusCore::new(
            config,
            governor,
            Box::new(manager),
            Box::new(InMemoryMessageStore::new()),
        );
        Self { core, signers }
    }

    fn allow_origin(&mut self) {
        self.core
            .populate_allowed_origins(&ADMIN, &[(SRC_CHAIN, ORIGIN.to_vec())])
            .unwrap();
    }

    /// Submit transmission signatures from the given signers, in order.
    fn transmit(&mut self, data: &MessageData, signers: &[usize]) -> Vec<Event> {
        let mut events = Vec::new();
        for &index in signers {
            let signature = self.signers[index].sign(data);
            events.extend(
                self.core
                    .add_transmission_signature(
                        &RELAYER,
                        &data.initial_proposal,
                        &data.src_chain_data.encode(),
                        &signature,
                    )
                    .unwrap(),
            );
        }
        events
    }
}

fn round_change_message(change: &RoundChange, sender: &[u8], tag: &[u8]) -> MessageData {
    let mut proposal = sample_proposal(&change.encode());
    proposal.selector_slot = selector::encode_execution_code(ROUND_CHANGE_CODE);
    proposal.dest_addr = GOVERNOR.to_vec();
    proposal.sender_addr = sender.to_vec();
    MessageData::new(proposal, src_chain_data(7, tag))
}

/// Pause the last two of ten signers and lower the rate.
fn shrink_to_eight(signers: &[TestAgent], rate: u64) -> RoundChange {
    RoundChange {
        consensus_rate: rate,
        participant_len: 8,
        signers: signers[8..].iter().map(|s| s.address).collect(),
        executors: vec![signers[0].address],
        signer_flags: vec![false, false],
        executor_flags: vec![true],
    }
}

#[test]
fn test_ten_signers_need_six() {
    let mut h = Harness::new(10, 0);
    let data = sample_message(b"six-of-ten");
    let hash = data.hash_prefixed();
    assert_eq!(h.core.governor().required_confirmations(), 6);

    h.transmit(&data, &[0, 1, 2, 3, 4]);
    assert_eq!(h.core.message_status(&hash), MessageStatus::Saved);
    assert_eq!(h.core.transmission_signatures(&hash).len(), 5);

    let events = h.transmit(&data, &[5]);
    assert!(events.contains(&Event::StatusChanged {
        hash,
        from: MessageStatus::Saved,
        to: MessageStatus::Transmitted,
        approval: Approval::Protocol,
    }));
    assert_eq!(h.core.message_status(&hash), MessageStatus::Transmitted);

    // Late signatures are still collected; the status does not move again.
    let events = h.transmit(&data, &[6]);
    assert_eq!(events.len(), 1);
    assert_eq!(h.core.transmission_signatures(&hash).len(), 7);
    assert_eq!(h.core.message_status(&hash), MessageStatus::Transmitted);
}

#[test]
fn test_signature_order_does_not_change_outcome() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let data = sample_message(b"shuffled");
    let hash = data.hash_prefixed();

    for _ in 0..5 {
        let mut h = Harness::new(10, 0);
        let mut order: Vec<usize> = (0..10).collect();
        order.shuffle(&mut rng);

        h.transmit(&data, &order[..5]);
        assert_eq!(h.core.message_status(&hash), MessageStatus::Saved);
        h.transmit(&data, &order[5..6]);
        assert_eq!(h.core.message_status(&hash), MessageStatus::Transmitted);

        assert_eq!(
            h.core.firstly_proposed_by(&hash),
            Some(h.signers[order[0]].address)
        );
        for (i, signer) in h.signers.iter().enumerate() {
            assert_eq!(
                h.core.is_message_signed(&hash, &signer.address),
                order[..6].contains(&i)
            );
        }
        assert_eq!(h.core.message(&hash).map(|m| m.global_nonce), Some(1));
    }
}

#[test]
fn test_full_delivery_lifecycle() {
    let mut h = Harness::new(10, 0);
    let data = sample_message(b"lifecycle");
    let hash = data.hash_prefixed();
    h.transmit(&data, &[0, 1, 2, 3, 4, 5]);

    for signer in &h.signers[..6] {
        h.core
            .add_execution_signature(&RELAYER, &hash, &signer.sign(&data))
            .unwrap();
    }
    assert_eq!(h.core.message_status(&hash), MessageStatus::Queued);

    h.core.set_time(Duration::from_secs(30));
    h.core
        .add_pending_tx(
            &RELAYER,
            &hash,
            [Hash::from_bytes(b"dest-tx"), Hash::ZERO],
            &h.signers[9].address,
        )
        .unwrap();
    assert_eq!(h.core.message_status(&hash), MessageStatus::Pending);

    for signer in &h.signers[..5] {
        h.core
            .approve_message_delivery(&signer.address, &hash, MessageStatus::Success)
            .unwrap();
    }
    assert_eq!(h.core.message_status(&hash), MessageStatus::Pending);
    h.core
        .approve_message_delivery(&h.signers[5].address, &hash, MessageStatus::Success)
        .unwrap();
    assert_eq!(h.core.message_status(&hash), MessageStatus::Success);

    let late = h.signers[6].address;
    assert_eq!(
        h.core
            .approve_message_delivery(&late, &hash, MessageStatus::Success),
        Err(ConsensusError::InvalidTransition {
            from: MessageStatus::Success,
            to: MessageStatus::Success,
        })
    );
}

#[test]
#[traced_test]
fn test_governance_round_change() {
    let mut h = Harness::new(10, 0);
    h.allow_origin();
    let change = shrink_to_eight(&h.signers, 5000);
    let data = round_change_message(&change, &ORIGIN, b"round-2");
    let hash = data.hash_prefixed();

    assert_eq!(
        h.core.execute_governance(&h.signers[0].address, &hash),
        Err(ConsensusError::MessageNotFound(hash))
    );
    h.transmit(&data, &[0, 1, 2, 3, 4, 5]);

    h.core.set_time(Duration::from_secs(600));
    let events = h
        .core
        .execute_governance(&h.signers[0].address, &hash)
        .unwrap();
    assert_eq!(
        events,
        vec![
            Event::NewRound {
                round: Round(2),
                consensus_rate: 5000,
                active_signers_len: 8,
            },
            Event::StatusChanged {
                hash,
                from: MessageStatus::Transmitted,
                to: MessageStatus::Success,
                approval: Approval::Protocol,
            },
        ]
    );

    let governor = h.core.governor();
    assert_eq!(governor.current_round(), Round(2));
    assert_eq!(
        governor.round_data(Round(2)).map(|r| r.changed_at),
        Some(Duration::from_secs(600))
    );
    assert_eq!(governor.required_confirmations(), 4);
    assert_eq!(
        h.core.agent_manager().status(&h.signers[9].address),
        AgentStatus::Paused
    );
    assert!(logs_contain("Message status changed"));

    // The paused signer no longer counts.
    let next = sample_message(b"after-round-2");
    let signature = h.signers[9].sign(&next);
    assert_eq!(
        h.core.add_transmission_signature(
            &RELAYER,
            &next.initial_proposal,
            &next.src_chain_data.encode(),
            &signature,
        ),
        Err(ConsensusError::UnauthorizedSigner(h.signers[9].address))
    );
    h.transmit(&next, &[0, 1, 2]);
    assert_eq!(h.core.message_status(&next.hash_prefixed()), MessageStatus::Saved);
    h.transmit(&next, &[3]);
    assert_eq!(
        h.core.message_status(&next.hash_prefixed()),
        MessageStatus::Transmitted
    );
}

#[test]
fn test_round_change_needs_transmission_threshold() {
    let mut h = Harness::new(10, 0);
    h.allow_origin();
    let data = round_change_message(&shrink_to_eight(&h.signers, 5000), &ORIGIN, b"lone");
    let hash = data.hash_prefixed();
    h.transmit(&data, &[0]);

    // One signature cannot reach the executor zone, so governance stays shut.
    assert_eq!(
        h.core.add_pending_tx(
            &RELAYER,
            &hash,
            [Hash::from_bytes(b"dest-tx"), Hash::ZERO],
            &h.signers[9].address,
        ),
        Err(ConsensusError::NotReadyForExecution {
            hash,
            status: MessageStatus::Saved,
        })
    );
    assert_eq!(
        h.core.execute_governance(&h.signers[0].address, &hash),
        Err(ConsensusError::NotReadyForExecution {
            hash,
            status: MessageStatus::Saved,
        })
    );
    assert_eq!(h.core.governor().current_round(), Round::GENESIS);
    assert_eq!(
        h.core.agent_manager().status(&h.signers[9].address),
        AgentStatus::Active
    );

    // Once the threshold is met the same message executes.
    h.transmit(&data, &[1, 2, 3, 4, 5]);
    h.core
        .add_pending_tx(
            &RELAYER,
            &hash,
            [Hash::from_bytes(b"dest-tx"), Hash::ZERO],
            &h.signers[9].address,
        )
        .unwrap();
    h.core
        .execute_governance(&h.signers[0].address, &hash)
        .unwrap();
    assert_eq!(h.core.governor().current_round(), Round(2));
    assert_eq!(h.core.message_status(&hash), MessageStatus::Success);
}

#[test]
fn test_governance_rejects_unlisted_origin() {
    let mut h = Harness::new(10, 0);
    h.allow_origin();
    let change = shrink_to_eight(&h.signers, 5000);
    let data = round_change_message(&change, &[0x0B; 20], b"rogue");
    let hash = data.hash_prefixed();
    h.transmit(&data, &[0, 1, 2, 3, 4, 5]);

    let result = h.core.execute_governance(&h.signers[0].address, &hash);
    assert!(matches!(
        result,
        Err(ConsensusError::Governance(GovernorError::OriginNotAllowed { .. }))
    ));
    assert_eq!(h.core.governor().current_round(), Round::GENESIS);
    assert_eq!(h.core.message_status(&hash), MessageStatus::Transmitted);
    assert_eq!(
        h.core.agent_manager().status(&h.signers[9].address),
        AgentStatus::Active
    );
}

#[test]
fn test_governance_requires_engine_role() {
    // The engine calls the governor under an identity without the role.
    let mut h = Harness::with_identity(10, 0, Address([0x01; 20]));
    h.allow_origin();
    let data = round_change_message(&shrink_to_eight(&h.signers, 5000), &ORIGIN, b"no-role");
    let hash = data.hash_prefixed();
    h.transmit(&data, &[0, 1, 2, 3, 4, 5]);

    assert!(matches!(
        h.core.execute_governance(&h.signers[0].address, &hash),
        Err(ConsensusError::Governance(GovernorError::Unauthorized {
            role: Role::Consensus,
            ..
        }))
    ));
    assert_eq!(h.core.governor().current_round(), Round::GENESIS);
    assert_eq!(h.core.message_status(&hash), MessageStatus::Transmitted);
}

#[test]
fn test_governance_rate_clamped_to_floor() {
    let mut h = Harness::new(10, 7000);
    h.allow_origin();
    let data = round_change_message(&shrink_to_eight(&h.signers, 5000), &ORIGIN, b"floor");
    let hash = data.hash_prefixed();
    h.transmit(&data, &[0, 1, 2, 3, 4, 5]);

    h.core
        .execute_governance(&h.signers[0].address, &hash)
        .unwrap();
    let round = h.core.governor().current_round_data();
    assert_eq!(round.consensus_rate, 7000);
    // ceil(8 * 0.7)
    assert_eq!(h.core.governor().required_confirmations(), 6);
}

#[test]
fn test_governance_rejects_rate_above_denominator() {
    let mut h = Harness::new(10, 0);
    h.allow_origin();
    let change = shrink_to_eight(&h.signers, RATE_DENOMINATOR + 1);
    let data = round_change_message(&change, &ORIGIN, b"too-high");
    let hash = data.hash_prefixed();
    h.transmit(&data, &[0, 1, 2, 3, 4, 5]);

    assert_eq!(
        h.core.execute_governance(&h.signers[0].address, &hash),
        Err(ConsensusError::Governance(GovernorError::InvalidRate(
            RATE_DENOMINATOR + 1
        )))
    );
    assert_eq!(h.core.governor().current_round(), Round::GENESIS);
}

#[test]
fn test_rounds_increase_by_one() {
    let mut h = Harness::new(10, 0);
    h.allow_origin();

    let first = round_change_message(&shrink_to_eight(&h.signers, 5000), &ORIGIN, b"r2");
    h.transmit(&first, &[0, 1, 2, 3, 4, 5]);
    h.core.set_time(Duration::from_secs(10));
    h.core
        .execute_governance(&h.signers[0].address, &first.hash_prefixed())
        .unwrap();

    // Round 2 needs 4 of the 8 remaining signers.
    let second = round_change_message(
        &RoundChange {
            consensus_rate: 10_000,
            participant_len: 8,
            ..RoundChange::default()
        },
        &ORIGIN,
        b"r3",
    );
    h.transmit(&second, &[0, 1, 2, 3]);
    h.core.set_time(Duration::from_secs(20));
    h.core
        .execute_governance(&h.signers[1].address, &second.hash_prefixed())
        .unwrap();

    let governor = h.core.governor();
    assert_eq!(governor.current_round(), Round(3));
    assert!(governor.round_data(Round::RESERVED).is_none());
    let changed: Vec<Duration> = [Round::GENESIS, Round(2), Round(3)]
        .iter()
        .filter_map(|round| governor.round_data(*round).map(|r| r.changed_at))
        .collect();
    assert_eq!(
        changed,
        vec![
            Duration::ZERO,
            Duration::from_secs(10),
            Duration::from_secs(20)
        ]
    );
    assert_eq!(governor.required_confirmations(), 8);

    // A governance message executes once.
    assert_eq!(
        h.core
            .execute_governance(&h.signers[1].address, &second.hash_prefixed()),
        Err(ConsensusError::NotReadyForExecution {
            hash: second.hash_prefixed(),
            status: MessageStatus::Success,
        })
    );
}

#[test]
fn test_admin_setters_require_admin() {
    let mut h = Harness::new(3, 0);
    let outsider = h.signers[0].address;

    assert_eq!(
        h.core
            .set_message_data(&outsider, Box::new(InMemoryMessageStore::new())),
        Err(ConsensusError::Unauthorized {
            caller: outsider,
            role: Role::Admin,
        })
    );
    assert!(matches!(
        h.core
            .populate_allowed_origins(&outsider, &[(SRC_CHAIN, ORIGIN.to_vec())]),
        Err(ConsensusError::Governance(GovernorError::Unauthorized { .. }))
    ));
    assert!(!h.core.governor().is_origin_allowed(SRC_CHAIN, &ORIGIN));

    h.allow_origin();
    assert!(h.core.governor().is_origin_allowed(SRC_CHAIN, &ORIGIN));

    // Swapping the agent manager hands authority to the new one.
    h.core
        .set_agent_manager(&ADMIN, Box::new(InMemoryAgentManager::new()))
        .unwrap();
    assert!(matches!(
        h.core
            .set_agent_manager(&ADMIN, Box::new(InMemoryAgentManager::new())),
        Err(ConsensusError::Unauthorized { .. })
    ));
}
