//! Transmission and execution signature collection.

use crate::{ConsensusCore, ConsensusError};
use tracing::{debug, warn};
use xmsg_core::{Approval, Event, Role};
use xmsg_types::{
    Address, Hash, InitialProposal, Message, MessageData, MessageStatus, Signature,
    SignaturePhase, SrcChainData,
};

impl ConsensusCore {
    /// Add a transmission signature for a proposal with its raw provenance.
    ///
    /// The message hash is derived from the inputs, so the signature can
    /// only be counted for the message it actually signs. The first
    /// accepted signature stores the message as `SAVED`.
    pub fn add_transmission_signature(
        &mut self,
        caller: &Address,
        proposal: &InitialProposal,
        src_chain_data_raw: &[u8],
        signature: &Signature,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_role(Role::Relayer, caller)?;

        let src_chain_data = SrcChainData::decode(src_chain_data_raw)?;
        let chain = src_chain_data.src_chain_id();
        if let Some(chains) = &self.chain_info {
            if !chains.is_supported(chain) {
                return Err(ConsensusError::UnsupportedChain(chain));
            }
        }

        let data = MessageData::new(proposal.clone(), src_chain_data);
        let hash = data.hash_prefixed();
        let signer = self.resolve_signer(chain, &hash, signature)?;
        if let Some(bound) = self.agents.agent_chain(&signer) {
            if bound != chain {
                warn!(
                    signer = %signer,
                    bound = bound.0,
                    claimed = chain.0,
                    "Signer bound to another chain"
                );
                return Err(ConsensusError::ChainMismatch {
                    expected: bound,
                    actual: chain,
                });
            }
        }

        self.record_transmission(hash, Some(data), signer, *signature)
    }

    /// Add a transmission signature for a message already in the ledger.
    ///
    /// Skips re-deriving the hash; duplicate signers are still rejected.
    pub fn add_transmission_signature_no_check(
        &mut self,
        caller: &Address,
        hash: &Hash,
        signature: &Signature,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_role(Role::Relayer, caller)?;
        let chain = self.require_message(hash)?.src_chain_id();
        let signer = self.resolve_signer(chain, hash, signature)?;
        self.record_transmission(*hash, None, signer, *signature)
    }

    /// Add an execution signature. Moves `TRANSMITTED` to `QUEUED` at threshold.
    pub fn add_execution_signature(
        &mut self,
        caller: &Address,
        hash: &Hash,
        signature: &Signature,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.require_role(Role::Relayer, caller)?;
        let message = self.require_message(hash)?;
        let dest_chain = message.data.initial_proposal.dest_chain_id;
        let status = message.status;

        let signer = self.resolve_signer(dest_chain, hash, signature)?;
        self.check_not_signed(hash, SignaturePhase::Execution, &signer)?;

        let count = self.signature_count(hash, SignaturePhase::Execution) + 1;
        let reaches_threshold = count as u64 >= self.governor.required_confirmations();

        let mut events = Vec::new();
        if reaches_threshold && status == MessageStatus::Transmitted {
            events.push(self.finalize_status(
                hash,
                status,
                MessageStatus::Queued,
                Approval::Protocol,
            )?);
        }

        let count = self.consensus.entry(*hash).or_default().add_signature(
            SignaturePhase::Execution,
            &signer,
            *signature,
        );
        debug!(hash = %hash, signer = %signer, count, "Execution signature added");
        events.insert(
            0,
            Event::SignatureAdded {
                hash: *hash,
                phase: SignaturePhase::Execution,
                signer,
                count,
            },
        );
        Ok(events)
    }

    /// Append a transmission signature, storing the message on first sight.
    fn record_transmission(
        &mut self,
        hash: Hash,
        data: Option<MessageData>,
        signer: Address,
        signature: Signature,
    ) -> Result<Vec<Event>, ConsensusError> {
        self.check_not_signed(&hash, SignaturePhase::Transmission, &signer)?;

        let count = self.signature_count(&hash, SignaturePhase::Transmission) + 1;
        let reaches_threshold = count as u64 >= self.governor.required_confirmations();

        let mut events = Vec::new();

        // Ledger writes first: they are the only fallible steps.
        if !self.store.contains(&hash) {
            let data = data.ok_or(ConsensusError::MessageNotFound(hash))?;
            let global_nonce = self.next_global_nonce;
            self.store
                .store_message(hash, Message::saved(global_nonce, data))?;
            self.next_global_nonce += 1;
            debug!(hash = %hash, global_nonce, proposer = %signer, "Message proposed");
            events.push(Event::MessageProposed {
                hash,
                global_nonce,
                proposer: signer,
            });
        }

        let status = self.store.msg_status(&hash);
        let transition = if reaches_threshold && status == MessageStatus::Saved {
            Some(self.finalize_status(
                &hash,
                status,
                MessageStatus::Transmitted,
                Approval::Protocol,
            )?)
        } else {
            None
        };

        let record = self.consensus.entry(hash).or_default();
        record.firstly_proposed_by.get_or_insert(signer);
        record.transmission_consensus |= reaches_threshold;
        let count = record.add_signature(SignaturePhase::Transmission, &signer, signature);
        debug!(hash = %hash, signer = %signer, count, "Transmission signature added");

        events.push(Event::SignatureAdded {
            hash,
            phase: SignaturePhase::Transmission,
            signer,
            count,
        });
        events.extend(transition);
        Ok(events)
    }

    fn check_not_signed(
        &self,
        hash: &Hash,
        phase: SignaturePhase,
        signer: &Address,
    ) -> Result<(), ConsensusError> {
        let signed = self
            .consensus
            .get(hash)
            .is_some_and(|data| data.has_signed(phase, signer));
        if signed {
            debug!(hash = %hash, signer = %signer, ?phase, "Duplicate signature rejected");
            return Err(ConsensusError::DuplicateSignature {
                hash: *hash,
                signer: *signer,
            });
        }
        Ok(())
    }

    fn signature_count(&self, hash: &Hash, phase: SignaturePhase) -> usize {
        self.consensus
            .get(hash)
            .map_or(0, |data| data.signatures(phase).len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use xmsg_core::CollaboratorError;
    use xmsg_governor::{GovernorConfig, RoundGovernor};
    use xmsg_simulation::{
        InMemoryAgentManager, InMemoryMessageStore, StaticChainInfo, StaticKeyStorage,
    };
    use xmsg_test_helpers::{agent, agents, sample_message, TestAgent, DEST_CHAIN, SRC_CHAIN};
    use xmsg_types::{AgentType, ChainId};
    use crate::ConsensusConfig;

    const RELAYER: Address = Address([0xEE; 20]);
    const ADMIN: Address = Address([0xAD; 20]);

    fn core(signers: &[TestAgent], required_of_ten: u64) -> ConsensusCore {
        let mut manager = InMemoryAgentManager::new()
            .with_role(Role::Relayer, RELAYER)
            .with_role(Role::Admin, ADMIN);
        for signer in signers {
            manager = manager.with_agent(signer.address, AgentType::Default, None);
        }
        let governor = RoundGovernor::new(
            GovernorConfig::default()
                .with_initial_consensus_rate(required_of_ten * 1_000)
                .with_initial_active_signers(10),
        );
        ConsensusCore::new(
            ConsensusConfig::default(),
            governor,
            Box::new(manager),
            Box::new(InMemoryMessageStore::new()),
        )
    }

    fn submit(
        core: &mut ConsensusCore,
        signer: &TestAgent,
        data: &MessageData,
    ) -> Result<Vec<Event>, ConsensusError> {
        core.add_transmission_signature(
            &RELAYER,
            &data.initial_proposal,
            &data.src_chain_data.encode(),
            &signer.sign(data),
        )
    }

    #[traced_test]
    #[test]
    fn test_first_signature_stores_message() {
        let signers = agents(3);
        let mut core = core(&signers, 6);
        let data = sample_message(b"first");
        let hash = data.hash_prefixed();

        let events = submit(&mut core, &signers[0], &data).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Event::MessageProposed {
                hash,
                global_nonce: 1,
                proposer: signers[0].address,
            }
        );
        assert_eq!(core.message_status(&hash), MessageStatus::Saved);
        assert_eq!(core.firstly_proposed_by(&hash), Some(signers[0].address));
        assert_eq!(core.next_global_nonce(), 2);
        assert!(core.is_message_signed(&hash, &signers[0].address));
        assert!(logs_contain("Transmission signature added"));

        // Second signer does not re-store or move the proposer.
        let events = submit(&mut core, &signers[1], &data).unwrap();
        assert!(matches!(events[..], [Event::SignatureAdded { count: 2, .. }]));
        assert_eq!(core.firstly_proposed_by(&hash), Some(signers[0].address));
        assert_eq!(core.next_global_nonce(), 2);
    }

    #[test]
    fn test_duplicate_signature_rejected() {
        let signers = agents(2);
        let mut core = core(&signers, 6);
        let data = sample_message(b"dup");
        let hash = data.hash_prefixed();

        submit(&mut core, &signers[0], &data).unwrap();
        assert_eq!(
            submit(&mut core, &signers[0], &data),
            Err(ConsensusError::DuplicateSignature {
                hash,
                signer: signers[0].address,
            })
        );
        assert_eq!(core.transmission_signatures(&hash).len(), 1);

        assert_eq!(
            core.add_transmission_signature_no_check(&RELAYER, &hash, &signers[0].sign(&data)),
            Err(ConsensusError::DuplicateSignature {
                hash,
                signer: signers[0].address,
            })
        );
    }

    #[test]
    fn test_unknown_signer_rejected() {
        let signers = agents(2);
        let mut core = core(&signers[..1], 6);
        let data = sample_message(b"stranger");

        assert_eq!(
            submit(&mut core, &signers[1], &data),
            Err(ConsensusError::UnauthorizedSigner(signers[1].address))
        );
        assert_eq!(core.message_status(&data.hash_prefixed()), MessageStatus::NotInitialized);
    }

    #[test]
    fn test_signature_over_other_message_is_not_counted_for_this_one() {
        let signers = agents(1);
        let mut core = core(&signers, 6);
        let data = sample_message(b"real");
        let other = sample_message(b"other");

        // Recovers to some unrelated key.
        let result = core.add_transmission_signature(
            &RELAYER,
            &data.initial_proposal,
            &data.src_chain_data.encode(),
            &signers[0].sign(&other),
        );
        assert!(matches!(
            result,
            Err(ConsensusError::UnauthorizedSigner(_) | ConsensusError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_relayer_role_required() {
        let signers = agents(1);
        let mut core = core(&signers, 6);
        let data = sample_message(b"role");

        let result = core.add_transmission_signature(
            &ADMIN,
            &data.initial_proposal,
            &data.src_chain_data.encode(),
            &signers[0].sign(&data),
        );
        assert_eq!(
            result,
            Err(ConsensusError::Unauthorized {
                caller: ADMIN,
                role: Role::Relayer,
            })
        );
    }

    #[test]
    fn test_malformed_provenance_rejected() {
        let signers = agents(1);
        let mut core = core(&signers, 6);
        let data = sample_message(b"raw");
        let raw = data.src_chain_data.encode();

        let result = core.add_transmission_signature(
            &RELAYER,
            &data.initial_proposal,
            &raw[..64],
            &signers[0].sign(&data),
        );
        assert!(matches!(result, Err(ConsensusError::Encoding(_))));
    }

    #[test]
    fn test_transmission_threshold_moves_to_transmitted() {
        let signers = agents(10);
        let mut core = core(&signers, 6);
        let data = sample_message(b"threshold");
        let hash = data.hash_prefixed();

        for signer in &signers[..5] {
            submit(&mut core, signer, &data).unwrap();
        }
        assert_eq!(core.message_status(&hash), MessageStatus::Saved);

        let events = submit(&mut core, &signers[5], &data).unwrap();
        assert_eq!(
            events.last(),
            Some(&Event::StatusChanged {
                hash,
                from: MessageStatus::Saved,
                to: MessageStatus::Transmitted,
                approval: Approval::Protocol,
            })
        );
        assert_eq!(core.message_status(&hash), MessageStatus::Transmitted);

        // Further signatures are kept but change nothing.
        let events = submit(&mut core, &signers[6], &data).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(core.transmission_signatures(&hash).len(), 7);
    }

    #[test]
    fn test_execution_threshold_moves_to_queued() {
        let signers = agents(10);
        let mut core = core(&signers, 2);
        let data = sample_message(b"exec");
        let hash = data.hash_prefixed();

        // Execution signatures need a stored message.
        assert_eq!(
            core.add_execution_signature(&RELAYER, &hash, &signers[0].sign(&data)),
            Err(ConsensusError::MessageNotFound(hash))
        );

        submit(&mut core, &signers[0], &data).unwrap();
        submit(&mut core, &signers[1], &data).unwrap();
        assert_eq!(core.message_status(&hash), MessageStatus::Transmitted);

        // The same agent may sign once per phase.
        core.add_execution_signature(&RELAYER, &hash, &signers[0].sign(&data))
            .unwrap();
        assert!(core.is_execution_signed(&hash, &signers[0].address));
        assert_eq!(
            core.add_execution_signature(&RELAYER, &hash, &signers[0].sign(&data)),
            Err(ConsensusError::DuplicateSignature {
                hash,
                signer: signers[0].address,
            })
        );

        let events = core
            .add_execution_signature(&RELAYER, &hash, &signers[1].sign(&data))
            .unwrap();
        assert!(matches!(
            events[..],
            [
                Event::SignatureAdded {
                    phase: SignaturePhase::Execution,
                    count: 2,
                    ..
                },
                Event::StatusChanged {
                    to: MessageStatus::Queued,
                    ..
                }
            ]
        ));
        assert_eq!(core.message_status(&hash), MessageStatus::Queued);
        assert_eq!(core.execution_signatures(&hash).len(), 2);
    }

    #[test]
    fn test_packed_accessors() {
        let signers = agents(3);
        let mut core = core(&signers, 6);
        let data = sample_message(b"packed");
        let hash = data.hash_prefixed();

        assert_eq!(core.transmission_signatures_packed(&hash), Ok(vec![0]));
        for signer in &signers {
            submit(&mut core, signer, &data).unwrap();
        }
        let packed = core.transmission_signatures_packed(&hash).unwrap();
        assert_eq!(packed.len(), 1 + 3 * 65);
        assert_eq!(
            xmsg_types::codec::signature::unpack(&packed).unwrap(),
            core.transmission_signatures(&hash)
        );
    }

    #[test]
    fn test_key_storage_maps_keys_to_agents() {
        let owner = agent(0);
        let hot_key = agent(50);
        let mut core = core(std::slice::from_ref(&owner), 6);
        core.set_key_storage(
            &ADMIN,
            Box::new(StaticKeyStorage::new().with_key(SRC_CHAIN, hot_key.address, owner.address)),
        )
        .unwrap();

        let data = sample_message(b"keys");
        let hash = data.hash_prefixed();
        submit(&mut core, &hot_key, &data).unwrap();
        assert!(core.is_message_signed(&hash, &owner.address));

        // The owner's own key is not registered as a signing key.
        assert_eq!(
            submit(&mut core, &owner, &data),
            Err(ConsensusError::UnauthorizedSigner(owner.address))
        );
    }

    #[test]
    fn test_chain_binding_and_support() {
        let bound = agent(0);
        let manager = InMemoryAgentManager::new()
            .with_role(Role::Relayer, RELAYER)
            .with_role(Role::Admin, ADMIN)
            .with_agent(bound.address, AgentType::Default, Some(ChainId(999)));
        let mut core = ConsensusCore::new(
            ConsensusConfig::default(),
            RoundGovernor::new(GovernorConfig::default().with_initial_active_signers(1)),
            Box::new(manager),
            Box::new(InMemoryMessageStore::new()),
        );
        let data = sample_message(b"bound");

        assert_eq!(
            submit(&mut core, &bound, &data),
            Err(ConsensusError::ChainMismatch {
                expected: ChainId(999),
                actual: SRC_CHAIN,
            })
        );

        core.set_chain_info(&ADMIN, Box::new(StaticChainInfo::new().with_chain(DEST_CHAIN, 18)))
            .unwrap();
        assert_eq!(
            submit(&mut core, &bound, &data),
            Err(ConsensusError::UnsupportedChain(SRC_CHAIN))
        );
    }

    #[test]
    fn test_no_check_requires_stored_message() {
        let signers = agents(1);
        let mut core = core(&signers, 6);
        let hash = Hash::from_bytes(b"unknown");
        assert_eq!(
            core.add_transmission_signature_no_check(&RELAYER, &hash, &Signature::zero()),
            Err(ConsensusError::MessageNotFound(hash))
        );
        // Collaborator errors stay distinguishable from engine errors.
        assert_ne!(
            ConsensusError::MessageNotFound(hash),
            ConsensusError::Collaborator(CollaboratorError::MessageNotFound(hash))
        );
    }
}
