//! Deterministic signed fixtures.
//!
//! Agent keys are derived from `keccak256("xmsg-agent" || index)`, so the
//! same index always yields the same address across test runs and crates.

use xmsg_types::codec::selector;
use xmsg_types::{
    Address, ChainId, Hash, InitialProposal, KeyPair, MessageData, Signature, SrcChainData,
    TransmitterParams, U256,
};

/// Source chain used by the default fixtures.
pub const SRC_CHAIN: ChainId = ChainId(1);

/// Destination chain used by the default fixtures.
pub const DEST_CHAIN: ChainId = ChainId(100);

/// A signing agent with its cached address.
#[derive(Debug, Clone)]
pub struct TestAgent {
    pub keys: KeyPair,
    pub address: Address,
}

impl TestAgent {
    /// Sign the prefixed hash of `data`.
    pub fn sign(&self, data: &MessageData) -> Signature {
        self.keys.sign_prehashed(&data.hash_prefixed())
    }

    /// Sign an arbitrary digest.
    pub fn sign_hash(&self, hash: &Hash) -> Signature {
        self.keys.sign_prehashed(hash)
    }
}

/// The agent at `index`.
pub fn agent(index: u32) -> TestAgent {
    let seed = Hash::from_parts(&[&b"xmsg-agent"[..], &index.to_be_bytes()[..]]);
    let keys = KeyPair::from_seed(seed.as_bytes())
        .expect("keccak output is a valid secp256k1 scalar with overwhelming probability");
    let address = keys.address();
    TestAgent { keys, address }
}

/// Agents `0..n`.
pub fn agents(n: u32) -> Vec<TestAgent> {
    (0..n).map(agent).collect()
}

/// A proposal to `DEST_CHAIN` calling `transfer(address,uint256)`.
pub fn sample_proposal(payload: &[u8]) -> InitialProposal {
    InitialProposal {
        dest_chain_id: DEST_CHAIN,
        native_amount: U256::new(1_000),
        selector_slot: selector::encode_default_selector(selector::function_selector(
            "transfer(address,uint256)",
        )),
        sender_addr: vec![0x5E; 20],
        dest_addr: vec![0xDE; 20],
        payload: payload.to_vec(),
        reserved: Vec::new(),
        transmitter_params: TransmitterParams {
            block_finalization_option: 1,
            custom_gas_limit: 300_000,
        }
        .encode(),
    }
}

/// Provenance on `SRC_CHAIN` at `block`, with a transaction id derived from `tag`.
pub fn src_chain_data(block: u128, tag: &[u8]) -> SrcChainData {
    SrcChainData::new(
        SRC_CHAIN,
        block,
        [Hash::from_parts(&[&b"tx"[..], tag]), Hash::from_parts(&[&b"log"[..], tag])],
    )
}

/// A complete message built from the default fixtures.
pub fn sample_message(payload: &[u8]) -> MessageData {
    MessageData::new(sample_proposal(payload), src_chain_data(42, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmsg_types::recover_address;

    #[test]
    fn test_agents_are_deterministic_and_distinct() {
        assert_eq!(agent(3).address, agent(3).address);
        let all = agents(10);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.address, b.address);
            }
        }
    }

    #[test]
    fn test_signatures_recover_to_agent() {
        let data = sample_message(b"hello");
        let signer = agent(0);
        let signature = signer.sign(&data);
        assert_eq!(
            recover_address(&data.hash_prefixed(), &signature),
            Ok(signer.address)
        );
    }
}
