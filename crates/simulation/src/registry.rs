//! Fixed lookup tables for signing keys and chain metadata.

use std::collections::HashMap;
use xmsg_core::{ChainInfo, KeyStorage};
use xmsg_types::{Address, ChainId};

/// Chain-specific signing keys mapped to their agents.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyStorage {
    keys: HashMap<(ChainId, Address), Address>,
}

impl StaticKeyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` on `chain` to `agent`.
    pub fn with_key(mut self, chain: ChainId, key: Address, agent: Address) -> Self {
        self.keys.insert((chain, key), agent);
        self
    }
}

impl KeyStorage for StaticKeyStorage {
    fn agent_for_key(&self, chain: ChainId, key: &Address) -> Option<Address> {
        self.keys.get(&(chain, *key)).copied()
    }
}

/// Supported chains and their native decimals.
#[derive(Debug, Clone, Default)]
pub struct StaticChainInfo {
    decimals: HashMap<ChainId, u8>,
}

impl StaticChainInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain: ChainId, decimals: u8) -> Self {
        self.decimals.insert(chain, decimals);
        self
    }
}

impl ChainInfo for StaticChainInfo {
    fn is_supported(&self, chain: ChainId) -> bool {
        self.decimals.contains_key(&chain)
    }

    fn decimals(&self, chain: ChainId) -> Option<u8> {
        self.decimals.get(&chain).copied()
    }
}
