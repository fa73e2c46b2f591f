//! Source-chain location packing.
//!
//! A location is a `(source chain id, source block number)` pair stored in
//! one word: the chain id fills the high 16 bytes, the block number the low
//! 16 bytes, both big-endian.

use super::CodecError;
use crate::{ChainId, U256};

/// Pack a chain id and block number into one word.
pub fn pack(chain_id: ChainId, block_number: u128) -> U256 {
    let mut word = [0u8; 32];
    word[..16].copy_from_slice(&chain_id.0.to_be_bytes());
    word[16..].copy_from_slice(&block_number.to_be_bytes());
    U256::from_be_bytes(word)
}

/// Pack two full-width words, rejecting components wider than 128 bits.
///
/// Use this at boundaries that receive untyped 256-bit values; silently
/// shifting an oversized chain id would alias another chain.
pub fn pack_words(chain_id: U256, block_number: U256) -> Result<U256, CodecError> {
    let limit = U256::new(u128::MAX);
    if chain_id > limit || block_number > limit {
        return Err(CodecError::LocationOverflow);
    }
    Ok(pack(ChainId(low_half(chain_id)), low_half(block_number)))
}

/// Split a location word into `(chain id, block number)`.
pub fn unpack(location: U256) -> (ChainId, u128) {
    (get_chain(location), get_block(location))
}

/// Chain id half of a location word.
pub fn get_chain(location: U256) -> ChainId {
    let word = location.to_be_bytes();
    let mut high = [0u8; 16];
    high.copy_from_slice(&word[..16]);
    ChainId(u128::from_be_bytes(high))
}

/// Block number half of a location word.
pub fn get_block(location: U256) -> u128 {
    low_half(location)
}

fn low_half(value: U256) -> u128 {
    let word = value.to_be_bytes();
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    u128::from_be_bytes(low)
}
