//! Core types for cross-chain message consensus.
//!
//! This crate holds everything the consensus engine and the round governor
//! agree on byte-for-byte:
//!
//! - [`Hash`] and the Ethereum-style signed-message prefix
//! - Agent identities ([`Address`]) and recoverable secp256k1 signatures
//! - The three storage-word codecs: [`codec::location`], [`codec::selector`]
//!   and [`codec::signature`]
//! - The message record, its status machine and the prefixed message hash
//! - Round parameters and the consensus threshold arithmetic
//!
//! Nothing here performs I/O or holds shared state.

mod agent;
mod agent_set;
pub mod codec;
mod crypto;
mod encoding;
mod execution;
mod hash;
mod identifiers;
mod message;
mod round;
mod signing;

pub use agent::{AgentStatus, AgentType};
pub use agent_set::AgentSet;
pub use codec::CodecError;
pub use crypto::{address_from_public_key, recover_address, CryptoError, KeyPair, Signature};
pub use encoding::{EncodingError, WordReader, WordWriter, WORD_BYTES};
pub use ethnum::U256;
pub use execution::{ExecutionAttempt, MessageExecutionData};
pub use hash::{Hash, HexError};
pub use identifiers::{Address, ChainId, Round};
pub use message::{
    status_change_valid, InitialProposal, Message, MessageData, MessageStatus, SrcChainData,
    StatusZone, TransmitterParams, SRC_CHAIN_DATA_BYTES,
};
pub use round::{required_confirmations, RoundData, RATE_DENOMINATOR};
pub use signing::{eth_signed_message_hash, SignaturePhase, ETH_SIGNED_MESSAGE_PREFIX};
