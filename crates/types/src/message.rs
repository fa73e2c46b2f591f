//! Cross-chain message record, status machine and message hash.
//!
//! # Message hash
//!
//! The global identifier of a message is `hash_prefixed`:
//!
//! ```text
//! encoded = word(dest_chain_id) || word(native_amount) || selector_slot
//!        || word(len) || sender_addr || word(len) || dest_addr
//!        || word(len) || payload     || word(len) || reserved
//!        || word(len) || transmitter_params
//!        || location || src_op_tx_id[0] || src_op_tx_id[1]
//! hash_prefixed = keccak256("\x19Ethereum Signed Message:\n32" || keccak256(encoded))
//! ```
//!
//! Every variable-length field carries its own length, so moving bytes
//! across a field boundary always changes the hash.

use crate::codec::location;
use crate::{eth_signed_message_hash, ChainId, EncodingError, Hash, WordReader, WordWriter, U256};
use serde::{Deserialize, Serialize};

/// Length of raw source-chain data: location word plus two transaction id words.
pub const SRC_CHAIN_DATA_BYTES: usize = 96;

/// Lifecycle status of a message.
///
/// Declaration order is the protocol order; the discriminants are stable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum MessageStatus {
    #[default]
    NotInitialized = 0,
    Invalid = 1,
    Saved = 2,
    Transmitted = 3,
    Queued = 4,
    Pending = 5,
    ProtocolFailed = 6,
    ConsensusNotReached = 7,
    ExtensionNotRegistered = 8,
    ExtensionNotReachable = 9,
    ExtensionPanicked = 10,
    Underestimated = 11,
    Success = 12,
    Failed = 13,
}

/// Conceptual zone a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusZone {
    /// `NotInitialized`.
    Uninitialized,
    /// `Invalid` through `Transmitted`.
    Consensus,
    /// `Queued` through `Pending`.
    Executor,
    /// `ProtocolFailed` through `Failed`.
    Delivery,
}

impl MessageStatus {
    /// Every status in protocol order.
    pub const ALL: [MessageStatus; 14] = [
        MessageStatus::NotInitialized,
        MessageStatus::Invalid,
        MessageStatus::Saved,
        MessageStatus::Transmitted,
        MessageStatus::Queued,
        MessageStatus::Pending,
        MessageStatus::ProtocolFailed,
        MessageStatus::ConsensusNotReached,
        MessageStatus::ExtensionNotRegistered,
        MessageStatus::ExtensionNotReachable,
        MessageStatus::ExtensionPanicked,
        MessageStatus::Underestimated,
        MessageStatus::Success,
        MessageStatus::Failed,
    ];

    /// Absorbing states: no transition out of them is permitted.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MessageStatus::Invalid
                | MessageStatus::Failed
                | MessageStatus::Success
                | MessageStatus::ProtocolFailed
        )
    }

    /// The zone this status belongs to.
    pub fn zone(self) -> StatusZone {
        match self {
            MessageStatus::NotInitialized => StatusZone::Uninitialized,
            MessageStatus::Invalid | MessageStatus::Saved | MessageStatus::Transmitted => {
                StatusZone::Consensus
            }
            MessageStatus::Queued | MessageStatus::Pending => StatusZone::Executor,
            _ => StatusZone::Delivery,
        }
    }

    /// Stable one-byte discriminant.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        MessageStatus::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(value)
    }
}

/// Whether a message may move from `old` to `new`.
///
/// Only two rules apply: nothing returns to `NotInitialized`, and terminal
/// states are final. Any other jump between non-terminal states is
/// accepted, so out-of-order protocol feedback (for example `Saved`
/// straight to `Underestimated`) is not lost.
pub fn status_change_valid(old: MessageStatus, new: MessageStatus) -> bool {
    new != MessageStatus::NotInitialized && !old.is_terminal()
}

/// Finalization option and gas limit a transmitter must honour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmitterParams {
    /// Source-chain block finalization requirement.
    pub block_finalization_option: u64,
    /// Gas limit for execution on the destination chain.
    pub custom_gas_limit: u128,
}

impl TransmitterParams {
    /// Encode as two words.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = WordWriter::with_capacity(64);
        writer
            .u64(self.block_finalization_option)
            .u128(self.custom_gas_limit);
        writer.into_bytes()
    }

    /// Decode the two-word form.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = WordReader::new(bytes);
        let params = Self {
            block_finalization_option: reader.u64()?,
            custom_gas_limit: reader.u128()?,
        };
        reader.finish()?;
        Ok(params)
    }
}

/// The message as proposed on the source chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialProposal {
    /// Destination chain.
    pub dest_chain_id: ChainId,
    /// Native value to deliver with the call.
    pub native_amount: U256,
    /// Tagged selector slot (see [`crate::codec::selector`]).
    pub selector_slot: U256,
    /// Sender in source-chain native bytes.
    pub sender_addr: Vec<u8>,
    /// Receiver in destination-chain native bytes.
    pub dest_addr: Vec<u8>,
    /// Opaque call payload.
    pub payload: Vec<u8>,
    /// Opaque reserved bytes.
    pub reserved: Vec<u8>,
    /// Encoded [`TransmitterParams`].
    pub transmitter_params: Vec<u8>,
}

/// Source-chain provenance of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SrcChainData {
    /// Packed `(source chain id, source block number)`.
    pub location: U256,
    /// Identifier of the originating transaction.
    pub src_op_tx_id: [Hash; 2],
}

impl SrcChainData {
    /// Build provenance from its parts.
    pub fn new(src_chain_id: ChainId, src_block_number: u128, src_op_tx_id: [Hash; 2]) -> Self {
        Self {
            location: location::pack(src_chain_id, src_block_number),
            src_op_tx_id,
        }
    }

    /// Source chain id.
    pub fn src_chain_id(&self) -> ChainId {
        location::get_chain(self.location)
    }

    /// Source block number.
    pub fn src_block_number(&self) -> u128 {
        location::get_block(self.location)
    }

    /// Raw form: `location || src_op_tx_id[0] || src_op_tx_id[1]`.
    pub fn encode(&self) -> [u8; SRC_CHAIN_DATA_BYTES] {
        let mut out = [0u8; SRC_CHAIN_DATA_BYTES];
        out[..32].copy_from_slice(&self.location.to_be_bytes());
        out[32..64].copy_from_slice(self.src_op_tx_id[0].as_bytes());
        out[64..].copy_from_slice(self.src_op_tx_id[1].as_bytes());
        out
    }

    /// Decode the raw form; the input must be exactly 96 bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = WordReader::new(bytes);
        let data = Self {
            location: reader.u256()?,
            src_op_tx_id: [reader.hash()?, reader.hash()?],
        };
        reader.finish()?;
        Ok(data)
    }
}

/// Proposal plus provenance: everything the message hash covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageData {
    pub initial_proposal: InitialProposal,
    pub src_chain_data: SrcChainData,
}

impl MessageData {
    /// Pair a proposal with its provenance.
    pub fn new(initial_proposal: InitialProposal, src_chain_data: SrcChainData) -> Self {
        Self {
            initial_proposal,
            src_chain_data,
        }
    }

    /// The length-prefixed encoding the hash is taken over.
    pub fn encode(&self) -> Vec<u8> {
        let p = &self.initial_proposal;
        let variable = p.sender_addr.len()
            + p.dest_addr.len()
            + p.payload.len()
            + p.reserved.len()
            + p.transmitter_params.len();
        let mut writer = WordWriter::with_capacity(11 * 32 + variable);
        writer
            .u128(p.dest_chain_id.0)
            .u256(p.native_amount)
            .u256(p.selector_slot)
            .bytes(&p.sender_addr)
            .bytes(&p.dest_addr)
            .bytes(&p.payload)
            .bytes(&p.reserved)
            .bytes(&p.transmitter_params)
            .u256(self.src_chain_data.location)
            .hash(&self.src_chain_data.src_op_tx_id[0])
            .hash(&self.src_chain_data.src_op_tx_id[1]);
        writer.into_bytes()
    }

    /// Keccak-256 of [`Self::encode`].
    pub fn msg_hash(&self) -> Hash {
        Hash::from_bytes(&self.encode())
    }

    /// Global message identifier: the signed-message-prefixed hash.
    pub fn hash_prefixed(&self) -> Hash {
        eth_signed_message_hash(&self.msg_hash())
    }
}

/// A stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub status: MessageStatus,
    pub global_nonce: u64,
    pub data: MessageData,
}

impl Message {
    /// A freshly saved message.
    pub fn saved(global_nonce: u64, data: MessageData) -> Self {
        Self {
            status: MessageStatus::Saved,
            global_nonce,
            data,
        }
    }

    /// Source chain the message came from.
    pub fn src_chain_id(&self) -> ChainId {
        self.data.src_chain_data.src_chain_id()
    }
}
