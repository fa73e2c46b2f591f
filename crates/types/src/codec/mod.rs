//! Storage-word codecs.
//!
//! These layouts decide on-chain storage and gas cost on the other side of
//! the bridge, so they are reproduced bit-for-bit:
//!
//! | Codec | Layout |
//! |-------|--------|
//! | [`location`] | `chain_id (16 bytes) \|\| block_number (16 bytes)` |
//! | [`selector`] | `tag (1 byte) \|\| payload (31 bytes)` |
//! | [`signature`] | `n (1 byte) \|\| v[n] \|\| (r, s)[n]` |

pub mod location;
pub mod selector;
pub mod signature;

/// Errors from the storage-word codecs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A location component does not fit in 128 bits.
    #[error("Location component exceeds 128 bits")]
    LocationOverflow,

    /// Selector slot tag outside the known types.
    #[error("Unknown selector type tag: {0}")]
    UnknownSelectorType(u8),

    /// Execution code payload does not fit in 128 bits.
    #[error("Execution code exceeds 128 bits")]
    ExecutionCodeOverflow,

    /// More signatures than the one-byte count can describe.
    #[error("Cannot pack {0} signatures (max 255)")]
    TooManySignatures(usize),

    /// Packed signature buffer has the wrong length for its count.
    #[error("Packed signatures length mismatch: expected {expected}, got {actual}")]
    SignatureLength {
        /// Length implied by the count byte.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },
}
