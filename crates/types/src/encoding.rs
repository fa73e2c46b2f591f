//! Fixed-width word encoding.
//!
//! Every integer in a hashed or decoded byte string is a 32-byte
//! big-endian word. Variable-length fields are written as
//! `word(len) || bytes`, which keeps adjacent fields from sharing a
//! boundary: `("AB", "")` and `("A", "B")` encode differently.

use crate::{Address, Hash, U256};

/// Width of one encoded word.
pub const WORD_BYTES: usize = 32;

/// Append-only encoder for word-aligned layouts.
#[derive(Debug, Clone, Default)]
pub struct WordWriter {
    buf: Vec<u8>,
}

impl WordWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append a raw 32-byte word.
    pub fn word(&mut self, word: &[u8; 32]) -> &mut Self {
        self.buf.extend_from_slice(word);
        self
    }

    /// Append a 256-bit integer.
    pub fn u256(&mut self, value: U256) -> &mut Self {
        self.word(&value.to_be_bytes())
    }

    /// Append a 128-bit integer, zero-extended to a word.
    pub fn u128(&mut self, value: u128) -> &mut Self {
        self.u256(U256::new(value))
    }

    /// Append a 64-bit integer, zero-extended to a word.
    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.u128(u128::from(value))
    }

    /// Append a boolean as 0 or 1.
    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.u64(u64::from(value))
    }

    /// Append a hash as-is.
    pub fn hash(&mut self, hash: &Hash) -> &mut Self {
        self.word(hash.as_bytes())
    }

    /// Append an address, right-aligned.
    pub fn address(&mut self, address: &Address) -> &mut Self {
        self.word(&address.to_word())
    }

    /// Append a length-prefixed byte string.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.u64(data.len() as u64);
        self.buf.extend_from_slice(data);
        self
    }

    /// Bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish and take the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a word-aligned layout produced by [`WordWriter`].
#[derive(Debug, Clone)]
pub struct WordReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WordReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], EncodingError> {
        if self.remaining() < len {
            return Err(EncodingError::UnexpectedEnd {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read a raw 32-byte word.
    pub fn word(&mut self) -> Result<[u8; 32], EncodingError> {
        let mut word = [0u8; 32];
        word.copy_from_slice(self.take(WORD_BYTES)?);
        Ok(word)
    }

    /// Read a 256-bit integer.
    pub fn u256(&mut self) -> Result<U256, EncodingError> {
        Ok(U256::from_be_bytes(self.word()?))
    }

    /// Read an integer that must fit in 128 bits.
    pub fn u128(&mut self) -> Result<u128, EncodingError> {
        let word = self.word()?;
        if word[..16].iter().any(|&b| b != 0) {
            return Err(EncodingError::ValueOverflow { bits: 128 });
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&word[16..]);
        Ok(u128::from_be_bytes(low))
    }

    /// Read an integer that must fit in 64 bits.
    pub fn u64(&mut self) -> Result<u64, EncodingError> {
        let value = self.u128()?;
        u64::try_from(value).map_err(|_| EncodingError::ValueOverflow { bits: 64 })
    }

    /// Read a boolean encoded as 0 or 1.
    pub fn bool(&mut self) -> Result<bool, EncodingError> {
        match self.u128() {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            Ok(_) | Err(EncodingError::ValueOverflow { .. }) => Err(EncodingError::InvalidBool),
            Err(e) => Err(e),
        }
    }

    /// Read a hash.
    pub fn hash(&mut self) -> Result<Hash, EncodingError> {
        Ok(Hash::from_raw(self.word()?))
    }

    /// Read a right-aligned address.
    pub fn address(&mut self) -> Result<Address, EncodingError> {
        Address::from_word(&self.word()?).ok_or(EncodingError::DirtyAddress)
    }

    /// Read a length-prefixed byte string.
    pub fn bytes(&mut self) -> Result<&'a [u8], EncodingError> {
        let len = self.u64()?;
        let len = usize::try_from(len).map_err(|_| EncodingError::ValueOverflow { bits: 64 })?;
        self.take(len)
    }

    /// Require that every byte has been consumed.
    pub fn finish(self) -> Result<(), EncodingError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(EncodingError::TrailingBytes(n)),
        }
    }
}

/// Errors from decoding word-aligned layouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// Input ended before the field was complete.
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd {
        /// Bytes the field needed.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// Integer does not fit the expected width.
    #[error("Value does not fit in {bits} bits")]
    ValueOverflow {
        /// Target width.
        bits: u32,
    },

    /// Boolean word other than 0 or 1.
    #[error("Invalid boolean word")]
    InvalidBool,

    /// Address word with non-zero padding.
    #[error("Address word has non-zero padding")]
    DirtyAddress,

    /// Input continues past the last field.
    #[error("{0} trailing bytes after last field")]
    TrailingBytes(usize),
}
