//! Selector slot tagging.
//!
//! The most significant byte of a selector slot says how to read the rest:
//!
//! ```text
//! SELECTOR        00 | s0 s1 s2 s3 | 00 .. 00
//! EXECUTION_CODE  01 | 00 .. 00 code (big-endian) ..
//! ```
//!
//! A default selector is the first four bytes of the keccak hash of a
//! function signature, left-aligned right after the tag. An execution code
//! is a protocol-internal command number right-aligned in the payload.

use super::CodecError;
use crate::{Hash, U256};
use serde::{Deserialize, Serialize};

/// Type tag stored in the top byte of a selector slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SelectorType {
    /// Four-byte function selector.
    Selector = 0,
    /// Protocol-internal command number.
    ExecutionCode = 1,
}

impl TryFrom<u8> for SelectorType {
    type Error = CodecError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(SelectorType::Selector),
            1 => Ok(SelectorType::ExecutionCode),
            other => Err(CodecError::UnknownSelectorType(other)),
        }
    }
}

/// First four bytes of `keccak256(signature)`, e.g. `"transfer(address,uint256)"`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Hash::from_bytes(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Tag a four-byte function selector.
pub fn encode_default_selector(selector: [u8; 4]) -> U256 {
    let mut word = [0u8; 32];
    word[0] = SelectorType::Selector as u8;
    word[1..5].copy_from_slice(&selector);
    U256::from_be_bytes(word)
}

/// Tag a protocol execution code.
pub fn encode_execution_code(code: u128) -> U256 {
    let mut word = [0u8; 32];
    word[0] = SelectorType::ExecutionCode as u8;
    word[16..].copy_from_slice(&code.to_be_bytes());
    U256::from_be_bytes(word)
}

/// Read the type tag, rejecting unknown values.
pub fn get_type(slot: U256) -> Result<SelectorType, CodecError> {
    SelectorType::try_from(slot.to_be_bytes()[0])
}

/// Extract `(selector, execution code)`; the one not selected by the tag is zero.
pub fn extract(slot: U256) -> Result<([u8; 4], u128), CodecError> {
    let word = slot.to_be_bytes();
    match get_type(slot)? {
        SelectorType::Selector => {
            let mut selector = [0u8; 4];
            selector.copy_from_slice(&word[1..5]);
            Ok((selector, 0))
        }
        SelectorType::ExecutionCode => {
            if word[1..16].iter().any(|&b| b != 0) {
                return Err(CodecError::ExecutionCodeOverflow);
            }
            let mut code = [0u8; 16];
            code.copy_from_slice(&word[16..]);
            Ok(([0u8; 4], u128::from_be_bytes(code)))
        }
    }
}

/// The slot with its tag byte cleared, for payload-only comparisons.
pub fn unmasked(slot: U256) -> U256 {
    let mut word = slot.to_be_bytes();
    word[0] = 0;
    U256::from_be_bytes(word)
}
