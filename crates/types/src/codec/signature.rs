//! Dense multi-signature packing.
//!
//! # Layout
//!
//! ```text
//! [n: 1 byte][v_0 .. v_{n-1}: n bytes][r_0 s_0 .. r_{n-1} s_{n-1}: 64n bytes]
//! ```
//!
//! The count is a single byte, so at most 255 signatures fit in one bundle.
//! Packing more is an error, never a silent truncation. No signature is
//! checked for validity here.

use super::CodecError;
use crate::Signature;

/// Largest bundle the one-byte count can describe.
pub const MAX_PACKED_SIGNATURES: usize = u8::MAX as usize;

/// Bytes per signature in the bundle (`v` plus `r || s`).
const SIGNATURE_BYTES: usize = 65;

/// Total packed length for `count` signatures.
pub fn packed_len(count: usize) -> usize {
    1 + count * SIGNATURE_BYTES
}

/// Pack signatures in order.
pub fn pack(signatures: &[Signature]) -> Result<Vec<u8>, CodecError> {
    let count = u8::try_from(signatures.len())
        .map_err(|_| CodecError::TooManySignatures(signatures.len()))?;

    let mut out = Vec::with_capacity(packed_len(signatures.len()));
    out.push(count);
    out.extend(signatures.iter().map(|sig| sig.v));
    for sig in signatures {
        out.extend_from_slice(&sig.r);
        out.extend_from_slice(&sig.s);
    }
    Ok(out)
}

/// Unpack a bundle produced by [`pack`].
pub fn unpack(bytes: &[u8]) -> Result<Vec<Signature>, CodecError> {
    let Some(&count) = bytes.first() else {
        return Err(CodecError::SignatureLength {
            expected: 1,
            actual: 0,
        });
    };
    let count = usize::from(count);
    let expected = packed_len(count);
    if bytes.len() != expected {
        return Err(CodecError::SignatureLength {
            expected,
            actual: bytes.len(),
        });
    }

    let recovery_ids = &bytes[1..1 + count];
    let pairs = &bytes[1 + count..];

    let signatures = recovery_ids
        .iter()
        .zip(pairs.chunks_exact(64))
        .map(|(&v, pair)| {
            let mut r = [0u8; 32];
            let mut s = [0u8; 32];
            r.copy_from_slice(&pair[..32]);
            s.copy_from_slice(&pair[32..]);
            Signature::new(v, r, s)
        })
        .collect();
    Ok(signatures)
}
