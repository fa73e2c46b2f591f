//! Governance call and round change payload encodings.
//!
//! ```text
//! GovernanceCall = word(src_chain_id) || src_tx_hash[0] || src_tx_hash[1]
//!               || word(len) || sender || word(len) || payload
//!
//! RoundChange    = word(rate) || word(participant_len)
//!               || list(signers) || list(executors)
//!               || list(signer_flags) || list(executor_flags)
//! list           = word(n) || item_0 || .. || item_{n-1}   (one word per item)
//! ```

use xmsg_types::{
    Address, ChainId, EncodingError, Hash, WordReader, WordWriter, WORD_BYTES,
};

/// Allow-list key of an origin: `keccak256(word(len) || contract || word(chain))`.
pub fn origin_key(chain: ChainId, contract: &[u8]) -> Hash {
    let mut writer = WordWriter::with_capacity(2 * WORD_BYTES + contract.len());
    writer.bytes(contract).u128(chain.0);
    Hash::from_bytes(writer.as_slice())
}

/// A governance message as handed from consensus to the governor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceCall {
    pub src_chain_id: ChainId,
    pub src_tx_hash: [Hash; 2],
    /// Contract that emitted the message on the source chain.
    pub sender: Vec<u8>,
    /// Encoded [`RoundChange`].
    pub payload: Vec<u8>,
}

impl GovernanceCall {
    pub fn encode(&self) -> Vec<u8> {
        let mut writer =
            WordWriter::with_capacity(5 * WORD_BYTES + self.sender.len() + self.payload.len());
        writer
            .u128(self.src_chain_id.0)
            .hash(&self.src_tx_hash[0])
            .hash(&self.src_tx_hash[1])
            .bytes(&self.sender)
            .bytes(&self.payload);
        writer.into_bytes()
    }

    pub fn decode(data: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = WordReader::new(data);
        let call = Self {
            src_chain_id: ChainId(reader.u128()?),
            src_tx_hash: [reader.hash()?, reader.hash()?],
            sender: reader.bytes()?.to_vec(),
            payload: reader.bytes()?.to_vec(),
        };
        reader.finish()?;
        Ok(call)
    }

    /// Allow-list key of this call's origin.
    pub fn origin_key(&self) -> Hash {
        origin_key(self.src_chain_id, &self.sender)
    }
}

/// New round parameters and agent activation batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundChange {
    /// Requested consensus rate, in basis points.
    pub consensus_rate: u64,
    /// Active signer count for the new round.
    pub participant_len: u64,
    pub signers: Vec<Address>,
    pub executors: Vec<Address>,
    pub signer_flags: Vec<bool>,
    pub executor_flags: Vec<bool>,
}

impl RoundChange {
    pub fn encode(&self) -> Vec<u8> {
        let items = self.signers.len()
            + self.executors.len()
            + self.signer_flags.len()
            + self.executor_flags.len();
        let mut writer = WordWriter::with_capacity((6 + items) * WORD_BYTES);
        writer.u64(self.consensus_rate).u64(self.participant_len);

        writer.u64(self.signers.len() as u64);
        for signer in &self.signers {
            writer.address(signer);
        }
        writer.u64(self.executors.len() as u64);
        for executor in &self.executors {
            writer.address(executor);
        }
        writer.u64(self.signer_flags.len() as u64);
        for flag in &self.signer_flags {
            writer.bool(*flag);
        }
        writer.u64(self.executor_flags.len() as u64);
        for flag in &self.executor_flags {
            writer.bool(*flag);
        }
        writer.into_bytes()
    }

    pub fn decode(data: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = WordReader::new(data);
        let change = Self {
            consensus_rate: reader.u64()?,
            participant_len: reader.u64()?,
            signers: read_list(&mut reader, WordReader::address)?,
            executors: read_list(&mut reader, WordReader::address)?,
            signer_flags: read_list(&mut reader, WordReader::bool)?,
            executor_flags: read_list(&mut reader, WordReader::bool)?,
        };
        reader.finish()?;
        Ok(change)
    }
}

fn read_list<'a, T>(
    reader: &mut WordReader<'a>,
    item: fn(&mut WordReader<'a>) -> Result<T, EncodingError>,
) -> Result<Vec<T>, EncodingError> {
    let count = reader.u64()?;
    // Bound the allocation by what the input can actually hold.
    let needed = usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(WORD_BYTES))
        .unwrap_or(usize::MAX);
    if needed > reader.remaining() {
        return Err(EncodingError::UnexpectedEnd {
            needed,
            remaining: reader.remaining(),
        });
    }
    (0..count).map(|_| item(reader)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_change() -> RoundChange {
        RoundChange {
            consensus_rate: 6_600,
            participant_len: 3,
            signers: vec![Address([1; 20]), Address([2; 20]), Address([3; 20])],
            executors: vec![Address([9; 20])],
            signer_flags: vec![true, true, false],
            executor_flags: vec![true],
        }
    }

    #[test]
    fn test_round_change_layout() {
        let encoded = sample_change().encode();
        // 2 scalars, 4 counts, 3 + 1 + 3 + 1 items.
        assert_eq!(encoded.len(), (2 + 4 + 8) * WORD_BYTES);
        assert_eq!(encoded[WORD_BYTES - 2..WORD_BYTES], [0x19, 0xc8]);
        assert_eq!(encoded[3 * WORD_BYTES - 1], 3);
        assert_eq!(RoundChange::decode(&encoded), Ok(sample_change()));
    }

    #[test]
    fn test_round_change_rejects_bad_flag() {
        let mut encoded = sample_change().encode();
        let last = encoded.len() - 1;
        encoded[last] = 2;
        assert_eq!(
            RoundChange::decode(&encoded),
            Err(EncodingError::InvalidBool)
        );
    }

    #[test]
    fn test_round_change_rejects_oversized_count() {
        let mut writer = WordWriter::new();
        writer.u64(6_000).u64(1).u64(u64::MAX);
        assert!(matches!(
            RoundChange::decode(writer.as_slice()),
            Err(EncodingError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_governance_call_decode() {
        let call = GovernanceCall {
            src_chain_id: ChainId(56),
            src_tx_hash: [Hash::from_bytes(b"a"), Hash::from_bytes(b"b")],
            sender: vec![0xAB; 20],
            payload: sample_change().encode(),
        };
        let encoded = call.encode();
        assert_eq!(GovernanceCall::decode(&encoded), Ok(call.clone()));

        let mut trailing = encoded;
        trailing.push(0);
        assert_eq!(
            GovernanceCall::decode(&trailing),
            Err(EncodingError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_origin_key_binds_chain_and_contract() {
        let contract = [0x11u8; 20];
        assert_eq!(origin_key(ChainId(1), &contract), origin_key(ChainId(1), &contract));
        assert_ne!(origin_key(ChainId(1), &contract), origin_key(ChainId(2), &contract));
        assert_ne!(
            origin_key(ChainId(1), &contract),
            origin_key(ChainId(1), &contract[..19])
        );
    }
}
