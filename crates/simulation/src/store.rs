//! In-memory message ledger.

use std::collections::HashMap;
use xmsg_core::{CollaboratorError, MessageStore};
use xmsg_types::{Hash, Message, MessageStatus, U256};

/// Message ledger keyed by the prefixed message hash.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    messages: HashMap<Hash, Message>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageStore for InMemoryMessageStore {
    fn store_message(&mut self, hash: Hash, message: Message) -> Result<(), CollaboratorError> {
        if self.messages.contains_key(&hash) {
            return Err(CollaboratorError::MessageAlreadyStored(hash));
        }
        self.messages.insert(hash, message);
        Ok(())
    }

    fn message(&self, hash: &Hash) -> Option<&Message> {
        self.messages.get(hash)
    }

    fn change_message_status(
        &mut self,
        hash: &Hash,
        status: MessageStatus,
    ) -> Result<(), CollaboratorError> {
        let message = self
            .messages
            .get_mut(hash)
            .ok_or(CollaboratorError::MessageNotFound(*hash))?;
        message.status = status;
        Ok(())
    }

    fn increment_native_amount(
        &mut self,
        hash: &Hash,
        amount: U256,
    ) -> Result<(), CollaboratorError> {
        let message = self
            .messages
            .get_mut(hash)
            .ok_or(CollaboratorError::MessageNotFound(*hash))?;
        let proposal = &mut message.data.initial_proposal;
        proposal.native_amount = proposal
            .native_amount
            .checked_add(amount)
            .ok_or(CollaboratorError::AmountOverflow(*hash))?;
        Ok(())
    }
}
