//! Cross-chain message consensus state machine.
//!
//! This crate provides the synchronous engine that decides when a message
//! may advance status. It can be driven by a chain runtime, a relayer node
//! or a deterministic test harness alike.
//!
//! # Operations
//!
//! - `add_transmission_signature` → Recover the signer, store the message on
//!   first signature, move `SAVED` to `TRANSMITTED` at threshold
//! - `add_execution_signature` → Same for the execution phase, moving
//!   `TRANSMITTED` to `QUEUED`
//! - `approve_message_delivery` → Super agents finalize at once; default
//!   agents vote per target status until the round threshold is met
//! - `add_pending_tx`, `replenish`, `resend` → Delivery bookkeeping
//! - `execute_governance` → Hand a governance message that cleared
//!   consensus to the [`RoundGovernor`](xmsg_governor::RoundGovernor)
//!
//! Every operation validates everything it needs before the first
//! mutation and returns the [`Event`](xmsg_core::Event)s it produced.

mod config;
mod delivery;
mod error;
mod records;
mod signatures;
mod state;

#[cfg(test)]
mod scenarios;

pub use config::ConsensusConfig;
pub use error::ConsensusError;
pub use records::{MessageConsensusData, MessageStatusData};
pub use state::ConsensusCore;
