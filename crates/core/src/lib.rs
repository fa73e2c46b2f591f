//! Boundaries of the consensus core.
//!
//! The consensus engine and the round governor own the vote and round
//! state. Everything else they need (agent registry, message ledger,
//! executor schedule, key mapping, chain metadata, fee accounting) is
//! reached through the object-safe traits defined here, so hosts can plug
//! in their own storage while tests use the in-memory versions.
//!
//! State-changing operations report what they did as a list of [`Event`]s.

mod error;
mod event;
mod role;
mod traits;

pub use error::CollaboratorError;
pub use event::{Approval, Event};
pub use role::Role;
pub use traits::{
    AgentManager, BalanceTracker, ChainInfo, ExecutorLottery, KeyStorage, MessageStore,
};
