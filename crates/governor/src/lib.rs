//! Round governor.
//!
//! The active signer set and the consensus rate change only when a
//! governance message clears the same signature consensus as any other
//! message. The consensus engine then hands the decoded call to
//! [`RoundGovernor::execute`], which:
//!
//! 1. Checks the caller holds the consensus role
//! 2. Checks the `(chain, contract)` origin is allow-listed
//! 3. Decodes the [`RoundChange`] payload and clamps the rate to the floor
//! 4. Pushes the signer/executor batches to the agent manager
//! 5. Stores round `N + 1` and advances the current round
//!
//! Every check runs before the first mutation, so a rejected call leaves
//! no partial round behind.

mod config;
mod error;
mod governor;
mod payload;

pub use config::GovernorConfig;
pub use error::GovernorError;
pub use governor::RoundGovernor;
pub use payload::{origin_key, GovernanceCall, RoundChange};
