//! In-memory collaborators.
//!
//! Reference implementations of every trait in `xmsg-core`, with no I/O
//! and no hidden clocks. Given the same calls they produce the same state,
//! which makes them the backing store for tests and local runs:
//!
//! - [`InMemoryAgentManager`]: agents, roles, chain binding, rate floor
//! - [`InMemoryMessageStore`]: the message ledger
//! - [`TimeSlicedLottery`]: rotating executor windows
//! - [`StaticKeyStorage`], [`StaticChainInfo`]: fixed lookup tables
//! - [`RecordingBalanceTracker`]: replenishment log with per-chain totals

mod agents;
mod balance;
mod lottery;
mod registry;
mod store;

pub use agents::InMemoryAgentManager;
pub use balance::RecordingBalanceTracker;
pub use lottery::TimeSlicedLottery;
pub use registry::{StaticChainInfo, StaticKeyStorage};
pub use store::InMemoryMessageStore;
