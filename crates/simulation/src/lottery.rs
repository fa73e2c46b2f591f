//! Time-sliced executor rotation.

use std::time::Duration;
use xmsg_core::ExecutorLottery;
use xmsg_types::{Address, Hash};

/// Rotates a fixed-size window over the executor list every `frame`.
///
/// The window start is offset by the message hash, so concurrent messages
/// land on different executors within the same frame.
#[derive(Debug, Clone)]
pub struct TimeSlicedLottery {
    executors: Vec<Address>,
    window: usize,
    frame: Duration,
}

impl TimeSlicedLottery {
    /// Create a lottery. A zero `frame` never rotates.
    pub fn new(executors: Vec<Address>, window: usize, frame: Duration) -> Self {
        Self {
            executors,
            window,
            frame,
        }
    }

    /// Index of the frame containing `now`.
    pub fn frame_index(&self, now: Duration) -> u128 {
        if self.frame.is_zero() {
            return 0;
        }
        now.as_nanos() / self.frame.as_nanos()
    }
}

impl ExecutorLottery for TimeSlicedLottery {
    fn responsible_executors(&self, hash: &Hash, now: Duration) -> Vec<Address> {
        let len = self.executors.len();
        if len == 0 {
            return Vec::new();
        }
        let offset = (u128::from(hash.as_u64()) + self.frame_index(now)) % len as u128;
        // offset < len, so it fits back into usize.
        let start = offset as usize;
        self.executors
            .iter()
            .cycle()
            .skip(start)
            .take(self.window.min(len))
            .copied()
            .collect()
    }
}
