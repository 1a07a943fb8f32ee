//! History buffer — the most recent readings of one metric.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::threshold::ValueRange;

/// Number of readings retained per metric.
pub const HISTORY_CAPACITY: usize = 5;

/// Number of trailing in-range readings required to call a metric stable.
pub const STABILITY_WINDOW: usize = 3;

/// Bounded FIFO of readings; the oldest entry is evicted past
/// [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryBuffer {
    values: VecDeque<f64>,
}

impl HistoryBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading, evicting the oldest one when full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == HISTORY_CAPACITY {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Number of readings held, at most [`HISTORY_CAPACITY`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Readings from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Whether the last [`STABILITY_WINDOW`] readings are all within `range`.
    ///
    /// A buffer holding fewer readings than the window counts as stable.
    #[must_use]
    pub fn is_stable_within(&self, range: ValueRange) -> bool {
        if self.values.len() < STABILITY_WINDOW {
            return true;
        }
        self.values
            .iter()
            .rev()
            .take(STABILITY_WINDOW)
            .all(|v| range.contains(*v))
    }
}
