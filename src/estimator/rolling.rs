//! # Rolling Accumulator
//!
//! Approximates a trailing window of up to `N` minute buckets with `N`
//! summaries that all receive every sample. Each bucket advance clears one
//! summary in round-robin order; reads come from the summary that was
//! cleared longest ago, i.e. the one holding the most history.
//!
//! ```text
//! N = 3, buckets b0, b1 each followed by an advance:
//!   after b0: cursor 1   slot0 [b0]      slot1 []     slot2 [b0]   read slot2
//!   after b1: cursor 2   slot0 [b0 b1]   slot1 [b1]   slot2 []     read slot0
//! ```
//!
//! The effective window therefore shrinks from `N` to 1 buckets and grows
//! back across each cycle rather than sliding exactly one minute at a time.

use super::Summary;

/// Ring of `N` summaries with a cursor at the most recently cleared slot
#[derive(Debug, Clone)]
pub struct RollingAccumulator<S> {
    slots: Vec<S>,
    pos: usize,
}

impl<S: Summary + Clone> RollingAccumulator<S> {
    /// Create a ring of `window` copies of `empty`.
    ///
    /// A window of zero is treated as one.
    pub fn new(empty: S, window: usize) -> Self {
        Self {
            slots: vec![empty; window.max(1)],
            pos: 0,
        }
    }
}

impl<S: Summary> RollingAccumulator<S> {
    /// Number of slots
    pub fn window(&self) -> usize {
        self.slots.len()
    }

    /// Slot cleared by the most recent advance
    pub fn cursor(&self) -> usize {
        self.pos
    }

    /// Slot `get` reads from
    pub fn read_slot(&self) -> usize {
        (self.pos + 1) % self.slots.len()
    }

    /// Close the current bucket: move the cursor and clear that slot
    pub fn advance(&mut self) {
        self.pos = (self.pos + 1) % self.slots.len();
        self.slots[self.pos].reset();
    }

    /// Feed one sample to every slot
    pub fn add(&mut self, sample: &S::Sample) {
        for slot in &mut self.slots {
            slot.add(sample);
        }
    }

    /// Value of the slot holding the longest history
    pub fn get(&self) -> Option<S::Output> {
        self.slots[self.read_slot()].get()
    }
}
