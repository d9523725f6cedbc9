//! Process-wide single-instance slots.
//!
//! The keyboard hook and the audio device may each exist once per process.
//! Claiming a slot hands out a guard; the slot frees up when the guard drops.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AlreadyClaimed;

pub struct ProcessSlot {
    name: &'static str,
    taken: AtomicBool,
}

impl ProcessSlot {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            taken: AtomicBool::new(false),
        }
    }

    pub fn claim(&'static self) -> Result<SlotClaim, AlreadyClaimed> {
        self.taken
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SlotClaim { slot: self })
            .map_err(|_| AlreadyClaimed(self.name))
    }

    pub fn is_taken(&self) -> bool {
        self.taken.load(Ordering::Acquire)
    }
}

/// Proof of ownership of a [`ProcessSlot`].
#[derive(Debug)]
pub struct SlotClaim {
    slot: &'static ProcessSlot,
}

impl Drop for SlotClaim {
    fn drop(&mut self) {
        self.slot.taken.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for ProcessSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSlot")
            .field("name", &self.name)
            .field("taken", &self.is_taken())
            .finish()
    }
}
