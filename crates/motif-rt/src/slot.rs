//! Playback slots and the slot pool
//!
//! A slot is one reusable playback queue. Its lifecycle is a three-state
//! machine stored in an atomic:
//!
//! ```text
//! Idle ──claim──► Loading ──publish──► Active ──release──► Idle
//!                    └───────abort──────────────────────────┘
//! ```
//!
//! Claiming is a single compare-and-swap, so two loaders can never own the
//! same slot. Publishing stores `Active` with release ordering strictly
//! after the event buffer is in place; the scheduler reads the state with
//! acquire ordering before touching the buffer. The buffer itself lives
//! behind a mutex that is uncontended once a slot is Active (the loader is
//! gone, and only the scheduler touches it, one short lock per pass).

use motif_core::MidiEvent;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle state of a playback slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotState {
    /// Free for claiming
    Idle = 0,
    /// Claimed by a loader that has not yet published
    Loading = 1,
    /// Published; the scheduler is draining it
    Active = 2,
}

impl SlotState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SlotState::Loading,
            2 => SlotState::Active,
            _ => SlotState::Idle,
        }
    }
}

/// Mutable payload of a slot; single-owner at any instant
#[derive(Debug, Default)]
pub(crate) struct SlotQueue {
    /// Events sorted ascending by offset once published
    pub events: Vec<MidiEvent>,
    /// Index of the next event to send
    pub cursor: usize,
    /// Absolute microsecond stamp that offset 0.0 is anchored to
    pub origin_micros: u64,
}

/// One reusable playback queue in the pool
pub(crate) struct Slot {
    state: AtomicU8,
    paused: AtomicBool,
    queue: Mutex<SlotQueue>,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SlotState::Idle as u8),
            paused: AtomicBool::new(false),
            queue: Mutex::new(SlotQueue::default()),
        }
    }

    /// Current lifecycle state (acquire: pairs with the publish store)
    pub fn state(&self) -> SlotState {
        SlotState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Per-slot pause; no caller-facing switch exists yet, so only tests
    /// and the lifecycle transitions (which clear it) touch this
    #[cfg(test)]
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    /// Lock the queue payload, recovering from a poisoned lock
    ///
    /// A panic while holding the lock must not take the scheduler down
    /// with it; the slot gets recycled instead.
    pub fn lock_queue(&self) -> MutexGuard<'_, SlotQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a loaded buffer and make the slot Active
    ///
    /// Must only be called by the loader that claimed the slot. The state
    /// store is the last action, with release ordering, so the scheduler
    /// never observes Active before the buffer writes.
    pub fn publish(&self, events: Vec<MidiEvent>, origin_micros: u64) {
        {
            let mut queue = self.lock_queue();
            queue.events = events;
            queue.cursor = 0;
            queue.origin_micros = origin_micros;
        }
        self.paused.store(false, Ordering::Relaxed);
        self.state.store(SlotState::Active as u8, Ordering::Release);
    }

    /// Return a claimed or drained slot to Idle, clearing its payload
    ///
    /// Used by the scheduler when the cursor reaches the end, and by
    /// loaders backing out of a failed or cancelled load. Stale events must
    /// never survive into the slot's next life.
    pub fn release(&self) {
        {
            let mut queue = self.lock_queue();
            queue.events = Vec::new();
            queue.cursor = 0;
            queue.origin_micros = 0;
        }
        self.paused.store(false, Ordering::Relaxed);
        self.state.store(SlotState::Idle as u8, Ordering::Release);
    }
}

/// Fixed-size collection of playback slots
///
/// The pool arbitrates claiming: a playback request either gets a slot or
/// is told the pool is full, which is an expected condition, not an error.
pub(crate) struct SlotPool {
    slots: Vec<Slot>,
}

impl SlotPool {
    /// Create a pool of `size` Idle slots (at least 1)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            slots: (0..size).map(|_| Slot::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    /// Claim the first Idle slot, transitioning it to Loading
    ///
    /// The transition is a compare-and-swap; losing a race on one slot just
    /// moves the scan to the next. Returns the claimed index, or None if
    /// every slot is Loading or Active.
    pub fn try_claim(&self) -> Option<usize> {
        for (index, slot) in self.slots.iter().enumerate() {
            if slot
                .state
                .compare_exchange(
                    SlotState::Idle as u8,
                    SlotState::Loading as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return Some(index);
            }
        }
        None
    }

    /// Force every slot back to Idle, discarding all payloads
    pub fn reset(&self) {
        for slot in &self.slots {
            slot.release();
        }
    }

}
