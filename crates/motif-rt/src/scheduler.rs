//! The playback scheduler
//!
//! A single long-lived thread scans the slot pool and, for every Active
//! slot, compares the next pending event's deadline against the monotonic
//! clock. Due events go to the output sink; drained slots are recycled.
//!
//! At most one event per slot is sent per pass. A slot holding many
//! simultaneously-due events drains across consecutive passes, which keeps
//! per-slot order without ever starving the other slots. Late events are
//! sent late, never dropped.

use crate::clock;
use crate::slot::{SlotPool, SlotState};
use crate::transport::MidiSink;
use motif_core::MidiEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Flags shared between the engine façade, the scheduler thread, and the
/// loader threads
///
/// Instance-owned (one set per `Player`), so independent engines never
/// pause or stop each other.
pub(crate) struct EngineFlags {
    /// Terminal: the scheduler exits its loop when set
    pub stop: AtomicBool,
    /// Global pause consulted at the top of every scheduler iteration
    pub pause: AtomicBool,
    /// Cooperative cancellation token checked by loaders before publishing
    pub cancel: AtomicBool,
}

impl EngineFlags {
    pub fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            pause: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
        }
    }

    /// Rearm all flags for a fresh engine start
    pub fn rearm(&self) {
        self.stop.store(false, Ordering::Release);
        self.pause.store(false, Ordering::Release);
        self.cancel.store(false, Ordering::Release);
    }
}

/// One scan over the pool at the given instant
///
/// Sends at most one due event per Active slot and recycles exhausted
/// slots. Separated from the thread loop so tests can drive it against
/// synthetic time.
pub(crate) fn run_pass(pool: &SlotPool, sink: &mut dyn MidiSink, now_micros: u64) {
    for slot in pool.slots() {
        if slot.state() != SlotState::Active || slot.is_paused() {
            continue;
        }

        let mut due: Option<MidiEvent> = None;
        let mut exhausted = false;
        {
            let mut queue = slot.lock_queue();
            if queue.cursor >= queue.events.len() {
                exhausted = true;
            } else {
                let event = queue.events[queue.cursor];
                if now_micros >= clock::deadline_micros(queue.origin_micros, event.time) {
                    queue.cursor += 1;
                    due = Some(event);
                    if queue.cursor >= queue.events.len() {
                        exhausted = true;
                    }
                }
            }
        }

        if let Some(event) = due {
            let bytes = event.bytes();
            if let Err(e) = sink.send(&bytes[..event.byte_len()]) {
                // One slot's bad send must not take the loop down
                log::warn!("scheduler: failed to send event: {}", e);
            }
        }

        if exhausted {
            slot.release();
        }
    }
}

/// The scheduler thread body
///
/// Runs until the stop flag is set. Sleeps briefly between passes (and a
/// little longer while paused) to bound CPU use without giving up
/// responsiveness.
pub(crate) fn run_loop(
    pool: Arc<SlotPool>,
    mut sink: Box<dyn MidiSink>,
    flags: Arc<EngineFlags>,
    poll_interval: Duration,
    paused_interval: Duration,
) {
    log::info!("scheduler: started ({} slots)", pool.len());

    while !flags.stop.load(Ordering::Acquire) {
        if flags.pause.load(Ordering::Acquire) {
            std::thread::sleep(paused_interval);
            continue;
        }
        run_pass(&pool, sink.as_mut(), clock::now_micros());
        std::thread::sleep(poll_interval);
    }

    log::info!("scheduler: stopped");
}
