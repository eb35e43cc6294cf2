//! Background loaders: fill a claimed slot and publish it
//!
//! A loader is a one-shot producer thread. It converts its source (a
//! material, or a pre-built event buffer) into a sorted queue inside the
//! slot it was handed, then publishes by flipping the slot to Active;
//! publish is the last observable action. Until then the scheduler never
//! looks at the buffer.
//!
//! Loaders are cooperatively cancellable: the engine's cancel token is
//! checked right before the publish step, so `stop`/`reset` never has to
//! kill a thread mid-flight. A loader that backs out (cancelled, or the
//! source was empty) returns its slot to Idle rather than leaving it stuck
//! in Loading.

use crate::clock;
use crate::scheduler::EngineFlags;
use crate::slot::{Slot, SlotPool};
use motif_core::{Material, MidiEvent};
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Spawn a loader that extracts and publishes `material` into slot `index`
///
/// The material moves into the thread so the caller's copy stays free. A
/// spawn error leaves the slot claimed; the caller must release it.
pub(crate) fn spawn_material_load(
    pool: Arc<SlotPool>,
    index: usize,
    material: Material,
    flags: Arc<EngineFlags>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("motif-loader".to_string())
        .spawn(move || {
            fill_from_material(pool.slot(index), &material, &flags);
        })
}

/// Spawn a loader that publishes an already-ordered event buffer
pub(crate) fn spawn_events_load(
    pool: Arc<SlotPool>,
    index: usize,
    events: Vec<MidiEvent>,
    flags: Arc<EngineFlags>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("motif-loader".to_string())
        .spawn(move || {
            fill_from_events(pool.slot(index), events, &flags);
        })
}

/// Extract, sort, and publish a material into a Loading slot
///
/// Every note becomes two events (on at start, off at end). The sort is
/// stable, so events with equal offsets keep the extraction order. In
/// particular a zero-duration note's on still precedes its off.
pub(crate) fn fill_from_material(slot: &Slot, material: &Material, flags: &EngineFlags) {
    let mut events = material.events();
    sort_by_offset(&mut events);
    finish(slot, events, flags);
}

/// Publish a pre-built, already-ordered buffer into a Loading slot
pub(crate) fn fill_from_events(slot: &Slot, events: Vec<MidiEvent>, flags: &EngineFlags) {
    finish(slot, events, flags);
}

/// Stable sort ascending by time offset
fn sort_by_offset(events: &mut [MidiEvent]) {
    events.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(CmpOrdering::Equal));
}

fn finish(slot: &Slot, events: Vec<MidiEvent>, flags: &EngineFlags) {
    if events.is_empty() {
        log::debug!("loader: nothing to play, returning slot to the pool");
        slot.release();
        return;
    }
    if flags.cancel.load(Ordering::Acquire) {
        log::debug!("loader: cancelled before publish, returning slot to the pool");
        slot.release();
        return;
    }

    // Origin stamp is taken now, after the buffer is built, so offset 0
    // means "this instant". Publishing must come after everything else.
    let origin = clock::now_micros();
    let count = events.len();
    slot.publish(events, origin);
    log::debug!("loader: published {} events (origin {} us)", count, origin);
}
