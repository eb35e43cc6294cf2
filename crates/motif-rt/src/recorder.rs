//! Double-buffered MIDI capture engine
//!
//! Inbound events land in one of two preallocated buffers (the "current"
//! one), stamped relative to the instant the recorder started. `drain`
//! swaps which buffer is current and hands back everything the previous
//! buffer collected, so the input callback and the consumer never contend
//! over the same storage for long: the swap is the only synchronization
//! point.
//!
//! Appending is bounded and allocation-free: a full buffer silently drops
//! new events rather than growing or blocking the driver thread.

use crate::clock;
use crate::config::RtConfig;
use crate::transport::{self, TransportError};
use midir::MidiInputConnection;
use motif_core::{EventKind, MidiEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// The two capture buffers and the selector for the append target
struct CapturePair {
    buffers: [Vec<MidiEvent>; 2],
    current: usize,
    capacity: usize,
}

impl CapturePair {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffers: [Vec::with_capacity(capacity), Vec::with_capacity(capacity)],
            current: 0,
            capacity,
        }
    }

    /// Append into the current buffer; false if it was full
    fn append(&mut self, event: MidiEvent) -> bool {
        let buffer = &mut self.buffers[self.current];
        if buffer.len() >= self.capacity {
            return false;
        }
        buffer.push(event);
        true
    }

    /// Swap the append target and take everything the previous buffer held
    fn drain(&mut self) -> Vec<MidiEvent> {
        let previous = self.current;
        self.current ^= 1;
        std::mem::replace(&mut self.buffers[previous], Vec::with_capacity(self.capacity))
    }
}

/// State shared with the input callback thread
struct CaptureShared {
    pair: Mutex<CapturePair>,
    /// Stamp all offsets are relative to, set once at `start`
    initial_micros: AtomicU64,
}

impl CaptureShared {
    fn append_raw(&self, bytes: &[u8]) {
        // only note events are captured; everything else passes by,
        // matching the playback side's note-pair model
        if bytes.len() < 3 {
            return;
        }
        let status = bytes[0] & 0xF0;
        if status != 0x80 && status != 0x90 {
            return;
        }

        let initial = self.initial_micros.load(Ordering::Acquire);
        let time = clock::seconds_since(initial);
        let event = MidiEvent::new(bytes[0], bytes[1], bytes[2], time);

        let mut pair = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        if !pair.append(event) {
            log::debug!("recorder: capture buffer full, dropping event");
        }
    }
}

/// Double-buffered capture engine
///
/// `start` stamps the time origin and (optionally) wires a MIDI input
/// port; `drain` is called from any consumer thread whenever it wants the
/// events collected so far. Two consecutive drains without input in
/// between simply yield an empty buffer.
pub struct Recorder {
    shared: Arc<CaptureShared>,
    input_port: Option<String>,
    connection: Option<MidiInputConnection<Arc<CaptureShared>>>,
    started: bool,
}

impl Recorder {
    /// Create a recorder whose buffers each hold `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(CaptureShared {
                pair: Mutex::new(CapturePair::new(capacity)),
                initial_micros: AtomicU64::new(0),
            }),
            input_port: None,
            connection: None,
            started: false,
        }
    }

    /// Create a recorder from a configuration (capacity and input port)
    pub fn with_config(config: &RtConfig) -> Self {
        let mut recorder = Self::new(config.capture_capacity);
        recorder.input_port = config.input_port.clone();
        recorder
    }

    /// Start capturing: record the time origin and connect the input port
    ///
    /// If no MIDI input is available the recorder still starts, with a
    /// note logged; events can still be fed through `append`. Useful in
    /// tests and headless setups.
    pub fn start(&mut self) -> Result<(), TransportError> {
        self.shared
            .initial_micros
            .store(clock::now_micros(), Ordering::Release);
        self.started = true;

        match transport::find_input_port(self.input_port.as_deref()) {
            Ok((midi_in, port)) => {
                let connection = midi_in
                    .connect(
                        &port,
                        "motif-input",
                        |_timestamp, bytes, shared: &mut Arc<CaptureShared>| {
                            shared.append_raw(bytes);
                        },
                        self.shared.clone(),
                    )
                    .map_err(|e| TransportError::Connection(e.to_string()))?;
                self.connection = Some(connection);
                log::info!("recorder: capturing from MIDI input");
            }
            Err(e) => {
                log::info!("recorder: no MIDI input connected ({}), append-only mode", e);
            }
        }
        Ok(())
    }

    /// True after `start` and before `stop`
    pub fn is_running(&self) -> bool {
        self.started
    }

    /// Append a raw inbound message
    ///
    /// Safe to call from any thread; this is the same path the midir
    /// callback takes. Non-note messages and short reads are ignored; a
    /// full buffer drops the event silently.
    pub fn append(&self, bytes: &[u8]) {
        self.shared.append_raw(bytes);
    }

    /// Take everything captured since the last drain
    ///
    /// Swaps the append target, so the returned buffer is frozen and owned
    /// by the caller; the storage it lived in is reset for reuse.
    pub fn drain(&self) -> Vec<MidiEvent> {
        let mut pair = self
            .shared
            .pair
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pair.drain()
    }

    /// Stop capturing and disconnect the input port
    pub fn stop(&mut self) {
        if self.connection.take().is_some() {
            log::info!("recorder: input disconnected");
        }
        self.started = false;
    }
}

/// Note-on events with no matching note-off later in the buffer
///
/// A note-off (or note-on with velocity 0) closes the earliest still-open
/// note-on with the same channel and key. The survivors come back in their
/// original order.
pub fn unmatched_note_ons(events: &[MidiEvent]) -> Vec<MidiEvent> {
    let mut open: Vec<MidiEvent> = Vec::new();
    for event in events {
        match event.kind() {
            EventKind::NoteOn => open.push(*event),
            EventKind::NoteOff => {
                if let Some(pos) = open
                    .iter()
                    .position(|on| on.channel() == event.channel() && on.key() == event.key())
                {
                    open.remove(pos);
                }
            }
            _ => {}
        }
    }
    open
}

/// Keep only the events of the given kind
pub fn filter_kind(events: &[MidiEvent], kind: EventKind) -> Vec<MidiEvent> {
    events.iter().copied().filter(|e| e.kind() == kind).collect()
}

/// Concatenate two drained buffers, first then second
pub fn join(first: &[MidiEvent], second: &[MidiEvent]) -> Vec<MidiEvent> {
    let mut joined = Vec::with_capacity(first.len() + second.len());
    joined.extend_from_slice(first);
    joined.extend_from_slice(second);
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_recorder(capacity: usize) -> Recorder {
        let mut recorder = Recorder::new(capacity);
        // stamp the origin without touching real MIDI ports
        recorder
            .shared
            .initial_micros
            .store(clock::now_micros(), Ordering::Release);
        recorder.started = true;
        recorder
    }

    #[test]
    fn test_append_then_drain() {
        let recorder = started_recorder(16);
        recorder.append(&[0x90, 60, 100]);

        let events = recorder.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, 0x90);
        assert_eq!(events[0].key(), 60);
        // captured immediately after start: offset is essentially zero
        assert!(events[0].time >= 0.0 && events[0].time < 0.5);

        // nothing new arrived: the second drain is empty, not an error
        assert!(recorder.drain().is_empty());
    }

    #[test]
    fn test_drain_swaps_buffers() {
        let recorder = started_recorder(16);
        recorder.append(&[0x90, 60, 100]);
        let first = recorder.drain();
        recorder.append(&[0x80, 60, 0]);
        let second = recorder.drain();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].status, 0x80);
    }

    #[test]
    fn test_full_buffer_drops_silently() {
        let recorder = started_recorder(2);
        recorder.append(&[0x90, 60, 100]);
        recorder.append(&[0x90, 62, 100]);
        recorder.append(&[0x90, 64, 100]);
        assert_eq!(recorder.drain().len(), 2);
    }

    #[test]
    fn test_non_note_messages_ignored() {
        let recorder = started_recorder(16);
        recorder.append(&[0xB0, 7, 100]); // control change
        recorder.append(&[0xC0, 5]); // program change, short read
        recorder.append(&[0xF8]); // clock tick
        recorder.append(&[0x91, 60, 100]);
        assert_eq!(recorder.drain().len(), 1);
    }

    #[test]
    fn test_unmatched_note_ons() {
        let events = vec![
            MidiEvent::note_on(0, 60, 100, 0.0),
            MidiEvent::note_on(0, 64, 100, 0.1),
            MidiEvent::note_off(0, 60, 0.5),
            MidiEvent::note_on(1, 60, 100, 0.6), // other channel, never closed
            MidiEvent::new(0x90, 64, 0, 0.7),    // velocity-0 on closes 64
        ];
        let unmatched = unmatched_note_ons(&events);
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].channel(), 1);
        assert_eq!(unmatched[0].key(), 60);
    }

    #[test]
    fn test_filter_kind() {
        let events = vec![
            MidiEvent::note_on(0, 60, 100, 0.0),
            MidiEvent::note_off(0, 60, 0.5),
            MidiEvent::note_on(0, 62, 100, 1.0),
        ];
        let ons = filter_kind(&events, EventKind::NoteOn);
        assert_eq!(ons.len(), 2);
        let offs = filter_kind(&events, EventKind::NoteOff);
        assert_eq!(offs.len(), 1);
    }

    #[test]
    fn test_join_preserves_order() {
        let a = vec![MidiEvent::note_on(0, 60, 100, 0.0)];
        let b = vec![MidiEvent::note_off(0, 60, 0.5)];
        let joined = join(&a, &b);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].status, 0x90);
        assert_eq!(joined[1].status, 0x80);
    }
}
