//! Real-time MIDI delivery engine for motif
//!
//! This crate provides:
//! - `Player`: a pooled playback engine. Materials (or pre-built event
//!   buffers) are turned into sorted event queues by background loader
//!   threads, and a single scheduler thread releases each event to the
//!   output sink at the right wall-clock instant
//! - `Recorder`: a double-buffered capture engine. A MIDI input callback
//!   appends timestamped events into the current buffer while consumers
//!   drain the other one
//! - midir-backed transport (port discovery, output sink, input wiring)
//! - YAML configuration for pool size, polling intervals, and ports
//!
//! # Architecture
//!
//! ```text
//! Material ──► loader thread ──► slot (Idle ► Loading ► Active)
//!                                   │
//!                  scheduler thread scans the pool, sends due
//!                  events to the MidiSink, recycles drained slots
//!
//! MIDI device ──► midir callback ──► current capture buffer ──► drain()
//! ```
//!
//! The only cross-thread contract on the playback side is publish-last: a
//! loader makes its slot's state `Active` (release store) strictly after
//! the buffer is in place, and the scheduler reads state with an acquire
//! load before touching the buffer.

pub mod clock;
mod config;
mod loader;
mod player;
mod recorder;
mod scheduler;
mod slot;
mod transport;

pub use config::{default_config_path, load_config, RtConfig};
pub use player::{Player, PlayerError};
pub use recorder::{filter_kind, join, unmatched_note_ons, Recorder};
pub use slot::SlotState;
pub use transport::{
    list_input_ports, list_output_ports, MidiSink, MidirSink, TransportError,
};

pub use motif_core::{major_scale, EventKind, Material, MidiEvent, Note, Voice};
