//! Composition data model for motif
//!
//! This crate provides:
//! - Timestamped MIDI event values (`MidiEvent`) used on both the playback
//!   and capture sides of motif-rt
//! - Notes, voices, and materials (multi-voice compositions)
//! - Event extraction: a material flattens into the on/off event pairs the
//!   playback engine schedules
//! - A small set of material generators (scales)
//!
//! No I/O and no threads live here; everything is plain values.

mod event;
mod material;
mod note;
mod scale;
mod voice;

pub use event::{EventKind, MidiEvent};
pub use material::{Material, MaterialError};
pub use note::Note;
pub use scale::major_scale;
pub use voice::Voice;
