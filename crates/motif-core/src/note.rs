//! Single notes and their MIDI event pairs

use crate::event::MidiEvent;

/// One note: a pitch sounding for a span of time at some loudness
///
/// The channel is not part of the note; it belongs to the voice that owns
/// the note and is folded into the status byte at extraction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// MIDI key number (0-127, 60 = middle C)
    pub pitch: u8,
    /// Loudness in the range 0.0-1.0 (maps to velocity 0-127)
    pub amplitude: f32,
    /// Onset time in seconds from the start of the material
    pub start: f32,
    /// Duration in seconds
    pub duration: f32,
}

impl Note {
    /// Create a note
    pub fn new(pitch: u8, amplitude: f32, start: f32, duration: f32) -> Self {
        Self {
            pitch,
            amplitude,
            start,
            duration,
        }
    }

    /// The moment the note stops sounding
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// The MIDI velocity for this note's amplitude, clamped to 0-127
    pub fn velocity(&self) -> u8 {
        (self.amplitude.clamp(0.0, 1.0) * 127.0) as u8
    }

    /// The Note On event for this note (channel 0; callers add the channel)
    pub fn midi_on(&self) -> MidiEvent {
        MidiEvent::note_on(0, self.pitch, self.velocity(), self.start)
    }

    /// The Note Off event for this note, stamped at `start + duration`
    pub fn midi_off(&self) -> MidiEvent {
        MidiEvent::note_off(0, self.pitch, self.end())
    }

    /// A copy transposed by `semitones`, clamped to the MIDI key range
    pub fn transposed(&self, semitones: i8) -> Self {
        let pitch = (self.pitch as i16 + semitones as i16).clamp(0, 127) as u8;
        Self { pitch, ..*self }
    }
}
