//! Timestamped MIDI event values
//!
//! A `MidiEvent` is an immutable MIDI voice message (up to 3 raw bytes) plus
//! a time offset in seconds, relative to the start of whatever sequence the
//! event belongs to. It is the unit moved by the playback scheduler and the
//! capture buffers in motif-rt.

/// Status nibble for Note Off messages
pub const STATUS_NOTE_OFF: u8 = 0x80;
/// Status nibble for Note On messages
pub const STATUS_NOTE_ON: u8 = 0x90;
/// Status nibble for Control Change messages
pub const STATUS_CONTROL_CHANGE: u8 = 0xB0;
/// Status nibble for Program Change messages
pub const STATUS_PROGRAM_CHANGE: u8 = 0xC0;
/// Status nibble for Pitch Bend messages
pub const STATUS_PITCH_BEND: u8 = 0xE0;

/// MIDI message category, derived from the status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    ControlChange,
    ProgramChange,
    PitchBend,
    /// Aftertouch, system messages, and anything else the engine passes
    /// through untouched
    Other,
}

/// A timestamped MIDI event
///
/// MIDI voice message format:
/// - Note Off: 0x8n nn vv (n=channel, nn=key, vv=velocity)
/// - Note On: 0x9n nn vv
/// - Control Change: 0xBn cc vv
/// - Program Change: 0xCn pp (2 bytes)
/// - Pitch Bend: 0xEn ll hh (2 bytes on the wire in the original engine)
///
/// Immutable once created; the scheduler and capture paths never rewrite
/// events in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiEvent {
    /// MIDI status byte (message type in the high nibble, channel in the low)
    pub status: u8,
    /// First data byte (key number, controller, or program)
    pub data1: u8,
    /// Second data byte (velocity or controller value; unused for 2-byte
    /// messages and must not reach the wire for them)
    pub data2: u8,
    /// Time offset in seconds
    pub time: f32,
}

impl MidiEvent {
    /// Create an event from raw parts
    pub fn new(status: u8, data1: u8, data2: u8, time: f32) -> Self {
        Self {
            status,
            data1,
            data2,
            time,
        }
    }

    /// Note On for `key` on a zero-based `channel`
    pub fn note_on(channel: u8, key: u8, velocity: u8, time: f32) -> Self {
        Self::new(STATUS_NOTE_ON | (channel & 0x0F), key, velocity, time)
    }

    /// Note Off for `key` on a zero-based `channel` (release velocity 0)
    pub fn note_off(channel: u8, key: u8, time: f32) -> Self {
        Self::new(STATUS_NOTE_OFF | (channel & 0x0F), key, 0, time)
    }

    /// Program Change on a zero-based `channel`
    pub fn program_change(channel: u8, program: u8, time: f32) -> Self {
        Self::new(STATUS_PROGRAM_CHANGE | (channel & 0x0F), program, 0, time)
    }

    /// The event's zero-based MIDI channel
    pub fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    /// The key number for note events (data1)
    pub fn key(&self) -> u8 {
        self.data1
    }

    /// Classify the event by its status byte
    ///
    /// Note On with velocity 0 classifies as `NoteOff`, which is how the
    /// wire protocol (and every synth) treats it.
    pub fn kind(&self) -> EventKind {
        match self.status & 0xF0 {
            STATUS_NOTE_OFF => EventKind::NoteOff,
            STATUS_NOTE_ON if self.data2 == 0 => EventKind::NoteOff,
            STATUS_NOTE_ON => EventKind::NoteOn,
            STATUS_CONTROL_CHANGE => EventKind::ControlChange,
            STATUS_PROGRAM_CHANGE => EventKind::ProgramChange,
            STATUS_PITCH_BEND => EventKind::PitchBend,
            _ => EventKind::Other,
        }
    }

    /// Number of bytes this message occupies on the wire
    ///
    /// Program Change and Pitch Bend send 2 bytes; all other voice messages
    /// send 3. Callers must never emit the unused trailing byte.
    pub fn byte_len(&self) -> usize {
        match self.status & 0xF0 {
            STATUS_PROGRAM_CHANGE | STATUS_PITCH_BEND => 2,
            _ => 3,
        }
    }

    /// Raw wire bytes, sized by `byte_len`
    pub fn bytes(&self) -> [u8; 3] {
        [self.status, self.data1, self.data2]
    }

    /// A copy of this event with its offset shifted by `seconds`
    pub fn shifted(&self, seconds: f32) -> Self {
        Self {
            time: self.time + seconds,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_status() {
        let ev = MidiEvent::note_on(2, 60, 100, 0.5);
        assert_eq!(ev.status, 0x92);
        assert_eq!(ev.channel(), 2);
        assert_eq!(ev.key(), 60);
        assert_eq!(ev.kind(), EventKind::NoteOn);
        assert_eq!(ev.byte_len(), 3);
    }

    #[test]
    fn test_note_off_status() {
        let ev = MidiEvent::note_off(0, 64, 1.0);
        assert_eq!(ev.status, 0x80);
        assert_eq!(ev.data2, 0);
        assert_eq!(ev.kind(), EventKind::NoteOff);
    }

    #[test]
    fn test_note_on_zero_velocity_is_off() {
        let ev = MidiEvent::new(0x91, 60, 0, 0.0);
        assert_eq!(ev.kind(), EventKind::NoteOff);
    }

    #[test]
    fn test_two_byte_messages() {
        let pc = MidiEvent::program_change(3, 12, 0.0);
        assert_eq!(pc.status, 0xC3);
        assert_eq!(pc.byte_len(), 2);
        assert_eq!(pc.kind(), EventKind::ProgramChange);

        let bend = MidiEvent::new(0xE0, 0x00, 0x40, 0.0);
        assert_eq!(bend.byte_len(), 2);
        assert_eq!(bend.kind(), EventKind::PitchBend);
    }

    #[test]
    fn test_shifted_preserves_payload() {
        let ev = MidiEvent::note_on(0, 60, 90, 1.0);
        let moved = ev.shifted(0.5);
        assert_eq!(moved.time, 1.5);
        assert_eq!(moved.status, ev.status);
        assert_eq!(moved.data1, ev.data1);
        assert_eq!(moved.data2, ev.data2);
    }
}
