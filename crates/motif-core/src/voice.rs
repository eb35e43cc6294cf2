//! Voices: channelled note sequences

use crate::note::Note;

/// One voice of a material: an ordered collection of notes bound to a
/// MIDI channel
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    /// One-based MIDI channel (1-16), folded to zero-based at extraction
    pub channel: u8,
    notes: Vec<Note>,
}

impl Voice {
    /// Create an empty voice on a one-based channel
    pub fn new(channel: u8) -> Self {
        Self {
            channel: channel.clamp(1, 16),
            notes: Vec::new(),
        }
    }

    /// Append a note to the end of the voice
    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Number of notes in the voice
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True if the voice holds no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Iterate the notes in insertion order
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    /// The note at `index`, if any
    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// End time of the latest-sounding note, in seconds
    pub fn duration(&self) -> f32 {
        self.notes.iter().map(Note::end).fold(0.0, f32::max)
    }

    /// Transpose every note by `semitones` in place
    pub fn transpose(&mut self, semitones: i8) {
        for note in &mut self.notes {
            *note = note.transposed(semitones);
        }
    }

    /// Shift every note's onset by `seconds` in place
    pub fn shift(&mut self, seconds: f32) {
        for note in &mut self.notes {
            note.start += seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_latest_end() {
        let mut voice = Voice::new(1);
        voice.add_note(Note::new(60, 0.5, 0.0, 2.0));
        voice.add_note(Note::new(64, 0.5, 0.5, 0.5));
        assert_eq!(voice.duration(), 2.0);
    }

    #[test]
    fn test_channel_clamped() {
        assert_eq!(Voice::new(0).channel, 1);
        assert_eq!(Voice::new(20).channel, 16);
    }

    #[test]
    fn test_shift() {
        let mut voice = Voice::new(1);
        voice.add_note(Note::new(60, 0.5, 1.0, 1.0));
        voice.shift(0.5);
        assert_eq!(voice.note(0).unwrap().start, 1.5);
    }
}
