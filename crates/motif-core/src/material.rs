//! Materials: multi-voice compositions and their event extraction
//!
//! A `Material` is the unit handed to the playback engine. Extraction
//! flattens every note of every voice into a Note On / Note Off pair with
//! the voice's channel folded into the status byte. The extraction order
//! (voice-major, note-major, on before off) is the tie order the playback
//! loader's stable sort preserves for simultaneous events.

use crate::event::MidiEvent;
use crate::note::Note;
use crate::voice::Voice;

/// Error type for material operations
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("voice index {index} out of range (material has {len} voices)")]
    VoiceOutOfRange { index: usize, len: usize },
}

/// A multi-voice composition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    voices: Vec<Voice>,
}

impl Material {
    /// Create an empty material
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a material with a single empty voice on `channel` (one-based)
    pub fn with_voice(channel: u8) -> Self {
        Self {
            voices: vec![Voice::new(channel)],
        }
    }

    /// Append a voice
    pub fn add_voice(&mut self, voice: Voice) {
        self.voices.push(voice);
    }

    /// Append a note to the voice at `voice_index`
    pub fn add_note(&mut self, voice_index: usize, note: Note) -> Result<(), MaterialError> {
        let len = self.voices.len();
        let voice = self
            .voices
            .get_mut(voice_index)
            .ok_or(MaterialError::VoiceOutOfRange {
                index: voice_index,
                len,
            })?;
        voice.add_note(note);
        Ok(())
    }

    /// Number of voices
    pub fn num_voices(&self) -> usize {
        self.voices.len()
    }

    /// Total number of notes across all voices
    pub fn num_notes(&self) -> usize {
        self.voices.iter().map(Voice::len).sum()
    }

    /// True if no voice holds any note
    pub fn is_empty(&self) -> bool {
        self.num_notes() == 0
    }

    /// The voice at `index`, if any
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// Iterate the voices
    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    /// End time of the latest-sounding note across all voices, in seconds
    pub fn duration(&self) -> f32 {
        self.voices.iter().map(Voice::duration).fold(0.0, f32::max)
    }

    /// Transpose every voice by `semitones` in place
    pub fn transpose(&mut self, semitones: i8) {
        for voice in &mut self.voices {
            voice.transpose(semitones);
        }
    }

    /// Append another material after this one in time
    ///
    /// The other material's voices are shifted by this material's duration
    /// and added as new voices.
    pub fn append(&mut self, other: &Material) {
        let offset = self.duration();
        for voice in other.voices() {
            let mut shifted = voice.clone();
            shifted.shift(offset);
            self.voices.push(shifted);
        }
    }

    /// Flatten the material into timestamped MIDI events
    ///
    /// Each note contributes exactly two events: a Note On at its start and
    /// a Note Off at its end, both carrying the owning voice's channel
    /// (folded to zero-based). Events come out in extraction order, not time
    /// order; the playback loader sorts them.
    pub fn events(&self) -> Vec<MidiEvent> {
        let mut events = Vec::with_capacity(self.num_notes() * 2);
        for voice in &self.voices {
            let channel = voice.channel - 1;
            for note in voice.notes() {
                let mut on = note.midi_on();
                on.status += channel;
                events.push(on);
                let mut off = note.midi_off();
                off.status += channel;
                events.push(off);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn test_single_note_yields_on_off_pair() {
        let mut mat = Material::with_voice(1);
        mat.add_note(0, Note::new(60, 1.0, 0.0, 1.5)).unwrap();
        let events = mat.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), EventKind::NoteOn);
        assert_eq!(events[0].time, 0.0);
        assert_eq!(events[1].kind(), EventKind::NoteOff);
        assert_eq!(events[1].time, 1.5);
    }

    #[test]
    fn test_channel_folded_into_status() {
        let mut mat = Material::with_voice(3);
        mat.add_note(0, Note::new(72, 0.5, 0.0, 1.0)).unwrap();
        let events = mat.events();
        assert_eq!(events[0].status, 0x92);
        assert_eq!(events[1].status, 0x82);
    }

    #[test]
    fn test_add_note_rejects_bad_voice() {
        let mut mat = Material::new();
        assert!(matches!(
            mat.add_note(0, Note::new(60, 0.5, 0.0, 1.0)),
            Err(MaterialError::VoiceOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_event_count_across_voices() {
        let mut mat = Material::new();
        mat.add_voice(Voice::new(1));
        mat.add_voice(Voice::new(2));
        mat.add_note(0, Note::new(60, 0.5, 0.0, 1.0)).unwrap();
        mat.add_note(0, Note::new(64, 0.5, 1.0, 1.0)).unwrap();
        mat.add_note(1, Note::new(48, 0.5, 0.0, 2.0)).unwrap();
        assert_eq!(mat.num_notes(), 3);
        assert_eq!(mat.events().len(), 6);
    }

    #[test]
    fn test_append_shifts_in_time() {
        let mut a = Material::with_voice(1);
        a.add_note(0, Note::new(60, 0.5, 0.0, 1.0)).unwrap();
        let mut b = Material::with_voice(1);
        b.add_note(0, Note::new(62, 0.5, 0.0, 1.0)).unwrap();
        a.append(&b);
        assert_eq!(a.num_voices(), 2);
        assert_eq!(a.voice(1).unwrap().note(0).unwrap().start, 1.0);
        assert_eq!(a.duration(), 2.0);
    }
}
