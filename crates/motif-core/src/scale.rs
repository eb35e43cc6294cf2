//! Material generators

use crate::material::Material;
use crate::note::Note;
use crate::voice::Voice;

/// Semitone steps of the major scale, root to octave
const MAJOR_STEPS: [u8; 8] = [0, 2, 4, 5, 7, 9, 11, 12];

/// Build an ascending major scale as a single-voice material
///
/// `root` is the MIDI key of the first degree; each note lasts
/// `note_duration` seconds and starts right after the previous one.
pub fn major_scale(root: u8, channel: u8, note_duration: f32) -> Material {
    let mut voice = Voice::new(channel);
    for (i, step) in MAJOR_STEPS.iter().enumerate() {
        let pitch = root.saturating_add(*step).min(127);
        let start = i as f32 * note_duration;
        voice.add_note(Note::new(pitch, 0.8, start, note_duration));
    }
    let mut material = Material::new();
    material.add_voice(voice);
    material
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_scale_shape() {
        let mat = major_scale(60, 1, 0.25);
        assert_eq!(mat.num_notes(), 8);
        let voice = mat.voice(0).unwrap();
        assert_eq!(voice.note(0).unwrap().pitch, 60);
        assert_eq!(voice.note(7).unwrap().pitch, 72);
        assert_eq!(voice.note(4).unwrap().start, 1.0);
        assert_eq!(mat.duration(), 2.0);
    }
}
