//! End-to-end scenarios for the playback and capture engines
//!
//! These run the real scheduler and loader threads against wall-clock time
//! with a collecting sink, using short materials and generous waits.

use motif_rt::{
    filter_kind, major_scale, unmatched_note_ons, EventKind, Material, MidiSink, Note, Player,
    Recorder, RtConfig, TransportError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct CollectingSink {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MidiSink for CollectingSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }
}

fn wait_for(sent: &Arc<Mutex<Vec<Vec<u8>>>>, count: usize, timeout: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if sent.lock().unwrap().len() >= count {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn scale_plays_in_pitch_order() {
    let sink = CollectingSink::default();
    let sent = sink.sent.clone();

    let mut player = Player::new();
    player.start(Box::new(sink)).unwrap();
    // a fast scale: 8 notes, 20ms each
    assert!(player.play(&major_scale(60, 1, 0.02)).unwrap());

    assert!(wait_for(&sent, 16, Duration::from_secs(2)));
    player.stop();

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 16);
    // note-ons come out in ascending pitch order
    let ons: Vec<u8> = sent
        .iter()
        .filter(|b| b[0] & 0xF0 == 0x90)
        .map(|b| b[1])
        .collect();
    assert_eq!(ons, vec![60, 62, 64, 65, 67, 69, 71, 72]);
}

#[test]
fn concurrent_materials_share_the_pool() {
    let sink = CollectingSink::default();
    let sent = sink.sent.clone();

    let mut config = RtConfig::default();
    config.pool_size = 3;
    let mut player = Player::with_config(config);
    player.start(Box::new(sink)).unwrap();

    for channel in 1..=3 {
        let mut material = Material::with_voice(channel);
        material
            .add_note(0, Note::new(60, 0.8, 0.0, 0.02))
            .unwrap();
        assert!(player.play(&material).unwrap());
    }

    assert!(wait_for(&sent, 6, Duration::from_secs(2)));
    player.stop();

    // two events per material, all three channels represented
    let sent = sent.lock().unwrap();
    let mut channels: Vec<u8> = sent
        .iter()
        .filter(|b| b[0] & 0xF0 == 0x90)
        .map(|b| b[0] & 0x0F)
        .collect();
    channels.sort_unstable();
    assert_eq!(channels, vec![0, 1, 2]);
}

#[test]
fn drained_capture_feeds_the_filters() {
    let mut recorder = Recorder::new(64);
    recorder.start().unwrap();

    recorder.append(&[0x90, 60, 100]);
    recorder.append(&[0x90, 64, 100]);
    recorder.append(&[0x80, 60, 0]);

    let events = recorder.drain();
    assert_eq!(events.len(), 3);
    // offsets are nondecreasing arrival times
    assert!(events.windows(2).all(|w| w[0].time <= w[1].time));

    let ons = filter_kind(&events, EventKind::NoteOn);
    assert_eq!(ons.len(), 2);

    let stuck = unmatched_note_ons(&events);
    assert_eq!(stuck.len(), 1);
    assert_eq!(stuck[0].key(), 64);

    assert!(recorder.drain().is_empty());
    recorder.stop();
}
