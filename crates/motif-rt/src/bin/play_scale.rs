//! Play a C major scale on the first available MIDI output
//!
//! Usage: play-scale [port-substring]
//!
//! Lists the available output ports, connects to the first one (or the
//! first matching the given substring), and plays one octave.

use motif_rt::{list_output_ports, major_scale, MidirSink, Player, RtConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let port_match = std::env::args().nth(1);

    let ports = list_output_ports()?;
    if ports.is_empty() {
        anyhow::bail!("no MIDI output ports available");
    }
    println!("Available MIDI output ports:");
    for (i, name) in ports.iter().enumerate() {
        println!("  [{}] {}", i, name);
    }

    let sink = MidirSink::connect(port_match.as_deref())?;
    println!("Playing on '{}'", sink.port_name());

    let material = major_scale(60, 1, 0.3);
    let duration = material.duration();

    let mut player = Player::with_config(RtConfig::default());
    player.start(Box::new(sink))?;
    if !player.play(&material)? {
        anyhow::bail!("playback pool rejected the material");
    }

    // wait out the scale plus a little release tail
    std::thread::sleep(std::time::Duration::from_secs_f32(duration + 0.5));
    player.stop();
    Ok(())
}
