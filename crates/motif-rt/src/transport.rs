//! MIDI transport: port discovery and the output sink seam
//!
//! Uses midir for cross-platform MIDI I/O (ALSA on Linux, CoreMIDI on
//! macOS, WinMM on Windows). Ports are matched case-insensitively by
//! substring, or selected by index.
//!
//! The scheduler talks to a `MidiSink`, not to midir directly: delivery is
//! fire-and-forget and carries no timestamps; the scheduler alone decides
//! when to call `send`. Tests substitute a collecting sink.

use midir::{MidiInput, MidiInputPort, MidiOutput, MidiOutputConnection};

/// Error type for transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to initialize MIDI output: {0}")]
    OutputInit(String),

    #[error("Failed to initialize MIDI input: {0}")]
    InputInit(String),

    #[error("No MIDI ports available")]
    NoPorts,

    #[error("No MIDI port found matching pattern: {0}")]
    PortNotFound(String),

    #[error("MIDI port index {0} out of range ({1} ports available)")]
    PortIndexOutOfRange(usize, usize),

    #[error("Failed to connect to MIDI port: {0}")]
    Connection(String),

    #[error("Failed to get port info: {0}")]
    PortInfo(String),

    #[error("MIDI send failed: {0}")]
    Send(String),
}

/// Destination for raw outbound MIDI bytes
///
/// `bytes` is a complete message of up to 3 bytes, already truncated to its
/// wire length; implementations must forward it immediately.
pub trait MidiSink: Send {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// midir-backed output sink
pub struct MidirSink {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidirSink {
    /// Connect to the first output port whose name contains `port_match`
    /// (case-insensitive); `None` takes the first available port
    pub fn connect(port_match: Option<&str>) -> Result<Self, TransportError> {
        let midi_out = MidiOutput::new("motif-out")
            .map_err(|e| TransportError::OutputInit(e.to_string()))?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(TransportError::NoPorts);
        }

        let port = match port_match {
            Some(pattern) => {
                let lowered = pattern.to_lowercase();
                ports
                    .iter()
                    .find(|port| {
                        midi_out
                            .port_name(port)
                            .map(|name| name.to_lowercase().contains(&lowered))
                            .unwrap_or(false)
                    })
                    .ok_or_else(|| TransportError::PortNotFound(pattern.to_string()))?
            }
            None => &ports[0],
        };

        let port_name = midi_out
            .port_name(port)
            .map_err(|e| TransportError::PortInfo(e.to_string()))?;
        log::info!("transport: connecting output to '{}'", port_name);

        let connection = midi_out
            .connect(port, "motif-output")
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            connection,
            port_name,
        })
    }

    /// Connect to the output port at `index`, as listed by
    /// `list_output_ports`
    pub fn connect_index(index: usize) -> Result<Self, TransportError> {
        let midi_out = MidiOutput::new("motif-out")
            .map_err(|e| TransportError::OutputInit(e.to_string()))?;

        let ports = midi_out.ports();
        let port = ports
            .get(index)
            .ok_or(TransportError::PortIndexOutOfRange(index, ports.len()))?;

        let port_name = midi_out
            .port_name(port)
            .map_err(|e| TransportError::PortInfo(e.to_string()))?;
        log::info!("transport: connecting output to '{}' (port {})", port_name, index);

        let connection = midi_out
            .connect(port, "motif-output")
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            connection,
            port_name,
        })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiSink for MidirSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.connection
            .send(bytes)
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// List the names of all available MIDI output ports
pub fn list_output_ports() -> Result<Vec<String>, TransportError> {
    let midi_out = MidiOutput::new("motif-out")
        .map_err(|e| TransportError::OutputInit(e.to_string()))?;
    let mut names = Vec::new();
    for port in midi_out.ports() {
        names.push(
            midi_out
                .port_name(&port)
                .map_err(|e| TransportError::PortInfo(e.to_string()))?,
        );
    }
    Ok(names)
}

/// List the names of all available MIDI input ports
pub fn list_input_ports() -> Result<Vec<String>, TransportError> {
    let midi_in =
        MidiInput::new("motif-in").map_err(|e| TransportError::InputInit(e.to_string()))?;
    let mut names = Vec::new();
    for port in midi_in.ports() {
        names.push(
            midi_in
                .port_name(&port)
                .map_err(|e| TransportError::PortInfo(e.to_string()))?,
        );
    }
    Ok(names)
}

/// Find an input port for the capture engine
///
/// Returns the `MidiInput` handle alongside the port so the caller can set
/// up its own callback. `None` takes the first available port.
pub(crate) fn find_input_port(
    port_match: Option<&str>,
) -> Result<(MidiInput, MidiInputPort), TransportError> {
    let midi_in =
        MidiInput::new("motif-in").map_err(|e| TransportError::InputInit(e.to_string()))?;

    let ports = midi_in.ports();
    if ports.is_empty() {
        return Err(TransportError::NoPorts);
    }

    let port = match port_match {
        Some(pattern) => {
            let lowered = pattern.to_lowercase();
            ports
                .into_iter()
                .find(|port| {
                    midi_in
                        .port_name(port)
                        .map(|name| name.to_lowercase().contains(&lowered))
                        .unwrap_or(false)
                })
                .ok_or_else(|| TransportError::PortNotFound(pattern.to_string()))?
        }
        None => ports.into_iter().next().ok_or(TransportError::NoPorts)?,
    };

    let port_name = midi_in
        .port_name(&port)
        .map_err(|e| TransportError::PortInfo(e.to_string()))?;
    log::info!("transport: found input port '{}'", port_name);

    Ok((midi_in, port))
}
