//! Playback engine façade
//!
//! `Player` owns the slot pool, the scheduler thread, and the loader
//! threads it spawns for each accepted playback request. All pause/stop
//! state is instance-owned: two players in one process never affect each
//! other.

use crate::config::RtConfig;
use crate::loader;
use crate::scheduler::{self, EngineFlags};
use crate::slot::SlotPool;
use crate::transport::MidiSink;
use motif_core::{Material, MidiEvent};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Error type for playback engine operations
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Player is already running")]
    AlreadyRunning,

    #[error("Player is not running")]
    NotRunning,

    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        source: std::io::Error,
    },
}

/// Pooled real-time playback engine
///
/// Submit materials (or raw event buffers) while the engine runs; each
/// accepted submission claims a slot, is loaded in the background, and
/// plays as soon as its buffer is published. Submissions beyond the pool
/// size are rejected with `Ok(false)`, an expected condition; retry or
/// drop at will.
pub struct Player {
    config: RtConfig,
    pool: Arc<SlotPool>,
    flags: Arc<EngineFlags>,
    scheduler: Option<JoinHandle<()>>,
    loaders: Vec<JoinHandle<()>>,
}

impl Player {
    /// Create a player with the default configuration
    pub fn new() -> Self {
        Self::with_config(RtConfig::default())
    }

    /// Create a player from a configuration
    pub fn with_config(config: RtConfig) -> Self {
        let pool = Arc::new(SlotPool::new(config.pool_size));
        Self {
            config,
            pool,
            flags: Arc::new(EngineFlags::new()),
            scheduler: None,
            loaders: Vec::new(),
        }
    }

    /// Start the scheduler, taking ownership of the output sink
    ///
    /// The engine runs until `stop` (or drop). Starting an already-running
    /// engine is an error; starting again after `stop`/`reset`
    /// re-initializes.
    pub fn start(&mut self, sink: Box<dyn MidiSink>) -> Result<(), PlayerError> {
        if self.scheduler.is_some() {
            return Err(PlayerError::AlreadyRunning);
        }

        self.flags.rearm();
        let pool = self.pool.clone();
        let flags = self.flags.clone();
        let poll = Duration::from_micros(self.config.poll_interval_us);
        let paused_poll = Duration::from_micros(self.config.paused_poll_interval_us);

        let handle = std::thread::Builder::new()
            .name("motif-scheduler".to_string())
            .spawn(move || {
                scheduler::run_loop(pool, sink, flags, poll, paused_poll);
            })
            .map_err(|source| PlayerError::Spawn {
                name: "scheduler",
                source,
            })?;

        self.scheduler = Some(handle);
        log::info!("player: started ({} slots)", self.pool.len());
        Ok(())
    }

    /// True while the scheduler thread is up
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Submit a material for playback
    ///
    /// Returns `Ok(true)` if a slot was claimed and a loader spawned,
    /// `Ok(false)` if the pool is full. The material is copied; the
    /// caller's instance stays free to mutate.
    pub fn play(&mut self, material: &Material) -> Result<bool, PlayerError> {
        if self.scheduler.is_none() {
            return Err(PlayerError::NotRunning);
        }
        self.reap_loaders();

        let Some(index) = self.pool.try_claim() else {
            log::debug!("player: pool full, rejecting material");
            return Ok(false);
        };

        match loader::spawn_material_load(
            self.pool.clone(),
            index,
            material.clone(),
            self.flags.clone(),
        ) {
            Ok(handle) => {
                self.loaders.push(handle);
                Ok(true)
            }
            Err(source) => {
                // never leave the slot stuck in Loading
                self.pool.slot(index).release();
                Err(PlayerError::Spawn {
                    name: "loader",
                    source,
                })
            }
        }
    }

    /// Submit a pre-built event buffer for playback
    ///
    /// The buffer must already be ordered ascending by offset; it is
    /// published as-is.
    pub fn play_events(&mut self, events: Vec<MidiEvent>) -> Result<bool, PlayerError> {
        if self.scheduler.is_none() {
            return Err(PlayerError::NotRunning);
        }
        self.reap_loaders();

        let Some(index) = self.pool.try_claim() else {
            log::debug!("player: pool full, rejecting event buffer");
            return Ok(false);
        };

        match loader::spawn_events_load(self.pool.clone(), index, events, self.flags.clone()) {
            Ok(handle) => {
                self.loaders.push(handle);
                Ok(true)
            }
            Err(source) => {
                self.pool.slot(index).release();
                Err(PlayerError::Spawn {
                    name: "loader",
                    source,
                })
            }
        }
    }

    /// Send an immediate program change on a zero-based channel
    pub fn program_change(&mut self, channel: u8, program: u8) -> Result<bool, PlayerError> {
        self.play_events(vec![MidiEvent::program_change(channel, program, 0.0)])
    }

    /// Pause or resume the whole engine
    ///
    /// A paused engine keeps every pending event queued, including note
    /// offs for notes already sounding; those go out (late) on resume.
    /// Use `reset` to silence an engine instead of pausing it.
    pub fn pause(&self, paused: bool) {
        self.flags.pause.store(paused, Ordering::Release);
        log::debug!("player: pause = {}", paused);
    }

    pub fn is_paused(&self) -> bool {
        self.flags.pause.load(Ordering::Acquire)
    }

    /// Stop the engine: terminal for this run
    ///
    /// Remaining events are discarded, in-flight loaders are cancelled and
    /// joined, and every slot is cleared. A later `start` re-initializes.
    pub fn stop(&mut self) {
        self.flags.stop.store(true, Ordering::Release);
        self.flags.cancel.store(true, Ordering::Release);

        if let Some(handle) = self.scheduler.take() {
            if handle.join().is_err() {
                log::error!("player: scheduler thread panicked");
            }
        }
        for handle in self.loaders.drain(..) {
            if handle.join().is_err() {
                log::error!("player: loader thread panicked");
            }
        }
        self.pool.reset();
        log::info!("player: stopped");
    }

    /// Full reset: stop everything and return the engine to its initial
    /// (not running, unpaused) state
    pub fn reset(&mut self) {
        self.stop();
        self.flags.pause.store(false, Ordering::Release);
    }

    /// Drop handles of loaders that have already finished
    fn reap_loaders(&mut self) {
        self.loaders.retain(|handle| !handle.is_finished());
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}
