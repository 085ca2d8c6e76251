//! Protocol engine: an NBoard session on top of [`EngineProcess`].
//!
//! All methods take `&self` so one thread can block in [`NBoardEngine::think`]
//! while another quits or kills the engine.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use reversi_core::{Color, GameRecord, GameTime, Move};

use crate::error::EngineError;
use crate::process::{EngineProcess, LineListener};
use crate::protocol;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle of one session. Exactly one state holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    NotStarted = 0,
    Starting,
    Idle,
    Thinking,
    Quitting,
    Quit,
    Killing,
    Killed,
    Crashed,
}

impl EngineState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::NotStarted,
            1 => Self::Starting,
            2 => Self::Idle,
            3 => Self::Thinking,
            4 => Self::Quitting,
            5 => Self::Quit,
            6 => Self::Killing,
            7 => Self::Killed,
            _ => Self::Crashed,
        }
    }

    /// Quit or kill was requested, so an exit is expected.
    fn is_stopping(self) -> bool {
        matches!(self, Self::Quitting | Self::Quit | Self::Killing | Self::Killed)
    }

    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Quit | Self::Killed | Self::Crashed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The process died without quit or kill having been requested.
    ExitedUnexpectedly { engine: String, pid: u32 },
    /// An unsolicited line the session did not recognise.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub work_dir: Option<PathBuf>,
    /// Sent in order right after the handshake.
    pub initial_commands: Vec<String>,
    pub probe_timeout: Duration,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            work_dir: None,
            initial_commands: Vec::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Outcome of [`NBoardEngine::think`]. `mv` is `None` when the search was
/// abandoned because the engine was stopped or died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkResult {
    pub mv: Option<Move>,
    pub elapsed: Duration,
}

/// State shared with the reader thread.
struct Session {
    state: AtomicU8,
    name: Mutex<String>,
    pid: AtomicU32,
    events: Mutex<Option<Sender<EngineEvent>>>,
}

impl Session {
    fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: EngineState, to: EngineState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn set_state(&self, to: EngineState) -> EngineState {
        EngineState::from_u8(self.state.swap(to as u8, Ordering::AcqRel))
    }

    fn name(&self) -> String {
        self.name.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_name(&self, name: &str) {
        *self.name.lock().unwrap_or_else(|e| e.into_inner()) = name.to_string();
    }

    fn emit(&self, event: EngineEvent) {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = events.as_ref() {
            let _ = tx.send(event);
        }
    }
}

impl LineListener for Session {
    fn on_unsolicited(&self, line: &str) {
        if let Some(name) = protocol::parse_myname(line) {
            info!(engine = name, "engine announced its name");
            self.set_name(name);
            return;
        }
        self.emit(EngineEvent::Text(line.to_string()));
    }

    fn on_exit(&self, status: Option<ExitStatus>) {
        let mut current = self.state();
        let next = loop {
            let next = match current {
                EngineState::Quitting => EngineState::Quit,
                s if s.is_stopping() || s.is_terminated() => return,
                _ => EngineState::Crashed,
            };
            match self.state.compare_exchange(
                current as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break next,
                Err(actual) => current = EngineState::from_u8(actual),
            }
        };

        if next == EngineState::Crashed {
            let engine = self.name();
            let pid = self.pid.load(Ordering::Relaxed);
            warn!(%engine, pid, ?status, "engine exited unexpectedly");
            self.emit(EngineEvent::ExitedUnexpectedly { engine, pid });
        }
    }
}

pub struct NBoardEngine {
    config: EngineConfig,
    session: Arc<Session>,
    process: OnceLock<EngineProcess>,
    probe_counter: AtomicU64,
}

impl NBoardEngine {
    pub fn new(config: EngineConfig) -> Self {
        let name = config
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            config,
            session: Arc::new(Session {
                state: AtomicU8::new(EngineState::NotStarted as u8),
                name: Mutex::new(name),
                pid: AtomicU32::new(0),
                events: Mutex::new(None),
            }),
            process: OnceLock::new(),
            probe_counter: AtomicU64::new(0),
        }
    }

    /// Channel of exit and text notifications. A later call replaces the earlier receiver.
    pub fn subscribe(&self) -> Receiver<EngineEvent> {
        let (tx, rx) = mpsc::channel();
        *self.session.events.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        rx
    }

    /// Display name: the binary stem until the engine announces its own.
    pub fn name(&self) -> String {
        self.session.name()
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.get().map(EngineProcess::pid)
    }

    pub fn state(&self) -> EngineState {
        self.session.state()
    }

    pub fn is_thinking(&self) -> bool {
        self.state() == EngineState::Thinking
    }

    pub fn was_killed(&self) -> bool {
        self.state() == EngineState::Killed
    }

    pub fn is_alive(&self) -> bool {
        self.process.get().is_some_and(EngineProcess::is_alive)
    }

    /// Spawn the process, send the handshake and the configured initial commands.
    pub fn start(&self) -> Result<(), EngineError> {
        if !self
            .session
            .transition(EngineState::NotStarted, EngineState::Starting)
        {
            return Err(EngineError::IllegalState("engine was already started"));
        }

        let listener: Arc<dyn LineListener> = self.session.clone();
        let process = match EngineProcess::start(
            &self.config.path,
            &self.config.args,
            self.config.work_dir.as_deref(),
            listener,
        ) {
            Ok(process) => process,
            Err(e) => {
                self.session.set_state(EngineState::NotStarted);
                return Err(e);
            }
        };
        self.session
            .pid
            .store(process.pid(), Ordering::Relaxed);
        let process = self.process.get_or_init(|| process);

        let greeted = process.send(&protocol::handshake()).and_then(|_| {
            self.config
                .initial_commands
                .iter()
                .try_for_each(|cmd| process.send(cmd))
        });
        if let Err(e) = greeted {
            self.session.set_state(EngineState::Crashed);
            return Err(e);
        }

        self.session
            .transition(EngineState::Starting, EngineState::Idle);
        info!(engine = %self.name(), pid = process.pid(), "engine ready");
        Ok(())
    }

    fn process(&self) -> Result<&EngineProcess, EngineError> {
        self.process
            .get()
            .ok_or(EngineError::IllegalState("engine has not been started"))
    }

    /// Liveness probe. Each call uses a fresh number.
    fn probe(&self, process: &EngineProcess) -> Result<(), EngineError> {
        let n = self.probe_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let mut pong = process.send_expecting(&protocol::ping(n), &protocol::pong_pattern(n))?;
        if pong.wait(self.config.probe_timeout) {
            return Ok(());
        }
        let engine = self.name();
        warn!(%engine, pid = process.pid(), probe = n, "no pong within {:?}", self.config.probe_timeout);
        Err(EngineError::Unresponsive {
            engine,
            pid: process.pid(),
        })
    }

    /// Probe, then send a command that has no reply.
    fn send_command(&self, command: &str) -> Result<(), EngineError> {
        let process = self.process()?;
        match self.state() {
            EngineState::Idle | EngineState::Thinking => {}
            EngineState::NotStarted | EngineState::Starting => {
                return Err(EngineError::IllegalState("engine has not been started"))
            }
            _ => return Err(EngineError::IllegalState("engine has terminated")),
        }
        self.probe(process)?;
        process.send(command)
    }

    pub fn set_time(&self, color: Color, time: &GameTime) -> Result<(), EngineError> {
        self.send_command(&protocol::set_time(color, time))
    }

    /// Search depth, sent as `set depth`.
    pub fn set_level(&self, depth: u32) -> Result<(), EngineError> {
        self.send_command(&protocol::set_depth(depth))
    }

    pub fn set_game_info(&self, record: &GameRecord) -> Result<(), EngineError> {
        self.send_command(&protocol::set_game(record))
    }

    pub fn send_move(&self, mv: Move) -> Result<(), EngineError> {
        self.send_command(&protocol::move_played(mv))
    }

    /// Ask for a move and block until it arrives or the session is stopped.
    pub fn think(&self) -> Result<ThinkResult, EngineError> {
        let process = self.process()?;
        if !self
            .session
            .transition(EngineState::Idle, EngineState::Thinking)
        {
            return Err(EngineError::IllegalState("think() requires an idle engine"));
        }

        let mut reply = match self
            .probe(process)
            .and_then(|_| process.send_expecting(protocol::go(), protocol::THINK_REPLY))
        {
            Ok(reply) => reply,
            Err(e) => {
                if self
                    .session
                    .transition(EngineState::Thinking, EngineState::Idle)
                {
                    return Err(e);
                }
                // Stopped while probing.
                return Ok(ThinkResult {
                    mv: None,
                    elapsed: Duration::ZERO,
                });
            }
        };
        let start = Instant::now();

        let answered = reply.wait_forever();
        let elapsed = start.elapsed();
        let finished = self
            .session
            .transition(EngineState::Thinking, EngineState::Idle);

        match reply.result() {
            Some(line) if answered && finished => {
                let mv = protocol::parse_think_reply(line)?;
                debug!(engine = %self.name(), %mv, ?elapsed, "engine moved");
                Ok(ThinkResult {
                    mv: Some(mv),
                    elapsed,
                })
            }
            _ => {
                info!(engine = %self.name(), state = ?self.state(), "think abandoned");
                Ok(ThinkResult { mv: None, elapsed })
            }
        }
    }

    /// Ask the engine to exit. Returns whether it did within `timeout`.
    pub fn quit(&self, timeout: Duration) -> Result<bool, EngineError> {
        let Some(process) = self.process.get() else {
            return Ok(true);
        };
        let previous = self.session.set_state(EngineState::Quitting);
        if previous.is_terminated() || !process.is_alive() {
            // The reader may have recorded the exit in the meantime.
            self.session.transition(EngineState::Quitting, previous);
            return Ok(true);
        }
        process.purge_pending();

        info!(engine = %self.name(), pid = process.pid(), "quitting engine");
        if let Err(e) = process.send(protocol::quit()) {
            debug!(engine = %self.name(), "quit not delivered: {e}");
        }
        if process.wait_for_exit(timeout) {
            self.session
                .transition(EngineState::Quitting, EngineState::Quit);
            Ok(true)
        } else {
            warn!(engine = %self.name(), pid = process.pid(), "engine ignored quit");
            Ok(false)
        }
    }

    /// Force-terminate the engine. Returns whether it exited within `timeout`.
    pub fn kill(&self, timeout: Duration) -> bool {
        let Some(process) = self.process.get() else {
            return true;
        };
        let previous = self.session.set_state(EngineState::Killing);
        if previous.is_terminated() || !process.is_alive() {
            self.session.transition(EngineState::Killing, previous);
            return true;
        }
        process.purge_pending();

        info!(engine = %self.name(), pid = process.pid(), "killing engine");
        if process.kill(timeout) {
            self.session.set_state(EngineState::Killed);
            true
        } else {
            warn!(engine = %self.name(), pid = process.pid(), "engine survived kill");
            false
        }
    }
}
