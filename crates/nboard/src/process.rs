//! Child-process transport: one reader thread per engine turns its stdout into
//! lines and hands each line to the earliest registered request whose pattern
//! matches, or to a listener when nobody is waiting for it.

use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::EngineError;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Receives everything the reader thread does not route to a [`Response`].
pub trait LineListener: Send + Sync {
    fn on_unsolicited(&self, line: &str);

    /// Called once, after the pending table has been cleared.
    fn on_exit(&self, status: Option<ExitStatus>);
}

struct PendingResponse {
    id: u64,
    pattern: Regex,
    slot: SyncSender<String>,
}

#[derive(Default)]
struct PendingTable {
    entries: Vec<PendingResponse>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    pending: Mutex<PendingTable>,
    next_id: AtomicU64,
    exit: Mutex<Option<Option<ExitStatus>>>,
    exited: Condvar,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, PendingTable> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registration order is preserved, so the first match is the oldest request.
    fn take_match(&self, line: &str) -> Option<SyncSender<String>> {
        let mut table = self.pending();
        let idx = table.entries.iter().position(|p| p.pattern.is_match(line))?;
        Some(table.entries.remove(idx).slot)
    }

    fn purge(&self, close: bool) -> usize {
        let mut table = self.pending();
        table.closed |= close;
        let purged = table.entries.len();
        table.entries.clear();
        purged
    }

    fn remove(&self, id: u64) {
        self.pending().entries.retain(|p| p.id != id);
    }

    fn exit_status(&self) -> Option<Option<ExitStatus>> {
        *self.exit.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Reply slot for [`EngineProcess::send_expecting`].
///
/// The slot disconnects without a value when the pending table is purged,
/// which happens on process exit and through [`EngineProcess::purge_pending`].
/// Dropping an unanswered `Response` withdraws its request.
pub struct Response {
    id: u64,
    shared: Arc<Shared>,
    rx: Receiver<String>,
    result: Option<String>,
    disconnected: bool,
}

impl Response {
    fn new(id: u64, shared: Arc<Shared>, rx: Receiver<String>) -> Self {
        Self {
            id,
            shared,
            rx,
            result: None,
            disconnected: false,
        }
    }

    /// Block up to `timeout` for the matching line. Returns whether it arrived.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if self.result.is_some() || self.disconnected {
            return self.result.is_some();
        }
        match self.rx.recv_timeout(timeout) {
            Ok(line) => self.result = Some(line),
            Err(RecvTimeoutError::Disconnected) => self.disconnected = true,
            Err(RecvTimeoutError::Timeout) => {}
        }
        self.result.is_some()
    }

    /// Block until the line arrives or the request is abandoned.
    pub fn wait_forever(&mut self) -> bool {
        if self.result.is_none() && !self.disconnected {
            match self.rx.recv() {
                Ok(line) => self.result = Some(line),
                Err(_) => self.disconnected = true,
            }
        }
        self.result.is_some()
    }

    pub fn has_result(&mut self) -> bool {
        if self.result.is_none() && !self.disconnected {
            match self.rx.try_recv() {
                Ok(line) => self.result = Some(line),
                Err(TryRecvError::Disconnected) => self.disconnected = true,
                Err(TryRecvError::Empty) => {}
            }
        }
        self.result.is_some()
    }

    /// True once the request can no longer be answered.
    pub fn is_abandoned(&self) -> bool {
        self.disconnected && self.result.is_none()
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

impl Drop for Response {
    fn drop(&mut self) {
        if self.result.is_none() && !self.disconnected {
            self.shared.remove(self.id);
        }
    }
}

pub struct EngineProcess {
    name: String,
    pid: u32,
    child: Arc<Mutex<Child>>,
    stdin: Mutex<ChildStdin>,
    shared: Arc<Shared>,
}

impl EngineProcess {
    /// Spawn `path` with piped stdio and start its reader thread.
    pub fn start(
        path: &Path,
        args: &[String],
        work_dir: Option<&Path>,
        listener: Arc<dyn LineListener>,
    ) -> Result<Self, EngineError> {
        let spawn_err = |source: io::Error| EngineError::Spawn {
            path: path.to_path_buf(),
            source,
        };

        let mut cmd = Command::new(path);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = work_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(spawn_err)?;
        let missing = |what: &str| spawn_err(io::Error::new(io::ErrorKind::BrokenPipe, format!("no {what} pipe")));
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;

        let name = binary_name(path);
        let pid = child.id();
        info!(engine = %name, pid, "engine process started");

        let child = Arc::new(Mutex::new(child));
        let shared = Arc::new(Shared::default());
        {
            let child = Arc::clone(&child);
            let shared = Arc::clone(&shared);
            let name = name.clone();
            thread::Builder::new()
                .name(format!("{name}-reader"))
                .spawn(move || read_loop(stdout, &child, &shared, listener.as_ref(), &name, pid))
                .map_err(spawn_err)?;
        }

        Ok(Self {
            name,
            pid,
            child,
            stdin: Mutex::new(stdin),
            shared,
        })
    }

    /// File stem of the engine binary.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn is_alive(&self) -> bool {
        self.shared.exit_status().is_none()
    }

    /// `None` while running; `Some(None)` when the exit code could not be read.
    pub fn exit_status(&self) -> Option<Option<ExitStatus>> {
        self.shared.exit_status()
    }

    /// Write one line, no reply expected.
    pub fn send(&self, command: &str) -> Result<(), EngineError> {
        debug!(target: "nboard::io", engine = %self.name, pid = self.pid, "> {command}");
        let mut stdin = self.stdin.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(stdin, "{command}")?;
        stdin.flush()?;
        Ok(())
    }

    /// Register interest in the first line matching `pattern`, then write `command`.
    pub fn send_expecting(&self, command: &str, pattern: &str) -> Result<Response, EngineError> {
        let pattern = Regex::new(pattern)?;
        let (slot, rx) = mpsc::sync_channel(1);
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut table = self.shared.pending();
            if table.closed {
                return Err(EngineError::Connection(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "engine process has exited",
                )));
            }
            table.entries.push(PendingResponse { id, pattern, slot });
        }

        if let Err(e) = self.send(command) {
            self.shared.remove(id);
            return Err(e);
        }
        Ok(Response::new(id, Arc::clone(&self.shared), rx))
    }

    /// Abandon every outstanding request. Waiters see their slot disconnect.
    pub fn purge_pending(&self) -> usize {
        self.shared.purge(false)
    }

    /// Block up to `timeout` for the process to exit.
    pub fn wait_for_exit(&self, timeout: Duration) -> bool {
        let guard = self.shared.exit.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = self
            .shared
            .exited
            .wait_timeout_while(guard, timeout, |status| status.is_none())
            .unwrap_or_else(|e| e.into_inner());
        guard.is_some()
    }

    /// Force-terminate and wait up to `timeout` for the exit to be observed.
    pub fn kill(&self, timeout: Duration) -> bool {
        if !self.is_alive() {
            return true;
        }
        {
            let mut child = self.child.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = child.kill() {
                // InvalidInput means the process is already gone.
                if e.kind() != io::ErrorKind::InvalidInput {
                    warn!(engine = %self.name, pid = self.pid, "kill failed: {e}");
                }
            }
        }
        self.wait_for_exit(timeout)
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        if self.is_alive() {
            let mut child = self.child.lock().unwrap_or_else(|e| e.into_inner());
            let _ = child.kill();
        }
    }
}

fn binary_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| PathBuf::from(path).display().to_string())
}

fn read_loop(
    stdout: ChildStdout,
    child: &Mutex<Child>,
    shared: &Shared,
    listener: &dyn LineListener,
    name: &str,
    pid: u32,
) {
    let reader = BufReader::new(stdout);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!(target: "nboard::io", engine = %name, pid, "read failed: {e}");
                break;
            }
        };
        let line = line.trim_end_matches('\r');
        debug!(target: "nboard::io", engine = %name, pid, "< {line}");

        match shared.take_match(line) {
            Some(slot) => {
                // The waiter may have given up already.
                let _ = slot.try_send(line.to_string());
            }
            None => listener.on_unsolicited(line),
        }
    }

    let status = loop {
        let polled = child.lock().unwrap_or_else(|e| e.into_inner()).try_wait();
        match polled {
            Ok(Some(status)) => break Some(status),
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
            Err(e) => {
                warn!(engine = %name, pid, "could not read exit status: {e}");
                break None;
            }
        }
    };

    let purged = shared.purge(true);
    if purged > 0 {
        debug!(engine = %name, pid, purged, "dropped pending responses on exit");
    }
    *shared.exit.lock().unwrap_or_else(|e| e.into_inner()) = Some(status);
    shared.exited.notify_all();
    info!(engine = %name, pid, ?status, "engine process exited");
    listener.on_exit(status);
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod process_tests;
