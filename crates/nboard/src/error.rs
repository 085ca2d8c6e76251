use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The liveness probe went unanswered; the command that needed it was not sent.
    #[error("engine {engine} (pid {pid}) is not responding")]
    Unresponsive { engine: String, pid: u32 },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("illegal engine state: {0}")]
    IllegalState(&'static str),

    #[error("connection to engine lost: {0}")]
    Connection(#[from] io::Error),

    #[error("invalid response pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
