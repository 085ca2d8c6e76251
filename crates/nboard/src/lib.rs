//! NBoard engine driver.
//!
//! [`EngineProcess`] owns a child process and correlates the lines it prints
//! with the commands that asked for them. [`NBoardEngine`] speaks the NBoard
//! protocol on top of it: handshake, `ping`/`pong` liveness probes before
//! every command, `go` searches and the quit/kill lifecycle.

mod engine;
mod error;
pub mod process;
pub mod protocol;

pub use engine::*;
pub use error::EngineError;
pub use process::{EngineProcess, LineListener, Response};
