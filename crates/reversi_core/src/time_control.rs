//! Clock settings handed to engines with `set time`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Thinking time for one side.
///
/// `main_ms` is the initial budget, `increment_ms` is added after every move,
/// and once the budget is spent each move must come within `byoyomi_ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTime {
    pub main_ms: u64,
    pub increment_ms: u64,
    pub byoyomi_ms: u64,
}

impl GameTime {
    pub fn new(main: Duration, increment: Duration, byoyomi: Duration) -> Self {
        Self {
            main_ms: main.as_millis() as u64,
            increment_ms: increment.as_millis() as u64,
            byoyomi_ms: byoyomi.as_millis() as u64,
        }
    }

    pub fn main(&self) -> Duration {
        Duration::from_millis(self.main_ms)
    }

    pub fn increment(&self) -> Duration {
        Duration::from_millis(self.increment_ms)
    }

    pub fn byoyomi(&self) -> Duration {
        Duration::from_millis(self.byoyomi_ms)
    }
}

impl fmt::Display for GameTime {
    /// Main time as `h:mm:ss`, the form used in game records.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.main_ms / 1000;
        write!(f, "{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    }
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
