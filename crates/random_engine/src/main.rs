use std::io::{self, BufRead};

use random_engine::{Flow, RandomEngine};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // stdout carries the protocol, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut engine = RandomEngine::new();

    for line in stdin.lock().lines() {
        let line = line?;
        if engine.handle(line.trim(), &mut stdout)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
