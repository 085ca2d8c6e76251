//! Tournament CLI
//!
//! Play NBoard engines against each other and record the games.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

use tournament::{GameConfig, MatchRunner, PlayerConfig};

fn print_usage() {
    println!("NBoard local game server");
    println!();
    println!("Usage:");
    println!("  tournament run <game.toml> <player0.toml> <player1.toml> <games>");
    println!("  tournament init <dir>");
    println!();
    println!("Commands:");
    println!("  run     - Play <games> games between the two configured engines");
    println!("  init    - Write default config templates into <dir>");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=nboard::io=debug) to trace engine traffic.");
}

fn run(args: &[String]) -> Result<()> {
    let [game_path, p0_path, p1_path, games] = args else {
        print_usage();
        bail!("run needs a game config, two player configs and the number of games");
    };

    let games: u32 = match games.parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).context("too many games")?,
        Ok(_) => bail!("the number of games must be a positive number"),
        Err(_) => bail!("the number of games must be an integer, got \"{games}\""),
    };

    let game = GameConfig::load(Path::new(game_path))
        .with_context(|| format!("cannot load game config from \"{game_path}\""))?;
    let p0 = PlayerConfig::load(Path::new(p0_path))
        .with_context(|| format!("cannot load player config from \"{p0_path}\""))?;
    let p1 = PlayerConfig::load(Path::new(p1_path))
        .with_context(|| format!("cannot load player config from \"{p1_path}\""))?;

    let mut runner = MatchRunner::new(game, p0, p1);
    let outcome = runner.start().and_then(|_| runner.run(games));
    runner.shutdown();

    if let Err(e) = outcome {
        println!("Game was suspended.");
        return Err(e.into());
    }

    println!();
    println!("=== Final Result ===");
    for player in runner.players() {
        println!(
            "{} ({}): {}",
            player.engine.name(),
            player.label(),
            player.stats.summary()
        );
    }
    Ok(())
}

fn init(args: &[String]) -> Result<()> {
    let [dir] = args else {
        print_usage();
        bail!("init needs a target directory");
    };
    let dir = Path::new(dir);
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

    GameConfig::default().save(&dir.join("game.toml"))?;
    for name in ["player0.toml", "player1.toml"] {
        let player = PlayerConfig {
            path: "random_nboard".into(),
            ..Default::default()
        };
        player.save(&dir.join(name))?;
    }
    println!("Wrote game.toml, player0.toml and player1.toml to {}", dir.display());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "run" => run(&args[2..]),
        "init" => init(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}
