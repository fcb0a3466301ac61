//! Headless runner (default binary).
//!
//! Plays a game without a terminal UI: gravity ticks plus an optional script
//! of commands, then prints the visible board and score. Useful for
//! reproducing a game from a seed and for exporting saves.
//!
//! Script format, one entry per line (`#` starts a comment):
//!
//! ```text
//! moveLeft
//! rotateCw
//! tick 5        # five gravity steps
//! wait 450      # feed 450ms through the tick driver
//! hardDrop
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tetrimino::core::{Game, GameConfig, GameSnapshot, Outcome, TickDriver};
use tetrimino::types::Command;

#[derive(Debug, Parser)]
#[command(name = "tetrimino", version, about = "Headless falling-block puzzle runner")]
struct Args {
    /// Bag seed; overrides TETRIMINO_SEED
    #[arg(short, long)]
    seed: Option<u32>,

    /// Gravity ticks to run after the script
    #[arg(short, long, default_value = "0")]
    ticks: u32,

    /// File of commands to apply in order
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Write the final game state as JSON
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Resume from a previously exported game
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Log filter
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut game = load_game(&args)?;
    let mut driver = TickDriver::from_config(game.config());

    if let Some(path) = &args.script {
        let script = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        run_script(&mut game, &mut driver, &script)?;
    }

    for _ in 0..args.ticks {
        if game.tick() == Outcome::GameOver {
            break;
        }
    }

    let snapshot = game.snapshot();
    print!("{}", render(&snapshot));
    info!(
        points = snapshot.score.points,
        lines = snapshot.score.lines,
        level = snapshot.score.level,
        ended = snapshot.ended,
        "finished"
    );

    if let Some(path) = &args.export {
        let json = game.export().to_json_pretty()?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "exported");
    }

    Ok(())
}

fn load_game(args: &Args) -> Result<Game> {
    if let Some(path) = &args.import {
        let json =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let saved = tetrimino::core::SavedGame::from_json(&json)?;
        let game = Game::import(saved)?;
        info!(path = %path.display(), "imported");
        return Ok(game);
    }

    let mut config = GameConfig::from_env();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    info!(seed = config.seed, width = config.width, "new game");
    Ok(Game::new(config)?)
}

fn run_script(game: &mut Game, driver: &mut TickDriver, script: &str) -> Result<()> {
    for (number, line) in script.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let word = parts.next().unwrap_or("");
        let arg = parts.next();

        match word.to_lowercase().as_str() {
            "tick" => {
                let count: u32 = parse_arg(arg, 1, number)?;
                for _ in 0..count {
                    game.tick();
                }
            }
            "wait" => {
                let ms: u32 = parse_arg(arg, driver.interval_ms(), number)?;
                let outcomes = driver.advance(game, ms);
                debug!(ms, ticks = outcomes.len(), "wait");
            }
            _ => {
                let Some(command) = Command::from_str(word) else {
                    bail!("line {}: unknown command {:?}", number + 1, word);
                };
                let applied = game.apply(command);
                debug!(command = command.as_str(), applied, "command");
            }
        }

        if game.ended() {
            info!(line = number + 1, "game over during script");
            break;
        }
    }
    Ok(())
}

fn parse_arg(arg: Option<&str>, default: u32, number: usize) -> Result<u32> {
    match arg {
        None => Ok(default),
        Some(s) => s
            .parse()
            .with_context(|| format!("line {}: bad count {:?}", number + 1, s)),
    }
}

/// Visible rows as text: locked blocks by kind letter, the active piece as `@`
fn render(snapshot: &GameSnapshot) -> String {
    let width = snapshot.width as usize;
    let hidden = (snapshot.height - snapshot.visible_height) as i32;
    let active_cells: Vec<(i32, i32)> = snapshot
        .active
        .map(|piece| {
            piece
                .mask
                .cells()
                .into_iter()
                .map(|(c, r)| (piece.x + c, piece.y + r))
                .collect()
        })
        .unwrap_or_default();

    let mut out = String::new();
    for (i, row) in snapshot.visible_rows().iter().enumerate() {
        let y = hidden + i as i32;
        out.push('|');
        for (x, cell) in row.iter().enumerate() {
            if active_cells.contains(&(x as i32, y)) {
                out.push('@');
            } else {
                match cell {
                    Some(block) => out.push_str(&block.kind.as_str().to_uppercase()),
                    None => out.push('.'),
                }
            }
        }
        out.push_str("|\n");
    }
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push_str("+\n");
    out
}
