//! Spectate - terminal client for a native-bomber game server

use bomber::spectator::{self, Command};
use bomber::{Config, terminal};
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not tear the board on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Spectate - Terminal Client v{}", env!("CARGO_PKG_VERSION"));

    let url = match std::env::args().nth(1) {
        Some(url) => url,
        None => Config::load()?.game.url(),
    };

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    // Plain thread: a blocked stdin read must not hold up exit
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if let Some(command) = Command::parse(&line) {
                if command_tx.send(command).is_err() {
                    break;
                }
            }
        }
    });

    println!("Commands: left | right | up | down | bomb, anything else is chat");
    spectator::run(&url, command_rx, |game, frame| {
        if frame.resized.is_some() || !frame.cells.is_empty() || frame.status.is_some() {
            // Clear screen, cursor home
            print!("\x1b[2J\x1b[H{}", terminal::render_board(game));
        }
        for line in &frame.logs {
            println!("{}", terminal::render_log(line));
        }
    })
    .await?;

    println!("Disconnected");
    Ok(())
}
