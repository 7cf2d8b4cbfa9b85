//! Morris-Rust: N men's morris engine.
//!
//! ## Usage
//!
//! - `morris-rust` - Watch two computer opponents play
//! - `morris-rust play` - Text protocol on stdin/stdout
//! - `morris-rust relay` - Relay actions between two network clients
//! - `morris-rust demo` - Watch two computer opponents play

use std::io;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use morris_rust::config::GameConfig;
use morris_rust::constants::DEFAULT_RELAY_PORT;
use morris_rust::opponent::Strategy;
use morris_rust::protocol::ProtocolEngine;
use morris_rust::relay;
use morris_rust::state::Player;

/// Morris-Rust: rules engine and computer opponents for N men's morris
#[derive(Parser)]
#[command(name = "morris-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak the text protocol on stdin/stdout
    Play {
        #[command(flatten)]
        config: GameConfig,
    },
    /// Relay action messages between two clients
    Relay {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = DEFAULT_RELAY_PORT)]
        port: u16,
    },
    /// Let two computer opponents play each other
    Demo {
        #[command(flatten)]
        config: GameConfig,
        /// Strategy for player a
        #[arg(long, default_value = "minimax")]
        a: Strategy,
        /// Strategy for player b
        #[arg(long, default_value = "random")]
        b: Strategy,
        /// Stop after this many turns if nobody has won
        #[arg(long, default_value_t = 200)]
        max_turns: u32,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play { config }) => {
            let mut engine = ProtocolEngine::new(config)?;
            engine.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Commands::Relay { host, port }) => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(async {
                let listener = tokio::net::TcpListener::bind((host.as_str(), port))
                    .await
                    .with_context(|| format!("failed to bind {host}:{port}"))?;
                relay::serve(listener).await?;
                Ok::<_, anyhow::Error>(())
            })?;
        }
        Some(Commands::Demo {
            config,
            a,
            b,
            max_turns,
        }) => run_demo(&config, a, b, max_turns)?,
        None => run_demo(&GameConfig::default(), Strategy::Minimax, Strategy::Random, 200)?,
    }
    Ok(())
}

fn run_demo(config: &GameConfig, a: Strategy, b: Strategy, max_turns: u32) -> Result<()> {
    println!("Morris-Rust: {a} (a) against {b} (b) on {} rings\n", config.rings);

    let mut session = config.session()?;
    let mut players = [Some(config.opponent(a, 0)), Some(config.opponent(b, 1))];

    while !session.state().is_terminal() && session.state().turn().count < max_turns {
        let turn = session.state().turn();
        if session.state().next_moves().is_exhausted() {
            println!("{} has no legal move", turn.player);
            break;
        }

        let slot = &mut players[usize::from(turn.player == Player::B)];
        let opponent = slot.take().context("opponent was not handed back")?;
        let thinking = session.think(opponent, config.think_delay());
        let decision = session.commit(thinking)?;
        *slot = Some(decision.opponent);

        match decision.action {
            Some(action) if decision.applied => println!("{:>3} {}: {action}", turn.count + 1, turn.player),
            _ => bail!("{} produced no move at turn {}", turn.player, turn.count),
        }
    }

    println!("\n{}", session.state());
    match session.state().winner() {
        Some(player) => info!(%player, turns = session.state().turn().count, "demo finished"),
        None => info!(turns = session.state().turn().count, "demo stopped without a winner"),
    }
    Ok(())
}
