//! Line-oriented text protocol for driving a game.
//!
//! The protocol follows the shape of the Go Text Protocol: each line is an
//! optional numeric id, a command and its arguments. Every reply starts with
//! `=` on success or `?` on failure, echoes the id, and ends with a blank
//! line. It is meant for scripting games, debugging positions and hooking
//! up external front ends.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `boardsize <rings>` - Start a new game on a board with that many rings
//! - `clear_board` - Start a new game on the current board
//! - `place <id>`, `move <from> <to>`, `remove <id>` - Play an action
//! - `genmove [random|heuristic|minimax]` - Let the computer play for the side to act
//! - `legal_moves` - List the legal actions, one per line
//! - `showboard` - Print the position
//! - `snapshot` - Print the state as JSON
//! - `load <json>` - Replace the state with a JSON snapshot
//! - `dispatch <json>` - Apply a JSON action
//!
//! ## Example
//!
//! ```
//! use morris_rust::config::GameConfig;
//! use morris_rust::protocol::ProtocolEngine;
//!
//! let mut engine = ProtocolEngine::new(GameConfig::default()).unwrap();
//! let mut out = Vec::new();
//! engine.run("1 place a\n2 place b\n".as_bytes(), &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "=1 \n\n=2 \n\n");
//! ```

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::config::GameConfig;
use crate::error::MorrisError;
use crate::moves::legal_actions;
use crate::opponent::Strategy;
use crate::rules::Action;
use crate::session::Session;
use crate::state::GameState;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "dispatch",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "load",
    "move",
    "name",
    "place",
    "protocol_version",
    "quit",
    "remove",
    "showboard",
    "snapshot",
    "version",
];

/// Strategy used by `genmove` without an argument.
const DEFAULT_STRATEGY: Strategy = Strategy::Minimax;

type Reply = (bool, String);

fn success(message: impl Into<String>) -> Reply {
    (true, message.into())
}

fn failure(message: impl Into<String>) -> Reply {
    (false, message.into())
}

/// Protocol engine state.
pub struct ProtocolEngine {
    session: Session,
    config: GameConfig,
    /// Bumped per generated move so seeded opponents vary between moves.
    moves_generated: u64,
}

impl ProtocolEngine {
    /// # Errors
    /// [`MorrisError::UnsupportedRingCount`] if the configured board is invalid.
    pub fn new(config: GameConfig) -> Result<Self, MorrisError> {
        Ok(Self {
            session: config.session()?,
            config,
            moves_generated: 0,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read commands from `input` and write replies to `output` until `quit`
    /// or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (ok, message) = self.execute(&command, args);
            let prefix = if ok { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> Reply {
        match command {
            "name" => success(env!("CARGO_PKG_NAME")),

            "version" => success(env!("CARGO_PKG_VERSION")),

            "protocol_version" => success("2"),

            "list_commands" => success(KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    success(if known { "true" } else { "false" })
                }
                None => failure("missing argument"),
            },

            "quit" => success(""),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return failure("missing argument");
                };
                let Ok(rings) = arg.parse::<usize>() else {
                    return failure("invalid size");
                };
                let config = GameConfig {
                    rings,
                    ..self.config.clone()
                };
                match config.session() {
                    Ok(session) => {
                        self.session = session;
                        self.config = config;
                        success("")
                    }
                    Err(err) => failure(format!("unacceptable size: {err}")),
                }
            }

            "clear_board" => {
                self.session.reset();
                success("")
            }

            "place" | "remove" => match args {
                [to] if command == "place" => self.play(&Action::place(*to)),
                [to] => self.play(&Action::remove(*to)),
                _ => failure("expected one point"),
            },

            "move" => match args {
                [from, to] => self.play(&Action::movement(*from, *to)),
                _ => failure("expected two points"),
            },

            "genmove" => {
                let strategy = match args.first() {
                    Some(name) => match name.parse::<Strategy>() {
                        Ok(strategy) => strategy,
                        Err(err) => return failure(err.to_string()),
                    },
                    None => DEFAULT_STRATEGY,
                };
                self.genmove(strategy)
            }

            "legal_moves" => {
                let actions: Vec<String> = legal_actions(self.session.state())
                    .iter()
                    .map(Action::to_string)
                    .collect();
                success(actions.join("\n"))
            }

            "showboard" => success(format!("\n{}", self.session.state())),

            "snapshot" => match serde_json::to_string(self.session.state()) {
                Ok(json) => success(json),
                Err(err) => failure(err.to_string()),
            },

            "load" => match serde_json::from_str::<GameState>(&args.join(" ")) {
                Ok(state) => {
                    self.session = Session::from_state(state);
                    success("")
                }
                Err(err) => failure(format!("invalid snapshot: {err}")),
            },

            "dispatch" => match serde_json::from_str::<Action>(&args.join(" ")) {
                Ok(action) => self.play(&action),
                Err(err) => failure(format!("invalid action: {err}")),
            },

            _ => failure(format!("unknown command: {command}")),
        }
    }

    fn play(&mut self, action: &Action) -> Reply {
        match self.session.dispatch(action) {
            Ok(true) => success(""),
            Ok(false) => failure("illegal move"),
            Err(err) => failure(err.to_string()),
        }
    }

    fn genmove(&mut self, strategy: Strategy) -> Reply {
        self.moves_generated += 1;
        let opponent = self.config.opponent(strategy, self.moves_generated);
        let thinking = self.session.think(opponent, self.config.think_delay());

        match self.session.commit(thinking) {
            Ok(decision) => match decision.action {
                Some(action) if decision.applied => {
                    debug!(%strategy, %action, "generated move");
                    success(action.to_string())
                }
                _ => failure("no move generated"),
            },
            Err(err) => failure(err.to_string()),
        }
    }
}
