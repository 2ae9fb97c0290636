// Round session: the open/closed flag, the current guesses, and the
// moderator-gated command dispatch.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::resolver::resolve_closest;

/// Minimum chat role that may issue round commands when no level is
/// configured. Streamer.bot roles: 1 = Viewer, 2 = VIP, 3 = Moderator,
/// 4 = Broadcaster.
pub const DEFAULT_MODERATOR_LEVEL: u8 = 3;

// ---------------------------------------------------------------------------
// Guess
// ---------------------------------------------------------------------------

/// A single participant's price guess. One entry per participant; a
/// resubmission overwrites the price in place, so the entry keeps its
/// original position in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    /// Twitch login name, unique per round.
    pub username: String,
    /// Name shown on the board (falls back to the login name).
    pub display_name: String,
    /// Parsed guess, `$` prefix already stripped.
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Command classification
// ---------------------------------------------------------------------------

/// The fixed set of round commands a moderator can issue in chat.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundCommand {
    /// `!openprice` -- start accepting guesses.
    Open,
    /// `!closeprice` -- stop accepting guesses.
    Close,
    /// `!clearprice` -- drop all guesses and the highlight.
    Clear,
    /// `!setprice <price>` -- reveal the actual price. The argument is kept
    /// as raw text; validation happens when the command is applied.
    SetPrice(String),
}

impl RoundCommand {
    /// Classify a chat message by its first whitespace-delimited token,
    /// case-insensitively. Returns `None` for anything that is not a
    /// recognized command token.
    pub fn parse(text: &str) -> Option<RoundCommand> {
        let mut tokens = text.split_whitespace();
        let first = tokens.next()?.to_lowercase();
        match first.as_str() {
            "!openprice" => Some(RoundCommand::Open),
            "!closeprice" => Some(RoundCommand::Close),
            "!clearprice" => Some(RoundCommand::Clear),
            "!setprice" => Some(RoundCommand::SetPrice(
                tokens.next().unwrap_or_default().to_string(),
            )),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Price validation
// ---------------------------------------------------------------------------

/// Parse a price string: an optional leading `$`, one or more digits,
/// optionally followed by `.` and one or more digits. Anything else
/// (letters, a second `$`, trailing text, bare `.5` or `5.`, the empty
/// string) is rejected.
pub fn parse_price(input: &str) -> Option<f64> {
    let digits = input.strip_prefix('$').unwrap_or(input);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    digits.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// RoundSession
// ---------------------------------------------------------------------------

/// What a chat message did to the session, so the orchestrator knows which
/// UI updates to push.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// No state change: invalid guess, round closed, or an unprivileged
    /// sender's command text failing guess validation.
    Ignored,
    /// The accepting flag changed (opened or closed).
    StatusChanged,
    /// The guess list changed (new or overwritten guess, or a clear).
    BoardChanged,
    /// A valid `!setprice` ran the resolver. `winner` is the username of
    /// the closest-but-not-over guess, if any guess qualified.
    PriceSet { winner: Option<String> },
}

/// The state of one guessing round. Owned exclusively by the app
/// orchestrator; the TUI only ever sees projections of it.
#[derive(Debug, Clone)]
pub struct RoundSession {
    accepting: bool,
    guesses: Vec<Guess>,
    /// Username of the last resolved winner. Cleared by `!clearprice`,
    /// replaced by each valid `!setprice`.
    highlight: Option<String>,
    moderator_level: u8,
    /// When the round was last opened; shown in the status bar.
    opened_at: Option<DateTime<Local>>,
}

impl RoundSession {
    /// Create a closed, empty session.
    pub fn new(moderator_level: u8) -> Self {
        RoundSession {
            accepting: false,
            guesses: Vec::new(),
            highlight: None,
            moderator_level,
            opened_at: None,
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn highlight(&self) -> Option<&str> {
        self.highlight.as_deref()
    }

    pub fn opened_at(&self) -> Option<DateTime<Local>> {
        self.opened_at
    }

    /// Process one inbound chat message.
    ///
    /// A message is a moderator command only when its first token matches
    /// the command set AND the sender's role meets the configured level.
    /// A recognized token from an unprivileged sender falls through to
    /// guess evaluation, where it fails the price validator and is dropped.
    pub fn handle_chat(
        &mut self,
        username: &str,
        display_name: &str,
        role: u8,
        text: &str,
    ) -> ChatOutcome {
        if let Some(command) = RoundCommand::parse(text) {
            if role >= self.moderator_level {
                return self.apply_command(command);
            }
            debug!(username, role, "command token from unprivileged sender");
        }

        if self.accepting {
            if let Some(price) = parse_price(text) {
                self.record_guess(username, display_name, price);
                return ChatOutcome::BoardChanged;
            }
        }
        ChatOutcome::Ignored
    }

    /// Apply a classified command from a privileged sender.
    pub fn apply_command(&mut self, command: RoundCommand) -> ChatOutcome {
        match command {
            RoundCommand::Open => {
                self.accepting = true;
                self.opened_at = Some(Local::now());
                info!("round opened, accepting guesses");
                ChatOutcome::StatusChanged
            }
            RoundCommand::Close => {
                self.accepting = false;
                self.opened_at = None;
                info!("round closed, {} guesses held", self.guesses.len());
                ChatOutcome::StatusChanged
            }
            RoundCommand::Clear => {
                self.guesses.clear();
                self.highlight = None;
                info!("round cleared");
                ChatOutcome::BoardChanged
            }
            RoundCommand::SetPrice(arg) => match parse_price(&arg) {
                Some(revealed) => {
                    let winner = resolve_closest(revealed, &self.guesses)
                        .map(|guess| guess.username.clone());
                    self.highlight = winner.clone();
                    info!(revealed, winner = winner.as_deref(), "price revealed");
                    ChatOutcome::PriceSet { winner }
                }
                None => {
                    debug!(arg = %arg, "ignoring !setprice with invalid price");
                    ChatOutcome::Ignored
                }
            },
        }
    }

    /// Record a guess, last-write-wins. An overwrite keeps the
    /// participant's original position so resolver tie-breaks stay stable.
    fn record_guess(&mut self, username: &str, display_name: &str, price: f64) {
        match self.guesses.iter_mut().find(|g| g.username == username) {
            Some(existing) => {
                existing.price = price;
                existing.display_name = display_name.to_string();
            }
            None => self.guesses.push(Guess {
                username: username.to_string(),
                display_name: display_name.to_string(),
                price,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
