// Board projection: a pure view of the session's guesses, sorted by price
// descending, with formatted prices and the winner flagged.

use serde::{Deserialize, Serialize};

use super::session::Guess;

/// One rendered row of the guess board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    /// Twitch login name (the guess key).
    pub username: String,
    /// Name to show on the board.
    pub display_name: String,
    /// Price formatted with two decimals and thousands separators,
    /// without the `$` (the renderer adds it).
    pub formatted_price: String,
    /// True for the resolved closest-match entry, at most one per board.
    pub is_winner: bool,
}

/// Project the guesses into display order: price descending, ties keeping
/// insertion order (stable sort). Never mutates the session.
pub fn project(guesses: &[Guess], highlight: Option<&str>) -> Vec<BoardEntry> {
    let mut ordered: Vec<&Guess> = guesses.iter().collect();
    ordered.sort_by(|a, b| {
        b.price
            .partial_cmp(&a.price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ordered
        .into_iter()
        .map(|guess| BoardEntry {
            username: guess.username.clone(),
            display_name: guess.display_name.clone(),
            formatted_price: format_price(guess.price),
            is_winner: highlight == Some(guess.username.as_str()),
        })
        .collect()
}

/// Format a price with exactly two decimals and comma thousands separators:
/// `1234.5` -> `"1,234.50"`.
pub fn format_price(price: f64) -> String {
    let fixed = format!("{price:.2}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{grouped}.{frac_part}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
