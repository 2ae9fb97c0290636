// Closest-match resolution: the highest guess that does not exceed the
// revealed price ("price is right" rules).

use super::session::Guess;

/// Find the guess with the smallest non-negative difference
/// `revealed - guess.price`. Guesses above the revealed price never
/// qualify. Ties keep the earlier-inserted guess: the scan runs in
/// insertion order and only a strictly smaller difference replaces the
/// current best. Returns `None` when no guess qualifies.
pub fn resolve_closest(revealed: f64, guesses: &[Guess]) -> Option<&Guess> {
    let mut best: Option<(&Guess, f64)> = None;
    for guess in guesses {
        let diff = revealed - guess.price;
        if diff < 0.0 {
            continue;
        }
        let closer = match best {
            Some((_, best_diff)) => diff < best_diff,
            None => true,
        };
        if closer {
            best = Some((guess, diff));
        }
    }
    best.map(|(guess, _)| guess)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(username: &str, price: f64) -> Guess {
        Guess {
            username: username.to_string(),
            display_name: username.to_string(),
            price,
        }
    }

    #[test]
    fn picks_highest_guess_not_over() {
        let guesses = vec![guess("a", 10.0), guess("b", 18.0), guess("c", 25.0)];
        let winner = resolve_closest(20.0, &guesses).unwrap();
        assert_eq!(winner.username, "b");
    }

    #[test]
    fn exact_match_wins() {
        let guesses = vec![guess("a", 10.0), guess("b", 20.0)];
        let winner = resolve_closest(20.0, &guesses).unwrap();
        assert_eq!(winner.username, "b");
    }

    #[test]
    fn all_guesses_over_means_no_winner() {
        let guesses = vec![guess("a", 30.0)];
        assert!(resolve_closest(20.0, &guesses).is_none());
    }

    #[test]
    fn empty_board_means_no_winner() {
        assert!(resolve_closest(20.0, &[]).is_none());
    }

    #[test]
    fn tie_goes_to_earlier_insertion() {
        let guesses = vec![guess("first", 15.0), guess("second", 15.0)];
        let winner = resolve_closest(20.0, &guesses).unwrap();
        assert_eq!(winner.username, "first");
    }

    #[test]
    fn guess_just_over_is_excluded() {
        let guesses = vec![guess("under", 19.99), guess("over", 20.01)];
        let winner = resolve_closest(20.0, &guesses).unwrap();
        assert_eq!(winner.username, "under");
    }

    #[test]
    fn zero_guess_qualifies() {
        let guesses = vec![guess("a", 0.0)];
        let winner = resolve_closest(5.0, &guesses).unwrap();
        assert_eq!(winner.username, "a");
    }
}
