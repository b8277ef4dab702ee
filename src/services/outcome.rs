//! Outcome engine: the fixed rock/paper/scissors rule table.

use crate::types::{Choice, Outcome};

/// Decide a round. Rock beats scissors, scissors beats paper, paper beats rock.
pub fn resolve(player1: Choice, player2: Choice) -> Outcome {
    use Choice::*;

    if player1 == player2 {
        return Outcome::Tie;
    }

    match (player1, player2) {
        (Rock, Scissors) | (Scissors, Paper) | (Paper, Rock) => Outcome::Player1,
        _ => Outcome::Player2,
    }
}

/// Winning wallet for a resolved round, if any.
pub fn winner<'a>(outcome: Outcome, player1: &'a str, player2: &'a str) -> Option<&'a str> {
    match outcome {
        Outcome::Player1 => Some(player1),
        Outcome::Player2 => Some(player2),
        Outcome::Tie => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Choice::*;

    #[test]
    fn test_rule_table() {
        assert_eq!(resolve(Rock, Scissors), Outcome::Player1);
        assert_eq!(resolve(Scissors, Paper), Outcome::Player1);
        assert_eq!(resolve(Paper, Rock), Outcome::Player1);
        assert_eq!(resolve(Scissors, Rock), Outcome::Player2);
        assert_eq!(resolve(Paper, Scissors), Outcome::Player2);
        assert_eq!(resolve(Rock, Paper), Outcome::Player2);
    }

    #[test]
    fn test_identical_choices_tie() {
        for choice in Choice::ALL {
            assert_eq!(resolve(choice, choice), Outcome::Tie);
        }
    }

    #[test]
    fn test_every_pair_has_exactly_one_outcome() {
        for a in Choice::ALL {
            for b in Choice::ALL {
                let outcome = resolve(a, b);
                assert!(matches!(
                    outcome,
                    Outcome::Player1 | Outcome::Player2 | Outcome::Tie
                ));
            }
        }
    }

    #[test]
    fn test_symmetry() {
        // resolve(a, b) must mirror resolve(b, a) with roles swapped.
        for a in Choice::ALL {
            for b in Choice::ALL {
                let forward = resolve(a, b);
                let reverse = resolve(b, a);
                match forward {
                    Outcome::Player1 => assert_eq!(reverse, Outcome::Player2),
                    Outcome::Player2 => assert_eq!(reverse, Outcome::Player1),
                    Outcome::Tie => assert_eq!(reverse, Outcome::Tie),
                }
            }
        }
    }

    #[test]
    fn test_winner_helper() {
        assert_eq!(winner(Outcome::Player1, "alice", "bob"), Some("alice"));
        assert_eq!(winner(Outcome::Player2, "alice", "bob"), Some("bob"));
        assert_eq!(winner(Outcome::Tie, "alice", "bob"), None);
    }
}
