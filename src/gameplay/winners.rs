use super::player::Player;
use super::player::PlayerId;
use super::rules::Rules;

/// Outcome of the post-round win evaluation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Verdict {
    /// One or more joint winners; the session ends.
    Winners(Vec<PlayerId>),
    /// Mutual elimination: nobody left alive, nobody wins.
    Standoff,
    /// Play on.
    Undecided,
}

/// Computes winners from post-round player state.
///
/// Tie-break chain among players at or past the coin threshold: most coins,
/// then fewest shots (a cleaner record is the stronger win), then most
/// bullets; whoever remains wins jointly. With nobody at the threshold, a
/// sole survivor wins by elimination, and an empty field is a standoff with
/// zero winners rather than a spurious single winner.
pub fn evaluate(players: &[Player], rules: &Rules) -> Verdict {
    let alive = players
        .iter()
        .filter(|p| p.shots < rules.shots_to_die)
        .collect::<Vec<_>>();

    let eligible = alive
        .iter()
        .copied()
        .filter(|p| p.coins >= rules.coins_to_win)
        .collect::<Vec<_>>();

    let winners = if !eligible.is_empty() {
        let most_coins = eligible.iter().map(|p| p.coins).max().expect("non-empty");
        let richest = eligible
            .into_iter()
            .filter(|p| p.coins == most_coins)
            .collect::<Vec<_>>();
        let fewest_shots = richest.iter().map(|p| p.shots).min().expect("non-empty");
        let mut winners = richest
            .into_iter()
            .filter(|p| p.shots == fewest_shots)
            .collect::<Vec<_>>();
        if winners.len() > 1 {
            let most_bullets = winners.iter().map(|p| p.bullets).max().expect("non-empty");
            winners.retain(|p| p.bullets == most_bullets);
        }
        winners
    } else if alive.len() == 1 {
        alive.clone()
    } else {
        Vec::new()
    };

    if !winners.is_empty() {
        Verdict::Winners(winners.into_iter().map(|p| p.id().clone()).collect())
    } else if alive.is_empty() {
        Verdict::Standoff
    } else {
        Verdict::Undecided
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Catalog;

    fn roster(n: usize) -> Vec<Player> {
        let catalog = Catalog::default();
        (1..=n)
            .map(|i| {
                Player::new(
                    PlayerId::from(format!("p{}", i).as_str()),
                    catalog.get(i as u8).cloned().expect("character"),
                )
            })
            .collect()
    }

    fn id(i: usize) -> PlayerId {
        PlayerId::from(format!("p{}", i).as_str())
    }

    #[test]
    fn coin_threshold_alone_decides() {
        let rules = Rules::default();
        let mut players = roster(3);
        players[0].coins = rules.coins_to_win;
        assert_eq!(evaluate(&players, &rules), Verdict::Winners(vec![id(1)]));
    }

    #[test]
    fn fewer_shots_beats_equal_coins() {
        let rules = Rules::default();
        let mut players = roster(3);
        players[0].coins = rules.coins_to_win;
        players[0].bullets = 1;
        players[1].coins = rules.coins_to_win;
        players[1].shots = 1;
        players[1].bullets = 1;
        assert_eq!(evaluate(&players, &rules), Verdict::Winners(vec![id(1)]));
    }

    #[test]
    fn more_bullets_breaks_remaining_ties() {
        let rules = Rules::default();
        let mut players = roster(3);
        players[0].coins = rules.coins_to_win;
        players[0].shots = 1;
        players[0].bullets = 1;
        players[1].coins = rules.coins_to_win;
        players[1].shots = 1;
        players[1].bullets = 0;
        assert_eq!(evaluate(&players, &rules), Verdict::Winners(vec![id(1)]));
    }

    #[test]
    fn full_ties_win_jointly() {
        let rules = Rules::default();
        let mut players = roster(3);
        players[0].coins = rules.coins_to_win;
        players[0].shots = 1;
        players[0].bullets = 1;
        players[1].coins = rules.coins_to_win;
        players[1].shots = 1;
        players[1].bullets = 1;
        assert_eq!(evaluate(&players, &rules), Verdict::Winners(vec![id(1), id(2)]));
    }

    #[test]
    fn sole_survivor_wins_by_elimination() {
        let rules = Rules::default();
        let mut players = roster(3);
        players[1].shots = rules.shots_to_die;
        players[2].shots = rules.shots_to_die;
        assert_eq!(evaluate(&players, &rules), Verdict::Winners(vec![id(1)]));
    }

    #[test]
    fn mutual_elimination_is_a_standoff() {
        let rules = Rules::default();
        let mut players = roster(3);
        for p in players.iter_mut() {
            p.shots = rules.shots_to_die;
            p.coins = 99; // dead coins do not make a winner
        }
        assert_eq!(evaluate(&players, &rules), Verdict::Standoff);
    }

    #[test]
    fn ongoing_game_stays_undecided() {
        let rules = Rules::default();
        let players = roster(3);
        assert_eq!(evaluate(&players, &rules), Verdict::Undecided);
    }
}
