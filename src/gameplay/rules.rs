use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Immutable-per-session rule parameters. Deserializes with per-field
/// defaults so create requests can override just what they care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rules {
    pub min_player_count: usize,
    pub max_player_count: usize,
    pub coins_to_win: i32,
    pub shots_to_die: i32,
    pub max_bullets: i32,
    /// Client-side countdown hint; the engine never times out humans.
    pub select_card_timeout_seconds: u32,
    /// How many players may claim a chest in the same round, keyed by the
    /// current alive-player count. Uncovered counts fall back to 1.
    pub chests_per_player_count: BTreeMap<usize, usize>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            min_player_count: 3,
            max_player_count: 8,
            coins_to_win: 3,
            shots_to_die: 2,
            max_bullets: 2,
            select_card_timeout_seconds: 0,
            chests_per_player_count: BTreeMap::from([
                (0, 0), // sessions can be observed with zero players seated
                (1, 1),
                (2, 1),
                (3, 1),
                (4, 2),
                (5, 2),
                (6, 2),
                (7, 3),
                (8, 3),
            ]),
        }
    }
}

impl Rules {
    pub fn max_on_chest(&self, alive_count: usize) -> usize {
        self.chests_per_player_count
            .get(&alive_count)
            .copied()
            .unwrap_or(1)
    }
}
