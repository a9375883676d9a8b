use crate::MAX_NAME_LEN;
use crate::cards::Card;
use crate::cards::Character;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Opaque token identifying a client across reconnects within one session.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn random() -> Self {
        let token = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect::<String>();
        Self(token)
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-session player state. Owned exclusively by the Game it belongs to;
/// counters are public because the resolution engine and tests poke them
/// directly, while lifecycle flags go through methods.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    character: Character,
    pub coins: i32,
    pub shots: i32,
    pub bullets: i32,
    selected: Option<Card>,
    alive: bool,
    winner: bool,
    locked: bool,
    results: BTreeMap<u32, bool>,
}

impl Player {
    pub fn new(id: PlayerId, character: Character) -> Self {
        let name = character.name.clone();
        Self {
            id,
            name,
            character,
            coins: 0,
            shots: 0,
            bullets: 0,
            selected: None,
            alive: true,
            winner: false,
            locked: false,
            results: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn character(&self) -> &Character {
        &self.character
    }
    pub fn selected_card(&self) -> Option<&Card> {
        self.selected.as_ref()
    }
    pub fn alive(&self) -> bool {
        self.alive
    }
    pub fn winner(&self) -> bool {
        self.winner
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.chars().take(MAX_NAME_LEN).collect();
    }

    /// Records a new selection. Returns true when the slot actually changed,
    /// which is the session's cue to notify and re-check round completion.
    /// No-ops while locked and on duplicate submissions.
    pub fn set_selected_card(&mut self, card: Option<Card>) -> bool {
        if self.locked {
            return false;
        }
        if self.selected == card {
            return false;
        }
        self.selected = card;
        true
    }

    pub fn reset_cards(&mut self) {
        self.selected = None;
    }

    /// Round-boundary hook, called once resolution and notification for the
    /// round are complete. Distinct from reset_cards so future per-round
    /// state has one obvious home.
    pub fn new_round(&mut self) {
        self.reset_cards();
    }

    /// Engine-only mutation of the three counters; flips `alive` once shots
    /// reach the death threshold.
    pub fn apply_round_outcome(&mut self, coins: i32, shots: i32, bullets: i32, shots_to_die: i32) {
        self.coins += coins;
        self.shots += shots;
        self.bullets += bullets;
        if self.shots >= shots_to_die {
            self.set_dead();
        }
    }

    pub fn set_dead(&mut self) {
        self.alive = false;
    }
    pub fn set_winner(&mut self) {
        self.winner = true;
    }
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn set_result(&mut self, round: u32, success: bool) {
        self.results.insert(round, success);
    }

    /// Last `n` per-round outcomes, oldest first. Feeds the win/loss trend
    /// strip next to each player in the UI.
    pub fn success_trend(&self, n: usize) -> Vec<bool> {
        let mut trend = self
            .results
            .iter()
            .rev()
            .take(n)
            .map(|(_, success)| *success)
            .collect::<Vec<_>>();
        trend.reverse();
        trend
    }

    /// Full reset back to the just-joined state, used on session restart.
    pub fn reset_all(&mut self) {
        self.reset_cards();
        self.alive = true;
        self.winner = false;
        self.coins = 0;
        self.shots = 0;
        self.bullets = 0;
        self.locked = false;
        self.results.clear();
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} [${}|S={}|B={}|({})]",
            self.name,
            self.coins,
            self.shots,
            self.bullets,
            self.selected
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Catalog;

    fn player() -> Player {
        let catalog = Catalog::default();
        Player::new(PlayerId::from("p1"), catalog.get(1).cloned().expect("character"))
    }

    #[test]
    fn duplicate_selection_is_a_no_op() {
        let mut p = player();
        assert!(p.set_selected_card(Some(Card::Dodge)));
        assert!(!p.set_selected_card(Some(Card::Dodge)));
        assert!(p.set_selected_card(None));
        assert!(!p.set_selected_card(None));
    }

    #[test]
    fn locked_player_cannot_change_selection() {
        let mut p = player();
        p.set_locked(true);
        assert!(!p.set_selected_card(Some(Card::Chest)));
        assert_eq!(p.selected_card(), None);
        p.set_locked(false);
        assert!(p.set_selected_card(Some(Card::Chest)));
    }

    #[test]
    fn shots_at_threshold_kill() {
        let mut p = player();
        p.apply_round_outcome(0, 1, 0, 2);
        assert!(p.alive());
        p.apply_round_outcome(0, 1, 0, 2);
        assert!(!p.alive());
    }

    #[test]
    fn success_trend_is_oldest_first_window() {
        let mut p = player();
        p.set_result(1, true);
        p.set_result(2, false);
        p.set_result(3, true);
        p.set_result(4, true);
        assert_eq!(p.success_trend(3), vec![false, true, true]);
        assert_eq!(p.success_trend(10), vec![true, false, true, true]);
    }

    #[test]
    fn reset_all_restores_joined_state() {
        let mut p = player();
        p.coins = 3;
        p.shots = 2;
        p.bullets = 1;
        p.set_dead();
        p.set_winner();
        p.set_locked(true);
        p.set_result(1, true);
        p.set_selected_card(Some(Card::Load));
        p.reset_all();
        assert!(p.alive());
        assert!(!p.winner());
        assert_eq!((p.coins, p.shots, p.bullets), (0, 0, 0));
        assert_eq!(p.selected_card(), None);
        assert!(p.success_trend(5).is_empty());
        assert!(p.set_selected_card(Some(Card::Dodge)));
    }

    #[test]
    fn names_are_length_capped() {
        let mut p = player();
        p.set_name(&"x".repeat(100));
        assert_eq!(p.name().len(), crate::MAX_NAME_LEN);
    }
}
