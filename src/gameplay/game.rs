use super::player::Player;
use super::player::PlayerId;
use super::resolve::resolve;
use super::round::RoundError;
use super::round::RoundResult;
use super::rules::Rules;
use super::winners::Verdict;
use super::winners::evaluate;
use crate::MAX_ROUNDS;
use crate::cards::Card;
use crate::events::GameEvents;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

/// Session lifecycle. Created → Playing → {Ended | Aborted}, with Ended →
/// Created again via explicit restart.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    Created,
    Playing,
    Ended,
    Aborted,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GameState::Created => write!(f, "Created"),
            GameState::Playing => write!(f, "Playing"),
            GameState::Ended => write!(f, "Ended"),
            GameState::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Why a join was rejected. Reported to the caller, never fatal to the
/// session.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum JoinError {
    #[error("the table is full")]
    RosterFull,
    #[error("the name '{0}' is already taken")]
    NameTaken(String),
    #[error("the character '{0}' is already seated")]
    CharacterTaken(String),
    #[error("the game has already started")]
    AlreadyStarted,
}

/// Aggregate root of one session: roster, round counter, lifecycle state,
/// and the orchestration of round resolution.
///
/// The struct is deliberately synchronous and lock-free; all concurrent
/// access is serialized by the owning table actor, so resolution can only
/// ever fire once per round. Notifications go through the injected sink.
pub struct Game {
    id: String,
    rules: Rules,
    state: GameState,
    rounds: u32,
    players: Vec<Player>,
    winners: Vec<PlayerId>,
    last_round: RoundResult,
    errors: Vec<RoundError>,
    events: Arc<dyn GameEvents>,
}

impl Game {
    pub fn new(id: &str, rules: Rules, events: Arc<dyn GameEvents>) -> Self {
        Self {
            id: id.to_string(),
            rules,
            state: GameState::Created,
            rounds: 1,
            players: Vec::new(),
            winners: Vec::new(),
            last_round: RoundResult::default(),
            errors: Vec::new(),
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
    pub fn state(&self) -> GameState {
        self.state
    }
    pub fn rounds(&self) -> u32 {
        self.rounds
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    /// The most recently resolved round. Stays readable between rounds so
    /// snapshots can show what just happened; replaced wholesale when the
    /// next round resolves.
    pub fn last_round(&self) -> &RoundResult {
        &self.last_round
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    pub fn alive_players(&self) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.shots < self.rules.shots_to_die)
            .collect()
    }

    pub fn winners(&self) -> Vec<&Player> {
        self.winners
            .iter()
            .filter_map(|id| self.player(id))
            .collect()
    }

    pub fn can_start(&self) -> bool {
        self.state == GameState::Created && self.players.len() >= self.rules.min_player_count
    }

    /// Seats a player. Re-joining with a known id is a silent no-op; a full
    /// roster, a started game, or a name/character collision is a typed
    /// rejection. Seating the last free chair starts the game.
    pub fn add_player(&mut self, player: Player) -> Result<(), JoinError> {
        if self.players.iter().any(|p| p.id() == player.id()) {
            return Ok(());
        }
        if self.state != GameState::Created {
            return Err(JoinError::AlreadyStarted);
        }
        if self.players.len() >= self.rules.max_player_count {
            return Err(JoinError::RosterFull);
        }
        if self
            .players
            .iter()
            .any(|p| p.name().eq_ignore_ascii_case(player.name()))
        {
            return Err(JoinError::NameTaken(player.name().to_string()));
        }
        if self
            .players
            .iter()
            .any(|p| p.character() == player.character())
        {
            return Err(JoinError::CharacterTaken(player.character().name.clone()));
        }
        let id = player.id().clone();
        self.players.push(player);
        self.events.player_joined(&self.id, &id);
        if self.players.len() >= self.rules.max_player_count {
            self.start();
        }
        Ok(())
    }

    /// Removes a player from roster and winners. While playing, the removal
    /// re-runs the all-selected check: losing the one unsubmitted player may
    /// complete an otherwise stalled round.
    pub fn remove_player(&mut self, id: &PlayerId) -> bool {
        let Some(idx) = self.players.iter().position(|p| p.id() == id) else {
            return false;
        };
        self.players.remove(idx);
        self.winners.retain(|w| w != id);
        self.events.player_left(&self.id, id);
        if self.state == GameState::Playing {
            self.maybe_resolve();
        }
        true
    }

    pub fn start(&mut self) {
        self.state = GameState::Playing;
        self.events.game_state_changed(&self.id, self.state);
        self.events.new_round(&self.id);
    }

    /// Full reset back to Created with the roster kept in place. Clients
    /// get a dedicated restarted event so they can clear transient state
    /// like revealed cards.
    pub fn restart(&mut self) {
        for player in self.players.iter_mut() {
            player.reset_all();
        }
        self.winners.clear();
        self.last_round = RoundResult::default();
        self.errors.clear();
        self.rounds = 1;
        self.state = GameState::Created;
        self.events.game_state_changed(&self.id, self.state);
        self.events.game_restarted(&self.id);
    }

    /// Forced terminal from any non-terminal state, no winners assigned.
    pub fn abort(&mut self) {
        if self.state != GameState::Ended && self.state != GameState::Aborted {
            self.state = GameState::Aborted;
            self.events.game_state_changed(&self.id, self.state);
        }
    }

    /// The cards a player may legally submit right now: Dodge and Chest
    /// always, Load below bullet capacity, and one Attack per other alive
    /// player while holding bullets. Sorted in card order.
    pub fn playable_cards(&self, id: &PlayerId) -> Vec<Card> {
        let Some(player) = self.player(id) else {
            return Vec::new();
        };
        let mut cards = vec![Card::Dodge, Card::Chest];
        if player.bullets < self.rules.max_bullets {
            cards.push(Card::Load);
        }
        if player.bullets != 0 {
            for other in self.alive_players() {
                if other.id() != id {
                    cards.push(Card::Attack(other.id().clone()));
                }
            }
        }
        cards.sort();
        cards
    }

    /// Records a card submission while playing, notifies the sink, and
    /// resolves the round once every alive player has selected. Duplicate
    /// submissions and submissions outside of play are silent no-ops.
    pub fn play_card(&mut self, id: &PlayerId, card: Option<Card>) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(player) = self.player_mut(id) else {
            return;
        };
        if !player.set_selected_card(card.clone()) {
            return;
        }
        self.events.card_played(&self.id, id, card.as_ref());
        self.maybe_resolve();
    }

    /// Records a recoverable per-player failure (e.g. unreachable bot).
    /// Collected errors attach to the round in flight when it resolves.
    pub fn report_error(&mut self, player: Option<PlayerId>, message: &str) {
        log::warn!("game {}: {}", self.id, message);
        self.errors.push(RoundError {
            player,
            message: message.to_string(),
        });
    }

    /// The all-selected check and, when it passes, the one place a round
    /// gets resolved. Submissions are frozen for the duration so nothing
    /// can slip in between check and resolution.
    fn maybe_resolve(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        for player in self.players.iter_mut() {
            player.set_locked(true);
        }
        let complete = self
            .alive_players()
            .iter()
            .all(|p| p.selected_card().is_some());
        if complete {
            self.last_round = RoundResult {
                actions: resolve(&mut self.players, &self.rules, self.rounds),
                errors: std::mem::take(&mut self.errors),
            };
        }
        for player in self.players.iter_mut() {
            player.set_locked(false);
        }
        if complete {
            self.finish_round();
        }
    }

    /// Post-resolution flow: win evaluation, result notifications, round
    /// counter, cap guard, and the step into the next round. The resolved
    /// result is left on last_round for anyone who looks between rounds.
    fn finish_round(&mut self) {
        match evaluate(&self.players, &self.rules) {
            Verdict::Winners(ids) => {
                self.end();
                for id in ids.iter() {
                    if let Some(player) = self.player_mut(id) {
                        player.set_winner();
                    }
                }
                self.winners.extend(ids);
            }
            Verdict::Standoff => self.end(),
            Verdict::Undecided => {}
        }
        self.events.round_results_completed(&self.id);
        self.events.round_completed(&self.id, self.rounds, &self.last_round);
        self.rounds += 1;
        if self.rounds > MAX_ROUNDS {
            let message = format!("the game went on for {} rounds, ending it now", MAX_ROUNDS);
            log::error!("game {}: {}", self.id, message);
            self.last_round.errors.push(RoundError {
                player: None,
                message,
            });
            self.end();
        }
        if self.state == GameState::Playing {
            for player in self.players.iter_mut() {
                player.new_round();
            }
            self.events.new_round(&self.id);
        }
    }

    fn end(&mut self) {
        if self.state != GameState::Ended && self.state != GameState::Aborted {
            self.state = GameState::Ended;
            self.events.game_state_changed(&self.id, self.state);
        }
    }

    #[cfg(test)]
    pub fn force_rounds(&mut self, rounds: u32) {
        self.rounds = rounds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardKind;
    use crate::cards::Catalog;
    use crate::events::NullSink;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    /// Counts the notifications the resolve-exactly-once property cares
    /// about.
    #[derive(Default)]
    struct CountingSink {
        cards_played: AtomicUsize,
        rounds_resolved: AtomicUsize,
    }
    impl GameEvents for Arc<CountingSink> {
        fn player_joined(&self, _: &str, _: &PlayerId) {}
        fn player_left(&self, _: &str, _: &PlayerId) {}
        fn new_round(&self, _: &str) {}
        fn game_state_changed(&self, _: &str, _: GameState) {}
        fn card_played(&self, _: &str, _: &PlayerId, _: Option<&Card>) {
            self.cards_played.fetch_add(1, Ordering::Relaxed);
        }
        fn round_results_completed(&self, _: &str) {
            self.rounds_resolved.fetch_add(1, Ordering::Relaxed);
        }
        fn round_completed(&self, _: &str, _: u32, _: &RoundResult) {}
        fn game_restarted(&self, _: &str) {}
    }

    fn id(i: usize) -> PlayerId {
        PlayerId::from(format!("p{}", i).as_str())
    }

    fn seat(i: usize) -> Player {
        let catalog = Catalog::default();
        Player::new(id(i), catalog.get(i as u8).cloned().expect("character"))
    }

    fn game_of(n: usize, rules: Rules) -> Game {
        let mut game = Game::new("test", rules, Arc::new(NullSink));
        for i in 1..=n {
            game.add_player(seat(i)).expect("seat available");
        }
        game
    }

    fn started(n: usize, rules: Rules) -> Game {
        let mut game = game_of(n, rules);
        game.start();
        game
    }

    #[test]
    fn a_started_game_is_playing_on_round_one() {
        let game = started(3, Rules::default());
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.rounds(), 1);
        assert_eq!(game.players().len(), 3);
        assert_eq!(game.alive_players().len(), 3);
        assert!(game.winners().is_empty());
    }

    #[test]
    fn the_game_starts_automatically_at_max_players() {
        let game = game_of(
            3,
            Rules {
                max_player_count: 3,
                ..Rules::default()
            },
        );
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn a_full_roster_rejects_joins() {
        let mut game = game_of(3, Rules::default());
        // leave one seat free of the auto-start threshold
        game.rules.max_player_count = 3;
        assert_eq!(game.add_player(seat(4)), Err(JoinError::RosterFull));
    }

    #[test]
    fn names_collide_case_insensitively() {
        let mut game = game_of(1, Rules::default());
        let mut imposter = seat(2);
        imposter.set_name("CHICO");
        assert_eq!(
            game.add_player(imposter),
            Err(JoinError::NameTaken("CHICO".to_string()))
        );
    }

    #[test]
    fn characters_are_unique_per_session() {
        let mut game = game_of(1, Rules::default());
        let catalog = Catalog::default();
        let twin = Player::new(id(9), catalog.get(1).cloned().expect("character"));
        assert_eq!(
            game.add_player(twin),
            Err(JoinError::CharacterTaken("Chico".to_string()))
        );
    }

    #[test]
    fn rejoining_is_a_silent_no_op() {
        let mut game = game_of(3, Rules::default());
        assert_eq!(game.add_player(seat(1)), Ok(()));
        assert_eq!(game.players().len(), 3);
    }

    #[test]
    fn joining_a_running_game_is_rejected() {
        let mut game = started(3, Rules::default());
        assert_eq!(game.add_player(seat(4)), Err(JoinError::AlreadyStarted));
    }

    #[test]
    fn an_empty_gun_limits_the_playable_cards() {
        let game = game_of(2, Rules::default());
        assert_eq!(
            game.playable_cards(&id(1)),
            vec![Card::Dodge, Card::Load, Card::Chest]
        );
    }

    #[test]
    fn a_loaded_gun_offers_attacks() {
        let mut game = game_of(2, Rules::default());
        game.player_mut(&id(1)).expect("seated").bullets = 1;
        let cards = game.playable_cards(&id(1));
        assert!(cards.contains(&Card::Attack(id(2))));
        assert!(cards.contains(&Card::Load));
    }

    #[test]
    fn a_full_gun_hides_load_but_targets_everyone_else() {
        let rules = Rules {
            max_bullets: 6,
            ..Rules::default()
        };
        let mut game = game_of(7, rules);
        game.player_mut(&id(1)).expect("seated").bullets = 6;
        let cards = game.playable_cards(&id(1));
        assert!(!cards.contains(&Card::Load));
        for i in 2..=7 {
            assert!(cards.contains(&Card::Attack(id(i))));
        }
    }

    #[test]
    fn a_lone_chester_earns_a_coin_and_play_goes_on() {
        let mut game = started(3, Rules::default());
        game.play_card(&id(1), Some(Card::Chest));
        game.play_card(&id(2), Some(Card::Dodge));
        game.play_card(&id(3), Some(Card::Dodge)); // resolves the round
        assert_eq!(game.player(&id(1)).expect("seated").coins, 1);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.rounds(), 2);
    }

    #[test]
    fn resolution_fires_exactly_once_per_round() {
        let sink = Arc::new(CountingSink::default());
        let mut game = Game::new("test", Rules::default(), Arc::new(sink.clone()));
        for i in 1..=3 {
            game.add_player(seat(i)).expect("seat available");
        }
        game.start();
        game.play_card(&id(1), Some(Card::Dodge));
        game.play_card(&id(1), Some(Card::Dodge)); // duplicate: no event, no check
        game.play_card(&id(2), Some(Card::Dodge));
        game.play_card(&id(3), Some(Card::Dodge));
        assert_eq!(sink.cards_played.load(Ordering::Relaxed), 3);
        assert_eq!(sink.rounds_resolved.load(Ordering::Relaxed), 1);
        assert_eq!(game.rounds(), 2);
    }

    #[test]
    fn the_round_log_survives_on_last_round_until_the_next_resolution() {
        let mut game = started(3, Rules::default());
        game.play_card(&id(1), Some(Card::Chest));
        game.play_card(&id(2), Some(Card::Dodge));
        game.play_card(&id(3), Some(Card::Dodge));
        assert_eq!(game.rounds(), 2);
        let log = game.last_round();
        assert_eq!(log.actions.len(), 3);
        assert!(log.actions.iter().any(|a| a.kind == CardKind::Chest && a.success));
        assert!(!game.aggregate_last_round().is_empty());
        // the next resolution replaces it wholesale
        for i in 1..=3 {
            game.play_card(&id(i), Some(Card::Dodge));
        }
        assert_eq!(game.rounds(), 3);
        let log = game.last_round();
        assert_eq!(log.actions.len(), 3);
        assert!(log.actions.iter().all(|a| a.kind == CardKind::Dodge));
    }

    #[test]
    fn most_coins_wins_and_ends_the_game() {
        let mut game = started(3, Rules::default());
        game.player_mut(&id(1)).expect("seated").coins = game.rules().coins_to_win;
        for i in 1..=3 {
            game.play_card(&id(i), Some(Card::Dodge));
        }
        assert_eq!(game.state(), GameState::Ended);
        let winners = game.winners();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].id(), &id(1));
        assert!(winners[0].winner());
    }

    #[test]
    fn the_last_player_standing_wins() {
        let mut game = started(3, Rules::default());
        let shots = game.rules().shots_to_die;
        game.player_mut(&id(2)).expect("seated").shots = shots;
        game.player_mut(&id(3)).expect("seated").shots = shots;
        game.play_card(&id(1), Some(Card::Dodge));
        assert_eq!(game.state(), GameState::Ended);
        assert_eq!(game.winners().len(), 1);
        assert_eq!(game.winners()[0].id(), &id(1));
    }

    #[test]
    fn mutual_elimination_ends_with_zero_winners() {
        let rules = Rules {
            shots_to_die: 1,
            ..Rules::default()
        };
        let mut game = started(3, rules);
        for i in 1..=3 {
            let player = game.player_mut(&id(i)).expect("seated");
            player.coins = 2;
            player.bullets = 1;
        }
        game.play_card(&id(1), Some(Card::Attack(id(2))));
        game.play_card(&id(2), Some(Card::Attack(id(3))));
        game.play_card(&id(3), Some(Card::Attack(id(1))));
        assert_eq!(game.state(), GameState::Ended);
        assert!(game.winners().is_empty());
        for i in 1..=3 {
            let player = game.player(&id(i)).expect("seated");
            assert!(!player.alive());
            assert_eq!(player.coins, 2);
        }
    }

    #[test]
    fn removing_the_holdout_completes_a_stalled_round() {
        let mut game = started(3, Rules::default());
        game.play_card(&id(1), Some(Card::Chest));
        game.play_card(&id(2), Some(Card::Dodge));
        assert_eq!(game.rounds(), 1);
        assert!(game.remove_player(&id(3)));
        assert_eq!(game.rounds(), 2);
        assert_eq!(game.players().len(), 2);
        assert_eq!(game.player(&id(1)).expect("seated").coins, 1);
    }

    #[test]
    fn restart_keeps_the_roster_and_resets_everything_else() {
        let mut game = started(3, Rules::default());
        game.player_mut(&id(1)).expect("seated").coins = game.rules().coins_to_win;
        for i in 1..=3 {
            game.play_card(&id(i), Some(Card::Dodge));
        }
        assert_eq!(game.state(), GameState::Ended);
        game.restart();
        assert_eq!(game.state(), GameState::Created);
        assert_eq!(game.rounds(), 1);
        assert!(game.winners().is_empty());
        assert!(game.last_round().actions.is_empty());
        assert_eq!(game.players().len(), 3);
        for player in game.players() {
            assert_eq!(player.coins, 0);
            assert!(player.alive());
            assert!(!player.winner());
        }
    }

    #[test]
    fn abort_is_terminal_from_any_state() {
        let mut game = game_of(2, Rules::default());
        game.abort();
        assert_eq!(game.state(), GameState::Aborted);
        let mut game = started(3, Rules::default());
        game.abort();
        assert_eq!(game.state(), GameState::Aborted);
        game.play_card(&id(1), Some(Card::Dodge));
        assert_eq!(game.player(&id(1)).expect("seated").selected_card(), None);
    }

    #[test]
    fn the_round_cap_force_ends_a_marathon() {
        let mut game = started(3, Rules::default());
        game.force_rounds(crate::MAX_ROUNDS);
        for i in 1..=3 {
            game.play_card(&id(i), Some(Card::Dodge));
        }
        assert_eq!(game.state(), GameState::Ended);
        assert!(game.winners().is_empty());
        assert_eq!(game.last_round().errors.len(), 1);
        assert!(game.last_round().errors[0].player.is_none());
    }

    #[test]
    fn bot_failures_land_in_the_round_errors() {
        let mut game = started(3, Rules::default());
        game.report_error(Some(id(2)), "bot unreachable");
        for i in 1..=3 {
            game.play_card(&id(i), Some(Card::Dodge));
        }
        assert_eq!(game.last_round().errors.len(), 1);
        assert_eq!(game.last_round().errors[0].player, Some(id(2)));
        assert_eq!(game.last_round().errors[0].message, "bot unreachable");
        // the error belongs to that round only
        for i in 1..=3 {
            game.play_card(&id(i), Some(Card::Dodge));
        }
        assert!(game.last_round().errors.is_empty());
    }

    #[test]
    fn submissions_have_kind_order_in_the_log() {
        let sink = Arc::new(CountingSink::default());
        let mut game = Game::new("test", Rules::default(), Arc::new(sink.clone()));
        for i in 1..=3 {
            game.add_player(seat(i)).expect("seat available");
        }
        game.start();
        game.player_mut(&id(3)).expect("seated").bullets = 1;
        game.play_card(&id(3), Some(Card::Attack(id(2))));
        game.play_card(&id(2), Some(Card::Chest));
        game.play_card(&id(1), Some(Card::Dodge));
        assert_eq!(sink.rounds_resolved.load(Ordering::Relaxed), 1);
        // log order asserted in resolve tests; here just the flow
        assert_eq!(game.rounds(), 2);
        assert_eq!(game.player(&id(2)).expect("seated").shots, 1);
    }
}
