use super::event::GameEvent;
use crate::cards::Card;
use crate::gameplay::GameState;
use crate::gameplay::PlayerId;
use crate::gameplay::RoundResult;
use tokio::sync::mpsc::UnboundedSender;

/// Outbound notification contract the session calls into.
///
/// Every call is fire-and-forget: the session never depends on delivery
/// succeeding, and implementations must not block. Concrete transport
/// (WebSocket fan-out, bot prompting) lives behind a channel.
pub trait GameEvents: Send + Sync {
    fn player_joined(&self, game: &str, player: &PlayerId);
    fn player_left(&self, game: &str, player: &PlayerId);
    fn new_round(&self, game: &str);
    fn game_state_changed(&self, game: &str, state: GameState);
    fn card_played(&self, game: &str, player: &PlayerId, card: Option<&Card>);
    fn round_results_completed(&self, game: &str);
    fn round_completed(&self, game: &str, round: u32, result: &RoundResult);
    fn game_restarted(&self, game: &str);
}

/// Sink that swallows everything. Default for engine unit tests.
pub struct NullSink;

impl GameEvents for NullSink {
    fn player_joined(&self, _: &str, _: &PlayerId) {}
    fn player_left(&self, _: &str, _: &PlayerId) {}
    fn new_round(&self, _: &str) {}
    fn game_state_changed(&self, _: &str, _: GameState) {}
    fn card_played(&self, _: &str, _: &PlayerId, _: Option<&Card>) {}
    fn round_results_completed(&self, _: &str) {}
    fn round_completed(&self, _: &str, _: u32, _: &RoundResult) {}
    fn game_restarted(&self, _: &str) {}
}

/// Sink that forwards each notification as a GameEvent value into an
/// unbounded channel. The table actor consumes the far end.
pub struct ChannelSink {
    tx: UnboundedSender<GameEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<GameEvent>) -> Self {
        Self { tx }
    }
    fn emit(&self, event: GameEvent) {
        self.tx
            .send(event)
            .map_err(|e| log::warn!("dropped game event: {}", e))
            .ok();
    }
}

impl GameEvents for ChannelSink {
    fn player_joined(&self, game: &str, player: &PlayerId) {
        self.emit(GameEvent::PlayerJoined {
            game: game.to_string(),
            player: player.clone(),
        });
    }
    fn player_left(&self, game: &str, player: &PlayerId) {
        self.emit(GameEvent::PlayerLeft {
            game: game.to_string(),
            player: player.clone(),
        });
    }
    fn new_round(&self, game: &str) {
        self.emit(GameEvent::NewRound {
            game: game.to_string(),
        });
    }
    fn game_state_changed(&self, game: &str, state: GameState) {
        self.emit(GameEvent::GameStateChanged {
            game: game.to_string(),
            state,
        });
    }
    fn card_played(&self, game: &str, player: &PlayerId, card: Option<&Card>) {
        self.emit(GameEvent::CardPlayed {
            game: game.to_string(),
            player: player.clone(),
            card: card.cloned(),
        });
    }
    fn round_results_completed(&self, game: &str) {
        self.emit(GameEvent::RoundResultsCompleted {
            game: game.to_string(),
        });
    }
    fn round_completed(&self, game: &str, round: u32, result: &RoundResult) {
        self.emit(GameEvent::RoundCompleted {
            game: game.to_string(),
            round,
            result: result.clone(),
        });
    }
    fn game_restarted(&self, game: &str) {
        self.emit(GameEvent::GameRestarted {
            game: game.to_string(),
        });
    }
}
