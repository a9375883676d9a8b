use crate::cards::Card;
use crate::gameplay::GameState;
use crate::gameplay::PlayerId;
use crate::gameplay::RoundResult;
use serde::Serialize;

/// Outbound session notification. Value type so it can be queued, fanned
/// out to WebSocket clients, and replayed to bot seats without touching
/// the session again.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    PlayerJoined {
        game: String,
        player: PlayerId,
    },
    PlayerLeft {
        game: String,
        player: PlayerId,
    },
    NewRound {
        game: String,
    },
    GameStateChanged {
        game: String,
        state: GameState,
    },
    CardPlayed {
        game: String,
        player: PlayerId,
        card: Option<Card>,
    },
    RoundResultsCompleted {
        game: String,
    },
    RoundCompleted {
        game: String,
        round: u32,
        result: RoundResult,
    },
    GameRestarted {
        game: String,
    },
}
