use super::player::PlayerId;
use crate::cards::CardKind;
use serde::Deserialize;
use serde::Serialize;

/// One resolved action in a round's log.
///
/// `shot` marks that the source was hit this round regardless of phase; the
/// UI uses it to tell "missed chest because shot" apart from "missed chest
/// because outbid".
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundAction {
    pub kind: CardKind,
    pub source: PlayerId,
    pub success: bool,
    pub target: Option<PlayerId>,
    pub shot: bool,
}

impl RoundAction {
    pub fn new(kind: CardKind, source: PlayerId, success: bool) -> Self {
        Self {
            kind,
            source,
            success,
            target: None,
            shot: false,
        }
    }
    pub fn towards(mut self, target: PlayerId) -> Self {
        self.target = Some(target);
        self
    }
}

/// A recoverable failure during a round, e.g. an unreachable remote bot.
/// Visible to monitors, never fatal to the round. `player` is None for
/// session-level failures like the round cap.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundError {
    pub player: Option<PlayerId>,
    pub message: String,
}

/// The current round's accumulated log, reset every round.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub actions: Vec<RoundAction>,
    pub errors: Vec<RoundError>,
}
