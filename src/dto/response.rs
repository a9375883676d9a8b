use crate::cards::Card;
use crate::cards::Character;
use crate::gameplay::AggregatedRoundAction;
use crate::gameplay::Game;
use crate::gameplay::GameState;
use crate::gameplay::Player;
use crate::gameplay::PlayerId;
use crate::gameplay::RoundAction;
use crate::gameplay::RoundResult;
use crate::gameplay::Rules;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// The rule parameters a bot is allowed to reason about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub coins_to_win: i32,
    pub shots_to_die: i32,
    pub max_bullets: i32,
    pub chests_per_player_count: BTreeMap<usize, usize>,
}

impl From<&Rules> for RuleSet {
    fn from(rules: &Rules) -> Self {
        Self {
            coins_to_win: rules.coins_to_win,
            shots_to_die: rules.shots_to_die,
            max_bullets: rules.max_bullets,
            chests_per_player_count: rules.chests_per_player_count.clone(),
        }
    }
}

/// One player's public counters as bots see them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub player_id: PlayerId,
    pub alive: bool,
    pub coins: i32,
    pub shots: i32,
    pub bullets: i32,
}

impl From<&Player> for PlayerState {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id().clone(),
            alive: player.alive(),
            coins: player.coins,
            shots: player.shots,
            bullets: player.bullets,
        }
    }
}

/// Everything a bot gets to decide on: the rules, its own state, everyone
/// else's public state, and the cards it may legally play this round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameContext {
    pub game_id: String,
    pub rules: RuleSet,
    pub round_number: u32,
    pub selectable_cards: Vec<Card>,
    pub me: PlayerState,
    pub other_players: Vec<PlayerState>,
}

impl GameContext {
    pub fn snapshot(game: &Game, id: &PlayerId) -> Option<Self> {
        let me = game.player(id)?;
        Some(Self {
            game_id: game.id().to_string(),
            rules: RuleSet::from(game.rules()),
            round_number: game.rounds(),
            selectable_cards: game.playable_cards(id),
            me: PlayerState::from(me),
            other_players: game
                .players()
                .iter()
                .filter(|p| p.id() != id)
                .map(PlayerState::from)
                .collect(),
        })
    }
}

/// Per-player outcome notification pushed to bots after each round:
/// your own resolved action plus everyone else's, so stateful bots can
/// learn opponents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRoundResult {
    pub game_id: String,
    pub round: u32,
    pub game_state: GameState,
    pub player_id: PlayerId,
    pub success: bool,
    pub action: Option<RoundAction>,
    pub other_actions: Vec<RoundAction>,
}

impl PlayerRoundResult {
    pub fn snapshot(game: &Game, id: &PlayerId, round: u32, result: &RoundResult) -> Self {
        let action = result.actions.iter().find(|a| &a.source == id).cloned();
        Self {
            game_id: game.id().to_string(),
            round,
            game_state: game.state(),
            player_id: id.clone(),
            success: action.as_ref().map(|a| a.success).unwrap_or(false),
            action,
            other_actions: result
                .actions
                .iter()
                .filter(|a| &a.source != id)
                .cloned()
                .collect(),
        }
    }
}

/// Self-description served by a bot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
}

/// One seat in the public session view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub character: Character,
    pub coins: i32,
    pub shots: i32,
    pub bullets: i32,
    pub alive: bool,
    pub winner: bool,
    pub has_selected: bool,
    pub trend: Vec<bool>,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id().clone(),
            name: player.name().to_string(),
            character: player.character().clone(),
            coins: player.coins,
            shots: player.shots,
            bullets: player.bullets,
            alive: player.alive(),
            winner: player.winner(),
            has_selected: player.selected_card().is_some(),
            trend: player.success_trend(5),
        }
    }
}

/// Full public snapshot of a session, served on GET and after mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: String,
    pub state: GameState,
    pub rounds: u32,
    pub rules: Rules,
    pub players: Vec<PlayerView>,
    pub winners: Vec<PlayerId>,
    pub last_round: RoundResult,
    pub last_round_aggregated: Vec<AggregatedRoundAction>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id().to_string(),
            state: game.state(),
            rounds: game.rounds(),
            rules: game.rules().clone(),
            players: game.players().iter().map(PlayerView::from).collect(),
            winners: game.winners().iter().map(|p| p.id().clone()).collect(),
            last_round: game.last_round().clone(),
            last_round_aggregated: game.aggregate_last_round(),
        }
    }
}

/// Returned from a successful join; the player id doubles as the token
/// for subsequent card plays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedGame {
    pub game: String,
    pub player: PlayerId,
    pub name: String,
    pub character: Character,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedGame {
    pub game: String,
}
