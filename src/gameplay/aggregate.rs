use super::game::Game;
use super::player::Player;
use super::player::PlayerId;
use super::round::RoundResult;
use crate::cards::CardKind;
use serde::Deserialize;
use serde::Serialize;

/// One display group of the last round, e.g. "these three loaded" or
/// "these two shot that one". Monitors reveal groups one by one.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRoundAction {
    pub kind: CardKind,
    pub success: bool,
    pub targets: Vec<PlayerId>,
    pub attackers: Vec<PlayerId>,
}

impl AggregatedRoundAction {
    fn group(kind: CardKind, success: bool, targets: Vec<PlayerId>) -> Self {
        Self {
            kind,
            success,
            targets,
            attackers: Vec::new(),
        }
    }
}

impl Game {
    /// Collapses the raw per-player log of the last round into reveal
    /// groups, in dramatic order: dodged attacks first, then hits, then the
    /// untouched dodgers, loaders, lucky chesters, and outbid chesters.
    /// Players no longer in the roster are silently dropped.
    pub fn aggregate_last_round(&self) -> Vec<AggregatedRoundAction> {
        aggregate(self.players(), self.last_round())
    }
}

pub fn aggregate(players: &[Player], round: &RoundResult) -> Vec<AggregatedRoundAction> {
    let seated = |id: &PlayerId| players.iter().any(|p| p.id() == id);
    let mut groups: Vec<AggregatedRoundAction> = Vec::new();

    // Failed attacks read as the target dodging its attackers. One group
    // per target, accumulating everyone who shot at them.
    for action in round
        .actions
        .iter()
        .filter(|a| a.kind == CardKind::Attack && !a.success)
    {
        let Some(target) = action.target.as_ref().filter(|t| seated(t)) else {
            continue;
        };
        if !seated(&action.source) {
            continue;
        }
        let idx = match groups.iter().position(|g| g.targets.contains(target)) {
            Some(idx) => idx,
            None => {
                groups.push(AggregatedRoundAction::group(
                    CardKind::Dodge,
                    false,
                    vec![target.clone()],
                ));
                groups.len() - 1
            }
        };
        groups[idx].attackers.push(action.source.clone());
    }

    // Landed attacks, same per-target grouping. A target that also dodged
    // someone this round stays in its earlier group.
    for action in round
        .actions
        .iter()
        .filter(|a| a.kind == CardKind::Attack && a.success)
    {
        let Some(target) = action.target.as_ref().filter(|t| seated(t)) else {
            continue;
        };
        if !seated(&action.source) {
            continue;
        }
        let idx = match groups.iter().position(|g| g.targets.contains(target)) {
            Some(idx) => idx,
            None => {
                groups.push(AggregatedRoundAction::group(
                    CardKind::Attack,
                    true,
                    vec![target.clone()],
                ));
                groups.len() - 1
            }
        };
        groups[idx].attackers.push(action.source.clone());
    }

    // Dodgers nobody managed to hit, as one group.
    let hit = groups
        .iter()
        .filter(|g| g.success)
        .flat_map(|g| g.targets.iter().cloned())
        .collect::<Vec<_>>();
    let dodgers = round
        .actions
        .iter()
        .filter(|a| a.kind == CardKind::Dodge)
        .map(|a| a.source.clone())
        .filter(|id| seated(id) && !hit.contains(id))
        .collect::<Vec<_>>();
    if !dodgers.is_empty() {
        groups.push(AggregatedRoundAction::group(CardKind::Dodge, true, dodgers));
    }

    let bucket = |kind: CardKind, success: bool, shot: Option<bool>| {
        round
            .actions
            .iter()
            .filter(|a| a.kind == kind && a.success == success)
            .filter(|a| shot.is_none_or(|s| a.shot == s))
            .map(|a| a.source.clone())
            .filter(|id| seated(id))
            .collect::<Vec<_>>()
    };

    let loaders = bucket(CardKind::Load, true, None);
    if !loaders.is_empty() {
        groups.push(AggregatedRoundAction::group(CardKind::Load, true, loaders));
    }
    let chesters = bucket(CardKind::Chest, true, None);
    if !chesters.is_empty() {
        groups.push(AggregatedRoundAction::group(CardKind::Chest, true, chesters));
    }
    // Shot chesters already appear in a hit group, so only the outbid ones
    // show up as a failed chest.
    let outbid = bucket(CardKind::Chest, false, Some(false));
    if !outbid.is_empty() {
        groups.push(AggregatedRoundAction::group(CardKind::Chest, false, outbid));
    }

    groups
}
