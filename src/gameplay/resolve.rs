use super::player::Player;
use super::player::PlayerId;
use super::round::RoundAction;
use super::rules::Rules;
use crate::cards::Card;
use crate::cards::CardKind;
use std::collections::HashMap;

/// Resolves one round: turns every alive player's selected card into logged
/// actions and counter deltas, then applies all deltas at once.
///
/// Phase order is a correctness contract, not a convenience:
///   1. Dodge — unconditionally successful as an action.
///   2. Attack — every valid, non-dodged attack lands; simultaneity means
///      there is no single-shot-wins-ties rule. A bullet is spent whether or
///      not the attack connects, including against a target who already left.
///   3. Load — fails when the loader was shot this round or is at capacity.
///   4. Chest — capacity check against the other alive, non-shot claimants;
///      succeeds iff `others <= max_on_chest(alive) - 1`. Not first-come-
///      first-served: every claimant is checked against the same pool.
/// Then the shot flag is backfilled onto every action whose source was hit,
/// deltas are applied simultaneously, deaths are checked, and each player
/// newly dead with living shooters has their coins split evenly among those
/// shooters (integer division, remainder discarded). A dead player with no
/// living shooters keeps their coins; that asymmetry is deliberate.
///
/// Returns the action log sorted by (kind, source id).
pub fn resolve(players: &mut Vec<Player>, rules: &Rules, round: u32) -> Vec<RoundAction> {
    let alive = players
        .iter()
        .filter(|p| p.shots < rules.shots_to_die)
        .map(|p| p.id().clone())
        .collect::<Vec<_>>();
    let is_alive = |id: &PlayerId| alive.contains(id);

    let mut coins_diff = alive.iter().map(|id| (id.clone(), 0i32)).collect::<HashMap<_, _>>();
    let mut bullets_diff = coins_diff.clone();
    let mut shots_diff: HashMap<PlayerId, i32> = HashMap::new();
    let mut shot_by: HashMap<PlayerId, Vec<PlayerId>> = players
        .iter()
        .map(|p| (p.id().clone(), Vec::new()))
        .collect();
    let mut outcome: HashMap<PlayerId, bool> = HashMap::new();
    let mut actions: Vec<RoundAction> = Vec::new();

    let selected = |players: &[Player], id: &PlayerId| -> Option<Card> {
        players
            .iter()
            .find(|p| p.id() == id)
            .and_then(|p| p.selected_card().cloned())
    };

    // Dodge
    for id in alive.iter() {
        if selected(players, id).map(|c| c.kind()) == Some(CardKind::Dodge) {
            outcome.insert(id.clone(), true);
            actions.push(RoundAction::new(CardKind::Dodge, id.clone(), true));
        }
    }

    // Attacks
    for id in alive.iter() {
        let Some(Card::Attack(target)) = selected(players, id) else {
            continue;
        };
        let attacker = players.iter().find(|p| p.id() == id).expect("alive roster");
        if attacker.bullets == 0 {
            continue;
        }
        bullets_diff.insert(id.clone(), -1);
        let success = match players.iter().find(|p| *p.id() == target) {
            // target left mid-round: informational no-op, bullet still spent
            None => false,
            Some(victim) => {
                if victim.selected_card().map(|c| c.kind()) == Some(CardKind::Dodge) {
                    false
                } else {
                    *shots_diff.entry(target.clone()).or_insert(0) += 1;
                    shot_by.entry(target.clone()).or_default().push(id.clone());
                    true
                }
            }
        };
        outcome.insert(id.clone(), success);
        actions.push(RoundAction::new(CardKind::Attack, id.clone(), success).towards(target));
    }

    // Loads
    for id in alive.iter() {
        if selected(players, id).map(|c| c.kind()) != Some(CardKind::Load) {
            continue;
        }
        let loader = players.iter().find(|p| p.id() == id).expect("alive roster");
        let success = if shots_diff.contains_key(id) {
            false // being shot interrupts reloading
        } else if loader.bullets < rules.max_bullets {
            *bullets_diff.entry(id.clone()).or_insert(0) += 1;
            true
        } else {
            false
        };
        outcome.insert(id.clone(), success);
        actions.push(RoundAction::new(CardKind::Load, id.clone(), success));
    }

    // Chests
    for id in alive.iter() {
        if selected(players, id).map(|c| c.kind()) != Some(CardKind::Chest) {
            continue;
        }
        let success = if shots_diff.contains_key(id) {
            false
        } else {
            let others_on_chest = alive
                .iter()
                .filter(|other| *other != id)
                .filter(|other| selected(players, other).map(|c| c.kind()) == Some(CardKind::Chest))
                .filter(|other| !shots_diff.contains_key(*other))
                .count();
            others_on_chest <= rules.max_on_chest(alive.len()).saturating_sub(1)
        };
        if success {
            *coins_diff.entry(id.clone()).or_insert(0) += 1;
        }
        outcome.insert(id.clone(), success);
        actions.push(RoundAction::new(CardKind::Chest, id.clone(), success));
    }

    // Anyone who was hit this round carries the flag on their own action,
    // whatever that action was.
    for action in actions.iter_mut() {
        if shots_diff.contains_key(&action.source) {
            action.shot = true;
        }
    }

    // Apply all deltas simultaneously, then check deaths.
    for player in players.iter_mut() {
        let coins = coins_diff.get(player.id()).copied().unwrap_or(0);
        let shots = shots_diff.get(player.id()).copied().unwrap_or(0);
        let bullets = bullets_diff.get(player.id()).copied().unwrap_or(0);
        if coins != 0 || shots != 0 || bullets != 0 || is_alive(player.id()) {
            player.apply_round_outcome(coins, shots, bullets, rules.shots_to_die);
        }
    }

    // Coin redistribution on death, in roster order of the dead.
    for id in alive.iter() {
        let Some(dead_idx) = players.iter().position(|p| p.id() == id && !p.alive()) else {
            continue;
        };
        let shooters = shot_by
            .get(id)
            .map(|shooters| {
                shooters
                    .iter()
                    .filter_map(|s| players.iter().position(|p| p.id() == s && p.alive()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if shooters.is_empty() {
            continue; // no living shooter: the pot dies with its owner
        }
        let share = players[dead_idx].coins / shooters.len() as i32;
        for shooter_idx in shooters {
            players[shooter_idx].coins += share;
        }
        players[dead_idx].coins = 0;
    }

    for (id, success) in outcome.iter() {
        if let Some(player) = players.iter_mut().find(|p| p.id() == id) {
            player.set_result(round, *success);
        }
    }

    actions.sort_by(|a, b| (a.kind, &a.source).cmp(&(b.kind, &b.source)));
    actions
}
