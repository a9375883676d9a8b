use super::bot::Bot;
use crate::cards::Card;
use crate::dto::BotInfo;
use crate::dto::GameContext;
use rand::Rng;
use rand::prelude::IndexedRandom;

/// Mr. Random plays a uniformly random legal card.
pub struct RandomBot;

/// Mr. Trigger reloads on an empty gun and otherwise shoots the richest
/// living opponent, any of them when nobody has coins yet.
pub struct TriggerBot;

/// Mr. Gold chases chests, with an occasional dodge once he has coins
/// worth protecting and somebody armed is worth dodging.
pub struct GoldBot;

#[async_trait::async_trait]
impl Bot for RandomBot {
    fn info(&self) -> BotInfo {
        BotInfo {
            id: "mrrandom".to_string(),
            kind: "builtin".to_string(),
            name: "Mr. Random".to_string(),
            description: "Plays a random legal card.".to_string(),
        }
    }
    async fn choose(&self, context: &GameContext) -> anyhow::Result<Card> {
        Ok(random_choice(context))
    }
}

#[async_trait::async_trait]
impl Bot for TriggerBot {
    fn info(&self) -> BotInfo {
        BotInfo {
            id: "mrtrigger".to_string(),
            kind: "builtin".to_string(),
            name: "Mr. Trigger".to_string(),
            description: "Reloads, then shoots whoever is richest.".to_string(),
        }
    }
    async fn choose(&self, context: &GameContext) -> anyhow::Result<Card> {
        Ok(trigger_choice(context))
    }
}

#[async_trait::async_trait]
impl Bot for GoldBot {
    fn info(&self) -> BotInfo {
        BotInfo {
            id: "mrgold".to_string(),
            kind: "builtin".to_string(),
            name: "Mr. Gold".to_string(),
            description: "Grabs chests, sometimes dodging to keep them.".to_string(),
        }
    }
    async fn choose(&self, context: &GameContext) -> anyhow::Result<Card> {
        Ok(gold_choice(context))
    }
}

fn random_choice(context: &GameContext) -> Card {
    context
        .selectable_cards
        .choose(&mut rand::rng())
        .cloned()
        .unwrap_or(Card::Dodge)
}

fn trigger_choice(context: &GameContext) -> Card {
    if context.me.bullets == 0 {
        return Card::Load;
    }
    let targets = context
        .other_players
        .iter()
        .filter(|p| p.alive)
        .collect::<Vec<_>>();
    let richest = targets.iter().map(|p| p.coins).max().unwrap_or(0);
    if richest > 0 {
        let coin_masters = targets
            .iter()
            .filter(|p| p.coins == richest)
            .collect::<Vec<_>>();
        if let Some(target) = coin_masters.choose(&mut rand::rng()) {
            return Card::Attack(target.player_id.clone());
        }
    }
    match targets.choose(&mut rand::rng()) {
        Some(target) => Card::Attack(target.player_id.clone()),
        None => Card::Dodge,
    }
}

fn gold_choice(context: &GameContext) -> Card {
    let threatened = context
        .other_players
        .iter()
        .any(|p| p.alive && p.bullets > 0 && p.coins > 0);
    if threatened && context.me.coins > 0 && rand::rng().random_bool(0.25) {
        return Card::Dodge;
    }
    Card::Chest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::PlayerState;
    use crate::dto::RuleSet;
    use crate::gameplay::PlayerId;
    use crate::gameplay::Rules;

    fn state(id: &str, alive: bool, coins: i32, bullets: i32) -> PlayerState {
        PlayerState {
            player_id: PlayerId::from(id),
            alive,
            coins,
            shots: 0,
            bullets,
        }
    }

    fn context(me: PlayerState, others: Vec<PlayerState>, cards: Vec<Card>) -> GameContext {
        GameContext {
            game_id: "test".to_string(),
            rules: RuleSet::from(&Rules::default()),
            round_number: 1,
            selectable_cards: cards,
            me,
            other_players: others,
        }
    }

    #[test]
    fn random_picks_a_legal_card() {
        let ctx = context(
            state("me", true, 0, 0),
            vec![state("p2", true, 0, 0)],
            vec![Card::Dodge, Card::Load, Card::Chest],
        );
        for _ in 0..32 {
            assert!(ctx.selectable_cards.contains(&random_choice(&ctx)));
        }
    }

    #[test]
    fn trigger_reloads_an_empty_gun() {
        let ctx = context(
            state("me", true, 0, 0),
            vec![state("p2", true, 5, 0)],
            vec![Card::Dodge, Card::Load, Card::Chest],
        );
        assert_eq!(trigger_choice(&ctx), Card::Load);
    }

    #[test]
    fn trigger_shoots_the_richest_living_opponent() {
        let ctx = context(
            state("me", true, 0, 1),
            vec![
                state("poor", true, 0, 0),
                state("rich", true, 3, 0),
                state("dead", false, 9, 0),
            ],
            vec![],
        );
        assert_eq!(trigger_choice(&ctx), Card::Attack(PlayerId::from("rich")));
    }

    #[test]
    fn trigger_shoots_someone_even_without_a_coin_in_sight() {
        let ctx = context(
            state("me", true, 0, 1),
            vec![state("p2", true, 0, 0)],
            vec![],
        );
        assert_eq!(trigger_choice(&ctx), Card::Attack(PlayerId::from("p2")));
    }

    #[test]
    fn gold_chests_while_unthreatened() {
        let ctx = context(
            state("me", true, 2, 0),
            vec![state("p2", true, 0, 1), state("p3", true, 2, 0)],
            vec![],
        );
        for _ in 0..32 {
            assert_eq!(gold_choice(&ctx), Card::Chest);
        }
    }

    #[test]
    fn gold_only_ever_dodges_or_chests_under_threat() {
        let ctx = context(
            state("me", true, 2, 0),
            vec![state("p2", true, 2, 1)],
            vec![],
        );
        for _ in 0..32 {
            let card = gold_choice(&ctx);
            assert!(card == Card::Chest || card == Card::Dodge);
        }
    }
}
