use crate::gameplay::PlayerId;
use serde::Deserialize;
use serde::Serialize;

/// Discriminant of a card, also the resolution phase order.
///
/// The numeric order is load-bearing twice over: rounds resolve
/// Dodge → Attack → Load → Chest in fixed phases, and action logs and
/// playable-card lists sort by this order (Dodge < Load < Chest < Attack).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum CardKind {
    Dodge = 0,
    Load = 1,
    Chest = 2,
    Attack = 3,
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CardKind::Dodge => write!(f, "Dodge"),
            CardKind::Load => write!(f, "Load"),
            CardKind::Chest => write!(f, "Chest"),
            CardKind::Attack => write!(f, "Attack"),
        }
    }
}

/// A playable card. Dodge/Load/Chest are singleton values; Attack carries
/// the id of the player being shot at.
///
/// The derived ordering is (kind, target), which is exactly the ordering
/// the action log and playable-card lists require.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "type", content = "target")]
pub enum Card {
    Dodge,
    Load,
    Chest,
    Attack(PlayerId),
}

impl Card {
    pub fn kind(&self) -> CardKind {
        match self {
            Card::Dodge => CardKind::Dodge,
            Card::Load => CardKind::Load,
            Card::Chest => CardKind::Chest,
            Card::Attack(_) => CardKind::Attack,
        }
    }
    pub fn target(&self) -> Option<&PlayerId> {
        match self {
            Card::Attack(target) => Some(target),
            _ => None,
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Card::Attack(target) => write!(f, "Attack({})", target),
            card => write!(f, "{}", card.kind()),
        }
    }
}
