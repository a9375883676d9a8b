use crate::cards::Card;
use crate::gameplay::PlayerId;
use crate::gameplay::Rules;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateGame {
    pub rules: Option<Rules>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JoinGame {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayCard {
    pub player: PlayerId,
    pub card: Option<Card>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddBot {
    /// Base URL of a remote bot service, e.g. `http://host/api/bots/mrgold`.
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaveGame {
    pub player: PlayerId,
}
