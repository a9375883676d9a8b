use crate::cards::Card;
use crate::dto::BotInfo;
use crate::dto::GameContext;
use crate::dto::PlayerRoundResult;

/// A strategy filling one seat. Implementations decide from a context
/// snapshot only, never from the live session, so a slow bot can think
/// while play continues elsewhere.
///
/// `choose` runs under the session's bot timeout; an error or a timeout
/// downgrades the seat to Dodge for the round. `notify` is fire-and-forget.
#[async_trait::async_trait]
pub trait Bot: Send + Sync {
    fn info(&self) -> BotInfo;

    async fn choose(&self, context: &GameContext) -> anyhow::Result<Card>;

    async fn notify(&self, _result: &PlayerRoundResult) -> anyhow::Result<()> {
        Ok(())
    }
}
