use super::bot::Bot;
use crate::BOT_TIMEOUT;
use crate::cards::Card;
use crate::dto::BotInfo;
use crate::dto::GameContext;
use crate::dto::PlayerRoundResult;
use anyhow::Context;

/// A seat filled by an externally hosted bot service.
///
/// The protocol is three endpoints under one base URL: `GET {base}`
/// returns a BotInfo self-description, `POST {base}/actions` takes a
/// GameContext and returns the chosen Card, `POST {base}/results` takes a
/// PlayerRoundResult and is fire-and-forget. Every call is bounded by the
/// client timeout; the session downgrades failures to Dodge.
pub struct ApiBot {
    base: String,
    info: BotInfo,
    client: reqwest::Client,
}

impl ApiBot {
    /// Connects to a remote bot by fetching its self-description once.
    /// An unreachable or malformed service fails the add, not a round.
    pub async fn connect(base: &str) -> anyhow::Result<Self> {
        let base = base.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(BOT_TIMEOUT)
            .build()
            .context("build bot http client")?;
        let info = client
            .get(&base)
            .send()
            .await
            .with_context(|| format!("reach bot at {}", base))?
            .error_for_status()
            .with_context(|| format!("bot at {} rejected info request", base))?
            .json::<BotInfo>()
            .await
            .with_context(|| format!("parse bot info from {}", base))?;
        Ok(Self { base, info, client })
    }
}

#[async_trait::async_trait]
impl Bot for ApiBot {
    fn info(&self) -> BotInfo {
        self.info.clone()
    }

    async fn choose(&self, context: &GameContext) -> anyhow::Result<Card> {
        let url = format!("{}/actions", self.base);
        let card = self
            .client
            .post(&url)
            .json(context)
            .send()
            .await
            .with_context(|| format!("reach bot at {}", url))?
            .error_for_status()
            .with_context(|| format!("bot at {} rejected action request", url))?
            .json::<Card>()
            .await
            .with_context(|| format!("parse card from {}", url))?;
        Ok(card)
    }

    async fn notify(&self, result: &PlayerRoundResult) -> anyhow::Result<()> {
        let url = format!("{}/results", self.base);
        self.client
            .post(&url)
            .json(result)
            .send()
            .await
            .with_context(|| format!("reach bot at {}", url))?
            .error_for_status()
            .with_context(|| format!("bot at {} rejected result", url))?;
        Ok(())
    }
}
