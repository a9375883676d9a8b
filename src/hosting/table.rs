use crate::BOT_THINK;
use crate::BOT_TIMEOUT;
use crate::bots::Bot;
use crate::cards::Card;
use crate::cards::Catalog;
use crate::dto::GameContext;
use crate::dto::GameView;
use crate::dto::JoinedGame;
use crate::dto::PlayerRoundResult;
use crate::events::ChannelSink;
use crate::events::GameEvent;
use crate::gameplay::Game;
use crate::gameplay::JoinError;
use crate::gameplay::Player;
use crate::gameplay::PlayerId;
use crate::gameplay::Rules;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

/// Everything a session can be told. All mutation funnels through this
/// queue, so the all-selected check and resolution run on one task and
/// can never race.
pub enum Command {
    Join {
        name: Option<String>,
        reply: oneshot::Sender<Result<JoinedGame, JoinError>>,
    },
    AddBot {
        bot: Arc<dyn Bot>,
        reply: oneshot::Sender<Result<JoinedGame, JoinError>>,
    },
    Play {
        player: PlayerId,
        card: Option<Card>,
        /// Set when the card is a failure fallback rather than a choice.
        fault: Option<String>,
    },
    Leave {
        player: PlayerId,
    },
    Start {
        reply: oneshot::Sender<bool>,
    },
    Restart,
    Abort,
    Snapshot {
        reply: oneshot::Sender<GameView>,
    },
    Subscribe {
        tx: UnboundedSender<GameEvent>,
    },
}

/// Cloneable endpoint for one session's command queue. Held by the
/// repository and by request handlers; when the last clone drops, the
/// table task winds down.
#[derive(Clone)]
pub struct TableHandle {
    tx: UnboundedSender<Command>,
}

impl TableHandle {
    fn send(&self, command: Command) -> anyhow::Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow::anyhow!("session is gone"))
    }

    pub async fn join(
        &self,
        name: Option<String>,
    ) -> anyhow::Result<Result<JoinedGame, JoinError>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Join { name, reply })?;
        Ok(rx.await?)
    }

    pub async fn add_bot(&self, bot: Arc<dyn Bot>) -> anyhow::Result<Result<JoinedGame, JoinError>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AddBot { bot, reply })?;
        Ok(rx.await?)
    }

    pub fn play(&self, player: PlayerId, card: Option<Card>) -> anyhow::Result<()> {
        self.send(Command::Play {
            player,
            card,
            fault: None,
        })
    }

    pub fn leave(&self, player: PlayerId) -> anyhow::Result<()> {
        self.send(Command::Leave { player })
    }

    pub async fn start(&self) -> anyhow::Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { reply })?;
        Ok(rx.await?)
    }

    pub fn restart(&self) -> anyhow::Result<()> {
        self.send(Command::Restart)
    }

    pub fn abort(&self) -> anyhow::Result<()> {
        self.send(Command::Abort)
    }

    pub async fn snapshot(&self) -> anyhow::Result<GameView> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        Ok(rx.await?)
    }

    /// Registers an event subscriber; events flow until either side drops.
    pub fn subscribe(&self, tx: UnboundedSender<GameEvent>) -> anyhow::Result<()> {
        self.send(Command::Subscribe { tx })
    }
}

/// Single-task owner of one Game and its bot seats.
///
/// Runs a select loop over the command queue and the session's own event
/// stream. Events fan out to subscribers and drive bot play: a new round
/// prompts every living bot seat on its own task (bounded think time),
/// and a completed round pushes result notifications out. Bot answers
/// come back through the same command queue as human plays.
pub struct Table {
    game: Game,
    catalog: Catalog,
    bots: HashMap<PlayerId, Arc<dyn Bot>>,
    commands: UnboundedReceiver<Command>,
    /// Weak so the table's own reference never keeps the queue open; the
    /// task winds down once the repository and all clients let go.
    handle: WeakUnboundedSender<Command>,
    events: UnboundedReceiver<GameEvent>,
    subscribers: Vec<UnboundedSender<GameEvent>>,
}

impl Table {
    pub fn spawn(id: &str, rules: Rules, catalog: Catalog) -> TableHandle {
        let (command_tx, command_rx) = unbounded_channel();
        let (event_tx, event_rx) = unbounded_channel();
        let table = Self {
            game: Game::new(id, rules, Arc::new(ChannelSink::new(event_tx))),
            catalog,
            bots: HashMap::new(),
            commands: command_rx,
            handle: command_tx.downgrade(),
            events: event_rx,
            subscribers: Vec::new(),
        };
        tokio::spawn(table.run());
        TableHandle { tx: command_tx }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
                event = self.events.recv() => match event {
                    Some(event) => self.publish(event),
                    None => break,
                },
            }
        }
        log::info!("table {} closed", self.game.id());
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Join { name, reply } => {
                let _ = reply.send(self.seat(name));
            }
            Command::AddBot { bot, reply } => {
                let seated = self.seat(Some(bot.info().name));
                if let Ok(joined) = &seated {
                    // if this seat filled the table and auto-started the
                    // game, the resulting new-round event prompts every bot
                    self.bots.insert(joined.player.clone(), bot);
                }
                let _ = reply.send(seated);
            }
            Command::Play {
                player,
                card,
                fault,
            } => {
                if let Some(fault) = fault {
                    self.game.report_error(Some(player.clone()), &fault);
                }
                self.game.play_card(&player, card);
            }
            Command::Leave { player } => {
                self.bots.remove(&player);
                self.game.remove_player(&player);
            }
            Command::Start { reply } => {
                let ready = self.game.can_start();
                if ready {
                    self.game.start();
                }
                let _ = reply.send(ready);
            }
            Command::Restart => self.game.restart(),
            Command::Abort => self.game.abort(),
            Command::Snapshot { reply } => {
                let _ = reply.send(GameView::from(&self.game));
            }
            Command::Subscribe { tx } => self.subscribers.push(tx),
        }
    }

    fn publish(&mut self, event: GameEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        match event {
            GameEvent::NewRound { .. } => self.prompt_bots(),
            GameEvent::RoundCompleted { round, result, .. } => {
                for (id, bot) in self.bots.iter() {
                    let bot = bot.clone();
                    let outcome = PlayerRoundResult::snapshot(&self.game, id, round, &result);
                    tokio::spawn(async move {
                        if let Err(e) = bot.notify(&outcome).await {
                            log::warn!("bot result notification failed: {:#}", e);
                        }
                    });
                }
            }
            _ => {}
        }
    }

    fn seat(&mut self, name: Option<String>) -> Result<JoinedGame, JoinError> {
        let taken = self
            .game
            .players()
            .iter()
            .map(|p| p.character().clone())
            .collect::<Vec<_>>();
        let character = self.catalog.draw(&taken).ok_or(JoinError::RosterFull)?;
        let mut player = Player::new(PlayerId::random(), character.clone());
        if let Some(name) = name {
            player.set_name(&name);
        }
        let id = player.id().clone();
        let name = player.name().to_string();
        self.game.add_player(player)?;
        Ok(JoinedGame {
            game: self.game.id().to_string(),
            player: id,
            name,
            character,
        })
    }

    fn prompt_bots(&self) {
        let alive = self
            .game
            .alive_players()
            .iter()
            .map(|p| p.id().clone())
            .collect::<Vec<_>>();
        for id in self.bots.keys().filter(|id| alive.contains(id)) {
            self.prompt(id);
        }
    }

    /// Spawns one decision task for a bot seat. The task sleeps through
    /// the think delay, asks the bot under the timeout, and reports back
    /// as an ordinary play command; failures fall back to Dodge with the
    /// fault attached.
    fn prompt(&self, id: &PlayerId) {
        let Some(bot) = self.bots.get(id).cloned() else {
            return;
        };
        let Some(context) = GameContext::snapshot(&self.game, id) else {
            return;
        };
        let Some(handle) = self.handle.upgrade() else {
            return;
        };
        let player = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(BOT_THINK).await;
            let (card, fault) = match tokio::time::timeout(BOT_TIMEOUT, bot.choose(&context)).await
            {
                Ok(Ok(card)) => (card, None),
                Ok(Err(e)) => (Card::Dodge, Some(format!("bot failed to choose: {:#}", e))),
                Err(_) => (Card::Dodge, Some("bot timed out choosing a card".to_string())),
            };
            let _ = handle.send(Command::Play {
                player,
                card: Some(card),
                fault,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::GoldBot;
    use crate::bots::RandomBot;
    use crate::bots::TriggerBot;
    use crate::gameplay::GameState;

    async fn settle() {
        // bot seats think for BOT_THINK before answering
        tokio::time::sleep(BOT_THINK * 10).await;
    }

    #[tokio::test]
    async fn a_table_seats_humans_and_snapshots() {
        let handle = Table::spawn("test", Rules::default(), Catalog::default());
        let joined = handle
            .join(Some("Tester".to_string()))
            .await
            .expect("table alive")
            .expect("seat free");
        assert_eq!(joined.name, "Tester");
        let view = handle.snapshot().await.expect("table alive");
        assert_eq!(view.players.len(), 1);
        assert_eq!(view.state, GameState::Created);
    }

    #[tokio::test]
    async fn start_requires_the_minimum_roster() {
        let handle = Table::spawn("test", Rules::default(), Catalog::default());
        handle.join(None).await.expect("table alive").expect("seat free");
        assert!(!handle.start().await.expect("table alive"));
        handle.join(None).await.expect("table alive").expect("seat free");
        handle.join(None).await.expect("table alive").expect("seat free");
        assert!(handle.start().await.expect("table alive"));
        let view = handle.snapshot().await.expect("table alive");
        assert_eq!(view.state, GameState::Playing);
    }

    #[tokio::test]
    async fn bot_seats_play_rounds_on_their_own() {
        let handle = Table::spawn("test", Rules::default(), Catalog::default());
        handle
            .add_bot(Arc::new(TriggerBot))
            .await
            .expect("table alive")
            .expect("seat free");
        handle
            .add_bot(Arc::new(GoldBot))
            .await
            .expect("table alive")
            .expect("seat free");
        handle
            .add_bot(Arc::new(RandomBot))
            .await
            .expect("table alive")
            .expect("seat free");
        assert!(handle.start().await.expect("table alive"));
        settle().await;
        let view = handle.snapshot().await.expect("table alive");
        assert!(view.rounds > 1 || view.state == GameState::Ended);
    }

    #[tokio::test]
    async fn a_running_game_rejects_new_bot_seats() {
        let handle = Table::spawn("test", Rules::default(), Catalog::default());
        for _ in 0..3 {
            handle.join(None).await.expect("table alive").expect("seat free");
        }
        assert!(handle.start().await.expect("table alive"));
        let seated = handle.add_bot(Arc::new(RandomBot)).await.expect("table alive");
        assert!(matches!(seated, Err(JoinError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn seating_the_last_chair_auto_starts_and_prompts_the_bots() {
        let rules = Rules {
            min_player_count: 3,
            max_player_count: 3,
            ..Rules::default()
        };
        let handle = Table::spawn("test", rules, Catalog::default());
        handle
            .add_bot(Arc::new(TriggerBot))
            .await
            .expect("table alive")
            .expect("seat free");
        handle
            .add_bot(Arc::new(GoldBot))
            .await
            .expect("table alive")
            .expect("seat free");
        handle
            .add_bot(Arc::new(RandomBot))
            .await
            .expect("table alive")
            .expect("seat free");
        settle().await;
        let view = handle.snapshot().await.expect("table alive");
        assert!(view.rounds > 1 || view.state == GameState::Ended);
    }

    #[tokio::test]
    async fn subscribers_see_session_events() {
        let handle = Table::spawn("test", Rules::default(), Catalog::default());
        let (tx, mut rx) = unbounded_channel();
        handle.subscribe(tx).expect("table alive");
        handle.join(None).await.expect("table alive").expect("seat free");
        settle().await;
        match rx.recv().await {
            Some(GameEvent::PlayerJoined { game, .. }) => assert_eq!(game, "test"),
            other => panic!("expected a join event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn a_leaving_player_frees_the_character() {
        let handle = Table::spawn("test", Rules::default(), Catalog::default());
        let joined = handle.join(None).await.expect("table alive").expect("seat free");
        handle.leave(joined.player).expect("table alive");
        settle().await;
        let view = handle.snapshot().await.expect("table alive");
        assert!(view.players.is_empty());
    }
}
