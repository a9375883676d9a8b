use super::table::Table;
use super::table::TableHandle;
use crate::SESSION_TTL;
use crate::cards::Catalog;
use crate::gameplay::Rules;
use rand::prelude::IndexedRandom;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;
use tokio::sync::RwLock;

/// Short-id alphabet. Ambiguous glyphs (i, o, w) are left out so ids
/// survive being read aloud across a table.
const ID_CHARSET: &[u8] = b"abcdefghjklmnpqrstuvxyz0123456789";
/// Misses per id length before the generator grows the length.
const ID_ATTEMPTS: usize = 16;

struct Entry {
    handle: TableHandle,
    touched: Instant,
}

/// Keyed, expiring cache of live sessions. Holds the only long-lived
/// handle per table; eviction drops it and the table task winds down on
/// its own. Expiration is sliding and purged opportunistically on access.
pub struct GameRepository {
    games: RwLock<HashMap<String, Entry>>,
    catalog: Catalog,
    ttl: Duration,
}

impl Default for GameRepository {
    fn default() -> Self {
        Self::new(Catalog::default(), SESSION_TTL)
    }
}

impl GameRepository {
    pub fn new(catalog: Catalog, ttl: Duration) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            catalog,
            ttl,
        }
    }

    /// Spawns a new session under a fresh short id and returns the id.
    pub async fn create_game(&self, rules: Option<Rules>) -> String {
        let mut games = self.games.write().await;
        games.retain(|id, entry| Self::keep(id, entry, self.ttl));
        let id = Self::unique_id(&games);
        let handle = Table::spawn(&id, rules.unwrap_or_default(), self.catalog.clone());
        games.insert(
            id.clone(),
            Entry {
                handle,
                touched: Instant::now(),
            },
        );
        log::info!("created game {}", id);
        id
    }

    /// Looks up a session, refreshing its expiration.
    pub async fn get_game(&self, id: &str) -> Option<TableHandle> {
        let mut games = self.games.write().await;
        games.retain(|id, entry| Self::keep(id, entry, self.ttl));
        let entry = games.get_mut(id)?;
        entry.touched = Instant::now();
        Some(entry.handle.clone())
    }

    fn keep(id: &str, entry: &Entry, ttl: Duration) -> bool {
        let keep = entry.touched.elapsed() <= ttl;
        if !keep {
            log::info!("evicting idle game {}", id);
        }
        keep
    }

    /// Draws 3+ character ids, growing the length once a length looks
    /// crowded.
    fn unique_id(games: &HashMap<String, Entry>) -> String {
        let mut length = 3;
        loop {
            for _ in 0..ID_ATTEMPTS {
                let id = Self::random_id(length);
                if !games.contains_key(&id) {
                    return id;
                }
            }
            length += 1;
        }
    }

    fn random_id(length: usize) -> String {
        let mut rng = rand::rng();
        (0..length)
            .filter_map(|_| ID_CHARSET.choose(&mut rng))
            .map(|c| *c as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_use_the_unambiguous_alphabet() {
        for _ in 0..64 {
            let id = GameRepository::random_id(3);
            assert_eq!(id.len(), 3);
            assert!(id.bytes().all(|c| ID_CHARSET.contains(&c)));
            assert!(!id.contains(['i', 'o', 'w']));
        }
    }

    #[tokio::test]
    async fn generated_ids_avoid_known_keys() {
        let mut games = HashMap::new();
        for _ in 0..32 {
            let id = GameRepository::unique_id(&games);
            assert!(!games.contains_key(&id));
            games.insert(
                id,
                Entry {
                    handle: Table::spawn("x", Rules::default(), Catalog::default()),
                    touched: Instant::now(),
                },
            );
        }
    }

    #[tokio::test]
    async fn created_games_can_be_looked_up() {
        let repository = GameRepository::default();
        let id = repository.create_game(None).await;
        assert!(repository.get_game(&id).await.is_some());
        assert!(repository.get_game("zzz").await.is_none());
    }

    #[tokio::test]
    async fn idle_games_expire() {
        let repository = GameRepository::new(Catalog::default(), Duration::ZERO);
        let id = repository.create_game(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(repository.get_game(&id).await.is_none());
    }
}
