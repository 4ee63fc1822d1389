use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use anticheat::session::PlayerBaseline;

/// Source of the per-player history the skill-jump check compares against.
/// The real player store is an external service; this seam keeps the
/// handlers testable without it.
#[async_trait]
pub trait BaselineStore {
    async fn get(&self, player_id: &str) -> PlayerBaseline;
    async fn record(&self, player_id: &str, score: i64);
}

/// In-process store with a running average per player. Holds accepted
/// submissions between polls of the real history service; unknown players
/// get the zeroed baseline, which disables the skill-jump check.
#[derive(Default)]
pub struct MemoryBaselineStore {
    entries: RwLock<HashMap<String, PlayerBaseline>>,
}

#[async_trait]
impl BaselineStore for MemoryBaselineStore {
    async fn get(&self, player_id: &str) -> PlayerBaseline {
        self.entries
            .read()
            .await
            .get(player_id)
            .copied()
            .unwrap_or_default()
    }

    async fn record(&self, player_id: &str, score: i64) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(player_id.to_string()).or_default();
        let games = entry.games_played as f64;
        entry.average_score = (entry.average_score * games + score as f64) / (games + 1.0);
        entry.games_played += 1;
    }
}
