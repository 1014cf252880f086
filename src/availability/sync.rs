use std::collections::HashSet;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::availability::resolver::AvailabilityResolver;
use crate::config::SYNC_PROGRESS_EVERY;
use crate::db::store::PlayerRepository;
use crate::provider::{CardSource, FootballProvider};
use crate::types::{AvailabilityStatus, SyncSummary};

/// Walks every player across the three division partitions, resolves each
/// one's availability, and persists the result. Strictly sequential with a
/// fixed delay per player to respect provider throughput limits.
pub struct AvailabilitySync<P, C> {
    resolver: AvailabilityResolver<P, C>,
    /// Division repositories in fixed partition priority order.
    repositories: Vec<PlayerRepository>,
    delay: Duration,
}

impl<P: FootballProvider, C: CardSource> AvailabilitySync<P, C> {
    pub fn new(
        resolver: AvailabilityResolver<P, C>,
        repositories: Vec<PlayerRepository>,
        delay: Duration,
    ) -> Self {
        Self { resolver, repositories, delay }
    }

    /// Sync every known player for one season. Single-player failures are
    /// logged and skipped; the run itself never aborts.
    pub async fn sync_all(&self, season: u16) -> SyncSummary {
        let players = self.collect_player_ids().await;
        info!(players = players.len(), season, "availability sync starting");

        let mut summary = SyncSummary::default();

        for player_id in players {
            let availability = self.resolver.resolve(player_id, season).await;

            let mut matched = false;
            for repo in &self.repositories {
                match repo.update_availability(&availability).await {
                    Ok(true) => {
                        matched = true;
                        break;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        error!(
                            player_id,
                            division = %repo.division(),
                            "availability persist failed: {e}"
                        );
                    }
                }
            }

            summary.processed += 1;
            if matched {
                match availability.status {
                    AvailabilityStatus::Available => summary.available += 1,
                    AvailabilityStatus::Injured => summary.injured += 1,
                    AvailabilityStatus::Suspended => summary.suspended += 1,
                }
            } else {
                warn!(player_id, "player not found in any division partition");
                summary.not_found += 1;
            }

            if summary.processed % SYNC_PROGRESS_EVERY == 0 {
                info!(
                    processed = summary.processed,
                    injured = summary.injured,
                    suspended = summary.suspended,
                    "availability sync progress"
                );
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            processed = summary.processed,
            available = summary.available,
            injured = summary.injured,
            suspended = summary.suspended,
            not_found = summary.not_found,
            "availability sync complete"
        );
        summary
    }

    /// Union of player ids across the three divisions, in partition priority
    /// order. A failing partition contributes nothing but does not abort.
    async fn collect_player_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        let mut players = Vec::new();
        for repo in &self.repositories {
            match repo.player_ids().await {
                Ok(ids) => {
                    for id in ids {
                        if seen.insert(id) {
                            players.push(id);
                        }
                    }
                }
                Err(e) => {
                    error!(division = %repo.division(), "player id collection failed: {e}");
                }
            }
        }
        players
    }
}
