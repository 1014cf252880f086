use tracing::{debug, warn};

use crate::availability::suspension;
use crate::provider::{CardSource, FootballProvider};
use crate::types::{AvailabilityStatus, PlayerAvailability};

/// Decides AVAILABLE / INJURED / SUSPENDED for one player by combining the
/// live provider injury flag with locally accumulated card history.
///
/// Priority is strict: INJURED > SUSPENDED > AVAILABLE. The resolver fails
/// open: every error path degrades to AVAILABLE rather than surfacing.
pub struct AvailabilityResolver<P, C> {
    provider: P,
    cards: C,
}

impl<P: FootballProvider, C: CardSource> AvailabilityResolver<P, C> {
    pub fn new(provider: P, cards: C) -> Self {
        Self { provider, cards }
    }

    pub async fn resolve(&self, player_id: i64, season: u16) -> PlayerAvailability {
        // Provider lookup: requested season first, then one season back.
        // Stop at the first season that returns any record, injured or not.
        let mut found = None;
        for lookup_season in [season, season.saturating_sub(1)] {
            match self.provider.player_season(player_id, lookup_season).await {
                Ok(Some(record)) => {
                    found = Some(record);
                    break;
                }
                Ok(None) => {
                    debug!(player_id, lookup_season, "no provider data for season");
                }
                Err(e) => {
                    warn!(player_id, lookup_season, "provider lookup failed: {e}");
                }
            }
        }

        if matches!(&found, Some(record) if record.injured) {
            return PlayerAvailability {
                player_id,
                status: AvailabilityStatus::Injured,
                reason: Some("injured".to_string()),
                season,
            };
        }

        // Not injured (or no provider data at all): consult local card
        // history for the requested season. A card lookup failure is logged
        // and treated as no suspension.
        let records = match self.cards.cards(player_id, season).await {
            Ok(records) => records,
            Err(e) => {
                warn!(player_id, season, "card lookup failed: {e}");
                Vec::new()
            }
        };

        if let Some(reason) = suspension::evaluate(&records) {
            return PlayerAvailability {
                player_id,
                status: AvailabilityStatus::Suspended,
                reason: Some(reason.as_str().to_string()),
                season,
            };
        }

        PlayerAvailability::available(player_id, season)
    }
}
