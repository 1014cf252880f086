use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, warn};

use crate::config::{MAX_PLAYABLE_ODD, MIN_PLAYABLE_ODD};
use crate::error::Result;
use crate::markets::translate::translate;
use crate::provider::{FootballProvider, ProviderBet};
use crate::types::{Fixture, MarketCandidate};

/// Per-fixture odds ingestion. Fetches the first bookmaker's bet list and
/// filters it down to the playable subset, always including the synthetic
/// fallback markets so a fixture has content even without coverage.
pub struct OddsSelector<P> {
    provider: P,
}

impl<P: FootballProvider> OddsSelector<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fixtures for one competition round. Zero provider results come back
    /// as an empty vec; the caller decides what that means.
    pub async fn fetch_fixtures(
        &self,
        competition_id: u32,
        season: u16,
        jornada: u32,
    ) -> Result<Vec<Fixture>> {
        let round = format!("Regular Season - {jornada}");
        self.provider.fixtures(competition_id, season, &round).await
    }

    /// Candidate pool for one fixture. A provider failure degrades to the
    /// synthetic-only pool instead of surfacing.
    pub async fn markets_for_fixture<R: Rng>(
        &self,
        fixture_id: i64,
        rng: &mut R,
    ) -> Vec<MarketCandidate> {
        let bets = match self.provider.odds(fixture_id).await {
            Ok(bets) => bets,
            Err(e) => {
                warn!(fixture_id, "odds lookup failed, falling back to synthetic markets: {e}");
                Vec::new()
            }
        };
        select_markets(&bets, rng)
    }
}

/// Apply the market-family acceptance rules to a bookmaker's bet list and
/// append the fixed synthetic markets. Pure apart from the injected rng,
/// which decides the Over/Under line pick.
pub fn select_markets<R: Rng>(bets: &[ProviderBet], rng: &mut R) -> Vec<MarketCandidate> {
    let mut pool = Vec::new();

    for bet in bets {
        let name_lower = bet.name.to_lowercase();

        if name_lower.contains("handicap") {
            debug!(market = %bet.name, "discarding handicap market");
            continue;
        }

        if is_match_winner(bet, &name_lower) {
            accept_if_all_in_range(bet, &mut pool);
        } else if name_lower.contains("over") || name_lower.contains("under") {
            accept_over_under(bet, rng, &mut pool);
        } else if bet.values.len() == 2 || bet.values.len() == 3 {
            accept_if_all_in_range(bet, &mut pool);
        }
        // Any other option-count shape is ignored.
    }

    append_synthetic_markets(&mut pool);
    pool
}

/// Match Winner detection: name heuristic, or the structural shape of
/// exactly three options labelled Home/Draw/Away.
fn is_match_winner(bet: &ProviderBet, name_lower: &str) -> bool {
    if name_lower.contains("match winner") {
        return true;
    }
    if bet.values.len() != 3 {
        return false;
    }
    let has = |label: &str| bet.values.iter().any(|v| v.value == label);
    has("Home") && has("Draw") && has("Away")
}

/// Keep every option of the market only if every odd lies inside the
/// playable range; a single bad leg drops the whole market.
fn accept_if_all_in_range(bet: &ProviderBet, pool: &mut Vec<MarketCandidate>) {
    let mut parsed = Vec::with_capacity(bet.values.len());
    for option in &bet.values {
        match parse_odd(&option.odd) {
            Some(odd) if odd_in_range(odd) => parsed.push((option.value.as_str(), odd)),
            _ => {
                debug!(market = %bet.name, odd = %option.odd, "odd outside playable range, dropping market");
                return;
            }
        }
    }

    let bet_type = translate(&bet.name);
    for (label, odd) in parsed {
        pool.push(MarketCandidate {
            bet_type: bet_type.clone(),
            label: translate(label),
            odd,
        });
    }
}

/// Over/Under family: group option values by numeric line, keep lines where
/// both sides are present and playable, then pick exactly one accepted line
/// uniformly at random. All other lines of the market are discarded.
fn accept_over_under<R: Rng>(bet: &ProviderBet, rng: &mut R, pool: &mut Vec<MarketCandidate>) {
    #[derive(Default)]
    struct Line {
        over: Option<f64>,
        under: Option<f64>,
    }

    // Keyed by the line string ("2.5"). BTreeMap keeps the accepted-line
    // order stable so a seeded rng reproduces the same pick.
    let mut lines: BTreeMap<String, Line> = BTreeMap::new();
    for option in &bet.values {
        if let Some(line) = option.value.strip_prefix("Over ") {
            lines.entry(line.to_string()).or_default().over = parse_odd(&option.odd);
        } else if let Some(line) = option.value.strip_prefix("Under ") {
            lines.entry(line.to_string()).or_default().under = parse_odd(&option.odd);
        }
    }

    let accepted: Vec<(String, f64, f64)> = lines
        .into_iter()
        .filter_map(|(line, sides)| match (sides.over, sides.under) {
            (Some(over), Some(under)) if odd_in_range(over) && odd_in_range(under) => {
                Some((line, over, under))
            }
            _ => None,
        })
        .collect();

    if accepted.is_empty() {
        return;
    }

    let (line, over, under) = &accepted[rng.gen_range(0..accepted.len())];
    let bet_type = translate(&bet.name);
    pool.push(MarketCandidate {
        bet_type: bet_type.clone(),
        label: translate(&format!("Over {line}")),
        odd: *over,
    });
    pool.push(MarketCandidate {
        bet_type,
        label: translate(&format!("Under {line}")),
        odd: *under,
    });
}

/// Fixed fallback markets appended to every fixture's pool regardless of
/// bookmaker coverage.
fn append_synthetic_markets(pool: &mut Vec<MarketCandidate>) {
    for (market, line, over_odd, under_odd) in [
        ("Corners Over Under", "8.5", 2.10, 1.90),
        ("Cards Over/Under", "4.5", 2.10, 1.90),
    ] {
        let bet_type = translate(market);
        pool.push(MarketCandidate {
            bet_type: bet_type.clone(),
            label: translate(&format!("Over {line}")),
            odd: over_odd,
        });
        pool.push(MarketCandidate {
            bet_type,
            label: translate(&format!("Under {line}")),
            odd: under_odd,
        });
    }
}

fn odd_in_range(odd: f64) -> bool {
    (MIN_PLAYABLE_ODD..=MAX_PLAYABLE_ODD).contains(&odd)
}

fn parse_odd(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
