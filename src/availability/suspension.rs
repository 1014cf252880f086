use crate::config::{CARD_SUSPENSION_THRESHOLD, CARD_WINDOW_MATCHDAYS};
use crate::types::CardRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionReason {
    /// Red card in the most recent recorded matchday, not yet served.
    RedCard,
    /// Yellow-card accumulation over the recent matchday window.
    Accumulated,
}

impl SuspensionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SuspensionReason::RedCard => "red card suspension",
            SuspensionReason::Accumulated => "accumulated cards",
        }
    }
}

impl std::fmt::Display for SuspensionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Evaluate suspension from a player's card history for one season.
///
/// `records` must be ordered most recent matchday first (the card store
/// query guarantees it). A red card in the most recent recorded matchday
/// means the ban has not been served (no later matchday exists). Otherwise
/// the yellow cards over the last `CARD_WINDOW_MATCHDAYS` recorded matchdays
/// are summed against the accumulation threshold.
pub fn evaluate(records: &[CardRecord]) -> Option<SuspensionReason> {
    let Some(latest) = records.first() else {
        return None;
    };

    if latest.red_cards > 0 {
        return Some(SuspensionReason::RedCard);
    }

    let recent_yellows: u32 = records
        .iter()
        .take(CARD_WINDOW_MATCHDAYS)
        .map(|r| r.yellow_cards)
        .sum();

    if recent_yellows >= CARD_SUSPENSION_THRESHOLD {
        return Some(SuspensionReason::Accumulated);
    }

    None
}
