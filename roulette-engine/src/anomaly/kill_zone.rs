use serde::Serialize;

use roulette_db::models::Range;
use super::{range_shares, share_of, Signal};
use crate::config::KillZoneParams;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillZone {
    /// Parts (%) petit / moyen / grand.
    pub shares: [f64; 3],
    /// Tiers sous le seuil, dans l'ordre petit → grand.
    pub flagged: Vec<Range>,
}

/// Zones mortes : tiers sous-représentés sur les `window` derniers tours.
pub fn kill_zones(history: &[u8], params: &KillZoneParams) -> Signal<KillZone> {
    if history.len() < params.window {
        return Signal::Inactive {
            needed: params.window,
            available: history.len(),
        };
    }
    let Some(shares) = range_shares(&history[..params.window]) else {
        return Signal::OnlyZeros { window: params.window };
    };

    let flagged = Range::ALL
        .into_iter()
        .filter(|&r| share_of(&shares, r) < params.threshold)
        .collect();

    Signal::Ready(KillZone { shares, flagged })
}
