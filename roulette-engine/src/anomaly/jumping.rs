use serde::Serialize;

use roulette_db::models::Range;
use super::Signal;
use crate::config::JumpingParams;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Jumping {
    /// Tiers des derniers tours non nuls, le plus récent en tête.
    pub ranges: Vec<Range>,
    pub distinct: usize,
    pub jumping: bool,
}

/// Alternance rapide : assez de tiers différents et jamais deux fois le même de suite.
pub fn jumping(history: &[u8], params: &JumpingParams) -> Signal<Jumping> {
    let ranges: Vec<Range> = history
        .iter()
        .filter_map(|&n| Range::of(n))
        .take(params.window)
        .collect();

    if ranges.len() < params.window {
        return Signal::Inactive {
            needed: params.window,
            available: ranges.len(),
        };
    }

    let mut seen = ranges.clone();
    seen.sort();
    seen.dedup();
    let distinct = seen.len();
    let alternating = ranges.windows(2).all(|w| w[0] != w[1]);

    Signal::Ready(Jumping {
        jumping: distinct >= params.min_variety && alternating,
        distinct,
        ranges,
    })
}
