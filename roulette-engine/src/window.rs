use roulette_db::models::{Color, Meta, Parity, Range};
use serde::Serialize;

/// Décompte couleur / parité / tiers sur les `n` premiers tours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowTally {
    pub total: usize,
    pub red: usize,
    pub black: usize,
    /// Nombre de zéros.
    pub green: usize,
    pub odd: usize,
    pub even: usize,
    pub small: usize,
    pub mid: usize,
    pub large: usize,
    /// Position du premier zéro dans la fenêtre (0 = le plus récent), `total` sinon.
    pub zero_miss: usize,
}

impl WindowTally {
    pub fn range_count(&self, range: Range) -> usize {
        match range {
            Range::Small => self.small,
            Range::Mid => self.mid,
            Range::Large => self.large,
        }
    }

    pub fn non_zero(&self) -> usize {
        self.total - self.green
    }
}

pub fn tally(history: &[u8], n: usize) -> WindowTally {
    let window = &history[..n.min(history.len())];
    let mut t = WindowTally {
        total: window.len(),
        ..WindowTally::default()
    };

    for &outcome in window {
        let meta = Meta::of(outcome);
        match meta.color {
            Color::Red => t.red += 1,
            Color::Black => t.black += 1,
            Color::Green => t.green += 1,
        }
        match meta.parity {
            Some(Parity::Odd) => t.odd += 1,
            Some(Parity::Even) => t.even += 1,
            None => {}
        }
        match meta.range {
            Some(Range::Small) => t.small += 1,
            Some(Range::Mid) => t.mid += 1,
            Some(Range::Large) => t.large += 1,
            None => {}
        }
    }

    t.zero_miss = window
        .iter()
        .position(|&n| n == 0)
        .unwrap_or(window.len());
    t
}

/// Compte par tiers sur une fenêtre, zéros exclus.
pub(crate) fn range_counts(window: &[u8]) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for &n in window {
        if let Some(range) = Range::of(n) {
            counts[range.index()] += 1;
        }
    }
    counts
}
