use serde::Serialize;

use roulette_db::models::Range;
use super::{range_shares, share_of, Signal};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imbalance {
    pub window: usize,
    pub shares: [f64; 3],
    /// Tiers le plus représenté (à égalité, le plus petit).
    pub dominant: Range,
    pub unbalanced: bool,
}

/// Déséquilibre : un tiers atteint `threshold` % des tours non nuls de la fenêtre.
pub fn imbalance(history: &[u8], window: usize, threshold: f64) -> Signal<Imbalance> {
    if history.len() < window {
        return Signal::Inactive {
            needed: window,
            available: history.len(),
        };
    }
    let Some(shares) = range_shares(&history[..window]) else {
        return Signal::OnlyZeros { window };
    };

    let mut dominant = Range::Small;
    for r in Range::ALL {
        if share_of(&shares, r) > share_of(&shares, dominant) {
            dominant = r;
        }
    }

    Signal::Ready(Imbalance {
        window,
        shares,
        dominant,
        unbalanced: share_of(&shares, dominant) >= threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbalanced_at_threshold() {
        // 3 grands sur 5 non nuls = 60 %
        let h = [25, 26, 27, 1, 13, 0, 0, 0];
        let i = imbalance(&h, 8, 60.0);
        let i = i.ready().unwrap();
        assert_eq!(i.dominant, Range::Large);
        assert!((i.shares[2] - 60.0).abs() < 1e-12);
        assert!(i.unbalanced);
    }

    #[test]
    fn test_balanced() {
        let h = [1, 13, 25, 2, 14, 26, 3, 15];
        let i = imbalance(&h, 8, 60.0);
        let i = i.ready().unwrap();
        assert!(!i.unbalanced);
        assert_eq!(i.dominant, Range::Small);
    }

    #[test]
    fn test_inactive_short_window() {
        assert_eq!(
            imbalance(&[1, 2, 3], 8, 60.0),
            Signal::Inactive { needed: 8, available: 3 }
        );
    }

    #[test]
    fn test_only_zeros_full_window() {
        let mut h = vec![0u8; 8];
        h.extend([1u8; 4]);
        assert_eq!(imbalance(&h, 8, 60.0), Signal::OnlyZeros { window: 8 });
    }

    #[test]
    fn test_long_window() {
        let mut h = vec![14u8; 20];
        h.extend([1u8; 10]);
        let i = imbalance(&h, 30, 60.0);
        let i = i.ready().unwrap();
        assert_eq!(i.dominant, Range::Mid);
        assert!(i.unbalanced);
    }
}
