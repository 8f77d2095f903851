use serde::Serialize;

use crate::config::ExpectedGap;

/// Écart théorique entre deux zéros sur une roue à 37 cases.
pub const THEORETICAL_GAP: f64 = 37.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZeroStats {
    /// Tours consécutifs sans zéro depuis le plus récent.
    pub miss: usize,
    /// Écart moyen entre zéros successifs ; `None` avec moins de deux zéros.
    pub average_gap: Option<f64>,
    pub zero_count: usize,
}

fn zero_positions(history: &[u8]) -> Vec<usize> {
    history
        .iter()
        .enumerate()
        .filter(|(_, &n)| n == 0)
        .map(|(i, _)| i)
        .collect()
}

fn mean_gap(positions: &[usize]) -> Option<f64> {
    if positions.len() < 2 {
        return None;
    }
    let sum: usize = positions.windows(2).map(|w| w[1] - w[0]).sum();
    Some(sum as f64 / (positions.len() - 1) as f64)
}

pub fn zero_stats(history: &[u8]) -> ZeroStats {
    let positions = zero_positions(history);
    ZeroStats {
        miss: positions.first().copied().unwrap_or(history.len()),
        average_gap: mean_gap(&positions),
        zero_count: positions.len(),
    }
}

pub fn expected_gap(history: &[u8], mode: ExpectedGap) -> f64 {
    match mode {
        ExpectedGap::Theoretical => THEORETICAL_GAP,
        ExpectedGap::Empirical { window } => {
            let window = &history[..window.min(history.len())];
            mean_gap(&zero_positions(window)).unwrap_or(THEORETICAL_GAP)
        }
    }
}

/// Retard courant rapporté à l'écart attendu (1.0 = « à l'heure »).
pub fn zero_pressure(history: &[u8], mode: ExpectedGap) -> f64 {
    let expected = expected_gap(history, mode);
    if expected <= 0.0 {
        return 0.0;
    }
    zero_stats(history).miss as f64 / expected
}
