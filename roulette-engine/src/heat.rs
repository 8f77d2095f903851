use roulette_db::models::POCKETS;

use crate::config::HeatParams;

/// Chaleur par numéro (indexée 0-36, le zéro reste toujours à 0).
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMap {
    scores: [f64; POCKETS],
}

impl HeatMap {
    pub fn get(&self, number: u8) -> f64 {
        self.scores.get(number as usize).copied().unwrap_or(0.0)
    }

    pub fn scores(&self) -> &[f64; POCKETS] {
        &self.scores
    }

    /// Les `n` numéros les plus chauds, à égalité le plus petit numéro d'abord.
    pub fn ranked(&self, n: usize) -> Vec<(u8, f64)> {
        let mut ranked: Vec<(u8, f64)> = (1..POCKETS as u8)
            .map(|num| (num, self.scores[num as usize]))
            .filter(|&(_, h)| h > 0.0)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(n);
        ranked
    }
}

/// Poids d'une position : bande chaude puis traîne, rien au-delà de la fenêtre.
pub fn position_weight(position: usize, params: &HeatParams) -> f64 {
    if position < params.hot_band {
        params.hot_share / params.hot_band as f64
    } else if position < params.window {
        (1.0 - params.hot_share) / (params.window - params.hot_band) as f64
    } else {
        0.0
    }
}

pub fn heat_scores(history: &[u8], params: &HeatParams) -> HeatMap {
    let mut scores = [0.0f64; POCKETS];
    for (position, &n) in history.iter().take(params.window).enumerate() {
        if n == 0 || n as usize >= POCKETS {
            continue;
        }
        scores[n as usize] += position_weight(position, params);
    }
    HeatMap { scores }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let p = HeatParams::default();
        assert!((position_weight(0, &p) - 0.07).abs() < 1e-12);
        assert!((position_weight(9, &p) - 0.07).abs() < 1e-12);
        assert!((position_weight(10, &p) - 0.0075).abs() < 1e-12);
        assert!((position_weight(49, &p) - 0.0075).abs() < 1e-12);
        assert_eq!(position_weight(50, &p), 0.0);
    }

    #[test]
    fn test_heat_positions_0_and_25() {
        let mut h = vec![1u8; 50];
        h[0] = 7;
        h[25] = 7;
        let heat = heat_scores(&h, &HeatParams::default());
        assert!((heat.get(7) - 0.0775).abs() < 1e-12, "heat = {}", heat.get(7));
    }

    #[test]
    fn test_heat_ignores_beyond_window() {
        let mut h = vec![1u8; 60];
        h[55] = 9;
        let heat = heat_scores(&h, &HeatParams::default());
        assert_eq!(heat.get(9), 0.0);
    }

    #[test]
    fn test_heat_excludes_zero() {
        let heat = heat_scores(&[0, 0, 0], &HeatParams::default());
        assert_eq!(heat.get(0), 0.0);
        assert!(heat.ranked(3).is_empty());
    }

    #[test]
    fn test_full_window_sums_to_one() {
        let h: Vec<u8> = (0..50).map(|i| (i % 36 + 1) as u8).collect();
        let heat = heat_scores(&h, &HeatParams::default());
        let total: f64 = heat.scores().iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "total = {}", total);
    }

    #[test]
    fn test_ranked_tie_break_ascending() {
        let heat = heat_scores(&[5, 3], &HeatParams::default());
        let ranked = heat.ranked(3);
        assert_eq!(ranked.iter().map(|r| r.0).collect::<Vec<_>>(), vec![3, 5]);
    }

    #[test]
    fn test_recent_repetition_dominates() {
        // 2 fois récent contre 5 fois dans la traîne
        let mut h = vec![1u8; 50];
        h[0] = 10;
        h[1] = 10;
        for i in [20, 25, 30, 35, 40] {
            h[i] = 20;
        }
        let heat = heat_scores(&h, &HeatParams::default());
        assert!(heat.get(10) > heat.get(20));
    }
}
