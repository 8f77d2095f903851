use std::collections::HashMap;

use roulette_db::models::POCKETS;

use super::ForecastModel;
use crate::frequency::frequency_table;
use crate::predictor::sort_by_score;

/// Numéros les plus sortis sur la fenêtre, zéro compris.
pub struct FrequencyModel {
    window: usize,
}

impl FrequencyModel {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl ForecastModel for FrequencyModel {
    fn name(&self) -> &str {
        "Fréquence"
    }

    fn rank(&self, history: &[u8], top_n: usize) -> Vec<u8> {
        if history.is_empty() {
            return Vec::new();
        }
        let table = frequency_table(history, self.window);
        let mut scored: Vec<(u8, f64)> = (0..POCKETS as u8)
            .map(|n| (n, table.get(n)))
            .filter(|&(_, p)| p > 0.0)
            .collect();
        sort_by_score(&mut scored);
        scored.into_iter().take(top_n).map(|(n, _)| n).collect()
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("window".to_string(), self.window as f64)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_frequent_first() {
        let model = FrequencyModel::new(240);
        assert_eq!(model.rank(&[8, 0, 0, 8, 8, 30], 3), vec![8, 0, 30]);
    }

    #[test]
    fn test_window_bound() {
        let model = FrequencyModel::new(2);
        assert_eq!(model.rank(&[4, 5, 6, 6, 6], 3), vec![4, 5]);
    }
}
