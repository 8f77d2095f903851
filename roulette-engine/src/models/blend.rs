use std::collections::HashMap;

use super::ForecastModel;
use crate::config::{BlendWeights, EngineConfig};
use crate::frequency::frequency_table;
use crate::predictor::rank_from;
use crate::transition::number_transitions;

/// Markov d'ordre 1 mélangé à la fréquence globale.
pub struct BlendModel {
    transition_window: usize,
    frequency_window: usize,
    weights: BlendWeights,
}

impl BlendModel {
    pub fn new(transition_window: usize, frequency_window: usize, weights: BlendWeights) -> Self {
        Self {
            transition_window,
            frequency_window,
            weights,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.transition_window, config.frequency_window, config.blend)
    }
}

impl ForecastModel for BlendModel {
    fn name(&self) -> &str {
        "Markov+Fréquence"
    }

    fn rank(&self, history: &[u8], top_n: usize) -> Vec<u8> {
        let Some(&last) = history.first() else {
            return Vec::new();
        };
        let probs = number_transitions(history, self.transition_window).probabilities();
        let freq = frequency_table(history, self.frequency_window);
        rank_from(last, &probs, &freq, self.weights, top_n)
            .into_iter()
            .map(|c| c.number)
            .collect()
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("transition_window".to_string(), self.transition_window as f64),
            ("frequency_window".to_string(), self.frequency_window as f64),
            ("w_frequency".to_string(), self.weights.frequency),
            ("w_transition".to_string(), self.weights.transition),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::predict_next;

    #[test]
    fn test_matches_predictor() {
        let config = EngineConfig::default();
        let history = crate::models::make_test_history(120);
        let model = BlendModel::from_config(&config);
        let expected: Vec<u8> = predict_next(&history, &config).iter().map(|c| c.number).collect();
        assert_eq!(model.rank(&history, config.top_n), expected);
    }

    #[test]
    fn test_follows_repeated_transition() {
        // Chronologie : 5 → 7 → 5 → 7 → 5
        let model = BlendModel::from_config(&EngineConfig::default());
        assert_eq!(model.rank(&[5, 7, 5, 7, 5], 1), vec![7]);
    }
}
