use roulette_db::models::{MAX_OUTCOME, POCKETS};
use serde::Serialize;

use crate::config::{BlendWeights, EngineConfig};
use crate::frequency::{frequency_table, FrequencyTable};
use crate::transition::{number_transitions, ProbabilityMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub number: u8,
    pub score: f64,
    /// Fréquence globale (%) sur la fenêtre.
    pub frequency: f64,
    /// Probabilité de transition (%) depuis le numéro de départ.
    pub transition: f64,
}

/// Tri décroissant par score, à égalité le plus petit numéro d'abord.
pub fn sort_by_score(items: &mut [(u8, f64)]) {
    items.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
}

/// Classe les 37 candidats par `fréquence × w_f + transition × w_t` depuis `from`.
pub fn rank_from(
    from: u8,
    probs: &ProbabilityMatrix<POCKETS>,
    freq: &FrequencyTable,
    weights: BlendWeights,
    top_n: usize,
) -> Vec<Candidate> {
    let from = from.min(MAX_OUTCOME) as usize;
    let mut candidates: Vec<Candidate> = (0..POCKETS as u8)
        .map(|number| {
            let frequency = freq.get(number);
            let transition = probs.get(from, number as usize);
            Candidate {
                number,
                score: frequency * weights.frequency + transition * weights.transition,
                frequency,
                transition,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });
    candidates.truncate(top_n);
    candidates
}

fn rank_with_history(history: &[u8], from: u8, config: &EngineConfig, top_n: usize) -> Vec<Candidate> {
    if history.is_empty() {
        return Vec::new();
    }
    let probs = number_transitions(history, config.transition_window).probabilities();
    let freq = frequency_table(history, config.frequency_window);
    rank_from(from, &probs, &freq, config.blend, top_n)
}

/// Prédiction du prochain numéro à partir du dernier tour observé.
pub fn predict_next(history: &[u8], config: &EngineConfig) -> Vec<Candidate> {
    match history.first() {
        Some(&last) => rank_with_history(history, last, config, config.top_n),
        None => Vec::new(),
    }
}

/// Requête ponctuelle : qu'est-ce qui suit habituellement `selected` ?
pub fn next_after(history: &[u8], selected: u8, config: &EngineConfig) -> Vec<Candidate> {
    rank_with_history(history, selected, config, config.top_n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_empty_prediction() {
        assert!(predict_next(&[], &EngineConfig::default()).is_empty());
        assert!(next_after(&[], 5, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_blend_formula() {
        // Chronologie : 5 → 7 → 5 → 7 → 5
        let history = [5, 7, 5, 7, 5];
        let config = EngineConfig::default();
        let top = predict_next(&history, &config);
        assert_eq!(top.len(), 3);
        // Depuis 5, 7 suit toujours : 40% × 0.4 + 100% × 0.6 = 76
        assert_eq!(top[0].number, 7);
        assert!((top[0].score - 76.0).abs() < 1e-9, "score = {}", top[0].score);
        // 5 : 60% × 0.4 = 24
        assert_eq!(top[1].number, 5);
        assert!((top[1].score - 24.0).abs() < 1e-9);
        // Le reste à zéro : le plus petit numéro d'abord
        assert_eq!(top[2].number, 0);
        assert_eq!(top[2].score, 0.0);
    }

    #[test]
    fn test_tie_break_ascending() {
        // Chronologie : 1 → 20 → 3 ; depuis 3 la ligne est vide, 1/20/3 à égalité de fréquence
        let top = predict_next(&[3, 20, 1], &EngineConfig::default());
        let numbers: Vec<u8> = top.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![1, 3, 20]);
    }

    #[test]
    fn test_deterministic() {
        let history: Vec<u8> = (0..200).map(|i| ((i * 7 + 3) % 37) as u8).collect();
        let config = EngineConfig::default();
        let a = predict_next(&history, &config);
        let b = predict_next(&history, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_next_after_uses_selected_row() {
        // Chronologie : 9 → 30, 12 → 4
        let history = [4, 12, 30, 9];
        let config = EngineConfig::default();
        let after_nine = next_after(&history, 9, &config);
        assert_eq!(after_nine[0].number, 30);
        assert!((after_nine[0].transition - 100.0).abs() < 1e-9);
        let after_twelve = next_after(&history, 12, &config);
        assert_eq!(after_twelve[0].number, 4);
    }

    #[test]
    fn test_top_n_respected() {
        let mut config = EngineConfig::default();
        config.top_n = 5;
        let top = predict_next(&[1, 2, 3], &config);
        assert_eq!(top.len(), 5);
    }

    #[test]
    fn test_sort_by_score() {
        let mut items = vec![(8, 1.0), (2, 3.0), (5, 3.0)];
        sort_by_score(&mut items);
        assert_eq!(items, vec![(2, 3.0), (5, 3.0), (8, 1.0)]);
    }
}
