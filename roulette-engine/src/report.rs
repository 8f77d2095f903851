use serde::Serialize;

use roulette_db::models::{Color, Zone};
use crate::anomaly::{detect_all, AnomalyReport};
use crate::config::EngineConfig;
use crate::frequency::{hot_cold, HotCold};
use crate::heat::heat_scores;
use crate::predictor::{predict_next, Candidate};
use crate::transition::{color_transitions, zone_transitions};
use crate::window::{tally, WindowTally};
use crate::zero::{expected_gap, zero_pressure, zero_stats, ZeroStats};

const HEAT_TOP: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroReport {
    #[serde(flatten)]
    pub stats: ZeroStats,
    pub expected_gap: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Likely<T> {
    pub state: T,
    pub probability: f64,
}

/// Instantané complet de l'analyse, recalculé à chaque appel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineReport {
    pub spins: usize,
    pub last: Option<u8>,
    pub recent: WindowTally,
    pub stats: WindowTally,
    pub zero: ZeroReport,
    pub heat: Vec<(u8, f64)>,
    pub hot_cold: HotCold,
    pub predictions: Vec<Candidate>,
    pub next_zone: Option<Likely<Zone>>,
    pub next_color: Option<Likely<Color>>,
    pub anomalies: AnomalyReport,
}

impl EngineReport {
    pub fn compute(history: &[u8], config: &EngineConfig) -> Self {
        let last = history.first().copied();

        let next_zone = last.and_then(|n| {
            zone_transitions(history, config.transition_window)
                .probabilities()
                .most_likely(Zone::of(n).index())
                .map(|(i, p)| Likely { state: Zone::ALL[i], probability: p })
        });
        let next_color = last.and_then(|n| {
            color_transitions(history, config.transition_window)
                .probabilities()
                .most_likely(Color::of(n).index())
                .map(|(i, p)| Likely { state: Color::ALL[i], probability: p })
        });

        EngineReport {
            spins: history.len(),
            last,
            recent: tally(history, config.recent_window),
            stats: tally(history, config.stats_window),
            zero: ZeroReport {
                stats: zero_stats(history),
                expected_gap: expected_gap(history, config.expected_gap),
                pressure: zero_pressure(history, config.expected_gap),
            },
            heat: heat_scores(history, &config.heat).ranked(HEAT_TOP),
            hot_cold: hot_cold(history, config.hot_cold.window, config.hot_cold.count),
            predictions: predict_next(history, config),
            next_zone,
            next_color,
            anomalies: detect_all(history, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let r = EngineReport::compute(&[], &EngineConfig::default());
        assert_eq!(r.spins, 0);
        assert!(r.last.is_none());
        assert!(r.predictions.is_empty());
        assert!(r.next_zone.is_none());
        assert!(r.heat.is_empty());
        assert_eq!(r.zero.stats.miss, 0);
        assert_eq!(r.anomalies.alert_count(), 0);
    }

    #[test]
    fn test_next_zone_follows_transitions() {
        // Chronologie : 5 → 14 → 5 → 14 → 5 ; depuis un petit, toujours un moyen
        let h = [5, 14, 5, 14, 5];
        let r = EngineReport::compute(&h, &EngineConfig::default());
        let z = r.next_zone.unwrap();
        assert_eq!(z.state, Zone::Mid);
        assert!((z.probability - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_report_serializes() {
        let history = crate::models::make_test_history(80);
        let r = EngineReport::compute(&history, &EngineConfig::default());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["spins"], 80);
        assert!(json["zero"]["miss"].is_number());
        assert_eq!(json["anomalies"]["kill_zone"]["status"], "ready");
        assert_eq!(json["predictions"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_report_idempotent() {
        let history = crate::models::make_test_history(50);
        let config = EngineConfig::default();
        assert_eq!(
            EngineReport::compute(&history, &config),
            EngineReport::compute(&history, &config)
        );
    }
}
