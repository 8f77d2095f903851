use serde::Serialize;

use super::Signal;
use crate::backtest::walk_forward_hits;
use crate::config::EngineConfig;
use crate::models::blend::BlendModel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chaos {
    pub tests: usize,
    pub hits: usize,
    pub accuracy: f64,
    pub chaotic: bool,
}

/// Auto-cohérence du prédicteur : rejoue ses prédictions sur les derniers tours.
/// Sous le seuil de précision, la roue est jugée chaotique.
pub fn chaos(history: &[u8], config: &EngineConfig) -> Signal<Chaos> {
    let model = BlendModel::from_config(config);
    let result = walk_forward_hits(&model, history, config.chaos.backtest, config.chaos.top_n);

    let Some(accuracy) = result.hit_rate else {
        return Signal::Inactive {
            needed: 2,
            available: history.len(),
        };
    };

    Signal::Ready(Chaos {
        tests: result.tests,
        hits: result.hits,
        accuracy,
        chaotic: accuracy < config.chaos.threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_with_one_spin() {
        let config = EngineConfig::default();
        assert_eq!(chaos(&[], &config), Signal::Inactive { needed: 2, available: 0 });
        assert_eq!(chaos(&[4], &config), Signal::Inactive { needed: 2, available: 1 });
    }

    #[test]
    fn test_partial_backtest() {
        let config = EngineConfig::default();
        let c = chaos(&[4, 9, 22], &config);
        assert_eq!(c.ready().unwrap().tests, 2);
    }

    #[test]
    fn test_repeating_wheel_not_chaotic() {
        // Un seul numéro : chaque prédiction tombe juste
        let config = EngineConfig::default();
        let h = vec![17u8; 20];
        let c = chaos(&h, &config);
        let c = c.ready().unwrap();
        assert_eq!(c.tests, 5);
        assert_eq!(c.hits, 5);
        assert!(!c.chaotic);
    }

    #[test]
    fn test_never_repeating_is_chaotic() {
        // Chaque cible est un numéro jamais vu auparavant
        let config = EngineConfig::default();
        let h: Vec<u8> = (1..=20).collect();
        let c = chaos(&h, &config);
        let c = c.ready().unwrap();
        assert_eq!(c.hits, 0);
        assert_eq!(c.accuracy, 0.0);
        assert!(c.chaotic);
    }
}
