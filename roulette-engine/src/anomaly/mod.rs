//! Détecteurs d'anomalies sur l'historique récent.
//!
//! Chaque détecteur renvoie un [`Signal`] : `Inactive` tant que l'historique est
//! trop court, jamais une valeur par défaut qui passerait pour un vrai résultat.

pub mod chaos;
pub mod imbalance;
pub mod jumping;
pub mod kill_zone;
pub mod omission;

use serde::Serialize;

use roulette_db::models::Range;
use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Signal<T> {
    /// Pas assez de tours exploitables : `available` sur `needed`.
    Inactive { needed: usize, available: usize },
    /// Fenêtre pleine mais composée uniquement de zéros : aucune part calculable.
    #[serde(rename = "only_zeros")]
    OnlyZeros { window: usize },
    Ready(T),
}

impl<T> Signal<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Signal::Ready(v) => Some(v),
            Signal::Inactive { .. } | Signal::OnlyZeros { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Signal::Ready(_))
    }
}

/// Parts (%) de chaque tiers, zéros exclus du dénominateur.
/// `None` si la fenêtre ne contient que des zéros.
pub(crate) fn range_shares(window: &[u8]) -> Option<[f64; 3]> {
    let counts = crate::window::range_counts(window);
    let total: usize = counts.iter().sum();
    if total == 0 {
        return None;
    }
    let mut shares = [0.0f64; 3];
    for (s, &c) in shares.iter_mut().zip(counts.iter()) {
        *s = c as f64 / total as f64 * 100.0;
    }
    Some(shares)
}

pub(crate) fn share_of(shares: &[f64; 3], range: Range) -> f64 {
    shares[range.index()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub kill_zone: Signal<kill_zone::KillZone>,
    pub chaos: Signal<chaos::Chaos>,
    pub omission: Signal<omission::Omission>,
    pub jumping: Signal<jumping::Jumping>,
    pub imbalance: Signal<imbalance::Imbalance>,
    pub imbalance_short: Signal<imbalance::Imbalance>,
}

impl AnomalyReport {
    /// Nombre d'alertes levées parmi les détecteurs actifs.
    pub fn alert_count(&self) -> usize {
        let mut n = 0;
        if self.kill_zone.ready().is_some_and(|k| !k.flagged.is_empty()) {
            n += 1;
        }
        if self.chaos.ready().is_some_and(|c| c.chaotic) {
            n += 1;
        }
        if self.omission.ready().is_some_and(|o| o.flagged().next().is_some()) {
            n += 1;
        }
        if self.jumping.ready().is_some_and(|j| j.jumping) {
            n += 1;
        }
        if self.imbalance.ready().is_some_and(|i| i.unbalanced) {
            n += 1;
        }
        if self.imbalance_short.ready().is_some_and(|i| i.unbalanced) {
            n += 1;
        }
        n
    }
}

pub fn detect_all(history: &[u8], config: &EngineConfig) -> AnomalyReport {
    let im = &config.imbalance;
    AnomalyReport {
        kill_zone: kill_zone::kill_zones(history, &config.kill_zone),
        chaos: chaos::chaos(history, config),
        omission: omission::omission(history, &config.omission),
        jumping: jumping::jumping(history, &config.jumping),
        imbalance: imbalance::imbalance(history, im.window, im.threshold),
        imbalance_short: imbalance::imbalance(history, im.short_window, im.threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_all_inactive() {
        let report = detect_all(&[], &EngineConfig::default());
        assert!(!report.kill_zone.is_ready());
        assert!(!report.chaos.is_ready());
        assert!(!report.omission.is_ready());
        assert!(!report.jumping.is_ready());
        assert!(!report.imbalance.is_ready());
        assert!(!report.imbalance_short.is_ready());
        assert_eq!(report.alert_count(), 0);
    }

    #[test]
    fn test_range_shares_excludes_zero() {
        let shares = range_shares(&[0, 0, 1, 13, 25, 26]).unwrap();
        assert!((share_of(&shares, Range::Large) - 50.0).abs() < 1e-12);
        assert!(range_shares(&[0, 0]).is_none());
    }

    #[test]
    fn test_signal_json_shape() {
        let s: Signal<u8> = Signal::Inactive { needed: 10, available: 3 };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["status"], "inactive");
        assert_eq!(json["value"]["needed"], 10);

        let z: Signal<u8> = Signal::OnlyZeros { window: 8 };
        let json = serde_json::to_value(&z).unwrap();
        assert_eq!(json["status"], "only_zeros");
        assert_eq!(json["value"]["window"], 8);
        assert_eq!(z.ready(), None);
    }

    #[test]
    fn test_detect_all_idempotent() {
        let history = crate::models::make_test_history(60);
        let config = EngineConfig::default();
        assert_eq!(detect_all(&history, &config), detect_all(&history, &config));
    }
}
