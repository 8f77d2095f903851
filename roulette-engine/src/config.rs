use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Fenêtre nulle : {0}")]
    EmptyWindow(&'static str),

    #[error("Valeur hors de [0, 1] : {field} = {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("Bande chaude ({hot_band}) >= fenêtre de chaleur ({window})")]
    HotBandTooWide { hot_band: usize, window: usize },

    #[error("Seuils d'omission incohérents : alerte {alert} > sévère {severe}")]
    OmissionThresholds { alert: usize, severe: usize },

    #[error("Seuil en pourcentage hors de [0, 100] : {field} = {value}")]
    OutOfPercentRange { field: &'static str, value: f64 },
}

/// Convention retenue pour « l'écart attendu » entre deux zéros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExpectedGap {
    /// Toujours 37 (roue à un zéro, tirage uniforme).
    Theoretical,
    /// Écart moyen observé dans les `window` derniers tours, 37 s'il y a moins de deux zéros.
    Empirical { window: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatParams {
    pub window: usize,
    pub hot_band: usize,
    /// Part du poids total attribuée à la bande chaude.
    pub hot_share: f64,
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            window: 50,
            hot_band: 10,
            hot_share: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub frequency: f64,
    pub transition: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            frequency: 0.4,
            transition: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotColdParams {
    pub window: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillZoneParams {
    pub window: usize,
    /// Pourcentage sous lequel un tiers est déclaré « zone morte ».
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaosParams {
    pub backtest: usize,
    pub top_n: usize,
    /// Précision (0-1) sous laquelle la roue est jugée chaotique.
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OmissionParams {
    pub alert: usize,
    pub severe: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpingParams {
    pub window: usize,
    pub min_variety: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceParams {
    pub window: usize,
    pub short_window: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub recent_window: usize,
    pub stats_window: usize,
    pub heat: HeatParams,
    pub transition_window: usize,
    pub frequency_window: usize,
    pub blend: BlendWeights,
    pub top_n: usize,
    pub expected_gap: ExpectedGap,
    pub hot_cold: HotColdParams,
    pub kill_zone: KillZoneParams,
    pub chaos: ChaosParams,
    pub omission: OmissionParams,
    pub jumping: JumpingParams,
    pub imbalance: ImbalanceParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recent_window: 20,
            stats_window: 120,
            heat: HeatParams::default(),
            transition_window: 240,
            frequency_window: 240,
            blend: BlendWeights::default(),
            top_n: 3,
            expected_gap: ExpectedGap::Empirical { window: 120 },
            hot_cold: HotColdParams { window: 240, count: 4 },
            kill_zone: KillZoneParams { window: 10, threshold: 20.0 },
            chaos: ChaosParams { backtest: 5, top_n: 3, threshold: 0.2 },
            omission: OmissionParams { alert: 8, severe: 12 },
            jumping: JumpingParams { window: 5, min_variety: 3 },
            imbalance: ImbalanceParams { window: 30, short_window: 8, threshold: 60.0 },
        }
    }
}

fn non_empty(value: usize, name: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::EmptyWindow(name));
    }
    Ok(())
}

fn unit(value: f64, field: &'static str) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { field, value });
    }
    Ok(())
}

fn percent(value: f64, field: &'static str) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::OutOfPercentRange { field, value });
    }
    Ok(())
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty(self.recent_window, "recent_window")?;
        non_empty(self.stats_window, "stats_window")?;
        non_empty(self.heat.window, "heat.window")?;
        non_empty(self.heat.hot_band, "heat.hot_band")?;
        non_empty(self.transition_window, "transition_window")?;
        non_empty(self.frequency_window, "frequency_window")?;
        non_empty(self.top_n, "top_n")?;
        non_empty(self.hot_cold.window, "hot_cold.window")?;
        non_empty(self.kill_zone.window, "kill_zone.window")?;
        non_empty(self.chaos.backtest, "chaos.backtest")?;
        non_empty(self.chaos.top_n, "chaos.top_n")?;
        non_empty(self.jumping.window, "jumping.window")?;
        non_empty(self.imbalance.window, "imbalance.window")?;
        non_empty(self.imbalance.short_window, "imbalance.short_window")?;
        if let ExpectedGap::Empirical { window } = self.expected_gap {
            non_empty(window, "expected_gap.window")?;
        }

        if self.heat.hot_band >= self.heat.window {
            return Err(ConfigError::HotBandTooWide {
                hot_band: self.heat.hot_band,
                window: self.heat.window,
            });
        }
        unit(self.heat.hot_share, "heat.hot_share")?;
        unit(self.blend.frequency, "blend.frequency")?;
        unit(self.blend.transition, "blend.transition")?;
        unit(self.chaos.threshold, "chaos.threshold")?;
        percent(self.kill_zone.threshold, "kill_zone.threshold")?;
        percent(self.imbalance.threshold, "imbalance.threshold")?;

        if self.omission.alert > self.omission.severe {
            return Err(ConfigError::OmissionThresholds {
                alert: self.omission.alert,
                severe: self.omission.severe,
            });
        }
        Ok(())
    }
}

pub fn save_config(config: &EngineConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

pub fn load_config(path: &std::path::Path) -> anyhow::Result<EngineConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let config: EngineConfig = serde_json::from_str(&json)
        .with_context(|| format!("Configuration illisible {:?}", path))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.transition_window, 240);
        assert_eq!(config.top_n, 3);
        assert!((config.blend.frequency - 0.4).abs() < 1e-12);
        assert!((config.blend.transition - 0.6).abs() < 1e-12);
        assert_eq!(config.expected_gap, ExpectedGap::Empirical { window: 120 });
    }

    #[test]
    fn test_rejects_hot_band_wider_than_window() {
        let mut config = EngineConfig::default();
        config.heat.hot_band = 50;
        assert!(matches!(config.validate(), Err(ConfigError::HotBandTooWide { .. })));
    }

    #[test]
    fn test_rejects_zero_window() {
        let mut config = EngineConfig::default();
        config.transition_window = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyWindow("transition_window")));
    }

    #[test]
    fn test_rejects_inverted_omission_thresholds() {
        let mut config = EngineConfig::default();
        config.omission = OmissionParams { alert: 13, severe: 12 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_share_above_one() {
        let mut config = EngineConfig::default();
        config.blend.transition = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfUnitRange { .. })));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"top_n": 5}"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.transition_window, 240);
    }

    #[test]
    fn test_expected_gap_json_tagged() {
        let json = serde_json::to_string(&ExpectedGap::Theoretical).unwrap();
        assert_eq!(json, r#"{"mode":"theoretical"}"#);
        let gap: ExpectedGap = serde_json::from_str(r#"{"mode":"empirical","window":60}"#).unwrap();
        assert_eq!(gap, ExpectedGap::Empirical { window: 60 });
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roulette.json");
        let mut config = EngineConfig::default();
        config.expected_gap = ExpectedGap::Theoretical;
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"top_n": 0}"#).unwrap();
        assert!(load_config(&path).is_err());
    }
}
