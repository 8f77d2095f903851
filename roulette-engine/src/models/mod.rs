pub mod blend;
pub mod frequency;
pub mod heat;

use std::collections::HashMap;

use crate::config::EngineConfig;

pub trait ForecastModel: Send + Sync {
    fn name(&self) -> &str;
    /// history[0] = tour le plus récent. Retourne au plus `top_n` numéros,
    /// du plus probable au moins probable ; vide si l'historique est vide.
    fn rank(&self, history: &[u8], top_n: usize) -> Vec<u8>;
    fn params(&self) -> HashMap<String, f64>;
}

pub fn all_models(config: &EngineConfig) -> Vec<Box<dyn ForecastModel>> {
    vec![
        Box::new(blend::BlendModel::from_config(config)),
        Box::new(heat::HeatModel::new(config.heat)),
        Box::new(frequency::FrequencyModel::new(config.frequency_window)),
    ]
}

/// Historique de test déterministe : cycle 0..36 décalé de 7 à chaque pas.
pub fn make_test_history(n: usize) -> Vec<u8> {
    (0..n).map(|i| ((i * 7 + 3) % 37) as u8).collect()
}
