use serde::Serialize;

use roulette_db::models::POCKETS;
use crate::models::ForecastModel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub model_name: String,
    pub tests: usize,
    pub hits: usize,
    /// `None` quand aucun test n'a pu être joué.
    pub hit_rate: Option<f64>,
    /// Paramètres du modèle, triés par nom.
    pub params: Vec<(String, f64)>,
}

/// Walk-forward : pour chaque tour cible t (0 = le plus récent), le modèle ne voit
/// que history[t+1..] et doit placer history[t] dans son top `top_n`.
///
/// Aucune fuite du futur : le tour cible et tout ce qui le suit sont invisibles.
pub fn walk_forward_hits(
    model: &dyn ForecastModel,
    history: &[u8],
    depth: usize,
    top_n: usize,
) -> BacktestResult {
    let tests = depth.min(history.len().saturating_sub(1));
    let mut hits = 0usize;

    for t in 0..tests {
        let past = &history[t + 1..];
        let ranked = model.rank(past, top_n);
        if ranked.contains(&history[t]) {
            hits += 1;
        }
    }

    let mut params: Vec<(String, f64)> = model.params().into_iter().collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));

    BacktestResult {
        model_name: model.name().to_string(),
        tests,
        hits,
        hit_rate: (tests > 0).then(|| hits as f64 / tests as f64),
        params,
    }
}

/// Taux de réussite d'un choix au hasard de `top_n` numéros.
pub fn uniform_hit_rate(top_n: usize) -> f64 {
    top_n.min(POCKETS) as f64 / POCKETS as f64
}

/// Rejoue chaque modèle ; `on_done` est appelé après chacun (barre de progression).
pub fn backtest_models<F>(
    models: &[Box<dyn ForecastModel>],
    history: &[u8],
    depth: usize,
    top_n: usize,
    mut on_done: F,
) -> Vec<BacktestResult>
where
    F: FnMut(&BacktestResult),
{
    models
        .iter()
        .map(|m| {
            let result = walk_forward_hits(m.as_ref(), history, depth, top_n);
            on_done(&result);
            result
        })
        .collect()
}
