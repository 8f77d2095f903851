use std::collections::HashMap;

use super::ForecastModel;
use crate::config::HeatParams;
use crate::heat::heat_scores;

pub struct HeatModel {
    params: HeatParams,
}

impl HeatModel {
    pub fn new(params: HeatParams) -> Self {
        Self { params }
    }
}

impl ForecastModel for HeatModel {
    fn name(&self) -> &str {
        "Chaleur"
    }

    fn rank(&self, history: &[u8], top_n: usize) -> Vec<u8> {
        heat_scores(history, &self.params)
            .ranked(top_n)
            .into_iter()
            .map(|(n, _)| n)
            .collect()
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("window".to_string(), self.params.window as f64),
            ("hot_band".to_string(), self.params.hot_band as f64),
            ("hot_share".to_string(), self.params.hot_share),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_number_first() {
        let model = HeatModel::new(HeatParams::default());
        assert_eq!(model.rank(&[12, 3, 3, 12, 12], 2), vec![12, 3]);
    }

    #[test]
    fn test_only_zeros_gives_nothing() {
        let model = HeatModel::new(HeatParams::default());
        assert!(model.rank(&[0, 0], 3).is_empty());
    }
}
