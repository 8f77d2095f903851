use roulette_db::models::POCKETS;
use serde::Serialize;

/// Fréquence en pourcentage de chaque numéro 0-36 sur une fenêtre récente.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    percents: [f64; POCKETS],
    pub sample: usize,
}

impl FrequencyTable {
    pub fn get(&self, number: u8) -> f64 {
        self.percents.get(number as usize).copied().unwrap_or(0.0)
    }

    pub fn percents(&self) -> &[f64; POCKETS] {
        &self.percents
    }
}

pub(crate) fn counts(window: &[u8]) -> [u32; POCKETS] {
    let mut counts = [0u32; POCKETS];
    for &n in window {
        if (n as usize) < POCKETS {
            counts[n as usize] += 1;
        }
    }
    counts
}

pub fn frequency_table(history: &[u8], window: usize) -> FrequencyTable {
    let window = &history[..window.min(history.len())];
    let counts = counts(window);
    let mut percents = [0.0f64; POCKETS];
    if !window.is_empty() {
        let total = window.len() as f64;
        for (p, &c) in percents.iter_mut().zip(counts.iter()) {
            *p = c as f64 / total * 100.0;
        }
    }
    FrequencyTable {
        percents,
        sample: window.len(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HotCold {
    pub hot: Vec<u8>,
    pub cold: Vec<u8>,
}

/// Numéros chauds / froids (1-36) par simple comptage sur la fenêtre.
pub fn hot_cold(history: &[u8], window: usize, count: usize) -> HotCold {
    if history.is_empty() {
        return HotCold::default();
    }
    let counts = counts(&history[..window.min(history.len())]);
    let mut numbers: Vec<(u8, u32)> = (1..POCKETS as u8)
        .map(|n| (n, counts[n as usize]))
        .collect();

    numbers.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let hot = numbers.iter().take(count).map(|&(n, _)| n).collect();

    numbers.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    let cold = numbers.iter().take(count).map(|&(n, _)| n).collect();

    HotCold { hot, cold }
}
