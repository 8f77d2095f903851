use roulette_db::models::{Color, Zone, POCKETS};

/// Matrice de transition d'ordre 1 sur un espace d'états fixe de taille `N`.
///
/// `counts[from][to]` : nombre de fois où l'état `to` a suivi `from`
/// chronologiquement. L'historique étant stocké du plus récent au plus ancien,
/// le tour en position `i` précède celui en position `i - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix<const N: usize> {
    counts: [[u32; N]; N],
}

/// Probabilités en pourcentage, ligne par ligne.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMatrix<const N: usize> {
    cells: [[f64; N]; N],
}

pub type NumberMatrix = TransitionMatrix<POCKETS>;
pub type ZoneMatrix = TransitionMatrix<4>;
pub type ColorMatrix = TransitionMatrix<3>;

impl<const N: usize> TransitionMatrix<N> {
    /// Construit la matrice sur les `window` tours les plus récents.
    pub fn build_with<F>(history: &[u8], window: usize, state: F) -> Self
    where
        F: Fn(u8) -> usize,
    {
        let window = &history[..window.min(history.len())];
        let mut counts = [[0u32; N]; N];

        for i in (1..window.len()).rev() {
            let from = state(window[i]);
            let to = state(window[i - 1]);
            if from < N && to < N {
                counts[from][to] += 1;
            }
        }

        Self { counts }
    }

    pub fn count(&self, from: usize, to: usize) -> u32 {
        self.counts
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0)
    }

    pub fn row_total(&self, from: usize) -> u32 {
        self.counts.get(from).map(|row| row.iter().sum()).unwrap_or(0)
    }

    pub fn total_transitions(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }

    pub fn probabilities(&self) -> ProbabilityMatrix<N> {
        let mut cells = [[0.0f64; N]; N];
        for (from, row) in self.counts.iter().enumerate() {
            let total: u32 = row.iter().sum();
            if total == 0 {
                continue;
            }
            for (to, &c) in row.iter().enumerate() {
                cells[from][to] = c as f64 / total as f64 * 100.0;
            }
        }
        ProbabilityMatrix { cells }
    }
}

impl<const N: usize> ProbabilityMatrix<N> {
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn row(&self, from: usize) -> Option<&[f64; N]> {
        self.cells.get(from)
    }

    /// État suivant le plus probable ; `None` pour une ligne vide.
    /// À égalité, le plus petit indice l'emporte.
    pub fn most_likely(&self, from: usize) -> Option<(usize, f64)> {
        let row = self.cells.get(from)?;
        let mut best: Option<(usize, f64)> = None;
        for (to, &p) in row.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            match best {
                Some((_, bp)) if bp >= p => {}
                _ => best = Some((to, p)),
            }
        }
        best
    }
}

pub fn number_transitions(history: &[u8], window: usize) -> NumberMatrix {
    TransitionMatrix::build_with(history, window, |n| n as usize)
}

pub fn zone_transitions(history: &[u8], window: usize) -> ZoneMatrix {
    TransitionMatrix::build_with(history, window, |n| Zone::of(n).index())
}

pub fn color_transitions(history: &[u8], window: usize) -> ColorMatrix {
    TransitionMatrix::build_with(history, window, |n| Color::of(n).index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_direction_older_to_newer() {
        // 4 est sorti, puis 17
        let m = number_transitions(&[17, 4], 240);
        assert_eq!(m.count(4, 17), 1);
        assert_eq!(m.count(17, 4), 0);
        assert_eq!(m.total_transitions(), 1);
    }

    #[test]
    fn test_direction_three_spins() {
        // Chronologie : 1 → 2 → 3
        let m = number_transitions(&[3, 2, 1], 240);
        assert_eq!(m.count(1, 2), 1);
        assert_eq!(m.count(2, 3), 1);
        assert_eq!(m.count(3, 2), 0);
    }

    #[test]
    fn test_window_bound() {
        let m = number_transitions(&[3, 2, 1], 2);
        assert_eq!(m.total_transitions(), 1);
        assert_eq!(m.count(2, 3), 1);
        assert_eq!(m.count(1, 2), 0);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(number_transitions(&[], 240).total_transitions(), 0);
        assert_eq!(number_transitions(&[5], 240).total_transitions(), 0);
    }

    #[test]
    fn test_zone_matrix() {
        // Chronologie : 0 → 5 (petit) → 30 (grand)
        let m = zone_transitions(&[30, 5, 0], 240);
        assert_eq!(m.count(Zone::Zero.index(), Zone::Small.index()), 1);
        assert_eq!(m.count(Zone::Small.index(), Zone::Large.index()), 1);
    }

    #[test]
    fn test_color_matrix() {
        // Chronologie : 2 (noir) → 1 (rouge) → 0 (vert)
        let m = color_transitions(&[0, 1, 2], 240);
        assert_eq!(m.count(Color::Black.index(), Color::Red.index()), 1);
        assert_eq!(m.count(Color::Red.index(), Color::Green.index()), 1);
    }

    #[test]
    fn test_probabilities_row() {
        // Chronologie : 5 → 7, 5 → 7, 5 → 9
        let m = number_transitions(&[9, 5, 7, 5, 7, 5], 240);
        let p = m.probabilities();
        assert!((p.get(5, 7) - 200.0 / 3.0).abs() < 1e-9);
        assert!((p.get(5, 9) - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(p.most_likely(5), Some((7, p.get(5, 7))));
    }

    #[test]
    fn test_empty_row_is_zero() {
        let p = number_transitions(&[3, 2, 1], 240).probabilities();
        let row = p.row(30).unwrap();
        assert!(row.iter().all(|&x| x == 0.0));
        assert_eq!(p.most_likely(30), None);
    }

    #[test]
    fn test_most_likely_tie_lowest_index() {
        // Chronologie : 5 → 9, 9 → 5, 5 → 3
        let p = number_transitions(&[3, 5, 9, 5], 240).probabilities();
        assert_eq!(p.most_likely(5).map(|x| x.0), Some(3));
    }

    proptest! {
        #[test]
        fn prop_rows_sum_to_100_or_zero(history in proptest::collection::vec(0u8..=36, 0..300)) {
            let m = number_transitions(&history, 240);
            let p = m.probabilities();
            for from in 0..POCKETS {
                let sum: f64 = p.row(from).unwrap().iter().sum();
                if m.row_total(from) == 0 {
                    prop_assert_eq!(sum, 0.0);
                } else {
                    prop_assert!((sum - 100.0).abs() < 1e-9);
                }
            }
        }

        #[test]
        fn prop_transition_count(history in proptest::collection::vec(0u8..=36, 0..300)) {
            let m = zone_transitions(&history, 240);
            let expected = history.len().min(240).saturating_sub(1) as u32;
            prop_assert_eq!(m.total_transitions(), expected);
        }
    }
}
