use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color as CellColor};

use crate::import::ImportResult;
use roulette_db::models::{Color, Spin, SpinSource};
use roulette_engine::anomaly::{AnomalyReport, Signal};
use roulette_engine::backtest::BacktestResult;
use roulette_engine::frequency::HotCold;
use roulette_engine::predictor::Candidate;
use roulette_engine::report::{EngineReport, ZeroReport};
use roulette_engine::transition::TransitionMatrix;
use roulette_engine::window::WindowTally;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn color_cell(text: String, color: Color) -> Cell {
    let fg = match color {
        Color::Red => CellColor::Red,
        Color::Black => CellColor::White,
        Color::Green => CellColor::Green,
    };
    Cell::new(text).fg(fg)
}

fn pct(part: usize, total: usize) -> String {
    if total == 0 {
        "—".to_string()
    } else {
        format!("{:.1} %", part as f64 / total as f64 * 100.0)
    }
}

pub fn display_spins(spins: &[Spin]) {
    if spins.is_empty() {
        println!("Aucun tour à afficher.");
        return;
    }

    let mut table = new_table(vec!["#", "Numéro", "Couleur", "Parité", "Tiers", "Source", "Lot"]);
    for spin in spins {
        table.add_row(vec![
            Cell::new(spin.spin_index),
            color_cell(format!("{:2}", spin.outcome), spin.color),
            Cell::new(spin.color.to_string()),
            Cell::new(spin.parity.map(|p| p.to_string()).unwrap_or_else(|| "—".into())),
            Cell::new(spin.range.map(|r| r.to_string()).unwrap_or_else(|| "—".into())),
            Cell::new(spin.source.to_string()),
            Cell::new(spin.batch_id.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
}

pub fn display_added(spin: &Spin) {
    let tag = match spin.source {
        SpinSource::Live => String::new(),
        SpinSource::Replay => format!(" [{}]", spin.batch_id.as_deref().unwrap_or("?")),
    };
    println!("Tour #{} : {} {}{}", spin.spin_index, spin.outcome, spin.color, tag);
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lus         : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    if result.skipped > 0 {
        println!("  Doublons ignorés  : {}", result.skipped);
    }
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_tally(title: &str, tally: &WindowTally) {
    println!("\n── {} ({} tours) ──", title, tally.total);
    let non_zero = tally.non_zero();
    let mut table = new_table(vec!["Catégorie", "Nombre", "Part"]);
    let rows = [
        ("Rouge", tally.red, tally.total),
        ("Noir", tally.black, tally.total),
        ("Zéro", tally.green, tally.total),
        ("Impair", tally.odd, non_zero),
        ("Pair", tally.even, non_zero),
        ("Petit (1-12)", tally.small, non_zero),
        ("Moyen (13-24)", tally.mid, non_zero),
        ("Grand (25-36)", tally.large, non_zero),
    ];
    for (label, count, total) in rows {
        table.add_row(vec![label.to_string(), count.to_string(), pct(count, total)]);
    }
    println!("{table}");
    println!("Zéro absent depuis {} tours dans la fenêtre", tally.zero_miss);
}

pub fn display_zero(zero: &ZeroReport) {
    println!("\n── Zéro ──");
    println!("  Absent depuis     : {} tours", zero.stats.miss);
    println!("  Zéros observés    : {}", zero.stats.zero_count);
    match zero.stats.average_gap {
        Some(gap) => println!("  Écart moyen       : {:.1}", gap),
        None => println!("  Écart moyen       : — (moins de deux zéros)"),
    }
    println!("  Écart attendu     : {:.1}", zero.expected_gap);
    println!("  Pression          : {:.2}", zero.pressure);
}

pub fn display_heat(heat: &[(u8, f64)]) {
    println!("\n── Numéros chauds (pondération récente) ──");
    if heat.is_empty() {
        println!("Aucun numéro chaud.");
        return;
    }
    let mut table = new_table(vec!["Numéro", "Chaleur"]);
    for &(n, score) in heat {
        table.add_row(vec![
            color_cell(format!("{:2}", n), Color::of(n)),
            Cell::new(format!("{:.4}", score)),
        ]);
    }
    println!("{table}");
}

pub fn display_hot_cold(hc: &HotCold, window: usize) {
    let join = |v: &[u8]| v.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
    println!("\nSur les {} derniers tours :", window);
    println!("  Chauds : {}", join(&hc.hot));
    println!("  Froids : {}", join(&hc.cold));
}

pub fn display_predictions(title: &str, candidates: &[Candidate]) {
    println!("\n🎯 {}\n", title);
    if candidates.is_empty() {
        println!("Historique vide : aucune prédiction.");
        return;
    }
    let mut table = new_table(vec!["#", "Numéro", "Score", "Fréquence", "Transition"]);
    for (i, c) in candidates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            color_cell(format!("{:2}", c.number), Color::of(c.number)),
            Cell::new(format!("{:.2}", c.score)),
            Cell::new(format!("{:.2} %", c.frequency)),
            Cell::new(format!("{:.2} %", c.transition)),
        ]);
    }
    println!("{table}");
}

/// Matrice complète, pour les petits espaces d'états (zones, couleurs).
pub fn display_matrix<const N: usize>(matrix: &TransitionMatrix<N>, labels: &[String]) {
    let probs = matrix.probabilities();
    let mut header = vec!["De \\ Vers".to_string()];
    header.extend(labels.iter().cloned());
    header.push("Total".to_string());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (from, label) in labels.iter().enumerate().take(N) {
        let mut row = vec![label.clone()];
        for to in 0..N {
            row.push(format!("{:.1} % ({})", probs.get(from, to), matrix.count(from, to)));
        }
        row.push(matrix.row_total(from).to_string());
        table.add_row(row);
    }
    println!("{table}");
    println!("{} transitions observées", matrix.total_transitions());
}

/// Une seule ligne, triée par probabilité décroissante.
pub fn display_matrix_row<const N: usize>(matrix: &TransitionMatrix<N>, labels: &[String], from: usize) {
    let probs = matrix.probabilities();
    let Some(row) = probs.row(from) else {
        println!("État inconnu.");
        return;
    };
    let label = labels.get(from).map(String::as_str).unwrap_or("?");
    if matrix.row_total(from) == 0 {
        println!("Aucune transition observée depuis {}.", label);
        return;
    }

    let mut cells: Vec<(usize, f64)> = row.iter().copied().enumerate().filter(|&(_, p)| p > 0.0).collect();
    cells.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    println!("\nDepuis {} ({} transitions) :", label, matrix.row_total(from));
    let mut table = new_table(vec!["Vers", "Probabilité", "Nombre"]);
    for (to, p) in cells {
        table.add_row(vec![
            labels.get(to).cloned().unwrap_or_default(),
            format!("{:.1} %", p),
            matrix.count(from, to).to_string(),
        ]);
    }
    println!("{table}");
}

/// Résumé par ligne : suite la plus fréquente de chaque état observé.
pub fn display_matrix_summary<const N: usize>(matrix: &TransitionMatrix<N>, labels: &[String]) {
    let probs = matrix.probabilities();
    let mut table = new_table(vec!["De", "Transitions", "Suite la plus probable", "Probabilité"]);
    for from in 0..N {
        if let Some((to, p)) = probs.most_likely(from) {
            table.add_row(vec![
                labels.get(from).cloned().unwrap_or_default(),
                matrix.row_total(from).to_string(),
                labels.get(to).cloned().unwrap_or_default(),
                format!("{:.1} %", p),
            ]);
        }
    }
    println!("{table}");
    println!("{} transitions observées", matrix.total_transitions());
}

fn not_ready<T>(signal: &Signal<T>) -> String {
    match signal {
        Signal::Inactive { needed, available } => format!("inactif ({}/{} tours)", available, needed),
        Signal::OnlyZeros { window } => format!("inactif (que des zéros sur {} tours)", window),
        Signal::Ready(_) => String::new(),
    }
}

fn status_cell(alert: bool) -> Cell {
    if alert {
        Cell::new("⚠ ALERTE").fg(CellColor::Red)
    } else {
        Cell::new("ok").fg(CellColor::Green)
    }
}

fn shares_text(shares: &[f64; 3]) -> String {
    format!("P {:.0} % · M {:.0} % · G {:.0} %", shares[0], shares[1], shares[2])
}

pub fn display_alerts(report: &AnomalyReport) {
    println!("\n🚨 Anomalies ({} alerte(s))\n", report.alert_count());
    let mut table = new_table(vec!["Détecteur", "État", "Détail"]);

    match &report.kill_zone {
        Signal::Ready(k) => {
            let flagged = k.flagged.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
            table.add_row(vec![
                Cell::new("Zone morte"),
                status_cell(!k.flagged.is_empty()),
                Cell::new(format!("{} {}", shares_text(&k.shares), flagged)),
            ]);
        }
        other => {
            table.add_row(vec![Cell::new("Zone morte"), Cell::new(not_ready(other)), Cell::new("")]);
        }
    }

    match &report.chaos {
        Signal::Ready(c) => {
            table.add_row(vec![
                Cell::new("Chaos"),
                status_cell(c.chaotic),
                Cell::new(format!("{}/{} prédictions justes ({:.0} %)", c.hits, c.tests, c.accuracy * 100.0)),
            ]);
        }
        other => {
            table.add_row(vec![Cell::new("Chaos"), Cell::new(not_ready(other)), Cell::new("")]);
        }
    }

    match &report.omission {
        Signal::Ready(o) => {
            let detail = o
                .zones
                .iter()
                .map(|z| match z.level {
                    Some(level) => format!("{} {} ({})", z.zone, z.count, level),
                    None => format!("{} {}", z.zone, z.count),
                })
                .collect::<Vec<_>>()
                .join(" · ");
            table.add_row(vec![
                Cell::new("Omission"),
                status_cell(o.flagged().next().is_some()),
                Cell::new(detail),
            ]);
        }
        other => {
            table.add_row(vec![Cell::new("Omission"), Cell::new(not_ready(other)), Cell::new("")]);
        }
    }

    match &report.jumping {
        Signal::Ready(j) => {
            let seq = j.ranges.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(" → ");
            table.add_row(vec![Cell::new("Sauts"), status_cell(j.jumping), Cell::new(seq)]);
        }
        other => {
            table.add_row(vec![Cell::new("Sauts"), Cell::new(not_ready(other)), Cell::new("")]);
        }
    }

    for signal in [&report.imbalance, &report.imbalance_short] {
        match signal {
            Signal::Ready(i) => {
                table.add_row(vec![
                    Cell::new(format!("Déséquilibre ({})", i.window)),
                    status_cell(i.unbalanced),
                    Cell::new(format!("{} dominant : {}", shares_text(&i.shares), i.dominant)),
                ]);
            }
            Signal::Inactive { needed: window, .. } | Signal::OnlyZeros { window } => {
                table.add_row(vec![
                    Cell::new(format!("Déséquilibre ({})", window)),
                    Cell::new(not_ready(signal)),
                    Cell::new(""),
                ]);
            }
        }
    }

    println!("{table}");
}

pub fn display_backtest(results: &[BacktestResult], uniform: f64) {
    println!("\n📈 Backtest walk-forward (hasard : {:.1} %)\n", uniform * 100.0);
    let mut table = new_table(vec!["Modèle", "Paramètres", "Tests", "Réussites", "Taux", "vs hasard"]);
    for r in results {
        let (rate, delta) = match r.hit_rate {
            Some(rate) => (
                format!("{:.1} %", rate * 100.0),
                format!("{:+.1} pts", (rate - uniform) * 100.0),
            ),
            None => ("—".to_string(), "—".to_string()),
        };
        let params = r
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![
            r.model_name.clone(),
            params,
            r.tests.to_string(),
            r.hits.to_string(),
            rate,
            delta,
        ]);
    }
    println!("{table}");
}

pub fn display_report(report: &EngineReport, hot_cold_window: usize) {
    match report.last {
        Some(n) => println!("{} tours enregistrés, dernier : {} {}", report.spins, n, Color::of(n)),
        None => {
            println!("Historique vide.");
            return;
        }
    }
    display_tally("Récents", &report.recent);
    display_tally("Statistiques", &report.stats);
    display_zero(&report.zero);
    display_heat(&report.heat);
    display_hot_cold(&report.hot_cold, hot_cold_window);
    display_predictions("Prochain numéro", &report.predictions);
    if let Some(z) = &report.next_zone {
        println!("Zone suivante probable   : {} ({:.1} %)", z.state, z.probability);
    }
    if let Some(c) = &report.next_color {
        println!("Couleur suivante probable : {} ({:.1} %)", c.state, c.probability);
    }
    display_alerts(&report.anomalies);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_texts() {
        let short: Signal<u8> = Signal::Inactive { needed: 10, available: 3 };
        assert_eq!(not_ready(&short), "inactif (3/10 tours)");
        let zeros: Signal<u8> = Signal::OnlyZeros { window: 10 };
        assert_eq!(not_ready(&zeros), "inactif (que des zéros sur 10 tours)");
    }
}
