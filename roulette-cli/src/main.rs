mod display;
mod import;
mod pad;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use roulette_db::db::{
    append_spin, clear, count_replay_by_batch, count_spins, db_path, fetch_last, fetch_outcomes,
    migrate, next_spin_index, open_db, remove_front, remove_last_replay,
};
use roulette_db::models::{parse_outcome, Color, SpinSource, Zone, POCKETS};
use roulette_db::rusqlite::Connection;
use roulette_engine::anomaly::detect_all;
use roulette_engine::backtest::{backtest_models, uniform_hit_rate};
use roulette_engine::config::{load_config, save_config};
use roulette_engine::frequency::hot_cold;
use roulette_engine::heat::heat_scores;
use roulette_engine::models::all_models;
use roulette_engine::predictor::{next_after, predict_next};
use roulette_engine::report::ZeroReport;
use roulette_engine::transition::{color_transitions, number_transitions, zone_transitions};
use roulette_engine::window::tally;
use roulette_engine::zero::{expected_gap, zero_pressure, zero_stats};
use roulette_engine::{EngineConfig, EngineReport};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MatrixKind {
    Number,
    Zone,
    Color,
}

#[derive(Parser)]
#[command(name = "roulette", about = "Suivi et analyse des tirages de roulette")]
struct Cli {
    /// Fichier de configuration du moteur (JSON)
    #[arg(long, global = true, default_value = "roulette.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enregistrer un ou plusieurs tours en direct
    Add {
        /// Numéros (0-36), du plus ancien au plus récent
        #[arg(required = true)]
        numbers: Vec<String>,
    },

    /// Rattraper des tours manqués (lot de rattrapage)
    Replay {
        /// Numéros (0-36), du plus ancien au plus récent
        #[arg(required = true)]
        numbers: Vec<String>,

        /// Identifiant du lot (défaut : AAAA-MM-JJ_A1)
        #[arg(short, long)]
        batch: Option<String>,
    },

    /// Annuler le dernier tour, quelle que soit sa source
    Undo,

    /// Annuler le dernier tour de rattrapage
    UndoReplay,

    /// Vider tout l'historique
    Clear {
        /// Confirmer la suppression
        #[arg(long)]
        yes: bool,
    },

    /// Lister les derniers tours
    List {
        /// Nombre de tours à afficher
        #[arg(short, long, default_value = "20")]
        last: u32,
    },

    /// Décomptes couleur / parité / tiers
    Stats {
        /// Fenêtre d'analyse (défaut : configuration)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Statistiques du zéro
    Zero,

    /// Numéros chauds (pondération récente) et chauds / froids par comptage
    Heat {
        /// Nombre de numéros à afficher
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Prédire le prochain numéro
    Predict {
        /// Nombre de candidats (défaut : configuration)
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Qu'est-ce qui suit habituellement un numéro ?
    NextAfter {
        /// Numéro de départ (0-36)
        number: String,
    },

    /// Matrice de transition
    Matrix {
        /// Espace d'états
        #[arg(value_enum)]
        kind: MatrixKind,

        /// État de départ (numéro, zone ou couleur)
        #[arg(short, long)]
        from: Option<String>,
    },

    /// Détecteurs d'anomalies
    Alerts,

    /// Rapport complet
    Report {
        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Backtest walk-forward de tous les modèles
    Backtest {
        /// Nombre de tours rejoués
        #[arg(short, long, default_value = "100")]
        depth: usize,
    },

    /// Générer des tours aléatoires (lot de rattrapage de démonstration)
    Simulate {
        /// Nombre de tours
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Importer un CSV (ajout) ou un dump JSON (remplacement)
    Import {
        /// Chemin vers le fichier (.csv ou .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Identifiant du lot pour un CSV (défaut : AAAA-MM-JJ_A1)
        #[arg(short, long)]
        batch: Option<String>,
    },

    /// Exporter l'historique en JSON
    Export {
        /// Fichier de destination
        #[arg(short, long, default_value = "roulette-export.json")]
        file: PathBuf,
    },

    /// Afficher la configuration effective
    Config {
        /// Écrire la configuration dans le fichier --config
        #[arg(long)]
        write: bool,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Pavé de saisie interactif
    Pad,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration du fichier si présente et valide, sinon les valeurs par défaut.
fn engine_config(path: &Path) -> EngineConfig {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "pas de fichier de configuration");
        return EngineConfig::default();
    }
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "configuration ignorée, valeurs par défaut");
            EngineConfig::default()
        }
    }
}

fn default_batch_id() -> String {
    format!("{}_A1", chrono::Local::now().format("%Y-%m-%d"))
}

fn parse_numbers(raw: &[String]) -> Result<Vec<u8>> {
    raw.iter().map(|s| parse_outcome(s)).collect()
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = engine_config(&cli.config);

    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Add { numbers } => cmd_add(&conn, &numbers),
        Command::Replay { numbers, batch } => cmd_replay(&conn, &numbers, batch),
        Command::Undo => cmd_undo(&conn),
        Command::UndoReplay => cmd_undo_replay(&conn),
        Command::Clear { yes } => cmd_clear(&conn, yes),
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window } => cmd_stats(&conn, &config, window),
        Command::Zero => cmd_zero(&conn, &config),
        Command::Heat { top } => cmd_heat(&conn, &config, top),
        Command::Predict { top } => cmd_predict(&conn, &config, top),
        Command::NextAfter { number } => cmd_next_after(&conn, &config, &number),
        Command::Matrix { kind, from } => cmd_matrix(&conn, &config, kind, from.as_deref()),
        Command::Alerts => cmd_alerts(&conn, &config),
        Command::Report { json } => cmd_report(&conn, &config, json),
        Command::Backtest { depth } => cmd_backtest(&conn, &config, depth),
        Command::Simulate { count, seed } => cmd_simulate(&conn, count, seed),
        Command::Import { file, batch } => cmd_import(&conn, &file, batch),
        Command::Export { file } => cmd_export(&conn, &file),
        Command::Config { write } => cmd_config(&config, &cli.config, write),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Pad => pad::run_pad(&conn, &config),
    }
}

fn history_or_hint(conn: &Connection) -> Result<Option<Vec<u8>>> {
    if count_spins(conn)? == 0 {
        println!("Historique vide. Lancez d'abord : roulette add <numéro> (ou roulette pad)");
        return Ok(None);
    }
    Ok(Some(fetch_outcomes(conn, None)?))
}

fn cmd_add(conn: &Connection, raw: &[String]) -> Result<()> {
    let numbers = parse_numbers(raw)?;
    for n in numbers {
        let spin = append_spin(conn, i64::from(n), SpinSource::Live, None)?;
        display::display_added(&spin);
    }
    Ok(())
}

fn cmd_replay(conn: &Connection, raw: &[String], batch: Option<String>) -> Result<()> {
    let numbers = parse_numbers(raw)?;
    let batch = batch.unwrap_or_else(default_batch_id);
    for n in numbers {
        let spin = append_spin(conn, i64::from(n), SpinSource::Replay, Some(&batch))?;
        display::display_added(&spin);
    }
    println!(
        "Lot {} : {} rattrapage(s), prochain tour #{}",
        batch,
        count_replay_by_batch(conn, &batch)?,
        next_spin_index(conn)?
    );
    Ok(())
}

fn cmd_undo(conn: &Connection) -> Result<()> {
    match remove_front(conn)? {
        Some(spin) => println!("Annulé : tour #{} ({} {})", spin.spin_index, spin.outcome, spin.color),
        None => println!("Historique vide, rien à annuler."),
    }
    Ok(())
}

fn cmd_undo_replay(conn: &Connection) -> Result<()> {
    match remove_last_replay(conn)? {
        Some(spin) => println!(
            "Rattrapage annulé : tour #{} ({} {}) du lot {}",
            spin.spin_index,
            spin.outcome,
            spin.color,
            spin.batch_id.as_deref().unwrap_or("?")
        ),
        None => println!("Aucun rattrapage à annuler."),
    }
    Ok(())
}

fn cmd_clear(conn: &Connection, yes: bool) -> Result<()> {
    if !yes {
        bail!("Suppression non confirmée : relancez avec --yes");
    }
    let removed = clear(conn)?;
    println!("{} tour(s) supprimé(s).", removed);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let spins = fetch_last(conn, last)?;
    display::display_spins(&spins);
    Ok(())
}

fn cmd_stats(conn: &Connection, config: &EngineConfig, window: Option<usize>) -> Result<()> {
    let Some(history) = history_or_hint(conn)? else {
        return Ok(());
    };
    match window {
        Some(w) => display::display_tally("Fenêtre", &tally(&history, w)),
        None => {
            display::display_tally("Récents", &tally(&history, config.recent_window));
            display::display_tally("Statistiques", &tally(&history, config.stats_window));
        }
    }
    Ok(())
}

fn cmd_zero(conn: &Connection, config: &EngineConfig) -> Result<()> {
    let Some(history) = history_or_hint(conn)? else {
        return Ok(());
    };
    let report = ZeroReport {
        stats: zero_stats(&history),
        expected_gap: expected_gap(&history, config.expected_gap),
        pressure: zero_pressure(&history, config.expected_gap),
    };
    display::display_zero(&report);
    Ok(())
}

fn cmd_heat(conn: &Connection, config: &EngineConfig, top: usize) -> Result<()> {
    let Some(history) = history_or_hint(conn)? else {
        return Ok(());
    };
    display::display_heat(&heat_scores(&history, &config.heat).ranked(top));
    let hc = hot_cold(&history, config.hot_cold.window, config.hot_cold.count);
    display::display_hot_cold(&hc, config.hot_cold.window.min(history.len()));
    Ok(())
}

fn cmd_predict(conn: &Connection, config: &EngineConfig, top: Option<usize>) -> Result<()> {
    let Some(history) = history_or_hint(conn)? else {
        return Ok(());
    };
    let mut config = config.clone();
    if let Some(top) = top {
        config.top_n = top;
    }
    let candidates = predict_next(&history, &config);
    display::display_predictions(
        &format!("Après le dernier tour ({})", history[0]),
        &candidates,
    );
    Ok(())
}

fn cmd_next_after(conn: &Connection, config: &EngineConfig, raw: &str) -> Result<()> {
    let selected = parse_outcome(raw)?;
    let Some(history) = history_or_hint(conn)? else {
        return Ok(());
    };
    let candidates = next_after(&history, selected, config);
    display::display_predictions(&format!("Après le {}", selected), &candidates);
    Ok(())
}

fn parse_state(kind: MatrixKind, raw: &str) -> Result<usize> {
    let index = match kind {
        MatrixKind::Number => Some(parse_outcome(raw)? as usize),
        MatrixKind::Zone => Zone::from_str_opt(raw).map(Zone::index),
        MatrixKind::Color => Color::from_str_opt(raw).map(Color::index),
    };
    index.with_context(|| format!("État inconnu : '{}'", raw))
}

fn cmd_matrix(conn: &Connection, config: &EngineConfig, kind: MatrixKind, from: Option<&str>) -> Result<()> {
    let Some(history) = history_or_hint(conn)? else {
        return Ok(());
    };
    let from = from.map(|raw| parse_state(kind, raw)).transpose()?;
    let window = config.transition_window;

    match kind {
        MatrixKind::Number => {
            let matrix = number_transitions(&history, window);
            let labels: Vec<String> = (0..POCKETS).map(|n| n.to_string()).collect();
            match from {
                Some(f) => display::display_matrix_row(&matrix, &labels, f),
                None => display::display_matrix_summary(&matrix, &labels),
            }
        }
        MatrixKind::Zone => {
            let matrix = zone_transitions(&history, window);
            let labels: Vec<String> = Zone::ALL.iter().map(|z| z.to_string()).collect();
            match from {
                Some(f) => display::display_matrix_row(&matrix, &labels, f),
                None => display::display_matrix(&matrix, &labels),
            }
        }
        MatrixKind::Color => {
            let matrix = color_transitions(&history, window);
            let labels: Vec<String> = Color::ALL.iter().map(|c| c.to_string()).collect();
            match from {
                Some(f) => display::display_matrix_row(&matrix, &labels, f),
                None => display::display_matrix(&matrix, &labels),
            }
        }
    }
    Ok(())
}

fn cmd_alerts(conn: &Connection, config: &EngineConfig) -> Result<()> {
    let history = fetch_outcomes(conn, None)?;
    display::display_alerts(&detect_all(&history, config));
    Ok(())
}

fn cmd_report(conn: &Connection, config: &EngineConfig, json: bool) -> Result<()> {
    let history = fetch_outcomes(conn, None)?;
    let report = EngineReport::compute(&history, config);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::display_report(&report, config.hot_cold.window.min(history.len()));
    }
    Ok(())
}

fn cmd_backtest(conn: &Connection, config: &EngineConfig, depth: usize) -> Result<()> {
    let Some(history) = history_or_hint(conn)? else {
        return Ok(());
    };
    let models = all_models(config);
    let tests = depth.min(history.len().saturating_sub(1));
    println!("Backtest de {} modèles sur {} tours...", models.len(), tests);

    let pb = ProgressBar::new(models.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .context("Gabarit de progression invalide")?
        .progress_chars("=> "));

    let results = backtest_models(&models, &history, depth, config.top_n, |r| {
        pb.set_message(r.model_name.clone());
        pb.inc(1);
    });
    pb.finish_with_message("Backtest terminé");

    display::display_backtest(&results, uniform_hit_rate(config.top_n));
    Ok(())
}

fn cmd_simulate(conn: &Connection, count: usize, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let batch = format!("SIM-{}", chrono::Local::now().format("%Y-%m-%d_%H%M%S"));
    for _ in 0..count {
        let n: u8 = rng.random_range(0..=36);
        append_spin(conn, i64::from(n), SpinSource::Replay, Some(&batch))?;
    }
    tracing::info!(count, seed, batch = %batch, "simulation ajoutée");
    println!("{} tours simulés ajoutés (lot {}).", count, batch);
    Ok(())
}

fn cmd_import(conn: &Connection, file: &Path, batch: Option<String>) -> Result<()> {
    let is_json = file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let result = if is_json {
        import::import_json(conn, file)?
    } else {
        let batch = batch.unwrap_or_else(default_batch_id);
        import::import_csv(conn, file, &batch)?
    };
    display::display_import_summary(&result);
    Ok(())
}

fn cmd_export(conn: &Connection, file: &Path) -> Result<()> {
    let count = import::export_json(conn, file)?;
    println!("{} tour(s) exporté(s) vers {}", count, file.display());
    Ok(())
}

fn cmd_config(config: &EngineConfig, path: &Path, write: bool) -> Result<()> {
    if write {
        save_config(config, path)?;
        println!("Configuration écrite dans {}", path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers_strict() {
        let ok = parse_numbers(&["4".into(), "0".into(), "36".into()]).unwrap();
        assert_eq!(ok, vec![4, 0, 36]);
        assert!(parse_numbers(&["37".into()]).is_err());
        assert!(parse_numbers(&["x".into()]).is_err());
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state(MatrixKind::Number, "17").unwrap(), 17);
        assert_eq!(parse_state(MatrixKind::Zone, "moyen").unwrap(), Zone::Mid.index());
        assert_eq!(parse_state(MatrixKind::Color, "red").unwrap(), Color::Red.index());
        assert!(parse_state(MatrixKind::Color, "bleu").is_err());
    }

    #[test]
    fn test_default_batch_id_shape() {
        let id = default_batch_id();
        assert!(id.ends_with("_A1"));
        assert_eq!(id.len(), "YYYY-MM-DD_A1".len());
    }

    #[test]
    fn test_engine_config_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(engine_config(&missing), EngineConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, r#"{"top_n": 0}"#).unwrap();
        assert_eq!(engine_config(&broken), EngineConfig::default());

        let custom = dir.path().join("custom.json");
        std::fs::write(&custom, r#"{"top_n": 5}"#).unwrap();
        assert_eq!(engine_config(&custom).top_n, 5);
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
        let cli = Cli::parse_from(["roulette", "matrix", "zone", "--from", "petit"]);
        assert!(matches!(cli.command, Command::Matrix { kind: MatrixKind::Zone, .. }));
    }
}
