use std::io::{self, Write};

use anyhow::{Context, Result};
use roulette_db::db::{append_spin, fetch_outcomes, remove_front};
use roulette_db::models::{parse_outcome, SpinSource};
use roulette_db::rusqlite::Connection;
use roulette_engine::anomaly::detect_all;
use roulette_engine::predictor::predict_next;
use roulette_engine::window::tally;
use roulette_engine::EngineConfig;

use crate::display;

#[derive(Debug, PartialEq)]
enum PadCommand {
    Record(Vec<u8>),
    Undo,
    Stats,
    Predict,
    Alerts,
    Help,
    Quit,
}

fn parse_command(input: &str) -> Option<PadCommand> {
    match input.trim().to_lowercase().as_str() {
        "u" | "undo" | "annuler" => Some(PadCommand::Undo),
        "s" | "stats" => Some(PadCommand::Stats),
        "p" | "predire" | "prédire" | "predict" => Some(PadCommand::Predict),
        "a" | "alertes" | "alerts" => Some(PadCommand::Alerts),
        "h" | "?" | "aide" | "help" => Some(PadCommand::Help),
        "q" | "quitter" | "quit" | "exit" => Some(PadCommand::Quit),
        "" => None,
        other => other
            .split_whitespace()
            .map(parse_outcome)
            .collect::<Result<Vec<_>>>()
            .ok()
            .map(PadCommand::Record),
    }
}

fn display_menu() {
    println!();
    println!("── Pavé de saisie ──");
    println!("  0-36      Enregistrer un ou plusieurs numéros (ex: 17 4 0)");
    println!("  u         Annuler le dernier tour");
    println!("  s         Statistiques récentes");
    println!("  p         Prédiction");
    println!("  a         Anomalies");
    println!("  q         Quitter");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        anyhow::bail!("fin de saisie");
    }
    Ok(input.trim().to_string())
}

fn record(conn: &Connection, numbers: &[u8]) -> Result<()> {
    for &n in numbers {
        let spin = append_spin(conn, i64::from(n), SpinSource::Live, None)?;
        display::display_added(&spin);
    }
    Ok(())
}

fn undo(conn: &Connection) -> Result<()> {
    match remove_front(conn)? {
        Some(spin) => println!("Annulé : {} {}", spin.outcome, spin.color),
        None => println!("Historique vide, rien à annuler."),
    }
    Ok(())
}

fn stats(conn: &Connection, config: &EngineConfig) -> Result<()> {
    let history = fetch_outcomes(conn, None)?;
    display::display_tally("Récents", &tally(&history, config.recent_window));
    Ok(())
}

fn predict(conn: &Connection, config: &EngineConfig) -> Result<()> {
    let history = fetch_outcomes(conn, None)?;
    display::display_predictions("Prochain numéro", &predict_next(&history, config));
    Ok(())
}

fn alerts(conn: &Connection, config: &EngineConfig) -> Result<()> {
    let history = fetch_outcomes(conn, None)?;
    display::display_alerts(&detect_all(&history, config));
    Ok(())
}

pub fn run_pad(conn: &Connection, config: &EngineConfig) -> Result<()> {
    display_menu();

    loop {
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let result = match parse_command(&input) {
            Some(PadCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(PadCommand::Record(numbers)) => record(conn, &numbers),
            Some(PadCommand::Undo) => undo(conn),
            Some(PadCommand::Stats) => stats(conn, config),
            Some(PadCommand::Predict) => predict(conn, config),
            Some(PadCommand::Alerts) => alerts(conn, config),
            Some(PadCommand::Help) => {
                display_menu();
                Ok(())
            }
            None => {
                println!("Saisie inconnue : '{}'. Tapez un numéro (0-36) ou h pour l'aide.", input);
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}
