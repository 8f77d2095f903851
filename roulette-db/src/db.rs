use anyhow::{Context, Result};
use rand::Rng;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::models::{clamp_outcome, Spin, SpinSource};

// L'ordre de l'historique est celui de `seq` (insertion), jamais celui de `ts`.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS spins (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL UNIQUE,
    ts          INTEGER NOT NULL,
    outcome     INTEGER NOT NULL CHECK (outcome BETWEEN 0 AND 36),
    color       TEXT NOT NULL,
    parity      TEXT,
    range       TEXT,
    source      TEXT NOT NULL,
    batch_id    TEXT,
    spin_index  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_spins_source ON spins(source);
CREATE INDEX IF NOT EXISTS idx_spins_batch ON spins(batch_id);
";

const SELECT_COLUMNS: &str = "id, ts, outcome, source, batch_id, spin_index";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("roulette.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn row_to_spin(row: &Row<'_>) -> rusqlite::Result<Spin> {
    let source: String = row.get(3)?;
    let source = SpinSource::parse(&source).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Spin::new(
        row.get(0)?,
        row.get(1)?,
        row.get::<_, u8>(2)?,
        source,
        row.get(4)?,
        row.get::<_, i64>(5)? as u64,
    ))
}

pub fn new_spin_id(timestamp: i64) -> String {
    let suffix: u32 = rand::rng().random();
    format!("{}-{:08x}", timestamp, suffix)
}

fn insert_spin(conn: &Connection, spin: &Spin) -> Result<()> {
    conn.execute(
        "INSERT INTO spins (id, ts, outcome, color, parity, range, source, batch_id, spin_index)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            spin.id,
            spin.timestamp,
            spin.outcome,
            spin.color.as_str(),
            spin.parity.map(|p| p.as_str()),
            spin.range.map(|r| r.as_str()),
            spin.source.as_str(),
            spin.batch_id,
            spin.spin_index as i64,
        ],
    ).with_context(|| format!("Échec de l'insertion du tour {}", spin.id))?;
    Ok(())
}

/// Prochain numéro de tour (1 pour une base vide).
pub fn next_spin_index(conn: &Connection) -> Result<u64> {
    let max: i64 = conn.query_row(
        "SELECT COALESCE(MAX(spin_index), 0) FROM spins",
        [],
        |row| row.get(0),
    )?;
    Ok(max as u64 + 1)
}

/// Transaction IMMEDIATE : le verrou d'écriture est pris avant la lecture de
/// `next_spin_index`, deux écrivains concurrents sont donc sérialisés.
fn write_transaction(conn: &Connection) -> Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .context("Impossible de démarrer la transaction")
}

/// Ajoute un tour en tête de l'historique. Le numéro est ramené sur [0, 36].
pub fn append_spin(
    conn: &Connection,
    outcome: i64,
    source: SpinSource,
    batch_id: Option<&str>,
) -> Result<Spin> {
    let tx = write_transaction(conn)?;

    let timestamp = chrono::Utc::now().timestamp_millis();
    let spin = Spin::new(
        new_spin_id(timestamp),
        timestamp,
        clamp_outcome(outcome),
        source,
        batch_id.map(str::to_string),
        next_spin_index(&tx)?,
    );
    insert_spin(&tx, &spin)?;

    tx.commit().context("Échec du commit")?;
    tracing::debug!(id = %spin.id, outcome = spin.outcome, source = spin.source.as_str(), "tour ajouté");
    Ok(spin)
}

fn delete_by_id(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM spins WHERE id = ?1", [id])
        .context("Échec de la suppression")?;
    Ok(())
}

/// Annule le dernier tour ajouté, quelle que soit sa source.
pub fn remove_front(conn: &Connection) -> Result<Option<Spin>> {
    let last = conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM spins ORDER BY seq DESC LIMIT 1"),
        [],
        row_to_spin,
    ).optional()?;

    if let Some(spin) = &last {
        delete_by_id(conn, &spin.id)?;
        tracing::debug!(id = %spin.id, outcome = spin.outcome, "tour annulé");
    }
    Ok(last)
}

pub fn last_replay_spin(conn: &Connection) -> Result<Option<Spin>> {
    let spin = conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM spins WHERE source = 'replay' ORDER BY seq DESC LIMIT 1"),
        [],
        row_to_spin,
    ).optional()?;
    Ok(spin)
}

/// Annule uniquement le dernier rattrapage ; les tours en direct restent intacts.
pub fn remove_last_replay(conn: &Connection) -> Result<Option<Spin>> {
    let last = last_replay_spin(conn)?;
    if let Some(spin) = &last {
        delete_by_id(conn, &spin.id)?;
        tracing::debug!(id = %spin.id, outcome = spin.outcome, "rattrapage annulé");
    }
    Ok(last)
}

pub fn clear(conn: &Connection) -> Result<usize> {
    let removed = conn.execute("DELETE FROM spins", [])
        .context("Échec du vidage de l'historique")?;
    tracing::info!(removed, "historique vidé");
    Ok(removed)
}

/// Remplace tout l'historique. `spins` est attendu du plus récent au plus ancien.
pub fn replace_all(conn: &Connection, spins: &[Spin]) -> Result<()> {
    let tx = write_transaction(conn)?;
    tx.execute("DELETE FROM spins", [])?;
    for spin in spins.iter().rev() {
        insert_spin(&tx, spin)?;
    }
    tx.commit().context("Échec du commit")?;
    tracing::info!(count = spins.len(), "historique remplacé");
    Ok(())
}

pub fn fetch_all(conn: &Connection) -> Result<Vec<Spin>> {
    let mut stmt = conn.prepare(
        &format!("SELECT {SELECT_COLUMNS} FROM spins ORDER BY seq DESC")
    )?;
    let spins = stmt.query_map([], row_to_spin)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spins)
}

pub fn fetch_last(conn: &Connection, limit: u32) -> Result<Vec<Spin>> {
    let mut stmt = conn.prepare(
        &format!("SELECT {SELECT_COLUMNS} FROM spins ORDER BY seq DESC LIMIT ?1")
    )?;
    let spins = stmt.query_map([limit], row_to_spin)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spins)
}

/// Numéros seuls, du plus récent au plus ancien. `None` = tout l'historique.
pub fn fetch_outcomes(conn: &Connection, limit: Option<u32>) -> Result<Vec<u8>> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let mut stmt = conn.prepare(
        "SELECT outcome FROM spins ORDER BY seq DESC LIMIT ?1"
    )?;
    let rows = stmt.query_map([limit], |row| row.get::<_, u8>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_spins(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM spins", [], |row| row.get(0))?;
    Ok(count)
}

/// Nombre de rattrapages d'un lot (les tours en direct ne comptent pas).
pub fn count_replay_by_batch(conn: &Connection, batch_id: &str) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM spins WHERE source = 'replay' AND batch_id = ?1",
        [batch_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
