use anyhow::{Context, Result, bail};
use roulette_db::rusqlite::Connection;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use roulette_db::db::{append_spin, fetch_all, new_spin_id, replace_all};
use roulette_db::models::{parse_outcome, Spin, SpinSource};

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl ImportResult {
    fn new() -> Self {
        ImportResult {
            total_records: 0,
            inserted: 0,
            skipped: 0,
            errors: 0,
        }
    }
}

/// CSV de numéros, du plus ancien au plus récent, ajoutés comme lot de rattrapage.
/// Chaque champ d'une ligne est un numéro ; les champs illisibles sont comptés en erreur.
pub fn import_csv(conn: &Connection, path: &Path, batch_id: &str) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut result = ImportResult::new();

    for (line, record_result) in reader.records().enumerate() {
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line = line + 1, error = %e, "ligne illisible");
                result.errors += 1;
                continue;
            }
        };
        for field in record.iter().filter(|f| !f.is_empty()) {
            result.total_records += 1;
            match parse_outcome(field) {
                Ok(n) => {
                    append_spin(conn, i64::from(n), SpinSource::Replay, Some(batch_id))?;
                    result.inserted += 1;
                }
                Err(e) => {
                    tracing::warn!(line = line + 1, error = %e, "numéro ignoré");
                    result.errors += 1;
                }
            }
        }
    }

    tracing::info!(inserted = result.inserted, batch = batch_id, "import CSV terminé");
    Ok(result)
}

/// Format de l'application d'origine : `{ "n": 17, "ts": 1700000000000 }`,
/// éventuellement avec `id`, `source`, `batchId` et `spinIndex`.
#[derive(Debug, Deserialize)]
struct RawRecord {
    n: i64,
    ts: i64,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: Option<SpinSource>,
    #[serde(default, rename = "batchId")]
    batch_id: Option<String>,
    #[serde(default, rename = "spinIndex")]
    spin_index: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpRecord {
    Spin(Spin),
    Raw(RawRecord),
}

/// Convertit un dump (plus récent en tête) en tours prêts à insérer.
/// Les identifiants en double sont ignorés, le premier rencontré est conservé.
fn to_spins(records: Vec<DumpRecord>, result: &mut ImportResult) -> Vec<Spin> {
    let len = records.len() as u64;
    let mut seen = HashSet::new();
    let mut spins = Vec::with_capacity(records.len());

    for (i, record) in records.into_iter().enumerate() {
        result.total_records += 1;
        let fallback_index = len - i as u64;
        let spin = match record {
            DumpRecord::Spin(s) => {
                let index = if s.spin_index == 0 { fallback_index } else { s.spin_index };
                Spin::new(s.id, s.timestamp, s.outcome, s.source, s.batch_id, index)
            }
            DumpRecord::Raw(r) => Spin::new(
                r.id.unwrap_or_else(|| new_spin_id(r.ts)),
                r.ts,
                roulette_db::models::clamp_outcome(r.n),
                r.source.unwrap_or(SpinSource::Live),
                r.batch_id,
                r.spin_index.filter(|&i| i > 0).unwrap_or(fallback_index),
            ),
        };
        if seen.insert(spin.id.clone()) {
            spins.push(spin);
        } else {
            result.skipped += 1;
        }
    }
    spins
}

/// Remplace tout l'historique par le contenu d'un dump JSON.
pub fn import_json(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("JSON invalide dans {:?}", path))?;
    let Some(items) = value.as_array() else {
        bail!("Le dump doit être un tableau de tours");
    };

    let mut result = ImportResult::new();
    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match DumpRecord::deserialize(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "enregistrement ignoré");
                result.total_records += 1;
                result.errors += 1;
            }
        }
    }

    let spins = to_spins(records, &mut result);
    replace_all(conn, &spins)?;
    result.inserted = spins.len() as u32;
    Ok(result)
}

/// Écrit tout l'historique (plus récent en tête) au format JSON.
pub fn export_json(conn: &Connection, path: &Path) -> Result<usize> {
    let spins = fetch_all(conn)?;
    let json = serde_json::to_string_pretty(&spins)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    tracing::info!(count = spins.len(), path = %path.display(), "export terminé");
    Ok(spins.len())
}
