use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Plus grand numéro de la roue (roue à un seul zéro).
pub const MAX_OUTCOME: u8 = 36;

/// Nombre de cases : 0 à 36.
pub const POCKETS: usize = 37;

/// Ramène un numéro hors limites sur la borne la plus proche.
pub fn clamp_outcome(n: i64) -> u8 {
    n.clamp(0, MAX_OUTCOME as i64) as u8
}

/// Parse strict d'une saisie utilisateur (pas de clamp ici).
pub fn parse_outcome(s: &str) -> Result<u8> {
    let s = s.trim();
    let n: i64 = s
        .parse()
        .with_context(|| format!("Numéro invalide : '{}'", s))?;
    if !(0..=MAX_OUTCOME as i64).contains(&n) {
        bail!("Numéro {} hors limites (0-36)", n);
    }
    Ok(n as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Black, Color::Green];

    pub fn of(n: u8) -> Self {
        if n == 0 {
            Color::Green
        } else if n % 2 == 1 {
            Color::Red
        } else {
            Color::Black
        }
    }

    pub fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Black => 1,
            Color::Green => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Black => "black",
            Color::Green => "green",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" | "rouge" => Some(Color::Red),
            "black" | "noir" => Some(Color::Black),
            "green" | "vert" => Some(Color::Green),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "ROUGE"),
            Color::Black => write!(f, "NOIR"),
            Color::Green => write!(f, "VERT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub fn of(n: u8) -> Option<Self> {
        match n {
            0 => None,
            n if n % 2 == 1 => Some(Parity::Odd),
            _ => Some(Parity::Even),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Parity::Odd => "odd",
            Parity::Even => "even",
        }
    }
}

impl std::fmt::Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parity::Odd => write!(f, "IMPAIR"),
            Parity::Even => write!(f, "PAIR"),
        }
    }
}

/// Tiers de la roue : petit (1-12), moyen (13-24), grand (25-36).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Range {
    Small,
    Mid,
    Large,
}

impl Range {
    pub const ALL: [Range; 3] = [Range::Small, Range::Mid, Range::Large];

    pub fn of(n: u8) -> Option<Self> {
        match n {
            0 => None,
            1..=12 => Some(Range::Small),
            13..=24 => Some(Range::Mid),
            _ => Some(Range::Large),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Range::Small => 0,
            Range::Mid => 1,
            Range::Large => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Range::Small => "small",
            Range::Mid => "mid",
            Range::Large => "large",
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Range::Small => write!(f, "PETIT"),
            Range::Mid => write!(f, "MOYEN"),
            Range::Large => write!(f, "GRAND"),
        }
    }
}

/// Classification de taille à 4 états : le zéro forme sa propre zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Zero,
    Small,
    Mid,
    Large,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Zero, Zone::Small, Zone::Mid, Zone::Large];

    pub fn of(n: u8) -> Self {
        match Range::of(n) {
            None => Zone::Zero,
            Some(Range::Small) => Zone::Small,
            Some(Range::Mid) => Zone::Mid,
            Some(Range::Large) => Zone::Large,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Zone::Zero => 0,
            Zone::Small => 1,
            Zone::Mid => 2,
            Zone::Large => 3,
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "zero" | "0" | "zéro" => Some(Zone::Zero),
            "small" | "petit" => Some(Zone::Small),
            "mid" | "moyen" => Some(Zone::Mid),
            "large" | "grand" => Some(Zone::Large),
            _ => None,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Zero => write!(f, "ZÉRO"),
            Zone::Small => write!(f, "PETIT"),
            Zone::Mid => write!(f, "MOYEN"),
            Zone::Large => write!(f, "GRAND"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub color: Color,
    pub parity: Option<Parity>,
    pub range: Option<Range>,
}

impl Meta {
    pub fn of(n: u8) -> Self {
        let n = n.min(MAX_OUTCOME);
        Self {
            color: Color::of(n),
            parity: Parity::of(n),
            range: Range::of(n),
        }
    }
}

/// Classe un numéro brut, après clamp sur [0, 36].
pub fn classify(n: i64) -> Meta {
    Meta::of(clamp_outcome(n))
}

/// Origine d'un enregistrement : saisi en direct ou rattrapé après coup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinSource {
    Live,
    Replay,
}

impl SpinSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SpinSource::Live => "live",
            SpinSource::Replay => "replay",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "live" => Ok(SpinSource::Live),
            "replay" => Ok(SpinSource::Replay),
            other => bail!("Source inconnue : '{}'", other),
        }
    }
}

impl std::fmt::Display for SpinSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinSource::Live => write!(f, "direct"),
            SpinSource::Replay => write!(f, "rattrapage"),
        }
    }
}

/// Un tour enregistré. `id` et `timestamp` ne changent jamais après création.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub id: String,
    /// Millisecondes depuis l'epoch.
    pub timestamp: i64,
    pub outcome: u8,
    pub color: Color,
    pub parity: Option<Parity>,
    pub range: Option<Range>,
    pub source: SpinSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub spin_index: u64,
}

impl Spin {
    pub fn new(
        id: String,
        timestamp: i64,
        outcome: u8,
        source: SpinSource,
        batch_id: Option<String>,
        spin_index: u64,
    ) -> Self {
        let outcome = outcome.min(MAX_OUTCOME);
        let meta = Meta::of(outcome);
        Self {
            id,
            timestamp,
            outcome,
            color: meta.color,
            parity: meta.parity,
            range: meta.range,
            source,
            batch_id,
            spin_index,
        }
    }

    pub fn meta(&self) -> Meta {
        Meta {
            color: self.color,
            parity: self.parity,
            range: self.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_zero() {
        let m = Meta::of(0);
        assert_eq!(m.color, Color::Green);
        assert_eq!(m.parity, None);
        assert_eq!(m.range, None);
    }

    #[test]
    fn test_meta_odd_is_red() {
        let m = Meta::of(17);
        assert_eq!(m.color, Color::Red);
        assert_eq!(m.parity, Some(Parity::Odd));
        assert_eq!(m.range, Some(Range::Mid));
    }

    #[test]
    fn test_meta_even_is_black() {
        let m = Meta::of(36);
        assert_eq!(m.color, Color::Black);
        assert_eq!(m.parity, Some(Parity::Even));
        assert_eq!(m.range, Some(Range::Large));
    }

    #[test]
    fn test_range_bounds() {
        assert_eq!(Range::of(1), Some(Range::Small));
        assert_eq!(Range::of(12), Some(Range::Small));
        assert_eq!(Range::of(13), Some(Range::Mid));
        assert_eq!(Range::of(24), Some(Range::Mid));
        assert_eq!(Range::of(25), Some(Range::Large));
    }

    #[test]
    fn test_classify_clamps() {
        assert_eq!(classify(-5), Meta::of(0));
        assert_eq!(classify(99), Meta::of(36));
        assert_eq!(clamp_outcome(-1), 0);
        assert_eq!(clamp_outcome(37), 36);
        assert_eq!(clamp_outcome(20), 20);
    }

    #[test]
    fn test_parse_outcome() {
        assert_eq!(parse_outcome(" 7 ").unwrap(), 7);
        assert_eq!(parse_outcome("0").unwrap(), 0);
        assert!(parse_outcome("37").is_err());
        assert!(parse_outcome("-1").is_err());
        assert!(parse_outcome("abc").is_err());
    }

    #[test]
    fn test_zone_indices_distinct() {
        let idx: Vec<usize> = Zone::ALL.iter().map(|z| z.index()).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert_eq!(Zone::of(0), Zone::Zero);
        assert_eq!(Zone::of(30), Zone::Large);
    }

    #[test]
    fn test_spin_new_derives_meta() {
        let spin = Spin::new("a".into(), 1, 8, SpinSource::Live, None, 1);
        assert_eq!(spin.color, Color::Black);
        assert_eq!(spin.range, Some(Range::Small));
        assert_eq!(spin.meta(), Meta::of(8));
    }

    #[test]
    fn test_spin_json_uses_lowercase_tags() {
        let spin = Spin::new("a".into(), 1, 0, SpinSource::Replay, Some("B1".into()), 3);
        let json = serde_json::to_string(&spin).unwrap();
        assert!(json.contains("\"green\""));
        assert!(json.contains("\"replay\""));
        let back: Spin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spin);
    }
}
