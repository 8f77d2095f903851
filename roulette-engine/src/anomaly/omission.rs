use serde::Serialize;

use roulette_db::models::Zone;
use super::Signal;
use crate::config::OmissionParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OmissionLevel {
    Alert,
    Severe,
}

impl std::fmt::Display for OmissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OmissionLevel::Alert => write!(f, "ALERTE"),
            OmissionLevel::Severe => write!(f, "SÉVÈRE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneOmission {
    pub zone: Zone,
    /// Tours écoulés depuis la dernière apparition (longueur de l'historique si jamais vue).
    pub count: usize,
    pub level: Option<OmissionLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Omission {
    pub zones: Vec<ZoneOmission>,
}

impl Omission {
    pub fn get(&self, zone: Zone) -> Option<&ZoneOmission> {
        self.zones.iter().find(|z| z.zone == zone)
    }

    pub fn flagged(&self) -> impl Iterator<Item = &ZoneOmission> {
        self.zones.iter().filter(|z| z.level.is_some())
    }
}

fn level(count: usize, params: &OmissionParams) -> Option<OmissionLevel> {
    if count > params.severe {
        Some(OmissionLevel::Severe)
    } else if count > params.alert {
        Some(OmissionLevel::Alert)
    } else {
        None
    }
}

/// Retard de chaque zone (zéro compris) depuis sa dernière sortie.
pub fn omission(history: &[u8], params: &OmissionParams) -> Signal<Omission> {
    if history.is_empty() {
        return Signal::Inactive { needed: 1, available: 0 };
    }

    let zones = Zone::ALL
        .into_iter()
        .map(|zone| {
            let count = history
                .iter()
                .position(|&n| Zone::of(n) == zone)
                .unwrap_or(history.len());
            ZoneOmission {
                zone,
                count,
                level: level(count, params),
            }
        })
        .collect();

    Signal::Ready(Omission { zones })
}
