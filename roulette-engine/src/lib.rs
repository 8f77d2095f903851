//! Moteur d'analyse des tirages : fonctions pures sur un historique
//! `&[u8]` ordonné du plus récent au plus ancien.

pub mod anomaly;
pub mod backtest;
pub mod config;
pub mod frequency;
pub mod heat;
pub mod models;
pub mod predictor;
pub mod report;
pub mod transition;
pub mod window;
pub mod zero;

pub use config::EngineConfig;
pub use report::EngineReport;
