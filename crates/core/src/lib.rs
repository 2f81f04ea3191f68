//! # Medical Tracker Core
//!
//! Core logic of the Medical Tracker symptom checker.
//!
//! This crate contains the matching-and-reconciliation core and the state around it:
//! - Condition catalog and the symptom-to-condition matcher
//! - Prediction history, remote record normalization and merge
//! - Local key-value persistence and the quick-symptom list
//! - A [`Session`] exposing the commands front ends drive
//! - Nearby-place records derived from Overpass geodata
//!
//! **No transport concerns**: the HTTP remote lives in `medtracker-client`, the REST surface
//! in `api-rest`, and terminal output in `medtracker-cli`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod matcher;
pub mod places;
pub mod quick;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{Catalog, Condition};
pub use config::CoreConfig;
pub use constants::*;
pub use error::{CoreError, CoreResult};
pub use history::HistoryEntry;
pub use matcher::ScoredCondition;
pub use medtracker_types::{tokenize, SymptomToken, TokenError};
pub use places::{Coordinates, Place};
pub use reconcile::HistoryReconciler;
pub use remote::{OfflineRemote, RemoteError, RemoteHistory};
pub use session::{Prediction, Session};
pub use store::{FileStore, KeyValueStore, MemoryStore};
