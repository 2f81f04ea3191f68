//! Application state and the command interface front ends drive.
//!
//! A [`Session`] holds everything that would otherwise be ambient UI state: the catalog, the
//! history reconciler, the quick-symptom list, the current selection and the user's position.
//! Front ends call its commands and render what they return; the session never renders.

use crate::catalog::Catalog;
use crate::constants::DISPLAY_LIMIT;
use crate::history::{timestamp_now, HistoryEntry};
use crate::matcher::{self, ScoredCondition};
use crate::places::Coordinates;
use crate::quick::QuickSymptoms;
use crate::reconcile::HistoryReconciler;
use crate::remote::RemoteHistory;
use crate::store::KeyValueStore;
use crate::{CoreError, CoreResult};
use medtracker_types::{tokenize, SymptomToken};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// The outcome of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// The deduplicated symptoms that were scored, in input order.
    pub input: Vec<SymptomToken>,
    /// Every catalog condition, best first.
    pub scored: Vec<ScoredCondition>,
    /// The history entry recorded for this prediction.
    pub entry: HistoryEntry,
}

impl Prediction {
    /// Scores `input` and builds the matching history entry, stamped with `when`.
    ///
    /// The entry's `top` is set only when the best condition matched at least one symptom.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptySymptoms` if `input` is empty.
    pub fn compute(
        input: Vec<SymptomToken>,
        catalog: &Catalog,
        when: impl Into<String>,
    ) -> CoreResult<Self> {
        if input.is_empty() {
            return Err(CoreError::EmptySymptoms);
        }

        let scored = matcher::score(&input, catalog);
        let top = scored
            .first()
            .filter(|best| best.is_match())
            .map(|best| best.name.clone());
        let entry = HistoryEntry::for_tokens(&input, when, top);

        Ok(Self {
            input,
            scored,
            entry,
        })
    }

    /// The best condition, if it matched anything.
    pub fn top(&self) -> Option<&ScoredCondition> {
        self.scored.first().filter(|best| best.is_match())
    }

    /// Conditions with a positive score, capped at the display limit.
    pub fn matches(&self) -> Vec<&ScoredCondition> {
        self.scored
            .iter()
            .filter(|c| c.is_match())
            .take(DISPLAY_LIMIT)
            .collect()
    }

    /// Supportive-care suggestions across the displayed matches, first occurrence order.
    pub fn supportive_care(&self) -> Vec<&str> {
        let mut meds: Vec<&str> = Vec::new();
        for condition in self.matches() {
            for med in &condition.meds {
                if !meds.contains(&med.as_str()) {
                    meds.push(med);
                }
            }
        }
        meds
    }
}

pub struct Session<S, R> {
    catalog: Arc<Catalog>,
    history: HistoryReconciler<S, R>,
    quick: QuickSymptoms,
    selected: Vec<SymptomToken>,
    location: Option<Coordinates>,
}

impl<S, R> Session<S, R>
where
    S: KeyValueStore,
    R: RemoteHistory,
{
    /// Opens a session over `store`, loading the quick-symptom list from it.
    pub fn new(catalog: Arc<Catalog>, store: S, remote: R) -> CoreResult<Self> {
        let quick = QuickSymptoms::load(&store)?;
        Ok(Self {
            catalog,
            history: HistoryReconciler::new(store, remote),
            quick,
            selected: Vec::new(),
            location: None,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Scores the typed text together with the current selection and records the result.
    ///
    /// Typed symptoms come first, then selected ones; duplicates keep their first position.
    /// The returned handle tracks the background remote send. It is `None` when the history
    /// entry could not be recorded; the prediction is returned either way.
    pub fn run_prediction(
        &self,
        typed: &str,
    ) -> CoreResult<(Prediction, Option<JoinHandle<()>>)> {
        let typed = tokenize(typed);
        let mut input: Vec<SymptomToken> = Vec::with_capacity(typed.len() + self.selected.len());
        for token in typed.into_iter().chain(self.selected.iter().cloned()) {
            if !input.contains(&token) {
                input.push(token);
            }
        }

        let prediction = Prediction::compute(input, &self.catalog, timestamp_now())?;
        tracing::info!(
            "prediction for '{}': top = {}",
            prediction.entry.query,
            prediction.entry.top.as_deref().unwrap_or("none")
        );

        let pending = match self.record_history(prediction.entry.clone()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("failed to record prediction history: {}", e);
                None
            }
        };
        Ok((prediction, pending))
    }

    pub fn record_history(&self, entry: HistoryEntry) -> CoreResult<JoinHandle<()>> {
        self.history.record(entry)
    }

    /// Merges remote history into the local record and returns the list to display.
    pub async fn load_history(&self) -> CoreResult<Vec<HistoryEntry>> {
        self.history.load().await
    }

    /// The local history without contacting the remote.
    pub fn history(&self) -> CoreResult<Vec<HistoryEntry>> {
        self.history.local()
    }

    /// Flips whether `symptom` is selected. Returns `true` if it is now selected.
    pub fn toggle_selection(&mut self, symptom: &str) -> CoreResult<bool> {
        let token = SymptomToken::new(symptom)?;
        if let Some(pos) = self.selected.iter().position(|s| *s == token) {
            self.selected.remove(pos);
            Ok(false)
        } else {
            self.selected.push(token);
            Ok(true)
        }
    }

    pub fn selection(&self) -> &[SymptomToken] {
        &self.selected
    }

    /// Clears the current selection.
    pub fn reset(&mut self) {
        self.selected.clear();
    }

    pub fn quick_symptoms(&self, filter: &str) -> Vec<&str> {
        self.quick.filter(filter)
    }

    pub fn add_quick_symptom(&mut self, text: &str) -> CoreResult<Option<SymptomToken>> {
        self.quick.add(self.history.store(), text)
    }

    pub fn set_location(&mut self, lat: f64, lon: f64) {
        self.location = Some(Coordinates::new(lat, lon));
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }
}
