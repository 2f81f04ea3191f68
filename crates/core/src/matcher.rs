//! Symptom-to-condition scoring.
//!
//! [`score`] is a pure function: the same tokens and catalog always produce the same ranking.

use crate::catalog::{Catalog, Condition};
use medtracker_types::SymptomToken;
use serde::Serialize;
use std::collections::HashSet;

/// A catalog condition scored against one set of input symptoms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCondition {
    pub condition_id: String,
    pub name: String,
    pub description: String,
    pub causes: String,
    pub symptoms: Vec<String>,
    pub meds: Vec<String>,
    /// Fraction of the condition's canonical symptoms present in the input, in `[0, 1]`.
    pub score: f64,
    pub match_count: usize,
}

impl ScoredCondition {
    fn from_condition(condition: &Condition, match_count: usize) -> Self {
        let score = match_count as f64 / condition.symptoms.len().max(1) as f64;
        Self {
            condition_id: condition.id.clone(),
            name: condition.name.clone(),
            description: condition.description.clone(),
            causes: condition.causes.clone(),
            symptoms: condition.symptoms.clone(),
            meds: condition.meds.clone(),
            score,
            match_count,
        }
    }

    pub fn is_match(&self) -> bool {
        self.score > 0.0
    }
}

/// Scores every catalog condition against `tokens`.
///
/// The result has exactly one entry per condition, ordered by descending score, then
/// descending match count, then catalog order. Zero-score conditions are included.
pub fn score<'a, I>(tokens: I, catalog: &Catalog) -> Vec<ScoredCondition>
where
    I: IntoIterator<Item = &'a SymptomToken>,
{
    let input: HashSet<&str> = tokens.into_iter().map(SymptomToken::as_str).collect();

    let mut results: Vec<ScoredCondition> = catalog
        .conditions()
        .iter()
        .map(|condition| {
            let match_count = condition
                .symptoms
                .iter()
                .filter(|s| input.contains(s.trim().to_lowercase().as_str()))
                .count();
            ScoredCondition::from_condition(condition, match_count)
        })
        .collect();

    // sort_by is stable, so equal keys keep catalog order.
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.match_count.cmp(&a.match_count))
    });
    results
}
