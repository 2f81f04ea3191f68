//! The quick-symptom list offered as one-tap choices.

use crate::constants::{DEFAULT_QUICK_SYMPTOMS, QUICK_SYMPTOMS_KEY, QUICK_SYMPTOMS_LIMIT};
use crate::store::KeyValueStore;
use crate::{CoreError, CoreResult};
use medtracker_types::SymptomToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSymptoms {
    items: Vec<String>,
}

impl QuickSymptoms {
    pub fn defaults() -> Self {
        Self {
            items: DEFAULT_QUICK_SYMPTOMS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Loads the stored list. Anything other than a non-empty JSON array of strings yields
    /// the defaults.
    pub fn load(store: &impl KeyValueStore) -> CoreResult<Self> {
        let Some(raw) = store.get(QUICK_SYMPTOMS_KEY)? else {
            return Ok(Self::defaults());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(items) if !items.is_empty() => Ok(Self { items }),
            Ok(_) => Ok(Self::defaults()),
            Err(e) => {
                tracing::warn!("stored quick symptoms are corrupt, using defaults: {}", e);
                Ok(Self::defaults())
            }
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Entries containing `needle`, compared case-insensitively. An empty needle matches all.
    pub fn filter(&self, needle: &str) -> Vec<&str> {
        let needle = needle.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.trim().to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Adds the first symptom of `text` to the front of the list and persists it.
    ///
    /// Returns the normalized symptom, or `None` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSymptom` when `text` has no usable symptom.
    pub fn add(
        &mut self,
        store: &impl KeyValueStore,
        text: &str,
    ) -> CoreResult<Option<SymptomToken>> {
        let token = SymptomToken::first_of(text)?;
        let exists = self
            .items
            .iter()
            .any(|item| item.trim().to_lowercase() == token.as_str());
        if exists {
            return Ok(None);
        }

        self.items.insert(0, token.as_str().to_owned());
        self.items.truncate(QUICK_SYMPTOMS_LIMIT);
        self.save(store)?;
        Ok(Some(token))
    }

    fn save(&self, store: &impl KeyValueStore) -> CoreResult<()> {
        let raw = serde_json::to_string(&self.items).map_err(CoreError::Serialization)?;
        store.set(QUICK_SYMPTOMS_KEY, &raw)
    }
}

impl Default for QuickSymptoms {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn missing_or_invalid_values_use_defaults() {
        let store = MemoryStore::new();
        assert_eq!(QuickSymptoms::load(&store).unwrap(), QuickSymptoms::defaults());

        for raw in ["not json", "[]", "{\"a\": 1}", "[1, 2]"] {
            store.set(QUICK_SYMPTOMS_KEY, raw).unwrap();
            assert_eq!(
                QuickSymptoms::load(&store).unwrap(),
                QuickSymptoms::defaults(),
                "raw value {raw:?}"
            );
        }
    }

    #[test]
    fn add_prepends_and_persists() {
        let store = MemoryStore::new();
        let mut quick = QuickSymptoms::load(&store).unwrap();

        let added = quick.add(&store, "Joint Pain!, swelling").unwrap();
        assert_eq!(added.unwrap().as_str(), "joint pain");
        assert_eq!(quick.items()[0], "joint pain");

        let reloaded = QuickSymptoms::load(&store).unwrap();
        assert_eq!(reloaded, quick);
        assert_eq!(reloaded.items().len(), DEFAULT_QUICK_SYMPTOMS.len() + 1);
    }

    #[test]
    fn add_ignores_case_insensitive_duplicates() {
        let store = MemoryStore::new();
        let mut quick = QuickSymptoms::load(&store).unwrap();

        assert_eq!(quick.add(&store, "FEVER").unwrap(), None);
        assert_eq!(quick, QuickSymptoms::defaults());
        assert_eq!(store.get(QUICK_SYMPTOMS_KEY).unwrap(), None);
    }

    #[test]
    fn add_rejects_empty_symptom() {
        let store = MemoryStore::new();
        let mut quick = QuickSymptoms::load(&store).unwrap();
        assert!(matches!(
            quick.add(&store, " !! , cough"),
            Err(CoreError::InvalidSymptom(_))
        ));
    }

    #[test]
    fn add_caps_list_length() {
        let store = MemoryStore::new();
        let mut quick = QuickSymptoms::load(&store).unwrap();
        for i in 0..QUICK_SYMPTOMS_LIMIT {
            quick.add(&store, &format!("symptom {i}")).unwrap();
        }

        assert_eq!(quick.items().len(), QUICK_SYMPTOMS_LIMIT);
        assert_eq!(quick.items()[0], format!("symptom {}", QUICK_SYMPTOMS_LIMIT - 1));
        assert_eq!(QuickSymptoms::load(&store).unwrap().items().len(), QUICK_SYMPTOMS_LIMIT);
    }

    #[test]
    fn filter_matches_substrings() {
        let quick = QuickSymptoms::defaults();
        assert_eq!(quick.filter(" LOSS "), vec!["loss of taste", "loss of smell"]);
        assert_eq!(quick.filter("").len(), DEFAULT_QUICK_SYMPTOMS.len());
        assert!(quick.filter("xyz").is_empty());
    }
}
