//! Validated text types shared across the Medical Tracker crates.
//!
//! The central type is [`SymptomToken`], the normalized unit the condition matcher compares.
//! Tokens are produced either one at a time ([`SymptomToken::new`]) or by splitting free text
//! ([`tokenize`]).

use regex::Regex;
use std::sync::LazyLock;

/// Separators between symptoms in free text: punctuation runs, newlines, or a standalone "and".
static SYMPTOM_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;/\\|\n]+|\s+and\s+").unwrap());

/// Punctuation-only separators, used when a single symptom is taken from the front of the text.
static SEGMENT_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;/\\|\n]+").unwrap());

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Nothing was left after lowercasing and stripping disallowed characters
    #[error("symptom text is empty after normalization")]
    Empty,
}

/// A normalized symptom.
///
/// A token contains only ASCII lowercase letters, digits and spaces, and never starts or ends
/// with a space. Two tokens are the same symptom exactly when their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymptomToken(String);

impl SymptomToken {
    /// Normalizes `input` into a token.
    ///
    /// The input is lowercased, every character outside `a-z`, `0-9` and the space is removed,
    /// and the result is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Empty` if nothing remains.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TokenError> {
        let cleaned: String = input
            .as_ref()
            .to_lowercase()
            .chars()
            .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | ' '))
            .collect();
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Normalizes the first symptom of `input`, ignoring everything after the first separator.
    ///
    /// Unlike [`tokenize`], the word "and" is not treated as a separator here.
    pub fn first_of(input: &str) -> Result<Self, TokenError> {
        let lowered = input.to_lowercase();
        let first = SEGMENT_SEPARATORS
            .split(lowered.trim())
            .next()
            .unwrap_or_default();
        Self::new(first)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Splits free text into tokens.
///
/// Segments that normalize to nothing are dropped. Order is preserved and duplicates are kept;
/// callers that need a set dedup themselves.
pub fn tokenize(text: &str) -> Vec<SymptomToken> {
    let lowered = text.to_lowercase();
    SYMPTOM_SEPARATORS
        .split(&lowered)
        .filter_map(|segment| SymptomToken::new(segment).ok())
        .collect()
}

impl std::fmt::Display for SymptomToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SymptomToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SymptomToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for SymptomToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for SymptomToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SymptomToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SymptomToken::new(&s).map_err(serde::de::Error::custom)
    }
}
