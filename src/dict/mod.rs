//! Read-only collaborators queried during candidate generation.
//!
//! These are owned by the engine and shared immutably with the converter:
//! the POS matcher classifies morpheme ids, the suppression dictionary
//! holds user-forbidden (reading, surface) pairs, and the suggestion
//! filter blocks surfaces from unsolicited suggestion lists.

use std::collections::HashSet;

/// Classifies morpheme ids by part of speech.
///
/// Functional words (particles, auxiliary verbs) occupy one contiguous id
/// range in the POS id space, so membership is a range check.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosMatcher {
    functional_min: u16,
    functional_max: u16,
}

impl PosMatcher {
    /// `functional_min..=functional_max` is the functional-word id range.
    /// Both zero means "no functional words known".
    pub fn new(functional_min: u16, functional_max: u16) -> Self {
        Self {
            functional_min,
            functional_max,
        }
    }

    pub fn is_functional(&self, id: u16) -> bool {
        self.functional_min != 0 && self.functional_min <= id && id <= self.functional_max
    }

    pub fn is_content_word(&self, id: u16) -> bool {
        !self.is_functional(id)
    }
}

/// User-managed set of (reading, surface) pairs that must never be shown.
#[derive(Debug, Default)]
pub struct SuppressionDictionary {
    entries: HashSet<(String, String)>,
}

impl SuppressionDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, key: &str, value: &str) {
        self.entries.insert((key.to_string(), value.to_string()));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        // Avoid allocating for the common negative case.
        if self.entries.is_empty() {
            return false;
        }
        self.entries
            .contains(&(key.to_string(), value.to_string()))
    }
}

/// Surfaces unsuitable for unsolicited suggestions (e.g. offensive or
/// embarrassing words). Consulted only for prediction-like requests.
#[derive(Debug, Default)]
pub struct SuggestionFilter {
    bad_values: HashSet<String>,
}

impl SuggestionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I: IntoIterator<Item = S>, S: Into<String>>(values: I) -> Self {
        Self {
            bad_values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.bad_values.contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_matcher_range() {
        let pos = PosMatcher::new(100, 200);
        assert!(pos.is_functional(100));
        assert!(pos.is_functional(200));
        assert!(!pos.is_functional(99));
        assert!(!pos.is_functional(201));
        assert!(pos.is_content_word(50));
    }

    #[test]
    fn pos_matcher_unset_range() {
        let pos = PosMatcher::new(0, 0);
        assert!(!pos.is_functional(0));
        assert!(pos.is_content_word(123));
    }

    #[test]
    fn suppression_dictionary_lookup() {
        let mut dict = SuppressionDictionary::new();
        assert!(!dict.contains("きょう", "今日"));
        dict.add_entry("きょう", "今日");
        assert!(dict.contains("きょう", "今日"));
        assert!(!dict.contains("きょう", "京"));
        dict.clear();
        assert!(dict.is_empty());
    }

    #[test]
    fn suggestion_filter_values() {
        let filter = SuggestionFilter::from_values(["変換", "test"]);
        assert!(filter.contains("変換"));
        assert!(!filter.contains("へんかん"));
    }
}
