//! Pass-through engine for sandboxed builds.
//!
//! No dictionary, no lattice: every request is answered with a single
//! as-is candidate echoing the input key. Useful as a fallback when the
//! data files are unavailable and as a reference for the converter
//! interface contract.

use crate::converter::ConverterInterface;
use crate::dict::SuppressionDictionary;
use crate::request::ConversionRequest;
use crate::segments::Segments;

/// User-data maintenance capability of an engine.
pub trait UserDataManager {
    fn sync(&self) -> bool;
    fn reload(&self) -> bool;
    fn clear_user_history(&self) -> bool;
    fn clear_user_prediction(&self) -> bool;
    fn clear_unused_user_prediction(&self) -> bool;
    fn clear_user_prediction_entry(&self, key: &str, value: &str) -> bool;
    fn wait(&self) -> bool;
}

/// Does nothing, successfully.
#[derive(Default)]
pub struct StubUserDataManager;

impl UserDataManager for StubUserDataManager {
    fn sync(&self) -> bool {
        true
    }
    fn reload(&self) -> bool {
        true
    }
    fn clear_user_history(&self) -> bool {
        true
    }
    fn clear_user_prediction(&self) -> bool {
        true
    }
    fn clear_unused_user_prediction(&self) -> bool {
        true
    }
    fn clear_user_prediction_entry(&self, _key: &str, _value: &str) -> bool {
        true
    }
    fn wait(&self) -> bool {
        true
    }
}

fn add_as_is_candidate(key: &str, segments: &mut Segments) -> bool {
    segments.clear();
    let segment = segments.add_segment();
    segment.set_key(key);
    let candidate = segment.push_back_candidate();
    candidate.key = key.to_string();
    candidate.value = key.to_string();
    candidate.content_key = key.to_string();
    candidate.content_value = key.to_string();
    true
}

struct MinimalConverter;

impl ConverterInterface for MinimalConverter {
    fn start_conversion(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        add_as_is_candidate(request.key(), segments)
    }

    fn start_conversion_with_key(&self, segments: &mut Segments, key: &str) -> bool {
        add_as_is_candidate(key, segments)
    }

    fn start_reverse_conversion(&self, _segments: &mut Segments, _key: &str) -> bool {
        false
    }

    fn start_prediction(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        add_as_is_candidate(request.key(), segments)
    }

    fn start_prediction_with_key(&self, segments: &mut Segments, key: &str) -> bool {
        add_as_is_candidate(key, segments)
    }

    fn start_suggestion(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        add_as_is_candidate(request.key(), segments)
    }

    fn start_suggestion_with_key(&self, segments: &mut Segments, key: &str) -> bool {
        add_as_is_candidate(key, segments)
    }

    fn start_partial_prediction(
        &self,
        _request: &ConversionRequest,
        _segments: &mut Segments,
    ) -> bool {
        false
    }

    fn start_partial_prediction_with_key(&self, _segments: &mut Segments, _key: &str) -> bool {
        false
    }

    fn start_partial_suggestion(
        &self,
        _request: &ConversionRequest,
        _segments: &mut Segments,
    ) -> bool {
        false
    }

    fn start_partial_suggestion_with_key(&self, _segments: &mut Segments, _key: &str) -> bool {
        false
    }

    fn finish_conversion(&self, _request: &ConversionRequest, _segments: &mut Segments) {}

    fn cancel_conversion(&self, _segments: &mut Segments) {}

    fn reset_conversion(&self, _segments: &mut Segments) {}

    fn revert_conversion(&self, _segments: &mut Segments) {}

    fn reconstruct_history(&self, _segments: &mut Segments, _preceding_text: &str) -> bool {
        true
    }

    fn commit_segment_value(
        &self,
        _segments: &mut Segments,
        _segment_index: usize,
        _candidate_index: usize,
    ) -> bool {
        true
    }

    fn commit_partial_suggestion_segment_value(
        &self,
        _segments: &mut Segments,
        _segment_index: usize,
        _candidate_index: usize,
        _current_segment_key: &str,
        _new_segment_key: &str,
    ) -> bool {
        true
    }

    fn focus_segment_value(
        &self,
        _segments: &mut Segments,
        _segment_index: usize,
        _candidate_index: usize,
    ) -> bool {
        true
    }

    fn commit_segments(&self, _segments: &mut Segments, _candidate_indices: &[usize]) -> bool {
        true
    }

    fn resize_segment(
        &self,
        _segments: &mut Segments,
        _request: &ConversionRequest,
        _segment_index: usize,
        _offset_length: i32,
    ) -> bool {
        true
    }
}

pub struct MinimalEngine {
    converter: MinimalConverter,
    suppression_dictionary: SuppressionDictionary,
    user_data_manager: StubUserDataManager,
}

impl Default for MinimalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MinimalEngine {
    pub fn new() -> Self {
        Self {
            converter: MinimalConverter,
            suppression_dictionary: SuppressionDictionary::new(),
            user_data_manager: StubUserDataManager,
        }
    }

    pub fn converter(&self) -> &dyn ConverterInterface {
        &self.converter
    }

    pub fn suppression_dictionary(&mut self) -> &mut SuppressionDictionary {
        &mut self.suppression_dictionary
    }

    pub fn user_data_manager(&self) -> &dyn UserDataManager {
        &self.user_data_manager
    }
}
