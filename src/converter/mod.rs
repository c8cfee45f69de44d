//! Kana-to-kanji conversion core.
//!
//! The caller builds a [`Lattice`] over a reading, runs the forward
//! [`viterbi`] pass, then drives an [`NBestGenerator`] to enumerate
//! ranked, filtered candidates into a segment.

pub(crate) mod candidate_filter;
pub mod connector;
mod lattice;
mod nbest;
pub mod node;
pub mod segmenter;
pub(crate) mod testutil;
mod viterbi;

#[cfg(test)]
mod tests;

use crate::request::ConversionRequest;
use crate::segments::Segments;

pub use candidate_filter::FilterResult;
pub use connector::{Connector, ConnectorError, INVALID_COST};
pub use lattice::Lattice;
pub use nbest::{BoundaryCheckMode, NBestGenerator};
pub use node::{Node, NodeId, NodeType};
pub use segmenter::{PosSegmenter, Segmenter};
pub use viterbi::viterbi;

/// Capability set of a converter implementation.
///
/// All methods operate on caller-owned [`Segments`]; a `false` return
/// means "no result", never an exceptional failure.
pub trait ConverterInterface {
    fn start_conversion(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;
    fn start_conversion_with_key(&self, segments: &mut Segments, key: &str) -> bool;

    fn start_reverse_conversion(&self, segments: &mut Segments, key: &str) -> bool;

    fn start_prediction(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;
    fn start_prediction_with_key(&self, segments: &mut Segments, key: &str) -> bool;

    fn start_suggestion(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;
    fn start_suggestion_with_key(&self, segments: &mut Segments, key: &str) -> bool;

    fn start_partial_prediction(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
    ) -> bool;
    fn start_partial_prediction_with_key(&self, segments: &mut Segments, key: &str) -> bool;

    fn start_partial_suggestion(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
    ) -> bool;
    fn start_partial_suggestion_with_key(&self, segments: &mut Segments, key: &str) -> bool;

    fn finish_conversion(&self, request: &ConversionRequest, segments: &mut Segments);
    fn cancel_conversion(&self, segments: &mut Segments);
    fn reset_conversion(&self, segments: &mut Segments);
    fn revert_conversion(&self, segments: &mut Segments);

    /// Rebuild history segments from text preceding the composition.
    fn reconstruct_history(&self, segments: &mut Segments, preceding_text: &str) -> bool;

    fn commit_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: usize,
    ) -> bool;
    fn commit_partial_suggestion_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: usize,
        current_segment_key: &str,
        new_segment_key: &str,
    ) -> bool;
    fn focus_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: usize,
    ) -> bool;
    fn commit_segments(&self, segments: &mut Segments, candidate_indices: &[usize]) -> bool;

    /// Grow or shrink the segment at `segment_index` by `offset_length`
    /// reading bytes.
    fn resize_segment(
        &self,
        segments: &mut Segments,
        request: &ConversionRequest,
        segment_index: usize,
        offset_length: i32,
    ) -> bool;
}
