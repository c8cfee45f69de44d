//! Segment and candidate value model.
//!
//! A conversion result is an ordered list of [`Segment`]s, each holding an
//! ordered list of [`Candidate`]s plus a bounded pool of meta candidates
//! (transliteration alternates). [`Segments`] partitions its segments into
//! a history prefix and a conversion suffix.

#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use crate::converter::Lattice;
use crate::request::RequestType;

/// Numeric display style of a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberStyle {
    #[default]
    Default,
    SeparatedArabic,
    HalfWidthArabic,
    FullWidthArabic,
    Kanji,
    OldKanji,
}

/// Engine command carried by a command candidate. Not a bit field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidateCommand {
    #[default]
    Default,
    EnableIncognitoMode,
    DisableIncognitoMode,
    EnablePresentationMode,
    DisablePresentationMode,
}

/// One conversion candidate for a segment.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    /// Reading.
    pub key: String,
    /// Surface form.
    pub value: String,
    pub content_key: String,
    pub content_value: String,

    /// Bytes of the request key consumed by this candidate. Zero means
    /// the whole key is consumed.
    pub consumed_key_size: usize,

    // Meta information
    pub prefix: String,
    pub suffix: String,
    pub description: String,
    pub usage_id: i32,
    pub usage_title: String,
    pub usage_description: String,

    /// Context-sensitive cost; candidates are ordered by this.
    pub cost: i32,
    /// Context-free cost (word costs only).
    pub wcost: i32,
    /// Cost of interior transitions only.
    pub structure_cost: i32,

    /// lid of the left-most node.
    pub lid: u16,
    /// rid of the right-most node.
    pub rid: u16,

    /// Attribute bitmask, see the `Candidate::*` associated constants.
    pub attributes: u32,
    /// Source-info bitmask for usage stats.
    pub source_info: u32,

    pub style: NumberStyle,
    pub command: CandidateCommand,

    /// Inner segment boundaries for realtime conversion, one encoded
    /// length tuple per inner segment. Empty means a single inner segment
    /// spanning the whole candidate.
    pub inner_segment_boundary: Vec<u32>,
}

impl Candidate {
    // Attribute bits. Values are persisted and must stay stable.
    /// This was the best candidate before learning.
    pub const BEST_CANDIDATE: u32 = 1 << 0;
    /// This candidate was reranked by the user.
    pub const RERANKED: u32 = 1 << 1;
    /// Don't save it in history.
    pub const NO_HISTORY_LEARNING: u32 = 1 << 2;
    /// Don't save it in suggestion.
    pub const NO_SUGGEST_LEARNING: u32 = 1 << 3;
    pub const NO_LEARNING: u32 = Self::NO_HISTORY_LEARNING | Self::NO_SUGGEST_LEARNING;
    /// Learn it with left/right context.
    pub const CONTEXT_SENSITIVE: u32 = 1 << 4;
    /// Has "did you mean".
    pub const SPELLING_CORRECTION: u32 = 1 << 5;
    /// No need for full/half width expansion.
    pub const NO_VARIANTS_EXPANSION: u32 = 1 << 6;
    /// No extra descriptions.
    pub const NO_EXTRA_DESCRIPTION: u32 = 1 << 7;
    /// Generated by realtime conversion.
    pub const REALTIME_CONVERSION: u32 = 1 << 8;
    /// Contains tokens from the user dictionary.
    pub const USER_DICTIONARY: u32 = 1 << 9;
    /// Command candidate, e.g. incognito mode.
    pub const COMMAND_CANDIDATE: u32 = 1 << 10;
    /// Key characters are consumed partially; see `consumed_key_size`.
    pub const PARTIALLY_KEY_CONSUMED: u32 = 1 << 11;
    /// Typing correction candidate.
    pub const TYPING_CORRECTION: u32 = 1 << 12;
    /// Auto partial suggestion candidate.
    pub const AUTO_PARTIAL_SUGGESTION: u32 = 1 << 13;
    /// Predicted from user prediction history.
    pub const USER_HISTORY_PREDICTION: u32 = 1 << 14;
    /// Contains tokens from the suffix dictionary.
    pub const SUFFIX_DICTIONARY: u32 = 1 << 15;

    // Source-info bits.
    pub const SOURCE_INFO_NONE: u32 = 0;
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_NONE: u32 = 1 << 0;
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_NUMBER_SUFFIX: u32 = 1 << 1;
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_EMOTICON: u32 = 1 << 2;
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_EMOJI: u32 = 1 << 3;
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_BIGRAM: u32 = 1 << 4;
    pub const DICTIONARY_PREDICTOR_ZERO_QUERY_SUFFIX: u32 = 1 << 5;
    pub const USER_HISTORY_PREDICTOR: u32 = 1 << 6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all fields to their defaults.
    pub fn init(&mut self) {
        *self = Self::default();
    }

    /// Pack four byte lengths into one boundary word. Fails when any
    /// length exceeds 255.
    pub fn encode_lengths(
        key_len: usize,
        value_len: usize,
        content_key_len: usize,
        content_value_len: usize,
    ) -> Option<u32> {
        if key_len > 255 || value_len > 255 || content_key_len > 255 || content_value_len > 255
        {
            return None;
        }
        Some(
            (key_len as u32) << 24
                | (value_len as u32) << 16
                | (content_key_len as u32) << 8
                | content_value_len as u32,
        )
    }

    /// Unpack a boundary word into (key_len, value_len, content_key_len,
    /// content_value_len).
    pub fn decode_lengths(encoded: u32) -> (usize, usize, usize, usize) {
        (
            (encoded >> 24) as usize,
            (encoded >> 16 & 0xff) as usize,
            (encoded >> 8 & 0xff) as usize,
            (encoded & 0xff) as usize,
        )
    }

    /// Append one inner segment boundary entry. Returns false (leaving
    /// the vector untouched) when a length exceeds 255.
    pub fn push_back_inner_segment_boundary(
        &mut self,
        key_len: usize,
        value_len: usize,
        content_key_len: usize,
        content_value_len: usize,
    ) -> bool {
        match Self::encode_lengths(key_len, value_len, content_key_len, content_value_len) {
            Some(encoded) => {
                self.inner_segment_boundary.push(encoded);
                true
            }
            None => false,
        }
    }

    /// `key` minus the content-key prefix.
    pub fn functional_key(&self) -> &str {
        self.key.get(self.content_key.len()..).unwrap_or("")
    }

    /// `value` minus the content-value prefix.
    pub fn functional_value(&self) -> &str {
        self.value.get(self.content_value.len()..).unwrap_or("")
    }

    /// Iterate inner segments described by `inner_segment_boundary`.
    pub fn inner_segments(&self) -> InnerSegmentIterator<'_> {
        InnerSegmentIterator {
            candidate: self,
            key_offset: 0,
            value_offset: 0,
            index: 0,
        }
    }
}

/// One decoded inner segment of a realtime-conversion candidate.
#[derive(Debug, PartialEq, Eq)]
pub struct InnerSegment<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub content_key: &'a str,
    pub content_value: &'a str,
}

/// Walks a candidate's `inner_segment_boundary`, slicing the key and
/// value by the encoded lengths.
pub struct InnerSegmentIterator<'a> {
    candidate: &'a Candidate,
    key_offset: usize,
    value_offset: usize,
    index: usize,
}

impl<'a> Iterator for InnerSegmentIterator<'a> {
    type Item = InnerSegment<'a>;

    fn next(&mut self) -> Option<InnerSegment<'a>> {
        let encoded = *self.candidate.inner_segment_boundary.get(self.index)?;
        self.index += 1;
        let (key_len, value_len, content_key_len, content_value_len) =
            Candidate::decode_lengths(encoded);

        let key = &self.candidate.key;
        let value = &self.candidate.value;
        let seg = InnerSegment {
            key: key.get(self.key_offset..self.key_offset + key_len)?,
            value: value.get(self.value_offset..self.value_offset + value_len)?,
            content_key: key.get(self.key_offset..self.key_offset + content_key_len)?,
            content_value: value.get(self.value_offset..self.value_offset + content_value_len)?,
        };
        self.key_offset += key_len;
        self.value_offset += value_len;
        Some(seg)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentType {
    /// Full automatic conversion.
    #[default]
    Free,
    /// Cannot consist of multiple segments.
    FixedBoundary,
    /// Boundary and result are both fixed.
    FixedValue,
    /// Submitted segment.
    Submitted,
    /// History segment, hidden from the user.
    History,
}

/// Capacity of the meta-candidate pool (one slot per transliteration
/// variant).
pub const MAX_META_CANDIDATES: usize = 6;

/// One user-visible conversion unit.
///
/// Candidates are boxed so references handed out to callers keep pointing
/// at the same allocation while other candidates are inserted or erased.
#[derive(Debug, Default)]
pub struct Segment {
    segment_type: SegmentType,
    key: String,
    candidates: Vec<Box<Candidate>>,
    meta_candidates: Vec<Candidate>,
}

impl Segment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment_type(&self) -> SegmentType {
        self.segment_type
    }

    pub fn set_segment_type(&mut self, segment_type: SegmentType) {
        self.segment_type = segment_type;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key(&mut self, key: &str) {
        self.key.clear();
        self.key.push_str(key);
    }

    pub fn is_valid_index(&self, i: usize) -> bool {
        i < self.candidates.len()
    }

    pub fn candidate(&self, i: usize) -> &Candidate {
        &self.candidates[i]
    }

    pub fn mutable_candidate(&mut self, i: usize) -> &mut Candidate {
        &mut self.candidates[i]
    }

    pub fn candidates_size(&self) -> usize {
        self.candidates.len()
    }

    pub fn push_front_candidate(&mut self) -> &mut Candidate {
        self.candidates.insert(0, Box::default());
        &mut self.candidates[0]
    }

    pub fn push_back_candidate(&mut self) -> &mut Candidate {
        self.candidates.push(Box::default());
        self.candidates.last_mut().unwrap()
    }

    /// Alias of `push_back_candidate`.
    pub fn add_candidate(&mut self) -> &mut Candidate {
        self.push_back_candidate()
    }

    /// Insert a fresh candidate before index `i` (clamped to the end).
    pub fn insert_candidate(&mut self, i: usize) -> &mut Candidate {
        let i = i.min(self.candidates.len());
        self.candidates.insert(i, Box::default());
        &mut self.candidates[i]
    }

    /// Insert an existing candidate before index `i` (clamped to the end).
    pub fn insert_candidate_value(&mut self, i: usize, candidate: Candidate) {
        let i = i.min(self.candidates.len());
        self.candidates.insert(i, Box::new(candidate));
    }

    pub fn pop_front_candidate(&mut self) {
        if !self.candidates.is_empty() {
            self.candidates.remove(0);
        }
    }

    pub fn pop_back_candidate(&mut self) {
        self.candidates.pop();
    }

    pub fn erase_candidate(&mut self, i: usize) {
        if self.is_valid_index(i) {
            self.candidates.remove(i);
        }
    }

    pub fn erase_candidates(&mut self, i: usize, size: usize) {
        if i >= self.candidates.len() {
            return;
        }
        let end = (i + size).min(self.candidates.len());
        self.candidates.drain(i..end);
    }

    /// Remove all candidates. Meta candidates are kept.
    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
    }

    /// Move the candidate at `old_idx` so it ends up at `new_idx`.
    pub fn move_candidate(&mut self, old_idx: usize, new_idx: usize) {
        if old_idx == new_idx
            || !self.is_valid_index(old_idx)
            || !self.is_valid_index(new_idx)
        {
            return;
        }
        let candidate = self.candidates.remove(old_idx);
        self.candidates.insert(new_idx, candidate);
    }

    pub fn meta_candidates_size(&self) -> usize {
        self.meta_candidates.len()
    }

    pub fn meta_candidates(&self) -> &[Candidate] {
        &self.meta_candidates
    }

    pub fn meta_candidate(&self, i: usize) -> &Candidate {
        &self.meta_candidates[i]
    }

    pub fn mutable_meta_candidate(&mut self, i: usize) -> &mut Candidate {
        &mut self.meta_candidates[i]
    }

    /// Append a meta candidate. Panics when the pool is full.
    pub fn add_meta_candidate(&mut self) -> &mut Candidate {
        assert!(
            self.meta_candidates.len() < MAX_META_CANDIDATES,
            "meta candidate pool is full"
        );
        self.meta_candidates.push(Candidate::default());
        self.meta_candidates.last_mut().unwrap()
    }

    pub fn clear_meta_candidates(&mut self) {
        self.meta_candidates.clear();
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.meta_candidates.clear();
        self.key.clear();
        self.segment_type = SegmentType::Free;
    }
}

/// An entry in the revert log: enough context to undo the last Finish.
#[derive(Debug, Clone, Default)]
pub struct RevertEntry {
    pub revert_entry_type: u16,
    /// Identifies the subsystem that wrote the entry.
    pub id: u16,
    pub timestamp: u32,
    pub key: String,
}

impl RevertEntry {
    pub const CREATE_ENTRY: u16 = 0;
    pub const UPDATE_ENTRY: u16 = 1;
}

/// Ordered segments: a history prefix (`History` or `Submitted` type)
/// followed by the conversion segments of the current request.
pub struct Segments {
    max_history_segments_size: usize,
    resized: bool,
    request_type: RequestType,
    segments: VecDeque<Segment>,
    revert_entries: Vec<RevertEntry>,
    /// Lattice kept alive across requests to reuse its arena.
    cached_lattice: Option<Lattice>,
}

impl Default for Segments {
    fn default() -> Self {
        Self::new()
    }
}

impl Segments {
    pub fn new() -> Self {
        Self {
            max_history_segments_size: 0,
            resized: false,
            request_type: RequestType::Conversion,
            segments: VecDeque::new(),
            revert_entries: Vec::new(),
            cached_lattice: None,
        }
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn set_request_type(&mut self, request_type: RequestType) {
        self.request_type = request_type;
    }

    pub fn segment(&self, i: usize) -> &Segment {
        &self.segments[i]
    }

    pub fn mutable_segment(&mut self, i: usize) -> &mut Segment {
        &mut self.segments[i]
    }

    pub fn segments_size(&self) -> usize {
        self.segments.len()
    }

    /// Number of leading history segments.
    pub fn history_segments_size(&self) -> usize {
        self.segments
            .iter()
            .take_while(|s| {
                matches!(
                    s.segment_type(),
                    SegmentType::History | SegmentType::Submitted
                )
            })
            .count()
    }

    pub fn conversion_segments_size(&self) -> usize {
        self.segments_size() - self.history_segments_size()
    }

    pub fn history_segment(&self, i: usize) -> &Segment {
        assert!(i < self.history_segments_size());
        &self.segments[i]
    }

    pub fn mutable_history_segment(&mut self, i: usize) -> &mut Segment {
        assert!(i < self.history_segments_size());
        &mut self.segments[i]
    }

    pub fn conversion_segment(&self, i: usize) -> &Segment {
        &self.segments[self.history_segments_size() + i]
    }

    pub fn mutable_conversion_segment(&mut self, i: usize) -> &mut Segment {
        let offset = self.history_segments_size();
        &mut self.segments[offset + i]
    }

    pub fn push_front_segment(&mut self) -> &mut Segment {
        self.segments.push_front(Segment::new());
        self.segments.front_mut().unwrap()
    }

    pub fn push_back_segment(&mut self) -> &mut Segment {
        self.segments.push_back(Segment::new());
        self.segments.back_mut().unwrap()
    }

    /// Alias of `push_back_segment`.
    pub fn add_segment(&mut self) -> &mut Segment {
        self.push_back_segment()
    }

    pub fn insert_segment(&mut self, i: usize) -> &mut Segment {
        let i = i.min(self.segments.len());
        self.segments.insert(i, Segment::new());
        &mut self.segments[i]
    }

    pub fn pop_front_segment(&mut self) {
        self.segments.pop_front();
    }

    pub fn pop_back_segment(&mut self) {
        self.segments.pop_back();
    }

    pub fn erase_segment(&mut self, i: usize) {
        if i < self.segments.len() {
            self.segments.remove(i);
        }
    }

    pub fn erase_segments(&mut self, i: usize, size: usize) {
        let end = (i + size).min(self.segments.len());
        for _ in i..end {
            self.segments.remove(i);
        }
    }

    pub fn clear_history_segments(&mut self) {
        let n = self.history_segments_size();
        self.erase_segments(0, n);
    }

    pub fn clear_conversion_segments(&mut self) {
        let offset = self.history_segments_size();
        let n = self.conversion_segments_size();
        self.erase_segments(offset, n);
        self.resized = false;
    }

    pub fn clear_segments(&mut self) {
        self.segments.clear();
        self.resized = false;
    }

    pub fn set_max_history_segments_size(&mut self, size: usize) {
        self.max_history_segments_size = size;
        // Oldest history entries fall off the front.
        while self.history_segments_size() > size {
            self.segments.pop_front();
        }
    }

    pub fn max_history_segments_size(&self) -> usize {
        self.max_history_segments_size
    }

    pub fn resized(&self) -> bool {
        self.resized
    }

    pub fn set_resized(&mut self, resized: bool) {
        self.resized = resized;
    }

    pub fn clear(&mut self) {
        self.clear_segments();
        self.clear_revert_entries();
    }

    pub fn clear_revert_entries(&mut self) {
        self.revert_entries.clear();
    }

    pub fn revert_entries_size(&self) -> usize {
        self.revert_entries.len()
    }

    pub fn push_back_revert_entry(&mut self) -> &mut RevertEntry {
        self.revert_entries.push(RevertEntry::default());
        self.revert_entries.last_mut().unwrap()
    }

    pub fn revert_entry(&self, i: usize) -> &RevertEntry {
        &self.revert_entries[i]
    }

    pub fn mutable_revert_entry(&mut self, i: usize) -> &mut RevertEntry {
        &mut self.revert_entries[i]
    }

    /// Lattice owned for reuse across requests; created empty on first
    /// access.
    pub fn mutable_cached_lattice(&mut self) -> &mut Lattice {
        self.cached_lattice.get_or_insert_with(|| Lattice::new(""))
    }
}
