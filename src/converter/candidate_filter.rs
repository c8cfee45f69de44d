use std::collections::HashSet;

use tracing::debug;

use crate::dict::{PosMatcher, SuggestionFilter, SuppressionDictionary};
use crate::request::ConversionRequest;
use crate::segments::Candidate;
use crate::settings::settings;

use super::nbest::BoundaryCheckMode;

/// Verdict for one materialized candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Emit the candidate.
    Good,
    /// Skip this candidate; keep searching.
    Bad,
    /// End the enumeration.
    Stop,
}

/// Deduplication and rejection engine for enumerated candidates.
///
/// Rules are applied in order; the first matching rule wins. State
/// (seen set, top cost, accepted count) lives for one enumeration and is
/// reset together with the generator.
pub struct CandidateFilter<'a> {
    suppression_dictionary: &'a SuppressionDictionary,
    suggestion_filter: &'a SuggestionFilter,
    pos_matcher: &'a PosMatcher,
    seen: HashSet<(String, String)>,
    top_cost: Option<i32>,
    accepted: usize,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(
        suppression_dictionary: &'a SuppressionDictionary,
        suggestion_filter: &'a SuggestionFilter,
        pos_matcher: &'a PosMatcher,
    ) -> Self {
        Self {
            suppression_dictionary,
            suggestion_filter,
            pos_matcher,
            seen: HashSet::with_capacity(settings().filter.seen_set_capacity),
            top_cost: None,
            accepted: 0,
        }
    }

    pub fn reset(&mut self) {
        self.seen.clear();
        self.top_cost = None;
        self.accepted = 0;
    }

    /// Cost of the first accepted candidate of this enumeration.
    pub fn top_cost(&self) -> Option<i32> {
        self.top_cost
    }

    pub fn filter_candidate(
        &mut self,
        request: &ConversionRequest,
        original_key: &str,
        candidate: &Candidate,
        node_count: usize,
        check_mode: BoundaryCheckMode,
    ) -> FilterResult {
        let s = settings();

        if self
            .suppression_dictionary
            .contains(&candidate.key, &candidate.value)
        {
            debug!(key = %candidate.key, "suppressed candidate");
            return FilterResult::Bad;
        }

        if request.request_type().is_prediction()
            && self.suggestion_filter.contains(&candidate.value)
        {
            debug!(value = %candidate.value, "suggestion-filtered candidate");
            return FilterResult::Bad;
        }

        let pair = (candidate.key.clone(), candidate.value.clone());
        if self.seen.contains(&pair) {
            return FilterResult::Bad;
        }

        if let Some(top) = self.top_cost {
            if candidate.cost - top > s.filter.cost_diff_limit
                && self.accepted >= s.filter.min_results_before_stop
            {
                debug!(
                    cost = candidate.cost,
                    top, "cost margin exhausted, stopping enumeration"
                );
                return FilterResult::Stop;
            }
        }

        // A strictly segmented candidate must not start with a functional
        // word; single-node paths are what the dictionary says they are.
        if check_mode == BoundaryCheckMode::Strict
            && node_count > 1
            && self.pos_matcher.is_functional(candidate.lid)
        {
            return FilterResult::Bad;
        }

        if !request.request_type().is_partial() && candidate.key != original_key {
            return FilterResult::Bad;
        }

        self.seen.insert(pair);
        if self.top_cost.is_none() {
            self.top_cost = Some(candidate.cost);
        }
        self.accepted += 1;
        FilterResult::Good
    }
}
