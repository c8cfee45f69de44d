use crate::converter::candidate_filter::{CandidateFilter, FilterResult};
use crate::converter::testutil::{word, zero_connector, TableSegmenter};
use crate::converter::{viterbi, BoundaryCheckMode, Lattice, NBestGenerator};
use crate::dict::{PosMatcher, SuggestionFilter, SuppressionDictionary};
use crate::request::{ConversionRequest, RequestType};
use crate::segments::Candidate;

fn candidate(key: &str, value: &str, cost: i32) -> Candidate {
    Candidate {
        key: key.to_string(),
        value: value.to_string(),
        cost,
        ..Default::default()
    }
}

struct FilterFixture {
    suppression: SuppressionDictionary,
    suggestion: SuggestionFilter,
    pos: PosMatcher,
}

impl FilterFixture {
    fn new() -> Self {
        Self {
            suppression: SuppressionDictionary::new(),
            suggestion: SuggestionFilter::new(),
            pos: PosMatcher::new(100, 200),
        }
    }

    fn filter(&self) -> CandidateFilter<'_> {
        CandidateFilter::new(&self.suppression, &self.suggestion, &self.pos)
    }
}

#[test]
fn suppression_hit_is_bad() {
    let mut fixture = FilterFixture::new();
    fixture.suppression.add_entry("か", "蚊");
    let mut filter = fixture.filter();
    let request = ConversionRequest::new(RequestType::Conversion, "か");

    let result = filter.filter_candidate(
        &request,
        "か",
        &candidate("か", "蚊", 100),
        1,
        BoundaryCheckMode::Strict,
    );
    assert_eq!(result, FilterResult::Bad);

    let result = filter.filter_candidate(
        &request,
        "か",
        &candidate("か", "香", 100),
        1,
        BoundaryCheckMode::Strict,
    );
    assert_eq!(result, FilterResult::Good);
}

#[test]
fn suggestion_filter_applies_to_predictions_only() {
    let mut fixture = FilterFixture::new();
    fixture.suggestion = SuggestionFilter::from_values(["危"]);
    let mut filter = fixture.filter();

    let suggestion = ConversionRequest::new(RequestType::Suggestion, "か");
    let result = filter.filter_candidate(
        &suggestion,
        "か",
        &candidate("か", "危", 100),
        1,
        BoundaryCheckMode::Strict,
    );
    assert_eq!(result, FilterResult::Bad);

    let conversion = ConversionRequest::new(RequestType::Conversion, "か");
    let result = filter.filter_candidate(
        &conversion,
        "か",
        &candidate("か", "危", 100),
        1,
        BoundaryCheckMode::Strict,
    );
    assert_eq!(result, FilterResult::Good);
}

#[test]
fn duplicate_pair_is_bad() {
    let fixture = FilterFixture::new();
    let mut filter = fixture.filter();
    let request = ConversionRequest::new(RequestType::Conversion, "か");

    let c = candidate("か", "蚊", 100);
    assert_eq!(
        filter.filter_candidate(&request, "か", &c, 1, BoundaryCheckMode::Strict),
        FilterResult::Good
    );
    assert_eq!(
        filter.filter_candidate(&request, "か", &c, 1, BoundaryCheckMode::Strict),
        FilterResult::Bad
    );
}

#[test]
fn cost_margin_stops_after_enough_results() {
    let fixture = FilterFixture::new();
    let mut filter = fixture.filter();
    let request = ConversionRequest::new(RequestType::Conversion, "か");

    // Margin exceeded but only one result so far: not a stop yet.
    assert_eq!(
        filter.filter_candidate(
            &request,
            "か",
            &candidate("か", "一", 100),
            1,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Good
    );
    assert_eq!(filter.top_cost(), Some(100));
    assert_eq!(
        filter.filter_candidate(
            &request,
            "か",
            &candidate("か", "遠", 20000),
            1,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Good
    );

    assert_eq!(
        filter.filter_candidate(
            &request,
            "か",
            &candidate("か", "三", 300),
            1,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Good
    );

    // Three accepted and the margin is blown: stop.
    assert_eq!(
        filter.filter_candidate(
            &request,
            "か",
            &candidate("か", "果", 20001),
            1,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Stop
    );
}

#[test]
fn top_cost_comes_from_first_accept() {
    let mut fixture = FilterFixture::new();
    fixture.suppression.add_entry("か", "蚊");
    let mut filter = fixture.filter();
    let request = ConversionRequest::new(RequestType::Conversion, "か");

    assert_eq!(filter.top_cost(), None);
    // Rejected candidates do not set the top cost.
    filter.filter_candidate(
        &request,
        "か",
        &candidate("か", "蚊", 50),
        1,
        BoundaryCheckMode::Strict,
    );
    assert_eq!(filter.top_cost(), None);
    filter.filter_candidate(
        &request,
        "か",
        &candidate("か", "香", 120),
        1,
        BoundaryCheckMode::Strict,
    );
    assert_eq!(filter.top_cost(), Some(120));
}

#[test]
fn functional_head_rejected_in_strict_multi_node() {
    let fixture = FilterFixture::new();
    let mut filter = fixture.filter();
    let request = ConversionRequest::new(RequestType::Conversion, "かの");

    let mut functional_head = candidate("かの", "かの", 100);
    functional_head.lid = 150; // inside the functional range

    assert_eq!(
        filter.filter_candidate(
            &request,
            "かの",
            &functional_head,
            2,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Bad
    );
    // A single dictionary word may start with whatever it wants.
    assert_eq!(
        filter.filter_candidate(
            &request,
            "かの",
            &functional_head,
            1,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Good
    );
}

#[test]
fn functional_head_tolerated_in_realtime_mode() {
    let fixture = FilterFixture::new();
    let mut filter = fixture.filter();
    let request = ConversionRequest::new(RequestType::Conversion, "かの");

    let mut functional_head = candidate("かの", "かの", 100);
    functional_head.lid = 150;
    assert_eq!(
        filter.filter_candidate(
            &request,
            "かの",
            &functional_head,
            2,
            BoundaryCheckMode::OnlyEdge
        ),
        FilterResult::Good
    );
}

#[test]
fn key_mismatch_rejected_unless_partial() {
    let fixture = FilterFixture::new();
    let mut filter = fixture.filter();

    let conversion = ConversionRequest::new(RequestType::Conversion, "かなで");
    assert_eq!(
        filter.filter_candidate(
            &conversion,
            "かなで",
            &candidate("かな", "仮名", 100),
            1,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Bad
    );

    let partial = ConversionRequest::new(RequestType::PartialSuggestion, "かなで");
    assert_eq!(
        filter.filter_candidate(
            &partial,
            "かなで",
            &candidate("かな", "仮名", 100),
            1,
            BoundaryCheckMode::Strict
        ),
        FilterResult::Good
    );
}

#[test]
fn reset_clears_enumeration_state() {
    let fixture = FilterFixture::new();
    let mut filter = fixture.filter();
    let request = ConversionRequest::new(RequestType::Conversion, "か");

    let c = candidate("か", "蚊", 100);
    assert_eq!(
        filter.filter_candidate(&request, "か", &c, 1, BoundaryCheckMode::Strict),
        FilterResult::Good
    );
    filter.reset();
    assert_eq!(filter.top_cost(), None);
    assert_eq!(
        filter.filter_candidate(&request, "か", &c, 1, BoundaryCheckMode::Strict),
        FilterResult::Good
    );
}

#[test]
fn suppressed_candidate_skipped_during_enumeration() {
    let mut lattice = Lattice::new("a");
    lattice.add_node(word(0, 1, "a", "一", 1, 100));
    lattice.add_node(word(0, 1, "a", "二", 1, 200));
    lattice.add_node(word(0, 1, "a", "三", 1, 300));
    let conn = zero_connector(4);
    assert!(viterbi(&mut lattice, &conn));

    let mut suppression = SuppressionDictionary::new();
    suppression.add_entry("a", "二");
    let suggestion = SuggestionFilter::new();
    let pos = PosMatcher::default();
    let segmenter = TableSegmenter::none();
    let mut generator = NBestGenerator::new(
        &suppression,
        &segmenter,
        &conn,
        &pos,
        &lattice,
        &suggestion,
    );
    generator.reset(lattice.bos(), lattice.eos(), BoundaryCheckMode::Strict);

    let request = ConversionRequest::new(RequestType::Conversion, "a");
    let mut values = Vec::new();
    while let Some(c) = generator.next(&request, "a") {
        values.push(c.value);
    }
    assert_eq!(values, ["一", "三"]);
}
