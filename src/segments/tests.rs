use super::*;

fn candidate(key: &str, value: &str) -> Candidate {
    Candidate {
        key: key.to_string(),
        value: value.to_string(),
        content_key: key.to_string(),
        content_value: value.to_string(),
        ..Default::default()
    }
}

#[test]
fn encode_decode_lengths() {
    let encoded = Candidate::encode_lengths(3, 4, 2, 3).unwrap();
    assert_eq!(encoded, 0x0304_0203);
    assert_eq!(Candidate::decode_lengths(encoded), (3, 4, 2, 3));
}

#[test]
fn encode_lengths_overflow_fails() {
    assert!(Candidate::encode_lengths(256, 1, 1, 1).is_none());
    assert!(Candidate::encode_lengths(1, 256, 1, 1).is_none());
    assert!(Candidate::encode_lengths(1, 1, 256, 1).is_none());
    assert!(Candidate::encode_lengths(1, 1, 1, 256).is_none());
    assert!(Candidate::encode_lengths(255, 255, 255, 255).is_some());
}

#[test]
fn push_back_inner_segment_boundary_rejects_overflow() {
    let mut c = candidate("key", "value");
    assert!(c.push_back_inner_segment_boundary(3, 5, 3, 5));
    assert_eq!(c.inner_segment_boundary.len(), 1);
    assert!(!c.push_back_inner_segment_boundary(300, 5, 3, 5));
    assert_eq!(c.inner_segment_boundary.len(), 1);
}

#[test]
fn inner_segment_iterator_walks_boundaries() {
    let mut c = candidate("わたしのなまえ", "私の名前");
    // わたし(9B)/私(3B), の(3B)/の(3B), なまえ(9B)/名前(6B)
    assert!(c.push_back_inner_segment_boundary(9, 3, 9, 3));
    assert!(c.push_back_inner_segment_boundary(3, 3, 3, 3));
    assert!(c.push_back_inner_segment_boundary(9, 6, 9, 6));

    let segments: Vec<_> = c.inner_segments().collect();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].key, "わたし");
    assert_eq!(segments[0].value, "私");
    assert_eq!(segments[1].key, "の");
    assert_eq!(segments[1].value, "の");
    assert_eq!(segments[2].key, "なまえ");
    assert_eq!(segments[2].value, "名前");
    assert_eq!(segments[2].content_key, "なまえ");
}

#[test]
fn inner_segment_iterator_empty_boundary() {
    let c = candidate("かな", "仮名");
    assert_eq!(c.inner_segments().count(), 0);
}

#[test]
fn functional_key_and_value() {
    let mut c = candidate("はしった", "走った");
    c.content_key = "はしっ".to_string();
    c.content_value = "走っ".to_string();
    assert_eq!(c.functional_key(), "た");
    assert_eq!(c.functional_value(), "た");

    let plain = candidate("かな", "仮名");
    assert_eq!(plain.functional_key(), "");
    assert_eq!(plain.functional_value(), "");
}

#[test]
fn attribute_bits_are_stable() {
    assert_eq!(Candidate::BEST_CANDIDATE, 1);
    assert_eq!(Candidate::RERANKED, 2);
    assert_eq!(Candidate::NO_HISTORY_LEARNING, 4);
    assert_eq!(Candidate::NO_SUGGEST_LEARNING, 8);
    assert_eq!(Candidate::NO_LEARNING, 12);
    assert_eq!(Candidate::CONTEXT_SENSITIVE, 16);
    assert_eq!(Candidate::SPELLING_CORRECTION, 32);
    assert_eq!(Candidate::NO_VARIANTS_EXPANSION, 64);
    assert_eq!(Candidate::NO_EXTRA_DESCRIPTION, 128);
    assert_eq!(Candidate::REALTIME_CONVERSION, 256);
    assert_eq!(Candidate::USER_DICTIONARY, 512);
    assert_eq!(Candidate::COMMAND_CANDIDATE, 1024);
    assert_eq!(Candidate::PARTIALLY_KEY_CONSUMED, 2048);
    assert_eq!(Candidate::TYPING_CORRECTION, 4096);
    assert_eq!(Candidate::AUTO_PARTIAL_SUGGESTION, 8192);
    assert_eq!(Candidate::USER_HISTORY_PREDICTION, 16384);
    assert_eq!(Candidate::SUFFIX_DICTIONARY, 32768);
}

#[test]
fn candidate_init_resets_fields() {
    let mut c = candidate("かな", "仮名");
    c.cost = 123;
    c.attributes = Candidate::RERANKED;
    c.inner_segment_boundary.push(1);
    c.init();
    assert!(c.key.is_empty());
    assert_eq!(c.cost, 0);
    assert_eq!(c.attributes, 0);
    assert!(c.inner_segment_boundary.is_empty());
}

#[test]
fn segment_candidate_ops() {
    let mut segment = Segment::new();
    segment.set_key("きょうは");
    assert_eq!(segment.candidates_size(), 0);
    assert!(!segment.is_valid_index(0));

    segment.push_back_candidate().value = "today".to_string();
    segment.push_back_candidate().value = "kyo".to_string();
    segment.push_front_candidate().value = "first".to_string();
    assert_eq!(segment.candidates_size(), 3);
    assert_eq!(segment.candidate(0).value, "first");
    assert_eq!(segment.candidate(1).value, "today");

    segment.insert_candidate(1).value = "mid".to_string();
    assert_eq!(segment.candidate(1).value, "mid");
    assert_eq!(segment.candidates_size(), 4);

    segment.erase_candidate(1);
    assert_eq!(segment.candidate(1).value, "today");

    segment.pop_front_candidate();
    assert_eq!(segment.candidate(0).value, "today");
    segment.pop_back_candidate();
    assert_eq!(segment.candidates_size(), 1);
}

#[test]
fn segment_move_candidate() {
    let mut segment = Segment::new();
    for v in ["a", "b", "c", "d"] {
        segment.push_back_candidate().value = v.to_string();
    }
    segment.move_candidate(3, 0);
    let values: Vec<_> = (0..4).map(|i| segment.candidate(i).value.clone()).collect();
    assert_eq!(values, ["d", "a", "b", "c"]);

    segment.move_candidate(0, 2);
    let values: Vec<_> = (0..4).map(|i| segment.candidate(i).value.clone()).collect();
    assert_eq!(values, ["a", "b", "d", "c"]);
}

#[test]
fn candidate_pointers_stable_across_insert_erase() {
    let mut segment = Segment::new();
    for v in ["a", "b", "c"] {
        segment.push_back_candidate().value = v.to_string();
    }
    let ptr_a = segment.candidate(0) as *const Candidate;
    let ptr_c = segment.candidate(2) as *const Candidate;

    segment.insert_candidate(1).value = "x".to_string();
    assert_eq!(segment.candidate(0) as *const Candidate, ptr_a);
    assert_eq!(segment.candidate(3) as *const Candidate, ptr_c);

    segment.erase_candidate(1); // remove "x"
    segment.erase_candidate(1); // remove "b"
    assert_eq!(segment.candidate(0) as *const Candidate, ptr_a);
    assert_eq!(segment.candidate(1) as *const Candidate, ptr_c);
}

#[test]
fn erase_candidates_range_clamps() {
    let mut segment = Segment::new();
    for v in ["a", "b", "c", "d"] {
        segment.push_back_candidate().value = v.to_string();
    }
    segment.erase_candidates(2, 10);
    assert_eq!(segment.candidates_size(), 2);
    segment.erase_candidates(5, 1);
    assert_eq!(segment.candidates_size(), 2);
}

#[test]
fn meta_candidates_are_independent() {
    let mut segment = Segment::new();
    segment.push_back_candidate().value = "main".to_string();
    segment.add_meta_candidate().value = "カナ".to_string();
    segment.add_meta_candidate().value = "ｶﾅ".to_string();

    assert_eq!(segment.candidates_size(), 1);
    assert_eq!(segment.meta_candidates_size(), 2);
    assert_eq!(segment.meta_candidate(1).value, "ｶﾅ");

    segment.clear_candidates();
    assert_eq!(segment.meta_candidates_size(), 2);
    segment.clear_meta_candidates();
    assert_eq!(segment.meta_candidates_size(), 0);
}

#[test]
#[should_panic(expected = "meta candidate pool is full")]
fn meta_candidate_pool_is_bounded() {
    let mut segment = Segment::new();
    for _ in 0..=MAX_META_CANDIDATES {
        segment.add_meta_candidate();
    }
}

#[test]
fn segments_partition_invariant() {
    let mut segments = Segments::new();
    segments
        .push_back_segment()
        .set_segment_type(SegmentType::History);
    segments
        .push_back_segment()
        .set_segment_type(SegmentType::Submitted);
    segments.push_back_segment(); // Free
    segments.push_back_segment(); // Free

    assert_eq!(segments.segments_size(), 4);
    assert_eq!(segments.history_segments_size(), 2);
    assert_eq!(segments.conversion_segments_size(), 2);
    assert_eq!(
        segments.history_segments_size() + segments.conversion_segments_size(),
        segments.segments_size()
    );

    segments.mutable_conversion_segment(0).set_key("かな");
    assert_eq!(segments.segment(2).key(), "かな");
    assert_eq!(segments.conversion_segment(0).key(), "かな");
}

#[test]
fn segments_clear_conversion_keeps_history() {
    let mut segments = Segments::new();
    segments
        .push_back_segment()
        .set_segment_type(SegmentType::History);
    segments.push_back_segment().set_key("x");
    segments.set_resized(true);

    segments.clear_conversion_segments();
    assert_eq!(segments.segments_size(), 1);
    assert_eq!(segments.history_segments_size(), 1);
    assert!(!segments.resized());

    segments.clear_history_segments();
    assert_eq!(segments.segments_size(), 0);
}

#[test]
fn max_history_cap_trims_oldest() {
    let mut segments = Segments::new();
    for key in ["one", "two", "three"] {
        let seg = segments.push_back_segment();
        seg.set_segment_type(SegmentType::History);
        seg.set_key(key);
    }
    segments.set_max_history_segments_size(2);
    assert_eq!(segments.history_segments_size(), 2);
    assert_eq!(segments.history_segment(0).key(), "two");
    assert_eq!(segments.max_history_segments_size(), 2);
}

#[test]
fn revert_entries() {
    let mut segments = Segments::new();
    {
        let entry = segments.push_back_revert_entry();
        entry.revert_entry_type = RevertEntry::CREATE_ENTRY;
        entry.id = 1;
        entry.timestamp = 42;
        entry.key = "reading".to_string();
    }
    assert_eq!(segments.revert_entries_size(), 1);
    assert_eq!(segments.revert_entry(0).timestamp, 42);
    segments.clear_revert_entries();
    assert_eq!(segments.revert_entries_size(), 0);
}

#[test]
fn cached_lattice_is_reused() {
    let mut segments = Segments::new();
    segments.mutable_cached_lattice().reset("かな");
    assert_eq!(segments.mutable_cached_lattice().key(), "かな");
}

#[test]
fn erase_segments_range() {
    let mut segments = Segments::new();
    for key in ["a", "b", "c", "d"] {
        segments.push_back_segment().set_key(key);
    }
    segments.erase_segments(1, 2);
    assert_eq!(segments.segments_size(), 2);
    assert_eq!(segments.segment(0).key(), "a");
    assert_eq!(segments.segment(1).key(), "d");
}
