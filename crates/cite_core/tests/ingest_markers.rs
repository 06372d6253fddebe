use cite_core::domain::Citation;
use cite_core::ingest::{
    build_message, message_fingerprint, parse_pipeline_payload, segment_answer, PipelinePayload, Segment,
};
use pretty_assertions::assert_eq;

fn citations() -> Vec<Citation> {
    vec![
        Citation::new("c1", "a.pdf").with_page(3),
        Citation::new("c2", "b.docx"),
        Citation::new("c3", "c.txt"),
    ]
}

fn marker_ids(segments: &[Segment]) -> Vec<Vec<String>> {
    segments
        .iter()
        .filter_map(|s| match s {
            Segment::Marker { group, .. } => {
                Some(group.iter().map(|c| c.id.clone()).collect())
            }
            Segment::Text { .. } => None,
        })
        .collect()
}

#[test]
fn answer_is_split_into_text_and_markers() {
    let answer = "Rust is fast [1]. It is safe [2][3] and fun [2, 1].";
    let (segments, warnings) = segment_answer(answer, &citations());
    assert!(warnings.is_empty());

    assert_eq!(
        marker_ids(&segments),
        vec![
            vec!["c1".to_string()],
            vec!["c2".to_string(), "c3".to_string()],
            vec!["c2".to_string(), "c1".to_string()],
        ]
    );
    assert_eq!(
        segments[0],
        Segment::Text {
            text: "Rust is fast ".to_string()
        }
    );
    assert_eq!(
        segments.last(),
        Some(&Segment::Text {
            text: ".".to_string()
        })
    );
}

#[test]
fn source_style_markers_and_whitespace_between_refs_merge() {
    let (segments, _) = segment_answer("Seen in [S1] [S3].", &citations());
    assert_eq!(
        marker_ids(&segments),
        vec![vec!["c1".to_string(), "c3".to_string()]]
    );
}

#[test]
fn marker_ordinals_count_up_from_zero() {
    let (segments, _) = segment_answer("x [1] y [2] z [3]", &citations());
    let ordinals: Vec<usize> = segments
        .iter()
        .filter_map(|s| match s {
            Segment::Marker { ordinal, .. } => Some(*ordinal),
            Segment::Text { .. } => None,
        })
        .collect();
    assert_eq!(ordinals, vec![0, 1, 2]);
}

#[test]
fn unknown_references_are_dropped_with_a_warning() {
    let (segments, warnings) = segment_answer("See [2, 9].", &citations());
    assert_eq!(marker_ids(&segments), vec![vec!["c2".to_string()]]);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, "CITE_MARKER_UNKNOWN_REF");
}

#[test]
fn markers_with_only_unknown_references_add_no_trailing_group() {
    let (segments, warnings) = segment_answer("Claim one [7]. Claim two [9].", &citations());
    assert!(marker_ids(&segments).is_empty());
    assert_eq!(warnings.len(), 2);
    assert_eq!(
        segments,
        vec![
            Segment::Text {
                text: "Claim one ".to_string()
            },
            Segment::Text {
                text: ". Claim two ".to_string()
            },
            Segment::Text {
                text: ".".to_string()
            },
        ]
    );
}

#[test]
fn overflowing_reference_is_reported_as_unknown() {
    let (segments, warnings) = segment_answer("See [1] and [99999999999999999999999].", &citations());
    assert_eq!(marker_ids(&segments), vec![vec!["c1".to_string()]]);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, "CITE_MARKER_UNKNOWN_REF");
    assert_eq!(
        warnings[0].details.as_deref(),
        Some("ref=99999999999999999999999; available=3")
    );
}

#[test]
fn answer_without_markers_gets_a_trailing_group() {
    let (segments, _) = segment_answer("Plain answer.", &citations());
    assert_eq!(segments.len(), 2);
    assert_eq!(
        marker_ids(&segments),
        vec![vec!["c1".to_string(), "c2".to_string(), "c3".to_string()]]
    );

    let (segments, _) = segment_answer("Plain answer.", &[]);
    assert_eq!(
        segments,
        vec![Segment::Text {
            text: "Plain answer.".to_string()
        }]
    );
}

#[test]
fn duplicates_are_kept_in_order_but_reported() {
    let dup = vec![Citation::new("c1", "a.pdf"), Citation::new("c1", "a.pdf")];
    let msg = build_message(PipelinePayload {
        message_id: "m1".to_string(),
        answer: "Twice [1][2].".to_string(),
        citations: dup,
    });
    assert_eq!(msg.marker_count(), 1);
    let (_, group) = msg.markers().next().unwrap();
    assert_eq!(group.len(), 2);
    assert!(msg.warnings.iter().any(|w| w.code == "CITE_DUPLICATE_ID"));
}

#[test]
fn fingerprint_changes_when_the_answer_is_regenerated() {
    let cs = citations();
    let a = message_fingerprint("m1", "first answer", &cs);
    let b = message_fingerprint("m1", "first answer", &cs);
    let c = message_fingerprint("m1", "second answer", &cs);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn payload_parses_and_rejects_bad_input() {
    let raw = r#"{
        "message_id": "m7",
        "answer": "Grounded [1].",
        "citations": [
            {"id": "c1", "source": "paper.pdf", "page": 2, "confidence": 0.91, "documentType": "pdf"}
        ]
    }"#;
    let msg = parse_pipeline_payload(raw).unwrap();
    assert_eq!(msg.message_id, "m7");
    assert_eq!(msg.marker_count(), 1);
    assert_eq!(msg.citations[0].document_type.as_deref(), Some("pdf"));

    let err = parse_pipeline_payload("{not json").unwrap_err();
    assert_eq!(err.code, "CITE_PAYLOAD_INVALID");

    let err = parse_pipeline_payload(r#"{"message_id": " ", "answer": "x"}"#).unwrap_err();
    assert_eq!(err.code, "CITE_PAYLOAD_INVALID");
}
