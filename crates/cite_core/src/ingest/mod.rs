use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{validate_citations, Citation, CitationGroup};
use crate::error::{AppError, ValidationWarning};

/// What the retrieval/generation collaborator hands us for one chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelinePayload {
    pub message_id: String,
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Marker { ordinal: usize, group: CitationGroup },
}

/// A chat message split into renderable text and citation markers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CitedMessage {
    pub message_id: String,
    pub answer: String,
    pub citations: Vec<Citation>,
    pub segments: Vec<Segment>,
    pub fingerprint: String,
    pub warnings: Vec<ValidationWarning>,
}

impl CitedMessage {
    pub fn markers(&self) -> impl Iterator<Item = (usize, &CitationGroup)> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Marker { ordinal, group } => Some((*ordinal, group)),
            Segment::Text { .. } => None,
        })
    }

    pub fn marker_count(&self) -> usize {
        self.markers().count()
    }
}

pub fn parse_pipeline_payload(raw: &str) -> Result<CitedMessage, AppError> {
    let payload: PipelinePayload = serde_json::from_str(raw).map_err(|e| {
        AppError::new("CITE_PAYLOAD_INVALID", "Failed to parse pipeline payload")
            .with_details(e.to_string())
    })?;
    if payload.message_id.trim().is_empty() {
        return Err(AppError::new(
            "CITE_PAYLOAD_INVALID",
            "Pipeline payload is missing message_id",
        ));
    }
    Ok(build_message(payload))
}

pub fn build_message(payload: PipelinePayload) -> CitedMessage {
    let fingerprint = message_fingerprint(&payload.message_id, &payload.answer, &payload.citations);
    let mut warnings = validate_citations(&payload.citations);
    let (segments, seg_warnings) = segment_answer(&payload.answer, &payload.citations);
    warnings.extend(seg_warnings);

    CitedMessage {
        message_id: payload.message_id,
        answer: payload.answer,
        citations: payload.citations,
        segments,
        fingerprint,
        warnings,
    }
}

/// Content-derived identity of a message. A regenerated answer gets a new fingerprint.
pub fn message_fingerprint(message_id: &str, answer: &str, citations: &[Citation]) -> String {
    let ids: Vec<&str> = citations.iter().map(|c| c.id.as_str()).collect();
    let payload = format!(
        "message_id={}\nanswer={}\ncitations={}",
        message_id,
        answer,
        ids.join("\u{1f}")
    );
    hex::encode(Sha256::digest(payload.as_bytes()))
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[\s*[Ss]?\d+(?:\s*,\s*[Ss]?\d+)*\s*\]").expect("marker pattern is valid")
    })
}

fn ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("ref pattern is valid"))
}

struct MarkerRun<'a> {
    start: usize,
    end: usize,
    /// Raw digit runs; resolved (or rejected) against the citation list later.
    refs: Vec<&'a str>,
}

fn collect_runs(answer: &str) -> Vec<MarkerRun<'_>> {
    let mut runs: Vec<MarkerRun<'_>> = Vec::new();
    for m in marker_re().find_iter(answer) {
        let refs: Vec<&str> = ref_re().find_iter(m.as_str()).map(|d| d.as_str()).collect();

        // `[1] [2]` and `[1][2]` share one marker.
        if let Some(last) = runs.last_mut() {
            if answer[last.end..m.start()].trim().is_empty() {
                last.end = m.end();
                last.refs.extend(refs);
                continue;
            }
        }
        runs.push(MarkerRun {
            start: m.start(),
            end: m.end(),
            refs,
        });
    }
    runs
}

/// Split answer text into text and marker segments.
///
/// Markers are bracketed 1-based references into `citations` (`[1]`, `[2, 3]`, `[S4]`).
/// Unknown references are dropped with a warning. An answer without markers gets one
/// trailing marker holding every citation.
pub fn segment_answer(answer: &str, citations: &[Citation]) -> (Vec<Segment>, Vec<ValidationWarning>) {
    let mut segments = Vec::new();
    let mut warnings = Vec::new();
    let mut cursor = 0;
    let mut ordinal = 0;

    let runs = collect_runs(answer);
    let has_markers = !runs.is_empty();

    for run in runs {
        if run.start > cursor {
            segments.push(Segment::Text {
                text: answer[cursor..run.start].to_string(),
            });
        }
        cursor = run.end;

        let mut resolved = Vec::with_capacity(run.refs.len());
        for r in run.refs {
            let citation = r
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| citations.get(i));
            match citation {
                Some(c) => resolved.push(c.clone()),
                None => {
                    tracing::warn!(reference = r, available = citations.len(), "dropping unknown citation reference");
                    warnings.push(
                        ValidationWarning::new(
                            "CITE_MARKER_UNKNOWN_REF",
                            "Answer references a citation that was not supplied",
                        )
                        .with_details(format!("ref={r}; available={}", citations.len())),
                    );
                }
            }
        }

        if let Ok(group) = CitationGroup::new(resolved) {
            segments.push(Segment::Marker { ordinal, group });
            ordinal += 1;
        }
    }

    if cursor < answer.len() {
        segments.push(Segment::Text {
            text: answer[cursor..].to_string(),
        });
    }

    if !has_markers {
        if let Ok(group) = CitationGroup::new(citations.to_vec()) {
            tracing::debug!(count = group.len(), "answer has no inline markers; appending trailing group");
            segments.push(Segment::Marker { ordinal, group });
        }
    }

    (segments, warnings)
}
