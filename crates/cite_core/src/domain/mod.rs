use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ValidationWarning};

/// One piece of supporting evidence, as produced by the retrieval/generation pipeline.
///
/// Notes:
/// - Every field except `id` and `source` is optional; rendering falls back to placeholders.
/// - `confidence` is expected in [0,1] but is not trusted; see [`Citation::confidence_clamped`].
/// - The subsystem never mutates a citation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default, alias = "documentType")]
    pub document_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    Pdf,
    Word,
    Spreadsheet,
    Slides,
    Web,
    Text,
    Generic,
}

impl Citation {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            page: None,
            line: None,
            preview: None,
            summary: None,
            confidence: None,
            document_type: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Confidence forced into [0,1]. NaN is treated as absent.
    pub fn confidence_clamped(&self) -> Option<f32> {
        match self.confidence {
            Some(c) if c.is_nan() => None,
            Some(c) => Some(c.clamp(0.0, 1.0)),
            None => None,
        }
    }

    /// `"87% match"`, rounded to the nearest percent.
    pub fn confidence_label(&self) -> Option<String> {
        self.confidence_clamped()
            .map(|c| format!("{}% match", (c * 100.0).round() as u32))
    }

    /// `"Page 4, Line 12"`, `"Page 4"`, `"Line 12"`, or `None`.
    pub fn locator_label(&self) -> Option<String> {
        match (self.page, self.line) {
            (Some(p), Some(l)) => Some(format!("Page {p}, Line {l}")),
            (Some(p), None) => Some(format!("Page {p}")),
            (None, Some(l)) => Some(format!("Line {l}")),
            (None, None) => None,
        }
    }

    /// Icon key derived from `document_type`, falling back to the extension of `source`.
    pub fn icon_kind(&self) -> IconKind {
        if let Some(kind) = self.document_type.as_deref().and_then(icon_for_label) {
            return kind;
        }
        let src = self.source.trim().to_ascii_lowercase();
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("www.") {
            return IconKind::Web;
        }
        src.rsplit_once('.')
            .and_then(|(_, ext)| icon_for_label(ext))
            .unwrap_or(IconKind::Generic)
    }
}

fn icon_for_label(label: &str) -> Option<IconKind> {
    let l = label.trim().trim_start_matches('.').to_ascii_lowercase();
    let kind = match l.as_str() {
        "pdf" => IconKind::Pdf,
        "doc" | "docx" | "word" | "odt" | "rtf" => IconKind::Word,
        "xls" | "xlsx" | "csv" | "spreadsheet" | "ods" => IconKind::Spreadsheet,
        "ppt" | "pptx" | "slides" | "presentation" | "odp" => IconKind::Slides,
        "url" | "web" | "html" | "htm" | "webpage" => IconKind::Web,
        "txt" | "md" | "markdown" | "text" => IconKind::Text,
        _ => return None,
    };
    Some(kind)
}

/// Ordered, non-empty set of citations attached to one inline marker.
///
/// Order is pipeline insertion order. Duplicates are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Citation>", into = "Vec<Citation>")]
pub struct CitationGroup {
    citations: Vec<Citation>,
}

impl CitationGroup {
    pub fn new(citations: Vec<Citation>) -> Result<Self, AppError> {
        if citations.is_empty() {
            return Err(AppError::new(
                "CITE_GROUP_EMPTY",
                "A citation marker needs at least one citation",
            ));
        }
        Ok(Self { citations })
    }

    pub fn single(citation: Citation) -> Self {
        Self {
            citations: vec![citation],
        }
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    // Groups are never empty; kept for clippy's len_without_is_empty.
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.citations.len() == 1
    }

    pub fn first(&self) -> &Citation {
        &self.citations[0]
    }

    pub fn get(&self, index: usize) -> Option<&Citation> {
        self.citations.get(index)
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Citation> {
        self.citations.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.citations.iter().map(|c| c.id.as_str()).collect()
    }
}

impl TryFrom<Vec<Citation>> for CitationGroup {
    type Error = AppError;

    fn try_from(value: Vec<Citation>) -> Result<Self, Self::Error> {
        CitationGroup::new(value)
    }
}

impl From<CitationGroup> for Vec<Citation> {
    fn from(value: CitationGroup) -> Self {
        value.citations
    }
}

/// Check a response's citations for data issues the renderer will paper over.
pub fn validate_citations(citations: &[Citation]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();

    for (i, c) in citations.iter().enumerate() {
        if c.source.trim().is_empty() {
            warnings.push(
                ValidationWarning::new("CITE_SOURCE_EMPTY", "Citation has an empty source")
                    .with_details(format!("index={i}; id={}", c.id)),
            );
        }
        if let Some(conf) = c.confidence {
            if conf.is_nan() || !(0.0..=1.0).contains(&conf) {
                warnings.push(
                    ValidationWarning::new(
                        "CITE_CONFIDENCE_OUT_OF_RANGE",
                        "Citation confidence outside [0,1]",
                    )
                    .with_details(format!("id={}; value={conf}", c.id)),
                );
            }
        }
        match seen.get(c.id.as_str()) {
            Some(first) => warnings.push(
                ValidationWarning::new("CITE_DUPLICATE_ID", "Citation id repeated in response")
                    .with_details(format!("id={}; first={first}; again={i}", c.id)),
            ),
            None => {
                seen.insert(c.id.as_str(), i);
            }
        }
    }

    warnings
}
