use serde::{Deserialize, Serialize};

use crate::domain::{Citation, CitationGroup};

/// Accessibility attributes every marker exposes, independent of the active affordance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerAria {
    pub role: String,
    pub aria_haspopup: String,
    pub aria_expanded: bool,
    pub aria_label: String,
}

/// `"Citation: {source}[, Page {page}]"`.
pub fn citation_label(citation: &Citation) -> String {
    let source = citation.source.trim();
    match citation.page {
        Some(page) => format!("Citation: {source}, Page {page}"),
        None => format!("Citation: {source}"),
    }
}

/// Label for a marker; groups append `" and {n} more"`.
pub fn marker_label(group: &CitationGroup) -> String {
    let mut label = citation_label(group.first());
    if group.len() > 1 {
        label.push_str(&format!(" and {} more", group.len() - 1));
    }
    label
}

pub fn marker_aria(group: &CitationGroup, expanded: bool) -> MarkerAria {
    MarkerAria {
        role: "button".to_string(),
        aria_haspopup: "dialog".to_string(),
        aria_expanded: expanded,
        aria_label: marker_label(group),
    }
}
