use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Character limits for the preview body of each affordance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PreviewChars {
    pub hover_tooltip: usize,
    pub touch_tooltip: usize,
    pub group_tooltip: usize,
    pub card: usize,
    pub marker_hint: usize,
}

impl Default for PreviewChars {
    fn default() -> Self {
        Self {
            hover_tooltip: 150,
            touch_tooltip: 120,
            group_tooltip: 80,
            card: 200,
            marker_hint: 60,
        }
    }
}

/// Thresholds and geometry constants for citation interaction.
///
/// All lengths are CSS pixels, all durations milliseconds. Any field may be omitted from a
/// config file; omitted fields keep their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    pub dismiss_threshold_px: f64,
    pub swipe_commit_px: f64,
    pub swipe_navigate_px: f64,
    pub tooltip_offset_above_px: f64,
    pub group_tooltip_offset_below_px: f64,
    pub viewport_margin_px: f64,
    pub sheet_inset_x_px: f64,
    pub sheet_inset_bottom_px: f64,
    pub outside_dismiss_delay_ms: u64,
    pub transition_ms: u64,
    pub preview_chars: PreviewChars,
}

pub const TRANSITION_MIN_MS: u64 = 200;
pub const TRANSITION_MAX_MS: u64 = 700;

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            dismiss_threshold_px: 100.0,
            swipe_commit_px: 10.0,
            swipe_navigate_px: 50.0,
            tooltip_offset_above_px: 40.0,
            group_tooltip_offset_below_px: 8.0,
            viewport_margin_px: 16.0,
            sheet_inset_x_px: 16.0,
            sheet_inset_bottom_px: 90.0,
            outside_dismiss_delay_ms: 100,
            transition_ms: 300,
            preview_chars: PreviewChars::default(),
        }
    }
}

impl InteractionConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let cfg: InteractionConfig = serde_json::from_str(raw).map_err(|e| {
            AppError::new("CONFIG_PARSE_FAILED", "Failed to parse interaction config")
                .with_details(e.to_string())
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read interaction config")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let cfg = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "loaded interaction config");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        for (field, v) in [
            ("dismiss_threshold_px", self.dismiss_threshold_px),
            ("swipe_commit_px", self.swipe_commit_px),
            ("swipe_navigate_px", self.swipe_navigate_px),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(invalid(field, format!("must be > 0; value={v}")));
            }
        }
        for (field, v) in [
            ("tooltip_offset_above_px", self.tooltip_offset_above_px),
            ("group_tooltip_offset_below_px", self.group_tooltip_offset_below_px),
            ("viewport_margin_px", self.viewport_margin_px),
            ("sheet_inset_x_px", self.sheet_inset_x_px),
            ("sheet_inset_bottom_px", self.sheet_inset_bottom_px),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(field, format!("must be >= 0; value={v}")));
            }
        }
        if self.swipe_navigate_px <= self.swipe_commit_px {
            return Err(invalid(
                "swipe_navigate_px",
                format!(
                    "must exceed swipe_commit_px; navigate={}; commit={}",
                    self.swipe_navigate_px, self.swipe_commit_px
                ),
            ));
        }
        if !(TRANSITION_MIN_MS..=TRANSITION_MAX_MS).contains(&self.transition_ms) {
            return Err(invalid(
                "transition_ms",
                format!(
                    "must lie in {TRANSITION_MIN_MS}..={TRANSITION_MAX_MS}; value={}",
                    self.transition_ms
                ),
            ));
        }
        let p = self.preview_chars;
        for (field, v) in [
            ("preview_chars.hover_tooltip", p.hover_tooltip),
            ("preview_chars.touch_tooltip", p.touch_tooltip),
            ("preview_chars.group_tooltip", p.group_tooltip),
            ("preview_chars.card", p.card),
            ("preview_chars.marker_hint", p.marker_hint),
        ] {
            if v == 0 {
                return Err(invalid(field, "must be > 0"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, details: impl Into<String>) -> AppError {
    AppError::new("CONFIG_INVALID", format!("Invalid interaction config: {field}"))
        .with_details(details)
}
