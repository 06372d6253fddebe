//! Placement of floating affordances relative to their anchor and the viewport.

use cite_core::config::InteractionConfig;
use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size, Viewport};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Above,
    Below,
}

/// Top-left corner plus the (possibly shrunk) size actually used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FloatingPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub side: Side,
}

/// Fixed screen-relative insets for the bottom sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SheetInsets {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    Floating(FloatingPlacement),
    Sheet(SheetInsets),
    /// Rendered in document flow under the marker.
    Inline,
    /// Anchor not measurable yet; retry on the next frame.
    Deferred,
}

impl Placement {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Placement::Deferred)
    }
}

/// Horizontal clamp to `[margin, viewport_width - width - margin]`.
///
/// An affordance wider than the viewport allows is shrunk to `viewport_width - 2 * margin`
/// so the interval is never empty. Returns `(x, width)`.
pub fn clamp_horizontal(desired_x: f64, width: f64, viewport_width: f64, margin: f64) -> (f64, f64) {
    let max_width = (viewport_width - 2.0 * margin).max(0.0);
    let width = width.min(max_width).max(0.0);
    let hi = viewport_width - width - margin;
    (desired_x.clamp(margin, hi.max(margin)), width)
}

/// Center the affordance on the anchor, `offset` away on `side`, clamped into the viewport.
///
/// The side flips when the preferred one would cross the vertical margin and the other fits.
pub fn place_floating(
    anchor: Rect,
    size: Size,
    viewport: Viewport,
    side: Side,
    offset: f64,
    margin: f64,
) -> FloatingPlacement {
    let (x, width) = clamp_horizontal(anchor.center_x() - size.width / 2.0, size.width, viewport.width, margin);

    let above = anchor.top() - offset - size.height;
    let below = anchor.bottom() + offset;
    let fits_above = above >= margin;
    let fits_below = below + size.height <= viewport.height - margin;

    let side = match side {
        Side::Above if !fits_above && fits_below => Side::Below,
        Side::Below if !fits_below && fits_above => Side::Above,
        s => s,
    };
    let y = match side {
        Side::Above => above,
        Side::Below => below,
    };

    FloatingPlacement {
        x,
        y,
        width,
        height: size.height,
        side,
    }
}

/// Hover tooltip: centered above the marker.
pub fn place_hover_tooltip(anchor: Rect, size: Size, viewport: Viewport, cfg: &InteractionConfig) -> FloatingPlacement {
    place_floating(
        anchor,
        size,
        viewport,
        Side::Above,
        cfg.tooltip_offset_above_px,
        cfg.viewport_margin_px,
    )
}

/// Mobile group tooltip: centered below the badge.
pub fn place_group_tooltip(anchor: Rect, size: Size, viewport: Viewport, cfg: &InteractionConfig) -> FloatingPlacement {
    place_floating(
        anchor,
        size,
        viewport,
        Side::Below,
        cfg.group_tooltip_offset_below_px,
        cfg.viewport_margin_px,
    )
}

pub fn sheet_insets(cfg: &InteractionConfig) -> SheetInsets {
    SheetInsets {
        left: cfg.sheet_inset_x_px,
        right: cfg.sheet_inset_x_px,
        bottom: cfg.sheet_inset_bottom_px,
    }
}
