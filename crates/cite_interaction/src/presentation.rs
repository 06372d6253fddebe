//! Presentation selector: which single affordance a marker shows.
//!
//! `Mode` is one enum per marker, so two affordances can never be open at once. Requests that
//! arrive in the same tick (a click right after a hover) simply overwrite the mode.

use serde::{Deserialize, Serialize};

use crate::event::{InputModality, Surface};
use crate::pagination::NavPolicy;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    HoverPreview,
    ExpandedCard,
    TouchSheetOpen,
}

impl Mode {
    pub fn is_open(self) -> bool {
        !matches!(self, Mode::Idle)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    HoverTooltip,
    ExpandedCard,
    FloatingTooltip,
    BottomSheet,
}

impl Affordance {
    /// Only the full-screen sheet locks body scroll.
    pub fn locks_scroll(self) -> bool {
        matches!(self, Affordance::BottomSheet)
    }

    /// Swipe-driven sheets clamp; button-driven tooltips and cards wrap.
    pub fn nav_policy(self) -> NavPolicy {
        match self {
            Affordance::BottomSheet => NavPolicy::Clamp,
            _ => NavPolicy::Wrap,
        }
    }

    pub fn is_anchored(self) -> bool {
        matches!(self, Affordance::HoverTooltip | Affordance::FloatingTooltip)
    }
}

/// What caused an open request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Hover,
    Click,
    Touch,
    Keyboard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "request", content = "trigger", rename_all = "snake_case")]
pub enum Request {
    Open(Trigger),
    Close,
}

/// Pure selector from `(mode, input modality)` on a given surface to the visible affordance.
pub fn select_affordance(mode: Mode, input: InputModality, surface: Surface) -> Option<Affordance> {
    match (mode, input) {
        (Mode::Idle, _) => None,
        // Touch never produces hover; the synthetic hover is suppressed at touchstart.
        (Mode::HoverPreview, InputModality::Touch) => None,
        (Mode::HoverPreview, _) => Some(Affordance::HoverTooltip),
        (Mode::ExpandedCard, _) => Some(Affordance::ExpandedCard),
        (Mode::TouchSheetOpen, _) => match surface {
            Surface::MobileTooltip => Some(Affordance::FloatingTooltip),
            Surface::MobileSheet | Surface::Desktop => Some(Affordance::BottomSheet),
        },
    }
}

/// Mode after applying `request`.
///
/// Hover only opens from idle and never downgrades an open card or sheet. Every other open
/// trigger goes straight to the surface's primary affordance, closing a hover preview.
pub fn next_mode(mode: Mode, request: Request, surface: Surface) -> Mode {
    match request {
        Request::Close => Mode::Idle,
        Request::Open(Trigger::Hover) => match (mode, surface) {
            (Mode::Idle, Surface::Desktop) => Mode::HoverPreview,
            (m, _) => m,
        },
        Request::Open(_) => match surface {
            Surface::Desktop => Mode::ExpandedCard,
            Surface::MobileTooltip | Surface::MobileSheet => Mode::TouchSheetOpen,
        },
    }
}
