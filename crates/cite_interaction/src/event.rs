use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Which family of affordances a marker uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Inline marker, hover tooltip, click-to-expand card.
    Desktop,
    /// Mobile group badge, tap opens a floating tooltip below the badge.
    MobileTooltip,
    /// Mobile marker, tap opens a bottom sheet.
    MobileSheet,
}

impl Surface {
    pub fn is_mobile(self) -> bool {
        !matches!(self, Surface::Desktop)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    Pointer,
    Touch,
    Keyboard,
}

/// Part of the UI an event landed on, from the marker's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HitRegion {
    Marker,
    Affordance,
    SheetHandle,
    SheetContent,
    Outside,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Enter,
    Space,
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

/// Raw input delivered to one marker. Anchors are whatever the host measured at event time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerEnter {
        region: HitRegion,
        #[serde(default)]
        anchor: Option<Rect>,
    },
    PointerLeave {
        region: HitRegion,
        to: HitRegion,
    },
    Click {
        #[serde(default)]
        anchor: Option<Rect>,
    },
    TouchStart {
        region: HitRegion,
        point: Point,
        #[serde(default)]
        anchor: Option<Rect>,
    },
    TouchMove {
        point: Point,
    },
    TouchEnd,
    TouchCancel,
    KeyDown {
        key: Key,
        #[serde(default)]
        anchor: Option<Rect>,
    },
    /// Pagination buttons inside the affordance.
    Navigate {
        direction: Direction,
    },
    /// Dot indicators inside the affordance.
    GoTo {
        index: usize,
    },
    CloseButton,
    /// Next animation frame; resolves deferred placement.
    Frame {
        #[serde(default)]
        anchor: Option<Rect>,
    },
}

impl InputEvent {
    pub fn modality(&self) -> Option<InputModality> {
        match self {
            InputEvent::PointerEnter { .. }
            | InputEvent::PointerLeave { .. }
            | InputEvent::Click { .. } => Some(InputModality::Pointer),
            InputEvent::TouchStart { .. }
            | InputEvent::TouchMove { .. }
            | InputEvent::TouchEnd
            | InputEvent::TouchCancel => Some(InputModality::Touch),
            InputEvent::KeyDown { .. } => Some(InputModality::Keyboard),
            InputEvent::Navigate { .. }
            | InputEvent::GoTo { .. }
            | InputEvent::CloseButton
            | InputEvent::Frame { .. } => None,
        }
    }

    pub fn anchor(&self) -> Option<Rect> {
        match self {
            InputEvent::PointerEnter { anchor, .. }
            | InputEvent::Click { anchor }
            | InputEvent::TouchStart { anchor, .. }
            | InputEvent::KeyDown { anchor, .. }
            | InputEvent::Frame { anchor } => *anchor,
            _ => None,
        }
    }
}
