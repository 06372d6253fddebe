//! Gesture recognizer: raw pointer/touch/key input to semantic actions.
//!
//! ```text
//! Idle -> TrackingVertical   (touchstart on the sheet handle)
//! Idle -> Undecided          (touchstart in sheet content)
//! Undecided -> TrackingHorizontal | TrackingVertical   (first axis past the travel guard)
//! Undecided -> Locked        (horizontal travel on a single-citation group)
//! * -> Idle                  (touchend / touchcancel)
//! ```
//!
//! Axis exclusivity is structural: a committed state carries only its own axis, so the other
//! tracker has nothing to read until the sequence ends.

use cite_core::config::InteractionConfig;
use serde::{Deserialize, Serialize};

use crate::event::{Direction, HitRegion, InputEvent, Key, Surface};
use crate::geometry::Point;
use crate::presentation::{Affordance, Mode, Trigger};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GestureTrackingState {
    #[default]
    Idle,
    Undecided {
        start: Point,
        current: Point,
    },
    TrackingVertical {
        start_y: f64,
        current_y: f64,
    },
    TrackingHorizontal {
        start_x: f64,
        current_x: f64,
    },
    /// Horizontal axis claimed without pagination; ignored until the sequence ends.
    Locked,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum GestureAction {
    Open(Trigger),
    Close,
    NavigatePrev,
    NavigateNext,
    GoTo(usize),
    Dismiss,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// 1:1 tracking while a finger is down.
    #[default]
    None,
    Eased { duration_ms: u64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SheetFeedback {
    pub offset_y: f64,
    pub transition: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Recognition {
    pub action: Option<GestureAction>,
    /// The host must call `preventDefault` on the source event.
    pub prevent_default: bool,
    pub sheet: Option<SheetFeedback>,
}

impl Recognition {
    fn none() -> Self {
        Self::default()
    }

    fn action(action: GestureAction) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    fn prevented(mut self) -> Self {
        self.prevent_default = true;
        self
    }
}

/// Marker state the recognizer reads but never owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub mode: Mode,
    pub affordance: Option<Affordance>,
    pub surface: Surface,
    pub active_index: usize,
    pub group_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct HoverPresence {
    over_marker: bool,
    over_affordance: bool,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    tracking: GestureTrackingState,
    hover: HoverPresence,
    dismiss_threshold: f64,
    commit_travel: f64,
    navigate_threshold: f64,
    transition_ms: u64,
}

impl GestureRecognizer {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            tracking: GestureTrackingState::Idle,
            hover: HoverPresence::default(),
            dismiss_threshold: config.dismiss_threshold_px,
            commit_travel: config.swipe_commit_px,
            navigate_threshold: config.swipe_navigate_px,
            transition_ms: config.transition_ms,
        }
    }

    pub fn tracking(&self) -> GestureTrackingState {
        self.tracking
    }

    /// Drop any in-flight touch sequence.
    pub fn cancel_tracking(&mut self) {
        self.tracking = GestureTrackingState::Idle;
    }

    pub fn reset(&mut self) {
        self.tracking = GestureTrackingState::Idle;
        self.hover = HoverPresence::default();
    }

    pub fn handle(&mut self, event: &InputEvent, ctx: &GestureContext) -> Recognition {
        match *event {
            InputEvent::PointerEnter { region, .. } => self.pointer_enter(region, ctx),
            InputEvent::PointerLeave { region, to } => self.pointer_leave(region, to, ctx),
            InputEvent::Click { .. } => Recognition::action(toggle(ctx, Trigger::Click)),
            InputEvent::TouchStart { region, point, .. } => self.touch_start(region, point, ctx),
            InputEvent::TouchMove { point } => self.touch_move(point, ctx),
            InputEvent::TouchEnd => self.touch_end(ctx),
            InputEvent::TouchCancel => self.touch_cancel(),
            InputEvent::KeyDown { key, .. } => key_down(key, ctx),
            InputEvent::Navigate { direction } if ctx.mode.is_open() => match direction {
                Direction::Prev => Recognition::action(GestureAction::NavigatePrev),
                Direction::Next => Recognition::action(GestureAction::NavigateNext),
            },
            InputEvent::GoTo { index } if ctx.mode.is_open() => {
                Recognition::action(GestureAction::GoTo(index))
            }
            InputEvent::CloseButton if ctx.mode.is_open() => {
                Recognition::action(GestureAction::Close)
            }
            _ => Recognition::none(),
        }
    }

    fn pointer_enter(&mut self, region: HitRegion, ctx: &GestureContext) -> Recognition {
        match region {
            HitRegion::Marker => {
                self.hover.over_marker = true;
                if ctx.surface == Surface::Desktop && ctx.mode == Mode::Idle {
                    return Recognition::action(GestureAction::Open(Trigger::Hover));
                }
            }
            HitRegion::Affordance => self.hover.over_affordance = true,
            _ => {}
        }
        Recognition::none()
    }

    fn pointer_leave(&mut self, region: HitRegion, to: HitRegion, ctx: &GestureContext) -> Recognition {
        match region {
            HitRegion::Marker => self.hover.over_marker = false,
            HitRegion::Affordance => self.hover.over_affordance = false,
            _ => {}
        }
        // Moving between marker and tooltip must not flicker the tooltip closed.
        match to {
            HitRegion::Marker => self.hover.over_marker = true,
            HitRegion::Affordance => self.hover.over_affordance = true,
            _ => {}
        }
        if ctx.mode == Mode::HoverPreview && !self.hover.over_marker && !self.hover.over_affordance {
            return Recognition::action(GestureAction::Close);
        }
        Recognition::none()
    }

    fn touch_start(&mut self, region: HitRegion, point: Point, ctx: &GestureContext) -> Recognition {
        let sheet_open = ctx.affordance == Some(Affordance::BottomSheet);
        match region {
            HitRegion::Marker => {
                self.tracking = GestureTrackingState::Idle;
                Recognition::action(toggle(ctx, Trigger::Touch)).prevented()
            }
            HitRegion::SheetHandle if sheet_open => {
                self.tracking = GestureTrackingState::TrackingVertical {
                    start_y: point.y,
                    current_y: point.y,
                };
                Recognition {
                    sheet: Some(self.drag_feedback(0.0)),
                    ..Recognition::none()
                }
            }
            HitRegion::SheetContent if sheet_open => {
                self.tracking = GestureTrackingState::Undecided {
                    start: point,
                    current: point,
                };
                Recognition::none()
            }
            _ => Recognition::none(),
        }
    }

    fn touch_move(&mut self, point: Point, ctx: &GestureContext) -> Recognition {
        match self.tracking {
            GestureTrackingState::Idle | GestureTrackingState::Locked => Recognition::none(),
            GestureTrackingState::TrackingVertical { start_y, .. } => {
                self.tracking = GestureTrackingState::TrackingVertical {
                    start_y,
                    current_y: point.y,
                };
                Recognition {
                    sheet: Some(self.drag_feedback(point.y - start_y)),
                    ..Recognition::none()
                }
                .prevented()
            }
            GestureTrackingState::TrackingHorizontal { start_x, .. } => {
                self.tracking = GestureTrackingState::TrackingHorizontal {
                    start_x,
                    current_x: point.x,
                };
                Recognition::none().prevented()
            }
            GestureTrackingState::Undecided { start, .. } => {
                let dx = (point.x - start.x).abs();
                let dy = (point.y - start.y).abs();
                if dx > dy && dx > self.commit_travel && ctx.group_len <= 1 {
                    tracing::debug!(dx, dy, "horizontal travel on single citation; axis locked");
                    self.tracking = GestureTrackingState::Locked;
                    return Recognition::none();
                }
                if dx > dy && dx > self.commit_travel {
                    tracing::debug!(dx, dy, "committed horizontal swipe");
                    self.tracking = GestureTrackingState::TrackingHorizontal {
                        start_x: start.x,
                        current_x: point.x,
                    };
                    return Recognition::none().prevented();
                }
                if dy > dx && dy > self.commit_travel {
                    tracing::debug!(dx, dy, "committed vertical drag");
                    self.tracking = GestureTrackingState::TrackingVertical {
                        start_y: start.y,
                        current_y: point.y,
                    };
                    return Recognition {
                        sheet: Some(self.drag_feedback(point.y - start.y)),
                        ..Recognition::none()
                    }
                    .prevented();
                }
                self.tracking = GestureTrackingState::Undecided {
                    start,
                    current: point,
                };
                Recognition::none()
            }
        }
    }

    fn touch_end(&mut self, ctx: &GestureContext) -> Recognition {
        let tracking = std::mem::take(&mut self.tracking);
        match tracking {
            GestureTrackingState::TrackingVertical { start_y, current_y } => {
                let delta_y = (current_y - start_y).max(0.0);
                if delta_y > self.dismiss_threshold {
                    tracing::debug!(delta_y, "sheet dismissed by drag");
                    Recognition {
                        action: Some(GestureAction::Dismiss),
                        prevent_default: false,
                        sheet: Some(self.release_feedback(delta_y)),
                    }
                } else {
                    Recognition {
                        sheet: Some(self.release_feedback(0.0)),
                        ..Recognition::none()
                    }
                }
            }
            GestureTrackingState::TrackingHorizontal { start_x, current_x } => {
                let delta_x = current_x - start_x;
                let action = if ctx.group_len <= 1 {
                    None
                } else if delta_x > self.navigate_threshold && ctx.active_index > 0 {
                    Some(GestureAction::NavigatePrev)
                } else if delta_x < -self.navigate_threshold && ctx.active_index + 1 < ctx.group_len {
                    Some(GestureAction::NavigateNext)
                } else {
                    None
                };
                Recognition {
                    action,
                    ..Recognition::none()
                }
            }
            GestureTrackingState::Undecided { .. }
            | GestureTrackingState::Locked
            | GestureTrackingState::Idle => Recognition::none(),
        }
    }

    fn touch_cancel(&mut self) -> Recognition {
        let was_vertical = matches!(self.tracking, GestureTrackingState::TrackingVertical { .. });
        self.tracking = GestureTrackingState::Idle;
        if was_vertical {
            return Recognition {
                sheet: Some(self.release_feedback(0.0)),
                ..Recognition::none()
            };
        }
        Recognition::none()
    }

    fn drag_feedback(&self, delta_y: f64) -> SheetFeedback {
        SheetFeedback {
            offset_y: delta_y.max(0.0),
            transition: Transition::None,
        }
    }

    fn release_feedback(&self, offset_y: f64) -> SheetFeedback {
        SheetFeedback {
            offset_y,
            transition: Transition::Eased {
                duration_ms: self.transition_ms,
            },
        }
    }
}

/// Click, tap and Enter/Space share toggle semantics.
fn toggle(ctx: &GestureContext, trigger: Trigger) -> GestureAction {
    match ctx.mode {
        Mode::ExpandedCard | Mode::TouchSheetOpen => GestureAction::Close,
        Mode::Idle | Mode::HoverPreview => GestureAction::Open(trigger),
    }
}

fn key_down(key: Key, ctx: &GestureContext) -> Recognition {
    match key {
        Key::Escape if ctx.mode.is_open() => Recognition::action(GestureAction::Dismiss),
        Key::Enter | Key::Space => Recognition::action(toggle(ctx, Trigger::Keyboard)).prevented(),
        Key::ArrowLeft if ctx.mode.is_open() => Recognition::action(GestureAction::NavigatePrev),
        Key::ArrowRight if ctx.mode.is_open() => Recognition::action(GestureAction::NavigateNext),
        _ => Recognition::none(),
    }
}
