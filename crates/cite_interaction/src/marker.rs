//! Per-marker controller: owns the interaction state of one inline citation marker and
//! wires the recognizer, selector, pager, positioning and dismissal scope together.

use cite_core::a11y::{marker_aria, MarkerAria};
use cite_core::config::InteractionConfig;
use cite_core::domain::{CitationGroup, IconKind};
use cite_core::text::{card_text, tooltip_text, DerivedText};
use serde::{Deserialize, Serialize};

use crate::dismissal::{MarkerId, OpenScope, SharedDocument};
use crate::event::{InputEvent, InputModality, Surface};
use crate::geometry::{Rect, Size, Viewport};
use crate::gesture::{GestureAction, GestureContext, GestureRecognizer, GestureTrackingState, Recognition, SheetFeedback};
use crate::pagination::Pager;
use crate::positioning::{place_group_tooltip, place_hover_tooltip, sheet_insets, Placement};
use crate::presentation::{next_mode, select_affordance, Affordance, Mode, Request};

/// Desired sizes of the floating affordances, as laid out by the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AffordanceSizes {
    pub hover_tooltip: Size,
    pub floating_tooltip: Size,
}

impl Default for AffordanceSizes {
    fn default() -> Self {
        Self {
            hover_tooltip: Size::new(320.0, 160.0),
            floating_tooltip: Size::new(300.0, 200.0),
        }
    }
}

/// Snapshot of a marker's transient state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InteractionState {
    pub mode: Mode,
    pub active_index: usize,
    pub anchor_rect: Option<Rect>,
    pub gesture: GestureTrackingState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagerView {
    pub label: String,
    pub index: usize,
    pub len: usize,
    pub can_prev: bool,
    pub can_next: bool,
}

/// Everything a renderer needs to draw the open affordance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AffordanceView {
    pub marker: MarkerId,
    pub affordance: Affordance,
    pub placement: Placement,
    pub citation_id: String,
    pub source: String,
    pub icon: IconKind,
    pub title: String,
    pub body: String,
    pub summary: Option<String>,
    pub locator: Option<String>,
    pub confidence: Option<String>,
    pub pager: Option<PagerView>,
    pub sheet: Option<SheetFeedback>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerUpdate {
    pub marker: MarkerId,
    pub action: Option<GestureAction>,
    pub prevent_default: bool,
    pub mode_before: Mode,
    pub mode_after: Mode,
    pub active_index: usize,
    /// Other markers closed because this one opened a card, tooltip or sheet.
    #[serde(default)]
    pub closed_others: Vec<MarkerId>,
}

impl MarkerUpdate {
    pub fn opened(&self) -> bool {
        self.mode_after.is_open() && self.mode_before != self.mode_after
    }

    pub fn closed(&self) -> bool {
        self.mode_before.is_open() && !self.mode_after.is_open()
    }
}

pub struct MarkerController {
    id: MarkerId,
    group: CitationGroup,
    surface: Surface,
    config: InteractionConfig,
    sizes: AffordanceSizes,
    viewport: Viewport,
    doc: SharedDocument,
    mode: Mode,
    modality: InputModality,
    pager: Pager,
    anchor: Option<Rect>,
    recognizer: GestureRecognizer,
    scope: Option<OpenScope>,
    placement: Option<Placement>,
    sheet: SheetFeedback,
}

impl MarkerController {
    pub fn new(
        id: MarkerId,
        group: CitationGroup,
        surface: Surface,
        viewport: Viewport,
        config: InteractionConfig,
        doc: &SharedDocument,
    ) -> Self {
        let pager = Pager::new(group.len());
        Self {
            id,
            group,
            surface,
            config,
            sizes: AffordanceSizes::default(),
            viewport,
            doc: SharedDocument::clone(doc),
            mode: Mode::Idle,
            modality: InputModality::Pointer,
            pager,
            anchor: None,
            recognizer: GestureRecognizer::new(&config),
            scope: None,
            placement: None,
            sheet: SheetFeedback::default(),
        }
    }

    pub fn with_sizes(mut self, sizes: AffordanceSizes) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn group(&self) -> &CitationGroup {
        &self.group
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_open()
    }

    pub fn active_index(&self) -> usize {
        self.pager.index()
    }

    pub fn affordance(&self) -> Option<Affordance> {
        select_affordance(self.mode, self.modality, self.surface)
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn holds_scope(&self) -> bool {
        self.scope.is_some()
    }

    pub fn state(&self) -> InteractionState {
        InteractionState {
            mode: self.mode,
            active_index: self.pager.index(),
            anchor_rect: self.anchor,
            gesture: self.recognizer.tracking(),
        }
    }

    pub fn aria(&self) -> MarkerAria {
        let expanded = matches!(self.mode, Mode::ExpandedCard | Mode::TouchSheetOpen);
        marker_aria(&self.group, expanded)
    }

    /// Short preview for the marker's native title attribute.
    pub fn hint(&self) -> String {
        tooltip_text(self.group.first(), self.config.preview_chars.marker_hint).body
    }

    /// First phase of dispatch: classify the event without changing the mode.
    pub fn recognize(&mut self, event: &InputEvent) -> Recognition {
        if let Some(rect) = event.anchor() {
            self.anchor = Some(rect);
        }
        let ctx = GestureContext {
            mode: self.mode,
            affordance: self.affordance(),
            surface: self.surface,
            active_index: self.pager.index(),
            group_len: self.group.len(),
        };
        self.recognizer.handle(event, &ctx)
    }

    /// Second phase of dispatch: apply a recognition produced by [`Self::recognize`].
    pub fn apply(&mut self, event: &InputEvent, rec: Recognition) -> MarkerUpdate {
        let before = self.mode;

        if let Some(feedback) = rec.sheet {
            if self.affordance() == Some(Affordance::BottomSheet) {
                self.sheet = feedback;
            }
        }

        match rec.action {
            Some(GestureAction::Open(trigger)) => {
                let next = next_mode(self.mode, Request::Open(trigger), self.surface);
                self.transition(next, event.modality().unwrap_or(InputModality::Pointer));
            }
            Some(GestureAction::Close) | Some(GestureAction::Dismiss) => {
                self.transition(Mode::Idle, self.modality);
            }
            Some(GestureAction::NavigatePrev) => {
                if let Some(a) = self.affordance() {
                    self.pager.prev(a.nav_policy());
                }
            }
            Some(GestureAction::NavigateNext) => {
                if let Some(a) = self.affordance() {
                    self.pager.next(a.nav_policy());
                }
            }
            Some(GestureAction::GoTo(index)) => {
                self.pager.go_to(index);
            }
            None => {}
        }

        if matches!(event, InputEvent::Frame { .. }) {
            self.resolve_deferred();
        }

        if let Some(action) = rec.action {
            tracing::debug!(
                marker = self.id.0,
                ?action,
                from = ?before,
                to = ?self.mode,
                index = self.pager.index(),
                "marker action applied"
            );
        }

        MarkerUpdate {
            marker: self.id,
            action: rec.action,
            prevent_default: rec.prevent_default,
            mode_before: before,
            mode_after: self.mode,
            active_index: self.pager.index(),
            closed_others: Vec::new(),
        }
    }

    pub fn handle(&mut self, event: &InputEvent) -> MarkerUpdate {
        let rec = self.recognize(event);
        self.apply(event, rec)
    }

    /// Close from outside the marker (outside click, another marker opening, escape).
    pub fn force_close(&mut self) -> bool {
        if !self.mode.is_open() {
            return false;
        }
        self.transition(Mode::Idle, self.modality);
        true
    }

    /// Back to a freshly mounted state.
    pub fn reset(&mut self) {
        self.transition(Mode::Idle, InputModality::Pointer);
        self.pager.reset();
        self.recognizer.reset();
        self.anchor = None;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let (Some(Placement::Floating(_)), Some(a)) = (self.placement, self.affordance()) {
            self.placement = Some(self.place(a));
        }
    }

    fn transition(&mut self, next: Mode, modality: InputModality) {
        if next == self.mode {
            return;
        }
        let from = self.mode;

        // Release before acquiring so one marker never holds two scopes.
        self.scope = None;
        self.recognizer.cancel_tracking();
        self.sheet = SheetFeedback::default();
        self.placement = None;
        self.mode = next;

        if next == Mode::Idle {
            tracing::debug!(marker = self.id.0, from = ?from, "affordance closed");
            return;
        }

        self.modality = modality;
        if from == Mode::Idle {
            self.pager.reset();
        }
        let Some(affordance) = self.affordance() else {
            return;
        };
        self.scope = Some(OpenScope::acquire(
            &self.doc,
            self.id,
            self.config.outside_dismiss_delay_ms,
            affordance.locks_scroll(),
        ));
        self.placement = Some(self.place(affordance));
        tracing::debug!(marker = self.id.0, from = ?from, ?affordance, "affordance opened");
    }

    fn place(&self, affordance: Affordance) -> Placement {
        match affordance {
            Affordance::BottomSheet => Placement::Sheet(sheet_insets(&self.config)),
            Affordance::ExpandedCard => Placement::Inline,
            Affordance::HoverTooltip | Affordance::FloatingTooltip => {
                let Some(anchor) = self.anchor.filter(Rect::is_measurable) else {
                    tracing::debug!(marker = self.id.0, "anchor not measurable; deferring placement");
                    return Placement::Deferred;
                };
                let placed = if affordance == Affordance::HoverTooltip {
                    place_hover_tooltip(anchor, self.sizes.hover_tooltip, self.viewport, &self.config)
                } else {
                    place_group_tooltip(anchor, self.sizes.floating_tooltip, self.viewport, &self.config)
                };
                Placement::Floating(placed)
            }
        }
    }

    fn resolve_deferred(&mut self) {
        if self.placement != Some(Placement::Deferred) {
            return;
        }
        let Some(affordance) = self.affordance() else {
            return;
        };
        let placement = self.place(affordance);
        if placement.is_deferred() {
            tracing::debug!(marker = self.id.0, "anchor still not measurable; not rendering");
            self.transition(Mode::Idle, self.modality);
        } else {
            self.placement = Some(placement);
        }
    }

    /// Render model of the open affordance, or `None` when nothing should be drawn.
    pub fn view(&self) -> Option<AffordanceView> {
        let affordance = self.affordance()?;
        let placement = self.placement.filter(|p| !p.is_deferred())?;
        let citation = self.group.get(self.pager.index())?;
        let chars = self.config.preview_chars;

        let DerivedText { title, body, .. } = match affordance {
            Affordance::HoverTooltip => tooltip_text(citation, chars.hover_tooltip),
            Affordance::FloatingTooltip if self.group.is_single() => tooltip_text(citation, chars.touch_tooltip),
            Affordance::FloatingTooltip => tooltip_text(citation, chars.group_tooltip),
            Affordance::ExpandedCard | Affordance::BottomSheet => card_text(citation, chars.card),
        };

        let pager = (!self.group.is_single()).then(|| {
            let policy = affordance.nav_policy();
            PagerView {
                label: self.pager.label(),
                index: self.pager.index(),
                len: self.pager.len(),
                can_prev: self.pager.can_prev(policy),
                can_next: self.pager.can_next(policy),
            }
        });

        Some(AffordanceView {
            marker: self.id,
            affordance,
            placement,
            citation_id: citation.id.clone(),
            source: citation.source.clone(),
            icon: citation.icon_kind(),
            title,
            body,
            summary: (affordance == Affordance::ExpandedCard)
                .then(|| citation.summary.clone())
                .flatten(),
            locator: citation.locator_label(),
            confidence: citation.confidence_label(),
            pager,
            sheet: (affordance == Affordance::BottomSheet).then_some(self.sheet),
        })
    }
}
