use std::cell::Ref;
use std::collections::BTreeMap;

use cite_core::config::InteractionConfig;
use cite_core::error::AppError;
use cite_core::ingest::CitedMessage;

use crate::dismissal::{Document, MarkerId, SharedDocument};
use crate::event::{InputEvent, Key, Surface};
use crate::geometry::Viewport;
use crate::gesture::GestureAction;
use crate::marker::{AffordanceSizes, AffordanceView, MarkerController, MarkerUpdate};
use crate::presentation::Trigger;

/// All citation markers of one rendered chat message, plus the document singletons they share.
///
/// Enforces the cross-marker rules: opening a card, tooltip or sheet closes every other marker
/// first, and a regenerated message resets every marker.
pub struct MessageView {
    doc: SharedDocument,
    config: InteractionConfig,
    surface: Surface,
    viewport: Viewport,
    sizes: AffordanceSizes,
    message: CitedMessage,
    markers: BTreeMap<MarkerId, MarkerController>,
}

impl MessageView {
    pub fn new(message: CitedMessage, surface: Surface, viewport: Viewport, config: InteractionConfig) -> Self {
        Self::with_document(message, surface, viewport, config, Document::shared())
    }

    /// Mount into an existing document, e.g. alongside other messages of the same page.
    pub fn with_document(
        message: CitedMessage,
        surface: Surface,
        viewport: Viewport,
        config: InteractionConfig,
        doc: SharedDocument,
    ) -> Self {
        let mut view = Self {
            doc,
            config,
            surface,
            viewport,
            sizes: AffordanceSizes::default(),
            message,
            markers: BTreeMap::new(),
        };
        view.mount_markers();
        view
    }

    pub fn with_sizes(mut self, sizes: AffordanceSizes) -> Self {
        self.sizes = sizes;
        self.mount_markers();
        self
    }

    fn mount_markers(&mut self) {
        // Dropping the old controllers releases any scopes they held.
        self.markers.clear();
        for (ordinal, group) in self.message.markers() {
            let id = MarkerId(ordinal);
            let controller = MarkerController::new(
                id,
                group.clone(),
                self.surface,
                self.viewport,
                self.config,
                &self.doc,
            )
            .with_sizes(self.sizes);
            self.markers.insert(id, controller);
        }
        tracing::debug!(
            message = %self.message.message_id,
            markers = self.markers.len(),
            "markers mounted"
        );
    }

    pub fn message(&self) -> &CitedMessage {
        &self.message
    }

    pub fn document(&self) -> Ref<'_, Document> {
        self.doc.borrow()
    }

    pub fn shared_document(&self) -> SharedDocument {
        SharedDocument::clone(&self.doc)
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerController> {
        self.markers.get(&id)
    }

    pub fn marker_ids(&self) -> Vec<MarkerId> {
        self.markers.keys().copied().collect()
    }

    pub fn open_markers(&self) -> Vec<MarkerId> {
        self.markers
            .values()
            .filter(|m| m.is_open())
            .map(|m| m.id())
            .collect()
    }

    /// Swap in a new version of the message. Returns whether marker state was reset.
    ///
    /// An identical fingerprint (re-render of the same answer) keeps state.
    pub fn replace_message(&mut self, message: CitedMessage) -> bool {
        if message.fingerprint == self.message.fingerprint {
            return false;
        }
        tracing::info!(
            old = %self.message.message_id,
            new = %message.message_id,
            "message replaced; resetting citation markers"
        );
        self.message = message;
        self.mount_markers();
        true
    }

    pub fn advance_time(&mut self, now_ms: u64) {
        self.doc.borrow_mut().advance_to(now_ms);
    }

    /// Route one input event to a marker.
    pub fn dispatch(&mut self, id: MarkerId, event: InputEvent, now_ms: u64) -> Result<MarkerUpdate, AppError> {
        self.advance_time(now_ms);

        let rec = {
            let marker = self.markers.get_mut(&id).ok_or_else(|| marker_not_found(id))?;
            marker.recognize(&event)
        };

        // Hover previews are per-marker; only card, tooltip and sheet opens are exclusive.
        let closed_others = match rec.action {
            Some(GestureAction::Open(trigger)) if trigger != Trigger::Hover => self.close_all_except(Some(id)),
            _ => Vec::new(),
        };

        let marker = self.markers.get_mut(&id).ok_or_else(|| marker_not_found(id))?;
        let mut update = marker.apply(&event, rec);
        update.closed_others = closed_others;
        Ok(update)
    }

    /// Document-level pointer/touch down. `inside` names the marker whose marker or affordance
    /// region contains the target. Returns the markers that closed.
    pub fn document_pointer_down(&mut self, inside: Option<MarkerId>, now_ms: u64) -> Vec<MarkerId> {
        self.advance_time(now_ms);
        let hits = self.doc.borrow().outside_hits(inside);
        let mut closed = Vec::new();
        for id in hits {
            if let Some(marker) = self.markers.get_mut(&id) {
                if marker.force_close() {
                    tracing::debug!(marker = id.0, "closed by outside interaction");
                    closed.push(id);
                }
            }
        }
        closed
    }

    /// Document-level key press. Escape dismisses every open affordance.
    pub fn document_key_down(&mut self, key: Key, now_ms: u64) -> Vec<MarkerId> {
        self.advance_time(now_ms);
        if key != Key::Escape {
            return Vec::new();
        }
        self.close_all_except(None)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for marker in self.markers.values_mut() {
            marker.set_viewport(viewport);
        }
    }

    pub fn views(&self) -> Vec<AffordanceView> {
        self.markers.values().filter_map(|m| m.view()).collect()
    }

    /// Remove one marker. Its scope, listener and scroll lock go with it.
    pub fn unmount_marker(&mut self, id: MarkerId) -> bool {
        let removed = self.markers.remove(&id).is_some();
        if removed {
            tracing::debug!(marker = id.0, "marker unmounted");
        }
        removed
    }

    pub fn unmount_all(&mut self) {
        self.markers.clear();
    }

    fn close_all_except(&mut self, keep: Option<MarkerId>) -> Vec<MarkerId> {
        let mut closed = Vec::new();
        for (id, marker) in self.markers.iter_mut() {
            if Some(*id) != keep && marker.force_close() {
                closed.push(*id);
            }
        }
        closed
    }
}

fn marker_not_found(id: MarkerId) -> AppError {
    AppError::new("MARKER_NOT_FOUND", "No citation marker with that id in this message")
        .with_details(format!("marker={}", id.0))
}
