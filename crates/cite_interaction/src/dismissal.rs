//! Dismissal & focus controller: document-wide listeners, timers and the body scroll lock.
//!
//! Everything an open affordance acquires from the document is tied to one [`OpenScope`].
//! Dropping the scope is the only release path, so close, navigate-away and unmount all run
//! the same cleanup.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScopeEntry {
    owner: MarkerId,
    attach_at_ms: u64,
    listening: bool,
}

/// Process-wide singletons shared by every marker of a page.
#[derive(Debug, Default)]
pub struct Document {
    now_ms: u64,
    next_scope: u64,
    scopes: BTreeMap<ScopeId, ScopeEntry>,
    scroll_lock: Option<ScopeId>,
}

pub type SharedDocument = Rc<RefCell<Document>>;

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDocument {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward and attach every outside listener whose delay has elapsed.
    /// Returns how many listeners were attached.
    pub fn advance_to(&mut self, now_ms: u64) -> usize {
        self.now_ms = self.now_ms.max(now_ms);
        let mut attached = 0;
        for (id, entry) in self.scopes.iter_mut() {
            if !entry.listening && entry.attach_at_ms <= self.now_ms {
                entry.listening = true;
                attached += 1;
                tracing::debug!(scope = id.0, marker = entry.owner.0, "outside listener attached");
            }
        }
        attached
    }

    pub fn listener_count(&self) -> usize {
        self.scopes.values().filter(|e| e.listening).count()
    }

    pub fn pending_timer_count(&self) -> usize {
        self.scopes.values().filter(|e| !e.listening).count()
    }

    pub fn open_scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.is_some()
    }

    pub fn scroll_locked_by(&self) -> Option<MarkerId> {
        self.scroll_lock
            .and_then(|id| self.scopes.get(&id))
            .map(|e| e.owner)
    }

    /// Markers whose outside listener fires for a pointer/touch down.
    ///
    /// `inside` is the marker whose marker or affordance region contains the target, if any.
    pub fn outside_hits(&self, inside: Option<MarkerId>) -> Vec<MarkerId> {
        let mut out: Vec<MarkerId> = self
            .scopes
            .values()
            .filter(|e| e.listening && Some(e.owner) != inside)
            .map(|e| e.owner)
            .collect();
        out.dedup();
        out
    }

    fn register(&mut self, owner: MarkerId, attach_delay_ms: u64, lock_scroll: bool) -> ScopeId {
        self.next_scope += 1;
        let id = ScopeId(self.next_scope);
        self.scopes.insert(
            id,
            ScopeEntry {
                owner,
                attach_at_ms: self.now_ms.saturating_add(attach_delay_ms),
                listening: false,
            },
        );
        if lock_scroll {
            if let Some(prev) = self.scroll_lock.replace(id) {
                tracing::warn!(previous = prev.0, scope = id.0, "scroll lock taken over");
            }
            tracing::debug!(scope = id.0, marker = owner.0, "body scroll locked");
        }
        id
    }

    fn release(&mut self, id: ScopeId) {
        let Some(entry) = self.scopes.remove(&id) else {
            return;
        };
        if self.scroll_lock == Some(id) {
            self.scroll_lock = None;
            tracing::debug!(scope = id.0, marker = entry.owner.0, "body scroll unlocked");
        }
        tracing::debug!(
            scope = id.0,
            marker = entry.owner.0,
            was_listening = entry.listening,
            "scope released"
        );
    }
}

/// Resources held by one open affordance: the delayed outside listener and, for the
/// full-screen sheet, the body scroll lock.
#[derive(Debug)]
pub struct OpenScope {
    doc: SharedDocument,
    id: ScopeId,
    owner: MarkerId,
    locks_scroll: bool,
}

impl OpenScope {
    pub fn acquire(doc: &SharedDocument, owner: MarkerId, attach_delay_ms: u64, lock_scroll: bool) -> Self {
        let id = doc.borrow_mut().register(owner, attach_delay_ms, lock_scroll);
        Self {
            doc: Rc::clone(doc),
            id,
            owner,
            locks_scroll: lock_scroll,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn owner(&self) -> MarkerId {
        self.owner
    }

    pub fn locks_scroll(&self) -> bool {
        self.locks_scroll
    }
}

impl Drop for OpenScope {
    fn drop(&mut self) {
        match self.doc.try_borrow_mut() {
            Ok(mut doc) => doc.release(self.id),
            // Only reachable if a scope is dropped mid-dispatch.
            Err(_) => tracing::warn!(scope = self.id.0, "document busy; scope leaked"),
        }
    }
}
