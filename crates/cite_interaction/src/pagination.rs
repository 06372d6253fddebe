use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavPolicy {
    /// `(i ± 1) mod n`.
    Wrap,
    /// No-op at either end.
    Clamp,
}

/// Position within a citation group. Invariant: `index < len`, `len >= 1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pager {
    index: usize,
    len: usize,
}

impl Pager {
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Returns whether the index moved.
    pub fn next(&mut self, policy: NavPolicy) -> bool {
        let before = self.index;
        self.index = match policy {
            NavPolicy::Wrap => (self.index + 1) % self.len,
            NavPolicy::Clamp => (self.index + 1).min(self.len - 1),
        };
        self.index != before
    }

    pub fn prev(&mut self, policy: NavPolicy) -> bool {
        let before = self.index;
        self.index = match policy {
            NavPolicy::Wrap => (self.index + self.len - 1) % self.len,
            NavPolicy::Clamp => self.index.saturating_sub(1),
        };
        self.index != before
    }

    /// Out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.len || index == self.index {
            return false;
        }
        self.index = index;
        true
    }

    pub fn can_prev(&self, policy: NavPolicy) -> bool {
        match policy {
            NavPolicy::Wrap => self.len > 1,
            NavPolicy::Clamp => self.index > 0,
        }
    }

    pub fn can_next(&self, policy: NavPolicy) -> bool {
        match policy {
            NavPolicy::Wrap => self.len > 1,
            NavPolicy::Clamp => self.index + 1 < self.len,
        }
    }

    /// `"2 / 3"`.
    pub fn label(&self) -> String {
        format!("{} / {}", self.index + 1, self.len)
    }
}
