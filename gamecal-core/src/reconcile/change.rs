use std::fmt;

use crate::event::Event;
use crate::record::StoredEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Remove,
}

impl ChangeKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeKind::Add => "+",
            ChangeKind::Remove => "-",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A proposed calendar change, waiting for a human decision.
#[derive(Debug, Clone)]
pub struct Change {
    pub kind: ChangeKind,
    pub event: Event,
    /// Store id of the entry to remove; `None` for additions.
    pub store_id: Option<String>,
}

impl Change {
    pub fn add(event: Event) -> Self {
        Change {
            kind: ChangeKind::Add,
            event,
            store_id: None,
        }
    }

    pub fn remove(stored: StoredEvent) -> Self {
        Change {
            kind: ChangeKind::Remove,
            event: stored.event,
            store_id: Some(stored.id),
        }
    }

    /// The question put to the human.
    pub fn prompt(&self) -> String {
        match self.kind {
            ChangeKind::Add => format!("New game on the schedule. Add it?\n{}", self.event.describe()),
            ChangeKind::Remove => format!(
                "Game is gone from the schedule. Remove it from the calendar?\n{}",
                self.event.describe()
            ),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.event)
    }
}
