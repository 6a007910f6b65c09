//! Change notifications for hosts that mirror session state.
//!
//! Subscribers registered with [`EditSession::subscribe`](crate::EditSession::subscribe) get one
//! [`StateChange`] per kind of state a command touched, stamped with the document version.

/// Which part of the session a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChangeType {
    /// Buffer text changed; the version was bumped.
    DocumentModified,
    /// The cursor landed somewhere else.
    CursorMoved,
    /// The selection appeared, disappeared or changed extent.
    SelectionChanged,
    /// The overlay got new spans or was emptied.
    HighlightingChanged,
}

/// One notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// What changed.
    pub change_type: StateChangeType,
    /// Version before the command ran.
    pub old_version: u64,
    /// Version after it; same as `old_version` for cursor, selection and highlight changes.
    pub new_version: u64,
}

impl StateChange {
    /// Build a notification.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
        }
    }
}

/// Subscriber callback.
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

