//! Per-user admin dialog state.
//!
//! The add/remove admin flows need one follow-up message (the target user
//! id), so the pending action is kept in memory keyed by the initiating
//! user. State does not survive a restart, which is acceptable for a
//! two-step dialog.

use std::collections::HashMap;
use std::sync::Mutex;

/// What the next message from this user will be interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    AwaitingAdminIdToAdd,
    AwaitingAdminIdToRemove,
}

#[derive(Default)]
pub struct AdminSessions {
    sessions: Mutex<HashMap<i64, AdminAction>>,
}

impl AdminSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: i64, action: AdminAction) {
        self.sessions.lock().unwrap().insert(user_id, action);
    }

    /// Removes and returns the pending action, if any.
    pub fn take(&self, user_id: i64) -> Option<AdminAction> {
        self.sessions.lock().unwrap().remove(&user_id)
    }

    pub fn clear(&self, user_id: i64) {
        self.sessions.lock().unwrap().remove(&user_id);
    }
}
