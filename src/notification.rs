//! In-app notification queue
//!
//! Toasts are represented as data: mutations push here, and a front end
//! drains the queue and decides how to show each entry.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Oldest entries are dropped past this size.
const MAX_QUEUED: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    queue: Mutex<VecDeque<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationKind::Success, "Success", message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationKind::Error, "Error", message.into());
    }

    /// Error with a specific title, e.g. "Weak password".
    pub fn error_titled(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NotificationKind::Error, title, message.into());
    }

    fn push(&self, kind: NotificationKind, title: impl Into<String>, message: String) {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message,
            created_at: Utc::now(),
        };

        let mut queue = self.queue.lock();
        queue.push_back(notification);
        while queue.len() > MAX_QUEUED {
            queue.pop_front();
        }
    }

    /// Remove and return everything queued, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.lock().drain(..).collect()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.queue.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_in_order_and_empties() {
        let center = NotificationCenter::new();
        center.success("Ticket status updated successfully");
        center.error("Failed to update ticket status");

        let drained = center.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind, NotificationKind::Success);
        assert_eq!(drained[1].title, "Error");
        assert!(center.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let center = NotificationCenter::new();
        for i in 0..(MAX_QUEUED + 5) {
            center.success(format!("n{i}"));
        }
        assert_eq!(center.len(), MAX_QUEUED);
        assert_eq!(center.drain()[0].message, "n5");
    }

    #[test]
    fn test_titled_error() {
        let center = NotificationCenter::new();
        center.error_titled("Weak password", "Password must be at least 6 characters long.");
        let latest = center.latest().unwrap();
        assert_eq!(latest.title, "Weak password");
        assert_eq!(latest.kind, NotificationKind::Error);
    }
}
