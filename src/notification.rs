//! Notification System
//!
//! Toast messages and history for loads, mutations and session events.
//! Managers report through the [`Notifier`] trait; the console's
//! implementation is [`SharedNotifications`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Level of detail for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Minimal: icon + message
    Minimal,
    /// Detailed: icon + operation + message + age
    #[default]
    Detailed,
    /// Verbose: everything, including the resource
    Verbose,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Detailed => "detailed",
            Self::Verbose => "verbose",
        }
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Info => "i",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }
}

/// Type of operation a notification reports on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationType {
    Load,
    Create,
    Update,
    Delete,
    Toggle,
    SignIn,
    SignOut,
    Other(String),
}

impl OperationType {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Load => "Load",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Toggle => "Toggle",
            Self::SignIn => "Sign in",
            Self::SignOut => "Sign out",
            Self::Other(name) => name,
        }
    }

    pub fn past_tense(&self) -> &str {
        match self {
            Self::Load => "Loaded",
            Self::Create => "Created",
            Self::Update => "Updated",
            Self::Delete => "Deleted",
            Self::Toggle => "Toggled",
            Self::SignIn => "Signed in",
            Self::SignOut => "Signed out",
            Self::Other(_) => "Completed",
        }
    }
}

/// A single notification
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub operation_type: OperationType,
    /// Resource key the operation targeted (empty for session events)
    pub resource_type: String,
    pub message: String,
    pub created_at: Instant,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    pub fn new(
        severity: Severity,
        operation_type: OperationType,
        resource_type: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            operation_type,
            resource_type: resource_type.to_string(),
            message: message.into(),
            created_at: Instant::now(),
            timestamp: Local::now(),
        }
    }

    pub fn success(op: OperationType, resource: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, op, resource, message)
    }

    pub fn info(op: OperationType, resource: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, op, resource, message)
    }

    pub fn warning(op: OperationType, resource: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, op, resource, message)
    }

    pub fn error(op: OperationType, resource: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, op, resource, message)
    }

    /// Format age for display
    pub fn age_display(&self) -> String {
        let d = self.created_at.elapsed();
        if d.as_secs() < 1 {
            "now".to_string()
        } else if d.as_secs() < 60 {
            format!("{}s ago", d.as_secs())
        } else {
            format!("{}m ago", d.as_secs() / 60)
        }
    }

    /// Format notification for toast display (short form)
    pub fn toast_message(&self, detail_level: DetailLevel) -> String {
        let icon = self.severity.icon();
        match detail_level {
            DetailLevel::Minimal => format!("{} {}", icon, self.message),
            DetailLevel::Detailed => format!(
                "{} {}: {}",
                icon,
                self.operation_type.display_name(),
                self.message
            ),
            DetailLevel::Verbose => {
                if self.resource_type.is_empty() {
                    format!(
                        "{} {}: {} ({})",
                        icon,
                        self.operation_type.display_name(),
                        self.message,
                        self.timestamp.format("%H:%M:%S")
                    )
                } else {
                    format!(
                        "{} {} [{}]: {} ({})",
                        icon,
                        self.operation_type.display_name(),
                        self.resource_type,
                        self.message,
                        self.timestamp.format("%H:%M:%S")
                    )
                }
            }
        }
    }
}

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notification manager
pub struct NotificationManager {
    /// All notifications (recent first)
    pub notifications: VecDeque<Notification>,
    /// Maximum notifications to keep in history
    pub max_history: usize,
    /// Toast display duration
    pub toast_duration: Duration,
    /// Detail level for display
    pub detail_level: DetailLevel,
    /// Last toast notification (for display)
    last_toast_time: Option<Instant>,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
            max_history: 50,
            toast_duration: Duration::from_secs(5),
            detail_level: DetailLevel::Detailed,
            last_toast_time: None,
        }
    }

    /// Record a notification and show it as the current toast
    pub fn push(&mut self, notification: Notification) -> Uuid {
        let id = notification.id;
        match notification.severity {
            Severity::Error => tracing::warn!("{}", notification.message),
            _ => tracing::info!("{}", notification.message),
        }
        self.notifications.push_front(notification);
        self.last_toast_time = Some(Instant::now());
        self.trim_history();
        id
    }

    /// Get notification by ID
    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Get the most recent notification while its toast is still visible
    pub fn current_toast(&self) -> Option<&Notification> {
        let last_time = self.last_toast_time?;
        if last_time.elapsed() > self.toast_duration {
            return None;
        }
        self.notifications.front()
    }

    /// Hide the current toast without touching history
    pub fn dismiss_toast(&mut self) {
        self.last_toast_time = None;
    }

    /// Clear all notifications
    pub fn clear(&mut self) {
        self.notifications.clear();
        self.last_toast_time = None;
    }

    /// Trim history to max size, dropping the oldest first
    fn trim_history(&mut self) {
        while self.notifications.len() > self.max_history.max(1) {
            self.notifications.pop_back();
        }
    }

    /// Check if there are any notifications to show
    pub fn has_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    /// Count of notifications with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }

    /// Get count of recent notifications (last 5 minutes)
    pub fn recent_count(&self) -> usize {
        let cutoff = Duration::from_secs(300);
        self.notifications
            .iter()
            .filter(|n| n.created_at.elapsed() < cutoff)
            .count()
    }
}

/// Thread-safe handle to a [`NotificationManager`]
#[derive(Clone, Default)]
pub struct SharedNotifications(Arc<Mutex<NotificationManager>>);

impl SharedNotifications {
    pub fn new(manager: NotificationManager) -> Self {
        Self(Arc::new(Mutex::new(manager)))
    }

    pub fn lock(&self) -> MutexGuard<'_, NotificationManager> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the history, most recent first
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().notifications.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for SharedNotifications {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_toast() {
        let mut manager = NotificationManager::new();
        let id = manager.push(Notification::success(
            OperationType::Create,
            "tags",
            "Tag 'Summer' created",
        ));

        assert_eq!(manager.notifications.len(), 1);
        assert_eq!(manager.get(id).unwrap().severity, Severity::Success);
        assert_eq!(manager.current_toast().unwrap().id, id);

        manager.dismiss_toast();
        assert!(manager.current_toast().is_none());
        assert!(manager.has_notifications());
    }

    #[test]
    fn test_history_drops_oldest() {
        let mut manager = NotificationManager::new();
        manager.max_history = 2;
        for i in 0..3 {
            manager.push(Notification::info(OperationType::Load, "faqs", format!("n{}", i)));
        }
        let messages: Vec<_> = manager.notifications.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, ["n2", "n1"]);
    }

    #[test]
    fn test_toast_message_formats() {
        let notif = Notification::error(OperationType::Delete, "products", "Product not found");
        assert_eq!(notif.toast_message(DetailLevel::Minimal), "✗ Product not found");
        assert_eq!(
            notif.toast_message(DetailLevel::Detailed),
            "✗ Delete: Product not found"
        );
        assert!(notif
            .toast_message(DetailLevel::Verbose)
            .contains("[products]"));
    }

    #[test]
    fn test_shared_notifier() {
        let shared = SharedNotifications::default();
        let notifier: Arc<dyn Notifier> = Arc::new(shared.clone());
        notifier.notify(Notification::warning(OperationType::Update, "seo", "busy"));
        assert_eq!(shared.len(), 1);
        assert_eq!(shared.lock().count(Severity::Warning), 1);
    }
}
