//! Notification sinks
//!
//! Controllers report every mutation outcome and every failed fetch through a
//! [`Notifier`]. Sinks are fire-and-forget: nothing they return is consumed.

use std::time::Instant;

use parking_lot::Mutex;

/// Receives user-facing outcome messages.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// A toast notification message
#[derive(Debug, Clone)]
pub struct Toast {
    /// The message to display
    pub message: String,
    /// The severity level of the toast
    pub level: ToastLevel,
    /// When the toast was created
    pub timestamp: Instant,
}

/// Severity level for toast notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Error,
    Success,
}

impl Toast {
    pub fn new(message: String, level: ToastLevel) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Success)
    }

    pub fn is_error(&self) -> bool {
        self.level == ToastLevel::Error
    }
}

/// Keeps toasts in arrival order until a presentation layer drains them.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }

    /// Remove and return every pending toast.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock())
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.toasts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.lock().is_empty()
    }

    pub fn errors(&self) -> Vec<String> {
        self.toasts
            .lock()
            .iter()
            .filter(|t| t.is_error())
            .map(|t| t.message.clone())
            .collect()
    }
}

impl Notifier for ToastQueue {
    fn notify_success(&self, message: &str) {
        self.push(Toast::success(message));
    }

    fn notify_error(&self, message: &str) {
        self.push(Toast::error(message));
    }
}
