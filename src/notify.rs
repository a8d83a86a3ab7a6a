//! Notification side channel for dispatch failures.
//!
//! The dispatcher masks every failure behind a fallback string; the original
//! error travels here instead. Sinks are observational: their outcome is never
//! consumed by the dispatcher.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Notification`] | Error, message and output-button hint |
//! | [`Notifier`] | Trait for notification destinations |
//! | [`TracingNotifier`] | Default sink, logs through `tracing` |
//! | [`InMemoryNotifier`] | Collects notifications, for tests and UI polling |
//! | [`CompositeNotifier`] | Fan-out to several sinks |

use crate::Error;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// One failure report.
#[derive(Debug, Clone)]
pub struct Notification {
    pub error: Arc<Error>,
    pub message: String,
    /// Whether the host should offer a "show output" action next to the message.
    pub show_output_button: bool,
}

impl Notification {
    pub fn new(error: Error, message: impl Into<String>) -> Self {
        Self {
            error: Arc::new(error),
            message: message.into(),
            show_output_button: true,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Logs notifications at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) {
        tracing::error!(
            error = %notification.error,
            show_output = notification.show_output_button,
            "{}",
            notification.message
        );
    }
}

/// Keeps the most recent notifications in memory.
pub struct InMemoryNotifier {
    events: RwLock<Vec<Notification>>,
    max_events: usize,
}

impl InMemoryNotifier {
    pub fn new(max: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events: max,
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, notification: Notification) {
        if let Ok(mut events) = self.events.write() {
            events.push(notification);
            if events.len() > self.max_events {
                events.remove(0);
            }
        }
    }
}

/// Fan-out sink.
#[derive(Default)]
pub struct CompositeNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone()).await;
        }
    }
}
