// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Named event channels with callback subscribers
//!
//! Drivers do not own their subscription logic; they hold an injected
//! [`EventEmitter`] and forward `on` / `off` / `handle` to it through the
//! [`EventSource`] trait.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// An event delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub payload: Value,
}

impl Event {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Subscriber callback
///
/// Handlers are compared by pointer, so keep the `Arc` around to unsubscribe
/// it later with [`EventEmitter::off`].
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Wrap a closure as an [`EventHandler`]
pub fn handler<F>(callback: F) -> EventHandler
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Registry of handlers keyed by event name
#[derive(Default)]
pub struct EventEmitter {
    channels: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels = self.channels.read();
        let mut map = f.debug_map();
        for (name, handlers) in channels.iter() {
            map.entry(name, &handlers.len());
        }
        map.finish()
    }
}

impl EventEmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Subscribe `handler` to `name`
    pub fn on(&self, name: &str, handler: EventHandler) {
        self.channels
            .write()
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    /// Unsubscribe `handler` from `name`, or every handler of `name` when `None`
    pub fn off(&self, name: &str, handler: Option<&EventHandler>) {
        let mut channels = self.channels.write();
        match handler {
            None => {
                channels.remove(name);
            }
            Some(handler) => {
                if let Some(handlers) = channels.get_mut(name) {
                    handlers.retain(|installed| !Arc::ptr_eq(installed, handler));
                    if handlers.is_empty() {
                        channels.remove(name);
                    }
                }
            }
        }
    }

    /// Subscribe `handler` and return the means to remove exactly this subscription
    pub fn handle(self: &Arc<Self>, name: &str, handler: EventHandler) -> HandlerUninstaller {
        self.on(name, handler.clone());
        HandlerUninstaller {
            emitter: Arc::downgrade(self),
            name: name.to_string(),
            handler,
        }
    }

    /// Invoke every handler of `event.name`; returns how many ran
    pub fn emit(&self, event: &Event) -> usize {
        // Handlers may subscribe or unsubscribe, so never call them under the lock
        let handlers = match self.channels.read().get(&event.name) {
            Some(handlers) => handlers.clone(),
            None => return 0,
        };
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.channels.read().get(name).map_or(0, Vec::len)
    }
}

/// Removes the subscription created by [`EventEmitter::handle`]
#[must_use = "dropping the uninstaller keeps the handler installed"]
pub struct HandlerUninstaller {
    emitter: Weak<EventEmitter>,
    name: String,
    handler: EventHandler,
}

impl HandlerUninstaller {
    pub fn event_name(&self) -> &str {
        &self.name
    }

    /// Remove the handler; a no-op once the emitter is gone
    pub fn uninstall(self) {
        if let Some(emitter) = self.emitter.upgrade() {
            emitter.off(&self.name, Some(&self.handler));
        }
    }
}

/// Anything that exposes named event subscriptions
///
/// Object safe, so drivers can be used as `dyn StorageDriver`.
pub trait EventSource {
    /// Subscribe to `name`; returns the source for chaining
    fn on(&self, name: &str, handler: EventHandler) -> &dyn EventSource;

    /// Unsubscribe one handler, or all handlers of `name` when `None`
    fn off(&self, name: &str, handler: Option<&EventHandler>) -> &dyn EventSource;

    /// Subscribe and return an uninstaller for this subscription
    fn handle(&self, name: &str, handler: EventHandler) -> HandlerUninstaller;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: &Arc<AtomicUsize>) -> EventHandler {
        let counter = counter.clone();
        handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_on_and_emit() {
        let emitter = EventEmitter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        emitter.on("saved", counting_handler(&counter));
        emitter.on("saved", counting_handler(&counter));

        assert_eq!(emitter.emit(&Event::new("saved", json!({"id": "a"}))), 2);
        assert_eq!(emitter.emit(&Event::new("other", Value::Null)), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_off_removes_only_the_given_handler() {
        let emitter = EventEmitter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let first = counting_handler(&counter);
        let second = counting_handler(&counter);
        emitter.on("saved", first.clone());
        emitter.on("saved", second);

        emitter.off("saved", Some(&first));
        assert_eq!(emitter.handler_count("saved"), 1);

        emitter.off("saved", None);
        assert_eq!(emitter.handler_count("saved"), 0);
    }

    #[test]
    fn test_handle_uninstaller() {
        let emitter = EventEmitter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let uninstaller = emitter.handle("saved", counting_handler(&counter));
        assert_eq!(uninstaller.event_name(), "saved");

        emitter.emit(&Event::new("saved", Value::Null));
        uninstaller.uninstall();
        emitter.emit(&Event::new("saved", Value::Null));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.handler_count("saved"), 0);
    }

    #[test]
    fn test_uninstall_after_emitter_dropped() {
        let emitter = EventEmitter::new();
        let uninstaller = emitter.handle("saved", handler(|_| {}));
        drop(emitter);
        uninstaller.uninstall();
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let emitter = EventEmitter::new();
        let weak = Arc::downgrade(&emitter);
        emitter.on(
            "once",
            handler(move |event| {
                if let Some(emitter) = weak.upgrade() {
                    emitter.off(&event.name, None);
                }
            }),
        );

        assert_eq!(emitter.emit(&Event::new("once", Value::Null)), 1);
        assert_eq!(emitter.handler_count("once"), 0);
    }
}
