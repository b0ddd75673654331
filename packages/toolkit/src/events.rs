//! Engine event vocabulary and subscription bus.
//!
//! The vocabulary is closed: every internal notification an engine can
//! raise is one of the [`EventKind`] variants below. Subscribers register
//! for a set of kinds and poll their queue; there are no callbacks held by
//! the bus, so draining never aliases engine state.

use serde::Serialize;
use std::collections::VecDeque;

/// The fixed set of engine-internal events an editor listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Document import finished successfully.
    ImportDone,
    /// The editor was told the current content was persisted.
    SaveDone,
    /// A command was executed, undone or redone.
    CommandStackChanged,
    /// The element selection changed.
    SelectionChanged,
    /// The engine was attached to a rendering surface.
    Attached,
    /// The internal clipboard changed.
    ClipboardChanged,
    /// Focus moved into a properties-panel input.
    PropertiesFocusIn,
    /// Focus left the properties panel.
    PropertiesFocusOut,
    /// Direct (in-canvas label) editing started.
    DirectEditingActivated,
    /// Direct editing ended.
    DirectEditingDeactivated,
    /// The search pad opened.
    SearchOpened,
    /// The search pad closed.
    SearchClosed,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 12] = [
        EventKind::ImportDone,
        EventKind::SaveDone,
        EventKind::CommandStackChanged,
        EventKind::SelectionChanged,
        EventKind::Attached,
        EventKind::ClipboardChanged,
        EventKind::PropertiesFocusIn,
        EventKind::PropertiesFocusOut,
        EventKind::DirectEditingActivated,
        EventKind::DirectEditingDeactivated,
        EventKind::SearchOpened,
        EventKind::SearchClosed,
    ];
}

/// Handle for one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
struct Subscriber {
    id: SubscriptionId,
    kinds: Vec<EventKind>,
    queue: VecDeque<EventKind>,
}

/// Queue-based event delivery with explicit subscribe/unsubscribe.
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for the given kinds.
    pub fn subscribe(&mut self, kinds: &[EventKind]) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            kinds: kinds.to_vec(),
            queue: VecDeque::new(),
        });
        id
    }

    /// Remove a subscriber. Unknown ids are a no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|s| s.id != id);
    }

    /// Queue an event for every subscriber registered for its kind.
    pub fn emit(&mut self, kind: EventKind) {
        for subscriber in &mut self.subscribers {
            if subscriber.kinds.contains(&kind) {
                subscriber.queue.push_back(kind);
            }
        }
    }

    /// Take all queued events for one subscriber, oldest first.
    ///
    /// Draining an unknown id yields an empty list.
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<EventKind> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| s.queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Drop every subscriber. Used on engine teardown so no queue can be
    /// drained after the engine is gone.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_routes_only_subscribed_kinds() {
        let mut bus = EventBus::new();
        let sub = bus.subscribe(&[EventKind::SelectionChanged]);

        bus.emit(EventKind::SelectionChanged);
        bus.emit(EventKind::CommandStackChanged);

        assert_eq!(bus.drain(sub), vec![EventKind::SelectionChanged]);
    }

    #[test]
    fn test_drain_empties_the_queue() {
        let mut bus = EventBus::new();
        let sub = bus.subscribe(&EventKind::ALL);

        bus.emit(EventKind::ImportDone);
        assert_eq!(bus.drain(sub).len(), 1);
        assert!(bus.drain(sub).is_empty());
    }

    #[test]
    fn test_events_after_unsubscribe_are_dropped() {
        let mut bus = EventBus::new();
        let sub = bus.subscribe(&EventKind::ALL);
        bus.unsubscribe(sub);

        bus.emit(EventKind::ImportDone);
        assert!(bus.drain(sub).is_empty());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_independent_subscriber_queues() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(&EventKind::ALL);
        let b = bus.subscribe(&[EventKind::SaveDone]);

        bus.emit(EventKind::SaveDone);
        bus.emit(EventKind::Attached);

        assert_eq!(bus.drain(a), vec![EventKind::SaveDone, EventKind::Attached]);
        assert_eq!(bus.drain(b), vec![EventKind::SaveDone]);
    }

    #[test]
    fn test_clear_drops_all_subscribers() {
        let mut bus = EventBus::new();
        let sub = bus.subscribe(&EventKind::ALL);
        bus.clear();

        bus.emit(EventKind::ImportDone);
        assert!(bus.drain(sub).is_empty());
    }
}
