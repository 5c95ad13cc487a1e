//! # Event Bus
//!
//! Synchronous publish/subscribe channel between the model and whatever
//! reacts to it.
//!
//! - Topics are a fixed set ([`Topic`]); each carries its own payload
//!   shape ([`Event`])
//! - `publish` runs every subscriber of the topic, in subscription order,
//!   before it returns. Nothing is queued.
//! - Subscribers receive a mutable context (the model, for the editor) so
//!   they can react by issuing further actions. Nested publishes run to
//!   completion inside the outer subscriber.
//! - Subscribing is additive; there is no unsubscribe.

use crate::geometry::Point;
use crate::id_generator::NodeId;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Topic {
    DocumentOpened,
    DocumentClosed,
    NodeCreated,
    NodeDeleted,
    NodeMoved,
    NodeOpened,
    NodeClosed,
    NodeSelected,
    NodeCaptionChanged,
    NodeFontChanged,
    NodeBranchColorChanged,
    ZoomChanged,
}

/// Event payloads, one variant per topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "camelCase")]
pub enum Event {
    DocumentOpened { document_id: String, is_new: bool },
    DocumentClosed { document_id: String },
    NodeCreated {
        node: NodeId,
        parent: NodeId,
        /// Enter inline caption editing once the node is shown
        edit_caption: bool,
    },
    NodeDeleted {
        node: NodeId,
        parent: NodeId,
        /// The node and all descendants that went with it
        removed: Vec<NodeId>,
    },
    NodeMoved { node: NodeId, offset: Point },
    NodeOpened { node: NodeId },
    NodeClosed { node: NodeId },
    NodeSelected {
        selected: NodeId,
        previous: Option<NodeId>,
    },
    NodeCaptionChanged { node: NodeId, caption: String },
    NodeFontChanged { node: NodeId },
    NodeBranchColorChanged { node: NodeId },
    ZoomChanged { factor: f64 },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::DocumentOpened { .. } => Topic::DocumentOpened,
            Event::DocumentClosed { .. } => Topic::DocumentClosed,
            Event::NodeCreated { .. } => Topic::NodeCreated,
            Event::NodeDeleted { .. } => Topic::NodeDeleted,
            Event::NodeMoved { .. } => Topic::NodeMoved,
            Event::NodeOpened { .. } => Topic::NodeOpened,
            Event::NodeClosed { .. } => Topic::NodeClosed,
            Event::NodeSelected { .. } => Topic::NodeSelected,
            Event::NodeCaptionChanged { .. } => Topic::NodeCaptionChanged,
            Event::NodeFontChanged { .. } => Topic::NodeFontChanged,
            Event::NodeBranchColorChanged { .. } => Topic::NodeBranchColorChanged,
            Event::ZoomChanged { .. } => Topic::ZoomChanged,
        }
    }
}

type Handler<C> = Rc<dyn Fn(&Event, &mut C)>;

/// Publish/subscribe channel whose subscribers run against a context `C`
pub struct EventBus<C> {
    subscribers: RefCell<HashMap<Topic, Vec<Handler<C>>>>,
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(HashMap::new()),
        }
    }

    /// Register a handler for a topic. Handlers of one topic run in the
    /// order they were subscribed.
    pub fn subscribe<F>(&self, topic: Topic, handler: F)
    where
        F: Fn(&Event, &mut C) + 'static,
    {
        self.subscribers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Rc::new(handler));
    }

    /// Run every subscriber of the event's topic before returning
    pub fn publish(&self, event: &Event, ctx: &mut C) {
        // Snapshot so handlers may subscribe or publish while we iterate
        let handlers = self
            .subscribers
            .borrow()
            .get(&event.topic())
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            trace!(topic = ?event.topic(), "Published with no subscribers");
            return;
        }

        for handler in handlers {
            handler(event, ctx);
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .borrow()
            .get(&topic)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.borrow();
        let mut counts: Vec<_> = subscribers.iter().map(|(t, h)| (*t, h.len())).collect();
        counts.sort_by_key(|(t, _)| format!("{:?}", t));
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(id: &str) -> Event {
        Event::NodeSelected {
            selected: NodeId::from(id),
            previous: None,
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus: EventBus<Vec<String>> = EventBus::new();
        let mut log = Vec::new();
        bus.publish(&Event::ZoomChanged { factor: 1.5 }, &mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_subscribers_run_in_order() {
        let bus: EventBus<Vec<String>> = EventBus::new();
        bus.subscribe(Topic::NodeSelected, |_, log| log.push("first".to_string()));
        bus.subscribe(Topic::NodeSelected, |_, log| log.push("second".to_string()));
        bus.subscribe(Topic::NodeMoved, |_, log| log.push("moved".to_string()));

        let mut log = Vec::new();
        bus.publish(&selected("a"), &mut log);

        assert_eq!(log, vec!["first", "second"]);
        assert_eq!(bus.subscriber_count(Topic::NodeSelected), 2);
        assert_eq!(bus.subscriber_count(Topic::ZoomChanged), 0);
    }

    #[test]
    fn test_payload_reaches_handler() {
        let bus: EventBus<Vec<String>> = EventBus::new();
        bus.subscribe(Topic::NodeSelected, |event, log| {
            if let Event::NodeSelected { selected, .. } = event {
                log.push(selected.to_string());
            }
        });

        let mut log = Vec::new();
        bus.publish(&selected("n-7"), &mut log);
        assert_eq!(log, vec!["n-7"]);
    }

    #[test]
    fn test_nested_publish_completes_before_outer_returns() {
        let bus: Rc<EventBus<Vec<String>>> = Rc::new(EventBus::new());

        let inner = Rc::clone(&bus);
        bus.subscribe(Topic::NodeCreated, move |_, log| {
            log.push("created:start".to_string());
            inner.publish(&selected("new"), log);
            log.push("created:end".to_string());
        });
        bus.subscribe(Topic::NodeCreated, |_, log| log.push("created:second".to_string()));
        bus.subscribe(Topic::NodeSelected, |_, log| log.push("selected".to_string()));

        let mut log = Vec::new();
        bus.publish(
            &Event::NodeCreated {
                node: NodeId::from("new"),
                parent: NodeId::from("root"),
                edit_caption: false,
            },
            &mut log,
        );

        assert_eq!(
            log,
            vec!["created:start", "selected", "created:end", "created:second"]
        );
    }

    #[test]
    fn test_event_topics() {
        assert_eq!(Event::ZoomChanged { factor: 1.0 }.topic(), Topic::ZoomChanged);
        assert_eq!(selected("x").topic(), Topic::NodeSelected);
    }
}
