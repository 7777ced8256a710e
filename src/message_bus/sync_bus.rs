//! Synchronous message bus implementation
//!
//! This module provides the synchronous message bus that uses std::sync::mpsc
//! for communication between components.

use super::events::{AclEvent, EventType};
use super::history::EventHistoryEntry;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default number of unified events retained in the bus history
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

/// Consumer handle for receiving events of a specific type
pub struct Consumer<T: EventType> {
    receiver: Receiver<T>,
}

impl<T: EventType> Consumer<T> {
    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<T, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive an event with a timeout
    pub fn recv_timeout(&mut self, timeout: std::time::Duration) -> Result<T, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every event that is already queued
    pub fn drain(&mut self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

/// Internal registry for managing event subscribers
struct SubscriberRegistry {
    // Key: event type name, Value: list of boxed `Sender<T>` for that type
    subscribers: HashMap<&'static str, Vec<Box<dyn std::any::Any + Send>>>,
}

impl SubscriberRegistry {
    fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    fn add_subscriber<T: EventType>(&mut self, sender: Sender<T>) {
        self.subscribers
            .entry(T::type_id())
            .or_default()
            .push(Box::new(sender));
    }

    fn subscriber_count<T: EventType>(&self) -> usize {
        self.subscribers
            .get(T::type_id())
            .map(|senders| {
                senders
                    .iter()
                    .filter(|boxed| boxed.downcast_ref::<Sender<T>>().is_some())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Sends `event` to every live subscriber of `T`, dropping senders whose
    /// consumer is gone. Returns (delivered, pruned).
    fn deliver<T: EventType>(&mut self, event: &T) -> (usize, usize) {
        let Some(senders) = self.subscribers.get_mut(T::type_id()) else {
            return (0, 0);
        };
        let before = senders.len();
        senders.retain(|boxed| match boxed.downcast_ref::<Sender<T>>() {
            Some(sender) => sender.send(event.clone()).is_ok(),
            None => false,
        });
        (senders.len(), before - senders.len())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Main synchronous message bus for ACL notifications
///
/// Typed subscribers receive only their event type. Subscribers of
/// [`AclEvent`] receive every event published through [`MessageBus::publish_event`],
/// which also appends to the bounded history.
pub struct MessageBus {
    registry: Arc<Mutex<SubscriberRegistry>>,
    history: Mutex<VecDeque<EventHistoryEntry>>,
    history_limit: usize,
    sequence: AtomicU64,
}

impl MessageBus {
    /// Create a new message bus instance
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a bus retaining at most `history_limit` unified events
    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(SubscriberRegistry::new())),
            history: Mutex::new(VecDeque::new()),
            history_limit,
            sequence: AtomicU64::new(0),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<T: EventType>(&self) -> Consumer<T> {
        let (sender, receiver) = mpsc::channel();
        lock(&self.registry).add_subscriber(sender);
        Consumer { receiver }
    }

    /// Publish an event to all subscribers of that event type.
    ///
    /// Subscribers whose [`Consumer`] has been dropped are unregistered.
    /// Returns the number of consumers the event was delivered to.
    pub fn publish<T: EventType>(&self, event: T) -> usize {
        let (delivered, pruned) = lock(&self.registry).deliver(&event);
        if pruned > 0 {
            debug!("Removed {} disconnected {} subscribers", pruned, T::type_id());
        }
        delivered
    }

    /// Record a unified event in history and deliver it to typed and unified subscribers
    pub fn publish_event(&self, event: AclEvent) -> usize {
        self.record(event.clone());

        let typed = match event.clone() {
            AclEvent::ChangeObjectPermissionManager(e) => self.publish(e),
            AclEvent::SetObjectPermission(e) => self.publish(e),
            AclEvent::UnsetObjectPermission(e) => self.publish(e),
            AclEvent::SetPermission(e) => self.publish(e),
            AclEvent::ChangePermissionManager(e) => self.publish(e),
        };
        typed + self.publish(event)
    }

    fn record(&self, event: AclEvent) {
        if self.history_limit == 0 {
            return;
        }
        let sequence_number = self.sequence.fetch_add(1, Ordering::SeqCst);
        let mut history = lock(&self.history);
        if history.len() == self.history_limit {
            history.pop_front();
        }
        history.push_back(EventHistoryEntry::new(event, sequence_number));
    }

    /// Recorded unified events, oldest first
    pub fn history(&self) -> Vec<EventHistoryEntry> {
        lock(&self.history).iter().cloned().collect()
    }

    /// Recorded unified events with the given type identifier, oldest first
    pub fn history_of(&self, event_type: &str) -> Vec<AclEvent> {
        lock(&self.history)
            .iter()
            .filter(|entry| entry.event.event_type() == event_type)
            .map(|entry| entry.event.clone())
            .collect()
    }

    pub fn clear_history(&self) {
        lock(&self.history).clear();
    }

    /// Get the number of subscribers for a given event type
    pub fn subscriber_count<T: EventType>(&self) -> usize {
        lock(&self.registry).subscriber_count::<T>()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
