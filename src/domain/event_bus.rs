//! Broadcast bus for monitor events and per-instance relays.
//!
//! [`EventBus`] owns both connection registries, each behind its own mutex.
//! Every critical section is a plain collection operation plus non-blocking
//! channel sends, so no lock is ever held across an `.await`.
//!
//! Delivery is best-effort and fire-and-forget: an event is serialized once,
//! written to every matching sink, and a failed write to one subscriber never
//! stops delivery to the next. Nothing is queued for listeners that are not
//! connected yet, and each connected listener buffers at most the bus
//! capacity; frames beyond that are dropped for the lagging listener only.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc;

use super::{
    Frame, FrameSink, InstanceRegistry, MonitorRegistry, RelayEvent, Subscriber, SubscriberId,
    SubscriberKey,
};

#[derive(Debug, Default)]
struct Registries {
    monitors: Mutex<MonitorRegistry>,
    instances: Mutex<InstanceRegistry>,
}

/// Per-subscriber buffer size used by [`EventBus::default`].
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 1024;

/// Fan-out hub shared by the interceptor, webhook handlers and SSE endpoints.
///
/// Cheap to clone; all clones share the same registries. Constructed once at
/// startup and injected through [`crate::app_state::AppState`].
#[derive(Debug, Clone)]
pub struct EventBus {
    registries: Arc<Registries>,
    capacity: usize,
}

impl EventBus {
    /// Creates a bus with empty registries whose subscribers each buffer up
    /// to `capacity` undelivered frames.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            registries: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    /// Per-subscriber buffer size.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers a new subscriber under `key` and returns its stream handle.
    ///
    /// `ack` is written to the new stream before the subscriber becomes
    /// visible to broadcasters, so it is always the first frame received.
    /// For [`SubscriberKey::Instance`], any previous listener on the same key
    /// is superseded without being notified or closed.
    pub fn subscribe<T: Serialize>(&self, key: SubscriberKey, ack: &T) -> Subscription {
        let (sink, receiver) = FrameSink::channel(self.capacity);
        let subscriber = Subscriber::new(key.clone(), sink.clone());
        let id = subscriber.id();

        if let Some(frame) = serialize_frame(ack) {
            sink.write(&frame);
        }

        match &key {
            SubscriberKey::Global => {
                lock(&self.registries.monitors).add(subscriber);
            }
            SubscriberKey::Instance(name) => {
                let superseded = lock(&self.registries.instances).add(name.clone(), subscriber);
                if let Some(previous) = superseded {
                    tracing::info!(
                        instance = %name,
                        superseded = %previous.id(),
                        subscriber = %id,
                        "instance listener superseded"
                    );
                }
            }
        }

        Subscription {
            id,
            key,
            _sink: sink,
            receiver,
            bus: self.clone(),
        }
    }

    /// Removes a subscriber from the registry matching `key`.
    ///
    /// Identity-checked and idempotent: removing a subscriber that is already
    /// gone, or whose instance slot was taken over, is a no-op returning
    /// `false`.
    pub fn unsubscribe(&self, key: &SubscriberKey, id: SubscriberId) -> bool {
        match key {
            SubscriberKey::Global => lock(&self.registries.monitors).remove(id),
            SubscriberKey::Instance(name) => lock(&self.registries.instances).remove(name, id),
        }
    }

    /// Writes `event` to every monitor subscriber in registration order.
    ///
    /// Returns the number of subscribers the frame was queued for.
    pub fn broadcast_all(&self, event: &RelayEvent) -> usize {
        let Some(frame) = serialize_frame(event) else {
            return 0;
        };
        let monitors = lock(&self.registries.monitors);
        let delivered = monitors
            .list()
            .iter()
            .filter(|subscriber| subscriber.sink().write(&frame))
            .count();
        tracing::trace!(
            event_type = event.event_type_str(),
            delivered,
            subscribers = monitors.len(),
            "event broadcast"
        );
        delivered
    }

    /// Writes `payload` to the listener registered under `key`, if any.
    ///
    /// Returns `true` if a live listener received the frame. A missing
    /// listener is not an error; the payload is dropped.
    pub fn broadcast_to<T: Serialize>(&self, key: &str, payload: &T) -> bool {
        let Some(frame) = serialize_frame(payload) else {
            return false;
        };
        let instances = lock(&self.registries.instances);
        match instances.get(key) {
            Some(subscriber) => subscriber.sink().write(&frame),
            None => false,
        }
    }

    /// Number of connected monitor subscribers.
    #[must_use]
    pub fn monitor_count(&self) -> usize {
        lock(&self.registries.monitors).len()
    }

    /// Monitor subscriber ids in registration order.
    #[must_use]
    pub fn monitor_ids(&self) -> Vec<SubscriberId> {
        lock(&self.registries.monitors)
            .list()
            .iter()
            .map(Subscriber::id)
            .collect()
    }

    /// Instance keys that currently have a listener, sorted.
    #[must_use]
    pub fn instance_keys(&self) -> Vec<String> {
        lock(&self.registries.instances).keys()
    }

    /// Identity of the listener currently registered under `key`.
    #[must_use]
    pub fn instance_listener(&self, key: &str) -> Option<SubscriberId> {
        lock(&self.registries.instances).get(key).map(Subscriber::id)
    }
}

/// Receiving side of one subscription.
///
/// Dropping the handle (or the stream built from it) removes the subscriber
/// from its registry exactly once.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    key: SubscriberKey,
    /// Keeps the channel open after an instance slot is superseded, so the
    /// old stream idles until its client disconnects.
    _sink: FrameSink,
    receiver: mpsc::Receiver<Frame>,
    bus: EventBus,
}

impl Subscription {
    /// The subscriber's identity.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// The subscriber's routing key.
    #[must_use]
    pub const fn key(&self) -> &SubscriberKey {
        &self.key
    }

    /// Waits for the next frame.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Returns the next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }

    pub(crate) fn poll_frame(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Frame>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let removed = self.bus.unsubscribe(&self.key, self.id);
        tracing::info!(
            subscriber = %self.id,
            key = %self.key,
            removed,
            "subscriber disconnected"
        );
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

fn serialize_frame<T: Serialize>(value: &T) -> Option<Frame> {
    match serde_json::to_string(value) {
        Ok(json) => Some(Frame::from(json)),
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize event");
            None
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
