//! Subscribers: one entry per open event stream.
//!
//! A [`Subscriber`] pairs an identity and a routing key with a [`FrameSink`],
//! the write half of the channel that feeds the subscriber's SSE response.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::SubscriberId;

/// A pre-serialized JSON event, shared by every subscriber it is written to.
pub type Frame = Arc<str>;

/// Routing scope of a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriberKey {
    /// Monitor subscriber: receives every broadcast event.
    Global,
    /// Per-instance listener: receives only events addressed to this key.
    Instance(String),
}

impl fmt::Display for SubscriberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Instance(name) => write!(f, "instance:{name}"),
        }
    }
}

/// Write handle for one subscriber's stream.
///
/// Backed by a bounded channel. Writes are non-blocking and never fail
/// loudly: once the receiving stream is gone, or while its buffer is full
/// because the client stopped reading, [`FrameSink::write`] returns `false`
/// and the frame is dropped.
#[derive(Debug, Clone)]
pub struct FrameSink {
    sender: mpsc::Sender<Frame>,
}

impl FrameSink {
    /// Creates a sink buffering at most `capacity` frames (minimum 1) and
    /// the receiver that drains it.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queues a frame for delivery.
    ///
    /// Returns `false` if the stream is closed or its buffer is full.
    pub fn write(&self, frame: &Frame) -> bool {
        match self.sender.try_send(Arc::clone(frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    capacity = self.sender.max_capacity(),
                    "subscriber buffer full, frame dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Returns `true` while the receiving stream is still alive.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// One connected listener.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: SubscriberId,
    key: SubscriberKey,
    sink: FrameSink,
}

impl Subscriber {
    /// Creates a subscriber with a fresh identity.
    #[must_use]
    pub fn new(key: SubscriberKey, sink: FrameSink) -> Self {
        Self {
            id: SubscriberId::new(),
            key,
            sink,
        }
    }

    /// Returns the subscriber's identity.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns the subscriber's routing key.
    #[must_use]
    pub const fn key(&self) -> &SubscriberKey {
        &self.key
    }

    /// Returns the subscriber's write handle.
    #[must_use]
    pub const fn sink(&self) -> &FrameSink {
        &self.sink
    }
}
