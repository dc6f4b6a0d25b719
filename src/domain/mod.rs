//! Domain layer: subscribers, connection registries, events and the
//! broadcast bus.
//!
//! Nothing in here performs network I/O. Subscribers are fed through
//! in-process channels that the SSE layer ([`crate::sse`]) turns into
//! response streams.

pub mod event_bus;
pub mod relay_event;
pub mod subscriber;
pub mod subscriber_id;
pub mod subscriber_registry;

pub use event_bus::{DEFAULT_SUBSCRIBER_CAPACITY, EventBus, Subscription};
pub use relay_event::{InstanceAck, RelayEvent};
pub use subscriber::{Frame, FrameSink, Subscriber, SubscriberKey};
pub use subscriber_id::SubscriberId;
pub use subscriber_registry::{InstanceRegistry, MonitorRegistry};
