//! Adapts a [`Subscription`] into an SSE response body.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::Stream;

use crate::domain::Subscription;

/// Stream of `data: <json>` events fed by one subscription.
///
/// Ends only if the subscription's channel closes. Dropping the stream drops
/// the subscription, which removes the subscriber from its registry.
#[derive(Debug)]
pub struct SubscriptionStream {
    subscription: Subscription,
}

impl SubscriptionStream {
    /// Wraps a subscription.
    #[must_use]
    pub const fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }
}

impl Stream for SubscriptionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut()
            .subscription
            .poll_frame(cx)
            .map(|frame| frame.map(|json| Ok(Event::default().data(&*json))))
    }
}

/// Builds the SSE response for a subscription.
///
/// `keep_alive` of `None` (the default configuration) keeps the stream to
/// data frames only; `Some(interval)` interleaves `:` comment frames.
pub fn sse_response(subscription: Subscription, keep_alive: Option<Duration>) -> Response {
    let sse = Sse::new(SubscriptionStream::new(subscription));
    match keep_alive {
        Some(interval) => sse
            .keep_alive(KeepAlive::new().interval(interval))
            .into_response(),
        None => sse.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventBus, RelayEvent, SubscriberKey};

    #[tokio::test]
    async fn yields_ack_then_pends() {
        let bus = EventBus::new(16);
        let sub = bus.subscribe(SubscriberKey::Global, &RelayEvent::connection_established());
        let mut stream = tokio_test::task::spawn(SubscriptionStream::new(sub));

        assert!(matches!(stream.poll_next(), Poll::Ready(Some(Ok(_)))));
        assert!(stream.poll_next().is_pending());

        bus.broadcast_all(&RelayEvent::request("GET", "/", None));
        assert!(stream.is_woken());
        assert!(matches!(stream.poll_next(), Poll::Ready(Some(Ok(_)))));
    }

    #[test]
    fn dropping_stream_unregisters() {
        let bus = EventBus::new(16);
        let sub = bus.subscribe(SubscriberKey::Global, &RelayEvent::connection_established());
        let stream = SubscriptionStream::new(sub);
        assert_eq!(bus.monitor_count(), 1);

        drop(stream);
        assert_eq!(bus.monitor_count(), 0);
    }
}
