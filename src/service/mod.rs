//! Service layer: the downstream tool proxies.
//!
//! [`SearchService`] is the only proxy carried here. Its handler is an
//! ordinary route as far as the event relay is concerned: the exchange
//! interceptor observes it like any other tool call.

pub mod search_service;

pub use search_service::SearchService;
