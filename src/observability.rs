use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("querent.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("querent.client.request_errors");
pub(crate) static CLIENT_NETWORK_ERRORS: Counter = Counter::new("querent.client.network_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("querent.client.request_duration_seconds");

pub(crate) static SESSION_TOKEN_WRITES: Counter = Counter::new("querent.session.token_writes");

pub(crate) static CHAT_QUERIES: Counter = Counter::new("querent.chat.queries");
pub(crate) static CHAT_QUERY_FAILURES: Counter = Counter::new("querent.chat.query_failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_NETWORK_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_TOKEN_WRITES);

    collector.register_counter(&CHAT_QUERIES);
    collector.register_counter(&CHAT_QUERY_FAILURES);
}
