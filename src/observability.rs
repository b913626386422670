use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("codereview.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("codereview.client.request_errors");
pub(crate) static CLIENT_MALFORMED_RESPONSES: Counter =
    Counter::new("codereview.client.malformed_responses");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("codereview.client.request_duration_seconds");

pub(crate) static SESSION_SUBMISSIONS: Counter = Counter::new("codereview.session.submissions");
pub(crate) static SESSION_IGNORED_SUBMISSIONS: Counter =
    Counter::new("codereview.session.ignored_submissions");
pub(crate) static SESSION_MISSING_KEY: Counter = Counter::new("codereview.session.missing_key");
pub(crate) static SESSION_REVIEW_FAILURES: Counter =
    Counter::new("codereview.session.review_failures");
pub(crate) static SESSION_COPIES: Counter = Counter::new("codereview.session.copies");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_MALFORMED_RESPONSES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMISSIONS);
    collector.register_counter(&SESSION_IGNORED_SUBMISSIONS);
    collector.register_counter(&SESSION_MISSING_KEY);
    collector.register_counter(&SESSION_REVIEW_FAILURES);
    collector.register_counter(&SESSION_COPIES);
}
