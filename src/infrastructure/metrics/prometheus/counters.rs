use metrics::{counter, histogram};
use std::time::Instant;

/// Increment a counter for completed registrations.
pub fn increment_registration() {
    counter!("registrations_total").increment(1);
}

/// Count a login attempt, labelled by outcome.
pub fn increment_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("login_attempts_total", "outcome" => outcome).increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant) {
    let elapsed = start.elapsed();
    histogram!("http_request_duration_seconds").record(elapsed);
}
