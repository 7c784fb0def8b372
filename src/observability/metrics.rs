//! Pipeline metrics.
//!
//! # Metrics
//! - `palisade_requests_total` (counter): requests by method and status
//! - `palisade_rate_limited_total` (counter): rejected requests
//! - `palisade_sanitized_bodies_total` (counter): scrubbed request bodies

use metrics::counter;

pub fn record_request(method: &str, status: u16) {
    counter!(
        "palisade_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_rate_limited() {
    counter!("palisade_rate_limited_total").increment(1);
}

pub fn record_sanitized_body() {
    counter!("palisade_sanitized_bodies_total").increment(1);
}
