//! Request metrics emitted by the reqwest client.
//!
//! Only the `metrics` facade is used; whichever recorder the host installs
//! receives the values. Without a recorder every call is a no-op.

use std::time::Duration;

pub const HTTP_REQUESTS_TOTAL: &str = "healthlog_http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "healthlog_http_request_duration_seconds";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
    Transport,
}

impl Outcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=399 => Outcome::Success,
            400..=499 => Outcome::ClientError,
            _ => Outcome::ServerError,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ClientError => "client_error",
            Outcome::ServerError => "server_error",
            Outcome::Transport => "transport",
        }
    }
}

pub fn record_request(method: &str, outcome: Outcome, elapsed: Duration) {
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION, "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}
