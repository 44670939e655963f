//! Domain modules for the derived views.
//!
//! # Modules
//!
//! - [`range`]: inclusive day-key ranges and range filtering
//! - [`meals`]: meal → meal-food → food calorie resolution
//! - [`aggregate`]: fixed 7-day window bucketing
//! - [`dashboard`]: the dashboard snapshot and view
//! - [`progress`]: goal-progress metrics derived from a snapshot
//! - [`chart`]: bar-height scaling
//! - [`history`]: per-domain history rows
//! - [`mutations`]: create compositions (meal, exercises, weigh-in)

pub mod aggregate;
pub mod chart;
pub mod dashboard;
pub mod history;
pub mod meals;
pub mod mutations;
pub mod progress;
pub mod range;

use healthlog_client::HealthLogError;

pub use aggregate::WINDOW_DAYS;
pub use range::{DayRange, Dated};

pub const FALLBACKS_TOTAL: &str = "healthlog_fallbacks_total";

/// Replace a failed fetch with `fallback`, whatever the error kind.
pub(crate) fn recover<T>(result: Result<T, HealthLogError>, fallback: T, scope: &'static str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(scope, auth = e.is_auth(), error = %e, "fetch failed, using neutral fallback");
            metrics::counter!(FALLBACKS_TOTAL, "scope" => scope).increment(1);
            fallback
        }
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
