//! Custom error types for the dashboard core.

use healthlog_client::HealthLogError;
use thiserror::Error;

/// Dashboard errors.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No active session: a signed-in user id is required")]
    NoSession,

    #[error("Failed to update {category}: {source}")]
    Mutation {
        category: &'static str,
        #[source]
        source: HealthLogError,
    },

    /// The meal exists on the server but some of its food lines do not.
    #[error("Meal {meal_id} was saved but {failed} of {total} food lines failed")]
    PartialMutation {
        meal_id: i64,
        failed: usize,
        total: usize,
    },
}

impl DashboardError {
    pub(crate) fn mutation(category: &'static str, source: HealthLogError) -> Self {
        match source {
            HealthLogError::InvalidInput(msg) => DashboardError::Validation(msg),
            source => DashboardError::Mutation { category, source },
        }
    }
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
