use healthlog_client::config::Config;

use crate::{DashboardError, DashboardResult};

/// The signed-in user every aggregation runs for.
///
/// Passed explicitly to each load; there is no ambient or default user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    user_id: i64,
}

impl Session {
    pub fn new(user_id: i64) -> DashboardResult<Self> {
        if user_id > 0 {
            Ok(Self { user_id })
        } else {
            Err(DashboardError::NoSession)
        }
    }

    pub fn from_config(config: &Config) -> DashboardResult<Self> {
        config
            .user_id
            .ok_or(DashboardError::NoSession)
            .and_then(Self::new)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}
