use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domains::DayRange;
use crate::state::{HistoryState, LoadState};

/// Date range requested for a history view; bounds may be dates or timestamps.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct RangeParams {
    pub start: String,
    pub end: String,
}

impl RangeParams {
    pub fn to_range(&self) -> DayRange {
        DayRange::new(self.start.as_str(), self.end.as_str())
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DomainSummary {
    pub rows: usize,
    pub error: Option<String>,
}

impl DomainSummary {
    fn of<T>(state: &LoadState<Vec<T>>) -> Self {
        match state {
            LoadState::Loaded(rows) => Self {
                rows: rows.len(),
                error: None,
            },
            LoadState::Failed(msg) => Self {
                rows: 0,
                error: Some(msg.clone()),
            },
            LoadState::Idle | LoadState::Loading => Self {
                rows: 0,
                error: None,
            },
        }
    }
}

/// A loaded history view together with per-domain counts.
#[derive(Debug, Serialize, JsonSchema)]
pub struct HistoryReport {
    pub meals: DomainSummary,
    pub exercises: DomainSummary,
    pub weigh_ins: DomainSummary,
    pub state: HistoryState,
}

impl From<HistoryState> for HistoryReport {
    fn from(state: HistoryState) -> Self {
        Self {
            meals: DomainSummary::of(&state.meals),
            exercises: DomainSummary::of(&state.exercises),
            weigh_ins: DomainSummary::of(&state.weigh_ins),
            state,
        }
    }
}
