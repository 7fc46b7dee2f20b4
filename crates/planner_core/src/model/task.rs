use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub estimated_hours: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub status: TaskStatus,
    #[serde(default)]
    pub consultant_id: Option<String>,
}

impl Task {
    /// Whole days between start and end; negative when the range is inverted.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).whole_days()
    }
}

/// Lifecycle of a project task. Older records spelled two of the states with
/// dashes; those are read but always written back in snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    #[serde(alias = "in-progress")]
    InProgress,
    Completed,
    #[serde(alias = "on-hold")]
    OnHold,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
        }
    }
}
