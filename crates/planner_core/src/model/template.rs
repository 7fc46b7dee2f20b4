use crate::model::TaskStatus;
use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A task expressed as whole-day offsets from its project's start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    #[serde(default)]
    pub project_template_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub estimated_hours: f64,
    pub relative_start_day: u32,
    pub relative_end_day: u32,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl TaskTemplate {
    pub fn duration_days(&self) -> i64 {
        i64::from(self.relative_end_day) - i64::from(self.relative_start_day)
    }
}

/// An insert-ready task produced from a template. It carries no id of its own;
/// `template_task_id` traces it back to the row it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedTask {
    pub template_task_id: String,
    pub name: String,
    pub description: Option<String>,
    pub estimated_hours: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub status: TaskStatus,
    pub consultant_id: Option<String>,
    pub specialization: Option<String>,
}
