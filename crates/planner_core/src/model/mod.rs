mod project;
mod task;
mod template;
mod workload;

pub use project::{Project, ProjectStatus};
pub use task::{Task, TaskStatus};
pub use template::{MaterializedTask, ProjectTemplate, TaskTemplate};
pub use workload::{Consultant, LoadLevel, TimeEntry, WorkloadRecord};
