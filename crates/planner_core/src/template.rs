use crate::dates::add_days;
use crate::error::AppError;
use crate::model::{MaterializedTask, TaskStatus, TaskTemplate};
use time::Date;
use tracing::debug;

/// Turn template tasks into dated, unassigned tasks for a project starting on
/// `project_start`. Output order matches input order.
pub fn materialize(
    template_tasks: &[TaskTemplate],
    project_start: Date,
) -> Result<Vec<MaterializedTask>, AppError> {
    // Validate everything first so a failure never leaves a partial result.
    validate_template_tasks(template_tasks)?;

    let materialized = template_tasks
        .iter()
        .map(|task| {
            let start_date = offset_date(project_start, task.relative_start_day, &task.id)?;
            let end_date = offset_date(project_start, task.relative_end_day, &task.id)?;
            Ok(MaterializedTask {
                template_task_id: task.id.clone(),
                name: task.name.clone(),
                description: task.description.clone(),
                estimated_hours: task.estimated_hours,
                start_date,
                end_date,
                status: TaskStatus::Pending,
                consultant_id: None,
                specialization: task.specialization.clone(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    debug!(
        tasks = materialized.len(),
        %project_start,
        "materialized template tasks"
    );
    Ok(materialized)
}

/// Reject any task template whose end day precedes its start day.
pub fn validate_template_tasks(template_tasks: &[TaskTemplate]) -> Result<(), AppError> {
    match template_tasks.iter().find(|task| task.duration_days() < 0) {
        Some(task) => Err(AppError::invalid_template(format!(
            "task template {} ends on day {} before it starts on day {}",
            task.id, task.relative_end_day, task.relative_start_day
        ))),
        None => Ok(()),
    }
}

fn offset_date(project_start: Date, day: u32, task_id: &str) -> Result<Date, AppError> {
    add_days(project_start, i64::from(day)).ok_or_else(|| {
        AppError::invalid_template(format!(
            "task template {task_id} day {day} is outside the calendar"
        ))
    })
}

/// Days covered by a template: one past the latest end day, zero when empty.
pub fn estimated_project_duration_days(template_tasks: &[TaskTemplate]) -> u64 {
    template_tasks
        .iter()
        .map(|task| u64::from(task.relative_end_day) + 1)
        .max()
        .unwrap_or(0)
}

/// Last day of a project created from the template, `None` for an empty one.
pub fn project_end_date(template_tasks: &[TaskTemplate], project_start: Date) -> Option<Date> {
    let last_day = template_tasks.iter().map(|task| task.relative_end_day).max()?;
    add_days(project_start, i64::from(last_day))
}
