use crate::error::AppError;
use crate::model::{LoadLevel, MaterializedTask, Task, TaskTemplate};
use crate::storage::json_store::{self, Snapshot};
use crate::template::{
    estimated_project_duration_days, materialize, project_end_date, validate_template_tasks,
};
use crate::timeline::{
    LayoutOptions, ProjectFilter, TimelineItems, TimelineLayout, display_order, filter_projects,
    layout,
};
use crate::workload::{
    ConsultantSummary, LoadThresholds, TaskTimeSummary, WeeklyTotal, aggregate, classify,
    consultant_summaries, task_time_summaries, utilization, week_starts, weekly_totals,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use time::{Date, OffsetDateTime};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekLoad {
    pub week_start: Date,
    pub total_hours: f64,
    pub utilization: f64,
    pub level: LoadLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadRow {
    pub consultant_id: String,
    pub consultant_name: String,
    pub weekly_hours: f64,
    pub weeks: Vec<WeekLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadReport {
    pub weeks: Vec<Date>,
    pub rows: Vec<WorkloadRow>,
}

/// A layout plus the display name of every bar, keyed by bar id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub title: String,
    pub layout: TimelineLayout,
    pub labels: BTreeMap<String, String>,
}

/// A template with its tasks in list order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateOverview {
    pub template_id: String,
    pub name: String,
    pub duration_days: u64,
    pub tasks: Vec<TaskTemplate>,
}

pub fn weekly_workload(
    week_count: u32,
    anchor: Date,
    thresholds: &LoadThresholds,
) -> Result<WorkloadReport, AppError> {
    let path = json_store::store_path()?;
    weekly_workload_with_path(&path, week_count, anchor, thresholds)
}

pub fn team_weekly_totals(
    week_count: u32,
    anchor: Date,
    consultant_id: Option<&str>,
) -> Result<Vec<WeeklyTotal>, AppError> {
    let path = json_store::store_path()?;
    team_weekly_totals_with_path(&path, week_count, anchor, consultant_id)
}

pub fn consultant_workload_summaries() -> Result<Vec<ConsultantSummary>, AppError> {
    let path = json_store::store_path()?;
    consultant_workload_summaries_with_path(&path)
}

pub fn project_timeline(project_id: &str, options: &LayoutOptions) -> Result<TimelineView, AppError> {
    let path = json_store::store_path()?;
    project_timeline_with_path(&path, project_id, options)
}

pub fn template_timeline(
    template_id: &str,
    options: &LayoutOptions,
) -> Result<TimelineView, AppError> {
    let path = json_store::store_path()?;
    template_timeline_with_path(&path, template_id, options)
}

pub fn portfolio_timeline(
    filter: &ProjectFilter,
    options: &LayoutOptions,
) -> Result<TimelineView, AppError> {
    let path = json_store::store_path()?;
    portfolio_timeline_with_path(&path, filter, options)
}

pub fn template_overview(template_id: &str) -> Result<TemplateOverview, AppError> {
    let path = json_store::store_path()?;
    template_overview_with_path(&path, template_id)
}

pub fn template_duration(template_id: &str) -> Result<u64, AppError> {
    let path = json_store::store_path()?;
    template_duration_with_path(&path, template_id)
}

pub fn apply_template(
    template_id: &str,
    project_id: &str,
    start: Option<Date>,
    save: bool,
) -> Result<Vec<MaterializedTask>, AppError> {
    let path = json_store::store_path()?;
    apply_template_with_path(&path, template_id, project_id, start, save)
}

pub fn task_summaries(project_id: &str) -> Result<Vec<TaskTimeSummary>, AppError> {
    let path = json_store::store_path()?;
    task_summaries_with_path(&path, project_id)
}

fn required_id<'a>(raw: &'a str, what: &str) -> Result<&'a str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(format!("{what} id is required")));
    }
    Ok(trimmed)
}

fn weekly_workload_with_path(
    path: &Path,
    week_count: u32,
    anchor: Date,
    thresholds: &LoadThresholds,
) -> Result<WorkloadReport, AppError> {
    if week_count == 0 {
        return Err(AppError::invalid_input("weeks must be at least 1"));
    }
    thresholds.validate()?;

    let snapshot = json_store::load_snapshot(path)?;
    let weeks = week_starts(anchor, week_count)?;
    let records = aggregate(
        &snapshot.time_entries,
        &snapshot.consultants,
        week_count,
        anchor,
    )?;

    // Records come out consultant-major in roster order, and the store has
    // already rejected hours for consultants outside the roster.
    let mut seen = HashSet::new();
    let rows: Vec<WorkloadRow> = snapshot
        .consultants
        .iter()
        .filter(|consultant| seen.insert(consultant.id.as_str()))
        .zip(records.chunks(weeks.len()))
        .map(|(consultant, chunk)| WorkloadRow {
            consultant_id: consultant.id.clone(),
            consultant_name: consultant.name.clone(),
            weekly_hours: consultant.weekly_hours,
            weeks: chunk
                .iter()
                .map(|record| WeekLoad {
                    week_start: record.week_start,
                    total_hours: record.total_hours,
                    utilization: utilization(record.total_hours, consultant.weekly_hours),
                    level: classify(record.total_hours, consultant.weekly_hours, thresholds),
                })
                .collect(),
        })
        .collect();

    let overloaded = rows
        .iter()
        .flat_map(|row| row.weeks.iter())
        .filter(|week| week.level == LoadLevel::Overloaded)
        .count();
    info!(
        consultants = rows.len(),
        weeks = weeks.len(),
        overloaded,
        "built workload report"
    );

    Ok(WorkloadReport { weeks, rows })
}

fn team_weekly_totals_with_path(
    path: &Path,
    week_count: u32,
    anchor: Date,
    consultant_id: Option<&str>,
) -> Result<Vec<WeeklyTotal>, AppError> {
    if week_count == 0 {
        return Err(AppError::invalid_input("weeks must be at least 1"));
    }

    let snapshot = json_store::load_snapshot(path)?;
    let consultant_id = consultant_id
        .map(|raw| required_id(raw, "consultant"))
        .transpose()?;
    if let Some(id) = consultant_id
        && !snapshot.consultants.iter().any(|consultant| consultant.id == id)
    {
        return Err(AppError::invalid_input("consultant not found"));
    }

    let records = aggregate(
        &snapshot.time_entries,
        &snapshot.consultants,
        week_count,
        anchor,
    )?;
    Ok(weekly_totals(&records, consultant_id))
}

fn consultant_workload_summaries_with_path(path: &Path) -> Result<Vec<ConsultantSummary>, AppError> {
    let snapshot = json_store::load_snapshot(path)?;
    Ok(consultant_summaries(
        &snapshot.consultants,
        &snapshot.projects,
        &snapshot.tasks,
    ))
}

fn project_timeline_with_path(
    path: &Path,
    project_id: &str,
    options: &LayoutOptions,
) -> Result<TimelineView, AppError> {
    let project_id = required_id(project_id, "project")?;
    let snapshot = json_store::load_snapshot(path)?;
    let project = snapshot
        .project(project_id)
        .ok_or_else(|| AppError::invalid_input("project not found"))?;

    let tasks = snapshot.tasks_for_project(project_id);
    let options = LayoutOptions {
        empty_anchor: project.start_date,
        ..options.clone()
    };
    let layout = layout(&TimelineItems::from_tasks(&tasks), &options);

    Ok(TimelineView {
        title: project.name.clone(),
        layout,
        labels: tasks
            .iter()
            .map(|task| (task.id.clone(), task.name.clone()))
            .collect(),
    })
}

fn template_timeline_with_path(
    path: &Path,
    template_id: &str,
    options: &LayoutOptions,
) -> Result<TimelineView, AppError> {
    let template_id = required_id(template_id, "template")?;
    let snapshot = json_store::load_snapshot(path)?;
    let template = snapshot
        .project_template(template_id)
        .ok_or_else(|| AppError::invalid_input("template not found"))?;

    let tasks = snapshot.task_templates_for(template_id);
    validate_template_tasks(&tasks)?;
    let layout = layout(&TimelineItems::from_templates(&tasks), options);

    Ok(TimelineView {
        title: template.name.clone(),
        layout,
        labels: tasks
            .iter()
            .map(|task| (task.id.clone(), task.name.clone()))
            .collect(),
    })
}

fn portfolio_timeline_with_path(
    path: &Path,
    filter: &ProjectFilter,
    options: &LayoutOptions,
) -> Result<TimelineView, AppError> {
    let snapshot = json_store::load_snapshot(path)?;
    let projects: Vec<_> = filter_projects(&snapshot.projects, &snapshot.tasks, filter)
        .into_iter()
        .cloned()
        .collect();
    let layout = layout(&TimelineItems::from_projects(&projects), options);

    Ok(TimelineView {
        title: "Projects".to_string(),
        layout,
        labels: projects
            .iter()
            .map(|project| (project.id.clone(), project.name.clone()))
            .collect(),
    })
}

fn template_overview_with_path(path: &Path, template_id: &str) -> Result<TemplateOverview, AppError> {
    let template_id = required_id(template_id, "template")?;
    let snapshot = json_store::load_snapshot(path)?;
    let template = snapshot
        .project_template(template_id)
        .ok_or_else(|| AppError::invalid_input("template not found"))?;

    let tasks = snapshot.task_templates_for(template_id);
    validate_template_tasks(&tasks)?;

    Ok(TemplateOverview {
        template_id: template.id.clone(),
        name: template.name.clone(),
        duration_days: estimated_project_duration_days(&tasks),
        tasks: display_order(&tasks).into_iter().cloned().collect(),
    })
}

fn template_duration_with_path(path: &Path, template_id: &str) -> Result<u64, AppError> {
    let template_id = required_id(template_id, "template")?;
    let snapshot = json_store::load_snapshot(path)?;
    if snapshot.project_template(template_id).is_none() {
        return Err(AppError::invalid_input("template not found"));
    }
    let tasks = snapshot.task_templates_for(template_id);
    validate_template_tasks(&tasks)?;
    Ok(estimated_project_duration_days(&tasks))
}

fn apply_template_with_path(
    path: &Path,
    template_id: &str,
    project_id: &str,
    start: Option<Date>,
    save: bool,
) -> Result<Vec<MaterializedTask>, AppError> {
    let template_id = required_id(template_id, "template")?;
    let project_id = required_id(project_id, "project")?;

    let mut snapshot = json_store::load_snapshot(path)?;
    if snapshot.project_template(template_id).is_none() {
        return Err(AppError::invalid_input("template not found"));
    }
    let project = snapshot
        .project(project_id)
        .ok_or_else(|| AppError::invalid_input("project not found"))?;
    let project_start = start.unwrap_or(project.start_date);

    let template_tasks = snapshot.task_templates_for(template_id);
    let materialized = materialize(&template_tasks, project_start)?;
    info!(
        template_id,
        project_id,
        tasks = materialized.len(),
        save,
        "applied template"
    );

    if save {
        let end = project_end_date(&template_tasks, project_start);
        insert_materialized(&mut snapshot, project_id, &materialized, end)?;
        json_store::save_snapshot(path, &snapshot)?;
    }

    Ok(materialized)
}

fn insert_materialized(
    snapshot: &mut Snapshot,
    project_id: &str,
    materialized: &[MaterializedTask],
    template_end: Option<Date>,
) -> Result<(), AppError> {
    let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos();
    for (index, task) in materialized.iter().enumerate() {
        snapshot.tasks.push(Task {
            id: format!("task-{stamp}-{index}"),
            project_id: Some(project_id.to_string()),
            name: task.name.clone(),
            description: task.description.clone(),
            estimated_hours: task.estimated_hours,
            start_date: task.start_date,
            end_date: task.end_date,
            status: task.status,
            consultant_id: task.consultant_id.clone(),
        });
    }

    let project = snapshot
        .projects
        .iter_mut()
        .find(|project| project.id == project_id)
        .ok_or_else(|| AppError::invalid_input("project not found"))?;
    if let Some(end) = template_end
        && end > project.end_date
    {
        project.end_date = end;
    }

    Ok(())
}

fn task_summaries_with_path(path: &Path, project_id: &str) -> Result<Vec<TaskTimeSummary>, AppError> {
    let project_id = required_id(project_id, "project")?;
    let snapshot = json_store::load_snapshot(path)?;
    if snapshot.project(project_id).is_none() {
        return Err(AppError::invalid_input("project not found"));
    }

    let mut tasks = snapshot.tasks_for_project(project_id);
    tasks.sort_by_key(|task| task.start_date);
    Ok(task_time_summaries(&tasks, &snapshot.time_entries))
}
