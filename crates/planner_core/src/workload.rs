//! Weekly workload aggregation.
//!
//! Time entries are bucketed into ISO weeks (Monday to Sunday) per consultant
//! and compared against each consultant's weekly capacity. Everything here is
//! a pure function over an already loaded snapshot.

use crate::dates::{add_days, days_between, week_start};
use crate::error::AppError;
use crate::model::{
    Consultant, LoadLevel, Project, ProjectStatus, Task, TaskStatus, TimeEntry, WorkloadRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use time::Date;
use tracing::debug;

/// Capacity fractions above which a week is classified at each level.
///
/// Comparisons are strict: with the defaults a consultant booked for exactly
/// their capacity is `High`, anything above it is `Overloaded`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadThresholds {
    #[serde(default = "default_overloaded")]
    pub overloaded: f64,
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_normal")]
    pub normal: f64,
}

fn default_overloaded() -> f64 {
    1.0
}

fn default_high() -> f64 {
    0.8
}

fn default_normal() -> f64 {
    0.4
}

impl Default for LoadThresholds {
    fn default() -> Self {
        Self {
            overloaded: default_overloaded(),
            high: default_high(),
            normal: default_normal(),
        }
    }
}

impl LoadThresholds {
    pub fn validate(&self) -> Result<(), AppError> {
        let values = [self.normal, self.high, self.overloaded];
        if values.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(AppError::invalid_input(
                "thresholds must be finite and non-negative",
            ));
        }
        if self.normal > self.high || self.high > self.overloaded {
            return Err(AppError::invalid_input(
                "thresholds must satisfy normal <= high <= overloaded",
            ));
        }
        Ok(())
    }
}

pub fn classify(total_hours: f64, weekly_hours: f64, thresholds: &LoadThresholds) -> LoadLevel {
    if total_hours > thresholds.overloaded * weekly_hours {
        LoadLevel::Overloaded
    } else if total_hours > thresholds.high * weekly_hours {
        LoadLevel::High
    } else if total_hours > thresholds.normal * weekly_hours {
        LoadLevel::Normal
    } else {
        LoadLevel::Low
    }
}

/// Booked hours as a percentage of capacity.
pub fn utilization(total_hours: f64, weekly_hours: f64) -> f64 {
    if weekly_hours > 0.0 {
        total_hours / weekly_hours * 100.0
    } else {
        0.0
    }
}

/// Mondays of the `week_count` weeks starting with the one containing `anchor`.
pub fn week_starts(anchor: Date, week_count: u32) -> Result<Vec<Date>, AppError> {
    let first = week_start(anchor)
        .ok_or_else(|| AppError::invalid_input("anchor date is out of range"))?;
    (0..i64::from(week_count))
        .map(|index| {
            add_days(first, index * 7)
                .ok_or_else(|| AppError::invalid_input("week range is out of range"))
        })
        .collect()
}

pub fn aggregate(
    entries: &[TimeEntry],
    consultants: &[Consultant],
    week_count: u32,
    anchor: Date,
) -> Result<Vec<WorkloadRecord>, AppError> {
    for entry in entries {
        if !entry.hours.is_finite() || entry.hours < 0.0 {
            return Err(AppError::invalid_entry(format!(
                "time entry for {} on {} has invalid hours {}",
                entry.consultant_id, entry.work_date, entry.hours
            )));
        }
    }
    for consultant in consultants {
        if !consultant.weekly_hours.is_finite() || consultant.weekly_hours <= 0.0 {
            return Err(AppError::invalid_entry(format!(
                "consultant {} has invalid weekly hours {}",
                consultant.id, consultant.weekly_hours
            )));
        }
    }

    let weeks = week_starts(anchor, week_count)?;
    let Some(&first) = weeks.first() else {
        return Ok(Vec::new());
    };
    let weeks_len = weeks.len() as i64;

    let mut order: Vec<&str> = Vec::new();
    let mut rows: HashMap<&str, Vec<f64>> = HashMap::new();
    for consultant in consultants {
        if !rows.contains_key(consultant.id.as_str()) {
            order.push(consultant.id.as_str());
            rows.insert(consultant.id.as_str(), vec![0.0; weeks.len()]);
        }
    }

    for entry in entries {
        let offset = days_between(first, entry.work_date);
        let index = offset.div_euclid(7);
        if offset < 0 || index >= weeks_len {
            debug!(
                consultant_id = %entry.consultant_id,
                work_date = %entry.work_date,
                "time entry outside requested weeks"
            );
            continue;
        }

        let row = rows.entry(entry.consultant_id.as_str()).or_insert_with(|| {
            order.push(entry.consultant_id.as_str());
            vec![0.0; weeks.len()]
        });
        row[index as usize] += entry.hours;
    }

    let mut records = Vec::with_capacity(order.len() * weeks.len());
    for consultant_id in order {
        let Some(row) = rows.get(consultant_id) else {
            continue;
        };
        for (week, total_hours) in weeks.iter().zip(row) {
            records.push(WorkloadRecord {
                consultant_id: consultant_id.to_string(),
                week_start: *week,
                total_hours: *total_hours,
            });
        }
    }

    debug!(
        weeks = weeks.len(),
        records = records.len(),
        "aggregated weekly workload"
    );
    Ok(records)
}

/// Logged effort against a task's estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTimeSummary {
    pub task_id: String,
    pub project_id: Option<String>,
    pub task_name: String,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub status: TaskStatus,
    pub work_days: usize,
    pub over_estimate: bool,
}

pub fn task_time_summaries(tasks: &[Task], entries: &[TimeEntry]) -> Vec<TaskTimeSummary> {
    let mut logged: HashMap<&str, (f64, BTreeSet<Date>)> = HashMap::new();
    for entry in entries {
        let Some(task_id) = entry.task_id.as_deref() else {
            continue;
        };
        let slot = logged.entry(task_id).or_default();
        slot.0 += entry.hours;
        slot.1.insert(entry.work_date);
    }

    tasks
        .iter()
        .map(|task| {
            let (actual_hours, work_days) = logged
                .get(task.id.as_str())
                .map(|(hours, days)| (*hours, days.len()))
                .unwrap_or((0.0, 0));
            TaskTimeSummary {
                task_id: task.id.clone(),
                project_id: task.project_id.clone(),
                task_name: task.name.clone(),
                estimated_hours: task.estimated_hours,
                actual_hours,
                status: task.status,
                work_days,
                over_estimate: actual_hours > task.estimated_hours,
            }
        })
        .collect()
}

/// Hours booked across the team in one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub week_start: Date,
    pub total_hours: f64,
}

/// Sum aggregated records per week, optionally for a single consultant.
/// Weeks come out ascending.
pub fn weekly_totals(records: &[WorkloadRecord], consultant_id: Option<&str>) -> Vec<WeeklyTotal> {
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();
    for record in records {
        if consultant_id.is_some_and(|id| id != record.consultant_id) {
            continue;
        }
        *totals.entry(record.week_start).or_default() += record.total_hours;
    }

    totals
        .into_iter()
        .map(|(week_start, total_hours)| WeeklyTotal {
            week_start,
            total_hours,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultantSummary {
    pub consultant_id: String,
    pub consultant_name: String,
    pub active_projects: usize,
    pub pending_hours: f64,
}

/// Per consultant: how many active projects they hold a task in, and the
/// estimated hours of their tasks that are not completed yet.
pub fn consultant_summaries(
    consultants: &[Consultant],
    projects: &[Project],
    tasks: &[Task],
) -> Vec<ConsultantSummary> {
    let active: HashSet<&str> = projects
        .iter()
        .filter(|project| project.status == ProjectStatus::Active)
        .map(|project| project.id.as_str())
        .collect();

    let mut seen = HashSet::new();
    consultants
        .iter()
        .filter(|consultant| seen.insert(consultant.id.as_str()))
        .map(|consultant| {
            let assigned: Vec<&Task> = tasks
                .iter()
                .filter(|task| task.consultant_id.as_deref() == Some(consultant.id.as_str()))
                .collect();
            let active_projects = assigned
                .iter()
                .filter_map(|task| task.project_id.as_deref())
                .filter(|project_id| active.contains(project_id))
                .collect::<HashSet<_>>()
                .len();
            let pending_hours = assigned
                .iter()
                .filter(|task| task.status != TaskStatus::Completed)
                .map(|task| task.estimated_hours)
                .sum();

            ConsultantSummary {
                consultant_id: consultant.id.clone(),
                consultant_name: consultant.name.clone(),
                active_projects,
                pending_hours,
            }
        })
        .collect()
}
