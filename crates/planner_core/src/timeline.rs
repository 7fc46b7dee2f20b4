//! Gantt-style layout.
//!
//! Bars and axis ticks are expressed as fractions of the visible range so a
//! renderer only has to multiply by its own width.

use crate::dates::{add_days, days_between, first_of_next_month};
use crate::model::{Project, ProjectStatus, Task, TaskTemplate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::Date;
use time::macros::date;
use tracing::debug;

pub const DEFAULT_PADDING_DAYS: u32 = 7;
pub const DEFAULT_EMPTY_RANGE_DAYS: u32 = 30;
pub const MAX_RELATIVE_TICKS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedSpan {
    pub id: String,
    pub start: Date,
    pub end: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeSpan {
    pub id: String,
    pub start_day: u32,
    pub end_day: u32,
}

impl From<&Task> for DatedSpan {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            start: task.start_date,
            end: task.end_date,
        }
    }
}

impl From<&Project> for DatedSpan {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            start: project.start_date,
            end: project.end_date,
        }
    }
}

impl From<&TaskTemplate> for RelativeSpan {
    fn from(template: &TaskTemplate) -> Self {
        Self {
            id: template.id.clone(),
            start_day: template.relative_start_day,
            end_day: template.relative_end_day,
        }
    }
}

/// Items to lay out. Project tasks carry calendar dates; template tasks only
/// carry day offsets, so the two never mix in one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineItems {
    Absolute(Vec<DatedSpan>),
    Relative(Vec<RelativeSpan>),
}

impl TimelineItems {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self::Absolute(tasks.iter().map(DatedSpan::from).collect())
    }

    pub fn from_projects(projects: &[Project]) -> Self {
        Self::Absolute(projects.iter().map(DatedSpan::from).collect())
    }

    pub fn from_templates(templates: &[TaskTemplate]) -> Self {
        Self::Relative(templates.iter().map(RelativeSpan::from).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Days added before the earliest start and after the latest end.
    pub padding_days: u32,
    /// Width of the placeholder range used when there is nothing to show.
    pub empty_range_days: u32,
    /// First day of the placeholder range for calendar layouts.
    pub empty_anchor: Date,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            padding_days: DEFAULT_PADDING_DAYS,
            empty_range_days: DEFAULT_EMPTY_RANGE_DAYS,
            empty_anchor: date!(1970 - 01 - 01),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimelineRange {
    Calendar { start: Date, end: Date },
    Relative { start_day: i64, end_day: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBar {
    pub task_id: String,
    pub left_fraction: f64,
    pub width_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub label: String,
    pub position_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayout {
    pub range: TimelineRange,
    pub total_days: i64,
    pub bars: Vec<TimelineBar>,
    pub axis_ticks: Vec<AxisTick>,
}

struct Placed<'a> {
    id: &'a str,
    offset: i64,
    duration: i64,
}

pub fn layout(items: &TimelineItems, options: &LayoutOptions) -> TimelineLayout {
    match items {
        TimelineItems::Absolute(spans) => layout_absolute(spans, options),
        TimelineItems::Relative(spans) => layout_relative(spans, options),
    }
}

fn layout_absolute(spans: &[DatedSpan], options: &LayoutOptions) -> TimelineLayout {
    let bounds = spans
        .iter()
        .map(|span| span.start)
        .min()
        .zip(spans.iter().map(|span| span.end).max());

    let Some((min_start, max_end)) = bounds else {
        let start = options.empty_anchor;
        let total_days = i64::from(options.empty_range_days.max(1));
        let end = add_days(start, total_days).unwrap_or(start);
        return TimelineLayout {
            range: TimelineRange::Calendar { start, end },
            total_days,
            bars: Vec::new(),
            axis_ticks: month_ticks(start, end, total_days),
        };
    };

    let padding = i64::from(options.padding_days);
    let range_start = add_days(min_start, -padding).unwrap_or_else(|| {
        debug!(%min_start, padding, "padding clamped to the first representable date");
        Date::MIN
    });
    let range_end = add_days(max_end, padding).unwrap_or_else(|| {
        debug!(%max_end, padding, "padding clamped to the last representable date");
        Date::MAX
    });
    let total_days = days_between(range_start, range_end).max(1);
    debug!(%range_start, %range_end, total_days, "calendar timeline range");

    let placed = spans
        .iter()
        .map(|span| Placed {
            id: &span.id,
            offset: days_between(range_start, span.start),
            duration: days_between(span.start, span.end),
        })
        .collect();

    TimelineLayout {
        range: TimelineRange::Calendar {
            start: range_start,
            end: range_end,
        },
        total_days,
        bars: place_bars(placed, total_days),
        axis_ticks: month_ticks(range_start, range_end, total_days),
    }
}

fn layout_relative(spans: &[RelativeSpan], options: &LayoutOptions) -> TimelineLayout {
    let total_days = match spans.iter().map(|span| span.end_day).max() {
        Some(max_end) => i64::from(max_end) + 1,
        None => i64::from(options.empty_range_days.max(1)),
    };

    let placed = spans
        .iter()
        .map(|span| Placed {
            id: &span.id,
            offset: i64::from(span.start_day),
            duration: i64::from(span.end_day) - i64::from(span.start_day),
        })
        .collect();

    let step = tick_step(total_days);
    let axis_ticks = (0..total_days)
        .step_by(step)
        .map(|day| AxisTick {
            label: day.to_string(),
            position_fraction: day as f64 / total_days as f64,
        })
        .collect();

    TimelineLayout {
        range: TimelineRange::Relative {
            start_day: 0,
            end_day: total_days,
        },
        total_days,
        bars: place_bars(placed, total_days),
        axis_ticks,
    }
}

/// Every day gets a tick up to `MAX_RELATIVE_TICKS` days; longer ranges are
/// thinned to an even stride so the tick count stays bounded.
fn tick_step(total_days: i64) -> usize {
    let total = total_days.max(1) as u64;
    let step = total.div_ceil(MAX_RELATIVE_TICKS as u64).max(1);
    usize::try_from(step).unwrap_or(usize::MAX)
}

fn by_start_then_duration(a_start: i64, a_duration: i64, b_start: i64, b_duration: i64) -> Ordering {
    a_start
        .cmp(&b_start)
        .then_with(|| a_duration.cmp(&b_duration))
}

fn place_bars(mut placed: Vec<Placed<'_>>, total_days: i64) -> Vec<TimelineBar> {
    // Stable sort: equal (start, duration) pairs keep their input order.
    placed.sort_by(|a, b| by_start_then_duration(a.offset, a.duration, b.offset, b.duration));

    let total = total_days as f64;
    placed
        .into_iter()
        .map(|item| TimelineBar {
            task_id: item.id.to_string(),
            left_fraction: (item.offset as f64 / total).clamp(0.0, 1.0),
            width_fraction: (item.duration.max(1) as f64 / total).min(1.0),
        })
        .collect()
}

fn month_ticks(range_start: Date, range_end: Date, total_days: i64) -> Vec<AxisTick> {
    let mut ticks = Vec::new();
    let mut current = if range_start.day() == 1 {
        Some(range_start)
    } else {
        first_of_next_month(range_start)
    };

    while let Some(tick) = current {
        if tick > range_end {
            break;
        }
        ticks.push(AxisTick {
            label: format!("{} {}", tick.month(), tick.year()),
            position_fraction: days_between(range_start, tick) as f64 / total_days as f64,
        });
        current = first_of_next_month(tick);
    }

    ticks
}

/// Template tasks in the order list views show them: by start day, shorter
/// tasks first on the same day.
pub fn display_order(templates: &[TaskTemplate]) -> Vec<&TaskTemplate> {
    let mut ordered: Vec<&TaskTemplate> = templates.iter().collect();
    ordered.sort_by(|a, b| {
        by_start_then_duration(
            i64::from(a.relative_start_day),
            a.duration_days(),
            i64::from(b.relative_start_day),
            b.duration_days(),
        )
    });
    ordered
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub consultant_id: Option<String>,
    pub include_completed: bool,
}

/// Projects visible on the portfolio timeline. A consultant filter keeps only
/// projects where that consultant is assigned at least one task.
pub fn filter_projects<'a>(
    projects: &'a [Project],
    tasks: &[Task],
    filter: &ProjectFilter,
) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|project| filter.include_completed || project.status != ProjectStatus::Completed)
        .filter(|project| match filter.consultant_id.as_deref() {
            Some(consultant_id) => tasks.iter().any(|task| {
                task.project_id.as_deref() == Some(project.id.as_str())
                    && task.consultant_id.as_deref() == Some(consultant_id)
            }),
            None => true,
        })
        .collect()
}
