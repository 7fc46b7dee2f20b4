use planner_core::config::Palette;
use planner_core::dates::format_date;
use planner_core::model::{LoadLevel, MaterializedTask};
use planner_core::planner_api::{TemplateOverview, TimelineView, WorkloadReport};
use planner_core::timeline::TimelineRange;
use planner_core::workload::{ConsultantSummary, TaskTimeSummary, WeeklyTotal};
use tabled::builder::Builder;
use tabled::settings::Style;

pub const GANTT_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 24;

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.1}")
    }
}

pub fn workload_table(report: &WorkloadReport) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["Consultant".to_string()];
    header.extend(
        report
            .weeks
            .iter()
            .map(|week| format!("Week of {}", format_date(*week))),
    );
    builder.push_record(header);

    for row in &report.rows {
        let mut record = vec![row.consultant_name.clone()];
        record.extend(row.weeks.iter().map(|week| {
            format!(
                "{}/{} {}",
                format_hours(week.total_hours),
                format_hours(row.weekly_hours),
                week.level.as_str()
            )
        }));
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

pub fn totals_table(totals: &[WeeklyTotal]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Week", "Hours"].map(String::from));
    for total in totals {
        builder.push_record([
            format!("Week of {}", format_date(total.week_start)),
            format_hours(total.total_hours),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

pub fn consultant_summary_table(summaries: &[ConsultantSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Consultant", "Active projects", "Pending hours"].map(String::from));
    for summary in summaries {
        builder.push_record([
            summary.consultant_name.clone(),
            summary.active_projects.to_string(),
            format_hours(summary.pending_hours),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

/// One line per consultant-week at high load or above, coloured by level.
pub fn workload_alerts(report: &WorkloadReport, palette: &Palette) -> Vec<String> {
    let mut alerts = Vec::new();
    for row in &report.rows {
        for week in &row.weeks {
            if week.level < LoadLevel::High {
                continue;
            }
            let line = format!(
                "{}: {} week of {} ({:.0}% of capacity)",
                week.level.as_str(),
                row.consultant_name,
                format_date(week.week_start),
                week.utilization
            );
            alerts.push(palette.paint(week.level, &line));
        }
    }
    alerts
}

fn column(fraction: f64, width: usize) -> usize {
    ((fraction * width as f64).round() as usize).min(width)
}

fn fit_label(label: &str) -> String {
    let mut fitted: String = label.chars().take(LABEL_WIDTH).collect();
    while fitted.chars().count() < LABEL_WIDTH {
        fitted.push(' ');
    }
    fitted
}

/// Tick labels written at their columns, skipping any that would overlap.
fn axis_line(view: &TimelineView, width: usize) -> String {
    let mut line = vec![' '; width + 1];
    let mut next_free = 0;
    for tick in &view.layout.axis_ticks {
        let start = column(tick.position_fraction, width);
        if start < next_free || start + tick.label.chars().count() > line.len() {
            continue;
        }
        for (offset, ch) in tick.label.chars().enumerate() {
            line[start + offset] = ch;
        }
        next_free = start + tick.label.chars().count() + 1;
    }
    line.into_iter().collect::<String>().trim_end().to_string()
}

pub fn gantt(view: &TimelineView, width: usize) -> String {
    let mut lines = Vec::new();
    let range = match &view.layout.range {
        TimelineRange::Calendar { start, end } => {
            format!("{} .. {}", format_date(*start), format_date(*end))
        }
        TimelineRange::Relative { start_day, end_day } => {
            format!("day {start_day} .. day {end_day}")
        }
    };
    lines.push(format!(
        "{} ({}, {} days)",
        view.title, range, view.layout.total_days
    ));
    lines.push(format!(
        "{} {}",
        " ".repeat(LABEL_WIDTH),
        axis_line(view, width)
    ));

    if view.layout.bars.is_empty() {
        lines.push(format!("{} (no tasks)", " ".repeat(LABEL_WIDTH)));
        return lines.join("\n");
    }

    for bar in &view.layout.bars {
        let start = column(bar.left_fraction, width);
        let length = column(bar.width_fraction, width).max(1);
        let end = (start + length).min(width);
        let start = start.min(end.saturating_sub(1));

        let mut track = String::with_capacity(width);
        for index in 0..width {
            track.push(if index >= start && index < end { '#' } else { '.' });
        }

        let label = view
            .labels
            .get(&bar.task_id)
            .map(String::as_str)
            .unwrap_or(bar.task_id.as_str());
        lines.push(format!("{} |{}|", fit_label(label), track));
    }

    lines.join("\n")
}

pub fn summary_table(summaries: &[TaskTimeSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(
        ["Task", "Status", "Estimated", "Logged", "Days", "Estimate"].map(String::from),
    );
    for summary in summaries {
        builder.push_record([
            summary.task_name.clone(),
            summary.status.as_str().to_string(),
            format!("{}h", format_hours(summary.estimated_hours)),
            format!("{}h", format_hours(summary.actual_hours)),
            summary.work_days.to_string(),
            if summary.over_estimate {
                "over estimate".to_string()
            } else {
                "ok".to_string()
            },
        ]);
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

pub fn template_overview(overview: &TemplateOverview) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Task", "Days", "Length", "Hours", "Specialization"].map(String::from));
    for task in &overview.tasks {
        builder.push_record([
            task.name.clone(),
            format!("{}-{}", task.relative_start_day, task.relative_end_day),
            format!("{}d", task.duration_days() + 1),
            format_hours(task.estimated_hours),
            task.specialization.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::psql());
    format!(
        "{} ({} days)\n{}",
        overview.name, overview.duration_days, table
    )
}

pub fn materialized_table(tasks: &[MaterializedTask]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Task", "Start", "End", "Hours", "Specialization"].map(String::from));
    for task in tasks {
        builder.push_record([
            task.name.clone(),
            format_date(task.start_date),
            format_date(task.end_date),
            format_hours(task.estimated_hours),
            task.specialization.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}
