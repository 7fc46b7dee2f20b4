use clap::{Parser, Subcommand};
use planner_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(author, version, about = "Consultant workload and project timeline planner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show hours booked per consultant and week
    ///
    /// Example: planner workload
    /// Example: planner workload --weeks 6 --from 2024-03-04
    /// Example: planner workload --totals --consultant c-1
    Workload {
        /// Number of weeks to show (defaults to the configured week_count)
        #[arg(long)]
        weeks: Option<u32>,
        /// Any date inside the first week (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        from: Option<String>,
        /// Show team totals per week instead of one row per consultant
        #[arg(long)]
        totals: bool,
        /// Limit the totals to one consultant
        #[arg(long, requires = "totals")]
        consultant: Option<String>,
    },
    /// Consultant overviews
    Consultants {
        #[command(subcommand)]
        consultants: ConsultantsCommand,
    },
    /// Lay out tasks or projects on a timeline
    Timeline {
        #[command(subcommand)]
        timeline: TimelineCommand,
    },
    /// Inspect or apply project templates
    Template {
        #[command(subcommand)]
        template: TemplateCommand,
    },
    /// Compare logged hours with estimates for a project's tasks
    ///
    /// Example: planner summary p-1
    Summary { project_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ConsultantsCommand {
    /// Active projects and pending hours per consultant
    ///
    /// Example: planner consultants summary
    Summary,
}

#[derive(Subcommand, Debug)]
pub enum TimelineCommand {
    /// Timeline of a project's tasks
    ///
    /// Example: planner timeline project p-1
    Project { id: String },
    /// Timeline of a template's tasks in relative days
    ///
    /// Example: planner timeline template tpl-1
    Template { id: String },
    /// Timeline of all projects
    ///
    /// Example: planner timeline portfolio --consultant c-1
    Portfolio {
        /// Only projects with a task assigned to this consultant
        #[arg(long)]
        consultant: Option<String>,
        /// Show completed projects too
        #[arg(long)]
        include_completed: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// List a template's tasks by start day
    ///
    /// Example: planner template show tpl-1
    Show { id: String },
    /// Print the template's duration in days
    ///
    /// Example: planner template duration tpl-1
    Duration { id: String },
    /// Materialize the template's tasks for a project
    ///
    /// Example: planner template apply tpl-1 --project p-1 --start 2024-01-01 --save
    Apply {
        id: String,
        #[arg(long)]
        project: String,
        /// Project start date (defaults to the project's own start date)
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,
        /// Insert the tasks into the snapshot
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdLevel {
    Overloaded,
    High,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Threshold(ThresholdLevel),
    PaddingDays,
    WeekCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "padding_days" | "padding" => ConfigOverrideTarget::PaddingDays,
        "week_count" | "weeks" => ConfigOverrideTarget::WeekCount,
        "thresholds" | "threshold" => {
            let level = remainder
                .and_then(canonicalize_flag_name)
                .ok_or_else(|| "thresholds override requires a level name".to_string())?;
            let level = match level.as_str() {
                "overloaded" => ThresholdLevel::Overloaded,
                "high" => ThresholdLevel::High,
                "normal" => ThresholdLevel::Normal,
                other => return Err(format!("unknown threshold level '{other}'")),
            };
            return Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Threshold(level),
                value,
            });
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    if remainder.is_some() {
        return Err(format!("{canonical_field} override cannot have subfields"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Fold a parsed override into the accumulated overrides, parsing its value.
pub fn apply_config_override(
    overrides: &mut ConfigOverrides,
    parsed: ParsedConfigOverride,
) -> Result<(), String> {
    match parsed.target {
        ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
        ConfigOverrideTarget::Threshold(level) => {
            let value: f64 = parsed
                .value
                .parse()
                .map_err(|_| format!("threshold must be a number, got '{}'", parsed.value))?;
            match level {
                ThresholdLevel::Overloaded => overrides.overloaded = Some(value),
                ThresholdLevel::High => overrides.high = Some(value),
                ThresholdLevel::Normal => overrides.normal = Some(value),
            }
        }
        ConfigOverrideTarget::PaddingDays => {
            overrides.padding_days = Some(parse_days(&parsed.value)?);
        }
        ConfigOverrideTarget::WeekCount => {
            overrides.week_count = Some(parse_days(&parsed.value)?);
        }
    }
    Ok(())
}

fn parse_days(raw: &str) -> Result<u32, String> {
    raw.parse()
        .map_err(|_| format!("expected a whole number, got '{raw}'"))
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
