use clap::Parser;
use planner_cli::cli::{
    Cli, Command, ConsultantsCommand, TemplateCommand, TimelineCommand, apply_config_override,
    parse_config_override,
};
use planner_cli::render;
use planner_core::config::{
    Config, ConfigOverrides, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use planner_core::dates::parse_date;
use planner_core::error::AppError;
use planner_core::planner_api;
use planner_core::timeline::{DEFAULT_EMPTY_RANGE_DAYS, LayoutOptions, ProjectFilter};
use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "PLANNER_LOG";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn today() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: {err}; using default configuration");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        apply_config_override(&mut overrides, parsed).map_err(AppError::invalid_input)?;
    }

    let config = merge_overrides(&loaded.config, &overrides);
    config.validate()?;
    Ok(config)
}

fn layout_options(config: &Config) -> LayoutOptions {
    LayoutOptions {
        padding_days: config.padding_days,
        empty_range_days: DEFAULT_EMPTY_RANGE_DAYS,
        empty_anchor: today(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_timeline(view: &planner_api::TimelineView, json: bool) -> Result<(), AppError> {
    if json {
        print_json(view)
    } else {
        println!("{}", render::gantt(view, render::GANTT_WIDTH));
        Ok(())
    }
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    match cli.command {
        Command::Workload {
            weeks,
            from,
            totals,
            consultant,
        } => {
            let anchor = match from.as_deref() {
                Some(raw) => parse_date(raw)?,
                None => today(),
            };
            let week_count = weeks.unwrap_or(config.week_count);
            if totals {
                let weekly =
                    planner_api::team_weekly_totals(week_count, anchor, consultant.as_deref())?;
                if cli.json {
                    print_json(&weekly)?;
                } else {
                    println!("{}", render::totals_table(&weekly));
                }
                return Ok(());
            }
            let report = planner_api::weekly_workload(week_count, anchor, &config.thresholds)?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", render::workload_table(&report));
                let palette = palette_for_theme(config.theme.as_deref());
                for alert in render::workload_alerts(&report, &palette) {
                    println!("{alert}");
                }
            }
        }
        Command::Consultants { consultants } => match consultants {
            ConsultantsCommand::Summary => {
                let summaries = planner_api::consultant_workload_summaries()?;
                if cli.json {
                    print_json(&summaries)?;
                } else {
                    println!("{}", render::consultant_summary_table(&summaries));
                }
            }
        },
        Command::Timeline { timeline } => {
            let options = layout_options(config);
            let view = match timeline {
                TimelineCommand::Project { id } => planner_api::project_timeline(&id, &options)?,
                TimelineCommand::Template { id } => {
                    planner_api::template_timeline(&id, &options)?
                }
                TimelineCommand::Portfolio {
                    consultant,
                    include_completed,
                } => {
                    let filter = ProjectFilter {
                        consultant_id: consultant,
                        include_completed,
                    };
                    planner_api::portfolio_timeline(&filter, &options)?
                }
            };
            print_timeline(&view, cli.json)?;
        }
        Command::Template { template } => match template {
            TemplateCommand::Show { id } => {
                let overview = planner_api::template_overview(&id)?;
                if cli.json {
                    print_json(&overview)?;
                } else {
                    println!("{}", render::template_overview(&overview));
                }
            }
            TemplateCommand::Duration { id } => {
                let days = planner_api::template_duration(&id)?;
                if cli.json {
                    print_json(&serde_json::json!({
                        "template_id": id,
                        "estimated_duration_days": days,
                    }))?;
                } else {
                    println!("Template {id} runs for {days} days");
                }
            }
            TemplateCommand::Apply {
                id,
                project,
                start,
                save,
            } => {
                let start = start.as_deref().map(parse_date).transpose()?;
                let tasks = planner_api::apply_template(&id, &project, start, save)?;
                if cli.json {
                    print_json(&tasks)?;
                } else {
                    println!("{}", render::materialized_table(&tasks));
                    if save {
                        println!("Added {} tasks to project {}", tasks.len(), project);
                    }
                }
            }
        },
        Command::Summary { project_id } => {
            let summaries = planner_api::task_summaries(&project_id)?;
            if cli.json {
                print_json(&summaries)?;
            } else {
                println!("{}", render::summary_table(&summaries));
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: &clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if !err.use_stderr() {
                // --help and --version
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(&err));
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose);

    let config = match resolve_config(&cli) {
        Ok(config) => {
            debug!(?config, "resolved configuration");
            config
        }
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &config) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
