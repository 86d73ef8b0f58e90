//! Command handlers

use std::path::PathBuf;

use chrono::Local;
use furfolio_app::app::{AnalyticsService, AnalyticsServiceError};
use furfolio_app::audit::AuditKind;
use furfolio_app::config::Config;
use furfolio_app::export::export_report_to_excel;
use furfolio_app::repository::{open_snapshot_repo, open_snapshot_repo_at};
use furfolio_types::{parse_date_arg, Error, OutputFormat, Result};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::output;

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if let Commands::Config {
        show,
        set_data_dir,
        set_output,
        set_keyword_rules,
        reset,
    } = cli.command
    {
        return cmd_config(show, set_data_dir, set_output, set_keyword_rules, reset);
    }

    let mut config = Config::load()?;
    let output_format = cli.format.unwrap_or(config.output_format);
    let today = match cli.today.as_deref() {
        Some(s) => parse_date_arg(s)?,
        None => Local::now().date_naive(),
    };
    apply_overrides(&mut config, &cli.command);

    let mut service = open_service(config, cli.data_dir)?;
    debug!(as_of = %today, "running analytics");

    match cli.command {
        Commands::Services => {
            let overview = service.service_overview();
            output::output_services(output_format, &overview)
        }
        Commands::Trends { .. } => {
            let report = service.trends(today);
            output::output_trends(output_format, &report)
        }
        Commands::Forecast { .. } => {
            let forecast = service.forecast(today);
            output::output_forecast(output_format, &forecast)
        }
        Commands::Retention => {
            let report = service.retention(today);
            output::output_retention(output_format, &report)
        }
        Commands::Churn { top } => {
            let mut assessments = service.churn(today);
            if let Some(n) = top {
                assessments.truncate(n);
            }
            output::output_churn(output_format, &assessments)
        }
        Commands::Behavior { dog } => {
            let dogs = service.behavior(dog.as_deref());
            match dog {
                Some(dog) if dogs.is_empty() => {
                    println!("No behavior logs for dog {}", dog);
                    Ok(())
                }
                _ => output::output_behavior(output_format, &dogs),
            }
        }
        Commands::Loyalty => {
            let loyalty = service.loyalty(today);
            output::output_loyalty(output_format, &loyalty)
        }
        Commands::Report { output } => {
            let report = service.full_report(today);
            if let Some(path) = output {
                service.record(AuditKind::Export, path.display().to_string());
                export_report_to_excel(&report, Some(service.audit_log()), &path)?;
                eprintln!("Exported report to {}", path.display());
            }
            output::output_report(output_format, &report)
        }
        Commands::Config { .. } => Ok(()),
    }
}

/// Command-line flags take precedence over the config file
fn apply_overrides(config: &mut Config, command: &Commands) {
    match command {
        Commands::Trends { window: Some(days) } => config.trends.window_days = *days,
        Commands::Forecast {
            alpha,
            horizon,
            history,
        } => {
            if let Some(alpha) = alpha {
                config.smoothing_alpha = *alpha;
            }
            if let Some(horizon) = horizon {
                config.forecast_horizon_days = *horizon;
            }
            if let Some(history) = history {
                config.forecast_history_days = *history;
            }
        }
        _ => {}
    }
}

fn open_service(config: Config, data_dir: Option<PathBuf>) -> Result<AnalyticsService> {
    let repo = match data_dir {
        Some(dir) => open_snapshot_repo_at(dir)?,
        None => open_snapshot_repo(&config)?,
    };
    debug!(dir = %repo.dir().display(), "opened data directory");
    AnalyticsService::from_repository(&repo, config)
        .map_err(|e: AnalyticsServiceError| Error::Analytics(e.to_string()))
}

fn cmd_config(
    show: bool,
    set_data_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_keyword_rules: Option<PathBuf>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(dir) = set_data_dir {
        config.data_dir = Some(dir);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(path) = set_keyword_rules {
        config.keyword_rules = Some(path);
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
