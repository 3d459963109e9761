//! PortSlay - interactive dashboard for processes on network ports
//!
//! Lists listening ports with their owning processes, filters and sorts
//! them, and kills processes with live feedback.

mod clipboard;
mod commands;
mod logging;
mod tui;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use portslay_core::{config::app_file, Config, ConfigStore};
use tracing::warn;

use crate::logging::LogTarget;
use crate::tui::{DashboardOptions, SortKey, TuiOptions};

/// Shortest accepted refresh interval.
const MIN_INTERVAL_MS: u64 = 100;

#[derive(Parser)]
#[command(name = "portslay")]
#[command(author, version, about = "Interactive dashboard for processes on network ports")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,

    /// Refresh interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    interval: Option<u64>,

    /// Sort key: port, process, pid or user
    #[arg(short, long, global = true, value_name = "KEY")]
    sort: Option<String>,

    /// Initial filter text
    #[arg(short, long)]
    filter: Option<String>,

    /// Show the details strip on startup
    #[arg(short, long)]
    details: bool,

    /// Kill without asking for confirmation
    #[arg(long)]
    no_confirm: bool,

    /// Log file used while the dashboard runs
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all listening ports
    #[command(alias = "ls")]
    List {
        /// Filter by port number
        #[arg(short, long)]
        port: Option<u16>,

        /// Filter by process name
        #[arg(short = 'n', long)]
        name: Option<String>,
    },

    /// Kill every process on a port
    Kill {
        /// Port number to kill
        port: u16,

        /// Force kill (SIGKILL) without graceful shutdown
        #[arg(long)]
        force: bool,
    },

    /// Show kill statistics and rank
    Stats,

    /// Show current configuration
    Config,
}

impl Cli {
    fn is_interactive(&self) -> bool {
        self.command.is_none() && !self.no_tui && !self.json && atty::is(atty::Stream::Stdout)
    }

    fn sort_name<'a>(&'a self, config: &'a Config) -> &'a str {
        self.sort.as_deref().unwrap_or(&config.default_sort)
    }

    /// Dashboard settings: flags win over the config file.
    fn tui_options(&self, config: &Config) -> TuiOptions {
        let sort_name = self.sort_name(config);
        let sort = SortKey::parse(sort_name);
        if sort.is_none() {
            warn!(sort = sort_name, "unknown sort key, keeping scan order");
        }
        let interval = self
            .interval
            .unwrap_or(config.refresh_interval_ms)
            .max(MIN_INTERVAL_MS);

        TuiOptions {
            dashboard: DashboardOptions {
                refresh_interval: Duration::from_millis(interval),
                toast_duration: Duration::from_millis(config.toast_duration_ms),
                confirm_kills: config.confirm_kills && !self.no_confirm,
            },
            sort,
            filter: self.filter.clone().unwrap_or_default(),
            show_details: self.details || config.show_details,
        }
    }
}

async fn load_config() -> Config {
    let store = match ConfigStore::new() {
        Ok(store) => store,
        Err(err) => {
            warn!(error = %err, "no config location, using defaults");
            return Config::default();
        }
    };
    match store.load().await {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %store.path().display(), error = %err, "invalid config, using defaults");
            Config::default()
        }
    }
}

async fn show_config(json: bool) -> anyhow::Result<()> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    println!("Config file: {}", store.path().display());
    println!("  refreshIntervalMs: {}", config.refresh_interval_ms);
    println!("  toastDurationMs:   {}", config.toast_duration_ms);
    println!("  defaultSort:       {}", config.default_sort);
    println!("  showDetails:       {}", config.show_details);
    println!("  confirmKills:      {}", config.confirm_kills);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = cli.is_interactive();

    let log_target = if interactive {
        match &cli.log_file {
            Some(path) => LogTarget::File(path.clone()),
            None => LogTarget::File(app_file("portslay.log")?),
        }
    } else {
        LogTarget::Stderr
    };
    logging::init(log_target)?;

    let config = load_config().await;

    match &cli.command {
        Some(Commands::List { port, name }) => {
            commands::list::run(*port, name.clone(), cli.sort_name(&config), cli.json).await?;
        }
        Some(Commands::Kill { port, force }) => {
            commands::kill::run(*port, *force, cli.json).await?;
        }
        Some(Commands::Stats) => {
            commands::stats::run(cli.json).await?;
        }
        Some(Commands::Config) => {
            show_config(cli.json).await?;
        }
        None => {
            // Default: Launch TUI or list ports
            if interactive {
                tui::run(cli.tui_options(&config)).await?;
            } else {
                commands::list::run(None, None, cli.sort_name(&config), cli.json).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "portslay",
            "--interval",
            "500",
            "--sort",
            "pid",
            "--filter",
            "30",
            "--no-confirm",
        ]);
        let options = cli.tui_options(&Config::default());
        assert_eq!(options.dashboard.refresh_interval, Duration::from_millis(500));
        assert_eq!(options.sort, Some(SortKey::Pid));
        assert_eq!(options.filter, "30");
        assert!(!options.dashboard.confirm_kills);
        assert!(!options.show_details);
    }

    #[test]
    fn test_config_used_without_flags() {
        let cli = Cli::parse_from(["portslay"]);
        let config = Config {
            refresh_interval_ms: 10,
            toast_duration_ms: 1500,
            default_sort: "wat".to_string(),
            show_details: true,
            confirm_kills: true,
        };
        let options = cli.tui_options(&config);
        assert_eq!(
            options.dashboard.refresh_interval,
            Duration::from_millis(MIN_INTERVAL_MS)
        );
        assert_eq!(options.dashboard.toast_duration, Duration::from_millis(1500));
        assert_eq!(options.sort, None);
        assert!(options.show_details);
        assert!(options.dashboard.confirm_kills);
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::parse_from(["portslay", "kill", "8080", "--force"]);
        assert!(matches!(cli.command, Some(Commands::Kill { port: 8080, force: true })));

        let cli = Cli::parse_from(["portslay", "ls", "--port", "3000", "--sort", "name"]);
        assert!(matches!(cli.command, Some(Commands::List { port: Some(3000), .. })));
        assert_eq!(cli.sort.as_deref(), Some("name"));
    }
}
