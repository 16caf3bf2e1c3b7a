use std::fmt::Write as _;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use taskflow_core::config::{ConfigError, LogLevel, WorkflowConfig};
use taskflow_core::{
    ConfigurationError, MemoryStatusStore, StatusTransitionPolicy, StatusWorkflow, WorkflowError,
};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

#[derive(Parser)]
#[command(
    name = "taskflow",
    version = "0.1.0",
    about = "Inspect and query a task status workflow"
)]
pub struct Cli {
    /// Workflow config file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate the workflow and summarize it
    Check,
    /// List the statuses reachable from STATUS in one step
    Transitions { status: String },
    /// Exit non-zero unless FROM may move to TO
    Allowed { from: String, to: String },
    /// Show the status options a task edit form offers for CURRENT
    Options {
        current: String,
        /// Print options as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the full transition table
    Graph,
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("invalid workflow: {0}")]
    Invalid(#[from] ConfigurationError),

    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── Execution ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub success: bool,
}

impl Report {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

pub async fn execute(command: &Commands, config: &WorkflowConfig) -> Result<Report, CliError> {
    let policy = config.build_policy()?;

    match command {
        Commands::Check => Ok(Report::ok(check(config, &policy))),
        Commands::Transitions { status } => {
            let mut text = String::new();
            for next in policy.transitions(status) {
                let _ = writeln!(text, "{next}");
            }
            Ok(Report::ok(text))
        }
        Commands::Allowed { from, to } => {
            let success = policy.is_allowed(from, to);
            let verdict = if success { "allowed" } else { "denied" };
            Ok(Report {
                text: format!("{verdict}\n"),
                success,
            })
        }
        Commands::Options { current, json } => {
            let store = Arc::new(MemoryStatusStore::seed(config.statuses.iter().cloned()));
            let record = store
                .find_by_name(current)
                .ok_or_else(|| CliError::UnknownStatus(current.clone()))?;
            let workflow = StatusWorkflow::new(Arc::new(policy), store);
            let options = workflow.status_options(&record).await?;

            if *json {
                return Ok(Report::ok(format!(
                    "{}\n",
                    serde_json::to_string_pretty(&options)?
                )));
            }
            let mut text = String::new();
            for option in &options {
                let marker = if option.selected { '*' } else { ' ' };
                let _ = writeln!(text, "{marker} {}", option.text);
            }
            Ok(Report::ok(text))
        }
        Commands::Graph => Ok(Report::ok(graph(&policy))),
    }
}

fn check(config: &WorkflowConfig, policy: &StatusTransitionPolicy) -> String {
    let mut text = format!(
        "ok: {} statuses, {} transitions\n",
        policy.known_statuses().len(),
        policy.table().edge_count()
    );
    if let Some(default) = &config.default_status {
        let _ = writeln!(text, "default: {default}");
    }
    let terminal: Vec<&str> = policy
        .terminal_statuses()
        .into_iter()
        .map(|s| s.as_str())
        .collect();
    let _ = writeln!(text, "terminal: {}", terminal.join(", "));
    text
}

fn graph(policy: &StatusTransitionPolicy) -> String {
    let mut text = String::new();
    for status in policy.known_statuses().iter() {
        let next = policy.transitions(status.as_str());
        if next.is_empty() {
            let _ = writeln!(text, "{status} -> (terminal)");
        } else {
            let targets: Vec<&str> = next.iter().map(|s| s.as_str()).collect();
            let _ = writeln!(text, "{status} -> {}", targets.join(", "));
        }
    }
    text
}

// ─── Logging ─────────────────────────────────────────────────────────────────

/// Handle to the installed log filter, kept so the config's `logLevel` can
/// take effect after the config has been read.
pub struct LogFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogFilter {
    /// Switches to the config's level. A filter taken from `RUST_LOG` is left alone.
    pub fn apply_config_level(&self, level: Option<LogLevel>) {
        let Some(level) = level else { return };
        if self.from_env {
            return;
        }
        let _ = self.handle.reload(EnvFilter::new(level.as_str()));
    }
}

/// Installs the stderr subscriber before any config is loaded. The filter is
/// `RUST_LOG` if set, otherwise `warn` until [`LogFilter::apply_config_level`].
pub fn init_tracing() -> LogFilter {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new("warn"), false),
    };
    let (filter, handle) = reload::Layer::new(filter);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
    LogFilter { handle, from_env }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
