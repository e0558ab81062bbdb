//! Command line interface for godot_steam_release.
//!
//! Loads configuration, checks the external tools and drives one
//! interactive release run.

mod args;
mod output;
mod prompt;

pub use args::{Args, DEFAULT_ENV_FILE};
pub use output::OutputManager;
pub use prompt::{LinePrompt, TerminalPrompt, operator_prompt};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::notify::NotifyOutcome;
use crate::pipeline::Pipeline;
use crate::tool::ProcessRunner;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let output = OutputManager::new(args.verbose, false);

    let (env_file, required) = args.env_file();
    let config = PipelineConfig::from_env(&env_file, required)?;
    config.verify_tools()?;

    output.info(&format!("Project path: {}", config.project_path.display()));
    output.verbose(&format!("Build root: {}", config.build_root.display()));
    if config.slack.is_none() {
        output.verbose("SLACK_TOKEN/SLACK_CHANNEL_ID not set, notification disabled");
    }

    let runner = ProcessRunner;
    let mut pipeline = Pipeline::new(&config, &runner, operator_prompt(), output.clone());
    let report = pipeline.run().await?;

    output.section("Release complete");
    output.success(&format!("Version {} released", report.version));
    for archive in &report.archives {
        output.indent(&archive.display().to_string());
    }
    output.indent(&format!(
        "{} depot script(s) uploaded ({})",
        report.upload_plan.len(),
        report.upload_plan.mode()
    ));
    match report.notification {
        NotifyOutcome::Delivered => output.indent("Notification posted"),
        NotifyOutcome::Skipped => output.verbose("Notification skipped"),
        NotifyOutcome::Failed => {}
    }

    Ok(0)
}
