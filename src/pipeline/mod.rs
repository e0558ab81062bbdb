//! Release pipeline orchestration.
//!
//! A run moves strictly forward through
//! `AwaitVersion → Exporting → Packaging → AwaitUploadMode → Uploading →
//! Notifying → Done`. Any stage error aborts the run; nothing already done
//! (version bump, cleared directories, archives) is rolled back.

use crate::cli::OutputManager;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::export::Exporter;
use crate::notify::{NotifyOutcome, Notifier, completion_message};
use crate::package::Packager;
use crate::platform::PlatformTarget;
use crate::scripts::{ScriptTemplateEngine, UploadContext};
use crate::tool::ToolRunner;
use crate::upload::{UploadMode, UploadPlan, Uploader};
use crate::version;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Source of operator decisions
pub trait OperatorPrompt {
    /// Ask for the version to release; `current` is the descriptor's value
    fn new_version(&mut self, current: Option<&str>) -> Result<String>;

    /// Ask whether to upload the content depot only
    fn upload_mode(&mut self) -> Result<UploadMode>;
}

impl<P: OperatorPrompt + ?Sized> OperatorPrompt for Box<P> {
    fn new_version(&mut self, current: Option<&str>) -> Result<String> {
        (**self).new_version(current)
    }

    fn upload_mode(&mut self) -> Result<UploadMode> {
        (**self).upload_mode()
    }
}

/// Pipeline position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    /// Waiting for the operator's version
    AwaitVersion,
    /// Exporting every platform
    Exporting,
    /// Zipping platform outputs
    Packaging,
    /// Waiting for the operator's upload choice
    AwaitUploadMode,
    /// Generating scripts and running the upload tool
    Uploading,
    /// Posting the completion message
    Notifying,
    /// Finished
    Done,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Released version
    pub version: String,
    /// Wall-clock time of export and packaging combined
    pub elapsed: Duration,
    /// Archives in platform order
    pub archives: Vec<PathBuf>,
    /// Upload plan that was executed
    pub upload_plan: UploadPlan,
    /// Notification result
    pub notification: NotifyOutcome,
}

/// One release run
pub struct Pipeline<'a, R: ToolRunner, P: OperatorPrompt> {
    config: &'a PipelineConfig,
    runner: &'a R,
    prompt: P,
    notifier: Notifier,
    output: OutputManager,
    state: PipelineState,
}

impl<'a, R: ToolRunner, P: OperatorPrompt> Pipeline<'a, R, P> {
    /// Create a pipeline; notifications use the configured credentials
    pub fn new(config: &'a PipelineConfig, runner: &'a R, prompt: P, output: OutputManager) -> Self {
        Self {
            config,
            runner,
            prompt,
            notifier: Notifier::new(config.slack.clone()),
            output,
            state: PipelineState::AwaitVersion,
        }
    }

    /// Replace the notifier
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(next > self.state, "pipeline cannot move from {:?} to {:?}", self.state, next);
        log::debug!("Pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run the whole pipeline
    pub async fn run(&mut self) -> Result<PipelineReport> {
        let config = self.config;

        // ===== VERSION =====
        let descriptor = config.descriptor_path();
        let current = version::read_version(&descriptor)?;
        let new_version = self.prompt.new_version(current.as_deref())?;
        version::write_version(&descriptor, &new_version)?;
        self.output
            .success(&format!("Set version {new_version} in {}", descriptor.display()));

        // ===== EXPORT =====
        self.advance(PipelineState::Exporting);
        let started = Instant::now();
        self.output.section("Export");
        let exporter = Exporter::new(config, self.runner);
        exporter.clean_all()?;
        for target in PlatformTarget::ALL {
            self.output.progress(&format!("Exporting {target}..."));
            let artifact = exporter.export(target)?;
            self.output.indent(&format!("Executable: {}", artifact.display()));
        }

        // ===== PACKAGE =====
        self.advance(PipelineState::Packaging);
        self.output.section("Package");
        let packager = Packager::new(&config.build_root);
        let mut archives = Vec::with_capacity(PlatformTarget::ALL.len());
        for target in PlatformTarget::ALL {
            let basename =
                Packager::archive_basename(&config.project_name, &new_version, target.code());
            let archive = packager.package(&config.output_dir(target), &basename)?;
            self.output.indent(&format!("✓ {}", archive.display()));
            archives.push(archive);
        }
        let elapsed = started.elapsed();
        self.output.println("");
        self.output.info(&format!(
            "Exporting and packaging took {:.1}s.",
            elapsed.as_secs_f64()
        ));

        // ===== UPLOAD =====
        self.advance(PipelineState::AwaitUploadMode);
        let mode = self.prompt.upload_mode()?;

        self.advance(PipelineState::Uploading);
        self.output.section("Upload");
        let engine = ScriptTemplateEngine::new(&config.template_dir, &config.script_dir);
        let scripts = engine.generate(&UploadContext::from(&config.store))?;
        self.output.verbose(&format!(
            "Generated {} script(s) in {}",
            scripts.len(),
            engine.script_dir().display()
        ));
        let upload_plan = Uploader::new(config, self.runner).upload_mode(mode)?;
        self.output
            .success(&format!("Uploaded {} depot script(s) ({mode})", upload_plan.len()));

        // ===== NOTIFY =====
        self.advance(PipelineState::Notifying);
        let message = completion_message(&new_version, elapsed, mode);
        let notification = self.notifier.notify(&message).await;
        if notification == NotifyOutcome::Failed {
            self.output.warn("Release notification could not be delivered");
        }

        self.advance(PipelineState::Done);
        Ok(PipelineReport {
            version: new_version,
            elapsed,
            archives,
            upload_plan,
            notification,
        })
    }
}
