//! Depot upload through the store upload tool.
//!
//! All scripts of a plan run inside a single upload-tool session:
//! `+login <user> +run_app_build <script>... +exit`.

use crate::config::PipelineConfig;
use crate::error::{Result, UploadError};
use crate::platform::PlatformTarget;
use crate::tool::{ToolInvocation, ToolRunner};
use path_absolutize::Absolutize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Rendered script uploading the shared content depot
pub const CONTENT_SCRIPT: &str = "upload_content.vdf";

const TOOL_NAME: &str = "upload tool";

/// Which depots a release uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Shared content depot only
    ContentOnly,
    /// Content depot followed by the configured platform depots
    AllDepots,
}

impl UploadMode {
    /// Interpret the answer to "Upload content only (Y/n)?".
    ///
    /// Only an answer starting with `n` selects a full upload.
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim_start().to_ascii_lowercase().starts_with('n') {
            UploadMode::AllDepots
        } else {
            UploadMode::ContentOnly
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::ContentOnly => f.write_str("content only"),
            UploadMode::AllDepots => f.write_str("all depots"),
        }
    }
}

/// Ordered upload scripts for one upload-tool session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    mode: UploadMode,
    scripts: Vec<PathBuf>,
}

impl UploadPlan {
    /// Plan uploading only the content depot
    pub fn content_only(script_dir: &Path) -> Self {
        Self {
            mode: UploadMode::ContentOnly,
            scripts: vec![script_dir.join(CONTENT_SCRIPT)],
        }
    }

    /// Plan uploading the content depot, then each platform depot in
    /// canonical platform order.
    pub fn all_depots(script_dir: &Path, platforms: &[PlatformTarget]) -> Self {
        let mut platforms = platforms.to_vec();
        platforms.sort();
        platforms.dedup();

        let mut scripts = vec![script_dir.join(CONTENT_SCRIPT)];
        scripts.extend(
            platforms
                .iter()
                .map(|platform| script_dir.join(platform.upload_script())),
        );
        Self {
            mode: UploadMode::AllDepots,
            scripts,
        }
    }

    /// Plan for the given mode
    pub fn for_mode(mode: UploadMode, script_dir: &Path, platforms: &[PlatformTarget]) -> Self {
        match mode {
            UploadMode::ContentOnly => Self::content_only(script_dir),
            UploadMode::AllDepots => Self::all_depots(script_dir, platforms),
        }
    }

    /// Plan mode
    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Scripts in upload order
    pub fn scripts(&self) -> &[PathBuf] {
        &self.scripts
    }

    /// Number of scripts
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether the plan uploads nothing
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Runs upload plans with the configured upload tool and login
pub struct Uploader<'a, R: ToolRunner> {
    config: &'a PipelineConfig,
    runner: &'a R,
}

impl<'a, R: ToolRunner> Uploader<'a, R> {
    /// Create an uploader for the configured store account
    pub fn new(config: &'a PipelineConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    /// Build the single upload-tool invocation for a plan
    pub fn invocation(&self, plan: &UploadPlan) -> Result<ToolInvocation> {
        let mut invocation = ToolInvocation::new(TOOL_NAME, &self.config.upload_tool)
            .arg("+login")
            .arg(&self.config.store_username);
        for script in plan.scripts() {
            invocation = invocation
                .arg("+run_app_build")
                .arg(script.absolutize()?.into_owned());
        }
        Ok(invocation.arg("+exit"))
    }

    /// Upload every script of the plan, in order, in one tool session
    pub fn upload(&self, plan: &UploadPlan) -> Result<()> {
        if let Some(missing) = plan.scripts().iter().find(|script| !script.is_file()) {
            return Err(UploadError::MissingScript {
                path: missing.clone(),
            }
            .into());
        }

        log::info!(
            "Uploading {} script(s) ({}) as {}",
            plan.len(),
            plan.mode(),
            self.config.store_username
        );
        self.runner.run(&self.invocation(plan)?)?;
        Ok(())
    }

    /// Upload the content depot only
    pub fn upload_content_only(&self) -> Result<UploadPlan> {
        self.upload_mode(UploadMode::ContentOnly)
    }

    /// Upload the content depot and every configured platform depot
    pub fn upload_all_depots(&self) -> Result<UploadPlan> {
        self.upload_mode(UploadMode::AllDepots)
    }

    /// Upload using the plan for `mode`, returning the executed plan
    pub fn upload_mode(&self, mode: UploadMode) -> Result<UploadPlan> {
        let plan = UploadPlan::for_mode(
            mode,
            &self.config.script_dir,
            &self.config.upload_platforms,
        );
        self.upload(&plan)?;
        Ok(plan)
    }
}
