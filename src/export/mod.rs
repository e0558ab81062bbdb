//! Headless export of the project for each platform target.

use crate::config::PipelineConfig;
use crate::error::{Result, ToolError};
use crate::platform::PlatformTarget;
use crate::tool::{ToolInvocation, ToolRunner};
use path_absolutize::Absolutize;
use std::path::PathBuf;

const TOOL_NAME: &str = "exporter";

/// Runs the exporter once per platform
pub struct Exporter<'a, R: ToolRunner> {
    config: &'a PipelineConfig,
    runner: &'a R,
}

impl<'a, R: ToolRunner> Exporter<'a, R> {
    /// Create an exporter for the configured project
    pub fn new(config: &'a PipelineConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    /// Absolute path the platform's binary is exported to
    pub fn artifact_path(&self, target: PlatformTarget) -> Result<PathBuf> {
        let path = self.config.output_dir(target).join(format!(
            "{}.{}",
            self.config.project_name,
            target.extension()
        ));
        Ok(path.absolutize()?.into_owned())
    }

    /// Clear the output directories of every platform
    pub fn clean_all(&self) -> Result<()> {
        for target in PlatformTarget::ALL {
            crate::fs::clean_dir(&self.config.output_dir(target))?;
        }
        Ok(())
    }

    /// Build the exporter command line for a platform
    pub fn invocation(&self, target: PlatformTarget) -> Result<ToolInvocation> {
        Ok(ToolInvocation::new(TOOL_NAME, &self.config.exporter)
            .arg("--headless")
            .arg("--path")
            .arg(&self.config.project_path)
            .arg("--export-release")
            .arg(target.export_profile())
            .arg(self.artifact_path(target)?))
    }

    /// Export one platform into a freshly emptied output directory.
    ///
    /// Returns the artifact path; fails if the exporter exits unsuccessfully
    /// or reports success without producing the artifact.
    pub fn export(&self, target: PlatformTarget) -> Result<PathBuf> {
        crate::fs::clean_dir(&self.config.output_dir(target))?;

        let invocation = self.invocation(target)?;
        let artifact = self.artifact_path(target)?;
        log::info!("Exporting {} to {}", target, artifact.display());

        self.runner.run(&invocation)?;

        if !artifact.exists() {
            return Err(ToolError::MissingArtifact {
                tool: TOOL_NAME.to_string(),
                path: artifact,
            }
            .into());
        }
        Ok(artifact)
    }
}
