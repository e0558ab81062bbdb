//! Error types for release pipeline operations.
//!
//! Every fatal failure of the pipeline is a [`ReleaseError`]. Notification
//! failures are modeled separately by [`NotifyError`] and never reach this
//! type, so a broken chat integration cannot fail a release.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release pipeline operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release pipeline operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Project descriptor version errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Upload script template errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// External tool errors (exporter, upload tool)
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Archive creation errors
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Upload plan errors
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// CLI and prompt errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required environment variables are absent or empty
    #[error("Missing required environment variable(s): {}", names.join(", "))]
    MissingVars {
        /// Names of the missing variables
        names: Vec<String>,
    },

    /// A variable holds a value that cannot be used
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Variable name
        name: String,
        /// Reason for the error
        reason: String,
    },

    /// Configured tool executable could not be resolved
    #[error("{name} not found at '{path}': {reason}")]
    ToolNotFound {
        /// Variable naming the tool
        name: String,
        /// Configured path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Env file could not be read or parsed
    #[error("Failed to load env file {path}: {source}")]
    EnvFile {
        /// Path to the env file
        path: PathBuf,
        /// Underlying dotenv error
        #[source]
        source: dotenvy::Error,
    },
}

/// Project descriptor version errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Descriptor could not be read or written
    #[error("Failed to {operation} descriptor {path}: {source}")]
    DescriptorIo {
        /// "read" or "write"
        operation: &'static str,
        /// Descriptor path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Descriptor has no `config/version="..."` line
    #[error("No config/version field found in {path}")]
    FieldNotFound {
        /// Descriptor path
        path: PathBuf,
    },

    /// Version string cannot be stored in the quoted field
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },
}

/// Upload script template errors
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template directory does not exist
    #[error("Template directory not found: {path}")]
    MissingTemplateDir {
        /// Template directory
        path: PathBuf,
    },

    /// Template failed to parse or referenced an unknown key
    #[error("Failed to render template '{template}': {source}")]
    Render {
        /// Template name relative to the template directory
        template: String,
        /// Handlebars error
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// Script directory is, contains or sits inside the template directory
    #[error("Script directory {script_dir} overlaps template directory {template_dir}")]
    OverlappingDirs {
        /// Template directory
        template_dir: PathBuf,
        /// Script directory
        script_dir: PathBuf,
    },

    /// Two templates map to the same script name
    #[error("Templates '{first}' and '{second}' both render to '{output}'")]
    DuplicateOutput {
        /// Rendered script name
        output: String,
        /// First template
        first: String,
        /// Second template
        second: String,
    },

    /// Filesystem failure while reading templates or writing scripts
    #[error("Failed to {operation} {path}: {source}")]
    Io {
        /// Operation description
        operation: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failure
    #[error("Failed to walk template directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// External tool errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool ran and exited unsuccessfully
    #[error("{tool} failed ({}): {program} {}", exit_status(*exit_code), args.join(" "))]
    Failed {
        /// Tool name
        tool: String,
        /// Executable
        program: PathBuf,
        /// Arguments passed
        args: Vec<String>,
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
    },

    /// Tool could not be started
    #[error("Failed to start {tool} ({program}): {source}")]
    Spawn {
        /// Tool name
        tool: String,
        /// Executable
        program: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Tool reported success but produced nothing
    #[error("{tool} exited successfully but {path} was not created")]
    MissingArtifact {
        /// Tool name
        tool: String,
        /// Expected artifact
        path: PathBuf,
    },
}

fn exit_status(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Archive creation errors
#[derive(Error, Debug)]
pub enum PackageError {
    /// Source directory does not exist
    #[error("Nothing to package: {path} does not exist")]
    MissingSource {
        /// Source directory
        path: PathBuf,
    },

    /// Filesystem failure
    #[error("Failed to {operation} {path}: {source}")]
    Io {
        /// Operation description
        operation: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failure
    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Zip writer failure
    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Upload plan errors
#[derive(Error, Debug)]
pub enum UploadError {
    /// Plan references a script that was not generated
    #[error("Upload script not found: {path}")]
    MissingScript {
        /// Expected script path
        path: PathBuf,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Reading operator input failed
    #[error("Prompt '{prompt}' failed: {reason}")]
    PromptFailed {
        /// Prompt text
        prompt: String,
        /// Reason for the error
        reason: String,
    },
}

/// Notification delivery errors. Logged and discarded, never fatal.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// HTTP client or transport failure
    #[error("Notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel API rejected the message
    #[error("Notification rejected: {reason}")]
    Rejected {
        /// Reason reported by the API
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::MissingVars { names }) => vec![
                format!("Export {} or add them to your .env file", names.join(", ")),
                "Use --env-file to point at a different dotenv file".to_string(),
            ],
            ReleaseError::Config(ConfigError::ToolNotFound { name, .. }) => vec![
                format!("Check that {name} points at an executable"),
                "Use an absolute path if the tool is not on PATH".to_string(),
            ],
            ReleaseError::Version(VersionError::FieldNotFound { .. }) => vec![
                "Set a version under Project Settings > Application > Config in the editor"
                    .to_string(),
            ],
            ReleaseError::Template(TemplateError::Render { .. }) => vec![
                "Templates may only reference appid, content_depot_id, windows_depot_id, macos_depot_id and linux_depot_id".to_string(),
            ],
            ReleaseError::Tool(ToolError::Failed { tool, .. }) => vec![
                format!("Re-run the {tool} command above manually to see its full output"),
                "The project version has already been updated; re-running reuses it".to_string(),
            ],
            ReleaseError::Upload(UploadError::MissingScript { .. }) => vec![
                "Add the missing template to the template directory".to_string(),
                "Or adjust UPLOAD_PLATFORMS to the depots you have templates for".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_message_includes_exit_code() {
        let err = ToolError::Failed {
            tool: "exporter".to_string(),
            program: PathBuf::from("godot"),
            args: vec!["--headless".to_string(), "--path".to_string()],
            exit_code: Some(3),
        };
        let message = err.to_string();
        assert!(message.contains("exit code 3"));
        assert!(message.contains("godot --headless --path"));
    }

    #[test]
    fn test_tool_failure_by_signal() {
        let err = ToolError::Failed {
            tool: "upload tool".to_string(),
            program: PathBuf::from("steamcmd"),
            args: vec![],
            exit_code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_missing_vars_lists_every_name() {
        let err = ReleaseError::from(ConfigError::MissingVars {
            names: vec!["APPID".to_string(), "GODOT_PATH".to_string()],
        });
        assert!(err.to_string().contains("APPID, GODOT_PATH"));
        assert!(!err.recovery_suggestions().is_empty());
    }
}
