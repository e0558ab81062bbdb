//! # Godot Steam Release
//!
//! Release pipeline for Godot games shipped on Steam.
//!
//! One run bumps the version in `project.godot`, exports Windows, macOS and
//! Linux builds with a headless Godot, zips each build, renders steamcmd
//! build scripts from templates, uploads the chosen depots and posts a
//! completion message to Slack.
//!
//! ## Features
//!
//! - **Strict stages**: a failing export, archive or upload aborts the run
//! - **Template-driven scripts**: upload scripts are rendered from a
//!   template directory with the store ids
//! - **Single upload session**: every depot of a run is uploaded in one
//!   steamcmd login
//! - **Best-effort notification**: Slack problems never fail a release
//!
//! ## Usage
//!
//! ```bash
//! godot_steam_release                    # reads ./.env if present
//! godot_steam_release --env-file ci.env  # explicit configuration file
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fs;
pub mod notify;
pub mod package;
pub mod pipeline;
pub mod platform;
pub mod scripts;
pub mod tool;
pub mod upload;
pub mod version;

pub use cli::{Args, LinePrompt, OutputManager, TerminalPrompt};
pub use config::{PipelineConfig, SlackCredentials, StoreIds};
pub use error::{ReleaseError, Result};
pub use export::Exporter;
pub use notify::{Notifier, NotifyOutcome};
pub use package::Packager;
pub use pipeline::{OperatorPrompt, Pipeline, PipelineReport, PipelineState};
pub use platform::PlatformTarget;
pub use scripts::{ScriptTemplateEngine, UploadContext};
pub use tool::{ProcessRunner, ToolInvocation, ToolRunner};
pub use upload::{UploadMode, UploadPlan, Uploader};
