//! Pipeline configuration loaded once at startup.
//!
//! Values come from the process environment, falling back to a dotenv file.
//! The resulting [`PipelineConfig`] is immutable and passed by reference to
//! every stage.

use crate::error::{ConfigError, Result};
use crate::platform::PlatformTarget;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variables that must be present
pub const REQUIRED_VARS: [&str; 10] = [
    "GODOT_PATH",
    "STEAMCMD_PATH",
    "STEAM_USERNAME",
    "PROJECT_PATH",
    "PROJECT_NAME",
    "APPID",
    "CONTENT_DEPOT_ID",
    "WINDOWS_DEPOT_ID",
    "MACOS_DEPOT_ID",
    "LINUX_DEPOT_ID",
];

/// Project descriptor file inside the project directory
pub const DESCRIPTOR_FILE: &str = "project.godot";

/// Default full-upload platforms. macOS is left out until notarized builds
/// can be uploaded; set `UPLOAD_PLATFORMS` to include it.
pub const DEFAULT_UPLOAD_PLATFORMS: [PlatformTarget; 2] =
    [PlatformTarget::Windows, PlatformTarget::Linux];

/// Store application and depot identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreIds {
    /// Application id
    pub app_id: String,
    /// Shared content depot
    pub content_depot_id: String,
    /// Windows depot
    pub windows_depot_id: String,
    /// macOS depot
    pub macos_depot_id: String,
    /// Linux depot
    pub linux_depot_id: String,
}

/// Chat channel credentials for the completion notification
#[derive(Clone, PartialEq, Eq)]
pub struct SlackCredentials {
    /// Bot token
    pub token: String,
    /// Channel to post into
    pub channel_id: String,
}

impl std::fmt::Debug for SlackCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackCredentials")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

/// Immutable configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Godot executable
    pub exporter: PathBuf,
    /// steamcmd executable
    pub upload_tool: PathBuf,
    /// Login identity for the upload tool
    pub store_username: String,
    /// Godot project directory
    pub project_path: PathBuf,
    /// Project name used for binaries and archives
    pub project_name: String,
    /// Store identifiers
    pub store: StoreIds,
    /// Notification credentials, `None` disables notification
    pub slack: Option<SlackCredentials>,
    /// Root for platform output directories and archives
    pub build_root: PathBuf,
    /// Directory of upload script templates
    pub template_dir: PathBuf,
    /// Directory rendered upload scripts are written to
    pub script_dir: PathBuf,
    /// Platforms included in a full depot upload
    pub upload_platforms: Vec<PlatformTarget>,
}

impl PipelineConfig {
    /// Load configuration from the process environment and an optional
    /// dotenv file. Process variables take precedence over the file.
    ///
    /// A missing `env_file` is only an error when `required` is set.
    pub fn from_env(env_file: &Path, required: bool) -> Result<Self> {
        let file_vars = load_env_file(env_file, required)?;

        let cwd = std::env::current_dir()?;
        Self::from_lookup(
            |key| {
                std::env::var(key)
                    .ok()
                    .or_else(|| file_vars.get(key).cloned())
            },
            &cwd,
        )
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Relative `BUILD_ROOT` values are resolved against `base_dir`.
    pub fn from_lookup<F>(lookup: F, base_dir: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|&&key| get(key).is_none())
            .map(|&key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars { names: missing }.into());
        }

        // Every required key is present past this point.
        let required = |key: &str| get(key).unwrap_or_default();

        let build_root = match get("BUILD_ROOT") {
            Some(root) => base_dir.join(root),
            None => base_dir.to_path_buf(),
        };
        let template_dir = get("STEAM_TEMPLATE_DIR")
            .map(|dir| build_root.join(dir))
            .unwrap_or_else(|| build_root.join("steam_script_templates"));
        let script_dir = get("STEAM_SCRIPT_DIR")
            .map(|dir| build_root.join(dir))
            .unwrap_or_else(|| build_root.join("steam_scripts"));

        if crate::fs::dirs_overlap(&template_dir, &script_dir)? {
            return Err(ConfigError::InvalidValue {
                name: "STEAM_SCRIPT_DIR".to_string(),
                reason: format!(
                    "{} overlaps the template directory {}; it is cleared on every run",
                    script_dir.display(),
                    template_dir.display()
                ),
            }
            .into());
        }

        let upload_platforms = match get("UPLOAD_PLATFORMS") {
            Some(list) => {
                let platforms = PlatformTarget::parse_list(&list).map_err(|reason| {
                    ConfigError::InvalidValue {
                        name: "UPLOAD_PLATFORMS".to_string(),
                        reason,
                    }
                })?;
                if platforms.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        name: "UPLOAD_PLATFORMS".to_string(),
                        reason: "no platforms listed".to_string(),
                    }
                    .into());
                }
                platforms
            }
            None => DEFAULT_UPLOAD_PLATFORMS.to_vec(),
        };

        let slack = match (get("SLACK_TOKEN"), get("SLACK_CHANNEL_ID")) {
            (Some(token), Some(channel_id)) => Some(SlackCredentials { token, channel_id }),
            _ => None,
        };

        Ok(Self {
            exporter: PathBuf::from(required("GODOT_PATH")),
            upload_tool: PathBuf::from(required("STEAMCMD_PATH")),
            store_username: required("STEAM_USERNAME"),
            project_path: PathBuf::from(required("PROJECT_PATH")),
            project_name: required("PROJECT_NAME"),
            store: StoreIds {
                app_id: required("APPID"),
                content_depot_id: required("CONTENT_DEPOT_ID"),
                windows_depot_id: required("WINDOWS_DEPOT_ID"),
                macos_depot_id: required("MACOS_DEPOT_ID"),
                linux_depot_id: required("LINUX_DEPOT_ID"),
            },
            slack,
            build_root,
            template_dir,
            script_dir,
            upload_platforms,
        })
    }

    /// Resolve both tool executables, failing fast if either is missing.
    pub fn verify_tools(&self) -> Result<()> {
        for (name, path) in [
            ("GODOT_PATH", &self.exporter),
            ("STEAMCMD_PATH", &self.upload_tool),
        ] {
            let resolved = which::which(path).map_err(|e| ConfigError::ToolNotFound {
                name: name.to_string(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
            log::debug!("{} resolved to {}", name, resolved.display());
        }
        Ok(())
    }

    /// Path of the project descriptor holding the version field
    pub fn descriptor_path(&self) -> PathBuf {
        self.project_path.join(DESCRIPTOR_FILE)
    }

    /// Output directory for one platform's export
    pub fn output_dir(&self, target: PlatformTarget) -> PathBuf {
        self.build_root.join(target.code())
    }
}

/// Read a dotenv file into a map.
///
/// Unquoted values lose trailing ` # comments`; quoting and `export `
/// prefixes follow the usual dotenv rules. A missing file is only an error
/// when `required` is set.
pub fn load_env_file(path: &Path, required: bool) -> Result<BTreeMap<String, String>> {
    let env_file_error = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() && !required => return Ok(BTreeMap::new()),
        Err(e) => return Err(env_file_error(e).into()),
    };

    let mut vars = BTreeMap::new();
    for entry in entries {
        let (key, value) = entry.map_err(env_file_error)?;
        vars.insert(key, value);
    }
    log::debug!("Loaded {} variable(s) from {}", vars.len(), path.display());
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("GODOT_PATH", "/opt/godot/godot"),
            ("STEAMCMD_PATH", "/opt/steamcmd/steamcmd.sh"),
            ("STEAM_USERNAME", "builder"),
            ("PROJECT_PATH", "/work/game"),
            ("PROJECT_NAME", "Game"),
            ("APPID", "480"),
            ("CONTENT_DEPOT_ID", "481"),
            ("WINDOWS_DEPOT_ID", "482"),
            ("MACOS_DEPOT_ID", "483"),
            ("LINUX_DEPOT_ID", "484"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<PipelineConfig> {
        PipelineConfig::from_lookup(
            |key| env.get(key).map(|v| v.to_string()),
            Path::new("/build"),
        )
    }

    #[test]
    fn test_complete_environment() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.project_name, "Game");
        assert_eq!(config.store.linux_depot_id, "484");
        assert_eq!(config.descriptor_path(), Path::new("/work/game/project.godot"));
        assert_eq!(config.output_dir(PlatformTarget::Windows), Path::new("/build/win"));
        assert_eq!(config.script_dir, Path::new("/build/steam_scripts"));
        assert_eq!(config.upload_platforms, DEFAULT_UPLOAD_PLATFORMS.to_vec());
        assert!(config.slack.is_none());
    }

    #[test]
    fn test_missing_vars_are_all_reported() {
        let mut env = full_env();
        env.remove("APPID");
        env.insert("LINUX_DEPOT_ID", "  ");
        match load(&env) {
            Err(ReleaseError::Config(ConfigError::MissingVars { names })) => {
                assert_eq!(names, vec!["APPID".to_string(), "LINUX_DEPOT_ID".to_string()]);
            }
            other => panic!("expected MissingVars, got {other:?}"),
        }
    }

    #[test]
    fn test_slack_needs_both_values() {
        let mut env = full_env();
        env.insert("SLACK_TOKEN", "xoxb-1");
        assert!(load(&env).unwrap().slack.is_none());

        env.insert("SLACK_CHANNEL_ID", "C123");
        let slack = load(&env).unwrap().slack.unwrap();
        assert_eq!(slack.channel_id, "C123");
        assert!(!format!("{slack:?}").contains("xoxb-1"));
    }

    #[test]
    fn test_upload_platforms_override() {
        let mut env = full_env();
        env.insert("UPLOAD_PLATFORMS", "linux,macos,windows");
        assert_eq!(load(&env).unwrap().upload_platforms, PlatformTarget::ALL.to_vec());

        env.insert("UPLOAD_PLATFORMS", "linux,ps5");
        assert!(matches!(
            load(&env),
            Err(ReleaseError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_build_root_relative_to_base() {
        let mut env = full_env();
        env.insert("BUILD_ROOT", "out");
        env.insert("STEAM_TEMPLATE_DIR", "/shared/templates");
        let config = load(&env).unwrap();
        assert_eq!(config.build_root, Path::new("/build/out"));
        assert_eq!(config.template_dir, Path::new("/shared/templates"));
        assert_eq!(config.output_dir(PlatformTarget::Linux), Path::new("/build/out/linux"));
    }

    #[test]
    fn test_script_dir_may_not_overlap_templates() {
        let mut env = full_env();
        env.insert("STEAM_TEMPLATE_DIR", "steam");
        env.insert("STEAM_SCRIPT_DIR", "steam");
        match load(&env) {
            Err(ReleaseError::Config(ConfigError::InvalidValue { name, .. })) => {
                assert_eq!(name, "STEAM_SCRIPT_DIR");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        env.insert("STEAM_TEMPLATE_DIR", "steam/templates");
        assert!(load(&env).is_err());

        env.insert("STEAM_TEMPLATE_DIR", "templates");
        assert!(load(&env).is_ok());
    }

    #[test]
    fn test_env_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# steam\nexport APPID=480 # production app\nPROJECT_NAME=\"My Game # 2\"\n\nSTEAM_USERNAME='ci'\n",
        )
        .unwrap();

        let vars = load_env_file(&path, true).unwrap();
        assert_eq!(vars.get("APPID").map(String::as_str), Some("480"));
        assert_eq!(vars.get("PROJECT_NAME").map(String::as_str), Some("My Game # 2"));
        assert_eq!(vars.get("STEAM_USERNAME").map(String::as_str), Some("ci"));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        assert!(load_env_file(&path, false).unwrap().is_empty());
        assert!(matches!(
            load_env_file(&path, true),
            Err(ReleaseError::Config(ConfigError::EnvFile { .. }))
        ));
    }
}
