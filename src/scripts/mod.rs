//! Upload script generation from templates.
//!
//! Every file under the template directory is rendered with Handlebars
//! against the [`UploadContext`] and written to the script directory under
//! its name minus the templating suffix (`upload_win.vdf.j2` becomes
//! `upload_win.vdf`). Scripts are regenerated from scratch on every run.

use crate::config::StoreIds;
use crate::error::{Result, TemplateError};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffixes stripped from template file names
pub const TEMPLATE_SUFFIXES: [&str; 3] = [".j2", ".hbs", ".handlebars"];

/// Values available to upload script templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadContext {
    /// Store application id
    pub appid: String,
    /// Shared content depot
    pub content_depot_id: String,
    /// Windows depot
    pub windows_depot_id: String,
    /// macOS depot
    pub macos_depot_id: String,
    /// Linux depot
    pub linux_depot_id: String,
}

impl From<&StoreIds> for UploadContext {
    fn from(ids: &StoreIds) -> Self {
        Self {
            appid: ids.app_id.clone(),
            content_depot_id: ids.content_depot_id.clone(),
            windows_depot_id: ids.windows_depot_id.clone(),
            macos_depot_id: ids.macos_depot_id.clone(),
            linux_depot_id: ids.linux_depot_id.clone(),
        }
    }
}

/// Renders the template directory into upload scripts
pub struct ScriptTemplateEngine {
    template_dir: PathBuf,
    script_dir: PathBuf,
    registry: Handlebars<'static>,
}

impl ScriptTemplateEngine {
    /// Create an engine reading from `template_dir` and writing to `script_dir`
    pub fn new(template_dir: impl Into<PathBuf>, script_dir: impl Into<PathBuf>) -> Self {
        let mut registry = Handlebars::new();
        // Unknown keys must fail instead of rendering blank depot ids.
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self {
            template_dir: template_dir.into(),
            script_dir: script_dir.into(),
            registry,
        }
    }

    /// Directory rendered scripts are written to
    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Render every template, keyed by output script name.
    ///
    /// Does not touch the script directory.
    pub fn render_all(&self, context: &UploadContext) -> Result<BTreeMap<String, String>> {
        if !self.template_dir.is_dir() {
            return Err(TemplateError::MissingTemplateDir {
                path: self.template_dir.clone(),
            }
            .into());
        }

        let mut rendered = BTreeMap::new();
        let mut sources: BTreeMap<String, String> = BTreeMap::new();

        for entry in WalkDir::new(&self.template_dir)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(TemplateError::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let template_name = relative_name(&self.template_dir, entry.path());
            let source =
                std::fs::read_to_string(entry.path()).map_err(|e| TemplateError::Io {
                    operation: "read template",
                    path: entry.path().to_path_buf(),
                    source: e,
                })?;

            let output =
                self.registry
                    .render_template(&source, context)
                    .map_err(|e| TemplateError::Render {
                        template: template_name.clone(),
                        source: Box::new(e),
                    })?;

            let output_name = output_name(&template_name);
            if let Some(first) = sources.insert(output_name.clone(), template_name.clone()) {
                return Err(TemplateError::DuplicateOutput {
                    output: output_name,
                    first,
                    second: template_name,
                }
                .into());
            }
            log::debug!("Rendered {} -> {}", template_name, output_name);
            rendered.insert(output_name, output);
        }

        Ok(rendered)
    }

    /// Clear the script directory, render every template and write the
    /// results. Returns the written script paths.
    ///
    /// The directory is emptied before rendering, so a failed render never
    /// leaves scripts from an earlier run behind for the upload stage.
    pub fn generate(&self, context: &UploadContext) -> Result<Vec<PathBuf>> {
        let overlap = crate::fs::dirs_overlap(&self.template_dir, &self.script_dir).map_err(|e| {
            TemplateError::Io {
                operation: "resolve",
                path: self.script_dir.clone(),
                source: e,
            }
        })?;
        if overlap {
            return Err(TemplateError::OverlappingDirs {
                template_dir: self.template_dir.clone(),
                script_dir: self.script_dir.clone(),
            }
            .into());
        }

        crate::fs::clean_dir(&self.script_dir).map_err(|e| TemplateError::Io {
            operation: "clear script directory",
            path: self.script_dir.clone(),
            source: e,
        })?;

        let rendered = self.render_all(context)?;

        let mut written = Vec::with_capacity(rendered.len());
        for (name, text) in rendered {
            let path = self.script_dir.join(&name);
            crate::fs::write_file(&path, text.as_bytes()).map_err(|e| TemplateError::Io {
                operation: "write script",
                path: path.clone(),
                source: e,
            })?;
            written.push(path);
        }

        log::info!(
            "Generated {} upload script(s) in {}",
            written.len(),
            self.script_dir.display()
        );
        Ok(written)
    }
}

/// Strip a known templating suffix from a template name
pub fn output_name(template_name: &str) -> String {
    TEMPLATE_SUFFIXES
        .iter()
        .find_map(|suffix| template_name.strip_suffix(suffix))
        .unwrap_or(template_name)
        .to_string()
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
