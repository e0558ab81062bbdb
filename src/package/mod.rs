//! Zip packaging of exported platform directories.

use crate::error::{PackageError, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes versioned archives into a single output directory
#[derive(Debug, Clone)]
pub struct Packager {
    output_dir: PathBuf,
}

impl Packager {
    /// Create a packager that writes archives into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Archive basename for a platform build: `{project}_{version}_{code}`
    pub fn archive_basename(project: &str, version: &str, code: &str) -> String {
        format!("{project}_{version}_{code}")
    }

    /// Zip the recursive contents of `source_dir` into
    /// `{output_dir}/{archive_basename}.zip`, replacing any previous archive.
    ///
    /// The source is not checked for completeness; an empty directory yields
    /// an empty archive.
    pub fn package(&self, source_dir: &Path, archive_basename: &str) -> Result<PathBuf> {
        if !source_dir.is_dir() {
            return Err(PackageError::MissingSource {
                path: source_dir.to_path_buf(),
            }
            .into());
        }

        let archive_path = self.output_dir.join(format!("{archive_basename}.zip"));
        log::info!(
            "Packing {} to {}",
            source_dir.display(),
            archive_path.display()
        );

        std::fs::create_dir_all(&self.output_dir).map_err(|e| PackageError::Io {
            operation: "create",
            path: self.output_dir.clone(),
            source: e,
        })?;
        let file = File::create(&archive_path).map_err(|e| PackageError::Io {
            operation: "create",
            path: archive_path.clone(),
            source: e,
        })?;

        write_archive(source_dir, BufWriter::new(file))?;
        Ok(archive_path)
    }
}

fn write_archive(source_dir: &Path, out: BufWriter<File>) -> std::result::Result<(), PackageError> {
    let mut zip = ZipWriter::new(out);
    let base_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry_name(source_dir, entry.path());
        let options = entry_options(base_options, &entry);

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut input = File::open(entry.path()).map_err(|e| PackageError::Io {
                operation: "open",
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            io::copy(&mut input, &mut zip).map_err(|e| PackageError::Io {
                operation: "compress",
                path: entry.path().to_path_buf(),
                source: e,
            })?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Archive entry name: path relative to the source root with `/` separators
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn entry_options(options: SimpleFileOptions, entry: &walkdir::DirEntry) -> SimpleFileOptions {
    match entry.metadata() {
        Ok(metadata) => {
            with_permissions(options, &metadata).large_file(needs_zip64(metadata.len()))
        }
        Err(_) => options,
    }
}

/// Entries of 4 GiB and more need zip64 headers
fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, metadata: &std::fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _metadata: &std::fs::Metadata) -> SimpleFileOptions {
    options
}
