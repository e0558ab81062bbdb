//! Project version management.
//!
//! The version lives in a single `config/version="..."` line of the Godot
//! project descriptor. Only that quoted value is rewritten; every other byte
//! of the file is preserved.

use crate::error::{Result, VersionError};
use regex::{NoExpand, Regex};
use std::path::Path;
use std::sync::LazyLock;

static VERSION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"config/version="([^"\r\n]*)""#).expect("version field pattern is valid")
});

/// Check that a version can be stored in the quoted descriptor field.
///
/// Any other syntax is accepted: versions are operator supplied.
pub fn validate_version(version: &str) -> std::result::Result<(), VersionError> {
    let invalid = |reason: &str| VersionError::InvalidVersion {
        version: version.to_string(),
        reason: reason.to_string(),
    };
    if version.trim().is_empty() {
        return Err(invalid("version must not be empty"));
    }
    if version.contains(['\n', '\r']) {
        return Err(invalid("version must be a single line"));
    }
    if version.contains('"') {
        return Err(invalid("version must not contain double quotes"));
    }
    Ok(())
}

/// Current version value in descriptor text, if any
pub fn find_version(text: &str) -> Option<&str> {
    VERSION_FIELD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replace the first version value in descriptor text.
///
/// Returns `None` when the text has no version line.
pub fn replace_version(text: &str, new_version: &str) -> Option<String> {
    if !VERSION_FIELD.is_match(text) {
        return None;
    }
    let replacement = format!(r#"config/version="{new_version}""#);
    Some(
        VERSION_FIELD
            .replacen(text, 1, NoExpand(&replacement))
            .into_owned(),
    )
}

/// Read the current version from a descriptor file
pub fn read_version(descriptor_path: &Path) -> Result<Option<String>> {
    let text = read_descriptor(descriptor_path)?;
    Ok(find_version(&text).map(str::to_string))
}

/// Rewrite the version field of a descriptor file in place.
///
/// No backup is kept.
pub fn write_version(descriptor_path: &Path, new_version: &str) -> Result<()> {
    validate_version(new_version)?;

    let text = read_descriptor(descriptor_path)?;
    let updated =
        replace_version(&text, new_version).ok_or_else(|| VersionError::FieldNotFound {
            path: descriptor_path.to_path_buf(),
        })?;

    std::fs::write(descriptor_path, updated).map_err(|e| VersionError::DescriptorIo {
        operation: "write",
        path: descriptor_path.to_path_buf(),
        source: e,
    })?;

    log::info!(
        "Set version {} in {}",
        new_version,
        descriptor_path.display()
    );
    Ok(())
}

fn read_descriptor(path: &Path) -> std::result::Result<String, VersionError> {
    std::fs::read_to_string(path).map_err(|e| VersionError::DescriptorIo {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    const DESCRIPTOR: &str = "; Engine configuration file.\r\n\
config_version=5\r\n\
\r\n\
[application]\r\n\
\r\n\
config/name=\"Moon Garden\"\r\n\
config/version=\"1.2.0\"\r\n\
run/main_scene=\"res://main.tscn\"\r\n\
config/features=PackedStringArray(\"4.3\")\r\n";

    #[test]
    fn test_replace_only_changes_value() {
        let updated = replace_version(DESCRIPTOR, "1.3.0").unwrap();
        assert_eq!(updated, DESCRIPTOR.replace("1.2.0", "1.3.0"));
        assert_eq!(updated.len(), DESCRIPTOR.len());
    }

    #[test]
    fn test_find_version() {
        assert_eq!(find_version(DESCRIPTOR), Some("1.2.0"));
        assert_eq!(find_version("config_version=5\n"), None);
    }

    #[test]
    fn test_only_first_field_is_rewritten() {
        let text = "config/version=\"1\"\nconfig/version=\"2\"\n";
        assert_eq!(
            replace_version(text, "9").unwrap(),
            "config/version=\"9\"\nconfig/version=\"2\"\n"
        );
    }

    #[test]
    fn test_dollar_is_literal() {
        let updated = replace_version("config/version=\"0\"", "$1-beta").unwrap();
        assert_eq!(updated, "config/version=\"$1-beta\"");
    }

    #[test]
    fn test_empty_value_is_replaced() {
        assert_eq!(
            replace_version("config/version=\"\"", "0.1").unwrap(),
            "config/version=\"0.1\""
        );
    }

    #[test]
    fn test_validate_version() {
        assert!(validate_version("1.3.0 (hotfix)").is_ok());
        assert!(validate_version("  ").is_err());
        assert!(validate_version("1.0\n").is_err());
        assert!(validate_version("1.0\"").is_err());
    }

    #[test]
    fn test_write_version_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.godot");
        std::fs::write(&path, DESCRIPTOR).unwrap();

        write_version(&path, "1.3.0").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("config/version=\"1.3.0\"\r\n"));
        assert_eq!(text, DESCRIPTOR.replace("1.2.0", "1.3.0"));
        assert_eq!(read_version(&path).unwrap().as_deref(), Some("1.3.0"));
    }

    #[test]
    fn test_write_version_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.godot");
        std::fs::write(&path, "[application]\n").unwrap();

        let result = write_version(&path, "1.0");
        assert!(matches!(
            result,
            Err(ReleaseError::Version(VersionError::FieldNotFound { .. }))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[application]\n");
    }

    #[test]
    fn test_write_version_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_version(&dir.path().join("project.godot"), "1.0");
        assert!(matches!(
            result,
            Err(ReleaseError::Version(VersionError::DescriptorIo { operation: "read", .. }))
        ));
    }
}
