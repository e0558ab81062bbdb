//! File system helpers shared by the pipeline stages.

use path_absolutize::Absolutize;
use std::io;
use std::path::Path;

/// Removes the directory and its contents if it exists.
pub fn remove_dir_all(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Removes the directory if present and recreates it empty, with parents.
pub fn clean_dir(path: &Path) -> io::Result<()> {
    remove_dir_all(path)?;
    std::fs::create_dir_all(path)
}

/// Writes a file, creating any parent directories as needed.
pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}

/// Whether either directory is the other or lies inside it.
///
/// Paths are compared after lexical normalization; symlinks are not resolved.
pub fn dirs_overlap(a: &Path, b: &Path) -> io::Result<bool> {
    let a = a.absolutize()?;
    let b = b.absolutize()?;
    Ok(a.starts_with(&b) || b.starts_with(&a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_dir_removes_stale_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("win");
        write_file(&target.join("old/Game.exe"), b"stale").unwrap();

        clean_dir(&target).unwrap();

        assert!(target.is_dir());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/linux");
        clean_dir(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_dir_all(&dir.path().join("missing")).is_ok());
    }

    #[test]
    fn test_dirs_overlap() {
        let root = Path::new("/build");
        assert!(dirs_overlap(&root.join("t"), &root.join("t")).unwrap());
        assert!(dirs_overlap(&root.join("s/t"), &root.join("s")).unwrap());
        assert!(dirs_overlap(&root.join("s"), &root.join("s/t")).unwrap());
        assert!(dirs_overlap(&root.join("x/../s"), &root.join("s/")).unwrap());
        assert!(!dirs_overlap(&root.join("steam_scripts"), &root.join("steam")).unwrap());
        assert!(!dirs_overlap(&root.join("a"), &root.join("b")).unwrap());
    }
}
