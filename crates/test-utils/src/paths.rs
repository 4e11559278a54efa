//! Workspace paths and temporary files for tests.

use std::path::{Path, PathBuf};

/// The workspace root, two levels above `crates/test-utils`.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match manifest_dir.ancestors().nth(2) {
        Some(root) => root.to_path_buf(),
        None => manifest_dir,
    }
}

/// Directory holding the shipped YAML configurations (`config/`).
pub fn config_dir() -> PathBuf {
    workspace_root().join("config")
}

/// A fresh temporary directory, removed when dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("velocity_grid_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_test_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_holds_manifest_and_config() {
        let root = workspace_root();
        assert!(root.join("Cargo.toml").exists(), "no Cargo.toml in {:?}", root);
        assert!(config_dir().join("realign.yaml").exists());
    }

    #[test]
    fn test_write_test_file() {
        let dir = temp_test_dir();
        let path = write_test_file(dir.path(), "grid.txt", "55 56 10 12 1 1\n");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "55 56 10 12 1 1\n");
        assert!(dir
            .path()
            .to_string_lossy()
            .contains("velocity_grid_test_"));
    }
}
