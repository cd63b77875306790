//! Collection stage (C6, stage 1): parallel directory walk with the engine's exclusion sets.
//!
//! Traversal mechanics (no symlinks, stats-as-you-go) generalize `vfs::scanner::JWalkScanner`
//! from "build a VFS tree" to "enumerate paths feeding the classify pipeline."

use std::path::{Path, PathBuf};

const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    "venv",
    ".venv",
    "dist",
    "build",
    "release",
    ".cache",
    ".mypy_cache",
    ".pytest_cache",
    "site-packages",
    "eggs",
    ".eggs",
];

const EXCLUDED_EXTENSIONS: &[&str] = &["pyc", "pyo", "pyd", "so", "dylib", "dll", "exe"];

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_excluded_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXCLUDED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Walk `root`, returning every eligible file path in traversal order. Directories named in the
/// excluded set are pruned before descent; hidden entries (dotfiles, dot-directories) are skipped
/// entirely; files whose extension is in the excluded set are dropped after the walk.
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .process_read_dir(|_depth, _path, _state, children| {
            children.retain(|entry| {
                entry
                    .as_ref()
                    .map(|e| {
                        let name = e.file_name().to_string_lossy();
                        if is_hidden(&name) {
                            return false;
                        }
                        if e.file_type().is_dir() && EXCLUDED_DIRS.contains(&name.as_ref()) {
                            return false;
                        }
                        true
                    })
                    .unwrap_or(true)
            });
        });

    walker
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| !is_excluded_extension(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn skips_excluded_dirs_hidden_entries_and_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();
        fs::write(dir.path().join(".hidden"), b"x").unwrap();
        fs::write(dir.path().join("skip.pyc"), b"x").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules").join("inner.txt"), b"x").unwrap();

        let files = collect_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();

        assert!(names.contains(&"keep.txt".to_string()));
        assert!(!names.contains(&".hidden".to_string()));
        assert!(!names.contains(&"skip.pyc".to_string()));
        assert!(!names.contains(&"inner.txt".to_string()));
    }
}
