//! App-data path resolution.
//!
//! Mirrors the OS branching the original engine used to locate its SQLite database and the
//! feedback-embeddings side file: macOS gets a Library path, Windows reads `%APPDATA%`, anything
//! else follows the XDG base directory spec.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    /// Resolve the app-data root, creating it if absent.
    pub fn resolve() -> crate::error::Result<Self> {
        let root = Self::data_root();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Build an instance rooted at an arbitrary directory, for tests.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn data_root() -> PathBuf {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Library/Application Support/Clasp")
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
                .join("Clasp")
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            std::env::var_os("XDG_DATA_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| {
                    dirs::home_dir()
                        .unwrap_or_else(|| PathBuf::from("."))
                        .join(".local/share")
                })
                .join("Clasp")
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join("clasp.db")
    }

    pub fn feedback_embeddings_path(&self) -> PathBuf {
        self.root.join("feedback_embeddings.json")
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_builds_expected_children() {
        let paths = AppPaths::at("/tmp/clasp-test");
        assert_eq!(paths.db_path(), PathBuf::from("/tmp/clasp-test/clasp.db"));
        assert_eq!(
            paths.feedback_embeddings_path(),
            PathBuf::from("/tmp/clasp-test/feedback_embeddings.json")
        );
    }
}
