pub mod apply;
pub mod classify;
pub mod config;
pub mod error;
pub mod embed;
pub mod extract;
pub mod models;
pub mod registry;
pub mod resolver;
pub mod scan;
pub mod similarity;
pub mod store;

use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use classify::tier3::Tier3Client;
use config::AppPaths;
use embed::EmbeddingProvider;
use error::Result;
use registry::ScanRegistry;
use store::Store;

/// Initialize tracing with an `RUST_LOG`-style env filter.
///
/// Default: `warn` for dependencies, `info` for this crate's own spans.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,clasp_core=info")),
        )
        .init();
}

/// The process-wide shared resources: store handle, embedding model + prototype map, LLM
/// client, and active-scan registry. Each is guarded the way SPEC_FULL §5 prescribes — the
/// embedder is single-writer/many-readers via its own internal locks, the registry is a
/// `DashMap`, and the store serializes through one `Mutex<Connection>`.
pub struct Engine {
    store: Arc<Store>,
    embedder: Arc<EmbeddingProvider>,
    llm: Arc<Tier3Client>,
    registry: Arc<ScanRegistry>,
}

impl Engine {
    /// Open (or create) the engine's persisted state at the OS-specific app-data root.
    pub fn open() -> Result<Self> {
        let paths = AppPaths::resolve()?;
        Self::at_paths(&paths)
    }

    /// Open the engine rooted at an arbitrary app-data directory, for tests.
    pub fn at_paths(paths: &AppPaths) -> Result<Self> {
        let store = Store::open(&paths.db_path())?;
        let embedder = EmbeddingProvider::new(paths.feedback_embeddings_path())?;
        embedder.load_custom_categories(&store.list_custom_categories()?)?;
        Ok(Self {
            store: Arc::new(store),
            embedder: Arc::new(embedder),
            llm: Arc::new(Tier3Client::new()),
            registry: Arc::new(ScanRegistry::new()),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn embedder(&self) -> &EmbeddingProvider {
        &self.embedder
    }

    pub fn llm(&self) -> &Tier3Client {
        &self.llm
    }

    pub fn registry(&self) -> &ScanRegistry {
        &self.registry
    }

    /// Start a scan of `folder_path` under a fresh `scan_id`, registering it in the active-scan
    /// registry (which evicts entries older than 300s as a side effect) and returning the
    /// progress-event stream.
    pub fn start_scan(&self, folder_path: &Path) -> Result<(String, tokio::sync::mpsc::Receiver<scan::ProgressEvent>)> {
        let scan_id = uuid::Uuid::new_v4().to_string();
        self.registry
            .start(scan_id.clone(), folder_path.to_string_lossy().into_owned());
        let rx = scan::run_scan(
            Arc::clone(&self.store),
            Arc::clone(&self.embedder),
            Arc::clone(&self.llm),
            scan_id.clone(),
            folder_path.to_path_buf(),
        )?;
        Ok((scan_id, rx))
    }

    pub fn finish_scan(&self, scan_id: &str) {
        self.registry.finish(scan_id);
    }

    pub fn preview(&self, scan_id: &str) -> Result<apply::PreviewResult> {
        apply::preview(&self.store, scan_id)
    }

    pub fn apply(
        &self,
        scan_id: &str,
        conflict_resolution: models::ConflictResolution,
        folder_path: &str,
    ) -> Result<apply::ApplyResult> {
        apply::apply(&self.store, scan_id, conflict_resolution, folder_path)
    }

    pub fn undo(&self, action_log_id: &str) -> Result<apply::undo::UndoOutcome> {
        apply::undo::undo(&self.store, action_log_id)
    }

    pub fn history(&self, folder_path: &str) -> Result<Vec<models::ActionBatch>> {
        apply::history(&self.store, folder_path)
    }

    /// Record a manual classification override for a file, and nudge the embedding prototype
    /// for its category toward the file's extracted/cover text.
    pub fn set_manual_classification(&self, file_id: i64, scan_id: &str, category: &str, text: &str) -> Result<()> {
        self.store.insert_classification(
            file_id,
            scan_id,
            Some(category),
            None,
            models::Tier::Manual,
            1.0,
            true,
        )?;
        self.embedder.apply_feedback(text, category)
    }

    /// Register a user-defined category, re-seeding the embedder's prototype/tag caches from the
    /// full persisted set so the new category is immediately classifiable.
    pub fn add_custom_category(&self, name: &str, keywords: &[String]) -> Result<i64> {
        let id = self.store.insert_custom_category(name, keywords)?;
        self.embedder
            .load_custom_categories(&self.store.list_custom_categories()?)?;
        Ok(id)
    }

    pub fn remove_custom_category(&self, name: &str) -> Result<()> {
        self.store.delete_custom_category(name)?;
        self.embedder
            .load_custom_categories(&self.store.list_custom_categories()?)?;
        Ok(())
    }
}
