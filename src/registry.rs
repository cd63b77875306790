//! Active-scan registry (C14): in-memory map of currently-running scans, TTL-evicted.
//!
//! `DashMap` is an ambient teacher dependency already used elsewhere; no new crate needed.

use dashmap::DashMap;
use std::time::{Duration, Instant};

const SCAN_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct ScanHandle {
    pub folder_path: String,
    pub created_at: Instant,
}

#[derive(Default)]
pub struct ScanRegistry {
    scans: DashMap<String, ScanHandle>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self {
            scans: DashMap::new(),
        }
    }

    /// Register a new scan, first evicting any entries past the TTL.
    pub fn start(&self, scan_id: String, folder_path: String) {
        self.evict_expired();
        self.scans.insert(
            scan_id,
            ScanHandle {
                folder_path,
                created_at: Instant::now(),
            },
        );
    }

    pub fn finish(&self, scan_id: &str) {
        self.scans.remove(scan_id);
    }

    pub fn get(&self, scan_id: &str) -> Option<ScanHandle> {
        self.scans.get(scan_id).map(|entry| entry.clone())
    }

    fn evict_expired(&self) {
        self.scans
            .retain(|_, handle| handle.created_at.elapsed() < SCAN_TTL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_get_roundtrip() {
        let registry = ScanRegistry::new();
        registry.start("scan-1".to_string(), "/tmp/x".to_string());
        let handle = registry.get("scan-1").unwrap();
        assert_eq!(handle.folder_path, "/tmp/x");
    }

    #[test]
    fn finish_removes_entry() {
        let registry = ScanRegistry::new();
        registry.start("scan-1".to_string(), "/tmp/x".to_string());
        registry.finish("scan-1");
        assert!(registry.get("scan-1").is_none());
    }
}
