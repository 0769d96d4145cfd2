//! Store snapshot persistence.
//!
//! The row store lives in memory; an optional JSON snapshot file keeps
//! it across restarts. Loading tolerates a missing or unreadable file
//! (the server starts empty), and a failed save is logged without
//! failing the request that triggered it.

use gridgate_engine::MemoryStore;
use std::path::Path;

/// Load the store snapshot, or start empty.
pub fn load_store(path: &Path) -> MemoryStore {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(store) => {
                tracing::info!("Loaded store snapshot from {}", path.display());
                store
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unparseable store snapshot {}: {}",
                    path.display(),
                    e
                );
                MemoryStore::new()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryStore::new(),
        Err(e) => {
            tracing::warn!("Failed to read store snapshot {}: {}", path.display(), e);
            MemoryStore::new()
        }
    }
}

/// Write the store snapshot; failures are logged, never surfaced.
pub fn save_store(path: &Path, store: &MemoryStore) {
    let contents = match serde_json::to_string(store) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::error!("Failed to serialize store snapshot: {}", e);
            return;
        }
    };

    if let Err(e) = std::fs::write(path, contents) {
        tracing::error!("Failed to write store snapshot {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgate_engine::{RowStore, SchemaRegistry};
    use serde_json::json;

    #[test]
    fn missing_snapshot_starts_empty() {
        let store = load_store(Path::new("/nonexistent/gridgate.json"));
        assert_eq!(store.sheet_names().count(), 0);
    }

    #[test]
    fn snapshot_roundtrip() {
        let dir = std::env::temp_dir().join("gridgate-persist-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("store.json");

        let registry = SchemaRegistry::defaults();
        let mut store = MemoryStore::new();
        store.open("Products", &registry).unwrap();
        store
            .append("Products", vec![json!("1"), json!("Widget")])
            .unwrap();

        save_store(&path, &store);
        let restored = load_store(&path);
        assert_eq!(store, restored);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn corrupt_snapshot_starts_empty() {
        let dir = std::env::temp_dir().join("gridgate-persist-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("corrupt.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = load_store(&path);
        assert_eq!(store.sheet_names().count(), 0);

        std::fs::remove_file(&path).ok();
    }
}
