//! Side table of add-on directory paths a widget can point at.
//!
//! Ids grow from the last entry, so ids freed by deletion are never handed
//! out again unless they were at the end of the list.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ConfigContext;
use crate::error::StoreError;
use crate::store::{read_items, write_json};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonPathEntry {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
}

impl AddonPathEntry {
    /// Add-on id of a `plugin://<id>/...` path.
    pub fn plugin_id(&self) -> Option<&str> {
        let rest = self.path.strip_prefix("plugin://")?;
        let id = rest.split('/').next()?;
        (!id.is_empty()).then_some(id)
    }
}

#[derive(Clone, Debug)]
pub struct AddonPathStore {
    path: PathBuf,
}

impl AddonPathStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_context(ctx: &ConfigContext) -> Self {
        Self::new(ctx.addon_paths_path())
    }

    /// Current entries. A missing file is an empty table; an unreadable one is
    /// reported and treated as empty.
    pub fn read_existing(&self) -> Vec<AddonPathEntry> {
        match self.read_strict() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    target: "home_menu_maker::store",
                    op = "addon_paths",
                    error = %err,
                    "ignoring unreadable add-on path table"
                );
                Vec::new()
            }
        }
    }

    /// Entries for a rewrite. Only a missing file counts as empty; a table
    /// that cannot be read is left alone.
    fn read_strict(&self) -> Result<Vec<AddonPathEntry>, StoreError> {
        match read_items(&self.path) {
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    pub fn next_id(entries: &[AddonPathEntry]) -> u32 {
        entries.last().map(|e| e.id + 1).unwrap_or(0)
    }

    /// Append a path. Empty paths are ignored and yield `Ok(None)`.
    pub fn add(&self, name: &str, path: &str) -> Result<Option<AddonPathEntry>, StoreError> {
        if path.is_empty() {
            return Ok(None);
        }
        let mut entries = self.read_strict()?;
        let entry = AddonPathEntry {
            id: Self::next_id(&entries),
            name: name.to_string(),
            path: path.to_string(),
        };
        entries.push(entry.clone());
        write_json(&self.path, &entries)?;
        info!(
            target: "home_menu_maker::store",
            op = "addon_paths",
            id = entry.id,
            path = %entry.path,
            "add-on path added"
        );
        Ok(Some(entry))
    }

    /// Remove the entries at `indices` (positions, not ids) and rewrite the
    /// table. Out-of-range positions are skipped.
    pub fn delete(&self, indices: &[usize]) -> Result<Vec<AddonPathEntry>, StoreError> {
        let mut entries = self.read_strict()?;
        let mut indices = indices.to_vec();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        for index in indices {
            if index < entries.len() {
                entries.remove(index);
            }
        }
        write_json(&self.path, &entries)?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn table() -> (tempfile::TempDir, AddonPathStore) {
        let dir = tempfile::tempdir().expect("tempdir creation should succeed");
        let store = AddonPathStore::new(dir.path().join("data").join("widget_addon_pathes.json"));
        (dir, store)
    }

    #[test]
    fn ids_continue_after_the_last_entry() {
        let (_dir, store) = table();
        fs::create_dir_all(store.path.parent().expect("table has a parent"))
            .expect("dir should be created");
        fs::write(
            &store.path,
            r#"[{"id": 0, "name": "a", "path": "plugin://a/"}, {"id": 2, "name": "c", "path": "plugin://c/"}]"#,
        )
        .expect("table should be written");

        let entry = store
            .add("d", "plugin://d/")
            .expect("add should succeed")
            .expect("non-empty path is stored");
        assert_eq!(entry.id, 3);
        assert_eq!(store.read_existing().len(), 3);
    }

    #[test]
    fn empty_table_starts_at_zero_and_ignores_empty_paths() {
        let (_dir, store) = table();
        assert!(store.read_existing().is_empty());
        assert_eq!(store.add("nothing", "").expect("add should succeed"), None);
        assert!(!store.path.exists());
        let entry = store
            .add("first", "plugin://plugin.video.first/")
            .expect("add should succeed")
            .expect("non-empty path is stored");
        assert_eq!(entry.id, 0);
    }

    #[test]
    fn delete_removes_positions_and_keeps_gaps() {
        let (_dir, store) = table();
        for name in ["a", "b", "c", "d"] {
            store
                .add(name, &format!("plugin://{name}/"))
                .expect("add should succeed");
        }
        let left = store.delete(&[2, 0, 9]).expect("delete should succeed");
        let ids: Vec<u32> = left.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        let next = store
            .add("e", "plugin://e/")
            .expect("add should succeed")
            .expect("non-empty path is stored");
        assert_eq!(next.id, 4);
    }

    #[test]
    fn unreadable_table_is_empty() {
        let (_dir, store) = table();
        fs::create_dir_all(store.path.parent().expect("table has a parent"))
            .expect("dir should be created");
        fs::write(&store.path, "not json").expect("table should be written");
        assert!(store.read_existing().is_empty());
    }

    #[test]
    fn corrupt_table_is_never_rewritten() {
        let (_dir, store) = table();
        fs::create_dir_all(store.path.parent().expect("table has a parent"))
            .expect("dir should be created");
        let truncated = r#"[{"id": 0, "name": "a", "path": "plugin://a/"}, {"id": 2, "na"#;
        fs::write(&store.path, truncated).expect("table should be written");

        let err = store
            .add("c", "plugin://c/")
            .expect_err("add on a corrupt table should fail");
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(store.delete(&[0]).is_err());
        assert_eq!(
            fs::read_to_string(&store.path).expect("table should be readable"),
            truncated
        );
    }

    #[test]
    fn plugin_id_from_path() {
        let entry = AddonPathEntry {
            id: 0,
            name: "News".into(),
            path: "plugin://plugin.video.news/latest/?page=1".into(),
        };
        assert_eq!(entry.plugin_id(), Some("plugin.video.news"));
        let bad = AddonPathEntry {
            path: "special://home/".into(),
            ..entry
        };
        assert_eq!(bad.plugin_id(), None);
    }
}
