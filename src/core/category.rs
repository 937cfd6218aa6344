//! In-memory state of one category window

use std::path::PathBuf;

use super::config::CategoryData;
use super::storage::Storage;
use super::watcher::{CategoryWatcher, WatchEvent};

/// A file shown in a category window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIcon {
    pub name: String,
    pub path: PathBuf,
}

/// A category and the files it currently owns
pub struct Category {
    pub data: CategoryData,
    icons: Vec<FileIcon>,
    watcher: Option<CategoryWatcher>,
    needs_refresh: bool,
}

impl Category {
    pub fn new(data: CategoryData) -> Self {
        Self {
            data,
            icons: Vec::new(),
            watcher: None,
            needs_refresh: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn file_names(&self) -> &[String] {
        &self.data.file_names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.file_names.iter().any(|n| n == name)
    }

    /// Add a filename if not already listed
    pub fn add_file(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.data.file_names.push(name);
        self.needs_refresh = true;
        true
    }

    pub fn remove_file(&mut self, name: &str) -> bool {
        let before = self.data.file_names.len();
        self.data.file_names.retain(|n| n != name);
        let removed = self.data.file_names.len() != before;
        self.needs_refresh |= removed;
        removed
    }

    /// Apply a storage change if it concerns one of our files
    pub fn apply_event(&mut self, event: &WatchEvent) -> bool {
        match event {
            WatchEvent::Removed(name) => self.remove_file(name),
            WatchEvent::Renamed { from, to } if from == to => false,
            WatchEvent::Renamed { from, to } => {
                let Some(pos) = self.data.file_names.iter().position(|n| n == from) else {
                    return false;
                };
                if self.contains(to) {
                    self.data.file_names.remove(pos);
                } else {
                    self.data.file_names[pos] = to.clone();
                }
                self.needs_refresh = true;
                true
            }
        }
    }

    pub fn attach_watcher(&mut self, watcher: CategoryWatcher) {
        self.watcher = Some(watcher);
    }

    /// Stop observing the storage folder
    pub fn detach_watcher(&mut self) {
        self.watcher = None;
    }

    /// Apply everything the watcher queued. Returns whether the list changed.
    pub fn poll_watcher(&mut self) -> bool {
        let events = match self.watcher {
            Some(ref watcher) => watcher.drain(),
            None => return false,
        };

        let mut changed = false;
        for event in &events {
            changed |= self.apply_event(event);
        }
        changed
    }

    /// Whether the watcher is still waiting to pair a rename
    pub fn watch_pending(&self) -> bool {
        self.watcher.as_ref().is_some_and(CategoryWatcher::has_pending)
    }

    /// Rebuild the icon list from the filename list.
    ///
    /// Names whose file is no longer in storage are dropped from the list.
    pub fn refresh_icons(&mut self, storage: &Storage) {
        let mut icons = Vec::with_capacity(self.data.file_names.len());
        self.data.file_names.retain(|name| {
            let path = storage.stored_path(name);
            if path.is_file() {
                icons.push(FileIcon {
                    name: name.clone(),
                    path,
                });
                true
            } else {
                tracing::debug!("Dropping missing file {}", name);
                false
            }
        });
        self.icons = icons;
        self.needs_refresh = false;
    }

    /// Refresh icons only if something changed since the last refresh
    pub fn refresh_if_needed(&mut self, storage: &Storage) {
        if self.needs_refresh {
            self.refresh_icons(storage);
        }
    }

    pub fn icons(&self) -> &[FileIcon] {
        &self.icons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn storage_with(files: &[&str]) -> (tempfile::TempDir, Storage) {
        let tmp = tempfile::TempDir::new().unwrap();
        let desktop = tmp.path().join("Desktop");
        let store = tmp.path().join("Storage");
        fs::create_dir_all(&desktop).unwrap();
        fs::create_dir_all(&store).unwrap();
        for f in files {
            fs::write(store.join(f), f).unwrap();
        }
        (tmp, Storage::new(desktop, store))
    }

    fn category_with(names: &[&str]) -> Category {
        let mut data = CategoryData::new("Test");
        data.file_names = names.iter().map(|s| s.to_string()).collect();
        Category::new(data)
    }

    #[test]
    fn test_removed_name_disappears_even_if_file_exists() {
        let (_tmp, storage) = storage_with(&["a.txt", "b.txt"]);
        let mut cat = category_with(&["a.txt", "b.txt"]);
        cat.refresh_icons(&storage);
        assert_eq!(cat.icons().len(), 2);

        assert!(cat.remove_file("a.txt"));
        cat.refresh_if_needed(&storage);

        let shown: Vec<_> = cat.icons().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(shown, vec!["b.txt"]);
        assert!(storage.stored_path("a.txt").exists());
    }

    #[test]
    fn test_refresh_drops_missing_files() {
        let (_tmp, storage) = storage_with(&["here.txt"]);
        let mut cat = category_with(&["here.txt", "missing.txt"]);

        cat.refresh_icons(&storage);

        assert_eq!(cat.file_names(), ["here.txt"]);
        assert_eq!(cat.icons()[0].path, storage.stored_path("here.txt"));
    }

    #[test]
    fn test_external_rename_updates_list() {
        let mut cat = category_with(&["x.txt", "a.txt", "y.txt"]);
        let changed = cat.apply_event(&WatchEvent::Renamed {
            from: "a.txt".into(),
            to: "b.txt".into(),
        });

        assert!(changed);
        assert_eq!(cat.file_names(), ["x.txt", "b.txt", "y.txt"]);
    }

    #[test]
    fn test_events_for_other_files_are_ignored() {
        let mut cat = category_with(&["mine.txt"]);
        assert!(!cat.apply_event(&WatchEvent::Removed("theirs.txt".into())));
        assert!(!cat.apply_event(&WatchEvent::Renamed {
            from: "theirs.txt".into(),
            to: "mine2.txt".into(),
        }));
        assert_eq!(cat.file_names(), ["mine.txt"]);
    }

    #[test]
    fn test_rename_onto_listed_name_does_not_duplicate() {
        let mut cat = category_with(&["a.txt", "b.txt"]);
        cat.apply_event(&WatchEvent::Renamed {
            from: "a.txt".into(),
            to: "b.txt".into(),
        });
        assert_eq!(cat.file_names(), ["b.txt"]);
    }

    #[test]
    fn test_rename_onto_same_name_keeps_entry() {
        let mut cat = category_with(&["r.txt"]);
        let changed = cat.apply_event(&WatchEvent::Renamed {
            from: "r.txt".into(),
            to: "r.txt".into(),
        });
        assert!(!changed);
        assert_eq!(cat.file_names(), ["r.txt"]);
    }

    #[test]
    fn test_add_file_is_unique() {
        let mut cat = category_with(&[]);
        assert!(cat.add_file("a.txt"));
        assert!(!cat.add_file("a.txt"));
        assert_eq!(cat.file_names().len(), 1);
    }

    #[test]
    fn test_poll_without_watcher_is_noop() {
        let mut cat = category_with(&["a.txt"]);
        assert!(!cat.poll_watcher());
    }
}
