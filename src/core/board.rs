//! The set of open categories and the moves between them

use std::collections::HashSet;
use std::path::Path;

use super::category::Category;
use super::config::CategoryData;
use super::relocate::file_name_of;
use super::storage::Storage;
use super::watcher::{CategoryWatcher, Waker};

/// All open categories over one storage folder.
///
/// A filename belongs to at most one category. Moving a name to another
/// category takes it away from its previous owner; duplicate claims found
/// on load go to the category listed first.
pub struct Board {
    categories: Vec<Category>,
    storage: Storage,
    waker: Option<Waker>,
}

impl Board {
    pub fn new(storage: Storage) -> Self {
        Self {
            categories: Vec::new(),
            storage,
            waker: None,
        }
    }

    /// Build the board from persisted categories, pulling their files in
    /// from the desktop.
    pub fn load(storage: Storage, saved: Vec<CategoryData>) -> Self {
        let mut board = Self::new(storage);
        let mut claimed = HashSet::new();

        for mut data in saved {
            data.file_names.retain(|name| {
                let first = claimed.insert(name.clone());
                if !first {
                    tracing::warn!("{} is claimed by more than one category, keeping the first", name);
                }
                first
            });

            let moved = board.storage.import(&mut data.file_names);
            tracing::info!("Restored category {:?} ({} files pulled in)", data.title, moved);

            let mut category = Category::new(data);
            category.refresh_icons(&board.storage);
            board.categories.push(category);
        }

        board
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut [Category] {
        &mut self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id() == id)
    }

    /// Id of the category owning `name`
    pub fn owner_of(&self, name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.contains(name))
            .map(Category::id)
    }

    /// Start live watching for every category, and for ones added later
    pub fn start_watchers(&mut self, waker: Option<Waker>) {
        self.waker = waker;
        let storage_dir = self.storage.storage_dir().to_path_buf();
        for category in &mut self.categories {
            Self::watch(category, &storage_dir, self.waker.clone());
        }
    }

    fn watch(category: &mut Category, dir: &Path, waker: Option<Waker>) {
        match CategoryWatcher::spawn(dir, waker) {
            Ok(watcher) => category.attach_watcher(watcher),
            Err(e) => tracing::warn!("Category {:?} has no live updates: {}", category.data.title, e),
        }
    }

    /// Add a new empty category
    pub fn create(&mut self, data: CategoryData) -> &mut Category {
        tracing::info!("Created category {:?}", data.title);
        let mut category = Category::new(data);
        if self.waker.is_some() {
            Self::watch(&mut category, self.storage.storage_dir(), self.waker.clone());
        }
        category.refresh_icons(&self.storage);
        self.categories.push(category);
        let last = self.categories.len() - 1;
        &mut self.categories[last]
    }

    /// Remove a category, sending its files back to the desktop
    pub fn delete(&mut self, id: &str) -> Option<CategoryData> {
        let pos = self.categories.iter().position(|c| c.id() == id)?;
        let mut category = self.categories.remove(pos);
        category.detach_watcher();

        let restored = self.storage.restore(&mut category.data.file_names);
        tracing::info!(
            "Deleted category {:?} ({} files returned to desktop)",
            category.data.title,
            restored
        );
        Some(category.data)
    }

    /// Give `name` to the category `to`, taking it from any other owner
    pub fn assign(&mut self, name: &str, to: &str) -> bool {
        if self.get(to).is_none() {
            return false;
        }
        if let Some(from) = self.owner_of(name).filter(|&owner| owner != to).map(str::to_string) {
            if let Some(previous) = self.get_mut(&from) {
                previous.remove_file(name);
                tracing::debug!("{} left category {:?}", name, previous.data.title);
            }
        }
        match self.get_mut(to) {
            Some(target) => target.add_file(name),
            None => false,
        }
    }

    /// File a dropped path under category `to`.
    ///
    /// Paths already in storage change owner; anything else is moved into
    /// storage first. Returns the stored basename.
    pub fn adopt_path(&mut self, path: &Path, to: &str) -> Option<String> {
        self.get(to)?;

        let name = if self.storage.is_stored(path) {
            file_name_of(path)?
        } else {
            self.storage.adopt(path)?
        };

        self.assign(&name, to);
        Some(name)
    }

    /// Send one file of category `id` back to the desktop
    pub fn return_file(&mut self, id: &str, name: &str) -> bool {
        if !self.get(id).is_some_and(|c| c.contains(name)) {
            return false;
        }
        if self.storage.return_to_desktop(name).is_none() {
            return false;
        }
        if let Some(category) = self.get_mut(id) {
            category.remove_file(name);
        }
        true
    }

    /// Drain every watcher. Returns whether any list changed.
    pub fn poll_watchers(&mut self) -> bool {
        let mut changed = false;
        for category in &mut self.categories {
            changed |= category.poll_watcher();
        }
        changed
    }

    /// Whether any watcher is holding a rename that has not settled yet
    pub fn watch_pending(&self) -> bool {
        self.categories.iter().any(Category::watch_pending)
    }

    /// Refresh icons of categories whose lists changed
    pub fn refresh_changed(&mut self) {
        for category in &mut self.categories {
            category.refresh_if_needed(&self.storage);
        }
    }

    /// Current persisted form of every category
    pub fn snapshot(&self) -> Vec<CategoryData> {
        self.categories.iter().map(|c| c.data.clone()).collect()
    }

    /// Stop watching and return every file to the desktop.
    ///
    /// The returned list still names the files so the next start can pull
    /// them back in.
    pub fn shutdown(&mut self) -> Vec<CategoryData> {
        let mut restored = 0;
        for category in &mut self.categories {
            category.detach_watcher();
            restored += self.storage.restore(&mut category.data.file_names);
        }
        tracing::info!("Returned {} files to the desktop", restored);
        self.snapshot()
    }
}
