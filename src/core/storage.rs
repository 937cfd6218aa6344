//! Bulk relocation between the desktop and the storage folder

use std::path::{Path, PathBuf};

use super::paths::AppPaths;
use super::relocate::{file_name_of, try_move_file};

/// The pair of folders files travel between
#[derive(Debug, Clone)]
pub struct Storage {
    desktop: PathBuf,
    storage: PathBuf,
}

impl Storage {
    pub fn new(desktop: PathBuf, storage: PathBuf) -> Self {
        Self { desktop, storage }
    }

    pub fn from_paths(paths: &AppPaths) -> Self {
        Self::new(paths.desktop.clone(), paths.storage.clone())
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage
    }

    pub fn desktop_dir(&self) -> &Path {
        &self.desktop
    }

    /// Full path of an organized file
    pub fn stored_path(&self, name: &str) -> PathBuf {
        self.storage.join(name)
    }

    /// Whether `path` already lives directly inside the storage folder
    pub fn is_stored(&self, path: &Path) -> bool {
        path.parent()
            .map(|parent| same_dir(parent, &self.storage))
            .unwrap_or(false)
    }

    /// Pull a category's files from the desktop into storage.
    ///
    /// Names already in storage are left alone. A name renamed on the way
    /// in is replaced by its new basename. Returns how many files moved.
    pub fn import(&self, names: &mut [String]) -> usize {
        relocate_all(names, &self.desktop, &self.storage, |name| {
            let stored = self.stored_path(name).exists();
            if stored {
                tracing::warn!("{} is already in storage, leaving the desktop copy", name);
            }
            !stored
        })
    }

    /// Return files to the desktop, renaming around collisions there.
    ///
    /// Names are updated in place so the next import finds the same files.
    pub fn restore(&self, names: &mut [String]) -> usize {
        relocate_all(names, &self.storage, &self.desktop, |_| true)
    }

    /// Take a file from anywhere outside storage into storage.
    ///
    /// Returns the basename it was stored under.
    pub fn adopt(&self, source: &Path) -> Option<String> {
        let name = file_name_of(source)?;
        let dest = try_move_file(source, &self.storage.join(&name))?;
        file_name_of(&dest)
    }

    /// Send one organized file back to the desktop
    pub fn return_to_desktop(&self, name: &str) -> Option<PathBuf> {
        try_move_file(&self.storage.join(name), &self.desktop.join(name))
    }
}

fn relocate_all(
    names: &mut [String],
    from: &Path,
    to: &Path,
    wanted: impl Fn(&str) -> bool,
) -> usize {
    let mut moved = 0;
    for name in names.iter_mut() {
        let source = from.join(name.as_str());
        if !source.is_file() || !wanted(name) {
            continue;
        }
        if let Some(final_name) = try_move_file(&source, &to.join(name.as_str()))
            .as_deref()
            .and_then(file_name_of)
        {
            if final_name != *name {
                tracing::info!("{} was stored as {}", name, final_name);
                *name = final_name;
            }
            moved += 1;
        }
    }
    moved
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup() -> (tempfile::TempDir, Storage) {
        let tmp = tempfile::TempDir::new().unwrap();
        let desktop = tmp.path().join("Desktop");
        let storage = tmp.path().join("Storage");
        fs::create_dir_all(&desktop).unwrap();
        fs::create_dir_all(&storage).unwrap();
        (tmp, Storage::new(desktop, storage))
    }

    #[test]
    fn test_import_then_restore() {
        let (_tmp, storage) = setup();
        fs::write(storage.desktop_dir().join("a.txt"), "a").unwrap();
        fs::write(storage.stored_path("b.txt"), "b").unwrap();

        let mut names = vec!["a.txt".to_string(), "b.txt".to_string(), "gone.txt".to_string()];
        assert_eq!(storage.import(&mut names), 1);
        assert!(storage.stored_path("a.txt").exists());
        assert!(!storage.desktop_dir().join("a.txt").exists());

        assert_eq!(storage.restore(&mut names), 2);
        assert!(storage.desktop_dir().join("a.txt").exists());
        assert!(storage.desktop_dir().join("b.txt").exists());
        assert_eq!(names, vec!["a.txt", "b.txt", "gone.txt"]);
    }

    #[test]
    fn test_restore_collision_updates_name() {
        let (_tmp, storage) = setup();
        fs::write(storage.desktop_dir().join("notes.md"), "newer desktop file").unwrap();
        fs::write(storage.stored_path("notes.md"), "organized").unwrap();

        let mut names = vec!["notes.md".to_string()];
        storage.restore(&mut names);

        assert_eq!(names, vec!["notes (1).md"]);
        assert_eq!(
            fs::read_to_string(storage.desktop_dir().join("notes (1).md")).unwrap(),
            "organized"
        );

        // Next start pulls back the organized file, not the unrelated one
        storage.import(&mut names);
        assert_eq!(names, vec!["notes (1).md"]);
        assert!(storage.desktop_dir().join("notes.md").exists());
    }

    #[test]
    fn test_import_skips_names_already_stored() {
        let (_tmp, storage) = setup();
        fs::write(storage.stored_path("a.txt"), "left from last run").unwrap();
        fs::write(storage.desktop_dir().join("a.txt"), "desktop").unwrap();

        let mut names = vec!["a.txt".to_string()];
        assert_eq!(storage.import(&mut names), 0);
        assert_eq!(names, vec!["a.txt"]);
        assert!(!storage.stored_path("a (1).txt").exists());

        // The stored copy is still owned and goes back on restore
        assert_eq!(storage.restore(&mut names), 1);
        assert_eq!(names, vec!["a (1).txt"]);
        assert!(!storage.stored_path("a.txt").exists());
        assert_eq!(
            fs::read_to_string(storage.desktop_dir().join("a (1).txt")).unwrap(),
            "left from last run"
        );
    }

    #[test]
    fn test_adopt_and_return() {
        let (tmp, storage) = setup();
        let outside = tmp.path().join("elsewhere.txt");
        fs::write(&outside, "x").unwrap();
        fs::write(storage.stored_path("elsewhere.txt"), "y").unwrap();

        let name = storage.adopt(&outside).unwrap();
        assert_eq!(name, "elsewhere (1).txt");
        assert!(storage.is_stored(&storage.stored_path(&name)));
        assert!(!storage.is_stored(&outside));

        let back = storage.return_to_desktop(&name).unwrap();
        assert_eq!(back, storage.desktop_dir().join("elsewhere (1).txt"));
    }
}
