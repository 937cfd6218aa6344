//! Storage folder watching
//!
//! notify delivers events on its own thread. Each category owns a
//! [`CategoryWatcher`] whose handler only translates events and sends them
//! over a channel; the UI thread drains the channel once per frame and
//! applies the events to the category it belongs to.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::error::{OrganizerError, Result};
use super::relocate::file_name_of;

/// How long a rename source waits for its destination before it counts as
/// the file leaving the folder
pub const RENAME_SETTLE: Duration = Duration::from_millis(300);

/// A change in the storage folder that affects category membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Removed(String),
    Renamed { from: String, to: String },
}

/// Callback used to wake the UI thread after an event is queued
pub type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug)]
struct PendingFrom {
    path: PathBuf,
    tracker: Option<usize>,
    since: Instant,
}

/// Turns raw notify events into [`WatchEvent`]s.
///
/// Backends report renames differently: Windows sends a `From` then a `To`,
/// inotify sends `From`, `To` and then a combined `Both` sharing one tracker,
/// FSEvents sends a single event of unknown direction. A `From` only pairs
/// with a `To` carrying the same tracker. One that stays unpaired for
/// [`RENAME_SETTLE`] means the file left the folder.
#[derive(Debug, Default)]
pub struct EventTranslator {
    pending: Vec<PendingFrom>,
    last_rename: Option<(String, String)>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &Event) -> Vec<WatchEvent> {
        let names: Vec<String> = event.paths.iter().filter_map(|p| file_name_of(p)).collect();
        let tracker = event.attrs.tracker();
        let mut out = Vec::new();

        match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                if let Some(path) = event.paths.first() {
                    self.pending.push(PendingFrom {
                        path: path.clone(),
                        tracker,
                        since: Instant::now(),
                    });
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                let Some(pos) = self.pending.iter().rposition(|p| p.tracker == tracker) else {
                    // Moved in from elsewhere
                    return out;
                };
                let pending = self.pending.remove(pos);
                if let (Some(from), Some(to)) = (file_name_of(&pending.path), names.first()) {
                    self.last_rename = Some((from.clone(), to.clone()));
                    if from != *to {
                        out.push(WatchEvent::Renamed {
                            from,
                            to: to.clone(),
                        });
                    }
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if let [from, to, ..] = names.as_slice() {
                    let pair = (from.clone(), to.clone());
                    if self.last_rename.take().as_ref() != Some(&pair) && from != to {
                        out.push(WatchEvent::Renamed {
                            from: pair.0,
                            to: pair.1,
                        });
                    }
                }
            }
            EventKind::Modify(ModifyKind::Name(_)) => {
                for (path, name) in event.paths.iter().zip(names) {
                    if !path.exists() {
                        out.push(WatchEvent::Removed(name));
                    }
                }
            }
            EventKind::Remove(_) => {
                for (path, name) in event.paths.iter().zip(names) {
                    if !path.exists() {
                        out.push(WatchEvent::Removed(name));
                    }
                }
            }
            _ => {}
        }

        out
    }

    /// Report rename sources that waited past [`RENAME_SETTLE`] as removed.
    ///
    /// A name that is occupied again by now is dropped silently.
    pub fn flush_stale(&mut self, now: Instant) -> Vec<WatchEvent> {
        let mut out = Vec::new();
        self.pending.retain(|p| {
            if now.saturating_duration_since(p.since) < RENAME_SETTLE {
                return true;
            }
            if !p.path.exists() {
                if let Some(name) = file_name_of(&p.path) {
                    out.push(WatchEvent::Removed(name));
                }
            }
            false
        });
        out
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Live watch on the storage folder for one category window.
///
/// Dropping it stops the underlying watcher.
pub struct CategoryWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<WatchEvent>,
    translator: Arc<Mutex<EventTranslator>>,
}

impl CategoryWatcher {
    /// Start watching `dir` (non-recursively)
    pub fn spawn(dir: &Path, waker: Option<Waker>) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let translator = Arc::new(Mutex::new(EventTranslator::new()));
        let handler = Self::handler(tx, translator.clone(), waker);

        let mut watcher = notify::recommended_watcher(handler).map_err(|source| {
            OrganizerError::Watch {
                path: dir.to_path_buf(),
                source,
            }
        })?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| OrganizerError::Watch {
                path: dir.to_path_buf(),
                source,
            })?;

        tracing::debug!("Watching {}", dir.display());

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            translator,
        })
    }

    fn handler(
        tx: Sender<WatchEvent>,
        translator: Arc<Mutex<EventTranslator>>,
        waker: Option<Waker>,
    ) -> impl FnMut(notify::Result<Event>) + Send + 'static {
        move |res| match res {
            Ok(event) => {
                let (events, waiting) = {
                    let mut translator = lock(&translator);
                    (translator.translate(&event), translator.has_pending())
                };
                for ev in events.iter().cloned() {
                    tracing::debug!("Storage change: {:?}", ev);
                    if tx.send(ev).is_err() {
                        // Receiver dropped, the window is gone
                        return;
                    }
                }
                if events.is_empty() && !waiting {
                    return;
                }
                if let Some(ref wake) = waker {
                    wake();
                }
            }
            Err(e) => tracing::warn!("Watch error: {}", e),
        }
    }

    /// Take every event queued since the last call, without blocking
    pub fn drain(&self) -> Vec<WatchEvent> {
        let mut events: Vec<WatchEvent> = self.receiver.try_iter().collect();
        events.extend(lock(&self.translator).flush_stale(Instant::now()));
        events
    }

    /// Whether a rename source is still waiting for its destination
    pub fn has_pending(&self) -> bool {
        lock(&self.translator).has_pending()
    }
}

fn lock(translator: &Mutex<EventTranslator>) -> MutexGuard<'_, EventTranslator> {
    translator.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};
    use std::path::PathBuf;

    fn ev(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    fn rename(mode: RenameMode, paths: &[&str]) -> Event {
        ev(EventKind::Modify(ModifyKind::Name(mode)), paths)
    }

    #[test]
    fn test_remove_event() {
        let mut t = EventTranslator::new();
        let out = t.translate(&ev(EventKind::Remove(RemoveKind::File), &["/s/a.txt"]));
        assert_eq!(out, vec![WatchEvent::Removed("a.txt".into())]);
    }

    fn tracked(event: Event, tracker: usize) -> Event {
        event.set_tracker(tracker)
    }

    #[test]
    fn test_from_to_pair_is_rename() {
        let mut t = EventTranslator::new();
        assert!(t.translate(&rename(RenameMode::From, &["/s/a.txt"])).is_empty());
        let out = t.translate(&rename(RenameMode::To, &["/s/b.txt"]));
        assert_eq!(
            out,
            vec![WatchEvent::Renamed {
                from: "a.txt".into(),
                to: "b.txt".into()
            }]
        );
        assert!(!t.has_pending());
    }

    #[test]
    fn test_tracked_pair_is_rename() {
        let mut t = EventTranslator::new();
        t.translate(&tracked(rename(RenameMode::From, &["/s/a.txt"]), 7));
        let out = t.translate(&tracked(rename(RenameMode::To, &["/s/b.txt"]), 7));
        assert_eq!(
            out,
            vec![WatchEvent::Renamed {
                from: "a.txt".into(),
                to: "b.txt".into()
            }]
        );
    }

    #[test]
    fn test_to_from_another_move_is_not_paired() {
        // r.txt returned to the desktop, then a new r.txt adopted
        let mut t = EventTranslator::new();
        t.translate(&tracked(rename(RenameMode::From, &["/s/r.txt"]), 1));
        let out = t.translate(&tracked(rename(RenameMode::To, &["/s/r.txt"]), 2));
        assert!(out.is_empty());
        assert!(t.has_pending());
    }

    #[test]
    fn test_same_name_pair_is_ignored() {
        let mut t = EventTranslator::new();
        t.translate(&rename(RenameMode::From, &["/s/r.txt"]));
        assert!(t.translate(&rename(RenameMode::To, &["/s/r.txt"])).is_empty());
    }

    #[test]
    fn test_inotify_both_after_pair_is_not_repeated() {
        let mut t = EventTranslator::new();
        t.translate(&tracked(rename(RenameMode::From, &["/s/a.txt"]), 3));
        t.translate(&tracked(rename(RenameMode::To, &["/s/b.txt"]), 3));
        let out = t.translate(&tracked(rename(RenameMode::Both, &["/s/a.txt", "/s/b.txt"]), 3));
        assert!(out.is_empty());
    }

    #[test]
    fn test_both_alone_is_rename() {
        let mut t = EventTranslator::new();
        let out = t.translate(&rename(RenameMode::Both, &["/s/a.txt", "/s/b.txt"]));
        assert_eq!(
            out,
            vec![WatchEvent::Renamed {
                from: "a.txt".into(),
                to: "b.txt".into()
            }]
        );
    }

    #[test]
    fn test_unpaired_from_flushes_as_removed_after_settling() {
        let mut t = EventTranslator::new();
        t.translate(&tracked(rename(RenameMode::From, &["/definitely/not/here/a.txt"]), 4));
        let now = Instant::now();

        assert!(t.flush_stale(now).is_empty());
        assert!(t.has_pending());

        let out = t.flush_stale(now + RENAME_SETTLE);
        assert_eq!(out, vec![WatchEvent::Removed("a.txt".into())]);
        assert!(!t.has_pending());
    }

    #[test]
    fn test_stale_from_of_reoccupied_name_is_dropped() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("r.txt");
        std::fs::write(&path, "adopted again").unwrap();

        let mut t = EventTranslator::new();
        t.translate(&tracked(
            rename(RenameMode::From, &[path.to_str().unwrap()]),
            1,
        ));

        assert!(t.flush_stale(Instant::now() + RENAME_SETTLE).is_empty());
        assert!(!t.has_pending());
    }

    #[test]
    fn test_unknown_direction_rename_of_missing_path() {
        let mut t = EventTranslator::new();
        let out = t.translate(&rename(
            RenameMode::Any,
            &["/definitely/not/here/a.txt"],
        ));
        assert_eq!(out, vec![WatchEvent::Removed("a.txt".into())]);
    }

    #[test]
    fn test_creation_is_ignored() {
        let mut t = EventTranslator::new();
        assert!(t
            .translate(&ev(EventKind::Create(CreateKind::File), &["/s/new.txt"]))
            .is_empty());
    }
}
