//! Event coalescing: timing and per-path deduplication only.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Quiet period after the last event before changes are released.
pub const DEBOUNCE_MS: u64 = 300;

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }

    /// Map a notify event kind; `None` for events that never trigger a rerun.
    pub fn from_event(kind: &notify::EventKind) -> Option<Self> {
        use notify::EventKind;
        use notify::event::ModifyKind;
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            // Metadata-only changes would loop on our own writes
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Debouncer {
    changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `kind` for every path, merging with pending changes:
    /// removed then created is a restore, modified then removed is a removal,
    /// created then removed cancels out, anything else keeps the first kind.
    pub fn add(&mut self, kind: ChangeKind, paths: &[PathBuf], now: Instant) {
        for path in paths {
            if is_temp_file(path) {
                continue;
            }
            match (self.changes.get(path).copied(), kind) {
                (None, _) => {
                    self.changes.insert(path.clone(), kind);
                }
                (Some(ChangeKind::Removed), ChangeKind::Created | ChangeKind::Modified) => {
                    self.changes.insert(path.clone(), kind);
                }
                (Some(ChangeKind::Modified), ChangeKind::Removed) => {
                    self.changes.insert(path.clone(), ChangeKind::Removed);
                }
                (Some(ChangeKind::Created), ChangeKind::Removed) => {
                    self.changes.remove(path);
                }
                (Some(_), _) => continue,
            }
            self.last_event = Some(now);
        }
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.last_event.is_some_and(|last| {
            now.duration_since(last) >= Duration::from_millis(DEBOUNCE_MS)
        }) && !self.changes.is_empty()
    }

    /// Take pending changes once the quiet period has passed, sorted by path.
    pub fn take_if_ready(&mut self, now: Instant) -> Option<Vec<(PathBuf, ChangeKind)>> {
        if !self.is_ready(now) {
            return None;
        }
        self.last_event = None;
        let mut changes: Vec<_> = self.changes.drain().collect();
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        Some(changes)
    }

    /// Time until the pending changes may be released; `max` when idle.
    pub fn wait_time(&self, now: Instant, max: Duration) -> Duration {
        match self.last_event {
            Some(last) if !self.changes.is_empty() => Duration::from_millis(DEBOUNCE_MS)
                .saturating_sub(now.duration_since(last))
                .clamp(Duration::from_millis(1), max),
            _ => max,
        }
    }
}

/// Editor swap, backup and hidden files.
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext, "bak" | "swp" | "swo" | "tmp") || name.ends_with('~') || name.starts_with('.')
}
