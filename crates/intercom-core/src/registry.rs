//! Registry of operator-defined custom intents.
//!
//! Entries come from configuration lines of the form
//! `prefix,direction,allowed,audio_file_key` and are matched against the
//! subject header value by byte-exact prefix compare, first match in
//! insertion order winning. The table is kept as an immutable snapshot
//! behind an [`ArcSwap`]: reload builds a new `Vec` and swaps it in, so a
//! classification running concurrently always sees either the old or the
//! new table, never a half-rebuilt one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::MediaDirection;

/// One operator-defined intent definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomIntentEntry {
    /// Subject values beginning with this prefix match the entry.
    pub subject_prefix: String,
    /// Media direction used when placing an outgoing call for this intent.
    pub direction: MediaDirection,
    /// Whether incoming calls with this intent are admitted.
    pub allowed: bool,
    /// Audio file key forwarded to the renderer in the override instruction.
    pub audio_file_key: String,
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parses one configuration line; `None` means the line is skipped.
fn parse_line(line: &str) -> Option<CustomIntentEntry> {
    let mut fields = line.splitn(4, ',');
    let subject = fields.next()?.trim();
    let dir = fields.next()?.trim();
    let allowed = fields.next()?.trim();
    let aufile = fields.next()?.trim();

    if subject.is_empty() {
        return None;
    }

    Some(CustomIntentEntry {
        subject_prefix: subject.to_string(),
        direction: MediaDirection::decode(dir)?,
        allowed: parse_bool(allowed)?,
        audio_file_key: aufile.to_string(),
    })
}

/// Ordered custom-intent table, readable lock-free, swapped on reload.
pub struct IntentRegistry {
    entries: ArcSwap<Vec<CustomIntentEntry>>,
}

impl IntentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Creates a registry loaded from configuration lines.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let registry = Self::new();
        registry.reload(lines);
        registry
    }

    /// Clears the table and re-loads it from the given configuration lines.
    ///
    /// A line that fails to parse is skipped with a warning and loading
    /// continues; everything parsed stays committed. The new table replaces
    /// the old one in a single atomic swap.
    pub fn reload<S: AsRef<str>>(&self, lines: &[S]) {
        let mut entries = Vec::new();

        for line in lines {
            let line = line.as_ref();
            match parse_line(line) {
                Some(entry) => {
                    info!("intercom: add custom {}", entry.subject_prefix);
                    entries.push(entry);
                }
                None => {
                    if !line.trim().is_empty() {
                        warn!("intercom: skipping bad custom-intent line {:?}", line);
                    }
                }
            }
        }

        self.entries.store(Arc::new(entries));
    }

    /// Current table snapshot.
    pub fn snapshot(&self) -> Arc<Vec<CustomIntentEntry>> {
        self.entries.load_full()
    }

    /// Finds the entry matching a subject value.
    ///
    /// Entries are scanned in insertion order and the first whose prefix
    /// starts the value wins. With overlapping prefixes a later, more
    /// specific entry is shadowed by an earlier, shorter one; this mirrors
    /// the inherited configuration semantics and is kept deliberately.
    pub fn find(&self, value: &str) -> Option<CustomIntentEntry> {
        find_in(&self.entries.load(), value).cloned()
    }

    pub fn is_custom(&self, value: &str) -> bool {
        self.find(value).is_some()
    }

    /// Outgoing media direction for a custom subject; `Inactive` if unknown.
    pub fn direction(&self, value: &str) -> MediaDirection {
        self.find(value)
            .map(|e| e.direction)
            .unwrap_or(MediaDirection::Inactive)
    }

    /// Whether a custom subject is admitted; unknown subjects are not.
    pub fn is_allowed(&self, value: &str) -> bool {
        self.find(value).map(|e| e.allowed).unwrap_or(false)
    }

    pub fn audio_file_key(&self, value: &str) -> Option<String> {
        self.find(value).map(|e| e.audio_file_key)
    }
}

impl Default for IntentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix scan over a table snapshot, first match wins.
pub(crate) fn find_in<'a>(
    entries: &'a [CustomIntentEntry],
    value: &str,
) -> Option<&'a CustomIntentEntry> {
    entries.iter().find(|e| {
        value.len() >= e.subject_prefix.len() && value.as_bytes().starts_with(e.subject_prefix.as_bytes())
    })
}
