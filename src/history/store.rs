//! History store and browse cursor
//!
//! # Browse cursor
//!
//! The cursor is `None` while the user is not browsing, which is also the
//! position "past the newest entry". From there `previous()` yields the newest
//! entry and each further call steps one entry older, stopping at the oldest.
//! `next()` steps newer; stepping past the newest entry returns to `None`.
//! Appending and [`History::set_dirty`] both return the cursor to `None`, so
//! navigation always restarts from the most recent entry.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{HistoryError, HistoryFile, HistoryResult};

/// Initial entry capacity
pub const MIN_CAPACITY: usize = 128;

/// Opaque caller data attached to an entry; the store never inspects it
pub type EntryTag = Arc<dyn Any + Send + Sync>;

/// An immutable history entry
#[derive(Clone)]
pub struct HistoryEntry {
    text: Box<[u8]>,
    tag: Option<EntryTag>,
}

impl fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("text", &self.as_str_lossy())
            .field("tagged", &self.tag.is_some())
            .finish()
    }
}

impl HistoryEntry {
    /// Entry text
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Entry text, with invalid UTF-8 replaced
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Caller data supplied at append time
    pub fn tag(&self) -> Option<&EntryTag> {
        self.tag.as_ref()
    }
}

/// The history store
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Capacity according to the doubling policy
    capacity: usize,
    /// Browse position, `None` when not browsing
    browse: Option<usize>,
    backing: Option<HistoryFile>,
    initialized: bool,
}

impl History {
    /// Create an uninitialized store; call [`init`](Self::init) before use
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an initialized, memory-only store
    pub fn in_memory() -> Self {
        let mut history = Self::new();
        history.reset_entries();
        history.initialized = true;
        history
    }

    /// Initialize the store, loading entries from `backing` if given.
    ///
    /// Fails if the store is already initialized.
    pub fn init(&mut self, backing: Option<HistoryFile>) -> HistoryResult<()> {
        if self.initialized {
            return Err(HistoryError::AlreadyInitialized);
        }

        self.reset_entries();
        if let Some(mut file) = backing {
            let loaded = file.load()?;
            debug!(path = %file.path().display(), entries = loaded.len(), "loaded history");
            for text in loaded {
                self.push(text.into_boxed_slice(), None);
            }
            self.backing = Some(file);
        }
        self.initialized = true;
        Ok(())
    }

    /// Flush to the backing file (if any) and release all entries.
    ///
    /// The store is released even when the flush fails.
    pub fn shutdown(&mut self) -> HistoryResult<()> {
        if !self.initialized {
            return Err(HistoryError::NotInitialized);
        }

        let result = match self.backing.take() {
            Some(mut file) => file.store(&self.entries).map(|written| {
                debug!(path = %file.path().display(), bytes = written, "saved history");
            }),
            None => Ok(()),
        };

        self.entries = Vec::new();
        self.capacity = 0;
        self.browse = None;
        self.initialized = false;
        result
    }

    /// Append a copy of `text`, returning the new entry count
    pub fn append(&mut self, text: &[u8], tag: Option<EntryTag>) -> HistoryResult<usize> {
        if !self.initialized {
            return Err(HistoryError::NotInitialized);
        }
        self.push(text.into(), tag);
        Ok(self.entries.len())
    }

    /// Entry at index `i`, oldest first
    pub fn get_index(&self, i: usize) -> Option<&HistoryEntry> {
        if !self.initialized {
            return None;
        }
        self.entries.get(i)
    }

    /// Step one entry older
    pub fn previous(&mut self) -> Option<&HistoryEntry> {
        if !self.initialized || self.entries.is_empty() {
            return None;
        }
        let index = match self.browse {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.browse = Some(index);
        self.entries.get(index)
    }

    /// Step one entry newer; `None` once past the newest entry
    pub fn next(&mut self) -> Option<&HistoryEntry> {
        if !self.initialized {
            return None;
        }
        match self.browse {
            Some(i) if i + 1 < self.entries.len() => {
                self.browse = Some(i + 1);
                self.entries.get(i + 1)
            }
            _ => {
                self.browse = None;
                None
            }
        }
    }

    /// The newest entry; positions the browse cursor on it
    pub fn get_last(&mut self) -> Option<&HistoryEntry> {
        if !self.initialized || self.entries.is_empty() {
            return None;
        }
        let index = self.entries.len() - 1;
        self.browse = Some(index);
        self.entries.get(index)
    }

    /// Stop browsing; the next `previous()` starts from the newest entry
    pub fn set_dirty(&mut self) {
        self.browse = None;
    }

    /// Current browse position
    pub fn browse_position(&self) -> Option<usize> {
        self.browse
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity according to the doubling policy
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a backing file will be written at shutdown
    pub fn is_persistent(&self) -> bool {
        self.backing.is_some()
    }

    fn reset_entries(&mut self) {
        self.entries = Vec::with_capacity(MIN_CAPACITY);
        self.capacity = MIN_CAPACITY;
        self.browse = None;
    }

    fn push(&mut self, text: Box<[u8]>, tag: Option<EntryTag>) {
        if self.entries.len() + 1 >= self.capacity {
            self.capacity *= 2;
            self.entries
                .reserve_exact(self.capacity - self.entries.len());
        }
        self.entries.push(HistoryEntry { text, tag });
        self.browse = None;
    }
}
