//! Controlled vocabulary of food-item types
//!
//! The vocabulary maps a type key ("pizza", "soda") to its category, a short
//! description and a display icon. It is loaded once per run, only ever grows,
//! and is written back after each LLM batch.
//!
//! ## Resolution
//!
//! `JsonFileStore` reads `~/.local/share/tilbod/food_categories.json`; when the
//! file does not exist yet the embedded seed vocabulary is used.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::FoodCategory;

/// Seed vocabulary (compiled into binary)
const SEED_VOCABULARY: &str = include_str!("../../../data/food_categories.json");

/// One vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    #[serde(default)]
    pub description: String,
    pub category: FoodCategory,
    /// Blank for entries proposed by a model and awaiting curation
    #[serde(default)]
    pub icon: String,
}

impl VocabularyEntry {
    pub fn new(category: FoodCategory, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category,
            icon: String::new(),
        }
    }
}

/// Type key -> entry, kept sorted for stable files and prompts
pub type Vocabulary = BTreeMap<String, VocabularyEntry>;

/// Persistence for the vocabulary
pub trait VocabularyStore: Send + Sync {
    fn load(&self) -> Result<Vocabulary>;

    fn save(&self, vocabulary: &Vocabulary) -> Result<()>;

    /// Where the store lives, for logs
    fn location(&self) -> String;
}

/// JSON file store with atomic writes
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location in the platform data dir
    pub fn default_location() -> Option<Self> {
        default_vocabulary_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VocabularyStore for JsonFileStore {
    fn load(&self) -> Result<Vocabulary> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No vocabulary file yet, using seed");
            return parse_vocabulary(SEED_VOCABULARY);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::Vocabulary(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        parse_vocabulary(&content)
    }

    fn save(&self, vocabulary: &Vocabulary) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(vocabulary)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store; shares its contents across clones so tests can inspect
/// what was flushed
#[derive(Clone, Default)]
pub struct MemoryStore {
    saved: Arc<Mutex<Option<Vocabulary>>>,
    fail_writes: bool,
}

impl MemoryStore {
    /// Store seeded with the embedded vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary(vocabulary: Vocabulary) -> Self {
        Self {
            saved: Arc::new(Mutex::new(Some(vocabulary))),
            fail_writes: false,
        }
    }

    /// Every save fails with an IO error
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Last saved vocabulary, if any
    pub fn snapshot(&self) -> Option<Vocabulary> {
        self.saved.lock().ok().and_then(|saved| saved.clone())
    }
}

impl VocabularyStore for MemoryStore {
    fn load(&self) -> Result<Vocabulary> {
        match self.snapshot() {
            Some(vocabulary) => Ok(vocabulary),
            None => parse_vocabulary(SEED_VOCABULARY),
        }
    }

    fn save(&self, vocabulary: &Vocabulary) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory store is read-only",
            )));
        }
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| Error::Vocabulary("memory store lock poisoned".into()))?;
        *saved = Some(vocabulary.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// The run's single writer over the vocabulary: load once, append, flush
pub struct VocabularyRepository {
    store: Box<dyn VocabularyStore>,
    entries: Vocabulary,
    dirty: bool,
}

impl VocabularyRepository {
    /// Load from the store; a failure here aborts the run
    pub fn load(store: Box<dyn VocabularyStore>) -> Result<Self> {
        let entries = store.load()?;
        info!(
            entries = entries.len(),
            store = %store.location(),
            "Loaded food vocabulary"
        );
        Ok(Self {
            store,
            entries,
            dirty: false,
        })
    }

    pub fn entries(&self) -> &Vocabulary {
        &self.entries
    }

    pub fn get(&self, kind: &str) -> Option<&VocabularyEntry> {
        self.entries.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether appended entries are waiting for a flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Add a new type. Existing entries are never overwritten; returns
    /// whether the entry was added.
    pub fn append(&mut self, kind: &str, entry: VocabularyEntry) -> bool {
        let kind = kind.trim().to_lowercase();
        if kind.is_empty() || self.entries.contains_key(&kind) {
            return false;
        }
        info!(kind = %kind, category = %entry.category, "New food category");
        self.entries.insert(kind, entry);
        self.dirty = true;
        true
    }

    /// Write pending additions. Best-effort: a failed write is logged and the
    /// additions stay pending for the next flush.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return true;
        }
        match self.store.save(&self.entries) {
            Ok(()) => {
                debug!(entries = self.entries.len(), "Vocabulary flushed");
                self.dirty = false;
                true
            }
            Err(e) => {
                warn!(error = %e, store = %self.store.location(), "Failed to save vocabulary");
                false
            }
        }
    }

    /// One line per entry, for embedding in prompts
    pub fn prompt_listing(&self) -> String {
        self.entries
            .iter()
            .map(|(kind, entry)| {
                if entry.description.is_empty() {
                    format!("- {} ({})", kind, entry.category)
                } else {
                    format!("- {} ({}): {}", kind, entry.category, entry.description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Default vocabulary file location
pub fn default_vocabulary_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tilbod").join("food_categories.json"))
}

fn parse_vocabulary(content: &str) -> Result<Vocabulary> {
    serde_json::from_str(content)
        .map_err(|e| Error::Vocabulary(format!("Invalid vocabulary JSON: {}", e)))
}
