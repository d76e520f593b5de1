use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use directories::ProjectDirs;
use redb::{Database, TableDefinition};

use crate::core::streak;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{FavoriteEntry, HistoryEntry};

/// Maximum number of recent translations to keep.
pub const MAX_HISTORY: usize = 10;

const KEY_LAST_VISIT: &str = "lastVisit";
const KEY_STREAK_COUNT: &str = "streakCount";
const KEY_FAVORITES: &str = "favorites";
const KEY_RECENT: &str = "recentTranslations";
const KEY_DARK_MODE: &str = "darkMode";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Redb table holding the session records, keyed independently per record.
const STATE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("session_state");

/// Everything the store persists between runs.
///
/// Missing or malformed records load as their defaults; a half-readable
/// store never prevents startup.
#[derive(Debug, Clone, Default)]
pub struct PersistedState {
    pub last_visit: Option<NaiveDate>,
    pub streak_count: Option<u32>,
    pub favorites: Vec<FavoriteEntry>,
    pub history: Vec<HistoryEntry>,
    pub dark_mode: bool,
}

/// Keyed string-record adapter over the durable medium.
///
/// Implementations only move raw strings; the typed (de)serialization of
/// each record lives in the provided methods so every backend parses and
/// degrades identically.
pub trait StateStore: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> AppResult<()>;

    fn load(&self) -> PersistedState {
        let last_visit = self.read(KEY_LAST_VISIT).and_then(|raw| {
            match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    log::warn!("[Store] Ignoring malformed {} record: {}", KEY_LAST_VISIT, raw);
                    None
                }
            }
        });

        let streak_count = self
            .read(KEY_STREAK_COUNT)
            .and_then(|raw| raw.parse::<u32>().ok());

        let favorites = self
            .read(KEY_FAVORITES)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    log::warn!("[Store] Ignoring malformed {} record: {}", KEY_FAVORITES, e);
                    None
                }
            })
            .unwrap_or_default();

        let history = self
            .read(KEY_RECENT)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    log::warn!("[Store] Ignoring malformed {} record: {}", KEY_RECENT, e);
                    None
                }
            })
            .unwrap_or_default();

        let dark_mode = self
            .read(KEY_DARK_MODE)
            .map(|raw| raw == "true")
            .unwrap_or(false);

        PersistedState {
            last_visit,
            streak_count,
            favorites,
            history,
            dark_mode,
        }
    }

    fn save_history(&self, history: &[HistoryEntry]) -> AppResult<()> {
        self.write(KEY_RECENT, &serde_json::to_string(history)?)
    }

    fn save_favorites(&self, favorites: &[FavoriteEntry]) -> AppResult<()> {
        self.write(KEY_FAVORITES, &serde_json::to_string(favorites)?)
    }

    fn save_visit(&self, last_visit: NaiveDate, streak_count: u32) -> AppResult<()> {
        self.write(KEY_LAST_VISIT, &last_visit.format(DATE_FORMAT).to_string())?;
        self.write(KEY_STREAK_COUNT, &streak_count.to_string())
    }

    fn save_dark_mode(&self, enabled: bool) -> AppResult<()> {
        self.write(KEY_DARK_MODE, if enabled { "true" } else { "false" })
    }
}

/// Redb-backed adapter.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(path)
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;

        // Initialize the table so first-run reads see an empty store.
        {
            let txn = db
                .begin_write()
                .map_err(|e| AppError::Storage(e.to_string()))?;
            {
                let _table = txn
                    .open_table(STATE_TABLE)
                    .map_err(|e| AppError::Storage(e.to_string()))?;
            }
            txn.commit().map_err(|e| AppError::Storage(e.to_string()))?;
        }

        Ok(Self { db })
    }

    pub fn default_path() -> AppResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "antigravity", "lingo-widgets")
            .ok_or_else(|| AppError::Storage("Unable to determine data directory".to_string()))?;
        Ok(proj_dirs.data_dir().join("session_state.redb"))
    }
}

impl StateStore for RedbStore {
    fn read(&self, key: &str) -> Option<String> {
        let txn = match self.db.begin_read() {
            Ok(txn) => txn,
            Err(e) => {
                log::warn!("[Store] Failed to begin read: {}", e);
                return None;
            }
        };

        let table = txn.open_table(STATE_TABLE).ok()?;
        match table.get(key) {
            Ok(value) => value.map(|v| v.value().to_string()),
            Err(e) => {
                log::warn!("[Store] Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| AppError::Storage(e.to_string()))?;
        {
            let mut table = txn
                .open_table(STATE_TABLE)
                .map_err(|e| AppError::Storage(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| AppError::Storage(e.to_string()))?;
        }
        txn.commit().map_err(|e| AppError::Storage(e.to_string()))
    }
}

/// In-memory adapter, used when the database cannot be opened and in tests.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        let records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Session-owned state over a storage adapter.
///
/// The in-memory collections are authoritative; every mutation is mirrored
/// to the adapter, and a failed mirror is logged rather than propagated
/// (durability is best-effort, not transactional).
pub struct SessionStore {
    storage: Arc<dyn StateStore>,
    state: Mutex<PersistedState>,
}

impl SessionStore {
    /// Open the default on-disk store, falling back to an in-memory store
    /// if the database cannot be opened.
    pub fn open() -> Self {
        let storage: Arc<dyn StateStore> = match RedbStore::default_path()
            .and_then(|path| RedbStore::open(&path))
        {
            Ok(store) => Arc::new(store),
            Err(e) => {
                log::warn!("[Store] Falling back to in-memory store: {}", e);
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_storage(storage)
    }

    pub fn with_storage(storage: Arc<dyn StateStore>) -> Self {
        let state = storage.load();
        Self {
            storage,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, PersistedState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record a completed translation unless an entry with the same source
    /// text and language pair already exists. Keeps at most [`MAX_HISTORY`]
    /// entries, newest first.
    pub fn record_history(&self, entry: HistoryEntry) {
        let mut state = self.state();
        if state
            .history
            .iter()
            .any(|h| h.matches(&entry.text, &entry.from, &entry.to))
        {
            return;
        }

        state.history.insert(0, entry);
        state.history.truncate(MAX_HISTORY);

        if let Err(e) = self.storage.save_history(&state.history) {
            log::error!("[Store] Failed to persist history: {}", e);
        }
    }

    /// Add a favorite unless the same (text, translation) pair is already
    /// saved. Returns whether the entry was added.
    pub fn add_favorite(&self, entry: FavoriteEntry) -> bool {
        let mut state = self.state();
        if state
            .favorites
            .iter()
            .any(|f| f.text == entry.text && f.translation == entry.translation)
        {
            return false;
        }

        state.favorites.push(entry);

        if let Err(e) = self.storage.save_favorites(&state.favorites) {
            log::error!("[Store] Failed to persist favorites: {}", e);
        }
        true
    }

    /// Remove the favorite at `index`.
    ///
    /// Callers are expected to pass an index obtained from [`favorites`];
    /// an out-of-range index is a programming error and panics.
    ///
    /// [`favorites`]: SessionStore::favorites
    pub fn remove_favorite(&self, index: usize) -> FavoriteEntry {
        let mut state = self.state();
        let removed = state.favorites.remove(index);

        if let Err(e) = self.storage.save_favorites(&state.favorites) {
            log::error!("[Store] Failed to persist favorites: {}", e);
        }
        removed
    }

    /// Register a visit on `today` and return the resulting streak.
    pub fn record_visit(&self, today: NaiveDate) -> u32 {
        let mut state = self.state();
        let streak = streak::advance(state.last_visit, today, state.streak_count);
        state.last_visit = Some(today);
        state.streak_count = Some(streak);

        if let Err(e) = self.storage.save_visit(today, streak) {
            log::error!("[Store] Failed to persist visit: {}", e);
        }
        streak
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        let mut state = self.state();
        state.dark_mode = enabled;

        if let Err(e) = self.storage.save_dark_mode(enabled) {
            log::error!("[Store] Failed to persist dark mode: {}", e);
        }
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state().history.clone()
    }

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.state().favorites.clone()
    }

    pub fn streak(&self) -> u32 {
        self.state().streak_count.unwrap_or(1)
    }

    pub fn dark_mode(&self) -> bool {
        self.state().dark_mode
    }
}
