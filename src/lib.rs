//! Translation widget engine.
//!
//! Chunked translation against the MyMemory endpoint with a debounced
//! editing session, capacity-bounded history, favorites, daily streaks,
//! and file import/export. State is persisted device-locally.

pub mod core;
pub mod shared;

pub use crate::core::session::TranslateSession;
pub use crate::core::store::SessionStore;
pub use crate::core::translator::service::MyMemoryClient;
pub use crate::core::translator::TranslationProvider;
pub use crate::shared::error::{AppError, AppResult};
pub use crate::shared::settings::AppSettings;
pub use crate::shared::types::{FavoriteEntry, HistoryEntry, LangTag};
