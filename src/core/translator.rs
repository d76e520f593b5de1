//! Translation feature
//!
//! Sends text to the MyMemory translation endpoint, splitting long input
//! into bounded chunks and reassembling the translated segments in order.

pub mod languages;
pub mod service;
pub mod types;

use async_trait::async_trait;

use crate::shared::error::AppResult;
use types::TranslationRequest;

/// Seam between the session and the concrete translation backend.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate the whole request text, returning the assembled result.
    async fn translate(&self, request: &TranslationRequest) -> AppResult<String>;
}
