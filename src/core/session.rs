use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::store::SessionStore;
use crate::core::translator::types::TranslationRequest;
use crate::core::translator::TranslationProvider;
use crate::shared::error::AppResult;
use crate::shared::types::{FavoriteEntry, HistoryEntry, LangTag};

/// Quiet period between the last edit and the translation request.
pub const QUIET_INTERVAL: Duration = Duration::from_millis(1000);

struct EditState {
    source_text: String,
    source: LangTag,
    target: LangTag,
}

/// The editing session: source text, language pair, and the displayed
/// translation, with debounced auto-translation.
///
/// Every edit (source text or either language) schedules a translation
/// after a fixed quiet interval; a newer edit aborts the pending schedule
/// (last-write-wins, no queueing). Each issued request carries a
/// monotonically increasing generation; a result is applied only while its
/// generation is still the latest, so a slow response can never overwrite a
/// newer one. In-flight requests are never canceled, only ignored.
pub struct TranslateSession {
    provider: Arc<dyn TranslationProvider>,
    store: Arc<SessionStore>,
    edit: Arc<Mutex<EditState>>,
    displayed: Arc<watch::Sender<String>>,
    generation: Arc<AtomicU64>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
    quiet: Duration,
}

impl TranslateSession {
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        store: Arc<SessionStore>,
        source: LangTag,
        target: LangTag,
    ) -> Self {
        Self {
            provider,
            store,
            edit: Arc::new(Mutex::new(EditState {
                source_text: String::new(),
                source,
                target,
            })),
            displayed: Arc::new(watch::channel(String::new()).0),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(None)),
            quiet: QUIET_INTERVAL,
        }
    }

    /// Override the quiet interval (tests).
    pub fn with_quiet_interval(mut self, quiet: Duration) -> Self {
        self.quiet = quiet;
        self
    }

    /// Get a handle sharing the same session state across tasks.
    fn clone_arc(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            store: Arc::clone(&self.store),
            edit: Arc::clone(&self.edit),
            displayed: Arc::clone(&self.displayed),
            generation: Arc::clone(&self.generation),
            pending: Arc::clone(&self.pending),
            quiet: self.quiet,
        }
    }

    fn edit_state(&self) -> MutexGuard<'_, EditState> {
        match self.edit.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set_source_text(&self, text: impl Into<String>) {
        self.edit_state().source_text = text.into();
        self.on_input_changed();
    }

    pub fn set_source_lang(&self, source: LangTag) {
        self.edit_state().source = source;
        self.on_input_changed();
    }

    pub fn set_target_lang(&self, target: LangTag) {
        self.edit_state().target = target;
        self.on_input_changed();
    }

    /// Restore a past translation into the editor.
    ///
    /// The stored translation is displayed right away; the edit then goes
    /// through the usual debounce, so the pair is re-translated after the
    /// quiet interval like any other input change.
    pub fn recall(
        &self,
        text: impl Into<String>,
        translation: impl Into<String>,
        from: LangTag,
        to: LangTag,
    ) {
        {
            let mut edit = self.edit_state();
            edit.source = from;
            edit.target = to;
            edit.source_text = text.into();
            self.displayed.send_replace(translation.into());
        }
        self.on_input_changed();
    }

    /// Swap the language pair along with the source and displayed texts.
    pub fn swap_languages(&self) {
        {
            let mut edit = self.edit_state();
            let edit = &mut *edit;
            std::mem::swap(&mut edit.source, &mut edit.target);
            let translated = self.displayed.borrow().clone();
            let source_text = std::mem::replace(&mut edit.source_text, translated);
            self.displayed.send_replace(source_text);
        }
        self.on_input_changed();
    }

    fn on_input_changed(&self) {
        let empty = self.edit_state().source_text.trim().is_empty();
        if empty {
            // Clear immediately; bump the generation so an in-flight result
            // cannot resurrect stale output.
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.cancel_pending();
            self.displayed.send_replace(String::new());
        } else {
            self.schedule();
        }
    }

    fn cancel_pending(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    fn schedule(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let session = self.clone_arc();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(session.quiet).await;
            // Detach the translation so a later edit only ever aborts the
            // quiet-period timer: requests already issued run to completion
            // and are discarded by the generation check, not canceled.
            let running = session.clone_arc();
            tokio::spawn(async move {
                // Failures are logged inside; the displayed text stays as-is.
                let _ = running.run_translation().await;
            });
        }));
    }

    /// Translate the current source text right away, bypassing the debounce.
    pub async fn translate_now(&self) -> AppResult<Option<String>> {
        self.cancel_pending();
        self.run_translation().await
    }

    async fn run_translation(&self) -> AppResult<Option<String>> {
        let request = {
            let edit = self.edit_state();
            if edit.source_text.trim().is_empty() {
                return Ok(None);
            }
            TranslationRequest::new(
                edit.source_text.clone(),
                edit.source.clone(),
                edit.target.clone(),
            )
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match self.provider.translate(&request).await {
            Ok(translated) => {
                if self.generation.load(Ordering::SeqCst) != generation {
                    log::debug!(
                        "[Session] Discarding superseded result (generation {})",
                        generation
                    );
                    return Ok(None);
                }
                self.displayed.send_replace(translated.clone());
                self.store.record_history(HistoryEntry::new(
                    request.text,
                    translated.clone(),
                    request.source,
                    request.target,
                ));
                Ok(Some(translated))
            }
            Err(e) => {
                log::error!("[Session] Translation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Save the current source/translation pair as a favorite. Returns
    /// false when either side is empty or the pair is already saved.
    pub fn favorite_current(&self) -> bool {
        let (text, from, to) = {
            let edit = self.edit_state();
            (
                edit.source_text.clone(),
                edit.source.clone(),
                edit.target.clone(),
            )
        };
        let translation = self.displayed.borrow().clone();

        if text.trim().is_empty() || translation.trim().is_empty() {
            return false;
        }

        self.store.add_favorite(FavoriteEntry {
            text,
            translation,
            from,
            to,
        })
    }

    pub fn source_text(&self) -> String {
        self.edit_state().source_text.clone()
    }

    pub fn languages(&self) -> (LangTag, LangTag) {
        let edit = self.edit_state();
        (edit.source.clone(), edit.target.clone())
    }

    /// The currently displayed translation.
    pub fn translation(&self) -> String {
        self.displayed.borrow().clone()
    }

    /// Watch the displayed translation for changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.displayed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{MemoryStore, SessionStore};
    use crate::shared::error::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    struct MockProvider {
        calls: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    impl MockProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TranslationProvider for MockProvider {
        async fn translate(&self, request: &TranslationRequest) -> AppResult<String> {
            self.calls.lock().unwrap().push(request.text.clone());
            if request.text.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Network("connection reset".to_string()));
            }
            Ok(format!("{} [{}]", request.text, request.langpair()))
        }
    }

    fn make_session(provider: Arc<MockProvider>) -> (TranslateSession, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::with_storage(Arc::new(MemoryStore::new())));
        let session = TranslateSession::new(
            provider,
            Arc::clone(&store),
            "en-GB".parse().unwrap(),
            "yo-NG".parse().unwrap(),
        );
        (session, store)
    }

    async fn wait_for_translation(session: &TranslateSession, expected: &str) {
        let mut rx = session.subscribe();
        tokio::time::timeout(Duration::from_secs(120), async {
            loop {
                if *rx.borrow() == expected {
                    break;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("timed out waiting for translation");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_one_request() {
        let provider = MockProvider::new();
        let (session, _) = make_session(provider.clone());

        session.set_source_text("H");
        session.set_source_text("He");
        session.set_source_text("Hello");

        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;
        assert_eq!(provider.calls(), vec!["Hello".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_translation_is_recorded_to_history() {
        let provider = MockProvider::new();
        let (session, store) = make_session(provider.clone());

        session.set_source_text("Hello");
        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "Hello");
        assert_eq!(history[0].from.code(), "en-GB");
        assert_eq!(history[0].to.code(), "yo-NG");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_clears_immediately_and_schedules_nothing() {
        let provider = MockProvider::new();
        let (session, _) = make_session(provider.clone());

        session.set_source_text("Hello");
        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;

        session.set_source_text("   ");
        assert_eq!(session.translation(), "");

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_leaves_displayed_text_unchanged() {
        let provider = MockProvider::new();
        let (session, store) = make_session(provider.clone());

        session.set_source_text("Hello");
        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;

        provider.fail.store(true, Ordering::SeqCst);
        session.set_source_text("Goodbye");
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(provider.calls().len(), 2);
        assert_eq!(session.translation(), "Hello [en-GB|yo-NG]");
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_result_is_discarded_on_arrival() {
        let provider = MockProvider::new();
        let (session, store) = make_session(provider.clone());

        session.set_source_text("slow draft");
        // Let the debounce fire so the slow request is actually in flight.
        tokio::time::sleep(Duration::from_millis(1500)).await;

        session.set_source_text("final");
        wait_for_translation(&session, "final [en-GB|yo-NG]").await;

        // The slow request resolves long after; its result must be dropped.
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(session.translation(), "final [en-GB|yo-NG]");

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "final");
    }

    #[tokio::test(start_paused = true)]
    async fn language_change_retranslates() {
        let provider = MockProvider::new();
        let (session, _) = make_session(provider.clone());

        session.set_source_text("Hello");
        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;

        session.set_target_lang("fr-FR".parse().unwrap());
        wait_for_translation(&session, "Hello [en-GB|fr-FR]").await;

        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn swap_exchanges_texts_and_languages() {
        let provider = MockProvider::new();
        let (session, _) = make_session(provider.clone());

        session.set_source_text("Hello");
        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;

        session.swap_languages();

        let (source, target) = session.languages();
        assert_eq!(source.code(), "yo-NG");
        assert_eq!(target.code(), "en-GB");
        assert_eq!(session.source_text(), "Hello [en-GB|yo-NG]");
        assert_eq!(session.translation(), "Hello");
    }

    #[tokio::test(start_paused = true)]
    async fn recall_restores_the_pair_and_refreshes() {
        let provider = MockProvider::new();
        let (session, _) = make_session(provider.clone());

        session.recall(
            "Hello",
            "Bawo",
            "en-GB".parse().unwrap(),
            "yo-NG".parse().unwrap(),
        );
        assert_eq!(session.source_text(), "Hello");
        assert_eq!(session.translation(), "Bawo");

        // The recalled pair is refreshed after the quiet interval.
        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;
        assert_eq!(provider.calls(), vec!["Hello".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn favorite_requires_both_sides() {
        let provider = MockProvider::new();
        let (session, store) = make_session(provider.clone());

        assert!(!session.favorite_current());

        session.set_source_text("Hello");
        wait_for_translation(&session, "Hello [en-GB|yo-NG]").await;

        assert!(session.favorite_current());
        assert!(!session.favorite_current());
        assert_eq!(store.favorites().len(), 1);
    }
}
