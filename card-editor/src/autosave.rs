//! Debounced autosave through the card store.
//!
//! Every redraw re-arms a single timer; only the last redraw of a burst
//! reaches the store. A save that has started is never cancelled, and no
//! new timer is armed while one is running. Saves run one at a time, so a
//! manual save issued during an autosave updates the card that autosave
//! created. Failures are logged and swallowed so editing is never
//! interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use card_core::{CardDocument, Scene};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::auth::AuthProvider;
use crate::error::{StoreError, StoreResult};
use crate::store::{default_title, Card, CardId, CardStore, CardUpdate};

/// Where saves go: the store, the credential gate, and the card being
/// edited once one exists.
#[derive(Clone)]
struct SaveTarget {
    store: Arc<dyn CardStore>,
    auth: Arc<dyn AuthProvider>,
    card_id: Arc<Mutex<Option<CardId>>>,
    /// Held for a whole upsert so the remembered id is read after the
    /// previous save stored it.
    saving: Arc<tokio::sync::Mutex<()>>,
}

impl SaveTarget {
    fn card_id(&self) -> Option<CardId> {
        self.card_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_card_id(&self, id: Option<CardId>) {
        *self.card_id.lock().unwrap_or_else(PoisonError::into_inner) = id;
    }

    /// Update the remembered card, or create one and remember it.
    async fn upsert(&self, scene: &Scene) -> StoreResult<Card> {
        let _saving = self.saving.lock().await;
        let data = serde_json::to_string(&CardDocument::from_scene(scene))?;

        let card = match self.card_id() {
            Some(id) => match self.store.update(&id, CardUpdate::data(data.clone())).await {
                Err(StoreError::NotFound(_)) => {
                    tracing::debug!("Card {id} no longer exists; creating a new one");
                    self.create(&data).await?
                }
                other => other?,
            },
            None => self.create(&data).await?,
        };

        self.set_card_id(Some(card.id.clone()));
        Ok(card)
    }

    async fn create(&self, data: &str) -> StoreResult<Card> {
        let title = default_title(chrono::Local::now().date_naive());
        self.store.create(&title, data).await
    }

    fn reject_credential_if(&self, err: &StoreError) {
        if err.is_unauthorized() {
            self.auth.invalidate();
        }
    }
}

/// Sets the in-flight flag for its lifetime.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn enter(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(Arc::clone(flag))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An armed timer. Dropping `cancel` stops it unless it already fired.
struct Pending {
    handle: JoinHandle<()>,
    cancel: oneshot::Sender<()>,
}

/// Cancellable debounced save task.
pub struct Autosave {
    target: SaveTarget,
    debounce: Duration,
    pending: Option<Pending>,
    in_flight: Arc<AtomicBool>,
}

impl Autosave {
    /// Create a disarmed autosave for `store`, gated by `auth`.
    #[must_use]
    pub fn new(store: Arc<dyn CardStore>, auth: Arc<dyn AuthProvider>, debounce: Duration) -> Self {
        Self {
            target: SaveTarget {
                store,
                auth,
                card_id: Arc::new(Mutex::new(None)),
                saving: Arc::new(tokio::sync::Mutex::new(())),
            },
            debounce,
            pending: None,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The card store saves go to.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CardStore> {
        &self.target.store
    }

    /// The auth provider gating saves.
    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.target.auth
    }

    /// (Re)start the debounce timer for `scene`.
    ///
    /// Does nothing without an active session, while a save is running, or
    /// outside a tokio runtime. Returns whether a timer is now armed.
    pub fn schedule(&mut self, scene: &Scene) -> bool {
        if !self.target.auth.is_session_active() {
            self.disarm();
            return false;
        }
        if self.is_in_flight() {
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No async runtime; autosave skipped");
            return false;
        };

        self.disarm();

        let target = self.target.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let debounce = self.debounce;
        let scene = scene.clone();

        let (cancel, cancelled) = oneshot::channel::<()>();

        let handle = runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled => return,
                () = tokio::time::sleep(debounce) => {}
            }
            let _guard = InFlight::enter(&in_flight);
            match target.upsert(&scene).await {
                Ok(card) => tracing::info!("Autosaved card {}", card.id),
                Err(err) => {
                    target.reject_credential_if(&err);
                    tracing::warn!("Autosave failed: {err}");
                }
            }
        });
        self.pending = Some(Pending { handle, cancel });
        true
    }

    /// Cancel the pending timer. A save already running is left to finish.
    pub fn disarm(&mut self) {
        if let Some(pending) = self.pending.take() {
            // Fails once the timer has fired; the save then runs to the end.
            let _ = pending.cancel.send(());
        }
    }

    /// Whether a timer is waiting or a save is running.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Whether a save is running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Save `scene` immediately, updating the remembered card if any.
    ///
    /// Waits for a running autosave to finish first.
    ///
    /// # Errors
    ///
    /// Returns the store error. An unauthorized response also ends the
    /// session.
    pub async fn save_now(&self, scene: &Scene) -> StoreResult<Card> {
        let result = self.target.upsert(scene).await;
        if let Err(err) = &result {
            self.target.reject_credential_if(err);
        }
        result
    }

    /// Card that later saves update, if one is known.
    #[must_use]
    pub fn card_id(&self) -> Option<CardId> {
        self.target.card_id()
    }

    /// Make later saves update `id`.
    pub fn remember(&self, id: CardId) {
        self.target.set_card_id(Some(id));
    }

    /// Forget `id` if it is the remembered card.
    pub fn forget(&self, id: &CardId) {
        if self.card_id().as_ref() == Some(id) {
            self.target.set_card_id(None);
        }
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl std::fmt::Debug for Autosave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autosave")
            .field("debounce", &self.debounce)
            .field("armed", &self.is_armed())
            .field("in_flight", &self.is_in_flight())
            .field("card_id", &self.card_id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenAuth;
    use crate::store::MemoryCardStore;
    use async_trait::async_trait;
    use card_core::{Color, ObjectSpec};

    const DEBOUNCE: Duration = Duration::from_secs(2);

    struct FailingStore;

    #[async_trait]
    impl CardStore for FailingStore {
        async fn create(&self, _title: &str, _data: &str) -> StoreResult<Card> {
            Err(StoreError::UnexpectedResponse("500: boom".into()))
        }
        async fn get(&self, id: &CardId) -> StoreResult<Card> {
            Err(StoreError::NotFound(id.clone()))
        }
        async fn list(&self) -> StoreResult<Vec<Card>> {
            Ok(Vec::new())
        }
        async fn update(&self, id: &CardId, _update: CardUpdate) -> StoreResult<Card> {
            Err(StoreError::NotFound(id.clone()))
        }
        async fn delete(&self, _id: &CardId) -> StoreResult<bool> {
            Ok(false)
        }
    }

    struct RejectingStore;

    #[async_trait]
    impl CardStore for RejectingStore {
        async fn create(&self, _title: &str, _data: &str) -> StoreResult<Card> {
            Err(StoreError::Unauthorized)
        }
        async fn get(&self, _id: &CardId) -> StoreResult<Card> {
            Err(StoreError::Unauthorized)
        }
        async fn list(&self) -> StoreResult<Vec<Card>> {
            Err(StoreError::Unauthorized)
        }
        async fn update(&self, _id: &CardId, _update: CardUpdate) -> StoreResult<Card> {
            Err(StoreError::Unauthorized)
        }
        async fn delete(&self, _id: &CardId) -> StoreResult<bool> {
            Err(StoreError::Unauthorized)
        }
    }

    /// Memory store whose creates take half a second.
    struct SlowStore(MemoryCardStore);

    #[async_trait]
    impl CardStore for SlowStore {
        async fn create(&self, title: &str, data: &str) -> StoreResult<Card> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            self.0.create(title, data).await
        }
        async fn get(&self, id: &CardId) -> StoreResult<Card> {
            self.0.get(id).await
        }
        async fn list(&self) -> StoreResult<Vec<Card>> {
            self.0.list().await
        }
        async fn update(&self, id: &CardId, update: CardUpdate) -> StoreResult<Card> {
            self.0.update(id, update).await
        }
        async fn delete(&self, id: &CardId) -> StoreResult<bool> {
            self.0.delete(id).await
        }
    }

    fn scene_with(text: &str) -> Scene {
        let mut scene = Scene::default();
        scene.add_object(ObjectSpec::text(text, 32.0, Color::BLACK));
        scene
    }

    fn signed_in() -> Arc<TokenAuth> {
        Arc::new(TokenAuth::new("token"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_save() {
        let store = MemoryCardStore::new();
        let mut autosave = Autosave::new(Arc::new(store.clone()), signed_in(), DEBOUNCE);

        for text in ["a", "ab", "abc"] {
            assert!(autosave.schedule(&scene_with(text)));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert!(store.is_empty());

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let cards = store.list().await.expect("list");
        assert_eq!(cards.len(), 1);
        assert!(cards[0].data.contains("abc"));
        assert!(cards[0].title.starts_with("Card "));
        assert!(!autosave.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_saves_update_same_card() {
        let store = MemoryCardStore::new();
        let mut autosave = Autosave::new(Arc::new(store.clone()), signed_in(), DEBOUNCE);

        autosave.schedule(&scene_with("first"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        let id = autosave.card_id().expect("remembered");

        autosave.schedule(&scene_with("second"));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(store.len(), 1);
        let card = store.get(&id).await.expect("card");
        assert!(card.data.contains("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_armed_without_session() {
        let store = MemoryCardStore::new();
        let auth = Arc::new(TokenAuth::anonymous());
        let mut autosave = Autosave::new(Arc::new(store.clone()), auth, DEBOUNCE);

        assert!(!autosave.schedule(&scene_with("x")));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_swallowed_and_flag_cleared() {
        let mut autosave = Autosave::new(Arc::new(FailingStore), signed_in(), DEBOUNCE);

        autosave.schedule(&scene_with("x"));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(!autosave.is_in_flight());
        assert!(autosave.schedule(&scene_with("y")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_ends_session() {
        let auth = signed_in();
        let mut autosave = Autosave::new(Arc::new(RejectingStore), auth.clone(), DEBOUNCE);

        autosave.schedule(&scene_with("x"));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(!auth.is_session_active());
        assert!(!autosave.schedule(&scene_with("y")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let store = MemoryCardStore::new();
        let mut autosave = Autosave::new(Arc::new(store.clone()), signed_in(), DEBOUNCE);
        autosave.schedule(&scene_with("x"));
        drop(autosave);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_during_autosave_updates_same_card() {
        let store = MemoryCardStore::new();
        let mut autosave = Autosave::new(
            Arc::new(SlowStore(store.clone())),
            signed_in(),
            DEBOUNCE,
        );

        autosave.schedule(&scene_with("auto"));
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(autosave.is_in_flight());

        let card = autosave.save_now(&scene_with("manual")).await.expect("save");
        assert_eq!(store.len(), 1);
        assert_eq!(autosave.card_id(), Some(card.id.clone()));
        assert!(store.get(&card.id).await.expect("card").data.contains("manual"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_leaves_running_save_to_finish() {
        let store = MemoryCardStore::new();
        let mut autosave = Autosave::new(
            Arc::new(SlowStore(store.clone())),
            signed_in(),
            DEBOUNCE,
        );

        autosave.schedule(&scene_with("x"));
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(autosave.is_in_flight());
        autosave.disarm();
        drop(autosave);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_before_expiry_cancels() {
        let store = MemoryCardStore::new();
        let mut autosave = Autosave::new(Arc::new(store.clone()), signed_in(), DEBOUNCE);

        autosave.schedule(&scene_with("x"));
        tokio::time::sleep(Duration::from_millis(1900)).await;
        autosave.disarm();
        assert!(!autosave.is_armed());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_card_is_recreated() {
        let store = MemoryCardStore::new();
        let autosave = Autosave::new(Arc::new(store.clone()), signed_in(), DEBOUNCE);
        autosave.remember(CardId::from("404"));

        let card = autosave.save_now(&scene_with("x")).await.expect("save");
        assert_ne!(card.id, CardId::from("404"));
        assert_eq!(autosave.card_id(), Some(card.id));
    }

    #[test]
    fn test_schedule_outside_runtime_is_noop() {
        let mut autosave = Autosave::new(Arc::new(MemoryCardStore::new()), signed_in(), DEBOUNCE);
        assert!(!autosave.schedule(&scene_with("x")));
        assert!(!autosave.is_armed());
    }
}
