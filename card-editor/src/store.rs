//! Card Store interface and implementations.
//!
//! The store keeps named scene snapshots under an authenticated account.
//! [`HttpCardStore`] speaks the REST API (`/cards`, bearer token);
//! [`MemoryCardStore`] keeps cards in process for tests and offline use.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use card_core::{CardDocument, CardResult, Scene};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::auth::AuthProvider;
use crate::error::{StoreError, StoreResult};

/// Identifier assigned to a card by the store.
///
/// Stores may use numeric or string ids; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl<'de> Deserialize<'de> for CardId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// A stored card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Store-assigned id.
    pub id: CardId,
    /// Display title.
    pub title: String,
    /// Serialized [`CardDocument`].
    pub data: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Parse the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a valid card document.
    pub fn document(&self) -> CardResult<CardDocument> {
        CardDocument::from_json(&self.data)
    }

    /// Parse the stored document into a scene.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a valid card document.
    pub fn scene(&self) -> CardResult<Scene> {
        Ok(self.document()?.into_scene())
    }
}

/// Partial update for [`CardStore::update`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New serialized document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl CardUpdate {
    /// Update only the document.
    #[must_use]
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            title: None,
            data: Some(data.into()),
        }
    }
}

/// Title given to cards saved on `date`.
#[must_use]
pub fn default_title(date: NaiveDate) -> String {
    format!("Card {}", date.format("%Y-%m-%d"))
}

/// Persistence of named card snapshots for the authenticated account.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Create a card.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unauthorized`] without a valid session.
    async fn create(&self, title: &str, data: &str) -> StoreResult<Card>;

    /// Fetch a card owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the card is absent or not owned
    /// by the caller.
    async fn get(&self, id: &CardId) -> StoreResult<Card>;

    /// List the caller's cards, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unauthorized`] without a valid session.
    async fn list(&self) -> StoreResult<Vec<Card>>;

    /// Change a card's title and/or document. Empty fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the card is absent.
    async fn update(&self, id: &CardId, update: CardUpdate) -> StoreResult<Card>;

    /// Delete a card, returning the store's success flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the card is absent.
    async fn delete(&self, id: &CardId) -> StoreResult<bool>;
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    title: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct DeleteResponse {
    success: bool,
}

/// REST client for the card store.
#[derive(Clone)]
pub struct HttpCardStore {
    http: Client,
    cards_url: Url,
    auth: Arc<dyn AuthProvider>,
}

impl HttpCardStore {
    /// Create a client for the API rooted at `base_url` (e.g.
    /// `http://localhost:3000/api`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] if the URL is malformed.
    /// Returns [`StoreError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: impl AsRef<str>, auth: Arc<dyn AuthProvider>) -> StoreResult<Self> {
        let mut cards_url =
            Url::parse(base_url.as_ref()).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        cards_url
            .path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(base_url.as_ref().to_string()))?
            .pop_if_empty()
            .push("cards");

        let http = Client::builder()
            .user_agent(concat!("cardsmith/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            cards_url,
            auth,
        })
    }

    /// URL of the card collection.
    #[must_use]
    pub fn cards_url(&self) -> &Url {
        &self.cards_url
    }

    fn card_url(&self, id: &CardId) -> StoreResult<Url> {
        let mut url = self.cards_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.cards_url.to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> StoreResult<RequestBuilder> {
        let token = self.auth.bearer_token().ok_or(StoreError::Unauthorized)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder, id: Option<&CardId>) -> StoreResult<Response> {
        let response = self.authorized(request)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match (status, id) {
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => Err(StoreError::Unauthorized),
            (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound(id.clone())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::UnexpectedResponse(format!("{status}: {body}")))
            }
        }
    }
}

impl fmt::Debug for HttpCardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCardStore")
            .field("cards_url", &self.cards_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CardStore for HttpCardStore {
    async fn create(&self, title: &str, data: &str) -> StoreResult<Card> {
        let request = self
            .http
            .post(self.cards_url.clone())
            .json(&CreateRequest { title, data });
        let card: Card = self.send(request, None).await?.json().await?;
        tracing::debug!("Created card {} ({:?})", card.id, card.title);
        Ok(card)
    }

    async fn get(&self, id: &CardId) -> StoreResult<Card> {
        let request = self.http.get(self.card_url(id)?);
        Ok(self.send(request, Some(id)).await?.json().await?)
    }

    async fn list(&self) -> StoreResult<Vec<Card>> {
        let request = self.http.get(self.cards_url.clone());
        Ok(self.send(request, None).await?.json().await?)
    }

    async fn update(&self, id: &CardId, update: CardUpdate) -> StoreResult<Card> {
        let request = self.http.put(self.card_url(id)?).json(&update);
        let card: Card = self.send(request, Some(id)).await?.json().await?;
        tracing::debug!("Updated card {}", card.id);
        Ok(card)
    }

    async fn delete(&self, id: &CardId) -> StoreResult<bool> {
        let request = self.http.delete(self.card_url(id)?);
        let response: DeleteResponse = self.send(request, Some(id)).await?.json().await?;
        Ok(response.success)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    cards: Vec<Card>,
    next_id: u64,
}

/// In-process card store for one account.
///
/// Honors the same authorization rule as the REST store: calls fail with
/// [`StoreError::Unauthorized`] while the auth provider has no session.
#[derive(Clone)]
pub struct MemoryCardStore {
    state: Arc<Mutex<MemoryState>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl MemoryCardStore {
    /// Store that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            auth: None,
        }
    }

    /// Store that requires an active session from `auth`.
    #[must_use]
    pub fn with_auth(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth: Some(auth),
            ..Self::new()
        }
    }

    /// Number of stored cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().cards.len()
    }

    /// Whether the store holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_auth(&self) -> StoreResult<()> {
        match &self.auth {
            Some(auth) if !auth.is_session_active() => Err(StoreError::Unauthorized),
            _ => Ok(()),
        }
    }
}

impl Default for MemoryCardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCardStore")
            .field("cards", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn create(&self, title: &str, data: &str) -> StoreResult<Card> {
        self.check_auth()?;
        let mut state = self.lock();
        state.next_id += 1;
        let now = Utc::now();
        let card = Card {
            id: CardId(state.next_id.to_string()),
            title: title.to_string(),
            data: data.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.cards.push(card.clone());
        Ok(card)
    }

    async fn get(&self, id: &CardId) -> StoreResult<Card> {
        self.check_auth()?;
        self.lock()
            .cards
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn list(&self) -> StoreResult<Vec<Card>> {
        self.check_auth()?;
        // Later entries were touched later; stable reverse keeps ties ordered.
        let mut cards: Vec<Card> = self.lock().cards.iter().rev().cloned().collect();
        cards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(cards)
    }

    async fn update(&self, id: &CardId, update: CardUpdate) -> StoreResult<Card> {
        self.check_auth()?;
        let mut state = self.lock();
        let index = state
            .cards
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut card = state.cards.remove(index);
        if let Some(title) = update.title.filter(|t| !t.is_empty()) {
            card.title = title;
        }
        if let Some(data) = update.data.filter(|d| !d.is_empty()) {
            card.data = data;
        }
        card.updated_at = Utc::now();
        state.cards.push(card.clone());
        Ok(card)
    }

    async fn delete(&self, id: &CardId) -> StoreResult<bool> {
        self.check_auth()?;
        let mut state = self.lock();
        let before = state.cards.len();
        state.cards.retain(|c| &c.id != id);
        if state.cards.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(true)
    }
}
