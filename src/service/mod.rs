use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    api::{ApiClient, Body, NOTES, RequestError},
    config::Config,
    dto::{CreateNoteRequest, ListResponse, UpdateNoteRequest},
    models::{self, Note},
    repository::LocalStore,
};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub const fn remote(value: T) -> Self {
        Self {
            value,
            source: Source::Remote,
        }
    }

    pub const fn fallback(value: T) -> Self {
        Self {
            value,
            source: Source::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == Source::Fallback
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Unexpected note in server response: {0}")]
    UnexpectedShape(String),
}

/// The four note operations the screen controller relies on.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list(&self) -> Result<Sourced<Vec<Note>>, ServiceError>;

    async fn create(&self, request: CreateNoteRequest) -> Result<Sourced<Note>, ServiceError>;

    /// `None` from the local store means the id is unknown. From the remote
    /// service it means the update was accepted without a note in the reply.
    async fn update(
        &self,
        id: &str,
        request: UpdateNoteRequest,
    ) -> Result<Sourced<Option<Note>>, ServiceError>;

    async fn delete(&self, id: &str) -> Result<Sourced<bool>, ServiceError>;
}

/// Talks to the remote notes service and answers from its own
/// [`LocalStore`] whenever a remote call fails. Remote failures are never
/// returned to the caller.
#[derive(Debug)]
pub struct NoteService {
    api: ApiClient,
    store: Mutex<LocalStore>,
}

impl NoteService {
    pub fn new(api: ApiClient, store: LocalStore) -> Self {
        Self {
            api,
            store: Mutex::new(store),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ApiClient::new(config.api_base_url()), LocalStore::seeded())
    }

    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    async fn remote(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Body, RequestError> {
        self.api
            .request(method, segments, body, HeaderMap::new())
            .await
    }
}

fn log_fallback(operation: &str, error: &RequestError) {
    tracing::warn!("Remote {} failed, using local notes: {}", operation, error);
}

fn to_body<T: serde::Serialize>(request: &T) -> Option<Value> {
    serde_json::to_value(request).ok()
}

fn decode_list(body: Body) -> Vec<Note> {
    let Body::Json(value) = body else {
        return Vec::new();
    };

    let mut notes: Vec<Note> = ListResponse::items(value)
        .into_iter()
        .filter_map(|item| match Note::from_value(item) {
            Ok(note) => Some(note),
            Err(e) => {
                tracing::warn!("Skipping malformed note in list response: {}", e);
                None
            }
        })
        .collect();
    models::sort_newest_first(&mut notes);
    notes
}

/// Reads a single record. Replies that carry no object give `None`.
fn decode_note(body: Body) -> Result<Option<Note>, ServiceError> {
    match body {
        Body::Json(value) if value.is_object() => Note::from_value(value)
            .map(Some)
            .map_err(|e| ServiceError::UnexpectedShape(e.to_string())),
        Body::Empty | Body::Json(_) | Body::Text(_) => Ok(None),
    }
}

/// Stands in for a created note when the reply carried none.
fn unechoed_note(request: CreateNoteRequest) -> Note {
    tracing::debug!("Create reply carried no note, using the request payload");
    let now = models::timestamp_after(None);
    Note {
        id: String::new(),
        title: request.title,
        content: request.content,
        created_at: now.clone(),
        updated_at: now,
    }
}

#[async_trait]
impl NotesApi for NoteService {
    async fn list(&self) -> Result<Sourced<Vec<Note>>, ServiceError> {
        match self.remote(Method::GET, &[NOTES], None).await {
            Ok(body) => Ok(Sourced::remote(decode_list(body))),
            Err(e) => {
                log_fallback("list", &e);
                Ok(Sourced::fallback(self.store.lock().await.list()))
            }
        }
    }

    async fn create(&self, request: CreateNoteRequest) -> Result<Sourced<Note>, ServiceError> {
        let payload = to_body(&request);
        match self.remote(Method::POST, &[NOTES], payload.as_ref()).await {
            Ok(body) => {
                let note = decode_note(body)?.unwrap_or_else(|| unechoed_note(request));
                Ok(Sourced::remote(note))
            }
            Err(e) => {
                log_fallback("create", &e);
                Ok(Sourced::fallback(self.store.lock().await.create(request)))
            }
        }
    }

    async fn update(
        &self,
        id: &str,
        request: UpdateNoteRequest,
    ) -> Result<Sourced<Option<Note>>, ServiceError> {
        let payload = to_body(&request);
        match self.remote(Method::PUT, &[NOTES, id], payload.as_ref()).await {
            Ok(body) => decode_note(body).map(Sourced::remote),
            Err(e) => {
                log_fallback("update", &e);
                Ok(Sourced::fallback(self.store.lock().await.update(id, request)))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<Sourced<bool>, ServiceError> {
        match self.remote(Method::DELETE, &[NOTES, id], None).await {
            Ok(_) => Ok(Sourced::remote(true)),
            Err(e) => {
                log_fallback("delete", &e);
                Ok(Sourced::fallback(self.store.lock().await.delete(id)))
            }
        }
    }
}
