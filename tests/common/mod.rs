#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use notes_client::models::{self, Note};
use serde_json::{Value, json};

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: &'static str,
    pub id: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

/// In-process stand-in for the notes REST service.
#[derive(Default)]
pub struct StubState {
    pub notes: Mutex<Vec<Note>>,
    pub seen: Mutex<Vec<Seen>>,
    pub envelope: bool,
    next_id: AtomicU64,
}

impl StubState {
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Mutex::new(notes),
            ..Self::default()
        }
    }

    /// Answers `GET /notes` with `{ "items": [...] }` instead of a bare array.
    pub fn enveloped(notes: Vec<Note>) -> Self {
        Self {
            envelope: true,
            ..Self::with_notes(notes)
        }
    }

    pub fn last_seen(&self) -> Seen {
        self.seen.lock().unwrap().last().cloned().expect("no request seen")
    }

    fn record(&self, method: &'static str, id: Option<String>, headers: &HeaderMap, body: &[u8]) {
        self.seen.lock().unwrap().push(Seen {
            method,
            id,
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_slice(body).ok(),
        });
    }
}

pub fn note(id: &str, title: &str, updated_at: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        content: format!("{title} body"),
        created_at: updated_at.to_string(),
        updated_at: updated_at.to_string(),
    }
}

async fn list_notes(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.record("GET", None, &headers, &[]);
    let notes = state.notes.lock().unwrap().clone();
    if state.envelope {
        Json(json!({ "items": notes })).into_response()
    } else {
        Json(notes).into_response()
    }
}

async fn create_note(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record("POST", None, &headers, &body);
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let now = models::timestamp_after(None);
    let note = Note {
        id: format!("srv-{}", state.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        title: payload["title"].as_str().unwrap_or_default().to_string(),
        content: payload["content"].as_str().unwrap_or_default().to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    state.notes.lock().unwrap().push(note.clone());
    (StatusCode::CREATED, Json(note)).into_response()
}

async fn update_note(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record("PUT", Some(id.clone()), &headers, &body);
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut notes = state.notes.lock().unwrap();
    let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
        return (StatusCode::NOT_FOUND, "Note not found").into_response();
    };
    if let Some(title) = payload["title"].as_str() {
        note.title = title.to_string();
    }
    if let Some(content) = payload["content"].as_str() {
        note.content = content.to_string();
    }
    note.updated_at = models::timestamp_after(Some(&note.updated_at));
    Json(note.clone()).into_response()
}

async fn delete_note(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("DELETE", Some(id.clone()), &headers, &[]);
    let mut notes = state.notes.lock().unwrap();
    let before = notes.len();
    notes.retain(|n| n.id != id);
    if notes.len() == before {
        (StatusCode::NOT_FOUND, "Note not found").into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

pub fn notes_router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
        .with_state(state)
}

pub fn failing_router() -> Router {
    Router::new().fallback(|| async {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database unavailable" })),
        )
    })
}

pub fn slow_router(delay: Duration) -> Router {
    Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        Json(json!([]))
    })
}

/// Serves `router` on an ephemeral local port and returns its origin.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Origin nothing is listening on.
pub async fn closed_origin() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
