mod common;

use common::{StubState, closed_origin, note, notes_router, serve};
use notes_client::{
    api::ApiClient,
    controller::ScreenController,
    layout::{Layout, Panel, Panels},
    repository::LocalStore,
    service::NoteService,
    terminal,
};

use std::sync::Arc;

fn screen(base_url: String) -> ScreenController<NoteService> {
    ScreenController::new(
        NoteService::new(ApiClient::new(base_url), LocalStore::seeded()),
        Layout::new(80, 120),
    )
}

async fn offline_screen() -> ScreenController<NoteService> {
    let mut screen = screen(closed_origin().await);
    screen.load().await;
    screen
}

#[tokio::test]
async fn test_unreachable_startup_shows_welcome_once() {
    let screen = offline_screen().await;

    let view = screen.view();
    let welcome: Vec<_> = view.items.iter().filter(|i| i.title == "Welcome").collect();
    assert_eq!(welcome.len(), 1);
    assert_eq!(view.items.len(), 1);
    assert!(view.offline);
    assert!(!view.loading);
    assert_eq!(view.selected.map(|n| n.title.as_str()), Some("Welcome"));
    assert!(view.error.is_none());
}

#[tokio::test]
async fn test_no_configured_address_behaves_offline() {
    let mut screen = screen(String::new());
    screen.load().await;
    assert!(screen.is_offline());
    assert_eq!(screen.notes().len(), 1);
}

#[tokio::test]
async fn test_create_note_scenario() {
    let mut screen = offline_screen().await;

    assert!(screen.create().await);

    let view = screen.view();
    assert_eq!(view.items[0].title, "Untitled");
    assert!(view.items[0].selected);
    let selected = view.selected.unwrap();
    assert_eq!(selected.title, "Untitled");
    assert_eq!(selected.content, "");
    assert_eq!(view.draft.title, "Untitled");
    assert_eq!(view.draft.content, "");
    assert!(!view.draft.dirty);
    assert!(!view.can_save);
}

#[tokio::test]
async fn test_edit_and_save_scenario() {
    let mut screen = offline_screen().await;
    screen.create().await;
    let before = screen.selected().unwrap().updated_at.clone();

    screen.edit_title("Groceries");
    assert!(screen.view().draft.dirty);
    assert!(screen.view().can_save);
    assert!(screen.save().await);

    let view = screen.view();
    assert_eq!(view.items[0].title, "Groceries");
    assert!(!view.draft.dirty);
    assert_ne!(view.selected.unwrap().updated_at, before);

    let rendered = terminal::render(&view, None);
    assert!(rendered.contains("[saved] Last updated:"));
}

#[tokio::test]
async fn test_delete_only_note_scenario() {
    let mut screen = offline_screen().await;

    assert!(screen.delete(|_: &str| true).await);

    let view = screen.view();
    assert!(view.items.is_empty());
    assert!(view.selected.is_none());
    assert!(terminal::render(&view, None).contains("Select a note to start editing."));
}

#[tokio::test]
async fn test_declined_delete_scenario() {
    let mut screen = offline_screen().await;
    screen.create().await;
    let notes = screen.notes().to_vec();
    let selected = screen.selected_id().map(str::to_string);

    assert!(!screen.delete(|_: &str| false).await);

    assert_eq!(screen.notes(), notes.as_slice());
    assert_eq!(screen.selected_id().map(str::to_string), selected);
}

#[tokio::test]
async fn test_remote_backed_session() {
    let state = Arc::new(StubState::with_notes(vec![
        note("7", "Remote note", "2024-05-01T00:00:00.000Z"),
    ]));
    let origin = serve(notes_router(state.clone())).await;
    let mut screen = screen(format!("{origin}/api"));

    screen.load().await;
    assert!(!screen.is_offline());
    assert_eq!(screen.selected().unwrap().title, "Remote note");

    screen.create().await;
    assert_eq!(screen.selected_id(), Some("srv-1"));

    screen.edit_content("from the terminal");
    screen.save().await;
    assert_eq!(screen.notes()[0].content, "from the terminal");

    screen.delete(|_: &str| true).await;
    assert_eq!(screen.selected_id(), Some("7"));
    assert_eq!(state.notes.lock().unwrap().len(), 1);
    assert!(!screen.is_offline());
}

#[tokio::test]
async fn test_narrow_screen_opens_editor_on_create() {
    let mut screen = ScreenController::new(
        NoteService::new(ApiClient::new(closed_origin().await), LocalStore::seeded()),
        Layout::new(80, 50),
    );
    screen.load().await;
    assert_eq!(screen.view().panels, Panels::Single(Panel::List));

    screen.create().await;
    assert_eq!(screen.view().panels, Panels::Single(Panel::Editor));

    screen.back();
    let rendered = terminal::render(&screen.view(), Some("test"));
    assert!(rendered.contains("Untitled"));
    assert!(!rendered.contains("Title:"));
}
