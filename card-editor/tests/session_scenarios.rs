//! End-to-end editing scenarios driven through the public session API.

use std::sync::Arc;
use std::time::Duration;

use card_core::{
    find_template, CardDocument, Color, InputEvent, Key, PointerPhase, ShapeKind,
};
use card_editor::{
    AuthProvider, CardListing, CardStore, EditorConfig, EditorError, EditorSession,
    MemoryCardStore, TokenAuth,
};

fn pointer(phase: PointerPhase, x: f64, y: f64) -> InputEvent {
    InputEvent::pointer(phase, x, y)
}

fn x_of_only_object(session: &EditorSession) -> f64 {
    assert_eq!(session.scene().len(), 1, "expected exactly one object");
    session.scene().objects()[0].bounds().x
}

fn persistent_session() -> (EditorSession, MemoryCardStore, Arc<TokenAuth>) {
    let auth = Arc::new(TokenAuth::new("secret"));
    let store = MemoryCardStore::with_auth(auth.clone());
    let session = EditorSession::default()
        .with_persistence(Arc::new(store.clone()), auth.clone());
    (session, store, auth)
}

#[test]
fn test_add_drag_delete_then_undo_walks_back() {
    let mut session = EditorSession::default();
    session.add_text("Hi", 32.0, Color::BLACK);
    assert!((x_of_only_object(&session) - 100.0).abs() < f64::EPSILON);

    session.handle_event(&pointer(PointerPhase::Down, 110.0, 160.0));
    session.handle_event(&pointer(PointerPhase::Move, 260.0, 160.0));
    let released = session.handle_event(&pointer(PointerPhase::Up, 260.0, 160.0));
    assert!(released.committed);
    assert!((x_of_only_object(&session) - 250.0).abs() < f64::EPSILON);

    let deleted = session.handle_event(&InputEvent::key_down(Key::Delete));
    assert!(deleted.redraw);
    assert!(session.scene().is_empty());

    assert!(session.undo());
    assert!((x_of_only_object(&session) - 250.0).abs() < f64::EPSILON);
    assert!(session.undo());
    assert!((x_of_only_object(&session) - 100.0).abs() < f64::EPSILON);
    assert!(session.undo());
    assert!(session.scene().is_empty());
    assert!(!session.undo());
}

#[test]
fn test_template_application_is_undoable() {
    let mut session = EditorSession::default();
    session.add_shape(ShapeKind::Circle, Color::rgb(0xef, 0x44, 0x44));
    let before = session.scene().clone();

    session.apply_template("birthday").expect("template");
    let template = find_template("birthday").expect("catalog");
    assert_eq!(session.scene().len(), template.objects.len());
    assert_eq!(session.scene().background_color, template.background_color);
    assert!(session.selection().is_none());

    assert!(session.undo());
    assert_eq!(session.scene(), &before);
    assert!(session.redo());
    assert_eq!(session.scene().len(), template.objects.len());
}

#[test]
fn test_drag_with_many_moves_is_one_entry() {
    let mut session = EditorSession::default();
    session.add_sticker("🎈");
    let entries = session.history().undo_len();

    session.handle_event(&pointer(PointerPhase::Down, 220.0, 220.0));
    for step in 1..=20 {
        let offset = f64::from(step) * 5.0;
        session.handle_event(&pointer(PointerPhase::Move, 220.0 + offset, 220.0));
    }
    session.handle_event(&pointer(PointerPhase::Up, 320.0, 220.0));

    assert_eq!(session.history().undo_len(), entries + 1);
    assert!((x_of_only_object(&session) - 300.0).abs() < f64::EPSILON);
    assert!(session.undo());
    assert!((x_of_only_object(&session) - 200.0).abs() < f64::EPSILON);
}

#[test]
fn test_history_depth_is_capped() {
    let config = EditorConfig {
        history_depth: 5,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::new(config);
    for _ in 0..12 {
        session.add_shape(ShapeKind::Rect, Color::BLACK);
    }
    assert_eq!(session.history().undo_len(), 5);

    let mut undone = 0;
    while session.undo() {
        undone += 1;
    }
    assert_eq!(undone, 5);
    assert_eq!(session.scene().len(), 7);
}

#[test]
fn test_default_depth_keeps_fifty_entries() {
    let mut session = EditorSession::default();
    for _ in 0..60 {
        session.add_sticker("⭐");
    }
    assert_eq!(session.history().undo_len(), 50);
}

#[test]
fn test_new_action_discards_redo() {
    let mut session = EditorSession::default();
    session.add_sticker("🌟");
    session.add_sticker("🎁");
    assert!(session.undo());
    assert!(session.can_redo());

    session.set_background(Color::rgb(0x02, 0x06, 0x17));
    assert!(!session.can_redo());
    assert!(!session.redo());
}

#[test]
fn test_nudge_burst_is_one_entry() {
    let mut session = EditorSession::default();
    session.add_shape(ShapeKind::Triangle, Color::BLACK);
    let entries = session.history().undo_len();

    for _ in 0..4 {
        let outcome = session.handle_event(&InputEvent::key_down(Key::ArrowRight));
        assert!(outcome.prevent_default);
    }
    let released = session.handle_event(&InputEvent::key_up(Key::ArrowRight));
    assert!(released.committed);
    assert_eq!(session.history().undo_len(), entries + 1);
    assert!((x_of_only_object(&session) - 162.0).abs() < f64::EPSILON);

    assert!(session.undo());
    assert!((x_of_only_object(&session) - 150.0).abs() < f64::EPSILON);
}

#[test]
fn test_scaled_display_drag_uses_logical_units() {
    let mut session = EditorSession::default();
    session.resize(400.0, 250.0, 2.0);
    session.add_shape(ShapeKind::Rect, Color::BLACK);

    // Displayed at half size: (80, 105) is logical (160, 210).
    session.handle_event(&pointer(PointerPhase::Down, 80.0, 105.0));
    session.handle_event(&pointer(PointerPhase::Move, 130.0, 105.0));
    session.handle_event(&pointer(PointerPhase::Up, 130.0, 105.0));

    assert!((x_of_only_object(&session) - 250.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_save_then_save_again_updates_one_card() {
    let (mut session, store, _auth) = persistent_session();
    session.apply_template("thank-you").expect("template");

    let first = session.save().await.expect("save");
    assert!(first.title.starts_with("Card "));
    session.add_sticker("💌");
    let second = session.save().await.expect("save");

    assert_eq!(first.id, second.id);
    assert_eq!(store.len(), 1);
    let stored = store.get(&first.id).await.expect("get");
    let document = CardDocument::from_json(&stored.data).expect("document");
    assert_eq!(document.objects.len(), session.scene().len());
}

#[tokio::test]
async fn test_listing_reports_empty_account() {
    let (session, _store, _auth) = persistent_session();
    assert_eq!(session.list_cards().await.expect("list"), CardListing::Empty);
}

#[tokio::test]
async fn test_load_replaces_scene_as_one_step() {
    let (mut session, store, _auth) = persistent_session();
    let wedding = find_template("wedding").expect("catalog").instantiate();
    let data = CardDocument::from_scene(&wedding).to_json().expect("json");
    let card = store.create("Wedding", &data).await.expect("create");

    session.add_text("Draft", 32.0, Color::BLACK);
    let before = session.scene().clone();

    let loaded = session.load_card(&card.id).await.expect("load");
    assert_eq!(loaded.id, card.id);
    assert_eq!(session.scene().len(), wedding.len());
    assert_eq!(session.scene().background_color, wedding.background_color);
    assert!(session.selection().is_none());

    // Saving now updates the loaded card instead of creating another.
    session.save().await.expect("save");
    assert_eq!(store.len(), 1);

    assert!(session.undo());
    assert_eq!(session.scene(), &before);
}

#[tokio::test]
async fn test_listing_is_most_recent_first() {
    let (session, store, _auth) = persistent_session();
    let older = store.create("older", "{\"objects\":[]}").await.expect("create");
    store.create("newer", "{\"objects\":[]}").await.expect("create");
    store
        .update(&older.id, card_editor::CardUpdate::data("{\"objects\":[]}"))
        .await
        .expect("update");

    let CardListing::Cards(cards) = session.list_cards().await.expect("list") else {
        panic!("expected cards");
    };
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].title, "older");
}

#[tokio::test]
async fn test_persistence_unavailable_without_session() {
    let auth = Arc::new(TokenAuth::anonymous());
    let store = MemoryCardStore::with_auth(auth.clone());
    let session = EditorSession::default().with_persistence(Arc::new(store), auth);

    assert!(!session.is_session_active());
    assert!(matches!(session.save().await, Err(EditorError::NotAuthenticated)));
    assert!(matches!(
        session.list_cards().await,
        Err(EditorError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_rejected_credential_ends_session() {
    // The store sees no session while the editor believes it has one.
    let store_auth = Arc::new(TokenAuth::anonymous());
    let store = MemoryCardStore::with_auth(store_auth);
    let auth = Arc::new(TokenAuth::new("expired"));
    let session = EditorSession::default().with_persistence(Arc::new(store), auth.clone());

    assert!(session.is_session_active());
    assert!(matches!(
        session.list_cards().await,
        Err(EditorError::NotAuthenticated)
    ));
    assert!(!session.is_session_active());
    assert!(auth.bearer_token().is_none());
}

#[tokio::test]
async fn test_deleting_the_open_card_makes_next_save_create() {
    let (mut session, store, _auth) = persistent_session();
    session.add_sticker("🎀");
    let card = session.save().await.expect("save");

    assert!(session.delete_card(&card.id).await.expect("delete"));
    assert!(store.is_empty());

    let fresh = session.save().await.expect("save");
    assert_ne!(fresh.id, card.id);
    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_fires_after_quiet_period() {
    let (mut session, store, _auth) = persistent_session();
    session.add_shape(ShapeKind::Circle, Color::rgb(0x22, 0xc5, 0x5e));
    session.edit_color("#3b82f6");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(store.is_empty());

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(store.len(), 1);

    let cards = store.list().await.expect("list");
    let scene = cards[0].scene().expect("scene");
    assert_eq!(scene.objects()[0].kind, session.scene().objects()[0].kind);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_skipped_without_session() {
    let auth = Arc::new(TokenAuth::anonymous());
    let store = MemoryCardStore::new();
    let mut session = EditorSession::default()
        .with_persistence(Arc::new(store.clone()), auth);
    session.add_sticker("🎈");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(store.is_empty());
}
