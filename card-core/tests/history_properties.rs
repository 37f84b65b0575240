//! Integration tests for scene history, hit-testing and templates.

use std::collections::HashSet;

use card_core::{
    find_template, hit_test, CardDocument, Color, History, ObjectPatch, ObjectSpec, Scene,
    ShapeKind,
};
use proptest::prelude::*;

fn card_with_all_variants() -> Scene {
    let mut scene = Scene::new(Color::rgb(0xdb, 0xea, 0xfe));
    scene.add_object(ObjectSpec::text("Thank you for everything", 36.0, Color::rgb(30, 64, 175)));
    scene.add_object(ObjectSpec::shape(ShapeKind::Triangle, Color::rgb(0xf5, 0x9e, 0x0b)));
    scene.add_object(ObjectSpec::sticker("🙏").at(600.0, 380.0));
    scene
}

// ==========================================================================
// Undo / redo
// ==========================================================================

#[test]
fn test_undo_redo_undo_returns_to_earlier_state() {
    let mut history = History::new();
    let mut scene = Scene::default();

    // First step: add a sticker.
    history.commit(&scene);
    let id = scene.add_object(ObjectSpec::sticker("🎉"));
    let after_first = scene.clone();

    // Second step: move it.
    history.commit(&scene);
    scene
        .update_object(&id, ObjectPatch::position(10.0, 20.0))
        .expect("move");

    let undone = history.undo(&scene).expect("undo");
    assert_eq!(undone, after_first);
    let redone = history.redo(&undone).expect("redo");
    assert_eq!(redone, scene);
    let undone_again = history.undo(&redone).expect("undo again");
    assert_eq!(undone_again, after_first);
}

#[test]
fn test_redo_is_no_op_after_commit() {
    let mut history = History::new();
    let a = Scene::default();
    let b = card_with_all_variants();

    history.commit(&a);
    let restored = history.undo(&b).expect("undo");
    history.commit(&restored);

    assert!(history.redo(&restored).is_none());
}

#[test]
fn test_template_apply_undoes_in_one_step() {
    let mut history = History::new();
    let before = card_with_all_variants();

    history.commit(&before);
    let applied = find_template("birthday").expect("template").instantiate();
    assert_ne!(applied, before);

    let restored = history.undo(&applied).expect("undo");
    assert_eq!(restored, before);
    assert!(!history.can_undo());
}

#[test]
fn test_template_ids_disjoint_from_previous_scene() {
    let previous = card_with_all_variants();
    let previous_ids: HashSet<_> = previous.ids().cloned().collect();

    for template in card_core::list_templates() {
        let scene = template.instantiate();
        assert_eq!(scene.len(), template.objects.len());
        assert!(scene.ids().all(|id| !previous_ids.contains(id)));
    }
}

// ==========================================================================
// Serialization
// ==========================================================================

#[test]
fn test_card_document_round_trip_all_variants() {
    let scene = card_with_all_variants();
    let json = CardDocument::from_scene(&scene).to_json().expect("serialize");
    let restored = CardDocument::from_json(&json).expect("parse").into_scene();

    assert_eq!(restored.background_color, scene.background_color);
    assert_eq!(restored.objects(), scene.objects());
}

// ==========================================================================
// Hit-testing
// ==========================================================================

proptest! {
    #[test]
    fn prop_hit_test_returns_last_inserted_overlap(
        rects in prop::collection::vec((0.0f64..400.0, 0.0f64..300.0, 1.0f64..200.0, 1.0f64..200.0), 1..12),
        px in 0.0f64..600.0,
        py in 0.0f64..500.0,
    ) {
        let mut scene = Scene::default();
        for (x, y, w, h) in &rects {
            scene.add_object(
                ObjectSpec::shape(ShapeKind::Rect, Color::BLACK)
                    .at(*x, *y)
                    .with_size(*w, *h),
            );
        }

        let expected = scene
            .objects()
            .iter()
            .filter(|o| o.contains_point(px, py))
            .last()
            .map(|o| o.id.clone());
        let actual = hit_test(&scene, px, py).map(|o| o.id.clone());
        prop_assert_eq!(actual, expected);
    }
}
