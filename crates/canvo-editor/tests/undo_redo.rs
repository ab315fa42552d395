//! Integration tests: snapshot history through the editor facade.
//!
//! Drives `Editor<MemoryScene>` the way the UI does and checks that every
//! command leaves exactly one history entry, that undo/redo walk the log
//! without writing to it, and that in-flight restores block commands.

use canvo_core::{Color, DrawableKind, EditorConfig, Size};
use canvo_editor::{Editor, EditorError, HistoryState, ImageInfo, MemoryScene, SceneAdapter};
use pretty_assertions::assert_eq;

const CONTAINER: Size = Size::new(1200.0, 900.0);

fn editor() -> Editor<MemoryScene> {
    let _ = env_logger::builder().is_test(true).try_init();
    Editor::init(MemoryScene::new(CONTAINER), CONTAINER, EditorConfig::default()).unwrap()
}

fn red() -> Color {
    Color::from_rgba8(255, 0, 0, 1.0)
}

fn photo() -> ImageInfo {
    ImageInfo {
        width: 600.0,
        height: 400.0,
    }
}

// ─── Initialization ──────────────────────────────────────────────────────

#[test]
fn init_seeds_one_entry_with_workspace() {
    let ed = editor();
    assert_eq!(ed.history().len(), 1);
    assert_eq!(ed.history().index(), 0);
    assert!(!ed.can_undo());
    assert!(!ed.can_redo());
    assert_eq!(ed.scene().objects().len(), 1);
    let ws = ed.workspace().unwrap();
    assert_eq!((ws.width, ws.height), (900.0, 1200.0));
    assert!(!ws.selectable);
}

// ─── Linearity ───────────────────────────────────────────────────────────

#[test]
fn undo_all_then_redo_all() {
    let mut ed = editor();
    ed.add_rectangle().unwrap();
    ed.add_circle().unwrap();
    ed.add_text("hi", &Default::default()).unwrap();
    assert_eq!(ed.history().len(), 4);
    assert!(ed.can_undo());

    for _ in 0..3 {
        assert!(ed.undo().unwrap());
    }
    assert_eq!(ed.history().index(), 0);
    assert_eq!(ed.scene().objects().len(), 1);
    assert!(ed.scene().objects()[0].is_workspace());
    assert!(!ed.undo().unwrap());

    for _ in 0..3 {
        assert!(ed.redo().unwrap());
    }
    assert_eq!(ed.history().index(), 3);
    assert_eq!(ed.scene().objects().len(), 4);
    assert!(!ed.redo().unwrap());
}

#[test]
fn one_command_is_one_entry() {
    let mut ed = editor();
    ed.add_rectangle().unwrap();
    ed.add_circle().unwrap();
    ed.select_all().unwrap();
    assert_eq!(ed.history().len(), 3);

    // Two objects restyled in one call.
    assert_eq!(ed.change_fill_color(red()).unwrap(), 2);
    assert_eq!(ed.history().len(), 4);

    // Two objects removed in one call.
    assert_eq!(ed.delete().unwrap(), 2);
    assert_eq!(ed.history().len(), 5);
}

#[test]
fn undo_does_not_grow_the_log() {
    let mut ed = editor();
    ed.add_rectangle().unwrap();
    ed.add_diamond().unwrap();
    let len = ed.history().len();

    ed.undo().unwrap();
    assert_eq!(ed.history().len(), len);
    assert_eq!(ed.history().index(), len - 2);

    ed.redo().unwrap();
    assert_eq!(ed.history().len(), len);
    assert_eq!(ed.history().index(), len - 1);
}

#[test]
fn new_command_after_undo_truncates_redo() {
    let mut ed = editor();
    ed.add_rectangle().unwrap();
    ed.add_circle().unwrap();
    ed.undo().unwrap();
    assert!(ed.can_redo());

    ed.add_diamond().unwrap();
    assert!(!ed.can_redo());
    assert_eq!(ed.history().len(), 3);
    let kinds: Vec<&str> = ed
        .scene()
        .objects()
        .iter()
        .map(|d| d.kind.type_name())
        .collect();
    assert_eq!(kinds, vec!["rect", "rect", "diamond"]);
}

// ─── Fill scenario ───────────────────────────────────────────────────────

#[test]
fn fill_change_round_trips_through_history() {
    let mut ed = editor();
    let rect = ed.add_rectangle().unwrap();
    ed.change_fill_color(red()).unwrap();
    assert_eq!(ed.active_fill_color(), red());

    ed.undo().unwrap();
    let restored = ed.scene().object(rect).unwrap();
    assert_eq!(restored.fill, Some(Color::BLACK));
    assert_eq!(ed.selected_objects(), &[rect]);
    assert_eq!(ed.active_fill_color(), Color::BLACK);

    ed.redo().unwrap();
    assert_eq!(ed.scene().object(rect).unwrap().fill, Some(red()));
    assert_eq!(ed.active_fill_color(), red());
}

// ─── No-op commands ──────────────────────────────────────────────────────

#[test]
fn delete_with_nothing_selected_is_a_noop() {
    let mut ed = editor();
    ed.add_rectangle().unwrap();
    ed.deselect().unwrap();
    let (len, index) = (ed.history().len(), ed.history().index());

    assert_eq!(ed.delete().unwrap(), 0);
    assert_eq!(ed.scene().objects().len(), 2);
    assert_eq!((ed.history().len(), ed.history().index()), (len, index));
}

#[test]
fn style_with_nothing_selected_only_sets_defaults() {
    let mut ed = editor();
    ed.change_fill_color(red()).unwrap();
    assert_eq!(ed.history().len(), 1);
    assert_eq!(ed.active_fill_color(), red());

    // New shapes pick up the session default.
    let id = ed.add_rectangle().unwrap();
    assert_eq!(ed.scene().object(id).unwrap().fill, Some(red()));
}

// ─── Engine-driven changes ───────────────────────────────────────────────

#[test]
fn drag_is_captured_once() {
    let mut ed = editor();
    let id = ed.add_rectangle().unwrap();
    let before = ed.scene().object(id).unwrap().left;

    assert!(ed.interact(|s| s.drag(id, 15.0, 0.0)).unwrap());
    assert_eq!(ed.history().len(), 3);

    ed.undo().unwrap();
    assert_eq!(ed.scene().object(id).unwrap().left, before);
}

#[test]
fn freehand_path_is_captured() {
    let mut ed = editor();
    ed.enable_drawing_mode().unwrap();
    let id = ed
        .interact(|s| {
            s.draw_path(vec![
                canvo_core::PathCmd::MoveTo(0.0, 0.0),
                canvo_core::PathCmd::LineTo(40.0, 30.0),
            ])
        })
        .unwrap()
        .unwrap();
    assert_eq!(ed.history().len(), 2);
    assert!(matches!(
        ed.scene().object(id).unwrap().kind,
        DrawableKind::Path { .. }
    ));
}

// ─── Asynchronous restore ────────────────────────────────────────────────

/// Workspace + image + rectangle, with the image's decode forgotten so the
/// next restore has to wait for it.
fn editor_with_cold_image() -> Editor<MemoryScene> {
    let mut ed = editor();
    ed.add_image("photo.png").unwrap();
    ed.complete_image_load("photo.png", Ok(photo())).unwrap();
    ed.add_rectangle().unwrap();
    ed.interact(|s| s.forget_images()).unwrap();
    assert_eq!(ed.history().len(), 3);
    ed
}

#[test]
fn commands_are_rejected_while_restoring() {
    let mut ed = editor_with_cold_image();
    assert!(ed.undo().unwrap());
    assert!(ed.is_busy());
    assert!(matches!(
        ed.history().state(),
        HistoryState::Replaying { target: 1, .. }
    ));
    assert_eq!(ed.scene().pending_loads(), vec!["photo.png".to_string()]);

    assert!(matches!(ed.add_rectangle(), Err(EditorError::Busy)));
    assert!(matches!(ed.undo(), Err(EditorError::Busy)));
    assert!(matches!(ed.redo(), Err(EditorError::Busy)));
    assert!(matches!(ed.change_fill_color(red()), Err(EditorError::Busy)));
    assert_eq!(ed.defaults().fill_color, Color::BLACK);
    assert_eq!(ed.history().len(), 3);

    ed.complete_image_load("photo.png", Ok(photo())).unwrap();
    assert!(!ed.is_busy());
    assert_eq!(ed.history().index(), 1);
    assert_eq!(ed.scene().objects().len(), 2);
    assert_eq!(ed.history().len(), 3);
}

#[test]
fn input_during_restore_is_not_recorded() {
    let mut ed = editor_with_cold_image();
    let rect = ed.scene().objects()[2].id;
    ed.undo().unwrap();

    assert!(ed.interact(|s| s.drag(rect, 5.0, 5.0)).unwrap());
    assert_eq!(ed.history().len(), 3);

    ed.complete_image_load("photo.png", Ok(photo())).unwrap();
    assert_eq!(ed.history().len(), 3);
    assert_eq!(ed.history().index(), 1);
}

#[test]
fn failed_restore_releases_the_guard() {
    let mut ed = editor_with_cold_image();
    ed.undo().unwrap();
    ed.complete_image_load("photo.png", Err("network error".into()))
        .unwrap();

    assert!(!ed.is_busy());
    assert_eq!(ed.history().state(), HistoryState::Idle);
    // Nothing changed: still showing the newest entry.
    assert_eq!(ed.history().index(), 2);
    assert_eq!(ed.scene().objects().len(), 3);

    // And history keeps working.
    ed.add_circle().unwrap();
    assert_eq!(ed.history().len(), 4);
}

#[test]
fn image_decoded_during_restore_lands_afterwards() {
    let mut ed = editor_with_cold_image();
    ed.add_image("late.png").unwrap();
    ed.undo().unwrap();

    // The restore is still waiting on photo.png.
    ed.complete_image_load("late.png", Ok(photo())).unwrap();
    assert!(ed.is_busy());
    assert_eq!(ed.scene().objects().len(), 3);
    assert_eq!(ed.history().len(), 3);

    ed.complete_image_load("photo.png", Ok(photo())).unwrap();
    assert!(!ed.is_busy());
    let srcs: Vec<_> = ed
        .scene()
        .objects()
        .iter()
        .filter_map(|d| d.image().map(|i| i.src.as_str()))
        .collect();
    assert_eq!(srcs, vec!["photo.png", "late.png"]);
    // Restored entry 1, then one entry for the late image.
    assert_eq!((ed.history().len(), ed.history().index()), (3, 2));
    assert_eq!(ed.selected_image_source().as_deref(), Some("late.png"));
    assert!(!ed.can_redo());
}

// ─── Non-finite input ────────────────────────────────────────────────────

#[test]
fn non_finite_values_never_reach_history() {
    let mut ed = editor();
    ed.add_rectangle().unwrap();
    let len = ed.history().len();

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(ed.change_opacity(bad), Err(EditorError::NonFinite { .. })));
        assert!(matches!(ed.change_stroke_width(bad), Err(EditorError::NonFinite { .. })));
        assert!(matches!(ed.change_font_size(bad), Err(EditorError::NonFinite { .. })));
        assert!(matches!(
            ed.change_stroke_dash_array(&[4.0, bad]),
            Err(EditorError::NonFinite { .. })
        ));
        assert!(matches!(
            ed.change_size(Size::new(bad, 100.0)),
            Err(EditorError::NonFinite { .. })
        ));
    }
    assert_eq!(ed.history().len(), len);
    assert_eq!(ed.defaults().stroke_width, 2.0);
    assert!(ed.defaults().stroke_dash_array.is_empty());

    // A valid edit after the rejected ones still undoes and redoes.
    ed.change_opacity(0.5).unwrap();
    ed.undo().unwrap();
    assert!(ed.redo().unwrap());
    assert_eq!(ed.history().index(), len);
    assert!(!ed.can_redo());
    assert_eq!(ed.active_opacity(), 0.5);
}
