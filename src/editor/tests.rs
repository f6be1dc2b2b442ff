use std::time::Duration;

use web_time::Instant;

use super::*;

fn settings() -> EditorSettings {
    EditorSettings {
        auto_name: false,
        ..EditorSettings::default()
    }
}

fn editor() -> ShapeEditor {
    ShapeEditor::new(100, 100, settings(), RecentLabels::new())
}

fn editor_with(objects: Vec<ObjectModel>) -> ShapeEditor {
    let mut ed = editor();
    ed.load_objects(objects);
    ed.drain_events();
    ed
}

fn boxed(name: &str, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> ObjectModel {
    ObjectModel::with_box(name, BoundBox::new(xmin, ymin, xmax, ymax))
}

fn draw_box(ed: &mut ShapeEditor, from: Point, to: Point) {
    ed.pointer_pressed(from, 1, Modifiers::NONE);
    ed.pointer_dragged(to);
    ed.pointer_released(to);
}

fn click(ed: &mut ShapeEditor, x: f64, y: f64, count: u32) {
    ed.pointer_pressed(Point::new(x, y), count, Modifiers::NONE);
    ed.pointer_released(Point::new(x, y));
}

fn id_at(ed: &ShapeEditor, index: usize) -> ShapeId {
    ed.shapes().as_slice()[index].id
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_draw_box_commits_and_selects() {
    let mut ed = editor();
    draw_box(&mut ed, Point::new(10.0, 10.0), Point::new(60.0, 50.0));

    assert_eq!(ed.shapes().len(), 1);
    let shape = &ed.shapes().as_slice()[0];
    assert_eq!(shape.item().bounds(), BoundBox::new(10.0, 10.0, 60.0, 50.0));
    assert_eq!(*shape.model().bound_box(), BoundBox::new(10.0, 10.0, 60.0, 50.0));
    assert_eq!(ed.selection(), Selection::Shape(shape.id));
    assert!(ed.has_undo());
    assert!(!ed.has_redo());

    let events = ed.drain_events();
    assert!(events.contains(&EditorEvent::ShapesChanged));
    assert!(events.contains(&EditorEvent::ChangeSettled));
    assert!(events.contains(&EditorEvent::UndoStateChanged {
        has_undo: true,
        has_redo: false
    }));
}

#[test]
fn test_draw_undo_redo() {
    let mut ed = editor();
    draw_box(&mut ed, Point::new(10.0, 10.0), Point::new(60.0, 50.0));
    let id = id_at(&ed, 0);

    assert_eq!(ed.undo().as_deref(), Some("Add rectangle"));
    assert!(ed.shapes().is_empty());
    assert_eq!(ed.selection(), Selection::None);
    assert!(!ed.has_undo());
    assert!(ed.has_redo());

    ed.redo();
    assert_eq!(ed.shapes().index_of(id), Some(0));
    assert_eq!(
        ed.shapes().get(id).map(|s| s.item().bounds()),
        Some(BoundBox::new(10.0, 10.0, 60.0, 50.0))
    );
    assert!(ed.has_undo());
    assert!(!ed.has_redo());
}

#[test]
fn test_too_small_box_is_rejected() {
    let mut ed = editor();
    draw_box(&mut ed, Point::new(10.0, 10.0), Point::new(30.0, 60.0));

    assert!(ed.shapes().is_empty());
    assert!(!ed.has_undo());
    assert_eq!(*ed.state(), EditState::Idle);
    let events = ed.drain_events();
    assert!(events.contains(&EditorEvent::Status("Shape too small".into())));
}

#[test]
fn test_min_size_shrinks_with_zoom() {
    let mut ed = editor();
    ed.set_zoom(4.0);
    draw_box(&mut ed, Point::new(10.0, 10.0), Point::new(20.0, 20.0));
    assert_eq!(ed.shapes().len(), 1);
}

#[test]
fn test_preview_erases_previous_region() {
    let mut ed = editor();
    ed.pointer_pressed(Point::new(10.0, 10.0), 1, Modifiers::NONE);
    ed.pointer_dragged(Point::new(30.0, 30.0));
    ed.pointer_dragged(Point::new(40.0, 40.0));

    let redraws: Vec<_> = ed
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, EditorEvent::Redraw { .. }))
        .collect();
    assert_eq!(
        redraws,
        vec![
            EditorEvent::Redraw {
                erase: None,
                preview: Some(Preview::Box(BoundBox::new(10.0, 10.0, 30.0, 30.0))),
            },
            EditorEvent::Redraw {
                erase: Some(BoundBox::new(8.0, 8.0, 32.0, 32.0)),
                preview: Some(Preview::Box(BoundBox::new(10.0, 10.0, 40.0, 40.0))),
            },
        ]
    );
}

#[test]
fn test_auto_name_requests_label() {
    let settings = EditorSettings {
        auto_name: true,
        ..EditorSettings::default()
    };
    let mut ed = ShapeEditor::new(100, 100, settings, RecentLabels::from_labels(["dog", "cat"]));
    draw_box(&mut ed, Point::new(10.0, 10.0), Point::new(60.0, 50.0));

    let id = id_at(&ed, 0);
    assert_eq!(ed.shapes().get(id).map(|s| s.name()), Some("dog"));
    assert!(ed.drain_events().contains(&EditorEvent::RequestLabel {
        shape: id,
        suggestion: Some("dog".into()),
    }));
}

#[test]
fn test_no_label_request_without_recent_labels() {
    let mut ed = ShapeEditor::new(100, 100, EditorSettings::default(), RecentLabels::new());
    draw_box(&mut ed, Point::new(10.0, 10.0), Point::new(60.0, 50.0));
    assert!(
        !ed.drain_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::RequestLabel { .. }))
    );
    assert_eq!(ed.selected_model().map(|m| m.name.as_str()), Some(""));
}

// ============================================================================
// Polygons
// ============================================================================

#[test]
fn test_polygon_double_click_closes() {
    let mut ed = editor();
    ed.set_draw_mode(DrawMode::Polygon);
    click(&mut ed, 10.0, 10.0, 2);
    assert_eq!(ed.state().name(), "DrawingPolygon");
    click(&mut ed, 60.0, 10.0, 1);
    click(&mut ed, 60.0, 60.0, 1);
    click(&mut ed, 60.0, 60.0, 2);

    assert_eq!(ed.shapes().len(), 1);
    let model = ed.selected_model().expect("polygon selected");
    assert_eq!(
        model.polygon(),
        Some(
            &[
                Point::new(10.0, 10.0),
                Point::new(60.0, 10.0),
                Point::new(60.0, 60.0)
            ][..]
        )
    );
    assert_eq!(*model.bound_box(), BoundBox::new(10.0, 10.0, 60.0, 60.0));
    assert_eq!(ed.undo_description().as_deref(), Some("Add polygon"));
}

#[test]
fn test_single_click_does_not_start_polygon() {
    let mut ed = editor();
    ed.set_draw_mode(DrawMode::Polygon);
    click(&mut ed, 10.0, 10.0, 1);
    assert_eq!(*ed.state(), EditState::Idle);

    ed.pointer_pressed(Point::new(10.0, 10.0), 1, Modifiers::SHORTCUT);
    assert_eq!(ed.state().name(), "DrawingPolygon");
}

#[test]
fn test_polygon_space_uses_rubber_point() {
    let mut ed = editor();
    ed.set_draw_mode(DrawMode::Polygon);
    ed.pointer_pressed(Point::new(10.0, 10.0), 1, Modifiers::SHORTCUT);
    click(&mut ed, 60.0, 10.0, 1);
    ed.pointer_moved(Point::new(40.0, 70.0));
    assert!(ed.key_pressed(Key::Space, Modifiers::NONE));

    let model = ed.selected_model().expect("polygon selected");
    assert_eq!(model.polygon().map(<[Point]>::len), Some(3));
    assert_eq!(model.polygon().and_then(<[Point]>::last), Some(&Point::new(40.0, 70.0)));
}

#[test]
fn test_polygon_escape_aborts() {
    let mut ed = editor();
    ed.set_draw_mode(DrawMode::Polygon);
    click(&mut ed, 10.0, 10.0, 2);
    click(&mut ed, 60.0, 10.0, 1);
    assert!(ed.key_pressed(Key::Escape, Modifiers::NONE));

    assert!(ed.shapes().is_empty());
    assert_eq!(*ed.state(), EditState::Idle);
    assert!(!ed.has_undo());
    assert!(!ed.key_pressed(Key::Escape, Modifiers::NONE));
}

#[test]
fn test_polygon_needs_three_vertices() {
    let mut ed = editor();
    ed.set_draw_mode(DrawMode::Polygon);
    click(&mut ed, 10.0, 10.0, 2);
    click(&mut ed, 60.0, 60.0, 1);
    click(&mut ed, 60.0, 60.0, 2);

    assert!(ed.shapes().is_empty());
    assert!(
        ed.drain_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::Status(s) if s.contains("at least 3")))
    );
}

// ============================================================================
// Selection, dragging and deletion
// ============================================================================

#[test]
fn test_click_selects_topmost_and_empty_click_deselects() {
    let mut ed = editor_with(vec![
        boxed("a", 0.0, 0.0, 50.0, 50.0),
        boxed("b", 25.0, 25.0, 75.0, 75.0),
    ]);
    click(&mut ed, 40.0, 40.0, 1);
    assert_eq!(ed.selection(), Selection::Shape(id_at(&ed, 1)));

    click(&mut ed, 90.0, 5.0, 1);
    assert_eq!(ed.selection(), Selection::None);
}

#[test]
fn test_nw_handle_drag_clamps_to_min_size() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    let id = id_at(&ed, 0);
    ed.select_shape(id);

    ed.pointer_pressed(Point::new(10.0, 10.0), 1, Modifiers::NONE);
    assert_eq!(ed.state().name(), "HandleDragging");
    ed.pointer_dragged(Point::new(55.0, 45.0));
    ed.pointer_released(Point::new(55.0, 45.0));

    let bounds = ed.selected_shape().map(|s| s.item().bounds());
    assert_eq!(bounds, Some(BoundBox::new(36.0, 26.0, 60.0, 50.0)));
    assert_eq!(ed.selected_model().map(|m| *m.bound_box()), bounds);
    assert_eq!(ed.state().name(), "ShapeSelected");

    ed.undo();
    assert_eq!(
        ed.shapes().get(id).map(|s| s.item().bounds()),
        Some(BoundBox::new(10.0, 10.0, 60.0, 50.0))
    );
}

#[test]
fn test_handle_drag_zoomed_out_stays_in_image() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    let id = id_at(&ed, 0);
    ed.set_zoom(0.25);
    assert_eq!(ed.min_size(), 96.0);
    ed.select_shape(id);

    ed.pointer_pressed(Point::new(10.0, 10.0), 1, Modifiers::NONE);
    assert_eq!(ed.state().name(), "HandleDragging");
    ed.pointer_dragged(Point::new(11.0, 11.0));
    ed.pointer_released(Point::new(11.0, 11.0));

    let bounds = ed.selected_shape().map(|s| s.item().bounds());
    assert_eq!(bounds, Some(BoundBox::new(0.0, 0.0, 60.0, 50.0)));
    assert_eq!(ed.selected_model().map(|m| *m.bound_box()), bounds);
}

#[test]
fn test_handle_drag_on_small_loaded_box_stays_in_image() {
    let mut ed = editor_with(vec![boxed("a", 88.0, 88.0, 98.0, 98.0)]);
    let id = id_at(&ed, 0);
    assert!(ed.min_size() > 10.0);
    ed.select_shape(id);

    ed.pointer_pressed(Point::new(98.0, 98.0), 1, Modifiers::NONE);
    assert_eq!(ed.state().name(), "HandleDragging");
    ed.pointer_dragged(Point::new(99.0, 99.0));
    ed.pointer_released(Point::new(99.0, 99.0));

    let bounds = ed.shapes().get(id).map(|s| s.item().bounds());
    assert_eq!(bounds, Some(BoundBox::new(88.0, 88.0, 100.0, 100.0)));
}

#[test]
fn test_body_drag_moves_inside_image() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    click(&mut ed, 30.0, 30.0, 1);
    ed.pointer_pressed(Point::new(30.0, 30.0), 1, Modifiers::NONE);
    ed.pointer_dragged(Point::new(200.0, 30.0));
    ed.pointer_released(Point::new(200.0, 30.0));

    assert_eq!(
        ed.selected_shape().map(|s| s.item().bounds()),
        Some(BoundBox::new(50.0, 10.0, 100.0, 50.0))
    );
    assert_eq!(ed.undo_description().as_deref(), Some("Move/resize rectangle"));
}

#[test]
fn test_press_on_unselected_shape_drags_it() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    ed.pointer_pressed(Point::new(20.0, 20.0), 1, Modifiers::NONE);
    ed.pointer_dragged(Point::new(25.0, 30.0));
    ed.pointer_released(Point::new(25.0, 30.0));

    assert_eq!(
        ed.selected_shape().map(|s| s.item().bounds()),
        Some(BoundBox::new(15.0, 20.0, 65.0, 60.0))
    );
}

#[test]
fn test_click_without_drag_records_nothing() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    click(&mut ed, 30.0, 30.0, 1);
    assert!(!ed.has_undo());
}

#[test]
fn test_delete_then_undo_restores_index() {
    let mut ed = editor_with(vec![
        boxed("a", 0.0, 0.0, 30.0, 30.0),
        boxed("b", 40.0, 0.0, 70.0, 30.0),
        boxed("c", 0.0, 40.0, 30.0, 70.0),
    ]);
    let b = id_at(&ed, 1);
    ed.select_shape(b);
    assert!(ed.key_pressed(Key::Delete, Modifiers::NONE));
    assert_eq!(ed.shapes().len(), 2);
    assert_eq!(ed.selection(), Selection::None);

    ed.undo();
    assert_eq!(ed.shapes().index_of(b), Some(1));
    let names: Vec<_> = ed.models().into_iter().map(|m| m.name).collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn test_deselect_closes_context_menu() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    assert!(!ed.open_context_menu());
    ed.select_shape(id_at(&ed, 0));
    assert!(ed.open_context_menu());

    ed.clear_selection();
    assert!(!ed.is_context_menu_open());
    assert!(ed.drain_events().contains(&EditorEvent::ContextMenuClosed));
}

#[test]
fn test_rename_is_undoable() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    ed.select_shape(id_at(&ed, 0));
    assert!(ed.rename_selected("zebra"));
    assert_eq!(ed.labels().most_recent(), Some("zebra"));
    assert_eq!(ed.undo_description().as_deref(), Some("Rename to 'zebra'"));

    ed.undo();
    assert_eq!(ed.selected_model().map(|m| m.name.as_str()), Some("a"));
}

#[test]
fn test_copy_paste_offsets_inside_image() {
    let mut ed = editor_with(vec![boxed("a", 40.0, 10.0, 95.0, 50.0)]);
    ed.select_shape(id_at(&ed, 0));
    assert!(ed.copy_selected());
    let pasted = ed.paste().expect("clipboard filled");

    assert_eq!(ed.shapes().len(), 2);
    assert_eq!(ed.selection(), Selection::Shape(pasted));
    assert_eq!(
        ed.shapes().get(pasted).map(|s| s.item().bounds()),
        Some(BoundBox::new(45.0, 20.0, 100.0, 60.0))
    );
    ed.undo();
    assert_eq!(ed.shapes().len(), 1);
}

#[test]
fn test_load_objects_forgets_history() {
    let mut ed = editor();
    draw_box(&mut ed, Point::new(10.0, 10.0), Point::new(60.0, 50.0));
    assert!(ed.has_undo());
    ed.load_objects(vec![boxed("x", 0.0, 0.0, 30.0, 30.0)]);
    assert!(!ed.has_undo());
    assert!(!ed.has_redo());
    assert_eq!(ed.shapes().len(), 1);
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn test_nudges_follow_rotation_and_merge() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    ed.select_shape(id_at(&ed, 0));
    ed.set_rotation(Rotation::Deg90);

    assert!(ed.key_pressed(Key::ArrowUp, Modifiers::SHORTCUT));
    assert!(ed.key_pressed(Key::ArrowRight, Modifiers::SHORTCUT));
    assert!(ed.key_pressed(Key::ArrowRight, Modifiers::SHORTCUT));
    assert_eq!(
        ed.selected_shape().map(|s| s.item().bounds()),
        Some(BoundBox::new(9.0, 8.0, 59.0, 48.0))
    );

    ed.undo();
    assert_eq!(
        ed.selected_shape().map(|s| s.item().bounds()),
        Some(BoundBox::new(10.0, 10.0, 60.0, 50.0))
    );
    assert!(!ed.has_undo());
}

#[test]
fn test_arrow_without_shortcut_is_ignored() {
    let mut ed = editor_with(vec![boxed("a", 10.0, 10.0, 60.0, 50.0)]);
    ed.select_shape(id_at(&ed, 0));
    assert!(!ed.key_pressed(Key::ArrowLeft, Modifiers::NONE));
    assert!(!ed.has_undo());
}

#[test]
fn test_nudge_at_border_is_clamped() {
    let mut ed = editor_with(vec![boxed("a", 0.0, 0.0, 30.0, 30.0)]);
    ed.select_shape(id_at(&ed, 0));
    assert!(ed.key_pressed(Key::ArrowLeft, Modifiers::SHORTCUT));
    assert_eq!(
        ed.selected_shape().map(|s| s.item().bounds()),
        Some(BoundBox::new(0.0, 0.0, 30.0, 30.0))
    );
    assert!(!ed.has_undo());
}

#[test]
fn test_prefix_assigns_recent_label() {
    let mut ed = ShapeEditor::new(
        100,
        100,
        settings(),
        RecentLabels::from_labels(["dog", "cat", "car"]),
    );
    ed.load_objects(vec![boxed("", 10.0, 10.0, 60.0, 50.0)]);
    ed.select_shape(id_at(&ed, 0));

    let t0 = Instant::now();
    assert!(ed.key_typed('c', t0));
    assert_eq!(ed.selected_model().map(|m| m.name.as_str()), Some("cat"));
    ed.key_typed('A', t0 + Duration::from_millis(100));
    ed.key_typed('r', t0 + Duration::from_millis(200));
    assert_eq!(ed.selected_model().map(|m| m.name.as_str()), Some("car"));

    // One merged entry for the whole prefix.
    ed.undo();
    assert_eq!(ed.selected_model().map(|m| m.name.as_str()), Some(""));
    assert!(!ed.has_undo());
}

#[test]
fn test_prefix_expires() {
    let mut ed = ShapeEditor::new(100, 100, settings(), RecentLabels::from_labels(["dog", "cat"]));
    ed.load_objects(vec![boxed("", 10.0, 10.0, 60.0, 50.0)]);
    ed.select_shape(id_at(&ed, 0));

    let t0 = Instant::now();
    ed.key_typed('c', t0);
    ed.key_typed('d', t0 + Duration::from_millis(600));
    assert_eq!(ed.selected_model().map(|m| m.name.as_str()), Some("dog"));
}

// ============================================================================
// Hints
// ============================================================================

#[test]
fn test_hint_select_and_accept() {
    let mut ed = editor();
    ed.set_hints(vec![Hint::new(
        "dog",
        BoundBox::new(20.0, 20.0, 70.0, 70.0),
        0.9,
    )]);
    click(&mut ed, 30.0, 30.0, 1);
    assert_eq!(ed.selection(), Selection::Hint(0));

    assert!(ed.key_pressed(Key::Enter, Modifiers::NONE));
    assert!(ed.hints().is_empty());
    assert_eq!(ed.shapes().len(), 1);
    assert_eq!(ed.selected_model().map(|m| m.name.as_str()), Some("dog"));
    assert_eq!(ed.labels().most_recent(), Some("dog"));

    ed.undo();
    assert!(ed.shapes().is_empty());
}

#[test]
fn test_hint_clamped_below_min_size_is_rejected() {
    let mut ed = editor();
    ed.set_hints(vec![Hint::new(
        "dog",
        BoundBox::new(95.0, 95.0, 150.0, 150.0),
        0.9,
    )]);
    ed.drain_events();

    assert_eq!(ed.accept_hint(0), None);
    assert!(ed.shapes().is_empty());
    assert_eq!(ed.hints().len(), 1);
    assert!(!ed.has_undo());
    let events = ed.drain_events();
    assert!(events.contains(&EditorEvent::Status("Shape too small".into())));
    assert!(!events.contains(&EditorEvent::HintsChanged));
}

#[test]
fn test_selecting_shape_deselects_hint() {
    let mut ed = editor_with(vec![boxed("a", 60.0, 60.0, 90.0, 90.0)]);
    ed.set_hints(vec![Hint::new("dog", BoundBox::new(0.0, 0.0, 30.0, 30.0), 0.5)]);
    ed.select_hint(0);
    ed.select_shape(id_at(&ed, 0));
    assert_eq!(ed.selection(), Selection::Shape(id_at(&ed, 0)));

    ed.select_hint(0);
    assert_eq!(ed.selection(), Selection::Hint(0));
    assert_eq!(*ed.state(), EditState::Idle);
}
