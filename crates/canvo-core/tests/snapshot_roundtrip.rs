//! Integration tests: scene → snapshot JSON → scene round-trip.
//!
//! Verifies that every drawable variant survives capture, JSON transport
//! and decode with the shared allow-list, and that IDs are preserved.

use canvo_core::presets::build_text;
use canvo_core::snapshot::SNAPSHOT_VERSION;
use canvo_core::*;
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn full_scene() -> Vec<Drawable> {
    let defaults = StyleDefaults {
        fill_color: Color::from_rgba8(59, 130, 246, 1.0),
        stroke_color: Color::from_rgba8(0, 0, 0, 0.5),
        stroke_width: 4.0,
        stroke_dash_array: smallvec::smallvec![6.0, 3.0],
        ..StyleDefaults::default()
    };
    let mut scene = vec![Drawable::workspace(Size::new(900.0, 1200.0), Color::WHITE)];
    scene.extend(ShapeKind::ALL.iter().map(|s| s.build(&defaults)));

    let mut heading = build_text("Title", &TextPreset::Heading.options(), &defaults);
    if let Some(t) = heading.text_mut() {
        t.underline = true;
        t.text_align = TextAlign::Center;
    }
    heading.angle = 15.0;
    scene.push(heading);

    let mut image = Drawable::new(DrawableKind::Image(ImageProps {
        src: "https://cdn.example.test/cat.png".into(),
        filters: smallvec::smallvec![ImageFilter::Vintage],
    }));
    image.width = 640.0;
    image.height = 480.0;
    image.scale_x = 2.5;
    image.scale_y = 2.5;
    image.opacity = 0.75;
    scene.push(image);

    let mut path = Drawable::new(DrawableKind::Path {
        path: vec![
            PathCmd::MoveTo(0.0, 0.0),
            PathCmd::QuadTo(5.0, 10.0, 20.0, 0.0),
            PathCmd::Close,
        ],
    });
    path.stroke = Some(Color::BLACK);
    scene.push(path);
    scene
}

// ─── Round-trip ──────────────────────────────────────────────────────────

#[test]
fn every_variant_survives_json() {
    let scene = full_scene();
    let json = Snapshot::capture(&scene, SNAPSHOT_KEYS)
        .unwrap()
        .to_json()
        .unwrap();
    let restored = Snapshot::from_json(&json)
        .unwrap()
        .decode(SNAPSHOT_KEYS)
        .unwrap();
    assert_eq!(restored, scene);
}

#[test]
fn ids_and_order_are_preserved() {
    let scene = full_scene();
    let snap = Snapshot::capture(&scene, SNAPSHOT_KEYS).unwrap();
    let ids: Vec<ObjectId> = scene.iter().map(|d| d.id).collect();
    assert_eq!(snap.object_ids(), ids);
    assert_eq!(snap.object_ids()[0], ObjectId::intern(WORKSPACE_NAME));
}

#[test]
fn json_shape_is_flat_and_tagged() {
    let snap = Snapshot::capture(&full_scene(), SNAPSHOT_KEYS).unwrap();
    let value: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();

    assert_eq!(value["version"], SNAPSHOT_VERSION);
    let ws = &value["objects"][0];
    assert_eq!(ws["type"], "rect");
    assert_eq!(ws["name"], "clip");
    assert_eq!(ws["selectable"], false);
    assert_eq!(ws["fill"], "#FFFFFF");

    let circle = &value["objects"][3];
    assert_eq!(circle["type"], "circle");
    assert_eq!(circle["radius"], 225.0);
    assert_eq!(circle["stroke"], "rgba(0,0,0,0.5)");
    assert_eq!(circle["strokeDashArray"], serde_json::json!([6.0, 3.0]));

    assert_eq!(value["workspace"]["width"], 900.0);
}

#[test]
fn hand_written_record_fills_defaults() {
    let json = r##"{
        "version": 1,
        "objects": [
            { "type": "textbox", "id": "note", "text": "hi", "fill": "rgb(255, 0, 0)" }
        ]
    }"##;
    let objects = Snapshot::from_json(json)
        .unwrap()
        .decode(SNAPSHOT_KEYS)
        .unwrap();
    let note = &objects[0];
    assert_eq!(note.id, ObjectId::intern("note"));
    assert_eq!(note.fill, Some(Color::from_rgba8(255, 0, 0, 1.0)));
    assert_eq!(note.opacity, 1.0);
    let t = note.text().unwrap();
    assert_eq!(t.font_family, "Arial");
    assert_eq!(t.font_size, 32.0);
}
