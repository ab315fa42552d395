//! Headless [`SceneAdapter`] that keeps the scene in memory.
//!
//! Image decoding is simulated: `load_image` and restores that reference
//! uncached images queue a job, and the host (or a test) finishes it with
//! `complete_load`. A restore swaps the whole object list in one step once
//! every image it needs is decoded, so a failed restore leaves the previous
//! scene untouched.
//!
//! The `select`, `click_empty`, `drag` and `draw_path` helpers stand in for
//! pointer input and emit the same events a browser engine would.

use crate::adapter::{
    Brush, ImageInfo, LoadError, LoadTicket, LoadedImage, SceneAdapter, SceneEvent,
};
use canvo_core::{
    Affine, Attribute, Drawable, DrawableKind, ObjectId, PathCmd, Point, Rect, Size, Snapshot,
};
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug)]
enum LoadJob {
    Image {
        ticket: LoadTicket,
        src: String,
    },
    Restore {
        ticket: LoadTicket,
        objects: Vec<Drawable>,
        waiting: Vec<String>,
    },
}

#[derive(Debug)]
pub struct MemoryScene {
    objects: Vec<Drawable>,
    active: SmallVec<[ObjectId; 4]>,
    events: Vec<SceneEvent>,
    canvas_size: Size,
    viewport: Affine,
    brush: Option<Brush>,
    decoded: HashMap<String, ImageInfo>,
    jobs: Vec<LoadJob>,
    next_ticket: u64,
    render_count: u64,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0))
    }
}

impl MemoryScene {
    pub fn new(canvas_size: Size) -> Self {
        Self {
            objects: Vec::new(),
            active: SmallVec::new(),
            events: Vec::new(),
            canvas_size,
            viewport: Affine::IDENTITY,
            brush: None,
            decoded: HashMap::new(),
            jobs: Vec::new(),
            next_ticket: 1,
            render_count: 0,
        }
    }

    pub fn brush(&self) -> Option<Brush> {
        self.brush
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn is_decoded(&self, src: &str) -> bool {
        self.decoded.contains_key(src)
    }

    /// Drop every decoded image, so the next restore has to reload them.
    pub fn forget_images(&mut self) {
        self.decoded.clear();
    }

    /// Export the current scene as JSON.
    pub fn to_json(&self, keys: &[Attribute]) -> Result<String, canvo_core::SnapshotError> {
        self.serialize(keys)?.to_json()
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Click / shift-click / marquee selection.
    pub fn select(&mut self, ids: &[ObjectId]) {
        self.set_active_objects(ids);
    }

    /// Click on an empty part of the canvas.
    pub fn click_empty(&mut self) {
        self.discard_active_selection();
    }

    /// Drag an object by `(dx, dy)`.
    pub fn drag(&mut self, id: ObjectId, dx: f64, dy: f64) -> bool {
        self.update_object(id, &mut |d| {
            d.left += dx;
            d.top += dy;
        })
    }

    /// Finish a freehand stroke. Ignored unless a brush is set.
    pub fn draw_path(&mut self, path: Vec<PathCmd>) -> Option<ObjectId> {
        let brush = self.brush?;
        let bounds = path_bounds(&path)?;
        let mut d = Drawable::new(DrawableKind::Path { path });
        d.left = bounds.x0;
        d.top = bounds.y0;
        d.width = bounds.width();
        d.height = bounds.height();
        d.fill = None;
        d.stroke = Some(brush.color);
        d.stroke_width = brush.width;
        let id = d.id;
        self.add_object(d);
        Some(id)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn ticket(&mut self) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|d| d.id == id)
    }

    fn replace_selection(&mut self, next: SmallVec<[ObjectId; 4]>) {
        if next == self.active {
            return;
        }
        let was_empty = self.active.is_empty();
        self.active = next;
        let event = if self.active.is_empty() {
            SceneEvent::SelectionCleared
        } else if was_empty {
            SceneEvent::SelectionCreated(self.active.to_vec())
        } else {
            SceneEvent::SelectionUpdated(self.active.to_vec())
        };
        self.events.push(event);
    }

    fn swap_scene(&mut self, ticket: LoadTicket, objects: Vec<Drawable>) {
        self.discard_active_selection();
        self.objects = objects;
        for d in &self.objects {
            self.events.push(SceneEvent::ObjectAdded(d.id));
        }
        self.render();
        self.events.push(SceneEvent::RestoreFinished {
            ticket,
            result: Ok(()),
        });
    }
}

fn path_bounds(path: &[PathCmd]) -> Option<Rect> {
    let mut points = path.iter().flat_map(|cmd| -> SmallVec<[Point; 3]> {
        match *cmd {
            PathCmd::MoveTo(x, y) | PathCmd::LineTo(x, y) => smallvec::smallvec![Point::new(x, y)],
            PathCmd::QuadTo(x1, y1, x, y) => {
                smallvec::smallvec![Point::new(x1, y1), Point::new(x, y)]
            }
            PathCmd::CubicTo(x1, y1, x2, y2, x, y) => smallvec::smallvec![
                Point::new(x1, y1),
                Point::new(x2, y2),
                Point::new(x, y)
            ],
            PathCmd::Close => SmallVec::new(),
        }
    });
    let first = points.next()?;
    Some(points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
}

impl SceneAdapter for MemoryScene {
    fn objects(&self) -> &[Drawable] {
        &self.objects
    }

    fn active_objects(&self) -> Vec<ObjectId> {
        self.active.to_vec()
    }

    fn add_object(&mut self, drawable: Drawable) {
        let id = drawable.id;
        self.objects.push(drawable);
        self.events.push(SceneEvent::ObjectAdded(id));
    }

    fn remove_object(&mut self, id: ObjectId) -> Option<Drawable> {
        let index = self.index_of(id)?;
        let removed = self.objects.remove(index);
        self.events.push(SceneEvent::ObjectRemoved(id));
        if self.active.contains(&id) {
            let next = self.active.iter().copied().filter(|a| *a != id).collect();
            self.replace_selection(next);
        }
        Some(removed)
    }

    fn update_object(&mut self, id: ObjectId, edit: &mut dyn FnMut(&mut Drawable)) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let before = self.objects[index].clone();
        edit(&mut self.objects[index]);
        let changed = self.objects[index] != before;
        if changed {
            self.events.push(SceneEvent::ObjectModified(id));
        }
        changed
    }

    fn set_active_objects(&mut self, ids: &[ObjectId]) {
        let mut next: SmallVec<[ObjectId; 4]> = SmallVec::new();
        for id in ids {
            let known = self.objects.iter().any(|d| d.id == *id && d.selectable);
            if known && !next.contains(id) {
                next.push(*id);
            }
        }
        self.replace_selection(next);
    }

    fn discard_active_selection(&mut self) {
        self.replace_selection(SmallVec::new());
    }

    fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.objects.len() => {
                self.objects.swap(i, i + 1);
                self.events.push(SceneEvent::ObjectModified(id));
                true
            }
            _ => false,
        }
    }

    fn send_backwards(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                self.objects.swap(i - 1, i);
                self.events.push(SceneEvent::ObjectModified(id));
                true
            }
            _ => false,
        }
    }

    fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                let d = self.objects.remove(i);
                self.objects.insert(0, d);
                self.events.push(SceneEvent::ObjectModified(id));
                true
            }
            _ => false,
        }
    }

    fn render(&mut self) {
        self.render_count += 1;
    }

    fn deserialize(&mut self, snapshot: &Snapshot, keys: &[Attribute]) -> LoadTicket {
        let ticket = self.ticket();
        let objects = match snapshot.decode(keys) {
            Ok(objects) => objects,
            Err(err) => {
                log::warn!("snapshot restore failed: {err}");
                self.events.push(SceneEvent::RestoreFinished {
                    ticket,
                    result: Err(err.into()),
                });
                return ticket;
            }
        };
        let waiting: Vec<String> = snapshot
            .image_sources()
            .into_iter()
            .filter(|src| !self.decoded.contains_key(src))
            .collect();
        if waiting.is_empty() {
            self.swap_scene(ticket, objects);
        } else {
            log::debug!("restore {ticket:?} waiting on {} image(s)", waiting.len());
            self.jobs.push(LoadJob::Restore {
                ticket,
                objects,
                waiting,
            });
        }
        ticket
    }

    fn load_image(&mut self, src: &str) -> LoadTicket {
        let ticket = self.ticket();
        if let Some(info) = self.decoded.get(src).copied() {
            self.events.push(SceneEvent::ImageLoaded {
                ticket,
                result: Ok(LoadedImage {
                    src: src.to_string(),
                    info,
                }),
            });
        } else {
            self.jobs.push(LoadJob::Image {
                ticket,
                src: src.to_string(),
            });
        }
        ticket
    }

    fn complete_load(&mut self, src: &str, result: Result<ImageInfo, String>) {
        if let Ok(info) = &result {
            self.decoded.insert(src.to_string(), *info);
        }
        let jobs = std::mem::take(&mut self.jobs);
        for job in jobs {
            match job {
                LoadJob::Image { ticket, src: s } if s == src => {
                    let result = match &result {
                        Ok(info) => Ok(LoadedImage { src: s, info: *info }),
                        Err(reason) => Err(LoadError::new(s, reason.clone())),
                    };
                    self.events.push(SceneEvent::ImageLoaded { ticket, result });
                }
                LoadJob::Restore {
                    ticket,
                    objects,
                    mut waiting,
                } if waiting.iter().any(|w| w == src) => match &result {
                    Err(reason) => {
                        log::warn!("restore {ticket:?} aborted: `{src}` failed to load");
                        self.events.push(SceneEvent::RestoreFinished {
                            ticket,
                            result: Err(LoadError::new(src, reason.clone())),
                        });
                    }
                    Ok(_) => {
                        waiting.retain(|w| w != src);
                        if waiting.is_empty() {
                            self.swap_scene(ticket, objects);
                        } else {
                            self.jobs.push(LoadJob::Restore {
                                ticket,
                                objects,
                                waiting,
                            });
                        }
                    }
                },
                other => self.jobs.push(other),
            }
        }
    }

    fn pending_loads(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for job in &self.jobs {
            let srcs: &[String] = match job {
                LoadJob::Image { src, .. } => std::slice::from_ref(src),
                LoadJob::Restore { waiting, .. } => waiting,
            };
            for src in srcs {
                if !out.contains(src) {
                    out.push(src.clone());
                }
            }
        }
        out
    }

    fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    fn set_canvas_size(&mut self, size: Size) {
        self.canvas_size = size;
    }

    fn viewport_transform(&self) -> Affine {
        self.viewport
    }

    fn set_viewport_transform(&mut self, transform: Affine) {
        self.viewport = transform;
    }

    fn set_drawing_brush(&mut self, brush: Option<Brush>) {
        self.brush = brush;
    }

    fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvo_core::{Color, SNAPSHOT_KEYS};
    use pretty_assertions::assert_eq;

    fn rect() -> Drawable {
        let mut d = Drawable::new(DrawableKind::Rect);
        d.width = 10.0;
        d.height = 10.0;
        d
    }

    fn image(src: &str) -> Drawable {
        Drawable::new(DrawableKind::Image(canvo_core::ImageProps {
            src: src.into(),
            ..Default::default()
        }))
    }

    #[test]
    fn update_without_change_is_silent() {
        let mut scene = MemoryScene::default();
        let d = rect();
        let id = d.id;
        scene.add_object(d);
        scene.drain_events();
        assert!(!scene.update_object(id, &mut |d| d.width = 10.0));
        assert!(scene.drain_events().is_empty());
        assert!(scene.update_object(id, &mut |d| d.width = 20.0));
        assert_eq!(scene.drain_events(), vec![SceneEvent::ObjectModified(id)]);
    }

    #[test]
    fn selection_events_follow_transitions() {
        let mut scene = MemoryScene::default();
        let (a, b) = (rect(), rect());
        let (ida, idb) = (a.id, b.id);
        scene.add_object(a);
        scene.add_object(b);
        scene.drain_events();

        scene.select(&[ida]);
        scene.select(&[ida, idb]);
        scene.remove_object(ida);
        scene.click_empty();
        assert_eq!(
            scene.drain_events(),
            vec![
                SceneEvent::SelectionCreated(vec![ida]),
                SceneEvent::SelectionUpdated(vec![ida, idb]),
                SceneEvent::ObjectRemoved(ida),
                SceneEvent::SelectionUpdated(vec![idb]),
                SceneEvent::SelectionCleared,
            ]
        );
    }

    #[test]
    fn workspace_is_not_selectable() {
        let mut scene = MemoryScene::default();
        scene.add_object(Drawable::workspace(Size::new(100.0, 100.0), Color::WHITE));
        scene.select(&[ObjectId::intern("clip")]);
        assert!(scene.active_objects().is_empty());
    }

    #[test]
    fn restore_waits_for_images() {
        let mut scene = MemoryScene::default();
        scene.add_object(image("a.png"));
        let snap = scene.serialize(SNAPSHOT_KEYS).unwrap();
        scene.add_object(rect());
        scene.drain_events();

        let ticket = scene.deserialize(&snap, SNAPSHOT_KEYS);
        assert_eq!(scene.pending_loads(), vec!["a.png".to_string()]);
        assert_eq!(scene.objects().len(), 2);
        assert!(scene.drain_events().is_empty());

        scene.complete_load("a.png", Ok(ImageInfo { width: 4.0, height: 3.0 }));
        assert_eq!(scene.objects().len(), 1);
        let events = scene.drain_events();
        assert_eq!(
            events.last(),
            Some(&SceneEvent::RestoreFinished {
                ticket,
                result: Ok(())
            })
        );
        assert!(scene.pending_loads().is_empty());
    }

    #[test]
    fn failed_restore_keeps_old_scene() {
        let mut scene = MemoryScene::default();
        scene.add_object(image("broken.png"));
        let snap = scene.serialize(SNAPSHOT_KEYS).unwrap();
        scene.add_object(rect());
        scene.drain_events();

        let ticket = scene.deserialize(&snap, SNAPSHOT_KEYS);
        scene.complete_load("broken.png", Err("404".into()));
        assert_eq!(scene.objects().len(), 2);
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::RestoreFinished {
                ticket,
                result: Err(LoadError::new("broken.png", "404")),
            }]
        );
    }

    #[test]
    fn cached_image_loads_immediately() {
        let mut scene = MemoryScene::default();
        let first = scene.load_image("a.png");
        scene.complete_load("a.png", Ok(ImageInfo { width: 2.0, height: 2.0 }));
        let second = scene.load_image("a.png");
        let tickets: Vec<LoadTicket> = scene
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SceneEvent::ImageLoaded { ticket, result } => {
                    assert!(result.is_ok());
                    Some(ticket)
                }
                _ => None,
            })
            .collect();
        assert_eq!(tickets, vec![first, second]);
    }

    #[test]
    fn drawing_requires_brush() {
        let mut scene = MemoryScene::default();
        let path = vec![PathCmd::MoveTo(1.0, 2.0), PathCmd::LineTo(11.0, 7.0)];
        assert_eq!(scene.draw_path(path.clone()), None);

        scene.set_drawing_brush(Some(Brush {
            width: 3.0,
            color: Color::BLACK,
        }));
        let id = scene.draw_path(path).unwrap();
        let d = scene.object(id).unwrap();
        assert_eq!((d.left, d.top, d.width, d.height), (1.0, 2.0, 10.0, 5.0));
        assert_eq!(d.stroke_width, 3.0);
    }

    #[test]
    fn z_order_moves() {
        let mut scene = MemoryScene::default();
        let (a, b, c) = (rect(), rect(), rect());
        let ids = [a.id, b.id, c.id];
        for d in [a, b, c] {
            scene.add_object(d);
        }
        assert!(scene.bring_forward(ids[0]));
        assert!(scene.bring_forward(ids[0]));
        assert!(!scene.bring_forward(ids[0]));
        assert_eq!(scene.objects()[2].id, ids[0]);
        assert!(scene.send_to_back(ids[2]));
        assert_eq!(scene.objects()[0].id, ids[2]);
        assert!(!scene.send_backwards(ids[2]));
    }
}
