//! The contract between the editor and a rendering engine.
//!
//! The engine owns the live object list, the active selection and the
//! viewport. It reports everything that happens to it (user drags, clicks,
//! programmatic edits, finished loads) as [`SceneEvent`]s, which the editor
//! drains after every call. Work that cannot finish synchronously (image
//! decoding, snapshot restore) is identified by a [`LoadTicket`] and reported
//! later through the same queue.

use canvo_core::{
    Affine, Attribute, Color, Drawable, ObjectId, Point, Size, Snapshot, SnapshotError,
};
use thiserror::Error;

/// Handle for one in-flight asynchronous engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

/// A resource the engine could not load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load `{src}`: {reason}")]
pub struct LoadError {
    pub src: String,
    pub reason: String,
}

impl LoadError {
    pub fn new(src: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            reason: reason.into(),
        }
    }
}

impl From<SnapshotError> for LoadError {
    fn from(err: SnapshotError) -> Self {
        Self::new("snapshot", err.to_string())
    }
}

/// Natural pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub src: String,
    pub info: ImageInfo,
}

/// Freehand drawing brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub width: f64,
    pub color: Color,
}

/// Notifications from the engine, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ObjectAdded(ObjectId),
    ObjectRemoved(ObjectId),
    ObjectModified(ObjectId),
    /// A selection appeared where there was none.
    SelectionCreated(Vec<ObjectId>),
    /// An existing selection changed.
    SelectionUpdated(Vec<ObjectId>),
    SelectionCleared,
    ImageLoaded {
        ticket: LoadTicket,
        result: Result<LoadedImage, LoadError>,
    },
    /// A snapshot restore started by [`SceneAdapter::deserialize`] is done.
    RestoreFinished {
        ticket: LoadTicket,
        result: Result<(), LoadError>,
    },
}

impl SceneEvent {
    /// Add, remove or modify: the events that make a history entry.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::ObjectAdded(_) | Self::ObjectRemoved(_) | Self::ObjectModified(_)
        )
    }
}

/// Rendering engine seen from the editor.
pub trait SceneAdapter {
    // ─── Queries ─────────────────────────────────────────────────────────

    /// Objects back to front.
    fn objects(&self) -> &[Drawable];

    fn object(&self, id: ObjectId) -> Option<&Drawable> {
        self.objects().iter().find(|d| d.id == id)
    }

    fn workspace(&self) -> Option<&Drawable> {
        self.objects().iter().find(|d| d.is_workspace())
    }

    fn active_objects(&self) -> Vec<ObjectId>;

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Append on top. Emits `ObjectAdded`.
    fn add_object(&mut self, drawable: Drawable);

    /// Emits `ObjectRemoved` (and a selection event if it was active).
    fn remove_object(&mut self, id: ObjectId) -> Option<Drawable>;

    /// Edit one object in place. Emits `ObjectModified` and returns `true`
    /// only if the edit changed something.
    fn update_object(&mut self, id: ObjectId, edit: &mut dyn FnMut(&mut Drawable)) -> bool;

    // ─── Selection ───────────────────────────────────────────────────────

    fn set_active_objects(&mut self, ids: &[ObjectId]);

    fn set_active_object(&mut self, id: ObjectId) {
        self.set_active_objects(&[id]);
    }

    fn discard_active_selection(&mut self);

    // ─── Z-order ─────────────────────────────────────────────────────────

    fn bring_forward(&mut self, id: ObjectId) -> bool;
    fn send_backwards(&mut self, id: ObjectId) -> bool;
    fn send_to_back(&mut self, id: ObjectId) -> bool;

    fn render(&mut self);

    // ─── Snapshots ───────────────────────────────────────────────────────

    fn serialize(&self, keys: &[Attribute]) -> Result<Snapshot, SnapshotError> {
        Snapshot::capture(self.objects(), keys)
    }

    /// Start replacing the whole scene with `snapshot`. Completion arrives
    /// as `RestoreFinished` with the returned ticket; until then the old
    /// scene stays in place.
    fn deserialize(&mut self, snapshot: &Snapshot, keys: &[Attribute]) -> LoadTicket;

    // ─── Images ──────────────────────────────────────────────────────────

    /// Start decoding `src`. Completion arrives as `ImageLoaded`.
    fn load_image(&mut self, src: &str) -> LoadTicket;

    /// Deliver the outcome of a decode started by `load_image` or by a
    /// restore that references `src`.
    fn complete_load(&mut self, src: &str, result: Result<ImageInfo, String>);

    /// Sources still waiting for `complete_load`.
    fn pending_loads(&self) -> Vec<String>;

    // ─── Viewport ────────────────────────────────────────────────────────

    fn center_on(&self, drawable: &mut Drawable, point: Point) {
        drawable.set_center(point);
    }

    fn canvas_size(&self) -> Size;
    fn set_canvas_size(&mut self, size: Size);
    fn viewport_transform(&self) -> Affine;
    fn set_viewport_transform(&mut self, transform: Affine);

    fn zoom(&self) -> f64 {
        self.viewport_transform().as_coeffs()[0]
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// `Some` enters freehand drawing mode with that brush.
    fn set_drawing_brush(&mut self, brush: Option<Brush>);

    /// Take every event queued since the last drain.
    fn drain_events(&mut self) -> Vec<SceneEvent>;
}
