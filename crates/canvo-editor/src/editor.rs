//! The editor facade.
//!
//! `Editor` owns the engine, the history, the selection mirror, the
//! clipboard and the session style defaults. It is the only way UI code
//! touches the scene: every command runs as one capture batch, so a call
//! leaves at most one new history entry behind.

use crate::adapter::{Brush, ImageInfo, LoadTicket, LoadedImage, SceneAdapter};
use crate::clipboard::Clipboard;
use crate::error::{EditorError, EditorResult};
use crate::history::History;
use crate::selection::SelectionTracker;
use crate::viewport;
use canvo_core::presets::{self, build_text};
use canvo_core::{
    Color, DashPattern, Drawable, EditorConfig, FontStyle, ImageFilter, ObjectId, Point,
    SNAPSHOT_KEYS, ShapeKind, Size, Snapshot, StyleDefaults, TextAlign, TextOptions, TextPreset,
    TextProps,
};

type SelectionHook = Box<dyn FnMut()>;

pub struct Editor<S: SceneAdapter> {
    pub(crate) scene: S,
    pub(crate) history: History,
    pub(crate) selection: SelectionTracker,
    pub(crate) clipboard: Clipboard,
    pub(crate) config: EditorConfig,
    pub(crate) defaults: StyleDefaults,
    pub(crate) container: Size,
    pub(crate) drawing: bool,
    /// `add_image` requests still waiting for their decode.
    pub(crate) pending_images: Vec<LoadTicket>,
    /// Decoded images that arrived during a restore.
    pub(crate) deferred_images: Vec<LoadedImage>,
    /// Selection to re-apply once the running restore lands.
    pub(crate) restore_selection: Vec<ObjectId>,
    pub(crate) selection_cleared: Option<SelectionHook>,
}

impl<S: SceneAdapter> Editor<S> {
    /// Create the workspace, fit it to `container` and seed the history
    /// with the resulting scene.
    pub fn init(mut scene: S, container: Size, config: EditorConfig) -> EditorResult<Self> {
        config.validate()?;
        scene.set_canvas_size(container);
        if scene.workspace().is_none() {
            let mut workspace = Drawable::workspace(config.workspace.size(), config.workspace.fill);
            let center = Point::new(container.width / 2.0, container.height / 2.0);
            scene.center_on(&mut workspace, center);
            scene.add_object(workspace);
        }
        // Everything up to here is the initial state, not an edit.
        scene.drain_events();
        let initial = scene.serialize(SNAPSHOT_KEYS)?;

        let mut selection = SelectionTracker::default();
        selection.on_created(&scene.active_objects());

        let mut editor = Self {
            scene,
            history: History::new(initial),
            selection,
            clipboard: Clipboard::default(),
            defaults: config.defaults.clone(),
            config,
            container,
            drawing: false,
            pending_images: Vec::new(),
            deferred_images: Vec::new(),
            restore_selection: Vec::new(),
            selection_cleared: None,
        };
        editor.auto_zoom();
        log::debug!("editor ready, container {}x{}", container.width, container.height);
        Ok(editor)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn selected_objects(&self) -> &[ObjectId] {
        self.selection.selected()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    pub fn workspace(&self) -> Option<&Drawable> {
        self.scene.workspace()
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn zoom(&self) -> f64 {
        self.scene.zoom()
    }

    /// `true` while a history restore is in flight.
    pub fn is_busy(&self) -> bool {
        self.history.is_replaying()
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.drawing
    }

    /// Tickets of `add_image` calls whose decode hasn't finished.
    pub fn pending_images(&self) -> &[LoadTicket] {
        &self.pending_images
    }

    /// The current scene, captured with the history allow-list.
    pub fn snapshot(&self) -> EditorResult<Snapshot> {
        Ok(self.scene.serialize(SNAPSHOT_KEYS)?)
    }

    /// Called on every "selection cleared" event.
    pub fn on_selection_cleared(&mut self, hook: impl FnMut() + 'static) {
        self.selection_cleared = Some(Box::new(hook));
    }

    // ─── Batching ────────────────────────────────────────────────────────

    fn ensure_idle(&self) -> EditorResult<()> {
        if self.history.is_replaying() {
            log::warn!("command rejected: history restore in flight");
            return Err(EditorError::Busy);
        }
        Ok(())
    }

    /// Run `f` as one capture batch. Rejected while a restore is in flight.
    pub(crate) fn transact<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> EditorResult<R> {
        self.ensure_idle()?;
        self.batched(f)
    }

    fn batched<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> EditorResult<R> {
        self.history.begin_batch();
        let out = f(self);
        self.pump();
        self.history.end_batch(&self.scene)?;
        Ok(out)
    }

    /// Feed user input to the engine (drag, click, freehand stroke) and
    /// record what it changed as one entry. Input during a restore is
    /// delivered but not recorded.
    pub fn interact<R>(&mut self, input: impl FnOnce(&mut S) -> R) -> EditorResult<R> {
        self.batched(|ed| input(&mut ed.scene))
    }

    /// Report the outcome of an image decode the engine asked for.
    pub fn complete_image_load(
        &mut self,
        src: &str,
        result: Result<ImageInfo, String>,
    ) -> EditorResult<()> {
        self.batched(|ed| ed.scene.complete_load(src, result))
    }

    // ─── Creation ────────────────────────────────────────────────────────

    pub(crate) fn add_to_canvas(&mut self, mut drawable: Drawable) -> ObjectId {
        if let Some(center) = self.scene.workspace().map(Drawable::center) {
            self.scene.center_on(&mut drawable, center);
        }
        let id = drawable.id;
        self.scene.add_object(drawable);
        self.scene.set_active_object(id);
        self.scene.render();
        id
    }

    pub fn add_shape(&mut self, shape: ShapeKind) -> EditorResult<ObjectId> {
        let drawable = shape.build(&self.defaults);
        self.transact(|ed| ed.add_to_canvas(drawable))
    }

    pub fn add_rectangle(&mut self) -> EditorResult<ObjectId> {
        self.add_shape(ShapeKind::Rectangle)
    }

    pub fn add_soft_rectangle(&mut self) -> EditorResult<ObjectId> {
        self.add_shape(ShapeKind::SoftRectangle)
    }

    pub fn add_circle(&mut self) -> EditorResult<ObjectId> {
        self.add_shape(ShapeKind::Circle)
    }

    pub fn add_triangle(&mut self) -> EditorResult<ObjectId> {
        self.add_shape(ShapeKind::Triangle)
    }

    pub fn add_inverse_triangle(&mut self) -> EditorResult<ObjectId> {
        self.add_shape(ShapeKind::InverseTriangle)
    }

    pub fn add_diamond(&mut self) -> EditorResult<ObjectId> {
        self.add_shape(ShapeKind::Diamond)
    }

    pub fn add_text(&mut self, text: &str, options: &TextOptions) -> EditorResult<ObjectId> {
        let drawable = build_text(text, options, &self.defaults);
        self.transact(|ed| ed.add_to_canvas(drawable))
    }

    pub fn add_text_preset(&mut self, preset: TextPreset) -> EditorResult<ObjectId> {
        self.add_text(preset.label(), &preset.options())
    }

    /// Ask the engine to decode `src`. The image is inserted when the decode
    /// completes, scaled to the workspace height and selected.
    pub fn add_image(&mut self, src: &str) -> EditorResult<LoadTicket> {
        self.transact(|ed| {
            let ticket = ed.scene.load_image(src);
            ed.pending_images.push(ticket);
            ticket
        })
    }

    // ─── Selection / deletion / z-order ──────────────────────────────────

    /// Remove every active object. Returns how many were removed.
    pub fn delete(&mut self) -> EditorResult<usize> {
        self.transact(|ed| {
            let ids = ed.scene.active_objects();
            if ids.is_empty() {
                return 0;
            }
            let removed = ids
                .into_iter()
                .filter(|id| ed.scene.remove_object(*id).is_some())
                .count();
            ed.scene.discard_active_selection();
            ed.scene.render();
            removed
        })
    }

    pub fn select_all(&mut self) -> EditorResult<usize> {
        self.transact(|ed| {
            let ids: Vec<ObjectId> = ed
                .scene
                .objects()
                .iter()
                .filter(|d| d.selectable && !d.is_workspace())
                .map(|d| d.id)
                .collect();
            ed.scene.set_active_objects(&ids);
            ed.scene.render();
            ids.len()
        })
    }

    pub fn deselect(&mut self) -> EditorResult<()> {
        self.transact(|ed| {
            ed.scene.discard_active_selection();
            ed.scene.render();
        })
    }

    pub fn bring_forward(&mut self) -> EditorResult<bool> {
        self.reorder(|scene, id| scene.bring_forward(id))
    }

    pub fn send_backwards(&mut self) -> EditorResult<bool> {
        self.reorder(|scene, id| scene.send_backwards(id))
    }

    fn reorder(&mut self, step: impl Fn(&mut S, ObjectId) -> bool) -> EditorResult<bool> {
        self.transact(|ed| {
            let order = |scene: &S| scene.objects().iter().map(|d| d.id).collect::<Vec<_>>();
            let before = order(&ed.scene);
            for id in ed.scene.active_objects() {
                step(&mut ed.scene, id);
            }
            // The workspace always stays at the very back.
            if let Some(ws) = ed.scene.workspace().map(|w| w.id) {
                ed.scene.send_to_back(ws);
            }
            ed.scene.render();
            order(&ed.scene) != before
        })
    }

    // ─── Styling ─────────────────────────────────────────────────────────

    /// Apply `edit` to every active object `applies` accepts.
    fn restyle(
        &mut self,
        applies: impl Fn(&Drawable) -> bool,
        mut edit: impl FnMut(&mut Drawable),
    ) -> EditorResult<usize> {
        self.transact(|ed| {
            let mut changed = 0;
            for id in ed.scene.active_objects() {
                if ed.scene.object(id).is_some_and(&applies)
                    && ed.scene.update_object(id, &mut edit)
                {
                    changed += 1;
                }
            }
            ed.scene.render();
            changed
        })
    }

    fn restyle_text(&mut self, mut edit: impl FnMut(&mut TextProps)) -> EditorResult<usize> {
        self.restyle(Drawable::supports_text, |d| {
            if let Some(text) = d.text_mut() {
                edit(text);
            }
        })
    }

    pub fn change_fill_color(&mut self, color: Color) -> EditorResult<usize> {
        self.ensure_idle()?;
        self.defaults.fill_color = color;
        self.restyle(|_| true, |d| d.fill = Some(color))
    }

    /// Text has no outline, so on text this recolors the fill.
    pub fn change_stroke_color(&mut self, color: Color) -> EditorResult<usize> {
        self.ensure_idle()?;
        self.defaults.stroke_color = color;
        self.sync_brush();
        self.restyle(
            |_| true,
            |d| {
                if d.supports_stroke() {
                    d.stroke = Some(color);
                } else {
                    d.fill = Some(color);
                }
            },
        )
    }

    pub fn change_stroke_width(&mut self, width: f64) -> EditorResult<usize> {
        finite("stroke width", width)?;
        self.ensure_idle()?;
        self.defaults.stroke_width = width;
        self.sync_brush();
        self.restyle(|_| true, |d| d.stroke_width = width)
    }

    pub fn change_stroke_dash_array(&mut self, dash: &[f64]) -> EditorResult<usize> {
        for &segment in dash {
            finite("dash segment", segment)?;
        }
        self.ensure_idle()?;
        let dash: DashPattern = dash.iter().copied().collect();
        self.defaults.stroke_dash_array = dash.clone();
        self.restyle(|_| true, |d| d.stroke_dash_array = dash.clone())
    }

    pub fn change_opacity(&mut self, opacity: f64) -> EditorResult<usize> {
        finite("opacity", opacity)?;
        self.restyle(|_| true, |d| d.opacity = opacity)
    }

    pub fn change_font_family(&mut self, family: &str) -> EditorResult<usize> {
        self.ensure_idle()?;
        self.defaults.font_family = family.to_string();
        self.restyle_text(|t| t.font_family = family.to_string())
    }

    pub fn change_font_size(&mut self, size: f64) -> EditorResult<usize> {
        finite("font size", size)?;
        self.restyle_text(|t| t.font_size = size)
    }

    pub fn change_font_weight(&mut self, weight: u16) -> EditorResult<usize> {
        self.restyle_text(|t| t.font_weight = weight)
    }

    pub fn change_font_style(&mut self, style: FontStyle) -> EditorResult<usize> {
        self.restyle_text(|t| t.font_style = style)
    }

    pub fn change_font_underline(&mut self, underline: bool) -> EditorResult<usize> {
        self.restyle_text(|t| t.underline = underline)
    }

    pub fn change_font_linethrough(&mut self, linethrough: bool) -> EditorResult<usize> {
        self.restyle_text(|t| t.linethrough = linethrough)
    }

    pub fn change_text_align(&mut self, align: TextAlign) -> EditorResult<usize> {
        self.restyle_text(|t| t.text_align = align)
    }

    /// Replace the filter of every selected image; `"none"` clears it.
    pub fn change_image_filter(&mut self, name: &str) -> EditorResult<usize> {
        let filter = ImageFilter::parse(name)?;
        self.restyle(Drawable::is_image, |d| {
            if let Some(image) = d.image_mut() {
                image.filters = filter.into_iter().collect();
            }
        })
    }

    // ─── Workspace ───────────────────────────────────────────────────────

    fn workspace_id(&self) -> Option<ObjectId> {
        let id = self.scene.workspace().map(|w| w.id);
        if id.is_none() {
            log::warn!("workspace command ignored: scene has no workspace");
        }
        id
    }

    /// Resize the workspace and refit it. `Ok(false)` if nothing changed or
    /// there is no workspace.
    pub fn change_size(&mut self, size: Size) -> EditorResult<bool> {
        finite("workspace width", size.width)?;
        finite("workspace height", size.height)?;
        let Some(id) = self.workspace_id() else {
            return Ok(false);
        };
        let changed = self.transact(|ed| {
            ed.scene.update_object(id, &mut |ws| {
                ws.width = size.width;
                ws.height = size.height;
                ws.scale_x = 1.0;
                ws.scale_y = 1.0;
            })
        })?;
        self.auto_zoom();
        Ok(changed)
    }

    pub fn change_background(&mut self, color: Color) -> EditorResult<bool> {
        let Some(id) = self.workspace_id() else {
            return Ok(false);
        };
        self.transact(|ed| {
            let changed = ed.scene.update_object(id, &mut |ws| ws.fill = Some(color));
            ed.scene.render();
            changed
        })
    }

    // ─── Drawing mode ────────────────────────────────────────────────────

    fn brush(&self) -> Brush {
        Brush {
            width: self.defaults.stroke_width,
            color: self.defaults.stroke_color,
        }
    }

    fn sync_brush(&mut self) {
        if self.drawing {
            let brush = self.brush();
            self.scene.set_drawing_brush(Some(brush));
        }
    }

    pub fn enable_drawing_mode(&mut self) -> EditorResult<()> {
        self.transact(|ed| {
            ed.scene.discard_active_selection();
            ed.drawing = true;
            ed.sync_brush();
            ed.scene.render();
        })
    }

    pub fn disable_drawing_mode(&mut self) {
        self.drawing = false;
        self.scene.set_drawing_brush(None);
        self.scene.render();
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Buffer the selected objects. `Ok(false)` with nothing selected.
    pub fn copy(&mut self) -> EditorResult<bool> {
        let objects: Vec<&Drawable> = self
            .selection
            .selected()
            .iter()
            .filter_map(|id| self.scene.object(*id))
            .collect();
        Ok(self.clipboard.copy(objects)?)
    }

    /// Insert fresh copies of the buffer, offset from where they were
    /// copied, and select them. Returns how many were pasted.
    pub fn paste(&mut self) -> EditorResult<usize> {
        self.ensure_idle()?;
        let items = self.clipboard.paste(self.config.paste_offset)?;
        if items.is_empty() {
            return Ok(0);
        }
        self.transact(|ed| {
            ed.scene.discard_active_selection();
            let ids: Vec<ObjectId> = items
                .into_iter()
                .map(|d| {
                    let id = d.id;
                    ed.scene.add_object(d);
                    id
                })
                .collect();
            ed.scene.set_active_objects(&ids);
            ed.scene.render();
            ids.len()
        })
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Start restoring the previous entry. `Ok(false)` at the oldest one;
    /// `Err(Busy)` while another restore runs.
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.ensure_idle()?;
        self.restore_selection = self.selection.selected().to_vec();
        let started = self.history.undo(&mut self.scene)?;
        self.pump();
        Ok(started)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        self.ensure_idle()?;
        self.restore_selection = self.selection.selected().to_vec();
        let started = self.history.redo(&mut self.scene)?;
        self.pump();
        Ok(started)
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// Fit the workspace into the container and center it.
    pub fn auto_zoom(&mut self) -> bool {
        let Some(bounds) = self.scene.workspace().map(Drawable::bounds) else {
            return false;
        };
        self.scene.set_canvas_size(self.container);
        let Some(transform) =
            viewport::fit_transform(self.container, bounds, self.config.zoom.fit_margin)
        else {
            return false;
        };
        self.scene.set_viewport_transform(transform);
        self.scene.render();
        true
    }

    pub fn resize(&mut self, container: Size) -> bool {
        self.container = container;
        self.auto_zoom()
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom_by(self.config.zoom.step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom_by(-self.config.zoom.step)
    }

    fn zoom_by(&mut self, delta: f64) -> f64 {
        let zoom = self.config.zoom.clamp(self.scene.zoom() + delta);
        let size = self.scene.canvas_size();
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        let transform = viewport::zoom_at(self.scene.viewport_transform(), center, zoom);
        self.scene.set_viewport_transform(transform);
        self.scene.render();
        zoom
    }

    // ─── Getters ─────────────────────────────────────────────────────────

    fn first_selected(&self) -> Option<&Drawable> {
        self.selection.first().and_then(|id| self.scene.object(id))
    }

    fn active_text(&self) -> Option<&TextProps> {
        self.first_selected().and_then(Drawable::text)
    }

    pub fn active_fill_color(&self) -> Color {
        self.first_selected()
            .and_then(|d| d.fill)
            .unwrap_or(self.defaults.fill_color)
    }

    pub fn active_stroke_color(&self) -> Color {
        self.first_selected()
            .and_then(|d| d.stroke)
            .unwrap_or(self.defaults.stroke_color)
    }

    pub fn active_stroke_width(&self) -> f64 {
        self.first_selected()
            .map_or(self.defaults.stroke_width, |d| d.stroke_width)
    }

    pub fn active_stroke_dash_array(&self) -> DashPattern {
        match self.first_selected() {
            Some(d) => d.stroke_dash_array.clone(),
            None => self.defaults.stroke_dash_array.clone(),
        }
    }

    pub fn active_opacity(&self) -> f64 {
        self.first_selected().map_or(presets::OPACITY, |d| d.opacity)
    }

    pub fn active_font_family(&self) -> String {
        self.active_text()
            .map_or_else(|| self.defaults.font_family.clone(), |t| t.font_family.clone())
    }

    pub fn active_font_size(&self) -> f64 {
        self.active_text().map_or(presets::FONT_SIZE, |t| t.font_size)
    }

    pub fn active_font_weight(&self) -> u16 {
        self.active_text().map_or(presets::FONT_WEIGHT, |t| t.font_weight)
    }

    pub fn active_font_style(&self) -> FontStyle {
        self.active_text().map(|t| t.font_style).unwrap_or_default()
    }

    pub fn active_font_underline(&self) -> bool {
        self.active_text().is_some_and(|t| t.underline)
    }

    pub fn active_font_linethrough(&self) -> bool {
        self.active_text().is_some_and(|t| t.linethrough)
    }

    pub fn active_text_align(&self) -> TextAlign {
        self.active_text().map(|t| t.text_align).unwrap_or_default()
    }

    /// Source of the first selected object, if it is an image.
    pub fn selected_image_source(&self) -> Option<String> {
        self.first_selected()
            .and_then(Drawable::image)
            .map(|image| image.src.clone())
    }
}

/// Non-finite numbers serialize as JSON `null`, which a snapshot restore
/// rejects.
fn finite(what: &'static str, value: f64) -> EditorResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        log::warn!("rejected {what} {value}");
        Err(EditorError::NonFinite { what, value })
    }
}
