//! WASM bridge for Canvo. Exposes the editor facade to the browser UI.
//!
//! Compiled via `wasm-pack build --target web`. The JS side renders the
//! scene from `scene_json()`, decodes images listed by `pending_images()`
//! and reports each decode back through `image_loaded` / `image_failed`.

use canvo_core::{
    Color, EditorConfig, FontStyle, ShapeKind, Size, TextAlign, TextOptions, TextPreset,
    parse_css_color,
};
use canvo_editor::{Editor, EditorError, ImageInfo, MemoryScene, SceneAdapter, ShortcutMap};
use wasm_bindgen::prelude::*;

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn color(value: &str) -> Result<Color, JsValue> {
    parse_css_color(value).map_err(js_err)
}

fn shape_from_name(name: &str) -> Option<ShapeKind> {
    Some(match name {
        "rectangle" => ShapeKind::Rectangle,
        "soft-rectangle" => ShapeKind::SoftRectangle,
        "circle" => ShapeKind::Circle,
        "triangle" => ShapeKind::Triangle,
        "inverse-triangle" => ShapeKind::InverseTriangle,
        "diamond" => ShapeKind::Diamond,
        _ => return None,
    })
}

fn preset_from_name(name: &str) -> Option<TextPreset> {
    Some(match name {
        "textbox" => TextPreset::Textbox,
        "heading" => TextPreset::Heading,
        "subheading" => TextPreset::Subheading,
        "paragraph" => TextPreset::Paragraph,
        _ => return None,
    })
}

fn align_from_name(name: &str) -> Option<TextAlign> {
    Some(match name {
        "left" => TextAlign::Left,
        "center" => TextAlign::Center,
        "right" => TextAlign::Right,
        "justify" => TextAlign::Justify,
        _ => return None,
    })
}

fn align_name(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
        TextAlign::Justify => "justify",
    }
}

/// The browser-facing editor.
///
/// Owns an `Editor` over the in-memory scene. All interaction from the UI
/// goes through this struct.
#[wasm_bindgen]
pub struct CanvoEditor {
    editor: Editor<MemoryScene>,
}

#[wasm_bindgen]
impl CanvoEditor {
    /// Create an editor sized to its container. `config_json` may be empty.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: &str) -> Result<CanvoEditor, JsValue> {
        console_error_panic_hook_setup();
        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).map_err(js_err)?
        };
        let container = Size::new(width, height);
        let editor =
            Editor::init(MemoryScene::new(container), container, config).map_err(js_err)?;
        Ok(Self { editor })
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.editor.resize(Size::new(width, height))
    }

    pub fn auto_zoom(&mut self) -> bool {
        self.editor.auto_zoom()
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.editor.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.editor.zoom_out()
    }

    /// Viewport transform as `[a, b, c, d, e, f]`.
    pub fn viewport_transform(&self) -> Vec<f64> {
        self.editor.scene().viewport_transform().as_coeffs().to_vec()
    }

    // ─── Scene ───────────────────────────────────────────────────────────

    /// Current scene as snapshot JSON.
    pub fn scene_json(&self) -> Result<String, JsValue> {
        self.editor
            .snapshot()
            .and_then(|s| s.to_json().map_err(EditorError::from))
            .map_err(js_err)
    }

    pub fn selected_ids(&self) -> js_sys::Array {
        self.editor
            .selected_objects()
            .iter()
            .map(|id| JsValue::from_str(id.as_str()))
            .collect()
    }

    pub fn is_busy(&self) -> bool {
        self.editor.is_busy()
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Add a shape by name (`rectangle`, `soft-rectangle`, `circle`,
    /// `triangle`, `inverse-triangle`, `diamond`). Returns its ID.
    pub fn add_shape(&mut self, name: &str) -> Result<String, JsValue> {
        let shape = shape_from_name(name).ok_or_else(|| js_err(format!("unknown shape `{name}`")))?;
        let id = self.editor.add_shape(shape).map_err(js_err)?;
        Ok(id.to_string())
    }

    /// Add text with a preset (`textbox`, `heading`, `subheading`, `paragraph`).
    pub fn add_text(&mut self, text: &str, preset: &str) -> Result<String, JsValue> {
        let options = preset_from_name(preset)
            .map(TextPreset::options)
            .unwrap_or_else(TextOptions::default);
        let id = self.editor.add_text(text, &options).map_err(js_err)?;
        Ok(id.to_string())
    }

    pub fn add_image(&mut self, src: &str) -> Result<(), JsValue> {
        self.editor.add_image(src).map(|_| ()).map_err(js_err)
    }

    /// Image sources the host still has to decode.
    pub fn pending_images(&self) -> js_sys::Array {
        self.editor
            .scene()
            .pending_loads()
            .into_iter()
            .map(|src| JsValue::from_str(&src))
            .collect()
    }

    pub fn image_loaded(&mut self, src: &str, width: f64, height: f64) -> Result<(), JsValue> {
        self.editor
            .complete_image_load(src, Ok(ImageInfo { width, height }))
            .map_err(js_err)
    }

    pub fn image_failed(&mut self, src: &str, reason: &str) -> Result<(), JsValue> {
        log::warn!("image decode failed for {src}: {reason}");
        self.editor
            .complete_image_load(src, Err(reason.to_string()))
            .map_err(js_err)
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    pub fn delete(&mut self) -> Result<usize, JsValue> {
        self.editor.delete().map_err(js_err)
    }

    pub fn select_all(&mut self) -> Result<usize, JsValue> {
        self.editor.select_all().map_err(js_err)
    }

    pub fn bring_forward(&mut self) -> Result<bool, JsValue> {
        self.editor.bring_forward().map_err(js_err)
    }

    pub fn send_backwards(&mut self) -> Result<bool, JsValue> {
        self.editor.send_backwards().map_err(js_err)
    }

    pub fn copy(&mut self) -> Result<bool, JsValue> {
        self.editor.copy().map_err(js_err)
    }

    pub fn paste(&mut self) -> Result<usize, JsValue> {
        self.editor.paste().map_err(js_err)
    }

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.editor.undo().map_err(js_err)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.editor.redo().map_err(js_err)
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    pub fn change_size(&mut self, width: f64, height: f64) -> Result<bool, JsValue> {
        self.editor
            .change_size(Size::new(width, height))
            .map_err(js_err)
    }

    pub fn change_background(&mut self, value: &str) -> Result<bool, JsValue> {
        let c = color(value)?;
        self.editor.change_background(c).map_err(js_err)
    }

    pub fn enable_drawing_mode(&mut self) -> Result<(), JsValue> {
        self.editor.enable_drawing_mode().map_err(js_err)
    }

    pub fn disable_drawing_mode(&mut self) {
        self.editor.disable_drawing_mode();
    }

    // ─── Styling ─────────────────────────────────────────────────────────

    pub fn change_fill_color(&mut self, value: &str) -> Result<usize, JsValue> {
        let c = color(value)?;
        self.editor.change_fill_color(c).map_err(js_err)
    }

    pub fn change_stroke_color(&mut self, value: &str) -> Result<usize, JsValue> {
        let c = color(value)?;
        self.editor.change_stroke_color(c).map_err(js_err)
    }

    pub fn change_stroke_width(&mut self, width: f64) -> Result<usize, JsValue> {
        self.editor.change_stroke_width(width).map_err(js_err)
    }

    pub fn change_stroke_dash_array(&mut self, dash: Vec<f64>) -> Result<usize, JsValue> {
        self.editor.change_stroke_dash_array(&dash).map_err(js_err)
    }

    pub fn change_opacity(&mut self, opacity: f64) -> Result<usize, JsValue> {
        self.editor.change_opacity(opacity).map_err(js_err)
    }

    pub fn change_font_family(&mut self, family: &str) -> Result<usize, JsValue> {
        self.editor.change_font_family(family).map_err(js_err)
    }

    pub fn change_font_size(&mut self, size: f64) -> Result<usize, JsValue> {
        self.editor.change_font_size(size).map_err(js_err)
    }

    pub fn change_font_weight(&mut self, weight: u16) -> Result<usize, JsValue> {
        self.editor.change_font_weight(weight).map_err(js_err)
    }

    pub fn change_font_style(&mut self, italic: bool) -> Result<usize, JsValue> {
        let style = if italic {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        };
        self.editor.change_font_style(style).map_err(js_err)
    }

    pub fn change_font_underline(&mut self, value: bool) -> Result<usize, JsValue> {
        self.editor.change_font_underline(value).map_err(js_err)
    }

    pub fn change_font_linethrough(&mut self, value: bool) -> Result<usize, JsValue> {
        self.editor.change_font_linethrough(value).map_err(js_err)
    }

    pub fn change_text_align(&mut self, align: &str) -> Result<usize, JsValue> {
        let align =
            align_from_name(align).ok_or_else(|| js_err(format!("unknown alignment `{align}`")))?;
        self.editor.change_text_align(align).map_err(js_err)
    }

    pub fn change_image_filter(&mut self, name: &str) -> Result<usize, JsValue> {
        self.editor.change_image_filter(name).map_err(js_err)
    }

    // ─── Getters ─────────────────────────────────────────────────────────

    pub fn active_fill_color(&self) -> String {
        self.editor.active_fill_color().to_css()
    }

    pub fn active_stroke_color(&self) -> String {
        self.editor.active_stroke_color().to_css()
    }

    pub fn active_stroke_width(&self) -> f64 {
        self.editor.active_stroke_width()
    }

    pub fn active_stroke_dash_array(&self) -> Vec<f64> {
        self.editor.active_stroke_dash_array().to_vec()
    }

    pub fn active_opacity(&self) -> f64 {
        self.editor.active_opacity()
    }

    pub fn active_font_family(&self) -> String {
        self.editor.active_font_family()
    }

    pub fn active_font_size(&self) -> f64 {
        self.editor.active_font_size()
    }

    pub fn active_font_weight(&self) -> u16 {
        self.editor.active_font_weight()
    }

    pub fn active_font_italic(&self) -> bool {
        self.editor.active_font_style() == FontStyle::Italic
    }

    pub fn active_font_underline(&self) -> bool {
        self.editor.active_font_underline()
    }

    pub fn active_font_linethrough(&self) -> bool {
        self.editor.active_font_linethrough()
    }

    pub fn active_text_align(&self) -> String {
        align_name(self.editor.active_text_align()).to_string()
    }

    pub fn selected_image_source(&self) -> Option<String> {
        self.editor.selected_image_source()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key event. Returns JSON: `{"handled":bool,"changed":bool}`.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return serde_json::json!({ "handled": false, "changed": false }).to_string();
        };
        let changed = match self.editor.run_shortcut(action) {
            Ok(changed) => changed,
            Err(err) => {
                log::warn!("shortcut {action:?} failed: {err}");
                false
            }
        };
        serde_json::json!({
            "handled": true,
            "action": action.name(),
            "changed": changed,
        })
        .to_string()
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Canvo WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
