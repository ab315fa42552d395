//! Drawable data model for Canvo scenes.
//!
//! A scene is an ordered list of `Drawable`s (back to front) plus one
//! distinguished workspace rectangle, recognised by its reserved name.
//! Every drawable shares the same common attributes (position, size,
//! rotation, fill/stroke, opacity); the closed `DrawableKind` set carries
//! the variant-specific ones. The serde layout is flat: one JSON object
//! per drawable with a `type` tag, so snapshots can filter attributes by
//! name.

use crate::color::Color;
use crate::filter::ImageFilter;
use crate::id::ObjectId;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Reserved name of the workspace object.
pub const WORKSPACE_NAME: &str = "clip";

/// Stroke dash pattern (alternating dash/gap lengths). Empty = solid.
pub type DashPattern = SmallVec<[f64; 4]>;

// ─── Text ────────────────────────────────────────────────────────────────

/// Italic or upright text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Text-only attributes of a textbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    /// CSS weight, 100..900.
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub underline: bool,
    pub linethrough: bool,
    pub text_align: TextAlign,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: crate::presets::FONT_FAMILY.into(),
            font_size: crate::presets::FONT_SIZE,
            font_weight: crate::presets::FONT_WEIGHT,
            font_style: FontStyle::Normal,
            underline: false,
            linethrough: false,
            text_align: TextAlign::Left,
        }
    }
}

// ─── Image ───────────────────────────────────────────────────────────────

/// Image-only attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    /// Pixel source (URL or data URI). The engine decodes it asynchronously.
    pub src: String,
    /// Post-processing filters. At most one is ever set by the editor.
    pub filters: SmallVec<[ImageFilter; 1]>,
}

// ─── Path data ───────────────────────────────────────────────────────────

/// A single path command (SVG-like but simplified).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),            // control, end
    CubicTo(f64, f64, f64, f64, f64, f64), // c1, c2, end
    Close,
}

// ─── Drawables ───────────────────────────────────────────────────────────

/// The closed set of drawable variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DrawableKind {
    Rect,
    /// Rectangle with corner radii.
    RoundedRect {
        #[serde(default)]
        rx: f64,
        #[serde(default)]
        ry: f64,
    },
    Circle {
        #[serde(default)]
        radius: f64,
    },
    /// Apex up.
    Triangle,
    /// Apex down (polygon).
    InvertedTriangle,
    /// Four-point polygon touching the midpoint of each side.
    Diamond,
    Textbox(TextProps),
    Image(ImageProps),
    /// Freehand brush output.
    Path {
        #[serde(default)]
        path: Vec<PathCmd>,
    },
}

impl DrawableKind {
    /// The serialized `type` tag, also used as the ID prefix.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::RoundedRect { .. } => "rounded-rect",
            Self::Circle { .. } => "circle",
            Self::Triangle => "triangle",
            Self::InvertedTriangle => "inverted-triangle",
            Self::Diamond => "diamond",
            Self::Textbox(_) => "textbox",
            Self::Image(_) => "image",
            Self::Path { .. } => "path",
        }
    }
}

/// A single object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawable {
    #[serde(default = "ObjectId::anonymous")]
    pub id: ObjectId,
    /// Only the workspace carries a name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub selectable: bool,
    #[serde(default = "default_true")]
    pub has_controls: bool,

    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    /// Unscaled width.
    #[serde(default)]
    pub width: f64,
    /// Unscaled height.
    #[serde(default)]
    pub height: f64,
    /// Rotation in degrees around the top-left corner.
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "unit")]
    pub scale_x: f64,
    #[serde(default = "unit")]
    pub scale_y: f64,

    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default)]
    pub stroke: Option<Color>,
    #[serde(default = "unit")]
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_dash_array: DashPattern,
    #[serde(default = "unit")]
    pub opacity: f64,

    #[serde(flatten)]
    pub kind: DrawableKind,
}

fn default_true() -> bool {
    true
}

fn unit() -> f64 {
    1.0
}

impl Drawable {
    /// A fresh drawable with a unique `<type>_<n>` ID and neutral attributes.
    pub fn new(kind: DrawableKind) -> Self {
        Self {
            id: ObjectId::with_prefix(kind.type_name()),
            name: None,
            selectable: true,
            has_controls: true,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            stroke_dash_array: DashPattern::new(),
            opacity: 1.0,
            kind,
        }
    }

    /// The fixed backing rectangle that defines the exportable area.
    pub fn workspace(size: Size, fill: Color) -> Self {
        let mut ws = Self::new(DrawableKind::Rect);
        ws.id = ObjectId::intern(WORKSPACE_NAME);
        ws.name = Some(WORKSPACE_NAME.into());
        ws.selectable = false;
        ws.has_controls = false;
        ws.width = size.width;
        ws.height = size.height;
        ws.fill = Some(fill);
        ws.stroke_width = 0.0;
        ws
    }

    pub fn is_workspace(&self) -> bool {
        self.name.as_deref() == Some(WORKSPACE_NAME)
    }

    // ─── Capabilities ────────────────────────────────────────────────────

    pub fn supports_text(&self) -> bool {
        matches!(self.kind, DrawableKind::Textbox(_))
    }

    /// Text is painted with its fill; it has no outline to recolor.
    pub fn supports_stroke(&self) -> bool {
        !self.supports_text()
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, DrawableKind::Image(_))
    }

    pub fn text(&self) -> Option<&TextProps> {
        match &self.kind {
            DrawableKind::Textbox(props) => Some(props),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextProps> {
        match &mut self.kind {
            DrawableKind::Textbox(props) => Some(props),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&ImageProps> {
        match &self.kind {
            DrawableKind::Image(props) => Some(props),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageProps> {
        match &mut self.kind {
            DrawableKind::Image(props) => Some(props),
            _ => None,
        }
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// On-canvas size after scaling.
    pub fn scaled_size(&self) -> Size {
        Size::new(self.width * self.scale_x, self.height * self.scale_y)
    }

    /// Offset from the (rotated) top-left origin to the center.
    fn center_offset(&self) -> Vec2 {
        let half = self.scaled_size() / 2.0;
        let rotated = Affine::rotate(self.angle.to_radians()) * Point::new(half.width, half.height);
        rotated.to_vec2()
    }

    pub fn center(&self) -> Point {
        Point::new(self.left, self.top) + self.center_offset()
    }

    /// Move the object so its center lands on `point`.
    pub fn set_center(&mut self, point: Point) {
        let origin = point - self.center_offset();
        self.left = origin.x;
        self.top = origin.y;
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size((self.left, self.top), self.scaled_size())
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.left += delta.x;
        self.top += delta.y;
    }

    /// Uniformly scale so the on-canvas height equals `height`.
    pub fn scale_to_height(&mut self, height: f64) {
        if self.height > 0.0 {
            let s = height / self.height;
            self.scale_x = s;
            self.scale_y = s;
        }
    }

    /// Uniformly scale so the on-canvas width equals `width`.
    pub fn scale_to_width(&mut self, width: f64) {
        if self.width > 0.0 {
            let s = width / self.width;
            self.scale_x = s;
            self.scale_y = s;
        }
    }

    /// Local-space vertices for the polygon variants.
    pub fn polygon_points(&self) -> Option<SmallVec<[Point; 4]>> {
        let (w, h) = (self.width, self.height);
        let pts: SmallVec<[Point; 4]> = match self.kind {
            DrawableKind::Triangle => smallvec::smallvec![
                Point::new(w / 2.0, 0.0),
                Point::new(w, h),
                Point::new(0.0, h),
            ],
            DrawableKind::InvertedTriangle => smallvec::smallvec![
                Point::new(0.0, 0.0),
                Point::new(w, 0.0),
                Point::new(w / 2.0, h),
            ],
            DrawableKind::Diamond => smallvec::smallvec![
                Point::new(w / 2.0, 0.0),
                Point::new(w, h / 2.0),
                Point::new(w / 2.0, h),
                Point::new(0.0, h / 2.0),
            ],
            _ => return None,
        };
        Some(pts)
    }
}
