//! Built-in shapes and text presets with their fixed default geometry.

use crate::color::Color;
use crate::config::StyleDefaults;
use crate::model::{Drawable, DrawableKind, FontStyle, TextAlign, TextProps};

pub const FILL_COLOR: Color = Color::BLACK;
pub const STROKE_COLOR: Color = Color::BLACK;
pub const STROKE_WIDTH: f64 = 2.0;
pub const FONT_FAMILY: &str = "Arial";
pub const FONT_SIZE: f64 = 32.0;
pub const FONT_WEIGHT: u16 = 400;
pub const OPACITY: f64 = 1.0;

const SHAPE_ORIGIN: f64 = 100.0;
const SHAPE_SIDE: f64 = 400.0;
const DIAMOND_SIDE: f64 = 600.0;
const CIRCLE_RADIUS: f64 = 225.0;
const SOFT_CORNER: f64 = 50.0;

/// The shape palette offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    /// Rectangle with rounded corners.
    SoftRectangle,
    Circle,
    Triangle,
    InverseTriangle,
    Diamond,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        Self::Rectangle,
        Self::SoftRectangle,
        Self::Circle,
        Self::Triangle,
        Self::InverseTriangle,
        Self::Diamond,
    ];

    /// Build the shape with its default geometry, styled from `defaults`.
    pub fn build(self, defaults: &StyleDefaults) -> Drawable {
        let (kind, w, h) = match self {
            Self::Rectangle => (DrawableKind::Rect, SHAPE_SIDE, SHAPE_SIDE),
            Self::SoftRectangle => (
                DrawableKind::RoundedRect {
                    rx: SOFT_CORNER,
                    ry: SOFT_CORNER,
                },
                SHAPE_SIDE,
                SHAPE_SIDE,
            ),
            Self::Circle => (
                DrawableKind::Circle {
                    radius: CIRCLE_RADIUS,
                },
                CIRCLE_RADIUS * 2.0,
                CIRCLE_RADIUS * 2.0,
            ),
            Self::Triangle => (DrawableKind::Triangle, SHAPE_SIDE, SHAPE_SIDE),
            Self::InverseTriangle => (DrawableKind::InvertedTriangle, SHAPE_SIDE, SHAPE_SIDE),
            Self::Diamond => (DrawableKind::Diamond, DIAMOND_SIDE, DIAMOND_SIDE),
        };
        let mut d = Drawable::new(kind);
        d.left = SHAPE_ORIGIN;
        d.top = SHAPE_ORIGIN;
        d.width = w;
        d.height = h;
        apply_defaults(&mut d, defaults);
        d
    }
}

fn apply_defaults(d: &mut Drawable, defaults: &StyleDefaults) {
    d.fill = Some(defaults.fill_color);
    d.stroke = Some(defaults.stroke_color);
    d.stroke_width = defaults.stroke_width;
    d.stroke_dash_array = defaults.stroke_dash_array.clone();
}

// ─── Text ────────────────────────────────────────────────────────────────

/// Overrides for a new textbox. `None` keeps the session/default value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOptions {
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
}

/// Ready-made text styles from the text panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPreset {
    Textbox,
    Heading,
    Subheading,
    Paragraph,
}

impl TextPreset {
    pub fn label(self) -> &'static str {
        match self {
            Self::Textbox => "Textbox",
            Self::Heading => "Heading",
            Self::Subheading => "Subheading",
            Self::Paragraph => "Paragraph",
        }
    }

    pub fn options(self) -> TextOptions {
        match self {
            Self::Textbox => TextOptions::default(),
            Self::Heading => TextOptions {
                font_size: Some(80.0),
                font_weight: Some(700),
                ..TextOptions::default()
            },
            Self::Subheading => TextOptions {
                font_size: Some(44.0),
                font_weight: Some(500),
                ..TextOptions::default()
            },
            Self::Paragraph => TextOptions {
                font_size: Some(32.0),
                ..TextOptions::default()
            },
        }
    }
}

/// Build a textbox. Its color is the session fill; text has no stroke.
pub fn build_text(text: &str, options: &TextOptions, defaults: &StyleDefaults) -> Drawable {
    let font_size = options.font_size.unwrap_or(FONT_SIZE);
    let props = TextProps {
        text: text.to_string(),
        font_family: defaults.font_family.clone(),
        font_size,
        font_weight: options.font_weight.unwrap_or(FONT_WEIGHT),
        font_style: options.font_style.unwrap_or_default(),
        text_align: options.text_align.unwrap_or_default(),
        ..TextProps::default()
    };
    let mut d = Drawable::new(DrawableKind::Textbox(props));
    d.left = SHAPE_ORIGIN;
    d.top = SHAPE_ORIGIN;
    d.fill = Some(defaults.fill_color);
    d.stroke_width = defaults.stroke_width;
    d.stroke_dash_array = defaults.stroke_dash_array.clone();
    // Rough layout box: the engine reflows text on render.
    d.width = SHAPE_SIDE;
    d.height = (font_size * 1.16).round();
    d
}
