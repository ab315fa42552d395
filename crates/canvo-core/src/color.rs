//! RGBA colors and the CSS color syntax they travel in.
//!
//! Snapshots, configuration files and the browser bridge all carry colors
//! as CSS strings (`#1E293B`, `rgba(0,0,0,1)`, `white`). Parsing is built
//! on `winnow`; emission picks the shortest form that round-trips.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use winnow::ascii::space0;
use winnow::combinator::alt;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Straight (non-premultiplied) RGBA, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// A string that is not a color this editor understands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color `{0}`")]
pub struct ColorParseError(pub String);

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and a float alpha, as CSS `rgba()` does.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Hex digits without the leading `#`: 3, 4, 6 or 8 of them.
    pub fn from_hex(digits: &str) -> Option<Self> {
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let packed = u32::from_str_radix(digits, 16).ok()?;
        // Normalize to 0xRRGGBBAA.
        let rgba = match digits.len() {
            3 => expand_nibbles(packed << 4 | 0xF),
            4 => expand_nibbles(packed),
            6 => packed << 8 | 0xFF,
            8 => packed,
            _ => return None,
        };
        let [r, g, b, a] = rgba.to_be_bytes();
        Some(Self::from_rgba8(r, g, b, a as f32 / 255.0))
    }

    fn channels8(&self) -> (u8, u8, u8) {
        (
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        )
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when translucent.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.channels8();
        let mut out = format!("#{:06X}", u32::from_be_bytes([0, r, g, b]));
        let alpha = (self.a * 255.0).round() as u8;
        if alpha < 255 {
            out.push_str(&format!("{alpha:02X}"));
        }
        out
    }

    /// Emit as CSS: hex when opaque, `rgba(r,g,b,a)` otherwise so the
    /// alpha survives exactly.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            return self.to_hex();
        }
        let (r, g, b) = self.channels8();
        format!("rgba({r},{g},{b},{})", self.a)
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

/// `0xRGBA` to `0xRRGGBBAA`.
fn expand_nibbles(short: u32) -> u32 {
    (0..4).fold(0, |acc, i| {
        let nibble = (short >> (12 - 4 * i)) & 0xF;
        acc << 8 | nibble * 0x11
    })
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_css_color(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_css_color(&s).map_err(serde::de::Error::custom)
    }
}

// ─── CSS parsing ─────────────────────────────────────────────────────────

/// Parse a CSS color: hex, `rgb()`/`rgba()`, or a named color.
pub fn parse_css_color(input: &str) -> Result<Color, ColorParseError> {
    let mut rest = input.trim();
    let color = css_color
        .parse_next(&mut rest)
        .map_err(|_| ColorParseError(input.to_string()))?;
    if !rest.trim().is_empty() {
        return Err(ColorParseError(input.to_string()));
    }
    Ok(color)
}

fn css_color(input: &mut &str) -> ModalResult<Color> {
    alt((hex_color, rgb_function, named_color)).parse_next(input)
}

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

fn skip_blanks(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = space0.parse_next(input);
}

fn expect_char(input: &mut &str, c: char) -> ModalResult<()> {
    skip_blanks(input);
    match input.strip_prefix(c) {
        Some(rest) => {
            *input = rest;
            Ok(())
        }
        None => backtrack(),
    }
}

fn hex_digits<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)
}

fn hex_color(input: &mut &str) -> ModalResult<Color> {
    expect_char(input, '#')?;
    let digits = hex_digits.parse_next(input)?;
    match Color::from_hex(digits) {
        Some(color) => Ok(color),
        None => backtrack(),
    }
}

fn rgb_keyword<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt(("rgba", "rgb")).parse_next(input)
}

fn number_chars<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_digit() || c == '.' || c == '-').parse_next(input)
}

fn channel_number(input: &mut &str) -> ModalResult<f32> {
    skip_blanks(input);
    let matched = number_chars.parse_next(input)?;
    matched
        .parse::<f32>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

fn rgb_function(input: &mut &str) -> ModalResult<Color> {
    let _ = rgb_keyword.parse_next(input)?;
    expect_char(input, '(')?;
    let r = channel_number(input)?;
    expect_char(input, ',')?;
    let g = channel_number(input)?;
    expect_char(input, ',')?;
    let b = channel_number(input)?;
    skip_blanks(input);
    let a = if input.starts_with(',') {
        expect_char(input, ',')?;
        channel_number(input)?
    } else {
        1.0
    };
    expect_char(input, ')')?;

    let channel = |v: f32| v.clamp(0.0, 255.0).round() as u8;
    Ok(Color::from_rgba8(channel(r), channel(g), channel(b), a))
}

fn color_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)
}

fn named_color(input: &mut &str) -> ModalResult<Color> {
    let name = color_name.parse_next(input)?;
    let color = match name.to_ascii_lowercase().as_str() {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::from_rgba8(255, 0, 0, 1.0),
        "green" => Color::from_rgba8(0, 128, 0, 1.0),
        "blue" => Color::from_rgba8(0, 0, 255, 1.0),
        "yellow" => Color::from_rgba8(255, 255, 0, 1.0),
        "orange" => Color::from_rgba8(255, 165, 0, 1.0),
        "purple" => Color::from_rgba8(128, 0, 128, 1.0),
        "gray" | "grey" => Color::from_rgba8(128, 128, 128, 1.0),
        _ => return backtrack(),
    };
    Ok(color)
}
