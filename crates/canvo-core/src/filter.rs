//! Image post-processing filters.
//!
//! The engine applies these destructively to the decoded pixels; the model
//! only records which one is active.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the pseudo-filter that clears an image's filter list.
pub const NO_FILTER: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFilter {
    Polaroid,
    Sepia,
    Kodachrome,
    Contrast,
    Brightness,
    Greyscale,
    Brownie,
    Vintage,
    Technicolor,
    Pixelate,
    Invert,
    Blur,
    Sharpen,
    Emboss,
    RemoveColor,
    BlackNWhite,
    Vibrance,
    BlendColor,
    HueRotate,
    Resize,
    Saturation,
    Gamma,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown image filter `{0}`")]
pub struct UnknownFilter(pub String);

impl ImageFilter {
    pub const ALL: [ImageFilter; 22] = [
        Self::Polaroid,
        Self::Sepia,
        Self::Kodachrome,
        Self::Contrast,
        Self::Brightness,
        Self::Greyscale,
        Self::Brownie,
        Self::Vintage,
        Self::Technicolor,
        Self::Pixelate,
        Self::Invert,
        Self::Blur,
        Self::Sharpen,
        Self::Emboss,
        Self::RemoveColor,
        Self::BlackNWhite,
        Self::Vibrance,
        Self::BlendColor,
        Self::HueRotate,
        Self::Resize,
        Self::Saturation,
        Self::Gamma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Polaroid => "polaroid",
            Self::Sepia => "sepia",
            Self::Kodachrome => "kodachrome",
            Self::Contrast => "contrast",
            Self::Brightness => "brightness",
            Self::Greyscale => "greyscale",
            Self::Brownie => "brownie",
            Self::Vintage => "vintage",
            Self::Technicolor => "technicolor",
            Self::Pixelate => "pixelate",
            Self::Invert => "invert",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Emboss => "emboss",
            Self::RemoveColor => "removecolor",
            Self::BlackNWhite => "blacknwhite",
            Self::Vibrance => "vibrance",
            Self::BlendColor => "blendcolor",
            Self::HueRotate => "huerotate",
            Self::Resize => "resize",
            Self::Saturation => "saturation",
            Self::Gamma => "gamma",
        }
    }

    /// Resolve a filter name as shown in the filter picker.
    /// `"none"` yields `Ok(None)`.
    pub fn parse(name: &str) -> Result<Option<Self>, UnknownFilter> {
        let wanted = name.trim().to_ascii_lowercase();
        if wanted == NO_FILTER {
            return Ok(None);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .map(Some)
            .ok_or_else(|| UnknownFilter(name.to_string()))
    }
}
