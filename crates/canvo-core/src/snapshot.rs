//! Whole-scene snapshots.
//!
//! A snapshot is a JSON document holding the ordered object list plus the
//! workspace geometry. Each object is a flat attribute map filtered through
//! an allow-list of attribute names; the same list must be used to capture
//! and to restore, otherwise attributes silently drop out on the way back.
//! `SNAPSHOT_KEYS` is that shared list.

use crate::id::ObjectId;
use crate::model::Drawable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Key of the variant tag. Always kept, whatever the allow-list says.
pub const TYPE_KEY: &str = "type";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot object #{index} is not a JSON object")]
    NotAnObject { index: usize },
    #[error("snapshot object #{index} could not be restored: {source}")]
    Object {
        index: usize,
        source: serde_json::Error,
    },
}

// ─── Attribute allow-list ────────────────────────────────────────────────

/// Every attribute name a drawable can carry in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Id,
    Name,
    Selectable,
    HasControls,
    Left,
    Top,
    Width,
    Height,
    Angle,
    ScaleX,
    ScaleY,
    Fill,
    Stroke,
    StrokeWidth,
    StrokeDashArray,
    Opacity,
    Rx,
    Ry,
    Radius,
    Text,
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    Underline,
    Linethrough,
    TextAlign,
    Src,
    Filters,
    Path,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Selectable => "selectable",
            Self::HasControls => "hasControls",
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::Angle => "angle",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::Fill => "fill",
            Self::Stroke => "stroke",
            Self::StrokeWidth => "strokeWidth",
            Self::StrokeDashArray => "strokeDashArray",
            Self::Opacity => "opacity",
            Self::Rx => "rx",
            Self::Ry => "ry",
            Self::Radius => "radius",
            Self::Text => "text",
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
            Self::FontStyle => "fontStyle",
            Self::Underline => "underline",
            Self::Linethrough => "linethrough",
            Self::TextAlign => "textAlign",
            Self::Src => "src",
            Self::Filters => "filters",
            Self::Path => "path",
        }
    }
}

/// The allow-list shared by history capture and history restore.
pub const SNAPSHOT_KEYS: &[Attribute] = &[
    Attribute::Id,
    Attribute::Name,
    Attribute::Selectable,
    Attribute::HasControls,
    Attribute::Left,
    Attribute::Top,
    Attribute::Width,
    Attribute::Height,
    Attribute::Angle,
    Attribute::ScaleX,
    Attribute::ScaleY,
    Attribute::Fill,
    Attribute::Stroke,
    Attribute::StrokeWidth,
    Attribute::StrokeDashArray,
    Attribute::Opacity,
    Attribute::Rx,
    Attribute::Ry,
    Attribute::Radius,
    Attribute::Text,
    Attribute::FontFamily,
    Attribute::FontSize,
    Attribute::FontWeight,
    Attribute::FontStyle,
    Attribute::Underline,
    Attribute::Linethrough,
    Attribute::TextAlign,
    Attribute::Src,
    Attribute::Filters,
    Attribute::Path,
];

fn retain_allowed(map: &mut Map<String, Value>, keys: &[Attribute]) {
    map.retain(|k, _| k == TYPE_KEY || keys.iter().any(|a| a.as_str() == k));
}

// ─── Records ─────────────────────────────────────────────────────────────

/// Serialize one drawable to its filtered attribute map.
pub fn encode_object(
    drawable: &Drawable,
    keys: &[Attribute],
) -> Result<Map<String, Value>, SnapshotError> {
    match serde_json::to_value(drawable)? {
        Value::Object(mut map) => {
            retain_allowed(&mut map, keys);
            Ok(map)
        }
        _ => Err(SnapshotError::NotAnObject { index: 0 }),
    }
}

/// Rebuild one drawable from an attribute map. Attributes outside `keys`
/// are ignored; missing ones take their defaults.
pub fn decode_object(
    record: &Map<String, Value>,
    keys: &[Attribute],
) -> Result<Drawable, serde_json::Error> {
    let mut map = record.clone();
    retain_allowed(&mut map, keys);
    serde_json::from_value(Value::Object(map))
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// Workspace bounds recorded alongside the object list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl WorkspaceGeometry {
    pub fn of(workspace: &Drawable) -> Self {
        let size = workspace.scaled_size();
        Self {
            left: workspace.left,
            top: workspace.top,
            width: size.width,
            height: size.height,
        }
    }
}

/// Serialized, attribute-filtered picture of a whole scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// Back-to-front object records.
    pub objects: Vec<Map<String, Value>>,
    #[serde(default)]
    pub workspace: Option<WorkspaceGeometry>,
}

impl Snapshot {
    /// Capture `objects` (back to front) through the allow-list.
    pub fn capture(objects: &[Drawable], keys: &[Attribute]) -> Result<Self, SnapshotError> {
        let records = objects
            .iter()
            .enumerate()
            .map(|(index, d)| {
                encode_object(d, keys).map_err(|e| match e {
                    SnapshotError::NotAnObject { .. } => SnapshotError::NotAnObject { index },
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            objects: records,
            workspace: objects
                .iter()
                .find(|d| d.is_workspace())
                .map(WorkspaceGeometry::of),
        })
    }

    /// Rebuild the object list through the allow-list.
    pub fn decode(&self, keys: &[Attribute]) -> Result<Vec<Drawable>, SnapshotError> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, record)| {
                decode_object(record, keys)
                    .map_err(|source| SnapshotError::Object { index, source })
            })
            .collect()
    }

    /// Object IDs in back-to-front order, without decoding.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_str).map(ObjectId::intern))
            .collect()
    }

    /// Image sources referenced by the snapshot, in order, deduplicated.
    pub fn image_sources(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for record in &self.objects {
            if record.get(TYPE_KEY).and_then(Value::as_str) != Some("image") {
                continue;
            }
            if let Some(src) = record.get("src").and_then(Value::as_str)
                && !out.iter().any(|s| s == src)
            {
                out.push(src.to_string());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
