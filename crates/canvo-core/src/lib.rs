pub mod color;
pub mod config;
pub mod filter;
pub mod id;
pub mod model;
pub mod presets;
pub mod snapshot;

pub use color::{Color, ColorParseError, parse_css_color};
pub use config::{ConfigError, EditorConfig, StyleDefaults, WorkspaceConfig, ZoomConfig};
pub use filter::{ImageFilter, UnknownFilter};
pub use id::ObjectId;
pub use model::*;
pub use presets::{ShapeKind, TextOptions, TextPreset};
pub use snapshot::{Attribute, SNAPSHOT_KEYS, Snapshot, SnapshotError, WorkspaceGeometry};

// Re-export kurbo geometry so downstream crates don't need a direct dependency
pub use kurbo::{Affine, Point, Rect, Size, Vec2};
