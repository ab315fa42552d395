//! In-process copy/paste buffer.
//!
//! Copies are stored as attribute records, not live objects, so later
//! edits to the originals don't leak into what gets pasted.

use canvo_core::snapshot::{decode_object, encode_object};
use canvo_core::{Drawable, ObjectId, SNAPSHOT_KEYS, SnapshotError, Vec2};
use serde_json::{Map, Value};

#[derive(Debug, Default, Clone)]
pub struct Clipboard {
    records: Vec<Map<String, Value>>,
}

impl Clipboard {
    /// Replace the buffer with `objects`. The workspace is never copied.
    /// Returns `false` (and keeps the old buffer) when there is nothing to copy.
    pub fn copy<'a>(
        &mut self,
        objects: impl IntoIterator<Item = &'a Drawable>,
    ) -> Result<bool, SnapshotError> {
        let records = objects
            .into_iter()
            .filter(|d| !d.is_workspace())
            .map(|d| encode_object(d, SNAPSHOT_KEYS))
            .collect::<Result<Vec<_>, _>>()?;
        if records.is_empty() {
            return Ok(false);
        }
        self.records = records;
        Ok(true)
    }

    /// Fresh copies of the buffer, each with a new ID under the original's
    /// prefix and shifted by `offset` on both axes from where it was copied.
    pub fn paste(&self, offset: f64) -> Result<Vec<Drawable>, SnapshotError> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut d = decode_object(record, SNAPSHOT_KEYS)
                    .map_err(|source| SnapshotError::Object { index, source })?;
                let source_id = d.id;
                d.id = ObjectId::with_prefix(source_id.prefix());
                d.translate(Vec2::new(offset, offset));
                Ok(d)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
