//! Current selection, as last reported by the engine.
//!
//! The tracker is only ever written from engine selection events, so it
//! never disagrees with what the user sees.

use canvo_core::ObjectId;
use smallvec::SmallVec;

#[derive(Debug, Default, Clone)]
pub struct SelectionTracker {
    selected: SmallVec<[ObjectId; 4]>,
}

impl SelectionTracker {
    pub fn selected(&self) -> &[ObjectId] {
        &self.selected
    }

    /// The object style getters read from.
    pub fn first(&self) -> Option<ObjectId> {
        self.selected.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.selected.contains(&id)
    }

    pub(crate) fn on_created(&mut self, ids: &[ObjectId]) {
        self.selected = ids.iter().copied().collect();
    }

    pub(crate) fn on_updated(&mut self, ids: &[ObjectId]) {
        self.selected = ids.iter().copied().collect();
    }

    pub(crate) fn on_cleared(&mut self) {
        self.selected.clear();
    }
}
