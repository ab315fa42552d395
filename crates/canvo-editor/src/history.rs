//! Snapshot-based undo/redo.
//!
//! History is a linear list of whole-scene snapshots plus a cursor. Entry 0
//! is the post-init state; the cursor points at the entry matching what is
//! on screen. Saving after an undo truncates the redo tail.
//!
//! Undo and redo restore through the engine, which may complete later.
//! While a restore is in flight the history is *replaying*: the engine's
//! add/remove events produced by the restore are not recorded, and new
//! undo/redo requests are refused.
//!
//! Facade commands run inside a batch: any number of mutations in one call
//! collapse into a single entry when the outermost batch closes.

use crate::adapter::{LoadError, LoadTicket, SceneAdapter};
use crate::error::{EditorError, EditorResult};
use canvo_core::{SNAPSHOT_KEYS, Snapshot, SnapshotError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    Idle,
    /// Inside a batch; saves are deferred to `end_batch`.
    Batching,
    /// A restore of entry `target` is in flight.
    Replaying { ticket: LoadTicket, target: usize },
}

#[derive(Debug, Clone, Copy)]
struct Replay {
    ticket: LoadTicket,
    target: usize,
}

#[derive(Debug)]
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
    replay: Option<Replay>,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Whether a save was requested during the current batch.
    batch_dirty: bool,
}

impl History {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            replay: None,
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    pub fn state(&self) -> HistoryState {
        match self.replay {
            Some(Replay { ticket, target }) => HistoryState::Replaying { ticket, target },
            None if self.batch_depth > 0 => HistoryState::Batching,
            None => HistoryState::Idle,
        }
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.is_some()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    /// The entry matching the scene on screen.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    // ─── Recording ───────────────────────────────────────────────────────

    /// Record the scene after a mutation. Returns whether an entry was
    /// pushed: nothing is recorded while replaying, and inside a batch the
    /// save is deferred.
    pub fn save<S: SceneAdapter + ?Sized>(&mut self, scene: &S) -> Result<bool, SnapshotError> {
        if self.replay.is_some() {
            log::trace!("save ignored while replaying");
            return Ok(false);
        }
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return Ok(false);
        }
        self.capture(scene)
    }

    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Close a batch. When the outermost batch closes after a save request,
    /// one entry is pushed.
    pub fn end_batch<S: SceneAdapter + ?Sized>(
        &mut self,
        scene: &S,
    ) -> Result<bool, SnapshotError> {
        if self.batch_depth == 0 {
            return Ok(false);
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 || !std::mem::take(&mut self.batch_dirty) {
            return Ok(false);
        }
        if self.replay.is_some() {
            return Ok(false);
        }
        self.capture(scene)
    }

    fn capture<S: SceneAdapter + ?Sized>(&mut self, scene: &S) -> Result<bool, SnapshotError> {
        let snapshot = scene.serialize(SNAPSHOT_KEYS)?;
        // Only push if the scene actually changed
        if self.entries[self.index] == snapshot {
            return Ok(false);
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index = self.entries.len() - 1;
        log::debug!("history: saved entry {} of {}", self.index, self.entries.len());
        Ok(true)
    }

    // ─── Replay ──────────────────────────────────────────────────────────

    /// Start restoring the previous entry. `Ok(false)` at the oldest entry.
    pub fn undo<S: SceneAdapter + ?Sized>(&mut self, scene: &mut S) -> EditorResult<bool> {
        if self.replay.is_some() {
            return Err(EditorError::Busy);
        }
        if !self.can_undo() {
            return Ok(false);
        }
        self.start_replay(self.index - 1, scene);
        Ok(true)
    }

    /// Start restoring the next entry. `Ok(false)` at the newest entry.
    pub fn redo<S: SceneAdapter + ?Sized>(&mut self, scene: &mut S) -> EditorResult<bool> {
        if self.replay.is_some() {
            return Err(EditorError::Busy);
        }
        if !self.can_redo() {
            return Ok(false);
        }
        self.start_replay(self.index + 1, scene);
        Ok(true)
    }

    fn start_replay<S: SceneAdapter + ?Sized>(&mut self, target: usize, scene: &mut S) {
        log::debug!("history: restoring entry {target} (at {})", self.index);
        let ticket = scene.deserialize(&self.entries[target], SNAPSHOT_KEYS);
        self.replay = Some(Replay { ticket, target });
    }

    /// Handle a finished restore. Returns `false` for a ticket this history
    /// did not start. The guard is cleared whatever the outcome; on failure
    /// the cursor stays where it was.
    pub fn finish_replay<S: SceneAdapter + ?Sized>(
        &mut self,
        ticket: LoadTicket,
        result: Result<(), LoadError>,
        scene: &mut S,
    ) -> bool {
        match self.replay {
            Some(replay) if replay.ticket == ticket => {
                self.replay = None;
                match result {
                    Ok(()) => {
                        self.index = replay.target;
                        scene.render();
                    }
                    Err(err) => log::warn!("history restore failed: {err}"),
                }
                true
            }
            _ => {
                log::debug!("history: ignoring stale restore {ticket:?}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SceneEvent;
    use crate::memory::MemoryScene;
    use canvo_core::{Drawable, DrawableKind};
    use pretty_assertions::assert_eq;

    fn rect() -> Drawable {
        let mut d = Drawable::new(DrawableKind::Rect);
        d.width = 50.0;
        d.height = 50.0;
        d
    }

    fn seeded() -> (MemoryScene, History) {
        let scene = MemoryScene::default();
        let history = History::new(scene.serialize(SNAPSHOT_KEYS).unwrap());
        (scene, history)
    }

    /// Deliver every queued restore completion to `history`.
    fn settle(scene: &mut MemoryScene, history: &mut History) {
        for event in scene.drain_events() {
            if let SceneEvent::RestoreFinished { ticket, result } = event {
                history.finish_replay(ticket, result, scene);
            }
        }
    }

    #[test]
    fn save_pushes_and_moves_cursor() {
        let (mut scene, mut history) = seeded();
        scene.add_object(rect());
        assert!(history.save(&scene).unwrap());
        assert_eq!((history.len(), history.index()), (2, 1));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn unchanged_scene_is_not_saved() {
        let (scene, mut history) = seeded();
        assert!(!history.save(&scene).unwrap());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn batch_collapses_to_one_entry() {
        let (mut scene, mut history) = seeded();
        history.begin_batch();
        history.begin_batch();
        scene.add_object(rect());
        history.save(&scene).unwrap();
        scene.add_object(rect());
        history.save(&scene).unwrap();
        assert!(!history.end_batch(&scene).unwrap());
        assert_eq!(history.state(), HistoryState::Batching);
        assert!(history.end_batch(&scene).unwrap());
        assert_eq!(history.len(), 2);
        assert_eq!(history.state(), HistoryState::Idle);
    }

    #[test]
    fn undo_then_save_truncates() {
        let (mut scene, mut history) = seeded();
        for _ in 0..3 {
            scene.add_object(rect());
            history.save(&scene).unwrap();
        }
        assert!(history.undo(&mut scene).unwrap());
        settle(&mut scene, &mut history);
        assert!(history.undo(&mut scene).unwrap());
        settle(&mut scene, &mut history);
        assert_eq!(history.index(), 1);
        assert_eq!(scene.objects().len(), 1);

        scene.add_object(rect());
        history.save(&scene).unwrap();
        assert_eq!((history.len(), history.index()), (3, 2));
        assert!(!history.can_redo());
    }

    #[test]
    fn restore_events_are_not_recorded() {
        let (mut scene, mut history) = seeded();
        scene.add_object(rect());
        history.save(&scene).unwrap();
        history.undo(&mut scene).unwrap();
        // The restore's own add events arrive while replaying.
        for event in scene.drain_events() {
            match event {
                SceneEvent::RestoreFinished { ticket, result } => {
                    history.finish_replay(ticket, result, &mut scene);
                }
                e if e.is_mutation() => assert!(!history.save(&scene).unwrap()),
                _ => {}
            }
        }
        assert_eq!((history.len(), history.index()), (2, 0));
    }

    #[test]
    fn boundaries_are_noops() {
        let (mut scene, mut history) = seeded();
        assert!(!history.undo(&mut scene).unwrap());
        assert!(!history.redo(&mut scene).unwrap());
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn busy_while_restore_pending() {
        let (mut scene, mut history) = seeded();
        scene.add_object(Drawable::new(DrawableKind::Image(canvo_core::ImageProps {
            src: "slow.png".into(),
            ..Default::default()
        })));
        history.save(&scene).unwrap();
        scene.add_object(rect());
        history.save(&scene).unwrap();
        scene.drain_events();

        assert!(history.undo(&mut scene).unwrap());
        assert!(matches!(history.state(), HistoryState::Replaying { target: 1, .. }));
        assert!(matches!(history.undo(&mut scene), Err(EditorError::Busy)));
        assert!(matches!(history.redo(&mut scene), Err(EditorError::Busy)));

        scene.complete_load("slow.png", Err("timeout".into()));
        settle(&mut scene, &mut history);
        assert_eq!(history.state(), HistoryState::Idle);
        assert_eq!(history.index(), 2);
    }
}
