//! Routing of engine events into history and the selection mirror.

use crate::adapter::{LoadError, LoadTicket, LoadedImage, SceneAdapter, SceneEvent};
use crate::editor::Editor;
use canvo_core::{Drawable, DrawableKind, ImageProps, ObjectId};

impl<S: SceneAdapter> Editor<S> {
    /// Drain the engine until it goes quiet. Handlers may make the engine
    /// emit more events, which are routed in the same pass.
    pub(crate) fn pump(&mut self) {
        loop {
            let events = self.scene.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                log::trace!("event: {event:?}");
                self.route(event);
            }
        }
    }

    fn route(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::ObjectAdded(_)
            | SceneEvent::ObjectRemoved(_)
            | SceneEvent::ObjectModified(_) => {
                if let Err(err) = self.history.save(&self.scene) {
                    log::error!("history capture failed: {err}");
                }
            }
            SceneEvent::SelectionCreated(ids) => self.selection.on_created(&ids),
            SceneEvent::SelectionUpdated(ids) => self.selection.on_updated(&ids),
            SceneEvent::SelectionCleared => {
                self.selection.on_cleared();
                if let Some(hook) = self.selection_cleared.as_mut() {
                    hook();
                }
            }
            SceneEvent::ImageLoaded { ticket, result } => self.on_image_loaded(ticket, result),
            SceneEvent::RestoreFinished { ticket, result } => {
                self.on_restore_finished(ticket, result)
            }
        }
    }

    fn on_image_loaded(&mut self, ticket: LoadTicket, result: Result<LoadedImage, LoadError>) {
        let Some(pos) = self.pending_images.iter().position(|t| *t == ticket) else {
            log::debug!("ignoring image load {ticket:?} nobody asked for");
            return;
        };
        self.pending_images.remove(pos);
        match result {
            Ok(image) if self.history.is_replaying() => self.deferred_images.push(image),
            Ok(image) => self.insert_image(image),
            Err(err) => log::warn!("image not added: {err}"),
        }
    }

    fn insert_image(&mut self, image: LoadedImage) {
        let mut d = Drawable::new(DrawableKind::Image(ImageProps {
            src: image.src,
            ..ImageProps::default()
        }));
        d.width = image.info.width;
        d.height = image.info.height;
        if let Some(height) = self.scene.workspace().map(|w| w.scaled_size().height) {
            d.scale_to_height(height);
        }
        let id = self.add_to_canvas(d);
        log::debug!("image {id} inserted");
    }

    fn on_restore_finished(&mut self, ticket: LoadTicket, result: Result<(), LoadError>) {
        let restored = result.is_ok();
        if !self.history.finish_replay(ticket, result, &mut self.scene) {
            return;
        }
        let previous = std::mem::take(&mut self.restore_selection);
        if restored {
            let ids: Vec<ObjectId> = previous
                .into_iter()
                .filter(|id| self.scene.object(*id).is_some())
                .collect();
            if !ids.is_empty() {
                self.scene.set_active_objects(&ids);
            }
        }
        for image in std::mem::take(&mut self.deferred_images) {
            self.insert_image(image);
        }
    }
}
