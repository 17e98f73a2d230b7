/// Surface board — which display surface is visible and what it shows.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::presenter::PresenterEvent;
use crate::schema::line::SurfaceId;

/// Last known state of one display surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceState {
    pub visible: bool,
    pub text: String,
}

/// Registry of display surfaces owned by a presenter.
///
/// At most one surface is visible at a time: showing a surface hides
/// whichever one was visible before.
#[derive(Debug, Clone)]
pub struct SurfaceBoard {
    primary: SurfaceId,
    surfaces: FxHashMap<SurfaceId, SurfaceState>,
    visible: Option<SurfaceId>,
}

impl SurfaceBoard {
    pub fn new(primary: SurfaceId) -> Self {
        let mut surfaces = FxHashMap::default();
        surfaces.insert(primary, SurfaceState::default());
        Self {
            primary,
            surfaces,
            visible: None,
        }
    }

    pub fn primary(&self) -> SurfaceId {
        self.primary
    }

    /// Register a surface. Returns `false` if it was already known.
    pub fn register(&mut self, id: SurfaceId) -> bool {
        if self.surfaces.contains_key(&id) {
            return false;
        }
        self.surfaces.insert(id, SurfaceState::default());
        true
    }

    /// Remove a secondary surface, hiding it first if it is visible.
    /// The primary surface cannot be removed.
    pub fn unregister(&mut self, id: SurfaceId, events: &mut Vec<PresenterEvent>) -> bool {
        if id == self.primary || !self.surfaces.contains_key(&id) {
            return false;
        }
        if self.visible == Some(id) {
            self.hide_visible(events);
        }
        self.surfaces.remove(&id);
        true
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&SurfaceState> {
        self.surfaces.get(&id)
    }

    pub fn visible(&self) -> Option<SurfaceId> {
        self.visible
    }

    /// Make `id` the visible surface and set its text.
    pub fn show(&mut self, id: SurfaceId, text: &str, events: &mut Vec<PresenterEvent>) {
        if !self.surfaces.contains_key(&id) {
            return;
        }
        if self.visible.is_some_and(|current| current != id) {
            self.hide_visible(events);
        }
        if let Some(state) = self.surfaces.get_mut(&id) {
            state.visible = true;
            state.text.clear();
            state.text.push_str(text);
        }
        self.visible = Some(id);
        events.push(PresenterEvent::SurfaceShown {
            surface: id,
            text: text.to_string(),
        });
    }

    /// Hide whatever is visible.
    pub fn hide_all(&mut self, events: &mut Vec<PresenterEvent>) {
        self.hide_visible(events);
    }

    fn hide_visible(&mut self, events: &mut Vec<PresenterEvent>) {
        if let Some(id) = self.visible.take() {
            if let Some(state) = self.surfaces.get_mut(&id) {
                state.visible = false;
            }
            events.push(PresenterEvent::SurfaceHidden { surface: id });
        }
    }
}
