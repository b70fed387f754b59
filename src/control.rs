//! Lets unrelated page logic drive highlights on whichever grid owns a tile.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::GridEngine;
use crate::foundation::core::{RootId, TileId};
use crate::geometry::GridHost;
use crate::scene::Scene;

/// A tile as seen from outside any engine: its block root plus its link annotations.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TileHandle {
    pub root: RootId,
    pub tile: TileId,
    /// Explicit link annotation, preferred over `href`.
    pub transition_link: Option<String>,
    pub href: Option<String>,
}

impl TileHandle {
    pub fn new(root: RootId, tile: TileId) -> Self {
        Self {
            root,
            tile,
            transition_link: None,
            href: None,
        }
    }

    /// Link annotation if present, else the native link target.
    pub fn link(&self) -> Option<&str> {
        self.transition_link
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.href.as_deref().filter(|s| !s.is_empty()))
    }
}

/// One registered grid instance.
pub trait HighlightTarget {
    fn root(&self) -> RootId;

    fn contains(&self, handle: &TileHandle) -> bool {
        handle.root == self.root()
    }

    fn highlight(&self, tile: TileId);

    fn unhighlight(&self, tile: TileId);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct RegistrationId(u64);

/// Registry of live grid instances. Entries are added on construction and
/// removed on teardown; lookups go by tile containment.
#[derive(Default)]
pub struct ControlRegistry {
    entries: Vec<(RegistrationId, Box<dyn HighlightTarget>)>,
    next_id: u64,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, target: impl HighlightTarget + 'static) -> RegistrationId {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;
        tracing::debug!(?id, root = target.root().0, "grid registered");
        self.entries.push((id, Box::new(target)));
        id
    }

    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        before != self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `false` when no registered grid contains the tile.
    pub fn highlight_tile(&self, handle: &TileHandle) -> bool {
        match self.owner(handle) {
            Some(target) => {
                target.highlight(handle.tile);
                true
            }
            None => false,
        }
    }

    pub fn unhighlight_tile(&self, handle: &TileHandle) -> bool {
        match self.owner(handle) {
            Some(target) => {
                target.unhighlight(handle.tile);
                true
            }
            None => false,
        }
    }

    pub fn get_tile_link<'a>(&self, handle: &'a TileHandle) -> Option<&'a str> {
        handle.link()
    }

    fn owner(&self, handle: &TileHandle) -> Option<&dyn HighlightTarget> {
        self.entries
            .iter()
            .map(|(_, target)| target.as_ref())
            .find(|target| target.contains(handle))
    }
}

/// Shared engine registered under a block root.
pub struct EngineHandle<H, S> {
    root: RootId,
    engine: Rc<RefCell<GridEngine<H, S>>>,
}

impl<H, S> EngineHandle<H, S> {
    pub fn new(root: RootId, engine: Rc<RefCell<GridEngine<H, S>>>) -> Self {
        Self { root, engine }
    }
}

impl<H: GridHost, S: Scene> HighlightTarget for EngineHandle<H, S> {
    fn root(&self) -> RootId {
        self.root
    }

    fn contains(&self, handle: &TileHandle) -> bool {
        if handle.root != self.root {
            return false;
        }
        // Re-entrant lookups from inside the engine fall back to root containment.
        self.engine
            .try_borrow()
            .map_or(true, |engine| engine.owns(handle.tile))
    }

    fn highlight(&self, tile: TileId) {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.highlight_tile(tile),
            Err(_) => {
                tracing::warn!(root = self.root.0, tile = tile.0, "engine busy; highlight dropped")
            }
        }
    }

    fn unhighlight(&self, tile: TileId) {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.unhighlight_tile(tile),
            Err(_) => tracing::warn!(
                root = self.root.0,
                tile = tile.0,
                "engine busy; unhighlight dropped"
            ),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/control/control.rs"]
mod tests;
