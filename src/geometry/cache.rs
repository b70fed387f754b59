use std::collections::HashMap;

use crate::foundation::core::{Point, Rect, TileId};
use crate::geometry::GridHost;

/// Measured tile box, relative to the grid wrapper's origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TileGeometry {
    pub center: Point,
    pub rect: Rect,
}

impl TileGeometry {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            center: rect.center(),
            rect,
        }
    }

    pub fn half_width(&self) -> f64 {
        self.rect.width() / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.rect.height() / 2.0
    }
}

/// Memoized tile geometry. A miss after invalidation re-measures every known tile in one pass.
#[derive(Debug, Default)]
pub struct GeometryCache {
    known: Vec<TileId>,
    entries: HashMap<TileId, TileGeometry>,
    valid: bool,
    rebuilds: u64,
}

impl GeometryCache {
    pub fn new(known: Vec<TileId>) -> Self {
        Self {
            known,
            ..Self::default()
        }
    }

    /// Replaces the known tile set, e.g. after the grid dimensions changed.
    pub fn reset(&mut self, known: Vec<TileId>) {
        self.known = known;
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
        self.entries.clear();
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Number of full rebuilds performed since construction.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn get<H: GridHost + ?Sized>(&mut self, host: &H, tile: TileId) -> Option<TileGeometry> {
        if !self.valid {
            self.rebuild(host);
        }
        self.entries.get(&tile).copied()
    }

    fn rebuild<H: GridHost + ?Sized>(&mut self, host: &H) {
        self.entries.clear();
        let wrapper = host.wrapper_rect();
        let origin = wrapper.origin().to_vec2();
        for &tile in &self.known {
            let Some(rect) = host.tile_rect(tile) else {
                continue;
            };
            self.entries
                .insert(tile, TileGeometry::from_rect(rect - origin));
        }
        self.valid = true;
        self.rebuilds += 1;
        tracing::debug!(
            tiles = self.entries.len(),
            rebuilds = self.rebuilds,
            "geometry cache rebuilt"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/cache.rs"]
mod tests;
