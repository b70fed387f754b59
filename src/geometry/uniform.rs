use std::cell::Cell as Counter;

use crate::foundation::core::{Point, Rect, TileId};
use crate::geometry::GridHost;
use crate::grid::addressing::{FullPosition, GridDims, StorageIndex, storage_cell, storage_index};

/// Regular lattice host: square tiles of `tile_size` separated by `gap`.
///
/// Tile handles are storage indices, so they survive grid resizes. Used by
/// the CLI and by tests in place of a real page.
#[derive(Debug)]
pub struct UniformGrid {
    dims: GridDims,
    tile_size: f64,
    gap: f64,
    origin: Point,
    measurements: Counter<u64>,
}

impl UniformGrid {
    pub fn new(dims: GridDims, tile_size: f64, gap: f64) -> Self {
        Self {
            dims,
            tile_size,
            gap,
            origin: Point::ZERO,
            measurements: Counter::new(0),
        }
    }

    /// Offsets the whole grid on the page, as scrolling or page layout would.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn set_dims(&mut self, dims: GridDims) {
        self.dims = dims;
    }

    /// Changes tile size and gap, as a viewport resize would.
    pub fn relayout(&mut self, tile_size: f64, gap: f64) {
        self.tile_size = tile_size;
        self.gap = gap;
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// How many tile rectangles have been measured so far.
    pub fn measurements(&self) -> u64 {
        self.measurements.get()
    }

    fn pitch(&self) -> f64 {
        self.tile_size + self.gap
    }
}

impl GridHost for UniformGrid {
    fn resolve(&self, position: FullPosition) -> Option<TileId> {
        self.dims
            .cell_of(position)
            .map(|cell| TileId(storage_index(cell).0))
    }

    fn tile_rect(&self, tile: TileId) -> Option<Rect> {
        let cell = storage_cell(StorageIndex(tile.0));
        if !self.dims.contains(cell) {
            return None;
        }
        self.measurements.set(self.measurements.get() + 1);
        let x0 = self.origin.x + f64::from(cell.col) * self.pitch();
        let y0 = self.origin.y + f64::from(cell.row) * self.pitch();
        Some(Rect::new(x0, y0, x0 + self.tile_size, y0 + self.tile_size))
    }

    fn wrapper_rect(&self) -> Rect {
        let w = f64::from(self.dims.cols()) * self.pitch() - self.gap;
        let h = f64::from(self.dims.rows()) * self.pitch() - self.gap;
        Rect::new(self.origin.x, self.origin.y, self.origin.x + w, self.origin.y + h)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/uniform.rs"]
mod tests;
