use crate::foundation::error::{GridError, GridResult};
use crate::grid::subgrid::SubgridRegion;

/// Largest supported edge length of the active grid.
pub const MAX_GRID_EDGE: u32 = 12;
/// Column count of the canonical storage space.
pub const STORAGE_COLS: u32 = 12;

/// 1-based, row-major index within the currently active grid.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct FullPosition(pub u32);

/// Index in the fixed 12×12 storage space; stable across grid-size changes.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct StorageIndex(pub u32);

/// Zero-based row/column pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Dimensions of the active grid, each edge in `1..=12`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridDims {
    rows: u32,
    cols: u32,
}

impl GridDims {
    pub fn new(rows: u32, cols: u32) -> GridResult<Self> {
        if !(1..=MAX_GRID_EDGE).contains(&rows) || !(1..=MAX_GRID_EDGE).contains(&cols) {
            return Err(GridError::validation(format!(
                "grid must be between 1x1 and {MAX_GRID_EDGE}x{MAX_GRID_EDGE}, got {rows}x{cols}"
            )));
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(self) -> u32 {
        self.rows
    }

    pub fn cols(self) -> u32 {
        self.cols
    }

    pub fn total(self) -> u32 {
        self.rows * self.cols
    }

    pub fn contains(self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn position_of(self, cell: Cell) -> Option<FullPosition> {
        self.contains(cell)
            .then(|| FullPosition(cell.row * self.cols + cell.col + 1))
    }

    pub fn cell_of(self, position: FullPosition) -> Option<Cell> {
        if position.0 == 0 || position.0 > self.total() {
            return None;
        }
        let zero = position.0 - 1;
        Some(Cell::new(zero / self.cols, zero % self.cols))
    }

    pub fn position_to_storage(self, position: FullPosition) -> Option<StorageIndex> {
        self.cell_of(position).map(storage_index)
    }

    pub fn storage_to_position(self, storage: StorageIndex) -> Option<FullPosition> {
        self.position_of(storage_cell(storage))
    }

    /// Row-major iterator over every cell of the active grid.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Cell::new(row, col)))
    }
}

pub fn storage_index(cell: Cell) -> StorageIndex {
    StorageIndex(cell.row * STORAGE_COLS + cell.col)
}

pub fn storage_cell(storage: StorageIndex) -> Cell {
    Cell::new(storage.0 / STORAGE_COLS, storage.0 % STORAGE_COLS)
}

/// Both addresses of one tile in the active grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Tile {
    pub position: FullPosition,
    pub storage: StorageIndex,
    pub cell: Cell,
    pub in_subgrid: bool,
}

/// Addressing table for the active grid, rebuilt as a whole whenever dimensions change.
#[derive(Clone, Debug)]
pub struct TileMap {
    dims: GridDims,
    // Indexed by `position - 1`.
    tiles: Vec<Tile>,
}

impl TileMap {
    pub fn build(dims: GridDims, region: Option<&SubgridRegion>) -> Self {
        let tiles = dims
            .cells()
            .map(|cell| Tile {
                position: FullPosition(cell.row * dims.cols() + cell.col + 1),
                storage: storage_index(cell),
                cell,
                in_subgrid: region.is_none_or(|r| r.contains(cell)),
            })
            .collect();
        Self { dims, tiles }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn get(&self, position: FullPosition) -> Option<&Tile> {
        let idx = position.0.checked_sub(1)? as usize;
        self.tiles.get(idx)
    }

    pub fn by_storage(&self, storage: StorageIndex) -> Option<&Tile> {
        self.dims
            .storage_to_position(storage)
            .and_then(|p| self.get(p))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/addressing.rs"]
mod tests;
