pub mod cache;
pub mod uniform;

use crate::foundation::core::{Rect, TileId};
use crate::grid::addressing::FullPosition;

/// Read-only access to whatever renders the tiles.
///
/// Rectangles are in page coordinates; the geometry cache translates them
/// into wrapper-relative space.
pub trait GridHost {
    /// Tile rendered at `position`, if any.
    fn resolve(&self, position: FullPosition) -> Option<TileId>;

    /// Current bounding box of `tile`.
    fn tile_rect(&self, tile: TileId) -> Option<Rect>;

    /// Bounding box of the element the overlay is positioned against.
    fn wrapper_rect(&self) -> Rect;
}
