use super::*;
use std::collections::BTreeSet;

#[test]
fn dims_reject_out_of_range_edges() {
    assert!(GridDims::new(0, 6).is_err());
    assert!(GridDims::new(6, 13).is_err());
    assert!(GridDims::new(12, 12).is_ok());
}

#[test]
fn position_and_storage_agree_for_every_grid_size() {
    for rows in 1..=MAX_GRID_EDGE {
        for cols in 1..=MAX_GRID_EDGE {
            let dims = GridDims::new(rows, cols).unwrap();
            let mut seen = BTreeSet::new();
            for cell in dims.cells() {
                let pos = dims.position_of(cell).unwrap();
                let storage = storage_index(cell);
                assert_eq!(storage.0, cell.row * 12 + cell.col);
                assert_eq!(dims.storage_to_position(storage), Some(pos));
                assert_eq!(dims.position_to_storage(pos), Some(storage));
                seen.insert(pos.0);
            }
            let expected: BTreeSet<u32> = (1..=rows * cols).collect();
            assert_eq!(seen, expected, "{rows}x{cols}");
        }
    }
}

#[test]
fn storage_outside_active_grid_has_no_position() {
    let dims = GridDims::new(6, 6).unwrap();
    // row 0, col 7 exists in storage space only
    assert_eq!(dims.storage_to_position(StorageIndex(7)), None);
    assert_eq!(dims.cell_of(FullPosition(0)), None);
    assert_eq!(dims.cell_of(FullPosition(37)), None);
}

#[test]
fn tile_map_marks_subgrid_membership() {
    let dims = GridDims::new(6, 6).unwrap();
    let region = SubgridRegion::new(1, 1, 2, 2);
    let map = TileMap::build(dims, Some(&region));
    assert_eq!(map.len(), 36);

    let inside = map.get(FullPosition(8)).unwrap();
    assert_eq!(inside.cell, Cell::new(1, 1));
    assert!(inside.in_subgrid);
    assert_eq!(inside.storage, StorageIndex(13));

    assert!(!map.get(FullPosition(1)).unwrap().in_subgrid);
    assert_eq!(map.iter().filter(|t| t.in_subgrid).count(), 4);
}

#[test]
fn rebuilding_for_new_dims_readdresses_tiles() {
    let small = TileMap::build(GridDims::new(4, 4).unwrap(), None);
    let large = TileMap::build(GridDims::new(6, 6).unwrap(), None);

    // storage index 13 is row 1, col 1 in both grids
    assert_eq!(small.by_storage(StorageIndex(13)).unwrap().position, FullPosition(6));
    assert_eq!(large.by_storage(StorageIndex(13)).unwrap().position, FullPosition(8));
}
