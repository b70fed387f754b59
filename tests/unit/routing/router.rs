use super::*;
use crate::foundation::core::Rect;

fn tile(x0: f64, y0: f64) -> TileGeometry {
    TileGeometry::from_rect(Rect::new(x0, y0, x0 + 80.0, y0 + 80.0))
}

fn params() -> RouteParams {
    RouteParams {
        corner_radius: 20.0,
        straight_threshold: 5.0,
        turn_offset: 8.0,
    }
}

#[test]
fn small_vertical_delta_routes_straight_horizontal() {
    let source = tile(0.0, 0.0);
    let target = tile(80.0, 2.0);
    let conn = route(&source, &target, RoutingMode::Orthogonal, None, &params());

    assert_eq!(conn.shape, RouteShape::Straight);
    assert_eq!(conn.start, Point::new(80.0, 40.0));
    assert_eq!(conn.end, Point::new(80.0, 42.0));
    assert_eq!(conn.segment_count(), 1);
}

#[test]
fn straight_route_ignores_spread() {
    let source = tile(200.0, 0.0);
    let target = tile(0.0, 0.0);
    let spread = Spread { index: 0, total: 3 };
    let conn = route(&source, &target, RoutingMode::Orthogonal, Some(spread), &params());
    assert_eq!(conn.start, Point::new(200.0, 40.0));
    assert_eq!(conn.end, Point::new(80.0, 40.0));
}

#[test]
fn small_horizontal_delta_routes_straight_vertical() {
    let source = tile(0.0, 200.0);
    let target = tile(3.0, 0.0);
    let conn = route(&source, &target, RoutingMode::Orthogonal, None, &params());
    assert_eq!(conn.shape, RouteShape::Straight);
    assert_eq!(conn.start, Point::new(40.0, 200.0));
    assert_eq!(conn.end, Point::new(43.0, 80.0));
}

#[test]
fn elbow_runs_vertical_then_turns_into_target_side() {
    let source = tile(0.0, 0.0);
    let target = tile(160.0, 160.0);
    let conn = route(&source, &target, RoutingMode::Orthogonal, None, &params());

    assert_eq!(conn.shape, RouteShape::Elbow);
    assert_eq!(
        conn.path.elements(),
        &[
            PathEl::MoveTo(Point::new(40.0, 80.0)),
            PathEl::LineTo(Point::new(40.0, 180.0)),
            PathEl::QuadTo(Point::new(40.0, 200.0), Point::new(60.0, 200.0)),
            PathEl::LineTo(Point::new(160.0, 200.0)),
        ]
    );
}

#[test]
fn elbow_going_up_and_left_mirrors_directions() {
    let source = tile(160.0, 160.0);
    let target = tile(0.0, 0.0);
    let conn = route(&source, &target, RoutingMode::Orthogonal, None, &params());
    assert_eq!(conn.start, Point::new(200.0, 160.0));
    assert_eq!(conn.end, Point::new(80.0, 40.0));
    assert_eq!(
        conn.path.elements()[2],
        PathEl::QuadTo(Point::new(200.0, 40.0), Point::new(180.0, 40.0))
    );
}

#[test]
fn corner_radius_shrinks_for_short_runs() {
    let source = tile(0.0, 0.0);
    let target = tile(30.0, 100.0);
    let conn = route(&source, &target, RoutingMode::Orthogonal, None, &params());
    // dx = 30 limits the radius to 15
    assert_eq!(
        conn.path.elements()[1],
        PathEl::LineTo(Point::new(40.0, 125.0))
    );
}

#[test]
fn spread_offsets_are_symmetric() {
    let width = 80.0;
    let left = spread_offset(width, Spread { index: 0, total: 3 }, 8.0);
    let mid = spread_offset(width, Spread { index: 1, total: 3 }, 8.0);
    let right = spread_offset(width, Spread { index: 2, total: 3 }, 8.0);
    assert_eq!(mid, 0.0);
    assert_eq!(left, -24.0);
    assert_eq!(right, 24.0);
    assert_eq!(spread_offset(width, Spread::LONE, 8.0), 0.0);
}

#[test]
fn spread_width_is_capped_by_tile_width() {
    // 0.6 * 40 = 24 beats 4 * 8 * 2 = 64
    let outer = spread_offset(40.0, Spread { index: 3, total: 4 }, 8.0);
    assert_eq!(outer, 12.0);
}

#[test]
fn elbow_exit_moves_with_spread() {
    let source = tile(0.0, 0.0);
    let target = tile(160.0, 160.0);
    let conn = route(
        &source,
        &target,
        RoutingMode::Orthogonal,
        Some(Spread { index: 0, total: 2 }),
        &params(),
    );
    // width = min(48, 32) = 32, first rank sits at -16
    assert_eq!(conn.start, Point::new(24.0, 80.0));
}

#[test]
fn diagonal_endpoints_stay_inside_tiles() {
    let source = tile(0.0, 0.0);
    let target = tile(120.0, 120.0);
    let conn = route(
        &source,
        &target,
        RoutingMode::Diagonal,
        Some(Spread { index: 0, total: 2 }),
        &params(),
    );
    assert_eq!(conn.shape, RouteShape::Diagonal);
    assert_eq!(conn.start, Point::new(72.0, 72.0));
    assert_eq!(conn.end, Point::new(128.0, 128.0));
    assert_eq!(conn.segment_count(), 1);
}

#[test]
fn diagonal_with_zero_dx_stays_finite() {
    let source = tile(0.0, 0.0);
    let target = tile(0.0, 120.0);
    let conn = route(&source, &target, RoutingMode::Diagonal, None, &params());
    assert_eq!(conn.start, Point::new(40.0, 72.0));
    assert!(conn.end.x.is_finite() && conn.end.y.is_finite());
}

#[test]
fn path_description_and_length() {
    let conn = route(&tile(0.0, 0.0), &tile(80.0, 0.0), RoutingMode::Orthogonal, None, &params());
    assert!(conn.path_description().starts_with('M'));
    assert!((conn.length() - 0.0).abs() < 1e-9);

    let conn = route(&tile(0.0, 0.0), &tile(160.0, 0.0), RoutingMode::Orthogonal, None, &params());
    assert!((conn.length() - 80.0).abs() < 1e-6);
}
