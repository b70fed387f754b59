use kurbo::{ParamCurveArclen, PathEl};

use crate::foundation::core::{BezPath, Point, Vec2};
use crate::geometry::cache::TileGeometry;

/// Fraction of the centre-to-edge distance used by diagonal endpoints.
const DIAGONAL_INSET: f64 = 0.8;
/// Upper bound of the spread fan relative to the tile width.
const SPREAD_WIDTH_RATIO: f64 = 0.6;
const ARCLEN_ACCURACY: f64 = 1e-3;

/// Line shape policy for one group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Axis-aligned runs joined by one rounded corner.
    #[default]
    Orthogonal,
    /// Direct line between the two centres.
    Diagonal,
}

/// Routing constants, in wrapper pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct RouteParams {
    pub corner_radius: f64,
    pub straight_threshold: f64,
    pub turn_offset: f64,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            corner_radius: 20.0,
            straight_threshold: 5.0,
            turn_offset: 8.0,
        }
    }
}

/// Rank of one target within its directional bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Spread {
    pub index: usize,
    pub total: usize,
}

impl Spread {
    pub const LONE: Self = Self { index: 0, total: 1 };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteShape {
    Straight,
    Elbow,
    Diagonal,
}

/// Computed line between two tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub start: Point,
    pub end: Point,
    pub shape: RouteShape,
    pub path: BezPath,
}

impl Connection {
    /// SVG path data for the overlay.
    pub fn path_description(&self) -> String {
        self.path.to_svg()
    }

    pub fn length(&self) -> f64 {
        self.path
            .segments()
            .map(|seg| seg.arclen(ARCLEN_ACCURACY))
            .sum()
    }

    /// Number of drawing commands after the initial move.
    pub fn segment_count(&self) -> usize {
        self.path
            .elements()
            .iter()
            .filter(|el| !matches!(el, PathEl::MoveTo(_)))
            .count()
    }
}

/// Horizontal exit offset for a spread rank; zero for a lone target.
pub fn spread_offset(rect_width: f64, spread: Spread, turn_offset: f64) -> f64 {
    if spread.total <= 1 {
        return 0.0;
    }
    let total = spread.total as f64;
    let width = (rect_width * SPREAD_WIDTH_RATIO).min(total * turn_offset * 2.0);
    let step = width / (total - 1.0);
    -width / 2.0 + step * spread.index as f64
}

pub fn route(
    source: &TileGeometry,
    target: &TileGeometry,
    mode: RoutingMode,
    spread: Option<Spread>,
    params: &RouteParams,
) -> Connection {
    let delta = target.center - source.center;
    match mode {
        RoutingMode::Orthogonal => route_orthogonal(source, target, delta, spread, params),
        RoutingMode::Diagonal => route_diagonal(source, target, delta),
    }
}

fn route_orthogonal(
    source: &TileGeometry,
    target: &TileGeometry,
    delta: Vec2,
    spread: Option<Spread>,
    params: &RouteParams,
) -> Connection {
    let (abs_dx, abs_dy) = (delta.x.abs(), delta.y.abs());
    let threshold = params.straight_threshold;

    if abs_dy < threshold {
        let (start_x, end_x) = if delta.x > 0.0 {
            (source.rect.x1, target.rect.x0)
        } else {
            (source.rect.x0, target.rect.x1)
        };
        let start = Point::new(start_x, source.center.y);
        let end = Point::new(end_x, target.center.y);
        return straight(start, end, RouteShape::Straight);
    }
    if abs_dx < threshold {
        let (start_y, end_y) = if delta.y > 0.0 {
            (source.rect.y1, target.rect.y0)
        } else {
            (source.rect.y0, target.rect.y1)
        };
        let start = Point::new(source.center.x, start_y);
        let end = Point::new(target.center.x, end_y);
        return straight(start, end, RouteShape::Straight);
    }

    let offset = spread_offset(
        source.rect.width(),
        spread.unwrap_or(Spread::LONE),
        params.turn_offset,
    );
    let x_dir = delta.x.signum();
    let y_dir = delta.y.signum();
    let start = Point::new(
        source.center.x + offset,
        if delta.y > 0.0 { source.rect.y1 } else { source.rect.y0 },
    );
    let end = Point::new(
        if delta.x > 0.0 { target.rect.x0 } else { target.rect.x1 },
        target.center.y,
    );

    let radius = params.corner_radius.min(abs_dx / 2.0).min(abs_dy / 2.0);
    let corner_y = target.center.y;
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to((start.x, corner_y - y_dir * radius));
    path.quad_to((start.x, corner_y), (start.x + x_dir * radius, corner_y));
    path.line_to(end);

    Connection {
        start,
        end,
        shape: RouteShape::Elbow,
        path,
    }
}

fn route_diagonal(source: &TileGeometry, target: &TileGeometry, delta: Vec2) -> Connection {
    let start = source.center + delta * diagonal_ratio(source, delta) * DIAGONAL_INSET;
    let end = target.center - delta * diagonal_ratio(target, delta) * DIAGONAL_INSET;
    straight(start, end, RouteShape::Diagonal)
}

// A zero component is treated as one pixel so the ratio stays finite.
fn diagonal_ratio(geom: &TileGeometry, delta: Vec2) -> f64 {
    let dx = if delta.x == 0.0 { 1.0 } else { delta.x.abs() };
    let dy = if delta.y == 0.0 { 1.0 } else { delta.y.abs() };
    (geom.half_width() / dx).min(geom.half_height() / dy)
}

fn straight(start: Point, end: Point, shape: RouteShape) -> Connection {
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(end);
    Connection {
        start,
        end,
        shape,
        path,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/routing/router.rs"]
mod tests;
