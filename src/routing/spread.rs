use crate::foundation::core::Vec2;
use crate::routing::router::Spread;

/// Vertical direction of a target relative to its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    Up,
    Down,
    Level,
}

pub fn heading(delta: Vec2, straight_threshold: f64) -> Heading {
    if delta.y.abs() < straight_threshold {
        Heading::Level
    } else if delta.y < 0.0 {
        Heading::Up
    } else {
        Heading::Down
    }
}

/// Ranks each target inside its heading bucket.
///
/// Up and down buckets are ordered left to right; the level bucket is
/// ordered by vertical offset. Output is parallel to `deltas`.
pub fn assign_spread(deltas: &[Vec2], straight_threshold: f64) -> Vec<Spread> {
    let headings: Vec<Heading> = deltas
        .iter()
        .map(|d| heading(*d, straight_threshold))
        .collect();

    let mut out = vec![Spread::LONE; deltas.len()];
    for bucket in [Heading::Up, Heading::Down, Heading::Level] {
        let mut members: Vec<usize> = (0..deltas.len())
            .filter(|&i| headings[i] == bucket)
            .collect();
        if bucket == Heading::Level {
            members.sort_by(|&a, &b| deltas[a].y.total_cmp(&deltas[b].y));
        } else {
            members.sort_by(|&a, &b| deltas[a].x.total_cmp(&deltas[b].x));
        }
        let total = members.len();
        for (index, &i) in members.iter().enumerate() {
            out[i] = Spread { index, total };
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/routing/spread.rs"]
mod tests;
