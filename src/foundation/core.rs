pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Milliseconds on the engine's cooperative clock.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Self = Self(0);

    /// Converts a fractional duration in seconds, rounding to the nearest millisecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::from_ms_f64(secs * 1000.0)
    }

    /// Converts a fractional millisecond value; negative and non-finite inputs clamp to zero.
    pub fn from_ms_f64(ms: f64) -> Self {
        if !ms.is_finite() || ms <= 0.0 {
            return Self::ZERO;
        }
        Self(ms.round() as u64)
    }

    pub fn after(self, delay: Millis) -> Self {
        Self(self.0.saturating_add(delay.0))
    }

    pub fn since(self, earlier: Millis) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }

    pub fn times(self, n: usize) -> Millis {
        Millis(self.0.saturating_mul(n as u64))
    }
}

/// Host-assigned handle of one rendered tile. The engine never owns the tile itself.
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
pub struct TileId(pub u32);

/// Handle of a connection line placed in the overlay.
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
pub struct LineId(pub u64);

/// Identity of a grid block's root element on the page.
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
pub struct RootId(pub u32);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
