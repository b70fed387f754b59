//! Output side of the engine: every visual mutation goes through [`Scene`].

pub mod recorder;
pub mod svg;

use crate::animation::ease::Ease;
use crate::animation::reveal::RevealStep;
use crate::foundation::core::{LineId, Millis, TileId};
use crate::routing::router::Connection;

/// Why a tile's visual state is changing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    Round,
    Hover,
    External,
    Reset,
}

/// Timed switch of a tile between its rest and active looks.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TileTransition {
    pub active: bool,
    pub cause: TransitionCause,
    pub duration: Millis,
    pub shadow_duration: Millis,
    pub ease: Ease,
}

/// Stroke progress target of a connection line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePhase {
    /// Fully drawn from start to end.
    Drawn,
    /// Wiped off past the end point.
    Erased,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LineStyle {
    pub color: String,
    pub stroke_width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "#333".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// Host-side renderer, injected into the engine at construction.
///
/// Calls are fire-and-forget: the engine keeps its own bookkeeping and never
/// reads visual state back.
pub trait Scene {
    /// Called with the cooperative clock before each batch of mutations.
    fn advance_clock(&mut self, _now: Millis) {}

    fn transition_tile(&mut self, tile: TileId, transition: &TileTransition);

    fn reveal_tile(&mut self, step: &RevealStep);

    /// The collapsed subgrid has been expanded to the full grid.
    fn mark_expanded(&mut self);

    /// Adds a line to the overlay with its stroke fully hidden.
    fn insert_line(&mut self, line: LineId, connection: &Connection, style: &LineStyle);

    fn animate_line(&mut self, line: LineId, phase: LinePhase, duration: Millis, ease: Ease);

    fn remove_line(&mut self, line: LineId);

    fn set_vertical_offset(&mut self, _offset: f64) {}
}
