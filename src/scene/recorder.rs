use crate::animation::ease::Ease;
use crate::animation::reveal::RevealStep;
use crate::foundation::core::{LineId, Millis, Point, TileId};
use crate::routing::router::{Connection, RouteShape};
use crate::scene::{LinePhase, LineStyle, Scene, TileTransition};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneEvent {
    Tile {
        tile: TileId,
        #[serde(flatten)]
        transition: TileTransition,
    },
    Reveal(RevealStep),
    Expanded,
    LineInserted {
        line: LineId,
        shape: RouteShape,
        start: Point,
        end: Point,
        d: String,
    },
    LineAnimated {
        line: LineId,
        phase: LinePhase,
        duration: Millis,
        ease: Ease,
    },
    LineRemoved {
        line: LineId,
    },
    VerticalOffset {
        offset: f64,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Stamped {
    pub at: Millis,
    #[serde(flatten)]
    pub event: SceneEvent,
}

/// Scene that keeps an ordered, timestamped log of every mutation.
#[derive(Debug, Default)]
pub struct SceneRecorder {
    now: Millis,
    pub events: Vec<Stamped>,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> impl Iterator<Item = &SceneEvent> {
        self.events.iter().map(|s| &s.event)
    }

    /// Tiles switched to (or from) their active look, in order.
    pub fn tile_changes(&self, active: bool) -> Vec<TileId> {
        self.events()
            .filter_map(|e| match e {
                SceneEvent::Tile { tile, transition } if transition.active == active => Some(*tile),
                _ => None,
            })
            .collect()
    }

    pub fn inserted_lines(&self) -> Vec<LineId> {
        self.events()
            .filter_map(|e| match e {
                SceneEvent::LineInserted { line, .. } => Some(*line),
                _ => None,
            })
            .collect()
    }

    pub fn removed_lines(&self) -> Vec<LineId> {
        self.events()
            .filter_map(|e| match e {
                SceneEvent::LineRemoved { line } => Some(*line),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, event: SceneEvent) {
        self.events.push(Stamped {
            at: self.now,
            event,
        });
    }
}

impl Scene for SceneRecorder {
    fn advance_clock(&mut self, now: Millis) {
        self.now = now;
    }

    fn transition_tile(&mut self, tile: TileId, transition: &TileTransition) {
        self.push(SceneEvent::Tile {
            tile,
            transition: *transition,
        });
    }

    fn reveal_tile(&mut self, step: &RevealStep) {
        self.push(SceneEvent::Reveal(*step));
    }

    fn mark_expanded(&mut self) {
        self.push(SceneEvent::Expanded);
    }

    fn insert_line(&mut self, line: LineId, connection: &Connection, _style: &LineStyle) {
        self.push(SceneEvent::LineInserted {
            line,
            shape: connection.shape,
            start: connection.start,
            end: connection.end,
            d: connection.path_description(),
        });
    }

    fn animate_line(&mut self, line: LineId, phase: LinePhase, duration: Millis, ease: Ease) {
        self.push(SceneEvent::LineAnimated {
            line,
            phase,
            duration,
            ease,
        });
    }

    fn remove_line(&mut self, line: LineId) {
        self.push(SceneEvent::LineRemoved { line });
    }

    fn set_vertical_offset(&mut self, offset: f64) {
        self.push(SceneEvent::VerticalOffset { offset });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/recorder.rs"]
mod tests;
