use std::collections::HashMap;

use crate::foundation::core::TileId;

/// Who currently owns a tile's active look. Pointer hover outranks scripted highlights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileState {
    #[default]
    Idle,
    /// `scripted` records a round highlight held underneath the pointer.
    Hovered { scripted: bool },
    ScriptHighlighted,
}

/// Change the scene has to apply after an arbitration step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualChange {
    None,
    Activate,
    Deactivate,
}

/// Per-tile arbitration between hover and scripted highlight.
#[derive(Debug, Default)]
pub struct TileBoard {
    states: HashMap<TileId, TileState>,
}

impl TileBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, tile: TileId) -> TileState {
        self.states.get(&tile).copied().unwrap_or_default()
    }

    pub fn is_hovered(&self, tile: TileId) -> bool {
        matches!(self.state(tile), TileState::Hovered { .. })
    }

    pub fn script_highlight(&mut self, tile: TileId) -> VisualChange {
        match self.state(tile) {
            TileState::Idle => {
                self.set(tile, TileState::ScriptHighlighted);
                VisualChange::Activate
            }
            TileState::Hovered { .. } => {
                self.set(tile, TileState::Hovered { scripted: true });
                VisualChange::None
            }
            TileState::ScriptHighlighted => VisualChange::None,
        }
    }

    pub fn script_unhighlight(&mut self, tile: TileId) -> VisualChange {
        match self.state(tile) {
            TileState::ScriptHighlighted => {
                self.set(tile, TileState::Idle);
                VisualChange::Deactivate
            }
            TileState::Hovered { .. } => {
                self.set(tile, TileState::Hovered { scripted: false });
                VisualChange::None
            }
            TileState::Idle => VisualChange::None,
        }
    }

    pub fn pointer_enter(&mut self, tile: TileId) -> VisualChange {
        match self.state(tile) {
            TileState::Idle => {
                self.set(tile, TileState::Hovered { scripted: false });
                VisualChange::Activate
            }
            // Already showing the active look; hover just takes ownership.
            TileState::ScriptHighlighted => {
                self.set(tile, TileState::Hovered { scripted: true });
                VisualChange::None
            }
            TileState::Hovered { .. } => VisualChange::None,
        }
    }

    pub fn pointer_leave(&mut self, tile: TileId) -> VisualChange {
        match self.state(tile) {
            TileState::Hovered { scripted: false } => {
                self.set(tile, TileState::Idle);
                VisualChange::Deactivate
            }
            // The round still holds the tile; it stays active until the reverse.
            TileState::Hovered { scripted: true } => {
                self.set(tile, TileState::ScriptHighlighted);
                VisualChange::None
            }
            TileState::Idle | TileState::ScriptHighlighted => VisualChange::None,
        }
    }

/// Tiles in `TileState::Idle`, taken from `candidates`.
    pub fn idle<'a>(&'a self, candidates: &'a [TileId]) -> impl Iterator<Item = TileId> + 'a {
        candidates
            .iter()
            .copied()
            .filter(|t| self.state(*t) == TileState::Idle)
    }

    fn set(&mut self, tile: TileId, state: TileState) {
        if state == TileState::Idle {
            self.states.remove(&tile);
        } else {
            self.states.insert(tile, state);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/tile_state.rs"]
mod tests;
