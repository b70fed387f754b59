use crate::foundation::error::{GridError, GridResult};
use crate::grid::addressing::{Cell, FullPosition, GridDims};

/// Rectangle of the active grid that is shown before expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubgridRegion {
    pub start_row: u32,
    pub start_col: u32,
    pub rows: u32,
    pub cols: u32,
}

impl SubgridRegion {
    pub fn new(start_row: u32, start_col: u32, rows: u32, cols: u32) -> Self {
        Self {
            start_row,
            start_col,
            rows,
            cols,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= self.start_row
            && cell.row < self.start_row + self.rows
            && cell.col >= self.start_col
            && cell.col < self.start_col + self.cols
    }

    pub fn validate(&self, dims: GridDims) -> GridResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::validation("subgrid must have at least one row and column"));
        }
        if self.start_row + self.rows > dims.rows() || self.start_col + self.cols > dims.cols() {
            return Err(GridError::validation(format!(
                "subgrid {}x{} at ({}, {}) exceeds the {}x{} grid",
                self.rows,
                self.cols,
                self.start_row,
                self.start_col,
                dims.rows(),
                dims.cols()
            )));
        }
        Ok(())
    }
}

/// Which of the independent trigger sources caused the expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpandTrigger {
    Click,
    Event,
    Scroll,
    Direct,
}

/// Trigger wiring for the one-shot expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubgridTriggers {
    pub button_selector: Option<String>,
    pub event_name: Option<String>,
    /// Fires the first time the page scroll offset reaches this value.
    pub scroll_y: Option<f64>,
}

/// Tracks collapsed/expanded state and answers tile visibility.
#[derive(Clone, Debug)]
pub struct SubgridController {
    // `None` when the subgrid feature is disabled.
    region: Option<SubgridRegion>,
    triggers: SubgridTriggers,
    expanded: bool,
    scroll_fired: bool,
}

impl SubgridController {
    pub fn disabled() -> Self {
        Self {
            region: None,
            triggers: SubgridTriggers::default(),
            expanded: false,
            scroll_fired: false,
        }
    }

    pub fn new(region: SubgridRegion, triggers: SubgridTriggers) -> Self {
        Self {
            region: Some(region),
            triggers,
            expanded: false,
            scroll_fired: false,
        }
    }

    pub fn region(&self) -> Option<&SubgridRegion> {
        self.region.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.region.is_some()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_visible(&self, dims: GridDims, position: FullPosition) -> bool {
        let Some(region) = self.region.as_ref() else {
            return true;
        };
        if self.expanded {
            return true;
        }
        dims.cell_of(position).is_some_and(|cell| region.contains(cell))
    }

    /// Latches the expanded state. Returns `true` only for the call that performed the expansion.
    pub fn expand(&mut self) -> bool {
        if self.region.is_none() || self.expanded {
            return false;
        }
        self.expanded = true;
        true
    }

    pub fn on_click(&mut self, selector: &str) -> bool {
        let armed = self
            .triggers
            .button_selector
            .as_deref()
            .is_some_and(|s| !s.is_empty() && s == selector);
        armed && self.expand()
    }

    pub fn on_event(&mut self, name: &str) -> bool {
        let armed = self
            .triggers
            .event_name
            .as_deref()
            .is_some_and(|n| !n.is_empty() && n == name);
        armed && self.expand()
    }

    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        let Some(threshold) = self.triggers.scroll_y.filter(|t| *t > 0.0) else {
            return false;
        };
        if self.scroll_fired || scroll_y < threshold {
            return false;
        }
        self.scroll_fired = true;
        self.expand()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/subgrid.rs"]
mod tests;
