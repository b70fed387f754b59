/// Intersection ratio at which the block counts as on screen.
pub const VISIBLE_RATIO: f64 = 0.1;

/// What the player should do after a visibility observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityAction {
    Start,
    Resume,
    Pause,
    Nothing,
}

/// Turns intersection observations into start/pause/resume edges.
#[derive(Debug, Default)]
pub struct VisibilityScheduler {
    started: bool,
    visible: bool,
}

impl VisibilityScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn observe(&mut self, ratio: f64) -> VisibilityAction {
        let visible = ratio > 0.0 && ratio >= VISIBLE_RATIO;
        if visible == self.visible {
            return VisibilityAction::Nothing;
        }
        self.visible = visible;
        match (visible, self.started) {
            (true, false) => {
                self.started = true;
                VisibilityAction::Start
            }
            (true, true) => VisibilityAction::Resume,
            (false, _) => VisibilityAction::Pause,
        }
    }

    /// The host cannot observe intersections; play as if always on screen.
    pub fn observation_unavailable(&mut self) -> VisibilityAction {
        self.visible = true;
        if self.started {
            return VisibilityAction::Nothing;
        }
        self.started = true;
        VisibilityAction::Start
    }
}

/// Gate for the injected scene: a start requested before it is ready is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Pending { start_requested: bool },
}

impl Readiness {
    pub fn pending() -> Self {
        Self::Pending {
            start_requested: false,
        }
    }

    /// Returns `true` when the start may run now; otherwise records it for later.
    pub fn request_start(&mut self) -> bool {
        match self {
            Self::Ready => true,
            Self::Pending { start_requested } => {
                *start_requested = true;
                false
            }
        }
    }

    /// Resolves the gate. Returns `true` when a held start must run now.
    pub fn resolve(&mut self) -> bool {
        let held = matches!(
            self,
            Self::Pending {
                start_requested: true
            }
        );
        *self = Self::Ready;
        held
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/visibility.rs"]
mod tests;
