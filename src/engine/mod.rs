//! The per-block engine: owns all playback state and drives the injected scene.
//!
//! Time is virtual. Hosts feed wall-clock progress through [`GridEngine::advance_to`]
//! and may sleep until [`GridEngine::next_deadline`]; every scheduled callback runs
//! from inside that call, one at a time.

pub mod player;
pub mod tile_state;
pub mod visibility;

use crate::animation::ease::Ease;
use crate::animation::reveal::{RandomSource, Rng64, plan_reveal};
use crate::config::{BlockConfig, ShadowStyle};
use crate::engine::player::{PlayerState, RoundPlayer, Stage, Task};
use crate::engine::tile_state::{TileBoard, VisualChange};
use crate::engine::visibility::{Readiness, VisibilityAction, VisibilityScheduler};
use crate::foundation::core::{Millis, TileId};
use crate::foundation::error::GridResult;
use crate::geometry::GridHost;
use crate::geometry::cache::GeometryCache;
use crate::grid::addressing::{GridDims, TileMap};
use crate::grid::subgrid::{ExpandTrigger, SubgridController};
use crate::scene::{LineStyle, Scene, TileTransition, TransitionCause};
use crate::schedule::timer::{TimerId, TimerQueue};

/// Resize notifications are coalesced into one geometry invalidation.
pub const RESIZE_DEBOUNCE: Millis = Millis(150);
/// Viewport notifications are coalesced into one vertical re-centering.
pub const RECENTER_DEBOUNCE: Millis = Millis(100);
pub const HOVER_IN: Millis = Millis(300);
pub const HOVER_OUT: Millis = Millis(250);

/// Observable snapshot of one block's playback.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EngineState {
    pub expanded: bool,
    pub current_round_index: usize,
    pub highlighted: Vec<TileId>,
    pub active_connections: usize,
    pub playing: bool,
    pub player: PlayerState,
}

pub struct GridEngine<H, S> {
    config: BlockConfig,
    host: H,
    scene: S,
    tiles: TileMap,
    subgrid: SubgridController,
    geometry: GeometryCache,
    board: TileBoard,
    timers: TimerQueue<Task>,
    line_style: LineStyle,
    shadow: ShadowStyle,
    rng: Box<dyn RandomSource>,
    player: RoundPlayer,
    visibility: VisibilityScheduler,
    readiness: Readiness,
    resize_timer: Option<TimerId>,
    recenter_timer: Option<TimerId>,
}

impl<H: GridHost, S: Scene> GridEngine<H, S> {
    pub fn new(config: BlockConfig, host: H, scene: S) -> GridResult<Self> {
        config.validate()?;
        let dims = config.grid.dims()?;
        let subgrid = config.grid.controller(dims);
        let tiles = TileMap::build(dims, subgrid.region());
        let geometry = GeometryCache::new(known_tiles(&tiles, &host));
        let line_style = LineStyle {
            color: config.config.line_color.clone(),
            stroke_width: config.config.line_stroke_width,
        };
        let shadow = config.config.shadow();
        let player = RoundPlayer::new(config.animation_rounds.clone());

        tracing::debug!(
            rows = dims.rows(),
            cols = dims.cols(),
            rounds = config.animation_rounds.len(),
            subgrid = subgrid.is_enabled(),
            "engine created"
        );
        Ok(Self {
            config,
            host,
            scene,
            tiles,
            subgrid,
            geometry,
            board: TileBoard::new(),
            timers: TimerQueue::new(),
            line_style,
            shadow,
            rng: Box::new(Rng64::from_entropy()),
            player,
            visibility: VisibilityScheduler::new(),
            readiness: Readiness::Ready,
            resize_timer: None,
            recenter_timer: None,
        })
    }

    /// Like [`GridEngine::new`], but a start is held until [`GridEngine::mark_ready`].
    pub fn deferred(config: BlockConfig, host: H, scene: S) -> GridResult<Self> {
        let mut engine = Self::new(config, host, scene)?;
        engine.readiness = Readiness::pending();
        Ok(engine)
    }

    /// Replaces the random source used for reveal delays.
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Resolves the readiness gate, running a start that was requested earlier.
    pub fn mark_ready(&mut self) {
        if !self.readiness.resolve() {
            return;
        }
        tracing::debug!("scene ready; running held start");
        self.start_entrance();
        if self.visibility.is_started() && !self.visibility.is_visible() {
            self.with_stage(|player, stage| {
                player.pause(stage);
            });
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    // Clock

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Runs every callback due at or before `now`, in due order, then moves the clock to `now`.
    pub fn advance_to(&mut self, now: Millis) {
        while let Some((id, task)) = self.timers.pop_due(now) {
            tracing::trace!(?id, ?task, at = self.timers.now().0, "timer fired");
            self.dispatch(task);
        }
        self.timers.advance_clock(now);
        self.scene.advance_clock(self.timers.now());
    }

    pub fn advance_by(&mut self, delta: Millis) {
        self.advance_to(self.now().after(delta));
    }

    fn dispatch(&mut self, task: Task) {
        self.scene.advance_clock(self.timers.now());
        match task {
            Task::InvalidateGeometry => {
                self.resize_timer = None;
                self.geometry.invalidate();
            }
            Task::Recenter { viewport_height } => {
                self.recenter_timer = None;
                let grid_height = self.host.wrapper_rect().height();
                let offset = ((viewport_height - grid_height) / 2.0).max(0.0);
                self.scene.set_vertical_offset(offset);
            }
            task => self.with_stage(|player, stage| player.handle(stage, task)),
        }
    }

    // Visibility

    /// Feeds one intersection observation of the block.
    pub fn on_intersection(&mut self, ratio: f64) {
        let action = self.visibility.observe(ratio);
        self.apply_visibility(action);
    }

    /// The host has no way to observe visibility; play unconditionally.
    pub fn observation_unavailable(&mut self) {
        let action = self.visibility.observation_unavailable();
        self.apply_visibility(action);
    }

    fn apply_visibility(&mut self, action: VisibilityAction) {
        match action {
            VisibilityAction::Start => self.start(),
            VisibilityAction::Resume => self.resume(),
            VisibilityAction::Pause => self.pause(),
            VisibilityAction::Nothing => {}
        }
    }

    // Playback

    /// Starts the entrance animation, or holds the request until the scene is ready.
    pub fn start(&mut self) {
        if self.readiness.request_start() {
            self.start_entrance();
        } else {
            tracing::debug!("start requested before scene is ready; holding");
        }
    }

    fn start_entrance(&mut self) {
        let entrance: Vec<TileId> = self
            .tiles
            .iter()
            .filter(|t| t.in_subgrid)
            .filter_map(|t| self.host.resolve(t.position))
            .collect();
        self.with_stage(|player, stage| player.start(stage, entrance));
    }

    pub fn play_round(&mut self) {
        self.with_stage(|player, stage| player.play_round(stage));
    }

    pub fn pause(&mut self) {
        self.with_stage(|player, stage| {
            player.pause(stage);
        });
    }

    pub fn resume(&mut self) {
        self.with_stage(|player, stage| {
            player.resume(stage);
        });
    }

    /// Terminal: cancels every timer and clears highlights and lines.
    pub fn stop(&mut self) {
        self.with_stage(|player, stage| player.stop(stage));
        self.timers.cancel_all();
        self.resize_timer = None;
        self.recenter_timer = None;
        tracing::debug!("engine stopped");
    }

    // Geometry

    /// The page layout changed; geometry is re-measured after the debounce window.
    pub fn notify_resize(&mut self) {
        if self.is_stopped() {
            return;
        }
        if let Some(id) = self.resize_timer.take() {
            self.timers.cancel(id);
        }
        self.resize_timer = Some(self.timers.schedule(RESIZE_DEBOUNCE, Task::InvalidateGeometry));
    }

    /// The viewport changed height; the grid is re-centered after the debounce window.
    pub fn notify_viewport(&mut self, viewport_height: f64) {
        if self.is_stopped() {
            return;
        }
        if let Some(id) = self.recenter_timer.take() {
            self.timers.cancel(id);
        }
        self.recenter_timer = Some(
            self.timers
                .schedule(RECENTER_DEBOUNCE, Task::Recenter { viewport_height }),
        );
    }

    /// Changes the active grid size, rebuilding both addressings.
    pub fn set_dims(&mut self, rows: u32, cols: u32) -> GridResult<()> {
        let dims = GridDims::new(rows, cols)?;
        if let Some(region) = self.subgrid.region() {
            region.validate(dims)?;
        }
        self.config.grid.grid_rows = rows;
        self.config.grid.grid_cols = cols;
        self.tiles = TileMap::build(dims, self.subgrid.region());
        self.geometry.reset(known_tiles(&self.tiles, &self.host));
        tracing::debug!(rows, cols, "grid dimensions changed");
        Ok(())
    }

    // Expansion

    pub fn on_click(&mut self, selector: &str) -> bool {
        let fired = self.subgrid.on_click(selector);
        self.after_trigger(ExpandTrigger::Click, fired)
    }

    pub fn on_custom_event(&mut self, name: &str) -> bool {
        let fired = self.subgrid.on_event(name);
        self.after_trigger(ExpandTrigger::Event, fired)
    }

    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        let fired = self.subgrid.on_scroll(scroll_y);
        self.after_trigger(ExpandTrigger::Scroll, fired)
    }

    /// Expands the collapsed subgrid. Returns `false` when it already was, or is disabled.
    pub fn expand(&mut self) -> bool {
        let fired = self.subgrid.expand();
        self.after_trigger(ExpandTrigger::Direct, fired)
    }

    fn after_trigger(&mut self, trigger: ExpandTrigger, fired: bool) -> bool {
        if !fired {
            return false;
        }
        let expansion: Vec<TileId> = self
            .tiles
            .iter()
            .filter(|t| !t.in_subgrid)
            .filter_map(|t| self.host.resolve(t.position))
            .collect();
        self.scene.advance_clock(self.timers.now());
        self.scene.mark_expanded();
        for step in plan_reveal(expansion.iter().copied(), &mut *self.rng) {
            self.scene.reveal_tile(&step);
        }
        self.geometry.invalidate();
        tracing::debug!(?trigger, tiles = expansion.len(), "subgrid expanded");
        true
    }

    // Highlighting

    pub fn pointer_enter(&mut self, tile: TileId) {
        if self.board.pointer_enter(tile) == VisualChange::Activate {
            let transition = self.hover_look(true);
            self.scene.advance_clock(self.timers.now());
            self.scene.transition_tile(tile, &transition);
        }
    }

    pub fn pointer_leave(&mut self, tile: TileId) {
        if self.board.pointer_leave(tile) == VisualChange::Deactivate {
            let transition = self.hover_look(false);
            self.scene.advance_clock(self.timers.now());
            self.scene.transition_tile(tile, &transition);
        }
    }

    fn hover_look(&self, active: bool) -> TileTransition {
        let anim = &self.config.config;
        if active {
            TileTransition {
                active,
                cause: TransitionCause::Hover,
                duration: HOVER_IN,
                shadow_duration: anim.shadow_fade_in(),
                ease: Ease::OutBack,
            }
        } else {
            TileTransition {
                active,
                cause: TransitionCause::Hover,
                duration: HOVER_OUT,
                shadow_duration: anim.shadow_fade_out(),
                ease: Ease::OutQuad,
            }
        }
    }

    /// Highlight requested from outside the round loop. Hovered tiles are left alone.
    pub fn highlight_tile(&mut self, tile: TileId) {
        self.with_stage(|_, stage| {
            stage.scene.advance_clock(stage.timers.now());
            stage.highlight(tile, TransitionCause::External);
        });
    }

    pub fn unhighlight_tile(&mut self, tile: TileId) {
        self.with_stage(|_, stage| {
            stage.scene.advance_clock(stage.timers.now());
            stage.unhighlight(tile, TransitionCause::External);
        });
    }

    // Inspection

    pub fn state(&self) -> EngineState {
        EngineState {
            expanded: self.subgrid.is_expanded(),
            current_round_index: self.player.current_round_index(),
            highlighted: self.player.highlighted().iter().copied().collect(),
            active_connections: self.player.active_connections(),
            playing: self.player.is_playing(),
            player: self.player.state(),
        }
    }

    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    pub fn rounds_played(&self) -> u64 {
        self.player.rounds_played()
    }

    pub fn is_stopped(&self) -> bool {
        self.player.state() == PlayerState::Stopped
    }

    /// Whether `tile` is rendered by this block's host.
    pub fn owns(&self, tile: TileId) -> bool {
        self.tiles
            .iter()
            .any(|t| self.host.resolve(t.position) == Some(tile))
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    pub fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    pub fn shadow(&self) -> &ShadowStyle {
        &self.shadow
    }

    pub fn geometry_rebuilds(&self) -> u64 {
        self.geometry.rebuild_count()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access. Layout changes made through it need [`GridEngine::notify_resize`].
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    fn with_stage<R>(&mut self, f: impl FnOnce(&mut RoundPlayer, &mut Stage<'_, H, S>) -> R) -> R {
        let Self {
            config,
            host,
            scene,
            tiles,
            subgrid,
            geometry,
            board,
            timers,
            line_style,
            rng,
            player,
            ..
        } = self;
        let mut stage = Stage {
            host: &*host,
            scene,
            tiles: &*tiles,
            subgrid: &*subgrid,
            geometry,
            board,
            timers,
            config: &*config,
            line_style: &*line_style,
            rng: &mut **rng,
        };
        f(player, &mut stage)
    }
}

fn known_tiles<H: GridHost + ?Sized>(tiles: &TileMap, host: &H) -> Vec<TileId> {
    tiles
        .iter()
        .filter_map(|t| host.resolve(t.position))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/engine/engine.rs"]
mod tests;
