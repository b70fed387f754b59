use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::animation::ease::Ease;
use crate::animation::reveal::{RandomSource, plan_reveal};
use crate::config::{BlockConfig, ConnectionGroup, RoundSet};
use crate::engine::tile_state::{TileBoard, VisualChange};
use crate::foundation::core::{LineId, Millis, TileId, Vec2};
use crate::geometry::GridHost;
use crate::geometry::cache::GeometryCache;
use crate::grid::addressing::{FullPosition, TileMap};
use crate::grid::subgrid::SubgridController;
use crate::routing::router::{Connection, RoutingMode, route};
use crate::routing::spread::assign_spread;
use crate::scene::{LinePhase, LineStyle, Scene, TileTransition, TransitionCause};
use crate::schedule::timer::{TimerId, TimerQueue};

/// Delay after the entrance starts at which idle tiles are reset to their rest look.
pub const ENTRANCE_RESET_DELAY: Millis = Millis(1900);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayerState {
    Idle,
    /// `paused` is set when the block left the screen before the loop began.
    EntranceAnimating { paused: bool },
    Looping,
    Paused,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Task {
    EntranceReset,
    EntranceSettle,
    NextRound,
    GroupStart { generation: u64, group: usize },
    HighlightTargets { generation: u64, group: usize },
    Reverse { generation: u64 },
    Cleanup { generation: u64 },
    InvalidateGeometry,
    Recenter { viewport_height: f64 },
}

/// Everything a playback step may touch, borrowed from the engine for one call.
pub(crate) struct Stage<'a, H: ?Sized, S: ?Sized> {
    pub host: &'a H,
    pub scene: &'a mut S,
    pub tiles: &'a TileMap,
    pub subgrid: &'a SubgridController,
    pub geometry: &'a mut GeometryCache,
    pub board: &'a mut TileBoard,
    pub timers: &'a mut TimerQueue<Task>,
    pub config: &'a BlockConfig,
    pub line_style: &'a LineStyle,
    pub rng: &'a mut dyn RandomSource,
}

impl<H: GridHost + ?Sized, S: Scene + ?Sized> Stage<'_, H, S> {
    pub fn resolve(&self, position: FullPosition) -> Option<TileId> {
        self.tiles.get(position)?;
        self.host.resolve(position)
    }

    pub fn highlight(&mut self, tile: TileId, cause: TransitionCause) {
        if self.board.script_highlight(tile) == VisualChange::Activate {
            let transition = self.active_look(cause);
            self.scene.transition_tile(tile, &transition);
        }
    }

    pub fn unhighlight(&mut self, tile: TileId, cause: TransitionCause) {
        if self.board.script_unhighlight(tile) == VisualChange::Deactivate {
            let transition = self.rest_look(cause);
            self.scene.transition_tile(tile, &transition);
        }
    }

    pub fn active_look(&self, cause: TransitionCause) -> TileTransition {
        TileTransition {
            active: true,
            cause,
            duration: self.config.config.cell_anim(),
            shadow_duration: self.config.config.shadow_fade_in(),
            ease: Ease::OutBack,
        }
    }

    pub fn rest_look(&self, cause: TransitionCause) -> TileTransition {
        TileTransition {
            active: false,
            cause,
            duration: self.config.config.cell_anim(),
            shadow_duration: self.config.config.shadow_fade_out(),
            ease: Ease::InOutQuad,
        }
    }
}

#[derive(Debug)]
struct PlannedGroup {
    source: TileId,
    targets: SmallVec<[TileId; 4]>,
    lines: SmallVec<[LineId; 4]>,
    start_timer: TimerId,
    started: bool,
}

#[derive(Debug)]
struct ActiveRound {
    generation: u64,
    round_index: usize,
    groups: Vec<PlannedGroup>,
    timers: Vec<TimerId>,
}

/// Why a group was left out of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Skip {
    Hidden,
    Unresolved,
    Unmeasured,
}

struct GroupPlan {
    source: TileId,
    targets: SmallVec<[TileId; 4]>,
    connections: SmallVec<[Connection; 4]>,
}

/// Round playback state machine.
#[derive(Debug)]
pub struct RoundPlayer {
    state: PlayerState,
    rounds: RoundSet,
    current_round_index: usize,
    highlighted: BTreeSet<TileId>,
    active: Option<ActiveRound>,
    generation: u64,
    next_line: u64,
    interval: Option<TimerId>,
    entrance_tiles: Vec<TileId>,
    entrance_timers: SmallVec<[TimerId; 2]>,
    rounds_played: u64,
}

impl RoundPlayer {
    pub fn new(rounds: RoundSet) -> Self {
        Self {
            state: PlayerState::Idle,
            rounds,
            current_round_index: 0,
            highlighted: BTreeSet::new(),
            active: None,
            generation: 0,
            next_line: 0,
            interval: None,
            entrance_tiles: Vec::new(),
            entrance_timers: SmallVec::new(),
            rounds_played: 0,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn current_round_index(&self) -> usize {
        self.current_round_index
    }

    pub fn highlighted(&self) -> &BTreeSet<TileId> {
        &self.highlighted
    }

    /// Lines currently placed in the overlay by the round in flight.
    pub fn active_connections(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |a| a.groups.iter().map(|g| g.lines.len()).sum())
    }

    /// Round index of the round in flight, if any.
    pub fn round_in_flight(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.round_index)
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    pub fn is_playing(&self) -> bool {
        matches!(
            self.state,
            PlayerState::Looping | PlayerState::EntranceAnimating { paused: false }
        )
    }

    /// `Idle → EntranceAnimating`: reveals `entrance_tiles` and arms the settle timer.
    pub(crate) fn start<H, S>(&mut self, stage: &mut Stage<'_, H, S>, entrance_tiles: Vec<TileId>)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        if self.state != PlayerState::Idle {
            return;
        }
        for step in plan_reveal(entrance_tiles.iter().copied(), &mut *stage.rng) {
            stage.scene.reveal_tile(&step);
        }
        self.entrance_tiles = entrance_tiles;
        self.entrance_timers = SmallVec::from_buf([
            stage
                .timers
                .schedule(ENTRANCE_RESET_DELAY, Task::EntranceReset),
            stage
                .timers
                .schedule(stage.config.config.startup(), Task::EntranceSettle),
        ]);
        self.state = PlayerState::EntranceAnimating { paused: false };
        tracing::debug!(tiles = self.entrance_tiles.len(), "entrance started");
    }

    /// Cancels the loop timer. Timers of a round already in flight keep running.
    pub(crate) fn pause<H, S>(&mut self, stage: &mut Stage<'_, H, S>) -> bool
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        match self.state {
            PlayerState::Looping => {
                if let Some(id) = self.interval.take() {
                    stage.timers.cancel(id);
                }
                self.state = PlayerState::Paused;
                tracing::debug!(round = self.current_round_index, "paused");
                true
            }
            PlayerState::EntranceAnimating { paused: false } => {
                self.state = PlayerState::EntranceAnimating { paused: true };
                true
            }
            _ => false,
        }
    }

    /// Replays the round in flight (or the next one when none is) and re-arms the loop.
    pub(crate) fn resume<H, S>(&mut self, stage: &mut Stage<'_, H, S>) -> bool
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        match self.state {
            PlayerState::Paused => {
                if let Some(index) = self.round_in_flight() {
                    self.current_round_index = index;
                }
                tracing::debug!(round = self.current_round_index, "resumed");
                self.enter_loop(stage);
                true
            }
            PlayerState::EntranceAnimating { paused: true } => {
                self.state = PlayerState::EntranceAnimating { paused: false };
                true
            }
            _ => false,
        }
    }

    /// Terminal teardown: cancels every timer this player armed and clears the overlay.
    pub(crate) fn stop<H, S>(&mut self, stage: &mut Stage<'_, H, S>)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        if let Some(id) = self.interval.take() {
            stage.timers.cancel(id);
        }
        for id in self.entrance_timers.drain(..) {
            stage.timers.cancel(id);
        }
        self.release(stage);
        self.state = PlayerState::Stopped;
    }

    pub(crate) fn handle<H, S>(&mut self, stage: &mut Stage<'_, H, S>, task: Task)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        match task {
            Task::EntranceReset => {
                let transition = stage.rest_look(TransitionCause::Reset);
                let idle: Vec<TileId> = stage.board.idle(&self.entrance_tiles).collect();
                for tile in idle {
                    stage.scene.transition_tile(tile, &transition);
                }
            }
            Task::EntranceSettle => match self.state {
                PlayerState::EntranceAnimating { paused: false } => self.enter_loop(stage),
                PlayerState::EntranceAnimating { paused: true } => {
                    self.state = PlayerState::Paused;
                }
                _ => {}
            },
            Task::NextRound => {
                if self.state == PlayerState::Looping {
                    self.play_round(stage);
                }
            }
            Task::GroupStart { generation, group } => self.start_group(stage, generation, group),
            Task::HighlightTargets { generation, group } => {
                self.highlight_targets(stage, generation, group)
            }
            Task::Reverse { generation } => self.reverse(stage, generation),
            Task::Cleanup { generation } => self.cleanup(stage, generation),
            Task::InvalidateGeometry | Task::Recenter { .. } => {}
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(round = self.current_round_index))]
    pub(crate) fn play_round<H, S>(&mut self, stage: &mut Stage<'_, H, S>)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        if self.state == PlayerState::Stopped || self.rounds.is_empty() {
            return;
        }
        self.release(stage);

        let round_index = self.current_round_index % self.rounds.len();
        self.current_round_index = (round_index + 1) % self.rounds.len();
        self.generation += 1;
        self.rounds_played += 1;
        let generation = self.generation;

        let Some(round) = self.rounds.get(round_index) else {
            return;
        };
        let default_mode = stage.config.default_routing();
        let stagger = stage.config.config.group_stagger();

        let mut plans = Vec::with_capacity(round.groups.len());
        for (slot, group) in round.iter() {
            match plan_group(stage, group, group.routing(default_mode)) {
                Ok(plan) => plans.push((slot, plan)),
                Err((reason, position)) => {
                    tracing::debug!(slot, position = position.0, ?reason, "skipping group")
                }
            }
        }

        let mut active = ActiveRound {
            generation,
            round_index,
            groups: Vec::with_capacity(plans.len()),
            timers: Vec::new(),
        };
        for (slot, plan) in plans {
            let mut lines = SmallVec::new();
            for connection in &plan.connections {
                let line = LineId(self.next_line);
                self.next_line += 1;
                stage.scene.insert_line(line, connection, stage.line_style);
                lines.push(line);
            }
            let group = active.groups.len();
            let start_timer = stage
                .timers
                .schedule(stagger.times(slot), Task::GroupStart { generation, group });
            active.timers.push(start_timer);
            active.groups.push(PlannedGroup {
                source: plan.source,
                targets: plan.targets,
                lines,
                start_timer,
                started: false,
            });
        }
        active.timers.push(
            stage
                .timers
                .schedule(stage.config.config.highlight(), Task::Reverse { generation }),
        );
        tracing::debug!(
            round_index,
            groups = active.groups.len(),
            lines = active.groups.iter().map(|g| g.lines.len()).sum::<usize>(),
            "round started"
        );
        self.active = Some(active);
    }

    fn enter_loop<H, S>(&mut self, stage: &mut Stage<'_, H, S>)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        self.state = PlayerState::Looping;
        self.play_round(stage);
        if let Some(id) = self.interval.take() {
            stage.timers.cancel(id);
        }
        self.interval = Some(
            stage
                .timers
                .schedule_repeating(stage.config.config.loop_period(), Task::NextRound),
        );
    }

    fn active_mut(&mut self, generation: u64) -> Option<&mut ActiveRound> {
        self.active
            .as_mut()
            .filter(|a| a.generation == generation)
    }

    fn start_group<H, S>(&mut self, stage: &mut Stage<'_, H, S>, generation: u64, group: usize)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        let line_draw = stage.config.config.line_draw();
        let Some(active) = self.active.as_mut().filter(|a| a.generation == generation) else {
            return;
        };
        let Some(planned) = active.groups.get_mut(group) else {
            return;
        };
        planned.started = true;
        let source = planned.source;
        for &line in &planned.lines {
            stage
                .scene
                .animate_line(line, LinePhase::Drawn, line_draw, Ease::InOutQuad);
        }
        active.timers.push(
            stage
                .timers
                .schedule(line_draw, Task::HighlightTargets { generation, group }),
        );
        if self.highlighted.insert(source) {
            stage.highlight(source, TransitionCause::Round);
        }
    }

    fn highlight_targets<H, S>(
        &mut self,
        stage: &mut Stage<'_, H, S>,
        generation: u64,
        group: usize,
    ) where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        let Some(targets) = self
            .active_mut(generation)
            .and_then(|a| a.groups.get(group))
            .map(|g| g.targets.clone())
        else {
            return;
        };
        for target in targets {
            if self.highlighted.insert(target) {
                stage.highlight(target, TransitionCause::Round);
            }
        }
    }

    fn reverse<H, S>(&mut self, stage: &mut Stage<'_, H, S>, generation: u64)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        let line_draw = stage.config.config.line_draw();
        let Some(active) = self.active.as_mut().filter(|a| a.generation == generation) else {
            return;
        };
        let mut sources = SmallVec::<[TileId; 8]>::new();
        for group in &active.groups {
            if !group.started {
                stage.timers.cancel(group.start_timer);
                continue;
            }
            sources.push(group.source);
            for &line in &group.lines {
                stage
                    .scene
                    .animate_line(line, LinePhase::Erased, line_draw, Ease::InOutQuad);
            }
        }
        active.timers.push(
            stage
                .timers
                .schedule(line_draw, Task::Cleanup { generation }),
        );
        for source in sources {
            if self.highlighted.remove(&source) {
                stage.unhighlight(source, TransitionCause::Round);
            }
        }
    }

    fn cleanup<H, S>(&mut self, stage: &mut Stage<'_, H, S>, generation: u64)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        if self.active_mut(generation).is_none() {
            return;
        }
        self.release(stage);
    }

    /// Force-ends the round in flight: cancels its timers, removes its lines and
    /// returns every tile it highlighted to rest.
    fn release<H, S>(&mut self, stage: &mut Stage<'_, H, S>)
    where
        H: GridHost + ?Sized,
        S: Scene + ?Sized,
    {
        if let Some(active) = self.active.take() {
            for id in active.timers {
                stage.timers.cancel(id);
            }
            for group in &active.groups {
                for &line in &group.lines {
                    stage.scene.remove_line(line);
                }
            }
        }
        for tile in std::mem::take(&mut self.highlighted) {
            stage.unhighlight(tile, TransitionCause::Round);
        }
    }
}

fn plan_group<H, S>(
    stage: &mut Stage<'_, H, S>,
    group: &ConnectionGroup,
    mode: RoutingMode,
) -> Result<GroupPlan, (Skip, FullPosition)>
where
    H: GridHost + ?Sized,
    S: Scene + ?Sized,
{
    let dims = stage.tiles.dims();
    if let Some(hidden) = group
        .positions()
        .find(|p| !stage.subgrid.is_visible(dims, *p))
    {
        return Err((Skip::Hidden, hidden));
    }

    let source = stage
        .resolve(group.source)
        .ok_or((Skip::Unresolved, group.source))?;
    let mut targets = SmallVec::<[TileId; 4]>::new();
    for &position in &group.targets {
        targets.push(stage.resolve(position).ok_or((Skip::Unresolved, position))?);
    }

    let source_geom = stage
        .geometry
        .get(stage.host, source)
        .ok_or((Skip::Unmeasured, group.source))?;
    let mut target_geoms = SmallVec::<[_; 4]>::new();
    for (&tile, &position) in targets.iter().zip(&group.targets) {
        target_geoms.push(
            stage
                .geometry
                .get(stage.host, tile)
                .ok_or((Skip::Unmeasured, position))?,
        );
    }

    let params = stage.config.config.route_params();
    let deltas: SmallVec<[Vec2; 4]> = target_geoms
        .iter()
        .map(|g| g.center - source_geom.center)
        .collect();
    let spreads = assign_spread(&deltas, params.straight_threshold);
    let connections = target_geoms
        .iter()
        .zip(spreads)
        .map(|(target, spread)| {
            let spread = (mode == RoutingMode::Orthogonal).then_some(spread);
            route(&source_geom, target, mode, spread, &params)
        })
        .collect();

    Ok(GroupPlan {
        source,
        targets,
        connections,
    })
}
