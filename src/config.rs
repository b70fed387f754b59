use serde::Deserialize;
use smallvec::SmallVec;

use crate::foundation::core::Millis;
use crate::foundation::error::{GridError, GridResult};
use crate::grid::addressing::{FullPosition, GridDims};
use crate::grid::subgrid::{SubgridController, SubgridRegion, SubgridTriggers};
use crate::routing::router::{RouteParams, RoutingMode};

/// Trailing group marker that selects diagonal routing.
pub const DIAGONAL_MARKER: &str = "d";
/// Lower bound of the loop period after applying the transition offset.
pub const MIN_LOOP_PERIOD: Millis = Millis(100);

/// Full block configuration as emitted next to the rendered grid.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub config: AnimationConfig,
    #[serde(default, deserialize_with = "deserialize_rounds")]
    pub animation_rounds: RoundSet,
    #[serde(default = "default_true")]
    pub ortho_lines_enabled: bool,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            config: AnimationConfig::default(),
            animation_rounds: RoundSet::default(),
            ortho_lines_enabled: true,
        }
    }
}

impl BlockConfig {
    #[tracing::instrument(skip(json), fields(len = json.len()))]
    pub fn from_json(json: &str) -> GridResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> GridResult<()> {
        let dims = self.grid.dims()?;
        if self.grid.enlarge_enabled {
            self.grid.subgrid_region(dims).validate(dims)?;
        }
        self.config.validate()
    }

    /// Routing used by groups without the diagonal marker.
    pub fn default_routing(&self) -> RoutingMode {
        if self.ortho_lines_enabled {
            RoutingMode::Orthogonal
        } else {
            RoutingMode::Diagonal
        }
    }
}

fn default_true() -> bool {
    true
}

/// Grid shape and the collapsed-subgrid feature.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub enlarge_enabled: bool,
    pub subgrid_rows: Option<u32>,
    pub subgrid_cols: Option<u32>,
    pub subgrid_start_row: u32,
    pub subgrid_start_col: u32,
    pub trigger_button: Option<String>,
    pub trigger_event: Option<String>,
    pub trigger_scroll: Option<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_rows: 6,
            grid_cols: 6,
            enlarge_enabled: false,
            subgrid_rows: None,
            subgrid_cols: None,
            subgrid_start_row: 0,
            subgrid_start_col: 0,
            trigger_button: None,
            trigger_event: None,
            trigger_scroll: None,
        }
    }
}

impl GridConfig {
    pub fn dims(&self) -> GridResult<GridDims> {
        GridDims::new(self.grid_rows, self.grid_cols)
    }

    pub fn subgrid_region(&self, dims: GridDims) -> SubgridRegion {
        SubgridRegion::new(
            self.subgrid_start_row,
            self.subgrid_start_col,
            self.subgrid_rows.unwrap_or(dims.rows()),
            self.subgrid_cols.unwrap_or(dims.cols()),
        )
    }

    pub fn controller(&self, dims: GridDims) -> SubgridController {
        if !self.enlarge_enabled {
            return SubgridController::disabled();
        }
        SubgridController::new(
            self.subgrid_region(dims),
            SubgridTriggers {
                button_selector: self.trigger_button.clone().filter(|s| !s.is_empty()),
                event_name: self.trigger_event.clone().filter(|s| !s.is_empty()),
                scroll_y: self.trigger_scroll.filter(|y| *y > 0.0),
            },
        )
    }
}

/// Timing, routing and style constants. Units follow the block's wire format:
/// fields documented as seconds are seconds, everything else is milliseconds or pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    /// Seconds.
    pub line_draw_duration: f64,
    pub highlight_duration: f64,
    pub loop_interval: f64,
    /// Seconds.
    pub cell_anim_duration: f64,
    pub group_stagger_delay: f64,
    pub turn_offset: f64,
    pub corner_radius: f64,
    pub straight_threshold: f64,
    pub transition_offset: f64,
    pub startup_delay: f64,
    /// Seconds.
    pub active_shadow_fade_in: f64,
    /// Seconds.
    pub active_shadow_fade_out: f64,
    pub active_shadow_x: f64,
    pub active_shadow_y: f64,
    pub active_shadow_blur: f64,
    pub active_shadow_spread: f64,
    pub active_shadow_color: String,
    pub active_shadow_opacity_only: bool,
    pub hover_scale: f64,
    pub hover_bg_color: String,
    /// Percent of tile height.
    pub hover_slide_amount: f64,
    pub inactive_bg_color: String,
    pub inactive_border_width: f64,
    pub line_color: String,
    pub line_stroke_width: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            line_draw_duration: 0.5,
            highlight_duration: 1999.0,
            loop_interval: 3000.0,
            cell_anim_duration: 0.4,
            group_stagger_delay: 150.0,
            turn_offset: 8.0,
            corner_radius: 20.0,
            straight_threshold: 5.0,
            transition_offset: 0.0,
            startup_delay: 2000.0,
            active_shadow_fade_in: 0.3,
            active_shadow_fade_out: 0.25,
            active_shadow_x: 0.0,
            active_shadow_y: 8.0,
            active_shadow_blur: 10.0,
            active_shadow_spread: 0.0,
            active_shadow_color: DEFAULT_SHADOW_COLOR.to_string(),
            active_shadow_opacity_only: false,
            hover_scale: 1.08,
            hover_bg_color: "#fff".to_string(),
            hover_slide_amount: -10.0,
            inactive_bg_color: "rgba(255,255,255,0)".to_string(),
            inactive_border_width: 1.0,
            line_color: "#333".to_string(),
            line_stroke_width: 2.0,
        }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> GridResult<()> {
        let durations = [
            ("lineDrawDuration", self.line_draw_duration),
            ("highlightDuration", self.highlight_duration),
            ("loopInterval", self.loop_interval),
            ("cellAnimDuration", self.cell_anim_duration),
            ("groupStaggerDelay", self.group_stagger_delay),
            ("startupDelay", self.startup_delay),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(GridError::config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.transition_offset.is_finite() {
            return Err(GridError::config("transitionOffset must be finite"));
        }
        Ok(())
    }

    pub fn line_draw(&self) -> Millis {
        Millis::from_secs_f64(self.line_draw_duration)
    }

    pub fn highlight(&self) -> Millis {
        Millis::from_ms_f64(self.highlight_duration)
    }

    pub fn cell_anim(&self) -> Millis {
        Millis::from_secs_f64(self.cell_anim_duration)
    }

    pub fn group_stagger(&self) -> Millis {
        Millis::from_ms_f64(self.group_stagger_delay)
    }

    pub fn startup(&self) -> Millis {
        Millis::from_ms_f64(self.startup_delay)
    }

    pub fn shadow_fade_in(&self) -> Millis {
        Millis::from_secs_f64(self.active_shadow_fade_in)
    }

    pub fn shadow_fade_out(&self) -> Millis {
        Millis::from_secs_f64(self.active_shadow_fade_out)
    }

    /// `max(100, loopInterval + transitionOffset)`.
    pub fn loop_period(&self) -> Millis {
        Millis::from_ms_f64(self.loop_interval + self.transition_offset).max(MIN_LOOP_PERIOD)
    }

    pub fn route_params(&self) -> RouteParams {
        RouteParams {
            corner_radius: self.corner_radius,
            straight_threshold: self.straight_threshold,
            turn_offset: self.turn_offset,
        }
    }

    /// CSS `box-shadow` values for the active look and its faded-out counterpart.
    pub fn shadow(&self) -> ShadowStyle {
        let geometry = format!(
            "{}px {}px {}px {}px",
            self.active_shadow_x,
            self.active_shadow_y,
            self.active_shadow_blur,
            self.active_shadow_spread
        );
        let color = if self.active_shadow_color.is_empty() {
            DEFAULT_SHADOW_COLOR
        } else {
            &self.active_shadow_color
        };
        let hidden = if self.active_shadow_opacity_only {
            format!("{geometry} {TRANSPARENT}")
        } else {
            format!("0 0 0 0 {TRANSPARENT}")
        };
        ShadowStyle {
            active: format!("{geometry} {color}"),
            hidden,
        }
    }
}

const DEFAULT_SHADOW_COLOR: &str = "rgba(0,0,0,0.10)";
const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// Precomputed shadow endpoints. With `activeShadowOpacityOnly` the hidden
/// shadow keeps the active geometry and only drops its alpha.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ShadowStyle {
    pub active: String,
    pub hidden: String,
}

/// One source tile fanning out to one or more targets.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ConnectionGroup {
    pub source: FullPosition,
    pub targets: SmallVec<[FullPosition; 4]>,
    pub diagonal: bool,
}

impl ConnectionGroup {
    pub fn positions(&self) -> impl Iterator<Item = FullPosition> + '_ {
        std::iter::once(self.source).chain(self.targets.iter().copied())
    }

    pub fn routing(&self, default: RoutingMode) -> RoutingMode {
        if self.diagonal {
            RoutingMode::Diagonal
        } else {
            default
        }
    }

    /// Decodes `[source, target, ..., "d"?]`. Returns `None` for anything malformed.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let items = value.as_array()?;
        let (diagonal, items) = match items.split_last() {
            Some((last, rest)) if last.as_str() == Some(DIAGONAL_MARKER) => (true, rest),
            _ => (false, items.as_slice()),
        };
        let mut positions = items.iter().map(parse_position);
        let source = positions.next()??;
        let targets = positions.collect::<Option<SmallVec<[FullPosition; 4]>>>()?;
        if targets.is_empty() {
            return None;
        }
        Some(Self {
            source,
            targets,
            diagonal,
        })
    }
}

fn parse_position(value: &serde_json::Value) -> Option<FullPosition> {
    let n = value.as_u64()?;
    let n = u32::try_from(n).ok().filter(|n| *n >= 1)?;
    Some(FullPosition(n))
}

/// Ordered groups played together before the round reverses.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Round {
    pub groups: Vec<ConnectionGroup>,
    /// Authored slot of each kept group, so stagger timing survives dropped groups.
    pub slots: Vec<usize>,
}

impl Round {
    pub fn from_value(value: &serde_json::Value) -> Self {
        let Some(entries) = value.as_array() else {
            tracing::debug!("round is not an array; treating it as empty");
            return Self::default();
        };
        let mut round = Self::default();
        for (slot, entry) in entries.iter().enumerate() {
            match ConnectionGroup::from_value(entry) {
                Some(group) => {
                    round.groups.push(group);
                    round.slots.push(slot);
                }
                None => tracing::debug!(slot, "dropping malformed group"),
            }
        }
        round
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ConnectionGroup)> {
        self.slots.iter().copied().zip(self.groups.iter())
    }
}

/// Rounds played in a circle.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RoundSet {
    pub rounds: Vec<Round>,
}

impl RoundSet {
    pub fn from_value(value: &serde_json::Value) -> Self {
        let rounds = value
            .as_array()
            .map(|rs| rs.iter().map(Round::from_value).collect())
            .unwrap_or_default();
        Self { rounds }
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }
}

fn deserialize_rounds<'de, D>(deserializer: D) -> Result<RoundSet, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(RoundSet::from_value(&value))
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
