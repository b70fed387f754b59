#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod control;
pub mod engine;
pub mod foundation;
pub mod geometry;
pub mod grid;
pub mod routing;
pub mod scene;
pub mod schedule;

pub use animation::ease::Ease;
pub use animation::reveal::{RandomSource, RevealStep, Rng64};
pub use config::{
    AnimationConfig, BlockConfig, ConnectionGroup, GridConfig, Round, RoundSet, ShadowStyle,
};
pub use control::{ControlRegistry, EngineHandle, HighlightTarget, RegistrationId, TileHandle};
pub use engine::player::PlayerState;
pub use engine::{EngineState, GridEngine};
pub use foundation::core::{BezPath, LineId, Millis, Point, Rect, RootId, TileId, Vec2};
pub use foundation::error::{GridError, GridResult};
pub use geometry::GridHost;
pub use geometry::cache::{GeometryCache, TileGeometry};
pub use geometry::uniform::UniformGrid;
pub use grid::addressing::{FullPosition, GridDims, StorageIndex, TileMap};
pub use grid::subgrid::{SubgridController, SubgridRegion};
pub use routing::router::{Connection, RouteParams, RouteShape, RoutingMode, route};
pub use scene::recorder::{SceneEvent, SceneRecorder};
pub use scene::svg::SvgOverlay;
pub use scene::{LinePhase, LineStyle, Scene, TileTransition, TransitionCause};
pub use schedule::timer::TimerQueue;
