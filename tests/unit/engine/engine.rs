use super::*;
use crate::geometry::uniform::UniformGrid;
use crate::routing::router::RouteShape;
use crate::scene::LinePhase;
use crate::scene::recorder::{SceneEvent, SceneRecorder};

type TestEngine = GridEngine<UniformGrid, SceneRecorder>;

fn engine_with(json: &str) -> TestEngine {
    let cfg = BlockConfig::from_json(json).unwrap();
    let host = UniformGrid::new(cfg.grid.dims().unwrap(), 80.0, 8.0);
    GridEngine::new(cfg, host, SceneRecorder::new())
        .unwrap()
        .with_random(Rng64::new(7))
}

fn engine(rounds: &str) -> TestEngine {
    engine_with(&format!(r#"{{"animationRounds": {rounds}}}"#))
}

// 6x6 grid: position p sits at row (p-1)/6, col (p-1)%6 and its handle is row*12+col.
fn tile(position: u32) -> TileId {
    let (row, col) = ((position - 1) / 6, (position - 1) % 6);
    TileId(row * 12 + col)
}

fn shapes(engine: &TestEngine) -> Vec<RouteShape> {
    engine
        .scene()
        .events()
        .filter_map(|e| match e {
            SceneEvent::LineInserted { shape, .. } => Some(*shape),
            _ => None,
        })
        .collect()
}

#[test]
fn round_highlights_sources_then_targets_and_cleans_up() {
    let mut e = engine("[[[16,15],[16,23,34]]]");
    e.play_round();
    assert_eq!(e.state().active_connections, 3);
    assert_eq!(shapes(&e), vec![RouteShape::Straight, RouteShape::Elbow, RouteShape::Straight]);

    e.advance_to(Millis(0));
    assert_eq!(e.scene().tile_changes(true), vec![tile(16)]);

    e.advance_to(Millis(650));
    assert_eq!(
        e.scene().tile_changes(true),
        vec![tile(16), tile(15), tile(23), tile(34)]
    );
    assert_eq!(e.state().highlighted.len(), 4);

    e.advance_to(Millis(1999));
    assert_eq!(e.scene().tile_changes(false), vec![tile(16)]);

    e.advance_to(Millis(2499));
    let state = e.state();
    assert!(state.highlighted.is_empty());
    assert_eq!(state.active_connections, 0);
    assert_eq!(e.scene().removed_lines().len(), 3);
    assert_eq!(e.scene().tile_changes(false).len(), 4);
}

#[test]
fn lines_draw_then_erase_with_line_duration() {
    let mut e = engine("[[[1,2]]]");
    e.play_round();
    e.advance_to(Millis(2499));
    let phases: Vec<_> = e
        .scene()
        .events
        .iter()
        .filter_map(|s| match s.event {
            SceneEvent::LineAnimated {
                phase, duration, ..
            } => Some((s.at, phase, duration)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (Millis(0), LinePhase::Drawn, Millis(500)),
            (Millis(1999), LinePhase::Erased, Millis(500)),
        ]
    );
}

#[test]
fn index_wraps_around_the_round_set() {
    let mut e = engine("[[[1,2]],[[3,4]],[[5,6]]]");
    let mut seen = Vec::new();
    for _ in 0..4 {
        e.play_round();
        seen.push(e.state().current_round_index);
    }
    assert_eq!(seen, vec![1, 2, 0, 1]);

    e.scene_mut().clear();
    e.advance_to(Millis(0));
    assert_eq!(e.scene().tile_changes(true), vec![tile(1)]);
}

#[test]
fn new_round_force_releases_the_previous_one() {
    let mut e = engine("[[[1,2]],[[3,4]]]");
    e.play_round();
    e.advance_to(Millis(600));
    assert_eq!(e.state().highlighted, vec![tile(1), tile(2)]);

    e.play_round();
    assert!(e.state().highlighted.is_empty());
    assert_eq!(e.scene().removed_lines().len(), 1);
    assert_eq!(e.state().active_connections, 1);

    // the first round's reverse never fires
    e.scene_mut().clear();
    e.advance_to(Millis(1999));
    assert!(e.scene().tile_changes(false).is_empty());
}

#[test]
fn empty_round_set_is_a_quiet_no_op() {
    let mut e = engine("[]");
    e.observation_unavailable();
    e.advance_to(Millis(10_000));
    assert!(e.scene().inserted_lines().is_empty());
    assert_eq!(e.state().current_round_index, 0);
    assert_eq!(e.player_state(), PlayerState::Looping);
}

#[test]
fn unresolvable_groups_are_skipped() {
    let mut e = engine("[[[1,37],[2,3]]]");
    e.play_round();
    assert_eq!(e.state().active_connections, 1);
}

#[test]
fn entrance_reveals_resets_and_settles_into_the_loop() {
    let mut e = engine("[[[1,2]]]");
    e.on_intersection(0.5);
    assert_eq!(e.player_state(), PlayerState::EntranceAnimating { paused: false });
    let reveals = e
        .scene()
        .events()
        .filter(|ev| matches!(ev, SceneEvent::Reveal(_)))
        .count();
    assert_eq!(reveals, 36);

    e.advance_to(Millis(1900));
    assert_eq!(e.scene().tile_changes(false).len(), 36);

    e.advance_to(Millis(2000));
    assert_eq!(e.player_state(), PlayerState::Looping);
    assert_eq!(e.rounds_played(), 1);

    e.advance_to(Millis(5000));
    assert_eq!(e.rounds_played(), 2);
}

#[test]
fn leaving_during_entrance_settles_paused() {
    let mut e = engine("[[[1,2]]]");
    e.on_intersection(1.0);
    e.on_intersection(0.0);
    e.advance_to(Millis(4000));
    assert_eq!(e.player_state(), PlayerState::Paused);
    assert_eq!(e.rounds_played(), 0);

    e.on_intersection(1.0);
    assert_eq!(e.player_state(), PlayerState::Looping);
    assert_eq!(e.rounds_played(), 1);
}

#[test]
fn pause_resume_replays_the_round_in_flight() {
    let mut e = engine("[[[1,2]],[[3,4]]]");
    e.observation_unavailable();
    e.advance_to(Millis(2000));
    assert_eq!(e.state().current_round_index, 1);

    e.advance_to(Millis(2100));
    e.pause();
    assert!(!e.state().playing);
    e.advance_to(Millis(2200));
    e.scene_mut().clear();
    e.resume();
    e.advance_to(Millis(2200));

    assert_eq!(e.state().current_round_index, 1);
    assert_eq!(e.scene().tile_changes(true), vec![tile(1)]);
    assert_eq!(e.player_state(), PlayerState::Looping);
}

#[test]
fn paused_round_in_flight_plays_out() {
    let mut e = engine("[[[1,2]],[[3,4]]]");
    e.observation_unavailable();
    e.advance_to(Millis(2100));
    e.pause();
    e.advance_to(Millis(9000));
    let state = e.state();
    assert!(state.highlighted.is_empty());
    assert_eq!(state.active_connections, 0);
    assert_eq!(e.rounds_played(), 1);

    // the finished round is not replayed
    e.resume();
    e.advance_to(Millis(9000));
    assert_eq!(e.state().current_round_index, 0);
    assert_eq!(e.state().highlighted, vec![tile(3)]);
}

#[test]
fn hover_outranks_round_highlight() {
    let mut e = engine("[[[16,15]]]");
    e.pointer_enter(tile(16));
    e.play_round();
    e.advance_to(Millis(600));
    let round_changes: Vec<_> = e
        .scene()
        .events()
        .filter_map(|ev| match ev {
            SceneEvent::Tile { tile, transition } if transition.cause == TransitionCause::Round => {
                Some(*tile)
            }
            _ => None,
        })
        .collect();
    assert_eq!(round_changes, vec![tile(15)]);

    // the round still holds the source, so leaving does not dim it
    let before = e.scene().events().count();
    e.pointer_leave(tile(16));
    assert_eq!(e.scene().events().count(), before);

    e.advance_to(Millis(1999));
    let dimmed = e.scene().events().any(|ev| {
        matches!(ev, SceneEvent::Tile { tile: t, transition }
            if *t == tile(16) && !transition.active && transition.cause == TransitionCause::Round)
    });
    assert!(dimmed);
}

#[test]
fn hover_takes_over_a_highlighted_tile() {
    let mut e = engine("[[[16,15]]]");
    e.play_round();
    e.advance_to(Millis(100));
    e.pointer_enter(tile(16));
    e.advance_to(Millis(1999));
    // the reverse leaves the hovered source alone
    assert!(!e.scene().tile_changes(false).contains(&tile(16)));
    e.pointer_leave(tile(16));
    assert!(e.scene().tile_changes(false).contains(&tile(16)));
}

#[test]
fn leaving_a_highlighted_tile_keeps_it_active_until_the_reverse() {
    let mut e = engine("[[[16,15]]]");
    e.play_round();
    e.advance_to(Millis(100));
    e.pointer_enter(tile(16));
    e.pointer_leave(tile(16));
    assert!(e.state().highlighted.contains(&tile(16)));
    e.advance_to(Millis(1998));
    assert!(!e.scene().tile_changes(false).contains(&tile(16)));

    e.advance_to(Millis(1999));
    assert!(e.scene().tile_changes(false).contains(&tile(16)));
}

#[test]
fn subgrid_hides_groups_until_expanded() {
    let mut e = engine_with(
        r#"{
            "grid": {"enlargeEnabled": true, "subgridRows": 2, "subgridCols": 2, "triggerButton": ".more"},
            "animationRounds": [[[1,2],[1,3]]]
        }"#,
    );
    e.play_round();
    assert_eq!(e.state().active_connections, 1);

    assert!(!e.on_click(".other"));
    assert!(e.on_click(".more"));
    assert!(!e.expand());
    assert!(e.state().expanded);
    assert!(e.scene().events().any(|ev| *ev == SceneEvent::Expanded));

    e.play_round();
    assert_eq!(e.state().active_connections, 2);
}

#[test]
fn entrance_reveals_only_the_subgrid() {
    let mut e = engine_with(
        r#"{"grid": {"enlargeEnabled": true, "subgridRows": 2, "subgridCols": 3}}"#,
    );
    e.start();
    let revealed = |e: &TestEngine| {
        e.scene()
            .events()
            .filter(|ev| matches!(ev, SceneEvent::Reveal(_)))
            .count()
    };
    assert_eq!(revealed(&e), 6);
    e.expand();
    assert_eq!(revealed(&e), 36);
}

#[test]
fn deferred_start_waits_for_readiness() {
    let cfg = BlockConfig::from_json(r#"{"animationRounds": [[[1,2]]]}"#).unwrap();
    let host = UniformGrid::new(cfg.grid.dims().unwrap(), 80.0, 8.0);
    let mut e = GridEngine::deferred(cfg, host, SceneRecorder::new()).unwrap();
    e.observation_unavailable();
    assert_eq!(e.player_state(), PlayerState::Idle);
    assert!(e.scene().events.is_empty());

    e.mark_ready();
    assert!(e.is_ready());
    assert_eq!(e.player_state(), PlayerState::EntranceAnimating { paused: false });
}

#[test]
fn resize_is_debounced_into_one_rebuild() {
    let mut e = engine("[[[1,2]]]");
    e.play_round();
    assert_eq!(e.geometry_rebuilds(), 1);

    e.notify_resize();
    e.advance_to(Millis(100));
    e.notify_resize();
    e.advance_to(Millis(200));
    e.play_round();
    assert_eq!(e.geometry_rebuilds(), 1);

    e.advance_to(Millis(250));
    e.play_round();
    e.play_round();
    assert_eq!(e.geometry_rebuilds(), 2);
}

#[test]
fn viewport_changes_recenter_once() {
    let mut e = engine("[]");
    e.notify_viewport(800.0);
    e.advance_to(Millis(50));
    e.notify_viewport(1000.0);
    e.advance_to(Millis(200));
    let offsets: Vec<_> = e
        .scene()
        .events()
        .filter_map(|ev| match ev {
            SceneEvent::VerticalOffset { offset } => Some(*offset),
            _ => None,
        })
        .collect();
    // wrapper is 6 * 88 - 8 = 520 high
    assert_eq!(offsets, vec![240.0]);
}

#[test]
fn stop_cancels_everything() {
    let mut e = engine("[[[1,2]]]");
    e.observation_unavailable();
    e.advance_to(Millis(2100));
    e.notify_resize();
    e.stop();
    assert!(e.is_stopped());
    assert_eq!(e.next_deadline(), None);
    assert!(e.state().highlighted.is_empty());
    assert_eq!(e.scene().removed_lines().len(), 1);

    let before = e.scene().events.len();
    e.play_round();
    e.advance_to(Millis(20_000));
    assert_eq!(e.scene().events.len(), before);
}

#[test]
fn external_highlight_respects_hover() {
    let mut e = engine("[]");
    e.highlight_tile(tile(3));
    e.pointer_enter(tile(4));
    e.highlight_tile(tile(4));
    assert_eq!(e.scene().tile_changes(true).len(), 2);
    e.unhighlight_tile(tile(3));
    assert_eq!(e.scene().tile_changes(false), vec![tile(3)]);
    assert!(e.owns(tile(3)));
    assert!(!e.owns(TileId(200)));
}

#[test]
fn set_dims_rebuilds_addressing() {
    let mut e = engine("[[[8,9]]]");
    e.host_mut().set_dims(GridDims::new(4, 4).unwrap());
    e.set_dims(4, 4).unwrap();
    assert_eq!(e.tiles().len(), 16);
    e.play_round();
    // position 8 on a 4-wide grid is row 1, col 3
    let starts: Vec<_> = e
        .scene()
        .events()
        .filter_map(|ev| match ev {
            SceneEvent::LineInserted { start, .. } => Some(*start),
            _ => None,
        })
        .collect();
    assert_eq!(starts.len(), 1);
    assert!(e.set_dims(13, 1).is_err());
}
