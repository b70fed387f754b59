use super::*;
use crate::scene::TransitionCause;

#[test]
fn events_are_stamped_with_the_scene_clock() {
    let mut rec = SceneRecorder::new();
    rec.advance_clock(Millis(40));
    rec.mark_expanded();
    rec.advance_clock(Millis(90));
    rec.remove_line(LineId(3));

    assert_eq!(rec.events[0].at, Millis(40));
    assert_eq!(rec.events[1].at, Millis(90));
    assert_eq!(rec.removed_lines(), vec![LineId(3)]);
}

#[test]
fn serializes_as_flat_tagged_json() {
    let mut rec = SceneRecorder::new();
    rec.transition_tile(
        TileId(7),
        &TileTransition {
            active: true,
            cause: TransitionCause::Round,
            duration: Millis(400),
            shadow_duration: Millis(300),
            ease: Ease::OutBack,
        },
    );
    let json = serde_json::to_value(&rec.events[0]).unwrap();
    assert_eq!(json["kind"], "tile");
    assert_eq!(json["tile"], 7);
    assert_eq!(json["cause"], "round");
    assert_eq!(json["duration"], 400);
    assert_eq!(json["at"], 0);
}
