use super::*;

#[test]
fn first_entry_starts_then_toggles_pause_and_resume() {
    let mut vis = VisibilityScheduler::new();
    assert_eq!(vis.observe(0.0), VisibilityAction::Nothing);
    assert_eq!(vis.observe(0.5), VisibilityAction::Start);
    assert_eq!(vis.observe(0.8), VisibilityAction::Nothing);
    assert_eq!(vis.observe(0.05), VisibilityAction::Pause);
    assert_eq!(vis.observe(1.0), VisibilityAction::Resume);
    assert!(vis.is_started());
}

#[test]
fn ratio_below_threshold_is_not_visible() {
    let mut vis = VisibilityScheduler::new();
    assert_eq!(vis.observe(0.09), VisibilityAction::Nothing);
    assert_eq!(vis.observe(VISIBLE_RATIO), VisibilityAction::Start);
}

#[test]
fn unavailable_observation_starts_once() {
    let mut vis = VisibilityScheduler::new();
    assert_eq!(vis.observation_unavailable(), VisibilityAction::Start);
    assert_eq!(vis.observation_unavailable(), VisibilityAction::Nothing);
    assert!(vis.is_visible());
}

#[test]
fn readiness_holds_a_start_until_resolved() {
    let mut gate = Readiness::pending();
    assert!(!gate.request_start());
    assert!(gate.resolve());
    assert!(gate.request_start());
    assert!(!gate.resolve());

    let mut idle = Readiness::pending();
    assert!(!idle.resolve());
}
