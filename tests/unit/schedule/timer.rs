use super::*;

fn drain(q: &mut TimerQueue<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
    let mut out = Vec::new();
    while let Some((_, task)) = q.pop_due(Millis(until)) {
        out.push((q.now().0, task));
    }
    out
}

#[test]
fn fires_in_due_order_then_insertion_order() {
    let mut q = TimerQueue::new();
    q.schedule(Millis(20), "b");
    q.schedule(Millis(10), "a");
    q.schedule(Millis(20), "c");
    assert_eq!(q.next_deadline(), Some(Millis(10)));
    assert_eq!(drain(&mut q, 100), vec![(10, "a"), (20, "b"), (20, "c")]);
    assert_eq!(q.pending(), 0);
}

#[test]
fn nothing_fires_before_its_deadline() {
    let mut q = TimerQueue::new();
    q.schedule(Millis(50), "late");
    assert!(q.pop_due(Millis(49)).is_none());
    assert_eq!(q.now(), Millis(0));
}

#[test]
fn cancelled_timers_never_fire() {
    let mut q = TimerQueue::new();
    let id = q.schedule(Millis(5), "gone");
    q.schedule(Millis(6), "kept");
    assert!(q.cancel(id));
    assert!(!q.cancel(id));
    assert_eq!(drain(&mut q, 10), vec![(6, "kept")]);
}

#[test]
fn repeating_timer_rearms_until_cancelled() {
    let mut q = TimerQueue::new();
    let id = q.schedule_repeating(Millis(100), "tick");
    assert_eq!(drain(&mut q, 350), vec![(100, "tick"), (200, "tick"), (300, "tick")]);
    assert!(q.is_armed(id));
    q.cancel(id);
    assert!(drain(&mut q, 1000).is_empty());
    assert_eq!(q.next_deadline(), None);
}

#[test]
fn delays_are_relative_to_the_current_clock() {
    let mut q = TimerQueue::new();
    q.advance_clock(Millis(1000));
    q.schedule(Millis(10), "x");
    assert_eq!(q.next_deadline(), Some(Millis(1010)));
    q.advance_clock(Millis(500));
    assert_eq!(q.now(), Millis(1000));
}
