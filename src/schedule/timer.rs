use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::foundation::core::Millis;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    task: T,
    due: Millis,
    period: Option<Millis>,
    seq: u64,
}

/// Virtual-time timer queue for the cooperative scheduler.
///
/// Determinism rule: timers due at the same instant fire in the order they
/// were (re)armed. Cancelled timers leave stale heap keys behind that are
/// skipped on pop.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Millis,
    heap: BinaryHeap<Reverse<(Millis, u64, TimerId)>>,
    entries: HashMap<TimerId, Entry<T>>,
    next_seq: u64,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Millis::ZERO,
            heap: BinaryHeap::new(),
            entries: HashMap::new(),
            next_seq: 0,
            next_id: 0,
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Fires once, `delay` after the current time.
    pub fn schedule(&mut self, delay: Millis, task: T) -> TimerId {
        self.arm(delay, None, task)
    }

    /// Fires every `period`, first one period from now. A zero period is treated as 1 ms.
    pub fn schedule_repeating(&mut self, period: Millis, task: T) -> TimerId {
        let period = Millis(period.0.max(1));
        self.arm(period, Some(period), task)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
        self.heap.clear();
    }

    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.drop_stale();
        self.heap.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TimerId, T)> {
        self.drop_stale();
        let Reverse((due, _, id)) = *self.heap.peek()?;
        if due > until {
            return None;
        }
        self.heap.pop();
        self.now = self.now.max(due);

        let period = self.entries.get(&id)?.period;
        match period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = self.entries.get_mut(&id)?;
                entry.due = due.after(period);
                entry.seq = seq;
                let next_due = entry.due;
                let task = entry.task.clone();
                self.heap.push(Reverse((next_due, seq, id)));
                Some((id, task))
            }
            None => self.entries.remove(&id).map(|entry| (id, entry.task)),
        }
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_clock(&mut self, to: Millis) {
        self.now = self.now.max(to);
    }

    fn arm(&mut self, delay: Millis, period: Option<Millis>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        let due = self.now.after(delay);
        self.entries.insert(
            id,
            Entry {
                task,
                due,
                period,
                seq,
            },
        );
        self.heap.push(Reverse((due, seq, id)));
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn drop_stale(&mut self) {
        while let Some(Reverse((_, seq, id))) = self.heap.peek() {
            let live = self.entries.get(id).is_some_and(|e| e.seq == *seq);
            if live {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timer.rs"]
mod tests;
