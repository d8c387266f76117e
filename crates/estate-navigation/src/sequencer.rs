//! Ordered `{delay, step}` queue that replaces chained timeouts.
//!
//! The sequencer owns a millisecond clock. Hosts either advance it
//! explicitly (tests) or feed it wall-clock readings (the browser driver).
//! Steps due at the same instant run in scheduling order.
//!
//! Timer steps and frame steps drain separately: `pop_due` never yields a
//! frame step, so a host that syncs timers before running a frame cannot
//! collapse two frames into one. `pop_simulated` interleaves both kinds for
//! hosts without a real frame source.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Timer,
    Frame,
}

#[derive(Debug)]
struct Scheduled<T> {
    wake: Wake,
    step: T,
}

#[derive(Debug)]
pub struct Sequencer<T> {
    now_ms: u64,
    frame_interval_ms: u64,
    next_seq: u64,
    running_frame: Option<u64>,
    queue: BTreeMap<(u64, u64), Scheduled<T>>,
}

impl<T> Sequencer<T> {
    pub fn new(frame_interval_ms: u64) -> Self {
        Self {
            now_ms: 0,
            frame_interval_ms: frame_interval_ms.max(1),
            next_seq: 0,
            running_frame: None,
            queue: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn after(&mut self, delay_ms: u64, step: T) {
        let due = self.now_ms.saturating_add(delay_ms);
        self.insert(due, Wake::Timer, step);
    }

    /// Queues `step` for the next animation frame. A frame step requested
    /// while a frame is running waits for the following frame.
    pub fn next_frame(&mut self, step: T) {
        let due = self.now_ms.saturating_add(self.frame_interval_ms);
        self.insert(due, Wake::Frame, step);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Earliest timer due time. Frame steps are excluded; they wake on the
    /// host's frame source instead.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.first_key(Wake::Timer).map(|(due, _)| due)
    }

    fn next_frame_ms(&self) -> Option<u64> {
        self.first_key(Wake::Frame).map(|(due, _)| due)
    }

    fn first_key(&self, wake: Wake) -> Option<(u64, u64)> {
        self.queue
            .iter()
            .find(|(_, entry)| entry.wake == wake)
            .map(|(key, _)| *key)
    }

    pub fn has_pending_frames(&self) -> bool {
        self.queue.values().any(|entry| entry.wake == Wake::Frame)
    }

    /// Pops the earliest timer step due at or before `now_ms` and moves the
    /// clock to its due time.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<T> {
        let key = self.first_key(Wake::Timer)?;
        if key.0 > now_ms {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.now_ms = self.now_ms.max(key.0);
        Some(entry.step)
    }

    /// Pops one frame step that was queued before `boundary_seq`, regardless
    /// of its nominal due time.
    pub fn pop_frame(&mut self, boundary_seq: u64) -> Option<T> {
        let key = self
            .queue
            .iter()
            .find(|((_, seq), entry)| entry.wake == Wake::Frame && *seq < boundary_seq)
            .map(|(key, _)| *key)?;
        self.queue.remove(&key).map(|entry| entry.step)
    }

    pub fn frame_boundary(&self) -> u64 {
        self.next_seq
    }

    /// Pops the next step up to `until_ms` with frames ticking at their due
    /// time. A tick takes its boundary first, then drains the timers due at
    /// that instant, then runs the frame steps queued before the boundary.
    pub fn pop_simulated(&mut self, until_ms: u64) -> Option<T> {
        loop {
            if let Some(boundary) = self.running_frame {
                let now_ms = self.now_ms;
                if let Some(step) = self.pop_due(now_ms) {
                    return Some(step);
                }
                if let Some(step) = self.pop_frame(boundary) {
                    return Some(step);
                }
                self.running_frame = None;
            }

            let Some(tick) = self.next_frame_ms().filter(|due| *due <= until_ms) else {
                return self.pop_due(until_ms);
            };
            if let Some(step) = self.pop_due(tick.saturating_sub(1)) {
                return Some(step);
            }
            self.settle_clock(tick);
            self.running_frame = Some(self.frame_boundary());
        }
    }

    pub fn settle_clock(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn insert(&mut self, due: u64, wake: Wake, step: T) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.queue.insert((due, seq), Scheduled { wake, step });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sequencer: &mut Sequencer<&'static str>, now_ms: u64) -> Vec<&'static str> {
        let mut ran = Vec::new();
        while let Some(step) = sequencer.pop_due(now_ms) {
            ran.push(step);
        }
        sequencer.settle_clock(now_ms);
        ran
    }

    #[test]
    fn steps_run_in_due_then_scheduling_order() {
        let mut sequencer = Sequencer::new(16);
        sequencer.after(200, "collapse");
        sequencer.after(50, "highlight");
        sequencer.after(200, "reveal");

        assert_eq!(drain(&mut sequencer, 100), vec!["highlight"]);
        assert_eq!(drain(&mut sequencer, 200), vec!["collapse", "reveal"]);
        assert!(sequencer.is_empty());
    }

    #[test]
    fn clock_moves_to_step_due_time_while_draining() {
        let mut sequencer = Sequencer::new(16);
        sequencer.after(100, "first");
        assert_eq!(sequencer.pop_due(500), Some("first"));
        assert_eq!(sequencer.now_ms(), 100);

        sequencer.after(50, "chained");
        assert_eq!(sequencer.next_due_ms(), Some(150));
    }

    #[test]
    fn timer_drain_leaves_frame_steps_queued() {
        let mut sequencer = Sequencer::new(16);
        sequencer.next_frame("frame");
        sequencer.after(40, "timer");

        assert_eq!(drain(&mut sequencer, 100), vec!["timer"]);
        assert!(sequencer.has_pending_frames());
        assert_eq!(sequencer.next_due_ms(), None);
    }

    #[test]
    fn simulated_ticks_run_frames_one_per_interval() {
        let mut sequencer = Sequencer::new(16);
        sequencer.next_frame("outer");

        assert_eq!(sequencer.pop_simulated(16), Some("outer"));
        sequencer.next_frame("inner");
        assert_eq!(sequencer.pop_simulated(16), None);
        assert_eq!(sequencer.now_ms(), 16);

        assert_eq!(sequencer.pop_simulated(32), Some("inner"));
        assert_eq!(sequencer.now_ms(), 32);
    }

    #[test]
    fn simulated_tick_drains_earlier_timers_first() {
        let mut sequencer = Sequencer::new(16);
        sequencer.next_frame("frame");
        sequencer.after(10, "early");
        sequencer.after(16, "same-instant");
        sequencer.after(20, "late");

        let mut ran = Vec::new();
        while let Some(step) = sequencer.pop_simulated(100) {
            ran.push(step);
        }
        assert_eq!(ran, vec!["early", "same-instant", "frame", "late"]);
    }

    #[test]
    fn frame_requested_during_frame_waits_for_next_one() {
        let mut sequencer = Sequencer::new(16);
        sequencer.next_frame("first-frame");
        let boundary = sequencer.frame_boundary();

        assert_eq!(sequencer.pop_frame(boundary), Some("first-frame"));
        sequencer.next_frame("second-frame");
        assert_eq!(sequencer.pop_frame(boundary), None);
        assert!(sequencer.has_pending_frames());

        let boundary = sequencer.frame_boundary();
        assert_eq!(sequencer.pop_frame(boundary), Some("second-frame"));
    }
}
