//! Deferred playback steps.
//!
//! Holds the ticks a [`TimelapseController`] asked for together with their
//! due time. Nothing is ever cancelled: a pending tick fires when due and
//! the controller decides whether it still means anything.

use std::time::{Duration, Instant};

use tracing::debug;

use super::timelapse::{Schedule, Tick, TimelapseController};

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    tick: Tick,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the step a controller operation asked for.
    pub fn arm(&mut self, schedule: Schedule, now: Instant) {
        if let Schedule::After { delay, tick } = schedule {
            self.pending.push(Pending {
                due: now + delay,
                tick,
            });
        }
    }

    /// Earliest due time, if anything is pending.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Time left until the earliest pending step, capped at `max`.
    pub fn timeout(&self, now: Instant, max: Duration) -> Duration {
        self.next_due()
            .map(|due| due.saturating_duration_since(now).min(max))
            .unwrap_or(max)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fire every step that is due, in due order, rescheduling whatever
    /// the controller asks for. Returns how many steps fired.
    pub fn fire_due(&mut self, controller: &mut TimelapseController, now: Instant) -> usize {
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| p.due);

        for pending in &due {
            let schedule = controller.on_tick(pending.tick);
            if schedule == Schedule::Done {
                debug!("timelapse chain ended");
            }
            self.arm(schedule, now);
        }
        due.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::timelapse::Frame;
    use crate::models::Timestamp;

    fn controller(n: usize) -> TimelapseController {
        let mut controller = TimelapseController::new();
        controller.load(
            (0..n)
                .map(|i| Frame {
                    url: format!("/img/{i}.jpg"),
                    time: Timestamp::parse("2024-01-01 00:00").unwrap(),
                })
                .collect(),
        );
        controller
    }

    #[test]
    fn test_fires_only_when_due() {
        let mut ctl = controller(4);
        let mut scheduler = Scheduler::new();
        let start = Instant::now();

        scheduler.arm(ctl.toggle_play(), start);
        assert_eq!(ctl.current_index(), Some(1));
        assert_eq!(scheduler.next_due(), Some(start + Duration::from_secs(1)));

        assert_eq!(scheduler.fire_due(&mut ctl, start + Duration::from_millis(500)), 0);
        assert_eq!(ctl.current_index(), Some(1));

        assert_eq!(scheduler.fire_due(&mut ctl, start + Duration::from_secs(1)), 1);
        assert_eq!(ctl.current_index(), Some(2));
        assert_eq!(scheduler.next_due(), Some(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_pause_lets_pending_step_lapse() {
        let mut ctl = controller(4);
        let mut scheduler = Scheduler::new();
        let start = Instant::now();

        scheduler.arm(ctl.toggle_play(), start);
        scheduler.arm(ctl.toggle_play(), start);
        assert!(!scheduler.is_idle());

        scheduler.fire_due(&mut ctl, start + Duration::from_secs(1));
        assert!(scheduler.is_idle());
        assert_eq!(ctl.current_index(), Some(1));
    }

    #[test]
    fn test_timeout_caps_wait() {
        let mut ctl = controller(2);
        let mut scheduler = Scheduler::new();
        let now = Instant::now();
        let cap = Duration::from_millis(100);

        assert_eq!(scheduler.timeout(now, cap), cap);
        scheduler.arm(ctl.toggle_play(), now);
        assert_eq!(scheduler.timeout(now, cap), cap);
        assert_eq!(
            scheduler.timeout(now + Duration::from_millis(950), cap),
            Duration::from_millis(50)
        );
        assert_eq!(scheduler.timeout(now + Duration::from_secs(2), cap), Duration::ZERO);
    }
}
