//! Delayed and repeating events
//!
//! Timers fire on the simulation's own step cadence: `advance` is called once
//! per tick and returns whatever came due, in due order. Events are plain
//! values, so dropping (or clearing) the owner cancels everything it
//! scheduled.

/// Handle for cancelling a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    remaining_ms: f32,
    period_ms: Option<f32>,
    event: E,
}

#[derive(Debug, Clone)]
pub struct Timers<E> {
    entries: Vec<Entry<E>>,
    next_id: u32,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E: Clone> Timers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fire `event` once after `delay_ms`
    pub fn after(&mut self, delay_ms: f32, event: E) -> TimerId {
        let id = self.allocate();
        self.entries.push(Entry {
            id,
            remaining_ms: delay_ms.max(0.0),
            period_ms: None,
            event,
        });
        id
    }

    /// Fire `event` every `period_ms` until cancelled
    pub fn every(&mut self, period_ms: f32, event: E) -> TimerId {
        let id = self.allocate();
        // A zero period would fire forever within one advance
        let period = period_ms.max(1.0);
        self.entries.push(Entry {
            id,
            remaining_ms: period,
            period_ms: Some(period),
            event,
        });
        id
    }

    /// Cancel a pending event; returns false if it already fired or never existed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Drop every pending event
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance by `dt_ms` and collect the events that came due
    pub fn advance(&mut self, dt_ms: f32) -> Vec<E> {
        // (time into this step at which it fired, event)
        let mut fired: Vec<(f32, E)> = Vec::new();

        for entry in &mut self.entries {
            let start = entry.remaining_ms;
            entry.remaining_ms -= dt_ms;
            let mut at = start;
            while entry.remaining_ms <= 0.0 {
                fired.push((at.max(0.0), entry.event.clone()));
                match entry.period_ms {
                    Some(period) => {
                        entry.remaining_ms += period;
                        at += period;
                    }
                    None => break,
                }
            }
        }

        self.entries
            .retain(|e| e.period_ms.is_some() || e.remaining_ms > 0.0);

        // Stable sort keeps scheduling order for simultaneous events
        fired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        fired.into_iter().map(|(_, e)| e).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = Timers::new();
        timers.after(100.0, "door");
        assert!(timers.advance(60.0).is_empty());
        assert_eq!(timers.advance(60.0), vec!["door"]);
        assert!(timers.advance(1000.0).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_repeating_until_cancelled() {
        let mut timers = Timers::new();
        let id = timers.every(100.0, "spawn");
        assert_eq!(timers.advance(250.0), vec!["spawn", "spawn"]);
        assert_eq!(timers.advance(50.0), vec!["spawn"]);
        assert!(timers.cancel(id));
        assert!(!timers.is_pending(id));
        assert!(timers.advance(1000.0).is_empty());
        assert!(!timers.cancel(id));
    }

    #[test]
    fn test_due_order() {
        let mut timers = Timers::new();
        timers.after(80.0, "late");
        timers.after(20.0, "early");
        assert_eq!(timers.advance(100.0), vec!["early", "late"]);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut timers = Timers::new();
        timers.every(10.0, 1);
        timers.after(10.0, 2);
        timers.clear();
        assert!(timers.advance(100.0).is_empty());
    }
}
