//! Contracts for user code that drives the graph while it is shown

use crate::graph::AttrGraph;

/// Periodic mutation of graph attributes
///
/// `tick` counts applications starting from 0 and `elapsed` is the time in
/// seconds since the previous application. The call runs inline on the frame
/// loop, so the frame waits for it.
pub trait StateTransition: Send + Sync + 'static {
    fn step(&mut self, graph: &mut AttrGraph, tick: u64, elapsed: f32);
}

impl<F> StateTransition for F
where
    F: FnMut(&mut AttrGraph, u64, f32) + Send + Sync + 'static,
{
    fn step(&mut self, graph: &mut AttrGraph, tick: u64, elapsed: f32) {
        self(graph, tick, elapsed)
    }
}

/// Receives keys typed into the viewer window
pub trait KeyHandler: Send + Sync + 'static {
    fn on_key(&mut self, graph: &mut AttrGraph, key: char);
}

impl<F> KeyHandler for F
where
    F: FnMut(&mut AttrGraph, char) + Send + Sync + 'static,
{
    fn on_key(&mut self, graph: &mut AttrGraph, key: char) {
        self(graph, key)
    }
}

/// Decides when the state transition is due
#[derive(Debug, Clone)]
pub struct TransitionClock {
    period: f32,
    accumulated: f32,
    since_last: f32,
    ticks: u64,
}

impl TransitionClock {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(0.0),
            accumulated: 0.0,
            since_last: 0.0,
            ticks: 0,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance by a frame's duration; returns `(tick, elapsed)` when due
    ///
    /// Fires at most once per call, so a long frame never replays a backlog
    /// of transitions.
    pub fn advance(&mut self, dt: f32) -> Option<(u64, f32)> {
        self.accumulated += dt;
        self.since_last += dt;
        if self.accumulated < self.period {
            return None;
        }
        self.accumulated = if self.period > 0.0 {
            self.accumulated % self.period
        } else {
            0.0
        };
        let fired = (self.ticks, self.since_last);
        self.ticks += 1;
        self.since_last = 0.0;
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;

    #[test]
    fn test_clock_fires_once_per_period() {
        let mut clock = TransitionClock::new(1.0);
        assert_eq!(clock.advance(0.5), None);
        assert_eq!(clock.advance(0.25), None);
        assert_eq!(clock.advance(0.25), Some((0, 1.0)));
        assert_eq!(clock.advance(0.5), None);
        let (tick, elapsed) = clock.advance(0.75).unwrap();
        assert_eq!(tick, 1);
        assert!((elapsed - 1.25).abs() < 1e-6);
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_long_frame_fires_once() {
        let mut clock = TransitionClock::new(0.1);
        assert!(clock.advance(1.05).is_some());
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn test_zero_period_fires_every_frame() {
        let mut clock = TransitionClock::new(0.0);
        assert!(clock.advance(0.016).is_some());
        assert!(clock.advance(0.016).is_some());
    }

    #[test]
    fn test_closures_are_transitions() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        let mut add = |g: &mut AttrGraph, tick: u64, _elapsed: f32| {
            g.add_node(format!("n{tick}"));
        };
        add.step(&mut g, 0, 1.0);
        add.step(&mut g, 1, 1.0);
        assert_eq!(g.node_count(), 2);

        let mut on_key = |g: &mut AttrGraph, key: char| {
            g.add_node(key.to_string());
        };
        on_key.on_key(&mut g, 'x');
        assert!(g.contains("x"));
    }
}
