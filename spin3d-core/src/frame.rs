//! Frame timing: converts host timestamps into per-frame ticks

/// Time information handed to every per-frame callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the clock started
    pub elapsed: f32,
    /// Seconds since the previous tick, never negative
    pub delta: f32,
}

impl FrameTick {
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }
}

/// Wall-clock driven frame clock. The first tick has a zero delta.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    start: Option<f64>,
    last: Option<f64>,
    elapsed: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick from an absolute host timestamp in seconds.
    pub fn tick_seconds(&mut self, now: f64) -> FrameTick {
        let start = *self.start.get_or_insert(now);
        let delta = match self.last {
            // A clock that steps backwards must not rewind animations
            Some(last) => (now - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(now.max(self.last.unwrap_or(now)));
        self.elapsed = self.elapsed.max(now - start);
        FrameTick::new(self.elapsed as f32, delta as f32)
    }

    /// Tick from a host timestamp in milliseconds (e.g. `performance.now()`).
    pub fn tick_millis(&mut self, now_ms: f64) -> FrameTick {
        self.tick_seconds(now_ms / 1000.0)
    }

    /// Advance by a fixed step, independent of any host clock.
    pub fn advance(&mut self, delta: f32) -> FrameTick {
        let delta = delta.max(0.0) as f64;
        let now = self.last.unwrap_or(0.0) + delta;
        if self.start.is_none() {
            self.start = Some(0.0);
        }
        self.last = Some(now);
        self.elapsed += delta;
        FrameTick::new(self.elapsed as f32, delta as f32)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }
}
