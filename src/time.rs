//! Time sources for the café.
//!
//! - [`Clock`] gives wall-clock milliseconds for inventory timestamps and the
//!   surprise unlock time.
//! - [`GameTime`] turns `draw_web()` frame timestamps into discrete ticks.
//! - [`Countdown`] is a cancellable one-shot timer driven by those ticks. The
//!   scene owns every countdown; engine code never sees ticks.

#[cfg(test)]
use std::cell::Cell;

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    now: Cell<f64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn starting_at(ms: f64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

pub struct GameTime {
    ms_per_tick: f64,
    /// Milliseconds not yet consumed as ticks
    accumulator: f64,
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            last_timestamp: None,
        }
    }

    /// Feed a frame timestamp (`performance.now()`), get the ticks to process.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            // Clamp so a backgrounded tab does not fire every timer at once
            Some(prev) => (now_ms - prev).clamp(0.0, 500.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        ticks
    }
}

/// One-shot timer. Idle until started; fires once when its ticks run out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Countdown {
    remaining: Option<u32>,
}

impl Countdown {
    pub fn idle() -> Self {
        Self { remaining: None }
    }

    /// (Re)start with `ticks` to go. A zero-tick countdown fires on the next `tick`.
    pub fn start(&mut self, ticks: u32) {
        self.remaining = Some(ticks);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `delta` ticks. Returns true exactly once, when the timer expires.
    pub fn tick(&mut self, delta: u32) -> bool {
        match self.remaining {
            Some(left) if delta >= left => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - delta);
                false
            }
            None => false,
        }
    }
}
