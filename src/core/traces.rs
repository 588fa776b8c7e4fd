//! Input traces - rolling history of pedal and steering inputs
//!
//! The owner feeds the latest input values whenever a view arrives and calls
//! `sample(now)` at the configured rate; each enabled channel keeps the
//! samples of the last `history` window.

use std::collections::VecDeque;
use std::time::Duration;

use super::constants::STEERING_FULL_LOCK_PCT;

/// One timed value, `t` in seconds since the trace clock started
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSample {
    pub t: f64,
    pub v: f64,
}

/// Timed samples, oldest first
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    samples: VecDeque<TraceSample>,
    history: f64,
}

impl TraceBuffer {
    pub fn new(history: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            history: history.as_secs_f64(),
        }
    }

    /// Append a sample and drop the ones older than the history window
    pub fn push(&mut self, t: f64, v: f64) {
        self.samples.push_back(TraceSample { t, v });
        while let Some(front) = self.samples.front() {
            if t - front.t > self.history {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = &TraceSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().map(|s| s.v)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Map `steeringAnglePct` to [0, 1], centered on 0.5
///
/// `full_lock` maps to 1 and `-full_lock` to 0.
pub fn steering_to_unit(steering_angle_pct: f64, full_lock: f64) -> f64 {
    if full_lock == 0.0 {
        return 0.5;
    }
    (0.5 + 0.5 * (steering_angle_pct / full_lock)).clamp(0.0, 1.0)
}

/// Which channels are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceChannels {
    pub throttle: bool,
    /// Also records the ABS channel
    pub brake: bool,
    pub clutch: bool,
    pub steering: bool,
}

/// Latest known input, carried between samples
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSample {
    pub throttle: f64,
    pub brake: f64,
    pub clutch: f64,
    pub steering_angle_pct: f64,
    pub abs_active: bool,
}

pub struct InputTraces {
    channels: TraceChannels,
    last: InputSample,
    pub throttle: TraceBuffer,
    pub brake: TraceBuffer,
    pub abs: TraceBuffer,
    pub clutch: TraceBuffer,
    pub steering: TraceBuffer,
}

impl InputTraces {
    pub fn new(channels: TraceChannels, history: Duration) -> Self {
        Self {
            channels,
            last: InputSample::default(),
            throttle: TraceBuffer::new(history),
            brake: TraceBuffer::new(history),
            abs: TraceBuffer::new(history),
            clutch: TraceBuffer::new(history),
            steering: TraceBuffer::new(history),
        }
    }

    /// Record the latest input; missing optional values keep the previous one
    pub fn set_input(
        &mut self,
        throttle: f64,
        brake: f64,
        clutch: Option<f64>,
        steering_angle_pct: Option<f64>,
        abs_active: bool,
    ) {
        self.last = InputSample {
            throttle,
            brake,
            clutch: clutch.unwrap_or(self.last.clutch),
            steering_angle_pct: steering_angle_pct.unwrap_or(self.last.steering_angle_pct),
            abs_active,
        };
    }

    pub fn last_input(&self) -> &InputSample {
        &self.last
    }

    /// Sample every enabled channel at time `now` (seconds)
    pub fn sample(&mut self, now: f64) {
        let last = self.last;
        if self.channels.throttle {
            self.throttle.push(now, last.throttle);
        }
        if self.channels.brake {
            self.brake.push(now, last.brake);
            self.abs.push(now, if last.abs_active { 1.0 } else { 0.0 });
        }
        if self.channels.clutch {
            self.clutch.push(now, last.clutch);
        }
        if self.channels.steering {
            self.steering.push(
                now,
                steering_to_unit(last.steering_angle_pct, STEERING_FULL_LOCK_PCT),
            );
        }
    }

    pub fn channels(&self) -> TraceChannels {
        self.channels
    }
}

/// Sampling period for a rate in Hz, never shorter than 1 µs
pub fn sample_period(sample_hz: u32) -> Duration {
    Duration::from_micros((1_000_000 / sample_hz.max(1) as u64).max(1))
}

/// First sampling deadline after `elapsed` on a `period` grid anchored at `due`
///
/// Missed periods are skipped in one step rather than replayed.
pub fn next_sample_time(due: Duration, elapsed: Duration, period: Duration) -> Duration {
    let period_ns = period.as_nanos().max(1);
    let behind = elapsed.saturating_sub(due).as_nanos() % period_ns;
    elapsed + Duration::from_nanos((period_ns - behind) as u64)
}
