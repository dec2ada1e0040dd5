//! Per-frame and rolling collision counters.
//!
//! Every collision pass reports how many broad-phase candidates it pulled,
//! how many narrow-phase tests it ran and how many hits it resolved.
//! [`FrameMetrics`] holds those counts for the frame in progress;
//! [`RollingMetrics`] folds finished frames into lifetime totals, peaks and a
//! fixed-length window of recent frames. [`PerformanceSnapshot`] is the
//! read-only view handed to diagnostics. None of this feeds back into
//! gameplay.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::{AddAssign, Index, IndexMut};
use std::time::Duration;

/// Identifies one of the three collision passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassKind {
    /// Friendly projectiles against combatants.
    Friendly,
    /// Hostile projectiles against the player.
    Player,
    /// Hostile projectiles against combatants other than their owner.
    FriendlyFire,
}

impl PassKind {
    /// All passes in execution order.
    pub const ALL: [Self; 3] = [Self::Friendly, Self::Player, Self::FriendlyFire];
}

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassCounters {
    /// Candidates produced by the broad phase.
    pub candidates: u64,
    /// Narrow-phase tests run.
    pub checks: u64,
    /// Hits resolved.
    pub hits: u64,
}

impl AddAssign for PassCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.candidates += rhs.candidates;
        self.checks += rhs.checks;
        self.hits += rhs.hits;
    }
}

/// One value per pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerPass<T> {
    /// Friendly projectiles against combatants.
    pub friendly: T,
    /// Hostile projectiles against the player.
    pub player: T,
    /// Hostile projectiles against other combatants.
    pub friendly_fire: T,
}

impl<T> Index<PassKind> for PerPass<T> {
    type Output = T;

    fn index(&self, kind: PassKind) -> &T {
        match kind {
            PassKind::Friendly => &self.friendly,
            PassKind::Player => &self.player,
            PassKind::FriendlyFire => &self.friendly_fire,
        }
    }
}

impl<T> IndexMut<PassKind> for PerPass<T> {
    fn index_mut(&mut self, kind: PassKind) -> &mut T {
        match kind {
            PassKind::Friendly => &mut self.friendly,
            PassKind::Player => &mut self.player,
            PassKind::FriendlyFire => &mut self.friendly_fire,
        }
    }
}

/// Live collection sizes at the start of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    /// Combatants in the arena.
    pub combatants: usize,
    /// Friendly projectiles in flight.
    pub friendly_projectiles: usize,
    /// Hostile projectiles in flight.
    pub hostile_projectiles: usize,
}

/// Counters for the frame in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Population at the start of the frame.
    pub population: Population,
    /// Per-pass counters.
    pub passes: PerPass<PassCounters>,
}

impl FrameMetrics {
    /// Resets all counters and records the starting population.
    pub fn begin_frame(&mut self, population: Population) {
        *self = Self {
            population,
            passes: PerPass::default(),
        };
    }

    /// Adds broad-phase candidates to `pass`.
    pub fn record_candidates(&mut self, pass: PassKind, count: usize) {
        self.passes[pass].candidates += count as u64;
    }

    /// Counts one narrow-phase test in `pass`.
    pub fn record_check(&mut self, pass: PassKind) {
        self.passes[pass].checks += 1;
    }

    /// Counts one resolved hit in `pass`.
    pub fn record_hit(&mut self, pass: PassKind) {
        self.passes[pass].hits += 1;
    }

    /// Candidates across all passes.
    #[must_use]
    pub fn total_candidates(&self) -> u64 {
        PassKind::ALL
            .iter()
            .map(|&pass| self.passes[pass].candidates)
            .sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameSample {
    passes: PerPass<PassCounters>,
    elapsed: Duration,
}

/// Average counts per frame for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PassAverages {
    /// Mean candidates per frame.
    pub candidates: f64,
    /// Mean narrow-phase tests per frame.
    pub checks: f64,
    /// Mean hits per frame.
    pub hits: f64,
}

impl PassAverages {
    #[allow(clippy::cast_precision_loss)]
    fn from_totals(totals: PassCounters, frames: u64) -> Self {
        if frames == 0 {
            return Self::default();
        }
        let n = frames as f64;
        Self {
            candidates: totals.candidates as f64 / n,
            checks: totals.checks as f64 / n,
            hits: totals.hits as f64 / n,
        }
    }
}

/// Aggregates across finished frames.
///
/// Lifetime totals cover every frame since creation. The window holds the
/// most recent `window_size` frames and is what "rolling" averages are
/// computed from.
#[derive(Debug, Clone)]
pub struct RollingMetrics {
    frames: u64,
    totals: PerPass<PassCounters>,
    total_elapsed: Duration,
    peak_candidates: u64,
    peak_elapsed: Duration,
    window: VecDeque<FrameSample>,
    window_size: usize,
}

impl RollingMetrics {
    /// Creates empty metrics averaging over the last `window_size` frames.
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            frames: 0,
            totals: PerPass::default(),
            total_elapsed: Duration::ZERO,
            peak_candidates: 0,
            peak_elapsed: Duration::ZERO,
            window: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Folds a finished frame into the totals, peaks and window.
    pub fn finalize_frame(&mut self, frame: &FrameMetrics, elapsed: Duration) {
        self.frames += 1;
        for pass in PassKind::ALL {
            self.totals[pass] += frame.passes[pass];
        }
        self.total_elapsed += elapsed;
        self.peak_candidates = self.peak_candidates.max(frame.total_candidates());
        self.peak_elapsed = self.peak_elapsed.max(elapsed);

        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(FrameSample {
            passes: frame.passes,
            elapsed,
        });

        tracing::trace!(
            frame = self.frames,
            candidates = frame.total_candidates(),
            elapsed_us = micros(elapsed),
            "collision frame finalized"
        );
    }

    /// Number of frames finalized.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Lifetime totals per pass.
    #[must_use]
    pub const fn totals(&self) -> &PerPass<PassCounters> {
        &self.totals
    }

    /// Highest candidate count seen in a single frame.
    #[must_use]
    pub const fn peak_candidates(&self) -> u64 {
        self.peak_candidates
    }

    /// Builds a snapshot using `last` as the latest frame's raw counters.
    #[must_use]
    pub fn snapshot(&self, last: &FrameMetrics) -> PerformanceSnapshot {
        let mut lifetime = PerPass::default();
        let mut windowed = PerPass::default();
        let window_frames = self.window.len() as u64;

        for pass in PassKind::ALL {
            lifetime[pass] = PassAverages::from_totals(self.totals[pass], self.frames);
            let mut sum = PassCounters::default();
            for sample in &self.window {
                sum += sample.passes[pass];
            }
            windowed[pass] = PassAverages::from_totals(sum, window_frames);
        }

        let window_elapsed: Duration = self.window.iter().map(|s| s.elapsed).sum();
        PerformanceSnapshot {
            last_frame: *last,
            last_frame_us: self.window.back().map_or(0, |s| micros(s.elapsed)),
            frames: self.frames,
            window_samples: self.window.len(),
            lifetime,
            windowed,
            avg_frame_us: average_micros(self.total_elapsed, self.frames),
            windowed_frame_us: average_micros(window_elapsed, window_frames),
            peak_candidates: self.peak_candidates,
            peak_frame_us: micros(self.peak_elapsed),
        }
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[allow(clippy::cast_precision_loss)]
fn average_micros(total: Duration, frames: u64) -> f64 {
    if frames == 0 {
        0.0
    } else {
        total.as_secs_f64() * 1.0e6 / frames as f64
    }
}

/// Diagnostics view of the collision workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Raw counters of the latest frame.
    pub last_frame: FrameMetrics,
    /// Duration of the latest finalized frame, in microseconds.
    pub last_frame_us: u64,
    /// Frames finalized since creation.
    pub frames: u64,
    /// Frames currently in the window.
    pub window_samples: usize,
    /// Per-pass averages over every frame.
    pub lifetime: PerPass<PassAverages>,
    /// Per-pass averages over the window.
    pub windowed: PerPass<PassAverages>,
    /// Mean frame time over every frame, in microseconds.
    pub avg_frame_us: f64,
    /// Mean frame time over the window, in microseconds.
    pub windowed_frame_us: f64,
    /// Highest total candidate count in one frame.
    pub peak_candidates: u64,
    /// Longest frame, in microseconds.
    pub peak_frame_us: u64,
}
