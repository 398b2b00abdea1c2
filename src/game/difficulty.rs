//! Difficulty Curve
//!
//! Maps elapsed run time to horizontal speed, gap range, and platform-kind
//! weights. Pure function of the accumulated clock, monotone and
//! saturating: speed and gap range never decrease and cap out at the
//! configured ceilings.

use serde::{Serialize, Deserialize};

use crate::game::platform::PlatformKind;

/// Tuning for the difficulty curve.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Starting horizontal run speed
    pub base_speed: f32,
    /// Speed added per interval
    pub speed_step: f32,
    /// Seconds between speed steps
    pub speed_interval: f32,
    /// Speed ceiling
    pub max_speed: f32,
    /// Seconds of play per +1.0 of the difficulty scalar
    pub scalar_ramp_secs: f32,
    /// Difficulty scalar ceiling
    pub max_scalar: f32,
    /// Smallest gap ever generated
    pub min_gap: f32,
    /// Gap upper bound at scalar 0
    pub base_max_gap: f32,
    /// Gap upper bound growth per scalar point
    pub gap_per_scalar: f32,
    /// Scalar at which Moving/Small platforms appear
    pub moving_threshold: f32,
    /// Scalar at which Crumbling platforms appear
    pub crumbling_threshold: f32,
    /// Crumbling additionally gated behind this much elapsed time (seconds)
    pub crumbling_unlock_secs: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            base_speed: 300.0,
            speed_step: 20.0,
            speed_interval: 10.0,
            max_speed: 600.0,
            scalar_ramp_secs: 60.0,
            max_scalar: 3.0,
            min_gap: 80.0,
            base_max_gap: 150.0,
            gap_per_scalar: 50.0,
            moving_threshold: 1.5,
            crumbling_threshold: 2.5,
            crumbling_unlock_secs: 30.0,
        }
    }
}

/// Snapshot of the curve at a point in time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Elapsed run time in seconds
    pub elapsed: f32,
    /// Current horizontal run speed
    pub speed: f32,
    /// Difficulty scalar in [1.0, max_scalar]
    pub scalar: f32,
    /// Smallest gap the generator may sample
    pub gap_min: f32,
    /// Largest gap the generator may sample (before the reach clamp)
    pub gap_max: f32,
}

/// The difficulty clock plus external unlock flags.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DifficultyCurve {
    /// Accumulated run time in seconds
    pub elapsed: f32,

    /// Special platform kinds (Bouncy/Spring/Conveyor) allowed.
    /// Set by an external progression collaborator, never by the core.
    pub special_unlocked: bool,
}

impl DifficultyCurve {
    /// Create a fresh curve at t=0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock and return the current snapshot.
    pub fn update(&mut self, dt: f32, cfg: &DifficultyConfig) -> DifficultyState {
        self.elapsed += dt;
        self.state(cfg)
    }

    /// Snapshot without advancing the clock.
    pub fn state(&self, cfg: &DifficultyConfig) -> DifficultyState {
        let t = self.elapsed;

        let steps = (t / cfg.speed_interval).floor();
        let speed = (cfg.base_speed + steps * cfg.speed_step).min(cfg.max_speed);

        let scalar = (1.0 + t / cfg.scalar_ramp_secs).min(cfg.max_scalar);

        let gap_max = cfg.base_max_gap + scalar * cfg.gap_per_scalar;

        DifficultyState {
            elapsed: t,
            speed,
            scalar,
            gap_min: cfg.min_gap,
            gap_max,
        }
    }

    /// Allow or revoke the special platform kinds.
    pub fn set_special_unlocked(&mut self, unlocked: bool) {
        self.special_unlocked = unlocked;
    }

    /// Platform-kind weights at the given snapshot, indexed by
    /// `PlatformKind as usize`.
    ///
    /// Early game is all Static; Moving/Small phase in past the first
    /// threshold; Crumbling past the second threshold AND the time gate;
    /// the launch/conveyor kinds only with the external unlock.
    pub fn kind_weights(
        &self,
        state: &DifficultyState,
        cfg: &DifficultyConfig,
    ) -> [u32; PlatformKind::COUNT] {
        let mut weights = [0u32; PlatformKind::COUNT];

        if state.scalar < cfg.moving_threshold {
            weights[PlatformKind::Static as usize] = 100;
            return weights;
        }

        if state.scalar < cfg.crumbling_threshold {
            weights[PlatformKind::Static as usize] = 75;
            weights[PlatformKind::Moving as usize] = 15;
            weights[PlatformKind::Small as usize] = 10;
        } else {
            weights[PlatformKind::Static as usize] = 60;
            weights[PlatformKind::Moving as usize] = 15;
            weights[PlatformKind::Small as usize] = 15;
            if state.elapsed >= cfg.crumbling_unlock_secs {
                weights[PlatformKind::Crumbling as usize] = 10;
            } else {
                weights[PlatformKind::Static as usize] += 10;
            }
        }

        if self.special_unlocked {
            // Shave the static share to make room for the special kinds
            weights[PlatformKind::Static as usize] =
                weights[PlatformKind::Static as usize].saturating_sub(15);
            weights[PlatformKind::Bouncy as usize] = 6;
            weights[PlatformKind::Spring as usize] = 5;
            weights[PlatformKind::Conveyor as usize] = 4;
        }

        weights
    }
}

// =============================================================================
// TESTS
// =============================================================================
