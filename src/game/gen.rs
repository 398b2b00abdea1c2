//! Platform Generation
//!
//! Streams platforms ahead of the player from a fixed-capacity pool,
//! sampling gaps, widths, vertical offsets, and kinds from the seeded RNG.
//! Every gap is capped below the current reachability envelope times a
//! safety factor, so a run can always be continued by a player with the
//! full kit. Platforms scrolled far behind the player are evicted and
//! their slots reused.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::rng::DeterministicRng;
use crate::game::SimError;
use crate::game::difficulty::DifficultyState;
use crate::game::events::GameEvent;
use crate::game::platform::{KindState, Lifecycle, Platform, PlatformKind};

// =============================================================================
// CONFIG
// =============================================================================

/// Tuning for the platform stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Pool capacity (hard bound on simultaneously live platforms)
    pub pool_capacity: usize,
    /// Left edge of the starting platform
    pub start_x: f32,
    /// Top surface of the starting platform
    pub start_y: f32,
    /// Width of the starting platform
    pub start_width: f32,
    /// Platform thickness
    pub platform_height: f32,
    /// Narrowest random width
    pub min_width: f32,
    /// Widest random width
    pub max_width: f32,
    /// Fixed width of the Small kind
    pub small_width: f32,
    /// How far past the frontier the stream stays populated
    pub lookahead: f32,
    /// Platforms this far behind the frontier are evicted
    pub eviction_margin: f32,
    /// Gap cap as a fraction of max reach
    pub safety_factor: f32,
    /// Fraction of gaps kept within a single first jump
    pub easy_fraction: f32,
    /// Easy-gap upper bound as a fraction of single-jump reach
    pub easy_upper: f32,
    /// Hard-gap lower bound as a fraction of single-jump reach
    pub hard_lower: f32,
    /// Max rise per step as a fraction of combined jump height
    pub rise_fraction: f32,
    /// Max drop per step as a fraction of combined jump height
    pub drop_fraction: f32,
    /// Highest platform top (smallest y)
    pub min_top: f32,
    /// Lowest platform top (largest y, kept above the water line)
    pub max_top: f32,
    /// Oscillation amplitude of Moving platforms
    pub moving_amplitude: f32,
    /// Oscillation angular frequency of Moving platforms (rad/s)
    pub moving_angular_freq: f32,
    /// Landings a Crumbling platform survives
    pub crumbling_uses: u8,
    /// Delay between the consuming landing and collapse (seconds)
    pub crumbling_delay: f32,
    /// Bouncy launch multiplier on the first-jump velocity
    pub bounce_multiplier: f32,
    /// Spring launch multiplier on the first-jump velocity
    pub spring_force: f32,
    /// Conveyor push speed magnitude (direction is sampled)
    pub conveyor_push: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 32,
            start_x: 0.0,
            start_y: 520.0,
            start_width: 200.0,
            platform_height: 32.0,
            min_width: 130.0,
            max_width: 300.0,
            small_width: 100.0,
            lookahead: 1500.0,
            eviction_margin: 200.0,
            safety_factor: 0.9,
            easy_fraction: 0.6,
            easy_upper: 0.75,
            hard_lower: 0.8,
            rise_fraction: 0.3,
            drop_fraction: 0.5,
            min_top: 150.0,
            max_top: 470.0,
            moving_amplitude: 60.0,
            moving_angular_freq: 2.0,
            crumbling_uses: 1,
            crumbling_delay: 0.5,
            bounce_multiplier: 1.2,
            spring_force: 1.5,
            conveyor_push: 80.0,
        }
    }
}

/// Reachability numbers the generator budgets gaps against, recomputed
/// by the tick loop whenever the run speed changes.
#[derive(Clone, Copy, Debug)]
pub struct ReachBudget {
    /// Full-kit horizontal reach
    pub max_reach: f32,
    /// Single first-jump horizontal reach
    pub single_jump: f32,
    /// Combined peak height of both jump arcs
    pub jump_height: f32,
}

impl ReachBudget {
    /// Evaluate the envelope at the given run speed.
    pub fn compute(
        speed: f32,
        abilities: crate::game::reach::AbilitySet,
        cfg: &crate::game::player::PlayerConfig,
    ) -> Self {
        use crate::game::reach;
        Self {
            max_reach: reach::max_horizontal_reach(speed, abilities, cfg),
            single_jump: reach::single_jump_reach(speed, cfg),
            jump_height: reach::jump_peak_height(cfg.first_jump_velocity, cfg.gravity)
                + reach::jump_peak_height(cfg.second_jump_velocity, cfg.gravity),
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// The platform stream: a slot pool plus placement cursor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformGenerator {
    /// Slot pool, indexed by slot id
    slots: Vec<Platform>,

    /// Generation RNG (separate stream from nothing else; the whole sim
    /// shares this one seeded source via the run state)
    rng: DeterministicRng,

    /// Right edge of the most recently placed platform
    last_x: f32,

    /// Top surface of the most recently placed platform
    last_y: f32,

    /// Oscillation amplitude of the most recently placed platform
    last_amplitude: f32,
}

impl PlatformGenerator {
    /// Create a generator with the starting platform placed in slot 0.
    pub fn new(seed: u64, cfg: &GeneratorConfig) -> Self {
        let mut slots: Vec<Platform> = (0..cfg.pool_capacity)
            .map(|i| Platform {
                slot: i as u32,
                ..Platform::default()
            })
            .collect();

        if let Some(start) = slots.first_mut() {
            start.reset(
                cfg.start_x,
                cfg.start_y,
                cfg.start_width,
                cfg.platform_height,
                PlatformKind::Static,
                KindState::Plain,
            );
        }

        Self {
            slots,
            rng: DeterministicRng::new(seed),
            last_x: cfg.start_x + cfg.start_width,
            last_y: cfg.start_y,
            last_amplitude: 0.0,
        }
    }

    /// All pool slots (active and free).
    pub fn slots(&self) -> &[Platform] {
        &self.slots
    }

    /// Mutable pool slots, for the collision resolver's landing effects.
    pub fn slots_mut(&mut self) -> &mut [Platform] {
        &mut self.slots
    }

    /// Iterator over active platforms.
    pub fn active_platforms(&self) -> impl Iterator<Item = &Platform> {
        self.slots.iter().filter(|p| p.active)
    }

    /// RNG state, folded into the run hash.
    pub fn rng_state(&self) -> [u64; 2] {
        self.rng.state()
    }

    /// Advance the stream by one tick.
    ///
    /// Order: platform behaviors, then eviction/collapse sweep, then
    /// spawning until the lookahead window past `frontier` is covered.
    /// The slot carrying the player is never evicted by the scroll sweep.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        frontier: f32,
        dt: f32,
        difficulty: &DifficultyState,
        weights: &[u32; PlatformKind::COUNT],
        budget: ReachBudget,
        supported_slot: Option<u32>,
        cfg: &GeneratorConfig,
        tick: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), SimError> {
        // 1. Kind behaviors (oscillation, crumble countdowns)
        for platform in self.slots.iter_mut().filter(|p| p.active) {
            platform.update(dt, tick, events);
        }

        // 2. Sweep: collapsed platforms go unconditionally; scrolled-out
        //    ones only when the player is not standing on them.
        let eviction_line = frontier - cfg.eviction_margin;
        for platform in self.slots.iter_mut().filter(|p| p.active) {
            let collapsed = platform.lifecycle == Lifecycle::PendingRemoval;
            let scrolled_out = platform.right() + platform.oscillation_amplitude()
                < eviction_line
                && Some(platform.slot) != supported_slot;
            if collapsed || scrolled_out {
                debug!(slot = platform.slot, kind = ?platform.kind, "platform evicted");
                platform.deactivate();
            }
        }

        // 3. Coverage
        while self.last_x < frontier + cfg.lookahead {
            self.spawn_next(difficulty, weights, budget, cfg, tick, events)?;
        }

        Ok(())
    }

    /// Place one platform after the current cursor.
    fn spawn_next(
        &mut self,
        difficulty: &DifficultyState,
        weights: &[u32; PlatformKind::COUNT],
        budget: ReachBudget,
        cfg: &GeneratorConfig,
        tick: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), SimError> {
        let kind = PlatformKind::from_index(self.rng.weighted_index(weights))
            .unwrap_or_default();

        let width = match kind {
            PlatformKind::Small => cfg.small_width,
            _ => self.rng.next_f32_range(cfg.min_width, cfg.max_width),
        };

        let amplitude = match kind {
            PlatformKind::Moving => cfg.moving_amplitude,
            _ => 0.0,
        };

        // Gap budget: the worst-case oscillation phase of BOTH neighbors
        // is charged against the reach-derived hard cap.
        let hard_cap =
            budget.max_reach * cfg.safety_factor - self.last_amplitude - amplitude;

        let easy_hi = (budget.single_jump * cfg.easy_upper)
            .min(hard_cap)
            .max(difficulty.gap_min);
        let gap = if self.rng.next_bool_p(cfg.easy_fraction) {
            self.rng.next_f32_range(difficulty.gap_min, easy_hi)
        } else {
            let lo = (budget.single_jump * cfg.hard_lower).min(hard_cap);
            let hi = difficulty.gap_max.min(hard_cap).max(lo);
            self.rng.next_f32_range(lo, hi)
        };

        let rise = budget.jump_height * cfg.rise_fraction;
        let drop = budget.jump_height * cfg.drop_fraction;
        let top = crate::core::vec2::clamp(
            self.last_y + self.rng.next_f32_range(-rise, drop),
            cfg.min_top,
            cfg.max_top,
        );

        let left = self.last_x + gap;

        let kind_state = match kind {
            PlatformKind::Moving => KindState::Moving {
                base_left: left,
                amplitude,
                angular_freq: cfg.moving_angular_freq,
                elapsed: 0.0,
            },
            PlatformKind::Crumbling => KindState::Crumbling {
                uses_left: cfg.crumbling_uses,
                collapse_timer: -1.0,
            },
            PlatformKind::Bouncy => KindState::Bouncy {
                multiplier: cfg.bounce_multiplier,
            },
            PlatformKind::Spring => KindState::Spring {
                force: cfg.spring_force,
            },
            PlatformKind::Conveyor => {
                let direction = if self.rng.next_bool_p(0.5) { 1.0 } else { -1.0 };
                KindState::Conveyor {
                    push: cfg.conveyor_push * direction,
                }
            }
            _ => KindState::Plain,
        };

        let slot = match self.slots.iter_mut().find(|p| !p.active) {
            Some(platform) => {
                platform.reset(left, top, width, cfg.platform_height, kind, kind_state);
                platform.slot
            }
            None => {
                return Err(SimError::PoolExhausted {
                    capacity: self.slots.len(),
                })
            }
        };

        debug!(slot, ?kind, left, top, gap, "platform spawned");
        events.push(GameEvent::platform_spawned(tick, slot, kind, left, top));

        self.last_x = left + width;
        self.last_y = top;
        self.last_amplitude = amplitude;

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
