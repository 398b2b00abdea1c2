//! Run State
//!
//! The complete authoritative state of one run: player, platform stream,
//! difficulty clock, score, and the pending event list. Everything that
//! affects simulation outcomes lives here and is covered by the state
//! hash; anything not hashed must not influence a tick.

use serde::{Serialize, Deserialize};

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::vec2::Vec2;
use crate::game::difficulty::DifficultyCurve;
use crate::game::events::GameEvent;
use crate::game::gen::PlatformGenerator;
use crate::game::player::PlayerState;
use crate::game::tick::RunConfig;

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Created, not yet started; ticks are no-ops
    #[default]
    Ready,
    /// Simulating
    Running,
    /// Player died; ticks are no-ops
    Ended,
}

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// First jumps executed
    pub jumps: u32,
    /// Double jumps executed
    pub double_jumps: u32,
    /// Glides started
    pub glides: u32,
    /// Landings that stuck
    pub platforms_landed: u32,
}

/// Terminal readout of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Horizontal distance travelled (world units)
    pub distance: f32,
    /// Final score
    pub score: u32,
    /// Landings that stuck
    pub platforms_landed: u32,
    /// Run length in ticks
    pub duration_ticks: u64,
}

/// Authoritative state for one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunState {
    /// RNG seed this run was created with
    pub seed: u64,

    /// Completed tick count
    pub tick: u64,

    /// Run lifecycle phase
    pub phase: RunPhase,

    /// Player motion state
    pub player: PlayerState,

    /// Difficulty clock and unlock flags
    pub difficulty: DifficultyCurve,

    /// Run speed as of the last tick (for speed-step event edges)
    pub current_speed: f32,

    /// Platform stream
    pub generator: PlatformGenerator,

    /// Score (landings)
    pub score: u32,

    /// Accumulated counters
    pub stats: RunStats,

    /// Events generated this tick, drained by the tick loop.
    /// Crate-visible so the tick loop can split-borrow it alongside the
    /// subsystems that emit into it.
    #[serde(skip)]
    pub(crate) pending_events: Vec<GameEvent>,
}

impl RunState {
    /// Create a run in the Ready phase, player standing on the starting
    /// platform.
    pub fn new(seed: u64, cfg: &RunConfig) -> Self {
        let generator = PlatformGenerator::new(seed, &cfg.generator);

        let mut player = PlayerState::new(Vec2::new(cfg.player_start_x, 0.0));
        player.snap_bottom_to(cfg.generator.start_y, &cfg.player);

        Self {
            seed,
            tick: 0,
            phase: RunPhase::Ready,
            player,
            difficulty: DifficultyCurve::new(),
            current_speed: cfg.difficulty.base_speed,
            generator,
            score: 0,
            stats: RunStats::default(),
            pending_events: Vec::with_capacity(32),
        }
    }

    /// Begin simulating.
    pub fn start(&mut self) {
        if self.phase == RunPhase::Ready {
            self.phase = RunPhase::Running;
        }
    }

    /// Queue an event for this tick.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Drain the pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Distance travelled so far.
    pub fn distance(&self) -> f32 {
        self.player.position.x
    }

    /// Terminal readout.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            distance: self.distance(),
            score: self.score,
            platforms_landed: self.stats.platforms_landed,
            duration_ticks: self.tick,
        }
    }

    /// Hash everything that affects simulation outcomes.
    ///
    /// Two runs with the same seed and input trace must produce identical
    /// hashes at every tick.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.seed, |hasher| {
            self.player.hash_into(hasher);

            hasher.update_u8(self.phase as u8);
            hasher.update_u32(self.score);
            hasher.update_f32(self.current_speed);
            hasher.update_f32(self.difficulty.elapsed);
            hasher.update_bool(self.difficulty.special_unlocked);

            let rng = self.generator.rng_state();
            hasher.update_u64(rng[0]);
            hasher.update_u64(rng[1]);

            for platform in self.generator.active_platforms() {
                platform.hash_into(hasher);
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
