//! Game Events
//!
//! Discrete events generated during simulation. The core never calls into
//! rendering/audio/scoring directly; those collaborators consume this
//! event list each tick. Events are emitted in deterministic program
//! order within a tick.

use serde::{Serialize, Deserialize};
use crate::game::platform::PlatformKind;

/// Game event data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player executed a jump (count 1 = first, 2 = double)
    Jumped {
        /// Jump number within the airborne segment
        count: u8,
    },

    /// Glide started
    GlideStarted,

    /// Glide ended (budget exhausted or cancelled)
    GlideEnded,

    /// Player landed on a platform
    Landed {
        /// Pool slot of the platform
        slot: u32,
        /// Kind of the platform
        kind: PlatformKind,
    },

    /// A launch surface (Bouncy/Spring) overrode the landing velocity
    Launched {
        /// Pool slot of the platform
        slot: u32,
        /// Upward velocity applied (negative = up)
        vy: f32,
    },

    /// A new platform entered the stream
    PlatformSpawned {
        /// Pool slot assigned
        slot: u32,
        /// Kind of the platform
        kind: PlatformKind,
        /// Left edge in world space
        left: f32,
        /// Top surface y in world space
        top: f32,
    },

    /// A crumbling platform collapsed
    PlatformCrumbled {
        /// Pool slot of the platform
        slot: u32,
    },

    /// Run speed stepped up on the difficulty curve
    SpeedIncreased {
        /// New horizontal run speed
        speed: f32,
    },

    /// Player died (crossed the water line)
    Died {
        /// World x where the run ended
        x: f32,
    },

    /// Run ended
    RunEnded {
        /// Total distance travelled
        distance: f32,
        /// Final score
        score: u32,
        /// Run duration in ticks
        duration_ticks: u64,
    },
}

/// A game event with its tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create jumped event.
    pub fn jumped(tick: u64, count: u8) -> Self {
        Self::new(tick, GameEventData::Jumped { count })
    }

    /// Create glide started event.
    pub fn glide_started(tick: u64) -> Self {
        Self::new(tick, GameEventData::GlideStarted)
    }

    /// Create glide ended event.
    pub fn glide_ended(tick: u64) -> Self {
        Self::new(tick, GameEventData::GlideEnded)
    }

    /// Create landed event.
    pub fn landed(tick: u64, slot: u32, kind: PlatformKind) -> Self {
        Self::new(tick, GameEventData::Landed { slot, kind })
    }

    /// Create launched event.
    pub fn launched(tick: u64, slot: u32, vy: f32) -> Self {
        Self::new(tick, GameEventData::Launched { slot, vy })
    }

    /// Create platform spawned event.
    pub fn platform_spawned(tick: u64, slot: u32, kind: PlatformKind, left: f32, top: f32) -> Self {
        Self::new(tick, GameEventData::PlatformSpawned { slot, kind, left, top })
    }

    /// Create platform crumbled event.
    pub fn platform_crumbled(tick: u64, slot: u32) -> Self {
        Self::new(tick, GameEventData::PlatformCrumbled { slot })
    }

    /// Create speed increased event.
    pub fn speed_increased(tick: u64, speed: f32) -> Self {
        Self::new(tick, GameEventData::SpeedIncreased { speed })
    }

    /// Create died event.
    pub fn died(tick: u64, x: f32) -> Self {
        Self::new(tick, GameEventData::Died { x })
    }

    /// Create run ended event.
    pub fn run_ended(tick: u64, distance: f32, score: u32) -> Self {
        Self::new(
            tick,
            GameEventData::RunEnded {
                distance,
                score,
                duration_ticks: tick,
            },
        )
    }
}
