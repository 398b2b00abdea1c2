//! Game Simulation
//!
//! Deterministic fixed-timestep runner core: player state machine,
//! platform stream, collision, difficulty, and the tick loop that binds
//! them.

pub mod collision;
pub mod difficulty;
pub mod events;
pub mod gen;
pub mod input;
pub mod platform;
pub mod player;
pub mod reach;
pub mod state;
pub mod tick;

use thiserror::Error;

/// Simulation failure modes.
///
/// These are programming or tuning errors, not gameplay outcomes; a
/// healthy run never produces one.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// The platform pool ran out of free slots.
    #[error("platform pool exhausted ({capacity} slots)")]
    PoolExhausted {
        /// Pool capacity at the time of exhaustion
        capacity: usize,
    },

    /// The reachability envelope degenerated (bad tuning or NaN speed).
    #[error("non-finite reachability envelope at speed {speed}")]
    NonFiniteReach {
        /// Run speed that produced the bad envelope
        speed: f32,
    },
}
