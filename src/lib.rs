//! # Tiderun Simulation Core
//!
//! Deterministic simulation core for Tiderun, a side-scrolling endless
//! runner over rising water.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TIDERUN CORE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── vec2.rs      - 2D vectors and AABBs (y-down)            │
//! │  ├── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs      - State hashing for verification           │
//! │                                                              │
//! │  game/            - Run simulation (deterministic)           │
//! │  ├── input.rs     - Jump input capture and trace recording   │
//! │  ├── player.rs    - Player motion state machine              │
//! │  ├── reach.rs     - Reachability envelope                    │
//! │  ├── difficulty.rs- Difficulty curve                         │
//! │  ├── platform.rs  - Platform kinds and behaviors             │
//! │  ├── gen.rs       - Provably-traversable platform stream     │
//! │  ├── collision.rs - One-way landings and water death         │
//! │  ├── state.rs     - Run state, scoring, state hash           │
//! │  └── tick.rs      - Fixed-timestep loop and replay           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The simulation is deterministic for a given seed and input trace:
//! - All randomness comes from one seeded Xorshift128+ stream
//! - Tick phase order is fixed
//! - No system time or platform dependencies in `core/` or `game/`
//! - Floats are used, but only in straight-line arithmetic; state
//!   hashes compare bit patterns, and replays reproduce them exactly
//!   on the same target
//!
//! ## Traversability Guarantee
//!
//! The platform generator caps every gap below the current reachability
//! envelope (jump arcs plus glide budget at the current run speed) times
//! a safety factor, charging moving platforms' worst-case oscillation
//! against the same budget. A run is never lost to an impossible gap.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use self::core::rng::DeterministicRng;
pub use self::core::vec2::{Aabb, Vec2};
pub use game::SimError;
pub use game::input::{InputDelta, InputFrame, InputTrace};
pub use game::player::{AirPhase, PlayerConfig, PlayerState};
pub use game::state::{RunPhase, RunState, RunSummary};
pub use game::tick::{replay_run, tick, FixedStep, RunConfig, TickResult};
pub use game::tick::{FIXED_DT, TICK_RATE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
