//! Deterministic Primitives
//!
//! Building blocks shared by the simulation: float vector/AABB types,
//! the seeded PRNG, and state hashing for replay verification.

pub mod vec2;
pub mod rng;
pub mod hash;
