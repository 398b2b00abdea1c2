//! State Hashing for Verification
//!
//! Provides deterministic hashing of run state for:
//! - Replay validation (seed + input trace must reproduce the hash)
//! - Regression detection across simulation changes

use sha2::{Sha256, Digest};
use super::vec2::Vec2;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for run state.
///
/// Wraps SHA-256 with helpers for the simulation's value types.
/// Floats are hashed via their bit patterns so equal-by-bits states
/// produce equal hashes. Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for run state.
    pub fn for_run_state() -> Self {
        Self::new(b"TIDERUN_STATE_V1")
    }

    /// Create hasher for input traces.
    pub fn for_input_trace() -> Self {
        Self::new(b"TIDERUN_INPUTS_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an f32 value, bit-exact.
    #[inline]
    pub fn update_f32(&mut self, value: f32) {
        self.update_u32(value.to_bits());
    }

    /// Update with a Vec2.
    #[inline]
    pub fn update_vec2(&mut self, value: Vec2) {
        self.update_f32(value.x);
        self.update_f32(value.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for run verification.
///
/// This function is called by `RunState::compute_hash()`.
/// The parameter is a closure that adds state-specific data.
pub fn compute_state_hash<F>(tick: u64, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_run_state();

    // Always hash tick and seed first
    hasher.update_u64(tick);
    hasher.update_u64(rng_seed);

    // Add simulation-specific state
    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
