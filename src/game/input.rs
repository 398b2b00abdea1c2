//! Input Capture and Recording
//!
//! The only input the core consumes is jump intent, sampled once per tick
//! as an edge/level snapshot: pressed (up-to-down edge), held (level), and
//! released (down-to-up edge). Traces are delta-compressed for replay.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Raw input state for a single tick.
///
/// This is the minimal input that affects simulation state.
/// NO tick field - tick is stored separately for compression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct InputFrame {
    /// Action flags (packed bits):
    /// - Bit 0: Jump pressed this tick (edge)
    /// - Bit 1: Jump held (level)
    /// - Bit 2: Jump released this tick (edge)
    /// - Bit 3-7: Reserved
    pub flags: u8,
}

impl InputFrame {
    /// Size in bytes
    pub const SIZE: usize = 1;

    /// Jump pressed-edge flag bit
    pub const FLAG_JUMP_PRESSED: u8 = 0x01;

    /// Jump held flag bit
    pub const FLAG_JUMP_HELD: u8 = 0x02;

    /// Jump released-edge flag bit
    pub const FLAG_JUMP_RELEASED: u8 = 0x04;

    /// Create a new empty (idle) input frame.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Create the frame for the tick the jump button goes down.
    pub const fn pressed() -> Self {
        Self {
            flags: Self::FLAG_JUMP_PRESSED | Self::FLAG_JUMP_HELD,
        }
    }

    /// Create the frame for a tick where the button is simply held.
    pub const fn held() -> Self {
        Self {
            flags: Self::FLAG_JUMP_HELD,
        }
    }

    /// Create the frame for the tick the jump button goes up.
    pub const fn released() -> Self {
        Self {
            flags: Self::FLAG_JUMP_RELEASED,
        }
    }

    /// Check if jump was pressed this tick (edge).
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.flags & Self::FLAG_JUMP_PRESSED != 0
    }

    /// Check if jump is held (level).
    #[inline]
    pub fn jump_held(&self) -> bool {
        self.flags & Self::FLAG_JUMP_HELD != 0
    }

    /// Check if jump was released this tick (edge).
    #[inline]
    pub fn jump_released(&self) -> bool {
        self.flags & Self::FLAG_JUMP_RELEASED != 0
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }

    /// Derive this tick's frame from raw button level and the previous level.
    ///
    /// Computes the pressed/released edges the way an input collaborator
    /// samples a physical button: edges fire on the tick the level changes.
    pub fn from_levels(down: bool, was_down: bool) -> Self {
        let mut flags = 0;
        if down && !was_down {
            flags |= Self::FLAG_JUMP_PRESSED;
        }
        if down {
            flags |= Self::FLAG_JUMP_HELD;
        }
        if !down && was_down {
            flags |= Self::FLAG_JUMP_RELEASED;
        }
        Self { flags }
    }
}

/// Delta-compressed input entry.
///
/// Only stored when input CHANGES (not every tick).
/// This keeps replay artifacts small.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u64,
    /// The new input state
    pub frame: InputFrame,
}

impl InputDelta {
    /// Create new delta entry.
    pub fn new(tick: u64, frame: InputFrame) -> Self {
        Self { tick, frame }
    }
}

// =============================================================================
// INPUT TRACE
// =============================================================================

/// Complete input recording for one run.
///
/// Used for:
/// - Replay playback
/// - Determinism verification (seed + trace reproduces the state hash)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputTrace {
    /// RNG seed used for this run
    pub rng_seed: u64,

    /// Starting tick (usually 0)
    pub start_tick: u64,

    /// Ending tick
    pub end_tick: u64,

    /// Delta-compressed input data.
    /// Only stores ticks where input CHANGED.
    deltas: Vec<InputDelta>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputTrace {
    /// Create a new input trace for a run.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(512),
            last_frame: InputFrame::new(),
        }
    }

    /// Record input for a tick.
    ///
    /// Only stores if input changed from the previous frame.
    pub fn record(&mut self, tick: u64, frame: InputFrame) {
        self.end_tick = tick;

        if frame != self.last_frame {
            self.deltas.push(InputDelta::new(tick, frame));
            self.last_frame = frame;
        }
    }

    /// Hash the trace for replay artifact integrity.
    ///
    /// Domain-separated from the run-state hash; two traces hash equal
    /// exactly when they replay the same run from the same seed.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_input_trace();
        hasher.update_u64(self.rng_seed);
        hasher.update_u64(self.start_tick);
        hasher.update_u64(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u64(delta.tick);
            hasher.update_u8(delta.frame.flags);
        }
        hasher.finalize()
    }

    /// Get all deltas (for serialization).
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Finalize the trace (call at run end).
    pub fn finalize(&mut self, end_tick: u64) {
        self.end_tick = end_tick;
    }

    /// Create iterator over all inputs for replay.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            trace: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    trace: &'a InputTrace,
    current_tick: u64,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u64, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.trace.end_tick {
            return None;
        }

        // Advance to the delta in effect at this tick
        while self.delta_idx < self.trace.deltas.len() {
            let delta = &self.trace.deltas[self.delta_idx];
            if delta.tick <= self.current_tick {
                self.current_frame = delta.frame;
                self.delta_idx += 1;
            } else {
                break;
            }
        }

        let result = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_frame_flags() {
        let frame = InputFrame::pressed();
        assert!(frame.jump_pressed());
        assert!(frame.jump_held());
        assert!(!frame.jump_released());

        let frame = InputFrame::held();
        assert!(!frame.jump_pressed());
        assert!(frame.jump_held());

        let frame = InputFrame::released();
        assert!(frame.jump_released());
        assert!(!frame.jump_held());

        assert!(InputFrame::new().is_idle());
    }

    #[test]
    fn test_from_levels_edges() {
        // Button goes down: pressed + held
        let frame = InputFrame::from_levels(true, false);
        assert!(frame.jump_pressed());
        assert!(frame.jump_held());
        assert!(!frame.jump_released());

        // Still down: held only
        let frame = InputFrame::from_levels(true, true);
        assert!(!frame.jump_pressed());
        assert!(frame.jump_held());

        // Button goes up: released only
        let frame = InputFrame::from_levels(false, true);
        assert!(frame.jump_released());
        assert!(!frame.jump_held());

        // Idle
        assert!(InputFrame::from_levels(false, false).is_idle());
    }

    #[test]
    fn test_trace_delta_compression() {
        let mut trace = InputTrace::new(12345);

        // Record same input multiple times
        let frame = InputFrame::held();
        trace.record(0, frame);
        trace.record(1, frame);
        trace.record(2, frame);
        trace.record(3, frame);

        // Should only have 1 delta (input didn't change)
        assert_eq!(trace.delta_count(), 1);

        // Change input
        trace.record(4, InputFrame::released());

        // Now should have 2 deltas
        assert_eq!(trace.delta_count(), 2);
    }

    #[test]
    fn test_trace_hash() {
        let record_run = |seed: u64, press_at: u64| {
            let mut trace = InputTrace::new(seed);
            trace.record(0, InputFrame::new());
            trace.record(press_at, InputFrame::pressed());
            trace.record(press_at + 1, InputFrame::released());
            trace.finalize(100);
            trace
        };

        // Same seed and inputs: same hash
        assert_eq!(
            record_run(42, 10).compute_hash(),
            record_run(42, 10).compute_hash()
        );

        // Different seed or different input timing: different hash
        assert_ne!(
            record_run(42, 10).compute_hash(),
            record_run(43, 10).compute_hash()
        );
        assert_ne!(
            record_run(42, 10).compute_hash(),
            record_run(42, 11).compute_hash()
        );
    }

    #[test]
    fn test_replay_iterator() {
        let mut trace = InputTrace::new(12345);

        trace.record(0, InputFrame::pressed());
        trace.record(3, InputFrame::held());
        trace.finalize(5);

        let frames: Vec<_> = trace.replay_iter().collect();

        assert_eq!(frames.len(), 6); // Ticks 0-5
        assert!(frames[0].1.jump_pressed());
        assert!(frames[1].1.jump_pressed()); // Delta persists until next change
        assert!(frames[2].1.jump_pressed());
        assert!(!frames[3].1.jump_pressed());
        assert!(frames[3].1.jump_held());
        assert!(frames[5].1.jump_held());
    }
}
