//! Platform Data Model
//!
//! Pool-slot obstacles with kind-specific behavior. Platforms are owned
//! exclusively by the generator's pool; the collision resolver reads them
//! and only flags transient effects (a Crumbling landing), which the
//! generator applies on the next tick.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Aabb;
use crate::core::hash::StateHasher;
use crate::game::events::GameEvent;

/// Platform behavior kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlatformKind {
    /// Plain platform
    #[default]
    Static = 0,
    /// Oscillates horizontally around its spawn position
    Moving = 1,
    /// Fixed short width
    Small = 2,
    /// Collapses shortly after being landed on
    Crumbling = 3,
    /// Landing launches the player upward
    Bouncy = 4,
    /// Landing launches the player upward, harder
    Spring = 5,
    /// Pushes the player horizontally while stood on
    Conveyor = 6,
}

impl PlatformKind {
    /// Number of kinds (for weight tables).
    pub const COUNT: usize = 7;

    /// Get kind from a weight-table index.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PlatformKind::Static),
            1 => Some(PlatformKind::Moving),
            2 => Some(PlatformKind::Small),
            3 => Some(PlatformKind::Crumbling),
            4 => Some(PlatformKind::Bouncy),
            5 => Some(PlatformKind::Spring),
            6 => Some(PlatformKind::Conveyor),
            _ => None,
        }
    }
}

/// Lifecycle of a pool slot's platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Participating in collision and rendering
    #[default]
    Active,
    /// Retired this tick; the generator frees the slot on its next pass
    PendingRemoval,
}

/// Kind-specific runtime parameters and state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum KindState {
    /// No kind-specific state
    #[default]
    Plain,

    /// Horizontal sine oscillation around the spawn position
    Moving {
        /// Left edge at spawn (oscillation center)
        base_left: f32,
        /// Peak horizontal offset
        amplitude: f32,
        /// Oscillation angular frequency (rad/s)
        angular_freq: f32,
        /// Accumulated oscillation time
        elapsed: f32,
    },

    /// Collapses after its uses are spent
    Crumbling {
        /// Landings remaining before collapse is triggered
        uses_left: u8,
        /// Collapse countdown once consumed (< 0 means not started)
        collapse_timer: f32,
    },

    /// Launches with `first_jump_velocity * multiplier`
    Bouncy {
        /// Launch velocity multiplier
        multiplier: f32,
    },

    /// Launches with `first_jump_velocity * force`
    Spring {
        /// Launch velocity multiplier
        force: f32,
    },

    /// Pushes the standing player horizontally
    Conveyor {
        /// Signed push speed (world units/s)
        push: f32,
    },
}

/// A platform occupying a pool slot.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Platform {
    /// Pool slot id (stable while the slot is in use)
    pub slot: u32,

    /// Slot in use? Inactive slots are invisible to every system.
    pub active: bool,

    /// Lifecycle within the active stream
    pub lifecycle: Lifecycle,

    /// Current left edge
    pub left: f32,

    /// Top surface y
    pub top: f32,

    /// Width
    pub width: f32,

    /// Height
    pub height: f32,

    /// Behavior kind
    pub kind: PlatformKind,

    /// Kind-specific parameters/state
    pub kind_state: KindState,
}

impl Platform {
    /// Re-initialize a pooled slot for a fresh spawn.
    #[allow(clippy::too_many_arguments)]
    pub fn reset(
        &mut self,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        kind: PlatformKind,
        kind_state: KindState,
    ) {
        self.active = true;
        self.lifecycle = Lifecycle::Active;
        self.left = left;
        self.top = top;
        self.width = width;
        self.height = height;
        self.kind = kind;
        self.kind_state = kind_state;
    }

    /// Release the slot back to the pool.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.lifecycle = Lifecycle::Active;
        self.kind_state = KindState::Plain;
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Collision rectangle.
    #[inline]
    pub fn rect(&self) -> Aabb {
        Aabb::from_top_left(self.left, self.top, self.width, self.height)
    }

    /// Collidable this tick?
    #[inline]
    pub fn is_collidable(&self) -> bool {
        self.active && self.lifecycle == Lifecycle::Active
    }

    /// Oscillation amplitude (0 for non-moving kinds).
    ///
    /// The generator budgets this into gap sampling so reachability
    /// holds at worst-case oscillation phase.
    #[inline]
    pub fn oscillation_amplitude(&self) -> f32 {
        match self.kind_state {
            KindState::Moving { amplitude, .. } => amplitude,
            _ => 0.0,
        }
    }

    /// Launch velocity override on landing, if this kind has one.
    #[inline]
    pub fn launch_velocity(&self, first_jump_velocity: f32) -> Option<f32> {
        match self.kind_state {
            KindState::Bouncy { multiplier } => Some(first_jump_velocity * multiplier),
            KindState::Spring { force } => Some(first_jump_velocity * force),
            _ => None,
        }
    }

    /// Horizontal push applied to a standing player (0 for most kinds).
    #[inline]
    pub fn conveyor_push(&self) -> f32 {
        match self.kind_state {
            KindState::Conveyor { push } => push,
            _ => 0.0,
        }
    }

    /// Record a landing on a Crumbling platform.
    ///
    /// Decrements the use count and starts the collapse countdown when
    /// spent. Called by the collision resolver; the actual retirement
    /// happens in `update` on a later tick.
    pub fn mark_consumed(&mut self, collapse_delay: f32) {
        if let KindState::Crumbling {
            uses_left,
            collapse_timer,
        } = &mut self.kind_state
        {
            if *uses_left > 0 {
                *uses_left -= 1;
                if *uses_left == 0 {
                    *collapse_timer = collapse_delay;
                }
            }
        }
    }

    /// Advance kind-specific behavior by one tick.
    pub fn update(&mut self, dt: f32, tick: u64, events: &mut Vec<GameEvent>) {
        if !self.active {
            return;
        }

        match &mut self.kind_state {
            KindState::Moving {
                base_left,
                amplitude,
                angular_freq,
                elapsed,
            } => {
                *elapsed += dt;
                self.left = *base_left + (*elapsed * *angular_freq).sin() * *amplitude;
            }
            KindState::Crumbling {
                uses_left,
                collapse_timer,
            } => {
                if *uses_left == 0 && self.lifecycle == Lifecycle::Active {
                    *collapse_timer -= dt;
                    if *collapse_timer <= 0.0 {
                        self.lifecycle = Lifecycle::PendingRemoval;
                        events.push(GameEvent::platform_crumbled(tick, self.slot));
                    }
                }
            }
            _ => {}
        }
    }

    /// Hash this platform's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.slot);
        hasher.update_f32(self.left);
        hasher.update_f32(self.top);
        hasher.update_f32(self.width);
        hasher.update_u8(self.kind as u8);
        hasher.update_u8(matches!(self.lifecycle, Lifecycle::PendingRemoval) as u8);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn fresh(kind: PlatformKind, kind_state: KindState) -> Platform {
        let mut p = Platform {
            slot: 7,
            ..Platform::default()
        };
        p.reset(1000.0, 400.0, 200.0, 32.0, kind, kind_state);
        p
    }

    #[test]
    fn test_moving_oscillation() {
        let mut p = fresh(
            PlatformKind::Moving,
            KindState::Moving {
                base_left: 1000.0,
                amplitude: 60.0,
                angular_freq: 2.0,
                elapsed: 0.0,
            },
        );
        let mut events = Vec::new();

        let mut min_left = f32::MAX;
        let mut max_left = f32::MIN;
        for _ in 0..(60 * 10) {
            p.update(DT, 0, &mut events);
            min_left = min_left.min(p.left);
            max_left = max_left.max(p.left);
        }

        // Stays within the amplitude band and actually moves
        assert!(min_left >= 1000.0 - 60.0 - 1e-3);
        assert!(max_left <= 1000.0 + 60.0 + 1e-3);
        assert!(max_left - min_left > 60.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_crumbling_collapse_after_delay() {
        let mut p = fresh(
            PlatformKind::Crumbling,
            KindState::Crumbling {
                uses_left: 1,
                collapse_timer: -1.0,
            },
        );
        let mut events = Vec::new();

        // Untouched: never collapses
        for _ in 0..120 {
            p.update(DT, 0, &mut events);
        }
        assert_eq!(p.lifecycle, Lifecycle::Active);

        // Landing consumes the single use, collapse 0.5s later
        p.mark_consumed(0.5);
        for tick in 0..29 {
            p.update(DT, tick, &mut events);
        }
        assert_eq!(p.lifecycle, Lifecycle::Active);

        for tick in 29..32 {
            p.update(DT, tick, &mut events);
        }
        assert_eq!(p.lifecycle, Lifecycle::PendingRemoval);
        assert_eq!(events.len(), 1);

        // No duplicate crumble event
        p.update(DT, 33, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_launch_velocities() {
        let bouncy = fresh(PlatformKind::Bouncy, KindState::Bouncy { multiplier: 1.2 });
        assert_eq!(bouncy.launch_velocity(-600.0), Some(-720.0));

        let spring = fresh(PlatformKind::Spring, KindState::Spring { force: 1.5 });
        assert_eq!(spring.launch_velocity(-600.0), Some(-900.0));

        let plain = fresh(PlatformKind::Static, KindState::Plain);
        assert_eq!(plain.launch_velocity(-600.0), None);
    }

    #[test]
    fn test_conveyor_push() {
        let conveyor = fresh(PlatformKind::Conveyor, KindState::Conveyor { push: -80.0 });
        assert_eq!(conveyor.conveyor_push(), -80.0);
        assert_eq!(fresh(PlatformKind::Static, KindState::Plain).conveyor_push(), 0.0);
    }

    #[test]
    fn test_slot_reuse() {
        let mut p = fresh(PlatformKind::Crumbling, KindState::Crumbling {
            uses_left: 1,
            collapse_timer: -1.0,
        });
        p.mark_consumed(0.0);
        let mut events = Vec::new();
        p.update(DT, 0, &mut events);
        assert_eq!(p.lifecycle, Lifecycle::PendingRemoval);

        p.deactivate();
        assert!(!p.active);

        // Reset clears lifecycle and kind state
        p.reset(2000.0, 300.0, 150.0, 32.0, PlatformKind::Static, KindState::Plain);
        assert!(p.is_collidable());
        assert_eq!(p.kind_state, KindState::Plain);
    }
}
