//! Reachability Model
//!
//! Pure functions computing the player's maximum horizontal travel
//! distance for a given ability combination and horizontal speed. This is
//! the hard upper bound the platform generator must never exceed when
//! placing a gap, recomputed whenever the run speed changes (speed scales
//! linearly into every term).

use serde::{Serialize, Deserialize};

use crate::game::player::PlayerConfig;

/// Which traversal abilities are unlocked for the current run.
///
/// Fed in from the progression layer outside the core; the base kit
/// unlocks everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySet {
    /// Second jump available
    pub double_jump: bool,
    /// Glide available after the second jump
    pub glide: bool,
}

impl Default for AbilitySet {
    fn default() -> Self {
        Self {
            double_jump: true,
            glide: true,
        }
    }
}

/// Time for a jump arc to rise to apex and fall back to launch height.
///
/// Symmetric ballistic arc: `2 * |v| / g`.
#[inline]
pub fn jump_arc_time(jump_velocity: f32, gravity: f32) -> f32 {
    2.0 * jump_velocity.abs() / gravity
}

/// Peak height gained by a jump: `v^2 / (2g)`.
#[inline]
pub fn jump_peak_height(jump_velocity: f32, gravity: f32) -> f32 {
    (jump_velocity * jump_velocity) / (2.0 * gravity)
}

/// Maximum horizontal distance coverable with the full unlocked kit.
///
/// Sums the horizontal distance covered during the first jump arc, the
/// second jump arc (if double jump is unlocked), and the glide budget
/// (if glide is unlocked). The double-jump speed boost is deliberately
/// NOT counted: the bound must hold for a player who spends the boost
/// poorly.
pub fn max_horizontal_reach(speed: f32, abilities: AbilitySet, cfg: &PlayerConfig) -> f32 {
    let mut air_time = jump_arc_time(cfg.first_jump_velocity, cfg.gravity);

    if abilities.double_jump {
        air_time += jump_arc_time(cfg.second_jump_velocity, cfg.gravity);
    }

    let mut reach = speed * air_time;

    if abilities.double_jump && abilities.glide {
        reach += speed * cfg.glide_budget;
    }

    reach
}

/// Horizontal distance of a single first jump (no double jump, no glide).
///
/// The generator uses this to split gaps into "easy" (single jump) and
/// "hard" (needs the full kit) buckets.
pub fn single_jump_reach(speed: f32, cfg: &PlayerConfig) -> f32 {
    speed * jump_arc_time(cfg.first_jump_velocity, cfg.gravity)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_time() {
        // |v|=600, g=2000 -> 0.6s up-and-down
        assert!((jump_arc_time(-600.0, 2000.0) - 0.6).abs() < 1e-6);
        assert!((jump_arc_time(-550.0, 2000.0) - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_peak_height() {
        // v^2 / 2g = 360000 / 4000 = 90
        assert!((jump_peak_height(-600.0, 2000.0) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_reach_closed_form() {
        // speed=300, jumps -600/-550, g=2000, glide 1.5s:
        // 300 * (0.6 + 0.55) + 300 * 1.5 = 345 + 450 = 795
        let cfg = PlayerConfig::default();
        let reach = max_horizontal_reach(300.0, AbilitySet::default(), &cfg);
        assert!((reach - 795.0).abs() < 1e-3);
    }

    #[test]
    fn test_reach_scales_with_speed() {
        let cfg = PlayerConfig::default();
        let abilities = AbilitySet::default();

        let r300 = max_horizontal_reach(300.0, abilities, &cfg);
        let r600 = max_horizontal_reach(600.0, abilities, &cfg);
        assert!((r600 - 2.0 * r300).abs() < 1e-3);
    }

    #[test]
    fn test_reach_respects_ability_gates() {
        let cfg = PlayerConfig::default();

        let first_only = AbilitySet {
            double_jump: false,
            glide: false,
        };
        assert!((max_horizontal_reach(300.0, first_only, &cfg) - 180.0).abs() < 1e-3);

        // Glide requires the double jump; alone it adds nothing
        let glide_only = AbilitySet {
            double_jump: false,
            glide: true,
        };
        assert!(
            (max_horizontal_reach(300.0, glide_only, &cfg)
                - max_horizontal_reach(300.0, first_only, &cfg))
            .abs()
                < 1e-6
        );
    }

    #[test]
    fn test_single_jump_reach() {
        let cfg = PlayerConfig::default();
        assert!((single_jump_reach(300.0, &cfg) - 180.0).abs() < 1e-3);
    }
}
