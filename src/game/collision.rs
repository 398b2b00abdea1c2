//! Collision Resolution
//!
//! One-way platform landings, ground support while standing, and the
//! water-line death check. Runs after player integration each tick.
//!
//! Platforms are one-way: an ascending player passes through freely, and
//! a landing is only recognized when the collision-box bottom crossed the
//! platform top during this tick's motion. When the swept segment crosses
//! several tops at once, the highest surface wins.

use serde::{Serialize, Deserialize};

use crate::game::events::GameEvent;
use crate::game::platform::{Platform, PlatformKind};
use crate::game::player::{PlayerConfig, PlayerState};

/// What the resolver did this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Landing that stuck (slot, kind)
    pub landed: Option<(u32, PlatformKind)>,

    /// Launch surface that fired instead of a landing (slot, applied vy)
    pub launched: Option<(u32, f32)>,

    /// Player crossed the water line
    pub died: bool,
}

/// Resolve player/platform contact for one tick.
///
/// `crumbling_delay` is the collapse countdown armed when a landing spends
/// a Crumbling platform's last use. Death is checked after landings, so a
/// landing and a water crossing on the same tick resolve as a landing.
#[allow(clippy::too_many_arguments)]
pub fn resolve(
    player: &mut PlayerState,
    platforms: &mut [Platform],
    dt: f32,
    cfg: &PlayerConfig,
    water_line: f32,
    crumbling_delay: f32,
    tick: u64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    let mut resolution = Resolution::default();

    if player.is_dead() {
        return resolution;
    }

    if player.grounded {
        check_support(player, platforms, dt, cfg);
    } else if player.velocity.y > 0.0 {
        resolve_landing(player, platforms, dt, cfg, crumbling_delay, tick, events, &mut resolution);
    }

    // Water: the run ends when the TOP of the collision box goes under.
    if !player.grounded && player.top(cfg) >= water_line {
        player.die(tick, events);
        resolution.died = true;
    }

    resolution
}

/// Keep a grounded player attached to (or detached from) its platform.
fn check_support(player: &mut PlayerState, platforms: &mut [Platform], dt: f32, cfg: &PlayerConfig) {
    let support = player
        .platform_slot
        .and_then(|slot| platforms.iter().find(|p| p.active && p.slot == slot));

    let Some(platform) = support else {
        // Supporting platform crumbled away or was never there
        player.leave_ground();
        return;
    };

    if !platform.is_collidable() || !player.aabb(cfg).overlaps_x(&platform.rect()) {
        // Walked (or was oscillated) off the edge: coyote window starts
        player.leave_ground();
        return;
    }

    // Ride the surface: moving platforms change top only through their
    // oscillation being horizontal, but snapping keeps contact exact.
    let top = platform.top;
    let push = platform.conveyor_push();
    player.snap_bottom_to(top, cfg);
    player.velocity.y = 0.0;
    if push != 0.0 {
        player.position.x += push * dt;
    }
}

/// Swept one-way landing test against every collidable platform.
#[allow(clippy::too_many_arguments)]
fn resolve_landing(
    player: &mut PlayerState,
    platforms: &mut [Platform],
    dt: f32,
    cfg: &PlayerConfig,
    crumbling_delay: f32,
    tick: u64,
    events: &mut Vec<GameEvent>,
    resolution: &mut Resolution,
) {
    let aabb = player.aabb(cfg);
    let bottom = player.bottom(cfg);
    let prev_bottom = bottom - player.velocity.y * dt;
    let tolerance = if player.is_gliding() {
        cfg.glide_landing_tolerance
    } else {
        0.0
    };

    let mut best: Option<usize> = None;
    for (i, platform) in platforms.iter().enumerate() {
        if !platform.is_collidable() {
            continue;
        }
        let rect = platform.rect();
        let overlaps_x =
            aabb.right > rect.left - tolerance && aabb.left < rect.right + tolerance;
        let crossed_top = prev_bottom <= rect.top && bottom >= rect.top;
        if !(overlaps_x && crossed_top) {
            continue;
        }
        match best {
            Some(j) if platforms[j].top <= rect.top => {}
            _ => best = Some(i),
        }
    }

    let Some(i) = best else {
        return;
    };
    let (slot, kind, top) = (platforms[i].slot, platforms[i].kind, platforms[i].top);

    if let Some(vy) = platforms[i].launch_velocity(cfg.first_jump_velocity) {
        player.snap_bottom_to(top, cfg);
        player.launch(vy);
        events.push(GameEvent::launched(tick, slot, vy));
        resolution.launched = Some((slot, vy));
    } else {
        events.push(GameEvent::landed(tick, slot, kind));
        player.land(slot, top, cfg, tick, events);
        if kind == PlatformKind::Crumbling {
            platforms[i].mark_consumed(crumbling_delay);
        }
        resolution.landed = Some((slot, kind));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::platform::KindState;
    use crate::game::player::AirPhase;

    const DT: f32 = 1.0 / 60.0;
    const WATER: f32 = 620.0;
    const CRUMBLE: f32 = 0.5;

    fn platform(slot: u32, left: f32, top: f32, width: f32) -> Platform {
        let mut p = Platform {
            slot,
            ..Platform::default()
        };
        p.reset(left, top, width, 32.0, PlatformKind::Static, KindState::Plain);
        p
    }

    fn falling_player(x: f32, bottom: f32, vy: f32, cfg: &PlayerConfig) -> PlayerState {
        let mut p = PlayerState::new(Vec2::new(x, 0.0));
        p.snap_bottom_to(bottom, cfg);
        p.grounded = false;
        p.platform_slot = None;
        p.phase = AirPhase::Falling;
        p.velocity = Vec2::new(300.0, vy);
        p
    }

    fn run(
        player: &mut PlayerState,
        platforms: &mut [Platform],
        cfg: &PlayerConfig,
    ) -> (Resolution, Vec<GameEvent>) {
        let mut events = Vec::new();
        let r = resolve(player, platforms, DT, cfg, WATER, CRUMBLE, 0, &mut events);
        (r, events)
    }

    #[test]
    fn test_landing_on_crossed_top() {
        let cfg = PlayerConfig::default();
        // Moved from above 400 to below it this tick (vy=600 -> 10/tick)
        let mut player = falling_player(100.0, 405.0, 600.0, &cfg);
        let mut platforms = [platform(1, 50.0, 400.0, 200.0)];

        let (r, events) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, Some((1, PlatformKind::Static)));
        assert!(player.grounded);
        assert_eq!(player.platform_slot, Some(1));
        assert!((player.bottom(&cfg) - 400.0).abs() < 1e-4);
        assert!(!events.is_empty());
    }

    #[test]
    fn test_no_catch_from_below_or_while_ascending() {
        let cfg = PlayerConfig::default();

        // Ascending through the platform: pass-through
        let mut player = falling_player(100.0, 405.0, -300.0, &cfg);
        let mut platforms = [platform(1, 50.0, 400.0, 200.0)];
        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, None);
        assert!(!player.grounded);

        // Falling but already fully below the top: no landing
        let mut player = falling_player(100.0, 450.0, 600.0, &cfg);
        let mut platforms = [platform(1, 50.0, 400.0, 200.0)];
        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, None);
    }

    #[test]
    fn test_tie_break_highest_surface() {
        let cfg = PlayerConfig::default();
        // A fast fall crossing two overlapping tops in one tick
        let mut player = falling_player(100.0, 430.0, 2000.0, &cfg);
        let mut platforms = [
            platform(1, 50.0, 420.0, 200.0),
            platform(2, 50.0, 400.0, 200.0),
        ];

        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, Some((2, PlatformKind::Static)));
        assert!((player.bottom(&cfg) - 400.0).abs() < 1e-4);
    }

    #[test]
    fn test_glide_tolerance_widens_edge() {
        let cfg = PlayerConfig::default();
        let mut platforms = [platform(1, 200.0, 400.0, 100.0)];

        // Collision box just misses the left edge by a few pixels
        let mut player = falling_player(200.0 - cfg.width + 2.0, 401.0, 100.0, &cfg);
        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, None);

        // Same geometry while gliding: tolerance catches it
        let mut player = falling_player(200.0 - cfg.width + 2.0, 401.0, 100.0, &cfg);
        player.phase = AirPhase::Glide;
        player.jump_count = cfg.max_jumps;
        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, Some((1, PlatformKind::Static)));
    }

    #[test]
    fn test_glide_tolerance_comes_from_config() {
        let cfg = PlayerConfig {
            glide_landing_tolerance: 0.0,
            ..PlayerConfig::default()
        };
        let mut platforms = [platform(1, 200.0, 400.0, 100.0)];

        // The geometry the default tolerance catches misses at zero
        let mut player = falling_player(200.0 - cfg.width + 2.0, 401.0, 100.0, &cfg);
        player.phase = AirPhase::Glide;
        player.jump_count = cfg.max_jumps;
        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, None);
    }

    #[test]
    fn test_launch_surfaces_override_landing() {
        let cfg = PlayerConfig::default();
        let mut player = falling_player(100.0, 405.0, 600.0, &cfg);
        let mut platforms = [platform(1, 50.0, 400.0, 200.0)];
        platforms[0].kind = PlatformKind::Bouncy;
        platforms[0].kind_state = KindState::Bouncy { multiplier: 1.2 };

        let (r, events) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, None);
        assert_eq!(r.launched, Some((1, -720.0)));
        assert!(!player.grounded);
        assert_eq!(player.velocity.y, -720.0);
        assert_eq!(player.jump_count, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e.data, crate::game::events::GameEventData::Launched { .. })));
    }

    #[test]
    fn test_crumbling_consumed_on_landing() {
        let cfg = PlayerConfig::default();
        let mut player = falling_player(100.0, 405.0, 600.0, &cfg);
        let mut platforms = [platform(1, 50.0, 400.0, 200.0)];
        platforms[0].kind = PlatformKind::Crumbling;
        platforms[0].kind_state = KindState::Crumbling {
            uses_left: 1,
            collapse_timer: -1.0,
        };

        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert_eq!(r.landed, Some((1, PlatformKind::Crumbling)));
        match platforms[0].kind_state {
            KindState::Crumbling {
                uses_left,
                collapse_timer,
            } => {
                assert_eq!(uses_left, 0);
                assert!((collapse_timer - CRUMBLE).abs() < 1e-6);
            }
            _ => panic!("kind state changed"),
        }
    }

    #[test]
    fn test_support_walk_off_starts_coyote() {
        let cfg = PlayerConfig::default();
        let mut platforms = [platform(1, 50.0, 400.0, 100.0)];

        let mut player = PlayerState::new(Vec2::new(60.0, 0.0));
        player.snap_bottom_to(400.0, &cfg);
        player.platform_slot = Some(1);

        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert!(player.grounded, "still overlapping: stays grounded");
        assert!(!r.died);

        // Past the right edge: support lost
        player.position.x = 200.0;
        let (_, _) = run(&mut player, &mut platforms, &cfg);
        assert!(!player.grounded);
        assert_eq!(player.phase, AirPhase::Falling);
    }

    #[test]
    fn test_support_lost_when_platform_crumbles() {
        let cfg = PlayerConfig::default();
        let mut platforms = [platform(1, 50.0, 400.0, 200.0)];

        let mut player = PlayerState::new(Vec2::new(100.0, 0.0));
        player.snap_bottom_to(400.0, &cfg);
        player.platform_slot = Some(1);

        platforms[0].deactivate();
        let (_, _) = run(&mut player, &mut platforms, &cfg);
        assert!(!player.grounded);
    }

    #[test]
    fn test_conveyor_pushes_standing_player() {
        let cfg = PlayerConfig::default();
        let mut platforms = [platform(1, 50.0, 400.0, 200.0)];
        platforms[0].kind = PlatformKind::Conveyor;
        platforms[0].kind_state = KindState::Conveyor { push: -80.0 };

        let mut player = PlayerState::new(Vec2::new(100.0, 0.0));
        player.snap_bottom_to(400.0, &cfg);
        player.platform_slot = Some(1);

        let x0 = player.position.x;
        let (_, _) = run(&mut player, &mut platforms, &cfg);
        assert!((player.position.x - (x0 - 80.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_water_death_uses_top_edge() {
        let cfg = PlayerConfig::default();

        // Bottom under water but top still above: alive
        let mut player = falling_player(100.0, WATER + 30.0, 600.0, &cfg);
        let mut platforms: [Platform; 0] = [];
        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert!(!r.died);
        assert!(!player.is_dead());

        // Top at the line: dead
        let mut player = falling_player(100.0, WATER + cfg.collision_height, 600.0, &cfg);
        let (r, events) = run(&mut player, &mut platforms, &cfg);
        assert!(r.died);
        assert!(player.is_dead());
        assert!(events
            .iter()
            .any(|e| matches!(e.data, crate::game::events::GameEventData::Died { .. })));
    }

    #[test]
    fn test_landing_beats_water_same_tick() {
        let cfg = PlayerConfig::default();
        // A platform top right at the water line: crossing both the top
        // and the line on the same tick resolves as a landing.
        let mut player = falling_player(100.0, WATER + cfg.collision_height, 2000.0, &cfg);
        let mut platforms = [platform(1, 50.0, WATER + cfg.collision_height - 1.0, 200.0)];

        let (r, _) = run(&mut player, &mut platforms, &cfg);
        assert!(r.landed.is_some());
        assert!(!r.died);
        assert!(!player.is_dead());
    }
}
