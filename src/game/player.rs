//! Player Motion State
//!
//! The player's physics and ability state machine: gravity integration,
//! single/double jump, glide with a duration budget, coyote time, jump
//! buffering, and variable jump height. The state machine is a small
//! closed set of mutually exclusive phases with guarded transitions.
//!
//! Grounding transitions (landing, death) are driven by the collision
//! resolver; everything else happens in `update`.

use serde::{Serialize, Deserialize};

use crate::core::vec2::{Vec2, Aabb};
use crate::core::hash::StateHasher;
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::reach::AbilitySet;

// =============================================================================
// CONFIG
// =============================================================================

/// Tuning constants for the player motion state machine.
///
/// Threaded through explicitly rather than read from globals so difficulty
/// modes can vary them per run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Downward acceleration (world units/s^2, y-down)
    pub gravity: f32,
    /// Terminal fall speed
    pub max_fall_speed: f32,
    /// Initial vy of the first jump (negative = up)
    pub first_jump_velocity: f32,
    /// Initial vy of the second jump (negative = up)
    pub second_jump_velocity: f32,
    /// Maximum number of jumps per airborne segment
    pub max_jumps: u8,
    /// Horizontal speed multiplier while the double-jump boost is active
    pub boost_multiplier: f32,
    /// Duration of the double-jump speed boost (seconds)
    pub boost_duration: f32,
    /// Pinned fall speed while gliding
    pub glide_fall_speed: f32,
    /// Total glide time per airborne segment (seconds)
    pub glide_budget: f32,
    /// Grace window after walking off an edge (seconds)
    pub coyote_window: f32,
    /// Grace window for an early jump press before landing (seconds)
    pub buffer_window: f32,
    /// vy multiplier applied once on jump release while ascending
    pub release_damping: f32,
    /// Extra horizontal landing overlap granted while gliding. The slow
    /// glide descent makes edge landings feel unfair at exact overlap.
    pub glide_landing_tolerance: f32,
    /// Sprite box width
    pub width: f32,
    /// Sprite box height
    pub height: f32,
    /// Collision box width (centered in the sprite box)
    pub collision_width: f32,
    /// Collision box height (centered in the sprite box)
    pub collision_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            gravity: 2000.0,
            max_fall_speed: 1000.0,
            first_jump_velocity: -600.0,
            second_jump_velocity: -550.0,
            max_jumps: 2,
            boost_multiplier: 1.5,
            boost_duration: 0.5,
            glide_fall_speed: 100.0,
            glide_budget: 1.5,
            coyote_window: 0.1,
            buffer_window: 0.15,
            release_damping: 0.5,
            glide_landing_tolerance: 12.0,
            width: 64.0,
            height: 64.0,
            collision_width: 56.0,
            collision_height: 60.0,
        }
    }
}

// =============================================================================
// ABILITY PHASE
// =============================================================================

/// Ability state machine phase.
///
/// Mutually exclusive; drives which inputs are legal. `Dead` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AirPhase {
    /// Standing on a platform
    #[default]
    Grounded = 0,
    /// Ascending or descending after the first jump
    FirstJump = 1,
    /// Ascending or descending after the second jump
    SecondJump = 2,
    /// Gliding (vy pinned to slow fall)
    Glide = 3,
    /// Past apex with no jump in flight (cosmetic; input legality is
    /// governed by jump_count)
    Falling = 4,
    /// Dead. No further transitions or motion.
    Dead = 5,
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// The player's full motion state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left of the sprite box in world space
    pub position: Vec2,

    /// Current velocity
    pub velocity: Vec2,

    /// Current state machine phase
    pub phase: AirPhase,

    /// Jumps used this airborne segment, in [0, max_jumps]
    pub jump_count: u8,

    /// Standing on a platform?
    pub grounded: bool,

    /// Pool slot of the supporting platform while grounded
    pub platform_slot: Option<u32>,

    /// Unlocked abilities (consulted for double jump and glide)
    pub abilities: AbilitySet,

    /// Glide time used this airborne segment
    pub glide_elapsed: f32,

    /// Glide armed by a double jump and not yet used this segment
    pub glide_armed: bool,

    /// Remaining coyote grace (counts down while airborne)
    pub coyote_timer: f32,

    /// Remaining buffered-jump grace (counts down after an illegal press)
    pub buffer_timer: f32,

    /// Remaining double-jump speed boost
    pub boost_timer: f32,

    /// Variable-jump damping already applied this ascent
    pub ascent_clipped: bool,
}

impl PlayerState {
    /// Create a player standing at the given sprite-box position.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            phase: AirPhase::Grounded,
            jump_count: 0,
            grounded: true,
            platform_slot: Some(0),
            abilities: AbilitySet::default(),
            glide_elapsed: 0.0,
            glide_armed: false,
            coyote_timer: 0.0,
            buffer_timer: 0.0,
            boost_timer: 0.0,
            ascent_clipped: false,
        }
    }

    /// Collision box, centered inside the sprite box.
    pub fn aabb(&self, cfg: &PlayerConfig) -> Aabb {
        let (ox, oy) = collision_offsets(cfg);
        Aabb::from_top_left(
            self.position.x + ox,
            self.position.y + oy,
            cfg.collision_width,
            cfg.collision_height,
        )
    }

    /// Bottom edge of the collision box.
    #[inline]
    pub fn bottom(&self, cfg: &PlayerConfig) -> f32 {
        let (_, oy) = collision_offsets(cfg);
        self.position.y + oy + cfg.collision_height
    }

    /// Top edge of the collision box.
    #[inline]
    pub fn top(&self, cfg: &PlayerConfig) -> f32 {
        let (_, oy) = collision_offsets(cfg);
        self.position.y + oy
    }

    /// Move so the collision-box bottom sits exactly on `top_y`.
    pub fn snap_bottom_to(&mut self, top_y: f32, cfg: &PlayerConfig) {
        let (_, oy) = collision_offsets(cfg);
        self.position.y = top_y - oy - cfg.collision_height;
    }

    /// Is the run over for this player?
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.phase == AirPhase::Dead
    }

    /// Currently gliding?
    #[inline]
    pub fn is_gliding(&self) -> bool {
        self.phase == AirPhase::Glide
    }

    /// Check if a jump press is legal right now.
    ///
    /// First jump requires ground contact or coyote grace; further jumps
    /// only require remaining jump budget (and the double-jump ability).
    pub fn can_jump(&self, cfg: &PlayerConfig) -> bool {
        if self.jump_count == 0 {
            self.grounded || self.coyote_timer > 0.0
        } else {
            self.jump_count < cfg.max_jumps && self.abilities.double_jump
        }
    }

    /// Advance the state machine by one tick.
    ///
    /// `run_speed` is the current horizontal speed from the difficulty
    /// curve. Landing and death are NOT detected here; the collision
    /// resolver calls `land`/`launch`/`die` after integration.
    pub fn update(
        &mut self,
        dt: f32,
        input: InputFrame,
        run_speed: f32,
        cfg: &PlayerConfig,
        tick: u64,
        events: &mut Vec<GameEvent>,
    ) {
        if self.is_dead() {
            return;
        }

        // Timers
        if self.grounded {
            self.coyote_timer = cfg.coyote_window;
        } else {
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        }
        self.buffer_timer = (self.buffer_timer - dt).max(0.0);
        self.boost_timer = (self.boost_timer - dt).max(0.0);

        // Glide entry: level-triggered on held, but never on the same tick
        // as the press that performed the second jump.
        if input.jump_held()
            && !input.jump_pressed()
            && !self.grounded
            && self.jump_count == cfg.max_jumps
            && self.glide_armed
            && self.phase != AirPhase::Glide
        {
            self.start_glide(tick, events);
        }

        // Jump press: execute if legal, otherwise arm the buffer.
        if input.jump_pressed() {
            if self.can_jump(cfg) {
                self.jump(cfg, tick, events);
            } else {
                self.buffer_timer = cfg.buffer_window;
            }
        }

        // Variable jump height: one clip per ascent.
        if input.jump_released()
            && self.velocity.y < 0.0
            && self.phase != AirPhase::Glide
            && !self.ascent_clipped
        {
            self.velocity.y *= cfg.release_damping;
            self.ascent_clipped = true;
        }

        // Glide bookkeeping: budget countdown and early cancel.
        if self.phase == AirPhase::Glide {
            self.glide_elapsed += dt;
            if self.glide_elapsed >= cfg.glide_budget || input.jump_released() {
                self.end_glide(tick, events);
            }
        }

        // Gravity, except while gliding where vy is pinned.
        if self.phase == AirPhase::Glide {
            self.velocity.y = cfg.glide_fall_speed;
        } else {
            self.velocity.y = (self.velocity.y + cfg.gravity * dt).min(cfg.max_fall_speed);
        }

        // Constant run speed, scaled by the transient double-jump boost.
        let boost = if self.boost_timer > 0.0 {
            cfg.boost_multiplier
        } else {
            1.0
        };
        self.velocity.x = run_speed * boost;

        // Integrate
        self.position += self.velocity * dt;

        // Past apex with jumps in flight: cosmetic Falling phase.
        if !self.grounded
            && self.velocity.y >= 0.0
            && matches!(self.phase, AirPhase::FirstJump | AirPhase::SecondJump)
        {
            self.phase = AirPhase::Falling;
        }
    }

    /// Execute a jump based on the current jump count.
    fn jump(&mut self, cfg: &PlayerConfig, tick: u64, events: &mut Vec<GameEvent>) {
        if self.jump_count == 0 {
            self.velocity.y = cfg.first_jump_velocity;
            self.phase = AirPhase::FirstJump;
            self.grounded = false;
            self.platform_slot = None;
            self.jump_count = 1;
            self.coyote_timer = 0.0;
            self.ascent_clipped = false;
            events.push(GameEvent::jumped(tick, 1));
        } else if self.jump_count < cfg.max_jumps {
            self.velocity.y = cfg.second_jump_velocity;
            self.phase = AirPhase::SecondJump;
            self.jump_count += 1;
            self.ascent_clipped = false;
            self.glide_armed = self.abilities.glide;
            self.boost_timer = cfg.boost_duration;
            events.push(GameEvent::jumped(tick, self.jump_count));
        }
    }

    /// Enter the glide state.
    fn start_glide(&mut self, tick: u64, events: &mut Vec<GameEvent>) {
        self.phase = AirPhase::Glide;
        self.glide_armed = false;
        self.glide_elapsed = 0.0;
        events.push(GameEvent::glide_started(tick));
    }

    /// Leave the glide state (budget exhausted or cancelled).
    fn end_glide(&mut self, tick: u64, events: &mut Vec<GameEvent>) {
        self.phase = AirPhase::Falling;
        events.push(GameEvent::glide_ended(tick));
    }

    /// Landing transition, called by the collision resolver.
    ///
    /// Resets the whole airborne segment atomically: jump count, glide,
    /// boost, coyote. Consumes a buffered jump request exactly once,
    /// auto-firing the first jump of the next segment.
    pub fn land(
        &mut self,
        slot: u32,
        top_y: f32,
        cfg: &PlayerConfig,
        tick: u64,
        events: &mut Vec<GameEvent>,
    ) {
        self.snap_bottom_to(top_y, cfg);
        self.velocity.y = 0.0;
        self.grounded = true;
        self.platform_slot = Some(slot);
        self.phase = AirPhase::Grounded;
        self.jump_count = 0;
        self.glide_elapsed = 0.0;
        self.glide_armed = false;
        self.boost_timer = 0.0;
        self.coyote_timer = cfg.coyote_window;
        self.ascent_clipped = false;

        if self.buffer_timer > 0.0 {
            self.buffer_timer = 0.0;
            self.jump(cfg, tick, events);
        }
    }

    /// Launch transition for Bouncy/Spring surfaces.
    ///
    /// The landing reset happens but the zeroed vy is overridden with a
    /// launch velocity; the launch counts as the first jump of the new
    /// airborne segment and any buffered press is dropped (launch wins).
    pub fn launch(&mut self, vy: f32) {
        self.velocity.y = vy;
        self.grounded = false;
        self.platform_slot = None;
        self.phase = AirPhase::FirstJump;
        self.jump_count = 1;
        self.glide_elapsed = 0.0;
        self.glide_armed = false;
        self.boost_timer = 0.0;
        self.coyote_timer = 0.0;
        self.buffer_timer = 0.0;
        self.ascent_clipped = true;
    }

    /// The supporting platform is gone (walked off the edge or it
    /// crumbled). Starts the coyote window.
    pub fn leave_ground(&mut self) {
        if self.grounded {
            self.grounded = false;
            self.platform_slot = None;
            self.phase = AirPhase::Falling;
        }
    }

    /// Death transition. Terminal: no further motion or transitions.
    pub fn die(&mut self, tick: u64, events: &mut Vec<GameEvent>) {
        if self.is_dead() {
            return;
        }
        self.phase = AirPhase::Dead;
        self.velocity = Vec2::ZERO;
        self.grounded = false;
        self.platform_slot = None;
        events.push(GameEvent::died(tick, self.position.x));
    }

    /// Hash this player's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_u8(self.phase as u8);
        hasher.update_u8(self.jump_count);
        hasher.update_bool(self.grounded);
        hasher.update_u32(self.platform_slot.unwrap_or(u32::MAX));
        hasher.update_f32(self.glide_elapsed);
        hasher.update_bool(self.glide_armed);
        hasher.update_f32(self.coyote_timer);
        hasher.update_f32(self.buffer_timer);
        hasher.update_f32(self.boost_timer);
    }
}

/// Offsets of the collision box inside the sprite box.
#[inline]
fn collision_offsets(cfg: &PlayerConfig) -> (f32, f32) {
    (
        (cfg.width - cfg.collision_width) / 2.0,
        (cfg.height - cfg.collision_height) / 2.0,
    )
}

// =============================================================================
// TESTS
// =============================================================================
