//! Tick Loop
//!
//! Advances a run by one fixed timestep. Phase order is fixed and is part
//! of the determinism contract:
//!
//! 1. Difficulty clock
//! 2. Reachability envelope
//! 3. Platform stream (behaviors, eviction, spawning)
//! 4. Player state machine and integration
//! 5. Collision resolution (landing, support, water)
//! 6. Scoring and run termination
//!
//! Also provides the frame-time accumulator that maps wall-clock frames
//! onto whole ticks, and trace replay.

use serde::{Serialize, Deserialize};
use tracing::info;

use crate::game::SimError;
use crate::game::collision;
use crate::game::difficulty::DifficultyConfig;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::gen::{GeneratorConfig, ReachBudget};
use crate::game::input::{InputFrame, InputTrace};
use crate::game::player::PlayerConfig;
use crate::game::state::{RunPhase, RunState};

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Fixed timestep in seconds.
pub const FIXED_DT: f32 = 1.0 / TICK_RATE as f32;

// =============================================================================
// CONFIG
// =============================================================================

/// Full tuning for a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Player motion tuning
    pub player: PlayerConfig,
    /// Difficulty curve tuning
    pub difficulty: DifficultyConfig,
    /// Platform stream tuning
    pub generator: GeneratorConfig,
    /// Fixed timestep (seconds)
    pub dt: f32,
    /// Death line: the run ends when the collision-box top reaches this y
    pub water_line: f32,
    /// How far behind the player the visible/collidable window begins
    pub frontier_offset: f32,
    /// Player spawn x on the starting platform
    pub player_start_x: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            difficulty: DifficultyConfig::default(),
            generator: GeneratorConfig::default(),
            dt: FIXED_DT,
            water_line: 620.0,
            frontier_offset: 384.0,
            player_start_x: 60.0,
        }
    }
}

/// Result of one tick.
#[derive(Clone, Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in emission order
    pub events: Vec<GameEvent>,

    /// The run is over (this tick or earlier)
    pub run_over: bool,
}

// =============================================================================
// TICK
// =============================================================================

/// Advance the run by one tick.
///
/// Ready and Ended runs are not advanced; an Ended run reports
/// `run_over` so callers can stop their loop.
pub fn tick(
    state: &mut RunState,
    input: InputFrame,
    cfg: &RunConfig,
) -> Result<TickResult, SimError> {
    match state.phase {
        RunPhase::Ready => return Ok(TickResult::default()),
        RunPhase::Ended => {
            return Ok(TickResult {
                events: Vec::new(),
                run_over: true,
            })
        }
        RunPhase::Running => {}
    }

    state.tick += 1;
    let tick_no = state.tick;

    // 1. Difficulty clock
    let difficulty = state.difficulty.update(cfg.dt, &cfg.difficulty);
    if difficulty.speed > state.current_speed {
        state
            .pending_events
            .push(GameEvent::speed_increased(tick_no, difficulty.speed));
    }
    state.current_speed = difficulty.speed;

    // 2. Reachability envelope
    let budget = ReachBudget::compute(difficulty.speed, state.player.abilities, &cfg.player);
    if !budget.max_reach.is_finite() || budget.max_reach <= 0.0 {
        return Err(SimError::NonFiniteReach {
            speed: difficulty.speed,
        });
    }

    // 3. Platform stream
    let weights = state.difficulty.kind_weights(&difficulty, &cfg.difficulty);
    let frontier = state.player.position.x - cfg.frontier_offset;
    let supported = state.player.platform_slot;
    state.generator.update(
        frontier,
        cfg.dt,
        &difficulty,
        &weights,
        budget,
        supported,
        &cfg.generator,
        tick_no,
        &mut state.pending_events,
    )?;

    // 4. Player
    let stat_mark = state.pending_events.len();
    state.player.update(
        cfg.dt,
        input,
        difficulty.speed,
        &cfg.player,
        tick_no,
        &mut state.pending_events,
    );

    // 5. Collision
    let resolution = collision::resolve(
        &mut state.player,
        state.generator.slots_mut(),
        cfg.dt,
        &cfg.player,
        cfg.water_line,
        cfg.generator.crumbling_delay,
        tick_no,
        &mut state.pending_events,
    );

    // 6. Scoring and termination
    for event in &state.pending_events[stat_mark..] {
        match event.data {
            GameEventData::Jumped { count: 1 } => state.stats.jumps += 1,
            GameEventData::Jumped { .. } => state.stats.double_jumps += 1,
            GameEventData::GlideStarted => state.stats.glides += 1,
            _ => {}
        }
    }
    if resolution.landed.is_some() {
        state.score += 10;
        state.stats.platforms_landed += 1;
    }
    if resolution.died {
        state.phase = RunPhase::Ended;
        let distance = state.distance();
        let score = state.score;
        state
            .pending_events
            .push(GameEvent::run_ended(tick_no, distance, score));
        info!(tick = tick_no, distance, score, "run ended");
    }

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        tick = tick_no,
        x = state.player.position.x,
        y = state.player.position.y,
        vy = state.player.velocity.y,
        phase = ?state.player.phase,
        "tick complete"
    );

    Ok(TickResult {
        events: state.take_events(),
        run_over: state.phase == RunPhase::Ended,
    })
}

// =============================================================================
// FIXED TIMESTEP
// =============================================================================

/// Frame-time accumulator mapping variable frame times onto whole ticks.
///
/// Debt is clamped so a long stall (breakpoint, tab switch) does not
/// trigger a catch-up spiral.
#[derive(Clone, Copy, Debug)]
pub struct FixedStep {
    dt: f32,
    accumulator: f32,
    max_debt: f32,
}

impl FixedStep {
    /// Create an accumulator for the given timestep.
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_debt: 0.25,
        }
    }

    /// Add a frame's wall-clock time.
    pub fn accumulate(&mut self, frame_dt: f32) {
        self.accumulator = (self.accumulator + frame_dt.max(0.0)).min(self.max_debt);
    }

    /// Consume one tick's worth of time if available.
    pub fn step(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(FIXED_DT)
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Re-simulate a run from its input trace.
///
/// Returns the final state and every event the run produced. The caller
/// compares `compute_hash()` against the live run's hash to verify
/// determinism.
pub fn replay_run(
    trace: &InputTrace,
    cfg: &RunConfig,
) -> Result<(RunState, Vec<GameEvent>), SimError> {
    let mut state = RunState::new(trace.rng_seed, cfg);
    state.start();

    let mut events = Vec::new();
    for (_, frame) in trace.replay_iter() {
        let result = tick(&mut state, frame, cfg)?;
        events.extend(result.events);
        if result.run_over {
            break;
        }
    }

    Ok((state, events))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::AirPhase;

    /// Scripted input: press briefly every `period` ticks.
    fn scripted_input(tick: u64, period: u64) -> InputFrame {
        match tick % period {
            0 => InputFrame::pressed(),
            1..=10 => InputFrame::held(),
            11 => InputFrame::released(),
            _ => InputFrame::new(),
        }
    }

    fn run_ticks(seed: u64, ticks: u64, cfg: &RunConfig) -> RunState {
        let mut state = RunState::new(seed, cfg);
        state.start();
        for t in 0..ticks {
            let result = tick(&mut state, scripted_input(t, 45), cfg).unwrap();
            if result.run_over {
                break;
            }
        }
        state
    }

    #[test]
    fn test_ready_run_is_a_no_op() {
        let cfg = RunConfig::default();
        let mut state = RunState::new(42, &cfg);

        let result = tick(&mut state, InputFrame::pressed(), &cfg).unwrap();
        assert_eq!(state.tick, 0);
        assert!(!result.run_over);
        assert!(result.events.is_empty());
        assert_eq!(state.phase, RunPhase::Ready);
    }

    #[test]
    fn test_determinism_same_seed_same_hash() {
        let cfg = RunConfig::default();
        let a = run_ticks(42, 600, &cfg);
        let b = run_ticks(42, 600, &cfg);

        assert_eq!(a.tick, b.tick);
        assert_eq!(a.compute_hash(), b.compute_hash());

        let c = run_ticks(43, 600, &cfg);
        assert_ne!(a.compute_hash(), c.compute_hash());
    }

    #[test]
    fn test_water_crossing_ends_run() {
        let cfg = RunConfig::default();
        let mut state = RunState::new(42, &cfg);
        state.start();

        // Force the player under the water line, airborne
        state.player.grounded = false;
        state.player.platform_slot = None;
        state.player.phase = AirPhase::Falling;
        state.player.position.y = cfg.water_line + 100.0;
        state.player.velocity.y = 500.0;

        let result = tick(&mut state, InputFrame::new(), &cfg).unwrap();
        assert!(result.run_over);
        assert_eq!(state.phase, RunPhase::Ended);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::Died { .. })));
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::RunEnded { .. })));

        // Further ticks do not advance the clock
        let t = state.tick;
        let result = tick(&mut state, InputFrame::pressed(), &cfg).unwrap();
        assert!(result.run_over);
        assert_eq!(state.tick, t);
    }

    #[test]
    fn test_score_counts_landings() {
        let cfg = RunConfig::default();
        let state = run_ticks(42, 1800, &cfg);
        assert_eq!(state.score, state.stats.platforms_landed * 10);
    }

    #[test]
    fn test_speed_step_emits_event() {
        let cfg = RunConfig::default();
        let mut state = RunState::new(42, &cfg);
        state.start();

        let mut saw_speed_event = false;
        // 11 seconds crosses the first 10s speed step
        for t in 0..(11 * TICK_RATE as u64) {
            let result = tick(&mut state, scripted_input(t, 45), &cfg).unwrap();
            saw_speed_event |= result
                .events
                .iter()
                .any(|e| matches!(e.data, GameEventData::SpeedIncreased { .. }));
            if result.run_over {
                break;
            }
        }
        if state.phase == RunPhase::Running {
            assert!(saw_speed_event);
            assert!(state.current_speed > cfg.difficulty.base_speed);
        }
    }

    #[test]
    fn test_replay_reproduces_live_run() {
        let cfg = RunConfig::default();

        let mut live = RunState::new(42, &cfg);
        live.start();
        let mut trace = InputTrace::new(42);
        let mut live_events = Vec::new();
        for t in 0..600u64 {
            let frame = scripted_input(t, 45);
            trace.record(t, frame);
            let result = tick(&mut live, frame, &cfg).unwrap();
            live_events.extend(result.events);
            if result.run_over {
                break;
            }
        }
        trace.finalize(live.tick.saturating_sub(1));

        let (replayed, replay_events) = replay_run(&trace, &cfg).unwrap();
        assert_eq!(replayed.tick, live.tick);
        assert_eq!(replayed.compute_hash(), live.compute_hash());
        assert_eq!(replay_events, live_events);
    }

    #[test]
    fn test_fixed_step_accumulates_and_clamps() {
        let mut step = FixedStep::new(FIXED_DT);

        // One 60Hz frame: exactly one tick
        step.accumulate(FIXED_DT);
        assert!(step.step());
        assert!(!step.step());

        // A 3-frame stall: three ticks
        step.accumulate(3.0 * FIXED_DT + 1e-4);
        let mut n = 0;
        while step.step() {
            n += 1;
        }
        assert_eq!(n, 3);

        // A multi-second stall is clamped, no catch-up spiral
        step.accumulate(10.0);
        let mut n = 0;
        while step.step() {
            n += 1;
        }
        assert!(n <= (0.25 / FIXED_DT) as u32 + 1);
    }
}
