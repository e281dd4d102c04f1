//! Session engine
//!
//! Owns the simulation state for one play area and drives it from render
//! frames. The driving layer calls `step` once per frame and `flap` on input;
//! the renderer reads the published `FrameSnapshot`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::highscores::SessionResult;
use crate::sim::{
    Circle, EngineState, Obstacle, PlayerBody, Rect, SessionPhase, SimulationConfig, Stepper,
    tick,
};

/// Wall-clock source used to time sessions
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Render-facing view of one obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub x: f32,
    pub gap_y: f32,
    pub gap_height: f32,
    pub passed: bool,
    pub top: Rect,
    pub bottom: Rect,
}

impl From<&Obstacle> for ObstacleView {
    fn from(o: &Obstacle) -> Self {
        Self {
            id: o.id,
            x: o.x(),
            gap_y: o.gap_y(),
            gap_height: o.gap_height(),
            passed: o.passed,
            top: o.top_rect(),
            bottom: o.bottom_rect(),
        }
    }
}

/// Everything the renderer needs for one frame
///
/// Published whole after each engine operation; holders of an older
/// snapshot keep seeing that frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Increments on every publication
    pub frame: u64,
    pub phase: SessionPhase,
    pub elapsed: f32,
    pub score: u32,
    pub player: PlayerBody,
    pub collision_circle: Circle,
    /// Active obstacles in pool order
    pub obstacles: Vec<ObstacleView>,
}

impl FrameSnapshot {
    fn capture(frame: u64, state: &EngineState) -> Self {
        Self {
            frame,
            phase: state.phase,
            elapsed: state.elapsed,
            score: state.score,
            player: state.player,
            collision_circle: state.player.collision_circle(),
            obstacles: state
                .obstacles
                .iter()
                .filter(|o| o.active)
                .map(ObstacleView::from)
                .collect(),
        }
    }
}

type GameOverCallback = Box<dyn FnMut(SessionResult)>;

pub struct Engine {
    config: SimulationConfig,
    state: EngineState,
    stepper: Stepper,
    rng: Pcg32,
    clock: Box<dyn Clock>,
    on_game_over: GameOverCallback,
    started_at: Option<DateTime<Utc>>,
    result_emitted: bool,
    snapshot: Arc<FrameSnapshot>,
    frame: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .field("result_emitted", &self.result_emitted)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an idle engine for a `width` x `height` play area
    ///
    /// `on_game_over` receives each finished session's result exactly once.
    pub fn new<F>(width: f32, height: f32, reduced_motion: bool, on_game_over: F) -> Self
    where
        F: FnMut(SessionResult) + 'static,
    {
        let seed = rand::rng().random();
        Self::seeded(width, height, reduced_motion, seed, on_game_over)
    }

    /// Like `new`, with a fixed RNG seed for reproducible obstacle layouts
    pub fn seeded<F>(
        width: f32,
        height: f32,
        reduced_motion: bool,
        seed: u64,
        on_game_over: F,
    ) -> Self
    where
        F: FnMut(SessionResult) + 'static,
    {
        let config = SimulationConfig::build(width, height, reduced_motion);
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = EngineState::new(&config, &mut rng, 1);
        let snapshot = Arc::new(FrameSnapshot::capture(0, &state));
        Self {
            config,
            state,
            stepper: Stepper::default(),
            rng,
            clock: Box::new(SystemClock),
            on_game_over: Box::new(on_game_over),
            started_at: None,
            result_emitted: false,
            snapshot,
            frame: 0,
        }
    }

    /// Replace the wall clock used for session timing
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Reset and begin a new session
    pub fn start(&mut self) {
        self.reset();
        self.state.phase = SessionPhase::Running;
        self.started_at = Some(self.clock.now());
        self.result_emitted = false;
        log::info!(
            "Session started ({}x{}, reduced motion: {})",
            self.config.width,
            self.config.height,
            self.config.reduced_motion
        );
        self.publish();
    }

    /// Leave the session without producing a result
    ///
    /// Safe to call at any time; repeated calls do nothing.
    pub fn stop(&mut self) {
        if self.state.phase == SessionPhase::Idle {
            return;
        }
        if self.state.phase == SessionPhase::Running {
            log::info!("Session stopped at score {}", self.state.score);
        }
        self.state.phase = SessionPhase::Idle;
        self.state.flap = Default::default();
        self.stepper.clear();
        self.started_at = None;
        self.publish();
    }

    /// Discard the current session and lay out a fresh idle one
    pub fn reset(&mut self) {
        let next_id = self.state.next_id();
        self.state = EngineState::new(&self.config, &mut self.rng, next_id);
        self.stepper.clear();
        self.started_at = None;
        self.publish();
    }

    /// Queue an upward impulse; ignored unless a session is running
    pub fn flap(&mut self) {
        if self.state.is_running() {
            self.state.flap.queue();
        }
    }

    /// Advance by one render frame of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if !self.state.is_running() {
            return;
        }

        let Self {
            stepper,
            state,
            config,
            rng,
            ..
        } = &mut *self;
        let mut crashed = false;
        stepper.advance(dt, |fixed_dt| {
            // Ticks after a crash are no-ops; the phase is already GameOver
            let report = tick(state, config, rng, fixed_dt);
            crashed |= report.crash.is_some();
        });
        if crashed {
            self.finish();
        }
        self.publish();
    }

    /// Rebuild the layout for a new play area; any running session is dropped
    pub fn resize(&mut self, width: f32, height: f32) {
        self.rebuild(SimulationConfig::build(width, height, self.config.reduced_motion));
    }

    /// Switch pacing; any running session is dropped
    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        self.rebuild(SimulationConfig::build(
            self.config.width,
            self.config.height,
            reduced_motion,
        ));
    }

    fn rebuild(&mut self, config: SimulationConfig) {
        if self.state.is_running() {
            log::info!("Play area changed, abandoning session");
        }
        self.config = config;
        self.state.phase = SessionPhase::Idle;
        self.reset();
    }

    fn finish(&mut self) {
        self.stepper.clear();
        if self.result_emitted {
            return;
        }
        self.result_emitted = true;

        let ended = self.clock.now();
        let started = self.started_at.unwrap_or(ended);
        let result = SessionResult::from_session(started, ended, self.state.score);
        log::info!(
            "Game over: score {} in {}s",
            result.score,
            result.duration_secs
        );
        (self.on_game_over)(result);
    }

    fn publish(&mut self) {
        self.frame += 1;
        self.snapshot = Arc::new(FrameSnapshot::capture(self.frame, &self.state));
    }

    /// Latest published frame
    pub fn snapshot(&self) -> Arc<FrameSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn elapsed(&self) -> f32 {
        self.state.elapsed
    }

    pub fn player(&self) -> &PlayerBody {
        &self.state.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.state.obstacles
    }

    pub fn collision_circle(&self) -> Circle {
        self.state.player.collision_circle()
    }
}
