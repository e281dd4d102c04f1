//! Fixed timestep simulation tick
//!
//! Order within a tick: flap input, player integration, obstacle advance
//! (scroll, score, recycle), then terminal checks against the post-advance
//! geometry with the ground tested before obstacles.

use rand::Rng;

use super::collision::{Circle, Rect, circle_rect_collides};
use super::config::SimulationConfig;
use super::obstacle::{Obstacle, advance_obstacles};
use super::state::{EngineState, SessionPhase};

/// What ended a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crash {
    Ground,
    Obstacle { id: u32 },
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub flapped: bool,
    pub scored: u32,
    pub recycled: u32,
    pub crash: Option<Crash>,
}

/// Advance a running session by one fixed timestep
///
/// Does nothing unless the session is running. A crash moves the session to
/// `GameOver`.
pub fn tick<R: Rng>(
    state: &mut EngineState,
    config: &SimulationConfig,
    rng: &mut R,
    dt: f32,
) -> TickReport {
    let mut report = TickReport::default();
    if state.phase != SessionPhase::Running {
        return report;
    }

    state.time_ticks += 1;
    state.elapsed += dt;

    if state.flap.poll(state.elapsed, dt) {
        state.player.flap();
        report.flapped = true;
    }
    state.player.integrate(state.elapsed, dt);

    let elapsed = state.elapsed;
    let mut next_id = state.next_id();
    let advance = advance_obstacles(&mut state.obstacles, config, elapsed, dt, rng, &mut next_id);
    *state.next_id_mut() = next_id;
    state.score += advance.scored;
    report.scored = advance.scored;
    report.recycled = advance.recycled;

    report.crash = detect_crash(&state.player.collision_circle(), &state.obstacles, config);
    if let Some(crash) = report.crash {
        log::debug!("Crash at tick {}: {:?}", state.time_ticks, crash);
        state.phase = SessionPhase::GameOver;
    }

    report
}

/// The ground band as a solid rectangle
pub fn ground_rect(config: &SimulationConfig) -> Rect {
    Rect::new(0.0, config.ground_top(), config.width, config.ground_height)
}

/// First terminal condition hit by `circle`, ground first
pub fn detect_crash(
    circle: &Circle,
    obstacles: &[Obstacle],
    config: &SimulationConfig,
) -> Option<Crash> {
    if circle_rect_collides(circle, &ground_rect(config), 0.0) {
        return Some(Crash::Ground);
    }

    obstacles
        .iter()
        .filter(|o| o.active)
        .find(|o| {
            circle_rect_collides(circle, &o.top_rect(), 0.0)
                || circle_rect_collides(circle, &o.bottom_rect(), 0.0)
        })
        .map(|o| Crash::Obstacle { id: o.id })
}
