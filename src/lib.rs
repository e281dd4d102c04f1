//! Flap Sim - simulation core for a one-button reflex mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, session state)
//! - `engine`: Session lifecycle, frame stepping and snapshot publication
//! - `highscores`: Session results and leaderboard ranking
//! - `persistence`: Result store collaborators (in-memory, JSON file)
//! - `settings`: Player preferences

pub mod engine;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use engine::{Clock, Engine, FrameSnapshot, ObstacleView, SystemClock};
pub use highscores::{Leaderboard, SessionResult, rank_results};
pub use persistence::{JsonFileStore, MemoryStore, ResultStore, StoreError};
pub use settings::Settings;

/// Simulation tuning constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum frame time fed into the accumulator (prevents spiral of death)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Slack allowed when consuming a whole tick from the accumulator
    pub const TICK_EPSILON: f32 = 1e-6;

    /// Downward acceleration at full strength (px/s²)
    pub const GRAVITY: f32 = 1500.0;
    /// Time for gravity to ease in from zero at session start
    pub const GRAVITY_RAMP_SECS: f32 = 0.45;
    /// Velocity set by an accepted flap (negative = upward)
    pub const FLAP_VELOCITY: f32 = -430.0;
    /// Terminal fall speed
    pub const MAX_FALL_SPEED: f32 = 760.0;
    /// Terminal rise speed (negative = upward)
    pub const MAX_RISE_SPEED: f32 = -560.0;
    /// Velocity multiplier applied once per tick
    pub const DRAG_PER_TICK: f32 = 0.997;

    /// How long a queued flap stays eligible
    pub const TAP_BUFFER_SECS: f32 = 0.12;
    /// Minimum time between two accepted flaps
    pub const FLAP_COOLDOWN_SECS: f32 = 0.11;

    /// Collision circle diameter as a fraction of the sprite box
    pub const HITBOX_SCALE: f32 = 0.78;

    /// Horizontal scroll speed at session start (px/s)
    pub const BASE_SCROLL_SPEED: f32 = 170.0;
    /// Horizontal scroll speed once difficulty has fully ramped (px/s)
    pub const MAX_SCROLL_SPEED: f32 = 250.0;
    /// Time for difficulty to reach its final value
    pub const DIFFICULTY_RAMP_SECS: f32 = 75.0;

    /// Random gap jitter as a fraction of the scheduled gap height
    pub const GAP_JITTER: f32 = 0.06;
    /// Extra clearance kept between a gap and the play-area bounds
    pub const GAP_COLLISION_PADDING: f32 = 6.0;

    /// Number of pooled obstacles
    pub const OBSTACLE_POOL_SIZE: usize = 4;
}

/// Clamp `v` into `[min, max]`
///
/// Unlike `f32::clamp` this never panics: if `min > max` the result is `min`.
#[inline]
pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    v.min(max).max(min)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_clamp_inverted_bounds() {
        // Degenerate band resolves to the lower bound
        assert_eq!(clamp(3.0, 8.0, 2.0), 8.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
        assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
    }
}
