//! Per-session geometry derived from the play area
//!
//! Built once per session and never mutated; a play-area change rebuilds it
//! and resets the engine.

use serde::{Deserialize, Serialize};

use crate::consts::OBSTACLE_POOL_SIZE;

/// Smallest play area the engine will lay out
pub const MIN_PLAY_WIDTH: f32 = 120.0;
pub const MIN_PLAY_HEIGHT: f32 = 200.0;

/// Seconds between obstacles at normal pacing
pub const SPAWN_INTERVAL_SECS: f32 = 1.45;
/// Seconds between obstacles with reduced motion enabled
pub const REDUCED_MOTION_SPAWN_INTERVAL_SECS: f32 = 1.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub width: f32,
    pub height: f32,
    /// Side of the player's square sprite box
    pub player_size: f32,
    /// Fixed left edge of the player's sprite box
    pub player_x: f32,
    pub ground_height: f32,
    pub obstacle_width: f32,
    pub pool_size: usize,
    /// Clearance kept between a gap and the ceiling / ground band
    pub gap_margin: f32,
    /// Gap height at session start
    pub gap_start: f32,
    /// Gap height once difficulty has fully ramped
    pub gap_min: f32,
    /// Target seconds between successive obstacles
    pub spawn_interval: f32,
    /// How far past the left edge an obstacle travels before recycling
    pub recycle_padding: f32,
    pub reduced_motion: bool,
}

impl SimulationConfig {
    /// Derive session geometry from the play area
    pub fn build(width: f32, height: f32, reduced_motion: bool) -> Self {
        let width = sanitize(width, MIN_PLAY_WIDTH);
        let height = sanitize(height, MIN_PLAY_HEIGHT);

        let min_dim = width.min(height);
        let player_size = (min_dim * 0.09).max(24.0);
        let ground_height = (height * 0.12).max(40.0);
        let obstacle_width = (width * 0.18).max(48.0);
        let gap_margin = (height * 0.08).max(24.0);

        let playable = height - ground_height;
        let gap_start = (playable * 0.30).max(player_size * 3.6);
        let gap_min = (playable * 0.19).max(player_size * 2.6).min(gap_start);

        let spawn_interval = if reduced_motion {
            REDUCED_MOTION_SPAWN_INTERVAL_SECS
        } else {
            SPAWN_INTERVAL_SECS
        };

        Self {
            width,
            height,
            player_size,
            player_x: width * 0.28,
            ground_height,
            obstacle_width,
            pool_size: OBSTACLE_POOL_SIZE,
            gap_margin,
            gap_start,
            gap_min,
            spawn_interval,
            recycle_padding: (obstacle_width * 0.5).max(16.0),
            reduced_motion,
        }
    }

    /// Y coordinate of the top of the ground band
    #[inline]
    pub fn ground_top(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Horizontal distance between successive obstacles at `speed`
    #[inline]
    pub fn spacing_at(&self, speed: f32) -> f32 {
        speed * self.spawn_interval
    }
}

fn sanitize(v: f32, min: f32) -> f32 {
    if v.is_finite() && v >= min {
        v
    } else {
        if v.is_finite() && v > 0.0 {
            log::warn!("Play area dimension {} below minimum, using {}", v, min);
        }
        min
    }
}
