//! Player body and flap input handling

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Circle;
use super::config::SimulationConfig;
use crate::clamp;
use crate::consts::*;

/// Slack used when comparing session times against the flap cooldown
const COOLDOWN_EPSILON: f32 = 1e-4;

/// The player's sprite box. `x` never changes during a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Left edge of the sprite box
    pub x: f32,
    /// Top edge of the sprite box
    pub y: f32,
    pub size: f32,
    /// Vertical velocity (positive = falling)
    pub vy: f32,
}

impl PlayerBody {
    /// Spawn at rest, vertically centered above the ground band
    pub fn spawn(config: &SimulationConfig) -> Self {
        Self {
            x: config.player_x,
            y: ((config.ground_top() - config.player_size) / 2.0).max(0.0),
            size: config.player_size,
            vy: 0.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.size / 2.0, self.y + self.size / 2.0)
    }

    /// Collidable proxy, deliberately smaller than the sprite
    pub fn collision_circle(&self) -> Circle {
        Circle::new(self.center(), self.size * 0.5 * HITBOX_SCALE)
    }

    /// Replace the current vertical velocity with the flap velocity
    pub fn flap(&mut self) {
        self.vy = FLAP_VELOCITY;
    }

    /// Integrate one tick of gravity, drag and motion
    ///
    /// Hitting the ceiling stops upward motion. The ground is not handled
    /// here: touching it ends the session.
    pub fn integrate(&mut self, elapsed: f32, dt: f32) {
        self.vy += gravity_at(elapsed) * dt;
        self.vy = clamp(self.vy, MAX_RISE_SPEED, MAX_FALL_SPEED);
        self.vy *= DRAG_PER_TICK;
        self.y += self.vy * dt;

        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = self.vy.max(0.0);
        }
    }
}

/// Gravity after `elapsed` seconds, eased in from zero at session start
pub fn gravity_at(elapsed: f32) -> f32 {
    let t = clamp(elapsed / GRAVITY_RAMP_SECS, 0.0, 1.0);
    GRAVITY * t * t * (3.0 - 2.0 * t)
}

/// Buffered flap input
///
/// A flap may arrive a little before the engine will accept it. It stays
/// queued for `TAP_BUFFER_SECS` and fires on the first tick where the
/// cooldown since the previous accepted flap has elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlapBuffer {
    queued: bool,
    age: f32,
    last_accepted: Option<f32>,
}

impl FlapBuffer {
    /// Queue a flap (a newer flap replaces an older queued one)
    pub fn queue(&mut self) {
        self.queued = true;
        self.age = 0.0;
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    /// Session time of the last accepted flap
    pub fn last_accepted(&self) -> Option<f32> {
        self.last_accepted
    }

    /// Resolve the queued flap for the tick at session time `now`
    ///
    /// Returns true when the flap is accepted this tick.
    pub fn poll(&mut self, now: f32, dt: f32) -> bool {
        if !self.queued {
            return false;
        }

        let cooled_down = self
            .last_accepted
            .is_none_or(|last| now - last + COOLDOWN_EPSILON >= FLAP_COOLDOWN_SECS);
        if self.age <= TAP_BUFFER_SECS && cooled_down {
            self.queued = false;
            self.age = 0.0;
            self.last_accepted = Some(now);
            return true;
        }

        self.age += dt;
        if self.age > TAP_BUFFER_SECS {
            self.queued = false;
        }
        false
    }
}
