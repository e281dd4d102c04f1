//! Session state
//!
//! Everything that changes while a session runs lives here. Only the engine
//! mutates it; the renderer sees published snapshots instead.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use super::obstacle::{Obstacle, initial_layout};
use super::player::{FlapBuffer, PlayerBody};

/// Lifecycle of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Constructed, reset or stopped; waiting for `start`
    #[default]
    Idle,
    /// Accepting ticks and flaps
    Running,
    /// Crashed; state frozen until the next reset/start
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Simulated seconds since `start`
    pub elapsed: f32,
    /// Fixed ticks since `start`
    pub time_ticks: u64,
    pub phase: SessionPhase,
    pub score: u32,
    pub player: PlayerBody,
    /// Fixed-size obstacle pool
    pub obstacles: Vec<Obstacle>,
    pub flap: FlapBuffer,
    /// Next obstacle id
    next_id: u32,
}

impl EngineState {
    /// Fresh idle state; obstacle ids continue from `first_id`
    pub fn new<R: Rng>(config: &SimulationConfig, rng: &mut R, first_id: u32) -> Self {
        let mut next_id = first_id;
        let obstacles = initial_layout(config, rng, &mut next_id);
        Self {
            elapsed: 0.0,
            time_ticks: 0,
            phase: SessionPhase::Idle,
            score: 0,
            player: PlayerBody::spawn(config),
            obstacles,
            flap: FlapBuffer::default(),
            next_id,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Mutable access to the id counter for obstacle recycling
    pub(crate) fn next_id_mut(&mut self) -> &mut u32 {
        &mut self.next_id
    }
}
