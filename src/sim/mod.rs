//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool order)
//! - No rendering, clock or platform dependencies

pub mod collision;
pub mod config;
pub mod obstacle;
pub mod player;
pub mod state;
pub mod stepper;
pub mod tick;

pub use collision::{Circle, Rect, circle_rect_collides};
pub use config::SimulationConfig;
pub use obstacle::{AdvanceReport, Obstacle, advance_obstacles, initial_layout, scroll_speed};
pub use player::{FlapBuffer, PlayerBody, gravity_at};
pub use state::{EngineState, SessionPhase};
pub use stepper::Stepper;
pub use tick::{Crash, TickReport, detect_crash, ground_rect, tick};
