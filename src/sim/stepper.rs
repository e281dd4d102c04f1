//! Fixed-timestep accumulator
//!
//! Render frames arrive with variable length; the simulation only ever
//! advances in whole `fixed_dt` ticks. Frame time is accumulated (capped at
//! `max_frame_dt` per frame so a stalled frame cannot queue an unbounded
//! catch-up burst) and any remainder carries over to the next frame.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, SIM_DT, TICK_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stepper {
    fixed_dt: f32,
    max_frame_dt: f32,
    accumulator: f32,
}

impl Default for Stepper {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_FRAME_DT)
    }
}

impl Stepper {
    pub fn new(fixed_dt: f32, max_frame_dt: f32) -> Self {
        Self {
            fixed_dt,
            max_frame_dt: max_frame_dt.max(fixed_dt),
            accumulator: 0.0,
        }
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Time carried over to the next frame
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    /// Drop any carried-over time
    pub fn clear(&mut self) {
        self.accumulator = 0.0;
    }

    /// Accumulate one frame and return how many whole ticks it released
    pub fn consume(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(self.max_frame_dt);

        let mut ticks = 0;
        while self.accumulator + TICK_EPSILON >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            ticks += 1;
        }
        self.accumulator = self.accumulator.max(0.0);
        ticks
    }

    /// Accumulate one frame and invoke `on_tick` once per whole tick
    pub fn advance<F: FnMut(f32)>(&mut self, frame_dt: f32, mut on_tick: F) -> u32 {
        let ticks = self.consume(frame_dt);
        for _ in 0..ticks {
            on_tick(self.fixed_dt);
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple_releases_all_ticks() {
        let mut stepper = Stepper::default();
        assert_eq!(stepper.consume(SIM_DT * 3.0), 3);
        assert!(stepper.remainder() < TICK_EPSILON);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut stepper = Stepper::default();
        assert_eq!(stepper.consume(SIM_DT * 0.6), 0);
        assert_eq!(stepper.consume(SIM_DT * 0.6), 1);
        assert!((stepper.remainder() - SIM_DT * 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut stepper = Stepper::default();
        // Five seconds of stall only releases 0.1s worth of ticks
        assert_eq!(stepper.consume(5.0), 6);
    }

    #[test]
    fn test_invalid_frame_time_is_ignored() {
        let mut stepper = Stepper::default();
        assert_eq!(stepper.consume(-1.0), 0);
        assert_eq!(stepper.consume(f32::NAN), 0);
        assert_eq!(stepper.consume(0.0), 0);
        assert_eq!(stepper.remainder(), 0.0);
    }

    #[test]
    fn test_advance_invokes_callback_per_tick() {
        let mut stepper = Stepper::default();
        let mut seen = Vec::new();
        let ticks = stepper.advance(SIM_DT * 2.5, |dt| seen.push(dt));
        assert_eq!(ticks, 2);
        assert_eq!(seen, vec![SIM_DT, SIM_DT]);
    }
}
