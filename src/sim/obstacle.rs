//! Obstacle pool and procedural layout
//!
//! A fixed set of gap obstacles scrolls right to left. Once an obstacle has
//! fully left the screen it is respawned behind the rightmost one with a fresh
//! id and a gap sized for the current difficulty.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::config::SimulationConfig;
use crate::consts::*;
use crate::{clamp, lerp};

/// A pooled gap obstacle: solid from the ceiling down to the gap and from the
/// gap down to the ground band.
///
/// Position and gap are only changed through methods so the two solid
/// rectangles always match them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Changes every time the slot is recycled
    pub id: u32,
    /// Scored by the player
    pub passed: bool,
    pub active: bool,
    x: f32,
    gap_y: f32,
    gap_height: f32,
    top: Rect,
    bottom: Rect,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, gap_y: f32, gap_height: f32, config: &SimulationConfig) -> Self {
        let mut obstacle = Self {
            id,
            passed: false,
            active: true,
            x,
            gap_y,
            gap_height,
            top: Rect::default(),
            bottom: Rect::default(),
        };
        obstacle.layout(config);
        obstacle
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    /// Vertical center of the gap
    pub fn gap_y(&self) -> f32 {
        self.gap_y
    }

    pub fn gap_height(&self) -> f32 {
        self.gap_height
    }

    pub fn right(&self) -> f32 {
        self.top.right()
    }

    /// Solid region above the gap
    pub fn top_rect(&self) -> Rect {
        self.top
    }

    /// Solid region below the gap
    pub fn bottom_rect(&self) -> Rect {
        self.bottom
    }

    /// Scroll horizontally by `dx`
    pub fn shift(&mut self, dx: f32, config: &SimulationConfig) {
        self.x += dx;
        self.layout(config);
    }

    /// Reuse this slot as a brand new obstacle
    pub fn respawn(
        &mut self,
        id: u32,
        x: f32,
        gap_y: f32,
        gap_height: f32,
        config: &SimulationConfig,
    ) {
        self.id = id;
        self.x = x;
        self.gap_y = gap_y;
        self.gap_height = gap_height;
        self.passed = false;
        self.active = true;
        self.layout(config);
    }

    fn layout(&mut self, config: &SimulationConfig) {
        let w = config.obstacle_width;
        let gap_top = (self.gap_y - self.gap_height / 2.0).max(0.0);
        let gap_bottom = (self.gap_y + self.gap_height / 2.0).min(config.ground_top());
        self.top = Rect::new(self.x, 0.0, w, gap_top);
        self.bottom = Rect::new(self.x, gap_bottom, w, (config.ground_top() - gap_bottom).max(0.0));
    }
}

/// Difficulty progress in `[0, 1]` after `elapsed` seconds
///
/// Quadratic at the start of a session, blending into linear by the end of
/// the ramp.
pub fn difficulty_progress(elapsed: f32) -> f32 {
    let p = clamp(elapsed / DIFFICULTY_RAMP_SECS, 0.0, 1.0);
    lerp(p * p, p, p)
}

/// Horizontal scroll speed after `elapsed` seconds
pub fn scroll_speed(elapsed: f32) -> f32 {
    lerp(BASE_SCROLL_SPEED, MAX_SCROLL_SPEED, difficulty_progress(elapsed))
}

/// Gap height before jitter after `elapsed` seconds
pub fn scheduled_gap_height(config: &SimulationConfig, elapsed: f32) -> f32 {
    lerp(config.gap_start, config.gap_min, difficulty_progress(elapsed))
}

/// Gap height for a newly spawned obstacle
pub fn roll_gap_height<R: Rng>(config: &SimulationConfig, elapsed: f32, rng: &mut R) -> f32 {
    let base = scheduled_gap_height(config, elapsed);
    let jitter = rng.random_range(-GAP_JITTER..=GAP_JITTER) * base;
    clamp(base + jitter, config.gap_min, config.gap_start)
}

/// Gap center for a gap of `gap_height`, uniform within the band that keeps
/// the whole gap clear of the ceiling and ground margins
pub fn roll_gap_center<R: Rng>(config: &SimulationConfig, gap_height: f32, rng: &mut R) -> f32 {
    let half = gap_height / 2.0 + GAP_COLLISION_PADDING;
    let lo = config.gap_margin + half;
    let hi = config.ground_top() - config.gap_margin - half;
    if hi <= lo {
        return (lo + hi) / 2.0;
    }
    rng.random_range(lo..=hi)
}

/// Populate the pool left to right, starting just off the right edge
pub fn initial_layout<R: Rng>(
    config: &SimulationConfig,
    rng: &mut R,
    next_id: &mut u32,
) -> Vec<Obstacle> {
    let spacing = config.spacing_at(BASE_SCROLL_SPEED);
    let start_x = config.width + config.recycle_padding;

    (0..config.pool_size)
        .map(|i| {
            let gap_height = roll_gap_height(config, 0.0, rng);
            let gap_y = roll_gap_center(config, gap_height, rng);
            let id = take_id(next_id);
            Obstacle::new(id, start_x + i as f32 * spacing, gap_y, gap_height, config)
        })
        .collect()
}

/// What happened to the pool during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Obstacles newly passed by the player
    pub scored: u32,
    /// Obstacles respawned on the right
    pub recycled: u32,
}

/// Scroll every active obstacle, mark passes and recycle what left the screen
pub fn advance_obstacles<R: Rng>(
    obstacles: &mut [Obstacle],
    config: &SimulationConfig,
    elapsed: f32,
    dt: f32,
    rng: &mut R,
    next_id: &mut u32,
) -> AdvanceReport {
    let mut report = AdvanceReport::default();
    let speed = scroll_speed(elapsed);

    for obstacle in obstacles.iter_mut().filter(|o| o.active) {
        obstacle.shift(-speed * dt, config);
        if !obstacle.passed && obstacle.right() < config.player_x {
            obstacle.passed = true;
            report.scored += 1;
        }
    }

    // New obstacles queue up behind the rightmost one, including any that
    // were recycled earlier in this same pass.
    let mut rightmost = obstacles
        .iter()
        .filter(|o| o.active)
        .map(|o| o.x)
        .fold(f32::NEG_INFINITY, f32::max);
    let spacing = config.spacing_at(speed);

    for obstacle in obstacles.iter_mut().filter(|o| o.active) {
        if obstacle.right() >= -config.recycle_padding {
            continue;
        }
        let gap_height = roll_gap_height(config, elapsed, rng);
        let gap_y = roll_gap_center(config, gap_height, rng);
        let x = rightmost + spacing;
        let id = take_id(next_id);
        log::debug!("Recycling obstacle {} as {} at x={:.1}", obstacle.id, id, x);
        obstacle.respawn(id, x, gap_y, gap_height, config);
        rightmost = x;
        report.recycled += 1;
    }

    report
}

fn take_id(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn config() -> SimulationConfig {
        SimulationConfig::build(400.0, 800.0, false)
    }

    #[test]
    fn test_rects_follow_gap() {
        let config = config();
        let o = Obstacle::new(1, 100.0, 300.0, 200.0, &config);
        assert_eq!(o.top_rect(), Rect::new(100.0, 0.0, config.obstacle_width, 200.0));
        let bottom = o.bottom_rect();
        assert_eq!(bottom.y, 400.0);
        assert_eq!(bottom.bottom(), config.ground_top());
        assert_eq!(o.right(), 100.0 + config.obstacle_width);
    }

    #[test]
    fn test_shift_recomputes_rects() {
        let config = config();
        let mut o = Obstacle::new(1, 100.0, 300.0, 200.0, &config);
        o.shift(-30.0, &config);
        assert_eq!(o.x(), 70.0);
        assert_eq!(o.top_rect().x, 70.0);
        assert_eq!(o.bottom_rect().x, 70.0);
    }

    #[test]
    fn test_difficulty_ramp() {
        assert_eq!(difficulty_progress(0.0), 0.0);
        assert_eq!(difficulty_progress(DIFFICULTY_RAMP_SECS), 1.0);
        assert_eq!(difficulty_progress(DIFFICULTY_RAMP_SECS * 4.0), 1.0);
        // Gentler than linear early on
        assert!(difficulty_progress(DIFFICULTY_RAMP_SECS * 0.25) < 0.25);
        let mut last = 0.0;
        for i in 0..=100 {
            let p = difficulty_progress(i as f32);
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn test_gap_height_narrows_and_stays_bounded() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(scheduled_gap_height(&config, 0.0), config.gap_start);
        assert!((scheduled_gap_height(&config, 500.0) - config.gap_min).abs() < 1e-3);
        for t in [0.0, 10.0, 40.0, 75.0, 300.0] {
            for _ in 0..50 {
                let h = roll_gap_height(&config, t, &mut rng);
                assert!(h >= config.gap_min && h <= config.gap_start);
            }
        }
    }

    #[test]
    fn test_gap_center_keeps_gap_inside_play_area() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let h = roll_gap_height(&config, 0.0, &mut rng);
            let y = roll_gap_center(&config, h, &mut rng);
            assert!(y - h / 2.0 >= config.gap_margin);
            assert!(y + h / 2.0 <= config.ground_top() - config.gap_margin);
        }
    }

    #[test]
    fn test_initial_layout_starts_off_screen() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut next_id = 1;
        let pool = initial_layout(&config, &mut rng, &mut next_id);
        assert_eq!(pool.len(), 4);
        assert_eq!(next_id, 5);
        let spacing = config.spacing_at(BASE_SCROLL_SPEED);
        for (i, o) in pool.iter().enumerate() {
            assert!(o.x() > config.width);
            assert_eq!(o.id, i as u32 + 1);
            if i > 0 {
                assert!((o.x() - pool[i - 1].x() - spacing).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_pass_scores_once() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut next_id = 10;
        // Right edge 1px right of the player
        let x = config.player_x + 1.0 - config.obstacle_width;
        let mut pool = vec![Obstacle::new(1, x, 300.0, 200.0, &config)];

        let report = advance_obstacles(&mut pool, &config, 0.0, SIM_DT, &mut rng, &mut next_id);
        assert_eq!(report.scored, 1);
        assert!(pool[0].passed);

        let report = advance_obstacles(&mut pool, &config, 0.0, SIM_DT, &mut rng, &mut next_id);
        assert_eq!(report.scored, 0);
    }

    #[test]
    fn test_recycle_places_behind_rightmost() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut next_id = 10;
        let far_left = -config.obstacle_width - config.recycle_padding - 1.0;
        let mut pool = vec![
            Obstacle::new(1, far_left, 300.0, 200.0, &config),
            Obstacle::new(2, far_left, 300.0, 200.0, &config),
            Obstacle::new(3, 200.0, 300.0, 200.0, &config),
            Obstacle::new(4, 500.0, 300.0, 200.0, &config),
        ];
        let report = advance_obstacles(&mut pool, &config, 0.0, SIM_DT, &mut rng, &mut next_id);
        assert_eq!(report.recycled, 2);

        let spacing = config.spacing_at(scroll_speed(0.0));
        let rightmost = pool[3].x();
        assert!((pool[0].x() - (rightmost + spacing)).abs() < 1e-3);
        assert!((pool[1].x() - (rightmost + 2.0 * spacing)).abs() < 1e-3);
        assert_eq!(pool[0].id, 10);
        assert_eq!(pool[1].id, 11);
        assert!(!pool[0].passed && !pool[1].passed);
    }

    #[test]
    fn test_inactive_obstacles_are_left_alone() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut next_id = 10;
        let mut o = Obstacle::new(1, -500.0, 300.0, 200.0, &config);
        o.active = false;
        let mut pool = vec![o];
        let report = advance_obstacles(&mut pool, &config, 0.0, SIM_DT, &mut rng, &mut next_id);
        assert_eq!(report, AdvanceReport::default());
        assert_eq!(pool[0].x(), -500.0);
        assert_eq!(pool[0].id, 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn recycled_obstacles_never_crowd(seed in any::<u64>(), reduced in any::<bool>()) {
                let config = SimulationConfig::build(400.0, 800.0, reduced);
                let mut rng = Pcg32::seed_from_u64(seed);
                let mut next_id = 1;
                let mut pool = initial_layout(&config, &mut rng, &mut next_id);
                let min_spacing = config.spacing_at(BASE_SCROLL_SPEED);
                let mut seen_ids = std::collections::HashSet::new();
                let mut elapsed = 0.0;
                let mut score = 0;

                // Three simulated minutes
                for _ in 0..(180 * 60) {
                    elapsed += SIM_DT;
                    let report = advance_obstacles(&mut pool, &config, elapsed, SIM_DT, &mut rng, &mut next_id);
                    score += report.scored;

                    let mut xs: Vec<f32> = pool.iter().map(|o| o.x()).collect();
                    xs.sort_by(f32::total_cmp);
                    for pair in xs.windows(2) {
                        prop_assert!(pair[1] - pair[0] >= min_spacing - 0.01);
                    }
                    for o in pool.iter().filter(|o| o.passed) {
                        seen_ids.insert(o.id);
                    }
                }
                prop_assert!(score > 0);
                // Every point belongs to exactly one obstacle instance
                prop_assert_eq!(score as usize, seen_ids.len());
            }
        }
    }
}
