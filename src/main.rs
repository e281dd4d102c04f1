//! Flap Sim headless driver
//!
//! Plays a few autopilot sessions at a jittery simulated frame rate, stores
//! each result and prints the leaderboard. Useful for soak-testing the engine
//! without a renderer.
//!
//! Usage: `flap-sim [sessions] [settings.json]`

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use flap_sim::highscores::format_duration;
use flap_sim::{Engine, JsonFileStore, Leaderboard, ResultStore, SessionResult, Settings};

/// Play area of a typical phone in portrait
const PLAY_WIDTH: f32 = 400.0;
const PLAY_HEIGHT: f32 = 800.0;
/// Give up on a session after this many frames (ten simulated minutes at 60 fps)
const MAX_FRAMES: u32 = 60 * 60 * 10;

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let sessions: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    let settings = args
        .next()
        .map(|p| Settings::load(&PathBuf::from(p)))
        .unwrap_or_default();

    let mut store = JsonFileStore::new(&settings.history_path);
    let finished: Rc<RefCell<Vec<SessionResult>>> = Rc::default();
    let sink = Rc::clone(&finished);
    let on_game_over = move |result: SessionResult| sink.borrow_mut().push(result);

    let mut engine = match settings.seed {
        Some(seed) => Engine::seeded(
            PLAY_WIDTH,
            PLAY_HEIGHT,
            settings.reduced_motion,
            seed,
            on_game_over,
        ),
        None => Engine::new(PLAY_WIDTH, PLAY_HEIGHT, settings.reduced_motion, on_game_over),
    };
    let mut frame_rng = Pcg32::seed_from_u64(settings.seed.unwrap_or(0));

    for session in 1..=sessions {
        match Leaderboard::load(&store, settings.leaderboard_size) {
            Ok(board) => match board.best() {
                Some(best) => log::info!(
                    "Session {}: best so far {} in {}",
                    session,
                    best.score,
                    format_duration(best.duration_secs)
                ),
                None => log::info!("Session {}: no previous results", session),
            },
            Err(e) => log::warn!("Could not load history: {}", e),
        }
        engine.start();
        let mut frames = 0;
        while engine.is_running() && frames < MAX_FRAMES {
            if autopilot_wants_flap(&engine) {
                engine.flap();
            }
            // 50-70 fps with the occasional stalled frame
            let dt = if frame_rng.random_ratio(1, 200) {
                0.25
            } else {
                frame_rng.random_range(1.0 / 70.0..1.0 / 50.0)
            };
            engine.step(dt);
            frames += 1;
        }
        if engine.is_running() {
            log::info!("Session {} hit the frame limit, stopping", session);
            engine.stop();
        }

        for result in finished.borrow_mut().drain(..) {
            if let Err(e) = store.save(&result) {
                log::warn!("Could not save session result: {}", e);
            }
        }
    }

    let board = Leaderboard::load(&store, settings.leaderboard_size).unwrap_or_else(|e| {
        log::warn!("Could not load history: {}", e);
        Leaderboard::new(settings.leaderboard_size)
    });
    println!("{:>4}  {:>5}  {:>6}  started", "rank", "score", "time");
    for (i, entry) in board.entries.iter().enumerate() {
        println!(
            "{:>4}  {:>5}  {:>6}  {}",
            i + 1,
            entry.score,
            format_duration(entry.duration_secs),
            entry.started_at
        );
    }
}

/// Flap when the player sinks below the middle of the next gap
fn autopilot_wants_flap(engine: &Engine) -> bool {
    let snapshot = engine.snapshot();
    let config = engine.config();
    let circle = snapshot.collision_circle;

    let target = snapshot
        .obstacles
        .iter()
        .filter(|o| o.x + config.obstacle_width >= config.player_x)
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .map(|o| o.gap_y + o.gap_height * 0.15)
        .unwrap_or(config.ground_top() / 2.0);

    circle.center.y > target && snapshot.player.vy > -100.0
}
