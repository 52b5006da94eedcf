//! Skyward headless runner
//!
//! Plays seeded runs with a simple autopilot and logs the outcome.
//! Usage: `skyward [seed] [runs]`

use skyward::highscores::format_age;
use skyward::sim::{PlatformKind, Session, TickInput, tick};
use skyward::{Config, FrameClock, HighScores};

/// Frame budget per run before the autopilot gives up
const MAX_TICKS_PER_RUN: u64 = 60 * 60 * 5;

/// Steer toward the safest platform under the character
fn autopilot(session: &Session) -> TickInput {
    let character = &session.character;
    let centre = character.x + character.size.x / 2.0;
    let feet = character.altitude - character.size.y / 2.0;

    let target = session
        .window
        .platforms()
        .filter(|p| p.altitude <= feet && !p.is_spent())
        .filter(|p| !matches!(p.kind(), PlatformKind::Thorn | PlatformKind::Cloud))
        .map(|p| p.x + p.size.x / 2.0)
        .min_by(|a, b| (a - centre).abs().total_cmp(&(b - centre).abs()));

    let horizontal = target.map_or(0.0, |x| ((x - centre) / 40.0).clamp(-1.0, 1.0));
    TickInput {
        horizontal,
        restart: false,
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let runs: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    log::info!("Skyward (headless) starting with seed {}", seed);

    let config = Config::default();
    let mut session = Session::new(seed, config);
    let mut scores = HighScores::new();
    let mut clock = FrameClock::new();
    let mut now = 0.0;

    for run in 1..=runs {
        let start = session.time_ticks;
        while !session.is_game_over() && session.time_ticks - start < MAX_TICKS_PER_RUN {
            let delta_frames = clock.elapsed_frames(now);
            let input = autopilot(&session);
            tick(&mut session, &input, delta_frames);
            now += 1000.0 / 60.0;
        }

        let score = session.score();
        match scores.add_score(score, now) {
            Some(rank) => log::info!("Run {}: score {} (rank {})", run, score, rank),
            None => log::info!("Run {}: score {}", run, score),
        }

        if session.is_game_over() {
            let restart = TickInput {
                restart: true,
                ..Default::default()
            };
            tick(&mut session, &restart, 0.0);
        } else {
            // Frame budget ran out mid-run
            session.reset();
        }
    }

    for (rank, entry) in scores.entries.iter().enumerate() {
        println!("{:>2}. {:>6}  {}", rank + 1, entry.score, format_age(now, entry.timestamp));
    }
    match scores.to_json() {
        Ok(json) => log::debug!("Leaderboard: {}", json),
        Err(e) => log::warn!("Leaderboard not serializable: {}", e),
    }
}
