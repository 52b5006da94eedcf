//! Session state and the per-frame render snapshot
//!
//! A session owns everything one run needs, including the only RNG, so a
//! seed plus the input sequence reproduces a run exactly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::character::{Character, CharacterView};
use super::platform::PlatformView;
use super::window::Window;
use crate::config::Config;
use crate::consts::GAME_OVER_DELAY_TICKS;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Hurt or fell; the run still animates until the delay runs out
    Dying { remaining_ticks: u32 },
    /// Waiting for a restart request
    GameOver,
}

/// Plain render data for one frame, in screen space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub character: CharacterView,
    /// Lowest first
    pub platforms: Vec<PlatformView>,
    /// Screen y of the best-altitude marker, when on the canvas
    pub ribbon: Option<f32>,
    pub score: u64,
    pub best: Option<u64>,
    pub phase: GamePhase,
}

#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: Config,
    pub(crate) rng: Pcg32,
    pub camera: Camera,
    pub character: Character,
    pub window: Window,
    pub phase: GamePhase,
    /// Frames accumulated since the last reset
    pub rhythm: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Best score seen by this session, folded in when a run ends
    pub best: Option<u64>,
}

impl Session {
    pub fn new(seed: u64, config: Config) -> Self {
        let camera = Camera::new(&config);
        let character = Character::new(&config);
        let mut session = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            camera,
            character,
            window: Window::new(),
            phase: GamePhase::Playing,
            rhythm: 0.0,
            time_ticks: 0,
            best: None,
            config,
        };
        log::info!("Session created with seed {}", seed);
        session.reset();
        session
    }

    /// Seed the ribbon with a previously stored best score
    pub fn with_best(mut self, best: Option<u64>) -> Self {
        self.best = best.filter(|&score| score > 0);
        self
    }

    /// Start a fresh run. The RNG stream carries on, so restarts stay
    /// reproducible from the seed.
    pub fn reset(&mut self) {
        self.camera = Camera::new(&self.config);
        self.character.reset(&self.config, &mut self.camera);
        self.window.reset(&self.config, &self.camera, &mut self.rng);
        self.phase = GamePhase::Playing;
        self.rhythm = 0.0;
        log::info!("Run reset ({} platforms)", self.window.len());
    }

    /// Current run's score, from the highest altitude reached
    pub fn score(&self) -> u64 {
        self.config
            .altitude_to_score(self.character.max_altitude)
            .floor()
            .max(0.0) as u64
    }

    /// Enter the dying phase and fold the score into the best
    pub(crate) fn begin_dying(&mut self) {
        let score = self.score();
        self.best = self.best.max(Some(score)).filter(|&best| best > 0);
        self.phase = GamePhase::Dying {
            remaining_ticks: GAME_OVER_DELAY_TICKS,
        };
        log::debug!("Run ending with score {}", score);
    }

    pub(crate) fn declare_game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        log::info!("Game over: score {} (best {:?})", self.score(), self.best);
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Screen y of the best-altitude marker, if it is on the canvas
    pub fn ribbon(&self) -> Option<f32> {
        let best = self.best?;
        let altitude = self.config.score_to_altitude(best as f32);
        // The marker spans the canvas width; only its height is checked
        let y = self.camera.focus(Vec2::new(0.0, -altitude)).y;
        self.camera.can_fit_in(Vec2::new(0.0, y)).then_some(y)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            character: self.character.view(),
            platforms: self
                .window
                .platforms()
                .map(|p| p.view(&self.camera, &self.config))
                .collect(),
            ribbon: self.ribbon(),
            score: self.score(),
            best: self.best,
            phase: self.phase,
        }
    }

    /// Re-fit the canvas to a new viewport and rescale the whole run
    pub fn on_viewport_changed(&mut self, viewport_width: f32, viewport_height: f32) {
        let old_ratio = self.config.ratio;
        self.config = self.config.fit_viewport(viewport_width, viewport_height);
        let k = self.config.ratio / old_ratio;

        self.camera.on_viewport_changed(&self.config);
        self.character
            .on_viewport_changed(old_ratio, &self.config, &self.camera);
        self.window
            .on_viewport_changed(k, &self.config, &self.camera, &mut self.rng);
        log::info!(
            "Viewport changed: canvas {}x{}, ratio {:.4}",
            self.config.width,
            self.config.height,
            self.config.ratio
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::character::Status;

    #[test]
    fn test_new_session_layout() {
        let session = Session::new(42, Config::default());
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.character.status(), Status::Default);
        assert_eq!(
            session.camera.focal(),
            session.character.world_center()
        );
        assert!(session.window.span() >= session.config.height);
    }

    #[test]
    fn test_score_from_max_altitude() {
        let mut session = Session::new(1, Config::default());
        session.character.max_altitude = 1234.7;
        assert_eq!(session.score(), 1234);

        session.config = session.config.rescaled(0.5);
        assert_eq!(session.score(), 2469);
    }

    #[test]
    fn test_best_folded_when_dying() {
        let mut session = Session::new(1, Config::default()).with_best(Some(300));
        session.character.max_altitude = 150.0;
        session.begin_dying();
        assert_eq!(session.best, Some(300));
        assert_eq!(
            session.phase,
            GamePhase::Dying {
                remaining_ticks: GAME_OVER_DELAY_TICKS
            }
        );

        session.character.max_altitude = 450.0;
        session.begin_dying();
        assert_eq!(session.best, Some(450));
    }

    #[test]
    fn test_zero_score_leaves_no_best() {
        let mut session = Session::new(1, Config::default()).with_best(Some(0));
        assert_eq!(session.best, None);
        session.begin_dying();
        assert_eq!(session.best, None);
        assert_eq!(session.ribbon(), None);
    }

    #[test]
    fn test_ribbon_visibility() {
        let mut session = Session::new(1, Config::default()).with_best(Some(200));
        // Camera centred on altitude 0: altitude 200 sits 200px above centre
        assert_eq!(session.ribbon(), Some(380.0));

        session.best = Some(5000);
        assert_eq!(session.ribbon(), None);
    }

    #[test]
    fn test_ribbon_stays_during_shake() {
        let mut session = Session::new(1, Config::default()).with_best(Some(200));
        session.camera.prepare_shake();
        for _ in 0..20 {
            session.camera.shake(1.0, &mut session.rng);
            let ribbon = session.ribbon();
            assert!(ribbon.is_some());
            assert!((ribbon.unwrap_or_default() - 380.0).abs() <= 4.0);
        }
    }

    #[test]
    fn test_snapshot_lists_window() {
        let session = Session::new(8, Config::default());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.platforms.len(), session.window.len());
        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(snapshot.character.status, Status::Default);
        assert!(serde_json::to_string(&snapshot).is_ok());
    }

    #[test]
    fn test_viewport_change_rescales_run() {
        let mut session = Session::new(3, Config::default());
        session.character.max_altitude = 400.0;
        let score = session.score();

        // Exactly half the reference canvas plus the small-screen padding
        session.on_viewport_changed(300.0, 590.0);
        assert_eq!(session.config.ratio, 0.5);
        assert_eq!(session.config.height, 580.0);
        assert_eq!(session.character.size, Vec2::new(24.0, 27.0));
        assert_eq!(session.score(), score);
        assert!(session.window.span() >= session.config.height);
    }
}
