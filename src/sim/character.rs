//! The climbing character: physics, status machine, landing prediction
//!
//! Screen y grows downward, so negative vertical velocity means rising.
//! `altitude` is the height of the character's centre and grows as it climbs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::clip::{ClipEnd, ClipPlayer};
use super::collision::Aabb;
use crate::config::Config;
use crate::consts::{CHARACTER_HEIGHT, CHARACTER_WIDTH};
use crate::wrap_x;

/// Exactly one status is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Default,
    /// Rising at constant speed, gravity ignored
    Powering,
    /// Frozen in place by a hazard
    Hurting,
    /// Dropped below every platform
    Falling,
}

impl Status {
    /// A caller may end the run once a terminal status has persisted
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Hurting | Status::Falling)
    }

    /// Whether horizontal input is read in this status
    #[inline]
    pub fn steerable(self) -> bool {
        matches!(self, Status::Default | Status::Powering)
    }
}

/// Where the character would be next tick if nothing is hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Top-left corner in world space
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub altitude: f32,
}

impl Prediction {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }
}

/// Render-facing state of the character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterView {
    pub position: Vec2,
    pub size: Vec2,
    pub status: Status,
    pub facing_left: bool,
    /// Frame of the status clip, `None` while no clip plays
    pub frame: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Left edge (world x equals screen x)
    pub x: f32,
    /// Top edge on screen
    pub y: f32,
    pub size: Vec2,
    pub velocity: Vec2,
    pub altitude: f32,
    /// Highest altitude reached this run; the score basis
    pub max_altitude: f32,
    pub facing_left: bool,
    status: Status,
    /// Frames spent in the current status
    status_frames: f32,
    /// Next update keeps the altitude pinned by a landing
    overwrite: bool,
    power_clip: ClipPlayer,
    fall_clip: ClipPlayer,
    hurt_clip: ClipPlayer,
}

impl Character {
    pub fn new(config: &Config) -> Self {
        let size = Vec2::new(
            config.relative_pixel(CHARACTER_WIDTH),
            config.relative_pixel(CHARACTER_HEIGHT),
        );
        Self {
            x: (config.width - size.x) / 2.0,
            y: (config.height - size.y) / 2.0,
            size,
            velocity: Vec2::ZERO,
            altitude: 0.0,
            max_altitude: 0.0,
            facing_left: false,
            status: Status::Default,
            status_frames: 0.0,
            overwrite: false,
            power_clip: ClipPlayer::looping(3, 6.0),
            fall_clip: ClipPlayer::looping(2, 6.0),
            hurt_clip: ClipPlayer::new(8, 4.0, ClipEnd::Stay),
        }
    }

    /// Back to the spawn point, and ask for the camera's instant attention
    pub fn reset(&mut self, config: &Config, camera: &mut Camera) {
        *self = Self::new(config);
        camera.move_to(self.world_center());
    }

    /// Rescale to a resized canvas, keeping relative position
    pub fn on_viewport_changed(&mut self, old_ratio: f32, config: &Config, camera: &Camera) {
        let k = config.ratio / old_ratio;
        self.size = Vec2::new(
            config.relative_pixel(CHARACTER_WIDTH),
            config.relative_pixel(CHARACTER_HEIGHT),
        );
        self.x *= k;
        self.velocity *= k;
        self.altitude *= k;
        self.max_altitude *= k;
        self.y = camera.focus(self.world_center()).y - self.size.y / 2.0;
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn status_frames(&self) -> f32 {
        self.status_frames
    }

    pub fn is_overwriting(&self) -> bool {
        self.overwrite
    }

    /// Centre point in world space
    pub fn world_center(&self) -> Vec2 {
        Vec2::new(self.x + self.size.x / 2.0, -self.altitude)
    }

    fn enter(&mut self, status: Status) {
        log::debug!("Character {:?} -> {:?} at altitude {:.1}", self.status, status, self.altitude);
        self.status = status;
        self.status_frames = 0.0;
    }

    /// Read the horizontal axis (`-1..=1`) and turn to face the movement
    pub fn steer(&mut self, axis: f32, config: &Config) {
        if !self.status.steerable() {
            return;
        }
        self.velocity.x = axis.clamp(-1.0, 1.0) * config.move_velocity;
        // No input leaves the facing as is
        if self.velocity.x < 0.0 {
            self.facing_left = true;
        } else if self.velocity.x > 0.0 {
            self.facing_left = false;
        }
    }

    /// Vertical velocity after one more tick under the current status
    fn next_velocity_y(&self, delta_frames: f32, config: &Config) -> f32 {
        match self.status {
            Status::Default => {
                (self.velocity.y + config.gravity * delta_frames).min(config.max_falling_velocity)
            }
            Status::Powering => config.power_up_velocity,
            Status::Falling => self.velocity.y + config.gravity * delta_frames,
            Status::Hurting => self.velocity.y,
        }
    }

    /// Next tick's box if no landing happens. Pure: nothing is mutated.
    pub fn predict(&self, delta_frames: f32, config: &Config) -> Prediction {
        let velocity_y = self.next_velocity_y(delta_frames, config);
        let altitude = match self.status {
            Status::Hurting => self.altitude,
            _ => self.altitude - (self.velocity.y + velocity_y) / 2.0 * delta_frames,
        };
        let x = if self.status.steerable() {
            self.x + self.velocity.x * delta_frames
        } else {
            self.x
        };
        Prediction {
            position: Vec2::new(x, -altitude - self.size.y / 2.0),
            velocity: Vec2::new(self.velocity.x, velocity_y),
            size: self.size,
            altitude,
        }
    }

    /// Pin the next update on top of a platform at `platform_altitude`
    pub fn overwrite_next_altitude(&mut self, prediction: &Prediction, platform_altitude: f32) {
        self.x = prediction.position.x;
        self.altitude = platform_altitude + self.size.y / 2.0;
        self.overwrite = true;
    }

    fn lead_camera(&mut self, camera: &mut Camera) {
        self.y = camera.follow(self.world_center()).y - self.size.y / 2.0;
    }

    /// Commit one tick of motion
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        delta_frames: f32,
        config: &Config,
        camera: &mut Camera,
        rng: &mut R,
    ) {
        if self.overwrite {
            self.x = wrap_x(self.x, self.size.x, config.width);
            self.lead_camera(camera);
            self.overwrite = false;
            return;
        }

        self.status_frames += delta_frames;
        match self.status {
            Status::Hurting => {
                self.hurt_clip.advance(delta_frames);
                camera.shake(delta_frames, rng);
                return;
            }
            Status::Powering => {
                self.power_clip.advance(delta_frames);
            }
            Status::Falling => {
                self.fall_clip.advance(delta_frames);
            }
            Status::Default => {}
        }

        // Trapezoidal integration of the vertical motion
        let velocity_y = self.next_velocity_y(delta_frames, config);
        self.altitude -= (self.velocity.y + velocity_y) / 2.0 * delta_frames;
        self.velocity.y = velocity_y;
        self.max_altitude = self.max_altitude.max(self.altitude);
        self.lead_camera(camera);

        if self.status.steerable() {
            self.x = wrap_x(self.x + self.velocity.x * delta_frames, self.size.x, config.width);
        }

        if self.status == Status::Powering && self.status_frames >= config.power_up_duration {
            self.enter(Status::Default);
        }
    }

    /// Stepped on a platform
    pub fn jump(&mut self, config: &Config) {
        self.velocity.y = config.jump_velocity;
    }

    /// Stepped on a spring
    pub fn bounce(&mut self, config: &Config) {
        self.velocity.y = config.bounce_velocity;
    }

    /// Picked up a power-up; restarts the duration if already powering
    pub fn power_up(&mut self) -> bool {
        if !self.status.steerable() {
            log::warn!("power_up ignored while {:?}", self.status);
            return false;
        }
        self.power_clip.reset();
        self.enter(Status::Powering);
        true
    }

    /// Touched a hazard. The caller arms the camera shake.
    pub fn hurt(&mut self) -> bool {
        if self.status.is_terminal() {
            log::warn!("hurt ignored while {:?}", self.status);
            return false;
        }
        self.hurt_clip.reset();
        self.enter(Status::Hurting);
        true
    }

    /// No platform left underneath
    pub fn fall(&mut self) -> bool {
        if self.status.is_terminal() {
            log::warn!("fall ignored while {:?}", self.status);
            return false;
        }
        self.fall_clip.reset();
        self.enter(Status::Falling);
        true
    }

    pub fn view(&self) -> CharacterView {
        let frame = match self.status {
            Status::Default => None,
            Status::Powering => self.power_clip.frame(),
            Status::Hurting => self.hurt_clip.frame(),
            Status::Falling => self.fall_clip.frame(),
        };
        CharacterView {
            position: Vec2::new(self.x, self.y),
            size: self.size,
            status: self.status,
            facing_left: self.facing_left,
            frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (Config, Camera, Character, Pcg32) {
        let config = Config::default();
        let mut camera = Camera::new(&config);
        let mut character = Character::new(&config);
        character.reset(&config, &mut camera);
        (config, camera, character, Pcg32::seed_from_u64(1))
    }

    #[test]
    fn test_spawns_centered() {
        let (_, camera, character, _) = setup();
        assert_eq!(character.x, 276.0);
        assert_eq!(character.altitude, 0.0);
        assert_eq!(camera.focal(), Vec2::new(300.0, 0.0));
        assert_eq!(character.status(), Status::Default);
    }

    #[test]
    fn test_gravity_caps_falling_speed() {
        let (config, mut camera, mut character, mut rng) = setup();
        for _ in 0..100 {
            character.update(1.0, &config, &mut camera, &mut rng);
        }
        assert_eq!(character.velocity.y, config.max_falling_velocity);
        assert!(character.altitude < 0.0);
        assert_eq!(character.max_altitude, 0.0);
    }

    #[test]
    fn test_trapezoidal_integration() {
        let (config, mut camera, mut character, mut rng) = setup();
        character.velocity.y = 4.0;
        character.update(1.0, &config, &mut camera, &mut rng);
        // Average of 4.0 and 4.52
        assert!((character.altitude - -4.26).abs() < 1e-5);
    }

    #[test]
    fn test_predict_matches_free_update() {
        let (config, mut camera, mut character, mut rng) = setup();
        character.velocity = Vec2::new(5.0, -3.0);
        let prediction = character.predict(1.5, &config);
        let before = character.clone();
        character.update(1.5, &config, &mut camera, &mut rng);

        assert_eq!(before.altitude, 0.0);
        assert!((prediction.altitude - character.altitude).abs() < 1e-5);
        assert!((prediction.position.x - character.x).abs() < 1e-5);
        assert_eq!(prediction.velocity.y, character.velocity.y);
    }

    #[test]
    fn test_overwrite_pins_next_update() {
        let (config, mut camera, mut character, mut rng) = setup();
        character.velocity.y = 5.0;
        let prediction = character.predict(1.0, &config);
        character.overwrite_next_altitude(&prediction, -80.0);
        character.jump(&config);
        character.update(1.0, &config, &mut camera, &mut rng);

        assert_eq!(character.altitude, -80.0 + 26.5);
        assert_eq!(character.velocity.y, config.jump_velocity);
        assert!(!character.is_overwriting());

        // Physics resumes with the jump velocity
        character.update(1.0, &config, &mut camera, &mut rng);
        assert!(character.altitude > -80.0 + 26.5);
    }

    #[test]
    fn test_overwrite_wraps_horizontally() {
        let (config, mut camera, mut character, mut rng) = setup();
        let mut prediction = character.predict(1.0, &config);
        prediction.position.x = -30.0;
        character.overwrite_next_altitude(&prediction, 0.0);
        character.update(1.0, &config, &mut camera, &mut rng);
        assert_eq!(character.x, 576.0);
    }

    #[test]
    fn test_steer_flips_facing() {
        let (config, _, mut character, _) = setup();
        character.steer(-1.0, &config);
        assert!(character.facing_left);
        character.steer(0.0, &config);
        assert!(character.facing_left);
        character.steer(0.5, &config);
        assert!(!character.facing_left);
        assert_eq!(character.velocity.x, 5.0);
    }

    #[test]
    fn test_power_up_expires() {
        let (config, mut camera, mut character, mut rng) = setup();
        assert!(character.power_up());
        for _ in 0..98 {
            character.update(1.0, &config, &mut camera, &mut rng);
            assert_eq!(character.status(), Status::Powering);
            assert_eq!(character.velocity.y, config.power_up_velocity);
        }
        character.update(1.0, &config, &mut camera, &mut rng);
        assert_eq!(character.status(), Status::Default);
        assert!(character.max_altitude > 0.0);
    }

    #[test]
    fn test_hurting_freezes_motion() {
        let (config, mut camera, mut character, mut rng) = setup();
        character.steer(1.0, &config);
        character.velocity.y = 6.0;
        assert!(character.hurt());
        camera.prepare_shake();

        let (x, altitude) = (character.x, character.altitude);
        character.steer(-1.0, &config);
        character.update(1.0, &config, &mut camera, &mut rng);
        assert_eq!((character.x, character.altitude), (x, altitude));
        assert!(character.status().is_terminal());

        // Terminal: further events are ignored
        assert!(!character.fall());
        assert!(!character.power_up());
        assert_eq!(character.status(), Status::Hurting);
    }

    #[test]
    fn test_falling_ignores_cap_and_input() {
        let (config, mut camera, mut character, mut rng) = setup();
        assert!(character.fall());
        let x = character.x;
        character.steer(1.0, &config);
        for _ in 0..100 {
            character.update(1.0, &config, &mut camera, &mut rng);
        }
        assert!(character.velocity.y > config.max_falling_velocity);
        assert_eq!(character.x, x);
        assert_eq!(character.view().status, Status::Falling);
    }

    proptest! {
        #[test]
        fn prop_integration_stays_finite(
            deltas in proptest::collection::vec(0.0f32..4.0, 1..200),
            axis in -1.0f32..=1.0,
            powered in any::<bool>(),
        ) {
            let (config, mut camera, mut character, mut rng) = setup();
            if powered {
                character.power_up();
            }
            for delta in deltas {
                character.steer(axis, &config);
                character.update(delta, &config, &mut camera, &mut rng);
                prop_assert!(character.x.is_finite() && character.y.is_finite());
                prop_assert!(character.velocity.is_finite());
                prop_assert!(character.altitude.is_finite());
                prop_assert!(character.x >= -character.size.x / 2.0);
                prop_assert!(character.x <= config.width - character.size.x / 2.0);
            }
        }
    }
}
