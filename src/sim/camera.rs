//! Vertical-follow camera with a dead-zone and hurt shake
//!
//! World space shares the screen's axes (y grows downward, `y = -altitude`).
//! Screen position is `world - focal + canvas / 2`. The camera never moves
//! horizontally except while shaking.
//!
//! Points passed in must be finite; the camera does not sanitise them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::consts::{CAMERA_BOX_HIGH, CAMERA_BOX_LOW};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Shake {
    /// Focal point to restore afterwards
    origin: Vec2,
    frames: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    width: f32,
    height: f32,
    focal: Vec2,
    /// Screen y above which the target pulls the camera up
    box_high: f32,
    /// Screen y below which the target pulls the camera down
    box_low: f32,
    shake: Option<Shake>,
    shake_duration: f32,
    shake_delta: Vec2,
}

impl Camera {
    pub fn new(config: &Config) -> Self {
        let mut camera = Self {
            width: config.width,
            height: config.height,
            focal: Vec2::ZERO,
            box_high: 0.0,
            box_low: 0.0,
            shake: None,
            shake_duration: 0.0,
            shake_delta: Vec2::ZERO,
        };
        camera.derive_geometry(config);
        camera
    }

    fn derive_geometry(&mut self, config: &Config) {
        self.width = config.width;
        self.height = config.height;
        self.box_high = (self.height * CAMERA_BOX_HIGH).floor();
        self.box_low = (self.height * CAMERA_BOX_LOW).floor();
        self.shake_duration = config.camera_shake_duration;
        self.shake_delta = Vec2::new(config.camera_shake_delta_x, config.camera_shake_delta_y);
    }

    /// Canvas resized: keep the focal point at the same relative spot
    pub fn on_viewport_changed(&mut self, config: &Config) {
        let scale = Vec2::new(config.width / self.width, config.height / self.height);
        self.focal *= scale;
        if let Some(shake) = &mut self.shake {
            shake.origin *= scale;
        }
        self.derive_geometry(config);
    }

    /// Track a target, nudging the camera just enough to keep it in the dead-zone
    pub fn follow(&mut self, point: Vec2) -> Vec2 {
        let relative = self.focus(point);
        if relative.y < self.box_high {
            self.focal.y -= self.box_high - relative.y;
        } else if relative.y > self.box_low {
            self.focal.y += relative.y - self.box_low;
        }
        self.focus(point)
    }

    /// World to screen, without moving the camera
    #[inline]
    pub fn focus(&self, point: Vec2) -> Vec2 {
        point - self.focal + Vec2::new(self.width, self.height) / 2.0
    }

    /// Snap the focal point onto `point`
    pub fn move_to(&mut self, point: Vec2) -> Vec2 {
        self.focal = point;
        self.focus(point)
    }

    /// Whether a screen position lies on the canvas
    pub fn can_fit_in(&self, relative: Vec2) -> bool {
        relative.x >= 0.0 && relative.x < self.width && relative.y >= 0.0 && relative.y < self.height
    }

    pub fn focal(&self) -> Vec2 {
        self.focal
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    pub fn prepare_shake(&mut self) {
        self.shake = Some(Shake {
            origin: self.focal,
            frames: 0.0,
        });
    }

    /// Jitter the focal point around its snapshot until the shake expires
    pub fn shake<R: Rng + ?Sized>(&mut self, delta_frames: f32, rng: &mut R) {
        let Some(shake) = &mut self.shake else {
            return;
        };
        if shake.frames >= self.shake_duration {
            self.focal = shake.origin;
            self.shake = None;
            return;
        }
        shake.frames += delta_frames;
        let jitter = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
        self.focal = shake.origin + self.shake_delta * jitter;
    }

    /// Dead-zone band `(high, low)` in screen y
    pub fn dead_zone(&self) -> (f32, f32) {
        (self.box_high, self.box_low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn camera() -> Camera {
        let mut camera = Camera::new(&Config::default());
        camera.move_to(Vec2::new(300.0, 0.0));
        camera
    }

    #[test]
    fn test_focus_centers_focal_point() {
        let camera = camera();
        assert_eq!(camera.focus(Vec2::new(300.0, 0.0)), Vec2::new(300.0, 580.0));
        assert_eq!(camera.dead_zone(), (580.0, 1067.0));
    }

    #[test]
    fn test_follow_inside_dead_zone_does_not_move() {
        let mut camera = camera();
        let screen = camera.follow(Vec2::new(300.0, 200.0));
        assert_eq!(screen.y, 780.0);
        assert_eq!(camera.focal(), Vec2::new(300.0, 0.0));
    }

    #[test]
    fn test_follow_soft_clamps_to_boundary() {
        let mut camera = camera();
        // 100 above the top of the dead-zone
        let screen = camera.follow(Vec2::new(300.0, -100.0));
        assert_eq!(screen.y, 580.0);
        assert_eq!(camera.focal().y, -100.0);

        // Below the bottom boundary
        let screen = camera.follow(Vec2::new(300.0, 500.0));
        assert_eq!(screen.y, 1067.0);
    }

    #[test]
    fn test_can_fit_in() {
        let camera = camera();
        assert!(camera.can_fit_in(Vec2::new(0.0, 0.0)));
        assert!(!camera.can_fit_in(Vec2::new(600.0, 10.0)));
        assert!(!camera.can_fit_in(Vec2::new(10.0, -1.0)));
    }

    #[test]
    fn test_shake_restores_focal_point() {
        let mut camera = camera();
        let mut rng = Pcg32::seed_from_u64(7);
        camera.prepare_shake();
        let origin = camera.focal();

        for _ in 0..22 {
            camera.shake(1.0, &mut rng);
            let offset = camera.focal() - origin;
            assert!(offset.x.abs() <= 1.0 && offset.y.abs() <= 2.0);
        }
        assert!(camera.is_shaking());
        camera.shake(1.0, &mut rng);
        assert!(!camera.is_shaking());
        assert_eq!(camera.focal(), origin);
    }

    #[test]
    fn test_viewport_change_rescales_focal() {
        let mut camera = camera();
        camera.follow(Vec2::new(300.0, -400.0));
        let half = Config::default().rescaled(0.5);
        camera.on_viewport_changed(&half);
        assert_eq!(camera.focal(), Vec2::new(150.0, -200.0));
        assert_eq!(camera.dead_zone(), (290.0, 533.0));
    }
}
