//! Physics tuning and canvas geometry
//!
//! Every per-frame constant is tuned for a 60 FPS reference machine on a
//! 600x1160 canvas. Resizable values scale with the canvas ratio; frame
//! durations and probabilities do not.

use serde::{Deserialize, Serialize};

use crate::consts::REFERENCE_FPS;

/// Simulation tuning, scaled to the current canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Canvas ===
    pub width: f32,
    pub height: f32,
    /// Scale relative to the reference canvas
    pub ratio: f32,

    // === Character physics (screen y grows downward) ===
    pub gravity: f32,
    pub move_velocity: f32,
    pub jump_velocity: f32,
    pub bounce_velocity: f32,
    pub power_up_velocity: f32,
    /// Faster than this, the character could fall through a platform between frames
    pub max_falling_velocity: f32,

    // === Platforms ===
    /// Horizontal padding between spawned platforms and the canvas edges
    pub platform_padding: f32,
    /// Vertical gap between two consecutive platforms; must be positive
    pub platform_gap: f32,
    /// Patrol speed of moving platforms and slimes
    pub platform_move_speed: f32,
    pub power_up_joggle_distance: f32,
    pub slime_joggle_distance: f32,
    /// Falling is declared once the character is this far from every platform
    pub falling_threshold: f32,

    // === Camera ===
    pub camera_shake_delta_x: f32,
    pub camera_shake_delta_y: f32,

    // === Unscaled ===
    /// How many frames a power up lasts
    pub power_up_duration: f32,
    /// Chance of a power up prop appearing on an eligible platform, in `0..=1`
    pub power_up_chance: f64,
    pub power_up_joggle_duration: f32,
    pub slime_joggle_duration: f32,
    /// How many frames the camera shakes when the character is hurt
    pub camera_shake_duration: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 1160.0,
            ratio: 1.0,

            gravity: 0.52,
            move_velocity: 10.0,
            jump_velocity: -22.0,
            bounce_velocity: -39.0,
            power_up_velocity: -39.0,
            max_falling_velocity: 14.0,

            platform_padding: 15.0,
            platform_gap: 110.0,
            platform_move_speed: 1.5,
            power_up_joggle_distance: 4.0,
            slime_joggle_distance: 5.0,
            falling_threshold: 100.0,

            camera_shake_delta_x: 2.0,
            camera_shake_delta_y: 4.0,

            power_up_duration: 99.0,
            power_up_chance: 0.15,
            power_up_joggle_duration: 12.0,
            slime_joggle_duration: 12.0,
            camera_shake_duration: 22.0,
        }
    }
}

impl Config {
    /// Rescale every resizable field to `ratio`. Integer fields are rounded.
    pub fn rescaled(&self, ratio: f32) -> Self {
        let k = ratio / self.ratio;
        Self {
            width: (self.width * k).round(),
            height: (self.height * k).round(),
            ratio,

            gravity: self.gravity * k,
            move_velocity: self.move_velocity * k,
            jump_velocity: self.jump_velocity * k,
            bounce_velocity: self.bounce_velocity * k,
            power_up_velocity: self.power_up_velocity * k,
            max_falling_velocity: self.max_falling_velocity * k,

            platform_padding: (self.platform_padding * k).round(),
            platform_gap: (self.platform_gap * k).round(),
            platform_move_speed: self.platform_move_speed * k,
            power_up_joggle_distance: self.power_up_joggle_distance * k,
            slime_joggle_distance: self.slime_joggle_distance * k,
            falling_threshold: (self.falling_threshold * k).round(),

            camera_shake_delta_x: self.camera_shake_delta_x * k,
            camera_shake_delta_y: self.camera_shake_delta_y * k,

            ..self.clone()
        }
    }

    /// Fit the canvas into a viewport, keeping the reference aspect ratio
    pub fn fit_viewport(&self, viewport_width: f32, viewport_height: f32) -> Self {
        let reference_width = self.width / self.ratio;
        let reference_height = self.height / self.ratio;
        let padding = if viewport_height < 1100.0 { 10.0 } else { 54.0 };
        let vertical = (viewport_height - padding) / reference_height;
        let horizontal = viewport_width / reference_width;
        let ratio = vertical.min(horizontal);
        log::info!(
            "Viewport ({}, {}) -> ratio {:.4}",
            viewport_width,
            viewport_height,
            ratio
        );
        self.rescaled(ratio)
    }

    /// Scale a reference-canvas length to this canvas
    #[inline]
    pub fn relative_pixel(&self, px: f32) -> f32 {
        (px * self.ratio).round()
    }

    /// Convert the character's altitude to a canvas-independent score
    #[inline]
    pub fn altitude_to_score(&self, altitude: f32) -> f32 {
        altitude / self.ratio
    }

    #[inline]
    pub fn score_to_altitude(&self, score: f32) -> f32 {
        score * self.ratio
    }

    /// Parse and validate; values the simulation cannot run on are rejected
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        if let Err(reason) = config.validate() {
            log::warn!("Rejected config: {}", reason);
            return Err(<serde_json::Error as serde::de::Error>::custom(reason));
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("ratio", self.ratio),
            ("platform_gap", self.platform_gap),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be positive, got {value}"));
            }
        }
        if !(0.0..=1.0).contains(&self.power_up_chance) {
            return Err(format!(
                "power_up_chance must lie in [0, 1], got {}",
                self.power_up_chance
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// FPS refresh interval (ms)
const FPS_UPDATE_INTERVAL: f64 = 200.0;

/// Turns wall-clock timestamps into normalized frame deltas
///
/// A delta of 1.0 is one frame at [`REFERENCE_FPS`], whatever the real frame
/// timing. With calibration disabled every call counts as exactly one frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    calibrated: bool,
    then: Option<f64>,
    last_fps_update: f64,
    frames_since_update: u32,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            calibrated: true,
            then: None,
            last_fps_update: 0.0,
            frames_since_update: 0,
            fps: 0,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed frames since the previous call (`now` in milliseconds)
    pub fn elapsed_frames(&mut self, now: f64) -> f32 {
        let Some(then) = self.then else {
            self.then = Some(now);
            self.last_fps_update = now;
            self.frames_since_update = 0;
            return 1.0;
        };

        self.frames_since_update += 1;
        let since_update = now - self.last_fps_update;
        if since_update >= FPS_UPDATE_INTERVAL {
            self.fps = (1000.0 / (since_update / self.frames_since_update as f64)).round() as u32;
            self.last_fps_update = now;
            self.frames_since_update = 0;
        }

        self.then = Some(now);
        if self.calibrated {
            ((now - then) * REFERENCE_FPS as f64 / 1000.0) as f32
        } else {
            1.0
        }
    }

    /// Most recent measured frame rate
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Toggle frame-rate calibration, returning the new state
    pub fn toggle_calibration(&mut self) -> bool {
        if !self.calibrated {
            // Stale baseline would count the whole disabled stretch as one delta
            self.then = None;
        }
        self.calibrated = !self.calibrated;
        self.calibrated
    }
}
