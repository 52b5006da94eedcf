//! Skyward - simulation core for an endless vertical platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (character, platforms, collisions, window, camera)
//! - `config`: Canvas-relative physics tuning and the frame clock
//! - `highscores`: Best-score leaderboard

pub mod config;
pub mod highscores;
pub mod sim;

pub use config::{Config, FrameClock};
pub use highscores::HighScores;

/// Reference dimensions and fixed tuning constants
///
/// Sizes are measured on the reference 600x1160 canvas and get multiplied by
/// [`Config::ratio`] before use.
pub mod consts {
    /// Reference frame rate every per-frame constant is tuned for
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Character sprite box
    pub const CHARACTER_WIDTH: f32 = 48.0;
    pub const CHARACTER_HEIGHT: f32 = 53.0;

    /// Power-up prop box, floating above its host
    pub const POWER_UP_WIDTH: f32 = 35.0;
    pub const POWER_UP_HEIGHT: f32 = 20.0;
    /// Gap between the prop and the top of its host platform
    pub const POWER_UP_LIFT: f32 = 10.0;

    /// Longest run of unstable platforms the randomizer may never reach
    pub const MAX_UNSTABLE_STREAK: usize = 4;
    /// Number of opening picks restricted to starter platforms
    pub const START_UP_BONUS: u32 = 10;

    /// Ticks between a fatal event and the game-over declaration
    pub const GAME_OVER_DELAY_TICKS: u32 = 50;

    /// Stealth platforms blink on this period (frames)
    pub const STEALTH_BLINK_INTERVAL: f32 = 80.0;
    /// Duration of one stealth alpha ease (frames)
    pub const STEALTH_FADE_DURATION: f32 = 20.0;

    /// Dead-zone band of the camera, as fractions of canvas height
    pub const CAMERA_BOX_HIGH: f32 = 0.5;
    pub const CAMERA_BOX_LOW: f32 = 0.92;

    /// The first platform spawns this fraction of a canvas below the character
    pub const FIRST_PLATFORM_DEPTH: f32 = 0.46;
}

/// Horizontal wraparound for a box of width `w` on a canvas of `width`.
///
/// Leaving past the left edge re-enters from the right and vice versa. Both
/// bounds (`-w/2` and `width - w/2`) are fixed points.
#[inline]
pub fn wrap_x(x: f32, w: f32, width: f32) -> f32 {
    let half = w / 2.0;
    if x < -half {
        width - half
    } else if x > width - half {
        -half
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_x_bounds_are_fixed_points() {
        assert_eq!(wrap_x(-24.0, 48.0, 600.0), -24.0);
        assert_eq!(wrap_x(576.0, 48.0, 600.0), 576.0);
        assert_eq!(wrap_x(300.0, 48.0, 600.0), 300.0);
    }

    #[test]
    fn test_wrap_x_crosses_to_opposite_edge() {
        assert_eq!(wrap_x(-25.0, 48.0, 600.0), 576.0);
        assert_eq!(wrap_x(577.0, 48.0, 600.0), -24.0);
    }
}
