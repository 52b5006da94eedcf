//! Animation clips as plain data
//!
//! A renderer samples [`ClipPlayer::frame`] to pick a sprite; gameplay only
//! ever reads the frame index (the slime's aggression depends on it).

use serde::{Deserialize, Serialize};

/// What a clip shows after its last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipEnd {
    /// Start over from the first frame
    Loop,
    /// Hold the last frame
    Stay,
    /// Show nothing
    Vanish,
}

/// Frame index player for a fixed-length sprite sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlayer {
    frame_count: usize,
    /// Frames each sprite is shown
    clip_duration: f32,
    end: ClipEnd,
    elapsed: f32,
}

impl ClipPlayer {
    pub fn new(frame_count: usize, clip_duration: f32, end: ClipEnd) -> Self {
        debug_assert!(frame_count > 0 && clip_duration > 0.0);
        Self {
            frame_count,
            clip_duration,
            end,
            elapsed: 0.0,
        }
    }

    pub fn looping(frame_count: usize, clip_duration: f32) -> Self {
        Self::new(frame_count, clip_duration, ClipEnd::Loop)
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, delta_frames: f32) {
        self.elapsed += delta_frames;
        if self.end == ClipEnd::Loop {
            self.elapsed %= self.duration();
        }
    }

    /// Total length of one pass
    #[inline]
    pub fn duration(&self) -> f32 {
        self.clip_duration * self.frame_count as f32
    }

    pub fn is_finished(&self) -> bool {
        self.end != ClipEnd::Loop && self.elapsed >= self.duration()
    }

    /// Sprite index currently showing, `None` once a vanishing clip ended
    pub fn frame(&self) -> Option<usize> {
        let index = (self.elapsed / self.clip_duration).floor() as usize;
        if index < self.frame_count {
            return Some(index);
        }
        match self.end {
            ClipEnd::Loop => Some(index % self.frame_count),
            ClipEnd::Stay => Some(self.frame_count - 1),
            ClipEnd::Vanish => None,
        }
    }

    /// Jump to the start of `index`
    pub fn seek(&mut self, index: usize) {
        self.elapsed = self.clip_duration * index.min(self.frame_count) as f32;
    }
}

/// Triangle-wave vertical wobble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joggle {
    duration: f32,
    direction: f32,
    timer: f32,
}

impl Joggle {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            direction: 1.0,
            timer: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.direction = 1.0;
        self.timer = 0.0;
    }

    /// Advance and return the offset within `[-distance, distance]`
    pub fn offset(&mut self, delta_frames: f32, distance: f32) -> f32 {
        self.timer += delta_frames;
        if self.timer > self.duration {
            self.direction = -self.direction;
        }
        self.timer %= self.duration;
        self.direction * distance * (self.timer / self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_wraps() {
        let mut clip = ClipPlayer::looping(4, 6.0);
        assert_eq!(clip.frame(), Some(0));
        clip.advance(6.0);
        assert_eq!(clip.frame(), Some(1));
        clip.advance(18.0);
        assert_eq!(clip.frame(), Some(0));
        assert!(!clip.is_finished());
    }

    #[test]
    fn test_stay_holds_last_frame() {
        let mut clip = ClipPlayer::new(4, 2.0, ClipEnd::Stay);
        clip.advance(100.0);
        assert_eq!(clip.frame(), Some(3));
        assert!(clip.is_finished());
    }

    #[test]
    fn test_vanish_shows_nothing() {
        let mut clip = ClipPlayer::new(3, 5.0, ClipEnd::Vanish);
        clip.advance(14.0);
        assert_eq!(clip.frame(), Some(2));
        clip.advance(1.0);
        assert_eq!(clip.frame(), None);

        clip.reset();
        assert_eq!(clip.frame(), Some(0));
    }

    #[test]
    fn test_seek() {
        let mut clip = ClipPlayer::looping(4, 6.0);
        clip.seek(2);
        assert_eq!(clip.frame(), Some(2));
    }

    #[test]
    fn test_joggle_flips_direction() {
        let mut joggle = Joggle::new(12.0);
        assert!((joggle.offset(6.0, 4.0) - 2.0).abs() < 1e-6);
        // Past the period: direction flips, timer wraps
        let offset = joggle.offset(9.0, 4.0);
        assert!((offset - -1.0).abs() < 1e-6);
    }
}
