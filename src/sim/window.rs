//! Sliding window of live platforms
//!
//! Platforms are stacked one `gap` apart, lowest first. A new one is
//! appended as soon as the highest scrolls onto the canvas, and the lowest
//! is recycled once it scrolls off the bottom. The window never shrinks
//! below the count needed to span the whole canvas height.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::character::{Character, Prediction};
use super::platform::{Outcome, Platform, random_x};
use super::pool::{Pool, PlatformHandle};
use super::randomizer::Randomizer;
use crate::config::Config;
use crate::consts::FIRST_PLATFORM_DEPTH;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Window {
    pool: Pool,
    randomizer: Randomizer,
    /// Live platforms, lowest first
    handles: VecDeque<PlatformHandle>,
    /// Altitude the next appended platform gets
    next_altitude: f32,
    gap: f32,
    min_len: usize,
}

fn min_len_for(height: f32, gap: f32) -> usize {
    (height / gap).ceil() as usize + 1
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh run: recycle everything and lay out the opening stack
    pub fn reset<R: Rng + ?Sized>(&mut self, config: &Config, camera: &Camera, rng: &mut R) {
        self.pool.disable_all();
        self.randomizer.clear();
        self.handles.clear();
        self.gap = config.platform_gap;
        self.min_len = min_len_for(config.height, self.gap);
        self.next_altitude = -(config.height * FIRST_PLATFORM_DEPTH).round();

        for _ in 0..self.min_len {
            self.append(config, rng);
        }
        self.fill(config, camera, rng);
        log::debug!(
            "Platform window reset: {} platforms from altitude {:.0}",
            self.handles.len(),
            self.lowest().map_or(0.0, |p| p.altitude),
        );
    }

    fn append<R: Rng + ?Sized>(&mut self, config: &Config, rng: &mut R) {
        let kind = self.randomizer.next(rng);
        let width = kind.size(config).x;
        let x = random_x(rng, width, config);
        let lucky = kind.can_host_power_up()
            && !self.randomizer.might_want_to_slow_down()
            && rng.random_bool(config.power_up_chance);
        let handle = self.pool.retrieve(kind, self.next_altitude, x, lucky, config);
        log::trace!("Append {:?} at altitude {:.0}", kind, self.next_altitude);
        self.handles.push_back(handle);
        self.next_altitude += self.gap;
    }

    /// Append while the highest platform is already visible
    fn fill<R: Rng + ?Sized>(&mut self, config: &Config, camera: &Camera, rng: &mut R) {
        while self.highest().is_some_and(|p| p.has_entered(camera)) {
            self.append(config, rng);
        }
    }

    /// Grow at the top, recycle at the bottom, then advance every platform
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        delta_frames: f32,
        rhythm: f32,
        config: &Config,
        camera: &Camera,
        rng: &mut R,
    ) {
        self.fill(config, camera, rng);

        while self.handles.len() > self.min_len {
            let Some(&lowest) = self.handles.front() else {
                break;
            };
            if !self.live(lowest).has_gone(camera) {
                break;
            }
            log::trace!("Recycle {:?} at altitude {:.0}", lowest.kind, self.live(lowest).altitude);
            self.live_mut(lowest).disable();
            self.handles.pop_front();
        }

        for i in 0..self.handles.len() {
            let handle = self.handles[i];
            self.live_mut(handle).update(delta_frames, rhythm, config);
        }
    }

    /// First platform (lowest first) reporting a landing, or a fall when
    /// every platform is far on one side of the character
    pub fn check_collision(
        &mut self,
        prediction: &Prediction,
        character: &mut Character,
        config: &Config,
    ) -> Outcome {
        for i in 0..self.handles.len() {
            let handle = self.handles[i];
            let outcome = self.live_mut(handle).is_being_stepped(prediction, character);
            if outcome != Outcome::None {
                return outcome;
            }
        }

        if character.status().steerable() && self.is_stranded(character.altitude, config) {
            log::debug!("No platform within reach of altitude {:.0}", character.altitude);
            return Outcome::Fall;
        }
        Outcome::None
    }

    /// All resting platforms at least `falling_threshold` above, or all at
    /// least that far below
    fn is_stranded(&self, altitude: f32, config: &Config) -> bool {
        let threshold = config.falling_threshold;
        let resting = || self.platforms().filter(|p| !p.is_dropping());
        if resting().next().is_none() {
            return false;
        }
        let all_above = resting().all(|p| p.altitude - altitude >= threshold);
        let all_below = resting().all(|p| altitude - p.altitude >= threshold);
        all_above || all_below
    }

    fn live(&self, handle: PlatformHandle) -> &Platform {
        let platform = self.pool.get(handle);
        if !platform.is_active() {
            desync(handle);
        }
        platform
    }

    fn live_mut(&mut self, handle: PlatformHandle) -> &mut Platform {
        let platform = self.pool.get_mut(handle);
        if !platform.is_active() {
            desync(handle);
        }
        platform
    }

    /// Live platforms, lowest first
    pub fn platforms(&self) -> impl Iterator<Item = &Platform> + '_ {
        self.handles.iter().map(|&handle| self.live(handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn lowest(&self) -> Option<&Platform> {
        self.handles.front().map(|&handle| self.live(handle))
    }

    pub fn highest(&self) -> Option<&Platform> {
        self.handles.back().map(|&handle| self.live(handle))
    }

    /// Altitude distance between the lowest and highest platform
    pub fn span(&self) -> f32 {
        match (self.lowest(), self.highest()) {
            (Some(low), Some(high)) => high.altitude - low.altitude,
            _ => 0.0,
        }
    }

    pub fn randomizer(&self) -> &Randomizer {
        &self.randomizer
    }

    /// Rescale by `k` after the canvas ratio changed, then top up
    pub fn on_viewport_changed<R: Rng + ?Sized>(
        &mut self,
        k: f32,
        config: &Config,
        camera: &Camera,
        rng: &mut R,
    ) {
        self.gap *= k;
        self.next_altitude *= k;
        self.min_len = min_len_for(config.height, self.gap);
        for i in 0..self.handles.len() {
            let handle = self.handles[i];
            self.live_mut(handle).on_viewport_changed(k, config);
        }
        while self.handles.len() < self.min_len {
            self.append(config, rng);
        }
        self.fill(config, camera, rng);
    }
}

#[cold]
fn desync(handle: PlatformHandle) -> ! {
    log::error!("Window lists {:?} but the platform is inactive", handle);
    panic!("inactive platform {handle:?} in window");
}
