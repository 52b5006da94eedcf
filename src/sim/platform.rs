//! Platform variants ("stairs") and the power-up prop they may carry
//!
//! All variants share one record (position, altitude, active flag, sweep
//! cache); type-specific state lives in [`Behavior`]. A platform's `altitude`
//! is its top edge and never changes, except for a kicked slime.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::character::{Character, Prediction};
use super::clip::{ClipEnd, ClipPlayer, Joggle};
use super::collision::{Aabb, SweepFrame, landing_contact};
use crate::config::Config;
use crate::consts::{
    POWER_UP_HEIGHT, POWER_UP_LIFT, POWER_UP_WIDTH, STEALTH_BLINK_INTERVAL, STEALTH_FADE_DURATION,
};

/// Platform variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlatformKind {
    Default,
    /// Blinks in and out, always safe
    Stealth,
    /// Holds exactly one landing
    Fragile,
    /// Patrols between the canvas edges
    Moving,
    /// Decoy that cannot hold anyone
    Cloud,
    /// Hazard
    Thorn,
    /// One-shot trampoline
    Spring,
    /// Patrolling slime, aggressive on part of its idle animation
    Slime,
}

impl PlatformKind {
    pub const COUNT: usize = 8;

    pub const ALL: [PlatformKind; Self::COUNT] = [
        PlatformKind::Default,
        PlatformKind::Stealth,
        PlatformKind::Fragile,
        PlatformKind::Moving,
        PlatformKind::Cloud,
        PlatformKind::Thorn,
        PlatformKind::Spring,
        PlatformKind::Slime,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Safe to land on repeatedly; feeds the randomizer's streak rule
    pub fn is_stable(self) -> bool {
        !matches!(
            self,
            PlatformKind::Cloud | PlatformKind::Thorn | PlatformKind::Slime
        )
    }

    /// Allowed during the opening stretch of a run
    pub fn is_starter(self) -> bool {
        matches!(
            self,
            PlatformKind::Default | PlatformKind::Fragile | PlatformKind::Cloud
        )
    }

    pub fn can_host_power_up(self) -> bool {
        matches!(self, PlatformKind::Default | PlatformKind::Moving)
    }

    /// Sprite box on the reference canvas
    pub fn reference_size(self) -> Vec2 {
        match self {
            PlatformKind::Default => Vec2::new(49.0, 20.0),
            PlatformKind::Stealth => Vec2::new(47.0, 20.0),
            PlatformKind::Fragile => Vec2::new(47.0, 27.0),
            PlatformKind::Moving => Vec2::new(47.0, 20.0),
            PlatformKind::Cloud => Vec2::new(49.0, 19.0),
            PlatformKind::Thorn => Vec2::new(47.0, 29.0),
            PlatformKind::Spring => Vec2::new(42.0, 21.0),
            PlatformKind::Slime => Vec2::new(39.0, 39.0),
        }
    }

    pub fn size(self, config: &Config) -> Vec2 {
        let size = self.reference_size();
        Vec2::new(config.relative_pixel(size.x), config.relative_pixel(size.y))
    }
}

/// What a landing (or its absence) does to the character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    None,
    Jump,
    Bounce,
    Power,
    Hurt,
    /// Nothing left underneath; decided by the window, never by a platform
    Fall,
}

/// Floating prop granting a power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub enabled: bool,
    pub size: Vec2,
    joggle: Joggle,
    clip: ClipPlayer,
    offset_y: f32,
}

impl PowerUp {
    fn new(enabled: bool, config: &Config) -> Self {
        Self {
            enabled,
            size: Vec2::new(
                config.relative_pixel(POWER_UP_WIDTH),
                config.relative_pixel(POWER_UP_HEIGHT),
            ),
            joggle: Joggle::new(config.power_up_joggle_duration),
            clip: ClipPlayer::looping(3, 6.0),
            offset_y: 0.0,
        }
    }

    fn update(&mut self, delta_frames: f32, config: &Config) {
        if !self.enabled {
            return;
        }
        self.clip.advance(delta_frames);
        self.offset_y = self.joggle.offset(delta_frames, config.power_up_joggle_distance);
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }
}

/// Alpha ease of a stealth platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fade {
    In,
    Out,
}

/// Per-variant state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    Default,
    Stealth {
        visible: bool,
        fade: Option<Fade>,
        fade_frames: f32,
    },
    Fragile {
        collapsing: bool,
        clip: ClipPlayer,
    },
    Moving {
        speed: f32,
        clip: ClipPlayer,
    },
    Cloud {
        collapsing: bool,
        clip: ClipPlayer,
    },
    Thorn {
        clip: ClipPlayer,
    },
    Spring {
        bounced: bool,
        clip: ClipPlayer,
    },
    Slime {
        speed: f32,
        kicked: bool,
        fall_velocity: f32,
        clip: ClipPlayer,
        joggle: Joggle,
        offset_y: f32,
    },
}

impl Behavior {
    fn fresh(kind: PlatformKind, config: &Config) -> Self {
        match kind {
            PlatformKind::Default => Behavior::Default,
            PlatformKind::Stealth => Behavior::Stealth {
                visible: false,
                fade: None,
                fade_frames: 0.0,
            },
            PlatformKind::Fragile => Behavior::Fragile {
                collapsing: false,
                clip: ClipPlayer::new(3, 5.0, ClipEnd::Vanish),
            },
            PlatformKind::Moving => Behavior::Moving {
                speed: config.platform_move_speed,
                clip: ClipPlayer::looping(2, 6.0),
            },
            PlatformKind::Cloud => Behavior::Cloud {
                collapsing: false,
                clip: ClipPlayer::new(6, 4.0, ClipEnd::Vanish),
            },
            PlatformKind::Thorn => Behavior::Thorn {
                clip: ClipPlayer::looping(2, 8.0),
            },
            PlatformKind::Spring => Behavior::Spring {
                bounced: false,
                clip: ClipPlayer::new(4, 2.0, ClipEnd::Stay),
            },
            PlatformKind::Slime => Behavior::Slime {
                speed: config.platform_move_speed,
                kicked: false,
                fall_velocity: 0.0,
                clip: ClipPlayer::looping(4, 6.0),
                joggle: Joggle::new(config.slime_joggle_duration),
                offset_y: 0.0,
            },
        }
    }
}

/// Slime idle frames showing spikes
const SLIME_AGGRESSIVE_FRAMES: [usize; 2] = [1, 2];

/// Render-facing state of one platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformView {
    pub kind: PlatformKind,
    pub position: Vec2,
    pub size: Vec2,
    pub alpha: f32,
    /// Sprite frame; `None` once a collapse finished
    pub frame: Option<usize>,
    /// Screen position of an enabled power-up prop
    pub power_up: Option<Vec2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    kind: PlatformKind,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub altitude: f32,
    pub size: Vec2,
    active: bool,
    pub power_up: Option<PowerUp>,
    #[serde(skip)]
    previous: Option<SweepFrame>,
    pub behavior: Behavior,
}

/// Uniform integer x keeping `padding` clear of both canvas edges
pub fn random_x<R: Rng + ?Sized>(rng: &mut R, width: f32, config: &Config) -> f32 {
    let min = config.platform_padding as i32;
    let max = ((config.width - width - config.platform_padding) as i32).max(min);
    rng.random_range(min..=max) as f32
}

impl Platform {
    pub fn new(kind: PlatformKind, altitude: f32, x: f32, lucky: bool, config: &Config) -> Self {
        let mut platform = Self {
            kind,
            x,
            altitude,
            size: kind.size(config),
            active: false,
            power_up: None,
            previous: None,
            behavior: Behavior::fresh(kind, config),
        };
        platform.setup(altitude, x, lucky, config);
        platform
    }

    /// (Re)place the platform, clearing all per-run state
    pub fn setup(&mut self, altitude: f32, x: f32, lucky: bool, config: &Config) {
        self.size = self.kind.size(config);
        self.x = x;
        self.altitude = altitude;
        self.behavior = Behavior::fresh(self.kind, config);
        self.power_up = self
            .kind
            .can_host_power_up()
            .then(|| PowerUp::new(lucky, config));
        self.previous = None;
        self.active = true;
    }

    pub fn reset(&mut self, altitude: f32, x: f32, lucky: bool, config: &Config) {
        self.setup(altitude, x, lucky, config);
    }

    /// Make the platform recyclable
    pub fn disable(&mut self) {
        self.active = false;
    }

    pub fn kind(&self) -> PlatformKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_power_up(&self) -> bool {
        self.power_up.as_ref().is_some_and(|p| p.enabled)
    }

    /// Top-left corner in world space
    pub fn world_position(&self) -> Vec2 {
        Vec2::new(self.x, -self.altitude)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.world_position(), self.size)
    }

    pub fn screen_position(&self, camera: &Camera) -> Vec2 {
        camera.focus(self.world_position())
    }

    /// Crossed below the top edge of the canvas
    pub fn has_entered(&self, camera: &Camera) -> bool {
        self.screen_position(camera).y > 0.0
    }

    /// Crossed below the bottom edge of the canvas
    pub fn has_gone(&self, camera: &Camera) -> bool {
        self.screen_position(camera).y > camera.height()
    }

    /// Whether a one-shot platform has been used up
    pub fn is_spent(&self) -> bool {
        match &self.behavior {
            Behavior::Fragile { collapsing, .. } | Behavior::Cloud { collapsing, .. } => *collapsing,
            Behavior::Spring { bounced, .. } => *bounced,
            Behavior::Slime { kicked, .. } => *kicked,
            _ => false,
        }
    }

    /// A kicked slime in free fall
    pub fn is_dropping(&self) -> bool {
        matches!(self.behavior, Behavior::Slime { kicked: true, .. })
    }

    /// Advance animations and motion. `rhythm` (frames since the run began)
    /// keeps periodic animations of sibling platforms in phase.
    pub fn update(&mut self, delta_frames: f32, rhythm: f32, config: &Config) {
        if let Some(power_up) = &mut self.power_up {
            power_up.update(delta_frames, config);
        }

        let max_x = config.width - self.size.x;
        match &mut self.behavior {
            Behavior::Default => {}
            Behavior::Stealth {
                visible,
                fade,
                fade_frames,
            } => {
                let phase = rhythm.round() % STEALTH_BLINK_INTERVAL;
                let first_half = phase < STEALTH_BLINK_INTERVAL / 2.0;
                if first_half != *visible {
                    *visible = first_half;
                    *fade = Some(if first_half { Fade::In } else { Fade::Out });
                    *fade_frames = 0.0;
                }
                // The starting tick already counts toward the ease
                if fade.is_some() {
                    *fade_frames += delta_frames;
                    if *fade_frames >= STEALTH_FADE_DURATION {
                        *fade = None;
                    }
                }
            }
            Behavior::Fragile { collapsing, clip } | Behavior::Cloud { collapsing, clip } => {
                if *collapsing {
                    clip.advance(delta_frames);
                }
            }
            Behavior::Moving { speed, clip } => {
                clip.advance(delta_frames);
                self.x = patrol(self.x, speed, delta_frames, max_x);
            }
            Behavior::Thorn { clip } => clip.advance(delta_frames),
            Behavior::Spring { bounced, clip } => {
                if *bounced {
                    clip.advance(delta_frames);
                }
            }
            Behavior::Slime {
                speed,
                kicked,
                fall_velocity,
                clip,
                joggle,
                offset_y,
            } => {
                if *kicked {
                    *fall_velocity += config.gravity * delta_frames;
                    self.altitude -= *fall_velocity * delta_frames;
                } else {
                    clip.advance(delta_frames);
                    *offset_y = joggle.offset(delta_frames, config.slime_joggle_distance);
                    self.x = patrol(self.x, speed, delta_frames, max_x);
                }
            }
        }
    }

    /// Landing check against the character's predicted box.
    ///
    /// On contact the character is pinned on top of this platform before the
    /// outcome is returned; the two only make sense together.
    pub fn is_being_stepped(&mut self, prediction: &Prediction, character: &mut Character) -> Outcome {
        if self.is_spent() {
            return Outcome::None;
        }

        let bounds = self.bounds();
        let contact = landing_contact(
            &mut self.previous,
            bounds,
            prediction.bounds(),
            prediction.velocity.y,
        );
        if !contact.is_hit() {
            return Outcome::None;
        }
        character.overwrite_next_altitude(prediction, self.altitude);

        match &mut self.behavior {
            Behavior::Default | Behavior::Stealth { .. } | Behavior::Moving { .. } => {
                match &mut self.power_up {
                    Some(power_up) if power_up.enabled => {
                        power_up.enabled = false;
                        Outcome::Power
                    }
                    _ => Outcome::Jump,
                }
            }
            Behavior::Fragile { collapsing, .. } => {
                *collapsing = true;
                Outcome::Jump
            }
            Behavior::Cloud { collapsing, .. } => {
                *collapsing = true;
                Outcome::None
            }
            Behavior::Thorn { .. } => Outcome::Hurt,
            Behavior::Spring { bounced, .. } => {
                *bounced = true;
                Outcome::Bounce
            }
            Behavior::Slime { kicked, clip, .. } => {
                let aggressive = clip
                    .frame()
                    .is_some_and(|frame| SLIME_AGGRESSIVE_FRAMES.contains(&frame));
                *kicked = true;
                if aggressive { Outcome::Hurt } else { Outcome::Jump }
            }
        }
    }

    /// Stealth opacity; 1.0 for every other variant
    pub fn alpha(&self) -> f32 {
        match &self.behavior {
            Behavior::Stealth {
                visible,
                fade,
                fade_frames,
            } => match fade {
                Some(Fade::In) => (fade_frames / STEALTH_FADE_DURATION).min(1.0),
                Some(Fade::Out) => (1.0 - fade_frames / STEALTH_FADE_DURATION).max(0.0),
                None if *visible => 1.0,
                None => 0.0,
            },
            _ => 1.0,
        }
    }

    pub fn view(&self, camera: &Camera, config: &Config) -> PlatformView {
        let mut position = self.screen_position(camera);
        let frame = match &self.behavior {
            Behavior::Fragile { collapsing, clip }
            | Behavior::Cloud { collapsing, clip } => {
                if *collapsing { clip.frame() } else { Some(0) }
            }
            Behavior::Spring { bounced, clip } => {
                if *bounced { clip.frame() } else { Some(0) }
            }
            Behavior::Slime {
                kicked,
                clip,
                offset_y,
                ..
            } => {
                if *kicked {
                    Some(0)
                } else {
                    position.y += offset_y;
                    clip.frame()
                }
            }
            Behavior::Moving { clip, .. } | Behavior::Thorn { clip } => clip.frame(),
            Behavior::Default | Behavior::Stealth { .. } => Some(0),
        };
        let power_up = self.power_up.as_ref().filter(|p| p.enabled).map(|p| {
            let screen = self.screen_position(camera);
            Vec2::new(
                screen.x + (self.size.x - p.size.x) / 2.0,
                screen.y - p.size.y - config.relative_pixel(POWER_UP_LIFT) + p.offset_y(),
            )
        });
        PlatformView {
            kind: self.kind,
            position,
            size: self.size,
            alpha: self.alpha(),
            frame,
            power_up,
        }
    }

    /// Rescale to a resized canvas
    pub fn on_viewport_changed(&mut self, k: f32, config: &Config) {
        self.x *= k;
        self.altitude *= k;
        self.size = self.kind.size(config);
        match &mut self.behavior {
            Behavior::Moving { speed, .. } | Behavior::Slime { speed, .. } => *speed *= k,
            _ => {}
        }
        if let Behavior::Slime { fall_velocity, .. } = &mut self.behavior {
            *fall_velocity *= k;
        }
        if let Some(power_up) = &mut self.power_up {
            power_up.size = Vec2::new(
                config.relative_pixel(POWER_UP_WIDTH),
                config.relative_pixel(POWER_UP_HEIGHT),
            );
        }
        self.previous = None;
    }
}

/// Move horizontally, turning around at either canvas edge
fn patrol(x: f32, speed: &mut f32, delta_frames: f32, max_x: f32) -> f32 {
    let x = x + *speed * delta_frames;
    if x <= 0.0 {
        *speed = -*speed;
        0.0
    } else if x >= max_x {
        *speed = -*speed;
        max_x
    } else {
        x
    }
}
