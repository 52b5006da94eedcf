//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame deltas come from the caller, never from a clock
//! - One seeded RNG owned by the session
//! - Platforms are iterated lowest first
//! - No rendering or storage dependencies

pub mod camera;
pub mod character;
pub mod clip;
pub mod collision;
pub mod platform;
pub mod pool;
pub mod randomizer;
pub mod state;
pub mod tick;
pub mod window;

pub use camera::Camera;
pub use character::{Character, CharacterView, Prediction, Status};
pub use clip::{ClipEnd, ClipPlayer, Joggle};
pub use collision::{Aabb, Contact, Segment, SweepFrame, landing_contact, movement_intersect};
pub use platform::{Outcome, Platform, PlatformKind, PlatformView};
pub use pool::{PlatformHandle, Pool};
pub use randomizer::Randomizer;
pub use state::{GamePhase, Session, Snapshot};
pub use tick::{TickInput, tick};
pub use window::Window;
