//! Per-kind platform pool
//!
//! Platforms are never freed during a session. Scrolled-off ones are
//! disabled and handed out again by [`Pool::retrieve`].

use serde::{Deserialize, Serialize};

use super::platform::{Platform, PlatformKind};
use crate::config::Config;

/// Stable reference to a pooled platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformHandle {
    pub kind: PlatformKind,
    pub slot: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pool {
    slots: [Vec<Platform>; PlatformKind::COUNT],
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse the first inactive platform of `kind`, or grow the pool
    pub fn retrieve(
        &mut self,
        kind: PlatformKind,
        altitude: f32,
        x: f32,
        lucky: bool,
        config: &Config,
    ) -> PlatformHandle {
        let cached = &mut self.slots[kind.index()];
        if let Some(slot) = cached.iter().position(|p| !p.is_active()) {
            cached[slot].reset(altitude, x, lucky, config);
            return PlatformHandle { kind, slot };
        }
        cached.push(Platform::new(kind, altitude, x, lucky, config));
        log::debug!("Pool grew: {:?} x{}", kind, cached.len());
        PlatformHandle {
            kind,
            slot: cached.len() - 1,
        }
    }

    pub fn get(&self, handle: PlatformHandle) -> &Platform {
        match self.slots[handle.kind.index()].get(handle.slot) {
            Some(platform) => platform,
            None => dangling(handle),
        }
    }

    pub fn get_mut(&mut self, handle: PlatformHandle) -> &mut Platform {
        match self.slots[handle.kind.index()].get_mut(handle.slot) {
            Some(platform) => platform,
            None => dangling(handle),
        }
    }

    pub fn disable_all(&mut self) {
        self.slots.iter_mut().flatten().for_each(Platform::disable);
    }

    /// Instances constructed for `kind`, active or not
    pub fn len(&self, kind: PlatformKind) -> usize {
        self.slots[kind.index()].len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().filter(|p| p.is_active()).count()
    }
}

#[cold]
fn dangling(handle: PlatformHandle) -> ! {
    log::error!("Platform handle {:?} does not exist in the pool", handle);
    panic!("dangling platform handle {handle:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieve_recycles_inactive() {
        let config = Config::default();
        let mut pool = Pool::new();
        let first = pool.retrieve(PlatformKind::Spring, 0.0, 20.0, false, &config);
        let second = pool.retrieve(PlatformKind::Spring, 110.0, 40.0, false, &config);
        assert_ne!(first, second);
        assert_eq!(pool.len(PlatformKind::Spring), 2);

        pool.get_mut(first).disable();
        let third = pool.retrieve(PlatformKind::Spring, 220.0, 60.0, false, &config);
        assert_eq!(third, first);
        assert_eq!(pool.len(PlatformKind::Spring), 2);
        assert_eq!(pool.get(third).altitude, 220.0);
        assert!(pool.get(third).is_active());
    }

    #[test]
    fn test_kinds_have_separate_lists() {
        let config = Config::default();
        let mut pool = Pool::new();
        pool.retrieve(PlatformKind::Cloud, 0.0, 20.0, false, &config);
        pool.retrieve(PlatformKind::Thorn, 0.0, 20.0, false, &config);
        pool.disable_all();
        assert_eq!(pool.active_count(), 0);

        let handle = pool.retrieve(PlatformKind::Thorn, 0.0, 20.0, false, &config);
        assert_eq!(handle.slot, 0);
        assert_eq!(pool.len(PlatformKind::Cloud), 1);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    #[should_panic(expected = "dangling platform handle")]
    fn test_unknown_handle_fails_fast() {
        let pool = Pool::new();
        pool.get(PlatformHandle {
            kind: PlatformKind::Default,
            slot: 3,
        });
    }
}
