//! Landing detection between the character and a platform
//!
//! A fast-falling character can skip a thin platform between two ticks at a
//! low frame rate. Each platform therefore runs a box-overlap test first and,
//! failing that, checks whether the character's feet swept across the
//! platform's top edge since the previous tick.
//!
//! Only the character's sweep is modelled. A platform moving fast sideways
//! past a stationary character can be missed within a single tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in world space (`min` is the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Bottom-left and bottom-right corners
    #[inline]
    pub fn feet(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.left(), self.bottom()),
            Vec2::new(self.right(), self.bottom()),
        )
    }
}

/// Directed line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
}

impl Segment {
    pub fn new(from: Vec2, to: Vec2) -> Self {
        Self { from, to }
    }
}

/// Boxes seen by the previous landing check of one platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepFrame {
    pub platform: Aabb,
    pub body: Aabb,
}

/// Which phase confirmed a landing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Miss,
    /// Feet resting within the platform's thickness
    Overlap,
    /// Feet crossed the platform's top between two ticks
    Swept,
}

impl Contact {
    #[inline]
    pub fn is_hit(self) -> bool {
        self != Contact::Miss
    }
}

/// Box test: falling, overlapping horizontally, feet inside the platform's thickness
pub fn overlap_landing(body: &Aabb, velocity_y: f32, platform: &Aabb) -> bool {
    if velocity_y < 0.0 {
        return false;
    }
    body.right() > platform.left()
        && body.left() < platform.right()
        && body.bottom() >= platform.top()
        && body.bottom() <= platform.bottom()
}

/// Twice the signed area of triangle (a, b, c); its sign tells which side of
/// line `a->b` the point `c` lies on
#[inline]
fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (a - c).perp_dot(b - c)
}

/// Whether the platform's edge `line` crosses the corridor traced by the feet
pub fn movement_intersect(line: Segment, left_foot: Segment, right_foot: Segment) -> bool {
    // Edge height must lie within the vertical range of the movement
    if line.from.y > left_foot.to.y || line.from.y < left_foot.from.y {
        return false;
    }

    let reference = orientation(left_foot.from, left_foot.to, line.from);
    if reference == 0.0 {
        return true;
    }
    // Edge endpoints on opposite sides of the left foot path, or an endpoint
    // between the two foot paths
    [
        orientation(left_foot.from, left_foot.to, line.to),
        orientation(right_foot.from, right_foot.to, line.from),
        orientation(right_foot.from, right_foot.to, line.to),
    ]
    .into_iter()
    .any(|side| reference * side <= 0.0)
}

/// Two-phase landing test for one platform against the predicted body box.
///
/// `previous` is the platform's cache of the last check; it is always
/// refreshed. Without a cache only the overlap phase can confirm a landing.
pub fn landing_contact(
    previous: &mut Option<SweepFrame>,
    platform: Aabb,
    body: Aabb,
    velocity_y: f32,
) -> Contact {
    let current = SweepFrame { platform, body };

    // Rising bodies never land
    if velocity_y < 0.0 {
        *previous = Some(current);
        return Contact::Miss;
    }

    if overlap_landing(&body, velocity_y, &platform) {
        *previous = Some(current);
        return Contact::Overlap;
    }

    let Some(last) = previous.replace(current) else {
        return Contact::Miss;
    };

    let (left_from, right_from) = last.body.feet();
    let (left_to, right_to) = body.feet();
    let left_foot = Segment::new(left_from, left_to);
    let right_foot = Segment::new(right_from, right_to);
    let edge = Segment::new(
        Vec2::new(last.platform.left().min(platform.left()), last.platform.top()),
        Vec2::new(last.platform.right().max(platform.right()), platform.top()),
    );

    if movement_intersect(edge, left_foot, right_foot) {
        Contact::Swept
    } else {
        Contact::Miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: Vec2 = Vec2::new(48.0, 53.0);
    const THIN: Vec2 = Vec2::new(49.0, 20.0);

    fn body_at(x: f32, bottom: f32) -> Aabb {
        Aabb::new(Vec2::new(x, bottom - BODY.y), BODY)
    }

    #[test]
    fn test_overlap_landing() {
        let platform = Aabb::new(Vec2::new(100.0, 0.0), THIN);
        assert!(overlap_landing(&body_at(90.0, 5.0), 3.0, &platform));
        // Rising
        assert!(!overlap_landing(&body_at(90.0, 5.0), -3.0, &platform));
        // Feet below the platform's thickness
        assert!(!overlap_landing(&body_at(90.0, 25.0), 3.0, &platform));
        // No horizontal overlap
        assert!(!overlap_landing(&body_at(150.0, 5.0), 3.0, &platform));
    }

    #[test]
    fn test_swept_catches_tunneling() {
        let platform = Aabb::new(Vec2::new(100.0, 0.0), THIN);
        let mut previous = None;

        // Above the platform, falling
        let contact = landing_contact(&mut previous, platform, body_at(110.0, -10.0), 14.0);
        assert_eq!(contact, Contact::Miss);

        // Skipped clean through in one tick
        let contact = landing_contact(&mut previous, platform, body_at(110.0, 40.0), 50.0);
        assert_eq!(contact, Contact::Swept);
    }

    #[test]
    fn test_swept_only_left_foot_over_platform_edge() {
        let platform = Aabb::new(Vec2::new(100.0, 0.0), THIN);
        let mut previous = None;
        // Right foot hangs beyond the platform's left edge
        landing_contact(&mut previous, platform, body_at(60.0, -10.0), 14.0);
        let contact = landing_contact(&mut previous, platform, body_at(60.0, 40.0), 50.0);
        assert_eq!(contact, Contact::Swept);
    }

    #[test]
    fn test_swept_follows_moving_platform() {
        let mut previous = None;
        // Platform slides from x=200 to x=100 under a body that skips through it
        let before = Aabb::new(Vec2::new(200.0, 0.0), THIN);
        landing_contact(&mut previous, before, body_at(110.0, -10.0), 14.0);

        let after = Aabb::new(Vec2::new(100.0, 0.0), THIN);
        let contact = landing_contact(&mut previous, after, body_at(110.0, 40.0), 50.0);
        assert_eq!(contact, Contact::Swept);
    }

    #[test]
    fn test_swept_misses_beside_platform() {
        let platform = Aabb::new(Vec2::new(100.0, 0.0), THIN);
        let mut previous = None;
        landing_contact(&mut previous, platform, body_at(300.0, -10.0), 14.0);
        let contact = landing_contact(&mut previous, platform, body_at(300.0, 40.0), 50.0);
        assert_eq!(contact, Contact::Miss);
    }

    #[test]
    fn test_no_cache_relies_on_overlap_only() {
        let platform = Aabb::new(Vec2::new(100.0, 0.0), THIN);
        let mut previous = None;
        let contact = landing_contact(&mut previous, platform, body_at(110.0, 40.0), 50.0);
        assert_eq!(contact, Contact::Miss);
        assert!(previous.is_some());

        let mut previous = None;
        let contact = landing_contact(&mut previous, platform, body_at(110.0, 5.0), 5.0);
        assert_eq!(contact, Contact::Overlap);
    }

    #[test]
    fn test_rising_refreshes_cache() {
        let platform = Aabb::new(Vec2::new(100.0, 0.0), THIN);
        let mut previous = None;
        let body = body_at(110.0, 5.0);
        assert_eq!(landing_contact(&mut previous, platform, body, -5.0), Contact::Miss);
        assert_eq!(previous, Some(SweepFrame { platform, body }));
    }

    #[test]
    fn test_movement_intersect_rejects_out_of_range_edge() {
        let left = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0));
        let right = Segment::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        let edge = Segment::new(Vec2::new(-5.0, 20.0), Vec2::new(5.0, 20.0));
        assert!(!movement_intersect(edge, left, right));

        let edge = Segment::new(Vec2::new(-5.0, 5.0), Vec2::new(5.0, 5.0));
        assert!(movement_intersect(edge, left, right));
    }
}
