//! Proximity collision tests and hit scoring
//!
//! Plain Euclidean distance checks; entity counts stay in the tens, so no
//! broad-phase structure is warranted. Thresholds combine the asteroid's
//! own radius with a fixed per-class margin.

use glam::Vec3;

use super::state::{Asteroid, AsteroidKind};
use crate::consts::*;

/// Squared-distance proximity test (avoids the sqrt on the hot path)
#[inline]
pub fn within_range(a: Vec3, b: Vec3, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold
}

/// Ship-vs-asteroid: threshold is the asteroid radius plus the ship margin
#[inline]
pub fn ship_hit_asteroid(ship_pos: Vec3, asteroid: &Asteroid) -> bool {
    within_range(ship_pos, asteroid.pos, asteroid.radius + SHIP_COLLISION_MARGIN)
}

/// Bullet-vs-asteroid: threshold is the asteroid radius plus the bullet margin
#[inline]
pub fn bullet_hit_asteroid(bullet_pos: Vec3, asteroid: &Asteroid) -> bool {
    within_range(bullet_pos, asteroid.pos, asteroid.radius + BULLET_COLLISION_MARGIN)
}

/// Ship-vs-diamond pickup: fixed threshold, independent of any radius
#[inline]
pub fn ship_collect_diamond(ship_pos: Vec3, diamond_pos: Vec3) -> bool {
    within_range(ship_pos, diamond_pos, DIAMOND_PICKUP_RANGE)
}

/// Score for a bullet kill: kind base value scaled by the combo streak.
/// `combo` is the streak before this hit; the multiplier includes it.
pub fn hit_score(kind: AsteroidKind, combo: u32) -> u64 {
    let base = match kind {
        AsteroidKind::Gold => GOLD_SCORE,
        AsteroidKind::Standard => STANDARD_SCORE,
    };
    base * u64::from((combo + 1).max(1))
}
