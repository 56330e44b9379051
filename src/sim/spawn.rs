//! Probabilistic entity spawning and explosion bursts
//!
//! One uniform draw per entity class per tick; spawns land at the far depth
//! inside a slightly padded copy of the visible rectangle. All randomness
//! goes through the session's seeded RNG so tests can replay spawn streams.
//!
//! There is deliberately no cap on concurrent entity counts: boundary exit
//! and collisions are the only things that shrink the collections.

use glam::Vec3;
use rand::Rng;

use super::state::{Asteroid, AsteroidKind, Bullet, Diamond, GameEvent, GameState, Particle};
use super::viewport::Viewport;
use crate::consts::*;

/// Particle burst colors, RGBA
pub mod burst {
    pub const GOLD: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.27, 0.27, 1.0];
    pub const GREY: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
    pub const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
}

/// Extra spawn area beyond the visible rectangle, per axis
const ASTEROID_PAD: (f32, f32) = (20.0, 15.0);
const DIAMOND_PAD: (f32, f32) = (10.0, 10.0);

/// Roll the per-tick spawn chances and add whatever comes up.
pub fn roll_spawns(state: &mut GameState, viewport: &Viewport) {
    if state.rng.random::<f64>() < DIAMOND_SPAWN_RATE {
        spawn_diamond(state, viewport);
    }
    if state.rng.random::<f64>() < ASTEROID_SPAWN_RATE {
        spawn_asteroid(state, viewport);
    }
}

/// Random lateral position inside the padded visible rectangle
fn lateral_spawn(state: &mut GameState, viewport: &Viewport, pad: (f32, f32)) -> Vec3 {
    let w = viewport.half_width * 2.0 + pad.0;
    let h = viewport.half_height * 2.0 + pad.1;
    Vec3::new(
        (state.rng.random::<f32>() - 0.5) * w,
        (state.rng.random::<f32>() - 0.5) * h,
        SPAWN_DEPTH,
    )
}

pub fn spawn_asteroid(state: &mut GameState, viewport: &Viewport) {
    let kind = if state.rng.random::<f64>() < GOLD_CHANCE {
        AsteroidKind::Gold
    } else {
        AsteroidKind::Standard
    };
    let radius = ASTEROID_RADIUS_MIN + state.rng.random::<f32>() * ASTEROID_RADIUS_SPAN;
    let pos = lateral_spawn(state, viewport, ASTEROID_PAD);
    // Slow one-directional tumble per axis
    let rot_vel = Vec3::new(
        state.rng.random::<f32>() * 0.02,
        state.rng.random::<f32>() * 0.02,
        state.rng.random::<f32>() * 0.02,
    );
    state.asteroids.push(Asteroid {
        pos,
        kind,
        radius,
        rot: Vec3::ZERO,
        rot_vel,
    });
}

pub fn spawn_diamond(state: &mut GameState, viewport: &Viewport) {
    let pos = lateral_spawn(state, viewport, DIAMOND_PAD);
    state.diamonds.push(Diamond { pos, rot_y: 0.0 });
}

/// Handle a fire action: one bullet, or two at symmetric lateral offsets
/// while the power-up countdown is positive.
pub fn spawn_bullets(state: &mut GameState) {
    let origin = state.ship.pos;
    if state.powerup > 0.0 {
        for offset in [-DOUBLE_FIRE_OFFSET, DOUBLE_FIRE_OFFSET] {
            state.bullets.push(Bullet {
                pos: origin + Vec3::new(offset, 0.0, 0.0),
            });
        }
    } else {
        state.bullets.push(Bullet { pos: origin });
    }
    state.push_event(GameEvent::Fire);
}

/// Burst of short-lived particles at a destruction site, velocity uniform
/// within a fixed cube. Emits the explosion cue alongside.
pub fn spawn_explosion(state: &mut GameState, pos: Vec3, color: [f32; 4], count: usize) {
    for _ in 0..count {
        let vel = Vec3::new(
            (state.rng.random::<f32>() - 0.5) * PARTICLE_VEL_SPREAD,
            (state.rng.random::<f32>() - 0.5) * PARTICLE_VEL_SPREAD,
            (state.rng.random::<f32>() - 0.5) * PARTICLE_VEL_SPREAD,
        );
        state.particles.push(Particle {
            pos,
            vel,
            life: 1.0,
            color,
        });
    }
    state.push_event(GameEvent::Explosion);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    fn viewport() -> Viewport {
        Viewport::from_camera(CAMERA_FOV_DEG, 16.0 / 9.0, CAMERA_Z)
    }

    #[test]
    fn test_asteroid_spawns_at_far_depth_within_pad() {
        let mut state = GameState::new(99);
        let vp = viewport();
        for _ in 0..200 {
            spawn_asteroid(&mut state, &vp);
        }
        for a in &state.asteroids {
            assert_eq!(a.pos.z, SPAWN_DEPTH);
            assert!(a.pos.x.abs() <= vp.half_width + ASTEROID_PAD.0 / 2.0 + 1e-3);
            assert!(a.pos.y.abs() <= vp.half_height + ASTEROID_PAD.1 / 2.0 + 1e-3);
            assert!(a.radius >= ASTEROID_RADIUS_MIN);
            assert!(a.radius < ASTEROID_RADIUS_MIN + ASTEROID_RADIUS_SPAN);
        }
    }

    #[test]
    fn test_tumble_velocity_non_negative() {
        let mut state = GameState::new(3);
        let vp = viewport();
        for _ in 0..500 {
            spawn_asteroid(&mut state, &vp);
        }
        for a in &state.asteroids {
            assert!(a.rot_vel.x >= 0.0 && a.rot_vel.x < 0.02);
            assert!(a.rot_vel.y >= 0.0 && a.rot_vel.y < 0.02);
            assert!(a.rot_vel.z >= 0.0 && a.rot_vel.z < 0.02);
        }
    }

    #[test]
    fn test_gold_fraction_near_weighted_chance() {
        let mut state = GameState::new(7);
        let vp = viewport();
        for _ in 0..5000 {
            spawn_asteroid(&mut state, &vp);
        }
        let gold = state
            .asteroids
            .iter()
            .filter(|a| a.kind == AsteroidKind::Gold)
            .count();
        let fraction = gold as f64 / 5000.0;
        assert!((fraction - GOLD_CHANCE).abs() < 0.02, "gold fraction {fraction}");
    }

    #[test]
    fn test_same_seed_same_spawn_stream() {
        let vp = viewport();
        let mut a = GameState::new(555);
        let mut b = GameState::new(555);
        for _ in 0..50 {
            roll_spawns(&mut a, &vp);
            roll_spawns(&mut b, &vp);
        }
        assert_eq!(a.asteroids.len(), b.asteroids.len());
        assert_eq!(a.diamonds.len(), b.diamonds.len());
        for (x, y) in a.asteroids.iter().zip(&b.asteroids) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.radius, y.radius);
        }
    }

    #[test]
    fn test_fire_without_powerup_single_bullet() {
        let mut state = GameState::new(1);
        spawn_bullets(&mut state);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].pos, state.ship.pos);
        assert_eq!(state.drain_events(), vec![GameEvent::Fire]);
    }

    #[test]
    fn test_fire_with_powerup_symmetric_pair() {
        let mut state = GameState::new(1);
        state.powerup = 5.0;
        spawn_bullets(&mut state);
        assert_eq!(state.bullets.len(), 2);
        assert_eq!(state.bullets[0].pos.x, -DOUBLE_FIRE_OFFSET);
        assert_eq!(state.bullets[1].pos.x, DOUBLE_FIRE_OFFSET);
    }

    #[test]
    fn test_explosion_burst_count_and_life() {
        let mut state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Playing);
        spawn_explosion(&mut state, Vec3::new(1.0, 2.0, -3.0), burst::RED, 25);
        assert_eq!(state.particles.len(), 25);
        for p in &state.particles {
            assert_eq!(p.life, 1.0);
            assert!(p.vel.x.abs() <= PARTICLE_VEL_SPREAD / 2.0);
            assert!(p.vel.y.abs() <= PARTICLE_VEL_SPREAD / 2.0);
            assert!(p.vel.z.abs() <= PARTICLE_VEL_SPREAD / 2.0);
        }
        assert!(state.drain_events().contains(&GameEvent::Explosion));
    }
}
