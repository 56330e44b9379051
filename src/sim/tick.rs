//! Per-frame simulation tick
//!
//! One tick runs to completion before the frame is presented:
//! input -> ship easing -> starfield -> timers -> fire -> spawn ->
//! per-class move + collide + reap. Entity-collection mutation is entirely
//! synchronous within the tick; input handlers only buffer intent.
//!
//! Removal loops walk their collections back-to-front so removing the
//! current element neither skips nor double-processes a neighbor.

use glam::{Vec2, Vec3};

use super::spawn::{self, burst};
use super::state::{AsteroidKind, GameEvent, GamePhase, GameState};
use super::viewport::Viewport;
use crate::consts::*;

/// Buffered input intent for a single tick.
///
/// `fire` is edge-triggered: the host sets it on pointer press and clears it
/// after the tick consumes it, so one press yields exactly one firing action.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Normalized aim target from the pointer, already in [-1, 1]^2
    pub aim: Option<Vec2>,
    /// Fire trigger (pointer press)
    pub fire: bool,
}

/// Advance the session by one tick.
///
/// `now_ms` is the host's wall clock; the combo decay window is time-based,
/// not tick-based. `viewport` is recomputed by the host each tick from the
/// camera so the play area tracks the window size.
pub fn tick(state: &mut GameState, input: &TickInput, viewport: &Viewport, now_ms: f64) {
    if !state.is_active() {
        return;
    }
    state.time_ticks += 1;

    if let Some(aim) = input.aim {
        state.aim = aim.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    steer_ship(state, viewport);

    let speed = state.current_speed();
    advance_starfield(state, speed);

    // Time-based combo decay, independent of collisions
    if state.combo > 0 && now_ms - state.last_hit_ms > COMBO_EXPIRY_MS {
        state.combo = 0;
    }
    if state.powerup > 0.0 {
        state.powerup = (state.powerup - POWERUP_DECAY).max(0.0);
    }

    if input.fire {
        spawn::spawn_bullets(state);
    }

    spawn::roll_spawns(state, viewport);

    update_diamonds(state, speed);
    update_bullets(state);
    update_asteroids(state, speed, now_ms);
    update_particles(state);
}

/// Ease the ship toward the aim target and derive bank/pitch from the delta.
fn steer_ship(state: &mut GameState, viewport: &Viewport) {
    let target = viewport.aim_target(state.aim, AIM_PADDING);
    let target = Vec3::new(target.x, target.y, 0.0);
    state.ship.pos = state.ship.pos.lerp(target, SHIP_LERP);
    state.ship.rot.z = (state.ship.pos.x - target.x) * SHIP_BANK_FACTOR;
    state.ship.rot.x = (target.y - state.ship.pos.y) * SHIP_PITCH_FACTOR;
}

/// Scroll the starfield toward the viewer; points past the near threshold
/// wrap to the far boundary with a resampled lateral position.
fn advance_starfield(state: &mut GameState, speed: f32) {
    use rand::Rng;
    let dz = speed * STAR_SPEED_FACTOR;
    let GameState { stars, rng, .. } = state;
    for star in stars.iter_mut() {
        star.z += dz;
        if star.z > STAR_NEAR_WRAP {
            star.z = -STAR_DEPTH + STAR_NEAR_WRAP;
            star.x = (rng.random::<f32>() - 0.5) * STAR_SCATTER;
            star.y = (rng.random::<f32>() - 0.5) * STAR_SCATTER;
        }
    }
}

/// Advance diamonds; pickup takes priority over the boundary exit.
fn update_diamonds(state: &mut GameState, speed: f32) {
    for i in (0..state.diamonds.len()).rev() {
        state.diamonds[i].pos.z += speed;
        state.diamonds[i].rot_y += 0.05;
        let pos = state.diamonds[i].pos;

        if super::collision::ship_collect_diamond(state.ship.pos, pos) {
            state.powerup = POWERUP_DURATION;
            state.add_score(DIAMOND_SCORE);
            state.diamonds.remove(i);
            spawn::spawn_explosion(state, pos, burst::CYAN, 15);
            state.push_event(GameEvent::Reward);
        } else if pos.z > FAR_EXIT_Z {
            state.diamonds.remove(i);
        }
    }
}

/// Advance bullets and reap the ones past the spawn-depth boundary.
fn update_bullets(state: &mut GameState) {
    for i in (0..state.bullets.len()).rev() {
        state.bullets[i].pos.z -= BULLET_SPEED;
        if state.bullets[i].pos.z < BULLET_EXIT_Z {
            state.bullets.remove(i);
        }
    }
}

/// Advance asteroids and resolve their collisions.
///
/// For each asteroid the ship test runs before the bullet test and the
/// first match wins, so ship damage has priority over a simultaneous
/// bullet kill. This ordering is load-bearing for scoring fairness.
fn update_asteroids(state: &mut GameState, speed: f32, now_ms: f64) {
    for i in (0..state.asteroids.len()).rev() {
        {
            let a = &mut state.asteroids[i];
            a.pos.z += speed;
            a.rot += a.rot_vel;
        }
        let (pos, kind) = {
            let a = &state.asteroids[i];
            (a.pos, a.kind)
        };

        if super::collision::ship_hit_asteroid(state.ship.pos, &state.asteroids[i]) {
            state.asteroids.remove(i);
            match kind {
                AsteroidKind::Gold => {
                    state.add_score(GOLD_SCORE);
                    state.register_hit(now_ms);
                    spawn::spawn_explosion(state, pos, burst::GOLD, 20);
                }
                AsteroidKind::Standard => {
                    state.lives = state.lives.saturating_sub(1);
                    spawn::spawn_explosion(state, pos, burst::RED, 25);
                    state.push_event(GameEvent::LifeLost);
                    if state.lives == 0 {
                        state.phase = GamePhase::GameOver;
                        state.push_event(GameEvent::GameOver {
                            score: state.score,
                            level: state.level,
                            combo: state.combo,
                        });
                        // Final score is the score at this instant; nothing
                        // else may score in this session.
                        break;
                    }
                }
            }
            continue;
        }

        // One bullet may consume a given asteroid per tick; the first
        // matching bullet in iteration order wins.
        let hit_bullet = state
            .bullets
            .iter()
            .position(|b| super::collision::bullet_hit_asteroid(b.pos, &state.asteroids[i]));
        if let Some(j) = hit_bullet {
            let points = super::collision::hit_score(kind, state.combo);
            state.register_hit(now_ms);
            state.add_score(points);
            state.asteroids.remove(i);
            state.bullets.remove(j);
            let color = match kind {
                AsteroidKind::Gold => burst::GOLD,
                AsteroidKind::Standard => burst::GREY,
            };
            spawn::spawn_explosion(state, pos, color, 10);
            continue;
        }

        if pos.z > FAR_EXIT_Z {
            // Passed the camera unconsumed
            state.asteroids.remove(i);
        }
    }
}

/// Integrate particles and drop the expired ones; scale is derived from
/// the remaining life at render time.
fn update_particles(state: &mut GameState) {
    for p in state.particles.iter_mut() {
        p.pos += p.vel;
        p.life -= PARTICLE_LIFE_DECAY;
    }
    state.particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Asteroid, Bullet, Diamond};

    const NOW: f64 = 100_000.0;

    fn viewport() -> Viewport {
        Viewport::from_camera(CAMERA_FOV_DEG, 16.0 / 9.0, CAMERA_Z)
    }

    fn asteroid_at(pos: Vec3, radius: f32, kind: AsteroidKind) -> Asteroid {
        Asteroid {
            pos,
            kind,
            radius,
            rot: Vec3::ZERO,
            rot_vel: Vec3::ZERO,
        }
    }

    /// Asteroids placed near the ship for a scenario; anything the spawner
    /// adds during the tick starts at the far depth and cannot interfere.
    fn near_asteroids(state: &GameState) -> usize {
        state
            .asteroids
            .iter()
            .filter(|a| a.pos.z > SPAWN_DEPTH / 2.0)
            .count()
    }

    fn near_diamonds(state: &GameState) -> usize {
        state
            .diamonds
            .iter()
            .filter(|d| d.pos.z > SPAWN_DEPTH / 2.0)
            .count()
    }

    #[test]
    fn test_gold_ram_scores_and_ship_survives() {
        let mut state = GameState::new(1);
        // After the +0.6 advance this sits at distance 0.5, threshold 1.6
        state
            .asteroids
            .push(asteroid_at(Vec3::new(0.5, 0.0, -0.6), 1.0, AsteroidKind::Gold));

        tick(&mut state, &TickInput::default(), &viewport(), NOW);

        assert_eq!(state.score, 500);
        assert_eq!(state.combo, 1);
        assert_eq!(state.lives, START_LIVES);
        assert!(state.is_active());
        assert_eq!(near_asteroids(&state), 0);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_standard_ram_costs_a_life() {
        let mut state = GameState::new(2);
        state
            .asteroids
            .push(asteroid_at(Vec3::new(0.5, 0.0, -0.6), 1.0, AsteroidKind::Standard));

        tick(&mut state, &TickInput::default(), &viewport(), NOW);

        assert_eq!(state.lives, START_LIVES - 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert!(state.is_active());
        assert_eq!(near_asteroids(&state), 0);
        assert!(state.drain_events().contains(&GameEvent::LifeLost));
    }

    #[test]
    fn test_last_life_ends_session_with_final_score() {
        let mut state = GameState::new(3);
        state.lives = 1;
        state.add_score(700);
        state
            .asteroids
            .push(asteroid_at(Vec3::new(0.5, 0.0, -0.6), 1.0, AsteroidKind::Standard));

        tick(&mut state, &TickInput::default(), &viewport(), NOW);

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GameOver {
            score: 700,
            level: 1,
            combo: 0
        }));

        // Frozen: further ticks change nothing
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), &viewport(), NOW + 16.0);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_bullet_kill_applies_combo_multiplier() {
        let mut state = GameState::new(4);
        state.combo = 2;
        state.last_hit_ms = NOW - 100.0;
        // Bullet advances to z=-3.5, asteroid to z=-3.4: distance 0.1
        state
            .asteroids
            .push(asteroid_at(Vec3::new(0.0, 0.0, -4.0), 1.0, AsteroidKind::Standard));
        state.bullets.push(Bullet {
            pos: Vec3::new(0.0, 0.0, -1.0),
        });

        tick(&mut state, &TickInput::default(), &viewport(), NOW);

        // 100 * max(1, 2+1)
        assert_eq!(state.score, 300);
        assert_eq!(state.combo, 3);
        assert_eq!(state.last_hit_ms, NOW);
        assert_eq!(near_asteroids(&state), 0);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_ship_collision_preempts_bullet() {
        let mut state = GameState::new(5);
        // In range of both the ship (0.5 < 1.6) and the bullet after motion
        state
            .asteroids
            .push(asteroid_at(Vec3::new(0.5, 0.0, -0.6), 1.0, AsteroidKind::Standard));
        state.bullets.push(Bullet {
            pos: Vec3::new(0.5, 0.0, 2.5),
        });

        tick(&mut state, &TickInput::default(), &viewport(), NOW);

        // Ship damage won: no score, life lost, bullet unconsumed
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, START_LIVES - 1);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_fire_respects_powerup_state() {
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };

        let mut state = GameState::new(6);
        tick(&mut state, &fire, &viewport(), NOW);
        assert_eq!(state.bullets.len(), 1);

        let mut state = GameState::new(6);
        state.powerup = 5.0;
        tick(&mut state, &fire, &viewport(), NOW);
        assert_eq!(state.bullets.len(), 2);
        let xs: Vec<f32> = state.bullets.iter().map(|b| b.pos.x).collect();
        assert!(xs.contains(&-DOUBLE_FIRE_OFFSET) && xs.contains(&DOUBLE_FIRE_OFFSET));
    }

    #[test]
    fn test_diamond_pickup_grants_powerup_and_level() {
        let mut state = GameState::new(7);
        state.add_score(800);
        // Advances to z=1.5: inside the 2.0 pickup range
        state.diamonds.push(Diamond {
            pos: Vec3::new(0.0, 0.0, 0.9),
            rot_y: 0.0,
        });

        tick(&mut state, &TickInput::default(), &viewport(), NOW);

        assert_eq!(state.score, 1000);
        // Level recomputed on every score change: the +200 bonus crossed 1000
        assert_eq!(state.level, 2);
        assert_eq!(state.powerup, POWERUP_DURATION);
        assert_eq!(near_diamonds(&state), 0);
        assert!(state.drain_events().contains(&GameEvent::Reward));
    }

    #[test]
    fn test_combo_decays_only_past_expiry_window() {
        let mut state = GameState::new(8);
        state.combo = 5;
        state.last_hit_ms = NOW - COMBO_EXPIRY_MS + 100.0;
        tick(&mut state, &TickInput::default(), &viewport(), NOW);
        assert_eq!(state.combo, 5);

        state.last_hit_ms = NOW - COMBO_EXPIRY_MS - 100.0;
        tick(&mut state, &TickInput::default(), &viewport(), NOW);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_powerup_counts_down_to_zero_not_below() {
        let mut state = GameState::new(9);
        state.powerup = POWERUP_DECAY / 2.0;
        tick(&mut state, &TickInput::default(), &viewport(), NOW);
        assert_eq!(state.powerup, 0.0);
        tick(&mut state, &TickInput::default(), &viewport(), NOW);
        assert_eq!(state.powerup, 0.0);
    }

    #[test]
    fn test_ship_eases_toward_aim_target() {
        let mut state = GameState::new(10);
        let vp = viewport();
        let input = TickInput {
            aim: Some(Vec2::new(1.0, 0.0)),
            fire: false,
        };
        tick(&mut state, &input, &vp, NOW);
        let target_x = vp.half_width - AIM_PADDING;
        // One lerp step, not a snap
        assert!((state.ship.pos.x - target_x * SHIP_LERP).abs() < 1e-4);
        assert!(state.ship.pos.x < target_x);
        // Banking derives from the remaining delta
        assert!(state.ship.rot.z < 0.0);
    }

    #[test]
    fn test_bullet_reaped_past_spawn_depth() {
        let mut state = GameState::new(11);
        state.bullets.push(Bullet {
            pos: Vec3::new(0.0, 0.0, BULLET_EXIT_Z + 1.0),
        });
        tick(&mut state, &TickInput::default(), &viewport(), NOW);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_asteroid_reaped_past_camera() {
        let mut state = GameState::new(12);
        state
            .asteroids
            .push(asteroid_at(Vec3::new(50.0, 50.0, FAR_EXIT_Z), 1.0, AsteroidKind::Standard));
        tick(&mut state, &TickInput::default(), &viewport(), NOW);
        assert_eq!(near_asteroids(&state), 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, START_LIVES);
    }

    #[test]
    fn test_starfield_wraps_with_resampled_lateral() {
        let mut state = GameState::new(13);
        state.stars[0] = Vec3::new(0.0, 0.0, STAR_NEAR_WRAP - 0.1);
        tick(&mut state, &TickInput::default(), &viewport(), NOW);
        let star = state.stars[0];
        assert_eq!(star.z, -STAR_DEPTH + STAR_NEAR_WRAP);
        assert!(star.x.abs() <= STAR_SCATTER / 2.0);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = GameState::new(14);
        state.add_score(3200);
        state.combo = 4;
        state.powerup = 3.0;
        state.lives = 1;
        state
            .asteroids
            .push(asteroid_at(Vec3::new(5.0, 5.0, -50.0), 1.0, AsteroidKind::Gold));
        state.bullets.push(Bullet { pos: Vec3::ZERO });

        // Restart is a fresh construction (host does the same)
        let state = GameState::new(99);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.combo, 0);
        assert_eq!(state.powerup, 0.0);
        assert!(state.asteroids.is_empty() && state.bullets.is_empty());
        assert!(state.diamonds.is_empty() && state.particles.is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Score never decreases, derived state holds, and no entity
            /// survives past its exit boundary after any tick.
            #[test]
            fn prop_tick_invariants(seed in any::<u64>(), steps in 1usize..150) {
                let vp = viewport();
                let mut state = GameState::new(seed);
                let mut last_score = 0u64;
                for step in 0..steps {
                    let input = TickInput {
                        aim: Some(Vec2::new(
                            ((step as f32) * 0.37).sin(),
                            ((step as f32) * 0.53).cos(),
                        )),
                        fire: step % 3 == 0,
                    };
                    tick(&mut state, &input, &vp, NOW + step as f64 * 16.0);

                    prop_assert!(state.score >= last_score);
                    last_score = state.score;
                    prop_assert_eq!(state.level as u64, state.score / LEVEL_STEP + 1);
                    prop_assert!(state.powerup >= 0.0);
                    prop_assert!(state.lives <= START_LIVES);

                    for a in &state.asteroids {
                        prop_assert!(a.pos.z <= FAR_EXIT_Z);
                    }
                    for b in &state.bullets {
                        prop_assert!(b.pos.z >= BULLET_EXIT_Z);
                    }
                    for d in &state.diamonds {
                        prop_assert!(d.pos.z <= FAR_EXIT_Z);
                    }
                    for p in &state.particles {
                        prop_assert!(p.life > 0.0);
                    }
                    state.drain_events();
                }
            }
        }
    }
}
