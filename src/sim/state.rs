//! Game state and core simulation types
//!
//! Everything the tick loop mutates lives here, owned by a single
//! simulation context. Presentation layers read it, never write it.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Simulation runs
    Playing,
    /// Run ended (lives hit zero); simulation is frozen
    GameOver,
}

/// Asteroid flavor: gold ones reward, standard ones hurt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsteroidKind {
    Standard,
    Gold,
}

/// The player's ship
///
/// Rotation is derived from the aim delta each tick (bank/pitch), never
/// integrated as independent physical state.
#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec3,
    pub rot: Vec3,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            rot: Vec3::ZERO,
        }
    }
}

/// An incoming asteroid
#[derive(Debug, Clone)]
pub struct Asteroid {
    pub pos: Vec3,
    pub kind: AsteroidKind,
    /// Drives both visual scale and the collision threshold
    pub radius: f32,
    pub rot: Vec3,
    pub rot_vel: Vec3,
}

/// A fired bullet, travelling toward -z at a fixed speed
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec3,
}

/// A power-up diamond
#[derive(Debug, Clone)]
pub struct Diamond {
    pub pos: Vec3,
    pub rot_y: f32,
}

/// A short-lived explosion particle; visual scale equals remaining life
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    /// 0-1, decremented each tick
    pub life: f32,
    pub color: [f32; 4],
}

/// Observable side effects of a tick, drained by the host each frame
/// (audio cues, game-over handling). The sim never touches the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Bullet(s) fired
    Fire,
    /// Something blew up (asteroid or diamond consumed)
    Explosion,
    /// Diamond collected
    Reward,
    /// Standard asteroid reached the ship
    LifeLost,
    /// Lives hit zero; carries the final score
    GameOver { score: u64, level: u32, combo: u32 },
}

/// Complete session state
///
/// Single-writer: only `tick` mutates this, input handlers buffer intent
/// into `TickInput` instead.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducible spawn streams
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,

    pub ship: Ship,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub diamonds: Vec<Diamond>,
    pub particles: Vec<Particle>,
    /// Parallax starfield points, advanced and wrapped each tick
    pub stars: Vec<Vec3>,

    pub score: u64,
    /// Always `score / 1000 + 1`; recomputed on every score change
    pub level: u32,
    pub lives: u8,
    pub combo: u32,
    /// Wall-clock timestamp of the last scoring hit (ms)
    pub last_hit_ms: f64,
    /// Double-fire countdown; positive means the power-up is active
    pub powerup: f32,
    /// Normalized aim target in [-1, 1]^2
    pub aim: Vec2,

    pub time_ticks: u64,
    /// Side effects of the current tick, drained by the host
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh session. Also used for restart: everything resets,
    /// no entities or timers leak across sessions.
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = scatter_starfield(&mut rng);
        Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            ship: Ship::default(),
            asteroids: Vec::new(),
            bullets: Vec::new(),
            diamonds: Vec::new(),
            particles: Vec::new(),
            stars,
            score: 0,
            level: 1,
            lives: START_LIVES,
            combo: 0,
            last_hit_ms: 0.0,
            powerup: 0.0,
            aim: Vec2::ZERO,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Whether the simulation should advance
    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Add points and recompute the derived level.
    ///
    /// The only way score changes; keeps `level = score/1000 + 1` holding
    /// after every update, including diamond and gold-ram bonuses.
    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        self.level = (self.score / LEVEL_STEP) as u32 + 1;
    }

    /// Register a scoring hit: bump the combo streak and refresh the decay
    /// window.
    pub fn register_hit(&mut self, now_ms: f64) {
        self.combo += 1;
        self.last_hit_ms = now_ms;
    }

    /// Difficulty multiplier, a step function of level. This is the sole
    /// difficulty-scaling mechanism.
    pub fn speed_multiplier(&self) -> f32 {
        if self.level >= 30 {
            4.5
        } else if self.level >= 20 {
            4.0
        } else if self.level >= 10 {
            2.0
        } else {
            1.0
        }
    }

    /// Current forward speed of asteroids/diamonds, units per tick
    #[inline]
    pub fn current_speed(&self) -> f32 {
        BASE_SPEED * self.speed_multiplier()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the tick's side effects to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Initial star scatter: lateral positions across the scatter area, depth
/// uniformly through [-STAR_DEPTH, 0).
fn scatter_starfield(rng: &mut Pcg32) -> Vec<Vec3> {
    (0..STAR_COUNT)
        .map(|_| {
            Vec3::new(
                (rng.random::<f32>() - 0.5) * STAR_SCATTER,
                (rng.random::<f32>() - 0.5) * STAR_SCATTER,
                rng.random::<f32>() * -STAR_DEPTH,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_reset() {
        let state = GameState::new(7);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.combo, 0);
        assert_eq!(state.powerup, 0.0);
        assert!(state.is_active());
        assert!(state.asteroids.is_empty());
        assert!(state.bullets.is_empty());
        assert!(state.diamonds.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.stars.len(), STAR_COUNT);
    }

    #[test]
    fn test_add_score_recomputes_level() {
        let mut state = GameState::new(7);
        state.add_score(999);
        assert_eq!(state.level, 1);
        state.add_score(1);
        assert_eq!(state.level, 2);
        state.add_score(29_000);
        assert_eq!(state.level, 31);
    }

    #[test]
    fn test_speed_multiplier_steps() {
        let mut state = GameState::new(7);
        assert_eq!(state.speed_multiplier(), 1.0);
        state.add_score(9_000); // level 10
        assert_eq!(state.speed_multiplier(), 2.0);
        state.add_score(10_000); // level 20
        assert_eq!(state.speed_multiplier(), 4.0);
        state.add_score(10_000); // level 30
        assert_eq!(state.speed_multiplier(), 4.5);
    }

    #[test]
    fn test_starfield_within_bounds() {
        let state = GameState::new(42);
        for star in &state.stars {
            assert!(star.x.abs() <= STAR_SCATTER / 2.0);
            assert!(star.y.abs() <= STAR_SCATTER / 2.0);
            assert!(star.z <= 0.0 && star.z >= -STAR_DEPTH);
        }
    }

    #[test]
    fn test_same_seed_same_starfield() {
        let a = GameState::new(1234);
        let b = GameState::new(1234);
        assert_eq!(a.stars, b.stars);
    }
}
