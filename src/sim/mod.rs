//! Deterministic game simulation: no rendering or platform dependencies.
//!
//! The host drives [`tick::tick`] once per animation frame against a single
//! [`GameState`], then drains [`GameEvent`]s for audio and game-over
//! handling. Seeding the state makes a whole run's spawn stream replayable.

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod viewport;

pub use state::{
    Asteroid, AsteroidKind, Bullet, Diamond, GameEvent, GamePhase, GameState, Particle, Ship,
};
pub use tick::{tick, TickInput};
pub use viewport::Viewport;
