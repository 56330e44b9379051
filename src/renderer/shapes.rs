//! Scene geometry: projects the 3D view-space simulation onto the screen
//! and emits flat-colored triangles.
//!
//! Projection happens here on the CPU. Everything is drawn in "y-units"
//! (half the screen height == 1.0) and squeezed by the aspect ratio at
//! vertex-emit time, so circles stay round on wide screens.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use super::vertex::{colors, Vertex};
use crate::consts::{CAMERA_FOV_DEG, CAMERA_Z};
use crate::sim::{AsteroidKind, GameState};
use crate::Settings;

/// Anything closer to the camera than this is dropped
const NEAR_PLANE: f32 = 0.5;

/// Collects projected triangles for one frame
pub struct SceneBuilder {
    vertices: Vec<Vertex>,
    aspect: f32,
    /// 1 / tan(fov/2), the perspective focal factor
    focal: f32,
}

impl SceneBuilder {
    pub fn new(aspect: f32) -> Self {
        Self {
            vertices: Vec::new(),
            aspect,
            focal: 1.0 / (CAMERA_FOV_DEG.to_radians() / 2.0).tan(),
        }
    }

    /// Project a view-space point to (screen position in y-units, scale).
    /// Returns None behind or too close to the camera.
    fn project(&self, pos: Vec3) -> Option<(Vec2, f32)> {
        let depth = CAMERA_Z - pos.z;
        if depth < NEAR_PLANE {
            return None;
        }
        let scale = self.focal / depth;
        Some((Vec2::new(pos.x, pos.y) * scale, scale))
    }

    fn push(&mut self, p: Vec2, color: [f32; 4]) {
        self.vertices.push(Vertex::new(p.x / self.aspect, p.y, color));
    }

    /// Rotated hexagon, cheaper than a circle and reads as a tumbling rock
    fn hexagon(&mut self, center: Vec2, radius: f32, angle: f32, color: [f32; 4]) {
        for i in 0..6u32 {
            let theta1 = angle + (i as f32 / 6.0) * 2.0 * PI;
            let theta2 = angle + ((i + 1) as f32 / 6.0) * 2.0 * PI;
            self.push(center, color);
            self.push(center + radius * Vec2::from_angle(theta1), color);
            self.push(center + radius * Vec2::from_angle(theta2), color);
        }
    }

    /// Axis-aligned quad (two triangles)
    fn quad(&mut self, center: Vec2, half: Vec2, color: [f32; 4]) {
        let a = center + Vec2::new(-half.x, -half.y);
        let b = center + Vec2::new(half.x, -half.y);
        let c = center + Vec2::new(half.x, half.y);
        let d = center + Vec2::new(-half.x, half.y);
        self.push(a, color);
        self.push(b, color);
        self.push(c, color);
        self.push(a, color);
        self.push(c, color);
        self.push(d, color);
    }

    /// The starfield, drawn first so everything else overdraws it. Depth
    /// fades brightness; the preset decides how many points get drawn.
    fn starfield(&mut self, state: &GameState, count: usize) {
        for star in state.stars.iter().take(count) {
            let Some((p, scale)) = self.project(*star) else {
                continue;
            };
            if p.x.abs() > self.aspect * 1.1 || p.y.abs() > 1.1 {
                continue;
            }
            let brightness = (scale * 60.0).clamp(0.1, 1.0);
            let mut color = colors::STAR;
            color[3] = brightness;
            let size = 0.0015 + scale * 0.05;
            self.quad(p, Vec2::splat(size), color);
        }
    }

    fn ship(&mut self, state: &GameState, tilt: bool) {
        let Some((p, scale)) = self.project(state.ship.pos) else {
            return;
        };
        let bank = if tilt { state.ship.rot.z } else { 0.0 };
        let rot = Vec2::from_angle(bank * 2.0);
        let size = scale * 0.9;

        // Chevron: nose up, swept wings
        let nose = p + rot.rotate(Vec2::new(0.0, size));
        let left = p + rot.rotate(Vec2::new(-size * 0.7, -size * 0.6));
        let right = p + rot.rotate(Vec2::new(size * 0.7, -size * 0.6));
        let tail = p + rot.rotate(Vec2::new(0.0, -size * 0.25));

        self.push(nose, colors::SHIP_HULL);
        self.push(left, colors::SHIP_WING);
        self.push(tail, colors::SHIP_HULL);

        self.push(nose, colors::SHIP_HULL);
        self.push(tail, colors::SHIP_HULL);
        self.push(right, colors::SHIP_WING);
    }

    fn asteroids(&mut self, state: &GameState) {
        for a in &state.asteroids {
            let Some((p, scale)) = self.project(a.pos) else {
                continue;
            };
            let color = match a.kind {
                AsteroidKind::Gold => colors::ASTEROID_GOLD,
                AsteroidKind::Standard => colors::ASTEROID_STANDARD,
            };
            self.hexagon(p, a.radius * scale, a.rot.z, color);
        }
    }

    fn bullets(&mut self, state: &GameState) {
        for b in &state.bullets {
            if let Some((p, scale)) = self.project(b.pos) {
                self.quad(p, Vec2::new(scale * 0.08, scale * 0.35), colors::BULLET);
            }
        }
    }

    /// Diamonds spin about y; foreshorten the width by the spin angle
    fn diamonds(&mut self, state: &GameState) {
        for d in &state.diamonds {
            let Some((p, scale)) = self.project(d.pos) else {
                continue;
            };
            let w = scale * 0.5 * d.rot_y.cos().abs().max(0.15);
            let h = scale * 0.5;
            let top = p + Vec2::new(0.0, h);
            let bottom = p - Vec2::new(0.0, h);
            let left = p - Vec2::new(w, 0.0);
            let right = p + Vec2::new(w, 0.0);
            self.push(top, colors::DIAMOND);
            self.push(left, colors::DIAMOND);
            self.push(right, colors::DIAMOND);
            self.push(bottom, colors::DIAMOND);
            self.push(right, colors::DIAMOND);
            self.push(left, colors::DIAMOND);
        }
    }

    /// Particle scale and alpha both track remaining life
    fn particles(&mut self, state: &GameState, cap: usize) {
        for p in state.particles.iter().take(cap) {
            let Some((pos, scale)) = self.project(p.pos) else {
                continue;
            };
            let mut color = p.color;
            color[3] *= p.life;
            self.quad(pos, Vec2::splat(scale * 0.12 * p.life), color);
        }
    }

    fn finish(self) -> Vec<Vertex> {
        self.vertices
    }
}

/// Build the full frame's vertex list from the current simulation state.
pub fn scene_vertices(state: &GameState, settings: &Settings, aspect: f32) -> Vec<Vertex> {
    let mut scene = SceneBuilder::new(aspect);
    scene.starfield(state, settings.quality.star_count());
    scene.asteroids(state);
    scene.diamonds(state);
    scene.bullets(state);
    scene.particles(state, settings.max_particles());
    scene.ship(state, settings.effective_ship_tilt());
    scene.finish()
}
