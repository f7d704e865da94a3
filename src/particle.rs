//! Particles, the walls they bounce between, and the ordered collection that owns them.
//!
//! Everything here is plain data driven by the frame loop in
//! [`crate::simulation`]; nothing touches Bevy's ECS.  Randomness is always
//! passed in as a `&mut impl Rng` so tests can seed it.

use crate::config::FieldConfig;
use bevy::prelude::*;
use rand::Rng;

// ── Bounds ────────────────────────────────────────────────────────────────────

/// The viewport particles live in, in screen space (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Box a centre point of the given radius may occupy.
    ///
    /// Collapses to a single point (rather than inverting) when the viewport
    /// is narrower than the particle, e.g. while the window is minimised.
    pub fn inner(&self, radius: f32) -> (Vec2, Vec2) {
        let min = Vec2::splat(radius);
        let max = Vec2::new(self.width - radius, self.height - radius).max(min);
        (min, max)
    }

    /// Clamp `point` into the box a particle of `radius` may occupy.
    pub fn clamp(&self, point: Vec2, radius: f32) -> Vec2 {
        let (min, max) = self.inner(radius);
        point.clamp(min, max)
    }
}

/// Wall-bounce parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    /// Hard cap on the reflected velocity component.
    pub max_speed: f32,
    /// Scale of the uniform `[-1, 1]` jitter added on reflection.
    pub jitter: f32,
}

impl From<&FieldConfig> for Bounce {
    fn from(config: &FieldConfig) -> Self {
        Self {
            max_speed: config.max_speed,
            jitter: config.bounce_jitter,
        }
    }
}

// ── Particle ──────────────────────────────────────────────────────────────────

/// A single moving point.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Unique within a session; assigned by [`ParticleField`].
    pub id: u64,
    pub position: Vec2,
    /// Units per frame.
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Srgba,
}

impl Particle {
    /// Move by one frame of velocity and bounce off any wall that was reached.
    ///
    /// Each axis is handled independently.  On contact the position is
    /// clamped onto the wall and the axis velocity becomes
    /// `clamp(-v + jitter, -max_speed, max_speed)`.
    pub fn advance<R: Rng + ?Sized>(&mut self, bounds: Bounds, bounce: Bounce, rng: &mut R) {
        self.position += self.velocity;

        let (min, max) = bounds.inner(self.radius);
        bounce_axis(
            &mut self.position.x,
            &mut self.velocity.x,
            min.x,
            max.x,
            bounce,
            rng,
        );
        bounce_axis(
            &mut self.position.y,
            &mut self.velocity.y,
            min.y,
            max.y,
            bounce,
            rng,
        );
    }
}

fn bounce_axis<R: Rng + ?Sized>(
    p: &mut f32,
    v: &mut f32,
    lo: f32,
    hi: f32,
    bounce: Bounce,
    rng: &mut R,
) {
    if *p > lo && *p < hi {
        return;
    }
    *p = p.clamp(lo, hi);
    let jitter = if bounce.jitter > 0.0 {
        rng.gen_range(-1.0_f32..=1.0) * bounce.jitter
    } else {
        0.0
    };
    *v = (-*v + jitter).clamp(-bounce.max_speed, bounce.max_speed);
}

/// Random fully-opaque colour: uniform hue, fixed saturation and lightness.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Srgba {
    let hue = rng.gen_range(0.0_f32..360.0);
    Color::hsl(hue, 0.85, 0.6).to_srgba()
}

/// Uniform sample in `[lo, hi]`, or the midpoint if the range is inverted.
fn sample_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi < lo {
        (lo + hi) * 0.5
    } else {
        rng.gen_range(lo..=hi)
    }
}

fn random_velocity<R: Rng + ?Sized>(rng: &mut R, range: f32) -> Vec2 {
    Vec2::new(
        sample_between(rng, -range, range),
        sample_between(rng, -range, range),
    )
}

// ── Collection ────────────────────────────────────────────────────────────────

/// Ordered particle collection with a separately tracked live count.
///
/// Order is insertion order.  It carries no simulation meaning but keeps
/// per-frame iteration stable.  Mutation only happens between frames (see
/// [`crate::simulation::FieldState::apply_intent`]), never while the frame
/// loop is iterating.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    count: usize,
    next_id: u64,
}

impl ParticleField {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Running count shown in the debug overlay.  Always equals `len()`.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Append a particle and return its id.
    pub fn spawn(&mut self, position: Vec2, velocity: Vec2, radius: f32, color: Srgba) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.particles.push(Particle {
            id,
            position,
            velocity,
            radius,
            color,
        });
        self.count += 1;
        debug_assert_eq!(self.count, self.particles.len());
        id
    }

    /// Spawn one particle scattered around `point` with a random velocity and colour.
    pub fn spawn_near<R: Rng + ?Sized>(
        &mut self,
        point: Vec2,
        bounds: Bounds,
        config: &FieldConfig,
        rng: &mut R,
    ) -> u64 {
        let scatter = config.spawn_scatter;
        let offset = Vec2::new(
            sample_between(rng, -scatter, scatter),
            sample_between(rng, -scatter, scatter),
        );
        let position = bounds.clamp(point + offset, config.particle_radius);
        let velocity = random_velocity(rng, config.initial_speed_range);
        let color = random_color(rng);
        self.spawn(position, velocity, config.particle_radius, color)
    }

    /// Bulk-generate `n` particles uniformly over the viewport.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        bounds: Bounds,
        config: &FieldConfig,
        rng: &mut R,
    ) {
        self.particles.reserve(n);
        let margin = config.initial_edge_margin;
        for _ in 0..n {
            let raw = Vec2::new(
                sample_between(rng, margin, bounds.width - margin),
                sample_between(rng, margin, bounds.height - margin),
            );
            let position = bounds.clamp(raw, config.particle_radius);
            let velocity = random_velocity(rng, config.initial_speed_range);
            let color = random_color(rng);
            self.spawn(position, velocity, config.particle_radius, color);
        }
    }

    /// Remove and return the particle closest to `point`, if one lies within `max_dist`.
    ///
    /// Unlike neighbour queries there is no self-exclusion: a particle exactly
    /// under `point` is a valid target.  Ties go to the earliest particle.
    pub fn remove_nearest(&mut self, point: Vec2, max_dist: f32) -> Option<Particle> {
        let max_dist_sq = max_dist * max_dist;
        let mut best: Option<(usize, f32)> = None;
        for (i, p) in self.particles.iter().enumerate() {
            let d = p.position.distance_squared(point);
            if d <= max_dist_sq && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        let (index, _) = best?;
        self.count -= 1;
        let removed = self.particles.remove(index);
        debug_assert_eq!(self.count, self.particles.len());
        Some(removed)
    }

    /// Remove every particle and reset the live count.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.count = 0;
    }
}
