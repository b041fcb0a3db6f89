pub mod buffer;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::ParticleSystemConfig;

// ── Particle ───────────────────────────────────────────────────────────────

/// One live particle.  Owned exclusively by the simulator's pool; everything
/// here is recomputed or advanced once per tick.
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds until removal.  Invariant: `0 ≤ remaining_life ≤ max_life`.
    pub remaining_life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: [f32; 3],
    pub alpha: f32,
}

impl Particle {
    /// Normalized age: `0` at spawn, approaching `1` at death.
    pub fn life_ratio(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 1.0;
        }
        1.0 - self.remaining_life / self.max_life
    }
}

// ── Interpolation helpers ──────────────────────────────────────────────────

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_color(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        lerp(a[0], b[0], t),
        lerp(a[1], b[1], t),
        lerp(a[2], b[2], t),
    ]
}

/// Alpha fade policy over normalized lifetime.
///
/// Piecewise linear and continuous at both fade boundaries:
/// ```text
/// life_ratio < fade_in       → life_ratio / fade_in        (ramp 0 → 1)
/// life_ratio > 1 - fade_out  → (1 - life_ratio) / fade_out (ramp 1 → 0)
/// otherwise                  → 1
/// ```
/// `fade_in == 0` makes the first branch unreachable (alpha is 1 from
/// spawn); `fade_out == 0` makes the second unreachable (alpha holds 1
/// until removal).  Neither zero can divide — this is a pure function so
/// the boundary behaviour can be tested directly.
pub fn fade_alpha(life_ratio: f32, fade_in: f32, fade_out: f32) -> f32 {
    if fade_in > 0.0 && life_ratio < fade_in {
        life_ratio / fade_in
    } else if fade_out > 0.0 && life_ratio > 1.0 - fade_out {
        (1.0 - life_ratio) / fade_out
    } else {
        1.0
    }
}

// ── ParticleSimulator ──────────────────────────────────────────────────────

/// CPU particle simulation: per-frame emission, physics integration, and
/// lifetime attribute interpolation for a bounded pool.
///
/// Driven externally — the host loop calls [`tick`](Self::tick) once per
/// frame with the frame's time delta.  The pool never exceeds
/// `config.max_particles` and removal uses `swap_remove`, so particle order
/// is not stable across ticks (nothing downstream relies on it).
pub struct ParticleSimulator {
    config: ParticleSystemConfig,
    pool: Vec<Particle>,
    /// Emission time debt; spawns trigger while it exceeds `1/emission_rate`.
    emission_time: f32,
    /// Total simulated seconds since construction or `reset`.
    elapsed: f32,
    rng: StdRng,
}

impl ParticleSimulator {
    pub fn new(config: ParticleSystemConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic simulator for tests and replays.
    pub fn with_seed(config: ParticleSystemConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ParticleSystemConfig, rng: StdRng) -> Self {
        let capacity = config.max_particles;
        Self {
            config,
            pool: Vec::with_capacity(capacity),
            emission_time: 0.0,
            elapsed: 0.0,
            rng,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn pool(&self) -> &[Particle] {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    /// Replace the configuration snapshot wholesale.  Takes effect on the
    /// next tick; live particles keep the lifetime and colors they were
    /// spawned with interpolating against the new endpoints.
    pub fn set_config(&mut self, config: ParticleSystemConfig) {
        self.config = config;
    }

    /// Drop all live particles and zero the accumulators.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.emission_time = 0.0;
        self.elapsed = 0.0;
    }

    // ── Tick ───────────────────────────────────────────────────────────────

    /// Advance the simulation by `dt` seconds: emit, then update every live
    /// particle in one pass.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.emission_time += dt;

        self.emit();
        self.update(dt);
    }

    /// Drain the emission accumulator into new particles.  A non-positive
    /// emission rate never emits (and never divides); a full pool leaves the
    /// accumulated debt in place so it bursts out once particles die.
    fn emit(&mut self) {
        if self.config.emission_rate <= 0.0 {
            return;
        }
        let interval = 1.0 / self.config.emission_rate;
        while self.emission_time >= interval && self.pool.len() < self.config.max_particles {
            let p = self.spawn();
            self.pool.push(p);
            self.emission_time -= interval;
        }
    }

    /// Create one particle at a random point on the emitter disc.
    ///
    /// The radius is sampled uniformly in `[0, emitter_radius]`, which
    /// biases spawns toward the disc center.  Deliberately kept — the
    /// rendered effect was tuned against this distribution.
    fn spawn(&mut self) -> Particle {
        let cfg = &self.config;

        let angle = self.rng.gen_range(0.0f32..TAU);
        let radius = self.rng.gen_range(0.0f32..1.0) * cfg.emitter_radius;
        let position = Vec3::new(
            cfg.emitter_position.x + angle.cos() * radius,
            cfg.emitter_position.y,
            cfg.emitter_position.z + angle.sin() * radius,
        );

        // Fresh angle for the velocity: horizontal direction with a small
        // vertical jitter, magnitude start_speed ± 25 %.
        let dir_angle = self.rng.gen_range(0.0f32..TAU);
        let speed = cfg.start_speed + (self.rng.gen_range(0.0f32..1.0) - 0.5) * cfg.start_speed * 0.5;
        let velocity = Vec3::new(
            dir_angle.cos() * speed,
            (self.rng.gen_range(0.0f32..1.0) - 0.5) * speed * 0.5,
            dir_angle.sin() * speed,
        );

        Particle {
            position,
            velocity,
            remaining_life: cfg.particle_lifetime,
            max_life: cfg.particle_lifetime,
            size: cfg.start_size,
            color: cfg.start_color.0,
            alpha: 1.0,
        }
    }

    /// One pass over the pool: age, remove, integrate, interpolate.
    fn update(&mut self, dt: f32) {
        let cfg = self.config.clone();
        let mut i = 0;
        while i < self.pool.len() {
            self.pool[i].remaining_life -= dt;

            // Remove on the tick remaining_life first reaches zero.  Order
            // is irrelevant, so swap_remove keeps this O(1).
            if self.pool[i].remaining_life <= 0.0 {
                self.pool.swap_remove(i);
                continue;
            }

            let turbulence = if cfg.turbulence > 0.0 {
                Vec3::new(
                    (self.rng.gen_range(0.0f32..1.0) - 0.5) * cfg.turbulence * dt,
                    (self.rng.gen_range(0.0f32..1.0) - 0.5) * cfg.turbulence * dt,
                    (self.rng.gen_range(0.0f32..1.0) - 0.5) * cfg.turbulence * dt,
                )
            } else {
                Vec3::ZERO
            };

            let p = &mut self.pool[i];

            p.position += p.velocity * dt;
            p.velocity.y -= cfg.gravity * dt;
            p.velocity += cfg.wind * dt;
            // Clamp the damping factor so a large drag·dt cannot flip the
            // velocity's sign.
            p.velocity *= (1.0 - cfg.drag * dt).max(0.0);
            p.velocity += turbulence;

            let life_ratio = p.life_ratio();
            p.size = lerp(cfg.start_size, cfg.end_size, life_ratio);
            p.color = lerp_color(cfg.start_color.0, cfg.end_color.0, life_ratio);
            p.alpha = fade_alpha(life_ratio, cfg.fade_in, cfg.fade_out);

            i += 1;
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
