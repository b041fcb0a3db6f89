use dermis::config::{Color, ParticleSystemConfig};
use dermis::particles::ParticleSimulator;
use dermis::particles::buffer::ParticleBuffers;
use glam::Vec3;

// Helper: a config with all forces disabled so positions and velocities
// stay where the emitter put them.
fn still_config() -> ParticleSystemConfig {
    ParticleSystemConfig {
        emitter_position: Vec3::ZERO,
        emitter_radius: 1.0,
        emission_rate: 50.0,
        max_particles: 10,
        particle_lifetime: 10.0,
        start_speed: 1.0,
        start_size: 0.5,
        end_size: 0.1,
        start_color: Color([1.0, 0.0, 0.0]),
        end_color: Color([0.0, 0.0, 1.0]),
        gravity: 0.0,
        wind: Vec3::ZERO,
        drag: 0.0,
        turbulence: 0.0,
        fade_in: 0.0,
        fade_out: 0.0,
    }
}

// ── Pool cap (Scenario A) ─────────────────────────────────────────────────

#[test]
fn pool_caps_at_max_particles() {
    // rate 50 × dt 1.0 wants 50 spawns per tick; the cap wins.
    let mut sim = ParticleSimulator::with_seed(still_config(), 7);
    for _ in 0..3 {
        sim.tick(1.0);
        assert!(sim.len() <= 10);
    }
    assert_eq!(sim.len(), 10);
}

#[test]
fn cap_holds_across_long_runs() {
    let cfg = ParticleSystemConfig {
        max_particles: 64,
        emission_rate: 500.0,
        particle_lifetime: 0.3,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 3);
    for _ in 0..200 {
        sim.tick(0.05);
        assert!(sim.len() <= 64);
    }
}

// ── Lifetime (Scenario B) ─────────────────────────────────────────────────

#[test]
fn particle_removed_when_cumulative_dt_reaches_lifetime() {
    let cfg = ParticleSystemConfig {
        emission_rate: 2.0,
        max_particles: 1,
        particle_lifetime: 3.0,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 1);

    // Tick 1 spawns the particle and immediately ages it by dt.
    sim.tick(0.5);
    assert_eq!(sim.len(), 1);

    // Ticks 2–5: still alive (cumulative age 1.0 … 2.5).
    for _ in 0..4 {
        sim.tick(0.5);
        assert_eq!(sim.len(), 1);
    }

    // Tick 6: cumulative age reaches 3.0 — removed on this tick, not the
    // next.  Emission was blocked this tick because the pool was full when
    // the emitter ran.
    sim.tick(0.5);
    assert_eq!(sim.len(), 0);
}

#[test]
fn remaining_life_decreases_by_exactly_dt() {
    let cfg = ParticleSystemConfig {
        emission_rate: 2.0,
        max_particles: 1,
        particle_lifetime: 5.0,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 2);
    sim.tick(0.5);
    let mut prev = sim.pool()[0].remaining_life;
    for _ in 0..8 {
        sim.tick(0.5);
        let cur = sim.pool()[0].remaining_life;
        assert!((prev - cur - 0.5).abs() < 1e-5);
        prev = cur;
    }
}

// ── Fade policy (Scenario C) ──────────────────────────────────────────────

#[test]
fn alpha_follows_fade_policy_over_lifetime() {
    let cfg = ParticleSystemConfig {
        emission_rate: 20.0,
        max_particles: 1,
        particle_lifetime: 1.0,
        fade_in: 0.2,
        fade_out: 0.3,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 5);

    // Tick 1 spawns and ages to life_ratio 0.05.
    sim.tick(0.05);
    assert!((sim.pool()[0].alpha - 0.25).abs() < 1e-3);

    // life_ratio 0.1 → halfway through the fade-in.
    sim.tick(0.05);
    assert!((sim.pool()[0].alpha - 0.5).abs() < 1e-3);

    // life_ratio 0.5 → plateau.
    for _ in 0..8 {
        sim.tick(0.05);
    }
    assert!((sim.pool()[0].alpha - 1.0).abs() < 1e-3);

    // life_ratio 0.85 → halfway through the fade-out.
    for _ in 0..7 {
        sim.tick(0.05);
    }
    assert!((sim.pool()[0].alpha - 0.5).abs() < 1e-2);
}

#[test]
fn zero_fade_fractions_hold_alpha_at_one() {
    let cfg = ParticleSystemConfig {
        emission_rate: 20.0,
        max_particles: 1,
        particle_lifetime: 1.0,
        fade_in: 0.0,
        fade_out: 0.0,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 6);
    sim.tick(0.05);
    assert_eq!(sim.pool()[0].alpha, 1.0);
    for _ in 0..15 {
        sim.tick(0.05);
        if let Some(p) = sim.pool().first() {
            assert_eq!(p.alpha, 1.0);
        }
    }
}

// ── Emission edge cases ───────────────────────────────────────────────────

#[test]
fn zero_emission_rate_never_emits() {
    let cfg = ParticleSystemConfig {
        emission_rate: 0.0,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 9);
    for _ in 0..50 {
        sim.tick(0.1);
    }
    assert_eq!(sim.len(), 0);
}

#[test]
fn negative_emission_rate_never_emits() {
    let cfg = ParticleSystemConfig {
        emission_rate: -5.0,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 9);
    for _ in 0..50 {
        sim.tick(0.1);
    }
    assert_eq!(sim.len(), 0);
}

#[test]
fn spawns_lie_on_emitter_disc_with_jittered_speed() {
    let cfg = ParticleSystemConfig {
        emitter_position: Vec3::new(3.0, 1.0, -2.0),
        emitter_radius: 2.0,
        emission_rate: 2.0e6,
        max_particles: 500,
        start_speed: 1.0,
        ..still_config()
    };
    // dt covers 1000 emission intervals (the cap stops at 500) but is small
    // enough that the first integration step moves nothing measurable, so
    // spawn positions survive the tick.
    let mut sim = ParticleSimulator::with_seed(cfg, 11);
    sim.tick(5e-4);
    assert_eq!(sim.len(), 500);

    for p in sim.pool() {
        let dx = p.position.x - 3.0;
        let dz = p.position.z + 2.0;
        assert!((dx * dx + dz * dz).sqrt() <= 2.0 + 1e-3);
        assert!((p.position.y - 1.0).abs() < 1e-3);

        // Horizontal speed carries the ±25 % jitter; vertical jitter is at
        // most a quarter of that magnitude.
        let horizontal = (p.velocity.x * p.velocity.x + p.velocity.z * p.velocity.z).sqrt();
        assert!((0.75 - 1e-3..=1.25 + 1e-3).contains(&horizontal));
        assert!(p.velocity.y.abs() <= 0.625 + 1e-3);
    }
}

// ── Physics ───────────────────────────────────────────────────────────────

#[test]
fn drag_clamp_prevents_velocity_sign_flip() {
    // drag·dt = 3 would scale velocity by −2 without the clamp.
    let cfg = ParticleSystemConfig {
        emission_rate: 2.0,
        max_particles: 1,
        particle_lifetime: 10.0,
        drag: 3.0,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 13);
    sim.tick(1.0);
    assert_eq!(sim.len(), 1);
    assert_eq!(sim.pool()[0].velocity, Vec3::ZERO);
}

#[test]
fn gravity_pulls_velocity_down() {
    let cfg = ParticleSystemConfig {
        emission_rate: 2.0,
        max_particles: 1,
        particle_lifetime: 10.0,
        start_speed: 0.0,
        gravity: 2.0,
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 17);
    sim.tick(0.5);
    assert!((sim.pool()[0].velocity.y + 1.0).abs() < 1e-5);
    sim.tick(0.5);
    assert!((sim.pool()[0].velocity.y + 2.0).abs() < 1e-5);
}

#[test]
fn size_and_color_interpolate_with_age() {
    let cfg = ParticleSystemConfig {
        emission_rate: 20.0,
        max_particles: 1,
        particle_lifetime: 1.0,
        start_size: 1.0,
        end_size: 0.0,
        start_color: Color([1.0, 0.0, 0.0]),
        end_color: Color([0.0, 0.0, 1.0]),
        ..still_config()
    };
    let mut sim = ParticleSimulator::with_seed(cfg, 19);
    for _ in 0..10 {
        sim.tick(0.05);
    }
    // life_ratio 0.5: size halfway, color halfway.
    let p = &sim.pool()[0];
    assert!((p.size - 0.5).abs() < 1e-3);
    assert!((p.color[0] - 0.5).abs() < 1e-3);
    assert!((p.color[2] - 0.5).abs() < 1e-3);
}

// ── Determinism ───────────────────────────────────────────────────────────

#[test]
fn same_seed_same_trajectories() {
    let mut a = ParticleSimulator::with_seed(still_config(), 42);
    let mut b = ParticleSimulator::with_seed(still_config(), 42);
    for _ in 0..30 {
        a.tick(0.033);
        b.tick(0.033);
    }
    assert_eq!(a.len(), b.len());
    for (pa, pb) in a.pool().iter().zip(b.pool()) {
        assert_eq!(pa.position, pb.position);
        assert_eq!(pa.velocity, pb.velocity);
    }
}

// ── Attribute arrays ──────────────────────────────────────────────────────

#[test]
fn buffer_lengths_match_live_count() {
    let mut sim = ParticleSimulator::with_seed(still_config(), 23);
    let mut buffers = ParticleBuffers::new(10);

    for _ in 0..5 {
        sim.tick(0.1);
        buffers.rebuild(sim.pool());

        let n = sim.len();
        assert_eq!(buffers.len(), n);
        assert_eq!(buffers.positions().len(), 3 * n);
        assert_eq!(buffers.colors().len(), 3 * n);
        assert_eq!(buffers.sizes().len(), n);
        assert_eq!(buffers.alphas().len(), n);
    }
}

#[test]
fn buffer_index_i_refers_to_same_particle_across_arrays() {
    let mut sim = ParticleSimulator::with_seed(still_config(), 29);
    for _ in 0..4 {
        sim.tick(0.1);
    }
    let mut buffers = ParticleBuffers::new(10);
    buffers.rebuild(sim.pool());

    for (i, p) in sim.pool().iter().enumerate() {
        assert_eq!(buffers.positions()[i * 3], p.position.x);
        assert_eq!(buffers.positions()[i * 3 + 1], p.position.y);
        assert_eq!(buffers.positions()[i * 3 + 2], p.position.z);
        assert_eq!(buffers.colors()[i * 3], p.color[0]);
        assert_eq!(buffers.sizes()[i], p.size);
        assert_eq!(buffers.alphas()[i], p.alpha);
    }
}

#[test]
fn buffer_storage_is_reused_across_rebuilds() {
    let mut sim = ParticleSimulator::with_seed(still_config(), 31);
    let mut buffers = ParticleBuffers::new(10);
    assert_eq!(buffers.capacity(), 10);

    for _ in 0..20 {
        sim.tick(0.25);
        buffers.rebuild(sim.pool());
        assert_eq!(buffers.capacity(), 10);
    }
}
