use dermis::config::{Color, ParticleSystemConfig, SkinShaderConfig};
use dermis::engine::Engine;
use dermis::renderer::head_pipeline::RenderMode;

use glam::Vec3;

/// Demo scene: the shaded head with an ember-like particle ring rising
/// around it.  Drag to orbit, scroll to zoom, keys 1–4 switch the render
/// mode (depth / normal / skin / combined), Esc quits.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dermis=info")),
        )
        .init();

    let particles = ParticleSystemConfig {
        emitter_position: Vec3::new(0.0, -1.8, 0.0),
        emitter_radius: 2.2,
        emission_rate: 120.0,
        max_particles: 2000,
        particle_lifetime: 3.5,
        start_speed: 0.6,
        start_size: 0.06,
        end_size: 0.01,
        start_color: Color::from_hex("#ffa040"),
        end_color: Color::from_hex("#40201a"),
        gravity: -0.25,
        wind: Vec3::new(0.15, 0.0, 0.0),
        drag: 0.2,
        turbulence: 0.8,
        fade_in: 0.15,
        fade_out: 0.35,
    };

    let skin = SkinShaderConfig {
        skin_color: Color::from_hex("#ffdbcc"),
        subsurface_scattering: 0.3,
        roughness: 0.4,
        metalness: 0.1,
        head_position: Vec3::ZERO,
        light_direction: Vec3::new(1.0, 1.0, 1.0),
        light_color: Color::WHITE,
    };

    Engine::builder()
        .with_title("dermis — skin shading demo")
        .with_size(1280, 720)
        .with_particle_config(particles)
        .with_skin_config(skin)
        .with_render_mode(RenderMode::Combined)
        .run();
}
