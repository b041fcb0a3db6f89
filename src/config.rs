use glam::Vec3;
use serde::{Deserialize, Serialize};

// ── Color ──────────────────────────────────────────────────────────────────

/// Linear RGB color triple. Serialized as a `"#rrggbb"` hex string; malformed
/// input falls back to white rather than failing, so a bad color in a config
/// snapshot degrades the look, not the frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0]);
    pub const SKIN: Self = Self([1.0, 0.858_824, 0.8]);

    /// Parse a `"#rrggbb"` (or `"rrggbb"`) hex string.  Returns `None` on
    /// malformed input; use [`Color::from_hex`] for the fallback behaviour.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self([
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        ]))
    }

    /// Parse a hex color string, falling back to white on malformed input.
    pub fn from_hex(s: &str) -> Self {
        Self::parse_hex(s).unwrap_or(Self::WHITE)
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!(
            "#{:02x}{:02x}{:02x}",
            (r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (b.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        Self::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

// ── ParticleSystemConfig ───────────────────────────────────────────────────

/// Particle system configuration snapshot.
///
/// Owned by the caller and replaced wholesale on edits; the simulator reads
/// it once per tick and never mutates it.  All fields are plain data so a
/// snapshot can be loaded from JSON (`from_json`) or built in code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystemConfig {
    /// World-space center of the emitter disc.
    pub emitter_position: Vec3,
    /// Radius of the emitter disc (particles spawn in the XZ plane).
    pub emitter_radius: f32,
    /// Particles emitted per second.  Zero or negative disables emission.
    pub emission_rate: f32,
    /// Hard cap on the live pool size.
    pub max_particles: usize,
    /// Seconds a particle lives after spawning.
    pub particle_lifetime: f32,
    /// Initial speed magnitude; actual speed is jittered ±25 %.
    pub start_speed: f32,
    /// Size at spawn, lerped toward `end_size` over the lifetime.
    pub start_size: f32,
    pub end_size: f32,
    /// Color at spawn, lerped toward `end_color` over the lifetime.
    pub start_color: Color,
    pub end_color: Color,
    /// Downward acceleration applied to `velocity.y` each second.
    pub gravity: f32,
    /// Constant acceleration applied to the full velocity each second.
    pub wind: Vec3,
    /// Velocity damping coefficient (`velocity *= 1 - drag·dt`, clamped ≥ 0).
    pub drag: f32,
    /// Per-axis random jitter magnitude added to velocity each second.
    pub turbulence: f32,
    /// Fraction of normalized lifetime spent fading in.  Zero = no fade.
    pub fade_in: f32,
    /// Fraction of normalized lifetime spent fading out.  Zero = no fade.
    pub fade_out: f32,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        Self {
            emitter_position: Vec3::new(0.0, -2.0, 0.0),
            emitter_radius: 2.0,
            emission_rate: 50.0,
            max_particles: 1000,
            particle_lifetime: 3.0,
            start_speed: 1.0,
            start_size: 0.1,
            end_size: 0.02,
            start_color: Color([1.0, 0.6, 0.2]),
            end_color: Color([0.2, 0.05, 0.0]),
            gravity: 0.5,
            wind: Vec3::ZERO,
            drag: 0.1,
            turbulence: 0.5,
            fade_in: 0.1,
            fade_out: 0.3,
        }
    }
}

impl ParticleSystemConfig {
    /// Load a snapshot from a JSON string.  Missing fields take defaults;
    /// malformed color strings fall back to white.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Return a copy with the fade fractions clamped to `[0, 1]` and the
    /// other out-of-range fields pulled back to safe no-op values.
    pub fn clamped(mut self) -> Self {
        self.emitter_radius = self.emitter_radius.max(0.0);
        self.particle_lifetime = self.particle_lifetime.max(0.0);
        self.fade_in = self.fade_in.clamp(0.0, 1.0);
        self.fade_out = self.fade_out.clamp(0.0, 1.0);
        self
    }
}

// ── SkinShaderConfig ───────────────────────────────────────────────────────

/// Skin shading parameter snapshot, synced into the composite program every
/// frame.  Replaced wholesale on edits, like [`ParticleSystemConfig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinShaderConfig {
    /// Base albedo of the skin surface.
    pub skin_color: Color,
    /// Strength of the depth-thickness subsurface term, in `[0, 1]`.
    pub subsurface_scattering: f32,
    /// Carried in the uniform block for the documented schema; the current
    /// approximation does not sample it.
    pub roughness: f32,
    /// Carried in the uniform block for the documented schema; the current
    /// approximation does not sample it.
    pub metalness: f32,
    /// World-space position of the head mesh.
    pub head_position: Vec3,
    /// Direction *toward* the light; normalized before upload.
    pub light_direction: Vec3,
    pub light_color: Color,
}

impl Default for SkinShaderConfig {
    fn default() -> Self {
        Self {
            skin_color: Color::from_hex("#ffdbcc"),
            subsurface_scattering: 0.3,
            roughness: 0.4,
            metalness: 0.1,
            head_position: Vec3::ZERO,
            light_direction: Vec3::ONE,
            light_color: Color::WHITE,
        }
    }
}

impl SkinShaderConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Return a copy with the scalar parameters clamped to `[0, 1]`.
    pub fn clamped(mut self) -> Self {
        self.subsurface_scattering = self.subsurface_scattering.clamp(0.0, 1.0);
        self.roughness = self.roughness.clamp(0.0, 1.0);
        self.metalness = self.metalness.clamp(0.0, 1.0);
        self
    }
}
