// ── Shading math ────────────────────────────────────────────────────────────
//
// CPU mirrors of the numeric contract the WGSL programs implement.  These
// are pure functions so the depth linearization, the screen-space UV remap,
// and the subsurface/fresnel terms can be tested without a GPU — the shader
// sources in `shaders/` follow these formulas line for line.

use glam::{Vec2, Vec3, Vec4};

/// Linearize a `[0, 1]` fragment depth value against the camera planes:
/// ```text
/// (2·near) / (far + near − z·(far − near))
/// ```
/// Evaluates to ≈ 0 at the near plane and exactly 1 at the far plane.
#[inline]
pub fn linearize_depth(z: f32, near: f32, far: f32) -> f32 {
    (2.0 * near) / (far + near - z * (far - near))
}

/// Remap a clip-space position to the `[0, 1]` screen UV used to sample the
/// off-screen targets.  Y is flipped to match the render-target orientation.
#[inline]
pub fn screen_uv(clip: Vec4) -> Vec2 {
    let ndc = Vec2::new(clip.x, clip.y) / clip.w;
    let uv = ndc * 0.5 + Vec2::splat(0.5);
    Vec2::new(uv.x, 1.0 - uv.y)
}

/// Remap a world-space normal from `[-1, 1]` to the `[0, 1]` range the
/// normal pass writes per channel.
#[inline]
pub fn encode_normal(n: Vec3) -> Vec3 {
    n * 0.5 + Vec3::splat(0.5)
}

/// Subsurface term: back-lighting squared, scaled by the scattering
/// strength and the depth-derived thickness estimate `1 − depth_sample`.
#[inline]
pub fn subsurface_term(normal: Vec3, light_dir: Vec3, scattering: f32, depth_sample: f32) -> f32 {
    let back_light = (-light_dir).dot(normal).max(0.0);
    back_light.powi(2) * scattering * (1.0 - depth_sample)
}

/// Schlick-style fresnel approximation with a squared falloff.
#[inline]
pub fn fresnel_term(normal: Vec3, view_dir: Vec3) -> f32 {
    (1.0 - normal.dot(view_dir).max(0.0)).powi(2)
}

/// Magnitude threshold below which a sampled normal-texture value is
/// treated as empty (background) and ignored.
pub const NORMAL_DETAIL_THRESHOLD: f32 = 0.1;

/// Blend weight of the sampled detail normal into the surface normal.
pub const NORMAL_DETAIL_BLEND: f32 = 0.3;

/// Blend a sampled `[0, 1]`-encoded detail normal 30 % into the surface
/// normal.  Samples below the magnitude threshold leave the normal
/// untouched.
pub fn blend_normal_detail(world_normal: Vec3, normal_sample: Vec3) -> Vec3 {
    if normal_sample.length() > NORMAL_DETAIL_THRESHOLD {
        let detail = (normal_sample * 2.0 - Vec3::ONE).normalize_or_zero();
        world_normal.lerp(detail, NORMAL_DETAIL_BLEND)
    } else {
        world_normal
    }
}

/// Full composite: enhanced diffuse + subsurface·skin_color + fresnel·0.1.
/// Mirrors the skin fragment stage end to end for scenario tests.
pub fn composite_color(
    world_normal: Vec3,
    view_dir: Vec3,
    light_dir: Vec3,
    light_color: Vec3,
    skin_color: Vec3,
    scattering: f32,
    depth_sample: f32,
    normal_sample: Vec3,
) -> Vec3 {
    let fresnel = fresnel_term(world_normal, view_dir);
    let subsurface = subsurface_term(world_normal, light_dir, scattering, depth_sample);

    let enhanced_normal = blend_normal_detail(world_normal, normal_sample);
    let enhanced_n_dot_l = enhanced_normal.dot(light_dir).max(0.0);
    let enhanced_diffuse = skin_color * light_color * enhanced_n_dot_l;

    enhanced_diffuse + skin_color * subsurface + Vec3::splat(fresnel * 0.1)
}
