use glam::{Mat4, Vec3};

// ── Camera ──────────────────────────────────────────────────────────────────

/// 3D perspective camera orbiting a target point.
///
/// The orbit is parameterised as (yaw, pitch, distance) around `target`;
/// [`eye`](Self::eye) derives the world-space position from those.  Zoom is
/// smoothed: `set_distance` writes a target and [`tick`](Self::tick) lerps
/// the actual distance toward it each frame.
pub struct Camera {
    /// World-space point the camera looks at and orbits around.
    pub target: Vec3,
    /// Orbit azimuth in radians (0 looks down −Z).
    pub yaw: f32,
    /// Orbit elevation in radians, clamped shy of the poles.
    pub pitch: f32,
    /// Current distance from `target`.
    pub distance: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clip plane; the depth pass linearizes against this.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Smooth-zoom lerp target; `set_distance` writes here.
    pub(crate) target_distance: f32,
}

/// Pitch limit keeping the orbit off the poles where the up vector
/// degenerates.
const PITCH_LIMIT: f32 = 1.5;

impl Camera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            yaw: 0.0,
            pitch: 0.0,
            distance,
            fov_y: 50f32.to_radians(),
            near: 0.1,
            far: 100.0,
            target_distance: distance,
        }
    }

    /// Advance camera animation by `dt` seconds: the distance lerps toward
    /// `target_distance`, converging at ~8× per second.
    pub fn tick(&mut self, dt: f32) {
        let speed = 8.0_f32;
        self.distance += (self.target_distance - self.distance) * (speed * dt).min(1.0);
    }

    /// Set the zoom target.  The camera smoothly lerps toward this value
    /// each frame.  Clamped to a minimum of 0.5 so the eye never crosses
    /// the target.
    pub fn set_distance(&mut self, distance: f32) {
        self.target_distance = distance.max(0.5);
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    /// Rotate the orbit by the given deltas (radians), clamping pitch away
    /// from the poles.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// World-space eye position derived from (yaw, pitch, distance).
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    /// Combined view-projection matrix for the given viewport aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), self.near, self.far);
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        proj * view
    }

    /// Camera-space right and up basis vectors in world space — the
    /// billboard frame for camera-facing particle quads.
    pub fn billboard_basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_at_distance_from_target() {
        let cam = Camera::new(Vec3::new(1.0, 2.0, 3.0), 5.0);
        let d = (cam.eye() - cam.target).length();
        assert!((d - 5.0).abs() < 1e-4);
    }

    #[test]
    fn orbit_clamps_pitch() {
        let mut cam = Camera::new(Vec3::ZERO, 5.0);
        cam.orbit(0.0, 10.0);
        assert!(cam.pitch <= PITCH_LIMIT);
        cam.orbit(0.0, -20.0);
        assert!(cam.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn tick_converges_on_target_distance() {
        let mut cam = Camera::new(Vec3::ZERO, 5.0);
        cam.set_distance(2.0);
        for _ in 0..120 {
            cam.tick(1.0 / 60.0);
        }
        assert!((cam.distance - 2.0).abs() < 0.01);
    }

    #[test]
    fn billboard_basis_is_orthonormal() {
        let mut cam = Camera::new(Vec3::ZERO, 5.0);
        cam.orbit(0.7, 0.4);
        let (right, up) = cam.billboard_basis();
        assert!(right.dot(up).abs() < 1e-4);
        assert!((right.length() - 1.0).abs() < 1e-4);
        assert!((up.length() - 1.0).abs() < 1e-4);
    }
}
