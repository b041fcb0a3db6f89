use dermis::geometry::{Vertex, head_mesh, recompute_normals, shape_head_vertex, uv_sphere};
use glam::Vec3;

// ── Vertex layout ─────────────────────────────────────────────────────────

#[test]
fn vertex_is_32_bytes() {
    assert_eq!(std::mem::size_of::<Vertex>(), 32);
}

// ── Sphere tessellation ───────────────────────────────────────────────────

#[test]
fn sphere_has_expected_counts() {
    let mesh = uv_sphere(1.0, 16, 12);
    assert_eq!(mesh.vertices.len(), 17 * 13);
    assert_eq!(mesh.indices.len(), (16 * 12 * 6) as usize);
    assert_eq!(mesh.index_count(), 16 * 12 * 6);
}

#[test]
fn sphere_indices_are_in_bounds() {
    let mesh = uv_sphere(1.0, 16, 12);
    let n = mesh.vertices.len() as u32;
    assert!(mesh.indices.iter().all(|&i| i < n));
}

#[test]
fn sphere_uvs_cover_unit_square() {
    let mesh = uv_sphere(1.0, 8, 8);
    for v in &mesh.vertices {
        assert!((0.0..=1.0).contains(&v.uv[0]));
        assert!((0.0..=1.0).contains(&v.uv[1]));
    }
}

// ── Head shaping rules ────────────────────────────────────────────────────

#[test]
fn crown_is_flattened() {
    let v = shape_head_vertex(Vec3::new(0.0, 0.8, 0.0));
    assert!((v.y - 0.72).abs() < 1e-5);
}

#[test]
fn jaw_is_flattened_more() {
    let v = shape_head_vertex(Vec3::new(0.0, -0.9, 0.0));
    assert!((v.y + 0.63).abs() < 1e-5);
}

#[test]
fn face_plane_is_pulled_in() {
    let v = shape_head_vertex(Vec3::new(0.0, 0.0, 0.9));
    assert!((v.z - 0.63).abs() < 1e-5);
    // The back of the head is untouched.
    let v = shape_head_vertex(Vec3::new(0.0, 0.0, -0.9));
    assert!((v.z + 0.9).abs() < 1e-5);
}

#[test]
fn cheeks_narrow_only_at_eye_height() {
    let v = shape_head_vertex(Vec3::new(0.9, 0.1, 0.0));
    assert!((v.x - 0.72).abs() < 1e-5);
    let v = shape_head_vertex(Vec3::new(0.9, 0.5, 0.0));
    assert!((v.x - 0.9).abs() < 1e-5);
}

#[test]
fn mid_band_vertices_are_untouched() {
    let p = Vec3::new(0.3, 0.3, 0.2);
    assert_eq!(shape_head_vertex(p), p);
}

// ── Normals ───────────────────────────────────────────────────────────────

#[test]
fn recomputed_normals_are_unit_length() {
    let mut mesh = uv_sphere(1.0, 24, 16);
    recompute_normals(&mut mesh);
    for v in &mesh.vertices {
        let len = Vec3::from_array(v.normal).length();
        assert!((len - 1.0).abs() < 1e-3);
    }
}

#[test]
fn sphere_normals_point_radially_after_recompute() {
    let mut mesh = uv_sphere(1.0, 32, 24);
    recompute_normals(&mut mesh);
    for v in &mesh.vertices {
        let p = Vec3::from_array(v.position);
        let n = Vec3::from_array(v.normal);
        // Smooth normals on a sphere track the radial direction closely
        // away from the poles.
        if p.y.abs() < 0.95 {
            assert!(n.dot(p.normalize()) > 0.95);
        }
    }
}

#[test]
fn head_mesh_is_well_formed() {
    let mesh = head_mesh();
    assert_eq!(mesh.vertices.len(), 65 * 65);
    assert_eq!(mesh.indices.len(), (64 * 64 * 6) as usize);
    let n = mesh.vertices.len() as u32;
    assert!(mesh.indices.iter().all(|&i| i < n));
}
