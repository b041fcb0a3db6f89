// =============================================================================
// GEOMETRY.RS — Procedural mesh construction
//
// The subject mesh is a deformed UV sphere shaped into rough head
// proportions (a stand-in for a scanned head model — no asset loading
// here).  Everything is pure CPU data; the renderer uploads the result
// once at startup.
// =============================================================================

use glam::Vec3;

// ── Vertex ──────────────────────────────────────────────────────────────────

/// Mesh vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x3,  // normal
        2 => Float32x2,  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// ── MeshData ────────────────────────────────────────────────────────────────

/// CPU-side triangle mesh: vertex array plus a triangle-list index buffer.
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

// ── UV sphere ───────────────────────────────────────────────────────────────

/// Tessellate a UV sphere of the given radius.
///
/// `segments` is the longitude count, `rings` the latitude count; the seam
/// column is duplicated so UVs wrap cleanly.  Produces
/// `(segments + 1) × (rings + 1)` vertices.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    use std::f32::consts::{PI, TAU};

    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * PI;
        let (st, ct) = theta.sin_cos();
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let phi = u * TAU;
            let (sp, cp) = phi.sin_cos();
            let dir = Vec3::new(st * cp, ct, st * sp);
            vertices.push(Vertex {
                position: (dir * radius).to_array(),
                normal: dir.to_array(),
                uv: [u, v],
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    MeshData { vertices, indices }
}

// ── Head shaping ────────────────────────────────────────────────────────────

/// Deform a vertex position (on a unit-ish sphere) into head proportions:
/// flatten the crown and jaw, pull the face plane in, and narrow the sides
/// at cheek height.  The side test uses the pre-deformation height so the
/// crown/jaw scaling does not shift which band narrows.
pub fn shape_head_vertex(p: Vec3) -> Vec3 {
    let mut v = p;
    let y = v.y;

    if y > 0.7 {
        v.y *= 0.9;
    } else if y < -0.8 {
        v.y *= 0.7;
    }

    if v.z > 0.3 {
        v.z *= 0.7;
    }

    if v.x.abs() > 0.7 && y.abs() < 0.3 {
        v.x *= 0.8;
    }

    v
}

/// Recompute smooth per-vertex normals by accumulating area-weighted face
/// normals.  Vertices untouched by any face (degenerate poles) fall back to
/// their radial direction.
pub fn recompute_normals(mesh: &mut MeshData) {
    let mut accum = vec![Vec3::ZERO; mesh.vertices.len()];

    for tri in mesh.indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from_array(mesh.vertices[i0].position);
        let p1 = Vec3::from_array(mesh.vertices[i1].position);
        let p2 = Vec3::from_array(mesh.vertices[i2].position);
        let face = (p1 - p0).cross(p2 - p0);
        accum[i0] += face;
        accum[i1] += face;
        accum[i2] += face;
    }

    for (vert, n) in mesh.vertices.iter_mut().zip(accum) {
        let fallback = Vec3::from_array(vert.position)
            .try_normalize()
            .unwrap_or(Vec3::Y);
        vert.normal = n.try_normalize().unwrap_or(fallback).to_array();
    }
}

/// Build the head mesh: a 64×64 unit UV sphere run through
/// [`shape_head_vertex`] with normals recomputed afterwards.
pub fn head_mesh() -> MeshData {
    let mut mesh = uv_sphere(1.0, 64, 64);
    for vert in &mut mesh.vertices {
        vert.position = shape_head_vertex(Vec3::from_array(vert.position)).to_array();
    }
    recompute_normals(&mut mesh);
    mesh
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertex_and_index_counts() {
        let mesh = uv_sphere(1.0, 8, 6);
        assert_eq!(mesh.vertices.len(), 9 * 7);
        assert_eq!(mesh.indices.len(), (8 * 6 * 6) as usize);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = uv_sphere(2.0, 12, 8);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn head_flattens_crown() {
        let v = shape_head_vertex(Vec3::new(0.0, 0.9, 0.0));
        assert!((v.y - 0.81).abs() < 1e-5);
    }

    #[test]
    fn head_narrows_cheeks_by_original_height() {
        // Inside the cheek band: narrowed.
        let v = shape_head_vertex(Vec3::new(0.9, 0.1, 0.0));
        assert!((v.x - 0.72).abs() < 1e-5);
        // Above the band: untouched.
        let v = shape_head_vertex(Vec3::new(0.9, 0.5, 0.0));
        assert!((v.x - 0.9).abs() < 1e-5);
    }

    #[test]
    fn head_mesh_normals_are_unit_length() {
        let mesh = head_mesh();
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.normal).length();
            assert!((len - 1.0).abs() < 1e-3);
        }
    }
}
