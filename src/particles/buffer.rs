use crate::particles::Particle;

// ── ParticleBuffers ────────────────────────────────────────────────────────

/// Flattens the live particle pool into the four attribute arrays a
/// point-sprite draw consumes: `positions[3N]`, `colors[3N]`, `sizes[N]`,
/// `alphas[N]`.  Index `i` refers to the same particle across all four.
///
/// Storage is allocated once for `max_particles` and reused every rebuild;
/// only a live count moves.  Rebuilding every tick therefore never touches
/// the allocator, and the accessors slice the arrays to exactly the live
/// prefix.
pub struct ParticleBuffers {
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    alphas: Vec<f32>,
    len: usize,
}

impl ParticleBuffers {
    pub fn new(max_particles: usize) -> Self {
        Self {
            positions: vec![0.0; max_particles * 3],
            colors: vec![0.0; max_particles * 3],
            sizes: vec![0.0; max_particles],
            alphas: vec![0.0; max_particles],
            len: 0,
        }
    }

    /// Number of particles the preallocated storage can hold.
    pub fn capacity(&self) -> usize {
        self.sizes.len()
    }

    /// Number of particles written by the last rebuild.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Overwrite the live prefix from `pool`.  Read-only traversal — the
    /// simulator keeps exclusive ownership of the particles themselves.
    /// Particles beyond `capacity` are ignored (the simulator's pool cap
    /// makes that unreachable when both are built from the same config).
    pub fn rebuild(&mut self, pool: &[Particle]) {
        let n = pool.len().min(self.capacity());
        for (i, p) in pool[..n].iter().enumerate() {
            self.positions[i * 3] = p.position.x;
            self.positions[i * 3 + 1] = p.position.y;
            self.positions[i * 3 + 2] = p.position.z;

            self.colors[i * 3] = p.color[0];
            self.colors[i * 3 + 1] = p.color[1];
            self.colors[i * 3 + 2] = p.color[2];

            self.sizes[i] = p.size;
            self.alphas[i] = p.alpha;
        }
        self.len = n;
    }

    /// `3N` interleaved xyz world positions.
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.len * 3]
    }

    /// `3N` interleaved rgb colors.
    pub fn colors(&self) -> &[f32] {
        &self.colors[..self.len * 3]
    }

    /// `N` point sizes.
    pub fn sizes(&self) -> &[f32] {
        &self.sizes[..self.len]
    }

    /// `N` opacities in `[0, 1]`.
    pub fn alphas(&self) -> &[f32] {
        &self.alphas[..self.len]
    }
}
