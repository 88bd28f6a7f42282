use glam::{IVec3, Vec3};

/// Per-particle neighbor sets packed into one arena.
///
/// `indices[offsets[i]..offsets[i + 1]]` holds the neighbors of particle `i`,
/// sorted ascending. Both vectors keep their capacity across rebuilds.
#[derive(Debug, Clone, Default)]
pub struct NeighborLists {
    offsets: Vec<u32>,
    indices: Vec<u32>,
}

impl NeighborLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all sets but keep the allocations.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.indices.clear();
        self.offsets.push(0);
    }

    /// Append the set of the next particle. Sets must be pushed in particle order.
    pub fn push_set(&mut self, neighbors: &[u32]) {
        if self.offsets.is_empty() {
            self.offsets.push(0);
        }
        self.indices.extend_from_slice(neighbors);
        self.offsets.push(self.indices.len() as u32);
    }

    /// Number of particles with a set.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Neighbors of particle `i`; empty before the first spatial index pass.
    pub fn get(&self, i: usize) -> &[u32] {
        if i + 1 >= self.offsets.len() {
            return &[];
        }
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        &self.indices[start..end]
    }

    /// Total number of neighbor entries over all particles.
    pub fn total(&self) -> usize {
        self.indices.len()
    }
}

/// Read-out record for one particle, laid out for direct upload to a GPU
/// storage buffer (32 bytes, matches a WGSL `vec3 + f32` pair of slots).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleState {
    pub position: [f32; 3],
    pub density: f32,
    pub velocity: [f32; 3],
    pub pressure: f32,
}

/// SoA particle storage.
///
/// The population is fixed at construction. Ids are assigned `0..count` and
/// equal the slot index; the store never reorders, so an id can be used
/// directly to index every array.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    pub count: usize,
    pub id: Vec<u32>,
    pub position: Vec<Vec3>,
    pub velocity: Vec<Vec3>,
    /// Summed SPH density, floored by the density epsilon.
    pub density: Vec<f32>,
    pub pressure: Vec<f32>,
    /// Grid cell containing `position`, refreshed by the spatial index pass.
    pub cell: Vec<IVec3>,
    /// Spatial hash of `cell`.
    pub hash: Vec<u32>,
    /// Neighbor sets from the last spatial index pass.
    pub neighbors: NeighborLists,
}

impl ParticleSet {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            id: (0..count as u32).collect(),
            position: vec![Vec3::ZERO; count],
            velocity: vec![Vec3::ZERO; count],
            density: vec![0.0; count],
            pressure: vec![0.0; count],
            cell: vec![IVec3::ZERO; count],
            hash: vec![0; count],
            neighbors: NeighborLists::new(),
        }
    }

    /// Store at rest at the given positions.
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let mut particles = Self::new(positions.len());
        particles.position.copy_from_slice(positions);
        particles
    }

    /// Replace the initial velocities. `velocities` must match the particle count.
    pub fn with_velocities(mut self, velocities: &[Vec3]) -> Self {
        assert_eq!(
            velocities.len(),
            self.count,
            "velocity count must match particle count"
        );
        self.velocity.copy_from_slice(velocities);
        self
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn neighbors_of(&self, i: usize) -> &[u32] {
        self.neighbors.get(i)
    }

    pub fn snapshot(&self, i: usize) -> ParticleState {
        ParticleState {
            position: self.position[i].to_array(),
            density: self.density[i],
            velocity: self.velocity[i].to_array(),
            pressure: self.pressure[i],
        }
    }

    /// Fill `out` with the current state of every particle, in id order.
    pub fn write_states(&self, out: &mut [ParticleState]) {
        for (i, state) in out.iter_mut().enumerate().take(self.count) {
            *state = self.snapshot(i);
        }
    }

    /// Index of the first particle whose position, velocity, density or
    /// pressure is NaN or infinite.
    pub fn first_non_finite(&self) -> Option<usize> {
        (0..self.count).find(|&i| {
            !self.position[i].is_finite()
                || !self.velocity[i].is_finite()
                || !self.density[i].is_finite()
                || !self.pressure[i].is_finite()
        })
    }
}
