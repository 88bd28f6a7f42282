//! Uniform-grid spatial hashing for neighbor search.
//!
//! Space is cut into cubes of edge `cell_size` (the kernel support radius), so
//! the 3x3x3 block of cells around a particle covers its whole support. Cells
//! are mapped to 32-bit keys by [`hash_of`]; the hash is not injective, so a
//! query may return particles from a distant cell that shares a key. Those
//! false positives are kept: every kernel evaluates to zero beyond `h`, so they
//! contribute nothing except work.

pub mod hashed;
pub mod sorted;

pub use hashed::SpatialHashGrid;
pub use sorted::SortedHashGrid;

use glam::{IVec3, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::GridBackend;
use crate::particle::ParticleSet;

const P1: u32 = 73856093;
const P2: u32 = 19349663;
const P3: u32 = 83492791;

/// The 27 offsets of a cell's 3x3x3 neighborhood, itself included.
pub const NEIGHBOR_OFFSETS: [IVec3; 27] = {
    let mut offsets = [IVec3::ZERO; 27];
    let mut n = 0;
    let mut dx = -1;
    while dx <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dz = -1;
            while dz <= 1 {
                offsets[n] = IVec3::new(dx, dy, dz);
                n += 1;
                dz += 1;
            }
            dy += 1;
        }
        dx += 1;
    }
    offsets
};

/// Integer cell containing `position`: `floor(position / cell_size)` per axis.
#[inline]
pub fn cell_of(position: Vec3, cell_size: f32) -> IVec3 {
    (position / cell_size).floor().as_ivec3()
}

/// Spatial hash of a cell. Negative coordinates are reinterpreted as their
/// two's-complement `u32` bits and all arithmetic wraps.
#[inline]
pub fn hash_of(cell: IVec3) -> u32 {
    (cell.x as u32).wrapping_mul(P1)
        ^ (cell.y as u32).wrapping_mul(P2)
        ^ (cell.z as u32).wrapping_mul(P3)
}

/// Bucket index over particle hashes, rebuilt from scratch every step.
///
/// Implementations keep each bucket's particle indices contiguous and in
/// ascending order, so a bucket can be handed out as a slice.
pub trait NeighborSearch: Send + Sync {
    /// Re-bucket particles `0..hashes.len()` by their cell hash.
    fn build(&mut self, hashes: &[u32]);

    /// Key of the bucket a cell hash lands in. Distinct hashes may share a key.
    fn bucket_key(&self, hash: u32) -> u32;

    /// Particle indices stored under `key`, empty when the bucket is unused.
    fn bucket(&self, key: u32) -> &[u32];

    /// Number of particles indexed by the last build.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of every particle bucketed in the 27 cells around `cell`,
    /// skipping `exclude`. Written to `out` in ascending order without duplicates.
    fn query_cell(&self, cell: IVec3, exclude: Option<u32>, out: &mut Vec<u32>) {
        out.clear();

        // Two neighborhood cells can share a bucket; visit each bucket once.
        let mut keys = [0u32; 27];
        for (key, offset) in keys.iter_mut().zip(NEIGHBOR_OFFSETS.iter()) {
            *key = self.bucket_key(hash_of(cell.wrapping_add(*offset)));
        }
        keys.sort_unstable();

        let mut previous = None;
        for &key in &keys {
            if previous == Some(key) {
                continue;
            }
            previous = Some(key);
            out.extend(
                self.bucket(key)
                    .iter()
                    .copied()
                    .filter(|&idx| Some(idx) != exclude),
            );
        }
        out.sort_unstable();
    }
}

/// Create the empty grid for a backend.
pub fn make_grid(backend: GridBackend, table_size: usize) -> Box<dyn NeighborSearch> {
    match backend {
        GridBackend::CountingSort => Box::new(SpatialHashGrid::new(table_size)),
        GridBackend::SortedKeys => Box::new(SortedHashGrid::new()),
    }
}

/// Refresh `cell` and `hash` of every particle from its position.
pub fn assign_cells(particles: &mut ParticleSet, cell_size: f32) {
    let ParticleSet {
        position,
        cell,
        hash,
        ..
    } = particles;

    #[cfg(feature = "parallel")]
    {
        position
            .par_iter()
            .zip(cell.par_iter_mut())
            .zip(hash.par_iter_mut())
            .for_each(|((p, c), h)| {
                *c = cell_of(*p, cell_size);
                *h = hash_of(*c);
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for ((p, c), h) in position.iter().zip(cell.iter_mut()).zip(hash.iter_mut()) {
            *c = cell_of(*p, cell_size);
            *h = hash_of(*c);
        }
    }
}

/// Rewrite every particle's neighbor set from a grid built over its current hashes.
pub fn resolve_neighbors(particles: &mut ParticleSet, grid: &dyn NeighborSearch) {
    let count = particles.count;

    #[cfg(feature = "parallel")]
    {
        let sets: Vec<Vec<u32>> = (0..count)
            .into_par_iter()
            .map(|i| {
                let mut set = Vec::new();
                grid.query_cell(particles.cell[i], Some(particles.id[i]), &mut set);
                set
            })
            .collect();
        particles.neighbors.clear();
        for set in &sets {
            particles.neighbors.push_set(set);
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut scratch = Vec::with_capacity(64);
        let ParticleSet {
            id,
            cell,
            neighbors,
            ..
        } = particles;
        neighbors.clear();
        for i in 0..count {
            grid.query_cell(cell[i], Some(id[i]), &mut scratch);
            neighbors.push_set(&scratch);
        }
    }
}

/// Full spatial indexing pass: cells and hashes, grid rebuild, neighbor sets.
pub fn update_spatial_index(
    particles: &mut ParticleSet,
    grid: &mut dyn NeighborSearch,
    cell_size: f32,
) {
    assign_cells(particles, cell_size);
    grid.build(&particles.hash);
    resolve_neighbors(particles, grid);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_cover_neighborhood_once() {
        let mut seen = NEIGHBOR_OFFSETS.to_vec();
        seen.sort_by_key(|o| (o.x, o.y, o.z));
        seen.dedup();
        assert_eq!(seen.len(), 27);
        assert!(seen.iter().all(|o| o.abs().max_element() <= 1));
    }

    #[test]
    fn test_hash_matches_signed_wraparound() {
        // Same bits as multiplying the signed coordinates with wrapping i32 math.
        let cell = IVec3::new(-3, 7, -11);
        let signed = (cell.x.wrapping_mul(P1 as i32))
            ^ (cell.y.wrapping_mul(P2 as i32))
            ^ (cell.z.wrapping_mul(P3 as i32));
        assert_eq!(hash_of(cell), signed as u32);
    }
}
