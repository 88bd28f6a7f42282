#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::NeighborSearch;

/// Sort-based bucketing keyed by the full 32-bit cell hash.
///
/// Build sorts `(hash, index)` pairs, then records where each distinct hash
/// starts. Buckets only merge when two cells produce the same 32-bit hash,
/// which is the behavior of an unbounded hash map over cell hashes.
#[derive(Default)]
pub struct SortedHashGrid {
    /// (hash, particle index), sorted
    entries: Vec<(u32, u32)>,
    /// Particle indices in sorted entry order
    sorted_indices: Vec<u32>,
    /// Distinct hashes, ascending
    keys: Vec<u32>,
    /// keys[k] occupies sorted_indices[starts[k]..starts[k + 1]]
    starts: Vec<u32>,
}

impl SortedHashGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct occupied hashes after the last build.
    pub fn bucket_count(&self) -> usize {
        self.keys.len()
    }
}

impl NeighborSearch for SortedHashGrid {
    fn build(&mut self, hashes: &[u32]) {
        self.entries.clear();
        self.entries
            .extend(hashes.iter().enumerate().map(|(i, &h)| (h, i as u32)));

        // Index is part of the key so ordering is total and deterministic.
        #[cfg(feature = "parallel")]
        self.entries.par_sort_unstable();
        #[cfg(not(feature = "parallel"))]
        self.entries.sort_unstable();

        self.sorted_indices.clear();
        self.keys.clear();
        self.starts.clear();
        for (slot, &(hash, idx)) in self.entries.iter().enumerate() {
            if self.keys.last() != Some(&hash) {
                self.keys.push(hash);
                self.starts.push(slot as u32);
            }
            self.sorted_indices.push(idx);
        }
        self.starts.push(self.sorted_indices.len() as u32);
    }

    #[inline]
    fn bucket_key(&self, hash: u32) -> u32 {
        hash
    }

    fn bucket(&self, key: u32) -> &[u32] {
        match self.keys.binary_search(&key) {
            Ok(k) => {
                let start = self.starts[k] as usize;
                let end = self.starts[k + 1] as usize;
                &self.sorted_indices[start..end]
            }
            Err(_) => &[],
        }
    }

    fn len(&self) -> usize {
        self.sorted_indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_group_equal_hashes() {
        let mut grid = SortedHashGrid::new();
        grid.build(&[7, 3, 7, 9, 3]);

        assert_eq!(grid.bucket_count(), 3);
        assert_eq!(grid.bucket(3), &[1, 4]);
        assert_eq!(grid.bucket(7), &[0, 2]);
        assert_eq!(grid.bucket(9), &[3]);
        assert!(grid.bucket(5).is_empty());
    }

    #[test]
    fn test_empty_build() {
        let mut grid = SortedHashGrid::new();
        grid.build(&[]);
        assert!(grid.is_empty());
        assert!(grid.bucket(0).is_empty());
    }
}
