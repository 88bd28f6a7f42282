use super::NeighborSearch;

/// Fixed-size bucket table filled by counting sort.
///
/// O(N) construction: count particles per bucket -> prefix sum -> scatter.
/// All arrays are reused between builds; only particle-count growth allocates.
pub struct SpatialHashGrid {
    table_size: usize,
    /// Count array (reused): bucket_count[key] = number of particles in bucket
    bucket_count: Vec<u32>,
    /// Prefix sum: bucket_start[key] = index where the bucket begins in sorted_indices
    bucket_start: Vec<u32>,
    /// Particle indices grouped by bucket, ascending within a bucket
    sorted_indices: Vec<u32>,
    /// Bucket key per particle (used during build)
    particle_keys: Vec<u32>,
}

impl SpatialHashGrid {
    /// `table_size` is clamped to at least one bucket.
    pub fn new(table_size: usize) -> Self {
        if table_size == 0 {
            tracing::warn!("hash grid table size 0 clamped to 1");
        }
        let table_size = table_size.max(1);
        Self {
            table_size,
            bucket_count: vec![0u32; table_size],
            bucket_start: vec![0u32; table_size],
            sorted_indices: Vec::new(),
            particle_keys: Vec::new(),
        }
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }
}

impl NeighborSearch for SpatialHashGrid {
    fn build(&mut self, hashes: &[u32]) {
        let count = hashes.len();
        self.particle_keys.resize(count, 0);
        self.sorted_indices.resize(count, 0);

        // 1. Clear counts
        self.bucket_count.fill(0);

        // 2. Reduce each hash to its bucket and count
        for (i, &h) in hashes.iter().enumerate() {
            let key = self.bucket_key(h);
            self.particle_keys[i] = key;
            self.bucket_count[key as usize] += 1;
        }

        // 3. Exclusive prefix sum -> bucket_start
        let mut running = 0u32;
        for k in 0..self.table_size {
            self.bucket_start[k] = running;
            running += self.bucket_count[k];
        }

        // 4. Reset counts (reused as scatter offsets)
        self.bucket_count.fill(0);

        // 5. Scatter in particle order, which keeps each bucket ascending
        for i in 0..count {
            let key = self.particle_keys[i] as usize;
            let idx = self.bucket_start[key] + self.bucket_count[key];
            self.sorted_indices[idx as usize] = i as u32;
            self.bucket_count[key] += 1;
        }
    }

    #[inline]
    fn bucket_key(&self, hash: u32) -> u32 {
        (hash as usize % self.table_size) as u32
    }

    fn bucket(&self, key: u32) -> &[u32] {
        let key = key as usize;
        let start = self.bucket_start[key] as usize;
        let end = start + self.bucket_count[key] as usize;
        &self.sorted_indices[start..end]
    }

    fn len(&self) -> usize {
        self.sorted_indices.len()
    }
}
