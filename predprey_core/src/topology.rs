use crate::landscape::{neighbors4, Landscape};

/// 4-connected land-neighbor counts derived from a finalized [`Landscape`].
///
/// Built in one pass over the mask and never mutated afterwards. The count
/// normalizes the diffusion term; a land cell with zero land neighbors is an
/// isolated island that only reacts, never diffuses. Counts for water cells
/// are stored as zero and never read by the stepping kernels.
#[derive(Debug, Clone)]
pub struct NeighborTopology {
    width: usize,
    height: usize,
    counts: Vec<u8>,
    land_count: usize,
}

impl NeighborTopology {
    pub fn from_landscape(landscape: &Landscape) -> Self {
        let width = landscape.width();
        let height = landscape.height();
        let mut counts = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                if !landscape.is_land(x, y) {
                    continue;
                }
                let mut n = 0u8;
                for (nx, ny) in neighbors4(x, y, width, height) {
                    if landscape.is_land(nx, ny) {
                        n += 1;
                    }
                }
                counts[y * width + x] = n;
            }
        }
        Self {
            width,
            height,
            counts,
            land_count: landscape.land_count(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of land cells in the source mask, fixed at construction.
    pub fn land_count(&self) -> usize {
        self.land_count
    }

    #[inline]
    pub fn land_neighbors(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < self.width && y < self.height);
        self.counts[y * self.width + x]
    }

    pub fn counts(&self) -> &[u8] {
        &self.counts
    }
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NeighborTopology>();
};
