use std::cmp::Ordering;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{error::SimulationError, params::LandscapeSettings};

/// Immutable land/water mask the simulation runs on.
///
/// The mask is fixed for the simulation's lifetime: densities live only on
/// land cells and diffusion only crosses land/land edges. Construction is
/// fully determined by `(width, height, seed, proportion, passes)`: two
/// builds with the same inputs produce bit-identical masks on every
/// platform, which is what makes whole-run traces reproducible.
#[derive(Debug, Clone)]
pub struct Landscape {
    width: usize,
    height: usize,
    mask: Vec<bool>,
    land_count: usize,
}

impl Landscape {
    /// Generate a mask from [`LandscapeSettings`], seeding a ChaCha stream
    /// with the configured seed.
    pub fn generate(
        width: usize,
        height: usize,
        settings: &LandscapeSettings,
    ) -> Result<Self, SimulationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let landscape = Self::generate_with(
            width,
            height,
            settings.land_proportion,
            settings.smoothing_passes,
            &mut rng,
        )?;
        tracing::debug!(
            target: "predprey::landscape",
            width,
            height,
            seed = settings.seed,
            land_proportion = settings.land_proportion,
            smoothing_passes = settings.smoothing_passes,
            land_count = landscape.land_count,
            land_ratio = landscape.land_ratio(),
            "landscape.generated"
        );
        Ok(landscape)
    }

    /// Generate a mask drawing from a caller-supplied random source.
    ///
    /// Each cell independently becomes land when the next draw in `[0, 1)`
    /// is at most `land_proportion`, visiting cells in row-major order, so
    /// the source's state sequence fully determines the mask. Tests inject
    /// fixed-sequence sources through this entry point.
    pub fn generate_with<R: Rng>(
        width: usize,
        height: usize,
        land_proportion: f64,
        smoothing_passes: u32,
        rng: &mut R,
    ) -> Result<Self, SimulationError> {
        if width == 0 || height == 0 {
            return Err(SimulationError::InvalidDimensions { width, height });
        }
        if !(0.0..=1.0).contains(&land_proportion) {
            return Err(SimulationError::InvalidProportion(land_proportion));
        }

        let mut mask = Vec::with_capacity(width * height);
        for _ in 0..width * height {
            mask.push(rng.gen::<f64>() <= land_proportion);
        }

        for _ in 0..smoothing_passes {
            mask = smooth_pass(&mask, width, height);
        }

        let land_count = mask.iter().filter(|&&land| land).count();
        Ok(Self {
            width,
            height,
            mask,
            land_count,
        })
    }

    /// Wrap an explicit mask, mostly for tests and fixtures.
    pub fn from_mask(width: usize, height: usize, mask: Vec<bool>) -> Result<Self, SimulationError> {
        if width == 0 || height == 0 {
            return Err(SimulationError::InvalidDimensions { width, height });
        }
        debug_assert_eq!(mask.len(), width * height);
        let land_count = mask.iter().filter(|&&land| land).count();
        Ok(Self {
            width,
            height,
            mask,
            land_count,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn land_count(&self) -> usize {
        self.land_count
    }

    pub fn land_ratio(&self) -> f64 {
        self.land_count as f64 / (self.width * self.height) as f64
    }

    #[inline]
    pub fn is_land(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.mask[y * self.width + x]
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }
}

/// In-grid 4-connected neighbors of `(x, y)`; cells past the border are
/// simply absent, there is no wraparound.
pub(crate) fn neighbors4(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let mut v = Vec::with_capacity(4);
    if x > 0 {
        v.push((x - 1, y));
    }
    if x + 1 < w {
        v.push((x + 1, y));
    }
    if y > 0 {
        v.push((x, y - 1));
    }
    if y + 1 < h {
        v.push((x, y + 1));
    }
    v.into_iter()
}

/// One smoothing pass over the whole mask.
///
/// Every cell is recomputed from the previous pass's buffer: a strict
/// majority of land neighbors makes the cell land, a strict majority of
/// water neighbors makes it water, and an exact tie (which includes the
/// zero-neighbor 1x1 case) keeps the cell's current state.
fn smooth_pass(mask: &[bool], width: usize, height: usize) -> Vec<bool> {
    let idx = |x: usize, y: usize| -> usize { y * width + x };
    let mut next = vec![false; mask.len()];
    for y in 0..height {
        for x in 0..width {
            let mut land = 0u32;
            let mut water = 0u32;
            for (nx, ny) in neighbors4(x, y, width, height) {
                if mask[idx(nx, ny)] {
                    land += 1;
                } else {
                    water += 1;
                }
            }
            next[idx(x, y)] = match land.cmp(&water) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => mask[idx(x, y)],
            };
        }
    }
    next
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Landscape>();
};
