//! Grids whose resolution is resampled on every training step

use crate::grid::{check_size, linspace};
use crate::{Distribution, Grid, GridError, GridPoints, Mode, Result, SizeDistribution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Evenly spaced grid over `[-1, 1]` with a randomly drawn point count
///
/// In training mode every generation draws a new size from the owned
/// distribution. In evaluation mode the nominal size is used.
#[derive(Debug, Clone)]
pub struct RandomUniformGrid1D {
    distribution: Distribution,
    size: usize,
    rng: StdRng,
    curr_grid: Option<(Mode, GridPoints)>,
}

impl RandomUniformGrid1D {
    /// Create a grid whose nominal size is the distribution's maximum
    pub fn new(distribution: Distribution) -> Self {
        Self::with_seed(distribution, None)
    }

    /// Create with a seeded RNG for reproducible sampling
    pub fn with_seed(distribution: Distribution, seed: Option<u64>) -> Self {
        Self {
            size: distribution.max_val(),
            distribution,
            rng: make_rng(seed),
            curr_grid: None,
        }
    }

    /// Owned size distribution
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Replace the distribution; the nominal size becomes its maximum
    pub fn reset_distribution(&mut self, distribution: Distribution) {
        debug!(
            min_val = distribution.min_val(),
            max_val = distribution.max_val(),
            "Resetting grid distribution"
        );
        self.size = distribution.max_val();
        self.distribution = distribution;
        self.invalidate();
    }
}

impl Grid for RandomUniformGrid1D {
    fn ndim(&self) -> Result<usize> {
        Ok(1)
    }

    fn size(&self) -> Option<usize> {
        Some(self.size)
    }

    fn generate_grid(&mut self, mode: Mode) -> Result<GridPoints> {
        let size = if mode.is_training() {
            self.distribution.sample(&mut self.rng)?
        } else {
            self.size
        };

        let points = GridPoints::from_axis(linspace(size));
        self.curr_grid = Some((mode, points.clone()));
        Ok(points)
    }

    fn cached(&self) -> Option<&GridPoints> {
        self.curr_grid.as_ref().map(|(_, points)| points)
    }

    fn invalidate(&mut self) {
        self.curr_grid = None;
    }

    /// Cached coordinates if they were generated under `mode`
    fn grid(&mut self, mode: Mode) -> Result<GridPoints> {
        if let Some((cached_mode, points)) = &self.curr_grid {
            if *cached_mode == mode {
                return Ok(points.clone());
            }
        }
        self.generate_grid(mode)
    }

    fn resize(&mut self, new_size: usize, mode: Mode) -> Result<()> {
        check_size(new_size)?;
        debug!(from = self.size, to = new_size, "Resizing random grid");
        self.size = new_size;
        self.invalidate();
        self.generate_grid(mode)?;
        Ok(())
    }
}

/// Trainable coordinate sets, one per size in `[min_size, max_size]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTable {
    min_size: usize,
    grids: Vec<Vec<f32>>,
}

impl SizeTable {
    /// Evenly spaced initial coordinates for every size in the range
    pub fn linspace(min_size: usize, max_size: usize) -> Self {
        Self {
            min_size,
            grids: (min_size..=max_size).map(linspace).collect(),
        }
    }

    /// Smallest size with a coordinate set
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Largest size with a coordinate set
    pub fn max_size(&self) -> usize {
        self.min_size + self.grids.len() - 1
    }

    /// Whether `size` has a coordinate set
    pub fn contains(&self, size: usize) -> bool {
        size >= self.min_size && size - self.min_size < self.grids.len()
    }

    /// Coordinates for `size`
    pub fn get(&self, size: usize) -> Option<&[f32]> {
        size.checked_sub(self.min_size)
            .and_then(|i| self.grids.get(i))
            .map(Vec::as_slice)
    }

    fn get_mut(&mut self, size: usize) -> Option<&mut [f32]> {
        size.checked_sub(self.min_size)
            .and_then(move |i| self.grids.get_mut(i))
            .map(Vec::as_mut_slice)
    }

    /// Rebuild for a new range, keeping sets for sizes in both ranges
    fn rebuild(&self, min_size: usize, max_size: usize) -> Self {
        Self {
            min_size,
            grids: (min_size..=max_size)
                .map(|size| match self.get(size) {
                    Some(coords) => coords.to_vec(),
                    None => linspace(size),
                })
                .collect(),
        }
    }
}

/// Randomly resampled grid with one trainable coordinate set per size
///
/// Uses the same size-sampling rule as [`RandomUniformGrid1D`], then looks
/// the coordinates up in a [`SizeTable`] covering the distribution's range.
#[derive(Debug, Clone)]
pub struct RandomTrainableGrid1D {
    distribution: Distribution,
    size: usize,
    rng: StdRng,
    table: SizeTable,
    curr_grid: Option<(Mode, GridPoints)>,
}

impl RandomTrainableGrid1D {
    /// Create with coordinate sets initialized to evenly spaced points
    pub fn new(distribution: Distribution) -> Self {
        Self::with_seed(distribution, None)
    }

    /// Create with a seeded RNG for reproducible sampling
    pub fn with_seed(distribution: Distribution, seed: Option<u64>) -> Self {
        Self {
            size: distribution.max_val(),
            table: SizeTable::linspace(distribution.min_val(), distribution.max_val()),
            distribution,
            rng: make_rng(seed),
            curr_grid: None,
        }
    }

    /// Owned size distribution
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Per-size trainable coordinates
    pub fn table(&self) -> &SizeTable {
        &self.table
    }

    /// Update the coordinates for one size in place
    pub fn update_coords<F>(&mut self, size: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut [f32]),
    {
        let coords = self.table.get_mut(size).ok_or_else(|| {
            GridError::invalid_size(format!("no trainable coordinates for size {}", size))
        })?;
        f(coords);
        self.invalidate();
        Ok(())
    }

    /// Replace the distribution and reallocate the coordinate table
    ///
    /// Sizes present in both the old and new range keep their trained
    /// coordinates; new sizes start evenly spaced.
    pub fn reset_distribution(&mut self, distribution: Distribution) {
        debug!(
            min_val = distribution.min_val(),
            max_val = distribution.max_val(),
            "Resetting trainable grid distribution"
        );
        self.table = self
            .table
            .rebuild(distribution.min_val(), distribution.max_val());
        self.size = distribution.max_val();
        self.distribution = distribution;
        self.invalidate();
    }

    /// Serialize the coordinate table
    pub fn parameters_to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.table)?)
    }

    /// Load a coordinate table; its range must match the distribution
    pub fn load_parameters(&mut self, bytes: &[u8]) -> Result<()> {
        let table: SizeTable = bincode::deserialize(bytes)?;
        if table.grids.is_empty()
            || table.min_size() != self.distribution.min_val()
            || table.max_size() != self.distribution.max_val()
        {
            return Err(GridError::Serialization(format!(
                "coordinate table does not cover [{}, {}]",
                self.distribution.min_val(),
                self.distribution.max_val()
            )));
        }
        self.table = table;
        self.invalidate();
        Ok(())
    }
}

impl Grid for RandomTrainableGrid1D {
    fn ndim(&self) -> Result<usize> {
        Ok(1)
    }

    fn size(&self) -> Option<usize> {
        Some(self.size)
    }

    fn generate_grid(&mut self, mode: Mode) -> Result<GridPoints> {
        let size = if mode.is_training() {
            let sampled = self.distribution.sample(&mut self.rng)?;
            // Normal draws may fall under min_val
            let clamped = sampled.clamp(self.table.min_size(), self.table.max_size());
            if clamped != sampled {
                debug!(sampled, clamped, "Sampled size outside coordinate table");
            }
            clamped
        } else {
            self.size
        };

        let coords = self.table.get(size).ok_or_else(|| {
            GridError::invalid_size(format!("no trainable coordinates for size {}", size))
        })?;
        let points = GridPoints::from_axis(coords.to_vec());
        self.curr_grid = Some((mode, points.clone()));
        Ok(points)
    }

    fn cached(&self) -> Option<&GridPoints> {
        self.curr_grid.as_ref().map(|(_, points)| points)
    }

    fn invalidate(&mut self) {
        self.curr_grid = None;
    }

    /// Cached coordinates if they were generated under `mode`
    fn grid(&mut self, mode: Mode) -> Result<GridPoints> {
        if let Some((cached_mode, points)) = &self.curr_grid {
            if *cached_mode == mode {
                return Ok(points.clone());
            }
        }
        self.generate_grid(mode)
    }

    fn resize(&mut self, new_size: usize, mode: Mode) -> Result<()> {
        if !self.table.contains(new_size) {
            return Err(GridError::invalid_size(format!(
                "size {} outside trainable range [{}, {}]",
                new_size,
                self.table.min_size(),
                self.table.max_size()
            )));
        }
        debug!(from = self.size, to = new_size, "Resizing random trainable grid");
        self.size = new_size;
        self.invalidate();
        self.generate_grid(mode)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_uses_nominal_size() {
        let dist = Distribution::uniform(2, 10).unwrap();
        let mut grid = RandomUniformGrid1D::with_seed(dist, Some(42));
        for _ in 0..20 {
            let points = grid.generate_grid(Mode::Eval).unwrap();
            assert_eq!(points.sizes(), vec![10]);
        }
    }

    #[test]
    fn test_train_samples_from_support() {
        let dist = Distribution::uniform(2, 10).unwrap();
        let mut grid = RandomUniformGrid1D::with_seed(dist, Some(42));
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let points = grid.generate_grid(Mode::Train).unwrap();
            let len = points.as_1d().unwrap().len();
            assert!((2..=10).contains(&len));
            seen.insert(len);
        }
        assert!(seen.len() > 3);
    }

    #[test]
    fn test_cached_invocation_keeps_last_sample() {
        let dist = Distribution::uniform(2, 50).unwrap();
        let mut grid = RandomUniformGrid1D::with_seed(dist, Some(9));
        let first = grid.generate_grid(Mode::Train).unwrap();
        for _ in 0..5 {
            assert_eq!(grid.grid(Mode::Train).unwrap(), first);
        }
    }

    #[test]
    fn test_eval_after_train_uses_nominal_size() {
        let dist = Distribution::uniform(2, 50).unwrap();
        let mut grid = RandomUniformGrid1D::with_seed(dist, Some(9));
        let train = loop {
            let points = grid.generate_grid(Mode::Train).unwrap();
            if points.sizes() != vec![50] {
                break points;
            }
        };
        assert_eq!(grid.grid(Mode::Train).unwrap(), train);

        assert_eq!(grid.grid(Mode::Eval).unwrap().sizes(), vec![50]);
        assert_eq!(grid.grid(Mode::Eval).unwrap().sizes(), vec![50]);
    }

    #[test]
    fn test_resize_and_reset_distribution() {
        let dist = Distribution::normal(4, 16).unwrap();
        let mut grid = RandomUniformGrid1D::with_seed(dist, Some(1));
        assert_eq!(grid.size(), Some(16));

        grid.resize(8, Mode::Eval).unwrap();
        assert_eq!(grid.cached().unwrap().sizes(), vec![8]);

        grid.reset_distribution(Distribution::uniform(3, 5).unwrap());
        assert!(grid.cached().is_none());
        assert_eq!(grid.size(), Some(5));
        assert_eq!(grid.grid(Mode::Eval).unwrap().sizes(), vec![5]);
    }

    #[test]
    fn test_trainable_table_per_size() {
        let dist = Distribution::uniform(3, 6).unwrap();
        let grid = RandomTrainableGrid1D::with_seed(dist, Some(0));
        let table = grid.table();
        assert_eq!(table.min_size(), 3);
        assert_eq!(table.max_size(), 6);
        for size in 3..=6 {
            assert_eq!(table.get(size).unwrap().len(), size);
        }
        assert!(table.get(2).is_none());
        assert!(table.get(7).is_none());
    }

    #[test]
    fn test_trainable_lookup_follows_sampled_size() {
        let dist = Distribution::uniform(3, 6).unwrap();
        let mut grid = RandomTrainableGrid1D::with_seed(dist, Some(5));
        grid.update_coords(4, |c| c[1] = 0.123).unwrap();

        let mut hit = false;
        for _ in 0..100 {
            let points = grid.generate_grid(Mode::Train).unwrap();
            let coords = points.as_1d().unwrap();
            assert!((3..=6).contains(&coords.len()));
            if coords.len() == 4 {
                assert_eq!(coords[1], 0.123);
                hit = true;
            }
        }
        assert!(hit);
    }

    #[test]
    fn test_trainable_normal_clamped_into_table() {
        let dist = Distribution::normal(20, 40).unwrap();
        let mut grid = RandomTrainableGrid1D::with_seed(dist, Some(13));
        for _ in 0..300 {
            let points = grid.generate_grid(Mode::Train).unwrap();
            assert!((20..=40).contains(&points.as_1d().unwrap().len()));
        }
    }

    #[test]
    fn test_trainable_switches_mode_on_cache() {
        let dist = Distribution::uniform(3, 6).unwrap();
        let mut grid = RandomTrainableGrid1D::with_seed(dist, Some(2));
        grid.update_coords(6, |c| c[3] = 0.5).unwrap();

        let train = loop {
            let points = grid.generate_grid(Mode::Train).unwrap();
            if points.sizes() != vec![6] {
                break points;
            }
        };
        assert_eq!(grid.grid(Mode::Train).unwrap(), train);

        let eval = grid.grid(Mode::Eval).unwrap();
        assert_eq!(eval.sizes(), vec![6]);
        assert_eq!(eval.as_1d().unwrap()[3], 0.5);
    }

    #[test]
    fn test_trainable_resize_bounds() {
        let dist = Distribution::uniform(3, 6).unwrap();
        let mut grid = RandomTrainableGrid1D::with_seed(dist, Some(0));
        grid.resize(5, Mode::Eval).unwrap();
        assert_eq!(grid.grid(Mode::Eval).unwrap().sizes(), vec![5]);
        assert!(matches!(
            grid.resize(9, Mode::Eval),
            Err(GridError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_trainable_reset_keeps_overlap() {
        let dist = Distribution::uniform(3, 6).unwrap();
        let mut grid = RandomTrainableGrid1D::with_seed(dist, Some(0));
        grid.update_coords(5, |c| c[0] = -0.9).unwrap();

        grid.reset_distribution(Distribution::uniform(5, 8).unwrap());
        let table = grid.table();
        assert_eq!(table.min_size(), 5);
        assert_eq!(table.max_size(), 8);
        assert_eq!(table.get(5).unwrap()[0], -0.9);
        assert_eq!(table.get(8).unwrap(), linspace(8).as_slice());
        assert_eq!(grid.size(), Some(8));
    }

    #[test]
    fn test_trainable_parameters_roundtrip() {
        let dist = Distribution::uniform(2, 4).unwrap();
        let mut grid = RandomTrainableGrid1D::with_seed(dist, Some(0));
        grid.update_coords(3, |c| c[2] = 0.75).unwrap();
        let bytes = grid.parameters_to_bytes().unwrap();

        let mut other = RandomTrainableGrid1D::with_seed(dist, Some(1));
        other.load_parameters(&bytes).unwrap();
        assert_eq!(other.table(), grid.table());

        let mut mismatched =
            RandomTrainableGrid1D::new(Distribution::uniform(2, 5).unwrap());
        assert!(mismatched.load_parameters(&bytes).is_err());
    }
}
