//! Grid whose point spacing is learned directly

use crate::grid::check_size;
use crate::{Grid, GridError, GridPoints, Mode, Result};
use serde::{Deserialize, Serialize};

/// Added to every delta so spacing stays strictly positive
pub const DELTA_EPSILON: f64 = 1e-8;

/// Map free deltas to ordered coordinates in `[0, 1]`
///
/// `|delta| + eps` is normalized onto the simplex, cumulatively summed and
/// prefixed with `0`. Any real-valued input gives a valid grid.
pub fn deltas_to_grid(deltas: &[f32]) -> Vec<f32> {
    let positive: Vec<f64> = deltas
        .iter()
        .map(|&d| (d as f64).abs() + DELTA_EPSILON)
        .collect();
    let total: f64 = positive.iter().sum();

    let mut coords = Vec::with_capacity(deltas.len() + 1);
    coords.push(0.0f32);

    let mut acc = 0.0f64;
    for p in positive {
        acc += p / total;
        coords.push(acc.min(1.0) as f32);
    }
    coords
}

/// One-axis grid parameterized by `size - 1` trainable deltas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainableGrid1D {
    deltas: Vec<f32>,
    #[serde(skip)]
    curr_grid: Option<GridPoints>,
}

impl TrainableGrid1D {
    /// Create an evenly spaced trainable grid with `size` points
    pub fn new(size: usize) -> Result<Self> {
        check_size(size)?;
        Ok(Self::with_deltas(vec![1.0; size - 1]))
    }

    /// Create from initial deltas; the grid has `deltas.len() + 1` points
    pub fn with_deltas(deltas: Vec<f32>) -> Self {
        Self {
            deltas,
            curr_grid: None,
        }
    }

    /// Trainable parameters
    pub fn deltas(&self) -> &[f32] {
        &self.deltas
    }

    /// Replace the parameters; the length must stay `size - 1`
    pub fn set_deltas(&mut self, deltas: Vec<f32>) -> Result<()> {
        if deltas.len() != self.deltas.len() {
            return Err(GridError::invalid_size(format!(
                "expected {} deltas, got {}",
                self.deltas.len(),
                deltas.len()
            )));
        }
        self.deltas = deltas;
        self.invalidate();
        Ok(())
    }

    /// Update the parameters in place, e.g. after an optimizer step
    pub fn update_deltas<F>(&mut self, f: F)
    where
        F: FnOnce(&mut [f32]),
    {
        f(&mut self.deltas);
        self.invalidate();
    }

    /// Serialize the parameters
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restore from serialized parameters; the cache starts empty
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl Grid for TrainableGrid1D {
    fn ndim(&self) -> Result<usize> {
        Ok(1)
    }

    fn size(&self) -> Option<usize> {
        Some(self.deltas.len() + 1)
    }

    fn generate_grid(&mut self, _mode: Mode) -> Result<GridPoints> {
        let points = GridPoints::from_axis(deltas_to_grid(&self.deltas));
        self.curr_grid = Some(points.clone());
        Ok(points)
    }

    fn cached(&self) -> Option<&GridPoints> {
        self.curr_grid.as_ref()
    }

    fn invalidate(&mut self) {
        self.curr_grid = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(coords: &[f32], size: usize) {
        assert_eq!(coords.len(), size);
        assert_eq!(coords[0], 0.0);
        assert!(coords.windows(2).all(|w| w[0] <= w[1]), "{:?}", coords);
        assert!(*coords.last().unwrap() <= 1.0);
    }

    #[test]
    fn test_default_is_even() {
        let mut grid = TrainableGrid1D::new(5).unwrap();
        let points = grid.grid(Mode::Train).unwrap();
        let coords = points.as_1d().unwrap();
        assert_valid(coords, 5);
        for (c, expected) in coords.iter().zip([0.0, 0.25, 0.5, 0.75, 1.0]) {
            assert!((c - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_any_deltas_give_valid_grid() {
        let mut grid = TrainableGrid1D::with_deltas(vec![-3.0, 0.0, 0.5, -1e6, 2.0]);
        let points = grid.generate_grid(Mode::Train).unwrap();
        assert_valid(points.as_1d().unwrap(), 6);
    }

    #[test]
    fn test_all_zero_deltas() {
        let coords = deltas_to_grid(&[0.0, 0.0, 0.0, 0.0]);
        assert_valid(&coords, 5);
        assert!((coords[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_single_point() {
        let mut grid = TrainableGrid1D::new(1).unwrap();
        let points = grid.grid(Mode::Eval).unwrap();
        assert_eq!(points.as_1d().unwrap(), &[0.0]);
    }

    #[test]
    fn test_cache_and_invalidation() {
        let mut grid = TrainableGrid1D::new(4).unwrap();
        let first = grid.grid(Mode::Train).unwrap();
        assert_eq!(grid.grid(Mode::Train).unwrap(), first);

        grid.update_deltas(|d| d[0] = 5.0);
        assert!(grid.cached().is_none());
        let second = grid.grid(Mode::Train).unwrap();
        assert_ne!(first, second);
        let coords = second.as_1d().unwrap();
        assert!((coords[1] - 5.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_deltas_length_checked() {
        let mut grid = TrainableGrid1D::new(3).unwrap();
        assert!(grid.set_deltas(vec![1.0]).is_err());
        grid.set_deltas(vec![1.0, 3.0]).unwrap();
        let points = grid.grid(Mode::Train).unwrap();
        assert!((points.as_1d().unwrap()[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_bytes_roundtrip_drops_cache() {
        let mut grid = TrainableGrid1D::with_deltas(vec![0.2, 0.7, 0.1]);
        let before = grid.grid(Mode::Train).unwrap();

        let bytes = grid.to_bytes().unwrap();
        let mut restored = TrainableGrid1D::from_bytes(&bytes).unwrap();
        assert!(restored.cached().is_none());
        assert_eq!(restored.deltas(), grid.deltas());
        assert_eq!(restored.grid(Mode::Train).unwrap(), before);
    }

    #[test]
    fn test_resize_unsupported() {
        let mut grid = TrainableGrid1D::new(3).unwrap();
        assert!(matches!(
            grid.resize(5, Mode::Train),
            Err(GridError::Unsupported(_))
        ));
    }
}
