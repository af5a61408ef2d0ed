//! Composite grid over several named continuous axes

use crate::{AnyGrid, Grid, GridError, GridPoints, Mode, Result};
use indexmap::IndexMap;
use tracing::debug;

/// Label for the axis at tensor dimension `dim`
pub fn axis_key(dim: usize) -> String {
    dim.to_string()
}

/// Joint grid composed of per-axis child grids
///
/// Children are generated in insertion order and their axes concatenated.
#[derive(Debug, Clone, Default)]
pub struct GridND {
    grids: IndexMap<String, AnyGrid>,
    curr_grid: Option<(Mode, GridPoints)>,
}

impl GridND {
    /// Create from `(axis, grid)` pairs; duplicate axis keys are rejected
    pub fn new<I, K, G>(grids: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, G)>,
        K: Into<String>,
        G: Into<AnyGrid>,
    {
        let mut map = IndexMap::new();
        for (key, grid) in grids {
            let key = key.into();
            if map.contains_key(&key) {
                return Err(GridError::DuplicateAxis(key));
            }
            map.insert(key, grid.into());
        }

        Ok(Self {
            grids: map,
            curr_grid: None,
        })
    }

    /// Axis keys in output order
    pub fn axes(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    /// Number of child grids
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Whether there are no child grids
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Child grid for `axis`
    pub fn get(&self, axis: &str) -> Option<&AnyGrid> {
        self.grids.get(axis)
    }

    /// Mutable child grid for `axis`; invalidates the composite cache
    pub fn get_mut(&mut self, axis: &str) -> Option<&mut AnyGrid> {
        let grid = self.grids.get_mut(axis)?;
        self.curr_grid = None;
        Some(grid)
    }

    /// Replace the child grid for an existing axis, keeping its position
    pub fn reset_grid(&mut self, axis: &str, new_grid: impl Into<AnyGrid>) -> Result<()> {
        let slot = self
            .grids
            .get_mut(axis)
            .ok_or_else(|| GridError::UnknownAxis(axis.to_string()))?;
        *slot = new_grid.into();
        debug!(axis, "Replaced grid axis");
        self.invalidate();
        Ok(())
    }
}

impl Grid for GridND {
    fn ndim(&self) -> Result<usize> {
        self.grids.values().map(|g| g.ndim()).sum()
    }

    fn generate_grid(&mut self, mode: Mode) -> Result<GridPoints> {
        let mut points = GridPoints::default();
        for grid in self.grids.values_mut() {
            points.extend(grid.generate_grid(mode)?);
        }
        self.curr_grid = Some((mode, points.clone()));
        Ok(points)
    }

    fn cached(&self) -> Option<&GridPoints> {
        self.curr_grid.as_ref().map(|(_, points)| points)
    }

    fn invalidate(&mut self) {
        self.curr_grid = None;
    }

    /// Composite of each child's cached coordinates
    ///
    /// A composite cached under the other mode is rebuilt from the children.
    fn grid(&mut self, mode: Mode) -> Result<GridPoints> {
        if let Some((cached_mode, points)) = &self.curr_grid {
            if *cached_mode == mode {
                return Ok(points.clone());
            }
        }

        let mut points = GridPoints::default();
        for grid in self.grids.values_mut() {
            points.extend(grid.grid(mode)?);
        }
        self.curr_grid = Some((mode, points.clone()));
        Ok(points)
    }
}
