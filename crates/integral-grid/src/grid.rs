//! Grid contract, evaluation mode and the fixed uniform grid

use crate::{
    GridError, GridND, RandomTrainableGrid1D, RandomUniformGrid1D, Result, TrainableGrid1D,
};
use serde::{Deserialize, Serialize};

/// Training or evaluation mode
///
/// Passed into every generation call. Random grids read it at the start of
/// each call and remember which mode produced their cached coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Stochastic resolution per call
    #[default]
    Train,
    /// Fixed nominal resolution
    Eval,
}

impl Mode {
    /// Whether this is training mode
    pub fn is_training(self) -> bool {
        matches!(self, Mode::Train)
    }
}

/// Generated grid coordinates, one sequence per continuous axis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPoints {
    axes: Vec<Vec<f32>>,
}

impl GridPoints {
    /// Coordinates of a single axis
    pub fn from_axis(coords: Vec<f32>) -> Self {
        Self { axes: vec![coords] }
    }

    /// Coordinates of several axes, in order
    pub fn from_axes(axes: Vec<Vec<f32>>) -> Self {
        Self { axes }
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Coordinates of axis `i`
    pub fn axis(&self, i: usize) -> Option<&[f32]> {
        self.axes.get(i).map(Vec::as_slice)
    }

    /// Coordinates of a one-axis grid
    pub fn as_1d(&self) -> Option<&[f32]> {
        match self.axes.as_slice() {
            [only] => Some(only.as_slice()),
            _ => None,
        }
    }

    /// All axes
    pub fn axes(&self) -> &[Vec<f32>] {
        &self.axes
    }

    /// Point count along each axis
    pub fn sizes(&self) -> Vec<usize> {
        self.axes.iter().map(Vec::len).collect()
    }

    /// Consume into the per-axis coordinate vectors
    pub fn into_axes(self) -> Vec<Vec<f32>> {
        self.axes
    }

    /// Append another grid's axes after this one's
    pub fn extend(&mut self, other: GridPoints) {
        self.axes.extend(other.axes);
    }
}

/// Discretization of one or more continuous axes
///
/// Variants override the methods they support. The default bodies of
/// [`Grid::ndim`] and [`Grid::generate_grid`] report a missing
/// implementation, and [`Grid::resize`] is unsupported unless overridden.
pub trait Grid {
    /// Number of continuous axes covered
    fn ndim(&self) -> Result<usize> {
        Err(GridError::NotImplemented("Grid::ndim"))
    }

    /// Nominal number of points, for single-axis grids
    fn size(&self) -> Option<usize> {
        None
    }

    /// Recompute coordinates and cache them
    fn generate_grid(&mut self, mode: Mode) -> Result<GridPoints> {
        let _ = mode;
        Err(GridError::NotImplemented("Grid::generate_grid"))
    }

    /// Last generated coordinates, if still valid
    fn cached(&self) -> Option<&GridPoints> {
        None
    }

    /// Drop the cached coordinates
    fn invalidate(&mut self) {}

    /// Cached coordinates, generating them first if absent
    ///
    /// The default ignores `mode` on a cache hit, which is right for grids
    /// whose coordinates do not depend on it. Mode-sensitive grids override
    /// this and treat a cache produced under the other mode as a miss.
    fn grid(&mut self, mode: Mode) -> Result<GridPoints> {
        if let Some(points) = self.cached() {
            return Ok(points.clone());
        }
        self.generate_grid(mode)
    }

    /// Change the nominal size and regenerate
    fn resize(&mut self, new_size: usize, mode: Mode) -> Result<()> {
        let _ = (new_size, mode);
        Err(GridError::Unsupported("resize on this grid variant".into()))
    }
}

/// `size` evenly spaced points over `[-1, 1]`
pub fn linspace(size: usize) -> Vec<f32> {
    match size {
        0 => Vec::new(),
        1 => vec![-1.0],
        _ => {
            let step = 2.0 / (size - 1) as f64;
            (0..size)
                .map(|i| {
                    if i == size - 1 {
                        1.0
                    } else {
                        (-1.0 + step * i as f64) as f32
                    }
                })
                .collect()
        }
    }
}

pub(crate) fn check_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(GridError::invalid_size("grid needs at least one point"));
    }
    Ok(())
}

/// Fixed grid of evenly spaced points over `[-1, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct UniformGrid1D {
    size: usize,
    curr_grid: Option<GridPoints>,
}

impl UniformGrid1D {
    /// Create a fixed grid with `size` points
    pub fn new(size: usize) -> Result<Self> {
        check_size(size)?;
        Ok(Self {
            size,
            curr_grid: None,
        })
    }
}

impl Grid for UniformGrid1D {
    fn ndim(&self) -> Result<usize> {
        Ok(1)
    }

    fn size(&self) -> Option<usize> {
        Some(self.size)
    }

    fn generate_grid(&mut self, _mode: Mode) -> Result<GridPoints> {
        let points = GridPoints::from_axis(linspace(self.size));
        self.curr_grid = Some(points.clone());
        Ok(points)
    }

    fn cached(&self) -> Option<&GridPoints> {
        self.curr_grid.as_ref()
    }

    fn invalidate(&mut self) {
        self.curr_grid = None;
    }

    fn resize(&mut self, new_size: usize, mode: Mode) -> Result<()> {
        check_size(new_size)?;
        self.size = new_size;
        self.invalidate();
        self.generate_grid(mode)?;
        Ok(())
    }
}

/// Any concrete grid
#[derive(Debug, Clone)]
pub enum AnyGrid {
    /// Fixed evenly spaced points
    Uniform(UniformGrid1D),
    /// Free trainable spacing
    Trainable(TrainableGrid1D),
    /// Size resampled from a distribution
    Random(RandomUniformGrid1D),
    /// Size resampled, one trainable coordinate set per size
    RandomTrainable(RandomTrainableGrid1D),
    /// Composite over named axes
    Nd(Box<GridND>),
}

macro_rules! dispatch {
    ($self:expr, $grid:ident => $body:expr) => {
        match $self {
            AnyGrid::Uniform($grid) => $body,
            AnyGrid::Trainable($grid) => $body,
            AnyGrid::Random($grid) => $body,
            AnyGrid::RandomTrainable($grid) => $body,
            AnyGrid::Nd($grid) => $body,
        }
    };
}

impl Grid for AnyGrid {
    fn ndim(&self) -> Result<usize> {
        dispatch!(self, g => g.ndim())
    }

    fn size(&self) -> Option<usize> {
        dispatch!(self, g => g.size())
    }

    fn generate_grid(&mut self, mode: Mode) -> Result<GridPoints> {
        dispatch!(self, g => g.generate_grid(mode))
    }

    fn cached(&self) -> Option<&GridPoints> {
        dispatch!(self, g => g.cached())
    }

    fn invalidate(&mut self) {
        dispatch!(self, g => g.invalidate())
    }

    fn grid(&mut self, mode: Mode) -> Result<GridPoints> {
        dispatch!(self, g => g.grid(mode))
    }

    fn resize(&mut self, new_size: usize, mode: Mode) -> Result<()> {
        dispatch!(self, g => g.resize(new_size, mode))
    }
}

impl From<UniformGrid1D> for AnyGrid {
    fn from(grid: UniformGrid1D) -> Self {
        AnyGrid::Uniform(grid)
    }
}

impl From<TrainableGrid1D> for AnyGrid {
    fn from(grid: TrainableGrid1D) -> Self {
        AnyGrid::Trainable(grid)
    }
}

impl From<RandomUniformGrid1D> for AnyGrid {
    fn from(grid: RandomUniformGrid1D) -> Self {
        AnyGrid::Random(grid)
    }
}

impl From<RandomTrainableGrid1D> for AnyGrid {
    fn from(grid: RandomTrainableGrid1D) -> Self {
        AnyGrid::RandomTrainable(grid)
    }
}

impl From<GridND> for AnyGrid {
    fn from(grid: GridND) -> Self {
        AnyGrid::Nd(Box::new(grid))
    }
}
