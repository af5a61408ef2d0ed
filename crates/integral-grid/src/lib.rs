//! Continuous-axis grids
//!
//! This crate provides the discretization machinery of integral layers:
//! - Size distributions for picking a resolution per training step
//! - Fixed, trainable and randomly resampled one-axis grids
//! - Composite grids over several named axes
//!
//! Grids cache their last generated coordinates. Any structural change
//! (resize, axis replacement, parameter update) invalidates the cache.

mod config;
mod distribution;
mod error;
mod grid;
mod grid_nd;
mod random;
mod trainable;

pub use config::GridConfig;
pub use distribution::{
    Distribution, DistributionConfig, NormalDistribution, SizeDistribution, UniformDistribution,
};
pub use error::{GridError, Result};
pub use grid::{linspace, AnyGrid, Grid, GridPoints, Mode, UniformGrid1D};
pub use grid_nd::{axis_key, GridND};
pub use random::{RandomTrainableGrid1D, RandomUniformGrid1D, SizeTable};
pub use trainable::{deltas_to_grid, TrainableGrid1D, DELTA_EPSILON};
