//! # Integral
//!
//! Core machinery for integral neural networks: a layer's weights are
//! treated as samples of a function over continuous axes, so the layer can
//! be resampled to a smaller discrete size.
//!
//! - [`grid`] - how each continuous axis is discretized (fixed, trainable,
//!   randomly resampled) and how axes compose
//! - [`permute`] - reordering channels before a grid is coarsened
//!
//! ## Example
//!
//! ```ignore
//! use integral::prelude::*;
//!
//! let mut tagged = [TaggedTensor::new(&mut conv1_weight, 0), TaggedTensor::new(&mut conv2_weight, 1)];
//! NOptPermutation::default().permute(&mut tagged, 64)?;
//!
//! let mut grid = RandomUniformGrid1D::new(Distribution::uniform(32, 64)?);
//! grid.resize(48, Mode::Eval)?;
//! let coords = grid.grid(Mode::Train)?;
//! ```

pub use integral_grid as grid;
pub use integral_permute as permute;

pub use integral_grid::{
    AnyGrid, Distribution, Grid, GridConfig, GridError, GridND, GridPoints, Mode,
    RandomTrainableGrid1D, RandomUniformGrid1D, TrainableGrid1D, UniformGrid1D,
};
pub use integral_permute::{
    NOptPermutation, Permutation, PermutationError, RandomPermutation, TaggedTensor,
    WeightTensor,
};

/// Prelude for common imports
pub mod prelude {
    pub use integral_grid::{
        AnyGrid, Distribution, Grid, GridND, Mode, RandomTrainableGrid1D, RandomUniformGrid1D,
        SizeDistribution, TrainableGrid1D, UniformGrid1D,
    };
    pub use integral_permute::{
        NOptConfig, NOptPermutation, Permutation, RandomPermutation, TaggedTensor, WeightTensor,
    };
}
