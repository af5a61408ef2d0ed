//! Channel permutation for integral layers
//!
//! Before a continuous axis is coarsened, its channels are reordered so that
//! neighboring indices hold similar weights:
//! - `NOptPermutation` orders channels along a short traveling salesman path
//! - `RandomPermutation` shuffles them, as a baseline
//!
//! Every tensor sharing the axis is reordered identically and in place.

mod error;
mod permutation;
mod tensor;
mod tsp;

pub use error::{PermutationError, Result};
pub use permutation::{
    apply_permutation, inverse_permutation, is_permutation, NOptConfig, NOptPermutation,
    Permutation, PermutationStrategy, RandomPermutation, RandomPermutationConfig,
};
pub use tensor::{validate_tagged, TaggedTensor, WeightTensor};
pub use tsp::{DistanceMatrix, RouteFinder};
