//! Channel permutation strategies
//!
//! A strategy computes an ordering of the `size` indices shared by a set
//! of tagged tensors and applies it to every tensor along its tagged
//! dimension. Reordering so that similar channels are adjacent loses less
//! information when the grid over that dimension is later coarsened.

use crate::tensor::validate_tagged;
use crate::tsp::{DistanceMatrix, RouteFinder};
use crate::{PermutationError, Result, TaggedTensor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Whether `order` is a bijection of `0..size`
pub fn is_permutation(order: &[usize], size: usize) -> bool {
    if order.len() != size {
        return false;
    }
    let mut seen = vec![false; size];
    for &i in order {
        if i >= size || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

/// Ordering that undoes `order`
pub fn inverse_permutation(order: &[usize]) -> Result<Vec<usize>> {
    if !is_permutation(order, order.len()) {
        return Err(PermutationError::InvalidPermutation(format!(
            "{:?} is not a bijection",
            order
        )));
    }
    let mut inverse = vec![0; order.len()];
    for (i, &src) in order.iter().enumerate() {
        inverse[src] = i;
    }
    Ok(inverse)
}

/// Reorder every tagged tensor along its dimension by `order`
///
/// Afterwards index `i` holds what was previously at `order[i]`.
pub fn apply_permutation(tensors: &mut [TaggedTensor<'_>], order: &[usize]) -> Result<()> {
    let size = order.len();
    validate_tagged(tensors, size)?;
    if !is_permutation(order, size) {
        return Err(PermutationError::InvalidPermutation(format!(
            "ordering of length {} is not a bijection",
            size
        )));
    }

    for t in tensors.iter_mut() {
        t.value.permute_dim(t.dim, order)?;
    }
    Ok(())
}

/// Channel reordering strategy
///
/// Strategies override [`Permutation::find_permutation`] and, when they
/// measure similarity, [`Permutation::dist_function`]. The default bodies
/// report a missing implementation.
pub trait Permutation {
    /// Compute an ordering of `0..size` for the tagged tensors
    fn find_permutation(&self, tensors: &[TaggedTensor<'_>], size: usize) -> Result<Vec<usize>> {
        let _ = (tensors, size);
        Err(PermutationError::NotImplemented(
            "Permutation::find_permutation",
        ))
    }

    /// Dissimilarity between two slices
    fn dist_function(&self, x: &[f32], y: &[f32]) -> Result<f64> {
        let _ = (x, y);
        Err(PermutationError::NotImplemented("Permutation::dist_function"))
    }

    /// Compute an ordering and apply it in place; returns the ordering
    fn permute(&self, tensors: &mut [TaggedTensor<'_>], size: usize) -> Result<Vec<usize>> {
        validate_tagged(tensors, size)?;
        let order = self.find_permutation(tensors, size)?;
        apply_permutation(tensors, &order)?;
        Ok(order)
    }
}

/// Configuration for [`NOptPermutation`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NOptConfig {
    /// 2-opt restarts
    pub iters: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Smallest length decrease accepted as an improvement
    pub min_improvement: f64,
}

impl Default for NOptConfig {
    fn default() -> Self {
        Self {
            iters: 500,
            seed: None,
            min_improvement: 1e-9,
        }
    }
}

impl NOptConfig {
    /// Create config with a specific restart budget
    pub fn with_iters(iters: usize) -> Self {
        Self {
            iters,
            ..Default::default()
        }
    }

    /// Check the configuration
    pub fn validate(&self) -> Result<()> {
        if self.iters == 0 {
            return Err(PermutationError::ConfigError(
                "iters must be at least 1".into(),
            ));
        }
        if !self.min_improvement.is_finite() || self.min_improvement < 0.0 {
            return Err(PermutationError::ConfigError(format!(
                "min_improvement must be finite and non-negative, got {}",
                self.min_improvement
            )));
        }
        Ok(())
    }
}

/// Permutation minimizing adjacent-channel dissimilarity
///
/// Channels are cities of an open traveling salesman path. The distance
/// between `i` and `j` is, summed over tagged tensors, the mean absolute
/// difference of the slices at `i` and `j`. The path comes from 2-opt with
/// a fixed restart budget and is not guaranteed optimal.
#[derive(Debug, Clone, Default)]
pub struct NOptPermutation {
    config: NOptConfig,
}

impl NOptPermutation {
    /// Create a strategy, rejecting invalid configuration
    pub fn new(config: NOptConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration
    pub fn config(&self) -> &NOptConfig {
        &self.config
    }

    /// Pairwise channel distances summed over all tagged tensors
    pub fn distance_matrix(
        &self,
        tensors: &[TaggedTensor<'_>],
        size: usize,
    ) -> Result<DistanceMatrix> {
        validate_tagged(tensors, size)?;
        let slices = tensors
            .iter()
            .map(|t| t.value.slices(t.dim))
            .collect::<Result<Vec<_>>>()?;

        DistanceMatrix::try_from_fn(size, |i, j| {
            slices
                .iter()
                .map(|s| self.dist_function(&s[i], &s[j]))
                .sum::<Result<f64>>()
        })
    }
}

impl Permutation for NOptPermutation {
    fn find_permutation(&self, tensors: &[TaggedTensor<'_>], size: usize) -> Result<Vec<usize>> {
        let matrix = self.distance_matrix(tensors, size)?;
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut finder =
            RouteFinder::new(&matrix, self.config.iters, self.config.min_improvement, rng);
        let (length, order) = finder.solve();

        let identity: Vec<usize> = (0..size).collect();
        info!(
            size,
            tensors = tensors.len(),
            length,
            identity_length = matrix.path_length(&identity),
            "Computed channel permutation"
        );
        Ok(order)
    }

    fn dist_function(&self, x: &[f32], y: &[f32]) -> Result<f64> {
        if x.len() != y.len() {
            return Err(PermutationError::ShapeMismatch {
                expected: vec![x.len()],
                got: vec![y.len()],
            });
        }
        if x.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = x
            .iter()
            .zip(y)
            .map(|(&a, &b)| (a as f64 - b as f64).abs())
            .sum();
        Ok(total / x.len() as f64)
    }
}

/// Configuration for [`RandomPermutation`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RandomPermutationConfig {
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

/// Uniformly random channel shuffle
#[derive(Debug, Clone, Default)]
pub struct RandomPermutation {
    config: RandomPermutationConfig,
}

impl RandomPermutation {
    /// Create a random strategy
    pub fn new(config: RandomPermutationConfig) -> Self {
        Self { config }
    }
}

impl Permutation for RandomPermutation {
    fn find_permutation(&self, tensors: &[TaggedTensor<'_>], size: usize) -> Result<Vec<usize>> {
        validate_tagged(tensors, size)?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut order: Vec<usize> = (0..size).collect();
        order.shuffle(&mut rng);
        Ok(order)
    }
}

/// Permutation strategy selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermutationStrategy {
    /// 2-opt traveling salesman ordering
    NOpt(NOptConfig),
    /// Random shuffle
    Random(RandomPermutationConfig),
}

impl Default for PermutationStrategy {
    fn default() -> Self {
        Self::NOpt(NOptConfig::default())
    }
}

impl PermutationStrategy {
    /// Build the configured strategy
    pub fn build(&self) -> Result<Box<dyn Permutation>> {
        Ok(match self {
            PermutationStrategy::NOpt(config) => Box::new(NOptPermutation::new(config.clone())?),
            PermutationStrategy::Random(config) => Box::new(RandomPermutation::new(config.clone())),
        })
    }
}
