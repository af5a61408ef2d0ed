//! Integer size distributions used to pick a grid resolution per training step

use crate::{GridError, Result};
use rand::Rng;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

/// Sampler over integer sizes in the closed range `[min_val, max_val]`
///
/// Concrete distributions override [`SizeDistribution::sample`]; the default
/// body reports a missing implementation.
pub trait SizeDistribution {
    /// Smallest size in the support
    fn min_val(&self) -> usize;

    /// Largest size in the support
    fn max_val(&self) -> usize;

    /// Draw one size. Every call is independent.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        let _ = rng;
        Err(GridError::NotImplemented("SizeDistribution::sample"))
    }

    /// Whether `size` lies in `[min_val, max_val]`
    fn contains(&self, size: usize) -> bool {
        size >= self.min_val() && size <= self.max_val()
    }
}

fn check_bounds(min_val: usize, max_val: usize) -> Result<()> {
    if min_val == 0 || min_val > max_val {
        return Err(GridError::InvalidDistribution { min_val, max_val });
    }
    Ok(())
}

/// Discrete uniform law over `[min_val, max_val]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformDistribution {
    min_val: usize,
    max_val: usize,
}

impl UniformDistribution {
    /// Create a uniform distribution, rejecting `min_val > max_val`
    pub fn new(min_val: usize, max_val: usize) -> Result<Self> {
        check_bounds(min_val, max_val)?;
        Ok(Self { min_val, max_val })
    }
}

impl SizeDistribution for UniformDistribution {
    fn min_val(&self) -> usize {
        self.min_val
    }

    fn max_val(&self) -> usize {
        self.max_val
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        Ok(rng.gen_range(self.min_val..=self.max_val))
    }
}

/// Half-normal law anchored at `max_val`
///
/// Draws `d ~ N(0, 0.5 * (max_val - min_val))` and returns
/// `max(1, max_val - trunc(|d|))`. Most draws land near full size.
/// Samples are not clipped at `min_val`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalDistribution {
    min_val: usize,
    max_val: usize,
}

impl NormalDistribution {
    /// Create a normal distribution, rejecting `min_val > max_val`
    pub fn new(min_val: usize, max_val: usize) -> Result<Self> {
        check_bounds(min_val, max_val)?;
        Ok(Self { min_val, max_val })
    }

    /// Standard deviation of the underlying normal draw
    pub fn std_dev(&self) -> f64 {
        0.5 * (self.max_val - self.min_val) as f64
    }
}

impl SizeDistribution for NormalDistribution {
    fn min_val(&self) -> usize {
        self.min_val
    }

    fn max_val(&self) -> usize {
        self.max_val
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        let normal = Normal::new(0.0, self.std_dev()).map_err(|_| {
            GridError::InvalidDistribution {
                min_val: self.min_val,
                max_val: self.max_val,
            }
        })?;
        let drop = normal.sample(rng).abs().trunc();

        if drop >= self.max_val as f64 {
            return Ok(1);
        }
        Ok((self.max_val - drop as usize).max(1))
    }
}

/// Size distribution owned by a randomly-resampled grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distribution {
    /// Every size equally likely
    Uniform(UniformDistribution),
    /// Biased toward `max_val`
    Normal(NormalDistribution),
}

impl Distribution {
    /// Uniform distribution over `[min_val, max_val]`
    pub fn uniform(min_val: usize, max_val: usize) -> Result<Self> {
        UniformDistribution::new(min_val, max_val).map(Self::Uniform)
    }

    /// Normal distribution anchored at `max_val`
    pub fn normal(min_val: usize, max_val: usize) -> Result<Self> {
        NormalDistribution::new(min_val, max_val).map(Self::Normal)
    }

    /// Number of sizes in the support
    pub fn support_len(&self) -> usize {
        self.max_val() - self.min_val() + 1
    }
}

impl SizeDistribution for Distribution {
    fn min_val(&self) -> usize {
        match self {
            Distribution::Uniform(d) => d.min_val(),
            Distribution::Normal(d) => d.min_val(),
        }
    }

    fn max_val(&self) -> usize {
        match self {
            Distribution::Uniform(d) => d.max_val(),
            Distribution::Normal(d) => d.max_val(),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        match self {
            Distribution::Uniform(d) => d.sample(rng),
            Distribution::Normal(d) => d.sample(rng),
        }
    }
}

/// Serializable distribution description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionConfig {
    /// Uniform over `[min_val, max_val]`
    Uniform { min_val: usize, max_val: usize },
    /// Normal anchored at `max_val`
    Normal { min_val: usize, max_val: usize },
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self::Uniform {
            min_val: 1,
            max_val: 1,
        }
    }
}

impl DistributionConfig {
    /// Validate and build the distribution
    pub fn build(&self) -> Result<Distribution> {
        match *self {
            DistributionConfig::Uniform { min_val, max_val } => {
                Distribution::uniform(min_val, max_val)
            }
            DistributionConfig::Normal { min_val, max_val } => {
                Distribution::normal(min_val, max_val)
            }
        }
    }
}
