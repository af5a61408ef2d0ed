//! Serializable grid descriptions

use crate::{
    AnyGrid, DistributionConfig, GridND, RandomTrainableGrid1D, RandomUniformGrid1D, Result,
    TrainableGrid1D, UniformGrid1D,
};
use serde::{Deserialize, Serialize};

/// Description of any grid variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridConfig {
    /// Fixed evenly spaced grid
    Uniform { size: usize },
    /// Trainable spacing, optionally from initial deltas
    Trainable {
        size: usize,
        #[serde(default)]
        init_deltas: Option<Vec<f32>>,
    },
    /// Size drawn from a distribution during training
    Random {
        distribution: DistributionConfig,
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Size drawn from a distribution, trainable coordinates per size
    RandomTrainable {
        distribution: DistributionConfig,
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Composite over named axes, in order
    Nd { axes: Vec<(String, GridConfig)> },
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::Uniform { size: 1 }
    }
}

impl GridConfig {
    /// Validate and build the grid
    pub fn build(&self) -> Result<AnyGrid> {
        let grid: AnyGrid = match self {
            GridConfig::Uniform { size } => UniformGrid1D::new(*size)?.into(),
            GridConfig::Trainable { size, init_deltas } => match init_deltas {
                Some(deltas) => {
                    let mut grid = TrainableGrid1D::new(*size)?;
                    grid.set_deltas(deltas.clone())?;
                    grid.into()
                }
                None => TrainableGrid1D::new(*size)?.into(),
            },
            GridConfig::Random { distribution, seed } => {
                RandomUniformGrid1D::with_seed(distribution.build()?, *seed).into()
            }
            GridConfig::RandomTrainable { distribution, seed } => {
                RandomTrainableGrid1D::with_seed(distribution.build()?, *seed).into()
            }
            GridConfig::Nd { axes } => {
                let children = axes
                    .iter()
                    .map(|(key, config)| -> Result<(String, AnyGrid)> {
                        Ok((key.clone(), config.build()?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                GridND::new(children)?.into()
            }
        };
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grid, GridError, Mode};

    #[test]
    fn test_build_nd() {
        let config = GridConfig::Nd {
            axes: vec![
                ("0".into(), GridConfig::Uniform { size: 4 }),
                (
                    "1".into(),
                    GridConfig::Random {
                        distribution: DistributionConfig::Uniform {
                            min_val: 2,
                            max_val: 6,
                        },
                        seed: Some(1),
                    },
                ),
            ],
        };
        let mut grid = config.build().unwrap();
        assert_eq!(grid.ndim().unwrap(), 2);
        assert_eq!(grid.grid(Mode::Eval).unwrap().sizes(), vec![4, 6]);
    }

    #[test]
    fn test_build_trainable_with_deltas() {
        let config = GridConfig::Trainable {
            size: 3,
            init_deltas: Some(vec![1.0, 3.0]),
        };
        let mut grid = config.build().unwrap();
        let points = grid.grid(Mode::Train).unwrap();
        assert!((points.as_1d().unwrap()[1] - 0.25).abs() < 1e-6);

        let bad = GridConfig::Trainable {
            size: 3,
            init_deltas: Some(vec![1.0]),
        };
        assert!(matches!(bad.build(), Err(GridError::InvalidSize(_))));
    }

    #[test]
    fn test_build_rejects_bad_distribution() {
        let config = GridConfig::RandomTrainable {
            distribution: DistributionConfig::Normal {
                min_val: 8,
                max_val: 4,
            },
            seed: None,
        };
        assert!(matches!(
            config.build(),
            Err(GridError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn test_build_duplicate_axes() {
        let config = GridConfig::Nd {
            axes: vec![
                ("x".into(), GridConfig::default()),
                ("x".into(), GridConfig::default()),
            ],
        };
        assert!(matches!(config.build(), Err(GridError::DuplicateAxis(_))));
    }
}
