//! Weight tensors and per-dimension slicing

use crate::{PermutationError, Result};
use serde::{Deserialize, Serialize};

/// Dense row-major weight tensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTensor {
    /// Tensor name
    pub name: String,
    /// Tensor shape
    pub shape: Vec<usize>,
    /// Flattened data
    pub data: Vec<f32>,
}

impl WeightTensor {
    /// Create new weight tensor
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected_size: usize = shape.iter().product();
        if data.len() != expected_size {
            return Err(PermutationError::ShapeMismatch {
                expected: vec![expected_size],
                got: vec![data.len()],
            });
        }

        Ok(Self {
            name: name.into(),
            shape,
            data,
        })
    }

    /// Create zero tensor
    pub fn zeros(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let size: usize = shape.iter().product();
        Self {
            name: name.into(),
            shape,
            data: vec![0.0; size],
        }
    }

    /// Number of elements
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Tensor rank
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Extent of `dim`
    pub fn dim_size(&self, dim: usize) -> Result<usize> {
        self.shape
            .get(dim)
            .copied()
            .ok_or(PermutationError::DimOutOfRange {
                dim,
                ndim: self.ndim(),
            })
    }

    /// (outer, extent, inner) strides around `dim`
    fn split(&self, dim: usize) -> Result<(usize, usize, usize)> {
        let extent = self.dim_size(dim)?;
        let outer: usize = self.shape[..dim].iter().product();
        let inner: usize = self.shape[dim + 1..].iter().product();
        Ok((outer, extent, inner))
    }

    /// Flattened sub-tensor at `index` along `dim`
    pub fn select(&self, dim: usize, index: usize) -> Result<Vec<f32>> {
        let (outer, extent, inner) = self.split(dim)?;
        if index >= extent {
            return Err(PermutationError::InvalidPermutation(format!(
                "index {} out of range for dimension {} of size {}",
                index, dim, extent
            )));
        }

        let mut out = Vec::with_capacity(outer * inner);
        for o in 0..outer {
            let start = (o * extent + index) * inner;
            out.extend_from_slice(&self.data[start..start + inner]);
        }
        Ok(out)
    }

    /// Every sub-tensor along `dim`, in index order
    pub fn slices(&self, dim: usize) -> Result<Vec<Vec<f32>>> {
        let extent = self.dim_size(dim)?;
        (0..extent).map(|i| self.select(dim, i)).collect()
    }

    /// Gather along `dim`: position `i` receives what was at `indices[i]`
    pub fn index_select(&self, dim: usize, indices: &[usize]) -> Result<Self> {
        let (outer, extent, inner) = self.split(dim)?;
        if let Some(&bad) = indices.iter().find(|&&i| i >= extent) {
            return Err(PermutationError::InvalidPermutation(format!(
                "index {} out of range for dimension {} of size {}",
                bad, dim, extent
            )));
        }

        let mut shape = self.shape.clone();
        shape[dim] = indices.len();
        let mut data = Vec::with_capacity(outer * indices.len() * inner);
        for o in 0..outer {
            for &src in indices {
                let start = (o * extent + src) * inner;
                data.extend_from_slice(&self.data[start..start + inner]);
            }
        }

        Ok(Self {
            name: self.name.clone(),
            shape,
            data,
        })
    }

    /// Reorder along `dim` in place
    pub fn permute_dim(&mut self, dim: usize, permutation: &[usize]) -> Result<()> {
        let extent = self.dim_size(dim)?;
        if permutation.len() != extent {
            return Err(PermutationError::ShapeMismatch {
                expected: vec![extent],
                got: vec![permutation.len()],
            });
        }
        let permuted = self.index_select(dim, permutation)?;
        self.data = permuted.data;
        Ok(())
    }
}

/// A tensor tagged with the dimension to reorder
#[derive(Debug)]
pub struct TaggedTensor<'a> {
    /// Weight storage, mutated in place
    pub value: &'a mut WeightTensor,
    /// Dimension along which channels are permuted
    pub dim: usize,
}

impl<'a> TaggedTensor<'a> {
    /// Tag `value` on `dim`
    pub fn new(value: &'a mut WeightTensor, dim: usize) -> Self {
        Self { value, dim }
    }

    /// Extent of the tagged dimension
    pub fn size(&self) -> Result<usize> {
        self.value.dim_size(self.dim)
    }
}

/// Check that every tagged dimension has extent `size`
pub fn validate_tagged(tensors: &[TaggedTensor<'_>], size: usize) -> Result<()> {
    for t in tensors {
        let got = t.size()?;
        if got != size {
            return Err(PermutationError::ShapeMismatch {
                expected: vec![size],
                got: vec![got],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arange(shape: Vec<usize>) -> WeightTensor {
        let n: usize = shape.iter().product();
        WeightTensor::new("t", shape, (0..n).map(|x| x as f32).collect()).unwrap()
    }

    #[test]
    fn test_new_checks_len() {
        assert!(WeightTensor::new("t", vec![2, 3], vec![0.0; 5]).is_err());
        let t = WeightTensor::zeros("z", vec![2, 3]);
        assert_eq!(t.numel(), 6);
        assert_eq!(t.ndim(), 2);
    }

    #[test]
    fn test_select() {
        // [[0,1,2],[3,4,5]]
        let t = arange(vec![2, 3]);
        assert_eq!(t.select(0, 1).unwrap(), vec![3.0, 4.0, 5.0]);
        assert_eq!(t.select(1, 2).unwrap(), vec![2.0, 5.0]);
        assert!(t.select(1, 3).is_err());
        assert!(matches!(
            t.select(2, 0),
            Err(PermutationError::DimOutOfRange { dim: 2, ndim: 2 })
        ));
    }

    #[test]
    fn test_select_middle_dim() {
        let t = arange(vec![2, 3, 2]);
        assert_eq!(t.select(1, 1).unwrap(), vec![2.0, 3.0, 8.0, 9.0]);
        assert_eq!(t.slices(1).unwrap().len(), 3);
    }

    #[test]
    fn test_index_select() {
        let t = arange(vec![2, 3]);
        let s = t.index_select(1, &[2, 0, 1]).unwrap();
        assert_eq!(s.shape, vec![2, 3]);
        assert_eq!(s.data, vec![2.0, 0.0, 1.0, 5.0, 3.0, 4.0]);

        let picked = t.index_select(0, &[1]).unwrap();
        assert_eq!(picked.shape, vec![1, 3]);
        assert_eq!(picked.data, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_permute_dim_in_place() {
        let mut t = arange(vec![3, 2]);
        t.permute_dim(0, &[2, 1, 0]).unwrap();
        assert_eq!(t.data, vec![4.0, 5.0, 2.0, 3.0, 0.0, 1.0]);
        assert!(t.permute_dim(0, &[0, 1]).is_err());
    }

    #[test]
    fn test_validate_tagged() {
        let mut a = arange(vec![4, 2]);
        let mut b = arange(vec![3, 4]);
        let mut c = arange(vec![5]);
        let ok = [TaggedTensor::new(&mut a, 0), TaggedTensor::new(&mut b, 1)];
        assert!(validate_tagged(&ok, 4).is_ok());
        drop(ok);

        let bad = [TaggedTensor::new(&mut a, 0), TaggedTensor::new(&mut c, 0)];
        assert!(matches!(
            validate_tagged(&bad, 4),
            Err(PermutationError::ShapeMismatch { .. })
        ));
    }
}
