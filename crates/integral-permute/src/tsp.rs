//! Open-path traveling salesman heuristic
//!
//! Random-restart 2-opt local search. The first restart starts from the
//! identity ordering, so the returned path is never longer than identity.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Symmetric matrix of pairwise distances between cities
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Zero matrix over `size` cities
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Build from a symmetric distance function, evaluated for `i < j`
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut matrix = Self::zeros(size);
        for i in 0..size {
            for j in i + 1..size {
                let d = f(i, j);
                matrix.data[i * size + j] = d;
                matrix.data[j * size + i] = d;
            }
        }
        matrix
    }

    /// Build from a fallible symmetric distance function
    pub fn try_from_fn<F, E>(size: usize, mut f: F) -> Result<Self, E>
    where
        F: FnMut(usize, usize) -> Result<f64, E>,
    {
        let mut matrix = Self::zeros(size);
        for i in 0..size {
            for j in i + 1..size {
                let d = f(i, j)?;
                matrix.data[i * size + j] = d;
                matrix.data[j * size + i] = d;
            }
        }
        Ok(matrix)
    }

    /// Number of cities
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between `i` and `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// Sum of distances between consecutive cities of `order`
    pub fn path_length(&self, order: &[usize]) -> f64 {
        order.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }
}

/// 2-opt route search with a fixed restart budget
pub struct RouteFinder<'a> {
    matrix: &'a DistanceMatrix,
    iterations: usize,
    min_improvement: f64,
    rng: StdRng,
}

impl<'a> RouteFinder<'a> {
    /// Create a finder running `iterations` restarts
    pub fn new(
        matrix: &'a DistanceMatrix,
        iterations: usize,
        min_improvement: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            matrix,
            iterations,
            min_improvement,
            rng,
        }
    }

    /// Best path found and its length
    pub fn solve(&mut self) -> (f64, Vec<usize>) {
        let n = self.matrix.size();
        let mut best: Vec<usize> = (0..n).collect();
        let mut best_len = self.matrix.path_length(&best);

        if n < 3 {
            return (best_len, best);
        }

        for iteration in 0..self.iterations {
            let mut route: Vec<usize> = (0..n).collect();
            if iteration > 0 {
                route.shuffle(&mut self.rng);
            }

            self.two_opt(&mut route);
            let len = self.matrix.path_length(&route);
            if len < best_len {
                debug!(iteration, from = best_len, to = len, "Improved route");
                best_len = len;
                best = route;
            }
        }

        (best_len, best)
    }

    /// Change in path length from reversing `route[i..=j]`
    fn reversal_gain(&self, route: &[usize], i: usize, j: usize) -> f64 {
        let d = |a: usize, b: usize| self.matrix.get(route[a], route[b]);
        let last = route.len() - 1;

        let left = if i > 0 {
            d(i - 1, j) - d(i - 1, i)
        } else {
            0.0
        };
        let right = if j < last {
            d(i, j + 1) - d(j, j + 1)
        } else {
            0.0
        };
        left + right
    }

    /// Apply improving reversals until none is left
    fn two_opt(&self, route: &mut [usize]) {
        let n = route.len();
        loop {
            let mut improved = false;
            for i in 0..n - 1 {
                for j in i + 1..n {
                    if self.reversal_gain(route, i, j) < -self.min_improvement {
                        route[i..=j].reverse();
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
        }
    }
}
