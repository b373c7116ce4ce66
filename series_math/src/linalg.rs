//! Small dense matrices for the ARMA state-space recursions

use std::ops::{Index, IndexMut};

/// Row-major square matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Outer product `v v'`
    pub fn outer(v: &[f64]) -> Self {
        let n = v.len();
        let mut m = Self::zeros(n);
        for i in 0..n {
            for j in 0..n {
                m[(i, j)] = v[i] * v[j];
            }
        }
        m
    }

    pub fn matmul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.n, other.n);
        let n = self.n;
        let mut out = Self::zeros(n);
        for i in 0..n {
            for k in 0..n {
                let a = self[(i, k)];
                if a == 0.0 {
                    continue;
                }
                for j in 0..n {
                    out[(i, j)] += a * other[(k, j)];
                }
            }
        }
        out
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.n);
        for i in 0..self.n {
            for j in 0..self.n {
                out[(j, i)] = self[(i, j)];
            }
        }
        out
    }

    /// `self * other * self'`
    pub fn sandwich(&self, other: &Self) -> Self {
        self.matmul(other).matmul(&self.transpose())
    }

    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|i| (0..self.n).map(|j| self[(i, j)] * v[j]).sum())
            .collect()
    }

    pub fn add_assign(&mut self, other: &Self) {
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
    }

    /// `self += scale * v v'`
    pub fn add_outer(&mut self, v: &[f64], scale: f64) {
        for i in 0..self.n {
            for j in 0..self.n {
                self[(i, j)] += scale * v[i] * v[j];
            }
        }
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.n).map(|i| self[(i, j)]).collect()
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for SquareMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_and_transpose() {
        let mut a = SquareMatrix::zeros(2);
        a[(0, 0)] = 1.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 3.0;
        a[(1, 1)] = 4.0;

        let aa = a.matmul(&a);
        assert_eq!(aa[(0, 0)], 7.0);
        assert_eq!(aa[(0, 1)], 10.0);
        assert_eq!(aa[(1, 0)], 15.0);
        assert_eq!(aa[(1, 1)], 22.0);

        let t = a.transpose();
        assert_eq!(t[(0, 1)], 3.0);
        assert_eq!(a.mul_vec(&[1.0, 1.0]), vec![3.0, 7.0]);
    }
}
