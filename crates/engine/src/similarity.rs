//! Sparse vectors and pairwise cosine similarity.
//!
//! The matrix keeps the L2-normalized rows and materialises similarity rows on
//! demand, so a request that only needs one row never pays for n² storage.

use rayon::prelude::*;

/// Sparse vector with entries sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Build from (index, value) pairs in any order.
    ///
    /// Zero values are dropped; duplicate indices are summed.
    pub fn new(mut entries: Vec<(usize, f32)>) -> Self {
        entries.sort_unstable_by_key(|&(idx, _)| idx);
        let mut merged: Vec<(usize, f32)> = Vec::with_capacity(entries.len());
        for (idx, value) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == idx => last.1 += value,
                _ => merged.push((idx, value)),
            }
        }
        merged.retain(|&(_, value)| value != 0.0);
        Self { entries: merged }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt()
    }

    /// Scale to unit length. Zero vectors stay zero.
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, v) in &mut self.entries {
                *v /= norm;
            }
        }
        self
    }

    /// Dot product by merge-join over the sorted indices.
    ///
    /// Products are summed in index order for both arguments, so
    /// `a.dot(b) == b.dot(a)` holds bit for bit.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity of two vectors, 0.0 when either is zero.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    a.dot(b) / denom
}

/// Square, symmetric similarity matrix over a set of vectors.
///
/// Entries are in [0, 1] for non-negative inputs and the diagonal is exactly
/// 1.0, including for zero vectors.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    rows: Vec<SparseVector>,
}

impl SimilarityMatrix {
    pub fn new(rows: Vec<SparseVector>) -> Self {
        let rows = rows.into_par_iter().map(SparseVector::normalized).collect();
        Self { rows }
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        if i == j {
            return 1.0;
        }
        self.rows[i].dot(&self.rows[j]).clamp(0.0, 1.0)
    }

    /// Similarities of row `i` against every row, computed in parallel.
    pub fn row(&self, i: usize) -> Vec<f32> {
        (0..self.rows.len())
            .into_par_iter()
            .map(|j| self.get(i, j))
            .collect()
    }

    /// Full dense matrix.
    pub fn to_dense(&self) -> Vec<Vec<f32>> {
        (0..self.rows.len())
            .into_par_iter()
            .map(|i| self.row(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_vector_sorts_and_merges() {
        let v = SparseVector::new(vec![(3, 1.0), (1, 2.0), (3, 0.5), (7, 0.0)]);
        assert_eq!(v.entries(), &[(1, 2.0), (3, 1.5)]);
    }

    #[test]
    fn test_dot_product() {
        let a = SparseVector::new(vec![(0, 1.0), (2, 2.0), (5, 3.0)]);
        let b = SparseVector::new(vec![(2, 4.0), (5, 1.0), (9, 7.0)]);
        assert_eq!(a.dot(&b), 11.0);
        assert_eq!(a.dot(&b), b.dot(&a));
    }

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        let a = SparseVector::new(vec![(0, 1.0), (1, 1.0)]);
        let b = SparseVector::new(vec![(2, 1.0)]);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&a, &SparseVector::default()), 0.0);
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let matrix = SimilarityMatrix::new(vec![
            SparseVector::new(vec![(0, 0.3), (1, 0.9)]),
            SparseVector::new(vec![(1, 0.2), (2, 0.7)]),
            SparseVector::new(vec![(0, 1.0), (2, 0.1), (3, 0.4)]),
            SparseVector::default(),
        ]);

        let dense = matrix.to_dense();
        assert_eq!(dense.len(), 4);
        for i in 0..4 {
            assert_eq!(dense[i][i], 1.0);
            for j in 0..4 {
                assert_eq!(dense[i][j], dense[j][i]);
                assert!((0.0..=1.0).contains(&dense[i][j]));
            }
        }
        assert_eq!(dense[3][0], 0.0);
    }

    #[test]
    fn test_row_matches_get() {
        let matrix = SimilarityMatrix::new(vec![
            SparseVector::new(vec![(0, 1.0)]),
            SparseVector::new(vec![(0, 1.0), (1, 1.0)]),
        ]);
        let row = matrix.row(1);
        assert_eq!(row, vec![matrix.get(1, 0), 1.0]);
        assert!((row[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }
}
