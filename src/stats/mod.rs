//! Distance and combinatorics primitives shared by the feature and
//! verification layers. Pure functions and restartable iterators, no state.

use crate::errors::BioauthError;
use rand::Rng;

/// Euclidean distance between two vectors of equal length.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64, BioauthError> {
    if a.len() != b.len() {
        return Err(BioauthError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
    Ok(sum.sqrt())
}

/// Arithmetic mean; 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n-1 divisor); 0.0 when fewer than two values.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Two independent draws from N(mean, std) via the polar Box-Muller
/// transform. Used for synthetic data only, never in the verification path.
pub fn gaussian_pair<R: Rng + ?Sized>(rng: &mut R, mean: f64, std: f64) -> (f64, f64) {
    loop {
        let x1 = 2.0 * rng.gen::<f64>() - 1.0;
        let x2 = 2.0 * rng.gen::<f64>() - 1.0;
        let w = x1 * x1 + x2 * x2;
        if w > 0.0 && w < 1.0 {
            let w = ((-2.0 * w.ln()) / w).sqrt();
            return (std * x1 * w + mean, std * x2 * w + mean);
        }
    }
}

/// `n` Gaussian draws; pairs come from [`gaussian_pair`], the last draw of
/// an odd-length request discards its twin.
pub fn normal_samples<R: Rng + ?Sized>(rng: &mut R, n: usize, mean: f64, std: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n + 1);
    while out.len() < n {
        let (y1, y2) = gaussian_pair(rng, mean, std);
        out.push(y1);
        out.push(y2);
    }
    out.truncate(n);
    out
}

/// Iterator over all k-element subsets of a slice, in lexicographic order
/// of the index tuple. Finite; restart by constructing a new one.
#[derive(Debug, Clone)]
pub struct Combinations<T> {
    items: Vec<T>,
    indices: Vec<usize>,
    done: bool,
}

impl<T: Clone> Combinations<T> {
    pub fn new(items: &[T], k: usize) -> Self {
        Self {
            done: k > items.len(),
            items: items.to_vec(),
            indices: (0..k).collect(),
        }
    }
}

impl<T: Clone> Iterator for Combinations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let current: Vec<T> = self.indices.iter().map(|&i| self.items[i].clone()).collect();

        let n = self.items.len();
        let k = self.indices.len();
        // rightmost index that can still move right
        let mut i = k as isize - 1;
        while i >= 0 && self.indices[i as usize] == n - k + i as usize {
            i -= 1;
        }
        if i < 0 {
            self.done = true;
        } else {
            let i = i as usize;
            self.indices[i] += 1;
            for j in i + 1..k {
                self.indices[j] = self.indices[j - 1] + 1;
            }
        }
        Some(current)
    }
}

/// Iterator over the Cartesian product of several sets; the last dimension
/// advances fastest (odometer order). Finite; restart by constructing anew.
#[derive(Debug, Clone)]
pub struct Product<T> {
    sets: Vec<Vec<T>>,
    indices: Vec<usize>,
    done: bool,
}

impl<T: Clone> Product<T> {
    pub fn new(sets: &[Vec<T>]) -> Self {
        Self {
            done: sets.iter().any(|s| s.is_empty()),
            indices: vec![0; sets.len()],
            sets: sets.to_vec(),
        }
    }
}

impl<T: Clone> Iterator for Product<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let current: Vec<T> = self
            .indices
            .iter()
            .zip(&self.sets)
            .map(|(&i, s)| s[i].clone())
            .collect();

        let mut pos = self.sets.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.sets[pos].len() {
                break;
            }
            self.indices[pos] = 0;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn euclidean_three_four_five() {
        let d = euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn euclidean_rejects_mismatched_lengths() {
        assert!(matches!(
            euclidean_distance(&[1.0], &[1.0, 2.0]),
            Err(BioauthError::DimensionMismatch { left: 1, right: 2 })
        ));
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn variance_below_two_values_is_zero() {
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[42.0]), 0.0);
    }

    #[test]
    fn variance_uses_bessel_correction() {
        assert!((variance(&[2.0, 4.0, 6.0]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn std_dev_of_constant_series_is_zero() {
        assert_eq!(std_dev(&[7.0, 7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn gaussian_samples_track_parameters() {
        let mut rng = StdRng::seed_from_u64(11);
        let samples = normal_samples(&mut rng, 4000, 100.0, 15.0);
        assert_eq!(samples.len(), 4000);
        let m = mean(&samples);
        let s = std_dev(&samples);
        assert!((m - 100.0).abs() < 2.0, "mean drifted: {m}");
        assert!((s - 15.0).abs() < 2.0, "std drifted: {s}");
    }

    #[test]
    fn normal_samples_odd_length() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(normal_samples(&mut rng, 5, 0.0, 1.0).len(), 5);
    }

    #[test]
    fn combinations_three_choose_two() {
        let got: Vec<Vec<u32>> = Combinations::new(&[1, 2, 3], 2).collect();
        assert_eq!(got, vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
    }

    #[test]
    fn combinations_edge_cases() {
        assert_eq!(Combinations::new(&[1, 2], 3).count(), 0);
        let empty: Vec<Vec<u32>> = Combinations::new(&[1, 2], 0).collect();
        assert_eq!(empty, vec![Vec::<u32>::new()]);
    }

    #[test]
    fn product_last_dimension_fastest() {
        let got: Vec<Vec<u32>> = Product::new(&[vec![1, 2], vec![3, 4, 5]]).collect();
        assert_eq!(
            got,
            vec![
                vec![1, 3],
                vec![1, 4],
                vec![1, 5],
                vec![2, 3],
                vec![2, 4],
                vec![2, 5],
            ]
        );
    }

    #[test]
    fn product_with_empty_member_is_empty() {
        assert_eq!(Product::<u32>::new(&[vec![1], vec![]]).count(), 0);
    }

    #[test]
    fn product_is_restartable() {
        let sets = vec![vec![1, 2], vec![3, 4]];
        let first: Vec<_> = Product::new(&sets).collect();
        let second: Vec<_> = Product::new(&sets).collect();
        assert_eq!(first, second);
    }
}
