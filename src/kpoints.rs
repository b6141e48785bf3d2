use crate::error::{Result, TbError};
use crate::generics::usefloat;
use ndarray::{Array1, Array2};

/// Uniform mesh of fractional k-points, `k_mesh[i]` points along reciprocal vector `i`
/// at $j/n_i$, with the last direction running fastest.
#[inline(always)]
pub fn gen_kmesh<T>(k_mesh: &Array1<usize>) -> Result<Array2<T>>
where
    T: usefloat + std::ops::Div<Output = T>,
{
    let dim: usize = k_mesh.len();
    if dim == 0 || k_mesh.iter().any(|&n| n == 0) {
        return Err(TbError::InvalidDimension {
            dim,
            supported: vec![1, 2, 3],
        });
    }
    let nk: usize = k_mesh.iter().product();
    let kvec = Array2::<T>::from_shape_fn((nk, dim), |(i, r)| {
        let stride: usize = k_mesh.iter().skip(r + 1).product();
        let j = (i / stride) % k_mesh[[r]];
        T::from(j) / T::from(k_mesh[[r]])
    });
    Ok(kvec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_gen_kmesh() {
        let kmesh: Array2<f64> = gen_kmesh(&array![2, 3]).unwrap();
        assert_eq!(kmesh.shape(), &[6, 2]);
        assert_eq!(kmesh.row(0), array![0.0, 0.0]);
        assert_eq!(kmesh.row(1), array![0.0, 1.0 / 3.0]);
        assert_eq!(kmesh.row(3), array![0.5, 0.0]);
        assert_eq!(kmesh.row(5), array![0.5, 2.0 / 3.0]);
    }

    #[test]
    fn test_gen_kmesh_rejects_empty() {
        assert!(gen_kmesh::<f64>(&array![2, 0, 2]).is_err());
        assert!(gen_kmesh::<f64>(&Array1::zeros(0)).is_err());
    }
}
