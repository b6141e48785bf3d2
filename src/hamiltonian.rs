//! Fourier interpolation of the real-space hoppings into the Bloch Hamiltonian.
use crate::error::{Result, TbError};
use crate::hopping::block_index_remap;
use crate::TightBinding;
use ndarray::prelude::*;
use ndarray::{ArrayBase, Data};
use num_complex::Complex;

/// Noise suppression of a single hopping amplitude.
///
/// Amplitudes with $|t|\le$ `cutoff` are ab-initio noise and become exactly zero,
/// the others are rounded component-wise to the nearest multiple of `cutoff`.
/// A non-positive `cutoff` switches the suppression off.
#[inline(always)]
pub fn denoise(hop: Complex<f64>, cutoff: f64) -> Complex<f64> {
    if cutoff <= 0.0 {
        return hop;
    }
    if hop.norm() > cutoff {
        Complex::new(
            (hop.re / cutoff).round() * cutoff,
            (hop.im / cutoff).round() * cutoff,
        )
    } else {
        Complex::new(0.0, 0.0)
    }
}

impl TightBinding {
    /// Walks every hopping row once and every WS shift of its group, handing
    /// `(row, col, t e^{i k R}, R)` to `f`, with `t` the weighted amplitude and `R`
    /// the cartesian displacement of the shift.
    ///
    /// The amplitude and its lattice vector are read from the remapped row, the
    /// output cell uses the orbital columns of the row itself.
    #[allow(non_snake_case)]
    pub(crate) fn fourier_terms<S, F>(&self, kvec: &ArrayBase<S, Ix1>, mut f: F) -> Result<()>
    where
        S: Data<Elem = f64>,
        F: FnMut(usize, usize, Complex<f64>, ArrayView1<f64>),
    {
        if kvec.len() != self.dim_r() {
            return Err(TbError::DimensionMismatch {
                context: "cartesian k-point".to_string(),
                expected: self.dim_r(),
                found: kvec.len(),
            });
        }
        let table = &self.table;
        let n = table.ham_size;
        let block = table.block_size();
        for i in 0..table.n_rows() {
            let row = table.hop_orb[[i, 1]];
            let col = table.hop_orb[[i, 0]];
            let nind = block_index_remap(i, n, block);
            let hop = denoise(table.hop[nind], self.noise_cutoff);
            if hop.re == 0.0 && hop.im == 0.0 {
                continue;
            }
            let weight = table.wsvec_weights[i] as f64 * table.hr_weights[i / block];
            let hop = hop / weight;
            let coeffs = table.hop_R.row(nind).mapv(|x| x as f64);
            for shift in table.ws_group(i).outer_iter() {
                let R = self.lattice.cartesian_shift(&(&coeffs + &shift.mapv(|x| x as f64)));
                let phase = Complex::new(0.0, kvec.dot(&R)).exp();
                f(row, col, hop * phase, R.view());
            }
        }
        Ok(())
    }

    #[allow(non_snake_case)]
    pub fn gen_ham<S: Data<Elem = f64>>(&self, kvec: &ArrayBase<S, Ix1>) -> Result<Array2<Complex<f64>>> {
        //!这个是做傅里叶变换, 将实空间的哈密顿量变换到倒空间的哈密顿量
        //!
        //! $$H_{mn,\bm k}=\sum_{\bm R}\f{1}{N_{\bm R}}\f{1}{N^{ws}_{mn\bm R}}\sum_{\bm T}
        //! \bra{m\bm 0}\hat H\ket{n\bm R}e^{i\bm k\cdot(\bm R+\bm T)}$$
        //!
        //! where $\bm T$ runs over the Wigner-Seitz images of the hopping. `kvec` is
        //! in cartesian coordinates. The result is recomputed on every call.
        let n = self.ham_size();
        let mut hamk = Array2::<Complex<f64>>::zeros((n, n));
        self.fourier_terms(kvec, |row, col, term, _| {
            hamk[[row, col]] += term;
        })?;
        Ok(hamk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_models::{chain_1d, weyl_toy};
    use crate::{HoppingTable, Lattice};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::f64::consts::PI;

    fn assert_hermitian(h: &Array2<Complex<f64>>) {
        let n = h.nrows();
        for i in 0..n {
            for j in 0..n {
                let d = h[[i, j]] - h[[j, i]].conj();
                assert!(d.norm() < 1e-12, "H[{},{}] not hermitian: {}", i, j, d);
            }
        }
    }

    #[test]
    fn test_denoise() {
        assert_eq!(denoise(Complex::new(0.0003, 0.0001), 0.0005), Complex::new(0.0, 0.0));
        let r = denoise(Complex::new(1.00026, -0.00024), 0.0005);
        assert_abs_diff_eq!(r.re, 1.0005, epsilon = 1e-12);
        assert_abs_diff_eq!(r.im, 0.0, epsilon = 1e-12);
        assert_eq!(denoise(Complex::new(1e-6, 0.0), 0.0), Complex::new(1e-6, 0.0));
    }

    #[test]
    fn test_chain_matches_bloch_matrix() {
        let t = 1.0;
        let model = chain_1d(t);
        for j in 0..6 {
            let k = -PI + 2.0 * PI * (j as f64) / 6.0;
            let h = model.gen_ham(&array![k]).unwrap();
            let e = Complex::new(0.0, k).exp();
            assert_abs_diff_eq!(h[[0, 0]].norm(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(h[[1, 1]].norm(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!((h[[0, 1]] - e.conj() * t).norm(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!((h[[1, 0]] - e * t).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_hermitian_and_periodic() {
        let model = weyl_toy();
        let b = model.lattice.reciprocal().unwrap();
        let ks = [array![0.1, 0.2, -0.3], array![1.3, -0.7, 0.45], array![0.0, 0.0, 0.0]];
        for k in ks.iter() {
            let h = model.gen_ham(k).unwrap();
            assert_hermitian(&h);
            let g = &b.row(0) - &b.row(2) * 2.0;
            let hg = model.gen_ham(&(k + &g)).unwrap();
            for (x, y) in h.iter().zip(hg.iter()) {
                assert_abs_diff_eq!((x - y).norm(), 0.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_ws_images_are_averaged() {
        // on-site term of a one-orbital chain split over the images R=0 and R=1,
        // on a block of degeneracy 2
        let lattice = Lattice::new(array![[1.0]]).unwrap();
        let table = HoppingTable::new(
            array![[0]],
            array![[0, 0]],
            array![Complex::new(4.0, 0.0)],
            array![2.0],
            array![[0], [1]],
            array![2],
        )
        .unwrap();
        let model = TightBinding::new(lattice, table).unwrap();
        let k = 0.7;
        let h = model.gen_ham(&array![k]).unwrap();
        let expect = Complex::new(1.0, 0.0) + Complex::new(0.0, k).exp();
        assert_abs_diff_eq!((h[[0, 0]] - expect).norm(), 0.0, epsilon = 1e-12);
    }

    /// Two orbitals on a chain with R = -1, 0, 1. Inside each block the (0,1) and
    /// (1,0) records carry different WS groups and weights, so pairing an amplitude
    /// with the WS group of the wrong row changes H.
    #[allow(non_snake_case)]
    fn asymmetric_ws_chain() -> TightBinding {
        let c = |x: f64| Complex::new(x, 0.0);
        let zero = c(0.0);
        // rows in hr order, first orbital fastest: (0,0) (1,0) (0,1) (1,1)
        let hop_R = array![[-1], [-1], [-1], [-1], [0], [0], [0], [0], [1], [1], [1], [1]];
        let hop_orb = Array2::from_shape_fn((12, 2), |(i, col)| {
            let ind = i % 4;
            if col == 0 { ind % 2 } else { ind / 2 }
        });
        let hop = array![
            zero, c(0.3), c(0.2), zero, // R = -1: H[1,0] = 0.3, H[0,1] = 0.2
            zero, c(0.5), c(0.5), zero, // R = 0: H[1,0] = H[0,1] = 0.5
            zero, c(0.2), c(0.3), zero // R = 1: H[1,0] = 0.2, H[0,1] = 0.3
        ];
        // groups in wsvec order, first orbital outer: (0,0) (0,1) (1,0) (1,1)
        let wsvec_weights = array![1, 2, 1, 1, 1, 2, 2, 1, 1, 1, 2, 1];
        let wsvec = array![
            [0], [0], [-1], [0], [0], // R = -1
            [0], [0], [1], [0], [-1], [0], // R = 0
            [0], [0], [0], [1], [0] // R = 1
        ];
        let table =
            HoppingTable::new(hop_R, hop_orb, hop, Array1::ones(3), wsvec, wsvec_weights).unwrap();
        TightBinding::new(Lattice::new(array![[1.0]]).unwrap(), table).unwrap()
    }

    #[test]
    fn test_ws_groups_follow_the_output_cell() {
        let model = asymmetric_ws_chain();
        let e = |n: f64, k: f64| Complex::new(0.0, n * k).exp();
        for k in [-2.5, -0.4, 0.0, 0.9, 2.2] {
            let h = model.gen_ham(&array![k]).unwrap();
            let h01 = (e(0.0, k) + e(1.0, k)) * 0.25 + e(1.0, k) * 0.3 + (e(-1.0, k) + e(-2.0, k)) * 0.1;
            let h10 = (e(0.0, k) + e(-1.0, k)) * 0.25 + e(-1.0, k) * 0.3 + (e(1.0, k) + e(2.0, k)) * 0.1;
            assert_abs_diff_eq!((h[[0, 1]] - h01).norm(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!((h[[1, 0]] - h10).norm(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(h[[0, 0]].norm(), 0.0, epsilon = 1e-12);
            assert_hermitian(&h);
        }
    }

    #[test]
    fn test_noise_cutoff_is_configurable() {
        let lattice = Lattice::new(array![[1.0]]).unwrap();
        let table = HoppingTable::without_ws(
            array![[0]],
            array![[0, 0]],
            array![Complex::new(0.0004, 0.0)],
            array![1.0],
        )
        .unwrap();
        let model = TightBinding::new(lattice, table).unwrap();
        let h = model.gen_ham(&array![0.3]).unwrap();
        assert_eq!(h[[0, 0]], Complex::new(0.0, 0.0));
        let model = model.with_noise_cutoff(0.0001);
        let h = model.gen_ham(&array![0.3]).unwrap();
        assert_abs_diff_eq!(h[[0, 0]].re, 0.0004, epsilon = 1e-12);
    }

    #[test]
    fn test_wrong_k_length() {
        let model = chain_1d(1.0);
        assert!(matches!(
            model.gen_ham(&array![0.1, 0.2]),
            Err(TbError::DimensionMismatch { expected: 1, found: 2, .. })
        ));
    }
}
