//! Analytic k-derivatives of the interpolated Hamiltonian.
//!
//! Both expansions reuse the traversal of [`TightBinding::gen_ham`], each Fourier
//! term $t\,e^{i\bm k\cdot\bm R}$ is differentiated in closed form, so the tensors
//! agree with finite differences of `gen_ham` up to the truncation error of the
//! difference scheme.
use crate::error::{require_3d, Result};
use crate::TightBinding;
use ndarray::prelude::*;
use ndarray::{ArrayBase, Data};
use num_complex::Complex;

impl TightBinding {
    #[allow(non_snake_case)]
    pub fn gen_dham<S: Data<Elem = f64>>(&self, kvec: &ArrayBase<S, Ix1>) -> Result<Array3<Complex<f64>>> {
        //! 速度算符 (未除以 $\hbar$), 即
        //! $$\p_{k_\ap}H_{mn,\bm k}=\sum_{\bm R,\bm T} i(\bm R+\bm T)_\ap t_{mn}e^{i\bm k\cdot(\bm R+\bm T)}$$
        //!
        //! The result has shape (ham_size, ham_size, dim_r), slice `[.., .., a]` is the
        //! derivative along cartesian direction `a`.
        let n = self.ham_size();
        let dim = self.dim_r();
        let mut dham = Array3::<Complex<f64>>::zeros((n, n, dim));
        self.fourier_terms(kvec, |row, col, term, R| {
            let term = term * Complex::i();
            for a in 0..dim {
                dham[[row, col, a]] += term * R[a];
            }
        })?;
        Ok(dham)
    }

    #[allow(non_snake_case)]
    pub fn gen_ddham<S: Data<Elem = f64>>(&self, kvec: &ArrayBase<S, Ix1>) -> Result<Array3<Complex<f64>>> {
        //! Second derivative $\p_{k_a}\p_{k_b}H_{\bm k}$, only defined for three-dimensional lattices.
        //!
        //! Shape (ham_size, ham_size, 9), the pair $(a,b)$ is flattened to `a*3+b`.
        require_3d(self.dim_r())?;
        let n = self.ham_size();
        let dim = self.dim_r();
        let mut ddham = Array3::<Complex<f64>>::zeros((n, n, dim * dim));
        self.fourier_terms(kvec, |row, col, term, R| {
            // (iR_a)(iR_b) = -R_a R_b
            let term = -term;
            for a in 0..dim {
                for b in 0..dim {
                    ddham[[row, col, a * dim + b]] += term * (R[a] * R[b]);
                }
            }
        })?;
        Ok(ddham)
    }
}
