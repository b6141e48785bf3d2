//! Band energies, the half-filling gap and band-resolved velocities.
use crate::error::{Result, TbError};
use crate::io::write_txt;
use crate::TightBinding;
use log::info;
use ndarray::prelude::*;
use ndarray::{ArrayBase, Data, Zip};
use ndarray_linalg::{Eigh, EigValsh, UPLO};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Bands sampled along the high-symmetry path of the lattice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandStructure {
    /// Cartesian arc length of every sampled point.
    pub k_dist: Array1<f64>,
    /// Arc length of every path node.
    pub k_node: Array1<f64>,
    pub labels: Vec<String>,
    /// nk$\times$ham_size, ascending at every k.
    pub bands: Array2<f64>,
}

impl BandStructure {
    /// Writes `k_dist e_1 ... e_N` per line.
    pub fn write_bands(&self, output: &str) -> Result<()> {
        let nk = self.k_dist.len();
        let mut data = Array2::<f64>::zeros((nk, self.bands.ncols() + 1));
        data.column_mut(0).assign(&self.k_dist);
        data.slice_mut(s![.., 1..]).assign(&self.bands);
        write_txt(&data, output)
    }
}

impl TightBinding {
    pub fn solve_band_onek<S: Data<Elem = f64>>(&self, kvec: &ArrayBase<S, Ix1>) -> Result<Array1<f64>> {
        //!求解单个k点的能带值, 从小到大排列
        let hamk = self.gen_ham(kvec)?;
        Ok(hamk.eigvalsh(UPLO::Lower)?)
    }

    /// Energy difference across the half-filling boundary,
    /// $\ve_{N/2}-\ve_{N/2-1}$ with N = ham_size, never negative.
    ///
    /// The boundary is fixed, this is not a search for the highest occupied state.
    pub fn band_gap<S: Data<Elem = f64>>(&self, kvec: &ArrayBase<S, Ix1>) -> Result<f64> {
        let n = self.ham_size();
        if n < 2 {
            return Err(TbError::DimensionMismatch {
                context: "band gap needs at least two bands".to_string(),
                expected: 2,
                found: n,
            });
        }
        let eval = self.solve_band_onek(kvec)?;
        Ok(eval[n / 2] - eval[n / 2 - 1])
    }

    /// Bands at many cartesian k-points (rows of `kvec`), evaluated one after the other.
    pub fn solve_band_all<S: Data<Elem = f64>>(&self, kvec: &ArrayBase<S, Ix2>) -> Result<Array2<f64>> {
        let nk = kvec.len_of(Axis(0));
        let mut band = Array2::<f64>::zeros((nk, self.ham_size()));
        for (k, mut b) in kvec.outer_iter().zip(band.outer_iter_mut()) {
            b.assign(&self.solve_band_onek(&k)?);
        }
        Ok(band)
    }

    /// Eigenvalues and $U^\dagger\p_{k_a}H_{\bm k}U$ for every direction `a`, the
    /// columns of $U$ being the eigenvectors in ascending order.
    ///
    /// The diagonal of each slice is the band velocity times $\hbar$.
    #[allow(non_snake_case)]
    pub fn solve_velocity_onek<S: Data<Elem = f64>>(
        &self,
        kvec: &ArrayBase<S, Ix1>,
    ) -> Result<(Array1<f64>, Array3<Complex<f64>>)> {
        let hamk = self.gen_ham(kvec)?;
        let (eval, evec) = hamk.eigh(UPLO::Lower)?;
        let evec_dag = evec.t().mapv(|x| x.conj());
        let mut v = self.gen_dham(kvec)?;
        Zip::from(v.axis_iter_mut(Axis(2))).for_each(|mut v0| {
            let rotated = evec_dag.dot(&v0).dot(&evec);
            v0.assign(&rotated);
        });
        Ok((eval, v))
    }

    /// Samples the `kpoint_path` of the lattice with `nk` points in total.
    pub fn band_structure(&self, nk: usize) -> Result<BandStructure> {
        let (nodes, labels) = self.lattice.path_nodes()?;
        let (k_frac, k_dist, k_node) = self.lattice.k_path(&nodes, nk)?;
        let k_cart = k_frac.dot(&self.lattice.reciprocal()?);
        let bands = self.solve_band_all(&k_cart)?;
        info!(
            "sampled {} bands at {} k-points along {}",
            self.ham_size(),
            nk,
            labels.join("-")
        );
        Ok(BandStructure {
            k_dist,
            k_node,
            labels,
            bands,
        })
    }
}
