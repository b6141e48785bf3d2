//! Injection current of a three-dimensional model under linearly polarized light.
//!
//! The current is summed over a uniform k-mesh with a Gaussian resonance between
//! the two bands at the half-filling boundary, $v=N/2-1$ and $c=N/2$:
//! $$\bm j=\f{V_{BZ}}{N_k\hbar}\sum_{\bm k}\nb_{\bm k}\Delta_{\bm k}
//! \lt|\sum_m A_m\lt(U^\dagger\p_m H_{\bm k}U\rt)_{cv}\rt|^2
//! e^{-\lt(\eta(\Delta_{\bm k}-\hbar\og)\rt)^2}\lt(f(\ve_v)-f(\ve_c)\rt)$$
//! where $\Delta_{\bm k}$ is [`TightBinding::band_gap`].
use crate::error::{require_3d, Result, TbError};
use crate::kpoints::gen_kmesh;
use crate::math::fermi_dirac;
use crate::phy_const::hbar_ev;
use crate::TightBinding;
use log::info;
use ndarray::prelude::*;
use ndarray::{ArrayBase, Data};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionConfig {
    /// Angular frequency of the light, in rad/s.
    pub omega: f64,
    /// Cartesian polarization vector.
    pub polarization: Array1<f64>,
    /// Chemical potential, in eV.
    pub fermi_energy: f64,
    /// Temperature in K, zero gives a sharp Fermi surface.
    pub temperature: f64,
    /// Inverse width of the resonance, in 1/eV.
    pub broadening: f64,
    /// Step of the central differences of the gap, cartesian units.
    pub fd_step: f64,
    /// Number of k-points along every reciprocal vector.
    pub k_mesh: Array1<usize>,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        InjectionConfig {
            omega: 0.1 / hbar_ev,
            polarization: array![1.0, 0.0, 0.0],
            fermi_energy: 0.0,
            temperature: 0.0,
            broadening: 20.0,
            fd_step: 1e-5,
            k_mesh: array![20, 20, 20],
        }
    }
}

impl TightBinding {
    /// Summand of the injection current at the cartesian point `kvec`, without
    /// the $V_{BZ}/(N_k\hbar)$ prefactor.
    pub fn injection_current_onek<S: Data<Elem = f64>>(
        &self,
        kvec: &ArrayBase<S, Ix1>,
        config: &InjectionConfig,
    ) -> Result<Array1<f64>> {
        require_3d(self.dim_r())?;
        let dim = self.dim_r();
        if config.polarization.len() != dim {
            return Err(TbError::DimensionMismatch {
                context: "polarization vector".to_string(),
                expected: dim,
                found: config.polarization.len(),
            });
        }
        let n = self.ham_size();
        if n < 2 {
            return Err(TbError::DimensionMismatch {
                context: "injection current needs at least two bands".to_string(),
                expected: 2,
                found: n,
            });
        }
        let (vb, cb) = (n / 2 - 1, n / 2);
        let (eval, v) = self.solve_velocity_onek(kvec)?;
        let gap = eval[cb] - eval[vb];
        let occupation = fermi_dirac(eval[vb], config.fermi_energy, config.temperature)
            - fermi_dirac(eval[cb], config.fermi_energy, config.temperature);
        let detuning = config.broadening * (gap - hbar_ev * config.omega);
        let resonance = (-detuning * detuning).exp();
        let mut current = Array1::<f64>::zeros(dim);
        if occupation == 0.0 || resonance == 0.0 {
            return Ok(current);
        }
        let mut element = Complex::new(0.0, 0.0);
        for m in 0..dim {
            element += v[[cb, vb, m]] * config.polarization[m];
        }
        let weight = element.norm_sqr() * resonance * occupation;
        if weight == 0.0 {
            return Ok(current);
        }
        let h = config.fd_step;
        for a in 0..dim {
            let mut kp = kvec.to_owned();
            let mut km = kvec.to_owned();
            kp[a] += h;
            km[a] -= h;
            let grad = (self.band_gap(&kp)? - self.band_gap(&km)?) / (2.0 * h);
            current[a] = grad * weight;
        }
        Ok(current)
    }

    /// Injection current on the mesh `config.k_mesh`, the k-points are visited one
    /// after the other.
    pub fn injection_current(&self, config: &InjectionConfig) -> Result<Array1<f64>> {
        require_3d(self.dim_r())?;
        if config.k_mesh.len() != self.dim_r() {
            return Err(TbError::DimensionMismatch {
                context: "k mesh".to_string(),
                expected: self.dim_r(),
                found: config.k_mesh.len(),
            });
        }
        let kvec: Array2<f64> = gen_kmesh(&config.k_mesh)?;
        let nk = kvec.nrows();
        let k_cart = kvec.dot(&self.lattice.reciprocal()?);
        let mut current = Array1::<f64>::zeros(self.dim_r());
        for k in k_cart.outer_iter() {
            current += &self.injection_current_onek(&k, config)?;
        }
        let current = current * (self.lattice.reciprocal_volume()? / (nk as f64) / hbar_ev);
        info!(
            "injection current at hbar omega = {:.4} eV over {} k-points: {}",
            hbar_ev * config.omega,
            nk,
            current
        );
        Ok(current)
    }
}
