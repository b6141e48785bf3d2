//! Fourier interpolation of Wannier tight-binding models.
//!
//! This crate takes the real-space hoppings written by wannier90
//! (`seedname_hr.dat`, `seedname_wsvec.dat`) together with the lattice of
//! `seedname.win`, and evaluates at any k-point:
//!
//! 1: the Bloch Hamiltonian $H_{\bm k}$ and its first and second k-derivatives
//!
//! 2: the band gap at half filling and the band energies along a path
//!
//! 3: the position of Weyl nodes, by minimizing the gap with a Nelder-Mead simplex
//!
//! 4: the injection current on a k-mesh
//!
//! A [`TightBinding`] is built once and only read afterwards, so a shared
//! reference can be handed to any number of threads evaluating different k-points.
#[cfg(any(feature = "intel-mkl-system", feature = "intel-mkl-static"))]
extern crate intel_mkl_src as _src;

#[cfg(any(feature = "openblas-system", feature = "openblas-static"))]
extern crate openblas_src as _src;

#[cfg(any(feature = "netlib-system", feature = "netlib-static"))]
extern crate netlib_src as _src;

pub mod band;
pub mod current;
pub mod derivative;
pub mod error;
pub mod generics;
pub mod hamiltonian;
pub mod hopping;
pub mod io;
pub mod kpoints;
pub mod lattice;
pub mod math;
pub mod phy_const;
pub mod wannier90;
pub mod weyl;

pub use crate::band::BandStructure;
pub use crate::current::InjectionConfig;
pub use crate::error::{Result, TbError};
pub use crate::generics::usefloat;
pub use crate::hopping::{block_index_remap, HoppingTable};
pub use crate::lattice::{KPathSegment, Lattice};
pub use crate::weyl::{WeylConfig, WeylNode};

/// Noise threshold of the hopping amplitudes, in eV.
pub const DEFAULT_NOISE_CUTOFF: f64 = 0.0005;

/// A Wannier tight-binding model: the lattice, the hopping table and the noise cutoff
/// applied to the amplitudes during interpolation.
#[derive(Debug, Clone)]
pub struct TightBinding {
    pub lattice: Lattice,
    pub table: HoppingTable,
    /// Amplitudes with a modulus below this value are dropped, the rest are rounded to its multiples.
    pub noise_cutoff: f64,
}

impl TightBinding {
    pub fn new(lattice: Lattice, table: HoppingTable) -> Result<TightBinding> {
        if lattice.dim_r != table.dim_r {
            return Err(TbError::DimensionMismatch {
                context: "hopping lattice vectors vs lattice".to_string(),
                expected: lattice.dim_r,
                found: table.dim_r,
            });
        }
        Ok(TightBinding {
            lattice,
            table,
            noise_cutoff: DEFAULT_NOISE_CUTOFF,
        })
    }

    pub fn with_noise_cutoff(mut self, cutoff: f64) -> TightBinding {
        self.noise_cutoff = cutoff;
        self
    }

    #[inline(always)]
    pub fn dim_r(&self) -> usize {
        self.lattice.dim_r
    }

    #[inline(always)]
    pub fn ham_size(&self) -> usize {
        self.table.ham_size
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_models::weyl_toy;
    use ndarray::array;

    #[test]
    fn test_dimension_check() {
        let table = weyl_toy().table;
        let lattice = Lattice::new(array![[1.0, 0.0], [0.0, 1.0]]).unwrap();
        assert!(matches!(
            TightBinding::new(lattice, table),
            Err(TbError::DimensionMismatch { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<TightBinding>();
        let model = weyl_toy();
        assert_eq!(model.ham_size(), 2);
        assert_eq!(model.dim_r(), 3);
        assert_eq!(model.noise_cutoff, DEFAULT_NOISE_CUTOFF);
    }
}
