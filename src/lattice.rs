//! Lattice geometry: real-space vectors, reciprocal vectors and high-symmetry paths.
//!
//! All matrices follow the same convention, the axis0 direction stores one vector,
//! so `lat.row(i)` is $\bm a_i$ and `reciprocal().row(i)` is $\bm b_i$ with
//! $\bm a_i\cdot\bm b_j=2\pi\delta_{ij}$.
use crate::error::{Result, TbError};
use ndarray::prelude::*;
use ndarray::{ArrayBase, Data};
use ndarray_linalg::{Determinant, Inverse};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One leg of a high-symmetry path, as written in a `kpoint_path` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KPathSegment {
    pub from_label: String,
    pub from: Array1<f64>,
    pub to_label: String,
    pub to: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// The real space dimension.
    pub dim_r: usize,
    /// The lattice vectors, a dim_r$\times$dim_r matrix, the axis0 direction stores a 1$\times$dim_r lattice vector.
    pub lat: Array2<f64>,
    /// The high-symmetry path in fractional coordinates, possibly empty.
    pub kpath: Vec<KPathSegment>,
}

impl Lattice {
    pub fn new(lat: Array2<f64>) -> Result<Lattice> {
        let dim_r = lat.nrows();
        if dim_r == 0 || lat.ncols() != dim_r {
            return Err(TbError::DimensionMismatch {
                context: "lattice vectors (square matrix)".to_string(),
                expected: dim_r,
                found: lat.ncols(),
            });
        }
        Ok(Lattice {
            dim_r,
            lat,
            kpath: Vec::new(),
        })
    }

    pub fn with_kpath(mut self, kpath: Vec<KPathSegment>) -> Result<Lattice> {
        for seg in kpath.iter() {
            for k in [&seg.from, &seg.to] {
                if k.len() != self.dim_r {
                    return Err(TbError::DimensionMismatch {
                        context: format!("kpoint_path node {}", seg.from_label),
                        expected: self.dim_r,
                        found: k.len(),
                    });
                }
            }
        }
        self.kpath = kpath;
        Ok(self)
    }

    /// Reciprocal lattice vectors $B=2\pi (A^{-1})^T$, stored row by row.
    pub fn reciprocal(&self) -> Result<Array2<f64>> {
        let inv = self.lat.inv()?;
        Ok(inv.reversed_axes() * (2.0 * PI))
    }

    /// $|\det B|$, the volume of the Brillouin zone.
    pub fn reciprocal_volume(&self) -> Result<f64> {
        Ok(self.reciprocal()?.det()?.abs())
    }

    /// Maps a k-point in units of the reciprocal vectors to cartesian coordinates.
    pub fn to_cartesian<S: Data<Elem = f64>>(&self, k_frac: &ArrayBase<S, Ix1>) -> Result<Array1<f64>> {
        self.check_len("fractional k-point", k_frac.len())?;
        Ok(k_frac.dot(&self.reciprocal()?))
    }

    /// Inverse of [`Lattice::to_cartesian`]: $k_i=\bm k\cdot\bm a_i/2\pi$.
    pub fn to_fractional<S: Data<Elem = f64>>(&self, k_cart: &ArrayBase<S, Ix1>) -> Result<Array1<f64>> {
        self.check_len("cartesian k-point", k_cart.len())?;
        Ok(self.lat.dot(k_cart) / (2.0 * PI))
    }

    /// Cartesian displacement $\sum_j c_j\bm a_j$ for lattice coefficients `coeffs`.
    #[inline(always)]
    pub fn cartesian_shift<S: Data<Elem = f64>>(&self, coeffs: &ArrayBase<S, Ix1>) -> Array1<f64> {
        coeffs.dot(&self.lat)
    }

    /// Nodes of the stored `kpoint_path`, consecutive legs are assumed to connect.
    pub fn path_nodes(&self) -> Result<(Array2<f64>, Vec<String>)> {
        let mut nodes = Array2::<f64>::zeros((0, self.dim_r));
        let mut labels = Vec::new();
        let legs = self
            .kpath
            .iter()
            .map(|seg| (&seg.from, &seg.from_label))
            .chain(self.kpath.last().map(|seg| (&seg.to, &seg.to_label)));
        for (k, label) in legs {
            nodes
                .push_row(k.view())
                .map_err(|_| TbError::DimensionMismatch {
                    context: format!("kpoint_path node {}", label),
                    expected: self.dim_r,
                    found: k.len(),
                })?;
            labels.push(label.clone());
        }
        Ok((nodes, labels))
    }

    #[allow(non_snake_case)]
    pub fn k_path(&self, path: &Array2<f64>, nk: usize) -> Result<(Array2<f64>, Array1<f64>, Array1<f64>)> {
        //!根据高对称点来生成高对称路径, 画能带图
        //!
        //! `path` holds the fractional nodes row by row, `nk` is the total number of
        //! sampled points. Returns the fractional k-points, the cartesian arc length
        //! at each point and the arc length at each node.
        let n_node: usize = path.len_of(Axis(0));
        self.check_len("k-path node", path.len_of(Axis(1)))?;
        if n_node < 2 || nk < n_node {
            return Err(TbError::DimensionMismatch {
                context: "k-path sampling (need at least two nodes and nk >= nodes)".to_string(),
                expected: n_node.max(2),
                found: nk.min(n_node),
            });
        }
        let B = self.reciprocal()?;
        let mut k_node = Array1::<f64>::zeros(n_node);
        for n in 1..n_node {
            let dk = &path.row(n) - &path.row(n - 1);
            let dklen = dk.dot(&B).dot(&dk.dot(&B)).sqrt();
            k_node[[n]] = k_node[[n - 1]] + dklen;
        }
        let mut node_index: Vec<usize> = vec![0];
        for n in 1..n_node - 1 {
            let frac = k_node[[n]] / k_node[[n_node - 1]];
            let a = (frac * ((nk - 1) as f64)).round() as usize;
            node_index.push(a)
        }
        node_index.push(nk - 1);
        let mut k_dist = Array1::<f64>::zeros(nk);
        let mut k_vec = Array2::<f64>::zeros((nk, self.dim_r));
        k_vec.row_mut(0).assign(&path.row(0));
        for n in 1..n_node {
            let n_i = node_index[n - 1];
            let n_f = node_index[n];
            let kd_i = k_node[[n - 1]];
            let kd_f = k_node[[n]];
            let k_i = path.row(n - 1);
            let k_f = path.row(n);
            if n_f == n_i {
                continue;
            }
            for j in n_i..n_f + 1 {
                let frac: f64 = ((j - n_i) as f64) / ((n_f - n_i) as f64);
                k_dist[[j]] = kd_i + frac * (kd_f - kd_i);
                k_vec.row_mut(j).assign(&(&k_i * (1.0 - frac) + &k_f * frac));
            }
        }
        Ok((k_vec, k_dist, k_node))
    }

    fn check_len(&self, context: &str, found: usize) -> Result<()> {
        if found != self.dim_r {
            return Err(TbError::DimensionMismatch {
                context: context.to_string(),
                expected: self.dim_r,
                found,
            });
        }
        Ok(())
    }
}
