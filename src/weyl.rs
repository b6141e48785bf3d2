//! Weyl-node search: Nelder-Mead minimization of the half-filling gap in 3D k-space.
//!
//! The minimizer is derivative free, so it only needs [`TightBinding::band_gap`].
//! A returned node is a candidate: the caller decides from [`WeylNode::gap`] and
//! [`WeylNode::converged`] whether the bands really touch there.
use crate::error::{require_3d, Result, TbError};
use crate::TightBinding;
use log::{debug, info, warn};
use ndarray::prelude::*;
use ndarray::{ArrayBase, Data};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Parameters of the simplex search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeylConfig {
    /// Edge length of the initial simplex, cartesian units.
    pub edge: f64,
    /// Convergence threshold on the largest vertex distance.
    pub size_tol: f64,
    /// Convergence threshold on worst minus best gap.
    pub f_tol: f64,
    pub max_iter: usize,
}

impl Default for WeylConfig {
    fn default() -> Self {
        WeylConfig {
            edge: 0.005,
            size_tol: 1e-14,
            f_tol: 1e-14,
            max_iter: 1000,
        }
    }
}

/// Best vertex of the final simplex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeylNode {
    pub k_cart: Array1<f64>,
    pub k_frac: Array1<f64>,
    pub gap: f64,
    pub iterations: usize,
    pub simplex_size: f64,
    /// Both tolerances were met before the iteration cap.
    pub converged: bool,
}

/// Outcome of [`nelder_mead`].
#[derive(Debug, Clone)]
pub struct SimplexMinimum {
    pub x: Array1<f64>,
    pub value: f64,
    pub iterations: usize,
    pub simplex_size: f64,
    pub converged: bool,
}

/// Largest distance between two vertices (rows of `x`).
pub fn simplex_size(x: &Array2<f64>) -> f64 {
    let mut size: f64 = 0.0;
    for (i, a) in x.outer_iter().enumerate() {
        for b in x.outer_iter().skip(i + 1) {
            let d = &a - &b;
            size = size.max(d.dot(&d).sqrt());
        }
    }
    size
}

/// Stable sort of the vertices by value, ties keep their previous order.
fn sort_simplex(x: &mut Array2<f64>, f: &mut Array1<f64>) {
    let mut order: Vec<usize> = (0..f.len()).collect();
    order.sort_by(|&i, &j| f[i].total_cmp(&f[j]));
    *x = x.select(Axis(0), &order);
    *f = f.select(Axis(0), &order);
}

/// Fills `values[i] = f(x.row(i))` for every row from `from` on. The rows are
/// independent, so they are evaluated in parallel.
fn evaluate_rows<F>(f: &F, x: &Array2<f64>, values: &mut Array1<f64>, from: usize) -> Result<()>
where
    F: Fn(ArrayView1<f64>) -> Result<f64> + Sync,
{
    let results: Vec<Result<f64>> = (from..x.nrows())
        .into_par_iter()
        .map(|i| f(x.row(i)))
        .collect();
    for (i, r) in (from..).zip(results) {
        values[i] = r?;
    }
    Ok(())
}

/// Nelder-Mead minimization of `f` starting from the simplex made of `x0` and
/// `x0 + edge e_i` for every axis.
///
/// Reaching `max_iter` is not an error, the result carries `converged = false`.
pub fn nelder_mead<S, F>(f: F, x0: &ArrayBase<S, Ix1>, config: &WeylConfig) -> Result<SimplexMinimum>
where
    S: Data<Elem = f64>,
    F: Fn(ArrayView1<f64>) -> Result<f64> + Sync,
{
    let n = x0.len();
    if n == 0 {
        return Err(TbError::DimensionMismatch {
            context: "simplex start point".to_string(),
            expected: 1,
            found: 0,
        });
    }
    let mut x = Array2::<f64>::zeros((n + 1, n));
    for mut row in x.outer_iter_mut() {
        row.assign(x0);
    }
    for i in 0..n {
        x[[i + 1, i]] += config.edge;
    }
    let mut fx = Array1::<f64>::zeros(n + 1);
    evaluate_rows(&f, &x, &mut fx, 0)?;
    sort_simplex(&mut x, &mut fx);

    let mut iter = 0;
    let mut size = simplex_size(&x);
    while (size > config.size_tol || fx[n] - fx[0] > config.f_tol) && iter < config.max_iter {
        if iter % 10 == 0 {
            debug!(
                "iteration {}: simplex size {:.16e}, minimum gap {:.16e}",
                iter, size, fx[0]
            );
        }
        iter += 1;

        let centroid = x.slice(s![..n, ..]).sum_axis(Axis(0)) / (n as f64);
        let worst = x.row(n).to_owned();
        let x_r = &centroid + &((&centroid - &worst) * REFLECTION);
        let f_r = f(x_r.view())?;

        if fx[0] <= f_r && f_r < fx[n - 1] {
            x.row_mut(n).assign(&x_r);
            fx[n] = f_r;
        } else if f_r < fx[0] {
            let x_e = &centroid + &((&x_r - &centroid) * EXPANSION);
            let f_e = f(x_e.view())?;
            if f_e < f_r {
                x.row_mut(n).assign(&x_e);
                fx[n] = f_e;
            } else {
                x.row_mut(n).assign(&x_r);
                fx[n] = f_r;
            }
        } else {
            // contract towards the better of the reflected and the worst vertex
            let (x_w, f_w) = if f_r < fx[n] { (x_r, f_r) } else { (worst, fx[n]) };
            let x_c = &centroid + &((&x_w - &centroid) * CONTRACTION);
            let f_c = f(x_c.view())?;
            if f_c < f_w {
                x.row_mut(n).assign(&x_c);
                fx[n] = f_c;
            } else {
                let best = x.row(0).to_owned();
                for mut row in x.outer_iter_mut().skip(1) {
                    let shrunk = &best + &((&row - &best) * SHRINK);
                    row.assign(&shrunk);
                }
                evaluate_rows(&f, &x, &mut fx, 1)?;
            }
        }
        sort_simplex(&mut x, &mut fx);
        size = simplex_size(&x);
    }
    let converged = size <= config.size_tol && fx[n] - fx[0] <= config.f_tol;
    Ok(SimplexMinimum {
        x: x.row(0).to_owned(),
        value: fx[0],
        iterations: iter,
        simplex_size: size,
        converged,
    })
}

impl TightBinding {
    /// Searches a band touching point near `k0`, given in units of the reciprocal vectors.
    pub fn locate_weyl_node<S: Data<Elem = f64>>(
        &self,
        k0: &ArrayBase<S, Ix1>,
        config: &WeylConfig,
    ) -> Result<WeylNode> {
        if k0.len() != self.dim_r() {
            return Err(TbError::DimensionMismatch {
                context: "Weyl search seed".to_string(),
                expected: self.dim_r(),
                found: k0.len(),
            });
        }
        require_3d(self.dim_r())?;
        let seed = self.lattice.to_cartesian(k0)?;
        info!("minimizing the band gap from k = {}", seed);
        let found = nelder_mead(|k| self.band_gap(&k), &seed, config)?;
        if found.converged {
            info!(
                "band gap minimum {:.6e} after {} iterations",
                found.value, found.iterations
            );
        } else {
            warn!(
                "Weyl search stopped after {} iterations, gap {:.6e}, simplex size {:.6e}",
                found.iterations, found.value, found.simplex_size
            );
        }
        let k_frac = self.lattice.to_fractional(&found.x)?;
        Ok(WeylNode {
            k_cart: found.x,
            k_frac,
            gap: found.value,
            iterations: found.iterations,
            simplex_size: found.simplex_size,
            converged: found.converged,
        })
    }
}
