//! Real-space hopping data in the layout produced by wannier90.
//!
//! The hopping rows come in blocks of `ham_size`$^2$ rows, one block per lattice
//! vector $\bm R$. Inside a block the first orbital column runs fastest, exactly as
//! in `seedname_hr.dat`. The Wigner-Seitz groups of `seedname_wsvec.dat` are stored
//! with the other orbital running fastest, so the amplitude that belongs to the
//! `i`-th WS group sits in row [`block_index_remap`]`(i, ..)` of the hopping table.
use crate::error::{Result, TbError};
use ndarray::prelude::*;
use num_complex::Complex;

/// Maps a row index of the WS-group ordering to the row of the hopping table that
/// holds the same orbital pair, i.e. swaps the two orbital indices inside a block.
///
/// `block_size` must be `ham_size * ham_size`.
#[inline(always)]
pub fn block_index_remap(i: usize, ham_size: usize, block_size: usize) -> usize {
    let site = i / block_size;
    let ind = i % block_size;
    let a = ind / ham_size;
    let b = ind % ham_size;
    ham_size * b + a + site * block_size
}

/// Immutable view of the hopping records, the $\bm R$ weights and the WS shifts.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct HoppingTable {
    /// The real space dimension.
    pub dim_r: usize,
    /// The number of orbitals, fixed at construction.
    pub ham_size: usize,
    /// The lattice vector of every hopping row, n_rows$\times$dim_r.
    pub hop_R: Array2<isize>,
    /// Zero-based orbital columns of every row, `[first, second]` as in `seedname_hr.dat`.
    pub hop_orb: Array2<usize>,
    /// The hopping amplitude of every row.
    pub hop: Array1<Complex<f64>>,
    /// Degeneracy of every $\bm R$ block.
    pub hr_weights: Array1<f64>,
    /// All WS shift vectors, grouped per row in row order.
    pub wsvec: Array2<isize>,
    /// Size of the WS group of every row.
    pub wsvec_weights: Array1<usize>,
    ws_offset: Vec<usize>,
}

#[allow(non_snake_case)]
impl HoppingTable {
    pub fn new(
        hop_R: Array2<isize>,
        hop_orb: Array2<usize>,
        hop: Array1<Complex<f64>>,
        hr_weights: Array1<f64>,
        wsvec: Array2<isize>,
        wsvec_weights: Array1<usize>,
    ) -> Result<HoppingTable> {
        let n_rows = hop.len();
        if n_rows == 0 {
            return Err(TbError::MalformedHoppingTable("the table has no rows".to_string()));
        }
        let dim_r = hop_R.ncols();
        if hop_R.nrows() != n_rows || hop_orb.nrows() != n_rows || hop_orb.ncols() != 2 {
            return Err(TbError::MalformedHoppingTable(format!(
                "{} amplitudes but R has shape {:?} and orbital columns have shape {:?}",
                n_rows,
                hop_R.shape(),
                hop_orb.shape()
            )));
        }
        let ham_size = derive_ham_size(&hop_orb);
        let block_size = ham_size * ham_size;
        if n_rows % block_size != 0 {
            return Err(TbError::MalformedHoppingTable(format!(
                "{} rows is not a multiple of ham_size^2 = {}",
                n_rows, block_size
            )));
        }
        if let Some(bad) = hop_orb.iter().find(|&&o| o >= ham_size) {
            return Err(TbError::MalformedHoppingTable(format!(
                "orbital index {} out of range for ham_size {}",
                bad + 1,
                ham_size
            )));
        }
        let n_blocks = n_rows / block_size;
        if hr_weights.len() != n_blocks {
            return Err(TbError::MalformedHoppingTable(format!(
                "{} R weights for {} R blocks",
                hr_weights.len(),
                n_blocks
            )));
        }
        if hr_weights.iter().any(|&w| w == 0.0) {
            return Err(TbError::MalformedHoppingTable("zero R weight".to_string()));
        }
        if wsvec_weights.len() != n_rows {
            return Err(TbError::MalformedHoppingTable(format!(
                "{} WS weights for {} rows",
                wsvec_weights.len(),
                n_rows
            )));
        }
        if wsvec_weights.iter().any(|&w| w == 0) {
            return Err(TbError::MalformedHoppingTable("zero WS weight".to_string()));
        }
        let mut ws_offset = Vec::with_capacity(n_rows + 1);
        let mut acc = 0;
        ws_offset.push(acc);
        for w in wsvec_weights.iter() {
            acc += w;
            ws_offset.push(acc);
        }
        if acc != wsvec.nrows() || wsvec.ncols() != dim_r {
            return Err(TbError::MalformedHoppingTable(format!(
                "WS weights sum to {} but {} shift vectors of length {} are given",
                acc,
                wsvec.nrows(),
                wsvec.ncols()
            )));
        }
        Ok(HoppingTable {
            dim_r,
            ham_size,
            hop_R,
            hop_orb,
            hop,
            hr_weights,
            wsvec,
            wsvec_weights,
            ws_offset,
        })
    }

    /// Builds a table whose every row has the single shift $\bm 0$ with weight 1,
    /// for seeds without `seedname_wsvec.dat`.
    pub fn without_ws(
        hop_R: Array2<isize>,
        hop_orb: Array2<usize>,
        hop: Array1<Complex<f64>>,
        hr_weights: Array1<f64>,
    ) -> Result<HoppingTable> {
        let n_rows = hop.len();
        let dim_r = hop_R.ncols();
        let wsvec = Array2::<isize>::zeros((n_rows, dim_r));
        let wsvec_weights = Array1::<usize>::ones(n_rows);
        HoppingTable::new(hop_R, hop_orb, hop, hr_weights, wsvec, wsvec_weights)
    }

    #[inline(always)]
    pub fn n_rows(&self) -> usize {
        self.hop.len()
    }

    /// Number of lattice vectors, one block of `ham_size`$^2$ rows each.
    #[inline(always)]
    pub fn n_blocks(&self) -> usize {
        self.hr_weights.len()
    }

    #[inline(always)]
    pub fn block_size(&self) -> usize {
        self.ham_size * self.ham_size
    }

    /// The WS shift vectors of row `i`.
    #[inline(always)]
    pub fn ws_group(&self, i: usize) -> ArrayView2<'_, isize> {
        self.wsvec.slice(s![self.ws_offset[i]..self.ws_offset[i + 1], ..])
    }
}

/// The orbital count is the last value of the leading increasing run of the first
/// orbital column, which inside the first block counts 1, 2, ..., ham_size.
fn derive_ham_size(hop_orb: &Array2<usize>) -> usize {
    let column = hop_orb.column(0);
    let mut prev = column[0];
    for &curr in column.iter().skip(1) {
        if curr <= prev {
            break;
        }
        prev = curr;
    }
    prev + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// One R block of a 2-orbital model in wannier90 row order.
    fn one_block() -> (Array2<isize>, Array2<usize>, Array1<Complex<f64>>) {
        let hop_R = Array2::<isize>::zeros((4, 3));
        let hop_orb = array![[0, 0], [1, 0], [0, 1], [1, 1]];
        let hop = array![
            Complex::new(1.0, 0.0),
            Complex::new(0.5, -0.5),
            Complex::new(0.5, 0.5),
            Complex::new(-1.0, 0.0)
        ];
        (hop_R, hop_orb, hop)
    }

    #[test]
    fn test_remap_is_bijection_within_block() {
        let ham_size = 2;
        let block = ham_size * ham_size;
        let mut seen = vec![false; block];
        for i in 0..block {
            let nind = block_index_remap(i, ham_size, block);
            assert!(nind < block);
            assert!(!seen[nind], "collision at {}", nind);
            seen[nind] = true;
        }
        assert!(seen.iter().all(|&x| x));
        assert_eq!(block_index_remap(1, 2, 4), 2);
        assert_eq!(block_index_remap(2, 2, 4), 1);
    }

    #[test]
    fn test_remap_is_involution_and_keeps_block() {
        for ham_size in 1..5 {
            let block = ham_size * ham_size;
            for i in 0..3 * block {
                let nind = block_index_remap(i, ham_size, block);
                assert_eq!(nind / block, i / block);
                assert_eq!(block_index_remap(nind, ham_size, block), i);
            }
        }
    }

    #[test]
    fn test_ham_size_derivation() {
        let (hop_R, hop_orb, hop) = one_block();
        let table = HoppingTable::without_ws(hop_R, hop_orb, hop, array![1.0]).unwrap();
        assert_eq!(table.ham_size, 2);
        assert_eq!(table.n_blocks(), 1);
        assert_eq!(table.ws_group(3).shape(), &[1, 3]);

        let single = HoppingTable::without_ws(
            Array2::zeros((3, 1)),
            Array2::zeros((3, 2)),
            Array1::from_elem(3, Complex::new(0.1, 0.0)),
            array![1.0, 1.0, 1.0],
        )
        .unwrap();
        assert_eq!(single.ham_size, 1);
        assert_eq!(single.n_blocks(), 3);
    }

    #[test]
    fn test_ws_groups_follow_weights() {
        let (hop_R, hop_orb, hop) = one_block();
        let wsvec = array![[0, 0, 0], [0, 0, 0], [1, 0, 0], [0, 0, 0], [0, 0, 0]];
        let table = HoppingTable::new(
            hop_R,
            hop_orb,
            hop,
            array![1.0],
            wsvec,
            array![1, 2, 1, 1],
        )
        .unwrap();
        assert_eq!(table.ws_group(1), array![[0, 0, 0], [1, 0, 0]]);
        assert_eq!(table.ws_group(2), array![[0, 0, 0]]);
    }

    #[test]
    fn test_malformed_tables_rejected() {
        let (hop_R, hop_orb, hop) = one_block();
        // wrong number of R weights
        assert!(matches!(
            HoppingTable::without_ws(hop_R.clone(), hop_orb.clone(), hop.clone(), array![1.0, 1.0]),
            Err(TbError::MalformedHoppingTable(_))
        ));
        // WS weights do not match the shift rows
        assert!(matches!(
            HoppingTable::new(
                hop_R.clone(),
                hop_orb.clone(),
                hop.clone(),
                array![1.0],
                Array2::zeros((3, 3)),
                array![1, 1, 1, 1]
            ),
            Err(TbError::MalformedHoppingTable(_))
        ));
        // row count not a multiple of ham_size^2
        assert!(HoppingTable::without_ws(
            hop_R.slice(s![..3, ..]).to_owned(),
            hop_orb.slice(s![..3, ..]).to_owned(),
            hop.slice(s![..3]).to_owned(),
            array![1.0]
        )
        .is_err());
        assert!(HoppingTable::without_ws(
            Array2::zeros((0, 3)),
            Array2::zeros((0, 2)),
            Array1::zeros(0),
            Array1::zeros(0)
        )
        .is_err());
    }
}
