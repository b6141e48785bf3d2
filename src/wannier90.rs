//! Readers for the wannier90 output of a seed: `seedname.win`, `seedname_hr.dat`
//! and the optional `seedname_wsvec.dat`.
use crate::error::{Result, TbError};
use crate::{HoppingTable, KPathSegment, Lattice, TightBinding};
use log::{info, warn};
use ndarray::prelude::*;
use num_complex::Complex;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Bohr radius in angstrom, for `unit_cell_cart` blocks given in bohr.
const BOHR_ANGSTROM: f64 = 0.529177210903;

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut reads: Vec<String> = Vec::new();
    for line in reader.lines() {
        reads.push(line?);
    }
    Ok(reads)
}

fn parse_error(file: &str, message: String) -> TbError {
    TbError::FileParse {
        file: file.to_string(),
        message,
    }
}

/// Parses the next whitespace token as a `what`.
fn next_field<'a, T, I>(tokens: &mut I, file: &str, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    I: Iterator<Item = &'a str>,
{
    let token = tokens
        .next()
        .ok_or_else(|| parse_error(file, format!("missing {}", what)))?;
    token
        .parse::<T>()
        .map_err(|e| parse_error(file, format!("failed to parse {} from '{}': {}", what, token, e)))
}

/// Hopping rows of `seedname_hr.dat`, in file order.
#[allow(non_snake_case)]
pub(crate) struct HrData {
    pub num_wann: usize,
    pub hr_weights: Array1<f64>,
    pub hop_R: Array2<isize>,
    pub hop_orb: Array2<usize>,
    pub hop: Array1<Complex<f64>>,
}

#[allow(non_snake_case)]
pub(crate) fn parse_hr(lines: &[String], file: &str) -> Result<HrData> {
    //! Layout: a header line, `num_wann`, `nrpts`, the `nrpts` degeneracies over as
    //! many lines as needed, then `nrpts*num_wann^2` lines `R1 R2 R3 m n Re Im`.
    //! The orbital indices are one-based in the file and zero-based in the result.
    let mut tokens = lines.iter().skip(1).flat_map(|l| l.split_whitespace());
    let num_wann: usize = next_field(&mut tokens, file, "num_wann")?;
    let nrpts: usize = next_field(&mut tokens, file, "nrpts")?;
    if num_wann == 0 || nrpts == 0 {
        return Err(parse_error(file, format!("num_wann = {}, nrpts = {}", num_wann, nrpts)));
    }
    let mut hr_weights = Array1::<f64>::zeros(nrpts);
    for w in hr_weights.iter_mut() {
        let deg: usize = next_field(&mut tokens, file, "R degeneracy")?;
        *w = deg as f64;
    }
    let n_rows = nrpts * num_wann * num_wann;
    let mut hop_R = Array2::<isize>::zeros((n_rows, 3));
    let mut hop_orb = Array2::<usize>::zeros((n_rows, 2));
    let mut hop = Array1::<Complex<f64>>::zeros(n_rows);
    for i in 0..n_rows {
        for r in 0..3 {
            hop_R[[i, r]] = next_field(&mut tokens, file, "R vector component")?;
        }
        for c in 0..2 {
            let orb: usize = next_field(&mut tokens, file, "orbital index")?;
            if orb == 0 || orb > num_wann {
                return Err(parse_error(
                    file,
                    format!("orbital index {} outside 1..={}", orb, num_wann),
                ));
            }
            hop_orb[[i, c]] = orb - 1;
        }
        let re: f64 = next_field(&mut tokens, file, "hopping real part")?;
        let im: f64 = next_field(&mut tokens, file, "hopping imaginary part")?;
        hop[i] = Complex::new(re, im);
    }
    Ok(HrData {
        num_wann,
        hr_weights,
        hop_R,
        hop_orb,
        hop,
    })
}

/// WS shifts of `seedname_wsvec.dat`: every record is a `R1 R2 R3 i j` line, a count
/// line and `count` shift lines. Returns the shifts and the count of every record,
/// in file order.
pub(crate) fn parse_wsvec(lines: &[String], file: &str) -> Result<(Array2<isize>, Array1<usize>)> {
    let mut tokens = lines.iter().skip(1).flat_map(|l| l.split_whitespace()).peekable();
    let mut shifts: Vec<isize> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    while tokens.peek().is_some() {
        // the key `R1 R2 R3 i j` is implied by the position of the record
        for _ in 0..5 {
            let _: isize = next_field(&mut tokens, file, "WS record key")?;
        }
        let count: usize = next_field(&mut tokens, file, "WS shift count")?;
        for _ in 0..3 * count {
            shifts.push(next_field(&mut tokens, file, "WS shift component")?);
        }
        counts.push(count);
    }
    let n_shifts = shifts.len() / 3;
    let wsvec = Array2::from_shape_vec((n_shifts, 3), shifts)
        .map_err(|e| parse_error(file, format!("WS shifts: {}", e)))?;
    Ok((wsvec, Array1::from(counts)))
}

/// Lattice vectors of the `unit_cell_cart` block and the `kpoint_path` legs of a
/// `.win` file. Keywords are matched case-insensitively, lines after `!` or `#`
/// are comments.
pub(crate) fn parse_win(lines: &[String], file: &str) -> Result<Lattice> {
    let clean: Vec<String> = lines
        .iter()
        .map(|l| {
            let end = l.find(['!', '#']).unwrap_or(l.len());
            l[..end].trim().to_lowercase()
        })
        .collect();
    let raw: Vec<&str> = lines.iter().map(|l| l.trim()).collect();
    let mut lat: Option<Array2<f64>> = None;
    let mut kpath = Vec::new();
    let mut i = 0;
    while i < clean.len() {
        let line = &clean[i];
        if line.starts_with("begin") && line.contains("unit_cell_cart") {
            let mut scale = 1.0;
            let mut rows: Vec<f64> = Vec::new();
            i += 1;
            while i < clean.len() && !clean[i].starts_with("end") {
                match clean[i].as_str() {
                    "" => {}
                    "ang" => scale = 1.0,
                    "bohr" => scale = BOHR_ANGSTROM,
                    row => {
                        let mut tokens = row.split_whitespace();
                        for _ in 0..3 {
                            let x: f64 = next_field(&mut tokens, file, "lattice vector component")?;
                            rows.push(x);
                        }
                    }
                }
                i += 1;
            }
            if rows.len() != 9 {
                return Err(parse_error(
                    file,
                    format!("unit_cell_cart holds {} components instead of 9", rows.len()),
                ));
            }
            let m = Array2::from_shape_vec((3, 3), rows)
                .map_err(|e| parse_error(file, format!("unit_cell_cart: {}", e)))?;
            lat = Some(m * scale);
        } else if line.starts_with("begin") && line.contains("kpoint_path") {
            i += 1;
            while i < clean.len() && !clean[i].starts_with("end") {
                if !clean[i].is_empty() {
                    // labels keep their case
                    let mut tokens = raw[i].split_whitespace();
                    let from_label: String = next_field(&mut tokens, file, "path label")?;
                    let mut from = Array1::<f64>::zeros(3);
                    for x in from.iter_mut() {
                        *x = next_field(&mut tokens, file, "path node component")?;
                    }
                    let to_label: String = next_field(&mut tokens, file, "path label")?;
                    let mut to = Array1::<f64>::zeros(3);
                    for x in to.iter_mut() {
                        *x = next_field(&mut tokens, file, "path node component")?;
                    }
                    kpath.push(KPathSegment {
                        from_label,
                        from,
                        to_label,
                        to,
                    });
                }
                i += 1;
            }
        }
        i += 1;
    }
    let lat = lat.ok_or_else(|| parse_error(file, "no unit_cell_cart block".to_string()))?;
    Lattice::new(lat)?.with_kpath(kpath)
}

impl TightBinding {
    pub fn from_hr(path: &str, seedname: &str) -> Result<TightBinding> {
        //! Reads a wannier90 seed from the directory `path`.
        //!
        //! `seedname.win` gives the lattice (and the band path if present),
        //! `seedname_hr.dat` the hoppings, which need `write_hr = true`. For recent
        //! wannier90 versions `seedname_wsvec.dat` should be kept next to them, it
        //! restores the symmetry of the interpolation. Without it every hopping keeps
        //! its own lattice vector only.
        let dir = Path::new(path);
        let win_path = dir.join(format!("{}.win", seedname));
        let hr_path = dir.join(format!("{}_hr.dat", seedname));
        let ws_path = dir.join(format!("{}_wsvec.dat", seedname));

        let win_name = win_path.to_string_lossy().to_string();
        let lattice = parse_win(&read_lines(&win_path)?, &win_name)?;

        let hr_name = hr_path.to_string_lossy().to_string();
        let hr = parse_hr(&read_lines(&hr_path)?, &hr_name)?;
        info!(
            "read {}: {} Wannier functions, {} lattice vectors",
            hr_name,
            hr.num_wann,
            hr.hr_weights.len()
        );

        let table = if ws_path.is_file() {
            let ws_name = ws_path.to_string_lossy().to_string();
            let (wsvec, wsvec_weights) = parse_wsvec(&read_lines(&ws_path)?, &ws_name)?;
            HoppingTable::new(hr.hop_R, hr.hop_orb, hr.hop, hr.hr_weights, wsvec, wsvec_weights)?
        } else {
            warn!(
                "{} not found, interpolating without Wigner-Seitz shifts",
                ws_path.to_string_lossy()
            );
            HoppingTable::without_ws(hr.hop_R, hr.hop_orb, hr.hop, hr.hr_weights)?
        };
        if table.ham_size != hr.num_wann {
            return Err(parse_error(
                &hr_name,
                format!(
                    "num_wann is {} but the orbital columns count {}",
                    hr.num_wann, table.ham_size
                ),
            ));
        }
        TightBinding::new(lattice, table)
    }
}
