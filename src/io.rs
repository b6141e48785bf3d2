//! Plain-text writers for sampled data.
use crate::error::Result;
use crate::usefloat;
use ndarray::*;
use std::fs::File;
use std::io::Write;

/// Writes `data` row by row, each value with six decimals in a sign-aligned column.
pub fn write_txt<T: usefloat>(data: &Array2<T>, output: &str) -> Result<()> {
    let mut file = File::create(output)?;
    let n = data.len_of(Axis(0));
    let s = data.len_of(Axis(1));
    let mut s0 = String::new();
    for i in 0..n {
        for j in 0..s {
            if data[[i, j]] >= T::from(0.0) {
                s0.push_str("     ");
            } else {
                s0.push_str("    ");
            }
            let aa = format!("{:.6}", data[[i, j]]);
            s0.push_str(&aa);
        }
        s0.push('\n');
    }
    write!(file, "{}", s0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_txt() {
        let path = std::env::temp_dir().join("wannier_weyl_write_txt.dat");
        let path = path.to_string_lossy().to_string();
        let data = array![[0.0, -1.5], [2.25, 3.0]];
        write_txt(&data, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "     0.000000    -1.500000");
        assert_eq!(lines[1], "     2.250000     3.000000");
        std::fs::remove_file(&path).unwrap();
    }
}
