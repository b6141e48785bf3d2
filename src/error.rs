//! src/error.rs
//! This module defines the error type shared by the whole crate.
//! Every fallible operation returns [`Result`], so a bad k-point or a malformed
//! input table is reported to the caller instead of aborting the process.

use thiserror::Error;

/// The primary error type for all fallible operations in this library.
#[derive(Error, Debug)]
pub enum TbError {
    // --- I/O and Parsing Errors ---
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data from file '{file}': {message}")]
    FileParse { file: String, message: String },

    // --- Linear Algebra and Numerical Errors ---
    #[error("Linear algebra operation failed")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),

    // --- Invalid Input and Arguments ---
    #[error("Dimension mismatch for '{context}': expected {expected}, got {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported lattice dimension {dim}, supported dimensions are {supported:?}")]
    InvalidDimension { dim: usize, supported: Vec<usize> },

    // --- Model Consistency Errors ---
    #[error("Malformed hopping table: {0}")]
    MalformedHoppingTable(String),
}

/// A specialized `Result` type for this library's operations.
pub type Result<T> = std::result::Result<T, TbError>;

/// Fails with [`TbError::InvalidDimension`] unless `dim == 3`.
pub(crate) fn require_3d(dim: usize) -> Result<()> {
    if dim != 3 {
        return Err(TbError::InvalidDimension {
            dim,
            supported: vec![3],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_3d() {
        assert!(require_3d(3).is_ok());
        match require_3d(2) {
            Err(TbError::InvalidDimension { dim, supported }) => {
                assert_eq!(dim, 2);
                assert_eq!(supported, vec![3]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_messages() {
        let e = TbError::DimensionMismatch {
            context: "seed k-point".to_string(),
            expected: 3,
            found: 2,
        };
        assert_eq!(
            format!("{}", e),
            "Dimension mismatch for 'seed k-point': expected 3, got 2"
        );
        let e = TbError::MalformedHoppingTable("empty".to_string());
        assert!(format!("{}", e).contains("empty"));
    }
}
