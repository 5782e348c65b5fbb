//! MATLAB Level-4 `.mat` export/import for [`SparseMatrix`].
//!
//! A Level-4 sparse array is a `(nnz + 1) × 3` double matrix stored
//! column-major after a 20-byte header:
//! ```text
//! MOPT i32 | mrows i32 | ncols i32 | imagf i32 | namlen i32 | name bytes
//! column 1: 1-based row indices,    last entry = rows
//! column 2: 1-based column indices, last entry = cols
//! column 3: values,                 last entry = 0.0
//! ```
//! `MOPT = 2` encodes little-endian (`M=0`), double precision (`P=0`),
//! sparse (`T=2`). Files in this layout load in standard MATLAB-format
//! readers.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{MatrixError, MatrixResult};
use crate::sparse::SparseMatrix;

const MOPT_SPARSE_LE_DOUBLE: i32 = 2;
const ARRAY_NAME: &[u8] = b"m\0";

/// Export a matrix to a MATLAB Level-4 sparse `.mat` file.
pub fn export_mat<P: AsRef<Path>>(matrix: &SparseMatrix, path: P) -> MatrixResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mrows = matrix.nnz() as i32 + 1;

    write_i32(&mut writer, MOPT_SPARSE_LE_DOUBLE)?;
    write_i32(&mut writer, mrows)?;
    write_i32(&mut writer, 3)?;
    write_i32(&mut writer, 0)?; // imagf: real only
    write_i32(&mut writer, ARRAY_NAME.len() as i32)?;
    writer.write_all(ARRAY_NAME)?;

    // Column-major body; the trailing row carries the true dimensions.
    for (row, _, _) in matrix.entries() {
        write_f64(&mut writer, (row + 1) as f64)?;
    }
    write_f64(&mut writer, matrix.rows() as f64)?;
    for (_, col, _) in matrix.entries() {
        write_f64(&mut writer, (col + 1) as f64)?;
    }
    write_f64(&mut writer, matrix.cols() as f64)?;
    for (_, _, value) in matrix.entries() {
        write_f64(&mut writer, value)?;
    }
    write_f64(&mut writer, 0.0)?;

    writer.flush()?;
    Ok(())
}

/// Import a matrix from a MATLAB Level-4 sparse `.mat` file.
pub fn import_mat<P: AsRef<Path>>(path: P) -> MatrixResult<SparseMatrix> {
    let mut reader = BufReader::new(File::open(path)?);

    let mopt = read_i32(&mut reader)?;
    if mopt != MOPT_SPARSE_LE_DOUBLE {
        return Err(MatrixError::Corrupt(format!(
            "unsupported MOPT type {}, expected little-endian sparse double ({})",
            mopt, MOPT_SPARSE_LE_DOUBLE
        )));
    }
    let mrows = read_i32(&mut reader)?;
    let ncols = read_i32(&mut reader)?;
    let imagf = read_i32(&mut reader)?;
    let namlen = read_i32(&mut reader)?;

    if mrows < 1 || ncols != 3 {
        return Err(MatrixError::Corrupt(format!(
            "sparse array body must be (nnz+1)x3, got {}x{}",
            mrows, ncols
        )));
    }
    if imagf != 0 {
        return Err(MatrixError::Corrupt(
            "complex sparse arrays are not supported".to_string(),
        ));
    }
    if !(1..=64).contains(&namlen) {
        return Err(MatrixError::Corrupt(format!(
            "implausible array name length {}",
            namlen
        )));
    }
    let mut name = vec![0u8; namlen as usize];
    reader.read_exact(&mut name)?;

    let nnz = (mrows - 1) as usize;
    let row_col = read_f64_column(&mut reader, mrows as usize)?;
    let col_col = read_f64_column(&mut reader, mrows as usize)?;
    let val_col = read_f64_column(&mut reader, mrows as usize)?;

    let rows = dimension_from(row_col[nnz], "row count")?;
    let cols = dimension_from(col_col[nnz], "column count")?;

    let mut triplets = Vec::with_capacity(nnz);
    for k in 0..nnz {
        let row = coordinate_from(row_col[k], rows, "row")?;
        let col = coordinate_from(col_col[k], cols, "column")?;
        triplets.push((row, col, val_col[k]));
    }
    Ok(SparseMatrix::from_triplets(rows, cols, &triplets))
}

fn dimension_from(value: f64, what: &str) -> MatrixResult<usize> {
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(MatrixError::Corrupt(format!("invalid {} {}", what, value)));
    }
    Ok(value as usize)
}

/// Level-4 indices are 1-based doubles; reject anything non-integral or
/// outside the declared dimensions.
fn coordinate_from(value: f64, limit: usize, what: &str) -> MatrixResult<usize> {
    if value < 1.0 || value.fract() != 0.0 || value > limit as f64 {
        return Err(MatrixError::Corrupt(format!(
            "{} index {} outside 1..={}",
            what, value, limit
        )));
    }
    Ok(value as usize - 1)
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> MatrixResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f64<W: Write>(writer: &mut W, value: f64) -> MatrixResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(reader: &mut R) -> MatrixResult<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f64_column<R: Read>(reader: &mut R, len: usize) -> MatrixResult<Vec<f64>> {
    let mut column = Vec::with_capacity(len);
    let mut buf = [0u8; 8];
    for _ in 0..len {
        reader.read_exact(&mut buf)?;
        column.push(f64::from_le_bytes(buf));
    }
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> SparseMatrix {
        let mut m = SparseMatrix::new(5, 4, 6);
        m.set(0, 0, 1.0);
        m.set(4, 0, -2.5);
        m.set(1, 2, 0.125);
        m.add(3, 3, 7.0);
        m
    }

    #[test]
    fn mat_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jacobian.mat");
        let m = sample_matrix();
        export_mat(&m, &path).unwrap();
        let restored = import_mat(&path).unwrap();
        assert_eq!(restored, m);
    }

    #[test]
    fn mat_round_trip_empty_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mat");
        let m = SparseMatrix::new(3, 7, 0);
        export_mat(&m, &path).unwrap();
        let restored = import_mat(&path).unwrap();
        assert_eq!(restored, m);
    }

    #[test]
    fn exported_header_declares_sparse_double() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("header.mat");
        let m = sample_matrix();
        export_mat(&m, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mopt = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let mrows = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let ncols = i32::from_le_bytes(bytes[8..12].try_into().unwrap());
        assert_eq!(mopt, MOPT_SPARSE_LE_DOUBLE);
        assert_eq!(mrows, m.nnz() as i32 + 1);
        assert_eq!(ncols, 3);
    }

    #[test]
    fn import_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_mat(dir.path().join("absent.mat")).unwrap_err();
        assert!(matches!(err, MatrixError::Io(_)), "got {err:?}");
    }

    #[test]
    fn export_to_directory_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_mat(&sample_matrix(), dir.path()).unwrap_err();
        assert!(matches!(err, MatrixError::Io(_)), "got {err:?}");
    }

    #[test]
    fn import_rejects_dense_type_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dense.mat");
        export_mat(&sample_matrix(), &path).unwrap();
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[0] = 0; // MOPT T digit: full numeric matrix
        std::fs::write(&path, bytes).unwrap();
        let err = import_mat(&path).unwrap_err();
        assert!(matches!(err, MatrixError::Corrupt(_)), "got {err:?}");
    }

    #[test]
    fn import_truncated_body_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.mat");
        export_mat(&sample_matrix(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 9]).unwrap();
        let err = import_mat(&path).unwrap_err();
        assert!(matches!(err, MatrixError::Io(_)), "got {err:?}");
    }
}
