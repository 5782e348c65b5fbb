//! Binary serialization of [`SparseMatrix`].
//!
//! Self-contained little-endian layout:
//! ```text
//! "PWFM" | version u8 | rows u64 | cols u64 | nnz u64
//! col_start (cols+1) × u64 | row_index nnz × u64 | values nnz × f64
//! ```
//! The byte layout is internal; the external contract is the round-trip
//! law `read(write(m)) == m` plus fail-fast detection of truncated or
//! corrupt streams.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{MatrixError, MatrixResult};
use crate::sparse::SparseMatrix;

const MAGIC: [u8; 4] = *b"PWFM";
const VERSION: u8 = 1;

impl SparseMatrix {
    /// Write the matrix to a binary stream.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> MatrixResult<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&[VERSION])?;
        write_u64(writer, self.rows as u64)?;
        write_u64(writer, self.cols as u64)?;
        write_u64(writer, self.nnz() as u64)?;
        for &offset in &self.col_start {
            write_u64(writer, offset as u64)?;
        }
        for &row in &self.row_index {
            write_u64(writer, row as u64)?;
        }
        for &value in &self.values {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a matrix back from a binary stream.
    pub fn read_from<R: Read>(reader: &mut R) -> MatrixResult<SparseMatrix> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(MatrixError::Corrupt(format!(
                "bad magic {:?}, expected {:?}",
                magic, MAGIC
            )));
        }
        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        if version[0] != VERSION {
            return Err(MatrixError::Corrupt(format!(
                "unsupported format version {}",
                version[0]
            )));
        }

        let rows = read_usize(reader)?;
        let cols = read_usize(reader)?;
        let nnz = read_usize(reader)?;

        let mut col_start = Vec::with_capacity(cols + 1);
        for _ in 0..=cols {
            col_start.push(read_usize(reader)?);
        }
        if col_start[0] != 0 || col_start[cols] != nnz {
            return Err(MatrixError::Corrupt(
                "column offsets do not span the stored entries".to_string(),
            ));
        }
        if col_start.windows(2).any(|w| w[0] > w[1]) {
            return Err(MatrixError::Corrupt(
                "column offsets are not monotonic".to_string(),
            ));
        }

        let mut row_index = Vec::with_capacity(nnz);
        for _ in 0..nnz {
            let row = read_usize(reader)?;
            if row >= rows {
                return Err(MatrixError::Corrupt(format!(
                    "row index {} out of range for {} rows",
                    row, rows
                )));
            }
            row_index.push(row);
        }

        let mut values = Vec::with_capacity(nnz);
        let mut buf = [0u8; 8];
        for _ in 0..nnz {
            reader.read_exact(&mut buf)?;
            values.push(f64::from_le_bytes(buf));
        }

        Ok(SparseMatrix {
            rows,
            cols,
            col_start,
            row_index,
            values,
        })
    }

    /// Write the matrix to a file, creating or truncating it.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> MatrixResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }

    /// Read a matrix from a file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> MatrixResult<SparseMatrix> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> MatrixResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_usize<R: Read>(reader: &mut R) -> MatrixResult<usize> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    usize::try_from(u64::from_le_bytes(buf))
        .map_err(|_| MatrixError::Corrupt("field exceeds addressable size".to_string()))
}
