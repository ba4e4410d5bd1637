//! Serde support for matrices and vectors.
//!
//! Both matrix kinds serialize as a struct with exactly three fields, in this
//! order:
//!
//! | field    | dense                        | sparse                              |
//! |----------|------------------------------|-------------------------------------|
//! | `rows`   | row count                    | row count                           |
//! | `cols`   | column count                 | column count                        |
//! | `matrix` | one sequence of `cols` values per row | one `column -> value` map per row |
//!
//! Only materialised sparse entries are written, so absent entries stay
//! absent after a round trip. Readers check the payload against `rows` and
//! `cols` and reject mismatches. [`Vector`] serializes as a plain sequence.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NumError, Shape};
use crate::{DenseMatrix, SparseMatrix, Vector};

impl<T: Serialize> Serialize for Vector<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Vector<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Vector::from_vec)
    }
}

impl<T: Serialize> Serialize for DenseMatrix<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload: Vec<&[T]> = self.rows.iter().map(Vector::as_slice).collect();
        let mut s = serializer.serialize_struct("DenseMatrix", 3)?;
        s.serialize_field("rows", &self.nrows)?;
        s.serialize_field("cols", &self.ncols)?;
        s.serialize_field("matrix", &payload)?;
        s.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DenseMatrix<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct DenseData<T> {
            rows: usize,
            cols: usize,
            matrix: Vec<Vec<T>>,
        }

        let data = DenseData::<T>::deserialize(deserializer)?;
        if data.matrix.len() != data.rows {
            return Err(D::Error::custom(payload_mismatch(
                data.rows,
                data.cols,
                Shape::Vector(data.matrix.len()),
            )));
        }
        if let Some(row) = data.matrix.iter().find(|r| r.len() != data.cols) {
            return Err(D::Error::custom(payload_mismatch(
                data.rows,
                data.cols,
                Shape::Vector(row.len()),
            )));
        }
        Ok(DenseMatrix {
            rows: data.matrix.into_iter().map(Vector::from_vec).collect(),
            nrows: data.rows,
            ncols: data.cols,
        })
    }
}

impl<T: Serialize> Serialize for SparseMatrix<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SparseMatrix", 3)?;
        s.serialize_field("rows", &self.nrows)?;
        s.serialize_field("cols", &self.ncols)?;
        s.serialize_field("matrix", &self.rows)?;
        s.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SparseMatrix<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct SparseData<T> {
            rows: usize,
            cols: usize,
            matrix: Vec<BTreeMap<usize, T>>,
        }

        let data = SparseData::<T>::deserialize(deserializer)?;
        if data.matrix.len() != data.rows {
            return Err(D::Error::custom(payload_mismatch(
                data.rows,
                data.cols,
                Shape::Vector(data.matrix.len()),
            )));
        }
        for (i, row) in data.matrix.iter().enumerate() {
            // Keys ascend, so checking the last one covers the row.
            match row.keys().next_back() {
                Some(&j) if j >= data.cols => {
                    return Err(D::Error::custom(NumError::IndexOutOfRange {
                        index: (i, j),
                        shape: Shape::Matrix(data.rows, data.cols),
                    }));
                }
                _ => {}
            }
        }
        Ok(SparseMatrix {
            rows: data.matrix,
            nrows: data.rows,
            ncols: data.cols,
        })
    }
}

fn payload_mismatch(rows: usize, cols: usize, found: Shape) -> NumError {
    NumError::DimensionMismatch {
        op: "deserialize",
        lhs: Shape::Matrix(rows, cols),
        rhs: found,
    }
}
