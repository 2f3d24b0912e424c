//! Memory identifiers, relation matrices and identifier representations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Dense identifier of a memory inside a memory dictionary, in `[0, num_memory)`
pub type MemoryId = usize;

/// Persisted parameters: parameter name -> dense row-major matrix
pub type StateDict = BTreeMap<String, Vec<Vec<f32>>>;

/// Errors raised while normalizing identifier containers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdError {
    #[error("Unsupported id container: {0}")]
    UnsupportedRepresentation(String),

    #[error("Negative memory id: {0}")]
    Negative(i64),
}

/// Convert a working-memory identifier into a dictionary identifier
pub fn memory_id(raw: i64) -> Result<MemoryId, IdError> {
    usize::try_from(raw).map_err(|_| IdError::Negative(raw))
}

/// Errors raised while building a relation matrix
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelationError {
    #[error("Ragged relation matrix: row {row} has {got} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// Dense boolean matrix, row-major
///
/// Row `i` is the membership indicator of the identifiers that source `i`
/// connects to. Used both as the canonical `connect` target encoding and as
/// a graph adjacency matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<bool>>", into = "Vec<Vec<bool>>")]
pub struct RelationMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl RelationMatrix {
    /// All-false matrix of the given shape
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Build from nested rows; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, RelationError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(RelationError::Ragged {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Panics if out of bounds, like slice indexing
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(col < self.cols, "column {} out of bounds ({})", col, self.cols);
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(col < self.cols, "column {} out of bounds ({})", col, self.cols);
        self.cells[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[bool] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks(0) panics, and a zero-width matrix still has rows
        (0..self.rows).map(move |r| self.row(r))
    }

    /// Column indices set in a row
    pub fn row_members(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(row)
            .iter()
            .enumerate()
            .filter_map(|(j, &on)| on.then_some(j))
    }

    /// Flat row-major view
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::new(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.cells[c * self.rows + r] = self.cells[r * self.cols + c];
            }
        }
        out
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.iter_rows().map(<[bool]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<bool>>> for RelationMatrix {
    type Error = RelationError;

    fn try_from(rows: Vec<Vec<bool>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<RelationMatrix> for Vec<Vec<bool>> {
    fn from(m: RelationMatrix) -> Self {
        m.to_rows()
    }
}

/// Fixed identifier width used by a working memory set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdWidth {
    I16,
    I32,
    #[default]
    I64,
}

impl IdWidth {
    /// Cast a value into this width, wrapping like a numeric cast
    pub fn coerce(self, value: i64) -> i64 {
        match self {
            IdWidth::I16 => value as i16 as i64,
            IdWidth::I32 => value as i32 as i64,
            IdWidth::I64 => value,
        }
    }
}

impl fmt::Display for IdWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdWidth::I16 => "i16",
            IdWidth::I32 => "i32",
            IdWidth::I64 => "i64",
        };
        write!(f, "{}", name)
    }
}

/// Typed identifier array, as produced by numeric code or loaded from disk
#[derive(Debug, Clone, PartialEq)]
pub enum IdArray {
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl IdArray {
    pub fn len(&self) -> usize {
        match self {
            IdArray::I16(v) => v.len(),
            IdArray::I32(v) => v.len(),
            IdArray::I64(v) => v.len(),
            IdArray::U32(v) => v.len(),
            IdArray::U64(v) => v.len(),
            IdArray::F32(v) => v.len(),
            IdArray::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type name, for diagnostics
    pub fn element_type(&self) -> &'static str {
        match self {
            IdArray::I16(_) => "i16",
            IdArray::I32(_) => "i32",
            IdArray::I64(_) => "i64",
            IdArray::U32(_) => "u32",
            IdArray::U64(_) => "u64",
            IdArray::F32(_) => "f32",
            IdArray::F64(_) => "f64",
        }
    }

    /// Width of the elements when they match one of the identifier widths
    pub fn width(&self) -> Option<IdWidth> {
        match self {
            IdArray::I16(_) => Some(IdWidth::I16),
            IdArray::I32(_) => Some(IdWidth::I32),
            IdArray::I64(_) => Some(IdWidth::I64),
            _ => None,
        }
    }

    /// Cast every element to `width`. Floating-point arrays are not
    /// identifier containers and are rejected.
    pub fn coerce(&self, width: IdWidth) -> Result<Vec<i64>, IdError> {
        let widened: Vec<i64> = match self {
            IdArray::I16(v) => v.iter().map(|&x| x as i64).collect(),
            IdArray::I32(v) => v.iter().map(|&x| x as i64).collect(),
            IdArray::I64(v) => v.clone(),
            IdArray::U32(v) => v.iter().map(|&x| x as i64).collect(),
            IdArray::U64(v) => v.iter().map(|&x| x as i64).collect(),
            IdArray::F32(_) | IdArray::F64(_) => {
                return Err(IdError::UnsupportedRepresentation(format!(
                    "{} array",
                    self.element_type()
                )))
            }
        };
        Ok(widened.into_iter().map(|x| width.coerce(x)).collect())
    }
}

/// Any identifier container accepted by a working memory set
#[derive(Debug, Clone, PartialEq)]
pub enum IdInput {
    One(i64),
    Many(Vec<i64>),
    Array(IdArray),
}

impl IdInput {
    /// Normalize into the canonical fixed-width identifier array
    pub fn into_canonical(self, width: IdWidth) -> Result<Vec<i64>, IdError> {
        match self {
            IdInput::One(id) => Ok(vec![width.coerce(id)]),
            IdInput::Many(ids) => Ok(ids.into_iter().map(|x| width.coerce(x)).collect()),
            IdInput::Array(array) => array.coerce(width),
        }
    }
}

impl From<i64> for IdInput {
    fn from(id: i64) -> Self {
        IdInput::One(id)
    }
}

impl From<i32> for IdInput {
    fn from(id: i32) -> Self {
        IdInput::One(id as i64)
    }
}

impl From<usize> for IdInput {
    fn from(id: usize) -> Self {
        IdInput::One(id as i64)
    }
}

impl From<Vec<i64>> for IdInput {
    fn from(ids: Vec<i64>) -> Self {
        IdInput::Many(ids)
    }
}

impl From<&[i64]> for IdInput {
    fn from(ids: &[i64]) -> Self {
        IdInput::Many(ids.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for IdInput {
    fn from(ids: [i64; N]) -> Self {
        IdInput::Many(ids.to_vec())
    }
}

impl From<Vec<usize>> for IdInput {
    fn from(ids: Vec<usize>) -> Self {
        IdInput::Many(ids.into_iter().map(|x| x as i64).collect())
    }
}

impl From<std::ops::Range<i64>> for IdInput {
    fn from(ids: std::ops::Range<i64>) -> Self {
        IdInput::Many(ids.collect())
    }
}

impl From<IdArray> for IdInput {
    fn from(array: IdArray) -> Self {
        IdInput::Array(array)
    }
}
