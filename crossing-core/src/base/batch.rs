//! Row-major batches exchanged with value functions.

/// A row-major 2-dimensional batch of `f32` values.
///
/// Each row holds either the features of one transition or the action values
/// predicted for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBatch {
    data: Vec<f32>,
    dim: usize,
}

/// Batch of action-value vectors, one row per transition.
pub type QBatch = RowBatch;

impl RowBatch {
    /// Creates an empty batch whose rows have `dim` columns.
    pub fn new(dim: usize) -> Self {
        Self { data: vec![], dim }
    }

    /// Creates a batch from flat row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` is not a multiple of `dim`.
    pub fn from_vec(data: Vec<f32>, dim: usize) -> Self {
        assert!(
            dim > 0 && data.len() % dim == 0,
            "{} values do not form rows of {}",
            data.len(),
            dim
        );
        Self { data, dim }
    }

    /// Creates a batch from rows.
    pub fn from_rows<'a, I>(dim: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut batch = Self::new(dim);
        for row in rows {
            batch.push_row(row);
        }
        batch
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: &[f32]) {
        assert_eq!(row.len(), self.dim, "row length differs from batch width");
        self.data.extend_from_slice(row);
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        match self.dim {
            0 => 0,
            dim => self.data.len() / dim,
        }
    }

    /// Returns `true` if the batch has no row.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of columns.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the `i`-th row.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Returns the `i`-th row as a mutable slice.
    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks(self.dim.max(1))
    }

    /// Flat row-major data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the batch, returning its flat data.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns a new batch made of the rows at `ixs`, in that order.
    pub fn select(&self, ixs: &[usize]) -> Self {
        Self::from_rows(self.dim, ixs.iter().map(|&ix| self.row(ix)))
    }

    /// Maximum of the `i`-th row.
    pub fn max_of_row(&self, i: usize) -> f32 {
        self.row(i)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Column index of the maximum of the `i`-th row.
    ///
    /// Ties resolve to the lowest index.
    pub fn argmax_of_row(&self, i: usize) -> usize {
        crate::util::argmax(self.row(i))
    }
}

/// Inputs of a value function for a batch of transitions.
///
/// `joint` carries the master input of the joint topology and is `None` for
/// the independent topology. Both batches have the same number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct InputBatch {
    /// Joint (master) features.
    pub joint: Option<RowBatch>,

    /// Per-vehicle (local) features.
    pub local: RowBatch,
}

impl InputBatch {
    /// The number of rows.
    pub fn len(&self) -> usize {
        self.local.len()
    }

    /// Returns `true` if the batch has no row.
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Returns a new batch made of the rows at `ixs`.
    pub fn select(&self, ixs: &[usize]) -> Self {
        Self {
            joint: self.joint.as_ref().map(|b| b.select(ixs)),
            local: self.local.select(ixs),
        }
    }
}
