//! Data
//!
//! The feature containers consulted while classifying. Nodes only ever see
//! an [`Instance`]: a row of attribute values addressed by attribute index.

/// A single feature vector, read by attribute index.
///
/// Numerical and categorical attributes share one cell type: a categorical
/// cell holds the dictionary code of its category as a whole number.
pub trait Instance {
    /// Value of a numerical attribute, `None` when the instance has no such attribute.
    fn numerical(&self, attr: usize) -> Option<f64>;

    /// Category code of a categorical attribute.
    ///
    /// Returns `None` when the attribute is absent, or when the cell does not
    /// hold a non-negative whole number.
    fn categorical(&self, attr: usize) -> Option<usize> {
        self.numerical(attr).and_then(category_code)
    }
}

/// Decode a cell into a category code.
#[inline]
pub fn category_code(v: f64) -> Option<usize> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= usize::MAX as f64 {
        Some(v as usize)
    } else {
        None
    }
}

impl Instance for [f64] {
    #[inline]
    fn numerical(&self, attr: usize) -> Option<f64> {
        self.get(attr).copied()
    }
}

impl Instance for Vec<f64> {
    #[inline]
    fn numerical(&self, attr: usize) -> Option<f64> {
        self.as_slice().numerical(attr)
    }
}

impl<I: Instance + ?Sized> Instance for &I {
    #[inline]
    fn numerical(&self, attr: usize) -> Option<f64> {
        (**self).numerical(attr)
    }

    #[inline]
    fn categorical(&self, attr: usize) -> Option<usize> {
        (**self).categorical(attr)
    }
}

/// Contiguous Column Major Matrix data container.
///
/// * `data` - The raw data stored in a single slice, column after column.
/// * `index` - Row indices, the order rows are predicted in.
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Indices into the data row-wise.
    pub index: Vec<usize>,
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
    stride1: usize,
    stride2: usize,
}

impl<'a, T> Matrix<'a, T> {
    // Defaults to column major
    /// Create a new Matrix.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        Matrix {
            data,
            index: (0..rows).collect(),
            rows,
            cols,
            stride1: rows,
            stride2: 1,
        }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// `None` when the position is outside the matrix, or when `data` is too
    /// short to hold it.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.rows && j < self.cols {
            self.data.get(self.item_index(i, j))
        } else {
            None
        }
    }

    fn item_index(&self, i: usize, j: usize) -> usize {
        let mut idx = self.stride2 * i;
        idx += j * self.stride1;
        idx
    }

    /// A borrowed view of one row, usable as an [`Instance`].
    pub fn row(&self, row: usize) -> Row<'_, 'a, T> {
        Row { matrix: self, row }
    }
}

/// One row of a [`Matrix`].
pub struct Row<'m, 'a, T> {
    matrix: &'m Matrix<'a, T>,
    row: usize,
}

impl<'m, 'a> Instance for Row<'m, 'a, f64> {
    #[inline]
    fn numerical(&self, attr: usize) -> Option<f64> {
        self.matrix.get(self.row, attr).copied()
    }
}
