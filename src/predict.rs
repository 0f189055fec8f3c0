use crate::data::Matrix;
use crate::node::{Node, TreeNode};
use rayon::prelude::*;

impl Node {
    /// Classify every row of `data`, in the order of `data.index`.
    ///
    /// * `parallel` - Spread the rows over the rayon thread pool.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<Option<usize>> {
        if parallel {
            self.predict_parallel(data)
        } else {
            self.predict_single_threaded(data)
        }
    }

    fn predict_single_threaded(&self, data: &Matrix<f64>) -> Vec<Option<usize>> {
        data.index.iter().map(|i| self.classify(&data.row(*i))).collect()
    }

    fn predict_parallel(&self, data: &Matrix<f64>) -> Vec<Option<usize>> {
        data.index.par_iter().map(|i| self.classify(&data.row(*i))).collect()
    }
}
