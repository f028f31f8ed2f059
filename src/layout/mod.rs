//! Two-dimensional sample layouts for visualization

mod labeled;
mod pca;

use ndarray::Array2;

use crate::data::ExpressionTable;
use crate::error::{CompendiumError, Result};

pub use labeled::{LabeledLayout, UNKNOWN_LABEL};
pub use pca::PcaLayout;

/// A 2D coordinate per sample, rows aligned with `sample_ids`
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    sample_ids: Vec<String>,
    coords: Array2<f64>,
}

impl Layout {
    pub fn new(sample_ids: Vec<String>, coords: Array2<f64>) -> Result<Self> {
        if coords.ncols() != 2 {
            return Err(CompendiumError::DimensionMismatch {
                expected: "2 coordinate columns".to_string(),
                got: format!("{} coordinate columns", coords.ncols()),
            });
        }
        if coords.nrows() != sample_ids.len() {
            return Err(CompendiumError::DimensionMismatch {
                expected: format!("{} sample IDs", coords.nrows()),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }
        Ok(Self { sample_ids, coords })
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// (x, y) of one sample row
    pub fn point(&self, idx: usize) -> (f64, f64) {
        (self.coords[[idx, 0]], self.coords[[idx, 1]])
    }

    pub fn coords(&self) -> &Array2<f64> {
        &self.coords
    }
}

/// An algorithm that places every sample of an expression table in 2D
pub trait LayoutAlgorithm {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn fit_transform(&self, table: &ExpressionTable) -> Result<Layout>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_layout_requires_two_columns() {
        let result = Layout::new(vec!["s1".to_string()], array![[1.0, 2.0, 3.0]]);
        assert!(result.is_err());
        let layout = Layout::new(vec!["s1".to_string()], array![[1.0, 2.0]]).unwrap();
        assert_eq!(layout.point(0), (1.0, 2.0));
    }
}
