//! Principal component layout
//!
//! Projects samples onto the first two principal components of the expression
//! matrix using the randomized SVD of `efficient_pca`. The model centers and
//! scales every gene to unit variance before decomposing. Genes with zero
//! variance are dropped first; if none remain every sample sits at the origin.

use efficient_pca::PCA;
use ndarray::{Array2, Axis};

use super::{Layout, LayoutAlgorithm};
use crate::data::ExpressionTable;
use crate::error::{CompendiumError, Result};
use crate::stats::column_variances;

const N_COMPONENTS: usize = 2;

/// PCA layout parameters
#[derive(Debug, Clone)]
pub struct PcaLayout {
    /// Extra random projections used by the randomized SVD
    pub n_oversamples: usize,
    /// Seed for the random projections; `None` draws a fresh one per run
    pub seed: Option<u64>,
}

impl Default for PcaLayout {
    fn default() -> Self {
        Self {
            n_oversamples: 10,
            seed: Some(42),
        }
    }
}

impl PcaLayout {
    /// Column indices of genes that vary across samples
    fn informative_genes(table: &ExpressionTable) -> Vec<usize> {
        column_variances(table.values())
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > 0.0)
            .map(|(j, _)| j)
            .collect()
    }

    /// Fit the model and return the sample scores (samples × kept components)
    fn scores(&self, x: Array2<f64>) -> Result<Array2<f64>> {
        let k = N_COMPONENTS.min(x.nrows()).min(x.ncols());
        let data_for_transform = x.clone();

        log::debug!(
            "Running efficient_pca rfit: k={}, n_oversamples={}, seed={:?}",
            k,
            self.n_oversamples,
            self.seed
        );

        let mut model = PCA::new();
        model
            .rfit(x, k, self.n_oversamples, self.seed, None)
            .map_err(|e| CompendiumError::Layout {
                reason: format!("PCA fit failed: {}", e),
            })?;

        model
            .transform(data_for_transform)
            .map_err(|e| CompendiumError::Layout {
                reason: format!("PCA transform failed: {}", e),
            })
    }
}

/// Flip each column so its largest-magnitude score is positive
fn orient_columns(coords: &mut Array2<f64>) {
    for mut col in coords.axis_iter_mut(Axis(1)) {
        let pivot = col
            .iter()
            .copied()
            .fold(0.0_f64, |acc, s| if s.abs() > acc.abs() { s } else { acc });
        if pivot < 0.0 {
            col.mapv_inplace(|s| -s);
        }
    }
}

impl LayoutAlgorithm for PcaLayout {
    fn name(&self) -> &str {
        "pca"
    }

    fn fit_transform(&self, table: &ExpressionTable) -> Result<Layout> {
        if table.n_samples() < 2 {
            return Err(CompendiumError::Layout {
                reason: format!("need at least 2 samples, got {}", table.n_samples()),
            });
        }
        if table.n_genes() == 0 {
            return Err(CompendiumError::Layout {
                reason: "expression table has no genes".to_string(),
            });
        }

        let mut coords = Array2::<f64>::zeros((table.n_samples(), N_COMPONENTS));

        let informative = Self::informative_genes(table);
        if informative.len() < table.n_genes() {
            log::debug!(
                "Dropping {} zero-variance genes before PCA",
                table.n_genes() - informative.len()
            );
        }

        if informative.is_empty() {
            log::warn!("Every gene is constant; all samples placed at the origin");
        } else {
            let x = table.values().select(Axis(1), &informative);
            let scores = self.scores(x)?;
            let kept = scores.ncols().min(N_COMPONENTS);
            if kept < N_COMPONENTS {
                log::info!("PCA kept {} component(s); remaining axes set to 0", kept);
            }
            for k in 0..kept {
                coords.column_mut(k).assign(&scores.column(k));
            }
            orient_columns(&mut coords);
        }

        log::info!(
            "{} layout: {} samples projected from {} genes",
            self.name(),
            table.n_samples(),
            informative.len()
        );
        Layout::new(table.sample_ids().to_vec(), coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table(values: Array2<f64>) -> ExpressionTable {
        let samples = (0..values.nrows()).map(|i| format!("s{}", i)).collect();
        let genes = (0..values.ncols()).map(|j| format!("g{}", j)).collect();
        ExpressionTable::new(values, samples, genes).unwrap()
    }

    #[test]
    fn test_separates_groups_on_first_axis() {
        let t = table(array![
            [0.0, 0.0, 1.0],
            [0.1, 0.0, 1.1],
            [5.0, 5.0, 1.0],
            [5.1, 5.0, 0.9],
        ]);
        let layout = PcaLayout::default().fit_transform(&t).unwrap();
        assert_eq!(layout.n_samples(), 4);

        let (x0, _) = layout.point(0);
        let (x1, _) = layout.point(1);
        let (x2, _) = layout.point(2);
        let (x3, _) = layout.point(3);
        assert!((x0 - x1).abs() < (x0 - x2).abs());
        assert!((x2 - x3).abs() < (x1 - x3).abs());
        assert!(x0.signum() != x2.signum());
    }

    #[test]
    fn test_components_are_uncorrelated() {
        // g0, g1 and g3 move together, g2 does not
        let t = table(array![
            [1.0, 2.0, 0.5, 3.0],
            [2.0, 4.0, 0.0, 6.1],
            [3.0, 6.0, 1.5, 9.0],
            [0.0, 0.2, 2.0, 0.1],
            [4.0, 8.0, 1.0, 12.0],
        ]);
        let layout = PcaLayout::default().fit_transform(&t).unwrap();
        let pc1 = layout.coords().column(0);
        let pc2 = layout.coords().column(1);
        let scale = (pc1.dot(&pc1) * pc2.dot(&pc2)).sqrt();
        assert!(pc1.dot(&pc2).abs() <= 1e-6 * scale + 1e-9);
        assert!(pc1.dot(&pc1) >= pc2.dot(&pc2) - 1e-9);
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let t = table(array![[1.0, 0.0], [0.0, 1.0], [2.0, 2.0]]);
        let a = PcaLayout::default().fit_transform(&t).unwrap();
        let b = PcaLayout::default().fit_transform(&t).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_table_maps_to_origin() {
        let t = table(array![[1.0, 1.0], [1.0, 1.0]]);
        let layout = PcaLayout::default().fit_transform(&t).unwrap();
        assert_eq!(layout.point(0), (0.0, 0.0));
        assert_eq!(layout.point(1), (0.0, 0.0));
    }

    #[test]
    fn test_constant_genes_do_not_move_samples() {
        let varying = table(array![[0.0, 7.0], [1.0, 7.0], [3.0, 7.0]]);
        let layout = PcaLayout::default().fit_transform(&varying).unwrap();
        // a single informative gene leaves the second axis empty
        for i in 0..3 {
            assert_eq!(layout.point(i).1, 0.0);
        }
        assert!(layout.point(0).0 < layout.point(1).0);
        assert!(layout.point(1).0 < layout.point(2).0);
    }

    #[test]
    fn test_too_few_samples() {
        let t = table(array![[1.0, 2.0]]);
        assert!(matches!(
            PcaLayout::default().fit_transform(&t),
            Err(CompendiumError::Layout { .. })
        ));
    }
}
