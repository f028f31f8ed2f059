//! Merging expression compendia and filtering low-information genes

use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data::{CompendiumExpressionMap, ExpressionTable};
use crate::error::{CompendiumError, Result};
use crate::stats::{column_means, column_variances, rank_percentile};

/// Gene filters applied after stacking
///
/// The minimum-expression filter runs first, so the variance percentile is
/// computed only over genes that survived it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneFilterParams {
    /// Keep genes whose mean log2(TPM+1) is strictly greater than this
    #[serde(default)]
    pub minimum_expression: Option<f64>,
    /// Remove genes at or below this variance percentile, in [0, 100]
    #[serde(default)]
    pub variance_percentile: Option<f64>,
}

impl GeneFilterParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(p) = self.variance_percentile {
            if !p.is_finite() || !(0.0..=100.0).contains(&p) {
                return Err(CompendiumError::InvalidFilter {
                    reason: format!("variance percentile must be within [0, 100], got {}", p),
                });
            }
        }
        if let Some(v) = self.minimum_expression {
            if v.is_nan() {
                return Err(CompendiumError::InvalidFilter {
                    reason: "minimum expression must be a number".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Merge expression tables into one samples x genes table and filter genes.
///
/// Rows are stacked in map order and columns are the union of all genes in
/// order of first appearance. A gene a compendium did not report is 0.0 for
/// that compendium's samples, as is any missing cell. This pulls the mean and
/// variance of sparsely covered genes down, so the filters tend to drop them.
pub fn merge_expression(
    tables: &CompendiumExpressionMap,
    filters: &GeneFilterParams,
) -> Result<ExpressionTable> {
    if tables.is_empty() {
        return Err(CompendiumError::EmptyInput {
            reason: "no expression tables to merge".to_string(),
        });
    }
    filters.validate()?;

    let stacked = stack_tables(tables)?;
    log::info!(
        "Stacked {} compendia: {} samples, {} genes",
        tables.len(),
        stacked.n_samples(),
        stacked.n_genes()
    );

    let mut merged = stacked;
    if let Some(minimum) = filters.minimum_expression {
        merged = filter_by_minimum_expression(&merged, minimum)?;
    }
    if let Some(percentile) = filters.variance_percentile {
        merged = filter_by_variance_percentile(&merged, percentile)?;
    }
    Ok(merged)
}

/// Row-wise concatenation with union of gene columns and zero-fill
fn stack_tables(tables: &CompendiumExpressionMap) -> Result<ExpressionTable> {
    let mut gene_ids: Vec<String> = Vec::new();
    let mut gene_index: HashMap<&str, usize> = HashMap::new();
    let mut coverage: Vec<usize> = Vec::new();

    for (_, table) in tables.iter() {
        for gene in table.gene_ids() {
            match gene_index.get(gene.as_str()) {
                Some(&j) => coverage[j] += 1,
                None => {
                    gene_index.insert(gene.as_str(), gene_ids.len());
                    gene_ids.push(gene.clone());
                    coverage.push(1);
                }
            }
        }
    }

    let partial = coverage.iter().filter(|&&c| c < tables.len()).count();
    if partial > 0 {
        log::warn!(
            "Gene sets differ between compendia: {} of {} genes are missing from at least one compendium and are zero-filled",
            partial,
            gene_ids.len()
        );
    }

    let n_samples: usize = tables.iter().map(|(_, t)| t.n_samples()).sum();
    let mut values = Array2::<f64>::zeros((n_samples, gene_ids.len()));
    let mut sample_ids: Vec<String> = Vec::with_capacity(n_samples);

    let mut offset = 0;
    for (name, table) in tables.iter() {
        log::debug!(
            "Stacking '{}' ({} samples, {} genes)",
            name,
            table.n_samples(),
            table.n_genes()
        );
        let targets: Vec<usize> = table
            .gene_ids()
            .iter()
            .map(|g| gene_index[g.as_str()])
            .collect();
        let source = table.values();
        for i in 0..table.n_samples() {
            for (j, &target) in targets.iter().enumerate() {
                let v = source[[i, j]];
                values[[offset + i, target]] = if v.is_nan() { 0.0 } else { v };
            }
        }
        sample_ids.extend(table.sample_ids().iter().cloned());
        offset += table.n_samples();
    }

    ExpressionTable::new(values, sample_ids, gene_ids)
}

/// Keep genes whose mean across all samples is strictly greater than `minimum`
pub fn filter_by_minimum_expression(table: &ExpressionTable, minimum: f64) -> Result<ExpressionTable> {
    let means = column_means(table.values());
    let keep: Vec<usize> = means
        .iter()
        .enumerate()
        .filter(|(_, &m)| m > minimum)
        .map(|(j, _)| j)
        .collect();

    log::info!(
        "Minimum expression filter (> {}): removed {} of {} genes",
        minimum,
        table.n_genes() - keep.len(),
        table.n_genes()
    );
    table.subset_genes(&keep)
}

/// Remove genes whose variance is at or below the `percentile`-th percentile
///
/// With n genes the cutoff is the k-th smallest variance, k = floor(n * p / 100).
/// Genes tied with the cutoff are removed too. k = 0 keeps every gene.
pub fn filter_by_variance_percentile(table: &ExpressionTable, percentile: f64) -> Result<ExpressionTable> {
    if !percentile.is_finite() || !(0.0..=100.0).contains(&percentile) {
        return Err(CompendiumError::InvalidFilter {
            reason: format!("variance percentile must be within [0, 100], got {}", percentile),
        });
    }

    let variances = column_variances(table.values());
    let keep: Vec<usize> = match rank_percentile(&variances, percentile) {
        Some(cutoff) => variances
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > cutoff)
            .map(|(j, _)| j)
            .collect(),
        None => (0..table.n_genes()).collect(),
    };

    log::info!(
        "Variance filter ({}th percentile): removed {} of {} genes",
        percentile,
        table.n_genes() - keep.len(),
        table.n_genes()
    );
    table.subset_genes(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn table(values: Array2<f64>, samples: &[&str], genes: &[&str]) -> ExpressionTable {
        ExpressionTable::new(values, ids(samples), ids(genes)).unwrap()
    }

    fn two_compendia() -> CompendiumExpressionMap {
        let mut map = CompendiumExpressionMap::new();
        map.insert("A", table(array![[1.0, 2.0], [3.0, 4.0]], &["s1", "s2"], &["g1", "g2"]));
        map.insert("B", table(array![[5.0, 6.0]], &["s3"], &["g2", "g3"]));
        map
    }

    #[test]
    fn test_union_with_zero_fill() {
        let merged = merge_expression(&two_compendia(), &GeneFilterParams::none()).unwrap();

        assert_eq!(merged.sample_ids(), &["s1", "s2", "s3"]);
        assert_eq!(merged.gene_ids(), &["g1", "g2", "g3"]);
        assert_eq!(
            merged.values(),
            array![[1.0, 2.0, 0.0], [3.0, 4.0, 0.0], [0.0, 5.0, 6.0]]
        );
    }

    #[test]
    fn test_missing_cells_become_zero() {
        let mut map = CompendiumExpressionMap::new();
        map.insert("A", table(array![[f64::NAN, 2.0]], &["s1"], &["g1", "g2"]));
        let merged = merge_expression(&map, &GeneFilterParams::none()).unwrap();
        assert_eq!(merged.get("s1", "g1"), Some(0.0));
    }

    #[test]
    fn test_empty_map_rejected() {
        let map = CompendiumExpressionMap::new();
        let result = merge_expression(&map, &GeneFilterParams::none());
        assert!(matches!(result, Err(CompendiumError::EmptyInput { .. })));
    }

    #[test]
    fn test_invalid_percentile_rejected() {
        for p in [-1.0, 100.5, f64::NAN] {
            let filters = GeneFilterParams {
                minimum_expression: None,
                variance_percentile: Some(p),
            };
            let result = merge_expression(&two_compendia(), &filters);
            assert!(matches!(result, Err(CompendiumError::InvalidFilter { .. })));
        }
    }

    #[test]
    fn test_duplicate_samples_across_compendia_kept() {
        let mut map = CompendiumExpressionMap::new();
        map.insert("A", table(array![[1.0]], &["s1"], &["g1"]));
        map.insert("B", table(array![[2.0]], &["s1"], &["g1"]));
        let merged = merge_expression(&map, &GeneFilterParams::none()).unwrap();
        assert_eq!(merged.sample_ids(), &["s1", "s1"]);
        assert_eq!(merged.values(), array![[1.0], [2.0]]);
    }

    #[test]
    fn test_minimum_expression_is_strict() {
        // means: g1 = 2, g2 = 3, g3 = 2
        let mut map = CompendiumExpressionMap::new();
        map.insert(
            "A",
            table(array![[1.0, 2.0, 4.0], [3.0, 4.0, 0.0]], &["s1", "s2"], &["g1", "g2", "g3"]),
        );
        let filters = GeneFilterParams {
            minimum_expression: Some(2.0),
            variance_percentile: None,
        };
        let merged = merge_expression(&map, &filters).unwrap();
        assert_eq!(merged.gene_ids(), &["g2"]);
        assert_eq!(merged.n_samples(), 2);
    }

    #[test]
    fn test_minimum_expression_sweep() {
        // gene means are 1, 2, 3, 4
        let t = table(
            array![[0.0, 1.0, 2.0, 3.0], [2.0, 3.0, 4.0, 5.0]],
            &["s1", "s2"],
            &["g1", "g2", "g3", "g4"],
        );
        let means = [1.0, 2.0, 3.0, 4.0];
        for v in [0.5, 1.0, 1.5, 2.0, 3.0, 3.99, 4.0, 10.0] {
            let filtered = filter_by_minimum_expression(&t, v).unwrap();
            let expected: Vec<String> = means
                .iter()
                .zip(t.gene_ids())
                .filter(|(&m, _)| m > v)
                .map(|(_, g)| g.clone())
                .collect();
            assert_eq!(filtered.gene_ids(), expected.as_slice(), "threshold {}", v);
            assert_eq!(filtered.n_samples(), 2);
        }
    }

    #[test]
    fn test_variance_percentile_cardinality() {
        // Variances increase with the column: g0 lowest, g9 highest
        let n = 10;
        let mut values = Array2::<f64>::zeros((2, n));
        for j in 0..n {
            values[[1, j]] = (j + 1) as f64;
        }
        let genes: Vec<String> = (0..n).map(|j| format!("g{}", j)).collect();
        let t = ExpressionTable::new(values, ids(&["s1", "s2"]), genes.clone()).unwrap();

        for step in 0..=20 {
            let p = step as f64 * 5.0;
            let filtered = filter_by_variance_percentile(&t, p).unwrap();
            let k = ((n as f64) * p / 100.0).floor() as usize;
            assert_eq!(filtered.gene_ids(), &genes[k..], "percentile {}", p);
            assert_eq!(filtered.n_samples(), 2);
        }
    }

    #[test]
    fn test_variance_percentile_zero_keeps_all() {
        let merged = merge_expression(
            &two_compendia(),
            &GeneFilterParams {
                minimum_expression: None,
                variance_percentile: Some(0.0),
            },
        )
        .unwrap();
        assert_eq!(merged.n_genes(), 3);
    }

    #[test]
    fn test_variance_ties_at_cutoff_removed() {
        // g1 and g2 share the lowest variance; p = 25 over 4 genes gives k = 1
        let t = table(
            array![[0.0, 0.0, 0.0, 0.0], [1.0, 1.0, 2.0, 3.0]],
            &["s1", "s2"],
            &["g1", "g2", "g3", "g4"],
        );
        let filtered = filter_by_variance_percentile(&t, 25.0).unwrap();
        assert_eq!(filtered.gene_ids(), &["g3", "g4"]);
    }

    #[test]
    fn test_filters_compose_in_order() {
        // g_low has a low mean but a large variance.
        // Without the mean filter first, 50% of 4 genes would remove g_a and g_b.
        // With it, 50% of the 3 survivors removes only g_a.
        let t = table(
            array![
                [10.0, 10.0, 10.0, 0.0],
                [11.0, 12.0, 14.0, 0.0],
                [10.0, 10.0, 10.0, 0.0],
                [11.0, 12.0, 14.0, 4.0]
            ],
            &["s1", "s2", "s3", "s4"],
            &["g_a", "g_b", "g_c", "g_low"],
        );
        let mut map = CompendiumExpressionMap::new();
        map.insert("A", t.clone());

        let both = merge_expression(
            &map,
            &GeneFilterParams {
                minimum_expression: Some(2.0),
                variance_percentile: Some(50.0),
            },
        )
        .unwrap();
        assert_eq!(both.gene_ids(), &["g_b", "g_c"]);

        let variance_only = filter_by_variance_percentile(&t, 50.0).unwrap();
        assert_eq!(variance_only.gene_ids(), &["g_c", "g_low"]);
    }

    #[test]
    fn test_rows_preserved_under_filters() {
        let map = two_compendia();
        for filters in [
            GeneFilterParams::none(),
            GeneFilterParams { minimum_expression: Some(100.0), variance_percentile: None },
            GeneFilterParams { minimum_expression: None, variance_percentile: Some(100.0) },
            GeneFilterParams { minimum_expression: Some(1.0), variance_percentile: Some(50.0) },
        ] {
            let merged = merge_expression(&map, &filters).unwrap();
            assert_eq!(merged.n_samples(), 3);
            assert_eq!(merged.sample_ids(), &["s1", "s2", "s3"]);
        }
    }

    #[test]
    fn test_merge_is_idempotent_and_pure() {
        let map = two_compendia();
        let before = map.clone();
        let first = merge_expression(&map, &GeneFilterParams::none()).unwrap();
        let second = merge_expression(&map, &GeneFilterParams::none()).unwrap();
        assert_eq!(first, second);
        assert_eq!(map, before);
    }
}
