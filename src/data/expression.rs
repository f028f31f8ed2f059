//! Expression table representation for log2(TPM+1) data

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{CompendiumError, Result};

/// An expression matrix with samples as rows and genes as columns
///
/// Values follow the log2(TPM+1) convention. A NaN cell means the value was
/// not reported; merging collapses those cells to 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTable {
    /// Expression values (samples x genes)
    values: Array2<f64>,
    /// Sample identifiers (row index)
    sample_ids: Vec<String>,
    /// Gene identifiers (column index)
    gene_ids: Vec<String>,
}

impl ExpressionTable {
    /// Create a new expression table from a samples x genes matrix
    pub fn new(values: Array2<f64>, sample_ids: Vec<String>, gene_ids: Vec<String>) -> Result<Self> {
        let (n_samples, n_genes) = values.dim();

        if sample_ids.len() != n_samples {
            return Err(CompendiumError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        if gene_ids.len() != n_genes {
            return Err(CompendiumError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }

        if values.iter().any(|x| x.is_infinite()) {
            return Err(CompendiumError::InvalidExpressionTable {
                reason: "Expression values must be finite or missing".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(gene_ids.len());
        for gene in &gene_ids {
            if !seen.insert(gene.as_str()) {
                return Err(CompendiumError::InvalidExpressionTable {
                    reason: format!("Duplicate gene '{}'", gene),
                });
            }
        }

        let mut seen = HashSet::with_capacity(sample_ids.len());
        for id in &sample_ids {
            if !seen.insert(id.as_str()) {
                log::warn!("Duplicate sample ID detected: '{}'. Sample IDs should be unique.", id);
            }
        }

        Ok(Self {
            values,
            sample_ids,
            gene_ids,
        })
    }

    /// Build a table from a genes x samples matrix, the orientation used on disk
    pub fn from_gene_rows(
        values: Array2<f64>,
        gene_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        Self::new(values.reversed_axes().as_standard_layout().to_owned(), sample_ids, gene_ids)
    }

    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_genes(&self) -> usize {
        self.values.ncols()
    }

    /// Get the expression values as a view (samples x genes)
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Values of one gene across all samples
    pub fn gene_values(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(gene_idx)
    }

    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    /// First row carrying this sample ID
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Value at (sample, gene), looked up by name
    pub fn get(&self, sample_id: &str, gene_id: &str) -> Option<f64> {
        let row = self.sample_index(sample_id)?;
        let col = self.gene_index(gene_id)?;
        Some(self.values[[row, col]])
    }

    /// Subset to specific genes, keeping every sample row
    pub fn subset_genes(&self, gene_indices: &[usize]) -> Result<Self> {
        let new_values = self.values.select(Axis(1), gene_indices);
        let new_gene_ids: Vec<String> = gene_indices
            .iter()
            .map(|&i| self.gene_ids[i].clone())
            .collect();

        Ok(Self {
            values: new_values,
            sample_ids: self.sample_ids.clone(),
            gene_ids: new_gene_ids,
        })
    }
}
