//! Layout coordinates joined with a clinical label column

use std::collections::HashMap;

use super::Layout;
use crate::data::ClinicalTable;
use crate::error::{CompendiumError, Result};

/// Label for samples without a clinical value
pub const UNKNOWN_LABEL: &str = "unknown";

/// One labeled point per laid-out sample
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledLayout {
    pub sample_ids: Vec<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub labels: Vec<String>,
}

impl LabeledLayout {
    /// Join a layout with one clinical attribute on sample ID.
    ///
    /// Samples with no clinical row, or a missing value, get `unknown`.
    /// Clinical rows with no coordinates cannot be drawn and are left out.
    /// When a sample ID repeats in the clinical table the first row wins.
    pub fn join(layout: &Layout, clinical: &ClinicalTable, label_column: &str) -> Result<Self> {
        let labels_column = clinical
            .attribute(label_column)
            .ok_or_else(|| CompendiumError::InvalidInput {
                reason: format!("clinical table has no '{}' column", label_column),
            })?;

        let mut first_row: HashMap<&str, usize> = HashMap::new();
        for (i, id) in clinical.sample_ids().iter().enumerate() {
            first_row.entry(id.as_str()).or_insert(i);
        }

        let n = layout.n_samples();
        let mut joined = Self {
            sample_ids: Vec::with_capacity(n),
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            labels: Vec::with_capacity(n),
        };
        let mut unmatched = 0;
        for (i, id) in layout.sample_ids().iter().enumerate() {
            let label = first_row
                .get(id.as_str())
                .and_then(|&row| labels_column[row].as_ref())
                .map(|v| v.to_string());
            if !first_row.contains_key(id.as_str()) {
                unmatched += 1;
            }
            let (x, y) = layout.point(i);
            joined.sample_ids.push(id.clone());
            joined.x.push(x);
            joined.y.push(y);
            joined.labels.push(label.unwrap_or_else(|| UNKNOWN_LABEL.to_string()));
        }

        let laid_out: std::collections::HashSet<&str> =
            layout.sample_ids().iter().map(|s| s.as_str()).collect();
        let without_coords = first_row.keys().filter(|id| !laid_out.contains(*id)).count();
        if unmatched > 0 {
            log::warn!("{} samples have no clinical row and are labeled '{}'", unmatched, UNKNOWN_LABEL);
        }
        if without_coords > 0 {
            log::debug!("{} clinical samples have no layout coordinates", without_coords);
        }
        Ok(joined)
    }

    pub fn len(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_ids.is_empty()
    }

    /// Lowercase every label in place
    pub fn lowercase_labels(&mut self) {
        for label in self.labels.iter_mut() {
            *label = label.to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClinicalValue;
    use ndarray::array;

    #[test]
    fn test_join_on_sample_id() {
        let layout = Layout::new(
            vec!["s1".to_string(), "s2".to_string(), "s9".to_string()],
            array![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]],
        )
        .unwrap();
        let mut clinical = ClinicalTable::new(vec!["s2".to_string(), "s1".to_string(), "s7".to_string()]);
        clinical
            .set_attribute(
                "disease",
                vec![
                    Some(ClinicalValue::Text("Glioma".to_string())),
                    None,
                    Some(ClinicalValue::Text("Sarcoma".to_string())),
                ],
            )
            .unwrap();

        let joined = LabeledLayout::join(&layout, &clinical, "disease").unwrap();
        assert_eq!(joined.sample_ids, vec!["s1", "s2", "s9"]);
        assert_eq!(joined.labels, vec!["unknown", "Glioma", "unknown"]);
        assert_eq!(joined.x, vec![0.0, 2.0, 4.0]);
        assert_eq!(joined.y, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_join_requires_label_column() {
        let layout = Layout::new(vec!["s1".to_string()], array![[0.0, 1.0]]).unwrap();
        let clinical = ClinicalTable::new(vec!["s1".to_string()]);
        assert!(LabeledLayout::join(&layout, &clinical, "disease").is_err());
    }
}
