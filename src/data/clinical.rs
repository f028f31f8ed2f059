//! Clinical attribute tables (per-sample metadata)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CompendiumError, Result};

/// A single clinical attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClinicalValue {
    Text(String),
    Number(f64),
}

impl ClinicalValue {
    /// Parse a raw cell. Empty, `NA` and `NaN` cells are missing.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() || s == "NA" || s.eq_ignore_ascii_case("nan") {
            return None;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(ClinicalValue::Number(v)),
            _ => Some(ClinicalValue::Text(s.to_string())),
        }
    }
}

impl fmt::Display for ClinicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClinicalValue::Text(s) => write!(f, "{}", s),
            ClinicalValue::Number(v) => write!(f, "{}", v),
        }
    }
}

/// Per-sample clinical attributes with ordered columns
///
/// `None` cells are missing values; they are kept as such through merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalTable {
    /// Sample identifiers (row index, duplicates allowed)
    sample_ids: Vec<String>,
    /// Attribute columns in order (name, one value per sample)
    columns: Vec<(String, Vec<Option<ClinicalValue>>)>,
}

impl ClinicalTable {
    /// Create a table with no attribute columns
    pub fn new(sample_ids: Vec<String>) -> Self {
        Self {
            sample_ids,
            columns: Vec::new(),
        }
    }

    /// Add an attribute column, replacing an existing column of the same name
    pub fn set_attribute(&mut self, name: &str, values: Vec<Option<ClinicalValue>>) -> Result<()> {
        if values.len() != self.sample_ids.len() {
            return Err(CompendiumError::DimensionMismatch {
                expected: format!("{} values", self.sample_ids.len()),
                got: format!("{} values", values.len()),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => {
                log::debug!("Replacing clinical attribute '{}'", name);
                *existing = values;
            }
            None => self.columns.push((name.to_string(), values)),
        }
        Ok(())
    }

    /// Add a text attribute column where every value is present
    pub fn set_text_attribute(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        self.set_attribute(name, values.into_iter().map(|v| Some(ClinicalValue::Text(v))).collect())
    }

    /// Set the same text value on every row
    pub fn fill_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        let values = vec![Some(ClinicalValue::Text(value.to_string())); self.sample_ids.len()];
        self.set_attribute(name, values)
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn n_attributes(&self) -> usize {
        self.columns.len()
    }

    /// Attribute names in column order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&[Option<ClinicalValue>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Value of one attribute for one row
    pub fn value(&self, name: &str, sample_idx: usize) -> Option<&ClinicalValue> {
        self.attribute(name)
            .and_then(|v| v.get(sample_idx))
            .and_then(|v| v.as_ref())
    }

    /// First row carrying this sample ID
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    pub(crate) fn columns(&self) -> &[(String, Vec<Option<ClinicalValue>>)] {
        &self.columns
    }
}
