//! TSV reading and writing for expression and clinical compendia

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::data::{
    ClinicalTable, ClinicalValue, CompendiumClinicalMap, CompendiumExpressionMap, ExpressionTable,
};
use crate::error::{CompendiumError, Result};

/// Suffix identifying expression files in a raw data directory
pub const EXPRESSION_SUFFIX: &str = "_expression.tsv";

fn tsv_reader<P: AsRef<Path>>(path: P) -> Result<csv::Reader<fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn tsv_writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<fs::File>> {
    Ok(csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?)
}

fn parse_expression_value(raw: &str) -> Result<f64> {
    if raw.is_empty() || raw == "NA" || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| CompendiumError::InvalidExpressionTable {
            reason: format!("Invalid expression value: {}", raw),
        })
}

/// Read an expression table from a TSV file
/// Expected format: first column is gene IDs, first row is sample IDs.
/// The result is transposed to samples x genes.
pub fn read_expression_table<P: AsRef<Path>>(path: P) -> Result<ExpressionTable> {
    let mut reader = tsv_reader(path)?;
    let header = reader.headers()?.clone();
    if header.len() < 2 {
        return Err(CompendiumError::InvalidExpressionTable {
            reason: "Not enough columns in header".to_string(),
        });
    }
    let sample_ids: Vec<String> = header.iter().skip(1).map(|s| s.to_string()).collect();
    let n_samples = sample_ids.len();

    let mut gene_ids: Vec<String> = Vec::new();
    let mut data: Vec<f64> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let gene = fields.next().unwrap_or_default();
        gene_ids.push(gene.to_string());
        for field in fields {
            data.push(parse_expression_value(field)?);
        }
    }

    if gene_ids.is_empty() {
        return Err(CompendiumError::EmptyData {
            reason: "No genes found in expression table".to_string(),
        });
    }

    let gene_rows = Array2::from_shape_vec((gene_ids.len(), n_samples), data).map_err(|e| {
        CompendiumError::InvalidExpressionTable {
            reason: e.to_string(),
        }
    })?;
    ExpressionTable::from_gene_rows(gene_rows, gene_ids, sample_ids)
}

/// Read a clinical table from a TSV file
/// Expected format: first column is sample IDs, remaining columns are attributes
pub fn read_clinical_table<P: AsRef<Path>>(path: P) -> Result<ClinicalTable> {
    let mut reader = tsv_reader(path)?;
    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(CompendiumError::InvalidClinicalTable {
            reason: "Missing header row".to_string(),
        });
    }
    let attribute_names: Vec<String> = header.iter().skip(1).map(|s| s.to_string()).collect();
    let mut seen = HashSet::with_capacity(attribute_names.len());
    for name in &attribute_names {
        if !seen.insert(name.as_str()) {
            return Err(CompendiumError::InvalidClinicalTable {
                reason: format!("Duplicate attribute '{}' in header", name),
            });
        }
    }

    let mut sample_ids: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<Option<ClinicalValue>>> = vec![Vec::new(); attribute_names.len()];
    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        sample_ids.push(fields.next().unwrap_or_default().to_string());
        for (column, field) in columns.iter_mut().zip(fields) {
            column.push(ClinicalValue::parse(field));
        }
    }

    if sample_ids.is_empty() {
        return Err(CompendiumError::EmptyData {
            reason: "No samples found in clinical table".to_string(),
        });
    }

    let mut table = ClinicalTable::new(sample_ids);
    for (name, values) in attribute_names.iter().zip(columns) {
        table.set_attribute(name, values)?;
    }
    Ok(table)
}

/// Write an expression table in gene-row orientation
pub fn write_expression_table<P: AsRef<Path>>(path: P, table: &ExpressionTable) -> Result<()> {
    let mut writer = tsv_writer(path)?;

    let mut header = vec!["gene_id".to_string()];
    header.extend(table.sample_ids().iter().cloned());
    writer.write_record(&header)?;

    for (j, gene) in table.gene_ids().iter().enumerate() {
        let mut row = Vec::with_capacity(table.n_samples() + 1);
        row.push(gene.clone());
        row.extend(table.gene_values(j).iter().map(|v| v.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a clinical table in sample-row orientation; missing cells are empty
pub fn write_clinical_table<P: AsRef<Path>>(path: P, table: &ClinicalTable) -> Result<()> {
    let mut writer = tsv_writer(path)?;

    let mut header = vec!["sample_id".to_string()];
    header.extend(table.attribute_names().into_iter().map(String::from));
    writer.write_record(&header)?;

    for (i, sample) in table.sample_ids().iter().enumerate() {
        let mut row = Vec::with_capacity(table.n_attributes() + 1);
        row.push(sample.clone());
        for (_, values) in table.columns() {
            row.push(values[i].as_ref().map(|v| v.to_string()).unwrap_or_default());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// TSV files in `dir` accepted by `keep`, sorted by file name
fn matching_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Err(CompendiumError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory '{}' does not exist", dir.display()),
        )));
    }
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && keep(file_name) {
            files.push((file_name.to_string(), path));
        }
    }
    files.sort();
    Ok(files)
}

fn compendium_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Load every `*_expression.tsv` file in `dir`, keyed by file stem.
///
/// A file that fails to parse is logged and left out of the map.
pub fn load_expression_dir<P: AsRef<Path>>(dir: P) -> Result<CompendiumExpressionMap> {
    let mut map = CompendiumExpressionMap::new();
    for (file_name, path) in matching_files(dir.as_ref(), |n| n.ends_with(EXPRESSION_SUFFIX))? {
        match read_expression_table(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} ({} samples, {} genes)",
                    file_name,
                    table.n_samples(),
                    table.n_genes()
                );
                map.insert(compendium_name(&path), table);
            }
            Err(e) => log::warn!("Failed to load {}: {}", file_name, e),
        }
    }

    if map.is_empty() {
        log::error!("No expression TSV files found in {}", dir.as_ref().display());
        return Err(CompendiumError::EmptyData {
            reason: "No expression data files were loaded. Please check your input directory.".to_string(),
        });
    }
    Ok(map)
}

/// Load every `.tsv` file whose name contains `clinical` in `dir`, keyed by file stem.
///
/// A file that fails to parse is logged and left out of the map.
pub fn load_clinical_dir<P: AsRef<Path>>(dir: P) -> Result<CompendiumClinicalMap> {
    let mut map = CompendiumClinicalMap::new();
    let is_clinical = |n: &str| n.contains("clinical") && n.ends_with(".tsv");
    for (file_name, path) in matching_files(dir.as_ref(), is_clinical)? {
        match read_clinical_table(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} ({} samples, {} attributes)",
                    file_name,
                    table.n_samples(),
                    table.n_attributes()
                );
                map.insert(compendium_name(&path), table);
            }
            Err(e) => log::warn!("Failed to load {}: {}", file_name, e),
        }
    }

    if map.is_empty() {
        log::error!("No clinical TSV files found in {}", dir.as_ref().display());
        return Err(CompendiumError::EmptyData {
            reason: "No clinical data files were loaded. Please check your input directory.".to_string(),
        });
    }
    Ok(map)
}
