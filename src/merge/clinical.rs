//! Merging clinical compendia

use crate::data::{ClinicalTable, ClinicalValue, CompendiumClinicalMap};
use crate::error::{CompendiumError, Result};

/// Attribute injected into every merged clinical row
pub const COMPENDIUM_COLUMN: &str = "compendium";

/// Stack clinical tables, tagging each row with its compendium name.
///
/// Each input is copied before the `compendium` column is added, so the
/// caller's tables are left untouched. Columns are the union of all
/// attributes in order of first appearance; a row whose source table lacks an
/// attribute gets `None` for it. Sample IDs are kept verbatim, duplicates
/// included.
pub fn merge_clinical(tables: &CompendiumClinicalMap) -> Result<ClinicalTable> {
    if tables.is_empty() {
        return Err(CompendiumError::EmptyInput {
            reason: "no clinical tables to merge".to_string(),
        });
    }

    let mut labeled: Vec<ClinicalTable> = Vec::with_capacity(tables.len());
    for (name, table) in tables.iter() {
        let mut copy = table.clone();
        copy.fill_attribute(COMPENDIUM_COLUMN, name)?;
        labeled.push(copy);
    }

    let mut attributes: Vec<String> = Vec::new();
    for table in &labeled {
        for name in table.attribute_names() {
            if !attributes.iter().any(|a| a == name) {
                attributes.push(name.to_string());
            }
        }
    }

    let schemas_differ = labeled
        .iter()
        .any(|t| t.n_attributes() != attributes.len());
    if schemas_differ {
        log::warn!(
            "Clinical attributes differ between compendia; {} attributes in the union, missing cells left empty",
            attributes.len()
        );
    }

    let sample_ids: Vec<String> = labeled
        .iter()
        .flat_map(|t| t.sample_ids().iter().cloned())
        .collect();
    let mut merged = ClinicalTable::new(sample_ids);

    for attribute in &attributes {
        let mut column: Vec<Option<ClinicalValue>> = Vec::with_capacity(merged.n_samples());
        for table in &labeled {
            match table.attribute(attribute) {
                Some(values) => column.extend(values.iter().cloned()),
                None => column.extend(std::iter::repeat(None).take(table.n_samples())),
            }
        }
        merged.set_attribute(attribute, column)?;
    }

    log::info!(
        "Merged {} clinical tables: {} samples, {} attributes",
        tables.len(),
        merged.n_samples(),
        merged.n_attributes()
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<ClinicalValue> {
        Some(ClinicalValue::Text(s.to_string()))
    }

    fn clinical_pair() -> CompendiumClinicalMap {
        let mut a = ClinicalTable::new(vec!["s1".to_string(), "s2".to_string()]);
        a.set_attribute("disease", vec![text("glioma"), text("sarcoma")]).unwrap();
        a.set_attribute("X", vec![Some(ClinicalValue::Number(1.0)), None]).unwrap();

        let mut b = ClinicalTable::new(vec!["s3".to_string()]);
        b.set_attribute("disease", vec![text("melanoma")]).unwrap();
        b.set_attribute("age", vec![Some(ClinicalValue::Number(40.0))]).unwrap();

        let mut map = CompendiumClinicalMap::new();
        map.insert("A", a);
        map.insert("B", b);
        map
    }

    #[test]
    fn test_union_of_attributes_with_missing() {
        let merged = merge_clinical(&clinical_pair()).unwrap();

        assert_eq!(merged.sample_ids(), &["s1", "s2", "s3"]);
        assert_eq!(merged.attribute_names(), vec!["disease", "X", "compendium", "age"]);

        // s3 comes from B, which has no X column
        assert_eq!(merged.attribute("X").unwrap()[2], None);
        // s1 and s2 come from A, which has no age column
        assert_eq!(merged.attribute("age").unwrap(), &[None, None, Some(ClinicalValue::Number(40.0))]);
        // missing values from the source stay missing
        assert_eq!(merged.attribute("X").unwrap()[1], None);
    }

    #[test]
    fn test_compendium_label_and_no_mutation() {
        let map = clinical_pair();
        let before = map.clone();
        let merged = merge_clinical(&map).unwrap();

        assert_eq!(
            merged.attribute(COMPENDIUM_COLUMN).unwrap(),
            &[text("A"), text("A"), text("B")]
        );
        assert_eq!(map, before);
        assert!(!map.get("A").unwrap().has_attribute(COMPENDIUM_COLUMN));
    }

    #[test]
    fn test_row_count_is_sum_even_with_shared_ids() {
        let mut map = CompendiumClinicalMap::new();
        map.insert("A", ClinicalTable::new(vec!["s1".to_string()]));
        map.insert("B", ClinicalTable::new(vec!["s1".to_string(), "s2".to_string()]));
        let merged = merge_clinical(&map).unwrap();
        assert_eq!(merged.sample_ids(), &["s1", "s1", "s2"]);
        assert_eq!(merged.n_attributes(), 1);
    }

    #[test]
    fn test_existing_compendium_column_overwritten_in_copy() {
        let mut a = ClinicalTable::new(vec!["s1".to_string()]);
        a.set_attribute(COMPENDIUM_COLUMN, vec![text("old")]).unwrap();
        let mut map = CompendiumClinicalMap::new();
        map.insert("new", a);

        let merged = merge_clinical(&map).unwrap();
        assert_eq!(merged.value(COMPENDIUM_COLUMN, 0), text("new").as_ref());
        assert_eq!(map.get("new").unwrap().value(COMPENDIUM_COLUMN, 0), text("old").as_ref());
    }

    #[test]
    fn test_empty_map_rejected() {
        let result = merge_clinical(&CompendiumClinicalMap::new());
        assert!(matches!(result, Err(CompendiumError::EmptyInput { .. })));
    }
}
