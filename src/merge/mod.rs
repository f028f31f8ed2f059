//! Cross-compendium merging of expression and clinical tables

mod clinical;
mod expression;

pub use clinical::{merge_clinical, COMPENDIUM_COLUMN};
pub use expression::{
    filter_by_minimum_expression, filter_by_variance_percentile, merge_expression, GeneFilterParams,
};
