//! Data structures for expression and clinical compendia

mod clinical;
mod compendium;
mod expression;

pub use clinical::{ClinicalTable, ClinicalValue};
pub use compendium::{CompendiumClinicalMap, CompendiumExpressionMap, CompendiumMap};
pub use expression::ExpressionTable;
