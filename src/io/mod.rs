//! Input/Output operations for compendium tables and layouts

mod layout;
mod tsv;

pub use layout::{read_layout, write_layout};
pub use tsv::{
    load_clinical_dir, load_expression_dir, read_clinical_table, read_expression_table,
    write_clinical_table, write_expression_table, EXPRESSION_SUFFIX,
};
