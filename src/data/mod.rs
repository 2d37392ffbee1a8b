//! Quarterly fundamentals data
//!
//! - `types` - records, tables and field tags
//! - `ingest` - CSV reading and writing
//! - `fundamentals` - provider fundamentals documents
//! - `store` - storage boundary used by the pipeline

pub mod fundamentals;
pub mod ingest;
pub mod store;
pub mod types;

pub use fundamentals::{quarter_label, table_from_fundamentals, FieldCatalog};
pub use ingest::{read_table_csv, read_table_csv_path, write_table_csv};
pub use store::{DirectoryStore, FundamentalsStore, InMemoryStore};
pub use types::{
    Category, CompanyHistory, CompanyKey, FieldTag, QuarterlyRecord, QuarterlyTable,
};
