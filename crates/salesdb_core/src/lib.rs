pub mod aggregate;
pub mod cleaner;
pub mod generate;
pub mod loader;
pub mod query;
pub mod rank;
pub mod record;
pub mod table;

pub use cleaner::{CleanReport, CleanedDataset, CleaningPolicy, clean};
pub use loader::dialect::DialectOptions;
pub use loader::{LoadOptions, LoadReport, LoadedDataset, MalformedPolicy, load_path, load_reader};
pub use query::{Query, QueryParams};
pub use record::{Column, SaleRecord, Shift, ValidSale};
pub use table::ResultTable;
pub use table::format::{DisplayOptions, OutputMode, write_table};
