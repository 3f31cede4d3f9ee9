pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod polars_utils;

pub use csv_table::{
    ColumnHint, CsvTable, build_column_hints, read_csv_frame, read_csv_table, table_to_dataframe,
};
pub use discovery::{DatasetFileNames, Discovery, discover_dataset_files, list_csv_files};
pub use error::{IngestError, Result};
pub use polars_utils::{
    any_to_f64, any_to_i64, any_to_stay_id, any_to_string, format_numeric, parse_f64, parse_i64,
};
