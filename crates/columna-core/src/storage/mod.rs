//! On-disk formats: delimited text import/export.

pub mod csv;

pub use csv::CsvFormat;
