//! Report source adapters.

pub mod files;

pub use files::CsvFileSource;
