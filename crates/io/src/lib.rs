// File I/O operations

pub mod csv;
pub mod export;
pub mod json;
pub mod xlsx;

pub use export::ExportConfig;
