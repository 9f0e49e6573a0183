//! Data module - spreadsheet loading, validation, cleaning and export

mod loader;
mod processor;
mod validator;
mod writer;

pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, ProcessorError};
pub use validator::TableValidator;
pub use writer::{SpreadsheetWriter, WriterError};
