mod csv;

pub use csv::{EXPORT_FILE_NAME, write_catalog, write_catalog_to};
