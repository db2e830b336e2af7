//! The CSV import/export format of the virtual filesystem.
//!
//! Each row carries `path,type,content`; file content travels base64-encoded.

mod encoding;
mod exporter;
mod importer;

pub use exporter::Exporter;
pub use importer::{Importer, LoadOutcome};
