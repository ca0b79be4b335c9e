// file: src/exporter/mod.rs
// description: persistence of scored datasets
// reference: internal module structure

pub mod json;

pub use json::{ExportManifest, JsonExporter, RecordWriter};
