// file: src/exporter/json.rs
// description: streams scored records into a json object keyed by post id

use crate::error::{RelevanceError, Result};
use crate::models::ScoreFailure;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
    pretty: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub kind: String,
    pub embedding_model: String,
    pub total_documents: usize,
    pub failed_documents: Vec<ScoreFailure>,
    pub files: Vec<String>,
}

/// Writes `{ "id": record, ... }` one record at a time, so the dataset never
/// has to be held in memory.
///
/// Records go to a `.partial` sibling of the target. [`RecordWriter::finish`]
/// closes the object and renames it over the target; a writer dropped before
/// that removes the partial file and leaves any previous dataset in place.
pub struct RecordWriter {
    path: PathBuf,
    staging: PathBuf,
    writer: BufWriter<File>,
    pretty: bool,
    written: usize,
    finished: bool,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>, pretty: bool) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| RelevanceError::FileOperation {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir, pretty })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn data_path(&self, kind: &str) -> PathBuf {
        self.output_dir.join(format!("{}_data.json", kind))
    }

    pub fn manifest_path(&self, kind: &str) -> PathBuf {
        self.output_dir.join(format!("{}_manifest.json", kind))
    }

    /// Replaces any previous `{kind}_data.json` once the writer is finished.
    pub fn open(&self, kind: &str) -> Result<RecordWriter> {
        let path = self.data_path(kind);
        info!("Saving {} data to {}...", kind, path.display());
        RecordWriter::create(path, self.pretty)
    }

    /// Writes to an explicit file instead of `{kind}_data.json`.
    pub fn open_at(&self, path: impl Into<PathBuf>) -> Result<RecordWriter> {
        let path = path.into();
        info!("Saving data to {}...", path.display());
        RecordWriter::create(path, self.pretty)
    }

    pub fn write_manifest(&self, manifest: &ExportManifest) -> Result<PathBuf> {
        let path = self.manifest_path(&manifest.kind);
        let contents = if self.pretty {
            serde_json::to_string_pretty(manifest)?
        } else {
            serde_json::to_string(manifest)?
        };
        fs::write(&path, contents).map_err(|source| RelevanceError::FileOperation {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl ExportManifest {
    pub fn new(
        kind: &str,
        embedding_model: &str,
        total_documents: usize,
        failed_documents: Vec<ScoreFailure>,
        files: Vec<String>,
    ) -> Self {
        Self {
            exported_at: Utc::now().to_rfc3339(),
            kind: kind.to_string(),
            embedding_model: embedding_model.to_string(),
            total_documents,
            failed_documents,
            files,
        }
    }
}

impl RecordWriter {
    fn create(path: PathBuf, pretty: bool) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| RelevanceError::FileOperation {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let staging = staging_path(&path);
        let file = File::create(&staging).map_err(|source| RelevanceError::FileOperation {
            path: staging.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        writer.write_all(b"{")?;

        Ok(Self {
            path,
            staging,
            writer,
            pretty,
            written: 0,
            finished: false,
        })
    }

    pub fn write_record<T: Serialize>(&mut self, id: &str, record: &T) -> Result<()> {
        if self.written > 0 {
            self.writer.write_all(b",")?;
        }
        self.writer.write_all(b"\n")?;
        if self.pretty {
            self.writer.write_all(b"    ")?;
        }

        serde_json::to_writer(&mut self.writer, id)?;
        self.writer.write_all(b": ")?;
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, record)?;
        } else {
            serde_json::to_writer(&mut self.writer, record)?;
        }

        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the object, flushes, and moves the file into place. Returns the target path.
    pub fn finish(mut self) -> Result<PathBuf> {
        if self.written > 0 {
            self.writer.write_all(b"\n")?;
        }
        self.writer.write_all(b"}\n")?;
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;

        fs::rename(&self.staging, &self.path).map_err(|source| RelevanceError::FileOperation {
            path: self.path.clone(),
            source,
        })?;
        self.finished = true;

        info!(
            "Export complete: {} documents written to {}",
            self.written,
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                "Export to {} did not finish, keeping previous contents",
                self.path.display()
            );
            let _ = fs::remove_file(&self.staging);
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
