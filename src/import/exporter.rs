use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::{debug, info};

use crate::filesystem::{Node, Vfs};

use super::encoding::encode_content;
use super::importer::{CONTENT_COLUMN, PATH_COLUMN, Row, TYPE_COLUMN};

pub struct Exporter;

impl Exporter {
    /// Writes `vfs` to `target`, or back to the file it was loaded from.
    pub async fn save(vfs: &Vfs, target: Option<&Path>) -> Result<PathBuf, ExportError> {
        let path = target
            .map(Path::to_path_buf)
            .or_else(|| vfs.source().cloned())
            .context(NoTargetSnafu)?;

        let bytes = Self::to_csv(vfs.root())?;
        debug!("Writing {} bytes to {}", bytes.len(), path.display());
        fs::write(&path, bytes).await.0.context(WriteSnafu {
            file_path: path.display().to_string(),
        })?;

        info!("Saved VFS to {}", path.display());
        Ok(path)
    }

    /// Serializes the tree as `path,type,content` CSV.
    pub fn to_csv(root: &Node) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([PATH_COLUMN, TYPE_COLUMN, CONTENT_COLUMN])
            .context(CsvSnafu)?;
        for row in Self::rows(root) {
            writer
                .write_record([
                    row.path.as_str(),
                    row.kind.as_str(),
                    row.content.as_deref().unwrap_or_default(),
                ])
                .context(CsvSnafu)?;
        }
        writer
            .into_inner()
            .map_err(|e| e.into_error())
            .context(BufferSnafu)
    }

    /// Rows for every node below `root`, parents before their children.
    pub fn rows(root: &Node) -> Vec<Row> {
        let mut rows = Vec::new();
        Self::collect_rows(root, "", &mut rows);
        rows
    }

    fn collect_rows(directory: &Node, prefix: &str, rows: &mut Vec<Row>) {
        let Some(children) = directory.children() else {
            return;
        };
        for (name, child) in children {
            let path = format!("{prefix}/{name}");
            let kind = child.kind().to_string();
            match child {
                Node::Directory { .. } => {
                    rows.push(Row::new(&path, kind, None));
                    Self::collect_rows(child, &path, rows);
                }
                Node::File { content, .. } => {
                    let encoded = encode_content(content);
                    rows.push(Row::new(&path, kind, Some(encoded.as_str())));
                }
            }
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExportError {
    #[snafu(display("No export target given and the VFS was not loaded from a file"))]
    NoTarget,
    #[snafu(display("Failed to encode the VFS"))]
    CsvError { source: csv::Error },
    #[snafu(display("Failed to flush the encoded VFS"))]
    BufferError { source: std::io::Error },
    #[snafu(display("Failed to write the VFS to {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
}
