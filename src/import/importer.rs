use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::filesystem::{Node, NodeKind, Vfs, segments};

use super::encoding::decode_content;

pub const PATH_COLUMN: &str = "path";
pub const TYPE_COLUMN: &str = "type";
pub const CONTENT_COLUMN: &str = "content";

/// One row of the tabular import format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub path: String,
    pub kind: String,
    pub content: Option<String>,
}

impl Row {
    pub fn new(path: impl Into<String>, kind: impl Into<String>, content: Option<&str>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
            content: content.map(str::to_string),
        }
    }

    fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory.to_string()
    }
}

/// What a load attempt left behind in the [`Vfs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { path: PathBuf, rows: usize },
    /// The source did not exist; the VFS was reset to an empty root.
    SourceUnavailable { path: PathBuf },
}

pub struct Importer;

impl Importer {
    /// Rebuilds `vfs` from the CSV file at `path`.
    ///
    /// The tree is swapped in only after it was built completely. On error the
    /// VFS is reset to an empty root before the error is returned.
    pub async fn load(vfs: &mut Vfs, path: &Path) -> Result<LoadOutcome, ImportError> {
        match Self::read_tree(path).await {
            Ok(Some((root, rows))) => {
                vfs.replace_root(root, Some(path.to_path_buf()));
                info!("Loaded {} rows from {}", rows, path.display());
                Ok(LoadOutcome::Loaded {
                    path: path.to_path_buf(),
                    rows,
                })
            }
            Ok(None) => {
                vfs.replace_root(Node::root(), Some(path.to_path_buf()));
                info!("{} does not exist, starting with an empty VFS", path.display());
                Ok(LoadOutcome::SourceUnavailable {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                vfs.reset();
                warn!("Import from {} failed: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Reads and builds a tree, returning `None` when `path` does not exist.
    pub async fn read_tree(path: &Path) -> Result<Option<(Node, usize)>, ImportError> {
        debug!("Opening import source: {}", path.display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.display().to_string(),
                });
            }
        };
        debug!("Read {} bytes from import source", bytes.len());

        let rows = Self::parse_rows(bytes.as_slice())?;
        let count = rows.len();
        Ok(Some((Self::build_tree(&rows)?, count)))
    }

    /// Parses CSV with a `path,type,content` header into rows.
    pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<Row>, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().context(CsvSnafu)?.clone();
        if headers.is_empty() {
            debug!("Import source has no header, treating it as empty");
            return Ok(Vec::new());
        }
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(ImportError::MissingColumn { column: name })
        };
        let path_idx = column(PATH_COLUMN)?;
        let type_idx = column(TYPE_COLUMN)?;
        let content_idx = column(CONTENT_COLUMN).ok();

        reader
            .records()
            .map(|record| -> Result<Row, ImportError> {
                let record = record.context(CsvSnafu)?;
                let field = |idx: usize| record.get(idx).map(str::to_string);
                Ok(Row {
                    path: field(path_idx).unwrap_or_default(),
                    kind: field(type_idx).unwrap_or_default(),
                    content: content_idx.and_then(field),
                })
            })
            .collect()
    }

    /// Builds a complete tree from rows, in row order.
    pub fn build_tree(rows: &[Row]) -> Result<Node, ImportError> {
        let mut root = Node::root();
        for row in rows {
            Self::insert_row(&mut root, row)?;
        }
        Ok(root)
    }

    fn insert_row(root: &mut Node, row: &Row) -> Result<(), ImportError> {
        let parts = segments(&row.path);
        let Some((name, parents)) = parts.split_last() else {
            debug!("Skipping root row '{}'", row.path);
            return Ok(());
        };

        let mut current = root;
        for (depth, segment) in parents.iter().enumerate() {
            let conflict = || ImportError::StructuralConflict {
                path: row.path.clone(),
                parent: format!("/{}", parents[..=depth].join("/")),
            };
            let children = current.children_mut().ok_or_else(conflict)?;
            let next = children
                .entry(segment.to_string())
                .or_insert_with(|| Node::directory(*segment));
            if next.is_file() {
                return Err(conflict());
            }
            current = next;
        }

        let node = if row.is_directory() {
            Node::directory(*name)
        } else {
            Node::file(*name, Self::file_content(row))
        };
        current
            .put_child(node)
            .map_err(|_| ImportError::StructuralConflict {
                path: row.path.clone(),
                parent: format!("/{}", parents.join("/")),
            })
    }

    fn file_content(row: &Row) -> String {
        let raw = row.content.clone().unwrap_or_default();
        if raw.is_empty() {
            return raw;
        }
        decode_content(&raw).unwrap_or_else(|e| {
            warn!("Keeping raw content of '{}': {}", row.path, e);
            raw
        })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ImportError {
    #[snafu(display("Failed to read the import source: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the import source: {}", source))]
    CsvError { source: csv::Error },
    #[snafu(display("Import source has no '{}' column", column))]
    MissingColumn { column: &'static str },
    #[snafu(display("'{}' needs '{}' to be a directory, but it is a file", path, parent))]
    StructuralConflict { path: String, parent: String },
    #[snafu(display("Malformed transport encoding: {}", message))]
    MalformedEncoding { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::encoding::encode_content;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{}", contents).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn builds_tree_from_rows() {
        let rows = vec![
            Row::new("/a", "directory", None),
            Row::new("/a/b.txt", "file", Some(encode_content("x;y").as_str())),
        ];
        let vfs = Vfs::with_root(Importer::build_tree(&rows).unwrap(), true);

        assert_eq!(vfs.list("/").unwrap(), vec!["a"]);
        assert_eq!(vfs.list("/a").unwrap(), vec!["b.txt"]);
        assert_eq!(vfs.read("/a/b.txt").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn creates_missing_intermediate_directories() {
        let rows = vec![Row::new("deep/er/file", "file", Some("aGk="))];
        let vfs = Vfs::with_root(Importer::build_tree(&rows).unwrap(), true);

        assert_eq!(vfs.list("/deep").unwrap(), vec!["er"]);
        assert_eq!(vfs.read("/deep/er/file").unwrap(), vec!["hi"]);
    }

    #[test]
    fn skips_root_rows() {
        let rows = vec![
            Row::new("/", "directory", None),
            Row::new("", "directory", None),
            Row::new("//", "file", Some("eA==")),
            Row::new("x", "directory", None),
        ];
        let root = Importer::build_tree(&rows).unwrap();
        assert_eq!(root.children().unwrap().len(), 1);
    }

    #[test]
    fn malformed_encoding_falls_back_to_raw_content() {
        let rows = vec![Row::new("/f", "file", Some("plain;text"))];
        let vfs = Vfs::with_root(Importer::build_tree(&rows).unwrap(), true);
        assert_eq!(vfs.read("/f").unwrap(), vec!["plain", "text"]);
    }

    #[test]
    fn file_without_content_is_empty() {
        let rows = vec![Row::new("/f", "file", None)];
        let vfs = Vfs::with_root(Importer::build_tree(&rows).unwrap(), true);
        assert_eq!(vfs.get_item("/f").unwrap().content(), Some(""));
    }

    #[test]
    fn directory_below_a_file_is_a_structural_conflict() {
        let rows = vec![
            Row::new("/a", "file", None),
            Row::new("/a/b", "directory", None),
        ];
        let result = Importer::build_tree(&rows);
        match result {
            Err(ImportError::StructuralConflict { path, parent }) => {
                assert_eq!(path, "/a/b");
                assert_eq!(parent, "/a");
            }
            other => panic!("Expected StructuralConflict, got {:?}", other),
        }
    }

    #[test]
    fn later_rows_overwrite_earlier_entries_in_place() {
        let rows = vec![
            Row::new("/a", "file", None),
            Row::new("/b", "directory", None),
            Row::new("/a", "directory", None),
        ];
        let vfs = Vfs::with_root(Importer::build_tree(&rows).unwrap(), true);
        assert_eq!(vfs.list("/").unwrap(), vec!["a", "b"]);
        assert!(vfs.get_item("/a").unwrap().is_directory());
    }

    #[test]
    fn parses_quoted_csv_fields() {
        let csv = "path,type,content\n\"/a,b\",file,\"eDt5\"\n/d,directory,\n";
        let rows = Importer::parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                Row::new("/a,b", "file", Some("eDt5")),
                Row::new("/d", "directory", Some("")),
            ]
        );
    }

    #[test]
    fn content_column_is_optional() {
        let csv = "type,path\ndirectory,/d\n";
        let rows = Importer::parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows, vec![Row::new("/d", "directory", None)]);
    }

    #[test]
    fn missing_type_column_is_an_error() {
        let csv = "path,content\n/a,\n";
        assert!(matches!(
            Importer::parse_rows(csv.as_bytes()),
            Err(ImportError::MissingColumn { column: "type" })
        ));
    }

    #[compio::test]
    async fn load_replaces_tree_and_remembers_source() {
        let file = csv_file("path,type,content\n/a,directory,\n/a/b.txt,file,eDt5\n");
        let mut vfs = Vfs::default();

        let outcome = Importer::load(&mut vfs, file.path()).await.unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                path: file.path().to_path_buf(),
                rows: 2
            }
        );
        assert_eq!(vfs.read("/a/b.txt").unwrap(), vec!["x", "y"]);
        assert_eq!(vfs.source(), Some(&file.path().to_path_buf()));
    }

    #[compio::test]
    async fn missing_source_yields_empty_vfs() {
        let mut vfs = Vfs::with_root(
            Importer::build_tree(&[Row::new("/old", "directory", None)]).unwrap(),
            true,
        );

        let outcome = Importer::load(&mut vfs, Path::new("/nonexistent/vfs.csv"))
            .await
            .unwrap();

        assert!(matches!(outcome, LoadOutcome::SourceUnavailable { .. }));
        assert_eq!(vfs.list("/").unwrap(), Vec::<String>::new());
        assert_eq!(vfs.source(), Some(&PathBuf::from("/nonexistent/vfs.csv")));
    }

    #[compio::test]
    async fn failed_import_resets_to_empty_vfs() {
        let file = csv_file("path,type,content\n/a,file,\n/a/b,directory,\n");
        let mut vfs = Vfs::with_root(
            Importer::build_tree(&[Row::new("/old", "directory", None)]).unwrap(),
            true,
        );

        let result = Importer::load(&mut vfs, file.path()).await;

        assert!(matches!(
            result,
            Err(ImportError::StructuralConflict { .. })
        ));
        assert_eq!(vfs.list("/").unwrap(), Vec::<String>::new());
        assert!(vfs.source().is_none());
    }

    #[compio::test]
    async fn empty_source_loads_an_empty_tree() {
        let file = csv_file("");
        let mut vfs = Vfs::default();
        let outcome = Importer::load(&mut vfs, file.path()).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Loaded { rows: 0, .. }));
    }
}
