use std::path::PathBuf;

use snafu::{OptionExt, Snafu, ensure};
use tracing::debug;

use super::node::Node;
use super::resolver::{normalize, resolve, resolve_mut};

/// Delimiter between records of a file's content.
pub const RECORD_DELIMITER: char = ';';

/// The virtual filesystem context shared by every command of a session.
#[derive(Debug, Clone)]
pub struct Vfs {
    root: Node,
    current_path: String,
    strict_cd: bool,
    source: Option<PathBuf>,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Vfs {
    pub fn new(strict_cd: bool) -> Self {
        Self {
            root: Node::root(),
            current_path: "/".to_string(),
            strict_cd,
            source: None,
        }
    }

    #[cfg(test)]
    pub fn with_root(root: Node, strict_cd: bool) -> Self {
        let mut vfs = Self::new(strict_cd);
        vfs.replace_root(root, None);
        vfs
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Host file the current tree was loaded from, if any.
    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    /// Swaps in a freshly built tree, dropping the previous one.
    pub fn replace_root(&mut self, root: Node, source: Option<PathBuf>) {
        debug_assert!(root.is_directory());
        self.root = root;
        self.source = source;
    }

    pub fn reset(&mut self) {
        self.replace_root(Node::root(), None);
    }

    pub fn get_item(&self, path: &str) -> Result<&Node, VfsError> {
        resolve(&self.root, path).context(PathNotFoundSnafu { path })
    }

    /// Names of the children of the directory at `path`, in insertion order.
    pub fn list(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let children = self
            .get_item(path)?
            .children()
            .context(NotADirectorySnafu { path })?;
        Ok(children.keys().cloned().collect())
    }

    /// Content of the file at `path`, split into its `;` separated records.
    pub fn read(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let content = self
            .get_item(path)?
            .content()
            .context(NotAFileSnafu { path })?;
        Ok(content
            .split(RECORD_DELIMITER)
            .map(str::to_string)
            .collect())
    }

    pub fn change_directory(&mut self, path: &str) -> Result<(), VfsError> {
        if !self.strict_cd {
            debug!("Unchecked change of directory to '{}'", path);
            self.current_path = path.to_string();
            return Ok(());
        }

        ensure!(
            self.get_item(path)?.is_directory(),
            NotADirectorySnafu { path }
        );
        self.current_path = normalize(path);
        debug!("Changed directory to '{}'", self.current_path);
        Ok(())
    }

    /// Copies the file at `source_path` into the directory at `dest_path`,
    /// keeping its name.
    pub fn copy(&mut self, source_path: &str, dest_path: &str) -> Result<(), VfsError> {
        let source = self.get_item(source_path)?;
        ensure!(source.is_file(), NotAFileSnafu { path: source_path });
        let copied = source.clone();

        let destination = resolve_mut(&mut self.root, dest_path)
            .context(PathNotFoundSnafu { path: dest_path })?;
        let children = destination
            .children_mut()
            .context(NotADirectorySnafu { path: dest_path })?;
        ensure!(
            !children.contains_key(copied.name()),
            NameConflictSnafu {
                name: copied.name()
            }
        );

        debug!("Copying '{}' into '{}'", source_path, dest_path);
        children.insert(copied.name().to_string(), copied);
        Ok(())
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum VfsError {
    #[snafu(display("Path not found: {path}"))]
    PathNotFound { path: String },
    #[snafu(display("Not a directory: {path}"))]
    NotADirectory { path: String },
    #[snafu(display("Not a file: {path}"))]
    NotAFile { path: String },
    #[snafu(display("File already exists: {name}"))]
    NameConflict { name: String },
}
