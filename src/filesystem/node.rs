use derive_more::{Display, IsVariant};
use hashlink::LinkedHashMap;

pub const ROOT_NAME: &str = "/";

/// Children of a directory, kept in insertion order.
pub type Children = LinkedHashMap<String, Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// A single entry of the virtual filesystem.
///
/// Directories own their children outright, so the tree is acyclic and every
/// node has exactly one parent. Files carry their decoded text content and can
/// never hold children.
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum Node {
    Directory { name: String, children: Children },
    File { name: String, content: String },
}

impl Node {
    pub fn root() -> Self {
        Self::directory(ROOT_NAME)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Node::Directory {
            name: name.into(),
            children: Children::new(),
        }
    }

    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Node::File {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Directory { name, .. } | Node::File { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory { .. } => NodeKind::Directory,
            Node::File { .. } => NodeKind::File,
        }
    }

    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Directory { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Children> {
        match self {
            Node::Directory { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File { content, .. } => Some(content),
            Node::Directory { .. } => None,
        }
    }

    /// Inserts `node` under this directory, replacing a same-named child in
    /// place so sibling order stays that of first insertion.
    ///
    /// Returns the node back when `self` is a file.
    pub fn put_child(&mut self, node: Node) -> Result<(), Node> {
        let Some(children) = self.children_mut() else {
            return Err(node);
        };
        match children.get_mut(node.name()) {
            Some(slot) => *slot = node,
            None => {
                children.insert(node.name().to_string(), node);
            }
        }
        Ok(())
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_an_empty_directory_named_slash() {
        let root = Node::root();
        assert!(root.is_directory());
        assert_eq!(root.name(), "/");
        assert!(root.children().unwrap().is_empty());
    }

    #[test]
    fn file_has_no_children() {
        let file = Node::file("a.txt", "x");
        assert!(file.is_file());
        assert!(file.children().is_none());
        assert_eq!(file.content(), Some("x"));
        assert_eq!(file.kind().to_string(), "file");
    }

    #[test]
    fn put_child_into_file_is_rejected() {
        let mut file = Node::file("a.txt", "x");
        let rejected = file.put_child(Node::directory("b"));
        assert_eq!(rejected, Err(Node::directory("b")));
    }

    #[test]
    fn put_child_replaces_in_place_and_keeps_order() {
        let mut dir = Node::directory("d");
        dir.put_child(Node::file("one", "1")).unwrap();
        dir.put_child(Node::file("two", "2")).unwrap();
        dir.put_child(Node::directory("one")).unwrap();

        let children = dir.children().unwrap();
        let names: Vec<_> = children.keys().cloned().collect();
        assert_eq!(names, vec!["one", "two"]);
        assert!(children.get("one").unwrap().is_directory());
    }

    #[test]
    fn cloned_file_is_independent() {
        let original = Node::file("a", "before");
        let mut copy = original.clone();
        if let Node::File { content, .. } = &mut copy {
            content.push_str(" after");
        }
        assert_eq!(original.content(), Some("before"));
        assert_eq!(copy.content(), Some("before after"));
    }
}
