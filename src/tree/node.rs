//! Tree container nodes

use crate::error::{Error, Result};
use crate::sync::{MutexExt, RwLockExt};
use crate::tree::item::sealed;
use crate::tree::{Item, Value};
use crate::types::ValueType;
use std::sync::{Arc, Mutex, OnceLock, RwLock, Weak};

/// Serializes structural changes across all trees, so the ancestor walk and
/// the parent assignment of one `attach` cannot interleave with another's
static ATTACH: Mutex<()> = Mutex::new(());

/// Container of named child items
///
/// A node owns its children through an insertion-ordered list. Each child
/// keeps a non-owning back-reference to the node it was attached to; the
/// reference is set once and never changes.
pub struct Node {
    name: Option<String>,
    comment: Option<String>,
    serialize_separately: bool,
    items: RwLock<Vec<Item>>,
    parent: OnceLock<Weak<Node>>,
}

impl Node {
    /// Create an empty, detached node
    pub fn new(
        name: Option<String>,
        comment: Option<String>,
        serialize_separately: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            comment,
            serialize_separately,
            items: RwLock::new(Vec::new()),
            parent: OnceLock::new(),
        })
    }

    /// Create an unnamed root node
    pub fn root() -> Arc<Self> {
        Self::new(None, None, false)
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Name used for lookup within the parent; the root is usually unnamed
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Free-form description for serializers
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Hint for serializers to write this subtree to its own file or section
    pub fn is_serialized_separately(&self) -> bool {
        self.serialize_separately
    }

    /// Snapshot of the children in insertion order
    pub fn items(&self) -> Vec<Item> {
        self.items.read_recovered().clone()
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.items.read_recovered().len()
    }

    /// Whether the node has no children
    pub fn is_empty(&self) -> bool {
        self.items.read_recovered().is_empty()
    }

    /// Node this one is attached to, if any and still alive
    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// Dotted path from the root, skipping unnamed nodes
    pub fn path(&self) -> String {
        let mut segments: Vec<String> = self.name.iter().cloned().collect();
        let mut ancestor = self.parent();
        while let Some(node) = ancestor {
            if let Some(name) = node.name() {
                segments.push(name.to_string());
            }
            ancestor = node.parent();
        }
        segments.reverse();
        segments.join(".")
    }

    // =========================================================================
    // Attachment
    // =========================================================================

    /// Append `item` and make this node its parent
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateName`] if a sibling already uses the item's name
    ///   (empty names never collide)
    /// - [`Error::AlreadyAttached`] if the item already has a parent, or is
    ///   this node or one of its ancestors
    pub fn attach(self: &Arc<Self>, item: impl Into<Item>) -> Result<()> {
        let item = item.into();
        let label = item.name().unwrap_or("<unnamed>").to_string();
        let _attach = ATTACH.lock_recovered();

        if let Item::Node(node) = &item {
            if self.is_self_or_ancestor(node) {
                return Err(Error::AlreadyAttached(label));
            }
        }

        let mut items = self.items.write_recovered();

        if let Some(name) = item.name().filter(|n| !n.is_empty()) {
            if items.iter().any(|sibling| sibling.name() == Some(name)) {
                return Err(Error::DuplicateName {
                    parent: self.display_name(),
                    name: name.to_string(),
                });
            }
        }

        if !item.set_parent(Arc::downgrade(self)) {
            return Err(Error::AlreadyAttached(label));
        }

        log::trace!("Attached '{}' to '{}'", label, self.display_name());
        items.push(item);
        Ok(())
    }

    fn is_self_or_ancestor(&self, candidate: &Arc<Node>) -> bool {
        if std::ptr::eq(self, Arc::as_ptr(candidate)) {
            return true;
        }
        let mut ancestor = self.parent();
        while let Some(node) = ancestor {
            if Arc::ptr_eq(&node, candidate) {
                return true;
            }
            ancestor = node.parent();
        }
        false
    }

    fn display_name(&self) -> String {
        let path = self.path();
        if path.is_empty() {
            "<root>".to_string()
        } else {
            path
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Direct child by name
    pub fn get(&self, name: &str) -> Option<Item> {
        self.items
            .read_recovered()
            .iter()
            .find(|item| item.name() == Some(name))
            .cloned()
    }

    /// Descendant by dotted path, e.g. `"network.port"`
    pub fn resolve(&self, path: &str) -> Option<Item> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_node()?.get(segment)?;
        }
        Some(current)
    }

    /// Typed value by dotted path
    ///
    /// # Errors
    ///
    /// - [`Error::ItemNotFound`] if nothing lives at `path`
    /// - [`Error::TypeMismatch`] if the item is a node or a value of another type
    pub fn value<T: ValueType>(&self, path: &str) -> Result<Arc<Value<T>>> {
        let item = self
            .resolve(path)
            .ok_or_else(|| Error::ItemNotFound(path.to_string()))?;

        if let Some(value) = item.downcast::<T>() {
            return Ok(value);
        }

        let actual = match &item {
            Item::Node(_) => "node",
            Item::Value(value) => value.type_name(),
        };
        Err(Error::TypeMismatch {
            path: path.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: actual.to_string(),
        })
    }

    /// Child node by dotted path
    pub fn node(&self, path: &str) -> Option<Arc<Node>> {
        self.resolve(path)?.as_node().cloned()
    }

    /// Depth-first, insertion-ordered traversal of all descendants
    ///
    /// `visit` receives each item and its depth (direct children are depth 1).
    /// Children are snapshotted per node, so `visit` may attach new items.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Item, usize),
    {
        self.walk_inner(&mut visit, 1);
    }

    fn walk_inner<F>(&self, visit: &mut F, depth: usize)
    where
        F: FnMut(&Item, usize),
    {
        for item in self.items() {
            visit(&item, depth);
            if let Item::Node(node) = &item {
                node.walk_inner(visit, depth + 1);
            }
        }
    }
}

impl sealed::Attach for Node {
    fn set_parent(&self, parent: Weak<Node>) -> bool {
        self.parent.set(parent).is_ok()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("comment", &self.comment)
            .field("serialize_separately", &self.serialize_separately)
            .field("items", &*self.items.read_recovered())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Arc<Node> {
        Node::new(Some(name.to_string()), None, false)
    }

    #[test]
    fn test_attach_sets_parent_and_keeps_order() {
        let root = Node::root();
        let a = Value::new("a", None, 1, None, false).unwrap();
        let b = named("b");
        let c = Value::new("c", None, true, None, false).unwrap();

        root.attach(a.clone()).unwrap();
        root.attach(b.clone()).unwrap();
        root.attach(c).unwrap();

        let names: Vec<_> = root
            .items()
            .iter()
            .map(|i| i.name().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(Arc::ptr_eq(&a.parent().unwrap(), &root));
        assert!(Arc::ptr_eq(&b.parent().unwrap(), &root));
    }

    #[test]
    fn test_duplicate_sibling_name_rejected() {
        let root = named("root");
        root.attach(Value::new("x", None, 1, None, false).unwrap())
            .unwrap();

        let err = root.attach(named("x")).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref name, .. } if name == "x"));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_unnamed_and_empty_names_never_collide() {
        let root = Node::root();
        root.attach(Node::root()).unwrap();
        root.attach(Node::root()).unwrap();
        root.attach(Value::new("", None, 1, None, false).unwrap())
            .unwrap();
        root.attach(Value::new("", None, 2, None, false).unwrap())
            .unwrap();
        assert_eq!(root.len(), 4);
    }

    #[test]
    fn test_reparenting_rejected() {
        let first = named("first");
        let second = named("second");
        let value = Value::new("v", None, 0, None, false).unwrap();

        first.attach(value.clone()).unwrap();
        let err = second.attach(value.clone()).unwrap_err();
        assert!(matches!(err, Error::AlreadyAttached(_)));
        assert!(second.is_empty());
        assert!(Arc::ptr_eq(&value.parent().unwrap(), &first));
    }

    #[test]
    fn test_cycles_rejected() {
        let root = named("root");
        let child = named("child");
        root.attach(child.clone()).unwrap();

        assert!(matches!(
            root.attach(root.clone()),
            Err(Error::AlreadyAttached(_))
        ));
        assert!(matches!(
            child.attach(root.clone()),
            Err(Error::AlreadyAttached(_))
        ));
    }

    #[test]
    fn test_paths_and_lookup() {
        let root = Node::root();
        let network = named("network");
        let port = Value::new("port", None, 8080_u16, None, false).unwrap();
        network.attach(port.clone()).unwrap();
        root.attach(network.clone()).unwrap();

        assert_eq!(root.path(), "");
        assert_eq!(network.path(), "network");
        assert_eq!(port.path(), "network.port");

        let found = root.value::<u16>("network.port").unwrap();
        assert!(Arc::ptr_eq(&found, &port));
        assert!(root.node("network").is_some());
        assert!(root.resolve("network.port.extra").is_none());
        assert!(root.resolve("").is_none());
    }

    #[test]
    fn test_typed_lookup_errors() {
        let root = Node::root();
        let network = named("network");
        network
            .attach(Value::new("port", None, 8080_u16, None, false).unwrap())
            .unwrap();
        root.attach(network).unwrap();

        assert!(root.value::<u16>("network.host").unwrap_err().is_not_found());
        assert!(matches!(
            root.value::<String>("network.port"),
            Err(Error::TypeMismatch { ref actual, .. }) if actual == "u16"
        ));
        assert!(matches!(
            root.value::<u16>("network"),
            Err(Error::TypeMismatch { ref actual, .. }) if actual == "node"
        ));
    }

    #[test]
    fn test_walk_is_depth_first() {
        let root = Node::root();
        let a = named("a");
        a.attach(Value::new("a1", None, 1, None, false).unwrap())
            .unwrap();
        root.attach(a).unwrap();
        root.attach(Value::new("b", None, 2, None, false).unwrap())
            .unwrap();

        let mut seen = Vec::new();
        root.walk(|item, depth| seen.push((item.path(), depth)));

        assert_eq!(
            seen,
            vec![
                ("a".to_string(), 1),
                ("a.a1".to_string(), 2),
                ("b".to_string(), 1)
            ]
        );
    }
}
