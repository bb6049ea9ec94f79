/*!
 * Render Tree
 * Minimal element tree with one root container per application
 */

use crate::core::limits::{APP_ROOT_ATTRIBUTE, INLINE_HANDLER_PREFIX, INTERACTIVE_TAGS};
use crate::core::types::{AppId, NodeId};
use crate::core::InlineString;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// One rendered element
#[derive(Debug, Clone)]
pub struct Element {
    pub id: NodeId,
    pub tag: InlineString,
    pub attributes: HashMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Element {
    /// Interactive control or element with an inline `on*` handler
    pub fn is_interactive(&self) -> bool {
        INTERACTIVE_TAGS.contains(&self.tag.as_str())
            || self
                .attributes
                .keys()
                .any(|name| name.starts_with(INLINE_HANDLER_PREFIX))
    }
}

#[derive(Default)]
struct TreeInner {
    nodes: HashMap<NodeId, Element>,
    app_roots: HashMap<AppId, NodeId>,
    next_id: NodeId,
}

impl TreeInner {
    fn insert(&mut self, tag: &str, parent: Option<NodeId>) -> NodeId {
        self.next_id += 1;
        let id = self.next_id;
        self.nodes.insert(
            id,
            Element {
                id,
                tag: tag.to_ascii_lowercase().into(),
                attributes: HashMap::new(),
                parent,
                children: Vec::new(),
            },
        );
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.push(id);
            }
        }
        id
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(&root)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(id);
                stack.extend(node.children.iter().copied());
            }
        }
        out
    }

    /// Detach and drop a node with its subtree
    fn remove_subtree(&mut self, id: NodeId) -> usize {
        let parent = match self.nodes.get(&id) {
            Some(node) => node.parent,
            None => return 0,
        };
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in &doomed {
            self.nodes.remove(node);
        }
        doomed.len()
    }
}

/// Shared render tree handle
#[derive(Clone, Default)]
pub struct ElementTree {
    inner: Arc<RwLock<TreeInner>>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or return) the root container for an application
    pub fn mount_app_root(&self, app: &AppId) -> NodeId {
        let mut inner = self.inner.write();
        if let Some(&root) = inner.app_roots.get(app) {
            return root;
        }
        let root = inner.insert("div", None);
        if let Some(node) = inner.nodes.get_mut(&root) {
            node.attributes
                .insert(APP_ROOT_ATTRIBUTE.to_string(), app.to_string());
        }
        inner.app_roots.insert(app.clone(), root);
        debug!("Mounted root container {} for {}", root, app);
        root
    }

    /// Remove an application's root container and everything under it
    pub fn unmount_app(&self, app: &AppId) -> usize {
        let mut inner = self.inner.write();
        match inner.app_roots.remove(app) {
            Some(root) => inner.remove_subtree(root),
            None => 0,
        }
    }

    pub fn app_root(&self, app: &AppId) -> Option<NodeId> {
        self.inner.read().app_roots.get(app).copied()
    }

    /// Append a child element. `None` when the parent does not exist.
    pub fn append(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        let mut inner = self.inner.write();
        if !inner.nodes.contains_key(&parent) {
            return None;
        }
        Some(inner.insert(tag, Some(parent)))
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> bool {
        match self.inner.write().nodes.get_mut(&node) {
            Some(el) => {
                el.attributes.insert(name.to_ascii_lowercase(), value.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove a node and its subtree. Returns elements removed.
    pub fn remove(&self, node: NodeId) -> usize {
        self.inner.write().remove_subtree(node)
    }

    pub fn get(&self, node: NodeId) -> Option<Element> {
        self.inner.read().nodes.get(&node).cloned()
    }

    /// Elements under the application's root container, root excluded
    pub fn count_descendants(&self, app: &AppId) -> Option<usize> {
        let inner = self.inner.read();
        let root = *inner.app_roots.get(app)?;
        Some(inner.descendants(root).len())
    }

    /// Interactive elements under the application's root container
    pub fn count_interactive(&self, app: &AppId) -> Option<usize> {
        let inner = self.inner.read();
        let root = *inner.app_roots.get(app)?;
        Some(
            inner
                .descendants(root)
                .iter()
                .filter_map(|id| inner.nodes.get(id))
                .filter(|el| el.is_interactive())
                .count(),
        )
    }

    pub fn total_elements(&self) -> usize {
        self.inner.read().nodes.len()
    }
}
