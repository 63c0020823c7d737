//! Node arena and tree mutation.

use std::fmt;

use flexkit_style::Style;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::cache::LayoutCache;
use crate::measure::{Baseline, Measure};
use crate::{Layout, LayoutConfig, LayoutError, Rect, Result};

new_key_type! {
    /// Handle to a node in a [`LayoutTree`].
    pub struct NodeId;
}

pub(crate) type ChildList = SmallVec<[NodeId; 4]>;

/// Storage for one node.
pub(crate) struct NodeData {
    pub(crate) style: Style,
    pub(crate) children: ChildList,
    /// Non-owning back-reference, used for dirty propagation.
    pub(crate) parent: Option<NodeId>,
    pub(crate) measure: Option<Box<dyn Measure>>,
    pub(crate) baseline: Option<Box<dyn Baseline>>,
    /// Result of the last layout pass before pixel rounding.
    pub(crate) unrounded: Layout,
    /// Result after pixel rounding.
    pub(crate) layout: Layout,
    pub(crate) cache: LayoutCache,
    pub(crate) dirty: bool,
    pub(crate) computing: bool,
}

impl NodeData {
    fn new(style: Style) -> Self {
        Self {
            style,
            children: ChildList::new(),
            parent: None,
            measure: None,
            baseline: None,
            unrounded: Layout::default(),
            layout: Layout::default(),
            cache: LayoutCache::new(),
            dirty: true,
            computing: false,
        }
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeData")
            .field("style", &self.style)
            .field("children", &self.children)
            .field("parent", &self.parent)
            .field("measured", &self.measure.is_some())
            .field("layout", &self.layout)
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// A tree of layout nodes.
///
/// Nodes are created detached and linked with [`LayoutTree::add_child`].
/// Any node can serve as the root of [`LayoutTree::compute_layout`].
#[derive(Debug, Default)]
pub struct LayoutTree {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    pub(crate) config: LayoutConfig,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            config,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node.
    pub fn new_node(&mut self, style: Style) -> Result<NodeId> {
        validate(&style)?;
        let id = self.nodes.insert(NodeData::new(style));
        trace!(?id, "Node created");
        Ok(id)
    }

    /// Create a detached leaf whose content is sized by `measure`.
    pub fn new_leaf_with_measure<M>(&mut self, style: Style, measure: M) -> Result<NodeId>
    where
        M: Measure + 'static,
    {
        let id = self.new_node(style)?;
        self.node_mut(id)?.measure = Some(Box::new(measure));
        Ok(id)
    }

    /// Remove a node. Its children are detached and stay in the tree.
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if let Some(parent) = self.node(node)?.parent {
            self.remove_child(parent, node)?;
        }
        let data = self
            .nodes
            .remove(node)
            .ok_or(LayoutError::NodeNotFound(node))?;
        for child in data.children {
            if let Some(child) = self.nodes.get_mut(child) {
                child.parent = None;
            }
        }
        debug!(?node, "Node removed");
        Ok(())
    }

    /// Append `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.child_count(parent)?;
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` in `parent`'s children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_attach(parent, child)?;
        let count = self.child_count(parent)?;
        if index > count {
            return Err(LayoutError::InvalidTree(format!(
                "child index {} out of bounds ({} children)",
                index, count
            )));
        }
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mark_dirty(parent)
    }

    /// Detach `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        let children = &mut self.node_mut(parent)?.children;
        let index = children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| LayoutError::InvalidTree(format!("{:?} is not a child of {:?}", child, parent)))?;
        children.remove(index);
        self.node_mut(child)?.parent = None;
        self.mark_dirty(parent)
    }

    /// Replace all children of `parent`.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for (i, &child) in children.iter().enumerate() {
            if children[..i].contains(&child) {
                return Err(LayoutError::InvalidTree(format!(
                    "{:?} listed twice",
                    child
                )));
            }
            if self.node(child)?.parent == Some(parent) {
                continue;
            }
            self.check_attach(parent, child)?;
        }

        let old = std::mem::take(&mut self.node_mut(parent)?.children);
        for child in old {
            if let Some(data) = self.nodes.get_mut(child) {
                data.parent = None;
            }
        }
        for &child in children {
            self.node_mut(child)?.parent = Some(parent);
        }
        self.node_mut(parent)?.children = children.iter().copied().collect();
        self.mark_dirty(parent)
    }

    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(node)?.children)
    }

    pub fn child_count(&self, node: NodeId) -> Result<usize> {
        Ok(self.node(node)?.children.len())
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    pub fn style(&self, node: NodeId) -> Result<&Style> {
        Ok(&self.node(node)?.style)
    }

    /// Replace a node's style. Rejects styles that fail validation.
    pub fn set_style(&mut self, node: NodeId, style: Style) -> Result<()> {
        validate(&style)?;
        let data = self.node_mut(node)?;
        if data.style == style {
            return Ok(());
        }
        data.style = style;
        self.mark_dirty(node)
    }

    /// Attach a measurement callback, turning the node into a measured leaf.
    pub fn set_measure<M>(&mut self, node: NodeId, measure: M) -> Result<()>
    where
        M: Measure + 'static,
    {
        let data = self.node_mut(node)?;
        if !data.children.is_empty() {
            return Err(LayoutError::InvalidTree(format!(
                "{:?} has children and cannot be measured",
                node
            )));
        }
        data.measure = Some(Box::new(measure));
        self.mark_dirty(node)
    }

    pub fn clear_measure(&mut self, node: NodeId) -> Result<()> {
        self.node_mut(node)?.measure = None;
        self.mark_dirty(node)
    }

    pub fn is_measured(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.measure.is_some())
    }

    /// Attach a baseline callback.
    pub fn set_baseline<B>(&mut self, node: NodeId, baseline: B) -> Result<()>
    where
        B: Baseline + 'static,
    {
        self.node_mut(node)?.baseline = Some(Box::new(baseline));
        self.mark_dirty(node)
    }

    /// Mark a node and all of its ancestors dirty, dropping their caches.
    pub fn mark_dirty(&mut self, node: NodeId) -> Result<()> {
        let mut current = Some(node);
        while let Some(id) = current {
            let data = self.node_mut(id)?;
            data.dirty = true;
            data.cache.clear();
            current = data.parent;
        }
        trace!(?node, "Marked dirty");
        Ok(())
    }

    pub fn is_dirty(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.dirty)
    }

    /// Computed layout of a node, after pixel rounding.
    pub fn layout(&self, node: NodeId) -> Result<&Layout> {
        Ok(&self.node(node)?.layout)
    }

    /// Computed layout of a node, before pixel rounding.
    pub fn unrounded_layout(&self, node: NodeId) -> Result<&Layout> {
        Ok(&self.node(node)?.unrounded)
    }

    /// Border box of a node in the coordinate space of its topmost ancestor.
    pub fn absolute_rect(&self, node: NodeId) -> Result<Rect> {
        let data = self.node(node)?;
        let mut rect = data.layout.border_box();
        let mut current = data.parent;
        while let Some(id) = current {
            let ancestor = self.node(id)?;
            let content = ancestor.layout.content_box();
            rect.x += content.x;
            rect.y += content.y;
            current = ancestor.parent;
        }
        Ok(rect)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(id).ok_or(LayoutError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_data = self.node(parent)?;
        let child_data = self.node(child)?;

        if parent == child {
            return Err(LayoutError::InvalidTree(format!(
                "{:?} cannot be its own child",
                child
            )));
        }
        if let Some(existing) = child_data.parent {
            return Err(LayoutError::InvalidTree(format!(
                "{:?} already has parent {:?}",
                child, existing
            )));
        }
        if parent_data.measure.is_some() {
            return Err(LayoutError::InvalidTree(format!(
                "{:?} is a measured leaf and cannot have children",
                parent
            )));
        }

        let mut ancestor = parent_data.parent;
        while let Some(id) = ancestor {
            if id == child {
                return Err(LayoutError::InvalidTree(format!(
                    "attaching {:?} under {:?} would create a cycle",
                    child, parent
                )));
            }
            ancestor = self.node(id)?.parent;
        }
        Ok(())
    }
}

fn validate(style: &Style) -> Result<()> {
    style
        .validate()
        .map_err(|e| LayoutError::InvalidTree(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeasureMode, Size};
    use flexkit_style::Length;

    #[test]
    fn test_add_and_remove_children() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node(Style::default()).unwrap();
        let a = tree.new_node(Style::default()).unwrap();
        let b = tree.new_node(Style::default()).unwrap();

        tree.add_child(root, a).unwrap();
        tree.insert_child(root, 0, b).unwrap();
        assert_eq!(tree.children(root).unwrap(), &[b, a]);
        assert_eq!(tree.parent(a).unwrap(), Some(root));

        tree.remove_child(root, b).unwrap();
        assert_eq!(tree.children(root).unwrap(), &[a]);
        assert_eq!(tree.parent(b).unwrap(), None);
    }

    #[test]
    fn test_reject_second_parent() {
        let mut tree = LayoutTree::new();
        let p1 = tree.new_node(Style::default()).unwrap();
        let p2 = tree.new_node(Style::default()).unwrap();
        let child = tree.new_node(Style::default()).unwrap();

        tree.add_child(p1, child).unwrap();
        assert!(matches!(
            tree.add_child(p2, child),
            Err(LayoutError::InvalidTree(_))
        ));
    }

    #[test]
    fn test_reject_cycle() {
        let mut tree = LayoutTree::new();
        let a = tree.new_node(Style::default()).unwrap();
        let b = tree.new_node(Style::default()).unwrap();
        let c = tree.new_node(Style::default()).unwrap();

        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();
        assert!(matches!(tree.add_child(c, a), Err(LayoutError::InvalidTree(_))));
        assert!(matches!(tree.add_child(a, a), Err(LayoutError::InvalidTree(_))));
    }

    #[test]
    fn test_reject_children_on_measured_leaf() {
        let mut tree = LayoutTree::new();
        let leaf = tree
            .new_leaf_with_measure(
                Style::default(),
                |_: NodeId, _: MeasureMode, _: MeasureMode| Size::new(10.0, 10.0),
            )
            .unwrap();
        let child = tree.new_node(Style::default()).unwrap();

        assert!(matches!(
            tree.add_child(leaf, child),
            Err(LayoutError::InvalidTree(_))
        ));

        tree.clear_measure(leaf).unwrap();
        assert!(!tree.is_measured(leaf).unwrap());
        tree.add_child(leaf, child).unwrap();
    }

    #[test]
    fn test_reject_invalid_style() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node(Style::default()).unwrap();
        let bad = Style {
            height: Length::Px(-1.0),
            ..Style::default()
        };
        assert!(matches!(
            tree.set_style(node, bad.clone()),
            Err(LayoutError::InvalidTree(_))
        ));
        assert!(tree.new_node(bad).is_err());
    }

    #[test]
    fn test_stale_handle() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node(Style::default()).unwrap();
        tree.remove_node(node).unwrap();
        assert_eq!(tree.style(node).err(), Some(LayoutError::NodeNotFound(node)));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_node_detaches_children() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node(Style::default()).unwrap();
        let mid = tree.new_node(Style::default()).unwrap();
        let leaf = tree.new_node(Style::default()).unwrap();
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();

        tree.remove_node(mid).unwrap();
        assert_eq!(tree.child_count(root).unwrap(), 0);
        assert_eq!(tree.parent(leaf).unwrap(), None);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_set_children_replaces() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node(Style::default()).unwrap();
        let a = tree.new_node(Style::default()).unwrap();
        let b = tree.new_node(Style::default()).unwrap();
        let c = tree.new_node(Style::default()).unwrap();

        tree.set_children(root, &[a, b]).unwrap();
        tree.set_children(root, &[c, a]).unwrap();
        assert_eq!(tree.children(root).unwrap(), &[c, a]);
        assert_eq!(tree.parent(b).unwrap(), None);
        assert_eq!(tree.parent(c).unwrap(), Some(root));

        assert!(tree.set_children(root, &[b, b]).is_err());
    }

    #[test]
    fn test_mark_dirty_propagates_to_ancestors() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node(Style::default()).unwrap();
        let mid = tree.new_node(Style::default()).unwrap();
        let leaf = tree.new_node(Style::default()).unwrap();
        let sibling = tree.new_node(Style::default()).unwrap();
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        tree.add_child(root, sibling).unwrap();

        for node in [root, mid, leaf, sibling] {
            tree.node_mut(node).unwrap().dirty = false;
        }

        tree.mark_dirty(leaf).unwrap();
        assert!(tree.is_dirty(leaf).unwrap());
        assert!(tree.is_dirty(mid).unwrap());
        assert!(tree.is_dirty(root).unwrap());
        assert!(!tree.is_dirty(sibling).unwrap());
    }
}
