// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: storage, structure, accessors, observers.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Size, Vec2};
use log::{debug, warn};
use orrery_hit::HitParams;

use crate::color::Rgba8;
use crate::error::SceneError;
use crate::node::{Node, Resolved};
use crate::observer::{NodeEvent, Subscription};
use crate::types::{DirtyFlags, NodeFlags, NodeId, NodeKind};
use crate::unit::UnitValue;

/// A retained tree of scene nodes.
///
/// Nodes live in an arena and are addressed by generational [`NodeId`]s.
/// Local state is changed through [`Tree::edit`]; changes do **not** affect
/// the resolved outputs until the node is visited by [`Tree::update`], which
/// re-resolves only the properties whose dirty flag is set, parents before
/// children.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Size};
/// use orrery_tree::{FrameContext, NodeKind, Tree, UnitValue, UpdateScope};
///
/// let mut tree = Tree::new(Size::new(800.0, 600.0));
/// let root = tree.insert(None, NodeKind::Container);
/// tree.edit(root).set_position(100.0, 50.0).set_size(200.0, 200.0);
///
/// let panel = tree.insert(Some(root), NodeKind::Box);
/// tree.edit(panel)
///     .set_x(UnitValue::percent(0.5))
///     .set_size(UnitValue::percent(0.25), 20.0);
///
/// // Changes only take effect after update.
/// tree.update(root, &FrameContext::new(Size::new(800.0, 600.0)), UpdateScope::Subtree);
///
/// let out = tree.resolved(panel).unwrap();
/// assert_eq!(out.origin, Point::new(200.0, 50.0));
/// assert_eq!(out.size, Size::new(50.0, 20.0));
/// ```
pub struct Tree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// Reference extent for percent values on root nodes.
    pub(crate) viewport: Size,
    pub(crate) hit_params: HitParams,
    next_subscription: u64,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl Tree {
    /// Create an empty tree whose root nodes resolve percent values against
    /// `viewport`.
    pub fn new(viewport: Size) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            viewport,
            hit_params: HitParams::default(),
            next_subscription: 0,
        }
    }

    /// Reference extent used for percent values on root nodes.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Change the viewport.
    ///
    /// Roots are marked size- and position-dirty so percent-based roots
    /// follow on the next update. [`Tree::update`] calls this with the
    /// frame's viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        if self.viewport == viewport {
            return;
        }
        debug!("viewport {:?} -> {:?}", self.viewport, viewport);
        self.viewport = viewport;
        for node in self.nodes.iter_mut().flatten() {
            if node.parent.is_none() {
                node.dirty |= DirtyFlags::SIZE | DirtyFlags::POSITION;
            }
        }
    }

    /// Tolerance applied to hover hit tests.
    pub fn set_hit_params(&mut self, params: HitParams) {
        self.hit_params = params;
    }

    /// Insert a new node of `kind` as the last child of `parent` (or as a
    /// root if `None`).
    ///
    /// The node starts with default local state and every dirty flag set;
    /// its outputs are computed on the next [`Tree::update`] that reaches it.
    pub fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, kind)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        id
    }

    /// Destroy a node and its whole subtree.
    ///
    /// The node is detached from its parent, every descendant is destroyed,
    /// and all observers are dropped. Every affected [`NodeId`] is stale
    /// afterwards. Disposing a stale id does nothing.
    pub fn dispose(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let mut stack = alloc::vec![id];
        let mut count = 0_usize;
        while let Some(current) = stack.pop() {
            let Some(mut node) = self.nodes[current.idx()].take() else {
                unreachable!("children of a live node are live");
            };
            stack.extend(node.children.iter().copied());
            node.observers.clear();
            self.free_list.push(current.idx());
            count += 1;
        }
        debug!("disposed {id:?} ({count} nodes)");
    }

    /// Move `id` under `new_parent`, or detach it with `None`.
    ///
    /// Re-attaching to the current parent is a no-op. Otherwise the node is
    /// appended to the new parent's children and all four of its dirty flags
    /// are set; descendants follow when the node re-resolves.
    ///
    /// Returns [`SceneError::WouldCreateCycle`] if `new_parent` is `id`
    /// itself or one of its descendants; the tree is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if either id is stale.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        let old_parent = self.node(id).parent;
        if old_parent == new_parent {
            return Ok(());
        }
        if let Some(p) = new_parent {
            assert!(self.is_alive(p), "dangling NodeId");
            if self.is_ancestor_or_self(id, p) {
                warn!("rejected reparent of {id:?} under its descendant {p:?}");
                return Err(SceneError::WouldCreateCycle {
                    node: id,
                    parent: p,
                });
            }
        }
        if let Some(old) = old_parent {
            self.unlink_parent(id, old);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.node_mut(id).dirty = DirtyFlags::all();
        debug!("reparented {id:?}: {old_parent:?} -> {new_parent:?}");
        Ok(())
    }

    /// Append `child` to `parent`, taking it from its previous parent if any.
    ///
    /// Adding a node that is already a child of `parent` changes nothing.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.set_parent(child, Some(parent))
    }

    /// Append several children in order. Stops at the first failure.
    pub fn add_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<(), SceneError> {
        for &child in children {
            self.add_child(parent, child)?;
        }
        Ok(())
    }

    /// Detach `child` from `parent`. Does nothing if it is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.contains_child(parent, child) {
            self.detach(child);
        }
    }

    /// Detach every child of `parent`, keeping them alive as roots.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        let children = self.node(parent).children.clone();
        for child in children {
            self.detach(child);
        }
    }

    /// Returns `true` if `child` is a direct child of `parent`.
    pub fn contains_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.is_alive(child) && self.parent_of(child) == Some(parent)
    }

    /// Subscribe `callback` to `event` on node `id`.
    ///
    /// Observers run synchronously, in registration order, while the node
    /// resolves the matching property or evaluates interaction.
    pub fn subscribe(
        &mut self,
        id: NodeId,
        event: NodeEvent,
        callback: impl FnMut() + 'static,
    ) -> Subscription {
        let key = self.next_subscription;
        self.next_subscription += 1;
        self.node_mut(id)
            .observers
            .add(event, key, Box::new(callback))
    }

    /// Remove an observer. Returns `false` if it was already gone or the
    /// node is stale.
    pub fn unsubscribe(&mut self, id: NodeId, subscription: Subscription) -> bool {
        self.node_opt_mut(id)
            .is_some_and(|n| n.observers.remove(subscription))
    }

    /// Number of observers registered for `event` on a live node.
    pub fn observer_count(&self, id: NodeId, event: NodeEvent) -> usize {
        self.node_opt(id).map_or(0, |n| n.observers.len(event))
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|node| node.parent)
    }

    /// Get the children of a node in paint order, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |node| &node.children)
    }

    /// Live nodes without a parent, in slot order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    /// Kind of a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node_opt(id).map(|n| n.kind)
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|n| n.flags)
    }

    /// Which resolved outputs of a live node are stale.
    pub fn dirty_flags(&self, id: NodeId) -> Option<DirtyFlags> {
        self.node_opt(id).map(|n| n.dirty)
    }

    /// Resolved outputs of a live node as of its last update.
    pub fn resolved(&self, id: NodeId) -> Option<Resolved> {
        self.node_opt(id).map(|n| n.resolved)
    }

    // --- on-demand accessors of local state ---

    /// Extent that percent values of `id` resolve against: the parent's last
    /// resolved base size, or the viewport for roots.
    pub fn reference_extent(&self, id: NodeId) -> Option<Size> {
        let node = self.node_opt(id)?;
        Some(match node.parent {
            Some(p) => self.node(p).resolved.base_size,
            None => self.viewport,
        })
    }

    fn resolve_local(&self, id: NodeId, pick: impl Fn(&Node, Size) -> f64) -> Option<f64> {
        let extent = self.reference_extent(id)?;
        Some(pick(self.node(id), extent))
    }

    /// Horizontal offset in pixels.
    pub fn x(&self, id: NodeId) -> Option<f64> {
        self.resolve_local(id, |n, e| n.local.offset_x.resolve(e.width))
    }

    /// Vertical offset in pixels.
    pub fn y(&self, id: NodeId) -> Option<f64> {
        self.resolve_local(id, |n, e| n.local.offset_y.resolve(e.height))
    }

    /// Own width in pixels, before scaling.
    pub fn width(&self, id: NodeId) -> Option<f64> {
        self.resolve_local(id, |n, e| n.local.width.resolve(e.width))
    }

    /// Own height in pixels, before scaling.
    pub fn height(&self, id: NodeId) -> Option<f64> {
        self.resolve_local(id, |n, e| n.local.height.resolve(e.height))
    }

    /// Stored horizontal offset with its unit.
    pub fn offset_x_value(&self, id: NodeId) -> Option<UnitValue> {
        self.node_opt(id).map(|n| n.local.offset_x)
    }

    /// Stored vertical offset with its unit.
    pub fn offset_y_value(&self, id: NodeId) -> Option<UnitValue> {
        self.node_opt(id).map(|n| n.local.offset_y)
    }

    /// Stored width with its unit.
    pub fn width_value(&self, id: NodeId) -> Option<UnitValue> {
        self.node_opt(id).map(|n| n.local.width)
    }

    /// Stored height with its unit.
    pub fn height_value(&self, id: NodeId) -> Option<UnitValue> {
        self.node_opt(id).map(|n| n.local.height)
    }

    /// Local scale factors.
    pub fn scale(&self, id: NodeId) -> Option<Vec2> {
        self.node_opt(id).map(|n| n.local.scale)
    }

    /// Local rotation in radians.
    pub fn angle(&self, id: NodeId) -> Option<f64> {
        self.node_opt(id).map(|n| n.local.angle)
    }

    /// Local rotation in degrees.
    pub fn angle_degrees(&self, id: NodeId) -> Option<f64> {
        self.angle(id).map(f64::to_degrees)
    }

    /// Rotation origin as a fraction of own size.
    pub fn rotation_origin(&self, id: NodeId) -> Option<Vec2> {
        self.node_opt(id).map(|n| n.local.rotation_origin)
    }

    /// Alignment origin as a fraction of own size.
    pub fn align(&self, id: NodeId) -> Option<Vec2> {
        self.node_opt(id).map(|n| n.local.align)
    }

    /// Local opacity.
    pub fn opacity(&self, id: NodeId) -> Option<f64> {
        self.node_opt(id).map(|n| n.local.opacity)
    }

    /// Local tint; the outer `None` means the id is stale.
    pub fn tint(&self, id: NodeId) -> Option<Option<Rgba8>> {
        self.node_opt(id).map(|n| n.local.tint)
    }

    /// Local depth.
    pub fn depth(&self, id: NodeId) -> Option<f64> {
        self.node_opt(id).map(|n| n.local.depth)
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.node_opt(id).expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.node_opt_mut(id).expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Returns `true` if `ancestor` is `node` or lies on its parent chain.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Returns `true` if any proper ancestor of `id` is invisible or has
    /// zero resolved opacity.
    pub(crate) fn hidden_by_ancestors(&self, id: NodeId) -> bool {
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            let node = self.node(p);
            if !node.is_shown() {
                return true;
            }
            current = node.parent;
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        let Ok(()) = self.set_parent(child, None) else {
            unreachable!("detaching cannot create a cycle");
        };
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}
