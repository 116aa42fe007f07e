// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame input and hover/press edge detection.

use kurbo::{Point, Size};
use orrery_hit::{HitTest, InscribedEllipse};

use crate::node::InteractionState;
use crate::observer::NodeEvent;
use crate::tree::Tree;
use crate::types::{NodeFlags, NodeId, NodeKind};

/// Pointer sample consumed by one update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Position in viewport pixels.
    pub position: Point,
    /// Whether pointer events reach the scene at all this frame.
    ///
    /// When `false`, every node behaves as if the pointer were outside it.
    pub propagate: bool,
    /// Whether the primary button is held.
    pub primary_pressed: bool,
}

impl PointerState {
    /// A propagating pointer at `position` with no buttons held.
    pub const fn at(position: Point) -> Self {
        Self {
            position,
            propagate: true,
            primary_pressed: false,
        }
    }
}

/// Everything one frame of [`Tree::update`] reads from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame.
    pub delta: f64,
    /// Reference extent for percent values on roots.
    pub viewport: Size,
    /// Pointer sample.
    pub pointer: PointerState,
}

impl FrameContext {
    /// A frame with the given viewport, zero delta, and no pointer input.
    pub const fn new(viewport: Size) -> Self {
        Self {
            delta: 0.0,
            viewport,
            pointer: PointerState {
                position: Point::ORIGIN,
                propagate: false,
                primary_pressed: false,
            },
        }
    }

    /// Set the frame delta in seconds.
    pub const fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Set the pointer sample.
    pub const fn with_pointer(mut self, pointer: PointerState) -> Self {
        self.pointer = pointer;
        self
    }
}

impl Tree {
    /// Returns `true` if `point` lies on the node's last resolved shape.
    ///
    /// Containers use their axis-aligned bounds. Boxes and lines are tested
    /// as rotated rectangles, circles as the ellipse inscribed in their
    /// rotated box. Stale ids never hit.
    pub fn hit_test_node(&self, id: NodeId, point: Point) -> bool {
        let Some(node) = self.node_opt(id) else {
            return false;
        };
        let params = &self.hit_params;
        let resolved = &node.resolved;
        match node.kind {
            NodeKind::Container => resolved.bounds().hit_test(point, params),
            NodeKind::Box | NodeKind::Line => resolved.rotated_rect().hit_test(point, params),
            NodeKind::Circle => InscribedEllipse(resolved.rotated_rect()).hit_test(point, params),
        }
    }

    /// Returns `true` if the pointer was over the node during its last update.
    pub fn is_hovered(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(|n| n.interaction.hovered)
    }

    /// Evaluate hover and press edges for one node and fire its observers.
    ///
    /// The node counts as "outside" unless it is interactive, shown, and not
    /// under a hidden ancestor, which is the same rule [`Tree::render`] uses.
    pub(crate) fn update_interaction(
        &mut self,
        id: NodeId,
        pointer: &PointerState,
        ancestors_hidden: bool,
    ) {
        let node = self.node(id);
        let inside = pointer.propagate
            && !ancestors_hidden
            && node.is_shown()
            && node.flags.contains(NodeFlags::INTERACTIVE)
            && self.hit_test_node(id, pointer.position);
        let down = pointer.primary_pressed;

        let node = self.node_mut(id);
        let InteractionState {
            hovered: was_hovered,
            pressed: was_pressed,
            button_down: was_down,
        } = node.interaction;
        let press = inside && down && !was_down;
        let release = inside && !down && was_pressed;
        node.interaction = InteractionState {
            hovered: inside,
            pressed: inside && down && (was_pressed || press),
            button_down: down,
        };

        if inside {
            if !was_hovered {
                node.observers.emit(NodeEvent::HoverEnter);
            }
            node.observers.emit(NodeEvent::Hover);
            if press {
                node.observers.emit(NodeEvent::Press);
            } else if release {
                node.observers.emit(NodeEvent::Release);
            }
        } else if was_hovered {
            node.observers.emit(NodeEvent::HoverExit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpdateScope;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::f64::consts::FRAC_PI_4;

    const VIEWPORT: Size = Size::new(400.0, 400.0);

    type Log = Rc<RefCell<Vec<NodeEvent>>>;

    fn record(tree: &mut Tree, id: NodeId, log: &Log) {
        for event in [
            NodeEvent::HoverEnter,
            NodeEvent::Hover,
            NodeEvent::HoverExit,
            NodeEvent::Press,
            NodeEvent::Release,
        ] {
            let log = log.clone();
            tree.subscribe(id, event, move || log.borrow_mut().push(event));
        }
    }

    fn at(x: f64, y: f64) -> FrameContext {
        FrameContext::new(VIEWPORT).with_pointer(PointerState::at(Point::new(x, y)))
    }

    fn interactive_box(tree: &mut Tree, kind: NodeKind) -> NodeId {
        let id = tree.insert(None, kind);
        tree.edit(id)
            .set_position(10.0, 10.0)
            .set_size(20.0, 20.0)
            .set_interactive(true);
        id
    }

    #[test]
    fn hover_edges() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Box);
        let log: Log = Rc::default();
        record(&mut tree, id, &log);

        tree.update(id, &at(0.0, 0.0), UpdateScope::Subtree);
        assert!(log.borrow().is_empty());

        tree.update(id, &at(15.0, 15.0), UpdateScope::Subtree);
        tree.update(id, &at(16.0, 15.0), UpdateScope::Subtree);
        tree.update(id, &at(50.0, 50.0), UpdateScope::Subtree);
        tree.update(id, &at(60.0, 50.0), UpdateScope::Subtree);
        assert_eq!(
            *log.borrow(),
            [
                NodeEvent::HoverEnter,
                NodeEvent::Hover,
                NodeEvent::Hover,
                NodeEvent::HoverExit,
            ]
        );
    }

    #[test]
    fn non_interactive_nodes_never_hover() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Box);
        tree.edit(id).set_interactive(false);
        let log: Log = Rc::default();
        record(&mut tree, id, &log);
        tree.update(id, &at(15.0, 15.0), UpdateScope::Subtree);
        assert!(log.borrow().is_empty());
        assert!(!tree.is_hovered(id));
    }

    #[test]
    fn blocked_propagation_exits() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Box);
        let log: Log = Rc::default();
        record(&mut tree, id, &log);
        tree.update(id, &at(15.0, 15.0), UpdateScope::Subtree);

        let mut blocked = at(15.0, 15.0);
        blocked.pointer.propagate = false;
        tree.update(id, &blocked, UpdateScope::Subtree);
        assert_eq!(log.borrow().last(), Some(&NodeEvent::HoverExit));
    }

    #[test]
    fn press_and_release_while_hovered() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Box);
        let log: Log = Rc::default();
        record(&mut tree, id, &log);

        let mut frame = at(15.0, 15.0);
        tree.update(id, &frame, UpdateScope::Subtree);
        frame.pointer.primary_pressed = true;
        tree.update(id, &frame, UpdateScope::Subtree);
        tree.update(id, &frame, UpdateScope::Subtree);
        frame.pointer.primary_pressed = false;
        tree.update(id, &frame, UpdateScope::Subtree);

        let log = log.borrow();
        let presses = log.iter().filter(|e| **e == NodeEvent::Press).count();
        let releases = log.iter().filter(|e| **e == NodeEvent::Release).count();
        assert_eq!((presses, releases), (1, 1));
    }

    fn count(log: &Log, event: NodeEvent) -> usize {
        log.borrow().iter().filter(|e| **e == event).count()
    }

    #[test]
    fn dragging_in_with_button_held_does_not_press() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Box);
        let log: Log = Rc::default();
        record(&mut tree, id, &log);

        let mut outside = at(100.0, 100.0);
        outside.pointer.primary_pressed = true;
        tree.update(id, &outside, UpdateScope::Subtree);
        let mut inside = at(15.0, 15.0);
        inside.pointer.primary_pressed = true;
        tree.update(id, &inside, UpdateScope::Subtree);
        tree.update(id, &inside, UpdateScope::Subtree);
        assert!(tree.is_hovered(id));
        assert_eq!(count(&log, NodeEvent::Press), 0);

        // The press never started here, so letting go is not a release.
        inside.pointer.primary_pressed = false;
        tree.update(id, &inside, UpdateScope::Subtree);
        assert_eq!(count(&log, NodeEvent::Release), 0);

        // A fresh button-down edge over the node does press.
        inside.pointer.primary_pressed = true;
        tree.update(id, &inside, UpdateScope::Subtree);
        assert_eq!(count(&log, NodeEvent::Press), 1);
    }

    #[test]
    fn leaving_while_pressed_drops_the_release() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Box);
        let log: Log = Rc::default();
        record(&mut tree, id, &log);

        let mut frame = at(15.0, 15.0);
        tree.update(id, &frame, UpdateScope::Subtree);
        frame.pointer.primary_pressed = true;
        tree.update(id, &frame, UpdateScope::Subtree);
        frame.pointer.position = Point::new(100.0, 100.0);
        tree.update(id, &frame, UpdateScope::Subtree);
        frame.pointer.primary_pressed = false;
        tree.update(id, &frame, UpdateScope::Subtree);
        // Back over the node with the button up.
        frame.pointer.position = Point::new(15.0, 15.0);
        tree.update(id, &frame, UpdateScope::Subtree);

        assert_eq!(count(&log, NodeEvent::Press), 1);
        assert_eq!(count(&log, NodeEvent::Release), 0);
        assert_eq!(count(&log, NodeEvent::HoverExit), 1);
    }

    #[test]
    fn hidden_ancestors_block_hover() {
        let mut tree = Tree::new(VIEWPORT);
        let parent = interactive_box(&mut tree, NodeKind::Container);
        let child = tree.insert(Some(parent), NodeKind::Box);
        tree.edit(child).set_size(5.0, 5.0).set_interactive(true);
        let log: Log = Rc::default();
        record(&mut tree, child, &log);

        let frame = at(12.0, 12.0);
        tree.update(parent, &frame, UpdateScope::Subtree);
        assert!(tree.is_hovered(child));

        tree.edit(parent).set_visible(false);
        tree.update(parent, &frame, UpdateScope::Subtree);
        assert!(!tree.is_hovered(child));
        assert!(!tree.is_hovered(parent));
        assert_eq!(log.borrow().last(), Some(&NodeEvent::HoverExit));

        // Updating the child on its own still sees the hidden parent.
        tree.update(child, &frame, UpdateScope::NodeOnly);
        assert!(!tree.is_hovered(child));

        tree.edit(parent).set_visible(true).set_opacity(0.0);
        log.borrow_mut().clear();
        tree.update(parent, &frame, UpdateScope::Subtree);
        tree.update(parent, &frame, UpdateScope::Subtree);
        assert!(log.borrow().is_empty());
        assert!(!tree.is_hovered(child));

        tree.edit(parent).set_opacity(1.0);
        tree.update(parent, &frame, UpdateScope::Subtree);
        assert!(tree.is_hovered(child));
        assert_eq!(log.borrow().first(), Some(&NodeEvent::HoverEnter));
    }

    #[test]
    fn children_resolve_before_parent_interaction() {
        let mut tree = Tree::new(VIEWPORT);
        let parent = interactive_box(&mut tree, NodeKind::Container);
        let child = tree.insert(Some(parent), NodeKind::Box);
        tree.edit(child).set_size(5.0, 5.0).set_interactive(true);

        let order = Rc::new(RefCell::new(Vec::new()));
        let o = order.clone();
        tree.subscribe(parent, NodeEvent::Hover, move || o.borrow_mut().push("parent"));
        let o = order.clone();
        tree.subscribe(child, NodeEvent::Hover, move || o.borrow_mut().push("child"));

        tree.update(parent, &at(12.0, 12.0), UpdateScope::Subtree);
        assert_eq!(*order.borrow(), ["child", "parent"]);
    }

    #[test]
    fn rotated_box_uses_rotated_shape() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Box);
        tree.edit(id).set_rotation_origin_uniform(0.5).unwrap().set_angle(FRAC_PI_4);
        tree.update(id, &FrameContext::new(VIEWPORT), UpdateScope::Subtree);

        // Corner of the unrotated box falls outside the diamond.
        assert!(!tree.hit_test_node(id, Point::new(11.0, 11.0)));
        // Tip of the diamond lies outside the unrotated box.
        assert!(tree.hit_test_node(id, Point::new(20.0, 6.5)));
    }

    #[test]
    fn container_uses_axis_aligned_bounds() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Container);
        tree.update(id, &FrameContext::new(VIEWPORT), UpdateScope::Subtree);
        assert!(tree.hit_test_node(id, Point::new(10.0, 10.0)), "inclusive");
        assert!(tree.hit_test_node(id, Point::new(30.0, 30.0)), "inclusive");
        assert!(!tree.hit_test_node(id, Point::new(30.1, 30.0)));
    }

    #[test]
    fn circle_excludes_box_corners() {
        let mut tree = Tree::new(VIEWPORT);
        let id = interactive_box(&mut tree, NodeKind::Circle);
        tree.update(id, &FrameContext::new(VIEWPORT), UpdateScope::Subtree);
        assert!(tree.hit_test_node(id, Point::new(20.0, 20.0)));
        assert!(!tree.hit_test_node(id, Point::new(11.0, 11.0)));
    }
}
