// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chainable mutation of a node's local state.

use kurbo::{Point, Size};
use log::warn;

use crate::color::Rgba8;
use crate::error::SceneError;
use crate::node::Local;
use crate::tree::Tree;
use crate::types::{Capabilities, DirtyFlags, NodeFlags, NodeId};
use crate::unit::UnitValue;

/// A field of [`Local`] that setters write through [`NodeEditor::apply`].
trait LocalValue: PartialEq {
    fn is_nan(&self) -> bool;
}

impl LocalValue for f64 {
    fn is_nan(&self) -> bool {
        f64::is_nan(*self)
    }
}

impl LocalValue for UnitValue {
    fn is_nan(&self) -> bool {
        self.value.is_nan()
    }
}

impl LocalValue for Option<Rgba8> {
    fn is_nan(&self) -> bool {
        false
    }
}

/// Mutable view of one node, returned by [`Tree::edit`].
///
/// Setters return `&mut Self` so they can be chained. Writing the value a
/// node already holds changes nothing and marks nothing dirty, and NaN
/// writes are ignored. Widths,
/// heights, and scales clamp to zero; opacity and depth clamp to `[0, 1]`.
///
/// ```rust
/// use kurbo::Size;
/// use orrery_tree::{DirtyFlags, FrameContext, NodeKind, Tree, UpdateScope};
///
/// let mut tree = Tree::new(Size::new(640.0, 480.0));
/// let node = tree.insert(None, NodeKind::Box);
/// tree.update(node, &FrameContext::new(Size::new(640.0, 480.0)), UpdateScope::Subtree);
///
/// tree.edit(node).set_opacity(1.0);
/// assert!(tree.dirty_flags(node).unwrap().is_empty());
///
/// tree.edit(node).set_width(25.0).set_height(-3.0).set_angle_degrees(45.0);
/// assert_eq!(tree.width(node), Some(25.0));
/// assert_eq!(tree.height(node), Some(0.0));
/// assert_eq!(tree.dirty_flags(node), Some(DirtyFlags::SIZE | DirtyFlags::POSITION));
/// ```
#[derive(Debug)]
pub struct NodeEditor<'a> {
    tree: &'a mut Tree,
    id: NodeId,
}

impl Tree {
    /// Start editing the local state of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn edit(&mut self, id: NodeId) -> NodeEditor<'_> {
        assert!(self.is_alive(id), "dangling NodeId");
        NodeEditor { tree: self, id }
    }
}

impl NodeEditor<'_> {
    /// The node being edited.
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn apply<T: LocalValue>(
        &mut self,
        dirty: DirtyFlags,
        value: T,
        field: impl FnOnce(&mut Local) -> &mut T,
    ) -> &mut Self {
        if value.is_nan() {
            warn!("ignoring NaN write to node {:?}", self.id);
            return self;
        }
        let node = self.tree.node_mut(self.id);
        let slot = field(&mut node.local);
        if *slot != value {
            *slot = value;
            node.dirty |= dirty;
        }
        self
    }

    fn require(&self, caps: Capabilities, operation: &'static str) -> Result<(), SceneError> {
        let kind = self.tree.node(self.id).kind;
        if kind.supports(caps) {
            return Ok(());
        }
        warn!("{operation} is not supported by {kind:?} node {:?}", self.id);
        Err(SceneError::Unsupported {
            node: self.id,
            kind,
            operation,
        })
    }

    fn extent(&self) -> Size {
        self.tree
            .reference_extent(self.id)
            .unwrap_or(self.tree.viewport)
    }

    // --- position ---

    /// Horizontal offset from the parent's origin.
    pub fn set_x(&mut self, x: impl Into<UnitValue>) -> &mut Self {
        self.apply(DirtyFlags::POSITION, x.into(), |l| &mut l.offset_x)
    }

    /// Vertical offset from the parent's origin.
    pub fn set_y(&mut self, y: impl Into<UnitValue>) -> &mut Self {
        self.apply(DirtyFlags::POSITION, y.into(), |l| &mut l.offset_y)
    }

    /// Both offsets.
    pub fn set_position(&mut self, x: impl Into<UnitValue>, y: impl Into<UnitValue>) -> &mut Self {
        self.set_x(x).set_y(y)
    }

    /// Place the node at a point given in pixels, such as a pointer sample.
    pub fn set_position_at(&mut self, point: Point) -> &mut Self {
        self.set_position(point.x, point.y)
    }

    // --- size ---

    /// Own width before scaling. Negative values clamp to zero.
    pub fn set_width(&mut self, width: impl Into<UnitValue>) -> &mut Self {
        let width = width.into().non_negative();
        self.apply(DirtyFlags::SIZE | DirtyFlags::POSITION, width, |l| {
            &mut l.width
        })
    }

    /// Own height before scaling. Negative values clamp to zero.
    pub fn set_height(&mut self, height: impl Into<UnitValue>) -> &mut Self {
        let height = height.into().non_negative();
        self.apply(DirtyFlags::SIZE | DirtyFlags::POSITION, height, |l| {
            &mut l.height
        })
    }

    /// Width and height.
    pub fn set_size(
        &mut self,
        width: impl Into<UnitValue>,
        height: impl Into<UnitValue>,
    ) -> &mut Self {
        self.set_width(width).set_height(height)
    }

    /// The same value for width and height.
    pub fn set_size_uniform(&mut self, size: impl Into<UnitValue>) -> &mut Self {
        let size = size.into();
        self.set_size(size, size)
    }

    /// Offsets and size in one call.
    pub fn set_dimension(
        &mut self,
        x: impl Into<UnitValue>,
        y: impl Into<UnitValue>,
        width: impl Into<UnitValue>,
        height: impl Into<UnitValue>,
    ) -> &mut Self {
        self.set_position(x, y).set_size(width, height)
    }

    // --- scale ---

    /// Horizontal scale factor. Negative values clamp to zero.
    pub fn set_scale_x(&mut self, sx: f64) -> &mut Self {
        let sx = if sx < 0.0 { 0.0 } else { sx };
        self.apply(DirtyFlags::SIZE | DirtyFlags::POSITION, sx, |l| {
            &mut l.scale.x
        })
    }

    /// Vertical scale factor. Negative values clamp to zero.
    pub fn set_scale_y(&mut self, sy: f64) -> &mut Self {
        let sy = if sy < 0.0 { 0.0 } else { sy };
        self.apply(DirtyFlags::SIZE | DirtyFlags::POSITION, sy, |l| {
            &mut l.scale.y
        })
    }

    /// Both scale factors.
    pub fn set_scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.set_scale_x(sx).set_scale_y(sy)
    }

    // --- rotation ---

    /// Rotation relative to the parent, in radians.
    pub fn set_angle(&mut self, radians: f64) -> &mut Self {
        self.apply(DirtyFlags::POSITION, radians, |l| &mut l.angle)
    }

    /// Rotation relative to the parent, in degrees.
    pub fn set_angle_degrees(&mut self, degrees: f64) -> &mut Self {
        self.set_angle(degrees.to_radians())
    }

    /// Horizontal rotation origin as a fraction of own width.
    ///
    /// Lines pivot on their start point and reject this.
    pub fn set_rotation_origin_x(&mut self, fx: f64) -> Result<&mut Self, SceneError> {
        self.require(Capabilities::ROTATION_ORIGIN, "set_rotation_origin_x")?;
        Ok(self.apply(DirtyFlags::POSITION, fx, |l| &mut l.rotation_origin.x))
    }

    /// Vertical rotation origin as a fraction of own height.
    pub fn set_rotation_origin_y(&mut self, fy: f64) -> Result<&mut Self, SceneError> {
        self.require(Capabilities::ROTATION_ORIGIN, "set_rotation_origin_y")?;
        Ok(self.apply(DirtyFlags::POSITION, fy, |l| &mut l.rotation_origin.y))
    }

    /// Both rotation-origin fractions.
    pub fn set_rotation_origin(&mut self, fx: f64, fy: f64) -> Result<&mut Self, SceneError> {
        self.set_rotation_origin_x(fx)?.set_rotation_origin_y(fy)
    }

    /// The same rotation-origin fraction on both axes.
    pub fn set_rotation_origin_uniform(&mut self, f: f64) -> Result<&mut Self, SceneError> {
        self.set_rotation_origin(f, f)
    }

    // --- alignment ---

    /// Horizontal alignment origin as a fraction of own width.
    pub fn set_align_x(&mut self, fx: f64) -> &mut Self {
        self.apply(DirtyFlags::POSITION, fx, |l| &mut l.align.x)
    }

    /// Vertical alignment origin as a fraction of own height.
    pub fn set_align_y(&mut self, fy: f64) -> &mut Self {
        self.apply(DirtyFlags::POSITION, fy, |l| &mut l.align.y)
    }

    /// Both alignment fractions.
    pub fn set_align(&mut self, fx: f64, fy: f64) -> &mut Self {
        self.set_align_x(fx).set_align_y(fy)
    }

    /// The same alignment fraction on both axes; `0.5` centers on the offset.
    pub fn set_align_uniform(&mut self, f: f64) -> &mut Self {
        self.set_align(f, f)
    }

    // --- appearance ---

    /// Opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) -> &mut Self {
        self.apply(DirtyFlags::OPACITY, opacity.clamp(0.0, 1.0), |l| {
            &mut l.opacity
        })
    }

    /// Tint; `None` inherits the parent's tint unchanged.
    pub fn set_tint(&mut self, tint: impl Into<Option<Rgba8>>) -> &mut Self {
        self.apply(DirtyFlags::COLOR, tint.into(), |l| &mut l.tint)
    }

    /// Draw-order hint, clamped to `[0, 1]`. Not inherited and never resolved.
    pub fn set_depth(&mut self, depth: f64) -> &mut Self {
        self.apply(DirtyFlags::empty(), depth.clamp(0.0, 1.0), |l| {
            &mut l.depth
        })
    }

    /// Whether hover and press events are evaluated for this node.
    pub fn set_interactive(&mut self, interactive: bool) -> &mut Self {
        self.set_flag(NodeFlags::INTERACTIVE, interactive)
    }

    /// Whether the node and its subtree are drawn and hit tested.
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.set_flag(NodeFlags::VISIBLE, visible)
    }

    fn set_flag(&mut self, flag: NodeFlags, on: bool) -> &mut Self {
        self.tree.node_mut(self.id).flags.set(flag, on);
        self
    }

    // --- lines ---

    /// Make a line run from `from` to `to`, both in pixels relative to the
    /// parent's origin.
    ///
    /// Sets the offset to `from`, the width to the segment length, and the
    /// angle to its direction. Only lines support this.
    pub fn set_line_points(&mut self, from: Point, to: Point) -> Result<&mut Self, SceneError> {
        self.require(Capabilities::ENDPOINTS, "set_line_points")?;
        let span = to - from;
        Ok(self
            .set_position_at(from)
            .set_width(span.hypot())
            .set_angle(span.atan2()))
    }

    // --- relative changes ---

    /// Add to the horizontal offset; see [`UnitValue::add`] for mixed units.
    pub fn add_x(&mut self, dx: impl Into<UnitValue>) {
        let reference = self.extent().width;
        let x = self.tree.node(self.id).local.offset_x.add(dx.into(), reference);
        self.set_x(x);
    }

    /// Add to the vertical offset.
    pub fn add_y(&mut self, dy: impl Into<UnitValue>) {
        let reference = self.extent().height;
        let y = self.tree.node(self.id).local.offset_y.add(dy.into(), reference);
        self.set_y(y);
    }

    /// Add to both offsets.
    pub fn add_position(&mut self, dx: impl Into<UnitValue>, dy: impl Into<UnitValue>) {
        self.add_x(dx);
        self.add_y(dy);
    }

    /// Add to the width. The result clamps to zero.
    pub fn add_width(&mut self, dw: impl Into<UnitValue>) {
        let reference = self.extent().width;
        let w = self.tree.node(self.id).local.width.add(dw.into(), reference);
        self.set_width(w);
    }

    /// Add to the height. The result clamps to zero.
    pub fn add_height(&mut self, dh: impl Into<UnitValue>) {
        let reference = self.extent().height;
        let h = self.tree.node(self.id).local.height.add(dh.into(), reference);
        self.set_height(h);
    }

    /// Add to width and height.
    pub fn add_size(&mut self, dw: impl Into<UnitValue>, dh: impl Into<UnitValue>) {
        self.add_width(dw);
        self.add_height(dh);
    }

    /// Rotate further by `radians`.
    pub fn add_angle(&mut self, radians: f64) {
        let angle = self.tree.node(self.id).local.angle + radians;
        self.set_angle(angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;
    use crate::unit::Unit;
    use kurbo::Vec2;

    fn clean_node(kind: NodeKind) -> (Tree, NodeId) {
        let mut tree = Tree::new(Size::new(200.0, 100.0));
        let id = tree.insert(None, kind);
        tree.node_mut(id).dirty = DirtyFlags::empty();
        (tree, id)
    }

    #[test]
    fn identical_values_are_noops() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id)
            .set_position(0.0, 0.0)
            .set_size(0.0, 0.0)
            .set_scale(1.0, 1.0)
            .set_angle(0.0)
            .set_align(0.0, 0.0)
            .set_opacity(1.0)
            .set_tint(None::<Rgba8>);
        assert_eq!(tree.dirty_flags(id), Some(DirtyFlags::empty()));
    }

    #[test]
    fn unit_is_part_of_identity() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id).set_x(UnitValue::percent(0.0));
        assert_eq!(tree.dirty_flags(id), Some(DirtyFlags::POSITION));
    }

    #[test]
    fn nan_writes_are_ignored() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id)
            .set_opacity(f64::NAN)
            .set_angle(f64::NAN)
            .set_x(UnitValue::percent(f64::NAN))
            .set_width(f64::NAN)
            .set_scale_x(f64::NAN);
        assert_eq!(tree.dirty_flags(id), Some(DirtyFlags::empty()));
        assert_eq!(tree.opacity(id), Some(1.0));
        assert_eq!(tree.angle(id), Some(0.0));
        assert_eq!(tree.width(id), Some(0.0));
        assert_eq!(tree.scale(id), Some(Vec2::new(1.0, 1.0)));
    }

    fn dirty_after(edit: impl FnOnce(&mut NodeEditor<'_>)) -> Option<DirtyFlags> {
        let (mut tree, id) = clean_node(NodeKind::Box);
        edit(&mut tree.edit(id));
        tree.dirty_flags(id)
    }

    #[test]
    fn each_setter_marks_its_flags() {
        let size_and_position = Some(DirtyFlags::SIZE | DirtyFlags::POSITION);
        assert_eq!(dirty_after(|e| { e.set_height(4.0); }), size_and_position);
        assert_eq!(dirty_after(|e| { e.set_scale_y(2.0); }), size_and_position);
        assert_eq!(dirty_after(|e| { e.set_angle(1.0); }), Some(DirtyFlags::POSITION));
        assert_eq!(dirty_after(|e| { e.set_align_x(0.5); }), Some(DirtyFlags::POSITION));
        assert_eq!(dirty_after(|e| { e.set_opacity(0.5); }), Some(DirtyFlags::OPACITY));
        assert_eq!(dirty_after(|e| { e.set_tint(Rgba8::BLACK); }), Some(DirtyFlags::COLOR));
        assert_eq!(dirty_after(|e| { e.set_depth(0.7); }), Some(DirtyFlags::empty()));
    }

    #[test]
    fn values_clamp() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id)
            .set_size(-5.0, UnitValue::percent(-1.0))
            .set_scale(-2.0, 3.0)
            .set_opacity(4.0)
            .set_depth(-1.0);
        assert_eq!(tree.width(id), Some(0.0));
        assert_eq!(tree.height_value(id), Some(UnitValue::percent(0.0)));
        assert_eq!(tree.scale(id), Some(Vec2::new(0.0, 3.0)));
        assert_eq!(tree.opacity(id), Some(1.0));
        assert_eq!(tree.depth(id), Some(0.0));
    }

    #[test]
    fn add_converts_to_delta_unit() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id).set_x(50.0);
        tree.edit(id).add_x(UnitValue::percent(0.25));
        // 50px of a 200px viewport is 25%.
        assert_eq!(tree.offset_x_value(id), Some(UnitValue::percent(0.5)));
        assert_eq!(tree.x(id), Some(100.0));

        tree.edit(id).add_x(10.0);
        assert_eq!(tree.offset_x_value(id).map(|v| v.unit), Some(Unit::Pixel));
        assert_eq!(tree.x(id), Some(110.0));
    }

    #[test]
    fn add_size_and_angle() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id).set_size(10.0, 10.0);
        let mut edit = tree.edit(id);
        edit.add_size(5.0, -20.0);
        edit.add_angle(0.5);
        edit.add_angle(0.25);
        assert_eq!(tree.width(id), Some(15.0));
        assert_eq!(tree.height(id), Some(0.0));
        assert_eq!(tree.angle(id), Some(0.75));
    }

    #[test]
    fn degrees_round_trip() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id).set_angle_degrees(90.0);
        assert!((tree.angle_degrees(id).unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn line_rejects_rotation_origin() {
        let (mut tree, id) = clean_node(NodeKind::Line);
        let err = tree.edit(id).set_rotation_origin(0.5, 0.5).unwrap_err();
        assert!(matches!(err, SceneError::Unsupported { kind: NodeKind::Line, .. }));
        assert_eq!(tree.rotation_origin(id), Some(Vec2::new(0.0, 0.5)));
        assert_eq!(tree.dirty_flags(id), Some(DirtyFlags::empty()));
    }

    #[test]
    fn only_lines_take_endpoints() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        assert!(tree
            .edit(id)
            .set_line_points(Point::ORIGIN, Point::new(3.0, 4.0))
            .is_err());

        let line = tree.insert(None, NodeKind::Line);
        tree.edit(line)
            .set_line_points(Point::new(1.0, 1.0), Point::new(4.0, 5.0))
            .unwrap();
        assert_eq!(tree.width(line), Some(5.0));
        assert_eq!(tree.x(line), Some(1.0));
    }

    #[test]
    fn flags_toggle() {
        let (mut tree, id) = clean_node(NodeKind::Box);
        tree.edit(id).set_interactive(true).set_visible(false);
        assert_eq!(tree.flags(id), Some(NodeFlags::INTERACTIVE));
        assert_eq!(tree.dirty_flags(id), Some(DirtyFlags::empty()));
    }
}
