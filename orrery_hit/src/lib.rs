// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point containment primitives for resolved scene geometry.
//!
//! This crate answers one question: "is this render-space point inside that
//! shape?" It is decoupled from the scene tree itself; `orrery_tree` builds
//! the shapes from each node's resolved outputs and asks them.
//!
//! # Key types
//!
//! - [`HitParams`]: per-query parameters (a fill tolerance in render units).
//! - [`HitTest`]: a trait implemented by shapes that can answer containment
//!   queries in render space.
//! - [`RotatedRect`]: an axis-aligned box rotated about an arbitrary pivot.
//!   Containment is decided by decomposing the rectangle into four triangles
//!   fanned out from the query point and comparing their summed area with the
//!   rectangle's own area.
//! - [`InscribedEllipse`]: the ellipse inscribed in a [`RotatedRect`].
//!
//! ## Shapes and scope
//!
//! - [`Rect`]: axis-aligned box, edges inclusive. Boxes with zero width or
//!   height never contain anything.
//! - [`RotatedRect`]: rotation-aware box test.
//! - [`InscribedEllipse`]: rotation-aware ellipse test.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use orrery_hit::{HitParams, HitTest, RotatedRect};
//!
//! // A 10x2 bar rotated a quarter turn about its own top-left corner.
//! let bar = RotatedRect::new(
//!     Rect::new(0.0, 0.0, 10.0, 2.0),
//!     Point::ORIGIN,
//!     core::f64::consts::FRAC_PI_2,
//! );
//! assert!(bar.hit_test(Point::new(-1.0, 5.0), &HitParams::default()));
//! assert!(!bar.hit_test(Point::new(5.0, 1.0), &HitParams::default()));
//! ```

#![no_std]

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Relative slack used when comparing the triangle-fan area against the
/// rectangle area. Absorbs float rounding along the edges.
const AREA_EPSILON: f64 = 1e-9;

/// Parameters controlling containment tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct HitParams {
    /// Tolerance in render units. Points this close outside a shape's edge
    /// still count as inside.
    pub fill_tolerance: f64,
}

/// Trait for containment tests in render (world) space.
pub trait HitTest {
    /// Returns `true` when `pt` lies inside the shape, edges included.
    fn hit_test(&self, pt: Point, params: &HitParams) -> bool;
}

/// Inclusive axis-aligned box containment.
///
/// Unlike [`Rect::contains`], the right and bottom edges count as inside.
impl HitTest for Rect {
    fn hit_test(&self, pt: Point, params: &HitParams) -> bool {
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return false;
        }
        let tol = params.fill_tolerance.max(0.0);
        pt.x >= self.x0 - tol
            && pt.x <= self.x1 + tol
            && pt.y >= self.y0 - tol
            && pt.y <= self.y1 + tol
    }
}

/// A box rotated by `angle` radians about `pivot`.
///
/// `rect` is the un-rotated box in render space; this is exactly the
/// `(render_x, render_y, render_width, render_height)` a scene node resolves
/// to, with `pivot` its resolved rotation pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatedRect {
    /// Un-rotated bounds.
    pub rect: Rect,
    /// Absolute point the box rotates about.
    pub pivot: Point,
    /// Rotation in radians (clockwise in a y-down space).
    pub angle: f64,
}

impl RotatedRect {
    /// Create a rotated box.
    pub const fn new(rect: Rect, pivot: Point, angle: f64) -> Self {
        Self { rect, pivot, angle }
    }

    /// Create a rotated box from its un-rotated origin and size.
    pub fn from_origin_size(origin: Point, size: Size, pivot: Point, angle: f64) -> Self {
        Self::new(Rect::from_origin_size(origin, size), pivot, angle)
    }

    /// Area of the box. Rotation does not change it.
    pub fn area(&self) -> f64 {
        self.rect.width() * self.rect.height()
    }

    /// Corners in render space, clockwise from the un-rotated top-left.
    pub fn corners(&self) -> [Point; 4] {
        let r = self.rect;
        let rotate = Affine::rotate_about(self.angle, self.pivot);
        [
            rotate * Point::new(r.x0, r.y0),
            rotate * Point::new(r.x1, r.y0),
            rotate * Point::new(r.x1, r.y1),
            rotate * Point::new(r.x0, r.y1),
        ]
    }

    /// Map a render-space point into the box's un-rotated frame.
    pub fn to_unrotated(&self, pt: Point) -> Point {
        Affine::rotate_about(-self.angle, self.pivot) * pt
    }
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    let ab: Vec2 = b - a;
    let ac: Vec2 = c - a;
    ab.cross(ac).abs() * 0.5
}

impl HitTest for RotatedRect {
    fn hit_test(&self, pt: Point, params: &HitParams) -> bool {
        let area = self.area();
        if area <= 0.0 {
            return false;
        }
        let [a, b, c, d] = self.corners();
        let fan = triangle_area(pt, a, b)
            + triangle_area(pt, b, c)
            + triangle_area(pt, c, d)
            + triangle_area(pt, d, a);
        // A point `t` outside an edge of length `l` grows the fan by about `t * l`.
        let longest = self.rect.width().max(self.rect.height());
        let slack = area * AREA_EPSILON + params.fill_tolerance.max(0.0) * longest;
        fan <= area + slack
    }
}

/// The ellipse inscribed in a [`RotatedRect`].
///
/// For a square box this is a circle of diameter equal to the side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InscribedEllipse(pub RotatedRect);

impl HitTest for InscribedEllipse {
    fn hit_test(&self, pt: Point, params: &HitParams) -> bool {
        let frame = self.0;
        let rx = frame.rect.width() * 0.5;
        let ry = frame.rect.height() * 0.5;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let tol = params.fill_tolerance.max(0.0);
        let local = frame.to_unrotated(pt);
        let center = frame.rect.center();
        let dx = (local.x - center.x) / (rx + tol);
        let dy = (local.y - center.y) / (ry + tol);
        dx * dx + dy * dy <= 1.0 + AREA_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn rect_edges_are_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let params = HitParams::default();
        assert!(r.hit_test(Point::new(10.0, 10.0), &params));
        assert!(r.hit_test(Point::new(0.0, 5.0), &params));
        assert!(!r.hit_test(Point::new(10.5, 5.0), &params));
    }

    #[test]
    fn degenerate_rect_never_hits() {
        let r = Rect::new(5.0, 5.0, 5.0, 15.0);
        assert!(!r.hit_test(Point::new(5.0, 10.0), &HitParams::default()));
    }

    #[test]
    fn rect_tolerance_inflates() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let params = HitParams {
            fill_tolerance: 1.0,
        };
        assert!(r.hit_test(Point::new(10.5, 5.0), &params));
        assert!(!r.hit_test(Point::new(11.5, 5.0), &params));
    }

    #[test]
    fn unrotated_box_matches_aabb() {
        let rr = RotatedRect::new(Rect::new(0.0, 0.0, 20.0, 10.0), Point::ORIGIN, 0.0);
        let params = HitParams::default();
        assert!(rr.hit_test(Point::new(10.0, 5.0), &params));
        assert!(rr.hit_test(Point::new(20.0, 10.0), &params), "corner is inside");
        assert!(!rr.hit_test(Point::new(21.0, 5.0), &params));
    }

    #[test]
    fn rotated_box_follows_rotation() {
        // 20x10 box rotated a quarter turn about its center (10, 5).
        let rr = RotatedRect::new(
            Rect::new(0.0, 0.0, 20.0, 10.0),
            Point::new(10.0, 5.0),
            FRAC_PI_2,
        );
        let params = HitParams::default();
        // Rotated footprint spans x in [5, 15], y in [-5, 15].
        assert!(rr.hit_test(Point::new(10.0, -4.0), &params));
        assert!(!rr.hit_test(Point::new(18.0, 5.0), &params));
        assert!(!rr.hit_test(Point::new(2.0, 5.0), &params));
    }

    #[test]
    fn rotated_box_rejects_aabb_corner() {
        let rr = RotatedRect::new(
            Rect::new(-10.0, -10.0, 10.0, 10.0),
            Point::ORIGIN,
            FRAC_PI_4,
        );
        // Inside the loose AABB of the diamond but outside the diamond itself.
        assert!(!rr.hit_test(Point::new(12.0, 12.0), &HitParams::default()));
        assert!(rr.hit_test(Point::new(0.0, 13.0), &HitParams::default()));
    }

    #[test]
    fn corners_rotate_about_pivot() {
        let rr = RotatedRect::new(Rect::new(0.0, 0.0, 10.0, 0.0), Point::ORIGIN, FRAC_PI_2);
        let [a, b, ..] = rr.corners();
        assert!((a - Point::ORIGIN).hypot() < 1e-12);
        assert!((b - Point::new(0.0, 10.0)).hypot() < 1e-9);
    }

    #[test]
    fn inscribed_ellipse_hit_and_miss() {
        let e = InscribedEllipse(RotatedRect::new(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Point::new(5.0, 5.0),
            0.0,
        ));
        let params = HitParams::default();
        assert!(e.hit_test(Point::new(5.0, 5.0), &params));
        assert!(e.hit_test(Point::new(10.0, 5.0), &params));
        assert!(!e.hit_test(Point::new(0.5, 0.5), &params), "box corner is outside");
    }

    #[test]
    fn inscribed_ellipse_rotates() {
        // 20x4 ellipse turned upright about its center.
        let e = InscribedEllipse(RotatedRect::new(
            Rect::new(0.0, 0.0, 20.0, 4.0),
            Point::new(10.0, 2.0),
            FRAC_PI_2,
        ));
        let params = HitParams::default();
        assert!(e.hit_test(Point::new(10.0, 10.0), &params));
        assert!(!e.hit_test(Point::new(18.0, 2.0), &params));
    }
}
