// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tint colors and the inherited-tint law.

/// An 8-bit-per-channel RGBA color, not premultiplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Per-channel mean of two colors, rounding down.
    ///
    /// This is the tint inheritance law: a child's tint is averaged with its
    /// parent's, alpha included. It is not an alpha composite.
    pub const fn average(self, other: Self) -> Self {
        const fn mid(a: u8, b: u8) -> u8 {
            ((a as u16 + b as u16) / 2) as u8
        }
        Self::new(
            mid(self.r, other.r),
            mid(self.g, other.g),
            mid(self.b, other.b),
            mid(self.a, other.a),
        )
    }
}

/// Resolve a node's tint from its parent's resolved tint and its own.
///
/// No local tint inherits the parent's unchanged; no parent tint passes the
/// local one through; both present average.
pub(crate) fn inherit_tint(parent: Option<Rgba8>, local: Option<Rgba8>) -> Option<Rgba8> {
    match (parent, local) {
        (Some(parent), Some(local)) => Some(parent.average(local)),
        (parent, None) => parent,
        (None, local) => local,
    }
}
