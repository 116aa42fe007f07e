// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unit-tagged scalars and their resolution against a reference extent.

/// How a [`UnitValue`] is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Absolute render units.
    #[default]
    Pixel,
    /// Fraction of a reference extent: the parent's resolved extent on the
    /// same axis, or the viewport for root nodes. `0.5` is half.
    Percent,
}

/// A scalar tagged with its [`Unit`].
///
/// Plain `f64`s convert into pixel values, so `editor.set_x(10.0)` and
/// `editor.set_x(UnitValue::px(10.0))` are equivalent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitValue {
    /// Magnitude, in pixels or as a fraction.
    pub value: f64,
    /// Interpretation of `value`.
    pub unit: Unit,
}

impl UnitValue {
    /// Zero pixels.
    pub const ZERO: Self = Self::px(0.0);

    /// A pixel value.
    pub const fn px(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Pixel,
        }
    }

    /// A fraction of the reference extent.
    pub const fn percent(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    /// Resolve to pixels against `reference`.
    pub fn resolve(self, reference: f64) -> f64 {
        match self.unit {
            Unit::Pixel => self.value,
            Unit::Percent => self.value * reference,
        }
    }

    /// Same unit, with negative magnitudes clamped to zero.
    pub(crate) fn non_negative(self) -> Self {
        Self {
            // NaN passes through so callers can reject it.
            value: if self.value < 0.0 { 0.0 } else { self.value },
            ..self
        }
    }

    /// Add `delta`, converting the current value into the delta's unit first.
    ///
    /// When units differ the current value is resolved to pixels against
    /// `reference` and, for a percent delta, divided back by it. A
    /// non-positive reference converts to a fraction of zero.
    pub fn add(self, delta: Self, reference: f64) -> Self {
        if self.unit == delta.unit {
            return Self {
                value: self.value + delta.value,
                unit: self.unit,
            };
        }
        let current_px = self.resolve(reference);
        match delta.unit {
            Unit::Pixel => Self::px(current_px + delta.value),
            Unit::Percent => {
                let fraction = if reference > 0.0 {
                    current_px / reference
                } else {
                    0.0
                };
                Self::percent(fraction + delta.value)
            }
        }
    }
}

impl From<f64> for UnitValue {
    fn from(value: f64) -> Self {
        Self::px(value)
    }
}
