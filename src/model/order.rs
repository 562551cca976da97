//! Dimension orders and the plane index arithmetic.
//!
//! Planes are numbered by treating Z, C and T as the digits of a mixed-radix
//! number. The dimension order names the digits from fastest to slowest after
//! the implicit `XY` raster: with `XYZCT`, Z varies fastest, then C, then T.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, FormatError, Result};

/// One of the three non-raster axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Z,
    C,
    T,
}

impl Axis {
    pub const fn label(&self) -> char {
        match self {
            Axis::Z => 'Z',
            Axis::C => 'C',
            Axis::T => 'T',
        }
    }
}

/// Storage order of the Z, C and T planes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum DimensionOrder {
    #[default]
    XYZCT,
    XYZTC,
    XYCZT,
    XYCTZ,
    XYTZC,
    XYTCZ,
}

impl DimensionOrder {
    pub const ALL: [DimensionOrder; 6] = [
        DimensionOrder::XYZCT,
        DimensionOrder::XYZTC,
        DimensionOrder::XYCZT,
        DimensionOrder::XYCTZ,
        DimensionOrder::XYTZC,
        DimensionOrder::XYTCZ,
    ];

    /// Axes from fastest-varying to slowest-varying.
    pub const fn axes(&self) -> [Axis; 3] {
        match self {
            DimensionOrder::XYZCT => [Axis::Z, Axis::C, Axis::T],
            DimensionOrder::XYZTC => [Axis::Z, Axis::T, Axis::C],
            DimensionOrder::XYCZT => [Axis::C, Axis::Z, Axis::T],
            DimensionOrder::XYCTZ => [Axis::C, Axis::T, Axis::Z],
            DimensionOrder::XYTZC => [Axis::T, Axis::Z, Axis::C],
            DimensionOrder::XYTCZ => [Axis::T, Axis::C, Axis::Z],
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            DimensionOrder::XYZCT => "XYZCT",
            DimensionOrder::XYZTC => "XYZTC",
            DimensionOrder::XYCZT => "XYCZT",
            DimensionOrder::XYCTZ => "XYCTZ",
            DimensionOrder::XYTZC => "XYTZC",
            DimensionOrder::XYTCZ => "XYTCZ",
        }
    }
}

impl fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DimensionOrder {
    type Err = FormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DimensionOrder::ALL
            .iter()
            .copied()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| FormatError::UnknownDimensionOrder(s.to_string()))
    }
}

impl TryFrom<String> for DimensionOrder {
    type Error = FormatError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DimensionOrder> for String {
    fn from(order: DimensionOrder) -> Self {
        order.as_str().to_string()
    }
}

/// Position of a plane along Z, C (effective channels) and T.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ZctCoords {
    pub z: usize,
    pub c: usize,
    pub t: usize,
}

impl ZctCoords {
    pub const fn new(z: usize, c: usize, t: usize) -> Self {
        Self { z, c, t }
    }

    fn get(&self, axis: Axis) -> usize {
        match axis {
            Axis::Z => self.z,
            Axis::C => self.c,
            Axis::T => self.t,
        }
    }

    fn set(&mut self, axis: Axis, value: usize) {
        match axis {
            Axis::Z => self.z = value,
            Axis::C => self.c = value,
            Axis::T => self.t = value,
        }
    }
}

impl From<(usize, usize, usize)> for ZctCoords {
    fn from((z, c, t): (usize, usize, usize)) -> Self {
        Self { z, c, t }
    }
}

/// Validated plane geometry of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    order: DimensionOrder,
    size_z: usize,
    size_c: usize,
    size_t: usize,
}

impl PlaneLayout {
    /// Build a layout, checking that `image_count == size_z * size_c * size_t`.
    ///
    /// `size_c` is the effective channel count. A mismatch, or any zero size,
    /// means the reader is malformed.
    pub fn new(
        order: DimensionOrder,
        size_z: usize,
        size_c: usize,
        size_t: usize,
        image_count: usize,
    ) -> Result<Self> {
        if size_z == 0 || size_c == 0 || size_t == 0 {
            return Err(FormatError::Malformed(format!(
                "invalid plane sizes Z={size_z} C={size_c} T={size_t}"
            ))
            .into());
        }
        let product = size_z
            .checked_mul(size_c)
            .and_then(|n| n.checked_mul(size_t));
        if product != Some(image_count) {
            return Err(FormatError::Malformed(format!(
                "Z*C*T = {size_z}*{size_c}*{size_t} does not match image count {image_count}"
            ))
            .into());
        }
        Ok(Self {
            order,
            size_z,
            size_c,
            size_t,
        })
    }

    pub fn order(&self) -> DimensionOrder {
        self.order
    }

    pub fn image_count(&self) -> usize {
        self.size_z * self.size_c * self.size_t
    }

    fn size(&self, axis: Axis) -> usize {
        match axis {
            Axis::Z => self.size_z,
            Axis::C => self.size_c,
            Axis::T => self.size_t,
        }
    }

    /// Linear plane index of `coords`.
    pub fn index(&self, coords: ZctCoords) -> Result<usize> {
        for axis in [Axis::Z, Axis::C, Axis::T] {
            let value = coords.get(axis);
            let size = self.size(axis);
            if value >= size {
                return Err(ArgumentError::CoordinateOutOfRange {
                    axis: axis.label(),
                    value,
                    size,
                }
                .into());
            }
        }

        // Horner evaluation from the slowest digit down.
        let index = self
            .order
            .axes()
            .iter()
            .rev()
            .fold(0, |acc, &axis| acc * self.size(axis) + coords.get(axis));
        Ok(index)
    }

    /// Inverse of [`PlaneLayout::index`].
    pub fn coords(&self, index: usize) -> Result<ZctCoords> {
        let count = self.image_count();
        if index >= count {
            return Err(ArgumentError::PlaneOutOfRange { index, count }.into());
        }

        let mut coords = ZctCoords::default();
        let mut rest = index;
        for axis in self.order.axes() {
            let size = self.size(axis);
            coords.set(axis, rest % size);
            rest /= size;
        }
        Ok(coords)
    }
}
