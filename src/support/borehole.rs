//! Borehole and borefield geometry.
//!
//! A [`BoreholeField`] is an ordered set of vertical [`Borehole`]s that share
//! a depth during sizing. Fields can be built from explicit boreholes or from
//! a discrete [`FieldLayout`] (an `n1 × n2` grid with spacings `b1`, `b2` and
//! one of the supported [`FieldShape`]s).
//!
//! Two fields are interchangeable for g-function caching when their
//! [`FieldKey`]s are equal: same number of boreholes and the same position,
//! buried depth and radius for every borehole. The depth is not part of the
//! key.

use thiserror::Error;
use uom::si::{f64::Length, length::meter};

/// Errors raised when a borefield geometry is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GeometryError {
    /// The field has no boreholes.
    #[error("borefield must contain at least one borehole")]
    Empty,

    /// A borehole has a zero, negative or non-finite radius.
    #[error("borehole radius must be strictly positive, got {0} m")]
    Radius(f64),

    /// A borehole has a zero, negative or non-finite depth.
    #[error("borehole depth must be strictly positive, got {0} m")]
    Depth(f64),

    /// A borehole starts above the surface.
    #[error("buried depth must not be negative, got {0} m")]
    BuriedDepth(f64),

    /// Two boreholes are closer than the sum of their radii.
    #[error("boreholes {first} and {second} overlap ({distance} m apart)")]
    Overlap {
        first: usize,
        second: usize,
        distance: f64,
    },

    /// A discrete layout with zero rows, zero columns or a non-positive spacing.
    #[error("invalid field layout: {0}")]
    Layout(&'static str),
}

/// A single vertical borehole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Borehole {
    depth: Length,
    buried_depth: Length,
    radius: Length,
    x: Length,
    y: Length,
}

impl Borehole {
    /// Creates a borehole at position `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the depth or radius is not strictly
    /// positive or the buried depth is negative.
    pub fn new(
        depth: Length,
        buried_depth: Length,
        radius: Length,
        x: Length,
        y: Length,
    ) -> Result<Self, GeometryError> {
        let borehole = Self {
            depth,
            buried_depth,
            radius,
            x,
            y,
        };
        borehole.validate()?;
        Ok(borehole)
    }

    fn validate(&self) -> Result<(), GeometryError> {
        let depth = self.depth.get::<meter>();
        let radius = self.radius.get::<meter>();
        let buried = self.buried_depth.get::<meter>();

        if !(depth.is_finite() && depth > 0.0) {
            return Err(GeometryError::Depth(depth));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeometryError::Radius(radius));
        }
        if !(buried.is_finite() && buried >= 0.0) {
            return Err(GeometryError::BuriedDepth(buried));
        }
        Ok(())
    }

    /// Active length of the borehole.
    #[must_use]
    pub fn depth(&self) -> Length {
        self.depth
    }

    /// Depth of the borehole head below the surface.
    #[must_use]
    pub fn buried_depth(&self) -> Length {
        self.buried_depth
    }

    /// Borehole radius.
    #[must_use]
    pub fn radius(&self) -> Length {
        self.radius
    }

    /// Horizontal position `(x, y)`.
    #[must_use]
    pub fn position(&self) -> (Length, Length) {
        (self.x, self.y)
    }

    /// Horizontal distance to another borehole, in metres.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x.get::<meter>() - other.x.get::<meter>();
        let dy = self.y.get::<meter>() - other.y.get::<meter>();
        dx.hypot(dy)
    }

    #[must_use]
    fn with_depth(mut self, depth: Length) -> Self {
        self.depth = depth;
        self
    }
}

/// Arrangement of a discrete field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldShape {
    /// Every grid position.
    #[default]
    Rectangle,
    /// First row and first column.
    L,
    /// First row plus first and last columns.
    U,
    /// Grid perimeter.
    Box,
    /// Every grid position, odd rows shifted by half a spacing.
    Staggered,
}

/// Discrete description of a field: `n1 × n2` positions with spacings `b1`, `b2`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldLayout {
    pub shape: FieldShape,
    pub n1: usize,
    pub n2: usize,
    pub b1: Length,
    pub b2: Length,
}

impl FieldLayout {
    /// Grid positions `(x, y)` in metres occupied by this layout.
    fn positions(&self) -> Result<Vec<(f64, f64)>, GeometryError> {
        if self.n1 == 0 || self.n2 == 0 {
            return Err(GeometryError::Layout("n1 and n2 must be at least 1"));
        }
        let b1 = self.b1.get::<meter>();
        let b2 = self.b2.get::<meter>();
        if !(b1 > 0.0 && b2 > 0.0) {
            return Err(GeometryError::Layout("spacings must be strictly positive"));
        }

        let (last_i, last_j) = (self.n1 - 1, self.n2 - 1);
        let mut positions = Vec::with_capacity(self.n1 * self.n2);
        for j in 0..self.n2 {
            for i in 0..self.n1 {
                let keep = match self.shape {
                    FieldShape::Rectangle | FieldShape::Staggered => true,
                    FieldShape::L => i == 0 || j == 0,
                    FieldShape::U => i == 0 || i == last_i || j == 0,
                    FieldShape::Box => i == 0 || i == last_i || j == 0 || j == last_j,
                };
                if !keep {
                    continue;
                }
                let shift = if self.shape == FieldShape::Staggered && j % 2 == 1 {
                    0.5 * b1
                } else {
                    0.0
                };
                positions.push((i as f64 * b1 + shift, j as f64 * b2));
            }
        }
        Ok(positions)
    }
}

/// Value used to compare fields for g-function caching.
///
/// Holds the exact bit patterns of `(x, y, buried depth, radius)` per borehole.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey(Vec<[u64; 4]>);

/// An ordered set of boreholes sharing one depth.
#[derive(Debug, Clone, PartialEq)]
pub struct BoreholeField {
    boreholes: Vec<Borehole>,
    layout: Option<FieldLayout>,
}

impl BoreholeField {
    /// Creates a field from explicit boreholes.
    ///
    /// Every borehole takes the depth of the first one.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the field is empty or any two boreholes overlap.
    pub fn new(boreholes: Vec<Borehole>) -> Result<Self, GeometryError> {
        let first = boreholes.first().ok_or(GeometryError::Empty)?;
        let depth = first.depth;
        let boreholes: Vec<_> = boreholes.into_iter().map(|b| b.with_depth(depth)).collect();

        for (i, a) in boreholes.iter().enumerate() {
            a.validate()?;
            for (j, b) in boreholes.iter().enumerate().skip(i + 1) {
                let distance = a.distance_to(b);
                let reach = a.radius.get::<meter>() + b.radius.get::<meter>();
                if distance <= reach {
                    return Err(GeometryError::Overlap {
                        first: i,
                        second: j,
                        distance,
                    });
                }
            }
        }

        Ok(Self {
            boreholes,
            layout: None,
        })
    }

    /// Creates a field from a discrete layout.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] for an empty layout, non-positive spacings
    /// or a radius that reaches half the spacing.
    pub fn from_layout(
        layout: FieldLayout,
        depth: Length,
        buried_depth: Length,
        radius: Length,
    ) -> Result<Self, GeometryError> {
        let boreholes = layout
            .positions()?
            .into_iter()
            .map(|(x, y)| {
                Borehole::new(
                    depth,
                    buried_depth,
                    radius,
                    Length::new::<meter>(x),
                    Length::new::<meter>(y),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut field = Self::new(boreholes)?;
        field.layout = Some(layout);
        Ok(field)
    }

    /// Creates a rectangular `n1 × n2` field.
    ///
    /// # Errors
    ///
    /// See [`BoreholeField::from_layout`].
    pub fn rectangular(
        n1: usize,
        n2: usize,
        b1: Length,
        b2: Length,
        depth: Length,
        buried_depth: Length,
        radius: Length,
    ) -> Result<Self, GeometryError> {
        let layout = FieldLayout {
            shape: FieldShape::Rectangle,
            n1,
            n2,
            b1,
            b2,
        };
        Self::from_layout(layout, depth, buried_depth, radius)
    }

    /// The boreholes of this field.
    #[must_use]
    pub fn boreholes(&self) -> &[Borehole] {
        &self.boreholes
    }

    /// The discrete layout, if the field was built from one.
    #[must_use]
    pub fn layout(&self) -> Option<&FieldLayout> {
        self.layout.as_ref()
    }

    /// Number of boreholes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boreholes.len()
    }

    /// Always `false`; a field holds at least one borehole.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boreholes.is_empty()
    }

    /// Shared depth of the boreholes.
    #[must_use]
    pub fn depth(&self) -> Length {
        self.boreholes[0].depth
    }

    /// Sets the shared depth of every borehole.
    pub fn set_depth(&mut self, depth: Length) {
        for borehole in &mut self.boreholes {
            borehole.depth = depth;
        }
    }

    /// Returns a copy of this field at another depth.
    #[must_use]
    pub fn with_depth(&self, depth: Length) -> Self {
        let mut field = self.clone();
        field.set_depth(depth);
        field
    }

    /// Total drilled length, `depth · n`.
    #[must_use]
    pub fn total_length(&self) -> Length {
        self.depth() * self.len() as f64
    }

    /// Cache key of this field; equal for fields that differ only in depth.
    #[must_use]
    pub fn key(&self) -> FieldKey {
        FieldKey(
            self.boreholes
                .iter()
                .map(|b| {
                    [
                        b.x.get::<meter>().to_bits(),
                        b.y.get::<meter>().to_bits(),
                        b.buried_depth.get::<meter>().to_bits(),
                        b.radius.get::<meter>().to_bits(),
                    ]
                })
                .collect(),
        )
    }
}
