use std::fmt;

/// Which constraint binds a sizing.
///
/// Odd quadrants look at the first simulation year, even quadrants at the
/// last. Quadrants 1 and 2 are limited by the maximum fluid temperature
/// (injection), 3 and 4 by the minimum (extraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    /// Cooling limited, first year.
    One,
    /// Cooling limited, last year.
    Two,
    /// Heating limited, first year.
    Three,
    /// Heating limited, last year.
    Four,
}

impl Quadrant {
    pub const ALL: [Self; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// Quadrant from its number (1 to 4).
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Whether the minimum fluid temperature limits this quadrant.
    #[must_use]
    pub fn is_heating_limited(self) -> bool {
        matches!(self, Self::Three | Self::Four)
    }

    /// Whether this quadrant looks at the last simulation year.
    #[must_use]
    pub fn is_last_year(self) -> bool {
        matches!(self, Self::Two | Self::Four)
    }

    /// The two quadrants worth sizing for a yearly imbalance (kWh).
    ///
    /// A ground that cools down over the years (imbalance ≤ 0) is checked
    /// for first-year overheating and last-year freezing; a ground that heats
    /// up for the opposite pair.
    #[must_use]
    pub fn candidates(imbalance: f64) -> [Self; 2] {
        if imbalance <= 0.0 {
            [Self::One, Self::Four]
        } else {
            [Self::Two, Self::Three]
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quadrant {}", self.number())
    }
}
