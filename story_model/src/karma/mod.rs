//! Karma: the four bounded dimensions that summarize narrative consequences.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Lower bound of every karma dimension.
pub const KARMA_MIN: f64 = -1.0;

/// Upper bound of every karma dimension.
pub const KARMA_MAX: f64 = 1.0;

/// Karma change carried by a page, or accumulated along a path.
///
/// Every field is kept within `[-1.0, 1.0]`: values are clamped on
/// construction and after every addition or subtraction. Out-of-range input
/// is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawKarma")]
pub struct KarmaPoints {
    /// Higher is more advanced. Lower is no technology.
    pub technology: f64,
    /// Higher is humans are happier.
    pub happiness: f64,
    /// Higher is humans are safer.
    pub safety: f64,
    /// Higher is humans have more control, lower is the AGI has more control.
    pub control: f64,
}

/// Unclamped wire shape; missing dimensions default to zero.
#[derive(Deserialize)]
struct RawKarma {
    #[serde(default)]
    technology: f64,
    #[serde(default)]
    happiness: f64,
    #[serde(default)]
    safety: f64,
    #[serde(default)]
    control: f64,
}

impl From<RawKarma> for KarmaPoints {
    fn from(raw: RawKarma) -> Self {
        Self::new(raw.technology, raw.happiness, raw.safety, raw.control)
    }
}

impl KarmaPoints {
    /// Create karma points, clamping every dimension.
    pub fn new(technology: f64, happiness: f64, safety: f64, control: f64) -> Self {
        Self {
            technology: Self::cap(technology),
            happiness: Self::cap(happiness),
            safety: Self::cap(safety),
            control: Self::cap(control),
        }
    }

    /// All dimensions at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Clamp a single value into `[-1.0, 1.0]`.
    pub fn cap(value: f64) -> f64 {
        KARMA_MIN.max(KARMA_MAX.min(value))
    }

    /// Field-wise sum, clamped.
    pub fn add(self, other: KarmaPoints) -> KarmaPoints {
        Self::new(
            self.technology + other.technology,
            self.happiness + other.happiness,
            self.safety + other.safety,
            self.control + other.control,
        )
    }

    /// Field-wise difference, clamped.
    pub fn subtract(self, other: KarmaPoints) -> KarmaPoints {
        Self::new(
            self.technology - other.technology,
            self.happiness - other.happiness,
            self.safety - other.safety,
            self.control - other.control,
        )
    }

    /// Dimensions as `[technology, happiness, safety, control]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.technology, self.happiness, self.safety, self.control]
    }

    /// Inverse of [`KarmaPoints::to_array`], clamping every value.
    pub fn from_array(values: [f64; 4]) -> Self {
        let [technology, happiness, safety, control] = values;
        Self::new(technology, happiness, safety, control)
    }
}

impl Add for KarmaPoints {
    type Output = KarmaPoints;

    fn add(self, rhs: KarmaPoints) -> KarmaPoints {
        KarmaPoints::add(self, rhs)
    }
}

impl Sub for KarmaPoints {
    type Output = KarmaPoints;

    fn sub(self, rhs: KarmaPoints) -> KarmaPoints {
        self.subtract(rhs)
    }
}

impl AddAssign for KarmaPoints {
    fn add_assign(&mut self, rhs: KarmaPoints) {
        *self = KarmaPoints::add(*self, rhs);
    }
}

impl SubAssign for KarmaPoints {
    fn sub_assign(&mut self, rhs: KarmaPoints) {
        *self = self.subtract(rhs);
    }
}

impl Sum for KarmaPoints {
    fn sum<I: Iterator<Item = KarmaPoints>>(iter: I) -> Self {
        iter.fold(KarmaPoints::zero(), |acc, karma| acc + karma)
    }
}

impl<'a> Sum<&'a KarmaPoints> for KarmaPoints {
    fn sum<I: Iterator<Item = &'a KarmaPoints>>(iter: I) -> Self {
        iter.fold(KarmaPoints::zero(), |acc, karma| acc + *karma)
    }
}
