//! Bounded cultivator attributes.
//!
//! A cultivator has three traits: physical foundation, spiritual
//! sensitivity, and dao comprehension. Each lives in `[0, 100]`. Values are
//! saturated rather than rejected: writing 140 stores 100, writing -3
//! stores 0. This holds for construction, every mutation, and
//! deserialization.
//!
//! Values are `f64` because some cultivation methods grow attributes by
//! half a point.

use serde::{Deserialize, Serialize};

/// Lowest value an attribute can hold.
pub const STAT_MIN: f64 = 0.0;

/// Highest value an attribute can hold.
pub const STAT_MAX: f64 = 100.0;

/// Saturate an attribute value into `[0, 100]`.
///
/// `NaN` saturates to 0.
pub fn clamp_stat(value: f64) -> f64 {
    if value.is_nan() {
        return STAT_MIN;
    }
    value.clamp(STAT_MIN, STAT_MAX)
}

/// One of the three cultivator attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Physical foundation.
    Physical,
    /// Spiritual sensitivity; drives qi gain.
    Spiritual,
    /// Dao comprehension; drives breakthroughs and insight.
    Comprehension,
}

impl Attribute {
    /// All attributes in canonical order.
    pub const ALL: [Self; 3] = [Self::Physical, Self::Spiritual, Self::Comprehension];

    /// Stable lowercase key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Spiritual => "spiritual",
            Self::Comprehension => "comprehension",
        }
    }
}

impl core::fmt::Display for Attribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw, unclamped attribute values as they appear on the wire.
#[derive(Debug, Clone, Copy, Deserialize)]
struct AttributeValues {
    physical: f64,
    spiritual: f64,
    comprehension: f64,
}

/// The three attributes of a cultivator, each held in `[0, 100]`.
///
/// Fields are private so every write goes through [`clamp_stat`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "AttributeValues")]
pub struct Attributes {
    physical: f64,
    spiritual: f64,
    comprehension: f64,
}

impl From<AttributeValues> for Attributes {
    fn from(raw: AttributeValues) -> Self {
        Self::new(raw.physical, raw.spiritual, raw.comprehension)
    }
}

impl Attributes {
    /// Build an attribute set, saturating each value into range.
    pub fn new(physical: f64, spiritual: f64, comprehension: f64) -> Self {
        Self {
            physical: clamp_stat(physical),
            spiritual: clamp_stat(spiritual),
            comprehension: clamp_stat(comprehension),
        }
    }

    /// Physical foundation.
    pub const fn physical(&self) -> f64 {
        self.physical
    }

    /// Spiritual sensitivity.
    pub const fn spiritual(&self) -> f64 {
        self.spiritual
    }

    /// Dao comprehension.
    pub const fn comprehension(&self) -> f64 {
        self.comprehension
    }

    /// Read one attribute.
    pub const fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Physical => self.physical,
            Attribute::Spiritual => self.spiritual,
            Attribute::Comprehension => self.comprehension,
        }
    }

    /// Overwrite one attribute, saturating into range.
    pub fn set(&mut self, attribute: Attribute, value: f64) {
        let clamped = clamp_stat(value);
        match attribute {
            Attribute::Physical => self.physical = clamped,
            Attribute::Spiritual => self.spiritual = clamped,
            Attribute::Comprehension => self.comprehension = clamped,
        }
    }

    /// Add `amount` to one attribute and return the stored result.
    pub fn raise(&mut self, attribute: Attribute, amount: f64) -> f64 {
        self.set(attribute, self.get(attribute) + amount);
        self.get(attribute)
    }

    /// Lowest of the three attributes.
    pub fn lowest(&self) -> f64 {
        self.physical.min(self.spiritual).min(self.comprehension)
    }

    /// Arithmetic mean of the three attributes.
    pub fn mean(&self) -> f64 {
        (self.physical + self.spiritual + self.comprehension) / 3.0
    }
}
