//! Run configuration resolution
//!
//! Turns the three independent factors of a benchmark run (variant,
//! precision tier, insertion mode) into a fully resolved [`RunConfiguration`].
//! Everything else about the run is derived from the variant:
//! - the semantic [`Family`] used to look up precision tables
//! - whether the variant supports direct cell lookup

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Indexing-strategy implementation under benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Geohash coordinates, flat cells layout
    GeohashCellsRegions,
    /// Geohash coordinates, hierarchical tree layout
    GeohashTreeRegions,
    /// S2 coordinates, flat cells layout
    S2CellsRegions,
    /// S2 coordinates, hierarchical tree layout
    S2TreeRegions,
}

impl Variant {
    /// Every supported variant
    pub const ALL: [Variant; 4] = [
        Variant::GeohashCellsRegions,
        Variant::GeohashTreeRegions,
        Variant::S2CellsRegions,
        Variant::S2TreeRegions,
    ];

    /// Identifier as deployed
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GeohashCellsRegions => "GeohashCellsRegions",
            Self::GeohashTreeRegions => "GeohashTreeRegions",
            Self::S2CellsRegions => "S2CellsRegions",
            Self::S2TreeRegions => "S2TreeRegions",
        }
    }

    /// Semantic coordinate system shared with the sibling variant
    #[inline]
    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::GeohashCellsRegions | Self::GeohashTreeRegions => Family::GeohashRegions,
            Self::S2CellsRegions | Self::S2TreeRegions => Family::S2Regions,
        }
    }

    /// Whether a cell can be resolved to its region with a single lookup
    #[inline]
    #[must_use]
    pub const fn supports_direct_cell_lookup(self) -> bool {
        matches!(self, Self::GeohashCellsRegions | Self::S2CellsRegions)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ConfigError::UnknownVariant(s.to_string()))
    }
}

/// Semantic coordinate system of a pair of variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Geohash string cells
    GeohashRegions,
    /// S2 cell ids
    S2Regions,
}

impl Family {
    /// Precision for each tier, coarsest first
    #[inline]
    #[must_use]
    pub const fn precisions(self) -> [u8; 3] {
        match self {
            Self::GeohashRegions => [6, 7, 8],
            Self::S2Regions => [14, 17, 19],
        }
    }

    /// Precision at the given tier
    #[inline]
    #[must_use]
    pub const fn precision(self, index: PrecisionIndex) -> u8 {
        self.precisions()[index.as_usize()]
    }

    /// Family name
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GeohashRegions => "GeohashRegions",
            Self::S2Regions => "S2Regions",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Offset into a family's precision table (0..=2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PrecisionIndex(u8);

impl PrecisionIndex {
    /// Number of precision tiers per family
    pub const TIERS: u8 = 3;

    /// Validate a raw tier index
    pub fn new(index: u8) -> Result<Self, ConfigError> {
        if index < Self::TIERS {
            Ok(Self(index))
        } else {
            Err(ConfigError::PrecisionOutOfRange(index))
        }
    }

    /// Raw tier index
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Tier index for slice access
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for PrecisionIndex {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for PrecisionIndex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// How spatial units are added to a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionMode {
    /// One cell at a time
    Cells,
    /// Hierarchical batch structure
    Tree,
}

impl InsertionMode {
    /// Mode identifier
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cells => "cells",
            Self::Tree => "tree",
        }
    }
}

impl fmt::Display for InsertionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsertionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cells" => Ok(Self::Cells),
            "tree" => Ok(Self::Tree),
            other => Err(ConfigError::UnknownInsertionMode(other.to_string())),
        }
    }
}

/// Fully resolved, immutable run configuration
///
/// Family, precision and capability flag are derived from the variant and
/// tier; there is no way to set them independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunConfiguration {
    variant: Variant,
    precision_index: PrecisionIndex,
    insertion_mode: InsertionMode,
    family: Family,
    precision: u8,
    supports_direct_cell_lookup: bool,
}

impl RunConfiguration {
    /// Build from already-validated factors
    #[must_use]
    pub const fn new(
        variant: Variant,
        precision_index: PrecisionIndex,
        insertion_mode: InsertionMode,
    ) -> Self {
        let family = variant.family();
        Self {
            variant,
            precision_index,
            insertion_mode,
            family,
            precision: family.precision(precision_index),
            supports_direct_cell_lookup: variant.supports_direct_cell_lookup(),
        }
    }

    /// Resolve from raw selector values
    ///
    /// # Errors
    /// - `ConfigError::UnknownVariant` if the variant is not supported
    /// - `ConfigError::PrecisionOutOfRange` if the index is not 0, 1 or 2
    /// - `ConfigError::UnknownInsertionMode` if the mode is not `cells`/`tree`
    pub fn resolve(
        variant: &str,
        precision_index: u8,
        insertion_mode: &str,
    ) -> Result<Self, ConfigError> {
        let variant = variant.parse()?;
        let precision_index = PrecisionIndex::new(precision_index)?;
        let insertion_mode = insertion_mode.parse()?;
        Ok(Self::new(variant, precision_index, insertion_mode))
    }

    /// Variant under benchmark
    #[inline]
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Precision tier
    #[inline]
    #[must_use]
    pub const fn precision_index(&self) -> PrecisionIndex {
        self.precision_index
    }

    /// Insertion mode
    #[inline]
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// Derived family
    #[inline]
    #[must_use]
    pub const fn family(&self) -> Family {
        self.family
    }

    /// Resolved precision value
    #[inline]
    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Derived capability flag
    #[inline]
    #[must_use]
    pub const fn supports_direct_cell_lookup(&self) -> bool {
        self.supports_direct_cell_lookup
    }
}

impl fmt::Display for RunConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, precision {}, {})",
            self.variant, self.family, self.precision, self.insertion_mode
        )
    }
}
